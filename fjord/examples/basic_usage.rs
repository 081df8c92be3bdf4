use fjord::{
    delete_from, eq, expr, ident, insert_into, interpolate_for_dialect, lt, neq, op, or, select,
    update, Builder, Dialect, Interpolator, Mode, Operator,
};

fn main() -> fjord::Result<()> {
    // SELECT with tuple shorthand and helper conditions
    let select_query = select(("id", "name", "email"))
        .from("users")
        .where_(("age", op::GT, 18)) // Using op constants
        .where_(("status", "active")) // Defaults to EQ
        .where_(("city", "LIKE", "%York%")) // Using string operators
        .where_(eq("role", vec!["admin", "dev"])) // Arrays become IN lists
        .order_desc("id")
        .limit(10)
        .offset(5);

    let stmt = select_query.to_sql(Dialect::PostgreSql)?;
    println!("SELECT SQL: {}", stmt.sql);
    println!("  values: {:?}", stmt.values);

    // Same query with every value folded into the text
    let literal = Interpolator::new(Dialect::MySql)
        .mode(Mode::Literal)
        .interpolate(&select_query)?;
    println!("SELECT (literal): {}", literal.sql);

    // INSERT
    let insert_query = insert_into("users")
        .columns(("name", "email", "age"))
        .values(("John Doe", "john@example.com", 30))
        .values(("Jane Doe", "jane@example.com", 28));
    println!("INSERT SQL: {}", insert_query.to_sql(Dialect::MySql)?.sql);

    // UPDATE with a computed value
    let update_query = update("users")
        .set("email", "newemail@example.com")
        .set("logins", expr("logins + ?", (1,)))
        .where_(("id", 123));
    println!("UPDATE SQL: {}", update_query.to_sql(Dialect::MySql)?.sql);

    // DELETE with an OR group
    let delete_query = delete_from("users")
        .where_(or([eq("last_login", None::<String>), lt("age", 13)]))
        .where_(neq("role", "admin"));
    println!("DELETE SQL: {}", delete_query.to_sql(Dialect::PostgreSql)?.sql);

    // Aliased joins
    let join_query = select((ident("u.id"), ident("u.name"), ident("p.title")))
        .from(ident("users").as_alias("u"))
        .left_join(ident("posts").as_alias("p"), "p.user_id = u.id")
        .where_(("p.title", Operator::custom("ILIKE"), "%rust%"))
        .paginate(2, 20);
    println!("JOIN SQL: {}", join_query.to_sql(Dialect::PostgreSql)?.sql);

    // Raw SQL interpolation
    let sql = interpolate_for_dialect(
        "SELECT * FROM notes WHERE body = ? AND id IN ?",
        ("it's here", vec![1i64, 2, 3]),
        Dialect::MySql,
    )?;
    println!("Interpolated: {sql}");

    Ok(())
}
