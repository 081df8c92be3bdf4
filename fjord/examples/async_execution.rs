use fjord::{
    delete_from, eq, insert_into, select, update, Dialect, ExecResult, ExecutableModification,
    ExecutableQuery, NullString, Record, Row, Runner, Session, Value,
};
use std::sync::Arc;

#[derive(Debug, Default, Clone, PartialEq, Record)]
struct User {
    id: i64,
    name: String,
    email: NullString,
    age: i32,
}

// Runner that prints statements and serves canned rows
#[derive(Default)]
struct PrintRunner {
    next_id: i64,
}

impl Runner for PrintRunner {
    async fn execute(&mut self, sql: &str, values: &[Value]) -> fjord::Result<ExecResult> {
        println!("EXECUTE: {sql} {values:?}");
        self.next_id += 1;
        Ok(ExecResult {
            rows_affected: 1,
            last_insert_id: Some(self.next_id),
        })
    }

    async fn query(&mut self, sql: &str, values: &[Value]) -> fjord::Result<Vec<Row>> {
        println!("QUERY: {sql} {values:?}");
        if sql.starts_with("SELECT COUNT(*)") {
            return Ok(vec![Row::new(Arc::from(["count".to_string()]), vec![Value::I64(2)])]);
        }
        let columns: Arc<[String]> = ["id", "name", "email", "age"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        Ok(vec![
            Row::new(
                Arc::clone(&columns),
                vec![Value::I64(1), Value::from("Alice"), Value::Null, Value::I32(30)],
            ),
            Row::new(
                columns,
                vec![
                    Value::I64(2),
                    Value::from("Bob"),
                    Value::from("bob@example.com"),
                    Value::I32(25),
                ],
            ),
        ])
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::new(PrintRunner::default(), Dialect::MySql);

    println!("=== Fjord Session Demo ===\n");

    println!("1. Load all adult users:");
    let mut users: Vec<User> = Vec::new();
    let count = select(("id", "name", "email", "age"))
        .from("users")
        .where_(("age", ">", 18))
        .load(&mut session, &mut users)
        .await?;
    println!("Loaded {count} users:");
    for user in &users {
        println!("  - {}: {} ({:?})", user.id, user.name, user.email.value());
    }

    println!("\n2. Count users:");
    let mut total = 0i64;
    select("COUNT(*)")
        .from("users")
        .load(&mut session, &mut total)
        .await?;
    println!("Total: {total}");

    println!("\n3. Insert a record and read back its id:");
    let mut user = User {
        name: "Charlie".into(),
        email: NullString::new("charlie@example.com".into()),
        age: 35,
        ..User::default()
    };
    let result = insert_into("users")
        .columns(("name", "email", "age"))
        .record(&user)
        .exec(&mut session)
        .await?;
    result.assign_id(&mut user)?;
    println!("Inserted user with id {}", user.id);

    println!("\n4. Update user:");
    let result = update("users")
        .set("age", 36)
        .where_(eq("id", user.id))
        .exec(&mut session)
        .await?;
    println!("Updated {} row(s)", result.rows_affected);

    println!("\n5. Delete inactive users:");
    let result = delete_from("users")
        .where_(("active", false))
        .exec(&mut session)
        .await?;
    println!("Deleted {} row(s)", result.rows_affected);

    Ok(())
}
