//! Column naming rules shared by the builders and the record mapper

/// `u.id` → `u__id`
pub fn column_name_to_alias(column: &str) -> String {
    column.replace('.', "__")
}

/// Convert a `CamelCase` name to `snake_case`.
///
/// An underscore goes after character `i` when the next character is
/// uppercase and either `i` is lowercase or a digit, or the character after
/// next is lowercase. So `IsID` → `is_id`, `XMLName` → `xml_name`.
pub fn camel_case_to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    let len = chars.len();

    for i in 0..len {
        out.extend(chars[i].to_lowercase());
        if i + 1 < len
            && chars[i + 1].is_uppercase()
            && (chars[i].is_lowercase()
                || chars[i].is_numeric()
                || (i + 2 < len && chars[i + 2].is_lowercase()))
        {
            out.push('_');
        }
    }

    out
}

/// Resolve a field's column name from its `db` tag.
///
/// Returns `None` for fields tagged `"-"`. Dotted tags keep only the part
/// after the first dot when `ignore_prefix` is set, otherwise they are
/// folded into an alias.
pub fn column_name(field: &str, tag: Option<&str>, ignore_prefix: bool) -> Option<String> {
    match tag {
        Some("-") => None,
        None | Some("") => Some(camel_case_to_snake_case(field.trim_start_matches("r#"))),
        Some(tag) if tag.contains('.') => {
            if ignore_prefix {
                tag.split('.').nth(1).map(str::to_string)
            } else {
                Some(column_name_to_alias(tag))
            }
        }
        Some(tag) => Some(tag.to_string()),
    }
}
