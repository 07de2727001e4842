//! SQL identifier quoting and `SHOW` output text utilities.
//!
//! Identifiers are always backtick-quoted; string literals embedded in
//! DDL/DCL (user names, hosts, passwords, role names) are single-quoted.
//! No other escaping mechanism is used for identifiers.

/// Quote a SQL identifier using MySQL backtick quoting.
///
/// Embedded backticks are escaped by doubling them (`` ` `` → ``` `` ```).
///
/// # Examples
///
/// ```
/// use tfmysql_core::quote_ident_mysql;
///
/// assert_eq!(quote_ident_mysql("users"), "`users`");
/// assert_eq!(quote_ident_mysql("user`name"), "`user``name`");
/// ```
#[inline]
pub fn quote_ident_mysql(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Quote a string literal for direct interpolation into a statement.
///
/// Single quotes are doubled and backslashes escaped, so the result is
/// safe under both the default SQL mode and `NO_BACKSLASH_ESCAPES`
/// for the backslash-free inputs that mode would see.
///
/// ```
/// use tfmysql_core::quote_literal;
///
/// assert_eq!(quote_literal("jdoe"), "'jdoe'");
/// assert_eq!(quote_literal("o'brien"), "'o''brien'");
/// ```
#[inline]
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
}

/// Format a database name as a grant target.
///
/// `*` is the grant wildcard, not an identifier, and names the caller
/// already wrapped in backticks are passed through untouched.
///
/// ```
/// use tfmysql_core::format_database_name;
///
/// assert_eq!(format_database_name("*"), "*");
/// assert_eq!(format_database_name("foo"), "`foo`");
/// assert_eq!(format_database_name("`foo`"), "`foo`");
/// ```
pub fn format_database_name(database: &str) -> String {
    if database == "*" || (database.len() >= 2 && database.starts_with('`') && database.ends_with('`'))
    {
        database.to_string()
    } else {
        quote_ident_mysql(database)
    }
}

/// Render each item through `render` and join with `", "`.
///
/// Used for privilege lists (`SELECT, UPDATE`) and role lists
/// (`'reader', 'writer'`).
pub fn flatten_list<I, S, F>(items: I, render: F) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    F: Fn(&str) -> String,
{
    items
        .into_iter()
        .map(|item| render(item.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Take the whitespace-delimited token following `keyword` in `sql`.
///
/// Returns an empty string when the keyword does not occur, which callers
/// treat as "server omitted this clause".
///
/// ```
/// use tfmysql_core::extract_ident_after;
///
/// let ddl = "CREATE DATABASE `x` CHARACTER SET utf8 COLLATE utf8_bin";
/// assert_eq!(extract_ident_after(ddl, "CHARACTER SET "), "utf8");
/// assert_eq!(extract_ident_after(ddl, "COLLATE "), "utf8_bin");
/// ```
pub fn extract_ident_after<'a>(sql: &'a str, keyword: &str) -> &'a str {
    match sql.find(keyword) {
        Some(index) => {
            let remain = &sql[index + keyword.len()..];
            let end = remain.find(char::is_whitespace).unwrap_or(remain.len());
            &remain[..end]
        }
        None => "",
    }
}
