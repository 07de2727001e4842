//! `CREATE`/`ALTER`/`DROP DATABASE` and the read-back probes.

use tfmysql_core::quote_ident_mysql;

use crate::statement::Statement;

pub const CHARACTER_SET_KEYWORD: &str = "CHARACTER SET ";
pub const COLLATE_KEYWORD: &str = "COLLATE ";

fn database_config(verb: &str, name: &str, charset: &str, collation: &str) -> Statement {
    let mut sql = format!("{} DATABASE {}", verb, quote_ident_mysql(name));
    if !charset.is_empty() {
        sql.push(' ');
        sql.push_str(CHARACTER_SET_KEYWORD);
        sql.push_str(&quote_ident_mysql(charset));
    }
    if !collation.is_empty() {
        sql.push(' ');
        sql.push_str(COLLATE_KEYWORD);
        sql.push_str(&quote_ident_mysql(collation));
    }
    Statement::new(sql)
}

/// `CREATE DATABASE`; an empty charset or collation omits that clause.
pub fn create_database(name: &str, charset: &str, collation: &str) -> Statement {
    database_config("CREATE", name, charset, collation)
}

/// `ALTER DATABASE`; an empty charset or collation omits that clause.
pub fn alter_database(name: &str, charset: &str, collation: &str) -> Statement {
    database_config("ALTER", name, charset, collation)
}

pub fn drop_database(name: &str) -> Statement {
    Statement::new(format!("DROP DATABASE {}", quote_ident_mysql(name)))
}

pub fn show_create_database(name: &str) -> Statement {
    Statement::new(format!("SHOW CREATE DATABASE {}", quote_ident_mysql(name)))
}

/// The default collation row for `charset`.
pub fn default_collation(charset: &str) -> Statement {
    Statement::new("SHOW COLLATION WHERE `Charset` = ? AND `Default` = 'Yes'").bind(charset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tfmysql_core::Value;

    #[test]
    fn test_create_database_full() {
        assert_eq!(
            create_database("t1", "latin1", "latin1_bin").sql(),
            "CREATE DATABASE `t1` CHARACTER SET `latin1` COLLATE `latin1_bin`"
        );
    }

    #[test]
    fn test_clauses_are_optional() {
        assert_eq!(create_database("t1", "", "").sql(), "CREATE DATABASE `t1`");
        assert_eq!(
            alter_database("t1", "utf8mb4", "").sql(),
            "ALTER DATABASE `t1` CHARACTER SET `utf8mb4`"
        );
        assert_eq!(
            alter_database("t1", "", "utf8mb4_bin").sql(),
            "ALTER DATABASE `t1` COLLATE `utf8mb4_bin`"
        );
    }

    #[test]
    fn test_names_are_quoted() {
        assert_eq!(drop_database("we`ird").sql(), "DROP DATABASE `we``ird`");
        assert_eq!(show_create_database("t1").sql(), "SHOW CREATE DATABASE `t1`");
    }

    #[test]
    fn test_default_collation_binds_charset() {
        let stmt = default_collation("latin1");
        assert!(stmt.sql().starts_with("SHOW COLLATION WHERE"));
        assert_eq!(stmt.params(), &[Value::from("latin1")]);
    }
}
