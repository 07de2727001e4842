//! Account statements: `CREATE USER`, password changes, `DROP USER`.

use std::sync::OnceLock;

use regex::Regex;
use tfmysql_core::{Capabilities, Error, Feature, Result, quote_literal};

use crate::principal::Principal;
use crate::statement::{REDACTED, Statement};

pub const AWS_AUTH_PLUGIN: &str = "AWSAuthenticationPlugin";
pub const NO_LOGIN_PLUGIN: &str = "mysql_no_login";

fn plugin_name_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9_]+$").ok())
        .as_ref()
}

/// How a new account authenticates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authentication<'a> {
    /// No credential configured
    None,
    /// `IDENTIFIED BY '<password>'`
    Password(&'a str),
    /// `IDENTIFIED WITH <plugin> [AS '<auth string>']`
    Plugin {
        name: &'a str,
        auth_string: Option<&'a str>,
    },
}

/// Inputs for `CREATE USER`.
#[derive(Debug, Clone, Copy)]
pub struct NewUser<'a> {
    pub user: &'a str,
    pub host: &'a str,
    pub auth: Authentication<'a>,
    pub tls_option: &'a str,
}

fn account(user: &str, host: &str) -> String {
    Principal::user(user, host).to_sql()
}

fn identified_with(name: &str, auth_string: Option<&str>, host: &str) -> Result<String> {
    match name {
        AWS_AUTH_PLUGIN => {
            if host == "localhost" {
                return Err(Error::config(
                    "auth_plugin",
                    "cannot use IAM auth against localhost",
                ));
            }
            Ok(format!(" IDENTIFIED WITH {AWS_AUTH_PLUGIN} AS 'RDS'"))
        }
        NO_LOGIN_PLUGIN => Ok(format!(" IDENTIFIED WITH {NO_LOGIN_PLUGIN}")),
        other => {
            if !plugin_name_pattern().is_some_and(|re| re.is_match(other)) {
                return Err(Error::config(
                    "auth_plugin",
                    format!("'{other}' is not a valid authentication plugin name"),
                ));
            }
            Ok(match auth_string.filter(|s| !s.is_empty()) {
                Some(hash) => format!(" IDENTIFIED WITH {} AS {}", other, quote_literal(hash)),
                None => format!(" IDENTIFIED WITH {other}"),
            })
        }
    }
}

/// `CREATE USER`, shaped for the connected server.
///
/// `REQUIRE` is only emitted where the server accepts it on `CREATE USER`;
/// an empty `IDENTIFIED BY ''` is only emitted where the server still
/// insists on an explicit password clause.
pub fn create_user(new: &NewUser<'_>, caps: &Capabilities) -> Result<Statement> {
    let head = format!("CREATE USER {}", account(new.user, new.host));

    let (clause, redacted_clause) = match new.auth {
        Authentication::Plugin { name, auth_string } => {
            let clause = identified_with(name, auth_string, new.host)?;
            let redacted = match auth_string.filter(|s| !s.is_empty()) {
                Some(hash) => clause.replace(&quote_literal(hash), REDACTED),
                None => clause.clone(),
            };
            (clause, redacted)
        }
        Authentication::Password(password) if !password.is_empty() => (
            format!(" IDENTIFIED BY {}", quote_literal(password)),
            format!(" IDENTIFIED BY {REDACTED}"),
        ),
        Authentication::Password(_) | Authentication::None => {
            if caps.supports(Feature::ExplicitPassword) {
                (" IDENTIFIED BY ''".to_string(), " IDENTIFIED BY ''".to_string())
            } else {
                (String::new(), String::new())
            }
        }
    };

    let tls = if caps.supports(Feature::TlsOption) && !new.tls_option.is_empty() {
        format!(" REQUIRE {}", new.tls_option)
    } else {
        String::new()
    };

    Ok(Statement::sensitive(
        format!("{head}{clause}{tls}"),
        format!("{head}{redacted_clause}{tls}"),
    ))
}

/// Change an existing account's password.
///
/// Uses `ALTER USER ... IDENTIFIED BY` where the server has it, and the
/// older `SET PASSWORD ... = PASSWORD(...)` form otherwise.
pub fn set_password(user: &str, host: &str, password: &str, caps: &Capabilities) -> Statement {
    let target = account(user, host);
    let secret = quote_literal(password);
    if caps.supports(Feature::AlterUserPassword) {
        Statement::sensitive(
            format!("ALTER USER {target} IDENTIFIED BY {secret}"),
            format!("ALTER USER {target} IDENTIFIED BY {REDACTED}"),
        )
    } else {
        Statement::sensitive(
            format!("SET PASSWORD FOR {target} = PASSWORD({secret})"),
            format!("SET PASSWORD FOR {target} = PASSWORD({REDACTED})"),
        )
    }
}

/// `ALTER USER ... REQUIRE <tls-option>`.
pub fn alter_user_tls(user: &str, host: &str, tls_option: &str) -> Statement {
    Statement::new(format!(
        "ALTER USER {} REQUIRE {}",
        account(user, host),
        tls_option
    ))
}

pub fn drop_user(user: &str, host: &str) -> Statement {
    Statement::new(format!("DROP USER {}", account(user, host)))
}

/// Existence probe against `mysql.user`.
pub fn user_exists(user: &str, host: &str) -> Statement {
    Statement::new("SELECT USER FROM mysql.user WHERE USER = ? AND HOST = ?")
        .bind(user)
        .bind(host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tfmysql_core::{ServerIdentity, Value};

    fn caps(raw: &str) -> Capabilities {
        ServerIdentity::parse(raw).unwrap().capabilities()
    }

    fn new_user<'a>(auth: Authentication<'a>, host: &'a str) -> NewUser<'a> {
        NewUser {
            user: "jdoe",
            host,
            auth,
            tls_option: "NONE",
        }
    }

    #[test]
    fn test_create_user_with_password_mysql8() {
        let stmt = create_user(
            &new_user(Authentication::Password("s3cr3t"), "example.com"),
            &caps("8.0.34"),
        )
        .unwrap();
        assert_eq!(
            stmt.sql(),
            "CREATE USER 'jdoe'@'example.com' IDENTIFIED BY 's3cr3t' REQUIRE NONE"
        );
        assert_eq!(
            stmt.display_sql(),
            "CREATE USER 'jdoe'@'example.com' IDENTIFIED BY '******' REQUIRE NONE"
        );
    }

    #[test]
    fn test_create_user_without_tls_support() {
        let stmt = create_user(
            &new_user(Authentication::Password("pw"), "%"),
            &caps("5.6.51"),
        )
        .unwrap();
        assert_eq!(stmt.sql(), "CREATE USER 'jdoe'@'%' IDENTIFIED BY 'pw'");
    }

    #[test]
    fn test_create_user_empty_password_depends_on_server() {
        let legacy = create_user(&new_user(Authentication::None, "%"), &caps("5.7.44")).unwrap();
        assert_eq!(
            legacy.sql(),
            "CREATE USER 'jdoe'@'%' IDENTIFIED BY '' REQUIRE NONE"
        );

        let modern = create_user(&new_user(Authentication::Password(""), "%"), &caps("8.0.34")).unwrap();
        assert_eq!(modern.sql(), "CREATE USER 'jdoe'@'%' REQUIRE NONE");

        let maria = create_user(&new_user(Authentication::None, "%"), &caps("10.6.12-MariaDB")).unwrap();
        assert_eq!(maria.sql(), "CREATE USER 'jdoe'@'%' IDENTIFIED BY '' REQUIRE NONE");
    }

    #[test]
    fn test_create_user_aws_plugin() {
        let auth = Authentication::Plugin {
            name: AWS_AUTH_PLUGIN,
            auth_string: None,
        };
        let stmt = create_user(&new_user(auth, "%"), &caps("8.0.34")).unwrap();
        assert_eq!(
            stmt.sql(),
            "CREATE USER 'jdoe'@'%' IDENTIFIED WITH AWSAuthenticationPlugin AS 'RDS' REQUIRE NONE"
        );

        let err = create_user(&new_user(auth, "localhost"), &caps("8.0.34")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: auth_plugin: cannot use IAM auth against localhost"
        );
    }

    #[test]
    fn test_create_user_no_login_plugin() {
        let auth = Authentication::Plugin {
            name: NO_LOGIN_PLUGIN,
            auth_string: None,
        };
        let stmt = create_user(&new_user(auth, "localhost"), &caps("5.6.51")).unwrap();
        assert_eq!(stmt.sql(), "CREATE USER 'jdoe'@'localhost' IDENTIFIED WITH mysql_no_login");
    }

    #[test]
    fn test_create_user_generic_plugin_with_hash() {
        let auth = Authentication::Plugin {
            name: "mysql_native_password",
            auth_string: Some("*6C8989366EAF75BB670AD8EA7A7FC1176A95CEF4"),
        };
        let stmt = create_user(&new_user(auth, "%"), &caps("8.0.34")).unwrap();
        assert_eq!(
            stmt.sql(),
            "CREATE USER 'jdoe'@'%' IDENTIFIED WITH mysql_native_password AS '*6C8989366EAF75BB670AD8EA7A7FC1176A95CEF4' REQUIRE NONE"
        );
        assert!(!stmt.display_sql().contains("6C8989"));
    }

    #[test]
    fn test_create_user_rejects_bad_plugin_name() {
        let auth = Authentication::Plugin {
            name: "x; DROP TABLE t",
            auth_string: None,
        };
        let err = create_user(&new_user(auth, "%"), &caps("8.0.34")).unwrap_err();
        assert!(err.to_string().contains("auth_plugin"));
    }

    #[test]
    fn test_set_password_syntax_by_version() {
        let old = set_password("jdoe", "%", "pw", &caps("5.7.5"));
        assert_eq!(old.sql(), "SET PASSWORD FOR 'jdoe'@'%' = PASSWORD('pw')");
        assert_eq!(old.display_sql(), "SET PASSWORD FOR 'jdoe'@'%' = PASSWORD('******')");

        let new = set_password("jdoe", "%", "pw", &caps("5.7.6"));
        assert_eq!(new.sql(), "ALTER USER 'jdoe'@'%' IDENTIFIED BY 'pw'");

        let maria_old = set_password("jdoe", "%", "pw", &caps("10.1.48-MariaDB"));
        assert!(maria_old.sql().starts_with("SET PASSWORD"));
    }

    #[test]
    fn test_password_is_escaped() {
        let stmt = set_password("jdoe", "%", "it's\\", &caps("8.0.34"));
        assert_eq!(stmt.sql(), "ALTER USER 'jdoe'@'%' IDENTIFIED BY 'it''s\\\\'");
    }

    #[test]
    fn test_alter_tls_drop_and_probe() {
        assert_eq!(
            alter_user_tls("jdoe", "%", "SSL").sql(),
            "ALTER USER 'jdoe'@'%' REQUIRE SSL"
        );
        assert_eq!(drop_user("jdoe", "%").sql(), "DROP USER 'jdoe'@'%'");

        let probe = user_exists("jdoe", "%");
        assert_eq!(probe.params(), &[Value::from("jdoe"), Value::from("%")]);
    }
}
