mod common;

use common::{MockConnection, row};
use serde_json::json;
use tfmysql::{Error, Provider, ResourceData, ResourceKind};
use tfmysql_core::Value;

const SHOW_CREATE_COLUMNS: [&str; 2] = ["Database", "Create Database"];

fn config(value: serde_json::Value) -> ResourceData {
    ResourceData::from_config(&ResourceKind::Database.schema(), value).unwrap()
}

fn state(id: &str) -> ResourceData {
    ResourceData::from_state(&ResourceKind::Database.schema(), id, json!({"name": id})).unwrap()
}

#[tokio::test]
async fn create_then_reads_back_server_values() {
    let conn = MockConnection::mysql8().on_rows(
        "SHOW CREATE DATABASE",
        vec![row(
            &SHOW_CREATE_COLUMNS,
            &[
                "app",
                "CREATE DATABASE `app` /*!40100 DEFAULT CHARACTER SET utf8mb4 COLLATE utf8mb4_bin */",
            ],
        )],
    );
    let provider = Provider::new(conn);
    let mut d = config(json!({
        "name": "app",
        "default_character_set": "utf8mb4",
        "default_collation": "utf8mb4_bin",
    }));

    provider.create(ResourceKind::Database, &mut d).await.unwrap();

    assert_eq!(d.id(), Some("app"));
    assert_eq!(d.get_str("default_character_set"), "utf8mb4");
    assert_eq!(d.get_str("default_collation"), "utf8mb4_bin");
    assert_eq!(
        provider.connection().statements(),
        vec![
            "CREATE DATABASE `app` CHARACTER SET `utf8mb4` COLLATE `utf8mb4_bin`",
            "SHOW CREATE DATABASE `app`",
        ]
    );
}

#[tokio::test]
async fn create_uses_declared_defaults() {
    let provider = Provider::new(MockConnection::mysql8());
    let mut d = config(json!({"name": "t1"}));

    // No SHOW CREATE row scripted: read finds nothing and clears the id.
    provider.create(ResourceKind::Database, &mut d).await.unwrap();

    assert_eq!(
        provider.connection().statements()[0],
        "CREATE DATABASE `t1` CHARACTER SET `utf8` COLLATE `utf8_general_ci`"
    );
}

#[tokio::test]
async fn read_looks_up_default_collation_when_omitted() {
    let conn = MockConnection::mysql8()
        .on_rows(
            "SHOW CREATE DATABASE",
            vec![row(
                &SHOW_CREATE_COLUMNS,
                &["app", "CREATE DATABASE `app` /*!40100 DEFAULT CHARACTER SET latin1 */"],
            )],
        )
        .on_rows(
            "SHOW COLLATION",
            vec![row(
                &["Collation", "Charset", "Id", "Default", "Compiled", "Sortlen", "Pad_attribute"],
                &["latin1_swedish_ci", "latin1", "8", "Yes", "Yes", "1", "PAD SPACE"],
            )],
        );
    let provider = Provider::new(conn);
    let mut d = state("app");

    provider.read(ResourceKind::Database, &mut d).await.unwrap();

    assert_eq!(d.id(), Some("app"));
    assert_eq!(d.get_str("default_character_set"), "latin1");
    assert_eq!(d.get_str("default_collation"), "latin1_swedish_ci");

    let conn = provider.connection();
    assert_eq!(
        conn.statements()[1],
        "SHOW COLLATION WHERE `Charset` = ? AND `Default` = 'Yes'"
    );
    assert_eq!(conn.params(1), vec![Value::from("latin1")]);
}

#[tokio::test]
async fn read_tolerates_unexpected_collation_row_shape() {
    let conn = MockConnection::mysql57()
        .on_rows(
            "SHOW CREATE DATABASE",
            vec![row(
                &SHOW_CREATE_COLUMNS,
                &["app", "CREATE DATABASE `app` /*!40100 DEFAULT CHARACTER SET utf8 */"],
            )],
        )
        .on_rows(
            "SHOW COLLATION",
            vec![row(
                &["Collation", "Charset", "Id", "Default", "Compiled", "Sortlen", "Pad_attribute"],
                &["utf8_general_ci", "utf8", "33", "Yes", "Yes", "1", "PAD SPACE"],
            )],
        );
    let provider = Provider::new(conn);
    let mut d = state("app");

    provider.read(ResourceKind::Database, &mut d).await.unwrap();
    assert_eq!(d.get_str("default_collation"), "utf8_general_ci");
}

#[tokio::test]
async fn read_fails_when_charset_has_no_default_collation() {
    let conn = MockConnection::mysql8().on_rows(
        "SHOW CREATE DATABASE",
        vec![row(
            &SHOW_CREATE_COLUMNS,
            &["app", "CREATE DATABASE `app` /*!40100 DEFAULT CHARACTER SET weird */"],
        )],
    );
    let provider = Provider::new(conn);
    let mut d = state("app");

    let err = provider
        .read(ResourceKind::Database, &mut d)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Charset weird has no default collation"), "{err}");
}

#[tokio::test]
async fn read_clears_id_when_database_is_gone() {
    let conn = MockConnection::mysql8().on_error("SHOW CREATE DATABASE", 1049, "Unknown database 'app'");
    let provider = Provider::new(conn);
    let mut d = state("app");

    provider.read(ResourceKind::Database, &mut d).await.unwrap();
    assert_eq!(d.id(), None);
}

#[tokio::test]
async fn read_propagates_other_server_errors() {
    let conn = MockConnection::mysql8().on_error("SHOW CREATE DATABASE", 1044, "Access denied");
    let provider = Provider::new(conn);
    let mut d = state("app");

    let err = provider
        .read(ResourceKind::Database, &mut d)
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(1044));
    assert_eq!(err.sql(), Some("SHOW CREATE DATABASE `app`"));
    assert_eq!(d.id(), Some("app"));
}

#[tokio::test]
async fn update_alters_then_reads() {
    let provider = Provider::new(MockConnection::mysql8());
    let mut d = ResourceData::for_update(
        &ResourceKind::Database.schema(),
        "app",
        json!({"name": "app", "default_character_set": "utf8", "default_collation": "utf8_general_ci"}),
        json!({"name": "app", "default_character_set": "utf8mb4", "default_collation": "utf8mb4_bin"}),
    )
    .unwrap();

    provider.update(ResourceKind::Database, &mut d).await.unwrap();
    let statements = provider.connection().statements();
    assert_eq!(
        statements[0],
        "ALTER DATABASE `app` CHARACTER SET `utf8mb4` COLLATE `utf8mb4_bin`"
    );
    assert_eq!(statements[1], "SHOW CREATE DATABASE `app`");
}

#[tokio::test]
async fn delete_keeps_identity_on_failure() {
    let conn = MockConnection::mysql8().on_error("DROP DATABASE", 1010, "Error dropping database");
    let provider = Provider::new(conn);
    let mut d = state("app");

    let err = provider
        .delete(ResourceKind::Database, &mut d)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Statement(_)));
    assert_eq!(d.id(), Some("app"));

    provider.delete(ResourceKind::Database, &mut d).await.unwrap();
    assert_eq!(d.id(), None);
}

#[tokio::test]
async fn import_is_a_passthrough_read() {
    let conn = MockConnection::mysql8().on_rows(
        "SHOW CREATE DATABASE",
        vec![row(
            &SHOW_CREATE_COLUMNS,
            &["legacy", "CREATE DATABASE `legacy` /*!40100 DEFAULT CHARACTER SET latin1 COLLATE latin1_bin */"],
        )],
    );
    let provider = Provider::new(conn);

    let d = provider.import(ResourceKind::Database, "legacy").await.unwrap();
    assert_eq!(d.id(), Some("legacy"));
    assert_eq!(d.get_str("name"), "legacy");
    assert_eq!(d.get_str("default_collation"), "latin1_bin");
}
