//! `mysql_user_password`: a server-generated password, returned encrypted.

use tfmysql_core::{Connection, Result, detect};
use tfmysql_ddl::user::set_password;

use crate::crypto::{RecipientKey, generate_password};
use crate::key::UserKey;
use crate::resource_data::ResourceData;
use crate::schema::{Attribute, AttributeType, Schema};
use crate::user::DEFAULT_HOST;

pub fn schema() -> Schema {
    Schema::new()
        .with(Attribute::required("user", AttributeType::String).force_new())
        .with(
            Attribute::optional("host", AttributeType::String)
                .default(DEFAULT_HOST)
                .force_new(),
        )
        .with(Attribute::required("public_key", AttributeType::String).force_new())
        .with(Attribute::computed("key_fingerprint", AttributeType::String))
        .with(Attribute::computed("encrypted_password", AttributeType::String))
}

/// Generate, encrypt, then apply.
///
/// The password is encrypted before the account is touched, so a bad key
/// leaves the server unchanged.
#[tracing::instrument(level = "debug", skip_all, fields(user = d.get_str("user"), host = d.get_str("host")))]
pub async fn create<C: Connection>(conn: &C, d: &mut ResourceData) -> Result<()> {
    let recipient = RecipientKey::from_pem(d.get_str("public_key"))?;
    let password = generate_password();
    let encrypted = recipient.encrypt(&password)?;

    let caps = detect(conn).await?.capabilities();
    let key = UserKey::new(d.get_str("user"), d.get_str("host"));
    set_password(&key.user, &key.host, &password, &caps)
        .execute(conn)
        .await?;

    d.set("key_fingerprint", recipient.fingerprint());
    d.set("encrypted_password", encrypted);
    d.set_id(key.to_string());
    Ok(())
}

/// The generated password cannot be read back.
pub async fn read<C: Connection>(_conn: &C, _d: &mut ResourceData) -> Result<()> {
    Ok(())
}

/// Forget the password; the account itself is left alone.
pub async fn delete<C: Connection>(_conn: &C, d: &mut ResourceData) -> Result<()> {
    d.clear_id();
    Ok(())
}
