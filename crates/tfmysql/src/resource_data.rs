//! Typed access to a resource's identity and attributes.

use serde_json::{Map, Value as Json};
use tfmysql_core::{Error, Result};

use crate::schema::{Schema, is_set};

/// Identity plus attribute map of one resource instance.
///
/// Getters follow the host's zero-value convention: an unset string reads
/// as `""`, an unset bool as `false`, an unset set as empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceData {
    id: Option<String>,
    attrs: Map<String, Json>,
    prior: Option<Map<String, Json>>,
}

fn into_object(value: Json, what: &str) -> Result<Map<String, Json>> {
    match value {
        Json::Object(map) => Ok(map),
        Json::Null => Ok(Map::new()),
        other => Err(Error::unsupported(format!(
            "{what} must be an object, got {other}"
        ))),
    }
}

impl ResourceData {
    /// New instance from configuration; validated, defaults applied, no id.
    pub fn from_config(schema: &Schema, config: Json) -> Result<Self> {
        let mut attrs = into_object(config, "configuration")?;
        schema.validate(&attrs)?;
        schema.apply_defaults(&mut attrs);
        Ok(Self {
            id: None,
            attrs,
            prior: None,
        })
    }

    /// Existing instance from persisted state.
    pub fn from_state(schema: &Schema, id: impl Into<String>, state: Json) -> Result<Self> {
        let mut attrs = into_object(state, "state")?;
        schema.apply_defaults(&mut attrs);
        Ok(Self {
            id: Some(id.into()),
            attrs,
            prior: None,
        })
    }

    /// Existing instance moving from `prior` state to a new configuration.
    pub fn for_update(
        schema: &Schema,
        id: impl Into<String>,
        prior: Json,
        config: Json,
    ) -> Result<Self> {
        let mut prior = into_object(prior, "state")?;
        schema.apply_defaults(&mut prior);
        let mut data = Self::from_config(schema, config)?;
        data.id = Some(id.into());
        data.prior = Some(prior);
        Ok(data)
    }

    /// Instance known only by an imported identity.
    pub fn for_import(schema: &Schema, id: impl Into<String>) -> Self {
        let mut attrs = Map::new();
        schema.apply_defaults(&mut attrs);
        Self {
            id: Some(id.into()),
            attrs,
            prior: None,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// Mark the object as gone; the host drops it from state.
    pub fn clear_id(&mut self) {
        self.id = None;
    }

    pub fn get(&self, key: &str) -> Option<&Json> {
        self.attrs.get(key).filter(|v| !v.is_null())
    }

    pub fn get_str(&self, key: &str) -> &str {
        self.get(key).and_then(Json::as_str).unwrap_or_default()
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key).and_then(Json::as_bool).unwrap_or(false)
    }

    /// Set members, sorted and de-duplicated.
    pub fn get_set(&self, key: &str) -> Vec<String> {
        let mut items = self.get_list(key);
        items.sort();
        items.dedup();
        items
    }

    pub fn get_list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .and_then(Json::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Json::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn set(&mut self, key: &str, value: impl Into<Json>) {
        self.attrs.insert(key.to_string(), value.into());
    }

    /// Did `key` change between the prior state and this configuration?
    ///
    /// Without a prior state every configured attribute counts as changed.
    pub fn has_change(&self, key: &str) -> bool {
        match &self.prior {
            Some(prior) => {
                let before = prior.get(key).filter(|v| !v.is_null());
                before != self.get(key)
            }
            None => is_set(self.attrs.get(key)),
        }
    }

    /// Prior and current value of `key`.
    pub fn get_change(&self, key: &str) -> (Option<&Json>, Option<&Json>) {
        let before = self
            .prior
            .as_ref()
            .and_then(|p| p.get(key))
            .filter(|v| !v.is_null());
        (before, self.get(key))
    }

    /// Attribute map as a JSON object.
    pub fn state(&self) -> Json {
        Json::Object(self.attrs.clone())
    }
}
