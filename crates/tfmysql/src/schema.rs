//! Attribute schemas for resources and data sources.
//!
//! A [`Schema`] lists the attributes a resource accepts and how the host
//! should treat them. Validation here covers what the reconcilers rely on:
//! required fields, attribute types, and conflicting attributes.

use serde_json::{Map, Value as Json};
use tfmysql_core::{Error, Result};

/// Attribute value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    String,
    Bool,
    Int,
    /// Unordered, de-duplicated strings
    Set,
    /// Ordered strings
    List,
}

impl AttributeType {
    fn accepts(self, value: &Json) -> bool {
        match self {
            AttributeType::String => value.is_string(),
            AttributeType::Bool => value.is_boolean(),
            AttributeType::Int => value.is_i64() || value.is_u64(),
            AttributeType::Set | AttributeType::List => value
                .as_array()
                .is_some_and(|items| items.iter().all(Json::is_string)),
        }
    }

    fn name(self) -> &'static str {
        match self {
            AttributeType::String => "string",
            AttributeType::Bool => "bool",
            AttributeType::Int => "int",
            AttributeType::Set => "set of strings",
            AttributeType::List => "list of strings",
        }
    }
}

/// One attribute declaration.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: &'static str,
    pub ty: AttributeType,
    pub required: bool,
    pub computed: bool,
    pub sensitive: bool,
    /// Changing the value replaces the object
    pub force_new: bool,
    pub default: Option<Json>,
    pub conflicts_with: &'static [&'static str],
    pub deprecated: Option<&'static str>,
}

impl Attribute {
    fn new(name: &'static str, ty: AttributeType) -> Self {
        Self {
            name,
            ty,
            required: false,
            computed: false,
            sensitive: false,
            force_new: false,
            default: None,
            conflicts_with: &[],
            deprecated: None,
        }
    }

    pub fn required(name: &'static str, ty: AttributeType) -> Self {
        Self {
            required: true,
            ..Self::new(name, ty)
        }
    }

    pub fn optional(name: &'static str, ty: AttributeType) -> Self {
        Self::new(name, ty)
    }

    pub fn computed(name: &'static str, ty: AttributeType) -> Self {
        Self {
            computed: true,
            ..Self::new(name, ty)
        }
    }

    pub fn default(mut self, value: impl Into<Json>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn conflicts_with(mut self, names: &'static [&'static str]) -> Self {
        self.conflicts_with = names;
        self
    }

    pub fn deprecated(mut self, message: &'static str) -> Self {
        self.deprecated = Some(message);
        self
    }
}

/// The attribute set of one resource or data source.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    attributes: Vec<Attribute>,
}

/// A value counts as configured when it is present and not JSON `null`.
pub(crate) fn is_set(value: Option<&Json>) -> bool {
    value.is_some_and(|v| !v.is_null())
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter()
    }

    /// Check explicitly configured values; defaults are not yet applied.
    pub fn validate(&self, config: &Map<String, Json>) -> Result<()> {
        for key in config.keys() {
            if self.attribute(key).is_none() {
                return Err(Error::config(key.as_str(), "unknown attribute"));
            }
        }

        for attr in &self.attributes {
            let value = config.get(attr.name);
            if attr.required && !is_set(value) {
                return Err(Error::config(attr.name, "required attribute is not set"));
            }
            let Some(value) = value.filter(|v| !v.is_null()) else {
                continue;
            };
            if !attr.ty.accepts(value) {
                return Err(Error::config(attr.name, format!("expected {}", attr.ty.name())));
            }
            if let Some(message) = attr.deprecated {
                tracing::warn!(attribute = attr.name, "{}", message);
            }
            for other in attr.conflicts_with {
                if is_set(config.get(*other)) {
                    return Err(Error::config(
                        attr.name,
                        format!("conflicts with {other}"),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Fill unset attributes with their declared defaults.
    pub fn apply_defaults(&self, attrs: &mut Map<String, Json>) {
        for attr in &self.attributes {
            if let Some(default) = &attr.default {
                if !is_set(attrs.get(attr.name)) {
                    attrs.insert(attr.name.to_string(), default.clone());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new()
            .with(Attribute::required("user", AttributeType::String).force_new())
            .with(
                Attribute::optional("host", AttributeType::String)
                    .default("localhost")
                    .conflicts_with(&["role"]),
            )
            .with(Attribute::optional("role", AttributeType::String).conflicts_with(&["host"]))
            .with(Attribute::optional("grant", AttributeType::Bool).default(false))
            .with(Attribute::optional("privileges", AttributeType::Set))
            .with(
                Attribute::optional("password", AttributeType::String)
                    .sensitive()
                    .deprecated("Please use plaintext_password instead"),
            )
    }

    fn map(value: Json) -> Map<String, Json> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_required_attribute() {
        let err = schema().validate(&map(json!({}))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: user: required attribute is not set"
        );
        assert!(schema().validate(&map(json!({"user": "jdoe"}))).is_ok());
    }

    #[test]
    fn test_conflicts_only_consider_configured_values() {
        // host has a default, but only an explicit host conflicts with role
        assert!(
            schema()
                .validate(&map(json!({"user": "u", "role": "r"})))
                .is_ok()
        );
        let err = schema()
            .validate(&map(json!({"user": "u", "role": "r", "host": "%"})))
            .unwrap_err();
        assert!(err.to_string().contains("conflicts with"));
    }

    #[test]
    fn test_type_checks() {
        let err = schema()
            .validate(&map(json!({"user": "u", "grant": "yes"})))
            .unwrap_err();
        assert!(err.to_string().contains("grant: expected bool"));

        let err = schema()
            .validate(&map(json!({"user": "u", "privileges": ["SELECT", 1]})))
            .unwrap_err();
        assert!(err.to_string().contains("privileges"));
    }

    #[test]
    fn test_unknown_attribute() {
        let err = schema()
            .validate(&map(json!({"user": "u", "colour": "blue"})))
            .unwrap_err();
        assert!(err.to_string().contains("colour: unknown attribute"));
    }

    #[test]
    fn test_null_counts_as_unset() {
        assert!(
            schema()
                .validate(&map(json!({"user": "u", "role": null, "host": "%"})))
                .is_ok()
        );
    }

    #[test]
    fn test_apply_defaults() {
        let mut attrs = map(json!({"user": "u", "host": null}));
        schema().apply_defaults(&mut attrs);
        assert_eq!(attrs["host"], json!("localhost"));
        assert_eq!(attrs["grant"], json!(false));
        assert!(attrs.get("role").is_none());
    }

    #[test]
    fn test_attribute_flags() {
        let s = schema();
        assert!(s.attribute("user").unwrap().force_new);
        assert!(s.attribute("password").unwrap().sensitive);
        assert!(s.attribute("password").unwrap().deprecated.is_some());
        assert!(s.attribute("missing").is_none());
    }
}
