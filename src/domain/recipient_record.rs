use serde_json::Value;

/// A user record as returned by the record provider.
///
/// Only the `email` string is required. `id` is kept as whatever the provider
/// sent and `name` falls back to empty when it is missing or not a string.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipientRecord {
    pub id: Option<Value>,
    pub name: String,
    pub email: String,
}

impl RecipientRecord {
    /// Returns `None` when `value` has no `email` string.
    pub fn from_provider(value: &Value) -> Option<Self> {
        let email = value.get("email").and_then(Value::as_str)?;
        let name = value
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let id = value.get("id").filter(|id| !id.is_null()).cloned();

        Some(Self {
            id,
            name: name.to_string(),
            email: email.to_string(),
        })
    }
}
