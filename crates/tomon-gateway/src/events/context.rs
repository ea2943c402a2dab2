//! Typed payload of an inbound event

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Author of a message event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Author {
    /// Display name, falling back to the username and then the id
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or(&self.id)
    }
}

/// Payload of an inbound event
///
/// Common fields are named; everything else lands in `extra` so new
/// platform fields survive decoding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    /// Online status (presence events)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EventContext {
    /// Decode a frame's data payload
    ///
    /// Named fields are decoded one by one: a field whose value has an
    /// unexpected type stays in `extra` under its own key instead of
    /// spoiling the rest. Non-object payloads are kept verbatim under
    /// `extra["data"]`.
    #[must_use]
    pub fn from_value(data: Option<Value>) -> Self {
        match data {
            None | Some(Value::Null) => Self::default(),
            Some(Value::Object(mut map)) => Self {
                id: take_field(&mut map, "id"),
                channel_id: take_field(&mut map, "channel_id"),
                guild_id: take_field(&mut map, "guild_id"),
                content: take_field(&mut map, "content"),
                nonce: take_field(&mut map, "nonce"),
                status: take_field(&mut map, "status"),
                user_id: take_field(&mut map, "user_id"),
                author: take_field(&mut map, "author"),
                extra: map,
            },
            Some(other) => {
                let mut extra = Map::new();
                extra.insert("data".to_string(), other);
                Self {
                    extra,
                    ..Self::default()
                }
            }
        }
    }

    /// Message text, if present and non-empty
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.content.as_deref().filter(|c| !c.is_empty())
    }

    /// Whether the payload carries an online status
    #[must_use]
    pub fn has_status(&self) -> bool {
        self.status.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Look up a field that is not modelled explicitly
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

/// Move `key` out of `map` if it decodes as `T`; explicit nulls are dropped
fn take_field<T: DeserializeOwned>(map: &mut Map<String, Value>, key: &str) -> Option<T> {
    let value = map.get(key)?;
    if value.is_null() {
        map.remove(key);
        return None;
    }
    let decoded = T::deserialize(value).ok()?;
    map.remove(key);
    Some(decoded)
}
