/*
 * Responsibility
 * - introspection 結果 (IntrospectionRecord) の型
 * - 防御的デコード: 欠けている / 型が違うフィールドは既定値になり、エラーにはしない
 * - aud (string | list) の判定ヘルパ
 */
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::services::window::ValidityWindow;

/// Identity-provider introspection payload, as returned and as cached.
///
/// Every field is optional. Decoding never fails on shape: a field that is
/// missing or carries an unexpected JSON type falls back to its default, and
/// the Active/Audience gates decide what that means.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct IntrospectionRecord {
    pub active: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    // Keep as Value: a string, an array, or anything else (which never matches).
    #[serde(skip_serializing_if = "Value::is_null")]
    pub aud: Value,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    #[serde(skip_serializing_if = "Map::is_empty")]
    pub resource_access: Map<String, Value>,

    // Set only on the copy written to the cache.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_time: Option<i64>,
}

impl From<Value> for IntrospectionRecord {
    fn from(value: Value) -> Self {
        let Value::Object(mut obj) = value else {
            return Self::default();
        };

        let string = |v: Option<Value>| match v {
            Some(Value::String(s)) => Some(s),
            _ => None,
        };

        Self {
            active: obj.get("active").and_then(Value::as_bool).unwrap_or(false),
            sub: string(obj.remove("sub")),
            preferred_username: string(obj.remove("preferred_username")),
            email: string(obj.remove("email")),
            aud: obj.remove("aud").unwrap_or(Value::Null),
            iat: obj.get("iat").and_then(epoch_seconds),
            exp: obj.get("exp").and_then(epoch_seconds),
            resource_access: match obj.remove("resource_access") {
                Some(Value::Object(map)) => map,
                _ => Map::new(),
            },
            cached_time: obj.get("cached_time").and_then(epoch_seconds),
        }
    }
}

// Epoch seconds may arrive as an integer or, from some providers, a float.
fn epoch_seconds(v: &Value) -> Option<i64> {
    v.as_i64().or_else(|| v.as_f64().map(|f| f as i64))
}

impl IntrospectionRecord {
    /// Decode a cached payload. Anything unparsable becomes the default record
    /// (which then fails the Active gate).
    pub fn from_cached(raw: &str) -> Self {
        serde_json::from_str::<Value>(raw)
            .map(Self::from)
            .unwrap_or_default()
    }

    pub fn window(&self) -> Option<ValidityWindow> {
        ValidityWindow::from_claims(self.iat, self.exp)
    }

    /// `iat <= now < exp`; a missing bound means inactive.
    pub fn is_active_at(&self, now: i64) -> bool {
        self.window().is_some_and(|w| w.contains(now))
    }

    /// `aud` contains `api_name`: exact match for a string, membership for a list.
    pub fn audience_contains(&self, api_name: &str) -> bool {
        match &self.aud {
            Value::String(s) => s == api_name,
            Value::Array(arr) => arr.iter().any(|v| v.as_str() == Some(api_name)),
            // Missing claim (Null), numbers, objects, ...
            _ => false,
        }
    }

    /// `aud` as a list of strings (a single string becomes a one-element list).
    pub fn audiences(&self) -> Vec<String> {
        match &self.aud {
            Value::String(s) => vec![s.clone()],
            Value::Array(arr) => arr
                .iter()
                .filter_map(|v| v.as_str().map(str::to_owned))
                .collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn with_aud(aud: Value) -> IntrospectionRecord {
        IntrospectionRecord {
            aud,
            ..Default::default()
        }
    }

    #[test]
    fn decodes_full_payload() {
        let record = IntrospectionRecord::from(json!({
            "active": true,
            "sub": "user-123",
            "preferred_username": "testuser",
            "email": "test@example.com",
            "aud": ["api1", "api2"],
            "iat": NOW - 60,
            "exp": NOW + 600,
            "resource_access": {"client": {"roles": ["role1"]}},
            "scope": "openid"
        }));

        assert!(record.active);
        assert_eq!(record.sub.as_deref(), Some("user-123"));
        assert_eq!(record.preferred_username.as_deref(), Some("testuser"));
        assert_eq!(record.email.as_deref(), Some("test@example.com"));
        assert_eq!(record.audiences(), vec!["api1", "api2"]);
        assert_eq!(record.iat, Some(NOW - 60));
        assert_eq!(record.exp, Some(NOW + 600));
        assert_eq!(record.resource_access["client"], json!({"roles": ["role1"]}));
        assert_eq!(record.cached_time, None);
    }

    #[test]
    fn wrong_types_fall_back_to_defaults() {
        let record = IntrospectionRecord::from(json!({
            "active": "yes",
            "sub": 42,
            "iat": "yesterday",
            "exp": null,
            "resource_access": ["not", "a", "map"]
        }));

        assert!(!record.active);
        assert_eq!(record.sub, None);
        assert_eq!(record.iat, None);
        assert_eq!(record.exp, None);
        assert!(record.resource_access.is_empty());
    }

    #[test]
    fn non_object_payload_is_default() {
        assert_eq!(
            IntrospectionRecord::from(json!([1, 2, 3])),
            IntrospectionRecord::default()
        );
        assert_eq!(
            IntrospectionRecord::from_cached("not json at all"),
            IntrospectionRecord::default()
        );
    }

    #[test]
    fn cached_payload_round_trips_cached_time() {
        let record = IntrospectionRecord {
            active: true,
            sub: Some("u".into()),
            aud: json!("api-x"),
            iat: Some(NOW),
            exp: Some(NOW + 10),
            cached_time: Some(NOW),
            ..Default::default()
        };

        let raw = serde_json::to_string(&record).unwrap();
        assert_eq!(IntrospectionRecord::from_cached(&raw), record);
    }

    #[test]
    fn activity_requires_both_bounds() {
        let mut record = IntrospectionRecord {
            iat: Some(NOW - 3600),
            exp: Some(NOW + 3600),
            ..Default::default()
        };
        assert!(record.is_active_at(NOW));

        record.exp = Some(NOW - 1);
        assert!(!record.is_active_at(NOW));

        record.iat = Some(NOW + 1);
        record.exp = Some(NOW + 3600);
        assert!(!record.is_active_at(NOW));

        record.iat = None;
        assert!(!record.is_active_at(NOW));
    }

    #[test]
    fn audience_matrix() {
        assert!(with_aud(json!("api-x")).audience_contains("api-x"));
        assert!(with_aud(json!(["other", "api-x"])).audience_contains("api-x"));
        assert!(!with_aud(json!(["other"])).audience_contains("api-x"));
        assert!(!with_aud(json!("api-x-2")).audience_contains("api-x"));
        assert!(!with_aud(json!(42)).audience_contains("api-x"));
        assert!(!with_aud(Value::Null).audience_contains("api-x"));
    }

    #[test]
    fn audiences_ignore_non_string_members() {
        assert_eq!(with_aud(json!("api-x")).audiences(), vec!["api-x"]);
        assert_eq!(with_aud(json!(["a", 1, "b"])).audiences(), vec!["a", "b"]);
        assert!(with_aud(json!(42)).audiences().is_empty());
    }
}
