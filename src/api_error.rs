//! Wire error shape and normalization of handler errors.
//!
//! Every error leaving the request path, whether a coercion failure or a
//! business error returned by a controller method, is rendered as an
//! [`ApiError`]:
//!
//! ```json
//! {"id": "sms.not.found", "message": "no such message", "causedBy": {"id": "...", "message": "..."}}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error as StdError;
use std::fmt;
use std::io::Read;

/// Optional capabilities an error may expose to the normalizer.
///
/// Every method has a default, so `impl ErrorContract for MyError {}` is
/// enough to return `MyError` from a controller method. Without an explicit
/// [`id`](ErrorContract::id) the concrete type name is used.
pub trait ErrorContract: StdError + Send + Sync + 'static {
    /// Unique error class, e.g. `sms.not.found`
    fn id(&self) -> Option<String> {
        None
    }

    /// Message suitable for end users
    fn localized_message(&self) -> Option<String> {
        None
    }

    /// Technical type reported in the `type` field
    fn class(&self) -> Option<String> {
        None
    }

    /// Arbitrary structured payload
    fn payload(&self) -> Option<Value> {
        None
    }

    /// Next error in the unwrap chain. Falls back to [`StdError::source`]
    /// when `None`.
    fn unwrap_cause(&self) -> Option<&dyn ErrorContract> {
        None
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Already-normalized errors pass through unchanged.
    fn as_api_error(&self) -> Option<&ApiError> {
        None
    }
}

/// A (nested) server error as sent over the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localized_message: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caused_by: Option<Box<ApiError>>,
}

impl ApiError {
    pub fn new(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_cause(mut self, cause: ApiError) -> Self {
        self.caused_by = Some(Box::new(cause));
        self
    }

    #[must_use]
    pub fn with_localized_message(mut self, message: impl Into<String>) -> Self {
        self.localized_message = Some(message.into());
        self
    }

    #[must_use]
    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// This error followed by its causes, outermost first.
    pub fn chain(&self) -> impl Iterator<Item = &ApiError> {
        std::iter::successors(Some(self), |e| e.caused_by.as_deref())
    }

    /// Capture an error and its unwrap chain into the wire shape.
    #[must_use]
    pub fn normalize(err: &dyn ErrorContract) -> ApiError {
        if let Some(api) = err.as_api_error() {
            return api.clone();
        }

        let type_name = err.type_name().to_string();
        let caused_by = match err.unwrap_cause() {
            Some(cause) => Some(Self::normalize(cause)),
            None => err.source().map(Self::from_std),
        };

        ApiError {
            id: err.id().unwrap_or_else(|| type_name.clone()),
            message: err.to_string(),
            localized_message: err.localized_message(),
            type_name: Some(err.class().unwrap_or(type_name)),
            details: err.payload(),
            caused_by: caused_by.map(Box::new),
        }
    }

    /// Capture a plain [`std::error::Error`] chain. The concrete type of a
    /// `dyn Error` is not observable, so these levels carry the id `error`.
    #[must_use]
    pub fn from_std(err: &(dyn StdError + 'static)) -> ApiError {
        if let Some(api) = err.downcast_ref::<ApiError>() {
            return api.clone();
        }
        ApiError {
            id: "error".to_string(),
            message: err.to_string(),
            caused_by: err.source().map(|s| Box::new(Self::from_std(s))),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn from_anyhow(err: &anyhow::Error) -> ApiError {
        if let Some(api) = err.downcast_ref::<ApiError>() {
            return api.clone();
        }
        let root: &(dyn StdError + 'static) = err.as_ref();
        Self::from_std(root)
    }

    /// Read a serialized error. Never fails: an unreadable body yields the
    /// normalized read/parse failure instead.
    pub fn parse(mut reader: impl Read) -> ApiError {
        let mut buf = Vec::new();
        if let Err(err) = reader.read_to_end(&mut buf) {
            return Self::normalize(&IoFailure(err));
        }
        match serde_json::from_slice(&buf) {
            Ok(parsed) => parsed,
            Err(err) => Self::normalize(&ParseFailure(err)),
        }
    }

    /// Serialized body. Falls back to a plain-text notice if encoding fails.
    #[must_use]
    pub fn to_json_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_else(|err| {
            format!("suppressed error by: {err}").into_bytes()
        })
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for ApiError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.caused_by
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

impl ErrorContract for ApiError {
    fn id(&self) -> Option<String> {
        Some(self.id.clone())
    }

    fn localized_message(&self) -> Option<String> {
        self.localized_message.clone()
    }

    fn class(&self) -> Option<String> {
        self.type_name.clone()
    }

    fn payload(&self) -> Option<Value> {
        self.details.clone()
    }

    fn unwrap_cause(&self) -> Option<&dyn ErrorContract> {
        self.caused_by.as_deref().map(|e| e as &dyn ErrorContract)
    }

    fn as_api_error(&self) -> Option<&ApiError> {
        Some(self)
    }
}

#[derive(Debug)]
struct IoFailure(std::io::Error);

impl fmt::Display for IoFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to read error body: {}", self.0)
    }
}

impl StdError for IoFailure {}

impl ErrorContract for IoFailure {
    fn id(&self) -> Option<String> {
        Some("error.body.unreadable".to_string())
    }
}

#[derive(Debug)]
struct ParseFailure(serde_json::Error);

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse error body: {}", self.0)
    }
}

impl StdError for ParseFailure {}

impl ErrorContract for ParseFailure {
    fn id(&self) -> Option<String> {
        Some("error.body.malformed".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug)]
    struct NotFound {
        sms: u64,
        cause: Option<Box<NotFound>>,
    }

    impl fmt::Display for NotFound {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "sms {} not found", self.sms)
        }
    }

    impl StdError for NotFound {}

    impl ErrorContract for NotFound {
        fn id(&self) -> Option<String> {
            Some(format!("sms.not.found.{}", self.sms))
        }

        fn localized_message(&self) -> Option<String> {
            Some("Nachricht nicht gefunden".to_string())
        }

        fn payload(&self) -> Option<Value> {
            Some(json!({ "sms": self.sms }))
        }

        fn unwrap_cause(&self) -> Option<&dyn ErrorContract> {
            self.cause.as_deref().map(|c| c as &dyn ErrorContract)
        }
    }

    #[derive(Debug)]
    struct Plain;

    impl fmt::Display for Plain {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("plain failure")
        }
    }

    impl StdError for Plain {}
    impl ErrorContract for Plain {}

    #[test]
    fn test_id_defaults_to_type_name() {
        let api = ApiError::normalize(&Plain);
        assert!(api.id.ends_with("Plain"), "{}", api.id);
        assert_eq!(api.type_name.as_deref(), Some(api.id.as_str()));
        assert_eq!(api.message, "plain failure");
        assert!(api.caused_by.is_none());
    }

    #[test]
    fn test_capabilities_are_captured() {
        let err = NotFound {
            sms: 7,
            cause: Some(Box::new(NotFound { sms: 8, cause: None })),
        };
        let api = ApiError::normalize(&err);
        assert_eq!(api.id, "sms.not.found.7");
        assert_eq!(api.localized_message.as_deref(), Some("Nachricht nicht gefunden"));
        assert_eq!(api.details, Some(json!({ "sms": 7 })));
        assert_eq!(api.caused_by.unwrap().id, "sms.not.found.8");
    }

    #[test]
    fn test_unwrap_cause_through_trait_object() {
        let err = NotFound {
            sms: 1,
            cause: Some(Box::new(NotFound { sms: 2, cause: None })),
        };
        let contract: &dyn ErrorContract = &err;
        let next = contract.unwrap_cause().unwrap();
        assert_eq!(next.id().as_deref(), Some("sms.not.found.2"));
        assert!(next.unwrap_cause().is_none());

        let api = ApiError::normalize(contract);
        let inner: &dyn ErrorContract = &api;
        assert_eq!(inner.unwrap_cause().unwrap().to_string(), "sms 2 not found");
    }

    #[test]
    fn test_nested_chain_round_trip() {
        let k = 4;
        let mut err = NotFound { sms: 0, cause: None };
        for level in 1..k {
            err = NotFound {
                sms: level,
                cause: Some(Box::new(err)),
            };
        }

        let api = ApiError::normalize(&err);
        let bytes = api.to_json_bytes();
        let parsed = ApiError::parse(bytes.as_slice());
        let renormalized = ApiError::normalize(&parsed);

        let levels: Vec<(String, String)> = renormalized
            .chain()
            .map(|e| (e.id.clone(), e.message.clone()))
            .collect();
        assert_eq!(levels.len(), k as usize);
        for (i, (id, message)) in levels.iter().enumerate() {
            let sms = k as usize - 1 - i;
            assert_eq!(id, &format!("sms.not.found.{sms}"));
            assert_eq!(message, &format!("sms {sms} not found"));
        }
        assert_eq!(renormalized, api);
    }

    #[test]
    fn test_wire_field_names() {
        let api = ApiError::new("a", "outer")
            .with_type("Outer")
            .with_cause(ApiError::new("b", "inner").with_localized_message("innen"));
        let value = serde_json::to_value(&api).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "a",
                "message": "outer",
                "type": "Outer",
                "causedBy": { "id": "b", "message": "inner", "localizedMessage": "innen" }
            })
        );
    }

    #[test]
    fn test_parse_failure_is_an_error_too() {
        let api = ApiError::parse("not json".as_bytes());
        assert_eq!(api.id, "error.body.malformed");
        assert!(api.message.starts_with("failed to parse error body"));
    }

    #[test]
    fn test_anyhow_chain() {
        let err = anyhow::Error::new(std::io::Error::other("disk gone")).context("saving sms");
        let api = ApiError::from_anyhow(&err);
        assert_eq!(api.message, "saving sms");
        assert_eq!(api.caused_by.unwrap().message, "disk gone");
    }
}
