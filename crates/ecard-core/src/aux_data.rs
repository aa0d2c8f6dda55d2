//! Auxiliary data passed from add-ons to bindings.
//!
//! Auxiliary data is an open side channel: while processing one request an
//! add-on attaches entries that are not part of the response payload, and the
//! binding reads them when shaping the outgoing response. The channel itself is
//! a string-keyed map ([`AuxDataMap`]); the keys in [`keys`] give some entries
//! a meaning shared by all bindings and add-ons.
//!
//! Because the well-known key set is closed, the well-known entries are held in
//! typed fields of [`AuxData`]. Only keys contributed by third-party add-ons end
//! up in its open extension map.
//!
//! # Handoff
//!
//! [`AuxDataBuilder`] is filled while the request is processed and consumed by
//! [`AuxDataBuilder::build`]. The resulting [`AuxData`] has no mutators, so the
//! binding can never observe a half-written value.
//!
//! ```rust
//! use ecard_core::aux_data::{AuxData, keys};
//!
//! let aux = AuxData::builder()
//!     .redirect_location("https://service.example/refresh?ResultMajor=ok")
//!     .response_header("X-Session", "42")
//!     .build();
//!
//! assert_eq!(aux.redirect_location(), Some("https://service.example/refresh?ResultMajor=ok"));
//! assert!(aux.to_map().contains_key(keys::REDIRECT_LOCATION));
//! ```

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{AuxDataError, AuxDataResult};

/// The open, string-keyed form of auxiliary data.
pub type AuxDataMap = HashMap<String, Value>;

/// Well-known auxiliary data keys.
///
/// All keys share [`PREFIX`](keys::PREFIX). The values are part of the
/// contract between bindings and add-ons and must never change.
pub mod keys {
    /// Namespace of all well-known keys.
    pub const PREFIX: &str = "org.openecard.addon.bind.aux_data.";

    /// Target the binding redirects to instead of sending a normal response.
    pub const REDIRECT_LOCATION: &str = "org.openecard.addon.bind.aux_data.redirect_location";

    /// Headers the binding attaches to the outgoing response.
    pub const RESPONSE_HEADERS: &str = "org.openecard.addon.bind.aux_data.response_headers";

    /// Minor process result the binding surfaces unchanged to the caller.
    pub const MINOR_PROCESS_RESULT: &str = "org.openecard.addon.bind.aux_data.minor_result";

    /// All well-known keys.
    pub const ALL: [&str; 3] = [REDIRECT_LOCATION, RESPONSE_HEADERS, MINOR_PROCESS_RESULT];

    /// Returns `true` if `key` is one of the well-known keys.
    pub fn is_well_known(key: &str) -> bool {
        ALL.contains(&key)
    }

    /// Returns `true` if `key` lies in the reserved namespace.
    pub fn is_reserved(key: &str) -> bool {
        key.starts_with(PREFIX)
    }
}

const STRING_SHAPE: &str = "string";
const HEADERS_SHAPE: &str = "object mapping header names to a string or an array of strings";

/// Returns a short description of the kind of a JSON value.
fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn expect_string(key: &str, value: Value) -> AuxDataResult<String> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(AuxDataError::unexpected_shape(
            key,
            STRING_SHAPE,
            value_kind(&other),
        )),
    }
}

// ============================================================================
// Response Headers
// ============================================================================

/// Header name to values mapping carried under [`keys::RESPONSE_HEADERS`].
///
/// Names keep the spelling the add-on used; a name may carry several values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseHeaders(BTreeMap<String, Vec<String>>);

impl ResponseHeaders {
    /// Creates an empty header set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value for the given header name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.entry(name.into()).or_default().push(value.into());
    }

    /// Returns all values of a header.
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.0.get(name).map(Vec::as_slice)
    }

    /// Iterates over all `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .flat_map(|(name, values)| values.iter().map(move |v| (name.as_str(), v.as_str())))
    }

    /// Returns the number of distinct header names.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no header is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn merge(&mut self, other: ResponseHeaders) {
        for (name, values) in other.0 {
            self.0.entry(name).or_default().extend(values);
        }
    }

    /// Parses the value stored under [`keys::RESPONSE_HEADERS`].
    fn from_value(value: Value) -> AuxDataResult<Self> {
        let entries = match value {
            Value::Object(entries) => entries,
            other => {
                return Err(AuxDataError::unexpected_shape(
                    keys::RESPONSE_HEADERS,
                    HEADERS_SHAPE,
                    value_kind(&other),
                ));
            }
        };

        let mut headers = Self::new();
        for (name, value) in entries {
            match value {
                Value::String(v) => headers.append(name, v),
                Value::Array(values) => {
                    for v in values {
                        match v {
                            Value::String(v) => headers.append(name.clone(), v),
                            other => {
                                return Err(AuxDataError::unexpected_shape(
                                    keys::RESPONSE_HEADERS,
                                    HEADERS_SHAPE,
                                    value_kind(&other),
                                ));
                            }
                        }
                    }
                }
                other => {
                    return Err(AuxDataError::unexpected_shape(
                        keys::RESPONSE_HEADERS,
                        HEADERS_SHAPE,
                        value_kind(&other),
                    ));
                }
            }
        }
        Ok(headers)
    }

    fn to_value(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(name, values)| {
                    let values = values.iter().cloned().map(Value::String).collect();
                    (name.clone(), Value::Array(values))
                })
                .collect(),
        )
    }
}

// ============================================================================
// AuxData
// ============================================================================

/// Auxiliary data of one processed request, in typed form.
///
/// Every field is optional; an absent entry means the corresponding feature is
/// not engaged for this request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuxData {
    redirect_location: Option<String>,
    response_headers: ResponseHeaders,
    minor_result: Option<String>,
    extensions: AuxDataMap,
}

impl AuxData {
    /// Creates empty auxiliary data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts building auxiliary data.
    pub fn builder() -> AuxDataBuilder {
        AuxDataBuilder::new()
    }

    /// Reopens the data for further entries.
    pub fn into_builder(self) -> AuxDataBuilder {
        AuxDataBuilder { data: self }
    }

    /// Interprets an open auxiliary data map.
    ///
    /// Well-known entries are shape-checked and moved into their typed fields;
    /// all other entries are kept as extensions.
    pub fn from_map(map: AuxDataMap) -> AuxDataResult<Self> {
        let mut builder = AuxDataBuilder::new();
        for (key, value) in map {
            builder = builder.insert(key, value)?;
        }
        let aux = builder.build();
        debug!(
            redirect = aux.redirect_location.is_some(),
            headers = aux.response_headers.len(),
            minor_result = aux.minor_result.is_some(),
            extensions = aux.extensions.len(),
            "Interpreted auxiliary data"
        );
        Ok(aux)
    }

    /// Renders the auxiliary data back into its open form.
    pub fn to_map(&self) -> AuxDataMap {
        let mut map = self.extensions.clone();
        if let Some(location) = &self.redirect_location {
            map.insert(
                keys::REDIRECT_LOCATION.to_string(),
                Value::String(location.clone()),
            );
        }
        if !self.response_headers.is_empty() {
            map.insert(
                keys::RESPONSE_HEADERS.to_string(),
                self.response_headers.to_value(),
            );
        }
        if let Some(minor) = &self.minor_result {
            map.insert(
                keys::MINOR_PROCESS_RESULT.to_string(),
                Value::String(minor.clone()),
            );
        }
        map
    }

    /// Returns the redirect target, if the binding should redirect.
    pub fn redirect_location(&self) -> Option<&str> {
        self.redirect_location.as_deref()
    }

    /// Returns the headers to attach to the response.
    pub fn response_headers(&self) -> &ResponseHeaders {
        &self.response_headers
    }

    /// Returns the minor process result to surface to the caller.
    pub fn minor_result(&self) -> Option<&str> {
        self.minor_result.as_deref()
    }

    /// Looks up an extension entry contributed by an add-on.
    pub fn extension(&self, key: &str) -> Option<&Value> {
        self.extensions.get(key)
    }

    /// Returns all extension entries.
    pub fn extensions(&self) -> &AuxDataMap {
        &self.extensions
    }

    /// Returns `true` if no entry is set.
    pub fn is_empty(&self) -> bool {
        self.redirect_location.is_none()
            && self.response_headers.is_empty()
            && self.minor_result.is_none()
            && self.extensions.is_empty()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Incrementally collects auxiliary data during request processing.
///
/// # Example
///
/// ```rust
/// use ecard_core::aux_data::{AuxDataBuilder, keys};
/// use serde_json::json;
///
/// let aux = AuxDataBuilder::new()
///     .minor_result("http://www.bsi.bund.de/ecard/api/1.1/resultminor/al/common#noPermission")
///     .insert("com.example.addon.trace_id", json!("abc"))?
///     .build();
///
/// assert!(aux.redirect_location().is_none());
/// assert_eq!(aux.extension("com.example.addon.trace_id"), Some(&json!("abc")));
/// # Ok::<(), ecard_core::AuxDataError>(())
/// ```
#[derive(Debug, Default)]
pub struct AuxDataBuilder {
    data: AuxData,
}

impl AuxDataBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the redirect target.
    pub fn redirect_location(mut self, location: impl Into<String>) -> Self {
        self.data.redirect_location = Some(location.into());
        self
    }

    /// Appends a response header.
    pub fn response_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.response_headers.append(name, value);
        self
    }

    /// Sets the minor process result.
    pub fn minor_result(mut self, minor: impl Into<String>) -> Self {
        self.data.minor_result = Some(minor.into());
        self
    }

    /// Inserts an entry given in its open form.
    ///
    /// Values for well-known keys are shape-checked. Keys in the reserved
    /// namespace that are not well-known are rejected; any other key is kept
    /// as an extension.
    pub fn insert(mut self, key: impl Into<String>, value: Value) -> AuxDataResult<Self> {
        let key = key.into();
        match key.as_str() {
            keys::REDIRECT_LOCATION => {
                self.data.redirect_location = Some(expect_string(&key, value)?);
            }
            keys::MINOR_PROCESS_RESULT => {
                self.data.minor_result = Some(expect_string(&key, value)?);
            }
            keys::RESPONSE_HEADERS => {
                let headers = ResponseHeaders::from_value(value)?;
                self.data.response_headers.merge(headers);
            }
            other if keys::is_reserved(other) => {
                return Err(AuxDataError::ReservedKey { key });
            }
            _ => {
                self.data.extensions.insert(key, value);
            }
        }
        Ok(self)
    }

    /// Finishes building and hands the data off.
    pub fn build(self) -> AuxData {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    const ALREADY_PERFORMED: &str =
        "http://www.bsi.bund.de/ecard/api/1.1/resultminor/sal#alreadyPerformed";

    #[test]
    fn test_keys_are_distinct_and_prefixed() {
        let unique: HashSet<_> = keys::ALL.iter().collect();
        assert_eq!(unique.len(), keys::ALL.len());

        for key in keys::ALL {
            assert!(key.starts_with(keys::PREFIX), "{key} lacks prefix");
            assert!(keys::is_well_known(key));
        }
    }

    #[test]
    fn test_keys_are_stable() {
        assert_eq!(
            keys::REDIRECT_LOCATION,
            "org.openecard.addon.bind.aux_data.redirect_location"
        );
        assert_eq!(
            keys::RESPONSE_HEADERS,
            "org.openecard.addon.bind.aux_data.response_headers"
        );
        assert_eq!(
            keys::MINOR_PROCESS_RESULT,
            "org.openecard.addon.bind.aux_data.minor_result"
        );
    }

    #[test]
    fn test_missing_keys_are_not_engaged() {
        let aux = AuxData::from_map(AuxDataMap::new()).unwrap();
        assert!(aux.is_empty());
        assert!(aux.redirect_location().is_none());
        assert!(aux.response_headers().is_empty());
        assert!(aux.minor_result().is_none());
    }

    #[test]
    fn test_from_map_well_known_and_extensions() {
        let mut map = AuxDataMap::new();
        map.insert(keys::MINOR_PROCESS_RESULT.into(), json!(ALREADY_PERFORMED));
        map.insert(
            keys::RESPONSE_HEADERS.into(),
            json!({ "X-One": "1", "X-Many": ["a", "b"] }),
        );
        map.insert("com.example.addon.flag".into(), json!(true));

        let aux = AuxData::from_map(map).unwrap();

        assert_eq!(aux.minor_result(), Some(ALREADY_PERFORMED));
        assert_eq!(aux.response_headers().get("X-One"), Some(&["1".to_string()][..]));
        assert_eq!(
            aux.response_headers().get("X-Many"),
            Some(&["a".to_string(), "b".to_string()][..])
        );
        assert_eq!(aux.extension("com.example.addon.flag"), Some(&json!(true)));
        assert!(aux.redirect_location().is_none());
    }

    #[test]
    fn test_wrong_shape_is_reported() {
        let mut map = AuxDataMap::new();
        map.insert(keys::REDIRECT_LOCATION.into(), json!(42));

        let err = AuxData::from_map(map).unwrap_err();
        assert_eq!(
            err,
            AuxDataError::UnexpectedShape {
                key: keys::REDIRECT_LOCATION.into(),
                expected: "string",
                found: "number",
            }
        );
    }

    #[test]
    fn test_wrong_header_value_shape_is_reported() {
        let err = AuxDataBuilder::new()
            .insert(keys::RESPONSE_HEADERS, json!({ "X-Bad": [1] }))
            .unwrap_err();
        assert_eq!(err.key(), keys::RESPONSE_HEADERS);

        let err = AuxDataBuilder::new()
            .insert(keys::RESPONSE_HEADERS, json!(["X-Bad"]))
            .unwrap_err();
        assert!(matches!(err, AuxDataError::UnexpectedShape { found: "array", .. }));
    }

    #[test]
    fn test_reserved_prefix_is_rejected() {
        let key = format!("{}unknown", keys::PREFIX);
        let err = AuxDataBuilder::new().insert(key.clone(), json!("x")).unwrap_err();
        assert_eq!(err, AuxDataError::ReservedKey { key });
    }

    #[test]
    fn test_to_map_restores_open_form() {
        let aux = AuxData::builder()
            .redirect_location("https://example.org/done")
            .response_header("X-One", "1")
            .minor_result(ALREADY_PERFORMED)
            .insert("com.example.addon.count", json!(3))
            .unwrap()
            .build();

        let map = aux.to_map();
        assert_eq!(map.len(), 4);
        assert_eq!(map[keys::REDIRECT_LOCATION], json!("https://example.org/done"));
        assert_eq!(map[keys::RESPONSE_HEADERS], json!({ "X-One": ["1"] }));
        assert_eq!(AuxData::from_map(map).unwrap(), aux);
    }

    #[test]
    fn test_headers_merge_across_inserts() {
        let aux = AuxData::builder()
            .response_header("X-Trace", "first")
            .insert(keys::RESPONSE_HEADERS, json!({ "X-Trace": "second" }))
            .unwrap()
            .build();

        let pairs: Vec<_> = aux.response_headers().iter().collect();
        assert_eq!(pairs, vec![("X-Trace", "first"), ("X-Trace", "second")]);
    }
}
