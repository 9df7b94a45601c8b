//! Read-only view of an incoming RPC call.
//!
//! Adapters (tonic, raw HTTP/2, tests) build a `CallContext` per call; the
//! authorizer only reads it.

use std::collections::HashMap;
use std::time::Duration;

/// Call metadata: lower-cased header name -> one or more values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallMetadata {
    entries: HashMap<String, Vec<String>>,
}

impl CallMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value. The key is stored lower-cased, like gRPC does on the wire.
    pub fn append(&mut self, key: &str, value: impl Into<String>) {
        self.entries
            .entry(key.to_ascii_lowercase())
            .or_default()
            .push(value.into());
    }

    /// Builder-style `append`.
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.append(key, value);
        self
    }

    /// All values for `key` (exact match against the stored lower-case key).
    pub fn get_all(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// First value for `key`, if any.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.get_all(key)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for CallMetadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut md = CallMetadata::new();
        for (k, v) in iter {
            md.append(k.as_ref(), v);
        }
        md
    }
}

/// Per-call context handed to the authorizer.
#[derive(Debug, Clone)]
pub struct CallContext {
    /// `None` when the call carried no metadata at all.
    pub metadata: Option<CallMetadata>,
    /// Full method name, e.g. `/helloworld.Greeter/SayHello`.
    pub full_method: String,
    /// Remaining call budget, if the caller set one.
    pub deadline: Option<Duration>,
}

impl CallContext {
    pub fn new(full_method: impl Into<String>, metadata: Option<CallMetadata>) -> Self {
        Self {
            metadata,
            full_method: full_method.into(),
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn full_method(&self) -> &str {
        &self.full_method
    }
}

/// gRPC timeout header name.
pub const GRPC_TIMEOUT_HEADER: &str = "grpc-timeout";

/// Parse a `grpc-timeout` value (`1*8DIGIT unit`, unit in `HMSmun`).
/// Returns `None` for anything malformed.
pub fn parse_grpc_timeout(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let unit = raw.chars().last()?;
    let digits = &raw[..raw.len() - unit.len_utf8()];
    if digits.is_empty() || digits.len() > 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let n: u64 = digits.parse().ok()?;
    let d = match unit {
        'H' => Duration::from_secs(n.checked_mul(3600)?),
        'M' => Duration::from_secs(n.checked_mul(60)?),
        'S' => Duration::from_secs(n),
        'm' => Duration::from_millis(n),
        'u' => Duration::from_micros(n),
        'n' => Duration::from_nanos(n),
        _ => return None,
    };
    Some(d)
}
