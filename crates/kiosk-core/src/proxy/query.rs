//! Query-string handling for the proxy routes.
//!
//! Parameters the player adds for the CMS (`serverKey`, `method`, `v`, ...) are
//! forwarded exactly as they arrived: same order, same encoding. Only the
//! routing parameters (`cms`, `path`) are decoded and removed.

use kiosk_types::ProxyError;

#[derive(Debug, Clone, PartialEq, Eq)]
struct QueryPair {
    name: String,
    value: String,
    raw: String,
}

/// Parsed query string of an inbound proxy request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyQuery {
    pairs: Vec<QueryPair>,
}

impl ProxyQuery {
    /// Parse a raw query string (without the leading `?`).
    pub fn parse(raw: Option<&str>) -> Self {
        let pairs = raw
            .unwrap_or_default()
            .split('&')
            .filter(|segment| !segment.is_empty())
            .map(|segment| {
                let (name, value) = url::form_urlencoded::parse(segment.as_bytes())
                    .next()
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .unwrap_or_default();
                QueryPair { name, value, raw: segment.to_string() }
            })
            .collect();
        Self { pairs }
    }

    /// Decoded value of the first `name` parameter, if present and non-empty.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|pair| pair.name == name)
            .map(|pair| pair.value.as_str())
            .filter(|value| !value.is_empty())
    }

    /// Like [`get`](Self::get), but a missing value is a client error.
    pub fn require(&self, name: &str, message: &str) -> Result<&str, ProxyError> {
        self.get(name).ok_or_else(|| ProxyError::missing(message))
    }

    /// Raw segments of every parameter not in `excluded`, joined with `&`.
    pub fn passthrough(&self, excluded: &[&str]) -> String {
        self.pairs
            .iter()
            .filter(|pair| !excluded.contains(&pair.name.as_str()))
            .map(|pair| pair.raw.as_str())
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// `{base}{path}` with `?{query}` appended when there is one.
pub fn build_target(base: &str, path: &str, query: &str) -> String {
    if query.is_empty() {
        format!("{base}{path}")
    } else {
        format!("{base}{path}?{query}")
    }
}
