//! Flat request parameters.
//!
//! A [`QueryDict`] keeps `key=value` pairs exactly as they arrived, repeats
//! and all. It is the framework-level params object: forms only accept it
//! when the settings allow it, and then convert it into a plain nested map
//! with [`QueryDict::to_nested`].

use nestform_core::ValueMap;
use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};

use crate::nested;

/// Multi-valued request parameters in arrival order.
///
/// # Examples
///
/// ```
/// use nestform_http::QueryDict;
///
/// let qd = QueryDict::parse("color=red&color=blue&size=large");
/// assert_eq!(qd.get("color"), Some("blue"));
/// assert_eq!(qd.get_list("color"), vec!["red", "blue"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryDict {
    pairs: Vec<(String, String)>,
}

impl QueryDict {
    /// Creates an empty `QueryDict`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an `application/x-www-form-urlencoded` string.
    ///
    /// `+` decodes to a space; a pair without `=` gets an empty value.
    pub fn parse(query_string: &str) -> Self {
        let pairs = query_string
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode(key), decode(value))
            })
            .collect();
        Self { pairs }
    }

    /// The last value sent for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value sent for `key`, in order.
    pub fn get_list(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Replaces all values of `key` with one value at the key's first
    /// position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        match self.pairs.iter().position(|(k, _)| *k == key) {
            Some(first) => {
                self.pairs[first].1 = value.into();
                let mut idx = 0;
                self.pairs.retain(|(k, _)| {
                    idx += 1;
                    idx - 1 == first || *k != key
                });
            }
            None => self.pairs.push((key, value.into())),
        }
    }

    /// Adds one more value for `key` at the end.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Encodes the pairs back into a query string.
    pub fn urlencode(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Expands bracket-notation keys into a nested value map.
    ///
    /// See [`nested::expand`] for the key grammar.
    pub fn to_nested(&self) -> ValueMap {
        tracing::trace!(pairs = self.pairs.len(), "expanding query params");
        nested::expand(self.iter())
    }

    /// The pairs in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Distinct keys in order of first appearance.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for (key, _) in &self.pairs {
            if !keys.contains(&key.as_str()) {
                keys.push(key.as_str());
            }
        }
        keys
    }

    /// Whether any value was sent for `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// The number of pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

fn decode(input: &str) -> String {
    percent_decode_str(&input.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}

fn encode(input: &str) -> String {
    utf8_percent_encode(input, NON_ALPHANUMERIC).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nestform_core::Value;

    #[test]
    fn test_parse_repeated_key() {
        let qd = QueryDict::parse("color=red&size=l&color=blue");
        assert_eq!(qd.get("color"), Some("blue"));
        assert_eq!(qd.get_list("color"), vec!["red", "blue"]);
        assert_eq!(qd.len(), 3);
        assert_eq!(qd.keys(), vec!["color", "size"]);
    }

    #[test]
    fn test_parse_empty_and_bare_keys() {
        assert!(QueryDict::parse("").is_empty());
        assert!(QueryDict::parse("&&").is_empty());
        let qd = QueryDict::parse("flag&x=1");
        assert_eq!(qd.get("flag"), Some(""));
        assert!(qd.get("missing").is_none());
    }

    #[test]
    fn test_parse_decodes_percent_and_plus() {
        let qd = QueryDict::parse("user%5Bname%5D=Ivan+Petrov&q=a%2Bb");
        assert_eq!(qd.get("user[name]"), Some("Ivan Petrov"));
        assert_eq!(qd.get("q"), Some("a+b"));
    }

    #[test]
    fn test_set_keeps_first_position() {
        let mut qd = QueryDict::parse("a=1&b=2&a=3");
        qd.set("a", "9");
        assert_eq!(qd.urlencode(), "a=9&b=2");
        qd.set("c", "x");
        assert!(qd.contains_key("c"));
        assert_eq!(qd.keys(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_urlencode() {
        let mut qd = QueryDict::new();
        qd.append("user[name]", "a b");
        qd.append("x", "1");
        assert_eq!(qd.urlencode(), "user%5Bname%5D=a%20b&x=1");
    }

    #[test]
    fn test_to_nested() {
        let qd = QueryDict::parse("user[name]=Ivan&user[age]=20");
        let nested = qd.to_nested();
        let user = nested.get("user").unwrap();
        assert_eq!(user.get("name"), Some(&Value::from("Ivan")));
        assert_eq!(user.get("age"), Some(&Value::from("20")));
    }
}
