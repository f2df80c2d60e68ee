//! Request parameters and the transport-level request description.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Method;

use tb_core::constants::TOKEN_PARAM;
use tb_models::FileUpload;

/// Request parameters: each name maps to one or more string values.
///
/// Built fresh for every call and moved into the dispatcher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    values: BTreeMap<String, Vec<String>>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Params::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Replace all values of `key` with a single value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), vec![value.into()]);
        self
    }

    /// Append a value to `key`, keeping existing ones.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.entry(key.into()).or_default().push(value.into());
        self
    }

    /// Set `key` only when a value is present and non-empty.
    pub fn set_opt<V: Into<String>>(&mut self, key: impl Into<String>, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            let value = value.into();
            if !value.is_empty() {
                self.set(key, value);
            }
        }
        self
    }

    /// First value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.values.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.values.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Flattened `(name, value)` pairs in name order.
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        self.values
            .iter()
            .flat_map(|(k, vs)| vs.iter().map(move |v| (k.as_str(), v.as_str())))
            .collect()
    }

    /// Like [`Params::pairs`] with the token value masked, for logging.
    pub fn redacted_pairs(&self) -> Vec<(&str, &str)> {
        self.pairs()
            .into_iter()
            .map(|(k, v)| if k == TOKEN_PARAM { (k, "***") } else { (k, v) })
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.add(k, v);
        }
        params
    }
}

/// A fully prepared request, handed to a [`crate::Transport`].
///
/// `params` already contains the token. Without a file the transport sends
/// them as a GET query string; with a file, as multipart form fields of a POST.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Base URL joined with the endpoint path, without a query string.
    pub url: String,
    pub params: Params,
    pub file: Option<FileUpload>,
    pub timeout: Duration,
}

impl ApiRequest {
    /// The URL with a query string and the token masked, for logging.
    pub fn redacted_url(&self) -> String {
        match reqwest::Url::parse_with_params(&self.url, self.params.redacted_pairs()) {
            Ok(url) => url.to_string(),
            Err(_) => self.url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_and_add_appends() {
        let mut params = Params::new().with("chatId", "a");
        params.set("chatId", "b");
        assert_eq!(params.get_all("chatId"), ["b".to_string()]);

        params.add("actions", "typing").add("actions", "looking");
        assert_eq!(params.get_all("actions").len(), 2);
        assert_eq!(params.get("actions"), Some("typing"));
    }

    #[test]
    fn test_set_opt_skips_missing_and_empty() {
        let mut params = Params::new();
        params
            .set_opt("replyMsgId", None::<String>)
            .set_opt("parseMode", Some(""))
            .set_opt("forwardMsgId", Some("42"));
        assert!(!params.contains("replyMsgId"));
        assert!(!params.contains("parseMode"));
        assert_eq!(params.get("forwardMsgId"), Some("42"));
    }

    #[test]
    fn test_pairs_flatten_in_name_order() {
        let params: Params = [("b", "2"), ("a", "1"), ("b", "3")].into_iter().collect();
        assert_eq!(params.pairs(), vec![("a", "1"), ("b", "2"), ("b", "3")]);
    }

    #[test]
    fn test_redacted_url_hides_token() {
        let request = ApiRequest {
            method: Method::GET,
            url: "https://api.icq.net/bot/v1/self/get".into(),
            params: Params::new().with("token", "001.secret").with("chatId", "a b"),
            file: None,
            timeout: Duration::from_secs(1),
        };
        let url = request.redacted_url();
        assert!(!url.contains("001.secret"));
        assert!(url.contains("token=***") || url.contains("token=%2A%2A%2A"));
        assert!(url.contains("chatId=a+b"));
    }
}
