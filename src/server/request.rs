use http::Method;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::sync::Arc;

/// Inline capacity for path and query parameters.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Inline capacity for request and response headers.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Name/value pairs for path variables and query parameters.
///
/// Keys are `Arc<str>` so route-template names can be shared without
/// copying them into every request.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Name/value pairs for headers. Names compare case-insensitively.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// An incoming request as seen by handlers.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Percent-decoded path without the query string
    pub path: String,
    /// Filled in by the router once a route has matched
    pub path_params: ParamVec,
    pub query_params: ParamVec,
    pub headers: HeaderVec,
    pub body: Vec<u8>,
}

impl Request {
    /// Build a request from a verb and a request target such as
    /// `/api/v1/sms/42?page-size=10`. The path is percent-decoded and the
    /// query string is form-decoded. A path that does not decode to UTF-8 is
    /// kept as sent.
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (target, None),
        };
        let query_params = query
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .map(|(k, v)| (Arc::from(k.as_ref()), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default();

        let path = urlencoding::decode(path).map_or_else(|_| path.to_string(), Cow::into_owned);

        Self {
            method,
            path,
            path_params: ParamVec::new(),
            query_params,
            headers: HeaderVec::new(),
            body: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((Arc::from(name), value.into()));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Query parameter by name. The first occurrence wins.
    #[inline]
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string_is_split_and_decoded() {
        let req = Request::new(Method::GET, "/search?q=hello%20world&page-size=10&q=again");
        assert_eq!(req.path, "/search");
        assert_eq!(req.query_param("page-size"), Some("10"));
        assert_eq!(req.query_param("q"), Some("hello world"));
        assert_eq!(req.query_param("missing"), None);
    }

    #[test]
    fn test_path_is_percent_decoded() {
        let req = Request::new(Method::GET, "/e/a%20b?x=a%20b");
        assert_eq!(req.path, "/e/a b");
        assert_eq!(req.query_param("x"), Some("a b"));

        let raw = Request::new(Method::GET, "/e/%FF");
        assert_eq!(raw.path, "/e/%FF");
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let req = Request::new(Method::GET, "/").with_header("Accept-Language", "de");
        assert_eq!(req.header("accept-language"), Some("de"));
        assert_eq!(req.header("ACCEPT-LANGUAGE"), Some("de"));
    }
}
