use super::HeaderVec;
use crate::api_error::ApiError;
use http::StatusCode;
use parking_lot::Mutex;
use std::io;
use std::sync::Arc;

/// A handler's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderVec,
    pub body: Vec<u8>,
}

impl Default for Response {
    fn default() -> Self {
        Self::ok()
    }
}

impl Response {
    /// Empty `200 OK`.
    pub fn ok() -> Self {
        Self::with_status(StatusCode::OK)
    }

    pub fn with_status(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderVec::new(),
            body: Vec::new(),
        }
    }

    /// Serialized [`ApiError`] body with a JSON content type.
    pub fn error(status: StatusCode, err: &ApiError) -> Self {
        let mut res = Self::with_status(status);
        res.set_header("content-type", "application/json");
        res.body = err.to_json_bytes();
        res
    }

    /// Add or replace a header.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            Some((_, v)) => *v = value,
            None => self.headers.push((Arc::from(name), value)),
        }
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body parsed back into an [`ApiError`].
    pub fn api_error(&self) -> ApiError {
        ApiError::parse(self.body.as_slice())
    }
}

/// Raw response writer for methods that take over the response themselves.
///
/// Cloning shares the underlying response. Whatever the method writes is
/// the starting point of the final response; return values are appended.
#[derive(Debug, Clone, Default)]
pub struct ResponseSink {
    inner: Arc<Mutex<Response>>,
}

impl ResponseSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&self, status: StatusCode) {
        self.inner.lock().status = status;
    }

    pub fn set_header(&self, name: &str, value: impl Into<String>) {
        self.inner.lock().set_header(name, value);
    }

    /// Snapshot of what has been written so far.
    pub fn snapshot(&self) -> Response {
        self.inner.lock().clone()
    }

    /// Take the written response, leaving an empty `200 OK` behind.
    pub fn take(&self) -> Response {
        std::mem::take(&mut *self.inner.lock())
    }
}

impl io::Write for ResponseSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.lock().body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Write for &ResponseSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.lock().body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_error_response_round_trips() {
        let err = ApiError::new("sms.not.found", "no such sms");
        let res = Response::error(StatusCode::NOT_FOUND, &err);
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert_eq!(res.header("Content-Type"), Some("application/json"));
        assert_eq!(res.api_error(), err);
    }

    #[test]
    fn test_set_header_replaces() {
        let mut res = Response::ok();
        res.set_header("content-type", "text/plain");
        res.set_header("Content-Type", "application/json");
        assert_eq!(res.headers.len(), 1);
        assert_eq!(res.header("content-type"), Some("application/json"));
    }

    #[test]
    fn test_sink_clones_share_output() {
        let sink = ResponseSink::new();
        let mut writer = sink.clone();
        writer.write_all(b"hello").unwrap();
        sink.set_status(StatusCode::CREATED);

        let res = sink.take();
        assert_eq!(res.status, StatusCode::CREATED);
        assert_eq!(res.body, b"hello");
        assert!(sink.snapshot().body.is_empty());
    }
}
