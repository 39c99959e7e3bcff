//! Outbound request description.
//!
//! An [`OutboundRequest`] is plain data. The client turns it into a transport
//! request once per dispatch, so a request retried after a refresh is rebuilt
//! from the same description, body included.

use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use tracing::warn;

use crate::error::{Error, InvalidInputError};

/// A request body.
#[derive(Debug, Clone)]
pub enum Body {
    /// Serialized JSON.
    Json(Vec<u8>),
    /// Pre-encoded text, treated as structured data.
    Text(String),
    /// Opaque binary content; never given a default content type.
    Binary(Vec<u8>),
    /// A multipart form; the transport computes the content type.
    Multipart(Multipart),
}

impl Body {
    fn is_structured(&self) -> bool {
        matches!(self, Body::Json(_) | Body::Text(_))
    }
}

/// A multipart form that can be rebuilt for every dispatch.
#[derive(Debug, Clone, Default)]
pub struct Multipart {
    parts: Vec<FormPart>,
}

#[derive(Debug, Clone)]
struct FormPart {
    name: String,
    content: PartContent,
}

#[derive(Debug, Clone)]
enum PartContent {
    Text(String),
    File {
        filename: String,
        mime: Option<String>,
        bytes: Vec<u8>,
    },
}

impl Multipart {
    /// Create an empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text field.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            content: PartContent::Text(value.into()),
        });
        self
    }

    /// Add a file field.
    pub fn file(
        mut self,
        name: impl Into<String>,
        filename: impl Into<String>,
        mime: Option<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            content: PartContent::File {
                filename: filename.into(),
                mime,
                bytes,
            },
        });
        self
    }

    pub(crate) fn to_form(&self) -> Result<Form, Error> {
        let mut form = Form::new();
        for part in &self.parts {
            form = match &part.content {
                PartContent::Text(value) => form.text(part.name.clone(), value.clone()),
                PartContent::File {
                    filename,
                    mime,
                    bytes,
                } => {
                    let mut file = Part::bytes(bytes.clone()).file_name(filename.clone());
                    if let Some(mime) = mime {
                        file = file.mime_str(mime).map_err(|_| InvalidInputError::Header {
                            name: CONTENT_TYPE.to_string(),
                        })?;
                    }
                    form.part(part.name.clone(), file)
                }
            };
        }
        Ok(form)
    }
}

/// A request to the backend, relative to the configured base URL.
///
/// Requests carry the access token by default; see
/// [`without_auth`](Self::without_auth).
///
/// # Example
///
/// ```
/// use petnest::OutboundRequest;
///
/// let request = OutboundRequest::patch("/pets/42")
///     .json(&serde_json::json!({ "name": "Biscuit" }))
///     .unwrap();
/// assert!(request.is_authenticated());
/// ```
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Option<Body>,
    pub(crate) auth: bool,
}

impl OutboundRequest {
    /// Create a request with the given method and path.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
            auth: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Set a header, replacing any previous value.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Set the body.
    pub fn body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    /// Serialize `value` as a JSON body.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self, Error> {
        let bytes = serde_json::to_vec(value).map_err(|e| InvalidInputError::Body {
            reason: e.to_string(),
        })?;
        Ok(self.body(Body::Json(bytes)))
    }

    /// Set a multipart form body.
    pub fn multipart(self, form: Multipart) -> Self {
        self.body(Body::Multipart(form))
    }

    /// Send without an access token and without the refresh-and-retry cycle.
    ///
    /// The refresh cookie is still sent.
    pub fn without_auth(mut self) -> Self {
        self.auth = false;
        self
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the path relative to the base URL.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns true unless [`without_auth`](Self::without_auth) was called.
    pub fn is_authenticated(&self) -> bool {
        self.auth
    }

    /// Headers as they will be sent, before the access token is attached.
    pub(crate) fn effective_headers(&self) -> HeaderMap {
        let mut headers = self.headers.clone();

        match &self.body {
            Some(Body::Multipart(_)) => {
                if headers.remove(CONTENT_TYPE).is_some() {
                    warn!(path = %self.path, "Dropping caller content-type on multipart body");
                }
            }
            Some(body) if self.auth && body.is_structured() => {
                headers
                    .entry(CONTENT_TYPE)
                    .or_insert(HeaderValue::from_static("application/json"));
            }
            _ => {}
        }

        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_body_defaults_content_type() {
        let request = OutboundRequest::post("/pets")
            .json(&json!({"name": "Rex"}))
            .unwrap();
        assert_eq!(
            request.effective_headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn text_body_defaults_content_type() {
        let request = OutboundRequest::put("/profile").body(Body::Text("{}".into()));
        assert_eq!(
            request.effective_headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn explicit_content_type_is_kept() {
        let request = OutboundRequest::post("/pets")
            .header(
                CONTENT_TYPE,
                HeaderValue::from_static("application/merge-patch+json"),
            )
            .body(Body::Text("{}".into()));
        assert_eq!(
            request.effective_headers().get(CONTENT_TYPE).unwrap(),
            "application/merge-patch+json"
        );
    }

    #[test]
    fn bodyless_request_has_no_content_type() {
        let request = OutboundRequest::get("/pets");
        assert!(request.effective_headers().get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn binary_body_gets_no_default() {
        let request = OutboundRequest::put("/blob").body(Body::Binary(vec![0, 1, 2]));
        assert!(request.effective_headers().get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn multipart_drops_caller_content_type() {
        let request = OutboundRequest::post("/uploads")
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .multipart(Multipart::new().file("file", "a.png", None, vec![1]));
        assert!(request.effective_headers().get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn unauthenticated_request_gets_no_default() {
        let request = OutboundRequest::post("/public")
            .json(&json!({}))
            .unwrap()
            .without_auth();
        assert!(request.effective_headers().get(CONTENT_TYPE).is_none());
        assert!(!request.is_authenticated());
    }

    #[test]
    fn multipart_rejects_bad_mime() {
        let form = Multipart::new().file("file", "a.bin", Some("not a mime".into()), vec![]);
        assert!(form.to_form().is_err());
    }
}
