//! Request descriptors and request identity.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Query parameters. Keys are kept sorted so identity is order-independent.
pub type Params = Map<String, Value>;

/// Query parameter that asks the client to skip the response cache.
pub const NO_CACHE_PARAM: &str = "noCache";

/// HTTP method of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// Whether the method has side effects on the backend.
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Method::Get)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a request for caching and de-duplication purposes.
///
/// Made of the method, the url and the serialized params. Headers, body and
/// the cache-busting `_t` marker do not participate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    method: Method,
    url: String,
    params: String,
}

impl RequestKey {
    pub fn new(method: Method, url: impl Into<String>, params: &Params) -> Self {
        Self {
            method,
            url: url.into(),
            params: Value::Object(params.clone()).to_string(),
        }
    }

    /// Key of a parameterless GET on `url`.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url, &Params::new())
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Serialized params, `{}` when there are none.
    pub fn params(&self) -> &str {
        &self.params
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.method, self.url, self.params)
    }
}

/// Everything needed to issue one attempt of a request.
///
/// A descriptor is immutable per attempt: retrying produces a fresh
/// descriptor through [`next_attempt()`](Self::next_attempt) rather than
/// bumping a shared counter.
///
/// ```rust
/// # use godpanel::types::{Method, RequestDescriptor};
/// let request = RequestDescriptor::get("/users")
///     .param("page", 2)
///     .header("X-Trace", "abc");
/// assert_eq!(request.method, Method::Get);
/// assert_eq!(request.key().to_string(), r#"GET_/users_{"page":2}"#);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: String,
    pub params: Params,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
    retry_count: u32,
}

impl RequestDescriptor {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            params: Params::new(),
            body: None,
            headers: Vec::new(),
            retry_count: 0,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::Put, url)
    }

    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(Method::Patch, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::Delete, url)
    }

    /// Replace all query params.
    pub fn params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Set a single query param.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Set the JSON body.
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Add a request header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Ask the client to bypass the response cache for this request.
    pub fn no_cache(self) -> Self {
        self.param(NO_CACHE_PARAM, true)
    }

    /// Whether the params request a cache bypass (truthy `noCache`).
    pub fn bypasses_cache(&self) -> bool {
        self.params.get(NO_CACHE_PARAM).is_some_and(is_truthy)
    }

    /// Number of retries that preceded this attempt.
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Descriptor for the next attempt of the same request.
    pub fn next_attempt(&self) -> Self {
        Self {
            retry_count: self.retry_count + 1,
            ..self.clone()
        }
    }

    /// Identity of this request.
    pub fn key(&self) -> RequestKey {
        RequestKey::new(self.method, self.url.clone(), &self.params)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
