//! Request descriptors
//!
//! A [`Request`] is an immutable description of one API call: verb, endpoint
//! (relative to the API base, e.g. `/projects/1/merge_requests`) and optional
//! arguments. GET arguments become query parameters; POST/PUT arguments are
//! sent as a JSON body. Executing it is the transport's job (see [`crate::Api`]).

use serde_json::{Map, Value};
use std::fmt;

/// Page size requested when collecting every page of a listing.
pub const PER_PAGE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    method: Method,
    endpoint: String,
    args: Option<Value>,
}

impl Request {
    fn new(method: Method, endpoint: impl Into<String>, args: Option<Value>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            args,
        }
    }

    /// GET without query parameters
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::Get, endpoint, None)
    }

    /// GET with query parameters, given as a JSON object
    pub fn get_with(endpoint: impl Into<String>, params: Value) -> Self {
        Self::new(Method::Get, endpoint, Some(params))
    }

    pub fn post(endpoint: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, endpoint, Some(body))
    }

    pub fn put(endpoint: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Put, endpoint, Some(body))
    }

    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(Method::Delete, endpoint, None)
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn args(&self) -> Option<&Value> {
        self.args.as_ref()
    }

    /// JSON body for POST/PUT requests. GET and DELETE never carry one.
    pub fn body(&self) -> Option<&Value> {
        match self.method {
            Method::Post | Method::Put => self.args.as_ref(),
            Method::Get | Method::Delete => None,
        }
    }

    /// Same request restricted to one page of results.
    ///
    /// Adds `page` and `per_page` on top of the existing parameters; `self`
    /// is left untouched.
    pub fn for_page(&self, page_no: u32) -> Self {
        let mut params = match &self.args {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        };
        params.insert("page".to_string(), Value::from(page_no));
        params.insert("per_page".to_string(), Value::from(PER_PAGE));

        Self::new(self.method, self.endpoint.clone(), Some(Value::Object(params)))
    }

    /// Query string parameters for a GET, rendered the way GitLab expects:
    /// booleans as `true`/`false`, strings unquoted, nulls dropped.
    pub fn query_params(&self) -> Vec<(String, String)> {
        if self.method != Method::Get {
            return Vec::new();
        }
        let Some(Value::Object(map)) = &self.args else {
            return Vec::new();
        };

        map.iter()
            .filter_map(|(key, value)| {
                let rendered = match value {
                    Value::Null => return None,
                    Value::Bool(b) => b.to_string(),
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                Some((key.clone(), rendered))
            })
            .collect()
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.endpoint)
    }
}
