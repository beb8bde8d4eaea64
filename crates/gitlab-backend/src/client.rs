use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use ureq::{Agent, RequestBuilder};

use marge_core::{Api, Method, Request};

use crate::error::{GitLabError, Result};

/// GitLab REST API client
pub struct GitLabClient {
    agent: Agent,
    api_base_url: String,
    token: String,
    sudo: Option<u64>,
}

impl GitLabClient {
    /// Create a new GitLab client.
    ///
    /// `gitlab_url` is the instance root, e.g. `https://gitlab.com`; requests
    /// go to `{gitlab_url}/api/v4`.
    pub fn new(gitlab_url: &str, token: &str) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(30)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            api_base_url: format!("{}/api/v4", gitlab_url.trim_end_matches('/')),
            token: token.to_string(),
            sudo: None,
        }
    }

    /// Act as another user (admin tokens only), via the `SUDO` header.
    pub fn with_sudo(mut self, user_id: u64) -> Self {
        self.sudo = Some(user_id);
        self
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn authorize<B>(&self, builder: RequestBuilder<B>) -> RequestBuilder<B> {
        let builder = builder
            .header("PRIVATE-TOKEN", &self.token)
            .header("Accept", "application/json");

        match self.sudo {
            Some(user_id) => builder.header("SUDO", user_id.to_string()),
            None => builder,
        }
    }

    /// Send a request descriptor and decode its response
    fn execute(&self, request: &Request) -> Result<Value> {
        let url = format!("{}{}", self.api_base_url, request.endpoint());
        debug!(method = %request.method(), url = %url, "request");

        let response = match request.method() {
            Method::Get => {
                let mut builder = self.authorize(self.agent.get(&url));
                for (key, value) in request.query_params() {
                    builder = builder.query(key, value);
                }
                builder.call()?
            }
            Method::Delete => self.authorize(self.agent.delete(&url)).call()?,
            Method::Post => {
                let builder = self.authorize(self.agent.post(&url));
                match request.body() {
                    Some(body) => builder.send_json(body)?,
                    None => builder.send_empty()?,
                }
            }
            Method::Put => {
                let builder = self.authorize(self.agent.put(&url));
                match request.body() {
                    Some(body) => builder.send_json(body)?,
                    None => builder.send_empty()?,
                }
            }
        };

        self.read_response(response)
    }

    /// Map a response to a JSON value, or to an error for non-success statuses
    fn read_response(&self, mut response: ureq::http::Response<ureq::Body>) -> Result<Value> {
        let status = response.status().as_u16();
        debug!(status, "response");

        match status {
            // Accepted / No Content
            202 | 204 => return Ok(Value::Bool(true)),
            // Not Modified
            304 => return Ok(Value::Bool(false)),
            _ => {}
        }

        if (200..300).contains(&status) {
            let body = response.body_mut().read_to_string()?;
            if body.trim().is_empty() {
                return Ok(Value::Null);
            }
            return Ok(serde_json::from_str(&body)?);
        }

        let body = response
            .body_mut()
            .read_to_string()
            .unwrap_or_else(|_| String::new());

        Err(GitLabError::Api {
            status,
            message: error_message(status, body),
        })
    }
}

/// Pull a readable message out of a GitLab error body
fn error_message(status: u16, body: String) -> String {
    let Ok(error_value) = serde_json::from_str::<Value>(&body) else {
        return if body.is_empty() {
            format!("HTTP {}", status)
        } else {
            body
        };
    };

    // GitLab can return {"message": ...}, {"error": ...} or {"error_description": ...};
    // `message` is sometimes an object of field errors
    for key in ["message", "error", "error_description"] {
        match error_value.get(key) {
            Some(Value::String(msg)) => return msg.clone(),
            Some(Value::Null) | None => {}
            Some(other) => return other.to_string(),
        }
    }

    body
}

impl Api for GitLabClient {
    fn call(&self, request: &Request) -> marge_core::Result<Value> {
        self.execute(request).map_err(marge_core::Error::from)
    }
}
