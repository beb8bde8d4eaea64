//! Recording [`Api`] double for unit tests

use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::api::{collect_pages, Api};
use crate::error::Result;
use crate::request::Request;

/// Records every request and answers from a queue of canned responses.
///
/// With an empty queue `call` answers `true`, like a bodiless `204`.
/// `collect_all_pages` walks pages through `call` unless a full listing was
/// preset with [`MockApi::set_collected`].
#[derive(Default)]
pub struct MockApi {
    responses: Mutex<VecDeque<Result<Value>>>,
    calls: Mutex<Vec<Request>>,
    collected: Mutex<Option<Vec<Value>>>,
    collect_calls: Mutex<Vec<Request>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, value: Value) {
        self.responses.lock().unwrap().push_back(Ok(value));
    }

    pub fn push_error(&self, err: crate::Error) {
        self.responses.lock().unwrap().push_back(Err(err));
    }

    pub fn set_collected(&self, records: Vec<Value>) {
        *self.collected.lock().unwrap() = Some(records);
    }

    /// Requests passed to `call`, oldest first
    pub fn calls(&self) -> Vec<Request> {
        self.calls.lock().unwrap().clone()
    }

    /// Requests passed to `collect_all_pages`, oldest first
    pub fn collect_calls(&self) -> Vec<Request> {
        self.collect_calls.lock().unwrap().clone()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
        self.collect_calls.lock().unwrap().clear();
    }
}

impl Api for MockApi {
    fn call(&self, request: &Request) -> Result<Value> {
        self.calls.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(Value::Bool(true)))
    }

    fn collect_all_pages(&self, request: &Request) -> Result<Vec<Value>> {
        self.collect_calls.lock().unwrap().push(request.clone());
        let preset = self.collected.lock().unwrap().clone();
        match preset {
            Some(records) => Ok(records),
            None => collect_pages(self, request),
        }
    }
}
