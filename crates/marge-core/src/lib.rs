pub mod api;
pub mod error;
pub mod merge_request;
pub mod request;

#[cfg(test)]
mod testing;

#[cfg(test)]
mod merge_request_tests;

pub use api::Api;
pub use error::{Error, Result};
pub use merge_request::{MergeRequest, MergeRequestInfo, MergeState, UserRef};
pub use request::{Method, Request, PER_PAGE};
