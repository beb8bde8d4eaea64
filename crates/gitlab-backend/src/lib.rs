pub mod client;
pub mod error;


pub use client::GitLabClient;
pub use error::{GitLabError, Result};

pub use marge_core::{Api, Request};
