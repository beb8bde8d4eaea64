use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::request::Request;

/// Transport collaborator that executes request descriptors.
///
/// Implementations own HTTP, authentication and timeouts. Errors are returned
/// as-is to the caller; nothing in this crate retries or reinterprets them.
pub trait Api: Send + Sync {
    /// Execute one request and return the decoded response body.
    ///
    /// Bodiless successes (`202`, `204`) come back as `true`, a `304` as
    /// `false`.
    fn call(&self, request: &Request) -> Result<Value>;

    /// Execute a GET across every page of a listing.
    ///
    /// Pages are requested in order starting at 1 and concatenated in server
    /// order until a page comes back empty (or `false`). Any other non-array
    /// page is an [`Error::Parse`]. Records are not deduplicated.
    fn collect_all_pages(&self, request: &Request) -> Result<Vec<Value>> {
        collect_pages(self, request)
    }

    /// Version string reported by the server, e.g. `16.11.2-ee`
    fn version(&self) -> Result<String> {
        let response = self.call(&Request::get("/version"))?;
        response
            .get("version")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::Parse(format!("unexpected /version response: {}", response)))
    }
}

/// Page walk behind [`Api::collect_all_pages`], usable by implementations
/// that override the method but still want the default behaviour.
pub fn collect_pages<A: Api + ?Sized>(api: &A, request: &Request) -> Result<Vec<Value>> {
    let mut records = Vec::new();
    let mut page_no = 1;

    loop {
        let page = match api.call(&request.for_page(page_no))? {
            Value::Array(items) => items,
            // Not Modified
            Value::Bool(false) => Vec::new(),
            other => {
                return Err(Error::Parse(format!(
                    "expected an array for page {} of {}, got: {}",
                    page_no,
                    request.endpoint(),
                    other
                )));
            }
        };
        if page.is_empty() {
            break;
        }

        debug!(endpoint = request.endpoint(), page_no, count = page.len(), "collected page");
        records.extend(page);
        page_no += 1;
    }

    Ok(records)
}
