//! Merge request entity
//!
//! A [`MergeRequest`] wraps the last snapshot the server reported for one
//! merge request. Accessors read from that snapshot; mutations are sent to
//! the server and never patch it locally. Call [`MergeRequest::refetch_info`]
//! to observe their effect.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::api::Api;
use crate::error::Result;
use crate::request::Request;

/// User reference embedded in a merge request (assignee, author).
///
/// GitLab may send an empty object for an unset assignee, so `id` is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct UserRef {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Snapshot of a merge request as returned by the API.
///
/// Only the identifiers are required; a partial snapshot still decodes and
/// its missing fields read as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MergeRequestInfo {
    pub id: u64,
    pub iid: u64,
    pub project_id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub source_project_id: Option<u64>,
    #[serde(default)]
    pub target_project_id: Option<u64>,
    #[serde(default)]
    pub source_branch: Option<String>,
    #[serde(default)]
    pub target_branch: Option<String>,
    #[serde(default)]
    pub assignee: Option<UserRef>,
    #[serde(default)]
    pub author: Option<UserRef>,
    #[serde(default)]
    pub web_url: Option<String>,
    #[serde(default)]
    pub work_in_progress: bool,
}

impl MergeRequestInfo {
    /// Decode a snapshot from a raw response body.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn state_kind(&self) -> Option<MergeState> {
        self.state.as_deref().map(MergeState::from)
    }
}

/// Lifecycle states GitLab reports for a merge request.
///
/// The server owns this set; values this crate doesn't know are kept in
/// [`MergeState::Other`] rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeState {
    Opened,
    Closed,
    Merged,
    Locked,
    Other(String),
}

impl From<&str> for MergeState {
    fn from(s: &str) -> Self {
        match s {
            "opened" => Self::Opened,
            "closed" => Self::Closed,
            "merged" => Self::Merged,
            "locked" => Self::Locked,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for MergeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Opened => write!(f, "opened"),
            Self::Closed => write!(f, "closed"),
            Self::Merged => write!(f, "merged"),
            Self::Locked => write!(f, "locked"),
            Self::Other(s) => write!(f, "{}", s),
        }
    }
}

fn merge_request_path(project_id: u64, merge_request_id: u64) -> String {
    format!("/projects/{}/merge_requests/{}", project_id, merge_request_id)
}

/// One merge request, bound to the API it was fetched through.
pub struct MergeRequest<'a, A: Api + ?Sized> {
    api: &'a A,
    info: Arc<MergeRequestInfo>,
}

impl<'a, A: Api + ?Sized> MergeRequest<'a, A> {
    /// Wrap an already-fetched snapshot. No request is made.
    pub fn new(api: &'a A, info: MergeRequestInfo) -> Self {
        Self {
            api,
            info: Arc::new(info),
        }
    }

    /// Fetch a single merge request.
    pub fn fetch_by_id(project_id: u64, merge_request_id: u64, api: &'a A) -> Result<Self> {
        debug!(project_id, merge_request_id, "fetching merge request");
        let info = api.call(&Request::get(merge_request_path(project_id, merge_request_id)))?;
        Ok(Self::new(api, MergeRequestInfo::from_value(info)?))
    }

    /// Fetch every opened merge request of a project, oldest first.
    pub fn fetch_all_opened(project_id: u64, api: &'a A) -> Result<Vec<Self>> {
        let request = Request::get_with(
            format!("/projects/{}/merge_requests", project_id),
            json!({
                "state": "opened",
                "order_by": "created_at",
                "sort": "asc",
            }),
        );

        let records = api.collect_all_pages(&request)?;
        debug!(project_id, count = records.len(), "fetched opened merge requests");

        records
            .into_iter()
            .map(|record| Ok(Self::new(api, MergeRequestInfo::from_value(record)?)))
            .collect()
    }

    /// Replace the snapshot with the server's current one.
    ///
    /// The old snapshot is dropped as a whole; nothing from it survives.
    pub fn refetch_info(&mut self) -> Result<()> {
        let path = merge_request_path(self.project_id(), self.id());
        let info = MergeRequestInfo::from_value(self.api.call(&Request::get(path))?)?;
        debug!(iid = info.iid, state = ?info.state, sha = ?info.sha, "refetched merge request");
        self.info = Arc::new(info);
        Ok(())
    }

    /// Post a note on the merge request.
    pub fn comment(&self, message: &str) -> Result<Value> {
        self.api.call(&Request::post(
            format!("{}/notes", self.iid_path()),
            json!({ "body": message }),
        ))
    }

    pub fn assign_to(&self, user_id: u64) -> Result<Value> {
        debug!(iid = self.iid(), user_id, "assigning merge request");
        self.api
            .call(&Request::put(self.iid_path(), json!({ "assignee_id": user_id })))
    }

    pub fn unassign(&self) -> Result<Value> {
        debug!(iid = self.iid(), "unassigning merge request");
        self.api
            .call(&Request::put(self.iid_path(), json!({ "assignee_id": null })))
    }

    /// Ask the server to merge once the pipeline succeeds.
    ///
    /// `sha` is the source branch tip the merge is meant for; the cached
    /// [`sha`](Self::sha) is sent when it is `None`, and `null` when the
    /// snapshot has none either. The server refuses the merge if the branch
    /// has moved past it. Acceptance does not mean the merge happened;
    /// refetch to see the resulting state.
    pub fn accept(&self, remove_branch: bool, sha: Option<&str>) -> Result<Value> {
        let sha = sha.or(self.sha());
        debug!(iid = self.iid(), ?sha, remove_branch, "accepting merge request");
        self.api.call(&Request::put(
            format!("{}/merge", self.iid_path()),
            json!({
                "merge_when_build_succeeds": true,
                "should_remove_source_branch": remove_branch,
                "sha": sha,
            }),
        ))
    }

    fn iid_path(&self) -> String {
        merge_request_path(self.project_id(), self.iid())
    }

    /// Current snapshot. Cloning the `Arc` pins it across later refetches.
    pub fn info(&self) -> &Arc<MergeRequestInfo> {
        &self.info
    }

    pub fn id(&self) -> u64 {
        self.info.id
    }

    pub fn iid(&self) -> u64 {
        self.info.iid
    }

    pub fn project_id(&self) -> u64 {
        self.info.project_id
    }

    pub fn source_project_id(&self) -> Option<u64> {
        self.info.source_project_id
    }

    pub fn target_project_id(&self) -> Option<u64> {
        self.info.target_project_id
    }

    pub fn title(&self) -> Option<&str> {
        self.info.title.as_deref()
    }

    pub fn state(&self) -> Option<&str> {
        self.info.state.as_deref()
    }

    pub fn sha(&self) -> Option<&str> {
        self.info.sha.as_deref()
    }

    pub fn source_branch(&self) -> Option<&str> {
        self.info.source_branch.as_deref()
    }

    pub fn target_branch(&self) -> Option<&str> {
        self.info.target_branch.as_deref()
    }

    /// `None` when nobody is assigned, including an empty assignee object.
    pub fn assignee_id(&self) -> Option<u64> {
        self.info.assignee.as_ref().and_then(|user| user.id)
    }

    pub fn author_id(&self) -> Option<u64> {
        self.info.author.as_ref().and_then(|user| user.id)
    }

    pub fn web_url(&self) -> Option<&str> {
        self.info.web_url.as_deref()
    }

    pub fn work_in_progress(&self) -> bool {
        self.info.work_in_progress
    }
}

impl<A: Api + ?Sized> fmt::Debug for MergeRequest<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergeRequest")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}
