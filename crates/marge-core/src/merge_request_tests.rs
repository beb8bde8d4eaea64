//! Unit tests for MergeRequest against a recording Api

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::merge_request::{MergeRequest, MergeRequestInfo, MergeState};
    use crate::request::Request;
    use crate::testing::MockApi;
    use serde_json::{json, Value};

    fn mock_info() -> Value {
        json!({
            "id": 42,
            "iid": 54,
            "title": "a title",
            "project_id": 1234,
            "assignee": {"id": 77},
            "author": {"id": 88},
            "state": "opened",
            "sha": "dead4g00d",
            "source_project_id": 5678,
            "target_project_id": 1234,
            "source_branch": "useless_new_feature",
            "target_branch": "master"
        })
    }

    fn with(overrides: Value) -> Value {
        let mut info = mock_info();
        if let (Value::Object(base), Value::Object(extra)) = (&mut info, overrides) {
            base.extend(extra);
        }
        info
    }

    fn info(value: Value) -> MergeRequestInfo {
        MergeRequestInfo::from_value(value).unwrap()
    }

    /// Refetch with `value` as the server's answer, then clear the call log.
    fn load(mr: &mut MergeRequest<'_, MockApi>, api: &MockApi, value: Value) {
        api.push_response(value);
        mr.refetch_info().unwrap();
        assert_eq!(
            api.calls(),
            vec![Request::get("/projects/1234/merge_requests/42")]
        );
        api.reset_calls();
    }

    #[test]
    fn test_fetch_by_id() {
        let api = MockApi::new();
        api.push_response(mock_info());

        let mr = MergeRequest::fetch_by_id(1234, 42, &api).unwrap();

        assert_eq!(
            api.calls(),
            vec![Request::get("/projects/1234/merge_requests/42")]
        );
        assert_eq!(**mr.info(), info(mock_info()));
    }

    #[test]
    fn test_fetch_by_id_propagates_transport_error() {
        let api = MockApi::new();
        api.push_error(Error::from_status(404, "404 Not found"));

        let result = MergeRequest::fetch_by_id(1234, 42, &api);

        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_fetch_by_id_rejects_malformed_snapshot() {
        let api = MockApi::new();
        api.push_response(json!({"id": 42}));

        let result = MergeRequest::fetch_by_id(1234, 42, &api);

        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn test_minimal_snapshot_decodes() {
        let api = MockApi::new();
        api.push_response(json!({"id": 42, "iid": 54, "project_id": 1234, "assignee": {}}));

        let mut mr = MergeRequest::fetch_by_id(1234, 42, &api).unwrap();

        assert_eq!(mr.iid(), 54);
        assert_eq!(mr.assignee_id(), None);
        assert_eq!(mr.title(), None);
        assert_eq!(mr.sha(), None);
        assert_eq!(mr.info().state_kind(), None);
        assert_eq!(mr.source_project_id(), None);

        api.reset_calls();
        load(
            &mut mr,
            &api,
            json!({"id": 42, "iid": 54, "project_id": 1234, "assignee": {"id": 5}}),
        );
        assert_eq!(mr.assignee_id(), Some(5));
    }

    #[test]
    fn test_accept_without_known_sha_sends_null() {
        let api = MockApi::new();
        let mr = MergeRequest::new(
            &api,
            info(json!({"id": 42, "iid": 54, "project_id": 1234, "sha": null})),
        );

        mr.accept(true, None).unwrap();

        assert_eq!(
            api.calls(),
            vec![Request::put(
                "/projects/1234/merge_requests/54/merge",
                json!({
                    "merge_when_build_succeeds": true,
                    "should_remove_source_branch": true,
                    "sha": null,
                })
            )]
        );
    }

    #[test]
    fn test_fetch_all_opened_keeps_partial_records() {
        let api = MockApi::new();
        api.set_collected(vec![mock_info(), with(json!({"id": 678, "sha": null}))]);

        let result = MergeRequest::fetch_all_opened(1234, &api).unwrap();

        let shas: Vec<Option<&str>> = result.iter().map(|mr| mr.sha()).collect();
        assert_eq!(shas, vec![Some("dead4g00d"), None]);
    }

    #[test]
    fn test_refetch_info() {
        let api = MockApi::new();
        let mut mr = MergeRequest::new(&api, info(mock_info()));
        let new_info = with(json!({"state": "closed"}));
        api.push_response(new_info.clone());

        mr.refetch_info().unwrap();

        assert_eq!(
            api.calls(),
            vec![Request::get("/projects/1234/merge_requests/42")]
        );
        assert_eq!(**mr.info(), info(new_info));
        assert_eq!(mr.state(), Some("closed"));
    }

    #[test]
    fn test_refetch_replaces_whole_snapshot() {
        let api = MockApi::new();
        let mut mr = MergeRequest::new(&api, info(with(json!({"web_url": "https://x/1"}))));
        let before = mr.info().clone();

        let mut fresh = mock_info();
        fresh.as_object_mut().unwrap().remove("assignee");
        load(&mut mr, &api, fresh);

        assert_eq!(mr.assignee_id(), None);
        assert_eq!(mr.web_url(), None);
        // A snapshot pinned before the refetch is left as it was
        assert_eq!(before.assignee.as_ref().and_then(|u| u.id), Some(77));
        assert_eq!(before.web_url.as_deref(), Some("https://x/1"));
    }

    #[test]
    fn test_refetch_error_keeps_snapshot() {
        let api = MockApi::new();
        let mut mr = MergeRequest::new(&api, info(mock_info()));
        api.push_error(Error::Http("connection reset".to_string()));

        assert!(mr.refetch_info().is_err());
        assert_eq!(**mr.info(), info(mock_info()));
    }

    #[test]
    fn test_properties() {
        let api = MockApi::new();
        let mut mr = MergeRequest::new(&api, info(mock_info()));

        assert_eq!(mr.id(), 42);
        assert_eq!(mr.project_id(), 1234);
        assert_eq!(mr.iid(), 54);
        assert_eq!(mr.title(), Some("a title"));
        assert_eq!(mr.assignee_id(), Some(77));
        assert_eq!(mr.author_id(), Some(88));
        assert_eq!(mr.state(), Some("opened"));
        assert_eq!(mr.info().state_kind(), Some(MergeState::Opened));
        assert_eq!(mr.source_branch(), Some("useless_new_feature"));
        assert_eq!(mr.target_branch(), Some("master"));
        assert_eq!(mr.sha(), Some("dead4g00d"));
        assert_eq!(mr.source_project_id(), Some(5678));
        assert_eq!(mr.target_project_id(), Some(1234));
        assert!(!mr.work_in_progress());
        assert!(api.calls().is_empty());

        load(&mut mr, &api, with(json!({"assignee": {}})));
        assert_eq!(mr.assignee_id(), None);

        load(&mut mr, &api, with(json!({"assignee": null})));
        assert_eq!(mr.assignee_id(), None);
    }

    #[test]
    fn test_state_kind_keeps_unknown_values() {
        assert_eq!(MergeState::from("merged"), MergeState::Merged);
        assert_eq!(MergeState::from("locked"), MergeState::Locked);
        assert_eq!(
            MergeState::from("reopened"),
            MergeState::Other("reopened".to_string())
        );
        assert_eq!(MergeState::Other("reopened".into()).to_string(), "reopened");
    }

    #[test]
    fn test_comment() {
        let api = MockApi::new();
        let mr = MergeRequest::new(&api, info(mock_info()));

        mr.comment("blah").unwrap();

        assert_eq!(
            api.calls(),
            vec![Request::post(
                "/projects/1234/merge_requests/54/notes",
                json!({"body": "blah"})
            )]
        );
    }

    #[test]
    fn test_assign() {
        let api = MockApi::new();
        let mr = MergeRequest::new(&api, info(mock_info()));

        mr.assign_to(42).unwrap();

        assert_eq!(
            api.calls(),
            vec![Request::put(
                "/projects/1234/merge_requests/54",
                json!({"assignee_id": 42})
            )]
        );
        // Local snapshot is not touched
        assert_eq!(mr.assignee_id(), Some(77));
    }

    #[test]
    fn test_unassign() {
        let api = MockApi::new();
        let mr = MergeRequest::new(&api, info(mock_info()));

        mr.unassign().unwrap();

        assert_eq!(
            api.calls(),
            vec![Request::put(
                "/projects/1234/merge_requests/54",
                json!({"assignee_id": null})
            )]
        );
        assert_eq!(mr.assignee_id(), Some(77));
    }

    #[test]
    fn test_accept() {
        let api = MockApi::new();
        let mut mr = MergeRequest::new(&api, info(mock_info()));
        load(&mut mr, &api, with(json!({"sha": "badc0de"})));

        for remove_branch in [true, false] {
            mr.accept(remove_branch, None).unwrap();
            assert_eq!(
                api.calls(),
                vec![Request::put(
                    "/projects/1234/merge_requests/54/merge",
                    json!({
                        "merge_when_build_succeeds": true,
                        "should_remove_source_branch": remove_branch,
                        "sha": "badc0de",
                    })
                )]
            );
            api.reset_calls();
        }

        mr.accept(false, Some("g00dc0de")).unwrap();
        assert_eq!(
            api.calls(),
            vec![Request::put(
                "/projects/1234/merge_requests/54/merge",
                json!({
                    "merge_when_build_succeeds": true,
                    "should_remove_source_branch": false,
                    "sha": "g00dc0de",
                })
            )]
        );
        assert_eq!(mr.sha(), Some("badc0de"));
    }

    #[test]
    fn test_accept_propagates_conflict() {
        let api = MockApi::new();
        let mr = MergeRequest::new(&api, info(mock_info()));
        api.push_error(Error::from_status(
            409,
            "SHA does not match HEAD of source branch",
        ));

        let result = mr.accept(false, None);

        assert_eq!(result.unwrap_err().status(), Some(409));
    }

    #[test]
    fn test_fetch_all_opened() {
        let api = MockApi::new();
        let mr1 = mock_info();
        let mr2 = with(json!({"id": 678}));
        api.set_collected(vec![mr1.clone(), mr2.clone()]);

        let result = MergeRequest::fetch_all_opened(1234, &api).unwrap();

        assert_eq!(
            api.collect_calls(),
            vec![Request::get_with(
                "/projects/1234/merge_requests",
                json!({"state": "opened", "order_by": "created_at", "sort": "asc"}),
            )]
        );
        let infos: Vec<MergeRequestInfo> = result.iter().map(|mr| (**mr.info()).clone()).collect();
        assert_eq!(infos, vec![info(mr1), info(mr2)]);
    }

    #[test]
    fn test_fetch_all_opened_walks_pages() {
        let api = MockApi::new();
        api.push_response(json!([mock_info()]));
        api.push_response(json!([with(json!({"id": 678})), mock_info()]));
        api.push_response(json!([]));

        let result = MergeRequest::fetch_all_opened(1234, &api).unwrap();

        let ids: Vec<u64> = result.iter().map(|mr| mr.id()).collect();
        assert_eq!(ids, vec![42, 678, 42]);
        assert_eq!(api.calls().len(), 3);
        assert_eq!(
            api.calls()[1].args(),
            Some(&json!({
                "state": "opened",
                "order_by": "created_at",
                "sort": "asc",
                "page": 2,
                "per_page": 100,
            }))
        );
    }
}
