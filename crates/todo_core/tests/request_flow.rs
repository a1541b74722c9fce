use chrono::{DateTime, Duration, TimeZone, Utc};
use std::path::Path;
use todo_core::{
    apply_request, with_session, DueWindow, ItemId, ListCriteria, Listed, Marker, ServiceError,
    SessionError, TodoRequest,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 4, 10, 0, 0).unwrap()
}

fn run(path: &Path, request: &TodoRequest) -> todo_core::RequestReport {
    let (report, _) = with_session(path, |store| apply_request(store, request, &now())).unwrap();
    report
}

fn list_all() -> TodoRequest {
    TodoRequest {
        list: Some(ListCriteria {
            show_done: true,
            show_not_done: true,
            window: DueWindow::unbounded(),
            patterns: Vec::new(),
            ignore_case: false,
        }),
        ..TodoRequest::default()
    }
}

fn listed_texts(listing: &[Listed]) -> Vec<&str> {
    listing.iter().map(|entry| entry.item.text.as_str()).collect()
}

#[test]
fn add_complete_remove_and_list_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todo.db");

    run(
        &path,
        &TodoRequest {
            add_lines: vec![
                "buy milk".to_string(),
                "2026-03-04 11:00 -- call mom".to_string(),
                "# ignored".to_string(),
            ],
            ..TodoRequest::default()
        },
    );

    let listing = run(&path, &list_all()).listing.unwrap();
    assert_eq!(listed_texts(&listing), ["call mom", "buy milk"]);
    let mom_id = listing[0].item.id.unwrap();
    let milk_id = listing[1].item.id.unwrap();

    // Same-session listing is taken from the snapshot before staging.
    let report = run(
        &path,
        &TodoRequest {
            complete: vec![milk_id],
            remove: vec![mom_id],
            ..list_all()
        },
    );
    assert_eq!(report.completed, [milk_id]);
    assert_eq!(report.removed, [mom_id]);
    assert_eq!(listed_texts(report.listing.as_deref().unwrap()), ["call mom", "buy milk"]);

    let listing = run(&path, &list_all()).listing.unwrap();
    assert_eq!(listed_texts(&listing), ["buy milk"]);
    assert!(listing[0].item.done);
    assert_eq!(listing[0].marker, Marker::Done);
}

#[test]
fn default_listing_hides_done_and_out_of_window_items() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todo.db");

    run(
        &path,
        &TodoRequest {
            add_lines: vec![
                "whenever task".to_string(),
                "2026-03-05 -- inside window".to_string(),
                "2026-04-30 -- far future".to_string(),
                "2026-03-01 -- already late".to_string(),
                "finished task".to_string(),
            ],
            ..TodoRequest::default()
        },
    );
    let all = run(&path, &list_all()).listing.unwrap();
    let finished = all
        .iter()
        .find(|entry| entry.item.text == "finished task")
        .and_then(|entry| entry.item.id)
        .unwrap();
    run(
        &path,
        &TodoRequest {
            complete: vec![finished],
            ..TodoRequest::default()
        },
    );

    let report = run(
        &path,
        &TodoRequest {
            list: Some(ListCriteria::upcoming(now(), 7)),
            ..TodoRequest::default()
        },
    );
    assert_eq!(
        listed_texts(report.listing.as_deref().unwrap()),
        ["inside window", "whenever task"]
    );

    let overdue = run(
        &path,
        &TodoRequest {
            list: Some(ListCriteria {
                window: DueWindow::new(now() - Duration::days(30), now()).unwrap(),
                ..ListCriteria::upcoming(now(), 7)
            }),
            ..TodoRequest::default()
        },
    )
    .listing
    .unwrap();
    let late = overdue
        .iter()
        .find(|entry| entry.item.text == "already late")
        .unwrap();
    assert_eq!(late.marker, Marker::Overdue);
}

#[test]
fn search_patterns_must_all_match() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todo.db");

    run(
        &path,
        &TodoRequest {
            add_lines: vec!["foobar task".to_string(), "foo only".to_string()],
            ..TodoRequest::default()
        },
    );

    let mut request = list_all();
    if let Some(criteria) = request.list.as_mut() {
        criteria.patterns = vec!["foo".to_string(), "bar".to_string()];
    }
    let listing = run(&path, &request).listing.unwrap();
    assert_eq!(listed_texts(&listing), ["foobar task"]);
}

#[test]
fn bad_pattern_rolls_back_the_whole_request() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todo.db");

    let mut request = list_all();
    request.add_lines = vec!["should not persist".to_string()];
    if let Some(criteria) = request.list.as_mut() {
        criteria.patterns = vec!["(".to_string()];
    }

    let result = with_session(&path, |store| apply_request(store, &request, &now()));
    assert!(matches!(
        result,
        Err(SessionError::Body(ServiceError::Filter(_)))
    ));

    let listing = run(&path, &list_all()).listing.unwrap();
    assert!(listing.is_empty());
}

#[test]
fn unknown_ids_do_not_block_other_changes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todo.db");

    let report = run(
        &path,
        &TodoRequest {
            complete: vec![ItemId(42)],
            add_lines: vec!["still added".to_string()],
            ..TodoRequest::default()
        },
    );
    assert_eq!(report.unknown_ids, [ItemId(42)]);

    let listing = run(&path, &list_all()).listing.unwrap();
    assert_eq!(listed_texts(&listing), ["still added"]);
}
