use std::sync::Arc;

use http::Method;
use serde_json::{json, Value};
use storyadmin_client::{
    mock::{MockTransport, Reply},
    transport::Body,
    Api, ApiError, Chapter, Session, Story,
};
use storyadmin_common::time::{self, DateShift};
use storyadmin_controllers::{
    Access, ControlError, EditForm, PaginatedList, Phase, Route, SessionGuard, Submitted,
};

const SHIFT: DateShift = DateShift::hours(7);

fn api(mock: &MockTransport, session: Session) -> Api {
    Api::new("http://admin.test", Arc::new(mock.clone()), session).unwrap()
}

fn signed_in() -> Session {
    let session = Session::in_memory();
    session.login("token-1").unwrap();
    session
}

fn page_of(first: usize, count: usize, total: u64) -> Reply {
    let list: Value = (first..first + count)
        .map(|i| json!({ "story_id": format!("s{}", i), "title": format!("Story {}", i) }))
        .collect();

    Reply::json(json!({ "data": { "list": list, "total": total } }))
}

fn sent_json(mock: &MockTransport, index: usize) -> Value {
    match &mock.requests()[index].body {
        Body::Json(body) => body.clone(),
        other => panic!("unexpected body {:?}", other),
    }
}

#[tokio::test]
async fn list_walks_pages_and_rejects_out_of_range() {
    let mock = MockTransport::default();
    mock.on(Method::GET, "/beapi/stories/list", page_of(0, 10, 25));
    mock.on(Method::GET, "/beapi/stories/list", page_of(20, 5, 25));

    let list = PaginatedList::new(api(&mock, signed_in()).stories(), 10);
    list.mount().await.unwrap();

    let state = list.snapshot();
    assert_eq!(state.total_pages, 3);
    assert_eq!(state.items.len(), 10);

    let err = list.go_to(4).await.unwrap_err();
    assert_eq!(err, ControlError::PageOutOfRange { page: 4, total_pages: 3 });
    assert_eq!(mock.requests().len(), 1);

    list.go_to(3).await.unwrap();

    let state = list.snapshot();
    assert_eq!(state.current_page, 3);
    assert_eq!(state.items.len(), 5);
    assert_eq!(state.items[0].story_id, "s20");
    assert_eq!(mock.requests()[1].query(), Some("page=3&size=10"));
    assert_eq!(list.pager().render(), "‹ 1 2 [3]");
}

#[tokio::test]
async fn filter_change_starts_over_from_page_one() {
    let mock = MockTransport::default();
    mock.on(Method::GET, "/beapi/stories/list", page_of(0, 10, 25));
    mock.on(Method::GET, "/beapi/stories/list", page_of(10, 10, 25));
    mock.on(Method::GET, "/beapi/stories/list", page_of(0, 2, 2));

    let list = PaginatedList::new(api(&mock, signed_in()).stories(), 10);
    list.mount().await.unwrap();
    list.next().await.unwrap();
    assert_eq!(list.snapshot().current_page, 2);

    list.set_filter("  dragon ").await.unwrap();

    let state = list.snapshot();
    assert_eq!(state.current_page, 1);
    assert_eq!(state.filter.as_deref(), Some("dragon"));
    assert_eq!(state.total_pages, 1);
    assert_eq!(mock.requests()[2].query(), Some("page=1&size=10&search=dragon"));
}

#[tokio::test]
async fn failed_fetch_keeps_previous_rows() {
    let mock = MockTransport::default();
    mock.on(Method::GET, "/beapi/stories/list", page_of(0, 10, 25));
    mock.on(Method::GET, "/beapi/stories/list", Reply::status(500, json!({ "message": "boom" })));

    let list = PaginatedList::new(api(&mock, signed_in()).stories(), 10);
    list.mount().await.unwrap();

    let err = list.go_to(2).await.unwrap_err();
    assert!(matches!(err, ControlError::Api(ApiError::Server { .. })));

    let state = list.snapshot();
    assert_eq!(state.current_page, 1);
    assert_eq!(state.items.len(), 10);
    assert_eq!(state.items[0].story_id, "s0");
    assert_eq!(state.total, 25);
    assert!(matches!(state.last_error, Some(ApiError::Server { .. })));
    assert_eq!(list.pager().render(), "[1] 2 3 ›");
}

#[tokio::test]
async fn failed_filter_change_keeps_the_old_filter() {
    let mock = MockTransport::default();
    mock.on(Method::GET, "/beapi/stories/list", page_of(0, 10, 25));
    mock.on(Method::GET, "/beapi/stories/list", page_of(10, 10, 25));
    mock.on(Method::GET, "/beapi/stories/list", Reply::fail("down"));
    mock.on(Method::GET, "/beapi/stories/list", page_of(20, 5, 25));

    let list = PaginatedList::new(api(&mock, signed_in()).stories(), 10);
    list.mount().await.unwrap();
    list.go_to(2).await.unwrap();

    assert!(list.set_filter("dragon").await.is_err());

    let state = list.snapshot();
    assert_eq!(state.current_page, 2);
    assert_eq!(state.filter, None);
    assert_eq!(state.items[0].story_id, "s10");

    list.next().await.unwrap();
    assert_eq!(list.snapshot().current_page, 3);
    assert_eq!(mock.requests()[3].query(), Some("page=3&size=10"));
}

#[tokio::test]
async fn pages_below_one_never_reach_the_network() {
    let mock = MockTransport::default();
    mock.on(Method::GET, "/beapi/stories/list", page_of(0, 10, 25));

    let list = PaginatedList::new(api(&mock, signed_in()).stories(), 10);
    list.mount().await.unwrap();
    let sent = mock.requests().len();

    assert_eq!(
        list.go_to(0).await.unwrap_err(),
        ControlError::PageOutOfRange { page: 0, total_pages: 3 }
    );
    assert_eq!(
        list.previous().await.unwrap_err(),
        ControlError::PageOutOfRange { page: 0, total_pages: 3 }
    );
    assert_eq!(mock.requests().len(), sent);
    assert_eq!(list.snapshot().current_page, 1);
}

#[tokio::test]
async fn slow_answer_for_an_older_page_is_dropped() {
    let mock = MockTransport::default();
    mock.on(Method::GET, "/beapi/stories/list", page_of(0, 10, 25));
    mock.on(Method::GET, "/beapi/stories/list", page_of(10, 10, 25).after(50));
    mock.on(Method::GET, "/beapi/stories/list", page_of(20, 5, 25));

    let list = PaginatedList::new(api(&mock, signed_in()).stories(), 10);
    list.mount().await.unwrap();

    let (second, third) = tokio::join!(list.go_to(2), list.go_to(3));
    second.unwrap();
    third.unwrap();

    let state = list.snapshot();
    assert_eq!(state.current_page, 3);
    assert_eq!(state.items.len(), 5);
    assert_eq!(state.items[0].story_id, "s20");
}

#[tokio::test]
async fn removing_a_row_drops_it_locally() {
    let mock = MockTransport::default();
    mock.on(Method::GET, "/beapi/stories/list", page_of(0, 3, 3));
    mock.on(Method::DELETE, "/beapi/stories/delete/s1", Reply::json(json!({ "message": "ok" })));

    let list = PaginatedList::new(api(&mock, signed_in()).stories(), 10);
    list.mount().await.unwrap();
    list.remove("s1").await.unwrap();

    let ids: Vec<_> = list.snapshot().items.into_iter().map(|s| s.story_id).collect();
    assert_eq!(ids, vec!["s0", "s2"]);
}

#[tokio::test]
async fn expired_token_sends_the_operator_to_sign_in() {
    let mock = MockTransport::default();
    mock.on(Method::GET, "/beapi/stories/list", Reply::status(401, json!({})));

    let session = signed_in();
    let mut guard = SessionGuard::new(session.clone());
    assert_eq!(guard.check(), Access::Authorized);

    let list = PaginatedList::new(api(&mock, session.clone()).stories(), 10);
    let err = list.mount().await.unwrap_err();

    assert_eq!(err, ControlError::Api(ApiError::Unauthorized));
    assert!(!session.is_present());

    guard.reset();
    assert_eq!(guard.enter(|| ()), Err(Route::SignIn));
}

#[tokio::test]
async fn untouched_story_round_trips() {
    let mock = MockTransport::default();
    mock.on(
        Method::GET,
        "/beapi/stories/detail/s1",
        Reply::json(json!({
            "data": {
                "story_id": "s1",
                "title": "Dragon",
                "url_key": "dragon",
                "description": "",
                "is_active": true,
                "is_full": false,
                "is_hot": true,
                "status": "completed",
                "publish_date": "2024-05-01 10:00:00",
                "translator": "",
                "source": "",
                "author": { "author_id": "a7", "author_title": "Ann" },
                "categories": [{ "category_id": "c1", "category_name": "Fantasy" }],
                "path_image": "/media/s1.png",
                "total_chapters": 40,
            }
        })),
    );
    mock.on(Method::PUT, "/beapi/stories/update/s1", Reply::json(json!({ "message": "ok" })));

    let mut form = EditForm::<Story>::open(api(&mock, signed_in()).stories(), "s1", SHIFT).await;
    assert_eq!(form.phase(), &Phase::Loaded);
    assert_eq!(form.entity().map(|s| s.total_chapters), Some(40));

    assert_eq!(form.submit().await.unwrap(), Submitted::Saved);
    assert_eq!(form.phase(), &Phase::Saved);

    let body = sent_json(&mock, 1);
    assert_eq!(body["publish_date"], json!("2024-05-01 10:00:00"));
    assert_eq!(body["is_active"], json!(true));
    assert_eq!(body["is_full"], json!(false));
    assert_eq!(body["status"], json!("completed"));
    assert_eq!(body["author_id"], json!("a7"));
    assert_eq!(body["categories"], json!(["c1"]));
    assert!(body.get("url_key").is_none());
    assert!(body.get("total_chapters").is_none());
}

#[tokio::test]
async fn created_story_continues_on_its_edit_screen() {
    let mock = MockTransport::default();
    mock.on(Method::POST, "/beapi/stories/create", Reply::json(json!({ "data": { "story_id": "s42" } })));

    let mut form = EditForm::<Story>::create(api(&mock, signed_in()).stories(), SHIFT);
    form.input("title", "X").unwrap();

    let submitted = form.submit().await.unwrap();

    match &submitted {
        Submitted::Created { id, route } => {
            assert_eq!(id, "s42");
            assert_eq!(route.to_string(), "/stories/edit?storyId=s42");
        }
        other => panic!("unexpected outcome {:?}", other),
    }

    let body = sent_json(&mock, 0);
    assert_eq!(body["title"], json!("X"));
    assert_eq!(body["story_id"], json!("auto"));
    assert_eq!(body["is_active"], json!(true));

    assert!(matches!(form.input("title", "Y"), Err(ControlError::NotReady(_))));
}

#[tokio::test]
async fn default_dates_are_sent_as_the_current_utc_time() {
    let mock = MockTransport::default();
    mock.on(Method::POST, "/beapi/stories/create", Reply::json(json!({ "data": { "story_id": "s43" } })));

    let before = time::now();
    let mut form = EditForm::<Story>::create(api(&mock, signed_in()).stories(), SHIFT);
    form.input("title", "X").unwrap();
    form.submit().await.unwrap();
    let after = time::now();

    let body = sent_json(&mock, 0);
    let sent = body["publish_date"].as_str().map(time::parse_timestamp).unwrap().unwrap();

    assert!(before <= sent && sent <= after, "sent {} outside {}..={}", sent, before, after);
}

#[tokio::test]
async fn network_failure_keeps_the_edits() {
    let mock = MockTransport::default();
    mock.on(
        Method::GET,
        "/beapi/chapters/detail/c1",
        Reply::json(json!({
            "data": {
                "chapter_id": "c1",
                "story_id": "s1",
                "title": "One",
                "short_title": "1",
                "ordered": 1,
                "status": "draft",
                "created_date": "2024-01-01 00:00:00",
                "updated_date": "2024-01-01 00:00:00",
            }
        })),
    );
    mock.on(Method::PUT, "/beapi/chapters/update/c1", Reply::fail("connection reset"));

    let session = signed_in();
    let mut form = EditForm::<Chapter>::open(api(&mock, session.clone()).chapters(), "c1", SHIFT).await;
    form.input("title", "One, revised").unwrap();

    let err = form.submit().await.unwrap_err();

    assert!(matches!(err, ControlError::Api(ApiError::Transport(_))));
    assert!(matches!(form.phase(), Phase::Failed(ApiError::Transport(_))));
    assert_eq!(form.form().text("title"), Some("One, revised"));
    assert!(session.is_present());
}

#[tokio::test]
async fn validation_gap_never_reaches_the_network() {
    let mock = MockTransport::default();
    mock.on(
        Method::GET,
        "/beapi/chapters/detail/c1",
        Reply::json(json!({
            "data": { "chapter_id": "c1", "title": "One", "short_title": "1", "ordered": 1 }
        })),
    );

    let mut form = EditForm::<Chapter>::open(api(&mock, signed_in()).chapters(), "c1", SHIFT).await;
    form.input("short_title", "  ").unwrap();

    let err = form.submit().await.unwrap_err();

    assert!(matches!(err, ControlError::Api(ApiError::Validation(_))));
    assert_eq!(form.phase(), &Phase::Loaded);
    assert_eq!(mock.requests().len(), 1);
}

#[tokio::test]
async fn failed_load_blocks_editing() {
    let mock = MockTransport::default();
    mock.on(Method::GET, "/beapi/stories/detail/s404", Reply::json(json!({ "data": null })));

    let mut form = EditForm::<Story>::open(api(&mock, signed_in()).stories(), "s404", SHIFT).await;

    assert!(matches!(form.phase(), Phase::Failed(ApiError::Decode(_))));
    assert!(form.entity().is_none());
    assert!(matches!(form.submit().await, Err(ControlError::NotReady(_))));
}
