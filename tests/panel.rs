use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use todo_tui::api::ApiClient;
use todo_tui::form::{ListDraft, TaskDraft, UserDraft};
use todo_tui::models::{Task, TodoList, User};
use todo_tui::panel::ResourcePanel;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn user(id: u64, username: &str) -> serde_json::Value {
    json!({
        "id": id,
        "email": format!("{}@example.com", username),
        "username": username,
        "created_at": "2024-01-15T10:00:00",
        "updated_at": "2024-01-15T10:00:00"
    })
}

fn task(id: u64, completed: bool) -> serde_json::Value {
    json!({
        "id": id,
        "title": "Water plants",
        "description": "",
        "completed": completed,
        "priority": 1,
        "due_date": null,
        "list_id": 3,
        "created_at": "2024-01-15T10:00:00",
        "updated_at": "2024-01-15T10:00:00"
    })
}

fn chores() -> serde_json::Value {
    json!({
        "id": 3,
        "name": "Chores",
        "description": null,
        "user_id": 1,
        "created_at": "2024-01-15T10:00:00",
        "updated_at": "2024-01-15T10:00:00"
    })
}

async fn serve(server: &MockServer, verb: &str, route: &str, body: serde_json::Value) {
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn requests(server: &MockServer, verb: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.method.as_str() == verb)
        .count()
}

#[tokio::test]
async fn test_mount_loads_collection_and_leaves_loading_state() {
    let server = MockServer::start().await;
    serve(&server, "GET", "/users/", json!([user(1, "alice"), user(2, "bob")])).await;

    let client = ApiClient::new(&server.uri()).unwrap();
    let mut panel = ResourcePanel::<User>::mount(client);
    assert!(panel.loading);

    panel.next_event().await;

    assert!(!panel.loading);
    let names: Vec<&str> = panel.collection.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, vec!["alice", "bob"]);
    assert_eq!(panel.state.selected(), Some(0));
}

#[tokio::test]
async fn test_failed_mount_load_still_clears_loading() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri()).unwrap();
    let mut panel = ResourcePanel::<User>::mount(client);
    panel.next_event().await;

    assert!(!panel.loading);
    assert!(panel.collection.is_empty());
}

#[tokio::test]
async fn test_create_resets_draft_and_reloads() {
    let server = MockServer::start().await;
    serve(&server, "GET", "/users/", json!([])).await;

    let client = ApiClient::new(&server.uri()).unwrap();
    let mut panel = ResourcePanel::<User>::mount(client);
    panel.next_event().await;
    assert!(panel.collection.is_empty());

    server.reset().await;
    Mock::given(method("POST"))
        .and(path("/users/"))
        .and(body_json(json!({
            "email": "a@b.com",
            "username": "alice",
            "password": "x"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(user(7, "alice")))
        .expect(1)
        .mount(&server)
        .await;
    serve(&server, "GET", "/users/", json!([user(7, "alice")])).await;

    panel.draft = UserDraft {
        email: "a@b.com".to_string(),
        username: "alice".to_string(),
        password: "x".to_string(),
    };
    assert!(panel.submit());

    panel.next_event().await; // created
    assert_eq!(panel.draft, UserDraft::default());
    assert!(!panel.loading);

    panel.next_event().await; // reloaded
    assert_eq!(panel.collection.len(), 1);
    assert_eq!(panel.collection[0].id, 7);
    assert_eq!(panel.collection[0].created_at, "2024-01-15T10:00:00");
}

#[tokio::test]
async fn test_failed_create_keeps_draft_and_skips_reload() {
    let server = MockServer::start().await;
    serve(&server, "GET", "/users/", json!([])).await;
    Mock::given(method("POST"))
        .and(path("/users/"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Email already registered"))
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri()).unwrap();
    let mut panel = ResourcePanel::<User>::mount(client);
    panel.next_event().await;

    let draft = UserDraft {
        email: "a@b.com".to_string(),
        username: "alice".to_string(),
        password: "x".to_string(),
    };
    panel.draft = draft.clone();
    assert!(panel.submit());
    panel.next_event().await;

    assert_eq!(panel.draft, draft);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(panel.pump(), 0);
    assert_eq!(requests(&server, "GET").await, 1);
}

#[tokio::test]
async fn test_unselected_owner_issues_no_request() {
    let server = MockServer::start().await;
    serve(&server, "GET", "/lists/", json!([chores()])).await;
    serve(&server, "GET", "/users/", json!([user(1, "alice")])).await;
    Mock::given(method("POST"))
        .and(path("/lists/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chores()))
        .expect(0)
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri()).unwrap();
    let mut panel = ResourcePanel::<TodoList>::mount(client);
    panel.next_event().await;
    panel.next_event().await;

    panel.draft = ListDraft {
        name: "Groceries".to_string(),
        ..Default::default()
    };
    assert!(!panel.submit());

    let rows = panel.rows("%Y-%m-%d");
    assert_eq!(rows, vec![vec!["3", "Chores", "N/A", "alice", "2024-01-15"]]);
}

#[tokio::test]
async fn test_unselected_list_issues_no_request() {
    let server = MockServer::start().await;
    serve(&server, "GET", "/tasks/", json!([])).await;
    serve(&server, "GET", "/lists/", json!([chores()])).await;
    Mock::given(method("POST"))
        .and(path("/tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(task(6, false)))
        .expect(0)
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri()).unwrap();
    let mut panel = ResourcePanel::<Task>::mount(client);
    panel.next_event().await;
    panel.next_event().await;

    panel.draft = TaskDraft {
        title: "Water plants !2".to_string(),
        ..Default::default()
    };
    assert!(!panel.submit());

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(requests(&server, "POST").await, 0);
    assert_eq!(panel.draft.list_id, None);
}

#[tokio::test]
async fn test_delete_reloads_even_when_it_fails() {
    let server = MockServer::start().await;
    serve(&server, "GET", "/tasks/", json!([task(5, false)])).await;
    serve(&server, "GET", "/lists/", json!([])).await;

    let client = ApiClient::new(&server.uri()).unwrap();
    let mut panel = ResourcePanel::<Task>::mount(client);
    panel.next_event().await;
    panel.next_event().await;
    assert_eq!(panel.rows("%Y-%m-%d")[0][4], "Unknown");

    server.reset().await;
    Mock::given(method("DELETE"))
        .and(path("/tasks/5"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    serve(&server, "GET", "/tasks/", json!([])).await;

    panel.delete_selected();
    panel.next_event().await; // deleted
    panel.next_event().await; // reloaded

    assert!(panel.collection.iter().all(|t| t.id != 5));
    assert_eq!(panel.state.selected(), None);
}

#[tokio::test]
async fn test_toggle_twice_restores_completion() {
    let server = MockServer::start().await;
    serve(&server, "GET", "/tasks/", json!([task(5, false)])).await;
    serve(&server, "GET", "/lists/", json!([chores()])).await;

    let client = ApiClient::new(&server.uri()).unwrap();
    let mut panel = ResourcePanel::<Task>::mount(client);
    panel.next_event().await;
    panel.next_event().await;
    assert_eq!(panel.rows("%Y-%m-%d")[0][4], "Chores");

    for completed in [true, false] {
        server.reset().await;
        Mock::given(method("PUT"))
            .and(path("/tasks/5"))
            .and(body_json(json!({ "completed": completed })))
            .respond_with(ResponseTemplate::new(200).set_body_json(task(5, completed)))
            .expect(1)
            .mount(&server)
            .await;
        serve(&server, "GET", "/tasks/", json!([task(5, completed)])).await;

        panel.toggle_selected();
        panel.next_event().await; // updated
        assert_eq!(panel.collection[0].completed, !completed);

        panel.next_event().await; // reloaded
        assert_eq!(panel.collection[0].completed, completed);
        server.verify().await;
    }
}

#[tokio::test]
async fn test_response_after_unmount_is_discarded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([user(1, "alice")]))
                .set_delay(Duration::from_millis(100)),
        )
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri()).unwrap();
    let panel = ResourcePanel::<User>::mount(client);
    drop(panel);

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(requests(&server, "GET").await, 1);
}
