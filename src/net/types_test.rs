use super::*;

// =============================================================
// Helpers
// =============================================================

fn make_task() -> Task {
    Task {
        id: 7,
        title: "Buy milk".to_owned(),
        description: None,
        emoji: "🥛".to_owned(),
        completed: false,
        created_at: "2025-01-02T08:00:00Z".to_owned(),
        updated_at: "2025-01-02T08:00:00Z".to_owned(),
    }
}

// =============================================================
// User
// =============================================================

#[test]
fn user_accepts_camel_case_public_access() {
    let user: User = serde_json::from_str(r#"{"id":1,"username":"alice","publicAccess":true}"#).unwrap();
    assert_eq!(user.public_access, Some(true));
    assert_eq!(user.email, None);
}

#[test]
fn user_serializes_snake_case_and_skips_absent_fields() {
    let user = User { id: 1, username: "alice".to_owned(), email: None, public_access: Some(false), readonly: None };
    let json = serde_json::to_value(&user).unwrap();
    assert_eq!(json, serde_json::json!({"id": 1, "username": "alice", "public_access": false}));
}

#[test]
fn login_response_ignores_message_field() {
    let raw = r#"{"user":{"id":3,"username":"bob","public_access":false},"token":"abc","message":"ok"}"#;
    let resp: LoginResponse = serde_json::from_str(raw).unwrap();
    assert_eq!(resp.token, "abc");
    assert_eq!(resp.user.id, 3);
}

// =============================================================
// ApiEnvelope
// =============================================================

#[test]
fn envelope_into_data_returns_payload() {
    let env: ApiEnvelope<UserSettings> = serde_json::from_str(r#"{"data":{"public_access":true}}"#).unwrap();
    assert_eq!(env.into_data().unwrap(), UserSettings { public_access: true });
}

#[test]
fn envelope_with_extra_data_fields_still_decodes_settings() {
    let raw = r#"{"success":true,"data":{"id":1,"username":"a","public_access":false},"message":"ok"}"#;
    let env: ApiEnvelope<UserSettings> = serde_json::from_str(raw).unwrap();
    assert_eq!(env.into_data().unwrap(), UserSettings { public_access: false });
}

#[test]
fn envelope_unsuccessful_is_rejected() {
    let raw = r#"{"success":false,"data":null,"message":"username taken"}"#;
    let env: ApiEnvelope<User> = serde_json::from_str(raw).unwrap();
    let err = env.into_data().unwrap_err();
    assert_eq!(err.reason(), FailureReason::Rejected);
    assert!(err.to_string().contains("username taken"));
}

#[test]
fn envelope_missing_data_is_decode_error() {
    let env: ApiEnvelope<User> = serde_json::from_str(r#"{"success":true}"#).unwrap();
    assert_eq!(env.into_data().unwrap_err().reason(), FailureReason::Decode);
}

// =============================================================
// ApiError
// =============================================================

#[test]
fn api_error_reasons() {
    assert_eq!(ApiError::Transport("x".into()).reason(), FailureReason::Transport);
    assert_eq!(ApiError::HttpClientBuild("x".into()).reason(), FailureReason::Transport);
    assert_eq!(ApiError::Decode("x".into()).reason(), FailureReason::Decode);
    let status = ApiError::Status { status: 401, body: String::new() };
    assert_eq!(status.reason(), FailureReason::Status);
    assert_eq!(status.status(), Some(401));
    assert_eq!(ApiError::Transport("x".into()).status(), None);
}

// =============================================================
// Task / NewTask / TaskPatch
// =============================================================

#[test]
fn task_deserializes_without_description() {
    let raw = r#"{"id":1,"title":"t","emoji":"✅","completed":true,"created_at":"a","updated_at":"b"}"#;
    let task: Task = serde_json::from_str(raw).unwrap();
    assert_eq!(task.description, None);
    assert!(task.completed);
}

#[test]
fn task_merge_takes_every_server_field() {
    let mut task = make_task();
    let mut server = make_task();
    server.completed = true;
    server.description = Some("2 litres".to_owned());
    server.updated_at = "2025-01-02T09:00:00Z".to_owned();
    task.merge(server.clone());
    assert_eq!(task, server);
}

#[test]
fn new_task_omits_missing_description() {
    let body = NewTask { title: "t".to_owned(), description: None, emoji: "🥛".to_owned() };
    assert_eq!(serde_json::to_value(&body).unwrap(), serde_json::json!({"title": "t", "emoji": "🥛"}));
}

#[test]
fn task_patch_completed_serializes_single_field() {
    let patch = TaskPatch::completed(true);
    assert_eq!(serde_json::to_value(&patch).unwrap(), serde_json::json!({"completed": true}));
    assert!(!patch.is_empty());
    assert!(TaskPatch::default().is_empty());
}

#[test]
fn history_day_decodes_nested_tasks() {
    let raw = serde_json::json!([{
        "date": "2025-01-02",
        "count": 1,
        "completed_count": 0,
        "tasks": [serde_json::to_value(make_task()).unwrap()],
    }]);
    let days: Vec<HistoryDay> = serde_json::from_value(raw).unwrap();
    assert_eq!(days.len(), 1);
    assert_eq!(days[0].tasks, vec![make_task()]);
}
