use rusqlite::Connection;
use serde_json::json;
use std::time::{SystemTime, UNIX_EPOCH};
use todos_core::db::open_db_in_memory;
use todos_core::{
    FailureReason, InstanceState, JsonMap, ListService, SqliteListRepository,
    SqliteTodosMainRepository, TodoInstance, TodosMainRepository, Validator,
};
use uuid::Uuid;

const AWID: &str = "ws-1";

fn payload(value: serde_json::Value) -> JsonMap {
    value.as_object().expect("payload must be an object").clone()
}

fn setup(conn: &Connection) -> ListService<SqliteTodosMainRepository<'_>, SqliteListRepository<'_>>
{
    SqliteTodosMainRepository::new(conn)
        .create_instance(&TodoInstance::new(AWID, InstanceState::Active))
        .unwrap();
    ListService::new(
        Validator::new(),
        SqliteTodosMainRepository::new(conn),
        SqliteListRepository::new(conn),
    )
}

fn epoch_ms_offset(offset_ms: i64) -> i64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64;
    now + offset_ms
}

fn count_lists(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM list;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn create_then_get_round_trips_caller_fields() {
    let conn = open_db_in_memory().unwrap();
    let service = setup(&conn);
    let deadline = epoch_ms_offset(86_400_000);

    let created = service
        .create(
            AWID,
            &payload(json!({
                "name": "groceries",
                "deadline": deadline,
                "description": "weekly shopping"
            })),
        )
        .unwrap();
    assert!(created.warnings.is_empty());
    assert_eq!(created.list.name, "groceries");
    assert_eq!(created.list.deadline, Some(deadline));

    let fetched = service
        .get(AWID, &payload(json!({ "id": created.list.id.to_string() })))
        .unwrap();
    assert_eq!(fetched.list.name, "groceries");
    assert_eq!(fetched.list.deadline, Some(deadline));
    assert_eq!(
        fetched.list.data.get("description").and_then(|v| v.as_str()),
        Some("weekly shopping")
    );
}

#[test]
fn create_warns_about_unsupported_keys_but_persists_them() {
    let conn = open_db_in_memory().unwrap();
    let service = setup(&conn);

    let created = service
        .create(AWID, &payload(json!({ "name": "chores", "color": "red" })))
        .unwrap();
    assert_eq!(created.warnings.len(), 1);
    assert_eq!(
        created.warnings[0].code,
        "todos-main/list/create/unsupportedKeys"
    );
    assert_eq!(
        created.warnings[0].unsupported_keys,
        vec!["color".to_string()]
    );
    assert_eq!(
        created.list.data.get("color").and_then(|v| v.as_str()),
        Some("red")
    );
}

#[test]
fn create_with_past_deadline_fails_and_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let service = setup(&conn);

    let err = service
        .create(
            AWID,
            &payload(json!({ "name": "late", "deadline": epoch_ms_offset(-86_400_000) })),
        )
        .unwrap_err();
    assert_eq!(err.code(), "todos-main/list/create/deadlineDateIsFromThePast");
    assert!(matches!(
        err.reason(),
        FailureReason::DeadlineDateIsFromThePast { .. }
    ));
    assert_eq!(count_lists(&conn), 0);
}

#[test]
fn create_with_invalid_payload_fails_before_any_write() {
    let conn = open_db_in_memory().unwrap();
    let service = setup(&conn);

    let err = service
        .create(AWID, &payload(json!({ "deadline": epoch_ms_offset(1000) })))
        .unwrap_err();
    assert_eq!(err.code(), "todos-main/list/create/invalidDtoIn");
    assert_eq!(count_lists(&conn), 0);
}

#[test]
fn get_of_unknown_list_fails() {
    let conn = open_db_in_memory().unwrap();
    let service = setup(&conn);

    let err = service
        .get(AWID, &payload(json!({ "id": Uuid::new_v4().to_string() })))
        .unwrap_err();
    assert_eq!(err.code(), "todos-main/list/get/listDoesNotExist");
}

#[test]
fn update_changes_named_fields_and_merges_data() {
    let conn = open_db_in_memory().unwrap();
    let service = setup(&conn);

    let created = service
        .create(AWID, &payload(json!({ "name": "errands", "description": "old" })))
        .unwrap();
    let deadline = epoch_ms_offset(3_600_000);

    let updated = service
        .update(
            AWID,
            &payload(json!({
                "id": created.list.id.to_string(),
                "name": "errands v2",
                "deadline": deadline,
                "priority": "high"
            })),
        )
        .unwrap();
    assert_eq!(updated.list.name, "errands v2");
    assert_eq!(updated.list.deadline, Some(deadline));
    // Untouched free-form fields survive, new ones merge in.
    assert_eq!(
        updated.list.data.get("description").and_then(|v| v.as_str()),
        Some("old")
    );
    assert_eq!(
        updated.list.data.get("priority").and_then(|v| v.as_str()),
        Some("high")
    );
}

#[test]
fn update_with_past_deadline_fails_and_leaves_the_list_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let service = setup(&conn);

    let created = service
        .create(AWID, &payload(json!({ "name": "stable" })))
        .unwrap();
    let err = service
        .update(
            AWID,
            &payload(json!({
                "id": created.list.id.to_string(),
                "name": "renamed",
                "deadline": epoch_ms_offset(-1000)
            })),
        )
        .unwrap_err();
    assert_eq!(err.code(), "todos-main/list/update/deadlineDateIsFromThePast");

    let fetched = service
        .get(AWID, &payload(json!({ "id": created.list.id.to_string() })))
        .unwrap();
    assert_eq!(fetched.list.name, "stable");
    assert_eq!(fetched.list.deadline, None);
}

#[test]
fn update_of_unknown_list_fails() {
    let conn = open_db_in_memory().unwrap();
    let service = setup(&conn);

    let err = service
        .update(
            AWID,
            &payload(json!({ "id": Uuid::new_v4().to_string(), "name": "ghost" })),
        )
        .unwrap_err();
    assert_eq!(err.code(), "todos-main/list/update/listDoesNotExist");
}

#[test]
fn lists_are_scoped_to_their_tenant() {
    let conn = open_db_in_memory().unwrap();
    let service = setup(&conn);
    SqliteTodosMainRepository::new(&conn)
        .create_instance(&TodoInstance::new("ws-2", InstanceState::Active))
        .unwrap();

    let created = service
        .create(AWID, &payload(json!({ "name": "mine" })))
        .unwrap();

    let err = service
        .get("ws-2", &payload(json!({ "id": created.list.id.to_string() })))
        .unwrap_err();
    assert_eq!(err.code(), "todos-main/list/get/listDoesNotExist");
}
