use rusqlite::Connection;
use serde_json::json;
use todos_core::db::open_db_in_memory;
use todos_core::{
    InstanceState, ItemId, ItemRepository, ItemState, ItemService, JsonMap, ListId, ListService,
    SqliteItemRepository, SqliteListRepository, SqliteTodosMainRepository, TodoInstance,
    TodosMainRepository, Validator,
};

const AWID: &str = "ws-1";

fn payload(value: serde_json::Value) -> JsonMap {
    value.as_object().expect("payload must be an object").clone()
}

fn item_service(
    conn: &Connection,
) -> ItemService<SqliteTodosMainRepository<'_>, SqliteListRepository<'_>, SqliteItemRepository<'_>>
{
    ItemService::new(
        Validator::new(),
        SqliteTodosMainRepository::new(conn),
        SqliteListRepository::new(conn),
        SqliteItemRepository::new(conn),
    )
}

fn seed_tenant(conn: &Connection, awid: &str) -> ListId {
    SqliteTodosMainRepository::new(conn)
        .create_instance(&TodoInstance::new(awid, InstanceState::Active))
        .unwrap();
    let lists = ListService::new(
        Validator::new(),
        SqliteTodosMainRepository::new(conn),
        SqliteListRepository::new(conn),
    );
    lists
        .create(awid, &payload(json!({ "name": format!("{awid}-list") })))
        .unwrap()
        .list
        .id
}

fn seed_item(conn: &Connection, awid: &str, list_id: ListId, state: ItemState) -> ItemId {
    let items = item_service(conn);
    let created = items
        .create(awid, &payload(json!({ "listId": list_id.to_string() })))
        .unwrap();
    if state != ItemState::Active {
        SqliteItemRepository::new(conn)
            .set_final_state(awid, created.item.id, state)
            .unwrap();
    }
    created.item.id
}

/// Fixture: list A holds two active and one completed item, list B holds one
/// active item. Returns (list_a, list_b).
fn seed_fixture(conn: &Connection) -> (ListId, ListId) {
    let list_a = seed_tenant(conn, AWID);
    let lists = ListService::new(
        Validator::new(),
        SqliteTodosMainRepository::new(conn),
        SqliteListRepository::new(conn),
    );
    let list_b = lists
        .create(AWID, &payload(json!({ "name": "second" })))
        .unwrap()
        .list
        .id;

    seed_item(conn, AWID, list_a, ItemState::Active);
    seed_item(conn, AWID, list_a, ItemState::Active);
    seed_item(conn, AWID, list_a, ItemState::Completed);
    seed_item(conn, AWID, list_b, ItemState::Active);
    (list_a, list_b)
}

#[test]
fn list_with_list_id_and_state_filters_by_both() {
    let conn = open_db_in_memory().unwrap();
    let (list_a, _list_b) = seed_fixture(&conn);
    let items = item_service(&conn);

    let result = items
        .list(
            AWID,
            &payload(json!({ "listId": list_a.to_string(), "state": "active" })),
        )
        .unwrap();
    assert_eq!(result.page.total, 2);
    assert!(result
        .page
        .items
        .iter()
        .all(|item| item.list_id == list_a && item.state == ItemState::Active));
}

#[test]
fn list_with_state_only_filters_tenant_wide() {
    let conn = open_db_in_memory().unwrap();
    seed_fixture(&conn);
    let items = item_service(&conn);

    let result = items
        .list(AWID, &payload(json!({ "state": "completed" })))
        .unwrap();
    assert_eq!(result.page.total, 1);
    assert_eq!(result.page.items[0].state, ItemState::Completed);
}

#[test]
fn list_without_filters_returns_all_tenant_items() {
    let conn = open_db_in_memory().unwrap();
    seed_fixture(&conn);
    let items = item_service(&conn);

    let result = items.list(AWID, &payload(json!({}))).unwrap();
    assert_eq!(result.page.total, 4);
    assert_eq!(result.page.items.len(), 4);
}

#[test]
fn list_id_without_state_does_not_narrow_the_result() {
    let conn = open_db_in_memory().unwrap();
    let (list_a, _list_b) = seed_fixture(&conn);
    let items = item_service(&conn);

    let result = items
        .list(AWID, &payload(json!({ "listId": list_a.to_string() })))
        .unwrap();
    assert_eq!(result.page.total, 4);
}

#[test]
fn page_info_defaults_when_omitted() {
    let conn = open_db_in_memory().unwrap();
    seed_fixture(&conn);
    let items = item_service(&conn);

    let result = items.list(AWID, &payload(json!({}))).unwrap();
    assert_eq!(result.page.page_info.page_index, 0);
    assert_eq!(result.page.page_info.page_size, 1000);
}

#[test]
fn oversized_page_size_is_rejected_not_shrunk() {
    let conn = open_db_in_memory().unwrap();
    seed_fixture(&conn);
    let items = item_service(&conn);

    let err = items
        .list(
            AWID,
            &payload(json!({ "pageInfo": { "pageSize": u32::MAX as i64 + 1 } })),
        )
        .unwrap_err();
    assert_eq!(err.code(), "todos-main/item/list/invalidDtoIn");
}

#[test]
fn pagination_slices_the_result_and_keeps_the_total() {
    let conn = open_db_in_memory().unwrap();
    seed_fixture(&conn);
    let items = item_service(&conn);

    let first = items
        .list(
            AWID,
            &payload(json!({ "pageInfo": { "pageIndex": 0, "pageSize": 3 } })),
        )
        .unwrap();
    assert_eq!(first.page.items.len(), 3);
    assert_eq!(first.page.total, 4);

    let second = items
        .list(
            AWID,
            &payload(json!({ "pageInfo": { "pageIndex": 1, "pageSize": 3 } })),
        )
        .unwrap();
    assert_eq!(second.page.items.len(), 1);
    assert_eq!(second.page.total, 4);

    let first_ids: Vec<_> = first.page.items.iter().map(|item| item.id).collect();
    assert!(!first_ids.contains(&second.page.items[0].id));
}

#[test]
fn listing_never_crosses_tenant_boundaries() {
    let conn = open_db_in_memory().unwrap();
    seed_fixture(&conn);
    let other_list = seed_tenant(&conn, "ws-2");
    seed_item(&conn, "ws-2", other_list, ItemState::Active);
    let items = item_service(&conn);

    let mine = items.list(AWID, &payload(json!({}))).unwrap();
    assert_eq!(mine.page.total, 4);
    assert!(mine.page.items.iter().all(|item| item.awid == AWID));

    let theirs = items.list("ws-2", &payload(json!({}))).unwrap();
    assert_eq!(theirs.page.total, 1);
}
