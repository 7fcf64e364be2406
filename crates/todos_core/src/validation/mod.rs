//! Declarative dtoIn validation.
//!
//! # Responsibility
//! - Hold one schema per use case and check candidate payloads against it.
//! - Separate fatal structural violations from non-fatal unsupported keys.
//!
//! # Invariants
//! - Validation never touches the store; it runs before any persistence
//!   access.
//! - Unsupported keys are reported, not stripped; callers decide what to do
//!   with them.

use crate::model::item::ItemState;
use crate::model::JsonMap;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// Named payload schema, one per use case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SchemaName {
    ListCreate,
    ListGet,
    ListUpdate,
    ItemCreate,
    ItemGet,
    ItemUpdate,
    ItemDelete,
    ItemSetFinalState,
    ItemList,
}

impl SchemaName {
    /// Stable schema identifier used in diagnostics.
    pub fn dto_in_type(self) -> &'static str {
        match self {
            Self::ListCreate => "listCreateDtoInType",
            Self::ListGet => "listGetDtoInType",
            Self::ListUpdate => "listUpdateDtoInType",
            Self::ItemCreate => "itemCreateDtoInType",
            Self::ItemGet => "itemGetDtoInType",
            Self::ItemUpdate => "itemUpdateDtoInType",
            Self::ItemDelete => "itemDeleteDtoInType",
            Self::ItemSetFinalState => "itemSetFinalStateDtoInType",
            Self::ItemList => "itemListDtoInType",
        }
    }

    fn fields(self) -> &'static [FieldSpec] {
        match self {
            Self::ListCreate => LIST_CREATE_FIELDS,
            Self::ListGet => LIST_GET_FIELDS,
            Self::ListUpdate => LIST_UPDATE_FIELDS,
            Self::ItemCreate => ITEM_CREATE_FIELDS,
            Self::ItemGet => ITEM_GET_FIELDS,
            Self::ItemUpdate => ITEM_UPDATE_FIELDS,
            Self::ItemDelete => ITEM_DELETE_FIELDS,
            Self::ItemSetFinalState => ITEM_SET_FINAL_STATE_FIELDS,
            Self::ItemList => ITEM_LIST_FIELDS,
        }
    }
}

const LIST_CREATE_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("name", FieldKind::Text),
    FieldSpec::optional("deadline", FieldKind::EpochMillis),
    FieldSpec::optional("description", FieldKind::Text),
];

const LIST_GET_FIELDS: &[FieldSpec] = &[FieldSpec::required("id", FieldKind::EntityId)];

const LIST_UPDATE_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("id", FieldKind::EntityId),
    FieldSpec::optional("name", FieldKind::Text),
    FieldSpec::optional("deadline", FieldKind::EpochMillis),
    FieldSpec::optional("description", FieldKind::Text),
];

const ITEM_CREATE_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("listId", FieldKind::EntityId),
    FieldSpec::optional("text", FieldKind::Text),
];

const ITEM_GET_FIELDS: &[FieldSpec] = &[FieldSpec::required("id", FieldKind::EntityId)];

const ITEM_UPDATE_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("id", FieldKind::EntityId),
    FieldSpec::optional("text", FieldKind::Text),
];

const ITEM_DELETE_FIELDS: &[FieldSpec] = &[FieldSpec::required("id", FieldKind::EntityId)];

const ITEM_SET_FINAL_STATE_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("id", FieldKind::EntityId),
    FieldSpec::required("state", FieldKind::FinalItemState),
];

const ITEM_LIST_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("listId", FieldKind::EntityId),
    FieldSpec::optional("state", FieldKind::ItemStateFilter),
    FieldSpec::optional("pageInfo", FieldKind::PageInfo),
];

/// Expected shape of one payload field.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Non-empty string.
    Text,
    /// String holding a UUID.
    EntityId,
    /// Integer epoch milliseconds.
    EpochMillis,
    /// `completed` or `cancelled`; `active` is not a legal target.
    FinalItemState,
    /// Any of the three item states.
    ItemStateFilter,
    /// Object with optional non-negative `pageIndex` and positive `pageSize`,
    /// both within `u32` range.
    PageInfo,
}

#[derive(Debug, Clone, Copy)]
struct FieldSpec {
    key: &'static str,
    kind: FieldKind,
    required: bool,
}

impl FieldSpec {
    const fn required(key: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            kind,
            required: true,
        }
    }

    const fn optional(key: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            kind,
            required: false,
        }
    }
}

/// One structural problem found in a payload. Always fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Payload key the problem refers to.
    pub field: String,
    /// Human-readable description of what is wrong.
    pub detail: String,
}

/// Non-fatal validation notice returned alongside a successful result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    /// Stable warning code, `<useCasePrefix>unsupportedKeys`.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// The offending payload keys.
    pub unsupported_keys: Vec<String>,
}

/// Outcome of checking one payload against one schema.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// Fatal structural violations. Empty means the payload is usable.
    pub violations: Vec<Violation>,
    /// Keys outside the schema. Non-fatal.
    pub unsupported_keys: Vec<String>,
}

impl ValidationResult {
    /// Returns whether the payload may be processed further.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Payload shape validator over the built-in schema registry.
///
/// Stateless; constructed once per service and shared by all its operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator;

impl Validator {
    pub fn new() -> Self {
        Self
    }

    /// Checks `payload` against the named schema.
    pub fn validate(&self, schema: SchemaName, payload: &JsonMap) -> ValidationResult {
        let fields = schema.fields();
        let mut result = ValidationResult::default();

        for spec in fields {
            match payload.get(spec.key) {
                Some(value) => check_field(spec, value, &mut result.violations),
                None if spec.required => result.violations.push(Violation {
                    field: spec.key.to_string(),
                    detail: "required key is missing".to_string(),
                }),
                None => {}
            }
        }

        for key in payload.keys() {
            if !fields.iter().any(|spec| spec.key == key) {
                result.unsupported_keys.push(key.clone());
            }
        }

        result
    }
}

fn check_field(spec: &FieldSpec, value: &Value, violations: &mut Vec<Violation>) {
    let detail = match spec.kind {
        FieldKind::Text => match value.as_str() {
            Some(text) if !text.trim().is_empty() => None,
            Some(_) => Some("must not be empty".to_string()),
            None => Some("must be a string".to_string()),
        },
        FieldKind::EntityId => match value.as_str() {
            Some(text) => match Uuid::parse_str(text) {
                Ok(_) => None,
                Err(_) => Some(format!("`{text}` is not a valid id")),
            },
            None => Some("must be an id string".to_string()),
        },
        FieldKind::EpochMillis => match value.as_i64() {
            Some(_) => None,
            None => Some("must be an integer epoch-milliseconds timestamp".to_string()),
        },
        FieldKind::FinalItemState => match value.as_str().and_then(ItemState::parse) {
            Some(state) if state.is_terminal() => None,
            Some(state) => Some(format!("`{}` is not a final state", state.as_str())),
            None => Some("must be `completed` or `cancelled`".to_string()),
        },
        FieldKind::ItemStateFilter => match value.as_str() {
            Some(text) => match ItemState::parse(text) {
                Some(_) => None,
                None => Some(format!("`{text}` is not an item state")),
            },
            None => Some("must be an item state string".to_string()),
        },
        FieldKind::PageInfo => check_page_info(value),
    };

    if let Some(detail) = detail {
        violations.push(Violation {
            field: spec.key.to_string(),
            detail,
        });
    }
}

fn check_page_info(value: &Value) -> Option<String> {
    let Some(object) = value.as_object() else {
        return Some("must be an object".to_string());
    };

    if let Some(page_index) = object.get("pageIndex") {
        match page_index.as_i64() {
            Some(index) if index >= 0 && index <= i64::from(u32::MAX) => {}
            _ => return Some("pageIndex must be a non-negative 32-bit integer".to_string()),
        }
    }
    if let Some(page_size) = object.get("pageSize") {
        match page_size.as_i64() {
            Some(size) if size >= 1 && size <= i64::from(u32::MAX) => {}
            _ => return Some("pageSize must be a positive 32-bit integer".to_string()),
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::{SchemaName, Validator};
    use serde_json::json;

    fn payload(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
        value.as_object().expect("payload must be an object").clone()
    }

    #[test]
    fn accepts_minimal_valid_payloads() {
        let validator = Validator::new();
        let result = validator.validate(SchemaName::ListCreate, &payload(json!({ "name": "groceries" })));
        assert!(result.is_valid());
        assert!(result.unsupported_keys.is_empty());
    }

    #[test]
    fn missing_required_key_is_a_violation() {
        let validator = Validator::new();
        let result = validator.validate(SchemaName::ListCreate, &payload(json!({ "deadline": 10 })));
        assert!(!result.is_valid());
        assert_eq!(result.violations[0].field, "name");
    }

    #[test]
    fn ill_typed_optional_key_is_a_violation() {
        let validator = Validator::new();
        let result = validator.validate(
            SchemaName::ListCreate,
            &payload(json!({ "name": "n", "deadline": "tomorrow" })),
        );
        assert!(!result.is_valid());
        assert_eq!(result.violations[0].field, "deadline");
    }

    #[test]
    fn extra_keys_are_unsupported_not_fatal() {
        let validator = Validator::new();
        let result = validator.validate(
            SchemaName::ListCreate,
            &payload(json!({ "name": "n", "color": "red" })),
        );
        assert!(result.is_valid());
        assert_eq!(result.unsupported_keys, vec!["color".to_string()]);
    }

    #[test]
    fn final_state_rejects_active() {
        let validator = Validator::new();
        let id = uuid::Uuid::new_v4().to_string();
        let result = validator.validate(
            SchemaName::ItemSetFinalState,
            &payload(json!({ "id": id, "state": "active" })),
        );
        assert!(!result.is_valid());
        assert_eq!(result.violations[0].field, "state");
    }

    #[test]
    fn entity_id_must_be_a_uuid() {
        let validator = Validator::new();
        let result = validator.validate(SchemaName::ItemGet, &payload(json!({ "id": "not-an-id" })));
        assert!(!result.is_valid());
    }

    #[test]
    fn page_info_bounds_are_checked() {
        let validator = Validator::new();
        let bad = validator.validate(
            SchemaName::ItemList,
            &payload(json!({ "pageInfo": { "pageSize": 0 } })),
        );
        assert!(!bad.is_valid());

        let good = validator.validate(
            SchemaName::ItemList,
            &payload(json!({ "pageInfo": { "pageIndex": 2, "pageSize": 50 } })),
        );
        assert!(good.is_valid());
    }

    #[test]
    fn page_info_rejects_values_beyond_u32() {
        let validator = Validator::new();
        let oversized = validator.validate(
            SchemaName::ItemList,
            &payload(json!({ "pageInfo": { "pageSize": u32::MAX as i64 + 1 } })),
        );
        assert!(!oversized.is_valid());
        assert_eq!(oversized.violations[0].field, "pageInfo");

        let at_limit = validator.validate(
            SchemaName::ItemList,
            &payload(json!({ "pageInfo": { "pageIndex": u32::MAX, "pageSize": u32::MAX } })),
        );
        assert!(at_limit.is_valid());
    }

    #[test]
    fn every_schema_has_a_resolvable_field_table() {
        let validator = Validator::new();
        let schemas = [
            SchemaName::ListCreate,
            SchemaName::ListGet,
            SchemaName::ListUpdate,
            SchemaName::ItemCreate,
            SchemaName::ItemGet,
            SchemaName::ItemUpdate,
            SchemaName::ItemDelete,
            SchemaName::ItemSetFinalState,
            SchemaName::ItemList,
        ];
        for schema in schemas {
            let result = validator.validate(schema, &payload(json!({ "stray": true })));
            assert_eq!(
                result.unsupported_keys,
                vec!["stray".to_string()],
                "schema {:?} must flag keys outside its field table",
                schema
            );
        }
    }
}
