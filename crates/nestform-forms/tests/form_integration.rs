//! Integration tests for the params -> form tree -> validation -> action
//! pipeline, covering:
//! 1. Flat forms: trimming, record defaults, coercion, idempotence
//! 2. Nested containers (has-one hash, has-many list of hashes)
//! 3. Nested forms carrying their own contract
//! 4. Params handling: param key, QueryDict policy, strict and lenient keys
//! 5. Actions: pre-check, service failures, dynamic calls

use std::sync::Arc;

use nestform_core::settings::Settings;
use nestform_core::settings_loader;
use nestform_core::{FormError, Value, ValueMap};
use nestform_forms::{
    ActionFailure, ActionResult, Association, FormClass, FormNode, HashRecord, Key, Record,
    RecordRef, Rule, Schema, SchemaContract, SchemaType,
};
use nestform_http::QueryDict;

// ============================================================================
// Shared helpers
// ============================================================================

/// A user row as an application would load it.
#[derive(Debug)]
struct UserRecord {
    id: i64,
    name: &'static str,
    persisted: bool,
    bookmarks: Vec<&'static str>,
}

#[derive(Debug)]
struct BookmarkRecord {
    id: i64,
    url: &'static str,
}

impl Record for BookmarkRecord {
    fn get(&self, field: &str) -> Option<Value> {
        match field {
            "url" => Some(Value::from(self.url)),
            _ => None,
        }
    }

    fn is_persisted(&self) -> bool {
        true
    }

    fn id(&self) -> Option<Value> {
        Some(Value::Int(self.id))
    }
}

impl Record for UserRecord {
    fn get(&self, field: &str) -> Option<Value> {
        match field {
            "name" => Some(Value::from(self.name)),
            _ => None,
        }
    }

    fn association(&self, name: &str) -> Association {
        match name {
            "bookmarks" => Association::Many(
                self.bookmarks
                    .iter()
                    .zip(1..)
                    .map(|(&url, id)| Arc::new(BookmarkRecord { id, url }) as RecordRef)
                    .collect(),
            ),
            _ => Association::None,
        }
    }

    fn is_persisted(&self) -> bool {
        self.persisted
    }

    fn id(&self) -> Option<Value> {
        self.persisted.then_some(Value::Int(self.id))
    }
}

fn user_record(persisted: bool, bookmarks: Vec<&'static str>) -> RecordRef {
    Arc::new(UserRecord {
        id: 42,
        name: "Ivan",
        persisted,
        bookmarks,
    })
}

fn map(json: serde_json::Value) -> ValueMap {
    match Value::from(json) {
        Value::Map(map) => map,
        other => panic!("expected an object, got {other:?}"),
    }
}

/// `user` with a required name, an optional integer age and a nested
/// `personal_info` hash plus a `bookmarks` list, all validated by one
/// contract.
fn user_class() -> Arc<FormClass> {
    Arc::new(
        FormClass::with_schema(
            "user",
            Schema::new()
                .key(Key::required("name").filled(SchemaType::String))
                .key(Key::optional("age").maybe(SchemaType::Integer))
                .key(Key::optional("birthday").maybe(SchemaType::Date))
                .key(Key::optional("personal_info").hash(
                    Schema::new()
                        .key(Key::required("age").filled(SchemaType::Integer).gteq(18))
                        .key(Key::optional("city").maybe(SchemaType::String)),
                ))
                .key(Key::optional("bookmarks").array_of(
                    Schema::new()
                        .key(Key::required("url").filled(SchemaType::String))
                        .key(Key::optional("name").maybe(SchemaType::String)),
                )),
        )
        .unwrap(),
    )
}

fn user_form() -> FormNode {
    FormNode::new(user_class())
}

/// A nested form with its own contract.
fn personal_info_class() -> Arc<FormClass> {
    let contract = SchemaContract::new(
        Schema::new()
            .key(Key::required("age").filled(SchemaType::Integer).gteq(18))
            .key(Key::optional("city").maybe(SchemaType::String)),
    )
    .rule(Rule::base(|ctx| {
        (ctx.value("city") == &Value::from("Atlantis")).then(|| "city does not exist".to_string())
    }));
    Arc::new(FormClass::new("personal_info", contract).unwrap())
}

fn bookmark_class() -> Arc<FormClass> {
    Arc::new(
        FormClass::with_schema(
            "bookmark",
            Schema::new().key(Key::required("url").filled(SchemaType::String)),
        )
        .unwrap(),
    )
}

fn profile_class() -> Arc<FormClass> {
    Arc::new(
        FormClass::with_schema(
            "user",
            Schema::new()
                .key(Key::required("name").filled(SchemaType::String))
                .key(Key::optional("personal_info").form(personal_info_class()))
                .key(Key::optional("bookmarks").form_list(bookmark_class())),
        )
        .unwrap(),
    )
}

// ============================================================================
// 1. Flat forms
// ============================================================================

#[test]
fn test_valid_flat_input() {
    let mut form = user_form();
    form.set_attributes(map(serde_json::json!({"name": "Ivan", "age": "20"})))
        .unwrap();
    assert!(form.validate());
    assert!(form.errors().is_empty());
    assert!(form.base_errors().is_empty());
    assert_eq!(
        Value::Map(form.data().cloned().unwrap()).to_json(),
        serde_json::json!({"name": "Ivan", "age": 20})
    );
    assert_eq!(form.get("age"), Value::Int(20));
}

#[test]
fn test_scenario_a_blank_required_field() {
    let mut form = user_form();
    form.set_params(serde_json::json!({"name": ""})).unwrap();
    assert!(!form.validate());
    assert_eq!(form.errors().to_json(), serde_json::json!({"name": ["required"]}));
}

#[test]
fn test_missing_required_field() {
    let mut form = user_form();
    form.set("age", 30).unwrap();
    assert!(!form.validate());
    assert!(!form.errors().messages_for("name").is_empty());
}

#[test]
fn test_round_trip_trim() {
    let mut form = user_form();
    form.set("name", "  hello  ").unwrap();
    assert_eq!(form.get("name"), Value::from("hello"));
    form.set("name", "   ").unwrap();
    assert_eq!(form.get("name"), Value::Null);
}

#[test]
fn test_record_defaults_and_identity() {
    let form = user_form().with_record(user_record(true, vec![]));
    assert_eq!(form.get("name"), Value::from("Ivan"));
    assert!(form.is_persisted());
    assert_eq!(form.id(), Some(Value::Int(42)));
    assert_eq!(form.to_param(), "42");
}

#[test]
fn test_date_coercion() {
    let mut form = user_form();
    form.set_params(serde_json::json!({"user": {"name": "a", "birthday": "1990-05-17"}}))
        .unwrap();
    assert!(form.validate());
    assert_eq!(
        form.get("birthday"),
        Value::Date(chrono::NaiveDate::from_ymd_opt(1990, 5, 17).unwrap())
    );

    form.set("birthday", "17/05/1990").unwrap();
    assert!(!form.validate());
    assert_eq!(form.errors().messages_for("birthday"), ["must be a date"]);
}

#[test]
fn test_validate_is_idempotent() {
    let mut form = user_form();
    form.set_params(serde_json::json!({
        "age": "x",
        "personal_info": {"age": 3},
        "bookmarks": [{"url": ""}, {"url": "/a"}, {"url": " "}]
    }))
    .unwrap();

    form.validate();
    let first_errors = serde_json::to_string(form.errors()).unwrap();
    let first_data = Value::Map(form.data().cloned().unwrap()).to_json();

    form.validate();
    assert_eq!(serde_json::to_string(form.errors()).unwrap(), first_errors);
    assert_eq!(Value::Map(form.data().cloned().unwrap()).to_json(), first_data);
}

#[test]
fn test_message_override_from_settings() {
    let settings = Settings::default().with_message("required", "can't be blank");
    let mut form = FormNode::with_settings(user_class(), Arc::new(settings));
    form.validate();
    assert_eq!(form.errors().messages_for("name"), ["can't be blank"]);
}

// ============================================================================
// 2. Nested containers
// ============================================================================

#[test]
fn test_scenario_b_nested_hash_error() {
    let mut form = user_form();
    form.set_params(serde_json::json!({"name": "a", "personal_info": {"age": 17}}))
        .unwrap();
    assert!(!form.validate());
    assert_eq!(
        form.errors().to_json(),
        serde_json::json!({"personal_info": {"age": ["must be >= 18"]}})
    );
    let info = form.child("personal_info").unwrap();
    assert_eq!(info.errors().messages_for("age"), ["must be >= 18"]);
}

#[test]
fn test_scenario_c_only_failing_index_reported() {
    let mut form = user_form();
    form.set_params(serde_json::json!({
        "name": "a",
        "bookmarks": [{"url": ""}, {"url": "x"}]
    }))
    .unwrap();
    assert!(!form.validate());
    assert_eq!(
        form.errors().to_json(),
        serde_json::json!({"bookmarks": {"0": {"url": ["required"]}}})
    );
    assert_eq!(
        form.errors_full_messages(),
        vec!["Url (1): required".to_string()]
    );
}

#[test]
fn test_nested_list_aligned_with_record() {
    let mut form = user_form().with_record(user_record(true, vec!["/a", "/b"]));
    let bookmarks = form.children("bookmarks").unwrap();
    assert_eq!(bookmarks.len(), 2);
    for (idx, (node, url)) in bookmarks.iter().zip(["/a", "/b"]).enumerate() {
        assert_eq!(node.get("url"), Value::from(url));
        assert_eq!(node.id(), Some(Value::Int(i64::try_from(idx).unwrap() + 1)));
    }
}

#[test]
fn test_nested_list_from_params_rebinds_by_index() {
    let mut form = user_form().with_record(user_record(true, vec!["/a", "/b"]));
    form.set_params(serde_json::json!({"bookmarks": [{"url": "/new"}]}))
        .unwrap();
    let bookmarks = form.children("bookmarks").unwrap();
    assert_eq!(bookmarks.len(), 1);
    assert_eq!(bookmarks[0].get("url"), Value::from("/new"));
    assert_eq!(bookmarks[0].id(), Some(Value::Int(1)));
}

#[test]
fn test_nested_hash_record_defaults() {
    let record = HashRecord::shared(map(serde_json::json!({
        "name": "Ivan",
        "personal_info": {"age": 30, "city": "Kazan"}
    })));
    let mut form = user_form().with_record(record);
    let info = form.child("personal_info").unwrap();
    assert_eq!(info.get("city"), Value::from("Kazan"));
    info.set("city", "Omsk").unwrap();
    assert_eq!(form.child("personal_info").unwrap().get("city"), Value::from("Omsk"));
}

#[test]
fn test_nested_data_after_validation() {
    let mut form = user_form();
    form.set_params(serde_json::json!({
        "name": "a",
        "personal_info": {"age": "20", "city": " Ufa "},
        "bookmarks": [{"url": "/a", "name": "A"}]
    }))
    .unwrap();
    assert!(form.validate());
    assert_eq!(
        Value::Map(form.data().cloned().unwrap()).to_json(),
        serde_json::json!({
            "name": "a",
            "personal_info": {"age": 20, "city": "Ufa"},
            "bookmarks": [{"url": "/a", "name": "A"}]
        })
    );
    assert_eq!(form.child("personal_info").unwrap().get("age"), Value::Int(20));
}

#[test]
fn test_nested_list_blank_items_are_dropped_before_binding() {
    let mut form = user_form().with_record(user_record(true, vec!["/a", "/b"]));
    form.set_params(serde_json::json!({
        "name": "a",
        "bookmarks": [{"url": ""}, " ", {"url": "/c"}]
    }))
    .unwrap();

    let bookmarks = form.children("bookmarks").unwrap();
    assert_eq!(bookmarks.len(), 2);
    assert_eq!(bookmarks[1].get("url"), Value::from("/c"));
    assert_eq!(bookmarks[1].id(), Some(Value::Int(2)));

    assert!(!form.validate());
    assert_eq!(
        form.errors().to_json(),
        serde_json::json!({"bookmarks": {"0": {"url": ["required"]}}})
    );
}

// ============================================================================
// 3. Nested forms with their own contract
// ============================================================================

#[test]
fn test_own_contract_child_errors_fold_into_parent() {
    let mut form = FormNode::new(profile_class());
    form.set_params(serde_json::json!({
        "name": "a",
        "personal_info": {"age": 17},
        "bookmarks": [{"url": "/a"}, {"url": ""}]
    }))
    .unwrap();
    assert!(!form.validate());
    assert_eq!(
        form.errors().to_json(),
        serde_json::json!({
            "personal_info": {"age": ["must be >= 18"]},
            "bookmarks": {"1": {"url": ["required"]}}
        })
    );
    assert!(!form.child("personal_info").unwrap().is_valid());
    assert!(form.children("bookmarks").unwrap()[0].is_valid());
}

#[test]
fn test_own_contract_child_base_errors_propagate() {
    let mut form = FormNode::new(profile_class());
    form.set_params(serde_json::json!({
        "name": "a",
        "personal_info": {"age": 30, "city": "Atlantis"}
    }))
    .unwrap();
    assert!(!form.validate());
    assert!(form.errors().is_empty());
    assert_eq!(form.base_errors(), ["city does not exist"]);
}

#[test]
fn test_own_contract_child_data_is_coerced() {
    let mut form = FormNode::new(profile_class());
    form.set_params(serde_json::json!({
        "name": "a",
        "personal_info": {"age": "30"},
        "bookmarks": [{"url": "/a"}]
    }))
    .unwrap();
    assert!(form.validate());
    assert_eq!(
        Value::Map(form.data().cloned().unwrap()).to_json(),
        serde_json::json!({"name": "a", "personal_info": {"age": 30}, "bookmarks": [{"url": "/a"}]})
    );
}

#[test]
fn test_own_contract_list_with_blank_items_is_validated() {
    let mut form = FormNode::new(profile_class());
    form.set_params(serde_json::json!({"name": "a", "bookmarks": [{"url": ""}, ""]}))
        .unwrap();
    assert!(!form.validate());
    assert_eq!(
        form.errors().to_json(),
        serde_json::json!({"bookmarks": {"0": {"url": ["required"]}}})
    );
    assert_eq!(form.children("bookmarks").unwrap().len(), 1);
}

#[test]
fn test_invalid_grandchild_invalidates_root() {
    let tag = Arc::new(
        FormClass::with_schema(
            "tag",
            Schema::new().key(Key::required("label").filled(SchemaType::String)),
        )
        .unwrap(),
    );
    let bookmark = Arc::new(
        FormClass::with_schema(
            "bookmark",
            Schema::new()
                .key(Key::required("url").filled(SchemaType::String))
                .key(Key::optional("tags").form_list(tag)),
        )
        .unwrap(),
    );
    let class = FormClass::with_schema(
        "user",
        Schema::new().key(
            Key::optional("meta").hash(Schema::new().key(Key::optional("bookmarks").form_list(bookmark))),
        ),
    )
    .unwrap();

    let mut form = FormNode::new(Arc::new(class));
    form.set_params(serde_json::json!({
        "meta": {"bookmarks": [{"url": "/a", "tags": [{"label": "rust"}, {"label": " "}]}]}
    }))
    .unwrap();

    assert!(!form.validate());
    assert_eq!(
        form.errors().to_json(),
        serde_json::json!({"meta": {"bookmarks": {"0": {"tags": {"1": {"label": ["required"]}}}}}})
    );
    let meta = form.child("meta").unwrap();
    assert!(!meta.is_valid());
    let bookmark = &mut meta.children("bookmarks").unwrap()[0];
    assert!(!bookmark.is_valid());
    assert!(bookmark.children("tags").unwrap()[0].is_valid());
}

// ============================================================================
// 4. Params handling
// ============================================================================

#[test]
fn test_strict_unknown_key_raises() {
    let mut form = user_form();
    let err = form
        .set_params(serde_json::json!({"user": {"name": "a", "admin": true}}))
        .unwrap_err();
    assert!(matches!(err, FormError::UnknownAttribute { attribute, .. } if attribute == "admin"));
}

#[test]
fn test_strict_unknown_nested_key_raises() {
    let mut form = user_form();
    let err = form
        .set_params(serde_json::json!({"personal_info": {"age": 20, "height": 180}}))
        .unwrap_err();
    assert!(matches!(err, FormError::UnknownAttribute { form, .. } if form == "personal_info"));
}

#[test]
fn test_lenient_settings_from_toml() {
    let settings = settings_loader::from_toml_str("strict_param_keys = false").unwrap();
    let mut form = FormNode::with_settings(user_class(), Arc::new(settings));
    form.set_params(serde_json::json!({
        "name": "a",
        "admin": true,
        "personal_info": {"age": 20, "height": 180}
    }))
    .unwrap();
    assert!(form.validate());
    assert!(!form.to_map().contains_key("admin"));
}

#[test]
fn test_query_dict_rejected_by_default() {
    let mut form = user_form();
    let err = form.set_params(QueryDict::parse("user[name]=a")).unwrap_err();
    assert!(matches!(err, FormError::ParamsNotAllowed(_)));
}

#[test]
fn test_query_dict_unwrapped_when_allowed() {
    let settings = Settings::default().with_allow_query_params(true);
    let mut form = FormNode::with_settings(user_class(), Arc::new(settings));
    form.set_params(QueryDict::parse(
        "user%5Bname%5D=Ivan&user[bookmarks][][url]=%2Fa&user[bookmarks][][url]=&user[personal_info][age]=19",
    ))
    .unwrap();
    assert!(!form.validate());
    assert_eq!(
        form.errors().to_json(),
        serde_json::json!({"bookmarks": {"1": {"url": ["required"]}}})
    );
    assert_eq!(form.get("name"), Value::from("Ivan"));
}

// ============================================================================
// 5. Actions
// ============================================================================

#[test]
fn test_scenario_d_invalid_form_never_runs_action() {
    let mut form = user_form();
    let mut ran = false;
    let result = form.perform(|_| {
        ran = true;
        ActionResult::Success(())
    });
    assert!(!ran);
    assert_eq!(result, ActionResult::Failure(ActionFailure::ValidateInvalid));
}

#[test]
fn test_scenario_e_base_rule_failure() {
    let class = FormClass::new(
        "user",
        SchemaContract::new(Schema::new().key(Key::required("name").filled(SchemaType::String)))
            .rule(Rule::base(|ctx| {
                ctx.record
                    .filter(|record| record.is_persisted())
                    .map(|_| "user is read only".to_string())
            })),
    )
    .unwrap();
    let mut form = FormNode::new(Arc::new(class)).with_record(user_record(true, vec![]));
    form.set("name", "Petr").unwrap();
    assert!(!form.validate());
    assert!(form.errors().is_empty());
    assert_eq!(form.base_errors(), ["user is read only"]);
}

#[test]
fn test_action_receives_coerced_data() {
    let mut form = user_form();
    form.set_params(serde_json::json!({"name": " Ivan ", "age": "33"}))
        .unwrap();
    let result = form.perform(|form| {
        let data = form.data().cloned().unwrap_or_default();
        ActionResult::Success(data.get("age").cloned())
    });
    assert_eq!(result, ActionResult::Success(Some(Value::Int(33))));
}

#[test]
fn test_service_failure_surfaces_base_errors() {
    let mut form = user_form();
    form.set("name", "Ivan").unwrap();
    let result: ActionResult<()> = form.perform(|_| {
        ActionResult::Failure(ActionFailure::Service(vec!["name is taken".to_string()]))
    });
    assert_eq!(
        result,
        ActionResult::Failure(ActionFailure::Service(vec!["name is taken".to_string()]))
    );
    assert_eq!(form.base_errors(), ["name is taken"]);
    assert!(!form.is_valid());
}

#[test]
fn test_dynamic_action_call() {
    let class = FormClass::with_schema(
        "user",
        Schema::new().key(Key::required("name").filled(SchemaType::String)),
    )
    .unwrap()
    .with_action("create", |form| Box::new(ActionResult::Success(form.get("name"))))
    .with_action("broken", |_| Box::new(Value::from("not a result")));
    let mut form = FormNode::new(Arc::new(class));
    form.set("name", "Ivan").unwrap();

    assert_eq!(form.call("create").unwrap(), ActionResult::Success(Value::from("Ivan")));
    assert!(matches!(form.call("broken"), Err(FormError::ActionResultType(_))));
    assert!(matches!(form.call("update"), Err(FormError::UnknownAction { .. })));
}
