mod common;

use common::*;
use datamold::processing::Callback;
use datamold::rules::RuleError;
use datamold::types::{CompoundOperator, InvalidData, MappingFailure, StructureType};
use datamold::{
    ClassEntry, ClassId, MappedValue, ModifierDirective, Options, PropertyDirectives, RawSchema,
    RequiredFields, RuleDirective, TypeDescriptor,
};
use serde_json::{json, Value};

fn main_class() -> ClassId {
    ClassId::from_static("Main")
}

#[test]
fn maps_valid_data_to_record() {
    let env = Env::new();
    register_main(&env);

    let data = json!({
        "string": "foo",
        "nullableString": null,
        "untypedString": "u",
        "arrayOfMixed": [1, "two", null],
        "manyStructures": [{"optional": "x"}, {}],
    });
    let main: Main =
        env.processor.process_as(data, &main_class(), Options::new()).expect("valid data");

    assert_eq!(main.string, "foo");
    assert_eq!(main.nullable_string, None);
    assert_eq!(main.untyped_string, "u");
    assert_eq!(main.array_of_mixed, vec![json!(1), json!("two"), json!(null)]);
    assert_eq!(main.many_structures.len(), 2);
    assert_eq!(main.many_structures[0].optional, "x");
    assert_eq!(main.many_structures[1].optional, "d");
}

#[test]
fn missing_required_fields_are_reported_together() {
    let env = Env::new();
    register_main(&env);

    let data = json!({
        "string": "foo",
        "nullableString": null,
        "manyStructures": [{}, {}, {}],
    });
    let err = env.processor.process(data, &main_class(), Options::new()).unwrap_err();

    assert_eq!(invalid_field_names(&err), vec!["untypedString", "arrayOfMixed"]);
}

#[test]
fn non_map_input_marks_whole_structure() {
    let env = Env::new();
    register_main(&env);

    let err = env.processor.process(json!("nope"), &main_class(), Options::new()).unwrap_err();
    let data = err.as_data().expect("a data error");

    let structure = data.descriptor().as_structure().expect("a structure descriptor");
    assert!(structure.is_invalid());
    assert!(!structure.has_invalid_fields());
    assert_eq!(data.value(), Some(&json!("nope")));
}

#[test]
fn unknown_field_gets_a_suggestion() {
    let env = Env::new();
    register_main(&env);

    let data = json!({
        "stringg": "foo",
        "nullableString": null,
        "untypedString": "u",
        "arrayOfMixed": [],
        "manyStructures": [],
    });
    let err = env.processor.process(data, &main_class(), Options::new()).unwrap_err();

    match field_failure(&err, "stringg").descriptor() {
        TypeDescriptor::Message(message) => {
            assert_eq!(message.message, "Field is unknown, did you mean `string`?");
        }
        other => panic!("expected a message descriptor, got {other:?}"),
    }
    // The property the typo pointed at is still reported as missing.
    assert!(invalid_field_names(&err).contains(&"string".to_string()));
}

#[test]
fn unknown_field_without_close_candidate() {
    let env = Env::new();
    register_main(&env);

    let data = json!({
        "zzz": 1,
        "string": "foo",
        "nullableString": null,
        "untypedString": "u",
        "arrayOfMixed": [],
        "manyStructures": [],
    });
    let err = env.processor.process(data, &main_class(), Options::new()).unwrap_err();

    match field_failure(&err, "zzz").descriptor() {
        TypeDescriptor::Message(message) => {
            assert_eq!(message.message, "Field is unknown.");
        }
        other => panic!("expected a message descriptor, got {other:?}"),
    }
}

#[test]
fn suggestion_follows_renamed_properties() {
    let env = Env::new();
    let schema = RawSchema::builder()
        .property(
            PropertyDirectives::new("userName", RuleDirective::string()).renamed("user_name"),
        )
        .build();
    env.class("Single", new_single, schema);

    let err = env
        .processor
        .process(json!({"userNam": "x"}), &single_class(), Options::new())
        .unwrap_err();

    match field_failure(&err, "userNam").descriptor() {
        TypeDescriptor::Message(message) => {
            // The match is the property name; the hint is its field name.
            assert_eq!(message.message, "Field is unknown, did you mean `user_name`?");
        }
        other => panic!("expected a message descriptor, got {other:?}"),
    }
}

#[test]
fn unknown_fields_can_be_allowed() {
    let env = Env::new();
    register_main(&env);

    let mut options = Options::new();
    options.set_allow_unknown_fields();
    let data = json!({
        "zzz": 1,
        "string": "foo",
        "nullableString": null,
        "untypedString": "u",
        "arrayOfMixed": [],
        "manyStructures": [],
    });

    assert!(env.processor.process(data, &main_class(), options).is_ok());
}

#[test]
fn or_compound_reports_members_in_declaration_order() {
    let env = Env::new();
    register_main(&env);

    let data = json!({
        "string": "foo",
        "nullableString": 5,
        "untypedString": "u",
        "arrayOfMixed": [],
        "manyStructures": [],
    });
    let err = env.processor.process(data, &main_class(), Options::new()).unwrap_err();

    let failure = field_failure(&err, "nullableString");
    let compound = failure.descriptor().as_compound().expect("a compound descriptor");
    assert_eq!(compound.operator, CompoundOperator::Or);
    assert_eq!(compound.subtypes.len(), 2);
    match (&compound.subtypes[0], &compound.subtypes[1]) {
        (TypeDescriptor::Simple(first), TypeDescriptor::Simple(second)) => {
            assert_eq!(first.name, "string");
            assert_eq!(second.name, "null");
        }
        other => panic!("expected simple subtypes, got {other:?}"),
    }
    assert_eq!(failure.value(), Some(&json!(5)));
}

#[test]
fn required_all_rejects_defaulted_fields() {
    let env = Env::new();
    env.class("Inner", new_inner, inner_schema());

    let mut options = Options::new();
    options.set_required_fields(RequiredFields::All);
    let err = env
        .processor
        .process(json!({}), &ClassId::from_static("Inner"), options)
        .unwrap_err();

    assert_eq!(invalid_field_names(&err), vec!["optional"]);
}

#[test]
fn required_none_accepts_empty_input() {
    let env = Env::new();
    register_main(&env);

    let mut options = Options::new();
    options.set_required_fields(RequiredFields::None);
    let record = env.processor.process(json!({}), &main_class(), options).expect("no required");

    assert!(!record.is_initialized("string"));
    assert!(!record.is_initialized("arrayOfMixed"));
}

#[test]
fn required_none_leaves_defaults_absent() {
    let env = Env::new();
    env.class("Inner", new_inner, inner_schema());

    let mut options = Options::new();
    options.set_required_fields(RequiredFields::None);
    let record = env
        .processor
        .process(json!({}), &ClassId::from_static("Inner"), options)
        .expect("nothing is required");

    assert!(!record.is_initialized("optional"));
}

#[test]
fn defaults_fill_missing_properties() {
    let env = Env::new();
    env.class("Inner", new_inner, inner_schema());

    let inner: Inner = env
        .processor
        .process_as(json!({}), &ClassId::from_static("Inner"), Options::new())
        .expect("defaults");

    assert_eq!(inner.optional, "d");
}

#[test]
fn field_maps_prefill_defaults_only_on_request() {
    let env = Env::new();
    env.class("Inner", new_inner, inner_schema());
    let class = ClassId::from_static("Inner");

    let plain = env
        .processor
        .process_without_mapping(json!({}), &class, Options::new())
        .expect("no required fields sent");
    assert!(plain.is_empty());

    let mut options = Options::new();
    options.set_prefill_default_values();
    let prefilled = env
        .processor
        .process_without_mapping(json!({}), &class, options)
        .expect("prefilled");
    assert!(matches!(prefilled.get("optional"), Some(MappedValue::Json(Value::String(s))) if s == "d"));
}

#[test]
fn field_maps_keep_nested_structures_as_maps() {
    let env = Env::new();
    register_main(&env);

    let data = json!({
        "string": "foo",
        "nullableString": null,
        "untypedString": "u",
        "arrayOfMixed": [],
        "manyStructures": [{"optional": "x"}],
    });
    let fields = env
        .processor
        .process_without_mapping(data, &main_class(), Options::new())
        .expect("valid data");

    let Some(MappedValue::List(structures)) = fields.get("manyStructures") else {
        panic!("expected a processed list");
    };
    let Some(MappedValue::Map(first)) = structures.first() else {
        panic!("expected a nested field map");
    };
    assert!(matches!(first.get("optional"), Some(MappedValue::Json(Value::String(s))) if s == "x"));
}

#[test]
fn raw_values_are_kept_on_request() {
    let env = Env::new();
    register_main(&env);

    let data = json!({
        "string": "foo",
        "nullableString": null,
        "untypedString": "u",
        "arrayOfMixed": [],
        "manyStructures": [],
    });
    let mut options = Options::new();
    options.set_fill_raw_values();
    let record = env.processor.process(data.clone(), &main_class(), options).expect("valid data");

    assert_eq!(record.raw_values(), Some(&data));
}

#[test]
fn renamed_fields_can_swap() {
    let env = Env::new();
    env.class("Swapped", new_swapped, swapped_schema());

    let swapped: Swapped = env
        .processor
        .process_as(
            json!({"first": "B", "second": "A"}),
            &ClassId::from_static("Swapped"),
            Options::new(),
        )
        .expect("swap");

    assert_eq!(swapped.first, "A");
    assert_eq!(swapped.second, "B");
}

#[test]
fn class_modifier_bypasses_constructor() {
    let env = Env::new();
    let schema = RawSchema::builder()
        .class_modifier(ModifierDirective::create_without_constructor())
        .property(PropertyDirectives::new("value", RuleDirective::string()))
        .build();
    env.class_with_entry(
        "Single",
        ClassEntry::requiring_arguments().with_bare_constructor(new_single),
        schema,
    );

    let single: Single = env
        .processor
        .process_as(json!({"value": "x"}), &single_class(), Options::new())
        .expect("bare constructor");
    assert_eq!(single.value, Some(json!("x")));
}

#[test]
fn class_before_callback_reshapes_input() {
    let env = Env::new();
    let schema = RawSchema::builder()
        .class_callback(Callback::before(|value, _context| match value {
            MappedValue::Json(Value::Object(_)) => Ok(value),
            MappedValue::Json(other) => Ok(MappedValue::Json(json!({ "value": other }))),
            other => Ok(other),
        }))
        .property(PropertyDirectives::new("value", RuleDirective::string()))
        .build();
    env.class("Single", new_single, schema);

    let single: Single = env
        .processor
        .process_as(json!("shorthand"), &single_class(), Options::new())
        .expect("reshaped input");
    assert_eq!(single.value, Some(json!("shorthand")));
}

#[test]
fn class_after_callback_can_fail_against_current_root() {
    let env = Env::new();
    let schema = RawSchema::builder()
        .class_callback(Callback::after(|_value, context| {
            let mut root: StructureType =
                context.current_type().expect("class callback gets the root").clone();
            root.add_error(MappingFailure::Mismatch(datamold::ValueMismatch::new(
                TypeDescriptor::message("values are mutually exclusive"),
                None,
            )));
            Err(RuleError::Failure(MappingFailure::Data(InvalidData::new(
                TypeDescriptor::Structure(root),
                None,
            ))))
        }))
        .property(PropertyDirectives::new("value", RuleDirective::string()))
        .build();
    env.class("Single", new_single, schema);

    let err = env
        .processor
        .process(json!({"value": "x"}), &single_class(), Options::new())
        .unwrap_err();
    let structure = err
        .as_data()
        .expect("a data error")
        .descriptor()
        .as_structure()
        .expect("the annotated root");

    assert_eq!(structure.class.as_str(), "Single");
    assert_eq!(structure.errors().len(), 1);
}

#[test]
fn property_callbacks_transform_the_value() {
    let env = Env::new();
    let schema = RawSchema::builder()
        .property(
            PropertyDirectives::new("value", RuleDirective::string()).with_callback(
                Callback::after(|value, _context| {
                    let text = value.into_string()?;
                    Ok(MappedValue::json(text.to_uppercase()))
                }),
            ),
        )
        .build();
    env.class("Single", new_single, schema);

    let single: Single = env
        .processor
        .process_as(json!({"value": "quiet"}), &single_class(), Options::new())
        .expect("transformed");
    assert_eq!(single.value, Some(json!("QUIET")));
}

#[test]
fn circular_hierarchies_resolve_and_process() {
    let env = Env::new();
    register_hops(&env);

    let hop: Hop1 = env
        .processor
        .process_as(
            json!({"next": {"next": {}}}),
            &ClassId::from_static("Hop1"),
            Options::new(),
        )
        .expect("circular hierarchy");

    let second = hop.next.expect("second hop");
    let third = second.next.expect("third hop");
    assert!(third.next.is_none());
}
