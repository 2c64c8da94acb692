mod common;

use std::sync::Arc;

use common::*;
use datamold::{
    ClassEntry, ClassId, ClassRegistry, ModifierDirective, PropertyDirectives, RawSchema,
    RuleCatalog, RuleDirective, SchemaError, SchemaLoader, StaticSchemaSource,
};

#[test]
fn load_returns_the_same_schema_instance() {
    let env = Env::new();
    env.class("Inner", new_inner, inner_schema());
    let class = ClassId::from_static("Inner");

    let first = env.loader.load(&class).expect("first load");
    let second = env.loader.load(&class).expect("second load");
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn unregistered_class_is_rejected() {
    let env = Env::new();
    let err = env.loader.load(&ClassId::from_static("Nope")).unwrap_err();
    assert!(matches!(err, SchemaError::ClassNotFound(_)));
}

#[test]
fn registered_class_without_directives_is_rejected() {
    let env = Env::new();
    env.registry
        .register(ClassId::from_static("Bare"), ClassEntry::concrete(new_single))
        .expect("register");

    let err = env.loader.load(&ClassId::from_static("Bare")).unwrap_err();
    assert!(matches!(err, SchemaError::InvalidArgument(_)));
}

#[test]
fn abstract_class_is_rejected() {
    let env = Env::new();
    env.registry
        .register(ClassId::from_static("Base"), ClassEntry::abstract_class())
        .expect("register");
    env.source.register(ClassId::from_static("Base"), inner_schema());

    let err = env.loader.load(&ClassId::from_static("Base")).unwrap_err();
    assert!(matches!(err, SchemaError::NotInstantiable(_)));
}

#[test]
fn structure_rule_requires_a_known_class() {
    let env = Env::new();
    register_single(&env, RuleDirective::structure("Missing"));

    let err = env.loader.load(&single_class()).unwrap_err();
    assert!(matches!(err, SchemaError::ClassNotFound(_)));
}

#[test]
fn duplicate_field_mapping_is_rejected() {
    let env = Env::new();
    let schema = RawSchema::builder()
        .property(PropertyDirectives::new("a", RuleDirective::string()).renamed("shared"))
        .property(PropertyDirectives::new("b", RuleDirective::string()).renamed("shared"))
        .build();
    env.class("Swapped", new_swapped, schema);

    let err = env.loader.load(&ClassId::from_static("Swapped")).unwrap_err();
    assert!(matches!(err, SchemaError::InvalidArgument(_)));
}

#[test]
fn conflicting_length_bounds_are_rejected() {
    let env = Env::new();
    register_single(
        &env,
        RuleDirective::string().with_arg("min_length", 5).with_arg("max_length", 2),
    );

    let err = env.loader.load(&single_class()).unwrap_err();
    assert!(matches!(err, SchemaError::InvalidArgument(_)));
}

#[test]
fn misspelled_rule_argument_is_rejected() {
    let env = Env::new();
    register_single(&env, RuleDirective::string().with_arg("min_lenght", 3));

    let err = env.loader.load(&single_class()).unwrap_err();
    match err {
        SchemaError::InvalidArgument(message) => assert!(message.contains("min_lenght")),
        other => panic!("expected an invalid-argument error, got {other}"),
    }
}

#[test]
fn unknown_modifier_is_rejected() {
    let env = Env::new();
    let mut property = PropertyDirectives::new("value", RuleDirective::string());
    property.modifiers.push(ModifierDirective::new("bogus"));
    env.class("Single", new_single, RawSchema::builder().property(property).build());

    let err = env.loader.load(&single_class()).unwrap_err();
    assert!(matches!(err, SchemaError::InvalidArgument(_)));
}

#[test]
fn compound_rules_need_two_members() {
    let env = Env::new();
    register_single(&env, RuleDirective::any_of(vec![RuleDirective::string()]));

    let err = env.loader.load(&single_class()).unwrap_err();
    assert!(matches!(err, SchemaError::InvalidArgument(_)));
}

#[test]
fn only_one_schema_source_is_supported() {
    let registry = Arc::new(ClassRegistry::new());
    registry
        .register(ClassId::from_static("Single"), ClassEntry::concrete(new_single))
        .expect("register");

    let catalog = Arc::new(RuleCatalog::new());
    let mut loader = SchemaLoader::new(registry, catalog);
    loader.add_source(Arc::new(StaticSchemaSource::new()));
    loader.add_source(Arc::new(StaticSchemaSource::new()));

    let err = loader.load(&ClassId::from_static("Single")).unwrap_err();
    assert!(matches!(err, SchemaError::NotImplemented(_)));
}
