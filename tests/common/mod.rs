#![allow(dead_code)]

use std::any::Any;
use std::sync::Arc;

use serde_json::Value;

use datamold::{
    unknown_property, ClassEntry, ClassId, ClassRegistry, Constructor, DefaultRecordCreator,
    MappedRecord, MappedValue, MappingFailure, Options, ProcessingError, Processor,
    PropertyDirectives, RawSchema, RecordExtras, RuleCatalog, RuleDirective, SchemaError,
    SchemaLoader, StaticSchemaSource,
};

macro_rules! record_plumbing {
    ($class:literal) => {
        fn class_id(&self) -> ClassId {
            ClassId::from_static($class)
        }

        fn extras(&self) -> &RecordExtras {
            &self.extras
        }

        fn extras_mut(&mut self) -> &mut RecordExtras {
            &mut self.extras
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }

        fn into_any(self: Box<Self>) -> Box<dyn Any> {
            self
        }
    };
}

pub struct Env {
    pub registry: Arc<ClassRegistry>,
    pub source: Arc<StaticSchemaSource>,
    pub loader: Arc<SchemaLoader>,
    pub processor: Processor,
}

impl Env {
    pub fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let registry = Arc::new(ClassRegistry::new());
        let source = Arc::new(StaticSchemaSource::new());
        let catalog = Arc::new(RuleCatalog::new());

        let mut loader = SchemaLoader::new(registry.clone(), catalog.clone());
        loader.add_source(source.clone());
        let loader = Arc::new(loader);

        let processor = Processor::new(
            loader.clone(),
            catalog,
            Arc::new(DefaultRecordCreator::new(registry.clone())),
        );
        Self { registry, source, loader, processor }
    }

    pub fn class(&self, class: &'static str, constructor: Constructor, schema: RawSchema) {
        self.registry
            .register(ClassId::from_static(class), ClassEntry::concrete(constructor))
            .expect("class registration");
        self.source.register(ClassId::from_static(class), schema);
    }

    pub fn class_with_entry(&self, class: &'static str, entry: ClassEntry, schema: RawSchema) {
        self.registry
            .register(ClassId::from_static(class), entry)
            .expect("class registration");
        self.source.register(ClassId::from_static(class), schema);
    }
}

pub fn invalid_field_names(error: &ProcessingError) -> Vec<String> {
    let structure = error
        .as_data()
        .expect("a data error")
        .descriptor()
        .as_structure()
        .expect("a structure descriptor");
    structure.invalid_fields().keys().cloned().collect()
}

pub fn field_failure<'a>(error: &'a ProcessingError, field: &str) -> &'a MappingFailure {
    let structure = error
        .as_data()
        .expect("a data error")
        .descriptor()
        .as_structure()
        .expect("a structure descriptor");
    structure.invalid_fields().get(field).expect("failure for field")
}

// Nested record with a defaulted property.

#[derive(Debug, Default)]
pub struct Inner {
    pub optional: String,
    extras: RecordExtras,
}

impl MappedRecord for Inner {
    record_plumbing!("Inner");

    fn set(&mut self, property: &str, value: MappedValue) -> Result<(), SchemaError> {
        match property {
            "optional" => {
                self.optional = value.into_string()?;
                Ok(())
            }
            other => Err(unknown_property(&self.class_id(), other)),
        }
    }
}

pub fn new_inner() -> Box<dyn MappedRecord> {
    Box::new(Inner::default())
}

pub fn inner_schema() -> RawSchema {
    RawSchema::builder()
        .property(PropertyDirectives::new("optional", RuleDirective::string()).with_default("d"))
        .build()
}

// The main scenario record.

#[derive(Debug, Default)]
pub struct Main {
    pub string: String,
    pub nullable_string: Option<String>,
    pub untyped_string: String,
    pub array_of_mixed: Vec<Value>,
    pub many_structures: Vec<Inner>,
    extras: RecordExtras,
}

impl MappedRecord for Main {
    record_plumbing!("Main");

    fn set(&mut self, property: &str, value: MappedValue) -> Result<(), SchemaError> {
        match property {
            "string" => self.string = value.into_string()?,
            "nullableString" => {
                self.nullable_string = match value.into_json()? {
                    Value::Null => None,
                    Value::String(text) => Some(text),
                    other => {
                        return Err(SchemaError::InvalidState(format!(
                            "unexpected nullableString value {other}",
                        )));
                    }
                };
            }
            "untypedString" => self.untyped_string = value.into_string()?,
            "arrayOfMixed" => {
                let mut items = Vec::new();
                for item in value.into_list()? {
                    items.push(item.into_json()?);
                }
                self.array_of_mixed = items;
            }
            "manyStructures" => {
                let mut items = Vec::new();
                for item in value.into_list()? {
                    items.push(item.into_record::<Inner>()?);
                }
                self.many_structures = items;
            }
            other => return Err(unknown_property(&self.class_id(), other)),
        }
        Ok(())
    }
}

pub fn new_main() -> Box<dyn MappedRecord> {
    Box::new(Main::default())
}

pub fn main_schema() -> RawSchema {
    RawSchema::builder()
        .property(PropertyDirectives::new("string", RuleDirective::string()))
        .property(PropertyDirectives::new(
            "nullableString",
            RuleDirective::any_of(vec![RuleDirective::string(), RuleDirective::null()]),
        ))
        .property(PropertyDirectives::new("untypedString", RuleDirective::string()))
        .property(PropertyDirectives::new(
            "arrayOfMixed",
            RuleDirective::array_of(RuleDirective::mixed()),
        ))
        .property(PropertyDirectives::new(
            "manyStructures",
            RuleDirective::array_of(RuleDirective::structure("Inner")),
        ))
        .build()
}

pub fn register_main(env: &Env) {
    env.class("Inner", new_inner, inner_schema());
    env.class("Main", new_main, main_schema());
}

// Deferred-validation record.

#[derive(Debug, Default)]
pub struct Deferred {
    pub required: String,
    pub required_skipped: String,
    pub optional_skipped: String,
    extras: RecordExtras,
}

impl MappedRecord for Deferred {
    record_plumbing!("Deferred");

    fn set(&mut self, property: &str, value: MappedValue) -> Result<(), SchemaError> {
        match property {
            "required" => self.required = value.into_string()?,
            "requiredSkipped" => self.required_skipped = value.into_string()?,
            "optionalSkipped" => self.optional_skipped = value.into_string()?,
            other => return Err(unknown_property(&self.class_id(), other)),
        }
        Ok(())
    }
}

pub fn new_deferred() -> Box<dyn MappedRecord> {
    Box::new(Deferred::default())
}

pub fn deferred_schema() -> RawSchema {
    RawSchema::builder()
        .property(PropertyDirectives::new("required", RuleDirective::string()))
        .property(PropertyDirectives::new("requiredSkipped", RuleDirective::string()).skipped())
        .property(
            PropertyDirectives::new("optionalSkipped", RuleDirective::string())
                .with_default("fallback")
                .skipped(),
        )
        .build()
}

pub fn register_deferred(env: &Env) {
    env.class("Deferred", new_deferred, deferred_schema());
}

// Records deferring a whole nested structure.

#[derive(Debug, Default)]
pub struct Strict {
    pub code: String,
    extras: RecordExtras,
}

impl MappedRecord for Strict {
    record_plumbing!("Strict");

    fn set(&mut self, property: &str, value: MappedValue) -> Result<(), SchemaError> {
        match property {
            "code" => {
                self.code = value.into_string()?;
                Ok(())
            }
            other => Err(unknown_property(&self.class_id(), other)),
        }
    }
}

#[derive(Debug, Default)]
pub struct LazyStrict {
    pub strict: Option<Strict>,
    extras: RecordExtras,
}

impl MappedRecord for LazyStrict {
    record_plumbing!("LazyStrict");

    fn set(&mut self, property: &str, value: MappedValue) -> Result<(), SchemaError> {
        match property {
            "strict" => {
                self.strict = Some(value.into_record::<Strict>()?);
                Ok(())
            }
            other => Err(unknown_property(&self.class_id(), other)),
        }
    }
}

pub fn register_lazy_strict(env: &Env) {
    env.class(
        "Strict",
        || Box::new(Strict::default()),
        RawSchema::builder()
            .property(PropertyDirectives::new("code", RuleDirective::string()))
            .build(),
    );
    env.class(
        "LazyStrict",
        || Box::new(LazyStrict::default()),
        RawSchema::builder()
            .property(
                PropertyDirectives::new("strict", RuleDirective::structure("Strict")).skipped(),
            )
            .build(),
    );
}

#[derive(Debug, Default)]
pub struct LazyInner {
    pub inner: Option<Inner>,
    extras: RecordExtras,
}

impl MappedRecord for LazyInner {
    record_plumbing!("LazyInner");

    fn set(&mut self, property: &str, value: MappedValue) -> Result<(), SchemaError> {
        match property {
            "inner" => {
                self.inner = Some(value.into_record::<Inner>()?);
                Ok(())
            }
            other => Err(unknown_property(&self.class_id(), other)),
        }
    }
}

pub fn register_lazy_inner(env: &Env) {
    env.class("Inner", new_inner, inner_schema());
    env.class(
        "LazyInner",
        || Box::new(LazyInner::default()),
        RawSchema::builder()
            .property(
                PropertyDirectives::new("inner", RuleDirective::structure("Inner")).skipped(),
            )
            .build(),
    );
}

// Record whose two properties swap field names.

#[derive(Debug, Default)]
pub struct Swapped {
    pub first: String,
    pub second: String,
    extras: RecordExtras,
}

impl MappedRecord for Swapped {
    record_plumbing!("Swapped");

    fn set(&mut self, property: &str, value: MappedValue) -> Result<(), SchemaError> {
        match property {
            "first" => self.first = value.into_string()?,
            "second" => self.second = value.into_string()?,
            other => return Err(unknown_property(&self.class_id(), other)),
        }
        Ok(())
    }
}

pub fn new_swapped() -> Box<dyn MappedRecord> {
    Box::new(Swapped::default())
}

pub fn swapped_schema() -> RawSchema {
    RawSchema::builder()
        .property(PropertyDirectives::new("first", RuleDirective::string()).renamed("second"))
        .property(PropertyDirectives::new("second", RuleDirective::string()).renamed("first"))
        .build()
}

// Circular class hierarchy: Hop1 -> Hop2 -> Hop3 -> Hop1.

#[derive(Debug, Default)]
pub struct Hop1 {
    pub next: Option<Box<Hop2>>,
    extras: RecordExtras,
}

#[derive(Debug, Default)]
pub struct Hop2 {
    pub next: Option<Box<Hop3>>,
    extras: RecordExtras,
}

#[derive(Debug, Default)]
pub struct Hop3 {
    pub next: Option<Box<Hop1>>,
    extras: RecordExtras,
}

macro_rules! hop_set {
    ($next:ty) => {
        fn set(&mut self, property: &str, value: MappedValue) -> Result<(), SchemaError> {
            match property {
                "next" => {
                    self.next = match value {
                        MappedValue::Json(Value::Null) => None,
                        other => Some(Box::new(other.into_record::<$next>()?)),
                    };
                    Ok(())
                }
                other => Err(unknown_property(&self.class_id(), other)),
            }
        }
    };
}

impl MappedRecord for Hop1 {
    record_plumbing!("Hop1");
    hop_set!(Hop2);
}

impl MappedRecord for Hop2 {
    record_plumbing!("Hop2");
    hop_set!(Hop3);
}

impl MappedRecord for Hop3 {
    record_plumbing!("Hop3");
    hop_set!(Hop1);
}

fn hop_schema(next: &'static str) -> RawSchema {
    RawSchema::builder()
        .property(
            PropertyDirectives::new(
                "next",
                RuleDirective::any_of(vec![
                    RuleDirective::structure(next),
                    RuleDirective::null(),
                ]),
            )
            .with_default(Value::Null),
        )
        .build()
}

pub fn register_hops(env: &Env) {
    env.class("Hop1", || Box::new(Hop1::default()), hop_schema("Hop2"));
    env.class("Hop2", || Box::new(Hop2::default()), hop_schema("Hop3"));
    env.class("Hop3", || Box::new(Hop3::default()), hop_schema("Hop1"));
}

// One-property record for rule-focused tests.

#[derive(Debug, Default)]
pub struct Single {
    pub value: Option<Value>,
    extras: RecordExtras,
}

impl MappedRecord for Single {
    record_plumbing!("Single");

    fn set(&mut self, property: &str, value: MappedValue) -> Result<(), SchemaError> {
        match property {
            "value" => {
                self.value = Some(value.into_json()?);
                Ok(())
            }
            other => Err(unknown_property(&self.class_id(), other)),
        }
    }
}

pub fn new_single() -> Box<dyn MappedRecord> {
    Box::new(Single::default())
}

pub fn register_single(env: &Env, rule: RuleDirective) {
    env.class(
        "Single",
        new_single,
        RawSchema::builder().property(PropertyDirectives::new("value", rule)).build(),
    );
}

pub fn single_class() -> ClassId {
    ClassId::from_static("Single")
}

pub fn process_single(env: &Env, value: Value) -> Result<Single, ProcessingError> {
    env.processor.process_as::<Single>(
        serde_json::json!({ "value": value }),
        &single_class(),
        Options::new(),
    )
}

