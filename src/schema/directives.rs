//! Declaration-side schema directives.
//!
//! A [`RawSchema`] is what an application registers for a class: property
//! rules, modifiers, callbacks and documentation, all loosely typed. The
//! resolver turns it into a validated runtime schema exactly once.

use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value;

use crate::processing::Callback;
use crate::record::ClassId;
use crate::rules::{ArgMap, ArgValue, RuleDirective};
use crate::schema::runtime::Docs;

/// Modifier identifiers understood by the resolver.
pub mod modifier {
    pub const FIELD_NAME: &str = "field_name";
    pub const SKIPPED: &str = "skipped";
    pub const CREATE_WITHOUT_CONSTRUCTOR: &str = "create_without_constructor";
}

/// One modifier attached to a class or property.
#[derive(Debug, Clone)]
pub struct ModifierDirective {
    pub id: String,
    pub args: ArgMap,
}

impl ModifierDirective {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), args: ArgMap::new() }
    }

    /// Maps the property to a different field name in the input data.
    pub fn field_name(name: impl Into<String>) -> Self {
        let mut directive = Self::new(modifier::FIELD_NAME);
        directive.args.insert("name".to_string(), ArgValue::Json(Value::String(name.into())));
        directive
    }

    /// Defers the property's validation until explicit completion.
    pub fn skipped() -> Self {
        Self::new(modifier::SKIPPED)
    }

    /// Creates instances without invoking the regular constructor.
    pub fn create_without_constructor() -> Self {
        Self::new(modifier::CREATE_WITHOUT_CONSTRUCTOR)
    }
}

/// Directives for one declared property.
#[derive(Debug, Clone)]
pub struct PropertyDirectives {
    pub name: String,
    pub rule: RuleDirective,
    pub modifiers: Vec<ModifierDirective>,
    pub callbacks: Vec<Callback>,
    pub docs: Docs,
    pub default: Option<Value>,
}

impl PropertyDirectives {
    pub fn new(name: impl Into<String>, rule: RuleDirective) -> Self {
        Self {
            name: name.into(),
            rule,
            modifiers: Vec::new(),
            callbacks: Vec::new(),
            docs: Docs::default(),
            default: None,
        }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn renamed(mut self, field: impl Into<String>) -> Self {
        self.modifiers.push(ModifierDirective::field_name(field));
        self
    }

    pub fn skipped(mut self) -> Self {
        self.modifiers.push(ModifierDirective::skipped());
        self
    }

    pub fn with_callback(mut self, callback: Callback) -> Self {
        self.callbacks.push(callback);
        self
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.docs.description = Some(description.into());
        self
    }
}

/// Everything declared for one class.
#[derive(Debug, Clone, Default)]
pub struct RawSchema {
    pub class_modifiers: Vec<ModifierDirective>,
    pub class_callbacks: Vec<Callback>,
    pub class_docs: Docs,
    pub properties: Vec<PropertyDirectives>,
}

impl RawSchema {
    pub fn builder() -> RawSchemaBuilder {
        RawSchemaBuilder::default()
    }
}

/// Fluent construction of a [`RawSchema`].
#[derive(Debug, Default)]
pub struct RawSchemaBuilder {
    schema: RawSchema,
}

impl RawSchemaBuilder {
    pub fn property(mut self, property: PropertyDirectives) -> Self {
        self.schema.properties.push(property);
        self
    }

    pub fn class_modifier(mut self, modifier: ModifierDirective) -> Self {
        self.schema.class_modifiers.push(modifier);
        self
    }

    pub fn class_callback(mut self, callback: Callback) -> Self {
        self.schema.class_callbacks.push(callback);
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.schema.class_docs.summary = Some(summary.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.schema.class_docs.description = Some(description.into());
        self
    }

    pub fn build(self) -> RawSchema {
        self.schema
    }
}

/// Supplies raw schemas by class identifier.
pub trait SchemaSource: Send + Sync {
    fn load(&self, class: &ClassId) -> Option<RawSchema>;
}

/// In-memory source fed by explicit registration.
#[derive(Debug, Default)]
pub struct StaticSchemaSource {
    schemas: RwLock<HashMap<ClassId, RawSchema>>,
}

impl StaticSchemaSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, class: ClassId, schema: RawSchema) {
        let mut schemas = match self.schemas.write() {
            Ok(schemas) => schemas,
            Err(poisoned) => poisoned.into_inner(),
        };
        schemas.insert(class, schema);
    }
}

impl SchemaSource for StaticSchemaSource {
    fn load(&self, class: &ClassId) -> Option<RawSchema> {
        let schemas = match self.schemas.read() {
            Ok(schemas) => schemas,
            Err(poisoned) => poisoned.into_inner(),
        };
        schemas.get(class).cloned()
    }
}
