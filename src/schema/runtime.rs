//! Resolved, immutable runtime schemas.

use indexmap::IndexMap;
use serde_json::Value;

use crate::processing::Callback;
use crate::record::ClassId;
use crate::rules::ResolvedRule;

/// Human-readable documentation attached to a class or property.
#[derive(Debug, Clone, Default)]
pub struct Docs {
    pub summary: Option<String>,
    pub description: Option<String>,
}

/// Default value of a property, distinguished from "defaults to null".
#[derive(Debug, Clone, Default)]
pub enum PropertyDefault {
    #[default]
    None,
    Value(Value),
}

impl PropertyDefault {
    pub fn has_value(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::None => None,
        }
    }
}

/// Resolved modifiers of one property.
#[derive(Debug, Clone, Default)]
pub struct PropertyModifiers {
    pub field_name: Option<String>,
    pub skipped: bool,
}

/// Resolved modifiers of a class.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassModifiers {
    pub create_without_constructor: bool,
}

/// One property after resolution.
#[derive(Debug, Clone)]
pub struct PropertySchema {
    pub rule: ResolvedRule,
    pub modifiers: PropertyModifiers,
    pub callbacks: Vec<Callback>,
    pub default: PropertyDefault,
    pub docs: Docs,
}

/// The validated schema of one class, shared immutably once resolved.
#[derive(Debug, Clone)]
pub struct RuntimeSchema {
    class: ClassId,
    properties: IndexMap<String, PropertySchema>,
    class_callbacks: Vec<Callback>,
    class_modifiers: ClassModifiers,
    docs: Docs,
    // Renamed fields only; identity mappings are implicit.
    fields_to_properties: IndexMap<String, String>,
}

impl RuntimeSchema {
    pub(crate) fn new(
        class: ClassId,
        properties: IndexMap<String, PropertySchema>,
        class_callbacks: Vec<Callback>,
        class_modifiers: ClassModifiers,
        docs: Docs,
    ) -> Self {
        let mut fields_to_properties = IndexMap::new();
        for (property, schema) in &properties {
            if let Some(field) = &schema.modifiers.field_name {
                fields_to_properties.insert(field.clone(), property.clone());
            }
        }
        Self { class, properties, class_callbacks, class_modifiers, docs, fields_to_properties }
    }

    pub fn class(&self) -> &ClassId {
        &self.class
    }

    pub fn properties(&self) -> &IndexMap<String, PropertySchema> {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertySchema> {
        self.properties.get(name)
    }

    pub fn class_callbacks(&self) -> &[Callback] {
        &self.class_callbacks
    }

    pub fn class_modifiers(&self) -> ClassModifiers {
        self.class_modifiers
    }

    pub fn docs(&self) -> &Docs {
        &self.docs
    }

    /// Maps an external field name onto the property it feeds.
    ///
    /// Returns `None` for unknown fields, including a property's own name
    /// when that property was renamed away from it.
    pub fn field_to_property<'a>(&'a self, field: &'a str) -> Option<&'a str> {
        if let Some(property) = self.fields_to_properties.get(field) {
            return Some(property);
        }
        match self.properties.get(field) {
            Some(schema) if schema.modifiers.field_name.is_none() => Some(field),
            _ => None,
        }
    }

    /// The external field name a property reads from.
    pub fn property_to_field<'a>(&'a self, property: &'a str) -> &'a str {
        match self.properties.get(property) {
            Some(schema) => schema.modifiers.field_name.as_deref().unwrap_or(property),
            None => property,
        }
    }
}
