//! Per-call processing options.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::ClassId;

/// Which missing fields count as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredFields {
    /// Fields whose property has no default are required.
    #[default]
    NonDefault,
    /// Every field is required, defaults notwithstanding.
    All,
    /// No field is required; missing ones are left untouched.
    None,
}

/// Options for one processing call.
///
/// Cloned into every nested structure, so nested records see the same
/// settings plus the chain of classes already being processed.
#[derive(Debug, Clone, Default)]
pub struct Options {
    allow_unknown_fields: bool,
    fill_raw_values: bool,
    prefill_default_values: bool,
    required_fields: RequiredFields,
    dynamic_context: IndexMap<String, Value>,
    processed_classes: Vec<ClassId>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unknown fields are dropped instead of reported.
    pub fn set_allow_unknown_fields(&mut self) {
        self.allow_unknown_fields = true;
    }

    pub fn is_unknown_fields_allowed(&self) -> bool {
        self.allow_unknown_fields
    }

    /// Keeps a copy of the raw input on the produced record.
    pub fn set_fill_raw_values(&mut self) {
        self.fill_raw_values = true;
    }

    pub fn is_fill_raw_values(&self) -> bool {
        self.fill_raw_values
    }

    /// Also fills defaults when producing plain field maps.
    pub fn set_prefill_default_values(&mut self) {
        self.prefill_default_values = true;
    }

    pub fn is_prefill_default_values(&self) -> bool {
        self.prefill_default_values
    }

    pub fn set_required_fields(&mut self, required: RequiredFields) {
        self.required_fields = required;
    }

    pub fn required_fields(&self) -> RequiredFields {
        self.required_fields
    }

    /// Attaches caller data that callbacks can read during processing.
    pub fn add_dynamic_context(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.dynamic_context.insert(key.into(), value.into());
    }

    pub fn dynamic_context(&self, key: &str) -> Option<&Value> {
        self.dynamic_context.get(key)
    }

    pub(crate) fn push_processed_class(&mut self, class: ClassId) {
        self.processed_classes.push(class);
    }

    pub fn has_processed_class(&self, class: &ClassId) -> bool {
        self.processed_classes.contains(class)
    }

    pub fn processed_classes(&self) -> &[ClassId] {
        &self.processed_classes
    }
}
