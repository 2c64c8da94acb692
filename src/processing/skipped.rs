//! Deferred-property bookkeeping.

use indexmap::IndexMap;
use serde_json::Value;

use crate::processing::options::Options;
use crate::types::StructureType;

/// One property whose validation was deferred.
#[derive(Debug, Clone)]
pub struct SkippedProperty {
    field_name: String,
    value: Value,
    from_default: bool,
}

impl SkippedProperty {
    pub(crate) fn sent(field_name: impl Into<String>, value: Value) -> Self {
        Self { field_name: field_name.into(), value, from_default: false }
    }

    pub(crate) fn from_default(field_name: impl Into<String>, value: Value) -> Self {
        Self { field_name: field_name.into(), value, from_default: true }
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Default values bypass rule validation when the property is completed.
    pub fn is_from_default(&self) -> bool {
        self.from_default
    }
}

/// Carried on a record while some of its properties await completion.
///
/// Holds everything deferred validation needs later: the structure
/// descriptor for error reporting, the options the record was processed
/// with, and each skipped property's raw value.
#[derive(Debug, Clone)]
pub struct SkippedPropertiesContext {
    descriptor: StructureType,
    options: Options,
    skipped: IndexMap<String, SkippedProperty>,
}

impl SkippedPropertiesContext {
    pub(crate) fn new(
        descriptor: StructureType,
        options: Options,
        skipped: IndexMap<String, SkippedProperty>,
    ) -> Self {
        Self { descriptor, options, skipped }
    }

    pub fn descriptor(&self) -> &StructureType {
        &self.descriptor
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn contains(&self, property: &str) -> bool {
        self.skipped.contains_key(property)
    }

    pub fn skipped(&self) -> &IndexMap<String, SkippedProperty> {
        &self.skipped
    }

    pub fn is_empty(&self) -> bool {
        self.skipped.is_empty()
    }

    pub(crate) fn get(&self, property: &str) -> Option<&SkippedProperty> {
        self.skipped.get(property)
    }

    pub(crate) fn remove(&mut self, property: &str) -> Option<SkippedProperty> {
        self.skipped.shift_remove(property)
    }

    pub(crate) fn descriptor_mut(&mut self) -> &mut StructureType {
        &mut self.descriptor
    }
}
