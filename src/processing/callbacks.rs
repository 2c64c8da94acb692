//! User callbacks running before and after rule validation.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::processing::options::Options;
use crate::record::{ClassId, MappedValue};
use crate::rules::RuleError;
use crate::types::StructureType;

/// When a callback runs relative to rule validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackStage {
    Before,
    After,
}

/// Signature of a user callback.
///
/// Receives the current value and may replace it; a returned failure marks
/// the field (or the whole structure, for class callbacks) invalid.
pub type CallbackFn =
    dyn Fn(MappedValue, &mut CallbackContext<'_>) -> Result<MappedValue, RuleError> + Send + Sync;

/// A callback attached to a class or property.
#[derive(Clone)]
pub struct Callback {
    stage: CallbackStage,
    func: Arc<CallbackFn>,
}

impl Callback {
    pub fn before(
        func: impl Fn(MappedValue, &mut CallbackContext<'_>) -> Result<MappedValue, RuleError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self { stage: CallbackStage::Before, func: Arc::new(func) }
    }

    pub fn after(
        func: impl Fn(MappedValue, &mut CallbackContext<'_>) -> Result<MappedValue, RuleError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self { stage: CallbackStage::After, func: Arc::new(func) }
    }

    pub fn stage(&self) -> CallbackStage {
        self.stage
    }

    pub fn invoke(
        &self,
        value: MappedValue,
        context: &mut CallbackContext<'_>,
    ) -> Result<MappedValue, RuleError> {
        (self.func)(value, context)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback").field("stage", &self.stage).finish_non_exhaustive()
    }
}

/// What a callback can see about the processing it runs inside.
#[derive(Debug)]
pub struct CallbackContext<'a> {
    class: &'a ClassId,
    field_name: Option<&'a str>,
    property_name: Option<&'a str>,
    options: &'a Options,
    current_type: Option<&'a StructureType>,
}

impl<'a> CallbackContext<'a> {
    pub(crate) fn for_class(
        class: &'a ClassId,
        options: &'a Options,
        current_type: &'a StructureType,
    ) -> Self {
        Self { class, field_name: None, property_name: None, options, current_type: Some(current_type) }
    }

    pub(crate) fn for_property(
        class: &'a ClassId,
        field_name: &'a str,
        property_name: &'a str,
        options: &'a Options,
    ) -> Self {
        Self {
            class,
            field_name: Some(field_name),
            property_name: Some(property_name),
            options,
            current_type: None,
        }
    }

    pub fn class(&self) -> &ClassId {
        self.class
    }

    /// `None` for class-level callbacks.
    pub fn field_name(&self) -> Option<&str> {
        self.field_name
    }

    pub fn property_name(&self) -> Option<&str> {
        self.property_name
    }

    pub fn options(&self) -> &Options {
        self.options
    }

    /// The structure descriptor being validated; set for class callbacks.
    pub fn current_type(&self) -> Option<&StructureType> {
        self.current_type
    }

    pub fn dynamic_context(&self, key: &str) -> Option<&Value> {
        self.options.dynamic_context(key)
    }
}
