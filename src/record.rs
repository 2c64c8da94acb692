//! The schema-bound record seam.
//!
//! Mapped records are plain structs that implement [`MappedRecord`], giving
//! the processing engine a uniform `set`/`unset` surface without runtime
//! reflection. Classes are identified by [`ClassId`] and looked up in the
//! [`ClassRegistry`](crate::registry::ClassRegistry); schemas reference
//! nested classes by identifier only, never by embedding.

use std::any::Any;
use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::error::SchemaError;
use crate::processing::SkippedPropertiesContext;

/// Identity key of a mapped-record class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ClassId(Cow<'static, str>);

impl ClassId {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for ClassId {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

/// A value produced by the processing pipeline.
///
/// Raw input is always JSON; rules and nested processing may replace parts
/// of it with materialized records, so processed values form this sum.
#[derive(Debug)]
pub enum MappedValue {
    Json(Value),
    Record(Box<dyn MappedRecord>),
    List(Vec<MappedValue>),
    Map(IndexMap<String, MappedValue>),
}

impl MappedValue {
    pub fn json(value: impl Into<Value>) -> Self {
        Self::Json(value.into())
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Folds the value back into plain JSON. Fails on materialized records,
    /// which have no canonical JSON form.
    pub fn into_json(self) -> Result<Value, SchemaError> {
        match self {
            Self::Json(value) => Ok(value),
            Self::Record(record) => Err(SchemaError::InvalidState(format!(
                "record of class '{}' cannot be folded into plain JSON",
                record.class_id(),
            ))),
            Self::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(item.into_json()?);
                }
                Ok(Value::Array(values))
            }
            Self::Map(entries) => {
                let mut map = serde_json::Map::with_capacity(entries.len());
                for (key, value) in entries {
                    map.insert(key, value.into_json()?);
                }
                Ok(Value::Object(map))
            }
        }
    }

    pub fn into_list(self) -> Result<Vec<MappedValue>, SchemaError> {
        match self {
            Self::List(items) => Ok(items),
            other => Err(SchemaError::InvalidState(format!(
                "expected a processed list, got {}",
                other.kind_name(),
            ))),
        }
    }

    pub fn into_record<T: MappedRecord>(self) -> Result<T, SchemaError> {
        match self {
            Self::Record(record) => {
                let class = record.class_id();
                record.into_any().downcast::<T>().map(|boxed| *boxed).map_err(|_| {
                    SchemaError::InvalidState(format!(
                        "record of class '{class}' is not the requested type",
                    ))
                })
            }
            other => Err(SchemaError::InvalidState(format!(
                "expected a materialized record, got {}",
                other.kind_name(),
            ))),
        }
    }

    pub fn into_string(self) -> Result<String, SchemaError> {
        match self.into_json()? {
            Value::String(s) => Ok(s),
            other => Err(SchemaError::InvalidState(format!(
                "expected a string value, got {other}",
            ))),
        }
    }

    /// Deep clone that fails on materialized records.
    pub fn try_clone(&self) -> Option<MappedValue> {
        match self {
            Self::Json(value) => Some(Self::Json(value.clone())),
            Self::Record(_) => None,
            Self::List(items) => {
                let mut cloned = Vec::with_capacity(items.len());
                for item in items {
                    cloned.push(item.try_clone()?);
                }
                Some(Self::List(cloned))
            }
            Self::Map(entries) => {
                let mut cloned = IndexMap::with_capacity(entries.len());
                for (key, value) in entries {
                    cloned.insert(key.clone(), value.try_clone()?);
                }
                Some(Self::Map(cloned))
            }
        }
    }

    /// Best-effort raw JSON view used when attaching values to failures.
    pub(crate) fn to_raw(&self) -> Option<Value> {
        match self.try_clone() {
            Some(value) => value.into_json().ok(),
            None => None,
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Self::Json(_) => "a JSON value",
            Self::Record(_) => "a record",
            Self::List(_) => "a list",
            Self::Map(_) => "a map",
        }
    }
}

impl From<Value> for MappedValue {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

/// Bookkeeping every mapped record carries alongside its own fields.
#[derive(Debug, Default)]
pub struct RecordExtras {
    raw_values: Option<Value>,
    initialized: HashSet<String>,
    skipped: Option<SkippedPropertiesContext>,
}

impl RecordExtras {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw_values(&self) -> Option<&Value> {
        self.raw_values.as_ref()
    }

    pub fn set_raw_values(&mut self, raw: Value) {
        self.raw_values = Some(raw);
    }

    pub fn is_initialized(&self, property: &str) -> bool {
        self.initialized.contains(property)
    }

    pub(crate) fn mark_initialized(&mut self, property: &str) {
        self.initialized.insert(property.to_string());
    }

    pub(crate) fn clear_initialized(&mut self, property: &str) {
        self.initialized.remove(property);
    }

    pub fn skipped_context(&self) -> Option<&SkippedPropertiesContext> {
        self.skipped.as_ref()
    }

    pub(crate) fn set_skipped_context(&mut self, context: Option<SkippedPropertiesContext>) {
        self.skipped = context;
    }

    pub(crate) fn take_skipped_context(&mut self) -> Option<SkippedPropertiesContext> {
        self.skipped.take()
    }

    /// True while some properties are set aside for deferred completion.
    pub fn has_skipped_properties(&self) -> bool {
        self.skipped.is_some()
    }
}

/// A struct the processor can populate from validated data.
///
/// Implementors hold a [`RecordExtras`] and translate `set` calls onto their
/// own fields, converting from [`MappedValue`] as needed. `unset` only has to
/// forget a value when the record keeps state beyond what the engine's
/// initialized-property accounting covers.
pub trait MappedRecord: Any + fmt::Debug + Send {
    fn class_id(&self) -> ClassId;

    fn set(&mut self, property: &str, value: MappedValue) -> Result<(), SchemaError>;

    fn unset(&mut self, _property: &str) {}

    fn extras(&self) -> &RecordExtras;

    fn extras_mut(&mut self) -> &mut RecordExtras;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl dyn MappedRecord {
    pub fn is_initialized(&self, property: &str) -> bool {
        self.extras().is_initialized(property)
    }

    pub fn raw_values(&self) -> Option<&Value> {
        self.extras().raw_values()
    }

    pub fn downcast_ref<T: MappedRecord>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast<T: MappedRecord>(self: Box<Self>) -> Result<Box<T>, SchemaError> {
        let class = self.class_id();
        self.into_any().downcast::<T>().map_err(|_| {
            SchemaError::InvalidState(format!(
                "record of class '{class}' is not the requested type",
            ))
        })
    }
}

/// Error helper shared by record `set` implementations.
pub fn unknown_property(class: &ClassId, property: &str) -> SchemaError {
    SchemaError::InvalidState(format!(
        "class '{class}' has no property named '{property}'",
    ))
}
