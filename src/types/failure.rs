use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::types::descriptor::TypeDescriptor;

/// A single value did not match a single expected type.
///
/// Carries the expected [`TypeDescriptor`] at the exact point of failure,
/// annotated with whatever parameter or subtype markers the rule set, plus
/// the offending raw value (`None` when no value was sent at all).
#[derive(Debug, Clone, Serialize)]
pub struct ValueMismatch {
    descriptor: TypeDescriptor,
    value: Option<Value>,
}

impl ValueMismatch {
    pub fn new(descriptor: TypeDescriptor, value: Option<Value>) -> Self {
        Self { descriptor, value }
    }

    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn into_parts(self) -> (TypeDescriptor, Option<Value>) {
        (self.descriptor, self.value)
    }
}

impl fmt::Display for ValueMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "value does not match the expected type")
    }
}

impl std::error::Error for ValueMismatch {}

/// A whole record or array failed validation.
///
/// The descriptor is the root of the processed structure, already annotated
/// with every nested invalid marker that was found; rendering it is the job
/// of an [`ErrorPrinter`](crate::printers::ErrorPrinter).
#[derive(Debug, Clone, Serialize)]
pub struct InvalidData {
    descriptor: TypeDescriptor,
    value: Option<Value>,
}

impl InvalidData {
    pub fn new(descriptor: TypeDescriptor, value: Option<Value>) -> Self {
        Self { descriptor, value }
    }

    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn into_parts(self) -> (TypeDescriptor, Option<Value>) {
        (self.descriptor, self.value)
    }
}

impl fmt::Display for InvalidData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data does not match the expected structure")
    }
}

impl std::error::Error for InvalidData {}

/// Either failure kind, as caught and converted by the processing engine.
#[derive(Debug, Clone, Serialize)]
pub enum MappingFailure {
    Mismatch(ValueMismatch),
    Data(InvalidData),
}

impl MappingFailure {
    pub fn descriptor(&self) -> &TypeDescriptor {
        match self {
            Self::Mismatch(mismatch) => mismatch.descriptor(),
            Self::Data(data) => data.descriptor(),
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Mismatch(mismatch) => mismatch.value(),
            Self::Data(data) => data.value(),
        }
    }

    pub fn into_parts(self) -> (TypeDescriptor, Option<Value>) {
        match self {
            Self::Mismatch(mismatch) => mismatch.into_parts(),
            Self::Data(data) => data.into_parts(),
        }
    }
}

impl From<ValueMismatch> for MappingFailure {
    fn from(mismatch: ValueMismatch) -> Self {
        Self::Mismatch(mismatch)
    }
}

impl From<InvalidData> for MappingFailure {
    fn from(data: InvalidData) -> Self {
        Self::Data(data)
    }
}
