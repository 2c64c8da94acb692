use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::record::ClassId;
use crate::types::failure::MappingFailure;

/// Operator joining the members of a compound type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompoundOperator {
    And,
    Or,
}

impl CompoundOperator {
    /// Separator used when rendering the compound as a string.
    pub fn delimiter(self) -> &'static str {
        match self {
            Self::And => "&&",
            Self::Or => "||",
        }
    }
}

/// A named constraint attached to a simple or array type, e.g. `min_length`.
///
/// Parameters without a value are flags (`not_empty`); parameters with a
/// value carry the configured bound. The `invalid` marker is set during
/// validation when the value violated exactly this constraint.
#[derive(Debug, Clone, Serialize)]
pub struct TypeParameter {
    pub key: String,
    pub value: Option<Value>,
    invalid: bool,
}

impl TypeParameter {
    pub fn flag(key: impl Into<String>) -> Self {
        Self { key: key.into(), value: None, invalid: false }
    }

    pub fn with_value(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { key: key.into(), value: Some(value.into()), invalid: false }
    }

    pub fn mark_invalid(&mut self) {
        self.invalid = true;
    }

    pub fn is_invalid(&self) -> bool {
        self.invalid
    }
}

/// A scalar-ish named type with optional constraint parameters.
#[derive(Debug, Clone, Serialize)]
pub struct SimpleType {
    pub name: String,
    pub parameters: Vec<TypeParameter>,
}

impl SimpleType {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), parameters: Vec::new() }
    }

    pub fn with_parameters(name: impl Into<String>, parameters: Vec<TypeParameter>) -> Self {
        Self { name: name.into(), parameters }
    }

    pub fn mark_parameter_invalid(&mut self, key: &str) {
        for parameter in &mut self.parameters {
            if parameter.key == key {
                parameter.mark_invalid();
            }
        }
    }

    pub fn has_invalid_parameters(&self) -> bool {
        self.parameters.iter().any(TypeParameter::is_invalid)
    }
}

/// A closed set of accepted values.
#[derive(Debug, Clone, Serialize)]
pub struct EnumType {
    pub cases: Vec<Value>,
}

impl EnumType {
    pub fn new(cases: Vec<Value>) -> Self {
        Self { cases }
    }
}

/// One invalid key/item pair recorded against an array type.
#[derive(Debug, Clone, Serialize)]
pub struct InvalidPair {
    pub key: Value,
    pub key_failure: Option<MappingFailure>,
    pub item_failure: Option<MappingFailure>,
}

/// A homogeneous sequence (optionally keyed), with constraint parameters and
/// per-pair error slots filled in during validation.
#[derive(Debug, Clone, Serialize)]
pub struct ArrayType {
    pub key_type: Option<Box<TypeDescriptor>>,
    pub item_type: Box<TypeDescriptor>,
    pub parameters: Vec<TypeParameter>,
    pub invalid_pairs: Vec<InvalidPair>,
}

impl ArrayType {
    pub fn new(key_type: Option<TypeDescriptor>, item_type: TypeDescriptor) -> Self {
        Self {
            key_type: key_type.map(Box::new),
            item_type: Box::new(item_type),
            parameters: Vec::new(),
            invalid_pairs: Vec::new(),
        }
    }

    pub fn with_parameters(mut self, parameters: Vec<TypeParameter>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn add_invalid_pair(
        &mut self,
        key: Value,
        key_failure: Option<MappingFailure>,
        item_failure: Option<MappingFailure>,
    ) {
        self.invalid_pairs.push(InvalidPair { key, key_failure, item_failure });
    }

    pub fn has_invalid_pairs(&self) -> bool {
        !self.invalid_pairs.is_empty()
    }

    pub fn mark_parameter_invalid(&mut self, key: &str) {
        for parameter in &mut self.parameters {
            if parameter.key == key {
                parameter.mark_invalid();
            }
        }
    }

    pub fn has_invalid_parameters(&self) -> bool {
        self.parameters.iter().any(TypeParameter::is_invalid)
    }
}

/// An AND/OR combination of alternative types, in declaration order.
#[derive(Debug, Clone, Serialize)]
pub struct CompoundType {
    pub operator: CompoundOperator,
    pub subtypes: Vec<TypeDescriptor>,
}

impl CompoundType {
    pub fn new(operator: CompoundOperator) -> Self {
        Self { operator, subtypes: Vec::new() }
    }

    pub fn add_subtype(&mut self, subtype: TypeDescriptor) {
        self.subtypes.push(subtype);
    }
}

/// The expected shape of one mapped record: ordered fields keyed by their
/// external field name, plus the error slots filled during validation.
#[derive(Debug, Clone, Serialize)]
pub struct StructureType {
    pub class: ClassId,
    pub fields: IndexMap<String, TypeDescriptor>,
    invalid_fields: IndexMap<String, MappingFailure>,
    errors: Vec<MappingFailure>,
    invalid: bool,
}

impl StructureType {
    pub fn new(class: ClassId) -> Self {
        Self {
            class,
            fields: IndexMap::new(),
            invalid_fields: IndexMap::new(),
            errors: Vec::new(),
            invalid: false,
        }
    }

    pub fn add_field(&mut self, field: impl Into<String>, descriptor: TypeDescriptor) {
        self.fields.insert(field.into(), descriptor);
    }

    /// Records (or replaces) the failure for one field.
    pub fn overwrite_invalid_field(&mut self, field: impl Into<String>, failure: MappingFailure) {
        self.invalid_fields.insert(field.into(), failure);
    }

    pub fn is_field_invalid(&self, field: &str) -> bool {
        self.invalid_fields.contains_key(field)
    }

    pub fn has_invalid_fields(&self) -> bool {
        !self.invalid_fields.is_empty()
    }

    pub fn invalid_fields(&self) -> &IndexMap<String, MappingFailure> {
        &self.invalid_fields
    }

    /// Attaches a structure-level failure not tied to a single field.
    pub fn add_error(&mut self, failure: MappingFailure) {
        self.errors.push(failure);
    }

    pub fn errors(&self) -> &[MappingFailure] {
        &self.errors
    }

    /// Marks the whole structure invalid, e.g. when the input is not map-shaped.
    pub fn mark_invalid(&mut self) {
        self.invalid = true;
    }

    pub fn is_invalid(&self) -> bool {
        self.invalid || !self.errors.is_empty() || self.has_invalid_fields()
    }
}

/// A free-form message taking the place of a type, used for errors that have
/// no meaningful expected shape (e.g. unknown fields).
#[derive(Debug, Clone, Serialize)]
pub struct MessageType {
    pub message: String,
}

impl MessageType {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Tagged union over every descriptor variant.
#[derive(Debug, Clone, Serialize)]
pub enum TypeDescriptor {
    Simple(SimpleType),
    Enum(EnumType),
    Array(ArrayType),
    Compound(CompoundType),
    Structure(StructureType),
    Message(MessageType),
}

impl TypeDescriptor {
    pub fn simple(name: impl Into<String>) -> Self {
        Self::Simple(SimpleType::new(name))
    }

    pub fn message(text: impl Into<String>) -> Self {
        Self::Message(MessageType::new(text))
    }

    pub fn as_structure(&self) -> Option<&StructureType> {
        match self {
            Self::Structure(structure) => Some(structure),
            _ => None,
        }
    }

    pub fn as_compound(&self) -> Option<&CompoundType> {
        match self {
            Self::Compound(compound) => Some(compound),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayType> {
        match self {
            Self::Array(array) => Some(array),
            _ => None,
        }
    }
}

impl From<StructureType> for TypeDescriptor {
    fn from(structure: StructureType) -> Self {
        Self::Structure(structure)
    }
}

impl From<CompoundType> for TypeDescriptor {
    fn from(compound: CompoundType) -> Self {
        Self::Compound(compound)
    }
}

impl From<SimpleType> for TypeDescriptor {
    fn from(simple: SimpleType) -> Self {
        Self::Simple(simple)
    }
}

impl From<ArrayType> for TypeDescriptor {
    fn from(array: ArrayType) -> Self {
        Self::Array(array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::failure::ValueMismatch;
    use serde_json::json;

    #[test]
    fn structure_tracks_invalid_fields() {
        let mut structure = StructureType::new(ClassId::new("Example"));
        structure.add_field("name", TypeDescriptor::simple("string"));
        assert!(!structure.is_invalid());

        structure.overwrite_invalid_field(
            "name",
            MappingFailure::Mismatch(ValueMismatch::new(
                TypeDescriptor::simple("string"),
                Some(json!(42)),
            )),
        );

        assert!(structure.is_field_invalid("name"));
        assert!(structure.has_invalid_fields());
        assert!(structure.is_invalid());
    }

    #[test]
    fn structure_without_errors_is_valid() {
        let structure = StructureType::new(ClassId::new("Example"));
        assert!(!structure.is_invalid());
        assert!(!structure.has_invalid_fields());
        assert!(structure.errors().is_empty());
    }

    #[test]
    fn parameter_invalidation_is_per_key() {
        let mut simple = SimpleType::with_parameters(
            "string",
            vec![
                TypeParameter::flag("not_empty"),
                TypeParameter::with_value("min_length", 3),
            ],
        );
        simple.mark_parameter_invalid("min_length");

        assert!(simple.has_invalid_parameters());
        assert!(!simple.parameters[0].is_invalid());
        assert!(simple.parameters[1].is_invalid());
    }

    #[test]
    fn array_collects_invalid_pairs() {
        let mut array = ArrayType::new(None, TypeDescriptor::simple("string"));
        assert!(!array.has_invalid_pairs());

        array.add_invalid_pair(
            json!(1),
            None,
            Some(MappingFailure::Mismatch(ValueMismatch::new(
                TypeDescriptor::simple("string"),
                Some(json!(false)),
            ))),
        );
        assert!(array.has_invalid_pairs());
    }
}
