//! The type/error model.
//!
//! [`TypeDescriptor`] describes the shape a schema expects at one point of
//! the data. The same tree doubles as the error report: during validation the
//! engine marks fields, parameters and array pairs invalid in place, so a
//! failed validation hands back the schema shape annotated with exactly what
//! was violated and where.

mod descriptor;
mod failure;

pub use descriptor::{
    ArrayType, CompoundOperator, CompoundType, EnumType, InvalidPair, MessageType, SimpleType,
    StructureType, TypeDescriptor, TypeParameter,
};
pub use failure::{InvalidData, MappingFailure, ValueMismatch};
