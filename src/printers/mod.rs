//! Rendering of validation failures for humans and machines.

use indexmap::IndexMap;
use serde_json::Value;

use crate::types::{
    ArrayType, CompoundType, EnumType, InvalidData, MappingFailure, SimpleType, StructureType,
    TypeDescriptor,
};

/// Renders one whole [`InvalidData`] failure.
///
/// `path` names the location of the processed structure inside a larger
/// document, e.g. a config file section.
pub trait ErrorPrinter {
    type Output;

    fn print_error(&self, error: &InvalidData, path: &[&str]) -> Self::Output;
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Renders type descriptors as compact one-line (structures excepted) text.
#[derive(Debug, Default)]
pub struct TypeToStringConverter;

impl TypeToStringConverter {
    pub fn new() -> Self {
        Self
    }

    pub fn convert(&self, descriptor: &TypeDescriptor) -> String {
        match descriptor {
            TypeDescriptor::Simple(simple) => self.convert_simple(simple),
            TypeDescriptor::Enum(enumeration) => self.convert_enum(enumeration),
            TypeDescriptor::Array(array) => self.convert_array(array),
            TypeDescriptor::Compound(compound) => self.convert_compound(compound),
            TypeDescriptor::Structure(structure) => self.convert_structure(structure),
            TypeDescriptor::Message(message) => message.message.clone(),
        }
    }

    fn convert_parameters(
        &self,
        parameters: &[crate::types::TypeParameter],
    ) -> Option<String> {
        if parameters.is_empty() {
            return None;
        }
        let rendered: Vec<String> = parameters
            .iter()
            .map(|parameter| match &parameter.value {
                Some(value) => format!("{}: {}", parameter.key, format_value(value)),
                None => parameter.key.clone(),
            })
            .collect();
        Some(rendered.join(", "))
    }

    fn convert_simple(&self, simple: &SimpleType) -> String {
        match self.convert_parameters(&simple.parameters) {
            Some(parameters) => format!("{}({parameters})", simple.name),
            None => simple.name.clone(),
        }
    }

    fn convert_enum(&self, enumeration: &EnumType) -> String {
        let cases: Vec<String> = enumeration.cases.iter().map(format_value).collect();
        format!("enum({})", cases.join("|"))
    }

    fn convert_array(&self, array: &ArrayType) -> String {
        let inner = match &array.key_type {
            Some(key) => format!("{}, {}", self.convert(key), self.convert(&array.item_type)),
            None => self.convert(&array.item_type),
        };
        match self.convert_parameters(&array.parameters) {
            Some(parameters) => format!("array<{inner}>({parameters})"),
            None => format!("array<{inner}>"),
        }
    }

    fn convert_compound(&self, compound: &CompoundType) -> String {
        let subtypes: Vec<String> =
            compound.subtypes.iter().map(|subtype| self.convert(subtype)).collect();
        subtypes.join(compound.operator.delimiter())
    }

    fn convert_structure(&self, structure: &StructureType) -> String {
        if structure.fields.is_empty() {
            return "shape{}".to_string();
        }
        let mut lines = vec!["shape{".to_string()];
        for (field, descriptor) in &structure.fields {
            lines.push(format!("\t{field}: {}", self.convert(descriptor)));
        }
        lines.push("}".to_string());
        lines.join("\n")
    }
}

fn join_path(path: &[String]) -> String {
    path.join(".")
}

fn collect_structure(
    converter: &TypeToStringConverter,
    structure: &StructureType,
    path: &[String],
    out: &mut Vec<(String, String)>,
) {
    // Whole-structure failures (non-map input) list every expected field.
    if structure.is_invalid()
        && !structure.has_invalid_fields()
        && structure.errors().is_empty()
    {
        for (field, descriptor) in &structure.fields {
            let mut field_path = path.to_vec();
            field_path.push(field.clone());
            out.push((join_path(&field_path), converter.convert(descriptor)));
        }
        return;
    }

    for error in structure.errors() {
        out.push((join_path(path), converter.convert(error.descriptor())));
    }

    for (field, failure) in structure.invalid_fields() {
        let mut field_path = path.to_vec();
        field_path.push(field.clone());
        collect_failure(converter, failure, &field_path, out);
    }
}

fn collect_failure(
    converter: &TypeToStringConverter,
    failure: &MappingFailure,
    path: &[String],
    out: &mut Vec<(String, String)>,
) {
    match failure.descriptor() {
        TypeDescriptor::Structure(structure) if structure.is_invalid() => {
            collect_structure(converter, structure, path, out);
        }
        TypeDescriptor::Array(array) if array.has_invalid_pairs() => {
            if array.has_invalid_parameters() {
                out.push((join_path(path), converter.convert(failure.descriptor())));
            }
            for pair in &array.invalid_pairs {
                let mut pair_path = path.to_vec();
                if let Some(last) = pair_path.last_mut() {
                    *last = format!("{last}[{}]", format_value(&pair.key));
                }
                if let Some(key_failure) = &pair.key_failure {
                    out.push((
                        format!("{} (key)", join_path(&pair_path)),
                        converter.convert(key_failure.descriptor()),
                    ));
                }
                if let Some(item_failure) = &pair.item_failure {
                    collect_failure(converter, item_failure, &pair_path, out);
                }
            }
        }
        descriptor => {
            out.push((join_path(path), converter.convert(descriptor)));
        }
    }
}

fn collect_error(error: &InvalidData, path: &[&str]) -> Vec<(String, String)> {
    let converter = TypeToStringConverter::new();
    let base: Vec<String> = path.iter().map(|segment| segment.to_string()).collect();
    let mut out = Vec::new();
    match error.descriptor() {
        TypeDescriptor::Structure(structure) => {
            collect_structure(&converter, structure, &base, &mut out);
        }
        descriptor => {
            out.push((join_path(&base), converter.convert(descriptor)));
        }
    }
    out
}

/// Renders failures as plain text, one line per invalid field.
#[derive(Debug, Default)]
pub struct ErrorVisualPrinter;

impl ErrorVisualPrinter {
    pub fn new() -> Self {
        Self
    }
}

impl ErrorPrinter for ErrorVisualPrinter {
    type Output = String;

    fn print_error(&self, error: &InvalidData, path: &[&str]) -> String {
        let lines: Vec<String> = collect_error(error, path)
            .into_iter()
            .map(|(field_path, expected)| {
                if field_path.is_empty() {
                    expected
                } else {
                    format!("{field_path}: {expected}")
                }
            })
            .collect();
        lines.join("\n")
    }
}

/// Renders failures as a JSON object keyed by field path.
#[derive(Debug, Default)]
pub struct ErrorJsonPrinter;

impl ErrorJsonPrinter {
    pub fn new() -> Self {
        Self
    }
}

impl ErrorPrinter for ErrorJsonPrinter {
    type Output = Value;

    fn print_error(&self, error: &InvalidData, path: &[&str]) -> Value {
        let mut fields: IndexMap<String, Value> = IndexMap::new();
        for (field_path, expected) in collect_error(error, path) {
            fields.insert(field_path, Value::String(expected));
        }
        serde_json::to_value(fields).unwrap_or(Value::Null)
    }
}
