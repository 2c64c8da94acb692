//! The structure rule: delegates a nested value to the processing engine
//! for another mapped-record class.

use crate::error::{ProcessingError, SchemaError};
use crate::processing::{FieldContext, ResolverContext, TypeContext};
use crate::record::MappedValue;
use crate::rules::{ArgMap, ArgsChecker, Rule, RuleArgs, RuleError, RuleId, StructureArgs};
use crate::types::{StructureType, TypeDescriptor};

fn expect_structure_args(args: &RuleArgs) -> Result<&StructureArgs, SchemaError> {
    match args {
        RuleArgs::Structure(structure_args) => Ok(structure_args),
        _ => Err(SchemaError::InvalidState(
            "structure rule invoked without a resolved class".to_string(),
        )),
    }
}

/// Accepts a nested map matching another class's schema.
///
/// Resolving the argument loads the referenced schema, so an invalid class
/// anywhere in a schema hierarchy fails at build time rather than during
/// processing.
#[derive(Debug)]
pub struct StructureRule;

impl Rule for StructureRule {
    fn resolve_args(
        &self,
        args: &ArgMap,
        context: &ResolverContext<'_>,
    ) -> Result<RuleArgs, SchemaError> {
        let rule = RuleId::STRUCTURE;
        let mut checker = ArgsChecker::new(&rule, args);
        let class = checker.required_class("class")?.clone();
        checker.finish()?;

        context.ensure_class(&class)?;
        Ok(RuleArgs::Structure(StructureArgs { class }))
    }

    fn create_type(
        &self,
        args: &RuleArgs,
        context: &mut TypeContext<'_>,
    ) -> Result<TypeDescriptor, SchemaError> {
        let class = &expect_structure_args(args)?.class;

        // A class already being rendered higher up the hierarchy is cut off
        // here, keeping self-referencing schemas finite.
        if context.has_processed(class) {
            return Ok(TypeDescriptor::Structure(StructureType::new(class.clone())));
        }

        let schema = context.loader().load(class)?;
        context.push_processed(class.clone());
        let mut structure = StructureType::new(class.clone());
        for (property, property_schema) in schema.properties() {
            let field = schema.property_to_field(property);
            structure.add_field(field, context.type_of(&property_schema.rule)?);
        }
        context.pop_processed();
        Ok(TypeDescriptor::Structure(structure))
    }

    fn process_value(
        &self,
        value: MappedValue,
        args: &RuleArgs,
        context: &mut FieldContext<'_>,
    ) -> Result<MappedValue, RuleError> {
        let class = &expect_structure_args(args)?.class;
        let data = value.into_json()?;
        let options = context.options().clone();

        if context.is_initialize_objects() {
            match context.processor().process_value_internal(data, class, options) {
                Ok(record) => Ok(MappedValue::Record(record)),
                Err(ProcessingError::Data(invalid)) => Err(invalid.into()),
                Err(ProcessingError::Schema(err)) => Err(err.into()),
            }
        } else {
            match context.processor().process_without_mapping_internal(data, class, options) {
                Ok(fields) => Ok(MappedValue::Map(fields)),
                Err(ProcessingError::Data(invalid)) => Err(invalid.into()),
                Err(ProcessingError::Schema(err)) => Err(err.into()),
            }
        }
    }
}
