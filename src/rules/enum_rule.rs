//! The enum rule: a closed set of accepted values.

use crate::error::SchemaError;
use crate::processing::{FieldContext, ResolverContext, TypeContext};
use crate::record::MappedValue;
use crate::rules::{ArgMap, ArgsChecker, EnumArgs, Rule, RuleArgs, RuleError, RuleId};
use crate::types::{EnumType, TypeDescriptor, ValueMismatch};

/// Accepts only values listed in its `cases` argument, compared by equality.
#[derive(Debug)]
pub struct EnumRule;

impl Rule for EnumRule {
    fn resolve_args(
        &self,
        args: &ArgMap,
        _context: &ResolverContext<'_>,
    ) -> Result<RuleArgs, SchemaError> {
        let rule = RuleId::ENUM;
        let mut checker = ArgsChecker::new(&rule, args);
        let cases = checker.required_cases("cases")?;
        checker.finish()?;

        if cases.is_empty() {
            return Err(SchemaError::InvalidArgument(
                "argument 'cases' given to rule 'enum' must not be empty".to_string(),
            ));
        }
        Ok(RuleArgs::Enum(EnumArgs { cases }))
    }

    fn create_type(
        &self,
        args: &RuleArgs,
        _context: &mut TypeContext<'_>,
    ) -> Result<TypeDescriptor, SchemaError> {
        let cases = match args {
            RuleArgs::Enum(enum_args) => enum_args.cases.clone(),
            _ => Vec::new(),
        };
        Ok(TypeDescriptor::Enum(EnumType::new(cases)))
    }

    fn process_value(
        &self,
        value: MappedValue,
        args: &RuleArgs,
        _context: &mut FieldContext<'_>,
    ) -> Result<MappedValue, RuleError> {
        let cases = match args {
            RuleArgs::Enum(enum_args) => &enum_args.cases,
            _ => {
                return Err(SchemaError::InvalidState(
                    "enum rule invoked without resolved cases".to_string(),
                )
                .into());
            }
        };

        let accepted = value.as_json().is_some_and(|json| cases.contains(json));
        if accepted {
            Ok(value)
        } else {
            Err(ValueMismatch::new(
                TypeDescriptor::Enum(EnumType::new(cases.clone())),
                value.to_raw(),
            )
            .into())
        }
    }
}
