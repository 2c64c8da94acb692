//! The array rule: a homogeneous sequence with an item rule and optional
//! key rule and size bounds.

use serde_json::{json, Value};

use crate::error::SchemaError;
use crate::processing::{FieldContext, ResolverContext, TypeContext};
use crate::record::MappedValue;
use crate::rules::{ArgMap, ArgsChecker, ArrayArgs, Rule, RuleArgs, RuleError, RuleId};
use crate::types::{ArrayType, TypeDescriptor, TypeParameter, ValueMismatch};

fn array_parameters(args: &ArrayArgs) -> Vec<TypeParameter> {
    let mut parameters = Vec::new();
    if let Some(min_items) = args.min_items {
        parameters.push(TypeParameter::with_value("min_items", min_items));
    }
    if let Some(max_items) = args.max_items {
        parameters.push(TypeParameter::with_value("max_items", max_items));
    }
    parameters
}

fn expect_array_args(args: &RuleArgs) -> Result<&ArrayArgs, SchemaError> {
    match args {
        RuleArgs::Array(array_args) => Ok(array_args),
        _ => Err(SchemaError::InvalidState(
            "array rule invoked without resolved arguments".to_string(),
        )),
    }
}

/// Accepts JSON arrays whose every item matches the item rule.
///
/// Item failures do not abort processing of the remaining items; each one is
/// recorded as an invalid pair keyed by its index so the whole array is
/// reported at once.
#[derive(Debug)]
pub struct ArrayOfRule;

impl ArrayOfRule {
    fn build_type(
        args: &ArrayArgs,
        context: &mut TypeContext<'_>,
    ) -> Result<ArrayType, SchemaError> {
        let key_type = match &args.key {
            Some(key) => Some(context.type_of(key)?),
            None => None,
        };
        let item_type = context.type_of(&args.item)?;
        Ok(ArrayType::new(key_type, item_type).with_parameters(array_parameters(args)))
    }
}

impl Rule for ArrayOfRule {
    fn resolve_args(
        &self,
        args: &ArgMap,
        context: &ResolverContext<'_>,
    ) -> Result<RuleArgs, SchemaError> {
        let rule = RuleId::ARRAY_OF;
        let mut checker = ArgsChecker::new(&rule, args);
        let item = checker.required_rule("item")?;
        let key = checker.optional_rule("key")?;
        let min_items = checker.optional_usize("min_items")?;
        let max_items = checker.optional_usize("max_items")?;
        checker.finish()?;

        if let (Some(min), Some(max)) = (min_items, max_items) {
            if min > max {
                return Err(SchemaError::InvalidArgument(
                    "argument 'min_items' given to rule 'array_of' must not exceed 'max_items'"
                        .to_string(),
                ));
            }
        }

        let item = Box::new(context.resolve_rule(item)?);
        let key = match key {
            Some(directive) => Some(Box::new(context.resolve_rule(directive)?)),
            None => None,
        };
        Ok(RuleArgs::Array(ArrayArgs { item, key, min_items, max_items }))
    }

    fn create_type(
        &self,
        args: &RuleArgs,
        context: &mut TypeContext<'_>,
    ) -> Result<TypeDescriptor, SchemaError> {
        let args = expect_array_args(args)?;
        Ok(TypeDescriptor::Array(Self::build_type(args, context)?))
    }

    fn process_value(
        &self,
        value: MappedValue,
        args: &RuleArgs,
        context: &mut FieldContext<'_>,
    ) -> Result<MappedValue, RuleError> {
        let args = expect_array_args(args)?;

        let items = match value.as_json() {
            Some(Value::Array(items)) => items.clone(),
            _ => {
                let descriptor = Self::build_type(args, &mut context.type_context())?;
                return Err(ValueMismatch::new(
                    TypeDescriptor::Array(descriptor),
                    value.to_raw(),
                )
                .into());
            }
        };

        let mut descriptor = Self::build_type(args, &mut context.type_context())?;
        let item_rule = context.catalog().get(&args.item.rule)?;
        let key_rule = match &args.key {
            Some(key) => Some(context.catalog().get(&key.rule)?),
            None => None,
        };

        let total = items.len();
        let mut processed = Vec::with_capacity(total);
        for (index, item) in items.into_iter().enumerate() {
            let key_json = json!(index);

            let key_failure = match (&key_rule, &args.key) {
                (Some(rule), Some(key_args)) => {
                    match rule.process_value(
                        MappedValue::json(key_json.clone()),
                        &key_args.args,
                        context,
                    ) {
                        Ok(_) => None,
                        Err(RuleError::Failure(failure)) => Some(failure),
                        Err(RuleError::Schema(err)) => return Err(err.into()),
                    }
                }
                _ => None,
            };

            let item_failure =
                match item_rule.process_value(MappedValue::Json(item), &args.item.args, context) {
                    Ok(item) => {
                        processed.push(item);
                        None
                    }
                    Err(RuleError::Failure(failure)) => Some(failure),
                    Err(RuleError::Schema(err)) => return Err(err.into()),
                };

            if key_failure.is_some() || item_failure.is_some() {
                descriptor.add_invalid_pair(key_json, key_failure, item_failure);
            }
        }

        if args.min_items.is_some_and(|min| total < min) {
            descriptor.mark_parameter_invalid("min_items");
        }
        if args.max_items.is_some_and(|max| total > max) {
            descriptor.mark_parameter_invalid("max_items");
        }

        if descriptor.has_invalid_pairs() || descriptor.has_invalid_parameters() {
            return Err(ValueMismatch::new(TypeDescriptor::Array(descriptor), None).into());
        }
        Ok(MappedValue::List(processed))
    }
}
