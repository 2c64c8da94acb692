//! Compound rules: OR and AND combinations of member rules.

use crate::error::SchemaError;
use crate::processing::{FieldContext, ResolverContext, TypeContext};
use crate::record::MappedValue;
use crate::rules::{
    ArgMap, ArgsChecker, CompoundArgs, ResolvedRule, Rule, RuleArgs, RuleError, RuleId,
};
use crate::types::{CompoundOperator, CompoundType, TypeDescriptor, ValueMismatch};

fn resolve_members(
    rule: &RuleId,
    args: &ArgMap,
    context: &ResolverContext<'_>,
) -> Result<Vec<ResolvedRule>, SchemaError> {
    let mut checker = ArgsChecker::new(rule, args);
    let directives = checker.required_rules("rules")?;
    checker.finish()?;

    if directives.len() < 2 {
        return Err(SchemaError::InvalidArgument(format!(
            "rule '{rule}' requires at least two member rules",
        )));
    }

    let mut members = Vec::with_capacity(directives.len());
    for directive in directives {
        members.push(context.resolve_rule(directive)?);
    }
    Ok(members)
}

fn expect_members(args: &RuleArgs) -> Result<&[ResolvedRule], SchemaError> {
    match args {
        RuleArgs::Compound(compound) => Ok(&compound.rules),
        _ => Err(SchemaError::InvalidState(
            "compound rule invoked without resolved member rules".to_string(),
        )),
    }
}

fn compound_type(
    operator: CompoundOperator,
    members: &[ResolvedRule],
    context: &mut TypeContext<'_>,
) -> Result<CompoundType, SchemaError> {
    let mut compound = CompoundType::new(operator);
    for member in members {
        compound.add_subtype(context.type_of(member)?);
    }
    Ok(compound)
}

/// Accepts a value matching at least one member rule, tried in declaration
/// order. The first success wins; when every member fails, the reported type
/// lists every member's annotated failure.
#[derive(Debug)]
pub struct AnyOfRule;

impl Rule for AnyOfRule {
    fn resolve_args(
        &self,
        args: &ArgMap,
        context: &ResolverContext<'_>,
    ) -> Result<RuleArgs, SchemaError> {
        let rules = resolve_members(&RuleId::ANY_OF, args, context)?;
        Ok(RuleArgs::Compound(CompoundArgs { rules }))
    }

    fn create_type(
        &self,
        args: &RuleArgs,
        context: &mut TypeContext<'_>,
    ) -> Result<TypeDescriptor, SchemaError> {
        let members = expect_members(args)?;
        Ok(TypeDescriptor::Compound(compound_type(CompoundOperator::Or, members, context)?))
    }

    fn process_value(
        &self,
        value: MappedValue,
        args: &RuleArgs,
        context: &mut FieldContext<'_>,
    ) -> Result<MappedValue, RuleError> {
        let members = expect_members(args)?;
        let raw = value.to_raw();

        let mut failed = CompoundType::new(CompoundOperator::Or);
        for member in members {
            let attempt = value.try_clone().ok_or_else(|| {
                SchemaError::InvalidState(
                    "a compound rule cannot retry a value holding materialized records"
                        .to_string(),
                )
            })?;

            let rule = context.catalog().get(&member.rule)?;
            match rule.process_value(attempt, &member.args, context) {
                Ok(processed) => return Ok(processed),
                Err(RuleError::Failure(failure)) => {
                    let (descriptor, _) = failure.into_parts();
                    failed.add_subtype(descriptor);
                }
                Err(RuleError::Schema(err)) => return Err(err.into()),
            }
        }

        Err(ValueMismatch::new(TypeDescriptor::Compound(failed), raw).into())
    }
}

/// Accepts a value matching every member rule, threading each member's
/// output into the next so transformations stack.
#[derive(Debug)]
pub struct AllOfRule;

impl Rule for AllOfRule {
    fn resolve_args(
        &self,
        args: &ArgMap,
        context: &ResolverContext<'_>,
    ) -> Result<RuleArgs, SchemaError> {
        let rules = resolve_members(&RuleId::ALL_OF, args, context)?;
        Ok(RuleArgs::Compound(CompoundArgs { rules }))
    }

    fn create_type(
        &self,
        args: &RuleArgs,
        context: &mut TypeContext<'_>,
    ) -> Result<TypeDescriptor, SchemaError> {
        let members = expect_members(args)?;
        Ok(TypeDescriptor::Compound(compound_type(CompoundOperator::And, members, context)?))
    }

    fn process_value(
        &self,
        value: MappedValue,
        args: &RuleArgs,
        context: &mut FieldContext<'_>,
    ) -> Result<MappedValue, RuleError> {
        let members = expect_members(args)?;

        let mut current = value;
        for member in members {
            let rule = context.catalog().get(&member.rule)?;
            match rule.process_value(current, &member.args, context) {
                Ok(processed) => current = processed,
                Err(RuleError::Failure(failure)) => {
                    let (descriptor, failed_value) = failure.into_parts();
                    let mut compound = CompoundType::new(CompoundOperator::And);
                    compound.add_subtype(descriptor);
                    return Err(ValueMismatch::new(
                        TypeDescriptor::Compound(compound),
                        failed_value,
                    )
                    .into());
                }
                Err(RuleError::Schema(err)) => return Err(err.into()),
            }
        }
        Ok(current)
    }
}
