//! Scalar rules: string, int, float, bool, null and mixed.

use serde_json::Value;

use crate::error::SchemaError;
use crate::processing::{FieldContext, ResolverContext, TypeContext};
use crate::record::MappedValue;
use crate::rules::{
    ArgMap, ArgsChecker, FloatArgs, IntArgs, Rule, RuleArgs, RuleError, RuleId, StringArgs,
};
use crate::types::{SimpleType, TypeDescriptor, TypeParameter, ValueMismatch};

fn expect_string_args(args: &RuleArgs) -> &StringArgs {
    match args {
        RuleArgs::String(string_args) => string_args,
        _ => &DEFAULT_STRING_ARGS,
    }
}

static DEFAULT_STRING_ARGS: StringArgs =
    StringArgs { not_empty: false, min_length: None, max_length: None, pattern: None };

fn string_type(args: &StringArgs) -> SimpleType {
    let mut parameters = Vec::new();
    if args.not_empty {
        parameters.push(TypeParameter::flag("not_empty"));
    }
    if let Some(min_length) = args.min_length {
        parameters.push(TypeParameter::with_value("min_length", min_length));
    }
    if let Some(max_length) = args.max_length {
        parameters.push(TypeParameter::with_value("max_length", max_length));
    }
    if let Some(pattern) = &args.pattern {
        parameters.push(TypeParameter::with_value("pattern", pattern.as_str()));
    }
    SimpleType::with_parameters("string", parameters)
}

/// Accepts strings, optionally bounded by length, emptiness and pattern.
#[derive(Debug)]
pub struct StringRule;

impl Rule for StringRule {
    fn resolve_args(
        &self,
        args: &ArgMap,
        _context: &ResolverContext<'_>,
    ) -> Result<RuleArgs, SchemaError> {
        let rule = RuleId::STRING;
        let mut checker = ArgsChecker::new(&rule, args);
        let resolved = StringArgs {
            not_empty: checker.flag("not_empty")?,
            min_length: checker.optional_usize("min_length")?,
            max_length: checker.optional_usize("max_length")?,
            pattern: checker.optional_pattern("pattern")?,
        };
        checker.finish()?;

        if let (Some(min), Some(max)) = (resolved.min_length, resolved.max_length) {
            if min > max {
                return Err(SchemaError::InvalidArgument(
                    "argument 'min_length' given to rule 'string' must not exceed 'max_length'"
                        .to_string(),
                ));
            }
        }
        Ok(RuleArgs::String(resolved))
    }

    fn create_type(
        &self,
        args: &RuleArgs,
        _context: &mut TypeContext<'_>,
    ) -> Result<TypeDescriptor, SchemaError> {
        Ok(TypeDescriptor::Simple(string_type(expect_string_args(args))))
    }

    fn process_value(
        &self,
        value: MappedValue,
        args: &RuleArgs,
        _context: &mut FieldContext<'_>,
    ) -> Result<MappedValue, RuleError> {
        let args = expect_string_args(args);
        let text = match value.as_json() {
            Some(Value::String(text)) => text.clone(),
            _ => {
                return Err(ValueMismatch::new(
                    TypeDescriptor::Simple(string_type(args)),
                    value.to_raw(),
                )
                .into());
            }
        };

        let mut descriptor = string_type(args);
        let length = text.chars().count();

        if args.not_empty && text.trim().is_empty() {
            descriptor.mark_parameter_invalid("not_empty");
        }
        if args.min_length.is_some_and(|min| length < min) {
            descriptor.mark_parameter_invalid("min_length");
        }
        if args.max_length.is_some_and(|max| length > max) {
            descriptor.mark_parameter_invalid("max_length");
        }
        if args.pattern.as_ref().is_some_and(|pattern| !pattern.is_match(&text)) {
            descriptor.mark_parameter_invalid("pattern");
        }

        if descriptor.has_invalid_parameters() {
            return Err(
                ValueMismatch::new(TypeDescriptor::Simple(descriptor), value.to_raw()).into()
            );
        }
        Ok(value)
    }
}

fn int_type(args: &IntArgs) -> SimpleType {
    let mut parameters = Vec::new();
    if let Some(min) = args.min {
        parameters.push(TypeParameter::with_value("min", min));
    }
    if let Some(max) = args.max {
        parameters.push(TypeParameter::with_value("max", max));
    }
    SimpleType::with_parameters("int", parameters)
}

/// Accepts integers, optionally bounded.
#[derive(Debug)]
pub struct IntRule;

impl Rule for IntRule {
    fn resolve_args(
        &self,
        args: &ArgMap,
        _context: &ResolverContext<'_>,
    ) -> Result<RuleArgs, SchemaError> {
        let rule = RuleId::INT;
        let mut checker = ArgsChecker::new(&rule, args);
        let resolved =
            IntArgs { min: checker.optional_i64("min")?, max: checker.optional_i64("max")? };
        checker.finish()?;

        if let (Some(min), Some(max)) = (resolved.min, resolved.max) {
            if min > max {
                return Err(SchemaError::InvalidArgument(
                    "argument 'min' given to rule 'int' must not exceed 'max'".to_string(),
                ));
            }
        }
        Ok(RuleArgs::Int(resolved))
    }

    fn create_type(
        &self,
        args: &RuleArgs,
        _context: &mut TypeContext<'_>,
    ) -> Result<TypeDescriptor, SchemaError> {
        let args = match args {
            RuleArgs::Int(int_args) => *int_args,
            _ => IntArgs::default(),
        };
        Ok(TypeDescriptor::Simple(int_type(&args)))
    }

    fn process_value(
        &self,
        value: MappedValue,
        args: &RuleArgs,
        _context: &mut FieldContext<'_>,
    ) -> Result<MappedValue, RuleError> {
        let args = match args {
            RuleArgs::Int(int_args) => *int_args,
            _ => IntArgs::default(),
        };
        let number = match value.as_json() {
            Some(Value::Number(number)) => number.as_i64(),
            _ => None,
        };
        let Some(number) = number else {
            return Err(
                ValueMismatch::new(TypeDescriptor::Simple(int_type(&args)), value.to_raw()).into()
            );
        };

        let mut descriptor = int_type(&args);
        if args.min.is_some_and(|min| number < min) {
            descriptor.mark_parameter_invalid("min");
        }
        if args.max.is_some_and(|max| number > max) {
            descriptor.mark_parameter_invalid("max");
        }
        if descriptor.has_invalid_parameters() {
            return Err(
                ValueMismatch::new(TypeDescriptor::Simple(descriptor), value.to_raw()).into()
            );
        }
        Ok(value)
    }
}

fn float_type(args: &FloatArgs) -> SimpleType {
    let mut parameters = Vec::new();
    if let Some(min) = args.min {
        parameters.push(TypeParameter::with_value("min", min));
    }
    if let Some(max) = args.max {
        parameters.push(TypeParameter::with_value("max", max));
    }
    SimpleType::with_parameters("float", parameters)
}

/// Accepts floats and integers, optionally bounded.
#[derive(Debug)]
pub struct FloatRule;

impl Rule for FloatRule {
    fn resolve_args(
        &self,
        args: &ArgMap,
        _context: &ResolverContext<'_>,
    ) -> Result<RuleArgs, SchemaError> {
        let rule = RuleId::FLOAT;
        let mut checker = ArgsChecker::new(&rule, args);
        let resolved =
            FloatArgs { min: checker.optional_f64("min")?, max: checker.optional_f64("max")? };
        checker.finish()?;

        if let (Some(min), Some(max)) = (resolved.min, resolved.max) {
            if min > max {
                return Err(SchemaError::InvalidArgument(
                    "argument 'min' given to rule 'float' must not exceed 'max'".to_string(),
                ));
            }
        }
        Ok(RuleArgs::Float(resolved))
    }

    fn create_type(
        &self,
        args: &RuleArgs,
        _context: &mut TypeContext<'_>,
    ) -> Result<TypeDescriptor, SchemaError> {
        let args = match args {
            RuleArgs::Float(float_args) => *float_args,
            _ => FloatArgs::default(),
        };
        Ok(TypeDescriptor::Simple(float_type(&args)))
    }

    fn process_value(
        &self,
        value: MappedValue,
        args: &RuleArgs,
        _context: &mut FieldContext<'_>,
    ) -> Result<MappedValue, RuleError> {
        let args = match args {
            RuleArgs::Float(float_args) => *float_args,
            _ => FloatArgs::default(),
        };
        let number = match value.as_json() {
            Some(Value::Number(number)) => number.as_f64(),
            _ => None,
        };
        let Some(number) = number else {
            return Err(ValueMismatch::new(
                TypeDescriptor::Simple(float_type(&args)),
                value.to_raw(),
            )
            .into());
        };

        let mut descriptor = float_type(&args);
        if args.min.is_some_and(|min| number < min) {
            descriptor.mark_parameter_invalid("min");
        }
        if args.max.is_some_and(|max| number > max) {
            descriptor.mark_parameter_invalid("max");
        }
        if descriptor.has_invalid_parameters() {
            return Err(
                ValueMismatch::new(TypeDescriptor::Simple(descriptor), value.to_raw()).into()
            );
        }
        Ok(value)
    }
}

/// Accepts `true` and `false` only.
#[derive(Debug)]
pub struct BoolRule;

impl Rule for BoolRule {
    fn resolve_args(
        &self,
        args: &ArgMap,
        _context: &ResolverContext<'_>,
    ) -> Result<RuleArgs, SchemaError> {
        ArgsChecker::new(&RuleId::BOOL, args).finish()?;
        Ok(RuleArgs::Empty)
    }

    fn create_type(
        &self,
        _args: &RuleArgs,
        _context: &mut TypeContext<'_>,
    ) -> Result<TypeDescriptor, SchemaError> {
        Ok(TypeDescriptor::simple("bool"))
    }

    fn process_value(
        &self,
        value: MappedValue,
        _args: &RuleArgs,
        _context: &mut FieldContext<'_>,
    ) -> Result<MappedValue, RuleError> {
        match value.as_json() {
            Some(Value::Bool(_)) => Ok(value),
            _ => Err(ValueMismatch::new(TypeDescriptor::simple("bool"), value.to_raw()).into()),
        }
    }
}

/// Accepts JSON `null` only.
#[derive(Debug)]
pub struct NullRule;

impl Rule for NullRule {
    fn resolve_args(
        &self,
        args: &ArgMap,
        _context: &ResolverContext<'_>,
    ) -> Result<RuleArgs, SchemaError> {
        ArgsChecker::new(&RuleId::NULL, args).finish()?;
        Ok(RuleArgs::Empty)
    }

    fn create_type(
        &self,
        _args: &RuleArgs,
        _context: &mut TypeContext<'_>,
    ) -> Result<TypeDescriptor, SchemaError> {
        Ok(TypeDescriptor::simple("null"))
    }

    fn process_value(
        &self,
        value: MappedValue,
        _args: &RuleArgs,
        _context: &mut FieldContext<'_>,
    ) -> Result<MappedValue, RuleError> {
        match value.as_json() {
            Some(Value::Null) => Ok(value),
            _ => Err(ValueMismatch::new(TypeDescriptor::simple("null"), value.to_raw()).into()),
        }
    }
}

/// Accepts any value unchanged.
#[derive(Debug)]
pub struct MixedRule;

impl Rule for MixedRule {
    fn resolve_args(
        &self,
        args: &ArgMap,
        _context: &ResolverContext<'_>,
    ) -> Result<RuleArgs, SchemaError> {
        ArgsChecker::new(&RuleId::MIXED, args).finish()?;
        Ok(RuleArgs::Empty)
    }

    fn create_type(
        &self,
        _args: &RuleArgs,
        _context: &mut TypeContext<'_>,
    ) -> Result<TypeDescriptor, SchemaError> {
        Ok(TypeDescriptor::simple("mixed"))
    }

    fn process_value(
        &self,
        value: MappedValue,
        _args: &RuleArgs,
        _context: &mut FieldContext<'_>,
    ) -> Result<MappedValue, RuleError> {
        Ok(value)
    }
}
