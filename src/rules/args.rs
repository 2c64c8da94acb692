//! Rule directives and their resolved argument objects.
//!
//! A [`RuleDirective`] is the raw, declaration-side form: a rule identifier
//! plus loosely-typed arguments. Resolution turns it into a [`ResolvedRule`]
//! holding strongly-typed [`RuleArgs`], validated once so processing never
//! re-checks configuration.

use std::fmt;

use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;

use crate::error::SchemaError;
use crate::record::ClassId;
use crate::rules::RuleId;

/// One raw argument value inside a directive.
#[derive(Debug, Clone)]
pub enum ArgValue {
    Json(Value),
    Rule(RuleDirective),
    Rules(Vec<RuleDirective>),
    Class(ClassId),
}

/// Raw arguments of a directive, in declaration order.
pub type ArgMap = IndexMap<String, ArgValue>;

/// Declaration-side reference to a rule with its raw arguments.
#[derive(Debug, Clone)]
pub struct RuleDirective {
    pub rule: RuleId,
    pub args: ArgMap,
}

impl RuleDirective {
    pub fn new(rule: RuleId) -> Self {
        Self { rule, args: ArgMap::new() }
    }

    pub fn string() -> Self {
        Self::new(RuleId::STRING)
    }

    pub fn int() -> Self {
        Self::new(RuleId::INT)
    }

    pub fn float() -> Self {
        Self::new(RuleId::FLOAT)
    }

    pub fn bool() -> Self {
        Self::new(RuleId::BOOL)
    }

    pub fn null() -> Self {
        Self::new(RuleId::NULL)
    }

    pub fn mixed() -> Self {
        Self::new(RuleId::MIXED)
    }

    pub fn enum_of(cases: Vec<Value>) -> Self {
        let mut directive = Self::new(RuleId::ENUM);
        directive.args.insert("cases".to_string(), ArgValue::Json(Value::Array(cases)));
        directive
    }

    pub fn array_of(item: RuleDirective) -> Self {
        let mut directive = Self::new(RuleId::ARRAY_OF);
        directive.args.insert("item".to_string(), ArgValue::Rule(item));
        directive
    }

    pub fn any_of(rules: Vec<RuleDirective>) -> Self {
        let mut directive = Self::new(RuleId::ANY_OF);
        directive.args.insert("rules".to_string(), ArgValue::Rules(rules));
        directive
    }

    pub fn all_of(rules: Vec<RuleDirective>) -> Self {
        let mut directive = Self::new(RuleId::ALL_OF);
        directive.args.insert("rules".to_string(), ArgValue::Rules(rules));
        directive
    }

    pub fn structure(class: impl Into<ClassId>) -> Self {
        let mut directive = Self::new(RuleId::STRUCTURE);
        directive.args.insert("class".to_string(), ArgValue::Class(class.into()));
        directive
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(key.into(), ArgValue::Json(value.into()));
        self
    }

    pub fn with_key_rule(mut self, key_rule: RuleDirective) -> Self {
        self.args.insert("key".to_string(), ArgValue::Rule(key_rule));
        self
    }
}

/// Resolved arguments of the string rule.
#[derive(Debug, Clone, Default)]
pub struct StringArgs {
    pub not_empty: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Regex>,
}

/// Resolved arguments of the int rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntArgs {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

/// Resolved arguments of the float rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatArgs {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Resolved arguments of the enum rule.
#[derive(Debug, Clone)]
pub struct EnumArgs {
    pub cases: Vec<Value>,
}

/// Resolved arguments of the array rule.
#[derive(Debug, Clone)]
pub struct ArrayArgs {
    pub item: Box<ResolvedRule>,
    pub key: Option<Box<ResolvedRule>>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
}

/// Resolved arguments of the compound rules.
#[derive(Debug, Clone)]
pub struct CompoundArgs {
    pub rules: Vec<ResolvedRule>,
}

/// Resolved arguments of the structure rule.
#[derive(Debug, Clone)]
pub struct StructureArgs {
    pub class: ClassId,
}

/// Strongly-typed, validated rule arguments.
#[derive(Debug, Clone)]
pub enum RuleArgs {
    Empty,
    String(StringArgs),
    Int(IntArgs),
    Float(FloatArgs),
    Enum(EnumArgs),
    Array(ArrayArgs),
    Compound(CompoundArgs),
    Structure(StructureArgs),
}

/// A rule identifier paired with its resolved arguments.
#[derive(Debug, Clone)]
pub struct ResolvedRule {
    pub rule: RuleId,
    pub args: RuleArgs,
}

impl ResolvedRule {
    pub fn new(rule: RuleId, args: RuleArgs) -> Self {
        Self { rule, args }
    }
}

/// Validates a directive's raw arguments against what a rule accepts.
///
/// Each getter consumes one known key; [`ArgsChecker::finish`] rejects
/// anything left over so typos in argument names fail schema resolution
/// instead of being silently ignored.
pub struct ArgsChecker<'a> {
    rule: &'a RuleId,
    args: &'a ArgMap,
    known: Vec<&'a str>,
}

impl<'a> ArgsChecker<'a> {
    pub fn new(rule: &'a RuleId, args: &'a ArgMap) -> Self {
        Self { rule, args, known: Vec::new() }
    }

    fn wrong_type(&self, key: &str, expected: &str) -> SchemaError {
        SchemaError::InvalidArgument(format!(
            "argument '{key}' given to rule '{}' expects {expected}",
            self.rule,
        ))
    }

    fn missing(&self, key: &str) -> SchemaError {
        SchemaError::InvalidArgument(format!(
            "rule '{}' requires argument '{key}'",
            self.rule,
        ))
    }

    fn take(&mut self, key: &'a str) -> Option<&'a ArgValue> {
        self.known.push(key);
        self.args.get(key)
    }

    /// A boolean flag; absent means `false`.
    pub fn flag(&mut self, key: &'a str) -> Result<bool, SchemaError> {
        match self.take(key) {
            None => Ok(false),
            Some(ArgValue::Json(Value::Bool(flag))) => Ok(*flag),
            Some(_) => Err(self.wrong_type(key, "a bool")),
        }
    }

    pub fn optional_usize(&mut self, key: &'a str) -> Result<Option<usize>, SchemaError> {
        match self.take(key) {
            None => Ok(None),
            Some(ArgValue::Json(Value::Number(number))) => number
                .as_u64()
                .map(|n| Some(n as usize))
                .ok_or_else(|| self.wrong_type(key, "a non-negative integer")),
            Some(_) => Err(self.wrong_type(key, "a non-negative integer")),
        }
    }

    pub fn optional_i64(&mut self, key: &'a str) -> Result<Option<i64>, SchemaError> {
        match self.take(key) {
            None => Ok(None),
            Some(ArgValue::Json(Value::Number(number))) => number
                .as_i64()
                .map(Some)
                .ok_or_else(|| self.wrong_type(key, "an integer")),
            Some(_) => Err(self.wrong_type(key, "an integer")),
        }
    }

    pub fn optional_f64(&mut self, key: &'a str) -> Result<Option<f64>, SchemaError> {
        match self.take(key) {
            None => Ok(None),
            Some(ArgValue::Json(Value::Number(number))) => number
                .as_f64()
                .map(Some)
                .ok_or_else(|| self.wrong_type(key, "a number")),
            Some(_) => Err(self.wrong_type(key, "a number")),
        }
    }

    pub fn optional_pattern(&mut self, key: &'a str) -> Result<Option<Regex>, SchemaError> {
        match self.take(key) {
            None => Ok(None),
            Some(ArgValue::Json(Value::String(source))) => Regex::new(source)
                .map(Some)
                .map_err(|err| {
                    SchemaError::InvalidArgument(format!(
                        "argument '{key}' given to rule '{}' is not a valid pattern: {err}",
                        self.rule,
                    ))
                }),
            Some(_) => Err(self.wrong_type(key, "a pattern string")),
        }
    }

    pub fn required_cases(&mut self, key: &'a str) -> Result<Vec<Value>, SchemaError> {
        match self.take(key) {
            None => Err(self.missing(key)),
            Some(ArgValue::Json(Value::Array(cases))) => Ok(cases.clone()),
            Some(_) => Err(self.wrong_type(key, "an array of values")),
        }
    }

    pub fn required_rule(&mut self, key: &'a str) -> Result<&'a RuleDirective, SchemaError> {
        match self.take(key) {
            None => Err(self.missing(key)),
            Some(ArgValue::Rule(directive)) => Ok(directive),
            Some(_) => Err(self.wrong_type(key, "a rule directive")),
        }
    }

    pub fn optional_rule(&mut self, key: &'a str) -> Result<Option<&'a RuleDirective>, SchemaError> {
        match self.take(key) {
            None => Ok(None),
            Some(ArgValue::Rule(directive)) => Ok(Some(directive)),
            Some(_) => Err(self.wrong_type(key, "a rule directive")),
        }
    }

    pub fn required_rules(&mut self, key: &'a str) -> Result<&'a [RuleDirective], SchemaError> {
        match self.take(key) {
            None => Err(self.missing(key)),
            Some(ArgValue::Rules(directives)) => Ok(directives),
            Some(_) => Err(self.wrong_type(key, "a list of rule directives")),
        }
    }

    pub fn required_class(&mut self, key: &'a str) -> Result<&'a ClassId, SchemaError> {
        match self.take(key) {
            None => Err(self.missing(key)),
            Some(ArgValue::Class(class)) => Ok(class),
            Some(_) => Err(self.wrong_type(key, "a class identifier")),
        }
    }

    /// Rejects arguments the rule never asked about.
    pub fn finish(self) -> Result<(), SchemaError> {
        for key in self.args.keys() {
            if !self.known.contains(&key.as_str()) {
                return Err(SchemaError::InvalidArgument(format!(
                    "rule '{}' does not accept argument '{key}'",
                    self.rule,
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ArgsChecker<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgsChecker").field("rule", self.rule).field("known", &self.known).finish()
    }
}
