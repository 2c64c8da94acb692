//! The rule catalog.
//!
//! A [`Rule`] is a named, stateless strategy with three responsibilities:
//! validating its raw directive arguments once at schema-build time
//! ([`Rule::resolve_args`]), describing the shape it expects
//! ([`Rule::create_type`]) and validating/transforming one value
//! ([`Rule::process_value`]). The [`RuleCatalog`] maps rule identifiers to
//! implementations and ships the default set.

mod args;
mod array;
mod compound;
mod enum_rule;
mod scalar;
mod structure;

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub use args::{
    ArgMap, ArgValue, ArgsChecker, ArrayArgs, CompoundArgs, EnumArgs, FloatArgs, IntArgs,
    ResolvedRule, RuleArgs, RuleDirective, StringArgs, StructureArgs,
};
pub use array::ArrayOfRule;
pub use compound::{AllOfRule, AnyOfRule};
pub use enum_rule::EnumRule;
pub use scalar::{BoolRule, FloatRule, IntRule, MixedRule, NullRule, StringRule};
pub use structure::StructureRule;

use crate::error::SchemaError;
use crate::processing::{FieldContext, ResolverContext, TypeContext};
use crate::record::MappedValue;
use crate::types::{InvalidData, MappingFailure, TypeDescriptor, ValueMismatch};

/// Identifier of a rule in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleId(Cow<'static, str>);

impl RuleId {
    pub const STRING: RuleId = RuleId::from_static("string");
    pub const INT: RuleId = RuleId::from_static("int");
    pub const FLOAT: RuleId = RuleId::from_static("float");
    pub const BOOL: RuleId = RuleId::from_static("bool");
    pub const NULL: RuleId = RuleId::from_static("null");
    pub const MIXED: RuleId = RuleId::from_static("mixed");
    pub const ENUM: RuleId = RuleId::from_static("enum");
    pub const ARRAY_OF: RuleId = RuleId::from_static("array_of");
    pub const ANY_OF: RuleId = RuleId::from_static("any_of");
    pub const ALL_OF: RuleId = RuleId::from_static("all_of");
    pub const STRUCTURE: RuleId = RuleId::from_static("structure");

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error surface of [`Rule::process_value`] and callback invocation.
///
/// `Failure` is a data-validation outcome the engine converts into an
/// invalid-field marker; `Schema` is a configuration defect that propagates
/// out of the engine untouched.
#[derive(Debug)]
pub enum RuleError {
    Failure(MappingFailure),
    Schema(SchemaError),
}

impl From<MappingFailure> for RuleError {
    fn from(failure: MappingFailure) -> Self {
        Self::Failure(failure)
    }
}

impl From<ValueMismatch> for RuleError {
    fn from(mismatch: ValueMismatch) -> Self {
        Self::Failure(MappingFailure::Mismatch(mismatch))
    }
}

impl From<InvalidData> for RuleError {
    fn from(data: InvalidData) -> Self {
        Self::Failure(MappingFailure::Data(data))
    }
}

impl From<SchemaError> for RuleError {
    fn from(err: SchemaError) -> Self {
        Self::Schema(err)
    }
}

/// One pluggable validator/transformer.
pub trait Rule: Send + Sync {
    /// Validates raw directive arguments and resolves the final argument
    /// value object. Runs once per property, at schema-build time.
    fn resolve_args(&self, args: &ArgMap, context: &ResolverContext<'_>)
        -> Result<RuleArgs, SchemaError>;

    /// Builds the expected-shape descriptor for the resolved arguments.
    fn create_type(
        &self,
        args: &RuleArgs,
        context: &mut TypeContext<'_>,
    ) -> Result<TypeDescriptor, SchemaError>;

    /// Validates and possibly transforms one value.
    fn process_value(
        &self,
        value: MappedValue,
        args: &RuleArgs,
        context: &mut FieldContext<'_>,
    ) -> Result<MappedValue, RuleError>;
}

/// Maps rule identifiers to implementations.
pub struct RuleCatalog {
    rules: HashMap<RuleId, Arc<dyn Rule>>,
}

impl RuleCatalog {
    /// An empty catalog; useful when wiring a fully custom rule set.
    pub fn empty() -> Self {
        Self { rules: HashMap::new() }
    }

    /// The default catalog with every built-in rule registered.
    pub fn new() -> Self {
        let mut catalog = Self::empty();
        catalog.register(RuleId::STRING, Arc::new(StringRule));
        catalog.register(RuleId::INT, Arc::new(IntRule));
        catalog.register(RuleId::FLOAT, Arc::new(FloatRule));
        catalog.register(RuleId::BOOL, Arc::new(BoolRule));
        catalog.register(RuleId::NULL, Arc::new(NullRule));
        catalog.register(RuleId::MIXED, Arc::new(MixedRule));
        catalog.register(RuleId::ENUM, Arc::new(EnumRule));
        catalog.register(RuleId::ARRAY_OF, Arc::new(ArrayOfRule));
        catalog.register(RuleId::ANY_OF, Arc::new(AnyOfRule));
        catalog.register(RuleId::ALL_OF, Arc::new(AllOfRule));
        catalog.register(RuleId::STRUCTURE, Arc::new(StructureRule));
        catalog
    }

    pub fn register(&mut self, id: RuleId, rule: Arc<dyn Rule>) {
        self.rules.insert(id, rule);
    }

    pub fn get(&self, id: &RuleId) -> Result<Arc<dyn Rule>, SchemaError> {
        self.rules.get(id).cloned().ok_or_else(|| {
            SchemaError::InvalidArgument(format!("rule '{id}' is not registered"))
        })
    }
}

impl Default for RuleCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RuleCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleCatalog").field("rules", &self.rules.keys()).finish()
    }
}
