//! Contexts handed to rules at each stage.

use crate::error::SchemaError;
use crate::processing::options::Options;
use crate::processing::processor::Processor;
use crate::record::ClassId;
use crate::rules::{ResolvedRule, RuleCatalog, RuleDirective};
use crate::schema::SchemaLoader;
use crate::types::TypeDescriptor;

/// Context of argument resolution, at schema-build time.
#[derive(Debug)]
pub struct ResolverContext<'a> {
    loader: &'a SchemaLoader,
    catalog: &'a RuleCatalog,
}

impl<'a> ResolverContext<'a> {
    pub(crate) fn new(loader: &'a SchemaLoader, catalog: &'a RuleCatalog) -> Self {
        Self { loader, catalog }
    }

    /// Resolves a nested directive, e.g. an array's item rule.
    pub fn resolve_rule(&self, directive: &RuleDirective) -> Result<ResolvedRule, SchemaError> {
        let rule = self.catalog.get(&directive.rule)?;
        let args = rule.resolve_args(&directive.args, self)?;
        Ok(ResolvedRule::new(directive.rule.clone(), args))
    }

    /// Validates that a referenced class has a loadable schema.
    pub fn ensure_class(&self, class: &ClassId) -> Result<(), SchemaError> {
        self.loader.ensure(class)
    }
}

/// Context of descriptor construction.
///
/// Tracks which classes are already being rendered so self-referencing
/// schemas produce finite descriptors.
#[derive(Debug)]
pub struct TypeContext<'a> {
    loader: &'a SchemaLoader,
    catalog: &'a RuleCatalog,
    processed: Vec<ClassId>,
}

impl<'a> TypeContext<'a> {
    pub(crate) fn new(
        loader: &'a SchemaLoader,
        catalog: &'a RuleCatalog,
        processed: Vec<ClassId>,
    ) -> Self {
        Self { loader, catalog, processed }
    }

    /// Builds the descriptor of a resolved nested rule.
    pub fn type_of(&mut self, resolved: &ResolvedRule) -> Result<TypeDescriptor, SchemaError> {
        let rule = self.catalog.get(&resolved.rule)?;
        rule.create_type(&resolved.args, self)
    }

    pub fn loader(&self) -> &SchemaLoader {
        self.loader
    }

    pub fn has_processed(&self, class: &ClassId) -> bool {
        self.processed.contains(class)
    }

    pub fn push_processed(&mut self, class: ClassId) {
        self.processed.push(class);
    }

    pub fn pop_processed(&mut self) {
        self.processed.pop();
    }
}

/// Context of one field's value validation.
pub struct FieldContext<'a> {
    processor: &'a Processor,
    options: &'a Options,
    initialize_objects: bool,
    field_name: &'a str,
    property_name: &'a str,
}

impl<'a> FieldContext<'a> {
    pub(crate) fn new(
        processor: &'a Processor,
        options: &'a Options,
        initialize_objects: bool,
        field_name: &'a str,
        property_name: &'a str,
    ) -> Self {
        Self { processor, options, initialize_objects, field_name, property_name }
    }

    pub fn options(&self) -> &Options {
        self.options
    }

    /// False when the caller asked for plain field maps instead of records.
    pub fn is_initialize_objects(&self) -> bool {
        self.initialize_objects
    }

    pub fn field_name(&self) -> &str {
        self.field_name
    }

    pub fn property_name(&self) -> &str {
        self.property_name
    }

    pub(crate) fn processor(&self) -> &Processor {
        self.processor
    }

    pub fn catalog(&self) -> &RuleCatalog {
        self.processor.catalog()
    }

    /// A fresh type context seeded with the classes already in flight.
    pub fn type_context(&self) -> TypeContext<'a> {
        TypeContext::new(
            self.processor.loader(),
            self.processor.catalog(),
            self.options.processed_classes().to_vec(),
        )
    }
}

impl std::fmt::Debug for FieldContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldContext")
            .field("field_name", &self.field_name)
            .field("property_name", &self.property_name)
            .field("initialize_objects", &self.initialize_objects)
            .finish()
    }
}
