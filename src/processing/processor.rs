//! The processing engine.
//!
//! One pass over the input validates every field against its property rule,
//! collecting failures into the structure descriptor instead of stopping at
//! the first one. Only a fully valid pass materializes a record.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use log::debug;
use serde_json::{json, Value};

use crate::error::{ProcessingError, SchemaError};
use crate::processing::callbacks::{CallbackContext, CallbackStage};
use crate::processing::context::{FieldContext, TypeContext};
use crate::processing::options::{Options, RequiredFields};
use crate::processing::skipped::{SkippedPropertiesContext, SkippedProperty};
use crate::record::{ClassId, MappedRecord, MappedValue};
use crate::registry::RecordCreator;
use crate::rules::{RuleArgs, RuleCatalog, RuleError};
use crate::schema::{PropertySchema, RuntimeSchema, SchemaLoader};
use crate::types::{
    InvalidData, MappingFailure, StructureType, TypeDescriptor, ValueMismatch,
};
use crate::utils::suggest_name;

/// Maps untyped data onto schema-bound records.
pub struct Processor {
    loader: Arc<SchemaLoader>,
    catalog: Arc<RuleCatalog>,
    creator: Arc<dyn RecordCreator>,
}

struct ProcessedClass {
    schema: Arc<RuntimeSchema>,
    root: StructureType,
    fields: IndexMap<String, MappedValue>,
    skipped: IndexMap<String, SkippedProperty>,
    raw: Option<Value>,
    options: Options,
}

impl Processor {
    pub fn new(
        loader: Arc<SchemaLoader>,
        catalog: Arc<RuleCatalog>,
        creator: Arc<dyn RecordCreator>,
    ) -> Self {
        Self { loader, catalog, creator }
    }

    pub(crate) fn loader(&self) -> &SchemaLoader {
        &self.loader
    }

    pub(crate) fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    /// Validates `data` against the schema of `class` and materializes a
    /// record on success. On failure returns the annotated structure type
    /// wrapped in [`InvalidData`].
    pub fn process(
        &self,
        data: Value,
        class: &ClassId,
        options: Options,
    ) -> Result<Box<dyn MappedRecord>, ProcessingError> {
        self.process_value_internal(data, class, options)
    }

    /// Like [`Processor::process`], downcast to a concrete record type.
    pub fn process_as<T: MappedRecord>(
        &self,
        data: Value,
        class: &ClassId,
        options: Options,
    ) -> Result<T, ProcessingError> {
        let record = self.process_value_internal(data, class, options)?;
        Ok(*record.downcast::<T>()?)
    }

    /// Validates without materializing: returns the processed fields as a
    /// map, with nested structures staying maps as well.
    pub fn process_without_mapping(
        &self,
        data: Value,
        class: &ClassId,
        options: Options,
    ) -> Result<IndexMap<String, MappedValue>, ProcessingError> {
        self.process_without_mapping_internal(data, class, options)
    }

    pub(crate) fn process_value_internal(
        &self,
        data: Value,
        class: &ClassId,
        options: Options,
    ) -> Result<Box<dyn MappedRecord>, ProcessingError> {
        let outcome = self.run(data, class, options, true)?;
        self.materialize(class, outcome)
    }

    pub(crate) fn process_without_mapping_internal(
        &self,
        data: Value,
        class: &ClassId,
        options: Options,
    ) -> Result<IndexMap<String, MappedValue>, ProcessingError> {
        let outcome = self.run(data, class, options, false)?;
        Ok(outcome.fields)
    }

    fn run(
        &self,
        data: Value,
        class: &ClassId,
        mut options: Options,
        initialize: bool,
    ) -> Result<ProcessedClass, ProcessingError> {
        debug!("processing data for class '{class}'");
        let schema = self.loader.load(class)?;

        let mut type_context = TypeContext::new(
            &self.loader,
            &self.catalog,
            options.processed_classes().to_vec(),
        );
        type_context.push_processed(class.clone());
        let mut root = StructureType::new(class.clone());
        for (property, property_schema) in schema.properties() {
            let field = schema.property_to_field(property);
            root.add_field(field.to_string(), type_context.type_of(&property_schema.rule)?);
        }
        options.push_processed_class(class.clone());

        let raw = if initialize && options.is_fill_raw_values() {
            Some(data.clone())
        } else {
            None
        };

        // Class-level before callbacks may reshape the whole input.
        let mut value = MappedValue::Json(data);
        for callback in schema.class_callbacks() {
            if callback.stage() != CallbackStage::Before {
                continue;
            }
            let mut context = CallbackContext::for_class(class, &options, &root);
            value = match callback.invoke(value, &mut context) {
                Ok(value) => value,
                Err(RuleError::Failure(failure)) => {
                    return Err(Self::class_callback_failure(&mut root, class, failure));
                }
                Err(RuleError::Schema(err)) => return Err(err.into()),
            };
        }

        let entries: IndexMap<String, MappedValue> = match value {
            MappedValue::Json(Value::Object(map)) => {
                map.into_iter().map(|(key, value)| (key, MappedValue::Json(value))).collect()
            }
            MappedValue::Map(map) => map,
            other => {
                root.mark_invalid();
                return Err(InvalidData::new(
                    TypeDescriptor::Structure(root),
                    other.to_raw(),
                )
                .into());
            }
        };

        let mut fields: IndexMap<String, MappedValue> = IndexMap::new();
        let mut skipped: IndexMap<String, SkippedProperty> = IndexMap::new();
        let mut sent: HashSet<String> = HashSet::new();

        for (field, field_value) in entries {
            let Some(property) = schema.field_to_property(&field).map(str::to_string) else {
                if options.is_unknown_fields_allowed() {
                    continue;
                }
                // Suggestions match property names; the hint shows the
                // external field name the matched property reads from.
                let candidates = schema.properties().keys().map(String::as_str);
                let message = match suggest_name(candidates, &field) {
                    Some(property) => {
                        let hint = schema.property_to_field(property);
                        format!("Field is unknown, did you mean `{hint}`?")
                    }
                    None => "Field is unknown.".to_string(),
                };
                root.overwrite_invalid_field(
                    field,
                    MappingFailure::Mismatch(ValueMismatch::new(
                        TypeDescriptor::message(message),
                        field_value.to_raw(),
                    )),
                );
                continue;
            };

            let property_schema = schema.property(&property).ok_or_else(|| {
                SchemaError::InvalidState(format!(
                    "class '{class}' resolved field '{field}' to missing property '{property}'",
                ))
            })?;
            sent.insert(property.clone());

            if property_schema.modifiers.skipped && initialize {
                let raw_value = field_value.into_json()?;
                skipped.insert(property, SkippedProperty::sent(field, raw_value));
                continue;
            }

            match self.process_property(
                field_value,
                class,
                &field,
                &property,
                property_schema,
                &options,
                initialize,
            ) {
                Ok(processed) => {
                    fields.insert(field, processed);
                }
                Err(RuleError::Failure(failure)) => root.overwrite_invalid_field(field, failure),
                Err(RuleError::Schema(err)) => return Err(err.into()),
            }
        }

        self.handle_missing_fields(
            class,
            &schema,
            &mut root,
            &mut fields,
            &mut skipped,
            &sent,
            &options,
            initialize,
        )?;

        if root.has_invalid_fields() {
            return Err(InvalidData::new(TypeDescriptor::Structure(root), None).into());
        }

        // Class-level after callbacks see (and may replace) the validated map.
        let mut value = MappedValue::Map(fields);
        for callback in schema.class_callbacks() {
            if callback.stage() != CallbackStage::After {
                continue;
            }
            let mut context = CallbackContext::for_class(class, &options, &root);
            value = match callback.invoke(value, &mut context) {
                Ok(value) => value,
                Err(RuleError::Failure(failure)) => {
                    return Err(Self::class_callback_failure(&mut root, class, failure));
                }
                Err(RuleError::Schema(err)) => return Err(err.into()),
            };
        }
        let fields = match value {
            MappedValue::Map(map) => map,
            MappedValue::Json(Value::Object(map)) => {
                map.into_iter().map(|(key, value)| (key, MappedValue::Json(value))).collect()
            }
            _ => {
                return Err(SchemaError::InvalidState(format!(
                    "a class callback of '{class}' must return a map of fields",
                ))
                .into());
            }
        };

        Ok(ProcessedClass { schema, root, fields, skipped, raw, options })
    }

    #[allow(clippy::too_many_arguments)]
    fn handle_missing_fields(
        &self,
        class: &ClassId,
        schema: &RuntimeSchema,
        root: &mut StructureType,
        fields: &mut IndexMap<String, MappedValue>,
        skipped: &mut IndexMap<String, SkippedProperty>,
        sent: &HashSet<String>,
        options: &Options,
        initialize: bool,
    ) -> Result<(), ProcessingError> {
        let required = options.required_fields();

        for (property, property_schema) in schema.properties() {
            if sent.contains(property) {
                continue;
            }
            let field = schema.property_to_field(property).to_string();

            if required == RequiredFields::NonDefault {
                if let Some(default) = property_schema.default.value() {
                    // Defaults bypass rules; they are trusted as declared.
                    if initialize || options.is_prefill_default_values() {
                        if property_schema.modifiers.skipped && initialize {
                            skipped.insert(
                                property.clone(),
                                SkippedProperty::from_default(field, default.clone()),
                            );
                        } else {
                            fields.insert(field, MappedValue::Json(default.clone()));
                        }
                    }
                    continue;
                }
            }

            if required == RequiredFields::NonDefault {
                // A missing structure field is treated as an empty map so its
                // own defaults and requirements decide the outcome.
                if matches!(property_schema.rule.args, RuleArgs::Structure(_)) {
                    // A skipped structure still validates in this pass, so
                    // nested failures surface before completion is attempted.
                    let defer = property_schema.modifiers.skipped && initialize;
                    match self.process_property(
                        MappedValue::json(json!({})),
                        class,
                        &field,
                        property,
                        property_schema,
                        options,
                        initialize && !defer,
                    ) {
                        Ok(processed) => {
                            if defer {
                                skipped.insert(
                                    property.clone(),
                                    SkippedProperty::sent(field, json!({})),
                                );
                            } else {
                                fields.insert(field, processed);
                            }
                        }
                        Err(RuleError::Failure(failure)) => {
                            let (descriptor, _) = failure.into_parts();
                            root.overwrite_invalid_field(
                                field,
                                MappingFailure::Data(InvalidData::new(descriptor, None)),
                            );
                        }
                        Err(RuleError::Schema(err)) => return Err(err.into()),
                    }
                    continue;
                }
            }

            if required != RequiredFields::None && !root.is_field_invalid(&field) {
                let mut type_context = TypeContext::new(
                    &self.loader,
                    &self.catalog,
                    options.processed_classes().to_vec(),
                );
                let descriptor = type_context.type_of(&property_schema.rule)?;
                root.overwrite_invalid_field(
                    field,
                    MappingFailure::Mismatch(ValueMismatch::new(descriptor, None)),
                );
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn process_property(
        &self,
        value: MappedValue,
        class: &ClassId,
        field: &str,
        property: &str,
        property_schema: &PropertySchema,
        options: &Options,
        initialize: bool,
    ) -> Result<MappedValue, RuleError> {
        let mut value = value;

        for callback in &property_schema.callbacks {
            if callback.stage() != CallbackStage::Before {
                continue;
            }
            let mut context = CallbackContext::for_property(class, field, property, options);
            value = callback.invoke(value, &mut context)?;
        }

        let rule = self.catalog.get(&property_schema.rule.rule)?;
        let mut context = FieldContext::new(self, options, initialize, field, property);
        value = rule.process_value(value, &property_schema.rule.args, &mut context)?;

        for callback in &property_schema.callbacks {
            if callback.stage() != CallbackStage::After {
                continue;
            }
            let mut context = CallbackContext::for_property(class, field, property, options);
            value = callback.invoke(value, &mut context)?;
        }

        Ok(value)
    }

    fn materialize(
        &self,
        class: &ClassId,
        outcome: ProcessedClass,
    ) -> Result<Box<dyn MappedRecord>, ProcessingError> {
        let ProcessedClass { schema, root, fields, skipped, raw, options } = outcome;

        let mut record = self
            .creator
            .create(class, schema.class_modifiers().create_without_constructor)?;

        if let Some(raw) = raw {
            record.extras_mut().set_raw_values(raw);
        }

        for property in schema.properties().keys() {
            record.unset(property);
            record.extras_mut().clear_initialized(property);
        }

        for (field, value) in fields {
            let property = schema.field_to_property(&field).unwrap_or(field.as_str()).to_string();
            record.set(&property, value)?;
            record.extras_mut().mark_initialized(&property);
        }

        if !skipped.is_empty() {
            record.extras_mut().set_skipped_context(Some(SkippedPropertiesContext::new(
                root,
                options,
                skipped,
            )));
        }

        Ok(record)
    }

    /// Validates and assigns properties that were set aside with the
    /// `skipped` modifier. Properties whose value fails validation stay
    /// skipped, so the call can be retried with corrected expectations.
    pub fn process_skipped_properties(
        &self,
        properties: &[&str],
        record: &mut dyn MappedRecord,
        options: Option<Options>,
    ) -> Result<(), ProcessingError> {
        let class = record.class_id();

        let Some(mut context) = record.extras_mut().take_skipped_context() else {
            return Err(SchemaError::InvalidState(format!(
                "cannot initialize properties \"{}\" of class '{class}' because it has no \
                 skipped properties",
                properties.join("\", \""),
            ))
            .into());
        };
        let options = options.unwrap_or_else(|| context.options().clone());

        let schema = match self.loader.load(&class) {
            Ok(schema) => schema,
            Err(err) => {
                record.extras_mut().set_skipped_context(Some(context));
                return Err(err.into());
            }
        };

        for &property in properties {
            let Some(skipped) = context.get(property).cloned() else {
                record.extras_mut().set_skipped_context(Some(context));
                return Err(SchemaError::InvalidState(format!(
                    "cannot initialize property \"{property}\" of class '{class}' because it \
                     is already initialized or does not exist",
                ))
                .into());
            };

            let Some(property_schema) = schema.property(property) else {
                record.extras_mut().set_skipped_context(Some(context));
                return Err(SchemaError::InvalidState(format!(
                    "class '{class}' has no schema for skipped property '{property}'",
                ))
                .into());
            };

            let result = if skipped.is_from_default() {
                Ok(MappedValue::Json(skipped.value().clone()))
            } else {
                self.process_property(
                    MappedValue::Json(skipped.value().clone()),
                    &class,
                    skipped.field_name(),
                    property,
                    property_schema,
                    &options,
                    true,
                )
            };

            match result {
                Ok(value) => {
                    if let Err(err) = record.set(property, value) {
                        record.extras_mut().set_skipped_context(Some(context));
                        return Err(err.into());
                    }
                    record.extras_mut().mark_initialized(property);
                    context.remove(property);
                }
                Err(RuleError::Failure(failure)) => {
                    context
                        .descriptor_mut()
                        .overwrite_invalid_field(skipped.field_name().to_string(), failure);
                }
                Err(RuleError::Schema(err)) => {
                    record.extras_mut().set_skipped_context(Some(context));
                    return Err(err.into());
                }
            }
        }

        if context.descriptor().has_invalid_fields() {
            let invalid = InvalidData::new(
                TypeDescriptor::Structure(context.descriptor().clone()),
                None,
            );
            record.extras_mut().set_skipped_context(Some(context));
            return Err(invalid.into());
        }

        let remaining = if context.is_empty() { None } else { Some(context) };
        record.extras_mut().set_skipped_context(remaining);
        Ok(())
    }

    fn class_callback_failure(
        root: &mut StructureType,
        class: &ClassId,
        failure: MappingFailure,
    ) -> ProcessingError {
        // A callback may raise against the structure it runs inside; that
        // already-annotated descriptor is reported as-is. Anything else
        // becomes a structure-level error on the current root.
        let is_current_root =
            matches!(failure.descriptor(), TypeDescriptor::Structure(structure) if structure.class == *class);
        if is_current_root {
            let (descriptor, value) = failure.into_parts();
            return InvalidData::new(descriptor, value).into();
        }

        root.add_error(failure);
        InvalidData::new(TypeDescriptor::Structure(root.clone()), None).into()
    }
}

impl std::fmt::Debug for Processor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Processor").finish_non_exhaustive()
    }
}
