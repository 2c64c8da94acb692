//! Turns declared directives into validated runtime schemas.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::error::SchemaError;
use crate::processing::ResolverContext;
use crate::record::ClassId;
use crate::rules::RuleCatalog;
use crate::schema::directives::{modifier, ModifierDirective, RawSchema};
use crate::schema::loader::SchemaLoader;
use crate::schema::runtime::{
    ClassModifiers, PropertyDefault, PropertyModifiers, PropertySchema, RuntimeSchema,
};

/// One-shot resolution of a class's raw schema.
///
/// Every configuration defect is reported here, at build time; the runtime
/// schema that comes out needs no further checks during processing.
pub(crate) struct SchemaResolver<'a> {
    loader: &'a SchemaLoader,
    catalog: &'a RuleCatalog,
}

impl<'a> SchemaResolver<'a> {
    pub(crate) fn new(loader: &'a SchemaLoader, catalog: &'a RuleCatalog) -> Self {
        Self { loader, catalog }
    }

    pub(crate) fn resolve(
        &self,
        class: &ClassId,
        raw: &RawSchema,
    ) -> Result<RuntimeSchema, SchemaError> {
        let class_modifiers = self.resolve_class_modifiers(class, &raw.class_modifiers)?;
        let context = ResolverContext::new(self.loader, self.catalog);

        let mut properties = IndexMap::new();
        for declared in &raw.properties {
            if properties.contains_key(&declared.name) {
                return Err(SchemaError::InvalidArgument(format!(
                    "class '{class}' declares property '{}' more than once",
                    declared.name,
                )));
            }

            let rule = context.resolve_rule(&declared.rule)?;
            let modifiers = self.resolve_property_modifiers(class, &declared.name, &declared.modifiers)?;
            let default = match &declared.default {
                Some(value) => PropertyDefault::Value(value.clone()),
                None => PropertyDefault::None,
            };

            properties.insert(
                declared.name.clone(),
                PropertySchema {
                    rule,
                    modifiers,
                    callbacks: declared.callbacks.clone(),
                    default,
                    docs: declared.docs.clone(),
                },
            );
        }

        let mut fields = HashSet::new();
        for (property, schema) in &properties {
            let field = schema.modifiers.field_name.as_deref().unwrap_or(property);
            if !fields.insert(field.to_string()) {
                return Err(SchemaError::InvalidArgument(format!(
                    "class '{class}' maps multiple properties to field '{field}'",
                )));
            }
        }

        Ok(RuntimeSchema::new(
            class.clone(),
            properties,
            raw.class_callbacks.clone(),
            class_modifiers,
            raw.class_docs.clone(),
        ))
    }

    fn resolve_class_modifiers(
        &self,
        class: &ClassId,
        directives: &[ModifierDirective],
    ) -> Result<ClassModifiers, SchemaError> {
        let mut modifiers = ClassModifiers::default();
        for directive in directives {
            match directive.id.as_str() {
                modifier::CREATE_WITHOUT_CONSTRUCTOR => {
                    if !directive.args.is_empty() {
                        return Err(SchemaError::InvalidArgument(format!(
                            "modifier '{}' on class '{class}' accepts no arguments",
                            directive.id,
                        )));
                    }
                    modifiers.create_without_constructor = true;
                }
                modifier::FIELD_NAME | modifier::SKIPPED => {
                    return Err(SchemaError::InvalidArgument(format!(
                        "modifier '{}' cannot be used on class '{class}'",
                        directive.id,
                    )));
                }
                other => {
                    return Err(SchemaError::InvalidArgument(format!(
                        "unknown modifier '{other}' on class '{class}'",
                    )));
                }
            }
        }
        Ok(modifiers)
    }

    fn resolve_property_modifiers(
        &self,
        class: &ClassId,
        property: &str,
        directives: &[ModifierDirective],
    ) -> Result<PropertyModifiers, SchemaError> {
        let mut modifiers = PropertyModifiers::default();
        for directive in directives {
            match directive.id.as_str() {
                modifier::FIELD_NAME => {
                    let name = directive
                        .args
                        .get("name")
                        .and_then(|arg| match arg {
                            crate::rules::ArgValue::Json(serde_json::Value::String(name)) => {
                                Some(name.clone())
                            }
                            _ => None,
                        })
                        .filter(|name| !name.is_empty())
                        .ok_or_else(|| {
                            SchemaError::InvalidArgument(format!(
                                "modifier '{}' on property '{class}::{property}' requires a \
                                 non-empty 'name' argument",
                                directive.id,
                            ))
                        })?;
                    if directive.args.len() > 1 {
                        return Err(SchemaError::InvalidArgument(format!(
                            "modifier '{}' on property '{class}::{property}' accepts only the \
                             'name' argument",
                            directive.id,
                        )));
                    }
                    modifiers.field_name = Some(name);
                }
                modifier::SKIPPED => {
                    if !directive.args.is_empty() {
                        return Err(SchemaError::InvalidArgument(format!(
                            "modifier '{}' on property '{class}::{property}' accepts no arguments",
                            directive.id,
                        )));
                    }
                    modifiers.skipped = true;
                }
                modifier::CREATE_WITHOUT_CONSTRUCTOR => {
                    return Err(SchemaError::InvalidArgument(format!(
                        "modifier '{}' cannot be used on property '{class}::{property}'",
                        directive.id,
                    )));
                }
                other => {
                    return Err(SchemaError::InvalidArgument(format!(
                        "unknown modifier '{other}' on property '{class}::{property}'",
                    )));
                }
            }
        }
        Ok(modifiers)
    }
}
