/* YAML-described record types whose instances are dynamic `Value` trees */

use crate::constructor::{Arguments, ClassConstructor, Instance};
use crate::errors::{InstantiateError, SchemaError};
use crate::parameters::validate_component;
use crate::registry::{TypeExpr, TypeRegistry};
use crate::target::TypeDesc;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::debug;

/* Top-level schema document */
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Schema {
    #[serde(default)]
    pub records: Vec<RecordDef>,
    #[serde(default)]
    pub enums: Vec<EnumDef>,
    /* Names that exist as types but can never be instantiated */
    #[serde(default)]
    pub interfaces: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RecordDef {
    pub name: String,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default)]
    pub constructors: Vec<ConstructorDef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConstructorDef {
    #[serde(default)]
    pub args: Vec<ArgDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ArgDef {
    /* Omitted when the constructor carries no parameter names */
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub type_expr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct EnumDef {
    pub name: String,
    pub variants: Vec<String>,
}

impl Schema {
    pub fn from_yaml_str(text: &str) -> Result<Self, SchemaError> {
        Ok(serde_yml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Resolve every declared type into a registry.
    ///
    /// Records may reference each other in any order; a record reachable from
    /// its own constructor arguments is rejected.
    pub fn build(&self) -> Result<TypeRegistry, SchemaError> {
        let mut declared = BTreeSet::new();
        let names = self
            .records
            .iter()
            .map(|record| record.name.as_str())
            .chain(self.enums.iter().map(|def| def.name.as_str()))
            .chain(self.interfaces.iter().map(String::as_str));
        for name in names {
            if !declared.insert(name) {
                return Err(SchemaError::DuplicateType {
                    type_name: name.to_string(),
                });
            }
        }

        let mut builder = SchemaBuilder {
            records: self
                .records
                .iter()
                .map(|record| (record.name.as_str(), record))
                .collect(),
            registry: TypeRegistry::new(),
            visiting: Vec::new(),
        };

        for name in &self.interfaces {
            builder.registry.register_as(name.clone(), TypeDesc::interface(name.clone()))?;
        }
        for def in &self.enums {
            builder.registry.register(enum_desc(def)?)?;
        }
        for record in &self.records {
            builder.record(&record.name)?;
        }

        debug!(types = builder.registry.names().len(), "built schema registry");
        Ok(builder.registry)
    }
}

struct SchemaBuilder<'a> {
    records: BTreeMap<&'a str, &'a RecordDef>,
    registry: TypeRegistry,
    visiting: Vec<String>,
}

impl SchemaBuilder<'_> {
    fn record(&mut self, name: &str) -> Result<TypeDesc, SchemaError> {
        if let Some(desc) = self.registry.get(name) {
            return Ok(desc.clone());
        }
        if self.visiting.iter().any(|visiting| visiting == name) {
            return Err(SchemaError::Cycle {
                type_name: name.to_string(),
                path: self.visiting.clone(),
            });
        }
        let def = *self.records.get(name).ok_or_else(|| SchemaError::UnknownType {
            type_name: name.to_string(),
            owner: self.visiting.last().cloned().unwrap_or_default(),
        })?;

        if def.is_abstract {
            let desc = TypeDesc::abstract_aggregate(def.name.clone());
            self.registry.register(desc.clone())?;
            return Ok(desc);
        }
        if def.constructors.is_empty() {
            return Err(SchemaError::NoConstructors {
                type_name: def.name.clone(),
            });
        }

        self.visiting.push(def.name.clone());
        let constructors = def
            .constructors
            .iter()
            .map(|ctor| self.constructor(&def.name, ctor))
            .collect::<Result<Vec<_>, _>>();
        self.visiting.pop();

        let desc = TypeDesc::aggregate(def.name.clone(), constructors?);
        self.registry.register(desc.clone())?;
        Ok(desc)
    }

    fn constructor(
        &mut self,
        owner: &str,
        def: &ConstructorDef,
    ) -> Result<ClassConstructor, SchemaError> {
        let mut fields = Vec::with_capacity(def.args.len());
        for (index, arg) in def.args.iter().enumerate() {
            if let Some(name) = &arg.name {
                validate_component(name).map_err(|reason| SchemaError::ArgumentName {
                    type_name: owner.to_string(),
                    source: InstantiateError::InvalidParameterName {
                        name: name.clone(),
                        reason,
                    },
                })?;
            }
            let expr = TypeExpr::parse(&arg.type_expr)?;
            let desc = self.resolve(&expr, owner)?;
            let field_name = arg.name.clone().unwrap_or_else(|| format!("_{index}"));
            fields.push((arg.name.clone(), field_name, desc));
        }

        let type_name = owner.to_string();
        let lifted: Vec<(String, TypeDesc)> = fields
            .iter()
            .map(|(_, field_name, desc)| (field_name.clone(), desc.clone()))
            .collect();
        let ctor = ClassConstructor::erased(move |mut args: Arguments| {
            let mut values = Vec::with_capacity(lifted.len());
            for (index, (field_name, desc)) in lifted.iter().enumerate() {
                let instance = args.take_instance(index)?;
                values.push((field_name.clone(), Value::from_instance(desc, instance)?));
            }
            Ok(Instance::new(Value::Record {
                type_name: type_name.clone(),
                fields: values,
            }))
        });

        Ok(fields.into_iter().fold(ctor, |ctor, (name, _, desc)| match name {
            Some(name) => ctor.formal(name, desc),
            None => ctor.unnamed_formal(desc),
        }))
    }

    fn resolve(&mut self, expr: &TypeExpr, owner: &str) -> Result<TypeDesc, SchemaError> {
        match expr {
            TypeExpr::List(inner) => Ok(TypeDesc::erased_list(self.resolve(inner, owner)?)),
            TypeExpr::Named(name) if self.registry.contains(name) => self.registry.resolve(name),
            TypeExpr::Named(name) if self.records.contains_key(name.as_str()) => self.record(name),
            TypeExpr::Named(name) => Err(SchemaError::UnknownType {
                type_name: name.clone(),
                owner: owner.to_string(),
            }),
            TypeExpr::Primitive(kind) => Ok(TypeDesc::primitive(*kind)),
            TypeExpr::Boxed(kind) => Ok(TypeDesc::boxed_primitive(*kind)),
            TypeExpr::RawList => Ok(TypeDesc::RawList),
        }
    }
}

fn enum_desc(def: &EnumDef) -> Result<TypeDesc, SchemaError> {
    if def.variants.is_empty() {
        return Err(SchemaError::NoVariants {
            type_name: def.name.clone(),
        });
    }
    let variants: Vec<(String, Value)> = def
        .variants
        .iter()
        .map(|variant| {
            (
                variant.clone(),
                Value::Enum {
                    type_name: def.name.clone(),
                    variant: variant.clone(),
                },
            )
        })
        .collect();
    Ok(TypeDesc::enumeration(def.name.clone(), variants))
}
