/* Dynamic values built by schema-described types */

use crate::constructor::Instance;
use crate::errors::InstantiateResult;
use crate::primitive::PrimitiveValue;
use crate::target::TypeDesc;
use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value as JsonValue};

/* A value tree whose shape is only known at runtime */
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Primitive(PrimitiveValue),
    Enum {
        type_name: String,
        variant: String,
    },
    Record {
        type_name: String,
        fields: Vec<(String, Value)>,
    },
    List(Vec<Value>),
}

impl Value {
    /// Turn an instance produced for `desc` into a dynamic value.
    ///
    /// Scalars are read back through their primitive type, erased lists
    /// element by element; everything else must already be a `Value`.
    pub fn from_instance(desc: &TypeDesc, instance: Instance) -> InstantiateResult<Self> {
        match desc {
            TypeDesc::Primitive(ty) => {
                PrimitiveValue::from_instance(*ty, instance).map(Value::Primitive)
            }
            TypeDesc::List(list) => instance
                .downcast::<Vec<Instance>>()?
                .into_iter()
                .map(|element| Value::from_instance(list.element(), element))
                .collect::<InstantiateResult<Vec<_>>>()
                .map(Value::List),
            _ => instance.downcast::<Value>(),
        }
    }

    /* Get a record field by name */
    pub fn get_field(&self, field_name: &str) -> Option<&Value> {
        if let Value::Record { fields, .. } = self {
            fields
                .iter()
                .find(|(name, _)| name == field_name)
                .map(|(_, value)| value)
        } else {
            None
        }
    }

    /* Get a list element by index */
    pub fn get_element(&self, index: usize) -> Option<&Value> {
        if let Value::List(elements) = self {
            elements.get(index)
        } else {
            None
        }
    }

    pub fn as_primitive(&self) -> Option<&PrimitiveValue> {
        if let Value::Primitive(value) = self {
            Some(value)
        } else {
            None
        }
    }

    /* Just the data, without type names */
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Primitive(value) => value.to_json(),
            Value::Enum { variant, .. } => JsonValue::String(variant.clone()),
            Value::Record { fields, .. } => {
                let mut map = Map::new();
                for (name, value) in fields {
                    map.insert(name.clone(), value.to_json());
                }
                JsonValue::Object(map)
            }
            Value::List(elements) => {
                JsonValue::Array(elements.iter().map(Value::to_json).collect())
            }
        }
    }

    /* Data together with the type of every node */
    pub fn to_typed_json(&self) -> JsonValue {
        match self {
            Value::Primitive(value) => json!({
                "kind": "primitive",
                "type": value.kind().name(),
                "value": value.to_json(),
            }),
            Value::Enum { type_name, variant } => json!({
                "kind": "enum",
                "type": type_name,
                "variant": variant,
            }),
            Value::Record { type_name, fields } => {
                let mut map = Map::new();
                for (name, value) in fields {
                    map.insert(name.clone(), value.to_typed_json());
                }
                json!({
                    "kind": "record",
                    "type": type_name,
                    "fields": map,
                })
            }
            Value::List(elements) => json!({
                "kind": "list",
                "elements": elements.iter().map(Value::to_typed_json).collect::<Vec<_>>(),
            }),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_typed_json().serialize(serializer)
    }
}
