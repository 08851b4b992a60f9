/* Scalar kinds and the textual converter that decodes them */

use crate::constructor::Instance;
use crate::errors::{InstantiateError, InstantiateResult};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::any::Any;
use std::fmt;

/* Every scalar the engine can decode from a single text value */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    U8,
    U16,
    U32,
    U64,
    U128,
    Usize,
    F32,
    F64,
    Bool,
    Char,
    String,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 17] = [
        PrimitiveKind::I8,
        PrimitiveKind::I16,
        PrimitiveKind::I32,
        PrimitiveKind::I64,
        PrimitiveKind::I128,
        PrimitiveKind::Isize,
        PrimitiveKind::U8,
        PrimitiveKind::U16,
        PrimitiveKind::U32,
        PrimitiveKind::U64,
        PrimitiveKind::U128,
        PrimitiveKind::Usize,
        PrimitiveKind::F32,
        PrimitiveKind::F64,
        PrimitiveKind::Bool,
        PrimitiveKind::Char,
        PrimitiveKind::String,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::I8 => "i8",
            PrimitiveKind::I16 => "i16",
            PrimitiveKind::I32 => "i32",
            PrimitiveKind::I64 => "i64",
            PrimitiveKind::I128 => "i128",
            PrimitiveKind::Isize => "isize",
            PrimitiveKind::U8 => "u8",
            PrimitiveKind::U16 => "u16",
            PrimitiveKind::U32 => "u32",
            PrimitiveKind::U64 => "u64",
            PrimitiveKind::U128 => "u128",
            PrimitiveKind::Usize => "usize",
            PrimitiveKind::F32 => "f32",
            PrimitiveKind::F64 => "f64",
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Char => "char",
            PrimitiveKind::String => "string",
        }
    }

    /* Look a kind up by the name used in schemas and type expressions */
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/* A scalar kind plus whether it is held behind a `Box` wrapper */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrimitiveType {
    pub kind: PrimitiveKind,
    #[serde(default)]
    pub boxed: bool,
}

impl PrimitiveType {
    pub const fn new(kind: PrimitiveKind) -> Self {
        Self { kind, boxed: false }
    }

    pub const fn boxed(kind: PrimitiveKind) -> Self {
        Self { kind, boxed: true }
    }

    pub fn type_name(&self) -> String {
        if self.boxed {
            format!("box<{}>", self.kind)
        } else {
            self.kind.name().to_string()
        }
    }
}

/* A decoded scalar, independent of how it will be handed to a constructor */
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveValue {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    I128(i128),
    Isize(isize),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    Usize(usize),
    F32(f32),
    F64(f64),
    Bool(bool),
    Char(char),
    String(String),
}

macro_rules! parse_number {
    ($variant:ident, $text:expr) => {
        $text
            .parse()
            .map(PrimitiveValue::$variant)
            .map_err(|err| err.to_string())
    };
}

impl PrimitiveValue {
    /* Decode `text` as `kind`, returning a human-readable reason on failure */
    pub fn parse(kind: PrimitiveKind, text: &str) -> Result<Self, String> {
        if text.is_empty() && kind != PrimitiveKind::String {
            return Err("empty value".to_string());
        }
        match kind {
            PrimitiveKind::I8 => parse_number!(I8, text),
            PrimitiveKind::I16 => parse_number!(I16, text),
            PrimitiveKind::I32 => parse_number!(I32, text),
            PrimitiveKind::I64 => parse_number!(I64, text),
            PrimitiveKind::I128 => parse_number!(I128, text),
            PrimitiveKind::Isize => parse_number!(Isize, text),
            PrimitiveKind::U8 => parse_number!(U8, text),
            PrimitiveKind::U16 => parse_number!(U16, text),
            PrimitiveKind::U32 => parse_number!(U32, text),
            PrimitiveKind::U64 => parse_number!(U64, text),
            PrimitiveKind::U128 => parse_number!(U128, text),
            PrimitiveKind::Usize => parse_number!(Usize, text),
            /* std accepts NaN / inf / Infinity case-insensitively */
            PrimitiveKind::F32 => parse_number!(F32, text),
            PrimitiveKind::F64 => parse_number!(F64, text),
            PrimitiveKind::Bool => {
                if text.eq_ignore_ascii_case("true") {
                    Ok(PrimitiveValue::Bool(true))
                } else if text.eq_ignore_ascii_case("false") {
                    Ok(PrimitiveValue::Bool(false))
                } else {
                    Err("expected 'true' or 'false'".to_string())
                }
            }
            PrimitiveKind::Char => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(PrimitiveValue::Char(c)),
                    _ => Err("expected exactly one character".to_string()),
                }
            }
            PrimitiveKind::String => Ok(PrimitiveValue::String(text.to_string())),
        }
    }

    pub fn kind(&self) -> PrimitiveKind {
        match self {
            PrimitiveValue::I8(_) => PrimitiveKind::I8,
            PrimitiveValue::I16(_) => PrimitiveKind::I16,
            PrimitiveValue::I32(_) => PrimitiveKind::I32,
            PrimitiveValue::I64(_) => PrimitiveKind::I64,
            PrimitiveValue::I128(_) => PrimitiveKind::I128,
            PrimitiveValue::Isize(_) => PrimitiveKind::Isize,
            PrimitiveValue::U8(_) => PrimitiveKind::U8,
            PrimitiveValue::U16(_) => PrimitiveKind::U16,
            PrimitiveValue::U32(_) => PrimitiveKind::U32,
            PrimitiveValue::U64(_) => PrimitiveKind::U64,
            PrimitiveValue::U128(_) => PrimitiveKind::U128,
            PrimitiveValue::Usize(_) => PrimitiveKind::Usize,
            PrimitiveValue::F32(_) => PrimitiveKind::F32,
            PrimitiveValue::F64(_) => PrimitiveKind::F64,
            PrimitiveValue::Bool(_) => PrimitiveKind::Bool,
            PrimitiveValue::Char(_) => PrimitiveKind::Char,
            PrimitiveValue::String(_) => PrimitiveKind::String,
        }
    }

    /* Move the scalar into a type-erased instance, boxing it when asked to */
    pub fn into_instance(self, boxed: bool) -> Instance {
        match self {
            PrimitiveValue::I8(v) => erase(v, boxed),
            PrimitiveValue::I16(v) => erase(v, boxed),
            PrimitiveValue::I32(v) => erase(v, boxed),
            PrimitiveValue::I64(v) => erase(v, boxed),
            PrimitiveValue::I128(v) => erase(v, boxed),
            PrimitiveValue::Isize(v) => erase(v, boxed),
            PrimitiveValue::U8(v) => erase(v, boxed),
            PrimitiveValue::U16(v) => erase(v, boxed),
            PrimitiveValue::U32(v) => erase(v, boxed),
            PrimitiveValue::U64(v) => erase(v, boxed),
            PrimitiveValue::U128(v) => erase(v, boxed),
            PrimitiveValue::Usize(v) => erase(v, boxed),
            PrimitiveValue::F32(v) => erase(v, boxed),
            PrimitiveValue::F64(v) => erase(v, boxed),
            PrimitiveValue::Bool(v) => erase(v, boxed),
            PrimitiveValue::Char(v) => erase(v, boxed),
            PrimitiveValue::String(v) => erase(v, boxed),
        }
    }

    /* Recover a scalar from an instance produced by `into_instance` */
    pub fn from_instance(ty: PrimitiveType, instance: Instance) -> InstantiateResult<Self> {
        let boxed = ty.boxed;
        match ty.kind {
            PrimitiveKind::I8 => unerase(instance, boxed).map(PrimitiveValue::I8),
            PrimitiveKind::I16 => unerase(instance, boxed).map(PrimitiveValue::I16),
            PrimitiveKind::I32 => unerase(instance, boxed).map(PrimitiveValue::I32),
            PrimitiveKind::I64 => unerase(instance, boxed).map(PrimitiveValue::I64),
            PrimitiveKind::I128 => unerase(instance, boxed).map(PrimitiveValue::I128),
            PrimitiveKind::Isize => unerase(instance, boxed).map(PrimitiveValue::Isize),
            PrimitiveKind::U8 => unerase(instance, boxed).map(PrimitiveValue::U8),
            PrimitiveKind::U16 => unerase(instance, boxed).map(PrimitiveValue::U16),
            PrimitiveKind::U32 => unerase(instance, boxed).map(PrimitiveValue::U32),
            PrimitiveKind::U64 => unerase(instance, boxed).map(PrimitiveValue::U64),
            PrimitiveKind::U128 => unerase(instance, boxed).map(PrimitiveValue::U128),
            PrimitiveKind::Usize => unerase(instance, boxed).map(PrimitiveValue::Usize),
            PrimitiveKind::F32 => unerase(instance, boxed).map(PrimitiveValue::F32),
            PrimitiveKind::F64 => unerase(instance, boxed).map(PrimitiveValue::F64),
            PrimitiveKind::Bool => unerase(instance, boxed).map(PrimitiveValue::Bool),
            PrimitiveKind::Char => unerase(instance, boxed).map(PrimitiveValue::Char),
            PrimitiveKind::String => unerase(instance, boxed).map(PrimitiveValue::String),
        }
    }

    /* JSON rendering; 128-bit integers are emitted as strings */
    pub fn to_json(&self) -> JsonValue {
        match self {
            PrimitiveValue::I8(v) => json!(v),
            PrimitiveValue::I16(v) => json!(v),
            PrimitiveValue::I32(v) => json!(v),
            PrimitiveValue::I64(v) => json!(v),
            PrimitiveValue::I128(v) => JsonValue::String(v.to_string()),
            PrimitiveValue::Isize(v) => json!(v),
            PrimitiveValue::U8(v) => json!(v),
            PrimitiveValue::U16(v) => json!(v),
            PrimitiveValue::U32(v) => json!(v),
            PrimitiveValue::U64(v) => json!(v),
            PrimitiveValue::U128(v) => JsonValue::String(v.to_string()),
            PrimitiveValue::Usize(v) => json!(v),
            PrimitiveValue::F32(v) => json!(v),
            PrimitiveValue::F64(v) => json!(v),
            PrimitiveValue::Bool(v) => json!(v),
            PrimitiveValue::Char(v) => JsonValue::String(v.to_string()),
            PrimitiveValue::String(v) => JsonValue::String(v.clone()),
        }
    }
}

impl fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveValue::I8(v) => write!(f, "{v}"),
            PrimitiveValue::I16(v) => write!(f, "{v}"),
            PrimitiveValue::I32(v) => write!(f, "{v}"),
            PrimitiveValue::I64(v) => write!(f, "{v}"),
            PrimitiveValue::I128(v) => write!(f, "{v}"),
            PrimitiveValue::Isize(v) => write!(f, "{v}"),
            PrimitiveValue::U8(v) => write!(f, "{v}"),
            PrimitiveValue::U16(v) => write!(f, "{v}"),
            PrimitiveValue::U32(v) => write!(f, "{v}"),
            PrimitiveValue::U64(v) => write!(f, "{v}"),
            PrimitiveValue::U128(v) => write!(f, "{v}"),
            PrimitiveValue::Usize(v) => write!(f, "{v}"),
            PrimitiveValue::F32(v) => write!(f, "{v}"),
            PrimitiveValue::F64(v) => write!(f, "{v}"),
            PrimitiveValue::Bool(v) => write!(f, "{v}"),
            PrimitiveValue::Char(v) => write!(f, "{v}"),
            PrimitiveValue::String(v) => f.write_str(v),
        }
    }
}

/// Decode `text` for the target named `target` into a type-erased scalar.
pub fn convert(ty: PrimitiveType, target: &str, text: &str) -> InstantiateResult<Instance> {
    PrimitiveValue::parse(ty.kind, text)
        .map(|value| value.into_instance(ty.boxed))
        .map_err(|reason| InstantiateError::ConversionFailed {
            type_name: ty.type_name(),
            target: target.to_string(),
            value: text.to_string(),
            reason,
        })
}

fn erase<T: Any>(value: T, boxed: bool) -> Instance {
    if boxed {
        Instance::new(Box::new(value))
    } else {
        Instance::new(value)
    }
}

fn unerase<T: Any>(instance: Instance, boxed: bool) -> InstantiateResult<T> {
    if boxed {
        instance.downcast::<Box<T>>().map(|value| *value)
    } else {
        instance.downcast::<T>()
    }
}
