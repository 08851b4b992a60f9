/* Self-describing Rust types and the per-engine registry of named descriptors */

use crate::errors::SchemaError;
use crate::primitive::PrimitiveKind;
use crate::target::TypeDesc;
use std::any::Any;
use std::collections::BTreeMap;
use std::convert::Infallible;

/// A Rust type that can hand the engine its own descriptor.
///
/// Aggregates implement this by listing their constructors:
///
/// ```
/// use instantiator::{Arguments, ClassConstructor, Describe, TypeDesc};
///
/// struct Point { x: i32, y: i32 }
///
/// impl Describe for Point {
///     fn describe() -> TypeDesc {
///         TypeDesc::aggregate("Point", vec![
///             ClassConstructor::new(|mut args: Arguments| {
///                 Ok(Point { x: args.take(0)?, y: args.take(1)? })
///             })
///             .formal("x", i32::describe())
///             .formal("y", i32::describe()),
///         ])
///     }
/// }
/// ```
pub trait Describe: Any {
    fn describe() -> TypeDesc;
}

/// Scalars the primitive converter produces directly.
pub trait Scalar: Describe {
    const KIND: PrimitiveKind;
}

macro_rules! scalar {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Scalar for $ty {
                const KIND: PrimitiveKind = PrimitiveKind::$kind;
            }

            impl Describe for $ty {
                fn describe() -> TypeDesc {
                    TypeDesc::primitive(PrimitiveKind::$kind)
                }
            }
        )*
    };
}

scalar! {
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    bool => Bool,
    char => Char,
    String => String,
}

/* Boxed scalars are the wrapper form of their primitive */
impl<T: Scalar> Describe for Box<T> {
    fn describe() -> TypeDesc {
        TypeDesc::boxed_primitive(T::KIND)
    }
}

impl<E: Describe> Describe for Vec<E> {
    fn describe() -> TypeDesc {
        TypeDesc::list_of::<E>(E::describe())
    }
}

impl Describe for Infallible {
    fn describe() -> TypeDesc {
        TypeDesc::uninhabited("Infallible")
    }
}

/// Parsed form of a type expression such as `list<box<i32>>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Primitive(PrimitiveKind),
    Boxed(PrimitiveKind),
    List(Box<TypeExpr>),
    RawList,
    Named(String),
}

impl TypeExpr {
    pub fn parse(expr: &str) -> Result<Self, SchemaError> {
        let malformed = || SchemaError::MalformedType {
            expr: expr.to_string(),
        };
        let trimmed = expr.trim();
        if trimmed.is_empty() {
            return Err(malformed());
        }

        if let Some((head, rest)) = trimmed.split_once('<') {
            let inner = rest.strip_suffix('>').ok_or_else(malformed)?;
            return match head.trim() {
                "list" => Ok(TypeExpr::List(Box::new(TypeExpr::parse(inner)?))),
                "box" => match TypeExpr::parse(inner)? {
                    TypeExpr::Primitive(kind) => Ok(TypeExpr::Boxed(kind)),
                    _ => Err(malformed()),
                },
                _ => Err(malformed()),
            };
        }

        if trimmed == "list" {
            return Ok(TypeExpr::RawList);
        }
        if let Some(kind) = PrimitiveKind::from_name(trimmed) {
            return Ok(TypeExpr::Primitive(kind));
        }
        if trimmed.contains(['>', ',', ' ']) {
            return Err(malformed());
        }
        Ok(TypeExpr::Named(trimmed.to_string()))
    }
}

/// Named descriptors known to one engine.
///
/// The registry is filled once and then only read, so sharing it between
/// threads needs no locking.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: BTreeMap<String, TypeDesc>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /* Register under the descriptor's own type name */
    pub fn register(&mut self, desc: TypeDesc) -> Result<(), SchemaError> {
        let name = desc.type_name();
        self.register_as(name, desc)
    }

    pub fn register_as(
        &mut self,
        name: impl Into<String>,
        desc: TypeDesc,
    ) -> Result<(), SchemaError> {
        let name = name.into();
        if self.types.contains_key(&name) {
            return Err(SchemaError::DuplicateType { type_name: name });
        }
        self.types.insert(name, desc);
        Ok(())
    }

    pub fn register_described<T: Describe>(&mut self) -> Result<(), SchemaError> {
        self.register(T::describe())
    }

    pub fn get(&self, name: &str) -> Option<&TypeDesc> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.types.keys().map(String::as_str).collect()
    }

    /* Resolve an expression whose named parts are all registered */
    pub fn resolve(&self, expr: &str) -> Result<TypeDesc, SchemaError> {
        let parsed = TypeExpr::parse(expr)?;
        self.resolve_expr(&parsed, expr)
    }

    /* Lists resolved from expressions keep their elements type-erased */
    fn resolve_expr(&self, expr: &TypeExpr, owner: &str) -> Result<TypeDesc, SchemaError> {
        match expr {
            TypeExpr::Primitive(kind) => Ok(TypeDesc::primitive(*kind)),
            TypeExpr::Boxed(kind) => Ok(TypeDesc::boxed_primitive(*kind)),
            TypeExpr::RawList => Ok(TypeDesc::RawList),
            TypeExpr::List(inner) => Ok(TypeDesc::erased_list(self.resolve_expr(inner, owner)?)),
            TypeExpr::Named(name) => {
                self.get(name)
                    .cloned()
                    .ok_or_else(|| SchemaError::UnknownType {
                        type_name: name.clone(),
                        owner: owner.to_string(),
                    })
            }
        }
    }
}
