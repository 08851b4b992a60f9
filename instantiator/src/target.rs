/* Type descriptors and the (type, name) bindings the engine instantiates */

use crate::constructor::{ClassConstructor, Instance};
use crate::errors::{InstantiateError, InstantiateResult};
use crate::parameters::validate_component;
use crate::primitive::{PrimitiveKind, PrimitiveType};
use crate::registry::Describe;
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

type CollectFn = Arc<dyn Fn(Vec<Instance>) -> InstantiateResult<Instance> + Send + Sync>;
type VariantFn = Arc<dyn Fn(usize) -> Instance + Send + Sync>;

/// The explicit type universe: every type the engine can be asked to build.
///
/// Descriptors form a tree. A cyclic aggregate cannot be described, and the
/// dotted parameter schema could not address one anyway.
#[derive(Clone)]
pub enum TypeDesc {
    Primitive(PrimitiveType),
    List(ListDesc),
    /// A list type with no element type; never instantiable.
    RawList,
    Aggregate(Arc<AggregateDesc>),
    Enumeration(Arc<EnumDesc>),
    Abstract {
        name: String,
        kind: AbstractKind,
    },
}

/* Parameterised list: element descriptor plus how to gather the elements */
#[derive(Clone)]
pub struct ListDesc {
    element: Box<TypeDesc>,
    collect: CollectFn,
}

impl ListDesc {
    pub fn element(&self) -> &TypeDesc {
        &self.element
    }

    pub fn collect(&self, elements: Vec<Instance>) -> InstantiateResult<Instance> {
        (self.collect)(elements)
    }
}

/* User-defined aggregate with its constructors in source order */
#[derive(Debug)]
pub struct AggregateDesc {
    pub name: String,
    pub constructors: Vec<ClassConstructor>,
}

/* Unit-variant enumeration decoded from a variant name or ordinal */
pub struct EnumDesc {
    pub name: String,
    pub variants: Vec<String>,
    make: VariantFn,
}

impl EnumDesc {
    /* Decode by exact variant name first, then by zero-based ordinal */
    pub fn decode(&self, text: &str) -> Result<Instance, String> {
        let index = self
            .variants
            .iter()
            .position(|variant| variant == text)
            .or_else(|| canonical_ordinal(text).filter(|ordinal| *ordinal < self.variants.len()))
            .ok_or_else(|| format!("expected one of {:?} or an ordinal", self.variants))?;
        Ok((self.make)(index))
    }
}

/* Plain decimal digits without sign or leading zeros */
fn canonical_ordinal(text: &str) -> Option<usize> {
    let digits = !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit());
    if !digits || (text.len() > 1 && text.starts_with('0')) {
        return None;
    }
    text.parse().ok()
}

impl fmt::Debug for EnumDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumDesc")
            .field("name", &self.name)
            .field("variants", &self.variants)
            .finish()
    }
}

/* Why a type has no instances the engine could build */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbstractKind {
    Interface,
    AbstractAggregate,
    Uninhabited,
}

/// Why a target was classified as invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    Interface,
    AbstractAggregate,
    Uninhabited,
    RawList,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            InvalidReason::Interface => "interfaces have no constructors",
            InvalidReason::AbstractAggregate => "abstract types have no constructors",
            InvalidReason::Uninhabited => "the type has no values",
            InvalidReason::RawList => "list types need an element type",
        };
        f.write_str(text)
    }
}

/// The tag the driver dispatches on.
#[derive(Debug, Clone)]
pub enum Classification {
    Primitive(PrimitiveType),
    Enumeration(Arc<EnumDesc>),
    List(ListDesc),
    Aggregate(Arc<AggregateDesc>),
    Invalid(InvalidReason),
}

impl TypeDesc {
    pub fn primitive(kind: PrimitiveKind) -> Self {
        TypeDesc::Primitive(PrimitiveType::new(kind))
    }

    pub fn boxed_primitive(kind: PrimitiveKind) -> Self {
        TypeDesc::Primitive(PrimitiveType::boxed(kind))
    }

    /* `Vec<E>` where each element is produced by `element` as an `E` */
    pub fn list_of<E: Any>(element: TypeDesc) -> Self {
        Self::list_with(element, |elements| {
            elements
                .into_iter()
                .map(Instance::downcast::<E>)
                .collect::<InstantiateResult<Vec<E>>>()
                .map(Instance::new)
        })
    }

    /* `Vec<Instance>`, for element types only known at runtime */
    pub fn erased_list(element: TypeDesc) -> Self {
        Self::list_with(element, |elements| Ok(Instance::new(elements)))
    }

    /* List with a custom gathering step */
    pub fn list_with<F>(element: TypeDesc, collect: F) -> Self
    where
        F: Fn(Vec<Instance>) -> InstantiateResult<Instance> + Send + Sync + 'static,
    {
        TypeDesc::List(ListDesc {
            element: Box::new(element),
            collect: Arc::new(collect),
        })
    }

    pub fn aggregate(name: impl Into<String>, constructors: Vec<ClassConstructor>) -> Self {
        TypeDesc::Aggregate(Arc::new(AggregateDesc {
            name: name.into(),
            constructors,
        }))
    }

    pub fn enumeration<E, I, S>(name: impl Into<String>, variants: I) -> Self
    where
        E: Any + Clone + Send + Sync,
        I: IntoIterator<Item = (S, E)>,
        S: Into<String>,
    {
        let (names, values): (Vec<String>, Vec<E>) = variants
            .into_iter()
            .map(|(name, value)| (name.into(), value))
            .unzip();
        TypeDesc::Enumeration(Arc::new(EnumDesc {
            name: name.into(),
            variants: names,
            make: Arc::new(move |index| Instance::new(values[index].clone())),
        }))
    }

    pub fn interface(name: impl Into<String>) -> Self {
        TypeDesc::Abstract {
            name: name.into(),
            kind: AbstractKind::Interface,
        }
    }

    pub fn abstract_aggregate(name: impl Into<String>) -> Self {
        TypeDesc::Abstract {
            name: name.into(),
            kind: AbstractKind::AbstractAggregate,
        }
    }

    pub fn uninhabited(name: impl Into<String>) -> Self {
        TypeDesc::Abstract {
            name: name.into(),
            kind: AbstractKind::Uninhabited,
        }
    }

    pub fn classify(&self) -> Classification {
        match self {
            TypeDesc::Primitive(ty) => Classification::Primitive(*ty),
            TypeDesc::List(list) => Classification::List(list.clone()),
            TypeDesc::RawList => Classification::Invalid(InvalidReason::RawList),
            TypeDesc::Aggregate(aggregate) => Classification::Aggregate(aggregate.clone()),
            TypeDesc::Enumeration(desc) => Classification::Enumeration(desc.clone()),
            TypeDesc::Abstract { kind, .. } => Classification::Invalid(match kind {
                AbstractKind::Interface => InvalidReason::Interface,
                AbstractKind::AbstractAggregate => InvalidReason::AbstractAggregate,
                AbstractKind::Uninhabited => InvalidReason::Uninhabited,
            }),
        }
    }

    pub fn type_name(&self) -> String {
        match self {
            TypeDesc::Primitive(ty) => ty.type_name(),
            TypeDesc::List(list) => format!("list<{}>", list.element.type_name()),
            TypeDesc::RawList => "list".to_string(),
            TypeDesc::Aggregate(aggregate) => aggregate.name.clone(),
            TypeDesc::Enumeration(desc) => desc.name.clone(),
            TypeDesc::Abstract { name, .. } => name.clone(),
        }
    }
}

impl fmt::Debug for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeDesc({})", self.type_name())
    }
}

impl fmt::Debug for ListDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListDesc")
            .field("element", &self.element)
            .finish_non_exhaustive()
    }
}

/// A type bound to the single-component name that prefixes its parameters.
///
/// `T` is the Rust type the typed entry point hands back; targets built from
/// runtime descriptors use [`Instance`] and the erased entry point.
pub struct Target<T = Instance> {
    desc: TypeDesc,
    name: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Target<T> {
    fn clone(&self) -> Self {
        Self {
            desc: self.desc.clone(),
            name: self.name.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Target<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("name", &self.name)
            .field("type", &self.desc.type_name())
            .finish()
    }
}

impl<T: Describe> Target<T> {
    /* Target for a type that describes itself */
    pub fn create(name: impl Into<String>) -> Self {
        Self::with_type(T::describe(), name)
    }
}

impl<T> Target<T> {
    /* Target over an explicit descriptor; `name` must be a single component */
    pub fn with_type(desc: TypeDesc, name: impl Into<String>) -> Self {
        let name = name.into();
        debug_assert!(
            validate_component(&name).is_ok(),
            "target name '{name}' is not a single identifier"
        );
        Self {
            desc,
            name,
            _marker: PhantomData,
        }
    }

    pub fn try_with_type(desc: TypeDesc, name: impl Into<String>) -> InstantiateResult<Self> {
        let name = name.into();
        validate_component(&name).map_err(|reason| InstantiateError::InvalidParameterName {
            name: name.clone(),
            reason,
        })?;
        Ok(Self::with_type(desc, name))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_desc(&self) -> &TypeDesc {
        &self.desc
    }

    pub fn classify(&self) -> Classification {
        self.desc.classify()
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self.desc, TypeDesc::Primitive(_))
    }

    pub fn is_abstract(&self) -> bool {
        matches!(self.desc, TypeDesc::Abstract { .. })
    }

    pub fn is_list(&self) -> bool {
        matches!(self.desc, TypeDesc::List(_))
    }

    /* Element target of a list, bound under the list's own name */
    pub fn type_argument(&self) -> Option<Target> {
        match &self.desc {
            TypeDesc::List(list) => Some(self.new_child(self.name.clone(), list.element().clone())),
            _ => None,
        }
    }

    pub fn new_child(&self, name: impl Into<String>, desc: TypeDesc) -> Target {
        Target::with_type(desc, name)
    }

    pub fn rebound(&self, name: impl Into<String>) -> Self {
        Self::with_type(self.desc.clone(), name)
    }

    /* Forget the static type, keeping descriptor and name */
    pub fn erase(&self) -> Target {
        Target::with_type(self.desc.clone(), self.name.clone())
    }
}
