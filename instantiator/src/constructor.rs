/* Constructor tables and the type-erased values they consume and produce */

use crate::errors::{BoxError, InstantiateError, InstantiateResult};
use crate::target::TypeDesc;
use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

/// An owned value whose concrete type is only known to the descriptor that built it.
pub struct Instance {
    value: Box<dyn Any>,
    type_name: &'static str,
}

impl Instance {
    pub fn new<T: Any>(value: T) -> Self {
        Self {
            value: Box::new(value),
            type_name: type_name::<T>(),
        }
    }

    /* Name of the concrete type held, for diagnostics */
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    pub fn downcast<T: Any>(self) -> InstantiateResult<T> {
        let found = self.type_name;
        self.value
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| InstantiateError::TypeMismatch {
                expected: type_name::<T>(),
                found,
            })
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Positional arguments handed to a constructor body, in formal order.
#[derive(Debug)]
pub struct Arguments {
    slots: Vec<Option<Instance>>,
}

impl Arguments {
    pub fn new(values: Vec<Instance>) -> Self {
        Self {
            slots: values.into_iter().map(Some).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /* Move the argument at `index` out as a `T`; each slot can be taken once */
    pub fn take<T: Any>(&mut self, index: usize) -> InstantiateResult<T> {
        self.take_slot(index, type_name::<T>())?.downcast::<T>()
    }

    /* Move the argument at `index` out without downcasting it */
    pub fn take_instance(&mut self, index: usize) -> InstantiateResult<Instance> {
        self.take_slot(index, "Instance")
    }

    fn take_slot(&mut self, index: usize, expected: &'static str) -> InstantiateResult<Instance> {
        self.slots
            .get_mut(index)
            .and_then(Option::take)
            .ok_or(InstantiateError::TypeMismatch {
                expected,
                found: "<no argument>",
            })
    }
}

/// One formal argument of a constructor. A missing name models a constructor
/// compiled without parameter-name metadata.
#[derive(Debug, Clone)]
pub struct Formal {
    pub name: Option<String>,
    pub desc: TypeDesc,
}

type InvokeFn = Arc<dyn Fn(Arguments) -> Result<Instance, BoxError> + Send + Sync>;

/// A constructor: ordered formals plus the body that consumes them.
#[derive(Clone)]
pub struct ClassConstructor {
    formals: Vec<Formal>,
    invoke: InvokeFn,
}

impl fmt::Debug for ClassConstructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassConstructor")
            .field("signature", &self.signature())
            .finish()
    }
}

impl ClassConstructor {
    /* Wrap a typed constructor body; formals are appended with `formal` */
    pub fn new<T, F>(body: F) -> Self
    where
        T: Any,
        F: Fn(Arguments) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        Self {
            formals: Vec::new(),
            invoke: Arc::new(move |args| body(args).map(Instance::new)),
        }
    }

    /* Wrap a body that already produces a type-erased instance */
    pub fn erased<F>(body: F) -> Self
    where
        F: Fn(Arguments) -> Result<Instance, BoxError> + Send + Sync + 'static,
    {
        Self {
            formals: Vec::new(),
            invoke: Arc::new(body),
        }
    }

    pub fn formal(mut self, name: impl Into<String>, desc: TypeDesc) -> Self {
        self.formals.push(Formal {
            name: Some(name.into()),
            desc,
        });
        self
    }

    pub fn unnamed_formal(mut self, desc: TypeDesc) -> Self {
        self.formals.push(Formal { name: None, desc });
        self
    }

    pub fn formals(&self) -> &[Formal] {
        &self.formals
    }

    pub fn arity(&self) -> usize {
        self.formals.len()
    }

    /* Names of the formals that carry one */
    pub fn formal_names(&self) -> impl Iterator<Item = &str> {
        self.formals.iter().filter_map(|formal| formal.name.as_deref())
    }

    pub fn is_fully_named(&self) -> bool {
        self.formals.iter().all(|formal| formal.name.is_some())
    }

    /* Human-readable `(name: type, ...)` form used in errors and logs */
    pub fn signature(&self) -> String {
        let formals: Vec<String> = self
            .formals
            .iter()
            .map(|formal| {
                format!(
                    "{}: {}",
                    formal.name.as_deref().unwrap_or("_"),
                    formal.desc.type_name()
                )
            })
            .collect();
        format!("({})", formals.join(", "))
    }

    /* Run the body; any failure is reported as `ConstructorThrew` */
    pub fn invoke(&self, type_name: &str, values: Vec<Instance>) -> InstantiateResult<Instance> {
        (self.invoke)(Arguments::new(values)).map_err(|source| {
            InstantiateError::ConstructorThrew {
                type_name: type_name.to_string(),
                signature: self.signature(),
                source,
            }
        })
    }
}
