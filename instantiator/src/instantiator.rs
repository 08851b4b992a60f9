/* Recursive driver: primitives, enumerations, lists and aggregates */

use crate::constructor::Instance;
use crate::errors::{InstantiateError, InstantiateResult};
use crate::parameters::Parameters;
use crate::primitive::{self, PrimitiveType};
use crate::selector;
use crate::target::{AggregateDesc, Classification, EnumDesc, ListDesc, Target, TypeDesc};
use serde::{Deserialize, Serialize};
use std::any::Any;
use tracing::{debug, trace};

pub const DEFAULT_MAX_DEPTH: usize = 64;

/* Configuration toggles for the instantiator */
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct InstantiatorConfig {
    /* Deepest nesting of descriptors the driver will descend into */
    pub max_depth: usize,
}

impl Default for InstantiatorConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Builds object graphs from scoped parameter bags.
///
/// The driver keeps no state between calls: progress lives in the shrinking
/// parameter set and the recursion depth, so one instance can serve any
/// number of concurrent callers.
#[derive(Clone, Debug, Default)]
pub struct Instantiator {
    config: InstantiatorConfig,
}

impl Instantiator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: InstantiatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InstantiatorConfig {
        &self.config
    }

    /// Instantiate `target` and hand back the concrete `T`.
    ///
    /// Parameters whose first component is not the target's name are ignored.
    /// Targets built over runtime descriptors should use
    /// [`Instantiator::instantiate_erased`] instead.
    pub fn instantiate<T: Any>(
        &self,
        target: &Target<T>,
        parameters: impl Into<Parameters>,
    ) -> InstantiateResult<T> {
        let parameters = parameters.into();
        self.instantiate_erased(target, &parameters)?.downcast::<T>()
    }

    /* Instantiate without recovering the static type */
    pub fn instantiate_erased<T>(
        &self,
        target: &Target<T>,
        parameters: &Parameters,
    ) -> InstantiateResult<Instance> {
        self.instantiate_at(target.type_desc(), target.name(), parameters, 0)
    }

    fn instantiate_at(
        &self,
        desc: &TypeDesc,
        name: &str,
        parameters: &Parameters,
        depth: usize,
    ) -> InstantiateResult<Instance> {
        if depth > self.config.max_depth {
            return Err(InstantiateError::DepthExceeded {
                target: name.to_string(),
                max_depth: self.config.max_depth,
            });
        }

        match desc.classify() {
            Classification::Invalid(reason) => Err(InstantiateError::InvalidType {
                type_name: desc.type_name(),
                target: name.to_string(),
                reason: reason.to_string(),
            }),
            Classification::Primitive(ty) => self.instantiate_primitive(ty, name, parameters),
            Classification::Enumeration(desc) => {
                self.instantiate_enumeration(&desc, name, parameters)
            }
            Classification::List(list) => self.instantiate_list(&list, name, parameters, depth),
            Classification::Aggregate(aggregate) => {
                self.instantiate_aggregate(&aggregate, name, parameters, depth)
            }
        }
    }

    fn instantiate_primitive(
        &self,
        ty: PrimitiveType,
        name: &str,
        parameters: &Parameters,
    ) -> InstantiateResult<Instance> {
        let parameter = parameters
            .named(name)?
            .ok_or_else(|| missing_witness(ty.type_name(), parameters))?;
        primitive::convert(ty, name, parameter.value())
    }

    fn instantiate_enumeration(
        &self,
        desc: &EnumDesc,
        name: &str,
        parameters: &Parameters,
    ) -> InstantiateResult<Instance> {
        let parameter = parameters
            .named(name)?
            .ok_or_else(|| missing_witness(desc.name.clone(), parameters))?;
        desc.decode(parameter.value())
            .map_err(|reason| InstantiateError::ConversionFailed {
                type_name: desc.name.clone(),
                target: name.to_string(),
                value: parameter.value().to_string(),
                reason,
            })
    }

    fn instantiate_list(
        &self,
        list: &ListDesc,
        name: &str,
        parameters: &Parameters,
        depth: usize,
    ) -> InstantiateResult<Instance> {
        let element = list.element();
        if let Classification::Invalid(reason) = element.classify() {
            return Err(InstantiateError::InvalidType {
                type_name: element.type_name(),
                target: name.to_string(),
                reason: reason.to_string(),
            });
        }

        let scoped = parameters.scoped_to(name);
        let slices = element_slices(&scoped, has_single_scalar_field(element));
        trace!(binding = name, elements = slices.len(), "grouped list parameters");

        let elements = slices
            .iter()
            .map(|slice| self.instantiate_at(element, name, &slice.wrapped_under(name), depth + 1))
            .collect::<InstantiateResult<Vec<_>>>()?;
        list.collect(elements)
    }

    fn instantiate_aggregate(
        &self,
        aggregate: &AggregateDesc,
        name: &str,
        parameters: &Parameters,
        depth: usize,
    ) -> InstantiateResult<Instance> {
        let scoped = parameters.scoped_to(name);
        let constructor = selector::choose(aggregate, &scoped)?;

        let unused = scoped.not_used_by(constructor);
        if !unused.is_empty() {
            debug!(
                binding = name,
                type_name = %aggregate.name,
                unused = unused.len(),
                "dropping parameters the constructor does not take"
            );
        }

        /* A chosen constructor with formals has every formal named */
        let arguments = constructor
            .formals()
            .iter()
            .map(|formal| {
                let formal_name = formal.name.as_deref().unwrap_or_default();
                self.instantiate_at(&formal.desc, formal_name, &scoped, depth + 1)
            })
            .collect::<InstantiateResult<Vec<_>>>()?;

        constructor.invoke(&aggregate.name, arguments)
    }
}

/// Split list parameters into one group per element.
///
/// Parameters are taken in order. A parameter closes the current group when
/// its (already scoped) name was seen in that group with a different value,
/// so `one=1, two=2, one=11, two=22` yields two groups. Scalar elements, and
/// aggregates built from a single scalar, get a group per parameter. Every element is expected to carry the same names:
/// an element that omits a field is merged into its neighbour.
pub fn element_slices(scoped: &Parameters, one_per_parameter: bool) -> Vec<Parameters> {
    let mut slices = Vec::new();
    let mut current = Parameters::empty();
    for parameter in scoped {
        let repeated = current.iter().any(|seen| {
            seen.name() == parameter.name() && seen.value() != parameter.value()
        });
        if (one_per_parameter && !current.is_empty()) || repeated {
            slices.push(std::mem::take(&mut current));
        }
        current.push(parameter.clone());
    }
    if !current.is_empty() {
        slices.push(current);
    }
    slices
}

/* Scalars, and aggregates whose every constructor takes exactly one scalar */
fn has_single_scalar_field(element: &TypeDesc) -> bool {
    let is_scalar =
        |desc: &TypeDesc| matches!(desc, TypeDesc::Primitive(_) | TypeDesc::Enumeration(_));
    match element {
        TypeDesc::Aggregate(aggregate) => {
            !aggregate.constructors.is_empty()
                && aggregate.constructors.iter().all(|constructor| {
                    matches!(constructor.formals(), [formal] if is_scalar(&formal.desc))
                })
        }
        other => is_scalar(other),
    }
}

fn missing_witness(type_name: String, parameters: &Parameters) -> InstantiateError {
    InstantiateError::NoConstructorFound {
        type_name,
        available: parameters
            .first_components()
            .into_iter()
            .map(str::to_string)
            .collect(),
        candidates: Vec::new(),
    }
}
