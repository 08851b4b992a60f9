/* Constructor selection by formal-name coverage */

use crate::constructor::ClassConstructor;
use crate::errors::{InstantiateError, InstantiateResult};
use crate::parameters::Parameters;
use crate::target::AggregateDesc;
use std::collections::BTreeSet;
use tracing::debug;

/// Whether `constructor` can be fed from parameters whose first components are `available`.
///
/// Every formal must be named and witnessed. A zero-argument constructor only
/// qualifies when nothing at all was supplied for the target.
pub fn is_applicable(constructor: &ClassConstructor, available: &BTreeSet<&str>) -> bool {
    if constructor.arity() == 0 {
        return available.is_empty();
    }
    constructor.is_fully_named()
        && constructor
            .formal_names()
            .all(|name| available.contains(name))
}

/// Pick the applicable constructor with the most formals; ties go to the
/// earliest declared. A parameter naming the aggregate itself (an empty
/// scoped name) witnesses no formal.
pub fn choose<'a>(
    aggregate: &'a AggregateDesc,
    scoped: &Parameters,
) -> InstantiateResult<&'a ClassConstructor> {
    /* A whole-name value addresses the aggregate itself, not one of its formals */
    let available: BTreeSet<&str> = scoped
        .first_components()
        .into_iter()
        .filter(|component| !component.is_empty())
        .collect();

    let mut chosen: Option<&ClassConstructor> = None;
    for constructor in &aggregate.constructors {
        if !is_applicable(constructor, &available) {
            continue;
        }
        if chosen.map_or(true, |best| constructor.arity() > best.arity()) {
            chosen = Some(constructor);
        }
    }

    match chosen {
        Some(constructor) => {
            debug!(
                type_name = %aggregate.name,
                signature = %constructor.signature(),
                "selected constructor"
            );
            Ok(constructor)
        }
        None => Err(InstantiateError::NoConstructorFound {
            type_name: aggregate.name.clone(),
            available: available.iter().map(|name| name.to_string()).collect(),
            candidates: aggregate
                .constructors
                .iter()
                .map(ClassConstructor::signature)
                .collect(),
        }),
    }
}
