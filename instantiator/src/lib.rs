/* Object-graph instantiation library
 *
 * Builds statically typed object trees from flat `dotted.path=value`
 * parameter bags by recursively choosing and invoking constructors on
 * described types.
 */

pub mod constructor;
pub mod errors;
pub mod instantiator;
pub mod parameters;
pub mod primitive;
pub mod registry;
pub mod schema;
pub mod selector;
pub mod target;
pub mod value;

pub use constructor::{Arguments, ClassConstructor, Formal, Instance};
pub use errors::{BoxError, InstantiateError, InstantiateResult, SchemaError};
pub use instantiator::{Instantiator, InstantiatorConfig};
pub use parameters::{Parameter, Parameters};
pub use primitive::{PrimitiveKind, PrimitiveType, PrimitiveValue};
pub use registry::{Describe, Scalar, TypeRegistry};
pub use schema::Schema;
pub use target::{Classification, Target, TypeDesc};
pub use value::Value;
