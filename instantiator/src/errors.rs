use thiserror::Error;

/// Boxed error type returned by user-supplied constructor bodies.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used across the instantiation engine.
pub type InstantiateResult<T> = Result<T, InstantiateError>;

/// Errors produced while turning a parameter bag into an object graph.
#[derive(Debug, Error)]
pub enum InstantiateError {
    /// Target type cannot be instantiated (interface, abstract, uninhabited or raw list).
    #[error("cannot instantiate '{type_name}' bound to '{target}': {reason}")]
    InvalidType {
        type_name: String,
        target: String,
        reason: String,
    },

    /// No constructor had every formal argument witnessed by the parameters.
    #[error("no constructor of '{type_name}' matches {available:?}; candidates: {candidates:?}")]
    NoConstructorFound {
        type_name: String,
        available: Vec<String>,
        candidates: Vec<String>,
    },

    /// A textual value could not be decoded into the requested scalar.
    #[error("cannot convert '{value}' bound to '{target}' into {type_name}: {reason}")]
    ConversionFailed {
        type_name: String,
        target: String,
        value: String,
        reason: String,
    },

    /// More than one parameter claims to be the value of a primitive target.
    #[error("parameter '{name}' is ambiguous: {candidates:?}")]
    AmbiguousParameter {
        name: String,
        candidates: Vec<String>,
    },

    /// A user constructor returned an error.
    #[error("constructor {signature} of '{type_name}' failed: {source}")]
    ConstructorThrew {
        type_name: String,
        signature: String,
        #[source]
        source: BoxError,
    },

    /// Parameter or target name does not follow the dotted identifier syntax.
    #[error("invalid parameter name '{name}': {reason}")]
    InvalidParameterName { name: String, reason: &'static str },

    /// A type-erased instance did not hold the requested type.
    #[error("expected a value of type {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// Recursion went deeper than the configured limit.
    #[error("instantiating '{target}' exceeded the maximum depth of {max_depth}")]
    DepthExceeded { target: String, max_depth: usize },
}

/// Errors produced while loading a type schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read schema: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse schema: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("malformed type expression '{expr}'")]
    MalformedType { expr: String },

    #[error("type '{type_name}' referenced by '{owner}' is not defined")]
    UnknownType { type_name: String, owner: String },

    #[error("type '{type_name}' is defined more than once")]
    DuplicateType { type_name: String },

    #[error("type '{type_name}' refers to itself through {path:?}")]
    Cycle { type_name: String, path: Vec<String> },

    #[error("record '{type_name}' declares no constructors")]
    NoConstructors { type_name: String },

    #[error("enum '{type_name}' declares no variants")]
    NoVariants { type_name: String },

    #[error("invalid argument name in '{type_name}': {source}")]
    ArgumentName {
        type_name: String,
        #[source]
        source: InstantiateError,
    },
}
