/* Parameter bags and the dotted-prefix scoping algebra */

use crate::constructor::ClassConstructor;
use crate::errors::{InstantiateError, InstantiateResult};
use crate::target::Target;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A single `dotted.name = value` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Parameter {
    name: String,
    value: String,
}

impl Parameter {
    /// Build without validating the name.
    ///
    /// The caller must pass a well-formed dotted name (see [`Parameter::parse_name`]);
    /// names from untrusted input go through [`Parameter::try_new`] or `FromStr`.
    /// The only malformed name the engine itself produces is the empty name of a
    /// whole-name match after scoping.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /* Build after checking the name against the wire syntax */
    pub fn try_new(name: impl Into<String>, value: impl Into<String>) -> InstantiateResult<Self> {
        let name = name.into();
        Self::parse_name(&name)?;
        Ok(Self::new(name, value))
    }

    /* Check `a.b.c` syntax: identifier components, no empty ones */
    pub fn parse_name(name: &str) -> InstantiateResult<()> {
        if name.is_empty() {
            return Err(InstantiateError::InvalidParameterName {
                name: name.to_string(),
                reason: "name is empty",
            });
        }
        for component in name.split('.') {
            validate_component(component).map_err(|reason| {
                InstantiateError::InvalidParameterName {
                    name: name.to_string(),
                    reason,
                }
            })?;
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn first_component(&self) -> &str {
        first_component(&self.name)
    }

    pub fn stripped_of_first_component(&self) -> &str {
        stripped_of_first_component(&self.name)
    }

    /* Same value, name without its first component */
    fn strip(&self) -> Self {
        Self::new(self.stripped_of_first_component(), self.value.clone())
    }

    /* Same value, name pushed one level down under `prefix` */
    fn wrap(&self, prefix: &str) -> Self {
        if self.name.is_empty() {
            Self::new(prefix, self.value.clone())
        } else {
            Self::new(format!("{prefix}.{}", self.name), self.value.clone())
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/* `name=value`; the value is everything after the first `=` */
impl FromStr for Parameter {
    type Err = InstantiateError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let (name, value) = line
            .split_once('=')
            .ok_or_else(|| InstantiateError::InvalidParameterName {
                name: line.to_string(),
                reason: "expected 'name=value'",
            })?;
        Self::try_new(name.trim(), value)
    }
}

pub fn first_component(name: &str) -> &str {
    name.split_once('.').map_or(name, |(first, _)| first)
}

pub fn stripped_of_first_component(name: &str) -> &str {
    name.split_once('.').map_or("", |(_, rest)| rest)
}

/* `[A-Za-z_][A-Za-z0-9_]*` */
pub(crate) fn validate_component(component: &str) -> Result<(), &'static str> {
    let mut chars = component.chars();
    match chars.next() {
        None => Err("empty name component"),
        Some(c) if !(c.is_ascii_alphabetic() || c == '_') => {
            Err("components must start with a letter or '_'")
        }
        Some(_) if chars.all(|c| c.is_ascii_alphanumeric() || c == '_') => Ok(()),
        Some(_) => Err("components may only contain letters, digits and '_'"),
    }
}

/// An insertion-ordered multiset of parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    parameters: Vec<Parameter>,
}

impl Parameters {
    pub fn new(parameters: Vec<Parameter>) -> Self {
        Self { parameters }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn parameters_list(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.parameters.iter()
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn push(&mut self, parameter: Parameter) {
        self.parameters.push(parameter);
    }

    /// The parameter that holds the value of `target` itself.
    ///
    /// A primitive target is addressed either by its bare name or by a single
    /// parameter under its prefix. Repeated bare names are tolerated only when
    /// they agree on the value.
    pub fn named_after<T>(&self, target: &Target<T>) -> InstantiateResult<Option<&Parameter>> {
        self.named(target.name())
    }

    pub(crate) fn named(&self, name: &str) -> InstantiateResult<Option<&Parameter>> {
        let matching: Vec<&Parameter> = self
            .parameters
            .iter()
            .filter(|parameter| parameter.first_component() == name)
            .collect();

        match matching.as_slice() {
            [] => Ok(None),
            [single] => Ok(Some(*single)),
            [first, rest @ ..] => {
                let all_whole = matching.iter().all(|parameter| parameter.name() == name);
                if all_whole && rest.iter().all(|parameter| parameter.value() == first.value()) {
                    Ok(Some(*first))
                } else {
                    Err(InstantiateError::AmbiguousParameter {
                        name: name.to_string(),
                        candidates: matching
                            .iter()
                            .map(|parameter| parameter.to_string())
                            .collect(),
                    })
                }
            }
        }
    }

    /* Parameters under `target`'s prefix with that prefix removed */
    pub fn for_target<T>(&self, target: &Target<T>) -> Parameters {
        self.scoped_to(target.name())
    }

    pub(crate) fn scoped_to(&self, name: &str) -> Parameters {
        self.parameters
            .iter()
            .filter(|parameter| parameter.first_component() == name)
            .map(Parameter::strip)
            .collect()
    }

    /* Parameters whose first component is not one of the constructor's formals */
    pub fn not_used_by(&self, constructor: &ClassConstructor) -> Parameters {
        let used: BTreeSet<&str> = constructor.formal_names().collect();
        self.parameters
            .iter()
            .filter(|parameter| !used.contains(parameter.first_component()))
            .cloned()
            .collect()
    }

    /* Distinct first components, in order of first appearance */
    pub fn first_components(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.parameters
            .iter()
            .map(Parameter::first_component)
            .filter(|component| seen.insert(*component))
            .collect()
    }

    /* Inverse of scoping: push every name one level down under `prefix` */
    pub fn wrapped_under(&self, prefix: &str) -> Parameters {
        self.parameters
            .iter()
            .map(|parameter| parameter.wrap(prefix))
            .collect()
    }
}

impl FromIterator<Parameter> for Parameters {
    fn from_iter<I: IntoIterator<Item = Parameter>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for Parameters {
    type Item = Parameter;
    type IntoIter = std::vec::IntoIter<Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.parameters.into_iter()
    }
}

impl<'a> IntoIterator for &'a Parameters {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.parameters.iter()
    }
}

impl From<Vec<Parameter>> for Parameters {
    fn from(parameters: Vec<Parameter>) -> Self {
        Self::new(parameters)
    }
}

impl From<Parameter> for Parameters {
    fn from(parameter: Parameter) -> Self {
        Self::new(vec![parameter])
    }
}

impl<const N: usize> From<[Parameter; N]> for Parameters {
    fn from(parameters: [Parameter; N]) -> Self {
        Self::new(parameters.into())
    }
}

impl From<&[Parameter]> for Parameters {
    fn from(parameters: &[Parameter]) -> Self {
        Self::new(parameters.to_vec())
    }
}

impl From<&Parameters> for Parameters {
    fn from(parameters: &Parameters) -> Self {
        parameters.clone()
    }
}
