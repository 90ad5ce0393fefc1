//! Ordered parameter registry filled in by a script's init phase.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ParameterValidationError, ParseResult, ValidationResult};
use crate::kind::ParameterKind;
use crate::source::ValueSource;
use crate::value::Value;

/// A named parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    kind: ParameterKind,
}

impl Parameter {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ParameterKind {
        &self.kind
    }

    pub fn default_value(&self) -> Value {
        self.kind.default_value()
    }

    /// Parses override text for this parameter.
    pub fn parse_text(&self, text: &str) -> ParseResult<Value> {
        self.kind.parse_text(&self.name, text)
    }

    /// Override text for `value`; the inverse of [`Parameter::parse_text`].
    pub fn format_text(&self, value: &Value) -> String {
        self.kind.format_text(value)
    }
}

/// Advisory output size declared by the script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

/// Parameters in definition order plus the declared resolution.
///
/// A fresh group is built on every script load; nothing carries over.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterGroup {
    params: Vec<Parameter>,
    resolution: Resolution,
}

impl ParameterGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a parameter. A duplicate name is rejected and the first
    /// definition is kept.
    pub fn define(
        &mut self,
        name: impl Into<String>,
        kind: ParameterKind,
    ) -> ValidationResult<()> {
        let name = name.into();
        if self.get(&name).is_some() {
            return Err(ParameterValidationError::Duplicate(name));
        }
        kind.validate()?;
        debug!(parameter = %name, kind = kind.type_name(), "defined parameter");
        self.params.push(Parameter { name, kind });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|p| p.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn set_resolution(&mut self, width: i64, height: i64) -> ValidationResult<()> {
        let bad = || ParameterValidationError::BadResolution { width, height };
        let w = u32::try_from(width).ok().filter(|w| *w > 0).ok_or_else(bad)?;
        let h = u32::try_from(height).ok().filter(|h| *h > 0).ok_or_else(bad)?;
        self.resolution = Resolution {
            width: w,
            height: h,
        };
        Ok(())
    }

    /// Resolves every parameter through `source`.
    ///
    /// The first failing parameter aborts the whole pass.
    pub fn values(&self, source: &dyn ValueSource) -> ParseResult<ParameterValues> {
        self.params
            .iter()
            .map(|p| Ok((p.name.clone(), source.resolve(p)?)))
            .collect::<ParseResult<Vec<_>>>()
            .map(ParameterValues)
    }

    pub fn defaults(&self) -> ParameterValues {
        ParameterValues(
            self.params
                .iter()
                .map(|p| (p.name.clone(), p.default_value()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a ParameterGroup {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

/// Name to value snapshot for one frame, in definition order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterValues(Vec<(String, Value)>);

impl ParameterValues {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for ParameterValues {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
