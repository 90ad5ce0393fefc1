//! Backends that produce a parameter's current value.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::ParseResult;
use crate::group::Parameter;
use crate::value::Value;

pub trait ValueSource {
    /// Current value of `param`, or its default when the source has none.
    fn resolve(&self, param: &Parameter) -> ParseResult<Value>;
}

/// Always yields the declared defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct Defaults;

impl ValueSource for Defaults {
    fn resolve(&self, param: &Parameter) -> ParseResult<Value> {
        Ok(param.default_value())
    }
}

type Lookup = Box<dyn Fn(&str) -> Option<String>>;

/// Key/value text source; present entries are parsed with the
/// parameter's own grammar.
pub struct TextSource {
    lookup: Lookup,
}

impl TextSource {
    pub fn new(lookup: impl Fn(&str) -> Option<String> + 'static) -> Self {
        Self {
            lookup: Box::new(lookup),
        }
    }

    /// Reads overrides from the process environment.
    pub fn from_env() -> Self {
        Self::new(|name| std::env::var(name).ok())
    }

    pub fn from_map(map: HashMap<String, String>) -> Self {
        Self::new(move |name| map.get(name).cloned())
    }

    /// Consults `overrides` first, then this source.
    pub fn with_overrides(self, overrides: HashMap<String, String>) -> Self {
        let fallback = self.lookup;
        Self::new(move |name| overrides.get(name).cloned().or_else(|| fallback(name)))
    }

    pub fn lookup(&self, name: &str) -> Option<String> {
        (self.lookup)(name)
    }
}

impl std::fmt::Debug for TextSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextSource").finish_non_exhaustive()
    }
}

impl ValueSource for TextSource {
    fn resolve(&self, param: &Parameter) -> ParseResult<Value> {
        match self.lookup(param.name()) {
            Some(text) => param.parse_text(&text),
            None => Ok(param.default_value()),
        }
    }
}

/// Values pushed by interactive widgets.
///
/// Cloning shares the store. A parameter whose widget never reported a
/// value resolves to its default.
#[derive(Debug, Clone, Default)]
pub struct LiveValues {
    values: Rc<RefCell<HashMap<String, Value>>>,
}

impl LiveValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.values.borrow_mut().insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.values.borrow().get(name).cloned()
    }

    pub fn remove(&self, name: &str) -> Option<Value> {
        self.values.borrow_mut().remove(name)
    }

    /// Forgets every widget value; used when the parameter group is rebuilt.
    pub fn clear(&self) {
        self.values.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }
}

impl ValueSource for LiveValues {
    fn resolve(&self, param: &Parameter) -> ParseResult<Value> {
        Ok(self
            .get(param.name())
            .unwrap_or_else(|| param.default_value()))
    }
}
