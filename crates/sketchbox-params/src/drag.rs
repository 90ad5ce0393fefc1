//! Drag-driven updates for continuous parameters.

use sketchbox_core::{CursorState, ValueTarget};

use crate::group::Parameter;
use crate::kind::{wrap_angle, ParameterKind};
use crate::source::LiveValues;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragRule {
    /// Angle of the pointer about the widget's local origin.
    Angle,
    /// `cached - rate * vertical displacement`, unbounded.
    Infinite { rate: f64 },
}

impl DragRule {
    pub fn for_kind(kind: &ParameterKind) -> Option<DragRule> {
        match kind {
            ParameterKind::Angle { .. } => Some(DragRule::Angle),
            ParameterKind::Infinite { rate, .. } => Some(DragRule::Infinite { rate: *rate }),
            _ => None,
        }
    }

    /// New value from the value cached at drag-begin and the cursor.
    /// Cursor positions are relative to the widget center.
    pub fn apply(&self, cached: f64, cursor: &CursorState) -> f64 {
        match self {
            DragRule::Angle => wrap_angle(cursor.pos().angle()),
            DragRule::Infinite { rate } => cached - rate * cursor.rel().y,
        }
    }
}

type ChangeHook = Box<dyn FnMut(f64)>;

/// Binds one Angle or Infinite parameter to a drag gesture, writing
/// into a shared [`LiveValues`] store.
pub struct ParameterDrag {
    name: String,
    rule: DragRule,
    default: f64,
    cached: f64,
    live: LiveValues,
    on_change: Option<ChangeHook>,
}

impl ParameterDrag {
    /// `None` unless the parameter has a drag rule.
    pub fn new(param: &Parameter, live: LiveValues) -> Option<Self> {
        let rule = DragRule::for_kind(param.kind())?;
        let default = param.default_value().as_number()?;
        Some(Self {
            name: param.name().to_string(),
            rule,
            default,
            cached: default,
            live,
            on_change: None,
        })
    }

    /// Called with every new value, after the store is updated.
    pub fn on_change(mut self, hook: impl FnMut(f64) + 'static) -> Self {
        self.on_change = Some(Box::new(hook));
        self
    }

    pub fn rule(&self) -> DragRule {
        self.rule
    }

    pub fn current(&self) -> f64 {
        self.live
            .get(&self.name)
            .and_then(|v| v.as_number())
            .unwrap_or(self.default)
    }
}

impl ValueTarget for ParameterDrag {
    fn begin(&mut self, _cursor: &CursorState) {
        self.cached = self.current();
    }

    fn update_value(&mut self, cursor: &CursorState) {
        let value = self.rule.apply(self.cached, cursor);
        self.live.set(self.name.clone(), Value::Number(value));
        if let Some(hook) = self.on_change.as_mut() {
            hook(value);
        }
    }
}
