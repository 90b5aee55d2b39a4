// ABOUTME: Environment: a flat name-to-value map with the call-frame and
// loop-snapshot operations the evaluator builds scoping from

use std::collections::HashMap;

use crate::value::Value;

/// A scope frame. Lookups never fall through to an enclosing frame;
/// instead, loops clone the frame per iteration and reconcile updates
/// back, and calls extend a frame that carries only function bindings.
/// This gives block-local mutation that flows outward at iteration
/// boundaries while keeping caller locals invisible to callees.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    bindings: HashMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            bindings: HashMap::new(),
        }
    }

    /// Unconditional write into this frame.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    /// Lookup in this frame only.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// A fresh frame for a call, carrying only the function bindings of
    /// this one. Functions see other functions, never their caller's
    /// locals.
    pub fn extend_for_call(&self) -> Environment {
        let bindings = self
            .bindings
            .iter()
            .filter(|(_, value)| matches!(value, Value::Function { .. }))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        Environment { bindings }
    }

    /// Imports updated bindings from a child frame, for names this frame
    /// already holds. Names the child introduced stay in the child.
    pub fn reconcile(&mut self, child: &Environment) {
        for (name, value) in &mut self.bindings {
            if let Some(updated) = child.bindings.get(name) {
                *value = updated.clone();
            }
        }
    }
}
