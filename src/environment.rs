//! Environments for Vanara
//!
//! Lexical frames mapping names to values, linked to an outer frame.
//! Environments live in an arena and are addressed by `EnvId` handles:
//! a function value points back into its defining environment with a
//! plain index, so `let f = fn() { f() }` cannot form a refcount cycle.

use std::collections::HashSet;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::value::{HashPair, Value};

/// A handle to an environment slot in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnvId(usize);

/// A single lexical frame
#[derive(Debug, Default)]
struct Environment {
    bindings: FxHashMap<String, Value>,
    outer: Option<EnvId>,
}

/// Arena of environments with a free list and mark/sweep collection
#[derive(Debug, Default)]
pub struct EnvArena {
    slots: Vec<Option<Environment>>,
    free: Vec<usize>,
}

impl EnvArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh top-level environment
    pub fn alloc(&mut self) -> EnvId {
        self.insert(Environment::default())
    }

    /// Allocate an environment enclosed by `outer`, used for each
    /// function invocation and for `require`
    pub fn alloc_enclosed(&mut self, outer: EnvId) -> EnvId {
        self.insert(Environment {
            bindings: FxHashMap::default(),
            outer: Some(outer),
        })
    }

    fn insert(&mut self, env: Environment) -> EnvId {
        if let Some(index) = self.free.pop() {
            self.slots[index] = Some(env);
            EnvId(index)
        } else {
            self.slots.push(Some(env));
            EnvId(self.slots.len() - 1)
        }
    }

    fn env(&self, id: EnvId) -> &Environment {
        self.slots[id.0]
            .as_ref()
            .expect("use of a collected environment")
    }

    fn env_mut(&mut self, id: EnvId) -> &mut Environment {
        self.slots[id.0]
            .as_mut()
            .expect("use of a collected environment")
    }

    /// Look up a name, walking outward through enclosing frames
    pub fn get(&self, id: EnvId, name: &str) -> Option<Value> {
        let mut current = Some(id);

        while let Some(id) = current {
            let env = self.env(id);

            if let Some(value) = env.bindings.get(name) {
                return Some(value.clone());
            }

            current = env.outer;
        }

        None
    }

    /// Bind a name in the local frame only; enclosing frames are
    /// never written through
    pub fn set(&mut self, id: EnvId, name: impl Into<String>, value: Value) {
        self.env_mut(id).bindings.insert(name.into(), value);
    }

    /// The exported bindings of a frame: every name starting with an
    /// ASCII uppercase letter, as a hash of string key to value. Used by
    /// the module import system.
    pub fn exported_hash(&self, id: EnvId) -> Value {
        let mut pairs = FxHashMap::default();

        for (name, value) in &self.env(id).bindings {
            if name.starts_with(|c: char| c.is_ascii_uppercase()) {
                let key = Value::String(name.clone());
                let hashed = key.hash_key().expect("strings are hashable");

                pairs.insert(
                    hashed,
                    HashPair {
                        key,
                        value: value.clone(),
                    },
                );
            }
        }

        Value::hash(pairs)
    }

    /// Mark-and-sweep collection over environment slots.
    ///
    /// Marks the roots, their outer chains, and every environment
    /// reachable through binding values; sweeps the rest into the free
    /// list. Callers must root every environment still referenced by a
    /// live handle or value.
    pub fn collect(&mut self, roots: &[EnvId]) {
        let mut marked = vec![false; self.slots.len()];
        let mut pending: Vec<EnvId> = roots.to_vec();
        // guards against cycles through arrays/hashes that contain themselves
        let mut seen_objects = HashSet::new();

        while let Some(id) = pending.pop() {
            if marked[id.0] {
                continue;
            }

            marked[id.0] = true;

            let Some(env) = self.slots[id.0].as_ref() else {
                continue;
            };

            if let Some(outer) = env.outer {
                pending.push(outer);
            }

            for value in env.bindings.values() {
                trace_value(value, &mut pending, &mut seen_objects);
            }
        }

        for (index, slot) in self.slots.iter_mut().enumerate() {
            if !marked[index] && slot.is_some() {
                *slot = None;
                self.free.push(index);
            }
        }
    }

    /// Number of live environments, for tests and diagnostics
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}

/// Push every environment reachable from `value` onto `pending`
fn trace_value(value: &Value, pending: &mut Vec<EnvId>, seen_objects: &mut HashSet<usize>) {
    match value {
        Value::Function(function) => pending.push(function.env),
        Value::Array(elements) => {
            if seen_objects.insert(Rc::as_ptr(elements) as usize) {
                for element in elements.borrow().iter() {
                    trace_value(element, pending, seen_objects);
                }
            }
        }
        Value::Hash(pairs) => {
            if seen_objects.insert(Rc::as_ptr(pairs) as usize) {
                for pair in pairs.borrow().values() {
                    trace_value(&pair.key, pending, seen_objects);
                    trace_value(&pair.value, pending, seen_objects);
                }
            }
        }
        Value::Return(inner) => trace_value(inner, pending, seen_objects),
        _ => {}
    }
}
