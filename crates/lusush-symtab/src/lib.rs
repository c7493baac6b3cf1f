//! Scoped variable storage, per spec.md §3 and §4.6.
//!
//! A [`SymbolTable`] is a stack of lexically nested [`Scope`]s. Only the top
//! scope may be pushed or popped; the global scope (index 0) is created once
//! and never popped. Lookup walks from the top of the stack to the global
//! scope and returns the nearest binding that isn't [`unset`](SymbolTable::unset).

use lusush_error::ParseError;
use std::collections::HashMap;

/// Classification of a scope, used by `local` and for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Function,
    Loop,
    Subshell,
    Conditional,
}

/// Mutability/visibility flags on a variable binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VarFlags {
    pub readonly: bool,
    pub exported: bool,
    pub local: bool,
    /// Set by `unset`. The binding is *not* removed (spec.md §3 invariant
    /// (e)); lookup treats an unset binding as a miss so a later `set`
    /// that shadows an outer scope doesn't have to special-case resurrection.
    pub unset: bool,
}

/// A variable binding: name, value, flags, and the scope depth it lives at.
#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub value: String,
    pub flags: VarFlags,
    pub scope_level: usize,
}

/// One lexically nested scope: a name -> binding map plus its [`ScopeKind`].
#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    /// Function/subshell name, for diagnostics; `None` for anonymous blocks.
    pub name: Option<String>,
    bindings: HashMap<String, Variable>,
}

impl Scope {
    fn new(kind: ScopeKind, name: Option<String>) -> Self {
        Scope {
            kind,
            name,
            bindings: HashMap::new(),
        }
    }
}

/// The scope stack. `scopes[0]` is the global scope and is never popped.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            scopes: vec![Scope::new(ScopeKind::Global, None)],
        }
    }

    /// Push a new top scope. Invariant (a): only the top may subsequently
    /// be popped, enforced structurally — there is no way to address an
    /// inner scope except as the current top.
    pub fn push_scope(&mut self, kind: ScopeKind, name: Option<String>) {
        self.scopes.push(Scope::new(kind, name));
    }

    /// Pop the top scope, releasing every binding it owns. No-op if only
    /// the global scope remains (invariant (b): the global scope is never
    /// popped).
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn current_scope_kind(&self) -> ScopeKind {
        self.top().kind
    }

    fn top(&self) -> &Scope {
        self.scopes.last().expect("global scope is never popped")
    }

    fn top_mut(&mut self) -> &mut Scope {
        self.scopes
            .last_mut()
            .expect("global scope is never popped")
    }

    /// Find the scope index (searching innermost-first) holding a *visible*
    /// (not unset) binding for `name`.
    fn find_visible(&self, name: &str) -> Option<usize> {
        self.scopes
            .iter()
            .enumerate()
            .rev()
            .find_map(|(idx, scope)| {
                scope
                    .bindings
                    .get(name)
                    .filter(|v| !v.flags.unset)
                    .map(|_| idx)
            })
    }

    /// Lookup rule: walk parent links from the current scope; the first hit
    /// wins; UNSET bindings are treated as absent.
    pub fn get(&self, name: &str) -> Option<&Variable> {
        let idx = self.find_visible(name)?;
        self.scopes[idx].bindings.get(name)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Update the nearest existing binding for `name`, or create one in the
    /// current scope if none exists anywhere in the chain. Rejects
    /// assignment to a READONLY variable.
    pub fn set(
        &mut self,
        name: &str,
        value: impl Into<String>,
        flags: VarFlags,
    ) -> Result<(), ParseError> {
        if let Some(existing) = self.get(name) {
            if existing.flags.readonly {
                return Err(ParseError::ReadonlyViolation {
                    name: name.to_string(),
                });
            }
            let idx = self
                .find_visible(name)
                .expect("get() just found this binding");
            let var = self.scopes[idx]
                .bindings
                .get_mut(name)
                .expect("binding located by find_visible");
            var.value = value.into();
            var.flags = flags;
            var.scope_level = idx;
            return Ok(());
        }
        self.insert_in_current(name, value, flags)
    }

    /// Always create or update the binding in the *current* scope,
    /// regardless of whether an outer scope already has one — the
    /// semantics `local` needs.
    pub fn set_local(&mut self, name: &str, value: impl Into<String>) -> Result<(), ParseError> {
        let mut flags = VarFlags {
            local: true,
            ..VarFlags::default()
        };
        if let Some(existing) = self.top().bindings.get(name) {
            if existing.flags.readonly {
                return Err(ParseError::ReadonlyViolation {
                    name: name.to_string(),
                });
            }
            flags.exported = existing.flags.exported;
        }
        self.insert_in_current(name, value, flags)
    }

    /// Always create or update the binding in the global scope.
    pub fn set_global(&mut self, name: &str, value: impl Into<String>) -> Result<(), ParseError> {
        if let Some(existing) = self.scopes[0].bindings.get(name) {
            if existing.flags.readonly {
                return Err(ParseError::ReadonlyViolation {
                    name: name.to_string(),
                });
            }
        }
        self.scopes[0].bindings.insert(
            name.to_string(),
            Variable {
                name: name.to_string(),
                value: value.into(),
                flags: VarFlags::default(),
                scope_level: 0,
            },
        );
        Ok(())
    }

    fn insert_in_current(
        &mut self,
        name: &str,
        value: impl Into<String>,
        flags: VarFlags,
    ) -> Result<(), ParseError> {
        let level = self.scopes.len() - 1;
        self.top_mut().bindings.insert(
            name.to_string(),
            Variable {
                name: name.to_string(),
                value: value.into(),
                flags,
                scope_level: level,
            },
        );
        Ok(())
    }

    /// Mark the nearest binding UNSET without removing it (invariant (e)).
    /// A no-op if no binding is visible.
    pub fn unset(&mut self, name: &str) {
        if let Some(idx) = self.find_visible(name) {
            if let Some(var) = self.scopes[idx].bindings.get_mut(name) {
                var.flags.unset = true;
            }
        }
    }

    /// Mark a binding for inclusion in the child-process environment,
    /// without changing its value. Auto-vivifies as empty if unset.
    pub fn export(&mut self, name: &str) {
        if let Some(idx) = self.find_visible(name) {
            if let Some(var) = self.scopes[idx].bindings.get_mut(name) {
                var.flags.exported = true;
                return;
            }
        }
        let flags = VarFlags {
            exported: true,
            ..VarFlags::default()
        };
        let _ = self.insert_in_current(name, String::new(), flags);
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_monotonicity_across_scope_push_pop() {
        let mut table = SymbolTable::new();
        table.set("x", "1", VarFlags::default()).unwrap();
        let before = table.get("x").unwrap().value.clone();
        table.push_scope(ScopeKind::Function, Some("f".into()));
        table.set_local("y", "2").unwrap();
        table.pop_scope();
        let after = table.get("x").unwrap().value.clone();
        assert_eq!(before, after);
        assert!(!table.exists("y"));
    }

    #[test]
    fn set_updates_parent_binding_unless_local() {
        let mut table = SymbolTable::new();
        table.set_global("g", "outer").unwrap();
        table.push_scope(ScopeKind::Function, None);
        table.set("g", "inner", VarFlags::default()).unwrap();
        assert_eq!(table.get("g").unwrap().value, "inner");
        table.pop_scope();
        assert_eq!(table.get("g").unwrap().value, "inner");
    }

    #[test]
    fn set_local_always_shadows_current_scope() {
        let mut table = SymbolTable::new();
        table.set_global("g", "outer").unwrap();
        table.push_scope(ScopeKind::Function, None);
        table.set_local("g", "shadow").unwrap();
        assert_eq!(table.get("g").unwrap().value, "shadow");
        table.pop_scope();
        assert_eq!(table.get("g").unwrap().value, "outer");
    }

    #[test]
    fn readonly_rejects_assignment() {
        let mut table = SymbolTable::new();
        table
            .set(
                "r",
                "1",
                VarFlags {
                    readonly: true,
                    ..Default::default()
                },
            )
            .unwrap();
        let err = table.set("r", "2", VarFlags::default()).unwrap_err();
        assert!(matches!(err, ParseError::ReadonlyViolation { .. }));
        assert_eq!(table.get("r").unwrap().value, "1");
    }

    #[test]
    fn unset_hides_without_removing() {
        let mut table = SymbolTable::new();
        table.set("x", "1", VarFlags::default()).unwrap();
        table.unset("x");
        assert!(!table.exists("x"));
        table.set("x", "2", VarFlags::default()).unwrap();
        assert_eq!(table.get("x").unwrap().value, "2");
    }

    #[test]
    fn global_scope_never_pops() {
        let mut table = SymbolTable::new();
        table.pop_scope();
        assert_eq!(table.depth(), 1);
    }
}
