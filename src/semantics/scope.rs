use std::collections::HashMap;

use super::{
    diagnostics::{Diagnostics, SemanticError},
    types::TypeDescriptor,
};

/// One level of name bindings. Insertion order is irrelevant; only
/// resolved descriptors are ever stored here.
pub type Scope = HashMap<String, TypeDescriptor>;

/// The nested sequence of active scopes, innermost last.
///
/// Created empty at the start of a pass; after a full crate pass every
/// `enter` has been matched by a `leave` and the stack is empty again.
#[derive(Debug, Default)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    pub fn new() -> Self {
        ScopeStack::default()
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn enter(&mut self, diags: &mut Diagnostics) {
        self.scopes.push(Scope::new());
        diags.info(format!("Entering scope {}...", self.scopes.len()));
    }

    pub fn leave(&mut self, diags: &mut Diagnostics) {
        diags.info(format!("Leaving scope {}...", self.scopes.len()));
        self.scopes.pop();
    }

    /// Installs `name` in the innermost scope.
    ///
    /// A duplicate in the innermost scope is an ERROR; a binding already
    /// present in an enclosing scope is a WARN per enclosing occurrence.
    /// The binding is installed in all cases.
    pub fn declare(&mut self, name: &str, descriptor: TypeDescriptor, diags: &mut Diagnostics) {
        let depth = self.scopes.len();
        diags.info(format!(
            "{{Scope {}}} Declaring var {} {}...",
            depth, name, descriptor
        ));

        let innermost_has = self
            .scopes
            .last()
            .map(|scope| scope.contains_key(name))
            .unwrap_or(false);

        if innermost_has {
            diags.error(SemanticError::Redefinition {
                name: name.to_string(),
                scope: depth,
            });
        } else {
            for i in (0..depth.saturating_sub(1)).rev() {
                if let Some(earlier) = self.scopes[i].get(name) {
                    diags.warn(SemanticError::Shadowing {
                        name: name.to_string(),
                        scope: depth,
                        earlier: i + 1,
                        descriptor: earlier.to_string(),
                    });
                }
            }
        }

        self.scopes
            .last_mut()
            .expect("declare called with no open scope")
            .insert(name.to_string(), descriptor);
    }

    /// Searches innermost to outermost; absence is a normal return
    /// value, the caller decides whether it is an error.
    pub fn lookup(&self, name: &str) -> Option<&TypeDescriptor> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }
}
