use crate::model::{InsnRef, Scope};
use crate::state::ReachabilityStore;
use tracing::debug;

/// Re-derives the "referenced by current code" flag from instruction bodies
///
/// Every invocation first clears the flag on all elements and then recomputes
/// it from scratch. Code shrinks over the pipeline's lifetime, so the flag
/// must reflect only the current code shape; a stale flag would block later
/// correct deletions. Two consecutive runs with no intervening code mutation
/// yield identical flags. The `&mut` store borrow keeps readers out while a
/// recompute is in flight.
pub struct CodeUsageScanner;

impl CodeUsageScanner {
    pub fn new() -> Self {
        Self
    }

    /// Recompute usage flags for the whole scope
    pub fn recompute(&self, scope: &Scope, store: &mut ReachabilityStore) {
        store.clear_code_usage();

        let mut marked = 0usize;
        for (_, method) in scope.methods() {
            let Some(body) = &method.body else {
                continue;
            };
            for insn_ref in &body.refs {
                marked += self.mark(insn_ref, scope, store);
            }
        }

        debug!("Code-usage scan marked {} references", marked);
    }

    /// Mark the element a single instruction reference resolves to
    ///
    /// References to classes outside the scope resolve to nothing and are
    /// ignored. Method references do not distinguish overloads, so every
    /// same-named method on the class is marked.
    fn mark(&self, insn_ref: &InsnRef, scope: &Scope, store: &mut ReachabilityStore) -> usize {
        match insn_ref {
            InsnRef::Type(name) => {
                if let Some(class_id) = scope.resolve_class(name) {
                    store.state_mut(class_id).mark_referenced_by_code();
                    return 1;
                }
            }
            InsnRef::Field { class, name } => {
                if let Some(class_id) = scope.resolve_class(class) {
                    if let Some(field_id) = scope.find_field(class_id, name) {
                        store.state_mut(field_id).mark_referenced_by_code();
                        return 1;
                    }
                }
            }
            InsnRef::Method { class, name } => {
                if let Some(class_id) = scope.resolve_class(class) {
                    let methods = scope.find_methods(class_id, name);
                    let count = methods.len();
                    for method_id in methods {
                        store.state_mut(method_id).mark_referenced_by_code();
                    }
                    return count;
                }
            }
        }
        0
    }
}

impl Default for CodeUsageScanner {
    fn default() -> Self {
        Self::new()
    }
}
