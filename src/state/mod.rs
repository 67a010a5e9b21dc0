// Reachability state - some accessors reserved for future use
#![allow(dead_code)]

use crate::model::{ElementRef, Scope};

/// Per-element reachability flags
///
/// Stored bits are only ever set (monotone OR), so independent rules, the
/// mandatory-annotation set and the scanners can contribute in any order and
/// reach the same final state. The one exception is `referenced_by_code`,
/// which the code-usage scanner clears wholesale before each recompute.
///
/// Relaxations are tracked as a granted/withheld pair: a rule that grants
/// `keep` without a relaxation pins that relaxation off for everything it
/// matches. A member-level and a class-level rule that disagree therefore
/// resolve to the keep-favoring outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReachabilityState {
    keep: bool,
    allowshrinking_granted: bool,
    keep_without_shrinking: bool,
    allowobfuscation_granted: bool,
    keep_without_obfuscation: bool,
    no_optimizations: bool,
    assumenosideeffects: bool,
    is_serde: bool,
    is_blanket_names_kept: bool,
    referenced_by_code: bool,
}

/// The flags a keep rule grants to the elements it matches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Grants {
    pub keep: bool,
    pub allowshrinking: bool,
    pub allowobfuscation: bool,
    pub assumenosideeffects: bool,
}

impl ReachabilityState {
    /// Fold a rule's grants into this state
    pub(crate) fn apply_grants(&mut self, grants: &Grants) {
        if grants.keep {
            self.keep = true;
            if grants.allowshrinking {
                self.allowshrinking_granted = true;
            } else {
                self.keep_without_shrinking = true;
            }
            if grants.allowobfuscation {
                self.allowobfuscation_granted = true;
            } else {
                self.keep_without_obfuscation = true;
            }
        }
        if grants.assumenosideeffects {
            self.assumenosideeffects = true;
        }
    }

    /// Mark membership in a configured no-optimizations annotation type
    ///
    /// Dominates every rule outcome: the element stays kept with both
    /// relaxations off no matter what else matched it.
    pub(crate) fn mark_no_optimizations(&mut self) {
        self.no_optimizations = true;
    }

    /// Keep without relaxations (layout roots, platform roots)
    pub(crate) fn mark_keep(&mut self) {
        self.keep = true;
        self.keep_without_shrinking = true;
        self.keep_without_obfuscation = true;
    }

    pub(crate) fn mark_serde(&mut self) {
        self.is_serde = true;
    }

    pub(crate) fn mark_blanket_names_kept(&mut self) {
        self.is_blanket_names_kept = true;
    }

    pub(crate) fn mark_referenced_by_code(&mut self) {
        self.referenced_by_code = true;
    }

    pub(crate) fn clear_referenced_by_code(&mut self) {
        self.referenced_by_code = false;
    }

    /// Whether any keep source matched this element
    pub fn has_keep(&self) -> bool {
        self.keep || self.no_optimizations
    }

    /// Whether the element may be removed despite being kept
    pub fn allowshrinking(&self) -> bool {
        self.allowshrinking_granted && !self.keep_without_shrinking && !self.no_optimizations
    }

    /// Whether the element may be renamed despite being kept
    pub fn allowobfuscation(&self) -> bool {
        self.allowobfuscation_granted && !self.keep_without_obfuscation && !self.no_optimizations
    }

    /// Whether calls to this element may be elided when the result is unused
    pub fn assumenosideeffects(&self) -> bool {
        self.assumenosideeffects
    }

    pub fn is_serde(&self) -> bool {
        self.is_serde
    }

    pub fn is_blanket_names_kept(&self) -> bool {
        self.is_blanket_names_kept
    }

    /// Whether the current code shape references this element
    ///
    /// Tracked separately from `keep`: it reflects structural usage only and
    /// is rebuilt from scratch on every code-usage scan.
    pub fn referenced_by_code(&self) -> bool {
        self.referenced_by_code
    }

    pub fn can_delete(&self) -> bool {
        !self.has_keep()
    }

    pub fn can_rename(&self) -> bool {
        !self.has_keep() || self.allowobfuscation()
    }

    /// Renameability ignoring top-level blanket keepnames rules
    pub fn can_rename_if_ignoring_blanket_keepnames(&self) -> bool {
        self.can_rename() || self.is_blanket_names_kept
    }

    /// A root for reachability analysis: kept, and not shrinkable
    pub fn root(&self) -> bool {
        self.has_keep() && !self.allowshrinking()
    }
}

/// Flag storage for every element of one scope
///
/// Obtained from `RootSeeder::seed`, so holding a store means seeding has
/// happened. Access is O(1) by element id. Querying an id that does not
/// belong to the seeded scope is a pipeline-ordering bug and panics; it is
/// deliberately not a recoverable result. Callers resolve names to ids
/// through the scope first, which is where "no such element" surfaces.
#[derive(Debug)]
pub struct ReachabilityStore {
    classes: Vec<ReachabilityState>,
    methods: Vec<ReachabilityState>,
    fields: Vec<ReachabilityState>,
}

impl ReachabilityStore {
    /// Allocate an all-false state for every element in the scope
    pub(crate) fn new(scope: &Scope) -> Self {
        Self {
            classes: vec![ReachabilityState::default(); scope.class_count()],
            methods: vec![ReachabilityState::default(); scope.method_count()],
            fields: vec![ReachabilityState::default(); scope.field_count()],
        }
    }

    /// The state of an element
    pub fn state(&self, element: impl Into<ElementRef>) -> &ReachabilityState {
        match element.into() {
            ElementRef::Class(id) => &self.classes[id.index()],
            ElementRef::Method(id) => &self.methods[id.index()],
            ElementRef::Field(id) => &self.fields[id.index()],
        }
    }

    /// Writer access, restricted to the seeder and the scanners
    pub(crate) fn state_mut(&mut self, element: impl Into<ElementRef>) -> &mut ReachabilityState {
        match element.into() {
            ElementRef::Class(id) => &mut self.classes[id.index()],
            ElementRef::Method(id) => &mut self.methods[id.index()],
            ElementRef::Field(id) => &mut self.fields[id.index()],
        }
    }

    pub(crate) fn clear_code_usage(&mut self) {
        for state in self
            .classes
            .iter_mut()
            .chain(self.methods.iter_mut())
            .chain(self.fields.iter_mut())
        {
            state.clear_referenced_by_code();
        }
    }

    pub fn can_delete(&self, element: impl Into<ElementRef>) -> bool {
        self.state(element).can_delete()
    }

    pub fn can_rename(&self, element: impl Into<ElementRef>) -> bool {
        self.state(element).can_rename()
    }

    pub fn can_rename_if_ignoring_blanket_keepnames(
        &self,
        element: impl Into<ElementRef>,
    ) -> bool {
        self.state(element).can_rename_if_ignoring_blanket_keepnames()
    }

    pub fn has_keep(&self, element: impl Into<ElementRef>) -> bool {
        self.state(element).has_keep()
    }

    pub fn allowshrinking(&self, element: impl Into<ElementRef>) -> bool {
        self.state(element).allowshrinking()
    }

    pub fn allowobfuscation(&self, element: impl Into<ElementRef>) -> bool {
        self.state(element).allowobfuscation()
    }

    pub fn assumenosideeffects(&self, element: impl Into<ElementRef>) -> bool {
        self.state(element).assumenosideeffects()
    }

    pub fn is_serde(&self, element: impl Into<ElementRef>) -> bool {
        self.state(element).is_serde()
    }

    pub fn root(&self, element: impl Into<ElementRef>) -> bool {
        self.state(element).root()
    }

    pub fn referenced_by_code(&self, element: impl Into<ElementRef>) -> bool {
        self.state(element).referenced_by_code()
    }
}
