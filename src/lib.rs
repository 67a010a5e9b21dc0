//! Reachmark - reachability and keep-rule engine for Android bytecode optimization
//!
//! This library decides, for a compiled artifact's classes, methods and
//! fields, which elements are safe to delete, rename, or otherwise transform.
//! It computes a conservative approximation of "used" from declarative keep
//! rules, mandatory no-optimization annotations, structural usage in
//! instruction bodies, and reflective references in layout resource files.
//!
//! # Architecture
//!
//! The engine runs as batch phases at fixed pipeline checkpoints:
//! 1. **Root Seeding** - keep rules, mandatory annotations and the built-in
//!    platform-root policy populate a `ReachabilityStore` for the scope
//! 2. **Code-Usage Scanning** - after any pass mutates code, usage flags are
//!    cleared and recomputed from the current instruction bodies
//! 3. **Layout-Reference Scanning** - classes and handler methods referenced
//!    by UI descriptor files become additional keep roots
//! 4. **Querying** - every other optimization pass guards deletion, renaming
//!    and call elision behind the store's read-only predicates

pub mod analysis;
pub mod config;
pub mod model;
pub mod rules;
pub mod state;

pub use analysis::{CodeUsageScanner, LayoutScanStats, LayoutScanner, RootSeeder, SeedStats};
pub use config::{KeepConfig, MemberSpec, ResourceConfig, RuleSpec, ScanPolicy};
pub use model::{
    ClassDef, ClassId, ElementRef, FieldDef, FieldId, InsnRef, MethodBody, MethodDef, MethodId,
    Scope,
};
pub use rules::{KeepRule, NamePattern, RuleError};
pub use state::{Grants, ReachabilityState, ReachabilityStore};
