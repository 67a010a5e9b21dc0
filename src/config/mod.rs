mod loader;

pub use loader::{KeepConfig, MemberSpec, ResourceConfig, RuleSpec, ScanPolicy};
