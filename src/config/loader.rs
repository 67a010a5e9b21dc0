// Rule document loading - some methods reserved for future use
#![allow(dead_code)]

use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the reachability engine
///
/// Enumerates the user's keep rules, the mandatory "no optimizations"
/// annotation types, and the policy for the layout-reference scan. A
/// document that fails to parse aborts the run; per-rule pattern problems
/// are reported with the offending rule's index when rules are compiled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeepConfig {
    /// Declarative keep rules, applied in any order
    pub rules: Vec<RuleSpec>,

    /// Annotation types whose carriers must not be optimized at all
    pub no_optimizations_annotations: Vec<String>,

    /// Class patterns marked as serializer/deserializer helpers for the
    /// transitional renaming pass
    pub serde_classes: Vec<String>,

    /// Layout-reference scan configuration
    pub resources: ResourceConfig,
}

/// One keep rule in configuration form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSpec {
    /// Class-name pattern: exact, `*` within a package, `**` across packages
    pub class: String,

    /// Required annotation type, if any
    pub annotation: Option<String>,

    /// Check the annotation on the declaring class instead of the member
    pub annotation_on_declaring_class: bool,

    /// Member filter; absent means the rule applies to the class itself
    pub member: Option<MemberSpec>,

    /// Grant keep to matched elements
    pub keep: bool,

    /// Permit removal even though kept
    pub allowshrinking: bool,

    /// Permit renaming even though kept
    pub allowobfuscation: bool,

    /// Calls to matched elements may be elided when the result is unused
    pub assumenosideeffects: bool,
}

/// Member name/descriptor filter inside a rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberSpec {
    /// Member name glob
    pub name: String,

    /// Optional descriptor/type glob
    pub descriptor: Option<String>,
}

/// Layout-reference scan configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// What to do when the resource directory is not accessible
    pub policy: ScanPolicy,
}

/// Behavior when the configured resource directory cannot be read
///
/// `Permissive` degrades to "no extra roots discovered", trading soundness
/// for availability: classes referenced only from layouts will look
/// deletable. `Strict` aborts instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanPolicy {
    Strict,
    #[default]
    Permissive,
}

impl Default for KeepConfig {
    fn default() -> Self {
        Self {
            rules: vec![],
            no_optimizations_annotations: vec![],
            serde_classes: vec![],
            resources: ResourceConfig::default(),
        }
    }
}

impl Default for RuleSpec {
    fn default() -> Self {
        Self {
            class: String::new(),
            annotation: None,
            annotation_on_declaring_class: false,
            member: None,
            keep: true,
            allowshrinking: false,
            allowobfuscation: false,
            assumenosideeffects: false,
        }
    }
}

impl KeepConfig {
    /// Load configuration from a file (JSON, YAML or TOML)
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read rule document: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match extension {
            "json" => serde_json::from_str(&contents)
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to parse JSON rule document: {}", path.display())),
            "yml" | "yaml" => serde_yaml::from_str(&contents)
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to parse YAML rule document: {}", path.display())),
            "toml" => toml::from_str(&contents)
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to parse TOML rule document: {}", path.display())),
            _ => {
                // Unknown extension: try each format in turn
                if let Ok(config) = serde_json::from_str(&contents) {
                    Ok(config)
                } else if let Ok(config) = serde_yaml::from_str(&contents) {
                    Ok(config)
                } else {
                    toml::from_str(&contents)
                        .into_diagnostic()
                        .wrap_err_with(|| format!("Failed to parse rule document: {}", path.display()))
                }
            }
        }
    }
}
