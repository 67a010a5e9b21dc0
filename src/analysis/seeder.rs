use crate::config::KeepConfig;
use crate::model::Scope;
use crate::rules::{KeepRule, NamePattern};
use crate::state::ReachabilityStore;
use miette::{IntoDiagnostic, Result, WrapErr};
use rayon::prelude::*;
use tracing::{debug, info, warn};

/// Summary of one seeding run
#[derive(Debug, Clone, Default)]
pub struct SeedStats {
    pub kept_classes: usize,
    pub kept_methods: usize,
    pub kept_fields: usize,
    pub roots: usize,
    pub rules_applied: usize,
    pub rules_skipped: usize,
}

impl std::fmt::Display for SeedStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} kept classes, {} kept methods, {} kept fields, {} roots ({} rules applied, {} skipped)",
            self.kept_classes,
            self.kept_methods,
            self.kept_fields,
            self.roots,
            self.rules_applied,
            self.rules_skipped
        )
    }
}

/// Produces the first-valid reachability state for every element
///
/// Seeding merges four root sources by monotone OR, so the result is
/// identical for any evaluation order: the mandatory no-optimization
/// annotation set, the user's keep rules, the built-in platform-root policy
/// (entry points, native methods, enum support methods), and the configured
/// serde-class list. This phase never touches instruction bodies.
pub struct RootSeeder<'a> {
    scope: &'a Scope,
    config: &'a KeepConfig,
}

impl<'a> RootSeeder<'a> {
    pub fn new(scope: &'a Scope, config: &'a KeepConfig) -> Self {
        Self { scope, config }
    }

    /// Seed every element and return the populated store
    pub fn seed(&self) -> Result<(ReachabilityStore, SeedStats)> {
        let mut store = ReachabilityStore::new(self.scope);
        let mut stats = SeedStats::default();

        self.mark_no_optimizations(&mut store);
        self.apply_rules(&mut store, &mut stats)?;
        self.apply_platform_roots(&mut store);
        self.mark_serde_classes(&mut store)?;

        self.count_kept(&store, &mut stats);
        info!("Seeded reachability state: {}", stats);

        Ok((store, stats))
    }

    /// Mark every element carrying a configured no-optimizations annotation
    fn mark_no_optimizations(&self, store: &mut ReachabilityStore) {
        let mandatory = &self.config.no_optimizations_annotations;
        if mandatory.is_empty() {
            return;
        }
        let carries = |annotations: &[String]| annotations.iter().any(|a| mandatory.contains(a));

        for (id, class) in self.scope.classes() {
            if carries(&class.annotations) {
                debug!("No-optimizations class: {}", class.name);
                store.state_mut(id).mark_no_optimizations();
            }
        }
        for (id, method) in self.scope.methods() {
            if carries(&method.annotations) {
                store.state_mut(id).mark_no_optimizations();
            }
        }
        for (id, field) in self.scope.fields() {
            if carries(&field.annotations) {
                store.state_mut(id).mark_no_optimizations();
            }
        }
    }

    /// Compile and evaluate the configured keep rules
    ///
    /// Rules are matched in parallel; grants are folded serially so no two
    /// workers ever race on one element's flags.
    fn apply_rules(&self, store: &mut ReachabilityStore, stats: &mut SeedStats) -> Result<()> {
        let registry = self.scope.annotation_registry();

        let mut rules = Vec::with_capacity(self.config.rules.len());
        for (index, spec) in self.config.rules.iter().enumerate() {
            let rule = KeepRule::compile(spec, index)
                .into_diagnostic()
                .wrap_err("Malformed keep rule in configuration")?;

            if let Some(annotation) = rule.annotation() {
                if !registry.contains(annotation) {
                    warn!(
                        "Keep rule #{} references unregistered annotation type {}; rule matches nothing",
                        index, annotation
                    );
                    stats.rules_skipped += 1;
                    continue;
                }
            }
            rules.push(rule);
        }

        let match_sets: Vec<_> = rules
            .par_iter()
            .map(|rule| rule.match_scope(self.scope))
            .collect();

        for (rule, matches) in rules.iter().zip(&match_sets) {
            let grants = rule.grants();
            let blanket_names = rule.is_blanket_keepnames();
            debug!("Keep rule #{} matched {} elements", rule.index(), matches.len());

            for &element in matches {
                let state = store.state_mut(element);
                state.apply_grants(&grants);
                if blanket_names {
                    state.mark_blanket_names_kept();
                }
            }
            stats.rules_applied += 1;
        }

        Ok(())
    }

    /// Built-in platform-root policy, evaluated identically to user rules
    fn apply_platform_roots(&self, store: &mut ReachabilityStore) {
        // Entry points declared by the platform manifest keep the class and
        // all its methods; components are constructed and driven reflectively
        for name in self.scope.entry_points() {
            let Some(class_id) = self.scope.resolve_class(name) else {
                debug!("Entry point {} is not in the scope; ignored", name);
                continue;
            };
            store.state_mut(class_id).mark_keep();
            for &method_id in &self.scope.class(class_id).methods {
                store.state_mut(method_id).mark_keep();
            }
        }

        // Native methods and their holder classes
        for (method_id, method) in self.scope.methods() {
            if method.is_native {
                store.state_mut(method_id).mark_keep();
                store.state_mut(method.class).mark_keep();
            }
        }

        // Enum support methods are required structurally
        for (class_id, class) in self.scope.classes() {
            if !class.is_enum {
                continue;
            }
            for name in ["values", "valueOf"] {
                for method_id in self.scope.find_methods(class_id, name) {
                    store.state_mut(method_id).mark_keep();
                }
            }
        }
    }

    /// Mark configured serde classes (and their members) for the
    /// transitional renaming pass
    fn mark_serde_classes(&self, store: &mut ReachabilityStore) -> Result<()> {
        for pattern_text in &self.config.serde_classes {
            let pattern = NamePattern::class_pattern(pattern_text)
                .into_diagnostic()
                .wrap_err_with(|| format!("Invalid serde class pattern `{}`", pattern_text))?;

            for (class_id, class) in self.scope.classes() {
                if !pattern.matches(&class.name) {
                    continue;
                }
                store.state_mut(class_id).mark_serde();
                for &method_id in &class.methods {
                    store.state_mut(method_id).mark_serde();
                }
                for &field_id in &class.fields {
                    store.state_mut(field_id).mark_serde();
                }
            }
        }
        Ok(())
    }

    fn count_kept(&self, store: &ReachabilityStore, stats: &mut SeedStats) {
        for (id, _) in self.scope.classes() {
            if store.has_keep(id) {
                stats.kept_classes += 1;
            }
            if store.root(id) {
                stats.roots += 1;
            }
        }
        for (id, _) in self.scope.methods() {
            if store.has_keep(id) {
                stats.kept_methods += 1;
            }
            if store.root(id) {
                stats.roots += 1;
            }
        }
        for (id, _) in self.scope.fields() {
            if store.has_keep(id) {
                stats.kept_fields += 1;
            }
            if store.root(id) {
                stats.roots += 1;
            }
        }
    }
}
