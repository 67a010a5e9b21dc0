//! Integration tests for root seeding
//!
//! These tests verify rule matching, merge semantics and the query facade
//! against small synthetic scopes.

use reachmark::{KeepConfig, MemberSpec, RootSeeder, RuleSpec, Scope};
use std::io::Write;

fn seed(scope: &Scope, config: &KeepConfig) -> reachmark::ReachabilityStore {
    let _ = tracing_subscriber::fmt::try_init();
    let (store, _) = RootSeeder::new(scope, config).seed().expect("seeding failed");
    store
}

fn rule(class: &str) -> RuleSpec {
    RuleSpec {
        class: class.to_string(),
        ..RuleSpec::default()
    }
}

#[test]
fn test_keep_rule_end_to_end() {
    let mut scope = Scope::new();
    let keep_me = scope.add_class("com.example.KeepMe");
    let other = scope.add_class("com.example.Other");

    let config = KeepConfig {
        rules: vec![rule("com.example.Keep*")],
        ..KeepConfig::default()
    };
    let store = seed(&scope, &config);

    assert!(!store.can_delete(keep_me));
    assert!(store.can_delete(other));
    assert!(store.root(keep_me));
}

#[test]
fn test_rule_application_is_order_independent() {
    let mut scope = Scope::new();
    let class = scope.add_class("com.example.Api");
    let method = scope.add_method(class, "getToken", "()Ljava/lang/String;");

    let a = rule("com.example.*");
    let mut b = rule("com.example.Api");
    b.allowobfuscation = true;
    let mut c = rule("com.example.**");
    c.member = Some(MemberSpec {
        name: "get*".to_string(),
        descriptor: None,
    });
    c.allowshrinking = true;

    let forward = KeepConfig {
        rules: vec![a.clone(), b.clone(), c.clone()],
        ..KeepConfig::default()
    };
    let backward = KeepConfig {
        rules: vec![c, b, a],
        ..KeepConfig::default()
    };

    let store_fwd = seed(&scope, &forward);
    let store_bwd = seed(&scope, &backward);

    for element in [
        reachmark::ElementRef::Class(class),
        reachmark::ElementRef::Method(method),
    ] {
        assert_eq!(store_fwd.state(element), store_bwd.state(element));
    }
}

#[test]
fn test_mandatory_annotation_dominates_rules() {
    let mut scope = Scope::new();
    let class = scope.add_class("com.example.Pinned");
    scope
        .class_mut(class)
        .annotations
        .push("com.example.DoNotOptimize".to_string());

    // A rule that would relax everything on the same class
    let mut relaxing = rule("com.example.Pinned");
    relaxing.allowshrinking = true;
    relaxing.allowobfuscation = true;

    let config = KeepConfig {
        rules: vec![relaxing],
        no_optimizations_annotations: vec!["com.example.DoNotOptimize".to_string()],
        ..KeepConfig::default()
    };
    let store = seed(&scope, &config);

    assert!(!store.can_delete(class));
    assert!(!store.allowshrinking(class));
    assert!(!store.allowobfuscation(class));
    assert!(store.root(class));
}

#[test]
fn test_disagreeing_rules_keep_favoring() {
    let mut scope = Scope::new();
    let class = scope.add_class("com.example.Service");
    let method = scope.add_method(class, "handle", "()V");

    // Member-level rule relaxes obfuscation, a second member-level rule
    // keeps without the relaxation; the strict one must win
    let mut relaxed = rule("com.example.Service");
    relaxed.member = Some(MemberSpec {
        name: "handle".to_string(),
        descriptor: None,
    });
    relaxed.allowobfuscation = true;

    let mut strict = rule("com.example.*");
    strict.member = Some(MemberSpec {
        name: "*".to_string(),
        descriptor: None,
    });

    let config = KeepConfig {
        rules: vec![relaxed, strict],
        ..KeepConfig::default()
    };
    let store = seed(&scope, &config);

    assert!(!store.can_rename(method));
    assert!(!store.allowobfuscation(method));
}

#[test]
fn test_assumenosideeffects_rule() {
    let mut scope = Scope::new();
    let class = scope.add_class("com.example.Log");
    let method = scope.add_method(class, "d", "(Ljava/lang/String;)I");

    let mut spec = rule("com.example.Log");
    spec.keep = false;
    spec.assumenosideeffects = true;
    spec.member = Some(MemberSpec {
        name: "*".to_string(),
        descriptor: None,
    });

    let config = KeepConfig {
        rules: vec![spec],
        ..KeepConfig::default()
    };
    let store = seed(&scope, &config);

    assert!(store.assumenosideeffects(method));
    // No keep was granted, so the method is still deletable
    assert!(store.can_delete(method));
}

#[test]
fn test_blanket_keepnames_marks_transitional_flag() {
    let mut scope = Scope::new();
    let class = scope.add_class("com.example.Anything");

    let mut blanket = rule("**");
    blanket.allowshrinking = true;

    let config = KeepConfig {
        rules: vec![blanket],
        ..KeepConfig::default()
    };
    let store = seed(&scope, &config);

    // Names are kept, so ordinary renaming is blocked
    assert!(!store.can_rename(class));
    // The transitional renaming pass may ignore the blanket rule
    assert!(store.can_rename_if_ignoring_blanket_keepnames(class));
    // Shrinking stays allowed: blanket keepnames does not create roots
    assert!(!store.root(class));
}

#[test]
fn test_root_identity_after_mixed_seeding() {
    let mut scope = Scope::new();
    let activity = scope.add_class("com.example.MainActivity");
    scope.add_method(activity, "onCreate", "(Landroid/os/Bundle;)V");
    let helper = scope.add_class("com.example.Helper");
    scope.add_method(helper, "assist", "()V");
    scope.declare_entry_point("com.example.MainActivity");

    let mut names = rule("com.example.**");
    names.allowshrinking = true;

    let config = KeepConfig {
        rules: vec![names],
        ..KeepConfig::default()
    };
    let store = seed(&scope, &config);

    for (id, _) in scope.classes() {
        assert_eq!(store.root(id), store.has_keep(id) && !store.allowshrinking(id));
    }
    for (id, _) in scope.methods() {
        assert_eq!(store.root(id), store.has_keep(id) && !store.allowshrinking(id));
    }
}

#[test]
fn test_config_file_round_trip() {
    let mut file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .expect("tempfile");
    write!(
        file,
        r#"{{
            "rules": [{{ "class": "com.example.Keep*" }}],
            "no_optimizations_annotations": ["com.example.DoNotOptimize"]
        }}"#
    )
    .expect("write config");

    let config = KeepConfig::from_file(file.path()).expect("load config");
    assert_eq!(config.rules.len(), 1);
    assert_eq!(config.no_optimizations_annotations.len(), 1);

    let mut scope = Scope::new();
    let keep_me = scope.add_class("com.example.KeepMe");
    let store = seed(&scope, &config);
    assert!(!store.can_delete(keep_me));
}

#[test]
fn test_malformed_config_file_is_fatal() {
    let mut file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .expect("tempfile");
    write!(file, r#"{{ "rules": [ {{ "class": 42 }} ] }}"#).expect("write config");

    assert!(KeepConfig::from_file(file.path()).is_err());
}
