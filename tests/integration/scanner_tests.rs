//! Integration tests for the code-usage and layout-reference scanners
//!
//! These tests drive the scanners against seeded stores, with layout files
//! written to temporary resource trees.

use reachmark::{
    CodeUsageScanner, InsnRef, KeepConfig, LayoutScanner, MethodBody, RootSeeder, ScanPolicy,
    Scope,
};
use std::fs;
use std::path::Path;

fn seed(scope: &Scope, config: &KeepConfig) -> reachmark::ReachabilityStore {
    let _ = tracing_subscriber::fmt::try_init();
    let (store, _) = RootSeeder::new(scope, config).seed().expect("seeding failed");
    store
}

fn write_layout(dir: &Path, name: &str, contents: &str) {
    fs::create_dir_all(dir).expect("create layout dir");
    fs::write(dir.join(name), contents).expect("write layout");
}

#[test]
fn test_layout_reference_becomes_root() {
    let mut scope = Scope::new();
    let my_view = scope.add_class("com.foo.MyView");
    let other = scope.add_class("com.foo.Other");

    let temp = tempfile::tempdir().expect("tempdir");
    let layout_dir = temp.path().join("res/layout");
    write_layout(
        &layout_dir,
        "main.xml",
        r#"<?xml version="1.0" encoding="utf-8"?>
<LinearLayout xmlns:android="http://schemas.android.com/apk/res/android">
    <com.foo.MyView
        android:layout_width="match_parent"
        android:layout_height="wrap_content" />
</LinearLayout>"#,
    );

    let config = KeepConfig::default();
    let mut store = seed(&scope, &config);
    assert!(store.can_delete(my_view));

    let scanner = LayoutScanner::new(ScanPolicy::Permissive);
    let stats = scanner
        .scan(temp.path(), &scope, &mut store)
        .expect("layout scan");

    assert_eq!(stats.files_scanned, 1);
    assert!(store.has_keep(my_view));
    assert!(!store.can_delete(my_view));
    assert!(store.can_delete(other));
}

#[test]
fn test_layout_handler_keeps_method() {
    let mut scope = Scope::new();
    let activity = scope.add_class("com.foo.FormActivity");
    let handler = scope.add_method(activity, "submitForm", "(Landroid/view/View;)V");
    let unrelated = scope.add_method(activity, "reset", "()V");

    let temp = tempfile::tempdir().expect("tempdir");
    write_layout(
        &temp.path().join("res/layout"),
        "form.xml",
        r#"<LinearLayout xmlns:android="http://schemas.android.com/apk/res/android">
    <Button android:onClick="submitForm" />
</LinearLayout>"#,
    );

    let config = KeepConfig::default();
    let mut store = seed(&scope, &config);

    LayoutScanner::new(ScanPolicy::Permissive)
        .scan(temp.path(), &scope, &mut store)
        .expect("layout scan");

    assert!(!store.can_delete(handler));
    assert!(store.can_delete(unrelated));
}

#[test]
fn test_malformed_layout_is_skipped_scan_continues() {
    let mut scope = Scope::new();
    let my_view = scope.add_class("com.foo.MyView");

    let temp = tempfile::tempdir().expect("tempdir");
    let layout_dir = temp.path().join("res/layout");
    write_layout(&layout_dir, "broken.xml", "<LinearLayout><Button></LinearLayout>");
    write_layout(
        &layout_dir,
        "good.xml",
        r#"<FrameLayout xmlns:android="http://schemas.android.com/apk/res/android">
    <com.foo.MyView />
</FrameLayout>"#,
    );

    let config = KeepConfig::default();
    let mut store = seed(&scope, &config);

    let stats = LayoutScanner::new(ScanPolicy::Permissive)
        .scan(temp.path(), &scope, &mut store)
        .expect("layout scan");

    assert_eq!(stats.files_skipped, 1);
    assert_eq!(stats.files_scanned, 1);
    assert!(!store.can_delete(my_view));
}

#[test]
fn test_unresolvable_layout_references_are_ignored() {
    let mut scope = Scope::new();
    scope.add_class("com.foo.Present");

    let temp = tempfile::tempdir().expect("tempdir");
    write_layout(
        &temp.path().join("res/layout"),
        "platform.xml",
        r#"<LinearLayout xmlns:android="http://schemas.android.com/apk/res/android">
    <androidx.appcompat.widget.Toolbar />
    <com.thirdparty.widget.Chart />
</LinearLayout>"#,
    );

    let config = KeepConfig::default();
    let mut store = seed(&scope, &config);

    let stats = LayoutScanner::new(ScanPolicy::Permissive)
        .scan(temp.path(), &scope, &mut store)
        .expect("layout scan");

    assert_eq!(stats.classes_kept, 0);
}

#[test]
fn test_code_usage_tracks_current_code_shape() {
    let mut scope = Scope::new();
    let caller_class = scope.add_class("com.example.Caller");
    let caller = scope.add_method(caller_class, "run", "()V");
    let holder = scope.add_class("com.example.Holder");
    let field = scope.add_field(holder, "cache", "java.lang.Object");

    scope.set_method_body(
        caller,
        Some(MethodBody::with_refs(vec![InsnRef::field_ref(
            "com.example.Holder",
            "cache",
        )])),
    );

    let config = KeepConfig::default();
    let mut store = seed(&scope, &config);
    let scanner = CodeUsageScanner::new();

    // Iteration 1: the field access is present
    scanner.recompute(&scope, &mut store);
    assert!(store.referenced_by_code(field));

    // A pass strips the access before iteration 2
    scope.set_method_body(caller, Some(MethodBody::new()));
    scanner.recompute(&scope, &mut store);
    assert!(!store.referenced_by_code(field));
}

#[test]
fn test_full_pipeline_queries_stay_consistent() {
    let mut scope = Scope::new();
    let activity = scope.add_class("com.example.MainActivity");
    let on_create = scope.add_method(activity, "onCreate", "(Landroid/os/Bundle;)V");
    let view = scope.add_class("com.example.HeaderView");
    let util = scope.add_class("com.example.Util");
    let format = scope.add_method(util, "format", "(I)Ljava/lang/String;");
    scope.declare_entry_point("com.example.MainActivity");

    scope.set_method_body(
        on_create,
        Some(MethodBody::with_refs(vec![InsnRef::method_ref(
            "com.example.Util",
            "format",
        )])),
    );

    let temp = tempfile::tempdir().expect("tempdir");
    write_layout(
        &temp.path().join("res/layout"),
        "activity_main.xml",
        r#"<FrameLayout xmlns:android="http://schemas.android.com/apk/res/android">
    <com.example.HeaderView />
</FrameLayout>"#,
    );

    let config = KeepConfig::default();
    let mut store = seed(&scope, &config);
    CodeUsageScanner::new().recompute(&scope, &mut store);
    LayoutScanner::new(ScanPolicy::Permissive)
        .scan(temp.path(), &scope, &mut store)
        .expect("layout scan");

    // Manifest entry point: kept, not referenced by any instruction
    assert!(!store.can_delete(activity));
    assert!(!store.referenced_by_code(activity));

    // Layout root: kept only because of the descriptor file
    assert!(!store.can_delete(view));

    // Called from code but matched by no rule: deletable by keep policy,
    // structurally in use
    assert!(store.can_delete(format));
    assert!(store.referenced_by_code(format));

    for (id, _) in scope.classes() {
        assert_eq!(store.root(id), store.has_keep(id) && !store.allowshrinking(id));
    }
}
