use crate::config::ScanPolicy;
use crate::model::Scope;
use crate::state::ReachabilityStore;
use miette::{IntoDiagnostic, Result, WrapErr};
use quick_xml::events::Event;
use quick_xml::Reader;
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Summary of one layout scan
#[derive(Debug, Clone, Default)]
pub struct LayoutScanStats {
    pub files_scanned: usize,
    pub files_skipped: usize,
    pub classes_kept: usize,
    pub methods_kept: usize,
}

impl std::fmt::Display for LayoutScanStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} files scanned ({} skipped), {} classes kept, {} methods kept",
            self.files_scanned, self.files_skipped, self.classes_kept, self.methods_kept
        )
    }
}

/// References pulled out of one layout file
#[derive(Debug, Default)]
struct LayoutRefs {
    /// Fully qualified class names
    classes: HashSet<String>,

    /// Handler method names (onClick-style attributes)
    handlers: HashSet<String>,
}

impl LayoutRefs {
    fn merge(&mut self, other: LayoutRefs) {
        self.classes.extend(other.classes);
        self.handlers.extend(other.handlers);
    }
}

/// Recovers roots referenced only through reflective layout inflation
///
/// UI descriptor files instantiate view classes and bind handler methods by
/// name at runtime, invisibly to instruction scanning. Every resolvable
/// reference becomes an additional keep root. Unresolvable names (platform
/// and third-party classes) are ignored; a malformed file is skipped with a
/// warning. The scan as a whole is best-effort and non-fatal, except that a
/// missing resource directory aborts under `ScanPolicy::Strict`.
pub struct LayoutScanner {
    policy: ScanPolicy,
}

impl LayoutScanner {
    pub fn new(policy: ScanPolicy) -> Self {
        Self { policy }
    }

    /// Scan the extracted resource directory and mark discovered roots
    pub fn scan(
        &self,
        resource_dir: &Path,
        scope: &Scope,
        store: &mut ReachabilityStore,
    ) -> Result<LayoutScanStats> {
        if !resource_dir.is_dir() {
            match self.policy {
                ScanPolicy::Strict => {
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("resource directory not accessible: {}", resource_dir.display()),
                    ))
                    .into_diagnostic()
                    .wrap_err("Layout scan failed in strict mode");
                }
                ScanPolicy::Permissive => {
                    warn!(
                        "Resource directory {} not accessible; no extra roots discovered",
                        resource_dir.display()
                    );
                    return Ok(LayoutScanStats::default());
                }
            }
        }

        let files = find_layout_files(resource_dir);
        let mut stats = LayoutScanStats::default();

        // Each file's discovered roots merge by OR, so files parse in parallel
        let parsed: Vec<Option<LayoutRefs>> =
            files.par_iter().map(|path| parse_layout_file(path)).collect();

        let mut refs = LayoutRefs::default();
        for file_refs in parsed {
            match file_refs {
                Some(r) => {
                    stats.files_scanned += 1;
                    refs.merge(r);
                }
                None => stats.files_skipped += 1,
            }
        }

        self.apply(&refs, scope, store, &mut stats);
        debug!("Layout scan: {}", stats);

        Ok(stats)
    }

    /// Fold discovered references into keep marks
    fn apply(
        &self,
        refs: &LayoutRefs,
        scope: &Scope,
        store: &mut ReachabilityStore,
        stats: &mut LayoutScanStats,
    ) {
        for class_name in &refs.classes {
            let Some(class_id) = scope.resolve_class(class_name) else {
                continue;
            };
            debug!("Layout root: {}", class_name);
            store.state_mut(class_id).mark_keep();
            stats.classes_kept += 1;
        }

        // The enclosing context class is not reliably recoverable from the
        // layout alone, so a handler name keeps every same-named method
        for handler in &refs.handlers {
            for method_id in scope.methods_named(handler) {
                debug!(
                    "Layout handler root: {}.{}",
                    scope.class(scope.method(method_id).class).name,
                    handler
                );
                store.state_mut(method_id).mark_keep();
                stats.methods_kept += 1;
            }
        }
    }
}

/// Collect every .xml file under the resource directory
fn find_layout_files(resource_dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(resource_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("xml"))
                .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect()
}

/// Parse one layout file; None means the file was skipped
fn parse_layout_file(path: &Path) -> Option<LayoutRefs> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            warn!("Skipping unreadable layout {}: {}", path.display(), e);
            return None;
        }
    };

    match parse_layout(&contents) {
        Some(refs) => Some(refs),
        None => {
            warn!("Skipping malformed layout {}", path.display());
            None
        }
    }
}

/// Extract class and handler references from layout XML contents
fn parse_layout(contents: &str) -> Option<LayoutRefs> {
    let mut refs = LayoutRefs::default();
    let mut reader = Reader::from_str(contents);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let tag_name = String::from_utf8_lossy(e.name().as_ref()).to_string();

                // A dotted tag is itself a custom view class
                if tag_name.contains('.') {
                    refs.classes.insert(tag_name.clone());
                }

                // <view class="com.example.CustomView" />
                if tag_name == "view" || tag_name == "View" {
                    for attr in e.attributes().filter_map(|a| a.ok()) {
                        let key = String::from_utf8_lossy(attr.key.as_ref());
                        if key == "class" {
                            let value = String::from_utf8_lossy(&attr.value).to_string();
                            if value.contains('.') {
                                refs.classes.insert(value);
                            }
                        }
                    }
                }

                // <fragment android:name="..."> and container views
                if tag_name == "fragment"
                    || tag_name == "androidx.fragment.app.FragmentContainerView"
                {
                    for attr in e.attributes().filter_map(|a| a.ok()) {
                        let key = String::from_utf8_lossy(attr.key.as_ref());
                        if key == "android:name" || key == "class" || key.ends_with(":name") {
                            let value = String::from_utf8_lossy(&attr.value).to_string();
                            if value.contains('.') {
                                refs.classes.insert(value);
                            }
                        }
                    }
                }

                // android:onClick="handlerName" binds a method reflectively
                for attr in e.attributes().filter_map(|a| a.ok()) {
                    let key = String::from_utf8_lossy(attr.key.as_ref());
                    if key == "android:onClick" || key.ends_with(":onClick") {
                        let value = String::from_utf8_lossy(&attr.value).to_string();
                        if !value.is_empty() && !value.starts_with('@') {
                            refs.handlers.insert(value);
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => return None,
            _ => {}
        }
        buf.clear();
    }

    Some(refs)
}
