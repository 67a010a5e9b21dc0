// Keep-rule matching
#![allow(dead_code)]

mod pattern;

pub use pattern::NamePattern;

use crate::config::RuleSpec;
use crate::model::{ElementRef, Scope};
use crate::state::Grants;
use thiserror::Error;

/// Failure to compile a rule from the configuration document
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("keep rule #{index}: class pattern is empty")]
    EmptyClassPattern { index: usize },

    #[error("keep rule #{index}: member name pattern is empty")]
    EmptyMemberPattern { index: usize },

    #[error("keep rule #{index}: invalid class pattern `{pattern}`: {source}")]
    InvalidClassPattern {
        index: usize,
        pattern: String,
        source: regex::Error,
    },

    #[error("keep rule #{index}: invalid member pattern `{pattern}`: {source}")]
    InvalidMemberPattern {
        index: usize,
        pattern: String,
        source: regex::Error,
    },
}

/// A member name/descriptor filter inside a keep rule
#[derive(Debug, Clone)]
pub struct MemberPattern {
    name: NamePattern,
    descriptor: Option<NamePattern>,
}

impl MemberPattern {
    fn matches(&self, name: &str, descriptor: &str) -> bool {
        if !self.name.matches(name) {
            return false;
        }
        match &self.descriptor {
            Some(pattern) => pattern.matches(descriptor),
            None => true,
        }
    }
}

/// A compiled keep rule
///
/// Matching is pure and stateless: independent rules may be evaluated in any
/// order or in parallel, since grants are merged by monotone OR.
#[derive(Debug, Clone)]
pub struct KeepRule {
    index: usize,
    class_pattern: NamePattern,
    annotation: Option<String>,
    annotation_on_declaring_class: bool,
    member: Option<MemberPattern>,
    grants: Grants,
}

impl KeepRule {
    /// Compile a rule from its configuration form
    pub fn compile(spec: &RuleSpec, index: usize) -> Result<Self, RuleError> {
        if spec.class.is_empty() {
            return Err(RuleError::EmptyClassPattern { index });
        }
        let class_pattern = NamePattern::class_pattern(&spec.class).map_err(|source| {
            RuleError::InvalidClassPattern {
                index,
                pattern: spec.class.clone(),
                source,
            }
        })?;

        let member = match &spec.member {
            Some(member_spec) => {
                if member_spec.name.is_empty() {
                    return Err(RuleError::EmptyMemberPattern { index });
                }
                let name = NamePattern::member_pattern(&member_spec.name).map_err(|source| {
                    RuleError::InvalidMemberPattern {
                        index,
                        pattern: member_spec.name.clone(),
                        source,
                    }
                })?;
                let descriptor = match &member_spec.descriptor {
                    Some(d) => Some(NamePattern::member_pattern(d).map_err(|source| {
                        RuleError::InvalidMemberPattern {
                            index,
                            pattern: d.clone(),
                            source,
                        }
                    })?),
                    None => None,
                };
                Some(MemberPattern { name, descriptor })
            }
            None => None,
        };

        Ok(Self {
            index,
            class_pattern,
            annotation: spec.annotation.clone(),
            annotation_on_declaring_class: spec.annotation_on_declaring_class,
            member,
            grants: Grants {
                keep: spec.keep,
                allowshrinking: spec.allowshrinking,
                allowobfuscation: spec.allowobfuscation,
                assumenosideeffects: spec.assumenosideeffects,
            },
        })
    }

    /// Position of this rule in the configuration document
    pub fn index(&self) -> usize {
        self.index
    }

    /// The flags this rule grants on match
    pub fn grants(&self) -> Grants {
        self.grants
    }

    /// The annotation type this rule requires, if any
    pub fn annotation(&self) -> Option<&str> {
        self.annotation.as_deref()
    }

    /// A top-level blanket keepnames rule: matches every class and keeps
    /// names while still allowing shrinking
    pub fn is_blanket_keepnames(&self) -> bool {
        self.class_pattern.is_blanket()
            && self.member.is_none()
            && self.grants.keep
            && self.grants.allowshrinking
    }

    /// Produce the set of elements this rule matches in the scope
    pub fn match_scope(&self, scope: &Scope) -> Vec<ElementRef> {
        let mut matched = Vec::new();

        for (class_id, class) in scope.classes() {
            if !self.class_pattern.matches(&class.name) {
                continue;
            }

            match &self.member {
                None => {
                    if self.annotation_matches(&class.annotations, &class.annotations) {
                        matched.push(ElementRef::Class(class_id));
                    }
                }
                Some(member) => {
                    for &method_id in &class.methods {
                        let method = scope.method(method_id);
                        if member.matches(&method.name, &method.descriptor)
                            && self.annotation_matches(&method.annotations, &class.annotations)
                        {
                            matched.push(ElementRef::Method(method_id));
                        }
                    }
                    for &field_id in &class.fields {
                        let field = scope.field(field_id);
                        if member.matches(&field.name, &field.type_name)
                            && self.annotation_matches(&field.annotations, &class.annotations)
                        {
                            matched.push(ElementRef::Field(field_id));
                        }
                    }
                }
            }
        }

        matched
    }

    fn annotation_matches(&self, own: &[String], declaring_class: &[String]) -> bool {
        let Some(required) = &self.annotation else {
            return true;
        };
        let carried = if self.annotation_on_declaring_class {
            declaring_class
        } else {
            own
        };
        carried.iter().any(|a| a == required)
    }
}
