// crates/gatewayd-startos-config/src/validation.rs
// ============================================================================
// Module: Snapshot Validation
// Description: Checks submitted values against a configuration specification.
// Purpose: Report every violation with a path and rule, never with the value.
// Dependencies: serde, serde_json, thiserror, crate::snapshot, crate::spec
// ============================================================================

//! ## Overview
//! The platform validates submissions before handing them over, so the
//! procedures do not call this module. It backs offline checks of a saved or
//! hand-written configuration. Validation collects every issue instead of
//! stopping at the first, and issue messages carry field paths and pattern
//! descriptions only, so masked values cannot leak through them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::snapshot::ConfigSnapshot;
use crate::spec::ConfigSpec;
use crate::spec::FieldKind;
use crate::spec::FieldSpec;
use crate::spec::StringField;
use crate::spec::UnionField;
use crate::spec::join_path;

// ============================================================================
// SECTION: Issues
// ============================================================================

/// What is wrong with a single value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueKind {
    /// A required value is absent or null.
    Missing,
    /// The value has the wrong JSON type.
    WrongType {
        /// Expected type label.
        expected: &'static str,
    },
    /// A string value does not satisfy its pattern.
    PatternViolation {
        /// Description of the violated rule.
        rule: String,
    },
    /// A union value lacks its tag.
    MissingTag {
        /// Tag field id.
        tag: String,
    },
    /// A union tag names no declared variant.
    UnknownVariant {
        /// Submitted variant id.
        variant: String,
    },
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("value is required"),
            Self::WrongType {
                expected,
            } => write!(f, "expected {expected}"),
            Self::PatternViolation {
                rule,
            } => write!(f, "{rule}"),
            Self::MissingTag {
                tag,
            } => write!(f, "missing tag `{tag}`"),
            Self::UnknownVariant {
                variant,
            } => write!(f, "unknown variant `{variant}`"),
        }
    }
}

/// A violation at a snapshot path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Dotted path in the snapshot (union fields sit beside their tag).
    pub path: String,
    /// Violation detail.
    #[serde(flatten)]
    pub kind: IssueKind,
}

/// Every violation found in a snapshot.
///
/// # Invariants
/// - `issues` is non-empty when returned as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("configuration has {} issue(s): {}", .issues.len(), render_issues(.issues))]
pub struct ValidationReport {
    /// Violations in walk order.
    pub issues: Vec<ValidationIssue>,
}

/// Renders issues as `path: message` pairs.
fn render_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("{}: {}", issue.path, issue.kind))
        .collect::<Vec<_>>()
        .join("; ")
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Validates `snapshot` against `spec`.
///
/// # Errors
///
/// Returns [`ValidationReport`] listing every violation.
pub fn validate(spec: &ConfigSpec, snapshot: &ConfigSnapshot) -> Result<(), ValidationReport> {
    let mut issues = Vec::new();
    match snapshot.as_value() {
        Value::Object(object) => check_object(spec.root(), object, "", &mut issues),
        _ => issues.push(ValidationIssue {
            path: "$".to_string(),
            kind: IssueKind::WrongType {
                expected: "object",
            },
        }),
    }
    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationReport {
            issues,
        })
    }
}

/// Checks one object level against its spec.
fn check_object(
    spec: &FieldSpec,
    object: &Map<String, Value>,
    prefix: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    for field in spec {
        let path = join_path(prefix, field.name.as_str());
        let value = object.get(field.name.as_str()).unwrap_or(&Value::Null);
        match &field.kind {
            FieldKind::String(string) => check_string(string, value, path, issues),
            FieldKind::Object(nested) => match value {
                Value::Object(inner) => check_object(&nested.spec, inner, &path, issues),
                Value::Null if nested.nullable => {}
                Value::Null => issues.push(ValidationIssue {
                    path,
                    kind: IssueKind::Missing,
                }),
                _ => issues.push(ValidationIssue {
                    path,
                    kind: IssueKind::WrongType {
                        expected: "object",
                    },
                }),
            },
            FieldKind::Union(union) => check_union(union, value, &path, issues),
            FieldKind::Pointer(_) => {}
        }
    }
}

/// Checks a string leaf.
fn check_string(
    field: &StringField,
    value: &Value,
    path: String,
    issues: &mut Vec<ValidationIssue>,
) {
    match value {
        Value::Null if field.nullable => {}
        Value::Null => issues.push(ValidationIssue {
            path,
            kind: IssueKind::Missing,
        }),
        Value::String(text) => {
            if let Some(pattern) = &field.pattern
                && !pattern.is_match(text)
            {
                issues.push(ValidationIssue {
                    path,
                    kind: IssueKind::PatternViolation {
                        rule: pattern.description().to_string(),
                    },
                });
            }
        }
        _ => issues.push(ValidationIssue {
            path,
            kind: IssueKind::WrongType {
                expected: "string",
            },
        }),
    }
}

/// Checks a union value and its selected variant's fields.
fn check_union(union: &UnionField, value: &Value, path: &str, issues: &mut Vec<ValidationIssue>) {
    let Value::Object(object) = value else {
        issues.push(ValidationIssue {
            path: path.to_string(),
            kind: if value.is_null() {
                IssueKind::Missing
            } else {
                IssueKind::WrongType {
                    expected: "object",
                }
            },
        });
        return;
    };
    let tag_path = join_path(path, union.tag.id.as_str());
    match object.get(union.tag.id.as_str()) {
        None | Some(Value::Null) => issues.push(ValidationIssue {
            path: tag_path,
            kind: IssueKind::MissingTag {
                tag: union.tag.id.to_string(),
            },
        }),
        Some(Value::String(tag)) => match union.variant(tag) {
            Some(variant) => check_object(&variant.spec, object, path, issues),
            None => issues.push(ValidationIssue {
                path: tag_path,
                kind: IssueKind::UnknownVariant {
                    variant: tag.clone(),
                },
            }),
        },
        Some(_) => issues.push(ValidationIssue {
            path: tag_path,
            kind: IssueKind::WrongType {
                expected: "string",
            },
        }),
    }
}
