// crates/gatewayd-startos-config/src/pattern.rs
// ============================================================================
// Module: Value Patterns
// Description: Validation rules for string fields and their descriptions.
// Purpose: Keep the rendered regex and the operator-facing rule text in lockstep.
// Dependencies: regex, thiserror
// ============================================================================

//! ## Overview
//! String fields carry a regular expression the platform evaluates plus a
//! human-readable description of the same rule. Both are derived from a
//! closed [`PatternRule`] so they cannot drift silently, and
//! [`ValuePattern::check_agreement`] proves the pairing by running boundary
//! probes against the compiled regex and checking that the description names
//! every bound the rule enforces.
//!
//! Length rules are anchored at both ends.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use regex::Regex;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when a pattern is built or checked against its description.
///
/// # Invariants
/// - Messages never include submitted configuration values; probes are
///   synthetic and described by shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// The rendered regular expression failed to compile.
    #[error("pattern `{pattern}` does not compile: {reason}")]
    Compile {
        /// Rendered pattern.
        pattern: String,
        /// Compiler diagnostic.
        reason: String,
    },
    /// Length bounds are inverted.
    #[error("length bounds {min}..={max} are inverted")]
    InvertedBounds {
        /// Lower bound.
        min: usize,
        /// Upper bound.
        max: usize,
    },
    /// The compiled pattern disagrees with a boundary probe of its rule.
    #[error("pattern `{pattern}` should {expectation} {probe}")]
    ProbeDisagrees {
        /// Rendered pattern.
        pattern: String,
        /// `accept` or `reject`.
        expectation: &'static str,
        /// Shape of the probe value.
        probe: String,
    },
    /// The description omits a bound the pattern enforces.
    #[error("description \"{description}\" does not mention `{term}`")]
    DescriptionMissingTerm {
        /// Operator-facing description.
        description: String,
        /// Term the rule requires the description to name.
        term: String,
    },
}

// ============================================================================
// SECTION: Pattern Rules
// ============================================================================

/// Closed set of validation rules used by the gateway schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternRule {
    /// Any value, including the empty string.
    Any,
    /// At least `n` characters.
    MinLength(usize),
    /// Between `min` and `max` characters, inclusive.
    LengthBetween {
        /// Minimum character count.
        min: usize,
        /// Maximum character count.
        max: usize,
    },
    /// `http://` or `https://` URL.
    HttpUrl,
    /// Absolute filesystem path.
    AbsolutePath,
}

/// Boundary probe evaluated against a compiled rule.
struct Probe {
    /// Probe value fed to the regex.
    value: String,
    /// Whether the rule must accept the value.
    accept: bool,
    /// Shape of the value for error messages.
    label: String,
}

impl Probe {
    /// Probe consisting of `len` ASCII characters.
    fn of_length(len: usize, accept: bool) -> Self {
        Self {
            value: "a".repeat(len),
            accept,
            label: format!("a value of {len} characters"),
        }
    }

    /// Probe with a literal value.
    fn literal(value: &str, accept: bool) -> Self {
        Self {
            value: value.to_string(),
            accept,
            label: format!("`{value}`"),
        }
    }
}

impl PatternRule {
    /// Renders the regular expression handed to the platform.
    #[must_use]
    pub fn regex(self) -> String {
        match self {
            Self::Any => ".*".to_string(),
            Self::MinLength(min) => format!("^.{{{min},}}$"),
            Self::LengthBetween {
                min,
                max,
            } => format!("^.{{{min},{max}}}$"),
            Self::HttpUrl => "^https?://.*".to_string(),
            Self::AbsolutePath => "^/.*".to_string(),
        }
    }

    /// Terms the description must mention (compared case-insensitively).
    fn required_terms(self) -> Vec<String> {
        match self {
            Self::Any => vec!["any".to_string()],
            Self::MinLength(min) => vec![min.to_string()],
            Self::LengthBetween {
                min,
                max,
            } => vec![min.to_string(), max.to_string()],
            Self::HttpUrl => vec!["http".to_string()],
            Self::AbsolutePath => vec!["absolute".to_string()],
        }
    }

    /// Boundary values the compiled regex must classify correctly.
    fn probes(self) -> Vec<Probe> {
        match self {
            Self::Any => vec![Probe::literal("", true), Probe::literal("info,fm=debug", true)],
            Self::MinLength(min) => {
                let mut probes = vec![
                    Probe::of_length(min, true),
                    Probe::of_length(min.saturating_add(16), true),
                ];
                if min > 0 {
                    probes.push(Probe::of_length(min - 1, false));
                }
                probes
            }
            Self::LengthBetween {
                min,
                max,
            } => {
                let mut probes = vec![Probe::of_length(min, true), Probe::of_length(max, true)];
                if let Some(over) = max.checked_add(1) {
                    probes.push(Probe::of_length(over, false));
                }
                if min > 0 {
                    probes.push(Probe::of_length(min - 1, false));
                }
                probes
            }
            Self::HttpUrl => vec![
                Probe::literal("http://127.0.0.1:3000", true),
                Probe::literal("https://mempool.space/api", true),
                Probe::literal("ftp://mempool.space", false),
                Probe::literal("mempool.space/api", false),
            ],
            Self::AbsolutePath => vec![
                Probe::literal("/mnt/lnd/tls.cert", true),
                Probe::literal("mnt/lnd/tls.cert", false),
                Probe::literal("", false),
            ],
        }
    }
}

// ============================================================================
// SECTION: Value Pattern
// ============================================================================

/// Compiled pattern paired with its operator-facing description.
///
/// # Invariants
/// - `pattern` is always `rule.regex()`.
/// - `regex` is the compiled form of `pattern`.
#[derive(Clone)]
pub struct ValuePattern {
    /// Rule the pattern was derived from.
    rule: PatternRule,
    /// Rendered regular expression.
    pattern: String,
    /// Human-readable rule text.
    description: String,
    /// Compiled regular expression.
    regex: Regex,
}

impl ValuePattern {
    /// Compiles a pattern for `rule` with the given description.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] when the bounds are inverted or the rendered
    /// regex does not compile. Agreement with the description is checked
    /// separately by [`Self::check_agreement`].
    pub fn new(rule: PatternRule, description: impl Into<String>) -> Result<Self, PatternError> {
        if let PatternRule::LengthBetween {
            min,
            max,
        } = rule
            && min > max
        {
            return Err(PatternError::InvertedBounds {
                min,
                max,
            });
        }
        let pattern = rule.regex();
        let regex = Regex::new(&pattern).map_err(|err| PatternError::Compile {
            pattern: pattern.clone(),
            reason: err.to_string(),
        })?;
        Ok(Self {
            rule,
            pattern,
            description: description.into(),
            regex,
        })
    }

    /// Returns the rule this pattern enforces.
    #[must_use]
    pub const fn rule(&self) -> PatternRule {
        self.rule
    }

    /// Returns the rendered regular expression.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the operator-facing description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns true when `value` satisfies the pattern.
    #[must_use]
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }

    /// Verifies that the description and the compiled pattern describe the
    /// same rule.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::ProbeDisagrees`] when a boundary probe is
    /// misclassified and [`PatternError::DescriptionMissingTerm`] when the
    /// description omits an enforced bound.
    pub fn check_agreement(&self) -> Result<(), PatternError> {
        for probe in self.rule.probes() {
            if self.is_match(&probe.value) != probe.accept {
                return Err(PatternError::ProbeDisagrees {
                    pattern: self.pattern.clone(),
                    expectation: if probe.accept { "accept" } else { "reject" },
                    probe: probe.label,
                });
            }
        }
        let lowered = self.description.to_lowercase();
        for term in self.rule.required_terms() {
            if !lowered.contains(&term) {
                return Err(PatternError::DescriptionMissingTerm {
                    description: self.description.clone(),
                    term,
                });
            }
        }
        Ok(())
    }
}

impl PartialEq for ValuePattern {
    fn eq(&self, other: &Self) -> bool {
        self.rule == other.rule && self.description == other.description
    }
}

impl Eq for ValuePattern {}

impl fmt::Debug for ValuePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValuePattern")
            .field("pattern", &self.pattern)
            .field("description", &self.description)
            .finish()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
