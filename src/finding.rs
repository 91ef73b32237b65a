use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::span::SourceSpan;

/// How severe a reported issue is. Each rule declares a default, which the
/// configuration may override per rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Performance,
    Maintainability,
    Style,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Performance => "performance",
            Severity::Maintainability => "maintainability",
            Severity::Style => "style",
        }
    }
}

impl FromStr for Severity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            "performance" => Ok(Severity::Performance),
            "maintainability" => Ok(Severity::Maintainability),
            "style" => Ok(Severity::Style),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single reported issue.
///
/// Created exactly once by a rule during traversal. The only field that
/// changes afterwards is `suppressed`, which the filtering layer sets;
/// suppressed findings stay in the output list so downstream consumers can
/// diff suppressions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub rule_id: String,
    pub severity: Severity,
    pub message: String,
    pub primary_span: SourceSpan,
    /// Cross-referenced locations, e.g. the first definition when reporting
    /// a duplicate.
    pub secondary_spans: Vec<SourceSpan>,
    pub suppressed: bool,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.primary_span, self.rule_id, self.message
        )
    }
}

/// A non-fatal diagnostic produced during a run.
///
/// Notices are the side channel next to the finding list: they describe how
/// the run went, never the analyzed code, and none of them aborts anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A rule callback failed; the rule was disabled for the rest of the
    /// file, keeping whatever it had already reported.
    RuleFailed { rule_id: String, message: String },
    /// A rule requiring symbol resolution ran without a capable oracle and
    /// was skipped for the file.
    MissingCapability { rule_id: String },
    /// A deprecated configuration key supplied the value for a rule
    /// property.
    DeprecatedKey {
        rule_id: String,
        deprecated: String,
        canonical: String,
    },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::RuleFailed { rule_id, message } => {
                write!(f, "rule `{rule_id}` failed and was disabled for this file: {message}")
            }
            Notice::MissingCapability { rule_id } => {
                write!(f, "rule `{rule_id}` requires symbol resolution and was skipped")
            }
            Notice::DeprecatedKey { rule_id, deprecated, canonical } => {
                write!(
                    f,
                    "rule `{rule_id}`: config key `{deprecated}` is deprecated, use `{canonical}`"
                )
            }
        }
    }
}
