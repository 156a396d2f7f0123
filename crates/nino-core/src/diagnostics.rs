//! Diagnostics collected while building a feature matrix.
//!
//! Conditions that do not stop a transform but change how its output should
//! be read (a trailing partial year in the monthly climatology, grid cells
//! skipped because they hold NaN, lag offsets that do not reach the output)
//! are recorded here rather than only logged.
//!
//! # Example
//!
//! ```
//! use nino_core::diagnostics::{Diagnostics, Severity};
//!
//! let mut diag = Diagnostics::new();
//! diag.add_warning("climatology", "series ends mid-year");
//! diag.add_note("lag", "lag offsets do not reach the output");
//!
//! assert_eq!(diag.warning_count(), 1);
//! assert_eq!(diag.note_count(), 1);
//! ```

use serde::Serialize;

/// Severity level for diagnostic issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational: the output is well formed but worth knowing about
    Note,
    /// The output was produced, but some input was skipped or extrapolated
    Warning,
}

/// A single diagnostic issue encountered during a transform
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticIssue {
    pub severity: Severity,
    /// Category for grouping (e.g., "climatology", "region", "lag")
    pub category: String,
    pub message: String,
    /// Time index the issue refers to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_index: Option<usize>,
    /// Region reference (e.g., "lat -5, lon 180")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl DiagnosticIssue {
    pub fn new(
        severity: Severity,
        category: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category: category.into(),
            message: message.into(),
            time_index: None,
            region: None,
        }
    }

    pub fn with_time_index(mut self, time_index: usize) -> Self {
        self.time_index = Some(time_index);
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}

impl std::fmt::Display for DiagnosticIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Note => "note",
            Severity::Warning => "warning",
        };

        write!(f, "[{}:{}] {}", severity, self.category, self.message)?;

        if let Some(region) = &self.region {
            write!(f, " ({})", region)?;
        }
        if let Some(t) = self.time_index {
            write!(f, " at time index {}", t)?;
        }

        Ok(())
    }
}

/// Collection of diagnostic issues for one transform call
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<DiagnosticIssue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, issue: DiagnosticIssue) {
        self.issues.push(issue);
    }

    pub fn add_warning(&mut self, category: &str, message: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Warning, category, message));
    }

    pub fn add_note(&mut self, category: &str, message: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Note, category, message));
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    pub fn note_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Note)
            .count()
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Warning)
    }

    /// Get issues filtered by category
    pub fn issues_by_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a DiagnosticIssue> {
        self.issues.iter().filter(move |i| i.category == category)
    }

    pub fn summary(&self) -> String {
        let warnings = self.warning_count();
        let notes = self.note_count();

        match (warnings, notes) {
            (0, 0) => "No issues".to_string(),
            (w, 0) => format!("{} warning{}", w, if w == 1 { "" } else { "s" }),
            (0, n) => format!("{} note{}", n, if n == 1 { "" } else { "s" }),
            (w, n) => format!(
                "{} warning{}, {} note{}",
                w,
                if w == 1 { "" } else { "s" },
                n,
                if n == 1 { "" } else { "s" }
            ),
        }
    }
}

impl std::fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Diagnostics: {}", self.summary())?;
        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }
        Ok(())
    }
}
