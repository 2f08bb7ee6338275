//! Diagnostics collected by pre-flight validation.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// One finding about one layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Stable code, e.g. `layerport::validate::no-bitmap`.
    pub code: String,
    /// Slash-separated names from the document root to the layer.
    pub layer: String,
    pub message: String,
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn error(code: impl Into<String>, layer: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code.into(), layer.into(), message.into())
    }

    pub fn warning(code: impl Into<String>, layer: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code.into(), layer.into(), message.into())
    }

    fn new(severity: Severity, code: String, layer: String, message: String) -> Self {
        Self {
            severity,
            code,
            layer,
            message,
            help: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}] {}: {}", self.severity, self.code, self.layer, self.message)
    }
}

/// Diagnostics in the order they were found.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == severity).count()
    }

    /// True when nothing was reported.
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Codes of every diagnostic, mostly for tests.
    pub fn codes(&self) -> Vec<&str> {
        self.diagnostics.iter().map(|d| d.code.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let mut result = ValidationResult::new();
        assert!(result.is_ok());

        result.push(Diagnostic::warning("layerport::a", "bg", "odd"));
        result.push(Diagnostic::error("layerport::b", "bg", "broken"));
        assert!(result.has_errors());
        assert_eq!(result.error_count(), 1);
        assert_eq!(result.warning_count(), 1);
        assert_eq!(result.codes(), vec!["layerport::a", "layerport::b"]);
    }

    #[test]
    fn test_display() {
        let d = Diagnostic::error("layerport::validate::depth", "root/a", "too deep").with_help("flatten");
        assert_eq!(d.to_string(), "error[layerport::validate::depth] root/a: too deep");
        assert_eq!(d.help.as_deref(), Some("flatten"));
    }
}
