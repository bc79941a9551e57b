//! Severity-tagged incident reporting
//!
//! Anomalies the library runs into (a wildcard in a category name, a search
//! path that is a file, an extension without a parser) are named incidents
//! rather than hardcoded reactions. Each incident carries a runtime-mutable
//! severity deciding what [`Reporter::report`] does with it: print, warn, or
//! fail. The reporter is an explicit policy object owned by a manager;
//! clones share the same severity table, so one reporter can be wired into
//! several managers and reconfigured in one place.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{Error, Result};

/// Named anomalies the library can run into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Incident {
    /// The category prefix contains a wildcard character
    WildcardCategory,
    /// A search path entry is a regular file, not a directory
    ExpectedDirectory,
    /// A discovered file's extension has no registered parser
    UnknownExtension,
}

impl Incident {
    /// Name used to tag messages and fatal errors
    pub fn name(&self) -> &'static str {
        match self {
            Incident::WildcardCategory => "Wildcard",
            Incident::ExpectedDirectory => "ExpectedDirectory",
            Incident::UnknownExtension => "UnknownExtension",
        }
    }

    /// Default severity for this incident
    fn default_severity(&self) -> Severity {
        match self {
            Incident::WildcardCategory => Severity::Info,
            Incident::ExpectedDirectory => Severity::Warning,
            Incident::UnknownExtension => Severity::Fatal,
        }
    }
}

/// How an incident is surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Formatted line on stdout
    Info,
    /// Non-fatal diagnostic via `log::warn!`
    Warning,
    /// Distinguished [`Error`] carrying the incident name
    Fatal,
}

/// Severity policy table for incidents
///
/// Cloning is cheap and shares the underlying table: reconfiguring a clone
/// reconfigures every manager holding one.
#[derive(Debug, Clone)]
pub struct Reporter {
    severities: Arc<RwLock<HashMap<Incident, Severity>>>,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter {
    /// Create a reporter with the default severities
    pub fn new() -> Self {
        Self {
            severities: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Current severity for an incident
    pub fn severity(&self, incident: Incident) -> Severity {
        self.severities
            .read()
            .expect("Reporter severity table lock poisoned")
            .get(&incident)
            .copied()
            .unwrap_or_else(|| incident.default_severity())
    }

    /// Change the severity for an incident
    ///
    /// Takes effect immediately for every reporter clone sharing this table.
    pub fn set_severity(&self, incident: Incident, severity: Severity) {
        self.severities
            .write()
            .expect("Reporter severity table lock poisoned")
            .insert(incident, severity);
    }

    /// Surface an incident according to its current severity
    ///
    /// Returns `Err` only for [`Severity::Fatal`].
    pub fn report(&self, incident: Incident, message: impl AsRef<str>) -> Result<()> {
        let message = message.as_ref();
        match self.severity(incident) {
            Severity::Fatal => Err(Error::incident(incident.name(), message)),
            Severity::Warning => {
                log::warn!("{}: {}", incident.name(), message);
                Ok(())
            }
            Severity::Info => {
                // continuation lines align under the message start
                let indent = format!("\n#   {}", " ".repeat(incident.name().len()));
                println!(
                    "# {}: {}",
                    incident.name(),
                    message.replace('\n', &indent)
                );
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_default_severities() {
        let reporter = Reporter::new();
        assert_eq!(reporter.severity(Incident::WildcardCategory), Severity::Info);
        assert_eq!(
            reporter.severity(Incident::ExpectedDirectory),
            Severity::Warning
        );
        assert_eq!(reporter.severity(Incident::UnknownExtension), Severity::Fatal);
    }

    #[test]
    fn test_fatal_report_is_an_incident_error() {
        let reporter = Reporter::new();
        let err = reporter
            .report(Incident::UnknownExtension, "no parser for 'ini'")
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Incident { name: "UnknownExtension" });
        assert!(err.to_string().contains("no parser for 'ini'"));
    }

    #[test]
    fn test_non_fatal_reports_return_ok() {
        let reporter = Reporter::new();
        assert!(reporter.report(Incident::WildcardCategory, "heads up").is_ok());
        assert!(reporter
            .report(Incident::ExpectedDirectory, "found a file")
            .is_ok());
    }

    #[test]
    fn test_severity_is_runtime_mutable() {
        let reporter = Reporter::new();
        reporter.set_severity(Incident::WildcardCategory, Severity::Fatal);
        assert!(reporter.report(Incident::WildcardCategory, "now fatal").is_err());

        reporter.set_severity(Incident::UnknownExtension, Severity::Info);
        assert!(reporter.report(Incident::UnknownExtension, "now benign").is_ok());
    }

    #[test]
    fn test_clones_share_the_severity_table() {
        let reporter = Reporter::new();
        let clone = reporter.clone();
        clone.set_severity(Incident::ExpectedDirectory, Severity::Fatal);

        assert_eq!(
            reporter.severity(Incident::ExpectedDirectory),
            Severity::Fatal
        );
    }
}
