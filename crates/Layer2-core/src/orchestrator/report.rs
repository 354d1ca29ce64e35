//! Lifecycle reports and bundle summaries

use crate::service::UnitHandle;
use ignite_foundation::Error;
use serde::Serialize;
use std::fmt;

/// Which half of the lifecycle was driven
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecyclePhase {
    Start,
    Stop,
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Stop => write!(f, "stop"),
        }
    }
}

/// One adapter that failed
#[derive(Debug)]
pub struct LifecycleFailure {
    pub unit: UnitHandle,
    pub error: anyhow::Error,
}

/// Outcome of `start_all` / `stop_all`
#[derive(Debug)]
pub struct LifecycleReport {
    phase: LifecyclePhase,
    attempted: usize,
    failures: Vec<LifecycleFailure>,
}

impl LifecycleReport {
    pub fn new(phase: LifecyclePhase) -> Self {
        Self {
            phase,
            attempted: 0,
            failures: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, unit: &UnitHandle, result: anyhow::Result<()>) {
        self.attempted += 1;
        if let Err(error) = result {
            self.failures.push(LifecycleFailure {
                unit: unit.clone(),
                error,
            });
        }
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    pub fn attempted(&self) -> usize {
        self.attempted
    }

    pub fn succeeded(&self) -> usize {
        self.attempted - self.failures.len()
    }

    pub fn failures(&self) -> &[LifecycleFailure] {
        &self.failures
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Aggregate error listing every failed adapter
    pub fn into_result(self) -> ignite_foundation::Result<()> {
        if self.is_success() {
            Ok(())
        } else {
            Err(Error::Lifecycle(self.to_string()))
        }
    }
}

impl fmt::Display for LifecycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}/{} adapters succeeded",
            self.phase,
            self.succeeded(),
            self.attempted
        )?;
        for failure in &self.failures {
            write!(f, "; {}: {:#}", failure.unit, failure.error)?;
        }
        Ok(())
    }
}

/// Serializable view of one bootstrapped bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleSummary {
    pub bundle: String,
    pub location: String,
    pub units: usize,
    pub services: Vec<String>,
    pub trackables: Vec<String>,
    pub adapters: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_report_aggregates() {
        let ok = UnitHandle::new(Path::new("a.bundle"), "demo.Ok");
        let bad = UnitHandle::new(Path::new("a.bundle"), "demo.Bad");

        let mut report = LifecycleReport::new(LifecyclePhase::Start);
        report.record(&ok, Ok(()));
        report.record(&bad, Err(anyhow::anyhow!("port in use")));

        assert_eq!(report.attempted(), 2);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failures()[0].unit.name, "demo.Bad");
        assert_eq!(
            report.to_string(),
            "start: 1/2 adapters succeeded; demo.Bad (a.bundle): port in use"
        );
        assert!(matches!(report.into_result(), Err(Error::Lifecycle(_))));
    }

    #[test]
    fn test_empty_report_succeeds() {
        let report = LifecycleReport::new(LifecyclePhase::Stop);
        assert!(report.is_success());
        assert!(report.into_result().is_ok());
    }
}
