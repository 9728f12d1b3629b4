//! Graduation credit diagnosis (major + general education against the requirement).

use crate::domain::{CreditReport, DomainError};
use tracing::debug;

pub struct CreditService {
    required: u32,
}

impl CreditService {
    pub fn new(required: u32) -> Self {
        Self {
            required: required.max(1),
        }
    }

    pub fn required(&self) -> u32 {
        self.required
    }

    /// Each input must lie in `0..=required`.
    pub fn diagnose(&self, major: u32, general: u32) -> Result<CreditReport, DomainError> {
        for (label, value) in [("major", major), ("general", general)] {
            if value > self.required {
                return Err(DomainError::Input(format!(
                    "{} credits {} exceed the requirement of {}",
                    label, value, self.required
                )));
            }
        }

        let total = major.saturating_add(general);
        let report = CreditReport {
            major,
            general,
            total,
            required: self.required,
            remaining: self.required.saturating_sub(total),
            progress: (f64::from(total) / f64::from(self.required)).min(1.0),
        };
        debug!(total, remaining = report.remaining, "credit diagnosis");
        Ok(report)
    }
}
