//! Spinners and text progress bars.

use crate::domain::CreditReport;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const BAR_WIDTH: usize = 30;

/// Steady-ticking spinner with a message. Call `finish_and_clear` when done.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.yellow} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// `[██████░░░░] 65 / 130 (50%)`
pub fn credit_bar(report: &CreditReport) -> String {
    let filled = ((report.progress * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!(
        "[{}{}] {} / {} ({:.0}%)",
        "█".repeat(filled),
        "░".repeat(BAR_WIDTH - filled),
        report.total,
        report.required,
        report.progress * 100.0
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::CreditService;

    #[test]
    fn test_credit_bar_half() {
        let report = CreditService::new(130).diagnose(45, 20).unwrap();
        let bar = credit_bar(&report);
        assert!(bar.contains("65 / 130"));
        assert!(bar.contains("(50%)"));
        assert_eq!(bar.matches('█').count(), 15);
    }

    #[test]
    fn test_credit_bar_full() {
        let report = CreditService::new(130).diagnose(130, 10).unwrap();
        assert_eq!(credit_bar(&report).matches('░').count(), 0);
    }
}
