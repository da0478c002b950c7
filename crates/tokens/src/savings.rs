use std::fmt;

use crate::pricing::estimate_cost;

/// Token and cost savings of a minimal context send versus reading the whole
/// codebase.
#[derive(Debug, Clone, PartialEq)]
pub struct SavingsReport {
    pub tokens_sent: u64,
    pub full_codebase_tokens: u64,
    pub tokens_saved: u64,
    pub saved_pct: f64,
    pub cost_full: f64,
    pub cost_actual: f64,
    pub cost_saved: f64,
}

impl SavingsReport {
    #[must_use]
    pub fn new(tokens_sent: u64, full_codebase_tokens: u64, model_id: &str) -> Self {
        let tokens_saved = full_codebase_tokens.saturating_sub(tokens_sent);
        let saved_pct = if full_codebase_tokens > 0 {
            tokens_saved as f64 / full_codebase_tokens as f64 * 100.0
        } else {
            0.0
        };
        let cost_full = estimate_cost(full_codebase_tokens, 0, model_id, 0);
        let cost_actual = estimate_cost(tokens_sent, 0, model_id, 0);
        Self {
            tokens_sent,
            full_codebase_tokens,
            tokens_saved,
            saved_pct,
            cost_full,
            cost_actual,
            cost_saved: cost_full - cost_actual,
        }
    }
}

impl fmt::Display for SavingsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sent to AI:    {} tokens", self.tokens_sent)?;
        writeln!(f, "Full codebase: {} tokens", self.full_codebase_tokens)?;
        writeln!(
            f,
            "Saved:         {:.0}% ({} tokens)",
            self.saved_pct, self.tokens_saved
        )?;
        writeln!(f, "Cost (full):   ${:.4}", self.cost_full)?;
        writeln!(f, "Cost (actual): ${:.4}", self.cost_actual)?;
        write!(f, "Money saved:   ${:.4}", self.cost_saved)
    }
}

#[cfg(test)]
mod tests {
    use super::SavingsReport;
    use pretty_assertions::assert_eq;

    #[test]
    fn computes_saved_tokens_and_percentage() {
        let report = SavingsReport::new(250, 1000, "claude-haiku-4-5");
        assert_eq!(report.tokens_saved, 750);
        assert!((report.saved_pct - 75.0).abs() < 1e-9);
        assert!(report.cost_saved > 0.0);
    }

    #[test]
    fn empty_codebase_reports_zero_percent() {
        let report = SavingsReport::new(0, 0, "claude-haiku-4-5");
        assert_eq!(report.tokens_saved, 0);
        assert_eq!(report.saved_pct, 0.0);
    }

    #[test]
    fn oversend_never_underflows() {
        let report = SavingsReport::new(500, 100, "unknown");
        assert_eq!(report.tokens_saved, 0);
        assert_eq!(report.cost_saved, 0.0);
    }
}
