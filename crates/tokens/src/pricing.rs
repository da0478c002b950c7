/// Per-million-token USD rates for one model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPricing {
    pub input: f64,
    pub output: f64,
    pub cache_read: f64,
    pub cache_write: f64,
}

const PRICING_TABLE: &[(&str, ModelPricing)] = &[
    (
        "claude-sonnet-4-5",
        ModelPricing {
            input: 3.00,
            output: 15.00,
            cache_read: 0.30,
            cache_write: 3.75,
        },
    ),
    (
        "claude-haiku-4-5",
        ModelPricing {
            input: 1.00,
            output: 5.00,
            cache_read: 0.10,
            cache_write: 1.25,
        },
    ),
    (
        "gemini-1.5-pro",
        ModelPricing {
            input: 1.25,
            output: 5.00,
            cache_read: 0.315,
            cache_write: 1.25,
        },
    ),
    (
        "gemini-1.5-flash",
        ModelPricing {
            input: 0.075,
            output: 0.30,
            cache_read: 0.018,
            cache_write: 0.075,
        },
    ),
];

/// Look up the rate card for a model identifier.
#[must_use]
pub fn pricing_for(model_id: &str) -> Option<&'static ModelPricing> {
    PRICING_TABLE
        .iter()
        .find(|(id, _)| *id == model_id)
        .map(|(_, pricing)| pricing)
}

/// Estimate the USD cost of one API call.
///
/// Unknown model identifiers price at zero so an unpriced model never blocks
/// a change cycle.
#[must_use]
pub fn estimate_cost(
    input_tokens: u64,
    output_tokens: u64,
    model_id: &str,
    cached_input_tokens: u64,
) -> f64 {
    let Some(pricing) = pricing_for(model_id) else {
        return 0.0;
    };

    let per_million = |tokens: u64, rate: f64| (tokens as f64 / 1_000_000.0) * rate;
    per_million(input_tokens, pricing.input)
        + per_million(output_tokens, pricing.output)
        + per_million(cached_input_tokens, pricing.cache_read)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unknown_model_costs_zero() {
        assert_eq!(estimate_cost(1_000_000, 1_000_000, "mystery-model", 0), 0.0);
        assert!(pricing_for("mystery-model").is_none());
    }

    #[test]
    fn cost_is_linear_in_token_counts() {
        let model = "claude-sonnet-4-5";
        let base = estimate_cost(100_000, 50_000, model, 0);
        let doubled = estimate_cost(200_000, 100_000, model, 0);
        assert!((doubled - 2.0 * base).abs() < 1e-9);
    }

    #[test]
    fn cached_input_prices_at_cache_read_rate() {
        let model = "claude-haiku-4-5";
        let cost = estimate_cost(0, 0, model, 1_000_000);
        assert!((cost - 0.10).abs() < 1e-9);
    }

    #[test]
    fn zero_tokens_cost_nothing() {
        assert_eq!(estimate_cost(0, 0, "claude-sonnet-4-5", 0), 0.0);
    }
}
