//! Cost accounting for model invocations.
//!
//! Estimates per-request cost in USD from a static per-model rate table and
//! word counts (a deliberate proxy for token counts), and maintains the
//! gateway-wide lifetime running total. The total is a shared counter owned
//! here, not derived from the audit log: once the bounded log starts
//! evicting, the two views diverge and are meant to.

use std::collections::HashMap;

use tokio::sync::RwLock;

/// Rates used when the model is not in the table.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Per-model rates in USD per 1000 words.
#[derive(Debug, Clone, Copy)]
struct Rate {
    input_per_1000: f64,
    output_per_1000: f64,
}

/// Static rate table for the models the router can select.
fn rate_table() -> HashMap<&'static str, Rate> {
    let mut m = HashMap::new();
    m.insert(
        "gpt-4o-mini",
        Rate {
            input_per_1000: 0.00015,
            output_per_1000: 0.0006,
        },
    );
    m.insert(
        "gpt-4o",
        Rate {
            input_per_1000: 0.0025,
            output_per_1000: 0.01,
        },
    );
    m.insert(
        "o1-mini",
        Rate {
            input_per_1000: 0.00015,
            output_per_1000: 0.0006,
        },
    );
    m
}

/// Round to `places` decimal places.
#[must_use]
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Estimates per-request cost and accumulates the lifetime total.
pub struct CostAccountant {
    rates: HashMap<&'static str, Rate>,
    total: RwLock<f64>,
}

impl CostAccountant {
    /// Create an accountant with the built-in rate table and a zero total.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rates: rate_table(),
            total: RwLock::new(0.0),
        }
    }

    /// Estimate the cost of one request, rounded to 6 decimal places.
    ///
    /// Unrecognized models fall back to the [`DEFAULT_MODEL`] rates.
    #[must_use]
    pub fn estimate(&self, model: &str, input_words: usize, output_words: usize) -> f64 {
        let rate = self
            .rates
            .get(model)
            .or_else(|| self.rates.get(DEFAULT_MODEL))
            .copied()
            .unwrap_or(Rate {
                input_per_1000: 0.0,
                output_per_1000: 0.0,
            });
        let cost = (input_words as f64 * rate.input_per_1000
            + output_words as f64 * rate.output_per_1000)
            / 1000.0;
        round_to(cost, 6)
    }

    /// Estimate and add to the lifetime running total.
    pub async fn charge(&self, model: &str, input_words: usize, output_words: usize) -> f64 {
        let cost = self.estimate(model, input_words, output_words);
        let mut total = self.total.write().await;
        *total += cost;
        cost
    }

    /// The lifetime total across all requests.
    pub async fn total_cost(&self) -> f64 {
        *self.total.read().await
    }
}

impl Default for CostAccountant {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
