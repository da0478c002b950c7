//! Token counting and cost accounting.
//!
//! All size and savings numbers in the system come from one deterministic
//! subword scheme (`cl100k_base`) so counts stay comparable across crates
//! and stable across runs.

mod counter;
mod pricing;
mod savings;

pub use counter::count;
pub use pricing::{estimate_cost, pricing_for, ModelPricing};
pub use savings::SavingsReport;
