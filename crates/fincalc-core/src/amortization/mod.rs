pub mod schedule;
pub mod summary;

pub use schedule::{
    build_amortization, compute_schedule, AmortizationInput, AmortizationOutput,
    AmortizationRow, AmortizationSystem,
};
pub use summary::{summarize, AmortizationSummary};
