pub mod amortization;
pub mod appraisal;
