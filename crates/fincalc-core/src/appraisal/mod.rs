pub mod analysis;
pub mod cash_flows;
pub mod irr;
pub mod npv;
pub mod payback;

pub use analysis::{
    appraise_investment, compute_appraisal, AppraisalInput, AppraisalOutput, AppraisalResult,
};
pub use cash_flows::{blank_cash_flows, push_cash_flow, remove_cash_flow, replace_cash_flow};
pub use irr::{solve_irr, IrrSolution};
pub use npv::AppraisalRow;
pub use payback::discounted_payback;
