use napi::Result as NapiResult;
use napi_derive::napi;

use fincalc_core::amortization::{self, AmortizationInput};
use fincalc_core::appraisal::{self, AppraisalInput};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn build_amortization(input_json: String) -> NapiResult<String> {
    let input: AmortizationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = amortization::build_amortization(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compute_schedule(input_json: String) -> NapiResult<String> {
    let input: AmortizationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let rows = amortization::compute_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&rows).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Investment appraisal
// ---------------------------------------------------------------------------

#[napi]
pub fn appraise_investment(input_json: String) -> NapiResult<String> {
    let input: AppraisalInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = appraisal::appraise_investment(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn blank_cash_flows(horizon: u32) -> NapiResult<String> {
    let flows = appraisal::blank_cash_flows(horizon).map_err(to_napi_error)?;
    serde_json::to_string(&flows).map_err(to_napi_error)
}

#[napi]
pub fn remove_cash_flow(flows_json: String, index: u32) -> NapiResult<String> {
    let flows: Vec<fincalc_core::CashFlow> =
        serde_json::from_str(&flows_json).map_err(to_napi_error)?;
    let next = appraisal::remove_cash_flow(&flows, index as usize).map_err(to_napi_error)?;
    serde_json::to_string(&next).map_err(to_napi_error)
}
