//! Short-term and long-term prediction analysis
//!
//! Whitening and pitch lag estimation, LTP coefficient estimation with
//! codebook quantization, Burg LPC with NLSF interpolation search, and the
//! LTP scaling decision.

mod find_lpc;
mod find_ltp;
mod find_pitch_lags;
mod lpc_filter;
mod ltp_quant;
mod ltp_scale;

pub use find_lpc::{find_lpc, interpolate_nlsf, LpcResult};
pub use find_ltp::find_ltp;
pub use find_pitch_lags::{find_pitch_lags, PitchLagResult};
pub use lpc_filter::lpc_analysis_filter;
pub use ltp_quant::{quant_ltp_gains, LtpQuantResult};
pub use ltp_scale::ltp_scale_ctrl;
