/// Gift-code redemption pipeline: request signing, API client, captcha OCR
/// and the batch driver
mod batch;
mod client;
mod signing;
mod solver;

pub use batch::{BatchOutcome, GiftCodeRedeemer, run_batch};
pub use solver::CaptchaModel;
