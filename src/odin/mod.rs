//! 0DIN threat-feed integration
//!
//! Everything a bot needs to answer "has my submission been scanned?":
//! UUID validation, the HTTP client, interpretation of the response and the
//! composed [`SubmissionChecker`].

pub mod checker;
pub mod client;
pub mod feed;
pub mod interpret;
pub mod validate;

pub use checker::{CheckOutcome, SubmissionChecker};
pub use client::{HttpOutcome, ThreatFeedClient, TransportError};
pub use interpret::{interpret, ParseError, ScanOutcome};
pub use validate::is_valid_submission_id;

pub const API_BASE_URL: &str = "https://0din.ai/api/v1/threatfeed/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

pub const INVALID_UUID_MSG: &str = "The UUID you provided is not valid. Please provide a valid UUID.";
pub const API_KEY_NOT_CONFIGURED_MSG: &str = "API key not configured.";
pub const IS_UUID_VALID_MSG: &str = "Did you provide a valid UUID?";
pub const SCANNED_MSG: &str = "It has been scanned";
pub const NOT_SCANNED_MSG: &str = "It hasn't been checked, hang tight.";

pub fn api_request_failed_msg(cause: &str) -> String {
    format!("API request failed: {}", cause)
}

pub fn api_returned_status_msg(status: u16, body: &str) -> String {
    format!("API returned status code {}: {}", status, body)
}
