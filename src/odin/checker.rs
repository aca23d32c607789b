use tracing::{debug, error};

use super::client::ThreatFeedClient;
use super::interpret::{interpret, ScanOutcome};
use super::validate::is_valid_submission_id;
use super::{
    api_request_failed_msg, api_returned_status_msg, API_KEY_NOT_CONFIGURED_MSG,
    INVALID_UUID_MSG, IS_UUID_VALID_MSG,
};

/// Terminal state of a single submission check.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    InvalidId,
    NotConfigured,
    Transport(String),
    Upstream { status: u16, body: String },
    /// The API answered 200 with something that is not JSON.
    RawBody(String),
    Scan(ScanOutcome),
}

impl CheckOutcome {
    /// The user-facing reply for this outcome.
    pub fn message(&self) -> String {
        match self {
            Self::InvalidId => INVALID_UUID_MSG.to_string(),
            Self::NotConfigured => API_KEY_NOT_CONFIGURED_MSG.to_string(),
            Self::Transport(cause) => api_request_failed_msg(cause),
            Self::Upstream { status, body } => format!(
                "{}\n{}",
                api_returned_status_msg(*status, body),
                IS_UUID_VALID_MSG
            ),
            Self::RawBody(text) => text.clone(),
            Self::Scan(scan) => scan.message(),
        }
    }

    /// Short machine-friendly label, used by the agent's structured output.
    pub fn status_label(&self) -> &'static str {
        match self {
            Self::Scan(ScanOutcome::Scanned) => "processed",
            Self::Scan(ScanOutcome::NotScanned) => "not_processed",
            Self::Scan(ScanOutcome::Unrecognized(_)) | Self::RawBody(_) => "unknown",
            Self::InvalidId => "invalid_uuid",
            Self::NotConfigured | Self::Transport(_) | Self::Upstream { .. } => "error",
        }
    }
}

/// Validates a submission id, looks it up and renders the result.
///
/// Every failure is folded into a [`CheckOutcome`]; nothing escapes `check`.
#[derive(Clone, Debug)]
pub struct SubmissionChecker {
    client: ThreatFeedClient,
    credential: Option<String>,
}

impl SubmissionChecker {
    pub fn new(client: ThreatFeedClient, credential: Option<String>) -> Self {
        // An empty key is as good as no key.
        let credential = credential.filter(|key| !key.is_empty());
        Self { client, credential }
    }

    pub fn client(&self) -> &ThreatFeedClient {
        &self.client
    }

    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }

    pub async fn check(&self, id: &str) -> String {
        self.check_outcome(id).await.message()
    }

    pub async fn check_outcome(&self, id: &str) -> CheckOutcome {
        if !is_valid_submission_id(id) {
            debug!("Rejected submission id {:?}", id);
            return CheckOutcome::InvalidId;
        }

        let Some(credential) = self.credential() else {
            error!("ODIN_API_KEY not set in environment.");
            return CheckOutcome::NotConfigured;
        };

        let response = match self.client.fetch_submission(id, credential).await {
            Ok(response) => response,
            Err(e) => {
                error!("API request failed: {}", e);
                return CheckOutcome::Transport(e.cause);
            }
        };

        if !response.is_ok() {
            error!(
                "API returned status code {}: {}",
                response.status, response.body
            );
            return CheckOutcome::Upstream {
                status: response.status,
                body: response.body,
            };
        }

        match interpret(&response.body) {
            Ok(scan) => CheckOutcome::Scan(scan),
            Err(e) => {
                error!("Error parsing JSON response: {}", e);
                CheckOutcome::RawBody(e.raw)
            }
        }
    }
}
