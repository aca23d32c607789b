use serde_json::{json, Value};
use tracing::error;

use super::checker::SubmissionChecker;
use super::{api_request_failed_msg, api_returned_status_msg, API_KEY_NOT_CONFIGURED_MSG};

impl SubmissionChecker {
    /// Fetch the whole threat feed as raw JSON.
    ///
    /// Failures come back as an `{"error": ...}` object so the result can be
    /// handed straight to a tool caller.
    pub async fn fetch_feed(&self) -> Value {
        let Some(credential) = self.credential() else {
            error!("ODIN_API_KEY not set in environment.");
            return json!({ "error": API_KEY_NOT_CONFIGURED_MSG });
        };

        let response = match self.client().fetch_feed(credential).await {
            Ok(response) => response,
            Err(e) => {
                error!("API request failed: {}", e);
                return json!({ "error": api_request_failed_msg(&e.cause) });
            }
        };

        if !response.is_ok() {
            error!(
                "API returned status code {}: {}",
                response.status, response.body
            );
            return json!({ "error": api_returned_status_msg(response.status, &response.body) });
        }

        match serde_json::from_str(&response.body) {
            Ok(value) => value,
            Err(e) => {
                error!("Error parsing JSON response: {}", e);
                json!({ "error": e.to_string(), "raw": response.body })
            }
        }
    }
}

/// Render the feed as one line per ticket.
pub fn format_feed_summary(feed: &Value) -> String {
    let Some(feed) = feed.as_object() else {
        return "Invalid feed data.".to_string();
    };

    let tickets = ["tickets", "results", "data"]
        .iter()
        .filter_map(|key| feed.get(*key).and_then(Value::as_array))
        .find(|list| !list.is_empty());

    let Some(tickets) = tickets else {
        return "No tickets found in the threat feed.".to_string();
    };

    let mut lines = vec!["ODIN Threat Feed Summary:".to_string()];
    for ticket in tickets {
        let id = first_field(ticket, &["id", "uuid"]).unwrap_or_else(|| "<no id>".to_string());
        let title = first_field(ticket, &["title", "summary", "description"])
            .unwrap_or_else(|| "<no title>".to_string());
        let status = first_field(ticket, &["status"]).unwrap_or_else(|| "<no status>".to_string());
        let severity =
            first_field(ticket, &["severity"]).unwrap_or_else(|| "<no severity>".to_string());
        lines.push(format!(
            "- [{}] {} (Status: {}, Severity: {})",
            id, title, status, severity
        ));
    }
    lines.join("\n")
}

/// First present, non-empty field among `keys`, rendered without JSON quotes.
fn first_field(ticket: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match ticket.get(*key)? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    })
}
