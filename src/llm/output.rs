//! Structured answers the agent hands back through the `final_answer` tool.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct UserTopicSummary {
    /// Discord username or nickname of the poster
    pub user_handle: String,
    /// Main topic the user posted about on the given date
    pub topic: String,
    /// Number of messages the user posted about that topic on that date
    pub message_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SummaryOutput {
    /// ISO formatted date (YYYY-MM-DD) that was summarised
    pub date: String,
    /// Discord channel ID that was summarised
    pub channel_id: String,
    /// One row per unique user with their main topic and message count
    pub summaries: Vec<UserTopicSummary>,
    /// Relative file path where the summary was saved locally
    #[serde(default)]
    pub file_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SubmissionStatus {
    /// The UUID of the submission being checked
    pub uuid: String,
    /// Either 'processed' or 'not_processed'
    pub status: String,
    /// Additional details about the submission status
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SubmissionOutput {
    /// The UUID of the submission being checked
    pub uuid: String,
    pub submission_status: SubmissionStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AgentResponse {
    /// The kind of response, e.g. 'refusal', 'question', 'clarification'
    pub response_type: String,
    /// The message shown to the user
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentOutput {
    Summary(SummaryOutput),
    SubmissionStatus(SubmissionOutput),
    AgentResponse(AgentResponse),
}

/// Wrapper so the tool parameters have an object at the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StructuredOutput {
    /// The structured response from the agent
    pub response: AgentOutput,
}

impl SummaryOutput {
    pub fn format_message(&self) -> String {
        let lines: Vec<String> = self
            .summaries
            .iter()
            .map(|row| {
                format!(
                    "**{}**: {} ({} messages)",
                    row.user_handle, row.topic, row.message_count
                )
            })
            .collect();

        format!(
            "📊 Summary for {}\n\n{}\n\nSummary saved to: `{}`",
            self.date,
            lines.join("\n"),
            self.file_path
        )
    }
}

impl SubmissionOutput {
    pub fn format_message(&self) -> String {
        let status = &self.submission_status;
        format!(
            "🔍 Submission Status for {}\nStatus: {}\nDetails: {}",
            status.uuid, status.status, status.details
        )
    }
}

impl AgentResponse {
    pub fn format_message(&self) -> String {
        self.message.clone()
    }
}

impl StructuredOutput {
    pub fn from_text(message: impl Into<String>) -> Self {
        Self {
            response: AgentOutput::AgentResponse(AgentResponse {
                response_type: "message".to_string(),
                message: message.into(),
            }),
        }
    }

    pub fn format_message(&self) -> String {
        match &self.response {
            AgentOutput::Summary(summary) => summary.format_message(),
            AgentOutput::SubmissionStatus(submission) => submission.format_message(),
            AgentOutput::AgentResponse(response) => response.format_message(),
        }
    }

    /// JSON schema used as the `final_answer` tool parameters.
    pub fn parameters_schema() -> serde_json::Value {
        let schema = schemars::schema_for!(StructuredOutput);
        let mut value = serde_json::to_value(schema).unwrap_or_else(|_| serde_json::json!({"type": "object"}));
        if let Some(obj) = value.as_object_mut() {
            obj.remove("$schema");
            obj.remove("title");
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_summary() {
        let output = SummaryOutput {
            date: "2024-03-20".to_string(),
            channel_id: "123456".to_string(),
            summaries: vec![
                UserTopicSummary {
                    user_handle: "user1".to_string(),
                    topic: "topic1".to_string(),
                    message_count: 3,
                },
                UserTopicSummary {
                    user_handle: "user2".to_string(),
                    topic: "topic2".to_string(),
                    message_count: 2,
                },
            ],
            file_path: "logs/test.txt".to_string(),
        };

        assert_eq!(
            output.format_message(),
            "📊 Summary for 2024-03-20\n\n**user1**: topic1 (3 messages)\n**user2**: topic2 (2 messages)\n\nSummary saved to: `logs/test.txt`"
        );
    }

    #[test]
    fn test_format_submission_and_response() {
        let submission = SubmissionOutput {
            uuid: "test-uuid".to_string(),
            submission_status: SubmissionStatus {
                uuid: "test-uuid".to_string(),
                status: "processed".to_string(),
                details: "Test details".to_string(),
            },
        };
        let text = submission.format_message();
        assert!(text.contains("test-uuid"));
        assert!(text.contains("Status: processed"));

        let response = StructuredOutput::from_text("Test message");
        assert_eq!(response.format_message(), "Test message");
    }

    #[test]
    fn test_deserialize_tagged_variants() {
        let parsed: StructuredOutput = serde_json::from_value(json!({
            "response": {
                "type": "submission_status",
                "uuid": "u",
                "submission_status": {"uuid": "u", "status": "not_processed", "details": "d"}
            }
        }))
        .unwrap();
        assert!(matches!(parsed.response, AgentOutput::SubmissionStatus(_)));

        let parsed: StructuredOutput = serde_json::from_value(json!({
            "response": {"type": "summary", "date": "2024-01-01", "channel_id": "1", "summaries": []}
        }))
        .unwrap();
        let AgentOutput::Summary(summary) = parsed.response else {
            panic!("expected summary");
        };
        assert_eq!(summary.file_path, "");
    }

    #[test]
    fn test_parameters_schema_is_object() {
        let schema = StructuredOutput::parameters_schema();
        assert_eq!(schema["type"], "object");
        assert!(schema["properties"]["response"].is_object());
        assert!(schema.get("$schema").is_none());
    }
}
