use crate::odin::SubmissionChecker;
use crate::tools::Tool;
use async_trait::async_trait;
use serde_json::{json, Value};

pub struct CheckSubmissionTool {
    pub checker: SubmissionChecker,
}

#[async_trait]
impl Tool for CheckSubmissionTool {
    fn name(&self) -> &str {
        "check_submission"
    }

    fn description(&self) -> &str {
        "Check whether an ODIN submission (identified by a UUID v4) has been scanned by the threat feed."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "uuid": {
                    "type": "string",
                    "description": "The submission UUID, lower-case v4 format"
                }
            },
            "required": ["uuid"]
        })
    }

    async fn execute(&self, params: Value) -> anyhow::Result<Value> {
        let uuid = params["uuid"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Missing uuid"))?;

        let outcome = self.checker.check_outcome(uuid).await;
        Ok(json!({
            "uuid": uuid,
            "status": outcome.status_label(),
            "result": outcome.message()
        }))
    }
}

pub struct GetThreatFeedTool {
    pub checker: SubmissionChecker,
}

#[async_trait]
impl Tool for GetThreatFeedTool {
    fn name(&self) -> &str {
        "get_threatfeed"
    }

    fn description(&self) -> &str {
        "Fetch the full ODIN threat feed as raw JSON. Returns an object with an `error` field on failure."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _params: Value) -> anyhow::Result<Value> {
        Ok(self.checker.fetch_feed().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::odin::ThreatFeedClient;
    use std::time::Duration;

    fn checker(base_url: &str, key: Option<&str>) -> SubmissionChecker {
        SubmissionChecker::new(
            ThreatFeedClient::new(reqwest::Client::new(), base_url, Duration::from_secs(5)),
            key.map(str::to_string),
        )
    }

    #[tokio::test]
    async fn test_check_submission_tool_reports_status() {
        let tool = CheckSubmissionTool {
            checker: checker("http://127.0.0.1:9/", None),
        };

        let invalid = tool.execute(json!({"uuid": "nope"})).await.unwrap();
        assert_eq!(invalid["status"], "invalid_uuid");
        assert_eq!(
            invalid["result"],
            "The UUID you provided is not valid. Please provide a valid UUID."
        );

        let unconfigured = tool
            .execute(json!({"uuid": "6f1c2d3e-4a5b-4c6d-8e7f-0a1b2c3d4e5f"}))
            .await
            .unwrap();
        assert_eq!(unconfigured["status"], "error");
        assert_eq!(unconfigured["result"], "API key not configured.");

        assert!(tool.execute(json!({})).await.is_err());
    }

    #[tokio::test]
    async fn test_threatfeed_tool_passes_feed_through() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/")
            .with_status(200)
            .with_body(r#"{"tickets":[]}"#)
            .create_async()
            .await;

        let tool = GetThreatFeedTool {
            checker: checker(&format!("{}/", server.url()), Some("key")),
        };
        assert_eq!(tool.execute(json!({})).await.unwrap(), json!({"tickets": []}));
    }
}
