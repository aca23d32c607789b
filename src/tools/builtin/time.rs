use crate::tools::Tool;
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use serde_json::{json, Value};

pub struct CurrentTimeTool;

#[async_trait]
impl Tool for CurrentTimeTool {
    fn name(&self) -> &str {
        "get_current_gmt_time"
    }

    fn description(&self) -> &str {
        "Get the current GMT/UTC date and time. Use this to resolve relative dates such as 'today' or 'yesterday'."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _params: Value) -> anyhow::Result<Value> {
        Ok(describe(Utc::now()))
    }
}

fn describe(now: DateTime<Utc>) -> Value {
    json!({
        "current_gmt_time": now.to_rfc3339(),
        "gmt_date": now.format("%Y-%m-%d").to_string(),
        "gmt_time": now.format("%H:%M:%S").to_string(),
        "timezone": "GMT",
        "utc_offset": "+00:00",
        "day_of_week": now.format("%A").to_string(),
        "day_of_year": now.ordinal()
    })
}
