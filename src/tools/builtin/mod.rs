pub mod odin;
pub mod time;
pub mod web;

use crate::odin::SubmissionChecker;
use crate::tools::ToolRegistry;
use std::sync::Arc;
use std::time::Duration;

/// Registry with every built-in tool the agent gets.
pub fn default_registry(
    checker: &SubmissionChecker,
    http: reqwest::Client,
    webpage_max_chars: usize,
    timeout: Duration,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(odin::CheckSubmissionTool {
        checker: checker.clone(),
    }));
    registry.register(Arc::new(odin::GetThreatFeedTool {
        checker: checker.clone(),
    }));
    registry.register(Arc::new(time::CurrentTimeTool));
    registry.register(Arc::new(web::VisitWebpageTool {
        http: http.clone(),
        max_chars: webpage_max_chars,
        timeout,
    }));
    registry.register(Arc::new(web::SearchWebTool::new(http, timeout)));
    registry
}
