use crate::tools::Tool;
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use scraper::{ElementRef, Html, Node, Selector};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

const BOT_USER_AGENT: &str = concat!("odinbot/", env!("CARGO_PKG_VERSION"));
pub const DUCKDUCKGO_HTML_URL: &str = "https://html.duckduckgo.com/html/";
const DEFAULT_SEARCH_RESULTS: usize = 5;

/// Elements whose text never reaches the model.
const SKIPPED_ELEMENTS: &[&str] = &["head", "script", "style", "noscript", "svg", "template"];
/// Elements that start a new line of text.
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "br", "li", "tr", "h1", "h2", "h3", "h4", "h5", "h6", "section", "article",
    "header", "footer", "ul", "ol", "table", "pre", "blockquote",
];

pub struct VisitWebpageTool {
    pub http: reqwest::Client,
    pub max_chars: usize,
    pub timeout: Duration,
}

#[async_trait]
impl Tool for VisitWebpageTool {
    fn name(&self) -> &str {
        "visit_webpage"
    }

    fn description(&self) -> &str {
        "Fetch a web page and return its text content, e.g. https://0din.ai/scope or https://0din.ai/research/taxonomy."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "Absolute http(s) URL to fetch"
                }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, params: Value) -> anyhow::Result<Value> {
        let url = params["url"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Missing url"))?;
        let parsed = reqwest::Url::parse(url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!("Unsupported URL scheme: {}", parsed.scheme());
        }

        let response = self
            .http
            .get(parsed)
            .header(USER_AGENT, BOT_USER_AGENT)
            .timeout(self.timeout)
            .send()
            .await?;
        let status = response.status().as_u16();
        let is_html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("html"));
        let body = response.text().await?;

        // Markup is stripped before truncating so the budget goes to text.
        let text = if is_html { html_to_text(&body) } else { body };
        let total_chars = text.chars().count();
        let content: String = text.chars().take(self.max_chars).collect();
        Ok(json!({
            "url": url,
            "status": status,
            "content": content,
            "truncated": total_chars > self.max_chars
        }))
    }
}

/// Visible text of an HTML document, one block per line.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut raw = String::new();
    collect_text(document.root_element(), &mut raw);

    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if SKIPPED_ELEMENTS.contains(&name) {
                    continue;
                }
                let block = BLOCK_ELEMENTS.contains(&name);
                if block {
                    out.push('\n');
                }
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, out);
                }
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Keyless web search through DuckDuckGo's HTML endpoint.
pub struct SearchWebTool {
    http: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl SearchWebTool {
    pub fn new(http: reqwest::Client, timeout: Duration) -> Self {
        Self::with_endpoint(http, DUCKDUCKGO_HTML_URL, timeout)
    }

    pub fn with_endpoint(http: reqwest::Client, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            timeout,
        }
    }
}

#[async_trait]
impl Tool for SearchWebTool {
    fn name(&self) -> &str {
        "search_web"
    }

    fn description(&self) -> &str {
        "Search the web and return the top results (title, url, snippet). Use visit_webpage to read a result."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum number of results (default: 5)",
                    "default": DEFAULT_SEARCH_RESULTS,
                    "minimum": 1,
                    "maximum": 10
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, params: Value) -> anyhow::Result<Value> {
        let query = params["query"]
            .as_str()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| anyhow::anyhow!("Missing query"))?;
        let max_results = params["max_results"]
            .as_u64()
            .map(|n| n.clamp(1, 10) as usize)
            .unwrap_or(DEFAULT_SEARCH_RESULTS);

        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("q", query)])
            .header(USER_AGENT, BOT_USER_AGENT)
            .timeout(self.timeout)
            .send()
            .await?;
        if !response.status().is_success() {
            anyhow::bail!("Search failed with status {}", response.status());
        }
        let body = response.text().await?;

        let results = parse_search_results(&body, max_results)?;
        debug!("search_web '{}' returned {} result(s)", query, results.len());
        Ok(json!({ "query": query, "results": results }))
    }
}

/// Pull `{title, url, snippet}` entries out of a DuckDuckGo HTML result page.
fn parse_search_results(html: &str, limit: usize) -> anyhow::Result<Vec<Value>> {
    let selector = |css: &'static str| {
        Selector::parse(css).map_err(|e| anyhow::anyhow!("Invalid selector {}: {}", css, e))
    };
    let result_sel = selector("div.result")?;
    let link_sel = selector("a.result__a")?;
    let snippet_sel = selector(".result__snippet")?;

    let document = Html::parse_document(html);
    let results = document
        .select(&result_sel)
        .filter_map(|result| {
            let link = result.select(&link_sel).next()?;
            let href = link.value().attr("href")?;
            let title = link.text().collect::<String>().trim().to_string();
            let snippet = result
                .select(&snippet_sel)
                .next()
                .map(|s| s.text().collect::<String>().trim().to_string())
                .unwrap_or_default();
            Some(json!({
                "title": title,
                "url": resolve_result_url(href),
                "snippet": snippet
            }))
        })
        .take(limit)
        .collect();
    Ok(results)
}

/// DuckDuckGo wraps targets as `//duckduckgo.com/l/?uddg=<encoded>`.
fn resolve_result_url(href: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else {
        href.to_string()
    };
    reqwest::Url::parse(&absolute)
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, target)| target.into_owned())
        })
        .unwrap_or(absolute)
}
