//! The `search_docs` tool: documentation search over the hosted index.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::gateway::{SearchGateway, SearchRequest, SearchResult};
use crate::tools::{Tool, ToolResult};

pub const SEARCH_DOCS_NAME: &str = "search_docs";

/// Returned instead of result markup when the index has no match.
pub const NO_RESULTS: &str = "<no_results>No matching documents found.</no_results>";

const DESCRIPTION: &str = "Search the hosted documentation index for pages relevant to a \
natural-language query. Returns the best-matching document fragments, each with its source \
filename and relevance score.";

/// Tool wrapper around [`SearchGateway`].
pub struct SearchDocsTool {
    gateway: Arc<SearchGateway>,
}

impl SearchDocsTool {
    pub fn new(gateway: Arc<SearchGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Tool for SearchDocsTool {
    fn name(&self) -> &str {
        SEARCH_DOCS_NAME
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn input_schema(&self) -> Value {
        let schema = schemars::schema_for!(SearchRequest);
        let mut value =
            serde_json::to_value(schema).unwrap_or_else(|_| serde_json::json!({"type": "object"}));

        if let Some(obj) = value.as_object_mut() {
            if !obj.contains_key("properties") {
                obj.insert(
                    "properties".to_string(),
                    Value::Object(serde_json::Map::new()),
                );
            }
            if !obj.contains_key("additionalProperties") {
                obj.insert("additionalProperties".to_string(), Value::Bool(true));
            }
        }

        value
    }

    async fn execute(&self, input: Value) -> ToolResult {
        let request: SearchRequest = match serde_json::from_value(input) {
            Ok(request) => request,
            Err(e) => return ToolResult::error(format!("Invalid input: {}", e)),
        };

        match self.gateway.query(&request).await {
            Ok(results) => ToolResult::success(render_results(&results)),
            Err(e) => ToolResult::error(e.to_string()),
        }
    }
}

/// Render projected results as the markup handed back to tool callers.
pub fn render_results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return NO_RESULTS.to_string();
    }

    results
        .iter()
        .map(|result| {
            format!(
                "<result><filename>{}</filename><score>{}</score><text>{}</text></result>",
                result.filename, result.score, result.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ResultAttributes, SearchBackend};
    use crate::config::BackendConfig;
    use crate::retry::RetryPolicy;
    use serde_json::json;

    fn test_tool() -> SearchDocsTool {
        // Discard port; validation failures never reach the network.
        let config = BackendConfig::new("test-key", "vs_test").base_url("http://127.0.0.1:9");
        let gateway = SearchGateway::new(SearchBackend::new(&config).unwrap())
            .with_retry_policy(RetryPolicy::no_retries());
        SearchDocsTool::new(Arc::new(gateway))
    }

    fn result(filename: &str, score: f64, text: &str) -> SearchResult {
        SearchResult {
            file_id: format!("file-{filename}"),
            filename: filename.to_string(),
            score,
            text: text.to_string(),
            attributes: ResultAttributes::default(),
        }
    }

    #[test]
    fn test_tool_definition() {
        let tool = test_tool();
        assert_eq!(tool.name(), "search_docs");
        assert!(!tool.description().is_empty());

        let schema = tool.input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["query"]["minLength"], json!(1));
        assert_eq!(schema["properties"]["max_results"]["maximum"], json!(50));
        assert_eq!(schema["required"], json!(["query"]));
    }

    #[test]
    fn test_render_empty_results() {
        assert_eq!(render_results(&[]), NO_RESULTS);
    }

    #[test]
    fn test_render_joins_results_with_newlines() {
        let results = vec![
            result("install.md", 0.91, "Run the installer.\nThen restart."),
            result("faq.md", 0.47, "See the FAQ."),
        ];

        let rendered = render_results(&results);
        assert_eq!(
            rendered,
            "<result><filename>install.md</filename><score>0.91</score>\
             <text>Run the installer.\nThen restart.</text></result>\n\
             <result><filename>faq.md</filename><score>0.47</score>\
             <text>See the FAQ.</text></result>"
        );
    }

    #[tokio::test]
    async fn test_execute_rejects_malformed_input() {
        let tool = test_tool();
        let result = tool.execute(json!({"max_results": 3})).await;
        assert!(result.is_error());
        assert!(result.text().contains("Invalid input"));
    }

    #[tokio::test]
    async fn test_execute_rejects_blank_query() {
        let tool = test_tool();
        let result = tool.execute(json!({"query": "   "})).await;
        assert!(result.is_error());
        assert!(result.text().contains("query must not be empty"));
    }
}
