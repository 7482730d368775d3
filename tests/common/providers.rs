use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use factloom::message::Message;
use factloom::pipelines::{ChatModel, ChatResponse, ProviderError, SearchTool};

/// Chat model returning scripted responses in order.
///
/// Once the script runs dry it keeps returning the final fallback so
/// workflows always terminate.
pub struct ScriptedChatModel {
    responses: Mutex<VecDeque<ChatResponse>>,
    fallback: ChatResponse,
}

impl ScriptedChatModel {
    pub fn new(responses: Vec<ChatResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            fallback: ChatResponse::text("(script exhausted)"),
        }
    }
}

#[async_trait]
impl ChatModel for ScriptedChatModel {
    async fn complete(&self, _messages: &[Message]) -> Result<ChatResponse, ProviderError> {
        let mut responses = self.responses.lock().unwrap();
        Ok(responses.pop_front().unwrap_or_else(|| self.fallback.clone()))
    }
}

/// Search tool echoing the query back in a formatted result block.
pub struct StaticSearchTool;

#[async_trait]
impl SearchTool for StaticSearchTool {
    async fn search(&self, query: &str) -> Result<String, ProviderError> {
        Ok(format!(
            "Title: result for {query}\nURL: https://example.com\nContent: details about {query}"
        ))
    }
}

/// Search tool that always fails.
pub struct FailingSearchTool;

#[async_trait]
impl SearchTool for FailingSearchTool {
    async fn search(&self, _query: &str) -> Result<String, ProviderError> {
        Err(ProviderError::new("search", "upstream unavailable"))
    }
}
