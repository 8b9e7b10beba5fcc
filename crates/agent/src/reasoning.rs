//! General reasoning agent
//!
//! Last-resort answerer for turns that are neither booking steps nor
//! answerable from the uploaded documents. When given a tool executor it
//! offers every registered tool to the model, runs the calls the model
//! asks for, and feeds each result back until the model answers in text.

use async_trait::async_trait;
use std::sync::Arc;

use concierge_core::QuestionAnswerer;
use concierge_llm::{
    parse_tool_call, LlmBackend, LlmFactory, LlmProviderConfig, Message, PromptBuilder,
    ToolDefinition,
};
use concierge_tools::{ToolExecutor, ToolSchema};

use crate::AgentError;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant. You can answer questions \
about documents the user has uploaded, help the user book an appointment by collecting their \
name, phone number, email address and preferred date, and check that those details are valid. \
Answer concisely.";

/// Tool calls allowed per question before the last reply is returned as is
pub const MAX_TOOL_ROUNDS: usize = 3;

pub struct ReasoningAgent {
    llm: Arc<dyn LlmBackend>,
    tools: Option<Arc<dyn ToolExecutor>>,
    system_prompt: String,
}

impl ReasoningAgent {
    pub fn new(llm: Arc<dyn LlmBackend>) -> Self {
        Self {
            llm,
            tools: None,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Build the backend from provider settings
    pub fn from_provider(config: &LlmProviderConfig) -> Result<Self, AgentError> {
        if config.model.trim().is_empty() {
            return Err(AgentError::Configuration("LLM model name is empty".into()));
        }
        Ok(Self::new(LlmFactory::create_backend(config)?))
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Let the model call the executor's tools
    pub fn with_tools(mut self, tools: Arc<dyn ToolExecutor>) -> Self {
        self.tools = Some(tools);
        self
    }

    fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .as_ref()
            .map(|tools| tools.list_tools().iter().map(definition).collect())
            .unwrap_or_default()
    }

    /// Run one requested tool and phrase the result for the model
    async fn run_tool(
        &self,
        tools: &dyn ToolExecutor,
        name: &str,
        arguments: serde_json::Value,
    ) -> String {
        match tools.execute(name, arguments).await {
            Ok(output) => {
                let outcome = if output.is_error { "error" } else { "ok" };
                metrics::counter!(
                    "concierge_tool_calls_total",
                    "tool" => name.to_string(),
                    "outcome" => outcome
                )
                .increment(1);
                format!("Tool {} returned: {}", name, output.as_text())
            }
            Err(e) => {
                tracing::warn!(tool = name, error = %e, "Tool call from reasoning failed");
                metrics::counter!(
                    "concierge_tool_calls_total",
                    "tool" => name.to_string(),
                    "outcome" => "failed"
                )
                .increment(1);
                format!("Tool {} failed: {}", name, e)
            }
        }
    }
}

fn definition(schema: &ToolSchema) -> ToolDefinition {
    ToolDefinition::new(
        &schema.name,
        &schema.description,
        serde_json::to_value(&schema.input_schema).unwrap_or_default(),
    )
}

#[async_trait]
impl QuestionAnswerer for ReasoningAgent {
    async fn answer(&self, question: &str) -> concierge_core::Result<String> {
        let mut messages = PromptBuilder::new()
            .system(&self.system_prompt)
            .tools(&self.tool_definitions())
            .user(question)
            .build();

        let mut rounds = 0;
        loop {
            let result = self.llm.generate(&messages).await?;
            tracing::debug!(
                model = self.llm.model_name(),
                tokens = result.tokens,
                elapsed_ms = result.total_time_ms,
                round = rounds,
                "Reasoning agent replied"
            );

            let (tools, call) = match (&self.tools, parse_tool_call(&result.text)) {
                (Some(tools), Some(call)) if rounds < MAX_TOOL_ROUNDS => (tools, call),
                (_, Some(call)) => {
                    tracing::warn!(tool = %call.name, rounds, "Tool call not run, answering with the text before it");
                    return Ok(call.text_before);
                }
                (_, None) => return Ok(result.text.trim().to_string()),
            };

            tracing::info!(tool = %call.name, "Reasoning agent calling tool");
            let observation = self.run_tool(tools.as_ref(), &call.name, call.arguments).await;
            messages.push(Message::assistant(result.text));
            messages.push(Message::tool(observation));
            rounds += 1;
        }
    }

    fn name(&self) -> &str {
        "reasoning"
    }
}
