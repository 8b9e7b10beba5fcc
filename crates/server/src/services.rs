//! Collaborator wiring
//!
//! Turns [`Settings`] into the shared collaborators every conversation uses
//! and builds one orchestrator per session from them.

use std::sync::Arc;
use std::time::Duration;

use concierge_agent::{Orchestrator, ReasoningAgent};
use concierge_config::{EmbedderKind, LlmSettings, SenderKind, Settings, SinkKind};
use concierge_core::{BookingSink, NotificationSender, QuestionAnswerer};
use concierge_llm::{LlmBackend, LlmFactory, LlmProvider, LlmProviderConfig};
use concierge_persistence::{
    HttpEmailNotifier, InMemoryBookingSink, MailRelayConfig, SheetBookingSink, SheetConfig,
    SimulatedEmailNotifier,
};
use concierge_rag::{
    ChunkConfig, DocumentIndexer, Embedder, EmbeddingConfig, OllamaEmbedder,
    OllamaEmbeddingConfig, RagError, RecursiveChunker, RetrievalAnswerer, RetrievalConfig,
    SimpleEmbedder,
};
use concierge_tools::{create_registry, BookingTool, ToolRegistry};

use crate::ServerError;

/// Shared collaborators
pub struct Services {
    pub booking: Arc<BookingTool>,
    /// Tools offered to the reasoning agent and over HTTP
    pub tools: Arc<ToolRegistry>,
    pub reasoning: Option<Arc<dyn QuestionAnswerer>>,
    /// Model used to answer from uploaded documents
    pub llm: Arc<dyn LlmBackend>,
    pub embedder: Arc<dyn Embedder>,
    pub chunk_config: ChunkConfig,
    pub retrieval_config: RetrievalConfig,
}

/// Outcome of a document upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSummary {
    pub documents: usize,
    pub chunks: usize,
}

impl Services {
    pub fn from_settings(settings: &Settings) -> Result<Self, ServerError> {
        let sink = build_sink(settings)?;
        let notifier = build_notifier(settings)?;

        let booking = Arc::new(BookingTool::new(sink, notifier));
        let tools = Arc::new(create_registry(booking.clone()));

        let llm = LlmFactory::create_backend(&provider_config(&settings.llm)?)
            .map_err(|e| ServerError::Configuration(e.to_string()))?;
        let reasoning: Arc<dyn QuestionAnswerer> =
            Arc::new(ReasoningAgent::new(llm.clone()).with_tools(tools.clone()));

        let embedder = build_embedder(settings)?;

        Ok(Self {
            booking,
            tools,
            reasoning: Some(reasoning),
            llm,
            embedder,
            chunk_config: ChunkConfig::with_sizes(
                settings.rag.chunk_size,
                settings.rag.chunk_overlap,
            ),
            retrieval_config: RetrievalConfig {
                top_k: settings.rag.top_k,
                ..Default::default()
            },
        })
    }

    /// Fresh orchestrator with no documents loaded
    pub fn orchestrator(&self) -> Orchestrator {
        let orchestrator = Orchestrator::new(self.booking.clone());
        match &self.reasoning {
            Some(reasoning) => orchestrator.with_reasoning(reasoning.clone()),
            None => orchestrator,
        }
    }

    /// Index documents and wrap the index in a retrieval answerer
    ///
    /// Returns `None` for the answerer when no document held usable text.
    pub async fn build_retrieval(
        &self,
        documents: &[String],
    ) -> Result<(Option<Arc<dyn QuestionAnswerer>>, IndexSummary), RagError> {
        let chunker = RecursiveChunker::new(self.chunk_config.clone())?;
        let indexer = DocumentIndexer::new(chunker, self.embedder.clone());

        let Some(index) = indexer.build(documents).await? else {
            return Ok((
                None,
                IndexSummary {
                    documents: documents.len(),
                    chunks: 0,
                },
            ));
        };

        let summary = IndexSummary {
            documents: documents.len(),
            chunks: index.chunk_count(),
        };
        let answerer: Arc<dyn QuestionAnswerer> = Arc::new(RetrievalAnswerer::with_config(
            Arc::new(index),
            self.llm.clone(),
            self.retrieval_config.clone(),
        ));
        Ok((Some(answerer), summary))
    }
}

fn provider_config(llm: &LlmSettings) -> Result<LlmProviderConfig, ServerError> {
    let provider = LlmProvider::parse(&llm.provider).ok_or_else(|| {
        ServerError::Configuration(format!("Unknown LLM provider: {}", llm.provider))
    })?;

    Ok(LlmProviderConfig {
        provider,
        api_key: llm.api_key.clone(),
        endpoint: llm.endpoint.clone(),
        model: llm.model.clone(),
        max_tokens: llm.max_tokens,
        temperature: llm.temperature,
        timeout: Duration::from_secs(llm.timeout_secs),
        max_retries: llm.max_retries,
        ..Default::default()
    })
}

fn build_sink(settings: &Settings) -> Result<Arc<dyn BookingSink>, ServerError> {
    match settings.booking.sink {
        SinkKind::Memory => Ok(Arc::new(InMemoryBookingSink::new())),
        SinkKind::Sheet => {
            let endpoint = settings.booking.sheet_endpoint.clone().unwrap_or_default();
            let config = SheetConfig::from_env(endpoint, settings.booking.sheet_name.clone())
                .map_err(|e| ServerError::Configuration(e.to_string()))?;
            let sink = SheetBookingSink::new(config)
                .map_err(|e| ServerError::Configuration(e.to_string()))?;
            Ok(Arc::new(sink))
        }
    }
}

fn build_notifier(settings: &Settings) -> Result<Arc<dyn NotificationSender>, ServerError> {
    let notification = &settings.notification;
    match notification.sender {
        SenderKind::Simulated => Ok(Arc::new(SimulatedEmailNotifier::new())),
        SenderKind::Http => {
            let notifier = HttpEmailNotifier::new(MailRelayConfig {
                endpoint: notification.relay_endpoint.clone().unwrap_or_default(),
                smtp_host: notification.smtp_host.clone(),
                smtp_port: notification.smtp_port,
                sender_email: notification.sender_email.clone(),
                sender_password: notification.sender_password.clone(),
                timeout: Duration::from_secs(15),
            })
            .map_err(|e| ServerError::Configuration(e.to_string()))?;
            Ok(Arc::new(notifier))
        }
    }
}

fn build_embedder(settings: &Settings) -> Result<Arc<dyn Embedder>, ServerError> {
    let rag = &settings.rag;
    match rag.embedder {
        EmbedderKind::Simple => Ok(Arc::new(SimpleEmbedder::new(EmbeddingConfig {
            embedding_dim: rag.embedding_dim,
            normalize: true,
        }))),
        EmbedderKind::Ollama => {
            let mut config = OllamaEmbeddingConfig {
                model: rag.embedding_model.clone(),
                embedding_dim: rag.embedding_dim,
                ..Default::default()
            };
            if let Some(endpoint) = rag
                .embedding_endpoint
                .clone()
                .or_else(|| settings.llm.endpoint.clone())
            {
                config.endpoint = endpoint;
            }
            let embedder =
                OllamaEmbedder::new(config).map_err(|e| ServerError::Configuration(e.to_string()))?;
            Ok(Arc::new(embedder))
        }
    }
}
