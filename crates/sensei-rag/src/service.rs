use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use sensei_core::config::Settings;
use sensei_core::types::{AskRequest, AskResponse, Metrics};
use sensei_embed::build_provider;
use sensei_text::LexicalSearcher;
use sensei_vector::open_collection;

use crate::generator::{AnswerGenerator, OpenAiChat};
use crate::prompt::compose;
use crate::retriever::Retriever;

pub struct RagService {
    retriever: Retriever,
    generator: AnswerGenerator,
    default_k: usize,
}

impl RagService {
    /// One-time setup: provider, database, collection (with its width
    /// check), lexical searcher and chat backend. Fails only on
    /// configuration problems.
    pub async fn connect(settings: &Settings) -> Result<Self> {
        settings.validate()?;
        let provider = build_provider(&settings.embedding)?;
        let collection = open_collection(&settings.vector, provider.as_ref()).await?;
        let lexical = LexicalSearcher::new(settings.corpus.root_path());
        let chat = OpenAiChat::new(&settings.generation)?;
        info!(collection = collection.name(), model = %settings.generation.model, "rag service ready");
        Ok(Self::new(
            Retriever::new(provider, collection, lexical),
            AnswerGenerator::new(Arc::new(chat), settings.generation.temperature),
            settings.retrieval.k,
        ))
    }

    pub fn new(retriever: Retriever, generator: AnswerGenerator, default_k: usize) -> Self {
        Self { retriever, generator, default_k }
    }

    pub async fn answer(&self, user_id: &str, question: &str, k: usize) -> AskResponse {
        let contexts = self.retriever.retrieve(question, k).await;
        let messages = compose(question, &contexts);
        let result = self.generator.generate(&messages).await;
        info!(user_id, contexts = contexts.len(), outcome = ?result.outcome, latency_ms = result.generation_latency_ms, "answered");
        AskResponse {
            user_id: user_id.to_string(),
            question: question.to_string(),
            contexts,
            answer: result.answer,
            metrics: Metrics { token_usage: result.token_usage, generation_latency_ms: result.generation_latency_ms },
        }
    }

    pub async fn ask(&self, request: &AskRequest) -> AskResponse {
        self.answer(&request.user_id, &request.question, self.default_k).await
    }
}
