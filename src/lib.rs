//! Legally - BNS Legal AI
//!
//! RAG-lite question answering over the Bharatiya Nyaya Sanhita, 2023.
//!
//! - `section_store`: immutable in-memory dataset loaded from JSON
//! - `ranker`: keyword scoring that picks the sections sent to the model
//! - `context`: renders ranked sections as prompt context
//! - `llm`: chat model seam + Groq (OpenAI-compatible) client
//! - `answer`: validate → rank → format → ask
//! - `api_server`: axum HTTP surface (feature `api`)

pub mod answer;
pub mod config;
pub mod context;
pub mod error;
pub mod llm;
pub mod ranker;
pub mod section_store;

#[cfg(feature = "api")]
pub mod api_server;

// Re-export commonly used types
pub use answer::AnswerService;
pub use config::AppConfig;
pub use context::format_sections_for_context;
pub use error::ServiceError;
pub use llm::{ChatMessage, ChatModel, GroqClient, LlmConfig, LlmError};
pub use ranker::{KeywordRanker, ScoredMatch, ScoringWeights};
pub use section_store::{DatasetMetadata, SectionFilter, SectionRecord, SectionStore, StoreError};

#[cfg(feature = "api")]
pub use api_server::{bind_listener, create_router, AppState};
