//! Answer Service - RAG-lite question answering over BNS
//!
//! Pipeline per question:
//! 1. validate (at least 3 non-blank characters)
//! 2. rank the top sections with the keyword ranker
//! 3. format them as a context block
//! 4. build system + user prompts and make one chat completion call
//!
//! Validation, ranking and formatting all finish before the model is called,
//! so a rejected question never produces network traffic.

use std::sync::Arc;

use crate::context::format_sections_for_context;
use crate::error::ServiceError;
use crate::llm::{ChatMessage, ChatModel};
use crate::ranker::{KeywordRanker, DEFAULT_CONTEXT_SECTIONS};
use crate::section_store::{DatasetMetadata, SectionStore};

/// Minimum question length after trimming
pub const MIN_QUESTION_CHARS: usize = 3;

pub const LEGAL_DISCLAIMER: &str = "⚖️ LEGAL DISCLAIMER: This is AI-generated educational information based on BNS, 2023. It is NOT legal advice. Consult a qualified advocate for specific legal advice on your situation.";

pub struct AnswerService {
    store: Arc<SectionStore>,
    model: Arc<dyn ChatModel>,
    ranker: KeywordRanker,
    context_sections: usize,
}

impl AnswerService {
    pub fn new(store: Arc<SectionStore>, model: Arc<dyn ChatModel>) -> Self {
        Self {
            store,
            model,
            ranker: KeywordRanker::default(),
            context_sections: DEFAULT_CONTEXT_SECTIONS,
        }
    }

    /// Answer one legal question; the model's reply is returned verbatim
    pub async fn answer(&self, question: &str) -> Result<String, ServiceError> {
        if question.trim().chars().count() < MIN_QUESTION_CHARS {
            return Err(ServiceError::InvalidInput(
                "Please provide a valid question".to_string(),
            ));
        }

        let sections = self.ranker.rank(&self.store, question, self.context_sections);
        tracing::info!(
            "Answering question with {} context sections: [{}]",
            sections.len(),
            sections.iter().map(|s| s.id.as_str()).collect::<Vec<_>>().join(", ")
        );

        let context = format_sections_for_context(&sections);
        let messages = [
            ChatMessage::system(system_prompt(self.store.metadata())),
            ChatMessage::user(user_prompt(&context, question)),
        ];

        let reply = self.model.complete(&messages).await?;
        Ok(reply)
    }
}

/// Persona, citation rules, disclaimer and dataset metadata
pub fn system_prompt(metadata: &DatasetMetadata) -> String {
    format!(
        r#"You are a specialized legal AI assistant for Indian criminal law, specifically for the Bharatiya Nyaya Sanhita, 2023 (BNS).

STRICT RULES:
1. You MUST ONLY cite and reference the Bharatiya Nyaya Sanhita, 2023 (BNS)
2. DO NOT mention or reference the Indian Penal Code (IPC) unless explicitly comparing
3. Always cite sections in this format: "Section [number], Bharatiya Nyaya Sanhita, 2023"
4. For each legal response, mention:
   - Relevant section numbers
   - Legal ingredients/elements of the offense
   - Punishment prescribed
   - Whether the offense is cognizable/non-cognizable (if applicable)
   - Whether the offense is bailable/non-bailable (if applicable)

5. Always end with this disclaimer:
   "{disclaimer}"

6. Be clear, professional, and educational
7. If asked about a topic not covered in BNS, clearly state that

BNS METADATA:
- Title: {title}
- Total Sections: {total}
- Effective Date: {effective}
- Replaces: {replaces}
"#,
        disclaimer = LEGAL_DISCLAIMER,
        title = metadata.title,
        total = metadata.total_sections,
        effective = metadata.effective_date,
        replaces = metadata.replaces,
    )
}

/// Retrieved context followed by the user's question
pub fn user_prompt(context: &str, question: &str) -> String {
    format!(
        "{context}\n\nUSER QUESTION:\n{question}\n\nProvide a comprehensive legal analysis based STRICTLY on the Bharatiya Nyaya Sanhita, 2023 sections provided above. If the relevant sections are not provided, state that more specific information is needed."
    )
}

// ============================================================================
// TESTS
// ============================================================================
