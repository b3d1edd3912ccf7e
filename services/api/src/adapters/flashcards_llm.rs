//! services/api/src/adapters/flashcards_llm.rs
//!
//! This module contains the adapter for the flashcard-generating LLM.
//! It implements the `FlashcardGenerator` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use flashcards_core::{
    domain::Card,
    generation::{decode_cards, strip_code_fence},
    ports::{FlashcardGenerator, PortError, PortResult},
};
use tracing::{info, warn};

const SYSTEM_INSTRUCTIONS: &str = r#"You are a flashcard creator. You take in text and create flashcards from it.

Rules:
- Create clear, concise questions for the front of each flashcard.
- Give accurate, informative answers on the back of each flashcard.
- Each flashcard focuses on a single concept or piece of information.
- Use simple language so the flashcards are accessible to a wide range of learners.
- Avoid overly complex or ambiguous phrasing in both questions and answers.
- Extract the most important and relevant information from the text.
- Create exactly {max_cards} flashcards, or fewer if the text does not support that many.

Respond with ONLY a JSON array, no prose and no code fences, in this format:
[{"front": "question text", "back": "answer text"}]"#;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `FlashcardGenerator` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiFlashcardAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    max_cards: usize,
}

impl OpenAiFlashcardAdapter {
    /// Creates a new `OpenAiFlashcardAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String, max_cards: usize) -> Self {
        Self {
            client,
            model,
            max_cards,
        }
    }

    fn system_prompt(&self) -> String {
        SYSTEM_INSTRUCTIONS.replace("{max_cards}", &self.max_cards.to_string())
    }
}

/// Decodes the model's reply and caps it at `max_cards`.
fn parse_reply(content: &str, max_cards: usize) -> PortResult<Vec<Card>> {
    let mut cards = decode_cards(strip_code_fence(content)).into_result()?;
    if cards.len() > max_cards {
        warn!(
            "Model returned {} cards, keeping the first {}",
            cards.len(),
            max_cards
        );
        cards.truncate(max_cards);
    }
    Ok(cards)
}

//=========================================================================================
// `FlashcardGenerator` Trait Implementation
//=========================================================================================

#[async_trait]
impl FlashcardGenerator for OpenAiFlashcardAdapter {
    async fn generate(&self, text: &str) -> PortResult<Vec<Card>> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.system_prompt())
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(text.to_string())
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Unexpected("Flashcard LLM returned no text content.".to_string())
            })?;

        let cards = parse_reply(&content, self.max_cards)?;
        info!("Generated {} flashcards", cards.len());
        Ok(cards)
    }
}
