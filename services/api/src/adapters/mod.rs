pub mod db;
pub mod flashcards_llm;
pub mod stripe;

pub use db::DbAdapter;
pub use flashcards_llm::OpenAiFlashcardAdapter;
pub use stripe::StripeAdapter;
