//! sensei-rag
//!
//! Question answering over the study corpus: retrieve grounding passages
//! (vector search with a lexical fallback), compose a tutor prompt, and
//! generate an answer that degrades to an offline template instead of failing.
pub mod generator;
pub mod prompt;
pub mod retriever;
pub mod service;

pub use generator::{offline_answer, AnswerGenerator, ChatBackend, Completion, OpenAiChat};
pub use prompt::{compose, question_from, SYSTEM_PROMPT};
pub use retriever::Retriever;
pub use service::RagService;
