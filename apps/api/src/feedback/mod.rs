// Essay review: prompt building, model call, parsing with canned fallback,
// and the follow-up tutoring chat. All model calls go through llm_client.

pub mod handlers;
pub mod models;
pub mod parser;
pub mod prompts;
pub mod service;
