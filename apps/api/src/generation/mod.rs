// Resume and cover-letter generation: prompt building, the LLM round trip,
// per-session output slots, and the HTTP handlers that drive them.
// All LLM calls go through llm_client; nothing here talks to a provider directly.

pub mod generator;
pub mod handlers;
pub mod prompts;
pub mod sessions;
