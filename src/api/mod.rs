// External API clients
pub mod gemini;
pub mod openai;
pub mod provider;
pub mod youtube;
