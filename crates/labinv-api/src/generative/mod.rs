// Generative model: paper summaries and item descriptions.

pub mod client;
pub mod prompts;
pub mod types;

pub use client::{DEFAULT_GENERATIVE_URL, DEFAULT_MODEL, GenerativeClient};
pub use types::{DescriptionRequest, EnhancedDescription, PaperSummary};
