pub mod client;
pub mod parser;
pub mod prompt;

// Public API exports
pub use client::{classify_response, Generator, OpenRouterClient, DEFAULT_ENDPOINT, DEFAULT_MODEL};
pub use parser::{parse, parse_blocks};
pub use prompt::{build, GenerationRequest};
