//! medsim-bedrock
//!
//! Simulated-patient replies: the generator seam, its Bedrock implementation,
//! prompt assembly, and the deterministic fallback used when generation fails.

pub mod client;
pub mod context;
pub mod error;
pub mod fallback;
pub mod generator;

pub use context::ReplyContext;
pub use error::GeneratorError;
pub use fallback::FallbackReplies;
pub use generator::{BedrockReplyGenerator, BoxFuture, ReplyGenerator};
