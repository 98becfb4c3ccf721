use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("model invocation failed: {0}")]
    Invocation(String),

    #[error("response parsing failed: {0}")]
    ResponseParse(String),

    #[error("model returned an empty reply")]
    EmptyReply,

    #[error("reply generation timed out after {after_ms} ms")]
    Timeout { after_ms: u64 },

    #[error("AWS config error: {0}")]
    Config(String),
}
