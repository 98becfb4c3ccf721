use std::future::Future;
use std::pin::Pin;

use aws_sdk_bedrockruntime::types::{
    ContentBlock, ConversationRole, InferenceConfiguration, Message, SystemContentBlock,
};
use tracing::debug;

use crate::context::{build_system_prompt, build_turns, ReplyContext};
use crate::error::GeneratorError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Produces a free-text patient reply for one learner question.
///
/// Methods return boxed futures for dyn compatibility.
pub trait ReplyGenerator: Send + Sync {
    fn generate<'a>(&'a self, ctx: &'a ReplyContext) -> BoxFuture<'a, Result<String, GeneratorError>>;
}

/// Generates replies with the Bedrock Converse API.
#[derive(Debug, Clone)]
pub struct BedrockReplyGenerator {
    client: aws_sdk_bedrockruntime::Client,
    model_id: String,
    max_tokens: i32,
}

impl BedrockReplyGenerator {
    pub const DEFAULT_MAX_TOKENS: i32 = 300;

    pub fn new(config: &aws_config::SdkConfig, model_id: impl Into<String>) -> Result<Self, GeneratorError> {
        let model_id = model_id.into();
        if model_id.trim().is_empty() {
            return Err(GeneratorError::Config("model id must not be empty".to_string()));
        }
        Ok(Self {
            client: aws_sdk_bedrockruntime::Client::new(config),
            model_id,
            max_tokens: Self::DEFAULT_MAX_TOKENS,
        })
    }

    pub fn with_max_tokens(mut self, max_tokens: i32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn converse(&self, ctx: &ReplyContext) -> Result<String, GeneratorError> {
        let mut messages = Vec::new();
        for turn in build_turns(ctx) {
            let role = if turn.from_learner {
                ConversationRole::User
            } else {
                ConversationRole::Assistant
            };
            let message = Message::builder()
                .role(role)
                .content(ContentBlock::Text(turn.text))
                .build()
                .map_err(|e| GeneratorError::Invocation(e.to_string()))?;
            messages.push(message);
        }

        let response = self
            .client
            .converse()
            .model_id(&self.model_id)
            .system(SystemContentBlock::Text(build_system_prompt(ctx)))
            .set_messages(Some(messages))
            .inference_config(
                InferenceConfiguration::builder()
                    .max_tokens(self.max_tokens)
                    .build(),
            )
            .send()
            .await
            .map_err(|e| GeneratorError::Invocation(e.into_service_error().to_string()))?;

        let output_message = response
            .output()
            .and_then(|o| o.as_message().ok())
            .ok_or_else(|| GeneratorError::ResponseParse("no message in response".to_string()))?;

        let reply = output_message
            .content()
            .iter()
            .filter_map(|block| {
                if let ContentBlock::Text(text) = block {
                    Some(text.as_str())
                } else {
                    None
                }
            })
            .collect::<Vec<_>>()
            .join("");

        let reply = reply.trim();
        if reply.is_empty() {
            return Err(GeneratorError::EmptyReply);
        }

        debug!(case_id = %ctx.case_id, model_id = %self.model_id, "generated patient reply");
        Ok(reply.to_string())
    }
}

impl ReplyGenerator for BedrockReplyGenerator {
    fn generate<'a>(&'a self, ctx: &'a ReplyContext) -> BoxFuture<'a, Result<String, GeneratorError>> {
        Box::pin(self.converse(ctx))
    }
}
