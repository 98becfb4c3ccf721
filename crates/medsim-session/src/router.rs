//! Chat turn dispatch.
//!
//! A chat turn runs in three steps so that no lock is held while the
//! generator is awaited:
//!
//! 1. [`ConversationRouter::prepare`] under the entry lock: scripted lookup,
//!    or a [`ReplyContext`] snapshot.
//! 2. [`ConversationRouter::resolve`] with no lock held: bounded generation
//!    with fallback.
//! 3. [`ConversationRouter::record_turn`] under the entry lock again.

use std::sync::Arc;
use std::time::Duration;

use jiff::Timestamp;
use tracing::{debug, warn};

use medsim_bedrock::{FallbackReplies, GeneratorError, ReplyContext, ReplyGenerator};
use medsim_core::models::case::Case;
use medsim_core::models::state::{ChatEntry, ChatRole, PatientState};
use medsim_core::models::turn::ReplySource;
use medsim_engine::classify;

pub const DEFAULT_GENERATOR_TIMEOUT: Duration = Duration::from_secs(8);
pub const DEFAULT_HISTORY_WINDOW: usize = 10;

/// Work left to do for a chat turn after the state snapshot was taken.
#[derive(Debug, Clone)]
pub enum PendingReply {
    Scripted(String),
    Generate(Box<ReplyContext>),
}

pub struct ConversationRouter {
    generator: Option<Arc<dyn ReplyGenerator>>,
    fallback: FallbackReplies,
    timeout: Duration,
    history_window: usize,
}

impl ConversationRouter {
    /// A router with no generator: unscripted questions always get a
    /// fallback reply.
    pub fn offline(fallback: FallbackReplies) -> Self {
        Self {
            generator: None,
            fallback,
            timeout: DEFAULT_GENERATOR_TIMEOUT,
            history_window: DEFAULT_HISTORY_WINDOW,
        }
    }

    pub fn new(generator: Arc<dyn ReplyGenerator>, fallback: FallbackReplies) -> Self {
        Self {
            generator: Some(generator),
            ..Self::offline(fallback)
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_history_window(mut self, history_window: usize) -> Self {
        self.history_window = history_window;
        self
    }

    /// Decide how `question` will be answered, from the state as it is now.
    pub fn prepare(&self, case: &Case, state: &PatientState, question: &str) -> PendingReply {
        match case.scripted_reply(question) {
            Some(reply) => PendingReply::Scripted(reply.to_string()),
            None => PendingReply::Generate(Box::new(ReplyContext::capture(
                case,
                state,
                question,
                self.history_window,
            ))),
        }
    }

    /// Produce the reply text. Never fails: generator errors and timeouts
    /// fall back to a canned reply.
    pub async fn resolve(&self, pending: PendingReply) -> (String, ReplySource) {
        let ctx = match pending {
            PendingReply::Scripted(reply) => return (reply, ReplySource::Scripted),
            PendingReply::Generate(ctx) => ctx,
        };

        let Some(generator) = &self.generator else {
            return (self.fallback.reply(&ctx.chief_complaint), ReplySource::Fallback);
        };

        let result = match tokio::time::timeout(self.timeout, generator.generate(&ctx)).await {
            Ok(result) => result,
            Err(_) => Err(GeneratorError::Timeout {
                after_ms: self.timeout.as_millis() as u64,
            }),
        };

        match result {
            Ok(reply) => {
                debug!(case_id = %ctx.case_id, "generated reply");
                (reply, ReplySource::Generated)
            }
            Err(e) => {
                warn!(case_id = %ctx.case_id, error = %e, "reply generation failed, using fallback");
                (self.fallback.reply(&ctx.chief_complaint), ReplySource::Fallback)
            }
        }
    }

    /// Prepare and resolve in one step, for callers that own `state`.
    pub async fn respond(
        &self,
        case: &Case,
        state: &PatientState,
        question: &str,
    ) -> (String, ReplySource) {
        let pending = self.prepare(case, state, question);
        self.resolve(pending).await
    }

    /// Append the question and its reply to the chat log, in that order.
    ///
    /// Vitals are left alone; status is re-derived unless the patient is dead.
    pub fn record_turn(
        state: &mut PatientState,
        question: &str,
        reply: &str,
        author: Option<&str>,
        now: Timestamp,
    ) {
        state.chat_log.push(ChatEntry {
            role: ChatRole::Doctor,
            text: question.to_string(),
            timestamp: now,
            author: author.map(str::to_string),
        });
        state.chat_log.push(ChatEntry {
            role: ChatRole::Patient,
            text: reply.to_string(),
            timestamp: now,
            author: None,
        });
        if !state.is_dead {
            state.status = classify(&state.vitals);
        }
    }
}
