#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use medsim_bedrock::{BoxFuture, FallbackReplies, GeneratorError, ReplyContext, ReplyGenerator};
use medsim_core::CaseCatalog;
use medsim_session::{ConversationRouter, RoomCoordinator, SessionStore};

/// mi-001: correct indices q1=1, q2=2, q3=0, q4=1; death after 3 wrong in a row.
pub const MI_CASE: &str = "mi-001";
pub const SCRIPTED_QUESTION: &str = "When did the pain start?";

#[derive(Debug, Clone)]
pub enum Behavior {
    Reply(String),
    Fail,
    Hang,
}

/// A generator that counts calls and remembers every context it was given.
pub struct StubGenerator {
    behavior: Behavior,
    calls: AtomicUsize,
    seen: Mutex<Vec<ReplyContext>>,
}

impl StubGenerator {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_context(&self) -> Option<ReplyContext> {
        self.seen.lock().unwrap().last().cloned()
    }
}

impl ReplyGenerator for StubGenerator {
    fn generate<'a>(&'a self, ctx: &'a ReplyContext) -> BoxFuture<'a, Result<String, GeneratorError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(ctx.clone());
        let behavior = self.behavior.clone();
        Box::pin(async move {
            match behavior {
                Behavior::Reply(text) => Ok(text),
                Behavior::Fail => Err(GeneratorError::Invocation("stub failure".to_string())),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok("too late".to_string())
                }
            }
        })
    }
}

pub fn catalog() -> Arc<CaseCatalog> {
    Arc::new(CaseCatalog::bundled().unwrap())
}

pub fn offline_router() -> Arc<ConversationRouter> {
    Arc::new(ConversationRouter::offline(FallbackReplies::seeded(7)))
}

pub fn router_with(generator: Arc<StubGenerator>) -> Arc<ConversationRouter> {
    Arc::new(
        ConversationRouter::new(generator, FallbackReplies::seeded(7))
            .with_timeout(Duration::from_millis(50)),
    )
}

pub fn session_store(router: Arc<ConversationRouter>) -> Arc<SessionStore> {
    Arc::new(SessionStore::new(catalog(), router))
}

pub fn room_coordinator(router: Arc<ConversationRouter>) -> Arc<RoomCoordinator> {
    Arc::new(RoomCoordinator::new(catalog(), router))
}
