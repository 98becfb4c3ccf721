use std::sync::Arc;

use jiff::Timestamp;
use serde_json::json;
use uuid::Uuid;

use medsim_core::error::SimError;
use medsim_core::models::case::Case;
use medsim_core::models::leaderboard::LeaderboardEntry;
use medsim_core::models::report::Report;
use medsim_core::models::session::{Session, SessionMode, ANONYMOUS_PLAYER};
use medsim_core::models::state::PatientState;
use medsim_core::models::turn::{AnswerReceipt, ChatReceipt, DECEASED_MESSAGE};
use medsim_core::CaseCatalog;
use medsim_engine::{evaluate_answer, generate_report, leaderboard, score, Evaluation};

use crate::audit::AuditEvent;
use crate::router::{ConversationRouter, PendingReply};
use crate::store::KeyedStore;

struct SessionEntry {
    session: Session,
    case: Arc<Case>,
}

/// What the first, locked half of a chat turn decided.
enum ChatStart {
    Done(ChatReceipt),
    Pending(PendingReply),
}

/// Solo and contest sessions, keyed by id.
pub struct SessionStore {
    catalog: Arc<CaseCatalog>,
    router: Arc<ConversationRouter>,
    sessions: KeyedStore<Uuid, SessionEntry>,
}

impl SessionStore {
    pub fn new(catalog: Arc<CaseCatalog>, router: Arc<ConversationRouter>) -> Self {
        Self {
            catalog,
            router,
            sessions: KeyedStore::new(),
        }
    }

    /// Start a session on `case_id`. Vitals are copied from the case.
    pub async fn start_session(
        &self,
        case_id: &str,
        mode: SessionMode,
        player_name: Option<&str>,
    ) -> Result<Session, SimError> {
        let case = self.catalog.get(case_id)?;
        let now = Timestamp::now();

        let mut state = PatientState::new(&case, now);
        state.score = score(&state, now);

        let player_name = player_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(ANONYMOUS_PLAYER)
            .to_string();

        let session = Session {
            id: Uuid::new_v4(),
            case_id: case.id.clone(),
            mode,
            player_name,
            state,
            completed: false,
        };

        self.sessions
            .insert(
                session.id,
                SessionEntry {
                    session: session.clone(),
                    case,
                },
            )
            .await;

        AuditEvent::new("session.started", "session", session.id, &session.player_name)
            .with_details(json!({ "case_id": session.case_id, "mode": session.mode }))
            .emit();

        Ok(session)
    }

    /// Current session, with the score evaluated as of now while running.
    pub async fn get_session(&self, session_id: Uuid) -> Result<Session, SimError> {
        let now = Timestamp::now();
        self.sessions
            .read(&session_id, |entry| {
                let mut session = entry.session.clone();
                if !session.completed {
                    session.state.score = score(&session.state, now);
                }
                session
            })
            .await
            .ok_or(SimError::SessionNotFound { session_id })
    }

    pub async fn submit_answer(
        &self,
        session_id: Uuid,
        question_id: &str,
        chosen_index: usize,
    ) -> Result<AnswerReceipt, SimError> {
        let now = Timestamp::now();
        let receipt = self
            .sessions
            .mutate(&session_id, |entry| {
                let session = &mut entry.session;
                if session.completed {
                    return Err(SimError::SessionCompleted { session_id });
                }

                let evaluation = evaluate_answer(
                    &mut session.state,
                    &entry.case,
                    question_id,
                    chosen_index,
                    None,
                    now,
                )?;
                Ok(answer_receipt(evaluation, &session.state))
            })
            .await
            .ok_or(SimError::SessionNotFound { session_id })??;

        if let AnswerReceipt::Evaluated {
            is_correct,
            death_triggered,
            ..
        } = &receipt
        {
            AuditEvent::new("answer.submitted", "session", session_id, "learner")
                .with_details(json!({
                    "question_id": question_id,
                    "chosen_index": chosen_index,
                    "is_correct": is_correct,
                    "death_triggered": death_triggered,
                }))
                .emit();
        }

        Ok(receipt)
    }

    /// Answer a free-text question. The generator, if needed, runs with no
    /// lock held.
    pub async fn submit_chat(
        &self,
        session_id: Uuid,
        question: &str,
    ) -> Result<ChatReceipt, SimError> {
        let start = self
            .sessions
            .read(&session_id, |entry| {
                let session = &entry.session;
                if session.completed {
                    return Err(SimError::SessionCompleted { session_id });
                }
                if session.state.is_dead {
                    return Ok(ChatStart::Done(deceased_chat(&session.state)));
                }
                Ok(ChatStart::Pending(self.router.prepare(
                    &entry.case,
                    &session.state,
                    question,
                )))
            })
            .await
            .ok_or(SimError::SessionNotFound { session_id })??;

        let pending = match start {
            ChatStart::Done(receipt) => return Ok(receipt),
            ChatStart::Pending(pending) => pending,
        };

        let (reply, source) = self.router.resolve(pending).await;

        let now = Timestamp::now();
        self.sessions
            .mutate(&session_id, |entry| {
                let session = &mut entry.session;
                if session.completed {
                    return Err(SimError::SessionCompleted { session_id });
                }
                // The patient may have died while the reply was generated.
                if session.state.is_dead {
                    return Ok(deceased_chat(&session.state));
                }

                ConversationRouter::record_turn(&mut session.state, question, &reply, None, now);
                session.state.score = score(&session.state, now);

                Ok(ChatReceipt::Replied {
                    reply,
                    source,
                    snapshot: session.state.snapshot(),
                })
            })
            .await
            .ok_or(SimError::SessionNotFound { session_id })?
    }

    /// Complete the session and return its report.
    ///
    /// Idempotent: the end time and final score are fixed by the first call.
    pub async fn end_session(&self, session_id: Uuid) -> Result<Report, SimError> {
        let now = Timestamp::now();
        let (report, newly_ended) = self
            .sessions
            .mutate(&session_id, |entry| {
                let session = &mut entry.session;
                let newly_ended = !session.completed;
                if newly_ended {
                    session.completed = true;
                    session.state.ended_at = Some(now);
                    session.state.score = score(&session.state, now);
                }
                (generate_report(&session.state, &entry.case, now), newly_ended)
            })
            .await
            .ok_or(SimError::SessionNotFound { session_id })?;

        if newly_ended {
            AuditEvent::new("session.ended", "session", session_id, "learner")
                .with_details(json!({ "score": report.score, "outcome": report.outcome }))
                .emit();
        }

        Ok(report)
    }

    /// Report for a session that has already been ended.
    pub async fn report(&self, session_id: Uuid) -> Result<Report, SimError> {
        let now = Timestamp::now();
        self.sessions
            .read(&session_id, |entry| {
                if !entry.session.completed {
                    return Err(SimError::ReportUnavailable { id: session_id });
                }
                Ok(generate_report(&entry.session.state, &entry.case, now))
            })
            .await
            .ok_or(SimError::SessionNotFound { session_id })?
    }

    /// Unranked leaderboard projections of every completed session.
    pub async fn leaderboard_entries(&self) -> Vec<LeaderboardEntry> {
        self.sessions
            .collect(|entry| leaderboard::session_entry(&entry.session, &entry.case))
            .await
    }

    pub async fn len(&self) -> usize {
        self.sessions.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.is_empty().await
    }
}

pub(crate) fn answer_receipt(evaluation: Evaluation, state: &PatientState) -> AnswerReceipt {
    match evaluation {
        Evaluation::Answered {
            is_correct,
            explanation,
            correct_index,
            death_triggered,
        } => AnswerReceipt::Evaluated {
            is_correct,
            explanation,
            correct_index,
            death_triggered,
            snapshot: state.snapshot(),
        },
        Evaluation::Deceased => AnswerReceipt::Deceased {
            message: DECEASED_MESSAGE.to_string(),
            snapshot: state.snapshot(),
        },
    }
}

pub(crate) fn deceased_chat(state: &PatientState) -> ChatReceipt {
    ChatReceipt::Deceased {
        message: DECEASED_MESSAGE.to_string(),
        snapshot: state.snapshot(),
    }
}
