mod common;

use jiff::Timestamp;

use medsim_core::models::session::SessionMode;
use medsim_core::models::state::{ChatRole, PatientState};
use medsim_core::models::turn::{ChatReceipt, ReplySource};
use medsim_session::ConversationRouter;

use common::{
    catalog, offline_router, router_with, session_store, Behavior, StubGenerator, MI_CASE,
    SCRIPTED_QUESTION,
};

#[tokio::test]
async fn scripted_question_skips_the_generator() {
    let generator = StubGenerator::new(Behavior::Reply("generated".to_string()));
    let router = router_with(generator.clone());
    let case = catalog().get(MI_CASE).unwrap();
    let state = PatientState::new(&case, Timestamp::now());

    let (reply, source) = router.respond(&case, &state, SCRIPTED_QUESTION).await;

    assert_eq!(reply, case.triggers[SCRIPTED_QUESTION]);
    assert_eq!(source, ReplySource::Scripted);
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn trigger_match_is_exact() {
    let generator = StubGenerator::new(Behavior::Reply("generated".to_string()));
    let router = router_with(generator.clone());
    let case = catalog().get(MI_CASE).unwrap();
    let state = PatientState::new(&case, Timestamp::now());

    let (reply, source) = router
        .respond(&case, &state, &SCRIPTED_QUESTION.to_lowercase())
        .await;

    assert_eq!(reply, "generated");
    assert_eq!(source, ReplySource::Generated);
    assert_eq!(generator.calls(), 1);
}

#[tokio::test]
async fn generator_failure_falls_back() {
    let generator = StubGenerator::new(Behavior::Fail);
    let router = router_with(generator.clone());
    let case = catalog().get(MI_CASE).unwrap();
    let state = PatientState::new(&case, Timestamp::now());

    let (reply, source) = router.respond(&case, &state, "How do you feel?").await;

    assert_eq!(source, ReplySource::Fallback);
    assert!(reply.contains(&case.chief_complaint.to_lowercase()), "{reply}");
    assert_eq!(generator.calls(), 1);
}

#[tokio::test]
async fn slow_generator_times_out_to_fallback() {
    let generator = StubGenerator::new(Behavior::Hang);
    let router = router_with(generator.clone());
    let case = catalog().get(MI_CASE).unwrap();
    let state = PatientState::new(&case, Timestamp::now());

    let (reply, source) = router.respond(&case, &state, "How do you feel?").await;

    assert_eq!(source, ReplySource::Fallback);
    assert!(!reply.is_empty());
}

#[tokio::test]
async fn offline_router_always_falls_back() {
    let router = offline_router();
    let case = catalog().get(MI_CASE).unwrap();
    let state = PatientState::new(&case, Timestamp::now());

    let (_, source) = router.respond(&case, &state, "How do you feel?").await;
    assert_eq!(source, ReplySource::Fallback);
}

#[test]
fn record_turn_appends_question_then_reply() {
    let case = catalog().get(MI_CASE).unwrap();
    let mut state = PatientState::new(&case, Timestamp::now());
    let vitals = state.vitals.clone();

    ConversationRouter::record_turn(&mut state, "Where does it hurt?", "My chest.", Some("p1"), Timestamp::now());

    assert_eq!(state.chat_log.len(), 2);
    assert_eq!(state.chat_log[0].role, ChatRole::Doctor);
    assert_eq!(state.chat_log[0].text, "Where does it hurt?");
    assert_eq!(state.chat_log[0].author.as_deref(), Some("p1"));
    assert_eq!(state.chat_log[1].role, ChatRole::Patient);
    assert_eq!(state.chat_log[1].text, "My chest.");
    assert_eq!(state.vitals, vitals);
}

#[tokio::test]
async fn session_chat_logs_both_sides_and_passes_history() {
    let generator = StubGenerator::new(Behavior::Reply("It hurts a lot.".to_string()));
    let store = session_store(router_with(generator.clone()));
    let session = store.start_session(MI_CASE, SessionMode::Solo, None).await.unwrap();

    let scripted = store.submit_chat(session.id, SCRIPTED_QUESTION).await.unwrap();
    assert!(matches!(
        scripted,
        ChatReceipt::Replied { source: ReplySource::Scripted, .. }
    ));

    let generated = store.submit_chat(session.id, "How bad is it?").await.unwrap();
    let ChatReceipt::Replied { reply, source, .. } = generated else {
        panic!("expected a reply");
    };
    assert_eq!(reply, "It hurts a lot.");
    assert_eq!(source, ReplySource::Generated);

    let ctx = generator.last_context().unwrap();
    assert_eq!(ctx.question, "How bad is it?");
    assert_eq!(ctx.history.len(), 2);
    assert_eq!(ctx.history[0].text, SCRIPTED_QUESTION);

    let log = store.get_session(session.id).await.unwrap().state.chat_log;
    let texts: Vec<&str> = log.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts.len(), 4);
    assert_eq!(texts[0], SCRIPTED_QUESTION);
    assert_eq!(texts[2], "How bad is it?");
    assert_eq!(texts[3], "It hurts a lot.");
}

#[tokio::test]
async fn failed_generation_still_answers_the_learner() {
    let generator = StubGenerator::new(Behavior::Fail);
    let store = session_store(router_with(generator));
    let session = store.start_session(MI_CASE, SessionMode::Solo, None).await.unwrap();

    let receipt = store.submit_chat(session.id, "Anything else?").await.unwrap();
    assert!(matches!(
        receipt,
        ChatReceipt::Replied { source: ReplySource::Fallback, .. }
    ));
    assert_eq!(store.get_session(session.id).await.unwrap().state.chat_log.len(), 2);
}
