mod common;

use medsim_core::error::SimError;
use medsim_core::models::report::Outcome;
use medsim_core::models::session::SessionMode;
use medsim_core::models::state::PatientStatus;
use medsim_core::models::turn::{AnswerReceipt, ChatReceipt};
use uuid::Uuid;

use common::{offline_router, router_with, session_store, Behavior, StubGenerator, MI_CASE};

#[tokio::test]
async fn start_copies_case_vitals_and_defaults() {
    let store = session_store(offline_router());
    let session = store
        .start_session(MI_CASE, SessionMode::Solo, None)
        .await
        .unwrap();

    assert_eq!(session.case_id, MI_CASE);
    assert_eq!(session.player_name, "Anonymous");
    assert_eq!(session.state.vitals.hr, 102.0);
    assert_eq!(session.state.status, PatientStatus::Stable);
    assert_eq!(session.state.max_consecutive_wrong, 3);
    assert!(session.state.chat_log.is_empty());
    assert!(!session.completed);
}

#[tokio::test]
async fn blank_player_name_is_anonymous() {
    let store = session_store(offline_router());
    let named = store
        .start_session(MI_CASE, SessionMode::Contest, Some("  Dr. Reyes "))
        .await
        .unwrap();
    let blank = store
        .start_session(MI_CASE, SessionMode::Contest, Some("   "))
        .await
        .unwrap();
    assert_eq!(named.player_name, "Dr. Reyes");
    assert_eq!(blank.player_name, "Anonymous");
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let store = session_store(offline_router());
    assert!(matches!(
        store.start_session("nope", SessionMode::Solo, None).await,
        Err(SimError::CaseNotFound { .. })
    ));

    let missing = Uuid::new_v4();
    assert!(matches!(
        store.get_session(missing).await,
        Err(SimError::SessionNotFound { session_id }) if session_id == missing
    ));
    assert!(matches!(
        store.submit_answer(missing, "q1", 0).await,
        Err(SimError::SessionNotFound { .. })
    ));
    assert!(matches!(
        store.submit_chat(missing, "hello").await,
        Err(SimError::SessionNotFound { .. })
    ));
    assert!(matches!(
        store.end_session(missing).await,
        Err(SimError::SessionNotFound { .. })
    ));
}

#[tokio::test]
async fn sessions_do_not_share_vitals() {
    let store = session_store(offline_router());
    let a = store.start_session(MI_CASE, SessionMode::Solo, None).await.unwrap();
    let b = store.start_session(MI_CASE, SessionMode::Solo, None).await.unwrap();

    store.submit_answer(a.id, "q1", 0).await.unwrap();

    assert_eq!(store.get_session(a.id).await.unwrap().state.vitals.hr, 110.0);
    assert_eq!(store.get_session(b.id).await.unwrap().state.vitals.hr, 102.0);
}

#[tokio::test]
async fn three_wrong_answers_kill_the_patient() {
    let generator = StubGenerator::new(Behavior::Reply("unused".to_string()));
    let store = session_store(router_with(generator.clone()));
    let session = store.start_session(MI_CASE, SessionMode::Solo, None).await.unwrap();

    for (i, question) in ["q1", "q2", "q3"].iter().enumerate() {
        let receipt = store.submit_answer(session.id, question, 3).await.unwrap();
        let AnswerReceipt::Evaluated {
            is_correct,
            death_triggered,
            snapshot,
            ..
        } = receipt
        else {
            panic!("expected an evaluated answer");
        };
        assert!(!is_correct);
        assert_eq!(death_triggered, i == 2);
        assert_eq!(snapshot.is_dead, i == 2);
    }

    let state = store.get_session(session.id).await.unwrap().state;
    assert_eq!(state.vitals.hr, 126.0);
    assert_eq!(state.vitals.spo2, 89.0);
    assert_eq!(state.vitals.rr, 29.0);
    assert_eq!(state.status, PatientStatus::Dead);

    let after = store.submit_answer(session.id, "q4", 1).await.unwrap();
    assert!(matches!(after, AnswerReceipt::Deceased { .. }));

    let chat = store.submit_chat(session.id, "Can you hear me?").await.unwrap();
    assert!(matches!(chat, ChatReceipt::Deceased { .. }));
    assert_eq!(generator.calls(), 0);

    let state = store.get_session(session.id).await.unwrap().state;
    assert_eq!(state.events.len(), 3);
    assert!(state.chat_log.is_empty());
}

#[tokio::test]
async fn unknown_question_changes_nothing() {
    let store = session_store(offline_router());
    let session = store.start_session(MI_CASE, SessionMode::Solo, None).await.unwrap();

    let err = store.submit_answer(session.id, "q99", 0).await.unwrap_err();
    assert!(matches!(err, SimError::QuestionNotFound { question_id } if question_id == "q99"));

    let state = store.get_session(session.id).await.unwrap().state;
    assert!(state.events.is_empty());
    assert_eq!(state.vitals.hr, 102.0);
}

#[tokio::test]
async fn out_of_range_choice_counts_as_wrong() {
    let store = session_store(offline_router());
    let session = store.start_session(MI_CASE, SessionMode::Solo, None).await.unwrap();

    let receipt = store.submit_answer(session.id, "q1", 42).await.unwrap();
    assert!(matches!(
        receipt,
        AnswerReceipt::Evaluated { is_correct: false, correct_index: 1, .. }
    ));
}

#[tokio::test]
async fn end_session_is_idempotent() {
    let store = session_store(offline_router());
    let session = store.start_session(MI_CASE, SessionMode::Solo, None).await.unwrap();
    store.submit_answer(session.id, "q1", 1).await.unwrap();

    let first = store.end_session(session.id).await.unwrap();
    let ended_at = store.get_session(session.id).await.unwrap().state.ended_at;
    assert!(ended_at.is_some());

    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    let second = store.end_session(session.id).await.unwrap();
    let after = store.get_session(session.id).await.unwrap();

    assert_eq!(after.state.ended_at, ended_at);
    assert_eq!(first, second);
    assert_eq!(first.outcome, Outcome::Survived);
    assert_eq!(first.correct_answers, 1);
    assert_eq!(store.report(session.id).await.unwrap(), first);
}

#[tokio::test]
async fn completed_sessions_reject_turns() {
    let store = session_store(offline_router());
    let session = store.start_session(MI_CASE, SessionMode::Solo, None).await.unwrap();

    assert!(matches!(
        store.report(session.id).await,
        Err(SimError::ReportUnavailable { .. })
    ));

    store.end_session(session.id).await.unwrap();

    assert!(matches!(
        store.submit_answer(session.id, "q1", 1).await,
        Err(SimError::SessionCompleted { .. })
    ));
    assert!(matches!(
        store.submit_chat(session.id, "hello").await,
        Err(SimError::SessionCompleted { .. })
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_answers_are_not_lost() {
    let store = session_store(offline_router());
    let session = store.start_session(MI_CASE, SessionMode::Solo, None).await.unwrap();

    let tasks: Vec<_> = (0..40)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.submit_answer(session.id, "q1", 1).await })
        })
        .collect();
    for task in futures::future::join_all(tasks).await {
        task.unwrap().unwrap();
    }

    let state = store.get_session(session.id).await.unwrap().state;
    assert_eq!(state.events.len(), 40);
    // Each correct answer applies hr -4 exactly once.
    assert_eq!(state.vitals.hr, 102.0 - 4.0 * 40.0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_wrong_answers_trigger_death_once() {
    let store = session_store(offline_router());
    let session = store.start_session(MI_CASE, SessionMode::Solo, None).await.unwrap();

    let tasks: Vec<_> = (0..12)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.submit_answer(session.id, "q1", 0).await })
        })
        .collect();

    let mut deaths = 0;
    let mut deceased = 0;
    for task in futures::future::join_all(tasks).await {
        match task.unwrap().unwrap() {
            AnswerReceipt::Evaluated { death_triggered, .. } => deaths += usize::from(death_triggered),
            AnswerReceipt::Deceased { .. } => deceased += 1,
        }
    }

    assert_eq!(deaths, 1);
    assert_eq!(deceased, 9);
    let state = store.get_session(session.id).await.unwrap().state;
    assert_eq!(state.wrong_count, 3);
    assert_eq!(state.vitals.hr, 126.0);
}
