//! Turn controller state-machine tests with scripted collaborators

use std::sync::Arc;

use lingo_tutor::voice::SpeechSynthesizer;
use lingo_tutor::{Error, Session, TurnController, TurnOutcome, TurnPhase, TurnRole, TutorConfig};

mod common;
use common::{MockCompleter, MockSynthesizer, MockTranscriber};

fn config() -> TutorConfig {
    TutorConfig::default()
}

const AUDIO: &[u8] = &[0u8; 16];

#[tokio::test]
async fn full_turn_appends_both_turns_and_records() {
    let transcriber = MockTranscriber::new("I go to store yesterday");
    let completer = MockCompleter::replying(
        "Correction: I went to the store yesterday. We use the past tense here. \
         [GRAMMAR: past simple for finished actions|I went to the store yesterday] \
         What did you buy?",
    );
    let synthesizer: Arc<dyn SpeechSynthesizer> = MockSynthesizer::working();
    let controller = TurnController::new(transcriber.clone(), completer, Some(synthesizer));

    let mut session = Session::new();
    let outcome = controller
        .run_audio_turn(&mut session, &config(), AUDIO)
        .await
        .unwrap();

    let TurnOutcome::Reply {
        transcript,
        reply,
        records_added,
        audio,
    } = outcome
    else {
        panic!("expected a reply");
    };

    assert_eq!(transcript, "I go to store yesterday");
    assert!(!reply.contains("[GRAMMAR:"));
    assert_eq!(records_added, 1);
    assert!(audio.is_some());

    assert_eq!(session.turns().len(), 2);
    assert_eq!(session.turns()[0].role, TurnRole::User);
    assert_eq!(session.turns()[1].role, TurnRole::Assistant);
    assert_eq!(session.progress.grammar_tips.len(), 1);
    assert_eq!(session.progress.total_words_spoken, 5);
    assert_eq!(session.progress.corrections_made, 1);
}

#[tokio::test]
async fn whitespace_transcript_is_no_speech_and_mutates_nothing() {
    let transcriber = MockTranscriber::new("   \n ");
    let completer = MockCompleter::replying("should never be called");
    let controller = TurnController::new(transcriber, completer.clone(), None);

    let mut session = Session::new();
    let outcome = controller
        .run_audio_turn(&mut session, &config(), AUDIO)
        .await
        .unwrap();

    assert!(matches!(outcome, TurnOutcome::NoSpeech));
    assert!(session.turns().is_empty());
    assert_eq!(completer.call_count(), 0);
    assert_eq!(session.progress.total_words_spoken, 0);
}

#[tokio::test]
async fn completion_failure_keeps_pending_user_turn_and_resumes() {
    let transcriber = MockTranscriber::new("hello there");
    let completer = MockCompleter::scripted(vec![
        Err(Error::Completion("upstream 500".to_string())),
        Ok("Hi! What would you like to talk about?".to_string()),
    ]);
    let controller = TurnController::new(transcriber.clone(), completer.clone(), None);

    let mut session = Session::new();
    let err = controller
        .run_audio_turn(&mut session, &config(), AUDIO)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Completion(_)));

    // User turn survived, assistant turn did not happen
    assert_eq!(session.turns().len(), 1);
    assert_eq!(TurnController::phase(&session), TurnPhase::AwaitingModelReply);
    assert_eq!(session.progress.total_words_spoken, 0);

    // Re-running resumes at the model step: no re-transcription, no
    // duplicate user turn
    let outcome = controller
        .run_audio_turn(&mut session, &config(), AUDIO)
        .await
        .unwrap();
    assert!(matches!(outcome, TurnOutcome::Reply { .. }));
    assert_eq!(transcriber.call_count(), 1);
    assert_eq!(session.turns().len(), 2);
    assert_eq!(
        session
            .turns()
            .iter()
            .filter(|t| t.role == TurnRole::User)
            .count(),
        1
    );
    assert_eq!(TurnController::phase(&session), TurnPhase::Idle);
}

#[tokio::test]
async fn synthesis_failure_degrades_to_text_only() {
    let transcriber = MockTranscriber::new("tell me something");
    let completer = MockCompleter::replying("Here is something. What do you think?");
    let synthesizer: Arc<dyn SpeechSynthesizer> = MockSynthesizer::failing();
    let controller = TurnController::new(transcriber, completer, Some(synthesizer));

    let mut session = Session::new();
    let outcome = controller
        .run_audio_turn(&mut session, &config(), AUDIO)
        .await
        .unwrap();

    let TurnOutcome::Reply { audio, reply, .. } = outcome else {
        panic!("expected a reply");
    };
    assert!(audio.is_none());
    assert_eq!(reply, "Here is something. What do you think?");
    // The assistant turn is kept even though voice failed
    assert_eq!(session.turns().len(), 2);
}

#[tokio::test]
async fn text_turn_skips_transcription() {
    let transcriber = MockTranscriber::new("unused");
    let completer = MockCompleter::replying("Nice sentence! What happened next?");
    let controller = TurnController::new(transcriber.clone(), completer, None);

    let mut session = Session::new();
    let outcome = controller
        .run_text_turn(&mut session, &config(), "I walked to the park")
        .await
        .unwrap();

    assert!(matches!(outcome, TurnOutcome::Reply { .. }));
    assert_eq!(transcriber.call_count(), 0);
    assert_eq!(session.turns().len(), 2);
}

#[tokio::test]
async fn empty_text_turn_is_no_speech() {
    let transcriber = MockTranscriber::new("unused");
    let completer = MockCompleter::replying("unused");
    let controller = TurnController::new(transcriber, completer, None);

    let mut session = Session::new();
    let outcome = controller
        .run_text_turn(&mut session, &config(), "   ")
        .await
        .unwrap();

    assert!(matches!(outcome, TurnOutcome::NoSpeech));
    assert!(session.turns().is_empty());
}

#[tokio::test]
async fn completer_sees_system_message_and_windowed_history() {
    let transcriber = MockTranscriber::new("short question");
    let completer = MockCompleter::replying("Short answer. Anything else?");
    let controller = TurnController::new(transcriber, completer.clone(), None);

    let mut session = Session::new();
    controller
        .run_audio_turn(&mut session, &config(), AUDIO)
        .await
        .unwrap();

    let requests = completer.requests.lock().await;
    let messages = &requests[0];
    assert_eq!(messages[0].role, "system");
    // The just-appended user turn is the final message
    assert_eq!(messages.last().unwrap().role, "user");
    assert_eq!(messages.last().unwrap().content, "short question");
    assert!(messages.len() <= config().history_window + 1);
}

#[tokio::test]
async fn unknown_tag_kinds_do_not_fail_the_turn() {
    let transcriber = MockTranscriber::new("test");
    let completer =
        MockCompleter::replying("Reply with a stray [WEIRD: thing] marker. What next?");
    let controller = TurnController::new(transcriber, completer, None);

    let mut session = Session::new();
    let outcome = controller
        .run_audio_turn(&mut session, &config(), AUDIO)
        .await
        .unwrap();

    let TurnOutcome::Reply { records_added, .. } = outcome else {
        panic!("expected a reply");
    };
    assert_eq!(records_added, 0);
    assert_eq!(session.progress.record_count(), 0);
}
