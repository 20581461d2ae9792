mod support;

use std::sync::{Arc, Mutex};

use support::Harness;
use webface::{
    LogEvent, MessageKind, ScriptedRandom, SubmissionOutcome, SubmissionState, SubmitOutcome,
};
use webface_api::{ApiError, BackendRequest, BackendResponse, ChatReply};

fn chat_reply(reply: ChatReply) -> Result<BackendResponse, ApiError> {
    Ok(BackendResponse::Chat(reply))
}

#[test]
fn hello_round_trip_rotates_session() {
    let mut harness = Harness::direct("s1", ScriptedRandom::constant(0.99));

    let outcome = harness.submit("hello");
    let SubmitOutcome::Sent(request_id) = outcome else {
        panic!("expected request to be sent, got {outcome:?}");
    };

    assert_eq!(harness.texts(), vec!["hello"]);
    assert_eq!(
        harness.host.last_sent().1,
        BackendRequest::Chat {
            session_id: "s1".to_string(),
            message: "hello".to_string(),
        }
    );
    assert_eq!(
        harness.session.submission_state(),
        SubmissionState::Sending { request_id }
    );
    assert!(harness.session.surface().busy);
    assert!(!harness.session.surface().input_enabled);

    harness.complete(request_id, chat_reply(ChatReply::new("hi").with_session_id("s2")));

    let messages = harness.session.log().messages();
    assert_eq!(messages.len(), 2);
    assert_eq!((messages[0].kind, messages[0].text.as_str()), (MessageKind::User, "hello"));
    assert_eq!((messages[1].kind, messages[1].text.as_str()), (MessageKind::Assistant, "hi"));
    assert_eq!(harness.roles(), vec!["You", "Assistant"]);
    assert_eq!(harness.session.session_id(), "s2");
    assert_eq!(harness.session.store().id(), "s2");
    assert_eq!(harness.session.submission_state(), SubmissionState::Idle);
    assert_eq!(harness.session.last_outcome(), Some(SubmissionOutcome::Delivered));
    assert_eq!(harness.session.input(), "");
    assert_eq!(harness.host.focus_restores, 1);

    harness.submit("again");
    assert_eq!(harness.host.last_sent().1.session_id(), Some("s2"));
}

#[test]
fn blank_input_is_ignored() {
    let mut harness = Harness::direct("s1", ScriptedRandom::constant(0.99));

    assert_eq!(harness.submit("   \n"), SubmitOutcome::Empty);

    assert!(harness.session.log().is_empty());
    assert!(harness.host.sent.is_empty());
    assert_eq!(harness.session.submission_state(), SubmissionState::Idle);
    assert_eq!(harness.host.focus_restores, 0);
}

#[test]
fn submitted_text_is_trimmed() {
    let mut harness = Harness::direct("s1", ScriptedRandom::constant(0.99));
    harness.submit("  hello  ");
    assert_eq!(harness.texts(), vec!["hello"]);
}

#[test]
fn second_submit_while_sending_is_rejected() {
    let mut harness = Harness::direct("s1", ScriptedRandom::constant(0.99));

    assert!(matches!(harness.submit("first"), SubmitOutcome::Sent(_)));
    assert_eq!(harness.submit("second"), SubmitOutcome::Busy);

    assert_eq!(harness.texts(), vec!["first"]);
    assert_eq!(harness.host.sent.len(), 1);
    assert_eq!(harness.session.input(), "second");

    harness.complete_last(chat_reply(ChatReply::new("ok")));
    assert!(matches!(harness.submit("second"), SubmitOutcome::Sent(_)));
}

#[test]
fn failed_request_appends_error_and_cleans_up() {
    let mut harness = Harness::direct("s1", ScriptedRandom::constant(0.99));
    harness.submit("hello");

    harness.complete_last(Err(ApiError::Status {
        status: 500,
        message: "model offline".to_string(),
    }));

    assert_eq!(harness.texts(), vec!["hello", "Ошибка: model offline"]);
    assert_eq!(harness.session.log().messages()[1].kind, MessageKind::Assistant);
    assert_eq!(harness.session.last_outcome(), Some(SubmissionOutcome::Failed));
    assert_eq!(harness.session.submission_state(), SubmissionState::Idle);
    assert_eq!(harness.session.input(), "");
    assert_eq!(harness.host.focus_restores, 1);
    assert_eq!(harness.session.session_id(), "s1");
}

#[test]
fn malformed_and_mismatched_responses_surface_as_errors() {
    let mut harness = Harness::direct("s1", ScriptedRandom::constant(0.99));

    harness.submit("one");
    harness.complete_last(Err(ApiError::MalformedResponse {
        endpoint: "/chat",
        message: "missing field `reply`".to_string(),
    }));
    harness.submit("two");
    harness.complete_last(Ok(BackendResponse::Cleared));

    let texts = harness.texts();
    assert_eq!(texts.len(), 4);
    assert!(texts[1].starts_with("Ошибка: malformed response from /chat"));
    assert!(texts[3].starts_with("Ошибка: malformed response from /chat"));
    assert_eq!(harness.host.focus_restores, 2);
}

#[test]
fn refused_dispatch_fails_without_waiting() {
    let mut harness = Harness::direct("s1", ScriptedRandom::constant(0.99));
    harness.host.refuse_sends = Some("runtime stopped".to_string());

    assert_eq!(harness.submit("hello"), SubmitOutcome::DispatchFailed);

    assert_eq!(harness.texts().len(), 2);
    assert!(harness.texts()[1].starts_with("Ошибка: "));
    assert!(harness.texts()[1].contains("runtime stopped"));
    assert_eq!(harness.session.submission_state(), SubmissionState::Idle);
    assert_eq!(harness.session.pending_requests(), 0);
    assert_eq!(harness.host.focus_restores, 1);
}

#[test]
fn page_directive_opens_overlay_only_when_present() {
    let mut harness = Harness::direct("s1", ScriptedRandom::constant(0.99));

    harness.submit("plain");
    harness.complete_last(chat_reply(ChatReply::new("no page")));
    assert!(harness.host.opened_pages.is_empty());
    assert!(harness.session.overlay().is_none());

    harness.submit("read");
    harness.complete_last(chat_reply(
        ChatReply::new("here you go").with_page("/static/suppertime_v1.4.html", "1.4"),
    ));

    assert_eq!(harness.host.opened_pages.len(), 1);
    let overlay = harness.session.surface().overlay.expect("overlay visible");
    assert_eq!(overlay.url, "/static/suppertime_v1.4.html");
    assert_eq!(overlay.version, "1.4");
    assert!(overlay.visible);
    assert_eq!(harness.texts().last().map(String::as_str), Some("here you go"));
}

#[test]
fn stale_completion_ids_are_ignored() {
    let mut harness = Harness::direct("s1", ScriptedRandom::constant(0.99));
    harness.submit("hello");
    let request_id = harness.host.last_request_id();

    harness.complete(request_id + 100, chat_reply(ChatReply::new("ghost")));
    assert_eq!(harness.texts(), vec!["hello"]);

    harness.complete(request_id, chat_reply(ChatReply::new("real")));
    harness.complete(request_id, chat_reply(ChatReply::new("duplicate")));
    assert_eq!(harness.texts(), vec!["hello", "real"]);
}

#[test]
fn clear_history_is_optimistic() {
    let mut harness = Harness::direct("s1", ScriptedRandom::constant(0.99));
    harness.submit("hello");
    harness.complete_last(chat_reply(ChatReply::new("hi")));

    let cleared = Arc::new(Mutex::new(0usize));
    harness.session.subscribe({
        let cleared = Arc::clone(&cleared);
        move |event| {
            if matches!(event, LogEvent::Cleared) {
                *cleared.lock().expect("cleared lock") += 1;
            }
        }
    });

    harness.session.clear_history(&mut harness.host);
    assert!(harness.session.log().is_empty());
    assert_eq!(*cleared.lock().expect("cleared lock"), 1);
    assert_eq!(
        harness.host.last_sent().1,
        BackendRequest::ClearHistory {
            session_id: "s1".to_string()
        }
    );

    harness.complete_last(Err(ApiError::Status {
        status: 503,
        message: "Service Unavailable".to_string(),
    }));
    assert!(harness.session.log().is_empty());
}

#[test]
fn theme_toggle_persists_through_the_store() {
    let mut harness = Harness::direct("s1", ScriptedRandom::constant(0.99));
    assert_eq!(harness.session.surface().theme, session_store::Theme::Light);

    let theme = harness.session.toggle_theme(&mut harness.host);
    assert_eq!(theme, session_store::Theme::Dark);
    assert_eq!(harness.session.store().theme(), session_store::Theme::Dark);
    assert_eq!(harness.session.surface().theme, session_store::Theme::Dark);
}
