use std::sync::Arc;
use std::time::Duration;

use reportd_bus::mock::MockBus;
use reportd_bus::ObjectServer;
use reportd_core::{Prompt, PromptKind};
use reportd_runner::{Interactor, PromptReply};
use tokio_util::sync::CancellationToken;

use super::*;

fn station(bus: Arc<MockBus>, cancel: CancellationToken) -> PromptStation {
    let signal = bus.register_object("/org/freedesktop/reportd/Task/1").expect("register task");
    PromptStation::new(bus, signal, "/org/freedesktop/reportd/Task/1/Prompt", cancel)
}

#[tokio::test]
async fn commit_unblocks_the_waiting_ask_with_the_submitted_answer() {
    let bus = Arc::new(MockBus::new());
    let station = Arc::new(station(bus.clone(), CancellationToken::new()));

    let waiting = {
        let station = station.clone();
        tokio::spawn(async move { station.ask(PromptKind::Ask, "what is your name?").await })
    };

    // Give the ask() call a moment to register the prompt object and emit.
    tokio::time::sleep(Duration::from_millis(10)).await;
    let path = bus
        .registered_objects()
        .into_iter()
        .find(|p| p.starts_with("/org/freedesktop/reportd/Task/1/Prompt/"))
        .expect("prompt object registered");

    let mut answer = Prompt::new("what is your name?");
    answer.input = "ccpe".to_string();
    assert!(station.commit(&path, answer));

    let reply = waiting.await.expect("join");
    assert_eq!(reply, PromptReply::Text("ccpe".to_string()));
    assert!(!bus.registered_objects().iter().any(|p| p == &path));
}

#[tokio::test]
async fn cancellation_unblocks_the_wait_with_a_cancelled_reply() {
    let bus = Arc::new(MockBus::new());
    let cancel = CancellationToken::new();
    let station = Arc::new(station(bus, cancel.clone()));

    let waiting = {
        let station = station.clone();
        tokio::spawn(async move { station.ask(PromptKind::AskYesNo, "proceed?").await })
    };

    tokio::time::sleep(Duration::from_millis(10)).await;
    cancel.cancel();
    station.wake_for_cancel();

    let reply = waiting.await.expect("join");
    assert_eq!(reply, PromptReply::Cancelled);
}

#[tokio::test]
async fn remembered_no_skips_the_prompt_on_a_later_ask_with_the_same_message() {
    let bus = Arc::new(MockBus::new());
    let station = Arc::new(station(bus.clone(), CancellationToken::new()));

    let waiting = {
        let station = station.clone();
        tokio::spawn(async move { station.ask(PromptKind::AskYesNoYesForever, "keep asking?").await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    let path = bus
        .registered_objects()
        .into_iter()
        .find(|p| p.contains("/Prompt/"))
        .expect("prompt object registered");
    let mut answer = Prompt::new("keep asking?");
    answer.response = false;
    answer.remember = true;
    station.commit(&path, answer);
    let first = waiting.await.expect("join");
    assert_eq!(first, PromptReply::YesNo { response: false, remember: true });

    let signals_before = bus.signals().len();
    let second = station.ask(PromptKind::AskYesNoYesForever, "keep asking?").await;
    assert_eq!(second, PromptReply::YesNo { response: true, remember: false });
    assert_eq!(bus.signals().len(), signals_before, "no new Prompt signal for a remembered no");
}

#[tokio::test]
async fn ask_yes_no_save_persists_whichever_answer_was_given() {
    let bus = Arc::new(MockBus::new());
    let station = Arc::new(station(bus.clone(), CancellationToken::new()));

    let waiting = {
        let station = station.clone();
        tokio::spawn(async move { station.ask(PromptKind::AskYesNoSave, "save this?").await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    let path = bus
        .registered_objects()
        .into_iter()
        .find(|p| p.contains("/Prompt/"))
        .expect("prompt object registered");
    let mut answer = Prompt::new("save this?");
    answer.response = false;
    answer.remember = true;
    station.commit(&path, answer);
    let first = waiting.await.expect("join");
    assert_eq!(first, PromptReply::YesNo { response: false, remember: true });

    // A saved "no" must stay "no" on replay, unlike yes-no-forever which
    // only ever remembers "no" as a reason to stop asking, not the value.
    let signals_before = bus.signals().len();
    let second = station.ask(PromptKind::AskYesNoSave, "save this?").await;
    assert_eq!(second, PromptReply::YesNo { response: false, remember: false });
    assert_eq!(bus.signals().len(), signals_before, "no new Prompt signal for a saved answer");
}

#[tokio::test]
async fn ask_yes_no_save_without_remember_does_not_persist() {
    let bus = Arc::new(MockBus::new());
    let station = Arc::new(station(bus.clone(), CancellationToken::new()));

    let waiting = {
        let station = station.clone();
        tokio::spawn(async move { station.ask(PromptKind::AskYesNoSave, "save that?").await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    let path = bus
        .registered_objects()
        .into_iter()
        .find(|p| p.contains("/Prompt/"))
        .expect("prompt object registered");
    let mut answer = Prompt::new("save that?");
    answer.response = true;
    answer.remember = false;
    station.commit(&path, answer);
    waiting.await.expect("join");

    let signals_before = bus.signals().len();
    station.ask(PromptKind::AskYesNoSave, "save that?").await;
    assert!(bus.signals().len() > signals_before, "unsaved answer must prompt again");
}
