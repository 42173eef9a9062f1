//! # Walkthrough Integration Test
//!
//! Plays the story end to end the way a visitor would, through the event
//! queue, and checks what the renderer would see at each step.

use keepsake_core::{
    ActionOutcome, EngineConfig, EventOutcome, EventQueue, IgnoreReason, SceneAction, SceneFlow, SceneKind,
    Session, StoryContent, UiEvent, Viewport,
};

const ENGINE_TOML: &str = r#"
seed = 7
flow = "full"

[timing]
transition_ms = 600
type_interval_ms = 25

[hearts]
capacity = 15
lane_vw = [0.0, 100.0]

[particles.bokeh]
count = 12
size = [20.0, 70.0]
duration_ms = [10000.0, 25000.0]
delay_ms = [0.0, 5000.0]
"#;

const STORY_TOML: &str = r#"
promise = ["I promise to hold your hand.", "Forever."]

[title]
resting = "Hey you"
hovered = "Hey love"

[letter]
body = "Hello!"
signer = "Me"

[[gallery]]
id = 1
title = "First Date"
date = "The day it all began"
caption = "Coffee that turned into hours."
icon = "☕"
"#;

fn drive(session: &mut Session, queue: &EventQueue, dt: u64) -> Vec<EventOutcome> {
    let outcomes = queue.drain().map(|event| session.handle(event)).collect();
    session.advance(dt);
    outcomes
}

/// Test: the full letter scenario, step by step.
#[test]
fn test_letter_scenario() {
    let config = EngineConfig::from_toml_str(ENGINE_TOML).unwrap();
    let content = StoryContent::from_toml_str(STORY_TOML).unwrap();
    assert_eq!(content.gallery.len(), 1);
    assert_eq!(content.letter.date, "Valentine's Day 2026");

    let mut session = Session::new(config, &content, Viewport::new(1024.0, 768.0)).unwrap();
    let queue = EventQueue::default();
    let ui = queue.sender();

    assert_eq!(session.scene(), SceneKind::Initial);
    assert!(!session.snapshot().ambient_softened);

    ui.send(UiEvent::Action(SceneAction::Surprise));
    let outcomes = drive(&mut session, &queue, 0);
    assert_eq!(outcomes, vec![EventOutcome::Scene(ActionOutcome::Entered(SceneKind::Letter))]);

    let snap = session.snapshot();
    assert_eq!(snap.scene, SceneKind::Letter);
    assert!(snap.ambient_softened);
    assert_eq!(snap.letter.as_ref().unwrap().revealed_len, 0);

    for n in 1..=6 {
        drive(&mut session, &queue, 25);
        let letter = session.snapshot().letter.unwrap();
        assert_eq!(letter.revealed_len, n);
        assert_eq!(letter.text, "Hello!".chars().take(n).collect::<String>());
    }

    drive(&mut session, &queue, 499);
    assert!(!session.snapshot().letter.unwrap().signature_visible);
    drive(&mut session, &queue, 1);
    assert!(session.snapshot().letter.unwrap().signature_visible);

    drive(&mut session, &queue, 699);
    assert!(!session.snapshot().letter.unwrap().nav_control_visible);
    drive(&mut session, &queue, 1);
    assert!(session.snapshot().letter.unwrap().nav_control_visible);

    ui.send(UiEvent::Action(SceneAction::SeeMemories));
    drive(&mut session, &queue, 0);
    let snap = session.snapshot();
    assert!(snap.is_transitioning);
    assert_eq!(snap.transition.unwrap().target, SceneKind::Gallery);

    drive(&mut session, &queue, 300);
    let progress = session.snapshot().transition.unwrap().progress();
    assert!((progress - 0.5).abs() < 1e-6);

    drive(&mut session, &queue, 300);
    let snap = session.snapshot();
    assert_eq!(snap.scene, SceneKind::Gallery);
    assert!(!snap.is_transitioning);
    assert!(snap.letter.is_none());
}

/// Test: the full flow reaches the promise, dodging on the way.
#[test]
fn test_full_flow_reaches_promise() {
    let mut session = Session::new(
        EngineConfig::default().with_seed(1),
        &StoryContent::default().with_letter_body("x"),
        Viewport::new(900.0, 900.0),
    )
    .unwrap();

    session.trigger(SceneAction::Surprise);
    session.advance(25 + 1200);
    session.trigger(SceneAction::SeeMemories);
    session.advance(600);
    session.trigger(SceneAction::NextFromGallery);
    session.advance(600);
    assert_eq!(session.scene(), SceneKind::Proposal);

    match session.handle(UiEvent::EvasivePointerEnter) {
        EventOutcome::Evaded(offset) => assert!(offset.x.abs() <= 150.0 && offset.y.abs() <= 150.0),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(session.scene(), SceneKind::Proposal);
    assert!(!session.is_transitioning());

    session.trigger(SceneAction::AcceptProposal);
    session.advance(600);
    assert_eq!(session.scene(), SceneKind::Promise);

    for action in SceneAction::ALL {
        assert!(matches!(
            session.trigger(action),
            ActionOutcome::Ignored(IgnoreReason::WrongScene { .. })
        ));
    }
    assert_eq!(session.snapshot().evasive_offset.x, 0.0);
}

/// Test: the short flow ends at the gallery.
#[test]
fn test_short_flow_ends_at_gallery() {
    let mut session = Session::new(
        EngineConfig::default().with_seed(2).with_flow(SceneFlow::Short),
        &StoryContent::default().with_letter_body(""),
        Viewport::new(800.0, 600.0),
    )
    .unwrap();

    session.trigger(SceneAction::Surprise);
    session.advance(1200);
    session.trigger(SceneAction::SeeMemories);
    session.advance(600);
    assert_eq!(session.scene(), SceneKind::Gallery);

    assert_eq!(
        session.trigger(SceneAction::NextFromGallery),
        ActionOutcome::Ignored(IgnoreReason::OutsideFlow)
    );
    session.advance(10_000);
    assert_eq!(session.scene(), SceneKind::Gallery);
}

/// Test: the title swaps on hover, only on the welcome scene.
#[test]
fn test_title_hover() {
    let mut session = Session::new(
        EngineConfig::default().with_seed(3),
        &StoryContent::default(),
        Viewport::new(800.0, 600.0),
    )
    .unwrap();

    assert_eq!(session.handle(UiEvent::TitleHover(true)), EventOutcome::TitleChanged(true));
    assert!(session.snapshot().title_hovered);
    assert_eq!(session.handle(UiEvent::TitleHover(false)), EventOutcome::TitleChanged(false));
    assert!(!session.snapshot().title_hovered);

    session.trigger(SceneAction::Surprise);
    assert_eq!(session.handle(UiEvent::TitleHover(true)), EventOutcome::Ignored);
    assert!(!session.snapshot().title_hovered);
}

/// Test: malformed and out-of-range config are rejected.
#[test]
fn test_bad_config_is_rejected() {
    assert!(EngineConfig::from_toml_str("flow = \"sideways\"").is_err());
    assert!(EngineConfig::from_toml_str("[evasive]\nspan_fraction = 0.0").is_err());
    assert!(EngineConfig::from_toml_str("[timing]\nsignature_delay_ms = 2000").is_err());
}

/// Test: the shipped data files load and match the built-in defaults.
#[test]
fn test_shipped_data_files() {
    let config = EngineConfig::from_toml_str(include_str!("../../../data/engine.toml")).unwrap();
    let defaults = EngineConfig::default();
    assert_eq!(config.seed, None);
    assert_eq!(config.flow, SceneFlow::Full);
    assert_eq!(config.timing, defaults.timing);
    assert_eq!(config.hearts, defaults.hearts);
    assert_eq!(config.particles, defaults.particles);

    let content = StoryContent::from_toml_str(include_str!("../../../data/story.toml")).unwrap();
    assert_eq!(content.letter, StoryContent::default().letter);
    assert_eq!(content.title, StoryContent::default().title);
    assert_eq!(content.gallery.len(), 6);
    assert_eq!(content.promise.len(), 3);
}
