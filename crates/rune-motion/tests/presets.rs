use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anyhow::Result;
use rune_motion::{
    ContainerId, ElementId, MotionError, MotionEvent, MotionPreference, MotionPreferenceResolver,
    MotionRuntime, MotionSettings, MotionState, PointerInput, PresetSpec, Rect, ReducedMotionMode,
    SimulatedViewport, SlideDirection, StaggerSpeed, StateName, StaticQuery, Variant, VariantName,
    VariantRegistry, VisualProperty,
};

fn on_screen(element: ElementId) -> SimulatedViewport {
    let mut viewport = SimulatedViewport::new(1024.0, 768.0);
    viewport.place(element, Rect::new(100.0, 100.0, 300.0, 400.0));
    viewport
}

#[test]
fn slide_offsets_mirror_horizontally() -> Result<()> {
    let registry = VariantRegistry::default();
    let left = registry.get(VariantName::SlideIn(SlideDirection::Left))?;
    let right = registry.get(VariantName::SlideIn(SlideDirection::Right))?;

    for state in [StateName::Hidden, StateName::Exit] {
        let l = left.state(state)?.resolve(VisualProperty::TranslateX);
        let r = right.state(state)?.resolve(VisualProperty::TranslateX);
        assert!(l < 0.0 && r > 0.0);
        assert_eq!(l, -r);
        assert_eq!(left.state(state)?.resolve(VisualProperty::TranslateY), 0.0);
    }
    Ok(())
}

#[test]
fn carousel_slide_replays_on_reentry() -> Result<()> {
    let carousel = ContainerId(1);
    let slide = ElementId(10);
    let mut viewport = SimulatedViewport::new(1024.0, 768.0);
    viewport.add_container(carousel, Rect::new(0.0, 0.0, 400.0, 300.0));
    viewport.place_in(carousel, slide, Rect::new(400.0, 0.0, 400.0, 300.0));

    let mut runtime = MotionRuntime::default();
    let id = runtime.mount(&PresetSpec::slide_carousel_named("left"), slide, &mut viewport)?;
    assert_eq!(runtime.state(id), Some(MotionState::Hidden));

    for _ in 0..2 {
        let entries = viewport.scroll_container_to(carousel, 400.0, 0.0);
        runtime.intersections(&entries, &mut viewport);
        assert_eq!(runtime.state(id), Some(MotionState::Entering));
        runtime.advance(2000.0);
        assert_eq!(runtime.state(id), Some(MotionState::Visible));

        let entries = viewport.scroll_container_to(carousel, 0.0, 0.0);
        runtime.intersections(&entries, &mut viewport);
        assert_eq!(runtime.state(id), Some(MotionState::Hidden));
        runtime.advance(500.0);
        let frame = runtime.sample(id).unwrap();
        assert!(frame.resolve(VisualProperty::TranslateX) < 0.0, "slid back out to the left");
    }

    assert!(runtime.is_observing(id));
    let to_visible = runtime
        .drain_events()
        .filter(|e| e.entered_state() == Some(MotionState::Visible))
        .count();
    assert_eq!(to_visible, 2);
    Ok(())
}

#[test]
fn card_hover_and_press() -> Result<()> {
    let element = ElementId(11);
    let mut viewport = on_screen(element);
    let mut runtime = MotionRuntime::default();
    let id = runtime.mount(&PresetSpec::animated_card(true), element, &mut viewport)?;
    runtime.advance(600.0);
    assert_eq!(runtime.state(id), Some(MotionState::Visible));

    runtime.pointer(id, PointerInput::HoverStart);
    assert_eq!(runtime.state(id), Some(MotionState::Hovered));
    runtime.advance(200.0);
    let lifted = runtime.sample(id).unwrap();
    assert_eq!(lifted.resolve(VisualProperty::TranslateY), -8.0);
    assert!((lifted.resolve(VisualProperty::Scale) - 1.02).abs() < 1e-5);

    runtime.pointer(id, PointerInput::PressStart);
    assert_eq!(runtime.state(id), Some(MotionState::Pressed));
    runtime.pointer(id, PointerInput::PressEnd);
    runtime.pointer(id, PointerInput::HoverEnd);
    assert_eq!(runtime.state(id), Some(MotionState::Visible));
    Ok(())
}

#[test]
fn card_without_hover_effect_ignores_pointer() -> Result<()> {
    let element = ElementId(12);
    let mut viewport = on_screen(element);
    let mut runtime = MotionRuntime::default();
    let id = runtime.mount(&PresetSpec::animated_card(false), element, &mut viewport)?;
    runtime.advance(600.0);

    runtime.pointer(id, PointerInput::HoverStart);
    assert_eq!(runtime.state(id), Some(MotionState::Visible));
    Ok(())
}

#[test]
fn disabled_button_has_no_feedback_until_enabled() -> Result<()> {
    let element = ElementId(13);
    let mut viewport = on_screen(element);
    let mut runtime = MotionRuntime::default();

    // buttons do not wait for the viewport
    let id = runtime.mount(&PresetSpec::animated_button(true), element, &mut viewport)?;
    assert!(!viewport.is_observed(element));
    runtime.advance(16.0);
    assert_eq!(runtime.state(id), Some(MotionState::Visible));

    runtime.pointer(id, PointerInput::HoverStart);
    assert_eq!(runtime.state(id), Some(MotionState::Visible));

    runtime.set_disabled(id, false);
    assert_eq!(runtime.state(id), Some(MotionState::Hovered));
    runtime.pointer(id, PointerInput::PressStart);
    runtime.advance(100.0);
    let frame = runtime.sample(id).unwrap();
    assert!((frame.resolve(VisualProperty::Scale) - 0.95).abs() < 1e-5);
    Ok(())
}

#[test]
fn image_payload_is_independent() -> Result<()> {
    let element = ElementId(14);
    let mut viewport = on_screen(element);
    let mut runtime = MotionRuntime::default();
    let id = runtime.mount(&PresetSpec::animated_image(), element, &mut viewport)?;

    assert_eq!(runtime.state(id), Some(MotionState::Entering));
    runtime.advance(1000.0);
    assert_eq!(runtime.state(id), Some(MotionState::Visible));
    assert_eq!(runtime.payload_state(id), Some(MotionState::Hidden));

    runtime.payload_ready(id)?;
    assert_eq!(runtime.payload_state(id), Some(MotionState::Entering));
    runtime.advance(200.0);
    let half = runtime.sample_payload(id).unwrap();
    let opacity = half.resolve(VisualProperty::Opacity);
    assert!(opacity > 0.0 && opacity < 1.0);
    assert_eq!(half.get(VisualProperty::Scale), None);

    runtime.advance(200.0);
    assert_eq!(runtime.payload_state(id), Some(MotionState::Visible));
    Ok(())
}

#[test]
fn staggered_card_and_image_keep_their_behaviour() -> Result<()> {
    let grid = ElementId(20);
    let mut viewport = on_screen(grid);
    let mut runtime = MotionRuntime::default();
    let group = runtime.mount(&PresetSpec::stagger(StaggerSpeed::Fast), grid, &mut viewport)?;

    let card = runtime.mount_child(group, &PresetSpec::animated_card(true))?;
    let image = runtime.mount_child(group, &PresetSpec::animated_image())?;
    runtime.advance(3000.0);
    assert_eq!(runtime.state(card), Some(MotionState::Visible));
    assert_eq!(runtime.state(image), Some(MotionState::Visible));

    runtime.pointer(card, PointerInput::HoverStart);
    assert_eq!(runtime.state(card), Some(MotionState::Hovered));
    runtime.pointer(card, PointerInput::PressStart);
    assert_eq!(runtime.state(card), Some(MotionState::Pressed));
    runtime.set_disabled(card, true);
    assert_eq!(runtime.state(card), Some(MotionState::Visible));

    assert_eq!(runtime.payload_state(image), Some(MotionState::Hidden));
    runtime.payload_ready(image)?;
    assert_eq!(runtime.payload_state(image), Some(MotionState::Entering));
    assert!(runtime.pending_timers() > 0);

    // the payload timer goes with the group
    runtime.unmount(group, &mut viewport);
    assert_eq!(runtime.pending_timers(), 0);
    assert_eq!(runtime.component_count(), 0);
    Ok(())
}

#[test]
fn payload_on_plain_component_is_rejected() -> Result<()> {
    let element = ElementId(15);
    let mut viewport = on_screen(element);
    let mut runtime = MotionRuntime::default();
    let id = runtime.mount(&PresetSpec::animated_section(), element, &mut viewport)?;

    let err = runtime.payload_ready(id).unwrap_err();
    assert!(matches!(err, MotionError::InvalidComponent { .. }));

    let err = runtime
        .mount_child(id, &PresetSpec::stagger_item())
        .unwrap_err();
    assert!(err.is_configuration());
    Ok(())
}

#[test]
fn preference_change_reevaluates_live_components() -> Result<()> {
    let element = ElementId(16);
    let mut viewport = on_screen(element);

    let signal = Rc::new(Cell::new(Some(false)));
    let source = signal.clone();
    let resolver = MotionPreferenceResolver::system(move || source.get());
    let mut runtime = MotionRuntime::new(VariantRegistry::default(), resolver);

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    runtime
        .resolver_mut()
        .subscribe(move |pref: MotionPreference| sink.borrow_mut().push(pref.reduced));

    let id = runtime.mount(&PresetSpec::animated_card(true), element, &mut viewport)?;
    runtime.advance(600.0);
    runtime.pointer(id, PointerInput::HoverStart);
    assert_eq!(runtime.state(id), Some(MotionState::Hovered));
    runtime.drain_events().for_each(drop);

    // unchanged signal: nothing happens
    assert_eq!(runtime.environment_changed(), None);

    signal.set(Some(true));
    assert_eq!(runtime.environment_changed(), Some(MotionPreference::REDUCED));
    assert_eq!(*seen.borrow(), vec![true]);
    assert_eq!(runtime.state(id), Some(MotionState::Visible));
    assert!(runtime.preference().reduced);

    let events: Vec<_> = runtime.drain_events().collect();
    assert_eq!(events[0], MotionEvent::PreferenceChanged { reduced: true });
    assert_eq!(events[1].entered_state(), Some(MotionState::Visible));

    // hover is unreachable while reduced
    runtime.pointer(id, PointerInput::HoverEnd);
    runtime.pointer(id, PointerInput::HoverStart);
    assert_eq!(runtime.state(id), Some(MotionState::Visible));
    Ok(())
}

#[test]
fn runtime_from_settings() -> Result<()> {
    let mut settings = MotionSettings::default();
    settings.preference.reduced_motion = ReducedMotionMode::Always;
    settings.preference.reduced_duration_ms = 5.0;
    settings.stagger.normal_ms = 120.0;
    settings.observer.threshold = 0.6;

    let mut runtime = MotionRuntime::with_settings(&settings, Box::new(StaticQuery(Some(false))));
    assert!(runtime.preference().reduced);

    // 50% visible: below the configured threshold
    let element = ElementId(17);
    let mut viewport = SimulatedViewport::new(800.0, 600.0);
    viewport.place(element, Rect::new(0.0, 500.0, 800.0, 200.0));
    let section = runtime.mount(&PresetSpec::animated_section(), element, &mut viewport)?;
    assert_eq!(runtime.state(section), Some(MotionState::Hidden));

    let entries = viewport.scroll_to(100.0);
    runtime.intersections(&entries, &mut viewport);
    assert_eq!(runtime.state(section), Some(MotionState::Entering));
    runtime.advance(5.0);
    assert_eq!(runtime.state(section), Some(MotionState::Visible));

    let group_element = ElementId(18);
    viewport.place(group_element, Rect::new(0.0, 2000.0, 800.0, 200.0));
    let group = runtime.mount(&PresetSpec::stagger_named("normal"), group_element, &mut viewport)?;
    assert_eq!(runtime.coordinator(group).unwrap().step_ms(), 120.0);
    Ok(())
}

#[test]
fn registered_json_variant_is_used() -> Result<()> {
    let json = r#"{
        "name": "fadeIn",
        "states": {
            "hidden": { "opacity": 0.25 },
            "visible": { "opacity": 0.75 }
        },
        "transition": { "duration_ms": 100.0, "easing": { "type": "linear" } }
    }"#;
    let mut runtime = MotionRuntime::default();
    let replaced = runtime.registry_mut().register(Variant::from_json(json)?);
    assert!(replaced.is_some());

    let element = ElementId(19);
    let mut viewport = on_screen(element);
    let id = runtime.mount(&PresetSpec::animated_text("fadeIn", 0.0), element, &mut viewport)?;
    runtime.advance(50.0);
    let frame = runtime.sample(id).unwrap();
    assert!((frame.resolve(VisualProperty::Opacity) - 0.5).abs() < 1e-5);
    Ok(())
}
