//! Scripted host for the motion runtime.
//!
//! Lays a page out in a simulated viewport, mounts presets on it, scrolls
//! through it frame by frame and logs every motion event. Run with
//! `RUST_LOG=debug` to also see timer scheduling and state transitions from
//! inside the runtime.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::{Result, bail};
use rune_config::MotionSettings;
use rune_motion::{
    ComponentId, ContainerId, ElementId, MotionEvent, MotionRuntime, PointerInput, PresetSpec, Rect,
    SimulatedViewport, SlideDirection, StaggerSpeed,
};

const VIEWPORT_WIDTH: f32 = 1280.0;
const VIEWPORT_HEIGHT: f32 = 720.0;

struct Demo {
    runtime: MotionRuntime,
    viewport: SimulatedViewport,
    frame_ms: f32,
    labels: HashMap<ComponentId, String>,
    next_element: u64,
}

impl Demo {
    fn new(runtime: MotionRuntime, frame_ms: f32) -> Self {
        Self {
            runtime,
            viewport: SimulatedViewport::new(VIEWPORT_WIDTH, VIEWPORT_HEIGHT),
            frame_ms,
            labels: HashMap::new(),
            next_element: 1,
        }
    }

    fn element(&mut self) -> ElementId {
        let id = ElementId(self.next_element);
        self.next_element += 1;
        id
    }

    fn mount(&mut self, label: &str, spec: &PresetSpec, rect: Rect) -> Result<ComponentId> {
        let element = self.element();
        self.viewport.place(element, rect);
        let id = self.runtime.mount(spec, element, &mut self.viewport)?;
        self.labels.insert(id, label.to_string());
        self.flush();
        Ok(id)
    }

    fn mount_in(&mut self, label: &str, container: ContainerId, spec: &PresetSpec, rect: Rect) -> Result<ComponentId> {
        let element = self.element();
        self.viewport.place_in(container, element, rect);
        let id = self.runtime.mount(spec, element, &mut self.viewport)?;
        self.labels.insert(id, label.to_string());
        self.flush();
        Ok(id)
    }

    fn mount_child(&mut self, label: &str, parent: ComponentId) -> Result<ComponentId> {
        let id = self.runtime.mount_child(parent, &PresetSpec::stagger_item())?;
        self.labels.insert(id, label.to_string());
        self.flush();
        Ok(id)
    }

    /// Feed intersection entries, then run frames for `duration_ms`.
    fn play(&mut self, entries: Vec<(ElementId, f32)>, duration_ms: f32) {
        self.runtime.intersections(&entries, &mut self.viewport);
        self.flush();
        let mut elapsed = 0.0;
        while elapsed < duration_ms {
            self.runtime.advance(self.frame_ms);
            self.flush();
            elapsed += self.frame_ms;
        }
    }

    fn scroll_page(&mut self, to_y: f32, step: f32) {
        let mut y = self.viewport.scroll_y();
        while y < to_y {
            y = (y + step).min(to_y);
            let entries = self.viewport.scroll_to(y);
            self.play(entries, self.frame_ms);
        }
    }

    fn pointer(&mut self, id: ComponentId, input: PointerInput) {
        self.runtime.pointer(id, input);
        self.flush();
    }

    fn flush(&mut self) {
        let now = self.runtime.now_ms();
        let events: Vec<_> = self.runtime.drain_events().collect();
        for event in events {
            match event {
                MotionEvent::StateChanged { component, from, to, .. } => {
                    log::info!("[{now:>7.1} ms] {:<14} {from} -> {to}", self.label(component));
                }
                MotionEvent::PreferenceChanged { reduced } => {
                    log::info!("[{now:>7.1} ms] reduced motion is now {reduced}");
                }
                MotionEvent::Degraded {
                    component,
                    element,
                    reason,
                } => {
                    log::warn!("[{now:>7.1} ms] {} ({element}) shown without motion: {reason}", self.label(component));
                }
            }
        }
    }

    fn label(&self, id: ComponentId) -> &str {
        self.labels.get(&id).map(String::as_str).unwrap_or("?")
    }
}

fn landing(demo: &mut Demo, signal: &Cell<Option<bool>>) -> Result<()> {
    log::info!("scene: landing page");
    let w = VIEWPORT_WIDTH;

    // above the fold: enters at mount
    demo.mount("hero", &PresetSpec::animated_section(), Rect::new(0.0, 0.0, w, 520.0))?;
    demo.mount(
        "tagline",
        &PresetSpec::animated_text("fadeInUp", 200.0),
        Rect::new(200.0, 540.0, 880.0, 80.0),
    )?;
    let cta = demo.mount("cta", &PresetSpec::animated_button(false), Rect::new(560.0, 640.0, 160.0, 48.0))?;

    let grid = demo.mount(
        "grid",
        &PresetSpec::stagger(StaggerSpeed::Normal),
        Rect::new(0.0, 900.0, w, 600.0),
    )?;
    for i in 0..6 {
        demo.mount_child(&format!("grid[{i}]"), grid)?;
    }

    let card = demo.mount("card", &PresetSpec::animated_card(true), Rect::new(100.0, 1600.0, 320.0, 420.0))?;
    let image = demo.mount("image", &PresetSpec::animated_image(), Rect::new(500.0, 1600.0, 640.0, 420.0))?;
    demo.mount(
        "footer",
        &PresetSpec::fade_in_named("none", 0.0),
        Rect::new(0.0, 2200.0, w, 300.0),
    )?;

    demo.play(Vec::new(), 900.0);
    demo.pointer(cta, PointerInput::HoverStart);
    demo.pointer(cta, PointerInput::PressStart);
    demo.play(Vec::new(), 150.0);
    demo.pointer(cta, PointerInput::PressEnd);
    demo.pointer(cta, PointerInput::HoverEnd);

    demo.scroll_page(1100.0, 40.0);
    demo.play(Vec::new(), 1200.0);

    demo.scroll_page(1500.0, 40.0);
    demo.runtime.payload_ready(image)?;
    demo.pointer(card, PointerInput::HoverStart);
    demo.play(Vec::new(), 600.0);

    // the OS setting flips while the card is hovered
    signal.set(Some(true));
    demo.runtime.environment_changed();
    demo.flush();

    demo.scroll_page(1800.0, 40.0);
    demo.play(Vec::new(), 200.0);
    Ok(())
}

fn carousel(demo: &mut Demo) -> Result<()> {
    log::info!("scene: carousel");
    let strip = ContainerId(1);
    let slide_w = 800.0;
    demo.viewport.add_container(strip, Rect::new(240.0, 100.0, slide_w, 450.0));

    let directions = [SlideDirection::Left, SlideDirection::Right, SlideDirection::Up];
    for (i, direction) in directions.into_iter().enumerate() {
        demo.mount_in(
            &format!("slide[{i}]"),
            strip,
            &PresetSpec::slide_carousel(direction),
            Rect::new(i as f32 * slide_w, 0.0, slide_w, 450.0),
        )?;
    }
    demo.play(Vec::new(), 800.0);

    // page forward and back; slides replay on every visit
    for index in [1.0, 2.0, 1.0, 0.0] {
        let entries = demo.viewport.scroll_container_to(strip, index * slide_w, 0.0);
        demo.play(entries, 800.0);
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = MotionSettings::load();
    log::info!(
        "threshold {} / stagger {}-{}-{} ms / reduced motion {:?}",
        settings.observer.threshold,
        settings.stagger.fast_ms,
        settings.stagger.normal_ms,
        settings.stagger.slow_ms,
        settings.preference.reduced_motion
    );

    // stand-in for the OS "prefers reduced motion" signal
    let signal = Rc::new(Cell::new(
        std::env::var("PREFERS_REDUCED_MOTION")
            .ok()
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true")),
    ));
    let source = signal.clone();
    let runtime = MotionRuntime::with_settings(&settings, Box::new(move || source.get()));

    let mut demo = Demo::new(runtime, settings.demo.frame_ms.max(1.0));
    match settings.demo.scene.as_deref().unwrap_or("landing") {
        "landing" => landing(&mut demo, &signal)?,
        "carousel" => carousel(&mut demo)?,
        other => bail!("unknown scene `{other}` (expected landing or carousel)"),
    }

    log::info!(
        "done at {:.1} ms: {} components, {} timers pending",
        demo.runtime.now_ms(),
        demo.runtime.component_count(),
        demo.runtime.pending_timers()
    );
    Ok(())
}
