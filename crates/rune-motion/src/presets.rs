//! Named wirings exposed to host components.
//!
//! A [`PresetSpec`] says which variant a component uses, which interaction
//! overlays it carries, its delay and how its entrance is triggered. The
//! runtime turns it into orchestrators on mount.

use crate::error::Result;
use crate::observer::ObserverOptions;
use crate::orchestrator::OrchestratorOptions;
use crate::registry::{FadeDirection, SlideDirection, StaggerSpeed, VariantName, VariantRegistry};
use crate::variant::Variant;

/// Which composite a preset describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresetKind {
    FadeIn,
    ScaleIn,
    Stagger,
    StaggerItem,
    Card,
    Button,
    Section,
    Text,
    Image,
    SlideCarousel,
}

/// How a preset's entrance is triggered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trigger {
    /// When its element crosses the visibility threshold.
    Viewport {
        /// Overrides the configured `once` default.
        once: Option<bool>,
        /// Overrides the configured threshold.
        threshold: Option<f32>,
    },
    /// Immediately on mount.
    Mount,
    /// By the enclosing stagger coordinator.
    Parent,
}

impl Trigger {
    /// Viewport trigger using the configured defaults.
    pub const VIEWPORT: Trigger = Trigger::Viewport {
        once: None,
        threshold: None,
    };

    pub fn once(&self, default_once: bool) -> bool {
        match self {
            Trigger::Viewport { once, .. } => once.unwrap_or(default_once),
            Trigger::Mount | Trigger::Parent => true,
        }
    }

    /// Observer options for a viewport trigger, filling unset fields from
    /// `defaults`.
    pub fn observer_options(&self, defaults: ObserverOptions) -> Option<ObserverOptions> {
        match self {
            Trigger::Viewport { once, threshold } => Some(ObserverOptions::new(
                threshold.unwrap_or(defaults.threshold),
                once.unwrap_or(defaults.once),
            )),
            Trigger::Mount | Trigger::Parent => None,
        }
    }
}

/// Declarative description of one animated component.
#[derive(Debug, Clone, PartialEq)]
pub struct PresetSpec {
    pub kind: PresetKind,
    pub variant: VariantName,
    /// Variants whose `hover`/`pressed` states are merged onto `variant`.
    pub overlays: Vec<VariantName>,
    pub delay_ms: f32,
    pub trigger: Trigger,
    pub interactive: bool,
    pub disabled: bool,
    /// Independent opacity timeline started by the host (image payloads).
    pub payload: Option<VariantName>,
}

impl PresetSpec {
    fn new(kind: PresetKind, variant: VariantName) -> Self {
        Self {
            kind,
            variant,
            overlays: Vec::new(),
            delay_ms: 0.0,
            trigger: Trigger::VIEWPORT,
            interactive: false,
            disabled: false,
            payload: None,
        }
    }

    pub fn fade_in(direction: FadeDirection, delay_ms: f32) -> Self {
        Self::new(PresetKind::FadeIn, VariantName::Fade(direction)).with_delay(delay_ms)
    }

    /// `FadeIn` with a string direction; unknown values fall back to `up`.
    pub fn fade_in_named(direction: &str, delay_ms: f32) -> Self {
        Self::fade_in(FadeDirection::parse_lossy(direction), delay_ms)
    }

    pub fn scale_in(delay_ms: f32, spring: bool) -> Self {
        let variant = if spring {
            VariantName::ScaleInSpring
        } else {
            VariantName::ScaleIn
        };
        Self::new(PresetKind::ScaleIn, variant).with_delay(delay_ms)
    }

    pub fn stagger(speed: StaggerSpeed) -> Self {
        Self::new(PresetKind::Stagger, VariantName::StaggerContainer(speed))
    }

    pub fn stagger_named(speed: &str) -> Self {
        Self::stagger(StaggerSpeed::parse_lossy(speed))
    }

    /// Child of a [`stagger`](Self::stagger) container.
    pub fn stagger_item() -> Self {
        let mut spec = Self::new(PresetKind::StaggerItem, VariantName::FADE_IN_UP);
        spec.trigger = Trigger::Parent;
        spec
    }

    /// Product card; `hover_effect` adds the lift/press interaction.
    pub fn animated_card(hover_effect: bool) -> Self {
        let mut spec = Self::new(PresetKind::Card, VariantName::ProductCard);
        if hover_effect {
            spec.overlays = vec![VariantName::CardHover, VariantName::CardTap];
            spec.interactive = true;
        }
        spec
    }

    /// Button with hover and tap feedback and no entrance.
    pub fn animated_button(disabled: bool) -> Self {
        let mut spec = Self::new(PresetKind::Button, VariantName::ButtonHover);
        spec.overlays = vec![VariantName::ButtonTap];
        spec.trigger = Trigger::Mount;
        spec.interactive = true;
        spec.disabled = disabled;
        spec
    }

    pub fn animated_section() -> Self {
        Self::new(PresetKind::Section, VariantName::Section)
    }

    /// Text block; unknown variant names fall back to `fadeInUp`.
    pub fn animated_text(variant: &str, delay_ms: f32) -> Self {
        let name = match variant.parse::<VariantName>() {
            Ok(name) => name,
            Err(_) => {
                tracing::warn!(variant, "unknown text variant, using fadeInUp");
                VariantName::FADE_IN_UP
            }
        };
        Self::new(PresetKind::Text, name).with_delay(delay_ms)
    }

    /// Image frame that scales in, plus an opacity-only payload timeline the
    /// host starts once the image has loaded.
    pub fn animated_image() -> Self {
        let mut spec = Self::new(PresetKind::Image, VariantName::ScaleIn);
        spec.payload = Some(VariantName::ImageReveal);
        spec
    }

    /// Carousel slide; replays every time it comes back into view.
    pub fn slide_carousel(direction: SlideDirection) -> Self {
        let mut spec = Self::new(PresetKind::SlideCarousel, VariantName::SlideIn(direction));
        spec.trigger = Trigger::Viewport {
            once: Some(false),
            threshold: None,
        };
        spec
    }

    pub fn slide_carousel_named(direction: &str) -> Self {
        Self::slide_carousel(SlideDirection::parse_lossy(direction))
    }

    pub fn with_delay(mut self, delay_ms: f32) -> Self {
        self.delay_ms = delay_ms.max(0.0);
        self
    }

    pub fn with_once(mut self, once: bool) -> Self {
        if let Trigger::Viewport { threshold, .. } = self.trigger {
            self.trigger = Trigger::Viewport {
                once: Some(once),
                threshold,
            };
        }
        self
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        if let Trigger::Viewport { once, .. } = self.trigger {
            self.trigger = Trigger::Viewport {
                once,
                threshold: Some(threshold),
            };
        }
        self
    }

    pub fn is_stagger(&self) -> bool {
        self.kind == PresetKind::Stagger
    }

    /// Resolve the variant with its overlays applied.
    pub fn build_variant(&self, registry: &VariantRegistry) -> Result<Variant> {
        let mut variant = registry.get(self.variant)?.clone();
        for overlay in &self.overlays {
            variant = variant.overlay(registry.get(*overlay)?);
        }
        Ok(variant)
    }

    pub fn orchestrator_options(&self, default_once: bool, reduced_duration_ms: f32) -> OrchestratorOptions {
        OrchestratorOptions::default()
            .with_delay(self.delay_ms)
            .interactive(self.interactive)
            .disabled(self.disabled)
            .with_reduced_duration(reduced_duration_ms)
            .once(self.trigger.once(default_once))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StateName;

    #[test]
    fn test_option_fallbacks() {
        assert_eq!(
            PresetSpec::fade_in_named("diagonal", 0.0).variant,
            VariantName::Fade(FadeDirection::Up)
        );
        assert_eq!(
            PresetSpec::slide_carousel_named("sideways").variant,
            VariantName::SlideIn(SlideDirection::Right)
        );
        assert_eq!(
            PresetSpec::stagger_named("ludicrous").variant,
            VariantName::StaggerContainer(StaggerSpeed::Normal)
        );
        assert_eq!(PresetSpec::animated_text("wobble", 0.0).variant, VariantName::FADE_IN_UP);
        assert_eq!(
            PresetSpec::animated_text("fadeInLeft", 0.0).variant,
            VariantName::Fade(FadeDirection::Left)
        );
    }

    #[test]
    fn test_once_defaults() {
        assert!(PresetSpec::animated_section().trigger.once(true));
        assert!(!PresetSpec::fade_in(FadeDirection::Up, 0.0).trigger.once(false));
        // carousels replay regardless of the configured default
        assert!(!PresetSpec::slide_carousel(SlideDirection::Left).trigger.once(true));
        assert!(!PresetSpec::animated_section().with_once(false).trigger.once(true));
    }

    #[test]
    fn test_card_overlays() -> anyhow::Result<()> {
        let registry = VariantRegistry::default();

        let card = PresetSpec::animated_card(true).build_variant(&registry)?;
        assert!(card.has_state(StateName::Hover));
        assert!(card.has_state(StateName::Pressed));
        assert_eq!(card.transition_into(StateName::Hover).duration_ms, 200.0);

        let plain = PresetSpec::animated_card(false);
        assert!(!plain.interactive);
        assert!(!plain.build_variant(&registry)?.has_state(StateName::Hover));
        Ok(())
    }

    #[test]
    fn test_button_and_image_wiring() {
        let button = PresetSpec::animated_button(true);
        assert_eq!(button.trigger, Trigger::Mount);
        assert!(button.orchestrator_options(true, 10.0).disabled);

        let image = PresetSpec::animated_image();
        assert_eq!(image.variant, VariantName::ScaleIn);
        assert_eq!(image.payload, Some(VariantName::ImageReveal));
    }

    #[test]
    fn test_threshold_override() {
        let spec = PresetSpec::animated_section().with_threshold(0.5);
        let options = spec.trigger.observer_options(ObserverOptions::default()).unwrap();
        assert_eq!(options.threshold, 0.5);
        assert!(options.once);
        assert!(PresetSpec::stagger_item()
            .trigger
            .observer_options(ObserverOptions::default())
            .is_none());
    }
}
