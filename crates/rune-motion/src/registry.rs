//! Variant registry and the built-in catalogue.
//!
//! Variants are keyed by [`VariantName`], an enum with a stable string form
//! (`"fadeInUp"`, `"staggerContainerFast"`, `"slideIn:left"`). Hosts that pick
//! variants by string go through [`VariantRegistry::get_named`], which rejects
//! unrecognised names with `UnknownVariant` instead of falling through.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::easing::EasingFunction;
use crate::error::{MotionError, Result};
use crate::transition::TransitionSpec;
use crate::types::{KeyframeSet, StateName};
use crate::variant::Variant;

/// Offset used by the directional fades.
pub const FADE_DISTANCE: f32 = 40.0;
/// Offset that puts a sliding element fully off-screen.
pub const SLIDE_DISTANCE: f32 = 1000.0;

/// Direction a fade travels in from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FadeDirection {
    /// Plain cross-fade.
    None,
    #[default]
    Up,
    Down,
    Left,
    Right,
}

impl FadeDirection {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Some(Self::None),
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    /// Parse, falling back to `Up` for anything unrecognised.
    pub fn parse_lossy(value: &str) -> Self {
        Self::parse(value).unwrap_or_else(|| {
            tracing::warn!(value, "unknown fade direction, using `up`");
            Self::default()
        })
    }
}

/// Direction a slide enters from and exits to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideDirection {
    Left,
    #[default]
    Right,
    Up,
    Down,
}

impl SlideDirection {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            _ => None,
        }
    }

    /// Parse, falling back to `Right` for anything unrecognised.
    pub fn parse_lossy(value: &str) -> Self {
        Self::parse(value).unwrap_or_else(|| {
            tracing::warn!(value, "unknown slide direction, using `right`");
            Self::default()
        })
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
        }
    }

    /// Off-screen keyframes in this direction.
    fn offscreen(&self) -> KeyframeSet {
        let base = KeyframeSet::new().opacity(0.0);
        match self {
            Self::Left => base.x(-SLIDE_DISTANCE),
            Self::Right => base.x(SLIDE_DISTANCE),
            Self::Up => base.y(-SLIDE_DISTANCE),
            Self::Down => base.y(SLIDE_DISTANCE),
        }
    }
}

/// Named stagger speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaggerSpeed {
    Fast,
    #[default]
    Normal,
    Slow,
}

impl StaggerSpeed {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fast" => Some(Self::Fast),
            "normal" => Some(Self::Normal),
            "slow" => Some(Self::Slow),
            _ => None,
        }
    }

    pub fn parse_lossy(value: &str) -> Self {
        Self::parse(value).unwrap_or_else(|| {
            tracing::warn!(value, "unknown stagger speed, using `normal`");
            Self::default()
        })
    }
}

/// Step intervals for each stagger speed, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaggerSteps {
    pub fast_ms: f32,
    pub normal_ms: f32,
    pub slow_ms: f32,
}

impl Default for StaggerSteps {
    fn default() -> Self {
        Self {
            fast_ms: 50.0,
            normal_ms: 100.0,
            slow_ms: 200.0,
        }
    }
}

impl StaggerSteps {
    pub fn step_for(&self, speed: StaggerSpeed) -> f32 {
        match speed {
            StaggerSpeed::Fast => self.fast_ms,
            StaggerSpeed::Normal => self.normal_ms,
            StaggerSpeed::Slow => self.slow_ms,
        }
    }
}

/// Key of a catalogue variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum VariantName {
    /// `fadeIn` and the directional `fadeInUp/Down/Left/Right`.
    Fade(FadeDirection),
    ScaleIn,
    ScaleInSpring,
    StaggerContainer(StaggerSpeed),
    ProductCard,
    CardHover,
    CardTap,
    ButtonHover,
    ButtonTap,
    Section,
    /// Opacity-only reveal for image payloads.
    ImageReveal,
    SlideIn(SlideDirection),
}

impl VariantName {
    pub const FADE_IN: VariantName = VariantName::Fade(FadeDirection::None);
    pub const FADE_IN_UP: VariantName = VariantName::Fade(FadeDirection::Up);
}

impl fmt::Display for VariantName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fade(FadeDirection::None) => f.write_str("fadeIn"),
            Self::Fade(FadeDirection::Up) => f.write_str("fadeInUp"),
            Self::Fade(FadeDirection::Down) => f.write_str("fadeInDown"),
            Self::Fade(FadeDirection::Left) => f.write_str("fadeInLeft"),
            Self::Fade(FadeDirection::Right) => f.write_str("fadeInRight"),
            Self::ScaleIn => f.write_str("scaleIn"),
            Self::ScaleInSpring => f.write_str("scaleInSpring"),
            Self::StaggerContainer(StaggerSpeed::Fast) => f.write_str("staggerContainerFast"),
            Self::StaggerContainer(StaggerSpeed::Normal) => f.write_str("staggerContainerNormal"),
            Self::StaggerContainer(StaggerSpeed::Slow) => f.write_str("staggerContainerSlow"),
            Self::ProductCard => f.write_str("productCard"),
            Self::CardHover => f.write_str("cardHover"),
            Self::CardTap => f.write_str("cardTap"),
            Self::ButtonHover => f.write_str("buttonHover"),
            Self::ButtonTap => f.write_str("buttonTap"),
            Self::Section => f.write_str("sectionVariants"),
            Self::ImageReveal => f.write_str("imageReveal"),
            Self::SlideIn(direction) => write!(f, "slideIn:{}", direction.as_str()),
        }
    }
}

impl FromStr for VariantName {
    type Err = MotionError;

    fn from_str(value: &str) -> Result<Self> {
        let name = match value {
            "fadeIn" => Self::Fade(FadeDirection::None),
            "fadeInUp" => Self::Fade(FadeDirection::Up),
            "fadeInDown" => Self::Fade(FadeDirection::Down),
            "fadeInLeft" => Self::Fade(FadeDirection::Left),
            "fadeInRight" => Self::Fade(FadeDirection::Right),
            "scaleIn" => Self::ScaleIn,
            "scaleInSpring" => Self::ScaleInSpring,
            "staggerContainerFast" => Self::StaggerContainer(StaggerSpeed::Fast),
            "staggerContainer" | "staggerContainerNormal" => {
                Self::StaggerContainer(StaggerSpeed::Normal)
            }
            "staggerContainerSlow" => Self::StaggerContainer(StaggerSpeed::Slow),
            "productCard" => Self::ProductCard,
            "cardHover" => Self::CardHover,
            "cardTap" => Self::CardTap,
            "buttonHover" => Self::ButtonHover,
            "buttonTap" => Self::ButtonTap,
            "sectionVariants" => Self::Section,
            "imageReveal" => Self::ImageReveal,
            other => {
                let direction = other
                    .strip_prefix("slideIn:")
                    .and_then(SlideDirection::parse)
                    .ok_or_else(|| MotionError::unknown_variant(other))?;
                Self::SlideIn(direction)
            }
        };
        Ok(name)
    }
}

impl From<VariantName> for String {
    fn from(name: VariantName) -> Self {
        name.to_string()
    }
}

impl TryFrom<String> for VariantName {
    type Error = MotionError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Derive the carousel variant for `direction`.
///
/// `hidden` and `exit` both sit off-screen in that direction, so a slide
/// animates in from and back out to the same side.
pub fn slide_in(direction: SlideDirection) -> Variant {
    let offscreen = direction.offscreen();
    Variant::entrance(
        VariantName::SlideIn(direction),
        offscreen.clone(),
        KeyframeSet::new().opacity(1.0).x(0.0).y(0.0),
        TransitionSpec::spring(300.0, 30.0),
    )
    .with_state(StateName::Exit, offscreen)
    .with_state_transition(StateName::Exit, TransitionSpec::new(200.0))
}

fn fade(direction: FadeDirection) -> Variant {
    let hidden = KeyframeSet::new().opacity(0.0);
    let (hidden, visible) = match direction {
        FadeDirection::None => (hidden, KeyframeSet::new().opacity(1.0)),
        FadeDirection::Up => (hidden.y(FADE_DISTANCE), KeyframeSet::new().opacity(1.0).y(0.0)),
        FadeDirection::Down => (hidden.y(-FADE_DISTANCE), KeyframeSet::new().opacity(1.0).y(0.0)),
        FadeDirection::Left => (hidden.x(-FADE_DISTANCE), KeyframeSet::new().opacity(1.0).x(0.0)),
        FadeDirection::Right => (hidden.x(FADE_DISTANCE), KeyframeSet::new().opacity(1.0).x(0.0)),
    };
    let duration = if direction == FadeDirection::None { 500.0 } else { 600.0 };
    Variant::entrance(
        VariantName::Fade(direction),
        hidden,
        visible,
        TransitionSpec::new(duration).with_easing(EasingFunction::EaseOut),
    )
}

/// Interaction-only variant: at rest when hidden or visible.
fn interaction(name: VariantName, state: StateName, keyframes: KeyframeSet, duration_ms: f32) -> Variant {
    Variant::entrance(
        name,
        KeyframeSet::new(),
        KeyframeSet::new(),
        TransitionSpec::new(0.0),
    )
    .with_state(state, keyframes)
    .with_state_transition(state, TransitionSpec::new(duration_ms).with_easing(EasingFunction::EaseOut))
}

/// Build the fixed catalogue.
pub fn catalogue(steps: StaggerSteps) -> Vec<Variant> {
    let mut variants: Vec<Variant> = [
        FadeDirection::None,
        FadeDirection::Up,
        FadeDirection::Down,
        FadeDirection::Left,
        FadeDirection::Right,
    ]
    .into_iter()
    .map(fade)
    .collect();

    let scale_hidden = KeyframeSet::new().opacity(0.0).scale(0.8);
    let scale_visible = KeyframeSet::new().opacity(1.0).scale(1.0);
    variants.push(Variant::entrance(
        VariantName::ScaleIn,
        scale_hidden.clone(),
        scale_visible.clone(),
        TransitionSpec::new(500.0).with_easing(EasingFunction::EaseOut),
    ));
    variants.push(Variant::entrance(
        VariantName::ScaleInSpring,
        scale_hidden,
        scale_visible,
        TransitionSpec::spring(300.0, 20.0),
    ));

    for speed in [StaggerSpeed::Fast, StaggerSpeed::Normal, StaggerSpeed::Slow] {
        variants.push(Variant::entrance(
            VariantName::StaggerContainer(speed),
            KeyframeSet::new().opacity(0.0),
            KeyframeSet::new().opacity(1.0),
            TransitionSpec::new(300.0).with_stagger_children(steps.step_for(speed)),
        ));
    }

    variants.push(Variant::entrance(
        VariantName::ProductCard,
        KeyframeSet::new().opacity(0.0).y(30.0),
        KeyframeSet::new().opacity(1.0).y(0.0),
        TransitionSpec::new(500.0).with_easing(EasingFunction::EaseOut),
    ));
    variants.push(interaction(
        VariantName::CardHover,
        StateName::Hover,
        KeyframeSet::new().y(-8.0).scale(1.02),
        200.0,
    ));
    variants.push(interaction(
        VariantName::CardTap,
        StateName::Pressed,
        KeyframeSet::new().scale(0.98),
        100.0,
    ));
    variants.push(interaction(
        VariantName::ButtonHover,
        StateName::Hover,
        KeyframeSet::new().scale(1.05),
        200.0,
    ));
    variants.push(interaction(
        VariantName::ButtonTap,
        StateName::Pressed,
        KeyframeSet::new().scale(0.95),
        100.0,
    ));

    variants.push(Variant::entrance(
        VariantName::Section,
        KeyframeSet::new().opacity(0.0).y(60.0),
        KeyframeSet::new().opacity(1.0).y(0.0),
        TransitionSpec::new(800.0).with_easing(EasingFunction::cubic_bezier(0.22, 1.0, 0.36, 1.0)),
    ));
    variants.push(Variant::entrance(
        VariantName::ImageReveal,
        KeyframeSet::new().opacity(0.0),
        KeyframeSet::new().opacity(1.0),
        TransitionSpec::new(400.0).with_easing(EasingFunction::Ease),
    ));

    for direction in [
        SlideDirection::Left,
        SlideDirection::Right,
        SlideDirection::Up,
        SlideDirection::Down,
    ] {
        variants.push(slide_in(direction));
    }

    variants
}

/// Enum-keyed lookup of variants.
#[derive(Debug, Clone)]
pub struct VariantRegistry {
    variants: HashMap<VariantName, Variant>,
}

impl Default for VariantRegistry {
    fn default() -> Self {
        Self::with_catalogue(StaggerSteps::default())
    }
}

impl VariantRegistry {
    /// An empty registry.
    pub fn empty() -> Self {
        Self {
            variants: HashMap::new(),
        }
    }

    /// A registry holding the built-in catalogue.
    pub fn with_catalogue(steps: StaggerSteps) -> Self {
        let mut registry = Self::empty();
        for variant in catalogue(steps) {
            registry.register(variant);
        }
        registry
    }

    /// Register a variant, replacing any existing one with the same name.
    pub fn register(&mut self, variant: Variant) -> Option<Variant> {
        self.variants.insert(variant.name, variant)
    }

    pub fn get(&self, name: VariantName) -> Result<&Variant> {
        self.variants
            .get(&name)
            .ok_or_else(|| MotionError::unknown_variant(name.to_string()))
    }

    /// Look up a variant by its string name.
    pub fn get_named(&self, name: &str) -> Result<&Variant> {
        self.get(name.parse()?)
    }

    pub fn contains(&self, name: VariantName) -> bool {
        self.variants.contains_key(&name)
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = VariantName> + '_ {
        self.variants.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VisualProperty;

    #[test]
    fn test_catalogue_is_complete() {
        let registry = VariantRegistry::default();
        for name in [
            "fadeIn",
            "fadeInUp",
            "fadeInDown",
            "fadeInLeft",
            "fadeInRight",
            "scaleIn",
            "scaleInSpring",
            "staggerContainerFast",
            "staggerContainerNormal",
            "staggerContainerSlow",
            "productCard",
            "cardHover",
            "cardTap",
            "buttonHover",
            "buttonTap",
            "sectionVariants",
            "imageReveal",
            "slideIn:left",
            "slideIn:right",
            "slideIn:up",
            "slideIn:down",
        ] {
            let variant = registry.get_named(name).unwrap();
            assert_eq!(variant.name.to_string(), name);
            assert!(variant.has_state(StateName::Hidden), "{name} lacks hidden");
            assert!(variant.has_state(StateName::Visible), "{name} lacks visible");
        }
        assert_eq!(registry.len(), 21);
    }

    #[test]
    fn test_unknown_names() {
        let registry = VariantRegistry::default();
        assert!(matches!(
            registry.get_named("bounceIn"),
            Err(MotionError::UnknownVariant { name }) if name == "bounceIn"
        ));
        assert!(registry.get_named("slideIn:diagonal").is_err());

        let empty = VariantRegistry::empty();
        assert!(matches!(
            empty.get(VariantName::ScaleIn),
            Err(MotionError::UnknownVariant { name }) if name == "scaleIn"
        ));
    }

    #[test]
    fn test_slide_in_left_right_mirror() {
        let left = slide_in(SlideDirection::Left);
        let right = slide_in(SlideDirection::Right);
        let left_x = left
            .state(StateName::Hidden)
            .unwrap()
            .resolve(VisualProperty::TranslateX);
        let right_x = right
            .state(StateName::Hidden)
            .unwrap()
            .resolve(VisualProperty::TranslateX);

        assert!(left_x < 0.0);
        assert_eq!(left_x, -right_x);
        assert_eq!(left.state(StateName::Exit).unwrap(), left.state(StateName::Hidden).unwrap());
    }

    #[test]
    fn test_slide_in_vertical_offsets() {
        let up = slide_in(SlideDirection::Up);
        let hidden = up.state(StateName::Hidden).unwrap();
        assert_eq!(hidden.resolve(VisualProperty::TranslateY), -SLIDE_DISTANCE);
        assert_eq!(hidden.resolve(VisualProperty::TranslateX), 0.0);
    }

    #[test]
    fn test_stagger_steps_are_ordered() {
        let registry = VariantRegistry::default();
        let step = |speed| {
            registry
                .get(VariantName::StaggerContainer(speed))
                .unwrap()
                .transition
                .stagger_children_ms
                .unwrap()
        };
        assert!(step(StaggerSpeed::Fast) < step(StaggerSpeed::Normal));
        assert!(step(StaggerSpeed::Normal) < step(StaggerSpeed::Slow));
    }

    #[test]
    fn test_lossy_option_parsing() {
        assert_eq!(FadeDirection::parse_lossy("LEFT"), FadeDirection::Left);
        assert_eq!(FadeDirection::parse_lossy("sideways"), FadeDirection::Up);
        assert_eq!(SlideDirection::parse_lossy("diagonal"), SlideDirection::Right);
        assert_eq!(StaggerSpeed::parse_lossy("ludicrous"), StaggerSpeed::Normal);
        assert_eq!("staggerContainer".parse::<VariantName>().unwrap(), VariantName::StaggerContainer(StaggerSpeed::Normal));
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = VariantRegistry::default();
        let custom = Variant::entrance(
            VariantName::ScaleIn,
            KeyframeSet::new().opacity(0.0).scale(0.5),
            KeyframeSet::new().opacity(1.0).scale(1.0),
            TransitionSpec::new(250.0),
        );
        assert!(registry.register(custom).is_some());
        assert_eq!(registry.get(VariantName::ScaleIn).unwrap().transition.duration_ms, 250.0);
    }

    #[test]
    fn test_variant_name_serializes_as_string() {
        let json = serde_json::to_string(&VariantName::SlideIn(SlideDirection::Left)).unwrap();
        assert_eq!(json, "\"slideIn:left\"");
        let parsed: VariantName = serde_json::from_str("\"cardTap\"").unwrap();
        assert_eq!(parsed, VariantName::CardTap);
    }
}
