//! Interpolation between keyframe sets.
//!
//! The `Interpolate` trait is the mechanism that produces the in-between
//! frames a host renders while a transition is running.

use crate::types::{KeyframeSet, VisualProperty};

/// Trait for types that can be interpolated between two values.
pub trait Interpolate: Sized {
    /// Interpolate between self and another value.
    ///
    /// When t = 0.0, returns self.
    /// When t = 1.0, returns to.
    /// Eased progress may leave [0, 1] (springs overshoot); values extrapolate.
    fn interpolate(&self, to: &Self, t: f32) -> Self;
}

#[inline]
fn lerp_f32(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

impl Interpolate for f32 {
    fn interpolate(&self, to: &Self, t: f32) -> Self {
        lerp_f32(*self, *to, t)
    }
}

impl Interpolate for KeyframeSet {
    /// Interpolate every property declared on either side.
    ///
    /// A property declared on only one side is interpolated against its
    /// identity value, so `{opacity: 0, y: 40}` → `{opacity: 1}` also settles y.
    fn interpolate(&self, to: &Self, t: f32) -> Self {
        let mut out = KeyframeSet::new();
        for property in VisualProperty::ALL {
            if self.get(property).is_none() && to.get(property).is_none() {
                continue;
            }
            let from = self.resolve(property);
            let target = to.resolve(property);
            out.set(property, from.interpolate(&target, t));
        }
        out
    }
}
