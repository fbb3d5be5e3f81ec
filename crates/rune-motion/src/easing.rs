//! Timing curves for variant transitions.
//!
//! The named curves match their CSS keywords. `Spring` is a damped unit-mass
//! oscillator stretched over its own settle time, so a spring transition's
//! duration comes from the physics rather than from the variant.
//!
//! ```
//! use rune_motion::easing::EasingFunction;
//!
//! let ease = EasingFunction::EaseOut;
//! let progress = ease.evaluate(0.5);
//!
//! let spring = EasingFunction::spring(300.0, 20.0);
//! let duration = spring.settle_duration_ms();
//! assert!(duration.is_some());
//! ```

use serde::{Deserialize, Serialize};

/// Envelope amplitude below which a spring counts as settled.
const SPRING_REST: f32 = 0.001;

/// Maps linear progress in `[0, 1]` to eased progress.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EasingFunction {
    Linear,
    /// `cubic-bezier(0.25, 0.1, 0.25, 1)`
    Ease,
    /// `cubic-bezier(0.42, 0, 1, 1)`
    EaseIn,
    /// `cubic-bezier(0, 0, 0.58, 1)`, the entrance default.
    EaseOut,
    /// `cubic-bezier(0.42, 0, 0.58, 1)`
    EaseInOut,
    /// Control points; `x1`/`x2` lie in `[0, 1]`.
    CubicBezier { x1: f32, y1: f32, x2: f32, y2: f32 },

    /// Physical spring with unit mass.
    ///
    /// Progress 1.0 corresponds to the spring's settle time, see
    /// [`EasingFunction::settle_duration_ms`]. Underdamped springs overshoot.
    Spring { stiffness: f32, damping: f32 },
}

impl Default for EasingFunction {
    fn default() -> Self {
        Self::Ease
    }
}

impl EasingFunction {
    /// Eased progress at `t` (clamped). Overshooting curves may leave `[0, 1]`.
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => t,
            Self::Ease => cubic_bezier(0.25, 0.1, 0.25, 1.0, t),
            Self::EaseIn => cubic_bezier(0.42, 0.0, 1.0, 1.0, t),
            Self::EaseOut => cubic_bezier(0.0, 0.0, 0.58, 1.0, t),
            Self::EaseInOut => cubic_bezier(0.42, 0.0, 0.58, 1.0, t),
            Self::CubicBezier { x1, y1, x2, y2 } => cubic_bezier(*x1, *y1, *x2, *y2, t),
            Self::Spring { stiffness, damping } => spring(*stiffness, *damping, t),
        }
    }

    /// # Panics
    /// Panics if x1 or x2 are outside [0, 1].
    pub fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        assert!(
            (0.0..=1.0).contains(&x1) && (0.0..=1.0).contains(&x2),
            "Bezier x values must be in [0, 1]"
        );
        Self::CubicBezier { x1, y1, x2, y2 }
    }

    /// # Panics
    /// Panics if stiffness or damping are not positive.
    pub fn spring(stiffness: f32, damping: f32) -> Self {
        assert!(
            stiffness > 0.0 && damping > 0.0,
            "Spring stiffness and damping must be positive"
        );
        Self::Spring { stiffness, damping }
    }

    /// Natural duration of the curve, for curves that have one.
    pub fn settle_duration_ms(&self) -> Option<f32> {
        match self {
            Self::Spring { stiffness, damping } => {
                let (omega, zeta) = spring_params(*stiffness, *damping);
                Some(spring_settle_secs(omega, zeta) * 1000.0)
            }
            _ => None,
        }
    }
}

/// Unit cubic bezier from (0, 0) to (1, 1), stored as polynomial coefficients.
struct UnitBezier {
    cx: f32,
    bx: f32,
    ax: f32,
    cy: f32,
    by: f32,
    ay: f32,
}

impl UnitBezier {
    fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        let cx = 3.0 * x1;
        let bx = 3.0 * (x2 - x1) - cx;
        let cy = 3.0 * y1;
        let by = 3.0 * (y2 - y1) - cy;
        Self {
            cx,
            bx,
            ax: 1.0 - cx - bx,
            cy,
            by,
            ay: 1.0 - cy - by,
        }
    }

    fn x(&self, t: f32) -> f32 {
        ((self.ax * t + self.bx) * t + self.cx) * t
    }

    fn y(&self, t: f32) -> f32 {
        ((self.ay * t + self.by) * t + self.cy) * t
    }

    fn dx(&self, t: f32) -> f32 {
        (3.0 * self.ax * t + 2.0 * self.bx) * t + self.cx
    }

    /// Curve parameter whose x equals `x`. Newton first, bisection when the
    /// slope is too flat to converge.
    fn solve_x(&self, x: f32) -> f32 {
        let mut t = x;
        for _ in 0..8 {
            let err = self.x(t) - x;
            if err.abs() < 1e-6 {
                return t;
            }
            let slope = self.dx(t);
            if slope.abs() < 1e-6 {
                break;
            }
            t -= err / slope;
        }

        let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
        t = x;
        while lo < hi {
            let err = self.x(t) - x;
            if err.abs() < 1e-6 {
                break;
            }
            if err > 0.0 {
                hi = t;
            } else {
                lo = t;
            }
            let next = (lo + hi) * 0.5;
            if next == t {
                break;
            }
            t = next;
        }
        t
    }
}

fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, progress: f32) -> f32 {
    if progress <= 0.0 {
        return 0.0;
    }
    if progress >= 1.0 {
        return 1.0;
    }
    let curve = UnitBezier::new(x1, y1, x2, y2);
    curve.y(curve.solve_x(progress))
}

/// Natural frequency and damping ratio for a unit-mass spring.
fn spring_params(stiffness: f32, damping: f32) -> (f32, f32) {
    let omega = stiffness.sqrt();
    let zeta = damping / (2.0 * omega);
    (omega, zeta)
}

/// Time until the slowest decaying mode drops below `SPRING_REST`.
fn spring_settle_secs(omega: f32, zeta: f32) -> f32 {
    let decay = if zeta < 1.0 {
        zeta * omega
    } else {
        omega * (zeta - (zeta * zeta - 1.0).sqrt())
    };
    -SPRING_REST.ln() / decay.max(f32::EPSILON)
}

/// Step response of a spring released at rest from 0 towards 1.
fn spring(stiffness: f32, damping: f32, progress: f32) -> f32 {
    if progress <= 0.0 {
        return 0.0;
    }
    if progress >= 1.0 {
        return 1.0;
    }

    let (omega, zeta) = spring_params(stiffness, damping);
    let tau = progress * spring_settle_secs(omega, zeta);

    if (zeta - 1.0).abs() < 1e-3 {
        1.0 - (-omega * tau).exp() * (1.0 + omega * tau)
    } else if zeta < 1.0 {
        let omega_d = omega * (1.0 - zeta * zeta).sqrt();
        let envelope = (-zeta * omega * tau).exp();
        1.0 - envelope * ((omega_d * tau).cos() + (zeta * omega / omega_d) * (omega_d * tau).sin())
    } else {
        let root = (zeta * zeta - 1.0).sqrt();
        let r1 = -omega * (zeta - root);
        let r2 = -omega * (zeta + root);
        1.0 - (r2 * (r1 * tau).exp() - r1 * (r2 * tau).exp()) / (r2 - r1)
    }
}
