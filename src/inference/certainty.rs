//! # Certainty Factors: MYCIN-style Evidence Combination
//!
//! A **certainty factor** (CF) is a belief score on the signed scale
//! `[-1.0, 1.0]`:
//!
//! | CF | Reading |
//! |----|---------|
//! | `1.0` | definitely true |
//! | `0.0` | no evidence either way |
//! | `-1.0` | definitely false |
//!
//! The application only ever produces non-negative CFs (symptom confidences
//! and rule confidences live in `[0, 1]`), but the combinator is defined on
//! the full signed scale so that any pair of inputs is well-defined.
//!
//! ## Combination Law
//!
//! When two independent pieces of evidence support the same conclusion with
//! CFs `a` and `b`:
//!
//! ```text
//! a ≥ 0, b ≥ 0   →  a + b·(1 − a)
//! a < 0, b < 0   →  a + b·(1 + a)
//! otherwise      →  (a + b) / (1 − min(|a|, |b|))
//! ```
//!
//! Properties relied upon by the engine:
//!
//! - **commutative**: `combine(a, b) == combine(b, a)`
//! - **identity**: `combine(a, 0.0) == a`
//! - **monotone** in both arguments when both are non-negative
//! - **bounded**: inputs in `[-1, 1]` give an output in `[-1, 1]`
//!
//! ## Degenerate Case
//!
//! With `a = 1` and `b = -1` (or the reverse) the mixed-sign branch divides by
//! zero: full certainty for and against at once. [`combine`] resolves this
//! to `0.0`, full contradiction cancelling out. This is never reported as an
//! error.
//!
//! ## Example
//!
//! ```text
//! let c = combine(0.855, 0.765);
//! assert!((c - 0.965925).abs() < 1e-9);
//! ```

/// Denominators at or below this are treated as the degenerate `±1 / ∓1` case.
const DEGENERATE_EPSILON: f64 = 1e-12;

/// Combines two certainty factors into one.
///
/// Inputs are clamped into `[-1.0, 1.0]` (`NaN` reads as `0.0`) and the output
/// is clamped too, so floating point noise can never leak outside the scale.
pub fn combine(a: f64, b: f64) -> f64 {
    let a = clamp_signed(a);
    let b = clamp_signed(b);

    let c = if a >= 0.0 && b >= 0.0 {
        a + b * (1.0 - a)
    } else if a < 0.0 && b < 0.0 {
        a + b * (1.0 + a)
    } else {
        let denominator = 1.0 - a.abs().min(b.abs());
        if denominator <= DEGENERATE_EPSILON {
            tracing::trace!(a, b, "degenerate CF combination resolved to 0.0");
            return 0.0;
        }
        (a + b) / denominator
    };

    clamp_signed(c)
}

/// Folds a sequence of CFs left to right, starting from "no evidence".
///
/// The engine folds rule contributions in catalog order; this helper follows
/// the same order so results are reproducible bit for bit.
pub fn combine_all<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    values.into_iter().reduce(combine)
}

/// Formats a CF in `[0, 1]` as a percentage with one decimal (`0.855` → `85.5%`).
pub fn percent(cf: f64) -> String {
    format!("{:.1}%", cf * 100.0)
}

fn clamp_signed(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-1.0, 1.0)
    }
}
