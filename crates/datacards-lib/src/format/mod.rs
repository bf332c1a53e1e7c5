//! Cell value formatting: d3-style number format specs and timestamp rendering.

pub mod date;
pub mod number;

pub use date::{format_temporal, DisplayZone, TemporalOutcome};
pub use number::{NumberFormat, NumberLocale};

/// Render a number the way `String(x)` does in a browser.
///
/// Integers print without a fractional part, magnitudes at or above 1e21 or
/// below 1e-6 switch to exponent form (`1e+21`, `1.5e-7`).
pub fn js_number_string(x: f64) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if x == 0.0 {
        return "0".to_string();
    }
    let abs = x.abs();
    if (1e-6..1e21).contains(&abs) {
        return format!("{}", x);
    }
    let s = format!("{:e}", x);
    match s.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
        _ => s,
    }
}
