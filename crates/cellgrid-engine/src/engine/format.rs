//! Number formatting and lenient number parsing for cell text.

use regex::Regex;
use std::sync::OnceLock;

/// Format a number the way cell values display it.
///
/// Integral values print without a fraction, other values print with the
/// shortest representation that round-trips. Very large or very small
/// magnitudes switch to exponent notation (`1e+21`, `1e-7`).
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        // Covers -0.0 as well.
        return "0".to_string();
    }
    let abs = n.abs();
    if !(1e-6..1e21).contains(&abs) {
        let exp = format!("{:e}", n);
        return match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => format!("{}e+{}", mantissa, power),
            _ => exp,
        };
    }
    format!("{}", n)
}

fn float_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*([+-]?(?:Infinity|(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?))")
            .expect("float prefix regex must compile")
    })
}

/// Parse the leading number of `text`, ignoring trailing garbage.
///
/// `"12px"` is 12, `"  3.5"` is 3.5, `"abc"` and `""` are `None`.
pub fn parse_float(text: &str) -> Option<f64> {
    let caps = float_prefix_re().captures(text)?;
    let number = &caps[1];
    let (sign, body) = match number.as_bytes()[0] {
        b'-' => (-1.0, &number[1..]),
        b'+' => (1.0, &number[1..]),
        _ => (1.0, number),
    };
    if body == "Infinity" {
        return Some(sign * f64::INFINITY);
    }
    body.parse::<f64>().ok().map(|n| sign * n)
}

/// [`parse_float`] with unparseable text mapped to NaN.
pub fn parse_float_or_nan(text: &str) -> f64 {
    parse_float(text).unwrap_or(f64::NAN)
}
