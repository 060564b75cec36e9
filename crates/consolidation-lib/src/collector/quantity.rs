//! Kubernetes resource quantity parsing
//!
//! `k8s-openapi` carries quantities as their wire strings ("250m", "8Gi",
//! "1.5", "1e3"). Utilization needs them as integers, so they are converted
//! to milli-units with exact integer arithmetic.

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

/// Split a suffix into (binary multiplier, decimal exponent)
fn suffix_scale(suffix: &str) -> Option<(u128, i32)> {
    const KI: u128 = 1024;

    let scale = match suffix {
        "" => (1, 0),
        "n" => (1, -9),
        "u" => (1, -6),
        "m" => (1, -3),
        "k" => (1, 3),
        "M" => (1, 6),
        "G" => (1, 9),
        "T" => (1, 12),
        "P" => (1, 15),
        "E" => (1, 18),
        "Ki" => (KI, 0),
        "Mi" => (KI.pow(2), 0),
        "Gi" => (KI.pow(3), 0),
        "Ti" => (KI.pow(4), 0),
        "Pi" => (KI.pow(5), 0),
        "Ei" => (KI.pow(6), 0),
        _ => {
            // Decimal exponent form: 1e3, 5E-2
            let exp = suffix.strip_prefix(['e', 'E'])?;
            (1, exp.parse::<i32>().ok()?)
        }
    };

    Some(scale)
}

/// Parse a quantity string into milli-units.
///
/// Fractions of a milli-unit round up, as `MilliValue` does upstream.
/// Negative or malformed quantities return `None`.
pub fn parse_milli(quantity: &str) -> Option<u128> {
    let s = quantity.trim();
    let s = s.strip_prefix('+').unwrap_or(s);

    let split = s
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(s.len());
    let (number, suffix) = s.split_at(split);

    let (int_part, frac_part) = number.split_once('.').unwrap_or((number, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if frac_part.contains('.') {
        return None;
    }

    let digits = format!("{}{}", int_part, frac_part);
    let mantissa: u128 = digits.parse().ok()?;

    let (binary, exp) = suffix_scale(suffix)?;
    let exp10 = exp.checked_add(3)?.checked_sub(i32::try_from(frac_part.len()).ok()?)?;

    let value = mantissa.checked_mul(binary)?;
    if exp10 >= 0 {
        value.checked_mul(10u128.checked_pow(exp10.unsigned_abs())?)
    } else {
        let divisor = 10u128.checked_pow(exp10.unsigned_abs())?;
        Some(value.div_ceil(divisor))
    }
}

/// Milli-units of an optional quantity; absent or malformed counts as zero
pub fn milli_value(quantity: Option<&Quantity>) -> u128 {
    quantity.and_then(|q| parse_milli(&q.0)).unwrap_or(0)
}
