//! Field value validation
//!
//! Validation is a pure function of a descriptor and a value:
//! - alpha, node and object-list fields accept text only
//! - real and integer fields accept numbers and numeric text, coerced to
//!   the declared kind
//! - the autosize/autocalculate sentinels bypass bounds when the
//!   descriptor allows them
//! - bounds are checked in order: minimum, minimum>, maximum, maximum<
//! - choices are matched case-sensitively on text fields
//!
//! Missing values never reach the validator. Callers treat `None` as
//! "not checked, assumed missing".

use super::errors::Violation;
use super::types::{FieldDescriptor, FieldKind};
use super::value::{Value, AUTOCALCULATE, AUTOSIZE};

/// Characters that would break the record text format.
const FORBIDDEN_TEXT: [char; 3] = [',', ';', '!'];

/// Validates `value` against `desc`, returning the coerced value.
pub fn check_value(desc: &FieldDescriptor, value: Value) -> Result<Value, Violation> {
    if desc.kind.is_numeric() {
        if let Some(sentinel) = sentinel_of(&value) {
            return check_sentinel(desc, sentinel);
        }
    }

    match desc.kind {
        FieldKind::Alpha | FieldKind::Node | FieldKind::ObjectList => check_text(desc, value),
        FieldKind::Real => {
            let r = coerce_real(value)?;
            check_bounds(desc, r)?;
            Ok(Value::Real(r))
        }
        FieldKind::Integer => {
            let i = coerce_integer(value)?;
            check_bounds(desc, i as f64)?;
            Ok(Value::Integer(i))
        }
    }
}

/// Recognizes sentinel variants and their spellings in text.
fn sentinel_of(value: &Value) -> Option<Value> {
    match value {
        Value::Autosize => Some(Value::Autosize),
        Value::Autocalculate => Some(Value::Autocalculate),
        Value::Text(s) => {
            let s = s.trim();
            if s.eq_ignore_ascii_case(AUTOSIZE) {
                Some(Value::Autosize)
            } else if s.eq_ignore_ascii_case(AUTOCALCULATE) {
                Some(Value::Autocalculate)
            } else {
                None
            }
        }
        Value::Real(_) | Value::Integer(_) => None,
    }
}

fn check_sentinel(desc: &FieldDescriptor, sentinel: Value) -> Result<Value, Violation> {
    let allowed = match sentinel {
        Value::Autosize => desc.autosizable,
        _ => desc.autocalculatable,
    };

    if allowed {
        Ok(sentinel)
    } else {
        Err(Violation::SentinelNotAllowed {
            sentinel: if sentinel == Value::Autosize {
                AUTOSIZE
            } else {
                AUTOCALCULATE
            },
        })
    }
}

fn check_text(desc: &FieldDescriptor, value: Value) -> Result<Value, Violation> {
    let text = match value {
        Value::Text(s) => s,
        other => {
            return Err(Violation::TypeMismatch {
                expected: desc.kind,
                actual: other.type_name(),
            })
        }
    };

    if let Some(ch) = text.chars().find(|c| FORBIDDEN_TEXT.contains(c)) {
        return Err(Violation::ForbiddenCharacter { ch });
    }

    if !desc.choices.is_empty() && !desc.choices.iter().any(|c| *c == text) {
        return Err(Violation::NotAChoice {
            choices: desc.choices.clone(),
        });
    }

    Ok(Value::Text(text))
}

fn coerce_real(value: Value) -> Result<f64, Violation> {
    let r = match value {
        Value::Real(r) => r,
        Value::Integer(i) => i as f64,
        Value::Text(s) => s.trim().parse::<f64>().map_err(|_| Violation::TypeMismatch {
            expected: FieldKind::Real,
            actual: "text",
        })?,
        other => {
            return Err(Violation::TypeMismatch {
                expected: FieldKind::Real,
                actual: other.type_name(),
            })
        }
    };

    if !r.is_finite() {
        return Err(Violation::NotFinite);
    }
    Ok(r)
}

fn coerce_integer(value: Value) -> Result<i64, Violation> {
    let mismatch = |actual| Violation::TypeMismatch {
        expected: FieldKind::Integer,
        actual,
    };

    match value {
        Value::Integer(i) => Ok(i),
        Value::Real(r) => integral(r).ok_or_else(|| {
            if r.is_finite() {
                mismatch("real")
            } else {
                Violation::NotFinite
            }
        }),
        Value::Text(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                return Ok(i);
            }
            s.parse::<f64>()
                .ok()
                .and_then(integral)
                .ok_or_else(|| mismatch("text"))
        }
        other => Err(mismatch(other.type_name())),
    }
}

/// Converts a float with no fractional part that fits in i64.
fn integral(r: f64) -> Option<i64> {
    // 2^63 is exactly representable; anything at or above it overflows.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if r.is_finite() && r.fract() == 0.0 && r >= -LIMIT && r < LIMIT {
        Some(r as i64)
    } else {
        None
    }
}

fn check_bounds(desc: &FieldDescriptor, n: f64) -> Result<(), Violation> {
    if let Some(minimum) = desc.minimum {
        if n < minimum {
            return Err(Violation::BelowMinimum { minimum });
        }
    }
    if let Some(minimum) = desc.minimum_exclusive {
        if n <= minimum {
            return Err(Violation::NotAboveMinimum { minimum });
        }
    }
    if let Some(maximum) = desc.maximum {
        if n > maximum {
            return Err(Violation::AboveMaximum { maximum });
        }
    }
    if let Some(maximum) = desc.maximum_exclusive {
        if n >= maximum {
            return Err(Violation::NotBelowMaximum { maximum });
        }
    }
    Ok(())
}
