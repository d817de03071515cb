// SPDX-License-Identifier: MIT OR Apache-2.0

//! Schema-aware coercion of raw string values.
//!
//! Every source produces strings. A field's declared [`FieldType`] decides how its raw
//! value becomes a [`ConfigValue`], so `"1"` is `true` for a flag and `1` for a thread
//! count. Values that do not fit their class pass through unchanged as strings; the
//! validator is responsible for flagging them.

use crate::domain::config_value::ConfigValue;
use crate::domain::schema::{ConfigurationSchema, FieldType};

/// Coerces the raw value of `key` using the schema.
///
/// `key` may be either a dotted path (`devTools.hmr.port`) or the environment variable
/// that feeds it (`HMR_PORT`). Keys unknown to the schema fall back to [`sniff`].
///
/// # Examples
///
/// ```
/// use miaoda_config::domain::coercion::coerce;
/// use miaoda_config::domain::ConfigValue;
///
/// assert_eq!(coerce("DEBUG_MODE", "1"), ConfigValue::Bool(true));
/// assert_eq!(coerce("CPU_THREADS", "1"), ConfigValue::Integer(1));
/// assert_eq!(coerce("APP_NAME", ""), ConfigValue::Null);
/// ```
pub fn coerce(key: &str, raw: &str) -> ConfigValue {
    let field = ConfigurationSchema::field(key).or_else(|| ConfigurationSchema::field_for_env_var(key));
    match field {
        Some(field) => coerce_as(field.field_type, raw),
        None => sniff(raw),
    }
}

/// Coerces a raw value into the given type class.
pub fn coerce_as(field_type: FieldType, raw: &str) -> ConfigValue {
    if raw.is_empty() {
        return ConfigValue::Null;
    }

    match field_type {
        FieldType::Boolean => parse_bool(raw).map_or_else(|| raw.into(), ConfigValue::Bool),
        FieldType::Integer => {
            if is_signed_digits(raw) {
                parse_integer(raw)
            } else {
                raw.into()
            }
        }
        FieldType::Float => {
            if is_digits(raw) || is_decimal(raw) {
                parse_float(raw)
            } else {
                raw.into()
            }
        }
        FieldType::String | FieldType::Url | FieldType::Enum(_) => raw.into(),
    }
}

/// Infers a type from the value alone.
///
/// Checks run in a fixed order: boolean literal, unsigned integer, decimal, then
/// pass-through. Only used for keys the schema does not declare.
pub fn sniff(raw: &str) -> ConfigValue {
    if raw.is_empty() {
        return ConfigValue::Null;
    }
    if let Some(b) = parse_bool(raw) {
        return ConfigValue::Bool(b);
    }
    if is_digits(raw) {
        return parse_integer(raw);
    }
    if is_decimal(raw) {
        return parse_float(raw);
    }
    raw.into()
}

fn parse_bool(raw: &str) -> Option<bool> {
    if raw == "1" || raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw == "0" || raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_integer(raw: &str) -> ConfigValue {
    match raw.parse::<i64>() {
        Ok(n) => ConfigValue::Integer(n),
        Err(e) => {
            tracing::debug!("Keeping '{}' as a string: {}", raw, e);
            raw.into()
        }
    }
}

fn parse_float(raw: &str) -> ConfigValue {
    match raw.parse::<f64>() {
        Ok(f) => ConfigValue::Float(f),
        Err(e) => {
            tracing::debug!("Keeping '{}' as a string: {}", raw, e);
            raw.into()
        }
    }
}

/// `^\d+$`
fn is_digits(raw: &str) -> bool {
    !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit())
}

/// `^-?\d+$`
fn is_signed_digits(raw: &str) -> bool {
    is_digits(raw.strip_prefix('-').unwrap_or(raw))
}

/// `^\d+\.\d+$`
fn is_decimal(raw: &str) -> bool {
    match raw.split_once('.') {
        Some((whole, fraction)) => is_digits(whole) && is_digits(fraction),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_null_for_every_class() {
        for kind in [
            FieldType::String,
            FieldType::Boolean,
            FieldType::Integer,
            FieldType::Float,
            FieldType::Url,
            FieldType::Enum(&["a"]),
        ] {
            assert_eq!(coerce_as(kind, ""), ConfigValue::Null);
        }
        assert_eq!(sniff(""), ConfigValue::Null);
    }

    #[test]
    fn test_boolean_fields() {
        assert_eq!(coerce("DEBUG_MODE", "true"), ConfigValue::Bool(true));
        assert_eq!(coerce("DEBUG_MODE", "TRUE"), ConfigValue::Bool(true));
        assert_eq!(coerce("DEBUG_MODE", "1"), ConfigValue::Bool(true));
        assert_eq!(coerce("DEBUG_MODE", "0"), ConfigValue::Bool(false));
        assert_eq!(coerce("DEBUG_MODE", "False"), ConfigValue::Bool(false));
    }

    #[test]
    fn test_ambiguous_boolean_passes_through() {
        assert_eq!(coerce("DEBUG_MODE", "yes"), ConfigValue::from("yes"));
        assert_eq!(coerce("devTools.debug.enabled", "2"), ConfigValue::from("2"));
    }

    #[test]
    fn test_integer_fields() {
        assert_eq!(coerce("PORT", "42"), ConfigValue::Integer(42));
        assert_eq!(coerce("CPU_THREADS", "1"), ConfigValue::Integer(1));
        assert_eq!(coerce("CPU_THREADS", "0"), ConfigValue::Integer(0));
        assert_eq!(coerce("LLAMACPP_GPU_LAYERS", "-1"), ConfigValue::Integer(-1));
        assert_eq!(coerce("PORT", "abc"), ConfigValue::from("abc"));
        assert_eq!(coerce("PORT", "3.5"), ConfigValue::from("3.5"));
    }

    #[test]
    fn test_integer_overflow_keeps_string() {
        let huge = "99999999999999999999999";
        assert_eq!(coerce("CACHE_SIZE", huge), ConfigValue::from(huge));
    }

    #[test]
    fn test_float_fields() {
        assert_eq!(coerce("COVERAGE_THRESHOLD", "3.14"), ConfigValue::Float(3.14));
        assert_eq!(coerce("COVERAGE_THRESHOLD", "80"), ConfigValue::Float(80.0));
        assert_eq!(coerce("COVERAGE_THRESHOLD", ".5"), ConfigValue::from(".5"));
    }

    #[test]
    fn test_string_like_fields_pass_through() {
        assert_eq!(coerce("APP_VERSION", "1"), ConfigValue::from("1"));
        assert_eq!(coerce("LOG_LEVEL", "debug"), ConfigValue::from("debug"));
        assert_eq!(
            coerce("external.openai.apiBase", "https://api.openai.com/v1"),
            ConfigValue::from("https://api.openai.com/v1")
        );
    }

    #[test]
    fn test_sniff_order() {
        assert_eq!(sniff("1"), ConfigValue::Bool(true));
        assert_eq!(sniff("0"), ConfigValue::Bool(false));
        assert_eq!(sniff("42"), ConfigValue::Integer(42));
        assert_eq!(sniff("3.14"), ConfigValue::Float(3.14));
        assert_eq!(sniff("-1"), ConfigValue::from("-1"));
        assert_eq!(sniff("hello"), ConfigValue::from("hello"));
    }

    #[test]
    fn test_unknown_key_uses_sniffing() {
        assert_eq!(coerce("SOME_AMBIENT_FLAG", "1"), ConfigValue::Bool(true));
        assert_eq!(coerce("SOME_AMBIENT_COUNT", "17"), ConfigValue::Integer(17));
    }
}
