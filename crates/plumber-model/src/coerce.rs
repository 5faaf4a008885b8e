//! String-to-value coercion.

use crate::value::ConfigValue;

/// Promote a raw string to the first type that accepts it.
///
/// The attempt order is fixed: integer, float, boolean literal, null
/// literal, and finally the string itself. The boolean and null recognizers
/// require an exact (case-insensitive) match on `true`/`false`/`none`;
/// anything longer or shorter falls through to the string case. Coercion
/// never fails.
pub fn coerce(raw: &str) -> ConfigValue {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return ConfigValue::Int(value);
    }
    if let Ok(value) = trimmed.parse::<f64>() {
        return ConfigValue::Float(value);
    }
    if let Some(value) = bool_literal(trimmed) {
        return ConfigValue::Bool(value);
    }
    if trimmed.eq_ignore_ascii_case("none") {
        return ConfigValue::Null;
    }
    ConfigValue::Str(trimmed.to_string())
}

fn bool_literal(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_win_over_floats() {
        assert_eq!(coerce("42"), ConfigValue::Int(42));
        assert_eq!(coerce("-7"), ConfigValue::Int(-7));
        assert_eq!(coerce(" 5 "), ConfigValue::Int(5));
    }

    #[test]
    fn floats_cover_scientific_notation() {
        assert_eq!(coerce("2.5"), ConfigValue::Float(2.5));
        assert_eq!(coerce("1e3"), ConfigValue::Float(1000.0));
        assert_eq!(coerce("-0.25"), ConfigValue::Float(-0.25));
    }

    #[test]
    fn booleans_match_exactly_but_ignore_case() {
        assert_eq!(coerce("true"), ConfigValue::Bool(true));
        assert_eq!(coerce("TRUE"), ConfigValue::Bool(true));
        assert_eq!(coerce("False"), ConfigValue::Bool(false));
        assert_eq!(coerce("truely"), ConfigValue::Str("truely".to_string()));
        assert_eq!(coerce("yes"), ConfigValue::Str("yes".to_string()));
    }

    #[test]
    fn null_literal_matches_exactly_but_ignores_case() {
        assert_eq!(coerce("none"), ConfigValue::Null);
        assert_eq!(coerce("NONE"), ConfigValue::Null);
        assert_eq!(coerce("none2"), ConfigValue::Str("none2".to_string()));
    }

    #[test]
    fn everything_else_passes_through() {
        assert_eq!(coerce("Amplero"), ConfigValue::Str("Amplero".to_string()));
        assert_eq!(coerce(""), ConfigValue::Str(String::new()));
        assert_eq!(
            coerce("data/{site}.json"),
            ConfigValue::Str("data/{site}.json".to_string())
        );
    }
}
