//! Coercion of ragged source text into typed values.
//!
//! The source tables encode missing values as `\N`, booleans as `"1"`/`"0"`
//! and lists as comma-joined text. This module is the only place those
//! encodings are interpreted; everything downstream sees `Option`s and `Vec`s.
//! None of these functions fail: malformed input becomes absence.

pub const NULL_SENTINEL: &str = "\\N";

fn present(raw: Option<&str>) -> Option<&str> {
    let raw = raw?.trim();
    if raw.is_empty() || raw == NULL_SENTINEL { None } else { Some(raw) }
}

pub fn parse_optional_text(raw: Option<&str>) -> Option<String> {
    present(raw).map(str::to_string)
}

pub fn parse_optional_int(raw: Option<&str>) -> Option<i64> {
    present(raw)?.parse().ok()
}

pub fn parse_optional_decimal(raw: Option<&str>) -> Option<f64> {
    present(raw)?.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_bool_flag(raw: Option<&str>) -> bool {
    present(raw) == Some("1")
}

/// Splits a comma-joined list (person ids, genres). Blank pieces and the
/// sentinel itself are dropped.
pub fn parse_id_list(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = present(raw) else {
        return Vec::new();
    };
    raw.split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty() && *piece != NULL_SENTINEL)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ints_degrade_to_absent() {
        assert_eq!(parse_optional_int(Some("1994")), Some(1994));
        assert_eq!(parse_optional_int(Some(" 142 ")), Some(142));
        assert_eq!(parse_optional_int(Some("\\N")), None);
        assert_eq!(parse_optional_int(Some("")), None);
        assert_eq!(parse_optional_int(Some("12abc")), None);
        assert_eq!(parse_optional_int(Some("7.5")), None);
        assert_eq!(parse_optional_int(None), None);
    }

    #[test]
    fn decimals_degrade_to_absent() {
        assert_eq!(parse_optional_decimal(Some("7.3")), Some(7.3));
        assert_eq!(parse_optional_decimal(Some("10")), Some(10.0));
        assert_eq!(parse_optional_decimal(Some("\\N")), None);
        assert_eq!(parse_optional_decimal(Some("NaN")), None);
        assert_eq!(parse_optional_decimal(Some("inf")), None);
        assert_eq!(parse_optional_decimal(Some("seven")), None);
    }

    #[test]
    fn only_one_is_true() {
        assert!(parse_bool_flag(Some("1")));
        assert!(!parse_bool_flag(Some("0")));
        assert!(!parse_bool_flag(Some("true")));
        assert!(!parse_bool_flag(Some("\\N")));
        assert!(!parse_bool_flag(None));
    }

    #[test]
    fn lists_never_carry_the_sentinel() {
        assert_eq!(parse_id_list(Some("nm0000001,nm0000002")), vec!["nm0000001", "nm0000002"]);
        assert_eq!(parse_id_list(Some("Drama")), vec!["Drama"]);
        assert_eq!(parse_id_list(Some("Action, ,Sci-Fi,")), vec!["Action", "Sci-Fi"]);
        assert!(parse_id_list(Some("\\N")).is_empty());
        assert!(parse_id_list(Some("")).is_empty());
        assert!(parse_id_list(None).is_empty());
        assert_eq!(parse_id_list(Some("nm1,\\N")), vec!["nm1"]);
    }

    #[test]
    fn text_sentinel_is_absent() {
        assert_eq!(parse_optional_text(Some("Carmencita")), Some("Carmencita".into()));
        assert_eq!(parse_optional_text(Some("\\N")), None);
        assert_eq!(parse_optional_text(Some("   ")), None);
    }
}
