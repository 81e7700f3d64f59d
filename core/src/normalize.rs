//! Small pure helpers shared by the format adapters

use crate::table::RawRow;

/// Whether a raw cell spells a missing value
pub fn is_null_token(value: &str, null_tokens: &[String]) -> bool {
    null_tokens.iter().any(|token| token == value)
}

/// Map the placeholder token to null, leaving every other value intact
pub fn sentinel_to_null<'a>(value: Option<&'a str>, sentinel: &str) -> Option<&'a str> {
    value.filter(|v| *v != sentinel)
}

/// First non-null value among candidate columns, in priority order
pub fn first_present<'a, F>(row: &'a RawRow, candidates: &[usize], normalize: F) -> Option<&'a str>
where
    F: Fn(Option<&'a str>) -> Option<&'a str>,
{
    candidates
        .iter()
        .find_map(|&index| normalize(row.get(index)))
}

/// All ASCII digits of `text`, concatenated in order of appearance
pub fn digits_of(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit()).collect()
}
