//! Scan-max-and-increment sequence helpers.

use tracing::warn;

/// Parses the numeric portion of an id.
///
/// Only non-empty runs of ASCII digits that fit in a `u64` are accepted;
/// leading zeros are allowed.
pub fn parse_sequence(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Returns `max + 1` over ids in scope, or 1 if none parse.
///
/// An id is in scope when it starts with `scope`; the remainder after the
/// scope is its sequence value. Unparsable remainders are skipped. A scope
/// already holding `u64::MAX` yields `u64::MAX` again, which collides.
pub fn next_in_scope<'a, I>(ids: I, scope: &str) -> u64
where
    I: IntoIterator<Item = &'a str>,
{
    let Some(max) = ids
        .into_iter()
        .filter_map(|id| id.strip_prefix(scope))
        .filter_map(parse_sequence)
        .max()
    else {
        return 1;
    };
    max.checked_add(1).unwrap_or_else(|| {
        warn!(scope, "Sequence exhausted");
        max
    })
}

/// Formats `seq` left-padded with zeros to `width` digits.
pub fn zero_pad(seq: u64, width: usize) -> String {
    format!("{seq:0width$}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("42", Some(42))]
    #[case("000042", Some(42))]
    #[case("0", Some(0))]
    #[case("", None)]
    #[case("12abc", None)]
    #[case("-3", None)]
    #[case("+3", None)]
    #[case(" 3", None)]
    #[case("99999999999999999999999", None)]
    fn test_parse_sequence(#[case] input: &str, #[case] expected: Option<u64>) {
        assert_eq!(parse_sequence(input), expected);
    }

    #[test]
    fn test_next_in_scope_at_u64_max_does_not_wrap() {
        let max = format!("s{}", u64::MAX);
        assert_eq!(next_in_scope([max.as_str()], "s"), u64::MAX);
    }

    #[test]
    fn test_next_in_scope_ignores_other_scopes() {
        let ids = ["a_7", "a_x", "b_99", "a_003"];
        assert_eq!(next_in_scope(ids, "a_"), 8);
        assert_eq!(next_in_scope(ids, "b_"), 100);
        assert_eq!(next_in_scope(ids, "c_"), 1);
    }

    #[test]
    fn test_zero_pad() {
        assert_eq!(zero_pad(43, 6), "000043");
        assert_eq!(zero_pad(1234567, 3), "1234567");
        assert_eq!(zero_pad(1, 0), "1");
    }
}
