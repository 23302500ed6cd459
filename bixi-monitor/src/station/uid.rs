//! Short identifier tokens derived from station names.
//!
//! BIXI names most stations after the two streets of an intersection,
//! written `"<street> / <street>"`. Those become a `xxxx_yyyy` token; every
//! other name keeps its first eight alphanumeric characters.

use std::sync::LazyLock;

use regex::Regex;

/// Characters kept from each part of a two-part name.
const PART_LEN: usize = 4;

/// Characters kept from a name that is not two-part.
const FALLBACK_LEN: usize = 8;

/// `<part> <sep> <part>`, where the separator is three whitespace-or-slash
/// characters and parts are Latin letters, digits, `-`, `'`, `.` and spaces.
static TWO_PART: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([\p{Latin}0-9'. -]+)[\s/]{3}([\p{Latin}0-9'. -]+)")
        .expect("two-part station pattern is valid")
});

/// Resolve a station name to its short token.
///
/// Accented letters are dropped rather than transliterated, so the result
/// only ever contains `[a-z0-9_]`.
///
/// # Examples
///
/// ```
/// use bixi_monitor::station::resolve;
///
/// assert_eq!(resolve("Métro Laurier / De Brébeuf"), "mtro_debr");
/// assert_eq!(resolve("Parc Jarry"), "parcjarr");
/// ```
pub fn resolve(station_name: &str) -> String {
    if let Some(caps) = TWO_PART.captures(station_name) {
        let first = compact(&caps[1], PART_LEN);
        let second = compact(&caps[2], PART_LEN);
        return format!("{first}_{second}");
    }
    compact(station_name, FALLBACK_LEN)
}

/// Lowercase, strip everything outside `[a-z0-9]`, keep at most `len` chars.
fn compact(s: &str, len: usize) -> String {
    s.to_lowercase()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(len)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_part_names() {
        assert_eq!(resolve("Métro Laurier / De Brébeuf"), "mtro_debr");
        assert_eq!(resolve("Station A / Station B"), "stat_stat");
        assert_eq!(resolve("Berri / de Maisonneuve"), "berr_dema");
        assert_eq!(resolve("St-Denis / Ste-Catherine"), "stde_stec");
    }

    #[test]
    fn short_parts_are_not_padded() {
        assert_eq!(resolve("A / B"), "a_b");
        assert_eq!(resolve("Ave. du Parc / 4e"), "aved_4e");
    }

    #[test]
    fn fallback_keeps_eight_characters() {
        assert_eq!(resolve("Parc Jarry"), "parcjarr");
        assert_eq!(resolve("Gare Lucien-L'Allier"), "gareluci");
        assert_eq!(resolve("Quai"), "quai");
    }

    #[test]
    fn fallback_when_separator_is_not_three_characters() {
        // Only two separator characters.
        assert_eq!(resolve("Rachel/ Papineau"), "rachelpa");
        assert_eq!(resolve("Rachel-Papineau"), "rachelpa");
    }

    #[test]
    fn two_part_pattern_found_inside_longer_name() {
        assert_eq!(
            resolve("Métro Mont-Royal (Rivard / du Mont-Royal)"),
            "riva_dumo"
        );
    }

    #[test]
    fn non_latin_or_symbol_names_can_be_empty() {
        assert_eq!(resolve(""), "");
        assert_eq!(resolve("***"), "");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Names shaped like BIXI intersections.
    fn two_part_name() -> impl Strategy<Value = String> {
        ("[A-Za-zÉéèô0-9'.-][A-Za-zÉéèô0-9'. -]{0,20}", "[A-Za-zÉéèô0-9'.-][A-Za-zÉéèô0-9'. -]{0,20}")
            .prop_map(|(a, b)| format!("{a} / {b}"))
    }

    proptest! {
        #[test]
        fn two_part_token_at_most_nine(name in two_part_name()) {
            let token = resolve(&name);
            prop_assert!(token.len() <= 9);
            prop_assert!(token.contains('_'));
        }

        #[test]
        fn fallback_token_at_most_eight(name in r"[^/\s]{0,40}") {
            let token = resolve(&name);
            prop_assert!(token.len() <= 8);
        }

        #[test]
        fn deterministic(name in ".{0,40}") {
            prop_assert_eq!(resolve(&name), resolve(&name));
        }

        #[test]
        fn token_alphabet(name in ".{0,40}") {
            let token = resolve(&name);
            prop_assert!(token.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
        }
    }
}
