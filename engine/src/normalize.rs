//! NACO-style normalization of identity labels.
//!
//! Every character class the algorithm touches is listed in the tables at
//! the top of this module; [`NacoTable::standard`] compiles them into a
//! single lookup map once and [`NacoTable::normalize`] applies it:
//!
//! 1. uppercase;
//! 2. decompose canonically (NFD, before and after uppercasing), so
//!    accented letters become a base letter followed by combining marks;
//! 3. substitute ligatures, special letters and sub/superscript digits;
//! 4. delete combining diacritics, apostrophes and brackets;
//! 5. map punctuation and symbols to a space;
//! 6. keep the first comma only, later commas become spaces;
//! 7. collapse whitespace runs and trim.
//!
//! Letters, digits, `#`, `&`, `+`, `@` and the first comma survive.

use std::collections::HashMap;

use unicode_normalization::UnicodeNormalization;

/// Ligatures, special letters and sub/superscript characters. Letters
/// with a canonical decomposition are not listed; decomposition reaches
/// their base letter.
const SUBSTITUTIONS: &[(char, &str)] = &[
    ('Æ', "AE"),
    ('Œ', "OE"),
    ('Ĳ', "IJ"),
    ('Ø', "O"),
    ('Đ', "D"),
    ('Ð', "D"),
    ('Þ', "TH"),
    ('Ł', "L"),
    ('Ħ', "H"),
    ('⁰', "0"),
    ('¹', "1"),
    ('²', "2"),
    ('³', "3"),
    ('⁴', "4"),
    ('⁵', "5"),
    ('⁶', "6"),
    ('⁷', "7"),
    ('⁸', "8"),
    ('⁹', "9"),
    ('₀', "0"),
    ('₁', "1"),
    ('₂', "2"),
    ('₃', "3"),
    ('₄', "4"),
    ('₅', "5"),
    ('₆', "6"),
    ('₇', "7"),
    ('₈', "8"),
    ('₉', "9"),
    ('⁺', "+"),
    ('₊', "+"),
];

/// Combining diacritic ranges deleted outright.
const COMBINING_RANGES: &[(char, char)] = &[
    ('\u{0300}', '\u{036F}'),
    ('\u{1AB0}', '\u{1AFF}'),
    ('\u{1DC0}', '\u{1DFF}'),
    ('\u{20D0}', '\u{20FF}'),
    ('\u{FE20}', '\u{FE2F}'),
];

/// Marks deleted outright: apostrophes, alif/ayn, brackets.
const DELETED: &[char] = &[
    '\'', '\u{2018}', '\u{2019}', '\u{02BB}', '\u{02BC}', '\u{02BE}', '\u{02BF}', '[', ']',
];

/// Punctuation and symbols that become a single space.
const TO_SPACE: &[char] = &[
    '!', '"', '$', '%', '(', ')', '*', '-', '.', '/', ':', ';', '<', '=', '>', '?', '\\', '^',
    '_', '`', '{', '|', '}', '~', '¡', '¦', '§', '¨', '©', '«', '®', '°', '±', '´', '¶', '·',
    '¸', '»', '¿', '×', '÷', '℗', '‐', '‑', '‒', '–', '—', '―', '‚', '“', '”', '„', '•', '…',
    '⁻', '₋', '⁽', '⁾', '₍', '₎',
];

/// Delimiters that start a subject subdivision in an access point.
pub const DEFAULT_SUBDIVISION_DELIMITERS: &[&str] = &["--", "—"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Delete,
    Space,
    Replace(&'static str),
}

/// Compiled NACO character tables.
#[derive(Debug, Clone)]
pub struct NacoTable {
    actions: HashMap<char, Action>,
    combining: &'static [(char, char)],
}

impl NacoTable {
    /// Compiles the standard NACO tables.
    #[must_use]
    pub fn standard() -> Self {
        let mut actions = HashMap::new();
        for (c, replacement) in SUBSTITUTIONS {
            actions.insert(*c, Action::Replace(*replacement));
        }
        for c in DELETED {
            actions.insert(*c, Action::Delete);
        }
        for c in TO_SPACE {
            actions.insert(*c, Action::Space);
        }
        Self {
            actions,
            combining: COMBINING_RANGES,
        }
    }

    fn action(&self, c: char) -> Option<Action> {
        if let Some(action) = self.actions.get(&c) {
            return Some(*action);
        }
        self.combining
            .iter()
            .any(|(lo, hi)| (*lo..=*hi).contains(&c))
            .then_some(Action::Delete)
    }

    /// Normalizes a label. The result is idempotent under this function and
    /// may be empty when the input held only punctuation.
    #[must_use]
    pub fn normalize(&self, input: &str) -> String {
        let mut mapped = String::with_capacity(input.len());
        let upper: String = input.nfd().flat_map(char::to_uppercase).collect();
        for c in upper.nfd() {
            match self.action(c) {
                Some(Action::Delete) => {}
                Some(Action::Space) => mapped.push(' '),
                Some(Action::Replace(s)) => mapped.push_str(s),
                None => mapped.push(c),
            }
        }

        let mut out = String::with_capacity(mapped.len());
        let mut seen_comma = false;
        let mut pending_space = false;
        for c in mapped.nfd() {
            let c = match c {
                ',' if seen_comma => ' ',
                ',' => {
                    seen_comma = true;
                    ','
                }
                other => other,
            };
            if c.is_whitespace() {
                pending_space = !out.is_empty();
                continue;
            }
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(c);
        }
        out
    }
}

impl Default for NacoTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Returns the part of `label` before the first subdivision delimiter.
#[must_use]
pub fn truncate_subdivision<'a, S: AsRef<str>>(label: &'a str, delimiters: &[S]) -> &'a str {
    delimiters
        .iter()
        .filter_map(|d| {
            let d = d.as_ref();
            if d.is_empty() {
                None
            } else {
                label.find(d)
            }
        })
        .min()
        .map_or(label, |pos| &label[..pos])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use unicode_normalization::UnicodeNormalization;

    fn naco(s: &str) -> String {
        NacoTable::standard().normalize(s)
    }

    #[test]
    fn person_label_keeps_first_comma_only() {
        assert_eq!(naco("Twain, Mark, 1835-1910."), "TWAIN, MARK 1835 1910");
    }

    #[test]
    fn apostrophes_and_brackets_are_deleted() {
        assert_eq!(naco("O'Brien, [Flann]"), "OBRIEN, FLANN");
    }

    #[test]
    fn diacritics_fold_precomposed_and_combining() {
        assert_eq!(naco("Dvořák, Antonín"), "DVORAK, ANTONIN");
        assert_eq!(naco("Dvor\u{030C}a\u{0301}k"), "DVORAK");
    }

    #[test]
    fn precomposed_and_decomposed_letters_agree() {
        assert_eq!(naco("Ṡmith"), "SMITH");
        assert_eq!(naco("S\u{0307}mith"), "SMITH");
        assert_eq!(naco("Ḟḱṗẋ"), "FKPX");
        assert_eq!(naco("F\u{0307}K\u{0301}"), "FK");
    }

    #[test]
    fn decomposable_ligatures_and_dotless_i_fold() {
        assert_eq!(naco("Ǽ"), "AE");
        assert_eq!(naco("Ǿrsted"), "ORSTED");
        assert_eq!(naco("Işık"), "ISIK");
    }

    #[test]
    fn ligatures_and_special_letters_expand() {
        assert_eq!(naco("Æsop"), "AESOP");
        assert_eq!(naco("Œuvres"), "OEUVRES");
        assert_eq!(naco("Łódź"), "LODZ");
        assert_eq!(naco("Þórr"), "THORR");
        assert_eq!(naco("Straße"), "STRASSE");
    }

    #[test]
    fn sub_and_superscript_digits_become_digits() {
        assert_eq!(naco("H₂O"), "H2O");
        assert_eq!(naco("x²"), "X2");
    }

    #[test]
    fn retained_symbols_survive() {
        assert_eq!(naco("AT&T #1 C++ @home"), "AT&T #1 C++ @HOME");
    }

    #[test]
    fn punctuation_only_is_empty() {
        assert_eq!(naco(" -- ... ; "), "");
    }

    #[test]
    fn whitespace_is_collapsed_and_trimmed() {
        assert_eq!(naco("  a \t  b\n"), "A B");
    }

    #[test]
    fn truncation_uses_earliest_delimiter() {
        assert_eq!(
            truncate_subdivision("A, B--C—D", DEFAULT_SUBDIVISION_DELIMITERS),
            "A, B"
        );
        assert_eq!(
            truncate_subdivision("A, B—C--D", DEFAULT_SUBDIVISION_DELIMITERS),
            "A, B"
        );
        assert_eq!(
            truncate_subdivision("No subdivision", DEFAULT_SUBDIVISION_DELIMITERS),
            "No subdivision"
        );
    }

    proptest! {
        #[test]
        fn prop_normalize_idempotent(s in "\\PC{0,40}") {
            let once = naco(&s);
            prop_assert_eq!(naco(&once), once);
        }

        #[test]
        fn prop_canonically_equivalent_labels_agree(s in "\\PC{0,40}") {
            let decomposed: String = s.nfd().collect();
            prop_assert_eq!(naco(&s), naco(&decomposed));
        }

        #[test]
        fn prop_at_most_one_comma(s in "[a-z, .-]{0,40}") {
            prop_assert!(naco(&s).matches(',').count() <= 1);
        }
    }
}
