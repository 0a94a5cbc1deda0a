//! RFC 1459 case mapping.
//!
//! Nicknames and channel names are keys modulo this folding: ASCII letters
//! fold to lowercase and the Scandinavian punctuation pairs `[]\~` fold to
//! `{}|^`. Both registries in the daemon key their maps by [`irc_to_lower`].

/// Fold one character.
#[inline]
pub const fn irc_lower_char(c: char) -> char {
    match c {
        'A'..='Z' => c.to_ascii_lowercase(),
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        '~' => '^',
        _ => c,
    }
}

/// Fold a whole name into its registry key.
pub fn irc_to_lower(s: &str) -> String {
    s.chars().map(irc_lower_char).collect()
}

/// Compare two names under the folding without allocating.
pub fn irc_eq(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a
            .chars()
            .zip(b.chars())
            .all(|(x, y)| irc_lower_char(x) == irc_lower_char(y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_letters_and_brackets() {
        assert_eq!(irc_to_lower("Dan[Away]"), "dan{away}");
        assert_eq!(irc_to_lower("A\\B~C"), "a|b^c");
        assert_eq!(irc_to_lower("#Ops-2"), "#ops-2");
    }

    #[test]
    fn leaves_non_ascii_alone() {
        assert_eq!(irc_lower_char('Ä'), 'Ä');
        assert_eq!(irc_to_lower("#Ünï"), "#Ünï");
    }

    #[test]
    fn eq_is_case_insensitive() {
        assert!(irc_eq("Alice", "aLICE"));
        assert!(irc_eq("nick[1]", "NICK{1}"));
        assert!(!irc_eq("alice", "alicf"));
        assert!(!irc_eq("al", "alice"));
    }
}
