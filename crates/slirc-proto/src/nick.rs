//! Nickname validation.
//!
//! RFC 2812 section 2.3.1 nicknames, with a slightly longer maximum and no
//! hyphen or backtick.

/// Maximum nickname length in bytes.
pub const MAX_NICK_LEN: usize = 12;

/// Extension trait for checking nickname syntax.
pub trait NickExt {
    /// Check whether this string may be registered as a nickname.
    ///
    /// - 1 to [`MAX_NICK_LEN`] characters
    /// - every character is an ASCII letter or one of `[ \ ] ^ { | }`
    /// - after the first position, digits and `_` are also allowed
    ///
    /// ```
    /// use slirc_proto::NickExt;
    ///
    /// assert!("alice".is_valid_nick());
    /// assert!("[bot]^2".is_valid_nick());
    /// assert!(!"2fast".is_valid_nick());
    /// assert!(!"_lead".is_valid_nick());
    /// ```
    fn is_valid_nick(&self) -> bool;
}

#[inline]
fn is_nick_first(c: char) -> bool {
    c.is_ascii_alphabetic() || ('['..='^').contains(&c) || ('{'..='}').contains(&c)
}

#[inline]
fn is_nick_rest(c: char) -> bool {
    is_nick_first(c) || c.is_ascii_digit() || c == '_'
}

impl NickExt for str {
    fn is_valid_nick(&self) -> bool {
        if self.is_empty() || self.len() > MAX_NICK_LEN {
            return false;
        }
        let mut chars = self.chars();
        chars.next().is_some_and(is_nick_first) && chars.all(is_nick_rest)
    }
}

impl NickExt for String {
    fn is_valid_nick(&self) -> bool {
        self.as_str().is_valid_nick()
    }
}
