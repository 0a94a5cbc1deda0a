//! Channel name utilities.
//!
//! Only `#` channels exist. Names may carry any Unicode beyond the sigil
//! except control characters, space, `:`, `,` and DEL.

/// Maximum channel name length in bytes, sigil included.
pub const MAX_CHANNEL_LEN: usize = 64;

/// Extension trait for channel names and message targets.
pub trait ChannelExt {
    /// Check whether this string is a joinable channel name.
    ///
    /// ```
    /// use slirc_proto::ChannelExt;
    ///
    /// assert!("#ops".is_channel_name());
    /// assert!("#café".is_channel_name());
    /// assert!(!"&local".is_channel_name());
    /// assert!(!"#a,b".is_channel_name());
    /// ```
    fn is_channel_name(&self) -> bool;

    /// Check whether a PRIVMSG/NOTICE/MODE target addresses a channel
    /// rather than a nickname.
    fn is_channel_target(&self) -> bool;
}

impl ChannelExt for str {
    fn is_channel_name(&self) -> bool {
        if self.is_empty() || self.len() > MAX_CHANNEL_LEN {
            return false;
        }
        let Some(rest) = self.strip_prefix('#') else {
            return false;
        };
        rest.chars()
            .all(|c| c > ' ' && c != ':' && c != ',' && c != '\x7f')
    }

    fn is_channel_target(&self) -> bool {
        self.starts_with('#') || self.starts_with('$')
    }
}

impl ChannelExt for String {
    fn is_channel_name(&self) -> bool {
        self.as_str().is_channel_name()
    }

    fn is_channel_target(&self) -> bool {
        self.as_str().is_channel_target()
    }
}
