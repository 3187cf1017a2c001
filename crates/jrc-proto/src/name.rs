//! Nickname and channel-name validation.
//!
//! Nicknames are 1-10 ASCII alphanumerics. Channel names are a `#` followed
//! by 1-10 ASCII alphanumerics. `SERVER` and `NEWUSER` are reserved and may
//! never be held by a session.

use crate::{NICK_MAX_LEN, RESERVED_NICKS};

/// Extension trait for validating relay nicknames and channel names.
pub trait NameExt {
    /// Check if this string is a valid nickname (`[A-Za-z0-9]{1,10}`).
    ///
    /// Reserved names are syntactically valid; see [`is_reserved_nick`].
    ///
    /// # Examples
    ///
    /// ```
    /// use jrc_proto::NameExt;
    ///
    /// assert!("bluefox".is_valid_nick());
    /// assert!("Bot1".is_valid_nick());
    ///
    /// assert!(!"".is_valid_nick());
    /// assert!(!"#bluefox".is_valid_nick());
    /// assert!(!"over-ten-chars".is_valid_nick());
    /// ```
    fn is_valid_nick(&self) -> bool;

    /// Check if this string is a valid channel name (`#[A-Za-z0-9]{1,10}`).
    fn is_valid_channel(&self) -> bool;
}

impl NameExt for str {
    fn is_valid_nick(&self) -> bool {
        !self.is_empty()
            && self.len() <= NICK_MAX_LEN
            && self.bytes().all(|b| b.is_ascii_alphanumeric())
    }

    fn is_valid_channel(&self) -> bool {
        match self.strip_prefix('#') {
            Some(rest) => rest.is_valid_nick(),
            None => false,
        }
    }
}

impl NameExt for String {
    fn is_valid_nick(&self) -> bool {
        self.as_str().is_valid_nick()
    }

    fn is_valid_channel(&self) -> bool {
        self.as_str().is_valid_channel()
    }
}

/// Whether a nickname is reserved for the broker itself.
pub fn is_reserved_nick(nick: &str) -> bool {
    RESERVED_NICKS.contains(&nick)
}
