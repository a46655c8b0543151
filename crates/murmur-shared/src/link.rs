//! Personal relay links.
//!
//! A link embeds the identity of the person who will receive anonymous
//! messages. Redeeming it (the `/start <arg>` command) opens one compose
//! attempt towards that identity.

use crate::constants::LINK_HOST;
use crate::types::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayLink {
    pub target: UserId,
}

impl RelayLink {
    pub fn new(target: UserId) -> Self {
        Self { target }
    }

    /// Render the deep link for the given bot account.
    pub fn to_url(&self, bot_username: &str) -> String {
        format!("{LINK_HOST}/{bot_username}?start={}", self.target)
    }

    /// Parse the start argument carried by a redeemed link.
    ///
    /// Returns `None` for anything that is not a single identity.
    pub fn from_start_arg(arg: &str) -> Option<Self> {
        let arg = arg.trim();
        if arg.is_empty() || arg.contains(char::is_whitespace) {
            return None;
        }
        arg.parse::<UserId>().ok().map(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_renders_start_parameter() {
        let link = RelayLink::new(UserId(100));
        assert_eq!(link.to_url("murmur_bot"), "https://t.me/murmur_bot?start=100");
    }

    #[test]
    fn start_arg_roundtrip() {
        let link = RelayLink::from_start_arg("200").expect("should parse");
        assert_eq!(link.target, UserId(200));
    }

    #[test]
    fn malformed_start_arg_is_rejected() {
        assert!(RelayLink::from_start_arg("hello").is_none());
        assert!(RelayLink::from_start_arg("").is_none());
        assert!(RelayLink::from_start_arg("1 2").is_none());
    }
}
