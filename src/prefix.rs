//! IRC message prefix (source) parsing.
//!
//! The prefix is the optional `:nick[!user][@host]` segment identifying a
//! message's origin. Parsing never fails: a degenerate input still yields a
//! prefix, possibly with an empty nick.

use std::fmt;

/// A parsed message source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prefix {
    /// The raw prefix text (without the leading `:`).
    pub raw: String,
    /// Nickname or server name.
    pub nick: String,
    /// Ident/username, if present.
    pub user: Option<String>,
    /// Hostname, if present.
    pub host: Option<String>,
}

impl Prefix {
    /// Parse a raw prefix string.
    ///
    /// Splits on the first `!` into nick and the rest; the rest splits on
    /// the first `@` into user and host. Without a `!`, an `@` still
    /// separates nick from host (`nick@host` has no user part).
    pub fn parse(raw: &str) -> Prefix {
        let (nick, user, host) = match raw.find('!') {
            Some(bang) => {
                let nick = &raw[..bang];
                let rest = &raw[bang + 1..];
                match rest.find('@') {
                    Some(at) => (nick, Some(&rest[..at]), Some(&rest[at + 1..])),
                    None => (nick, None, Some(rest)),
                }
            }
            None => match raw.find('@') {
                Some(at) => (&raw[..at], None, Some(&raw[at + 1..])),
                None => (raw, None, None),
            },
        };

        Prefix {
            raw: raw.to_string(),
            nick: nick.to_string(),
            user: user.map(str::to_string),
            host: host.map(str::to_string),
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_prefix() {
        let p = Prefix::parse("nick!user@host");
        assert_eq!(p.nick, "nick");
        assert_eq!(p.user.as_deref(), Some("user"));
        assert_eq!(p.host.as_deref(), Some("host"));
    }

    #[test]
    fn test_nick_and_host() {
        let p = Prefix::parse("nick@host");
        assert_eq!(p.nick, "nick");
        assert_eq!(p.user, None);
        assert_eq!(p.host.as_deref(), Some("host"));
    }

    #[test]
    fn test_nick_only() {
        let p = Prefix::parse("nick");
        assert_eq!(p.nick, "nick");
        assert_eq!(p.user, None);
        assert_eq!(p.host, None);
    }

    #[test]
    fn test_server_name() {
        let p = Prefix::parse("irc.example.com");
        assert_eq!(p.nick, "irc.example.com");
        assert_eq!(p.user, None);
        assert_eq!(p.host, None);
    }

    #[test]
    fn test_bang_without_at() {
        // Remainder after `!` with no `@` is treated as the host
        let p = Prefix::parse("nick!rest");
        assert_eq!(p.nick, "nick");
        assert_eq!(p.user, None);
        assert_eq!(p.host.as_deref(), Some("rest"));
    }

    #[test]
    fn test_empty_prefix() {
        let p = Prefix::parse("");
        assert_eq!(p.nick, "");
        assert_eq!(p.user, None);
        assert_eq!(p.host, None);
    }

    #[test]
    fn test_display_preserves_raw() {
        let p = Prefix::parse("nick!user@host");
        assert_eq!(p.to_string(), "nick!user@host");
    }
}
