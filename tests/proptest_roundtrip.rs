//! Property-based tests for parsing and serialization.
//!
//! Uses proptest to generate random protocol components and verify that:
//! 1. Parsing never panics, on any input
//! 2. Tag-value escaping is lossless
//! 3. Constructed messages survive a serialize/reparse cycle

use proptest::prelude::*;
use slirc_client::message::tags::{escape_tag_value, unescape_tag_value};
use slirc_client::{Message, Prefix};

/// Valid IRC nickname: starts with a letter or special char, then
/// letters, digits, hyphens, or specials.
fn nickname_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z\\[\\]\\\\^_`{|}][a-zA-Z0-9\\-\\[\\]\\\\^_`{|}]{0,8}")
        .expect("valid regex")
}

fn username_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z][a-zA-Z0-9]{0,9}").expect("valid regex")
}

fn hostname_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z0-9]+(\\.[a-z0-9]+)*").expect("valid regex")
}

fn channel_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[#&][a-zA-Z0-9_\\-]{1,49}").expect("valid regex")
}

/// Trailing text: anything except NUL, CR, LF.
fn message_text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[^\r\n\0]{0,200}").expect("valid regex")
}

proptest! {
    #[test]
    fn parse_never_panics(input in "\\PC{0,512}") {
        let _ = input.parse::<Message>();
    }

    #[test]
    fn parse_never_panics_on_line_shaped_input(
        input in "[ -~]{0,256}"
    ) {
        let _ = input.parse::<Message>();
    }

    #[test]
    fn tag_escape_roundtrip(value in "\\PC{0,128}") {
        let mut escaped = String::new();
        escape_tag_value(&mut escaped, &value).unwrap();
        prop_assert_eq!(unescape_tag_value(&escaped), value);
    }

    #[test]
    fn escaped_tag_value_is_wire_safe(value in "\\PC{0,128}") {
        let mut escaped = String::new();
        escape_tag_value(&mut escaped, &value).unwrap();
        prop_assert!(!escaped.contains(' '));
        prop_assert!(!escaped.contains(';'));
        prop_assert!(!escaped.contains('\r'));
        prop_assert!(!escaped.contains('\n'));
    }

    #[test]
    fn privmsg_roundtrip(
        channel in channel_strategy(),
        text in message_text_strategy(),
    ) {
        let built = Message::build(
            "PRIVMSG",
            &[("target", channel.as_str()), ("text", text.as_str())],
        ).unwrap();
        let reparsed: Message = built.to_string().parse().unwrap();
        prop_assert_eq!(reparsed.param("target"), Some(channel.as_str()));
        prop_assert_eq!(reparsed.param("text"), Some(text.as_str()));
    }

    #[test]
    fn prefix_roundtrip(
        nick in nickname_strategy(),
        user in username_strategy(),
        host in hostname_strategy(),
    ) {
        let raw = format!("{nick}!{user}@{host}");
        let prefix = Prefix::parse(&raw);
        prop_assert_eq!(prefix.nick, nick);
        prop_assert_eq!(prefix.user, Some(user));
        prop_assert_eq!(prefix.host, Some(host));
        prop_assert_eq!(prefix.raw, raw);
    }

    #[test]
    fn parsed_message_reserializes_parseably(
        channel in channel_strategy(),
        text in message_text_strategy(),
        nick in nickname_strategy(),
    ) {
        let line = format!(":{nick} PRIVMSG {channel} :{text}");
        let message: Message = line.parse().unwrap();
        let reparsed: Message = message.to_string().parse().unwrap();
        prop_assert_eq!(message, reparsed);
    }
}
