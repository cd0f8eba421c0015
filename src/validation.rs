//! Wire-safety and channel-name validation.
//!
//! At the line level, IRC rejects NUL, CR, and LF inside any parameter;
//! a middle (non-trailing) parameter additionally cannot contain a space
//! or start with `:` without corrupting the token stream. Channel names
//! are validated against the connection's configured channel-type
//! prefixes (the ISUPPORT `CHANTYPES` value).

/// Default channel-type prefixes, used when the server has not
/// advertised `CHANTYPES`.
pub const DEFAULT_CHANNEL_PREFIXES: &str = "#&";

/// Characters that are invalid anywhere inside a channel name.
const INVALID_CHAN_CHARS: &[char] = &[' ', ',', '\x07', '\x00', '\r', '\n'];

/// Check whether `name` is a valid channel name for the given
/// channel-type prefix set.
///
/// The first character must be one of `prefixes`; the rest must avoid
/// space, BELL, NUL, comma, CR, and LF.
///
/// # Examples
///
/// ```
/// use slirc_client::validation::is_channel_name;
///
/// assert!(is_channel_name("#rust", "#&"));
/// assert!(is_channel_name("&local", "#&"));
/// assert!(!is_channel_name("rust", "#&"));
/// assert!(!is_channel_name("&local", "#"));
/// ```
pub fn is_channel_name(name: &str, prefixes: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if prefixes.contains(first) => {}
        _ => return false,
    }
    !chars.as_str().contains(INVALID_CHAN_CHARS)
}

/// Check whether a value can appear inside any IRC parameter.
///
/// NUL, CR, and LF are never allowed; they would truncate or split the
/// line on the wire.
pub fn is_line_safe(value: &str) -> bool {
    !value.contains(['\0', '\r', '\n'])
}

/// Check whether a value can appear as a middle (non-trailing,
/// non-greedy) parameter token.
pub fn is_token_safe(value: &str) -> bool {
    is_line_safe(value) && !value.contains(' ') && !value.starts_with(':')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_prefix_match() {
        assert!(is_channel_name("#foo", "#&"));
        assert!(!is_channel_name("foo", "#&"));
        assert!(!is_channel_name("&bar", "#"));
    }

    #[test]
    fn test_channel_invalid_chars() {
        assert!(!is_channel_name("#with space", "#&"));
        assert!(!is_channel_name("#with,comma", "#&"));
        assert!(!is_channel_name("#with\x07bell", "#&"));
        assert!(!is_channel_name("#with\0nul", "#&"));
    }

    #[test]
    fn test_empty_channel() {
        assert!(!is_channel_name("", "#&"));
        // A lone prefix is still a (degenerate) channel name
        assert!(is_channel_name("#", "#&"));
    }

    #[test]
    fn test_line_safety() {
        assert!(is_line_safe("hello world"));
        assert!(!is_line_safe("evil\r\nQUIT"));
        assert!(!is_line_safe("nul\0byte"));
    }

    #[test]
    fn test_token_safety() {
        assert!(is_token_safe("#channel"));
        assert!(!is_token_safe("two words"));
        assert!(!is_token_safe(":leading-colon"));
        assert!(is_token_safe("has:inner:colon"));
    }
}
