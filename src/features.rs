//! Feature-flag evaluation: a pure name-to-bool lookup against
//! externally-managed configuration (environment variables here).
//!
//! A flag named `BettingEnabled` is overridden by `FEATURE_BETTING_ENABLED`;
//! absent the override, the registry default applies. Unknown flag names
//! evaluate to disabled.

use std::env;

/// Known flags and their defaults.
pub const FLAGS: &[(&str, bool)] = &[
    ("BettingEnabled", true),
    ("LeaderboardEnabled", true),
    ("RealTimeBetting", false),
    ("SocialSharing", false),
    ("BetRecommendations", false),
];

fn env_key(name: &str) -> String {
    let mut key = String::from("FEATURE");
    for ch in name.chars() {
        if ch.is_uppercase() {
            key.push('_');
        }
        key.push(ch.to_ascii_uppercase());
    }
    key
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim() {
        "1" => Some(true),
        "0" => Some(false),
        other => match other.to_ascii_lowercase().as_str() {
            "true" | "on" | "yes" => Some(true),
            "false" | "off" | "no" => Some(false),
            _ => None,
        },
    }
}

/// Evaluate a single flag by name.
pub fn is_enabled(name: &str) -> bool {
    let default = match FLAGS.iter().find(|(n, _)| *n == name) {
        Some((_, d)) => *d,
        None => return false,
    };
    env::var(env_key(name))
        .ok()
        .and_then(|v| parse_flag(&v))
        .unwrap_or(default)
}

/// Evaluate every registered flag.
pub fn all() -> Vec<(&'static str, bool)> {
    FLAGS.iter().map(|(n, _)| (*n, is_enabled(n))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_key_screams() {
        assert_eq!(env_key("BettingEnabled"), "FEATURE_BETTING_ENABLED");
        assert_eq!(env_key("RealTimeBetting"), "FEATURE_REAL_TIME_BETTING");
    }

    #[test]
    fn unknown_flag_is_disabled() {
        assert!(!is_enabled("NoSuchFlag"));
    }

    #[test]
    fn parse_accepts_common_spellings() {
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("True"), Some(true));
        assert_eq!(parse_flag("maybe"), None);
    }
}
