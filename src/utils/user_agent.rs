//! Coarse device classification from the `User-Agent` header.

use regex::Regex;
use std::sync::LazyLock;

static MOBILE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Mobi").unwrap());

/// Returns `"Mobile"` when the user agent contains `Mobi`, else `"Desktop"`.
pub fn device_type(user_agent: &str) -> &'static str {
    if MOBILE_REGEX.is_match(user_agent) {
        "Mobile"
    } else {
        "Desktop"
    }
}
