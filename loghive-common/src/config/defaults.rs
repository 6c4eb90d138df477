use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use crate::ColorPair;

pub(crate) const fn _default_true() -> bool {
    true
}

pub(crate) const fn _default_false() -> bool {
    false
}

pub(crate) fn _default_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8440))
}

pub(crate) const fn _default_entries_per_page() -> usize {
    20
}

#[inline]
pub(crate) fn _default_accent() -> String {
    "background-color: var(--accent-color);".to_owned()
}

pub(crate) const fn _default_max_tries() -> u32 {
    5
}

#[inline]
pub(crate) fn _default_lockout() -> Duration {
    Duration::from_secs(3600)
}

/// Severity classes used when the database has nothing better to offer.
pub(crate) fn _default_severities() -> HashMap<String, ColorPair> {
    let color = |fore: Option<&str>, back: Option<&str>| {
        ColorPair::new(fore.map(str::to_owned), back.map(str::to_owned))
    };
    HashMap::from([
        ("success".to_owned(), color(Some("#000000"), Some("#00ee55"))),
        ("warning".to_owned(), color(Some("#000000"), Some("#ffff00"))),
        ("attention".to_owned(), color(None, Some("#ff7700"))),
        ("error".to_owned(), color(None, Some("#ff2211"))),
        ("critical".to_owned(), color(None, Some("#aa0022"))),
    ])
}

pub(crate) fn _default_guard_cases() -> Vec<String> {
    vec!["--".to_owned(), "')".to_owned(), ");".to_owned()]
}

pub(crate) fn _default_guard_groups() -> Vec<Vec<String>> {
    vec![
        vec!["'".to_owned(), ")".to_owned()],
        vec![")".to_owned(), ";".to_owned()],
    ]
}

pub(crate) fn _default_guard_replaces() -> Vec<(String, String)> {
    vec![("'".to_owned(), "\u{b4}".to_owned())]
}
