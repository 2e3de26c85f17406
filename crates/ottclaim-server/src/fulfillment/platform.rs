//! Product name → OTT platform resolution.

/// Platform used when a product name matches nothing in [`PLATFORM_KEYWORDS`].
pub const DEFAULT_PLATFORM: &str = "OTTplay Power Package 01 Yr Subscription";

/// Keyword table, checked in order. Keywords are lowercase.
///
/// More specific keywords come before the ones they contain
/// (`"prime video"` before `"prime"`).
pub const PLATFORM_KEYWORDS: &[(&str, &str)] = &[
    ("netflix", "Netflix"),
    ("prime video", "Amazon Prime Video"),
    ("amazon prime", "Amazon Prime Video"),
    ("prime", "Amazon Prime Video"),
    ("disney", "Disney+ Hotstar"),
    ("hotstar", "Disney+ Hotstar"),
    ("jiocinema", "JioCinema Premium"),
    ("sonyliv", "SonyLIV"),
    ("sony liv", "SonyLIV"),
    ("zee5", "ZEE5"),
    ("sun nxt", "Sun NXT"),
    ("sunnxt", "Sun NXT"),
    ("youtube", "YouTube Premium"),
];

/// Resolve the platform a product's key should come from.
///
/// An exact (case-insensitive) match on a keyword or platform name wins,
/// then the first keyword contained in the product name, else
/// [`DEFAULT_PLATFORM`].
pub fn resolve_platform(product: &str) -> &'static str {
    let name = product.trim().to_lowercase();
    if name.is_empty() {
        return DEFAULT_PLATFORM;
    }

    if let Some(&(_, platform)) = PLATFORM_KEYWORDS
        .iter()
        .find(|(keyword, platform)| *keyword == name || platform.to_lowercase() == name)
    {
        return platform;
    }

    PLATFORM_KEYWORDS
        .iter()
        .find(|(keyword, _)| name.contains(keyword))
        .map_or(DEFAULT_PLATFORM, |&(_, platform)| platform)
}
