//! Version string normalization and comparison.
//!
//! Release tags carry an optional `v` prefix (`v1.2.0`) and locally built
//! binaries carry a git-describe suffix (`1.2.0-3-gabc1234-dirty`). Neither
//! should affect the "already up to date" decision, so comparison happens on
//! the normalized prefix only. This is deliberately exact string equality,
//! not semver ordering: the upgrade command always moves to whatever the
//! release endpoint reports as latest, it never reasons about "newer".

/// Strip a leading `v` and truncate at the first `-`.
///
/// Empty input normalizes to the empty string.
///
/// # Examples
///
/// ```
/// use loft_cli::upgrade::version::normalize;
///
/// assert_eq!(normalize("v1.2.0"), "1.2.0");
/// assert_eq!(normalize("1.2.0-3-gabc1234-dirty"), "1.2.0");
/// ```
#[must_use]
pub fn normalize(raw: &str) -> &str {
    let stripped = raw.strip_prefix('v').unwrap_or(raw);
    match stripped.find('-') {
        Some(idx) => &stripped[..idx],
        None => stripped,
    }
}

/// Compare two version strings by their normalized forms.
#[must_use]
pub fn equal(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}
