//! Platform detection and release-asset selection.
//!
//! Published release archives follow the naming convention
//! `<product>_<OSName>_<ArchName>.<ext>` where the OS and architecture names
//! come from a fixed mapping table (`darwin` → `Darwin`, `amd64` → `x86_64`,
//! and so on) and the extension is `zip` on Windows and `tar.gz` everywhere
//! else. [`PlatformKey`] captures the running target once and derives the
//! expected asset and executable names from it; [`select_asset`] does a
//! first-match exact-name scan over a release's asset list.

use crate::upgrade::release::{Release, ReleaseAsset};

/// Supported operating systems for published releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    /// macOS, named `Darwin` in release assets
    Darwin,
    /// Linux, named `Linux` in release assets
    Linux,
    /// Windows, named `Windows` in release assets; assets are zip archives
    Windows,
}

impl Os {
    /// The OS name used in release asset filenames.
    #[must_use]
    pub const fn release_name(self) -> &'static str {
        match self {
            Self::Darwin => "Darwin",
            Self::Linux => "Linux",
            Self::Windows => "Windows",
        }
    }

    /// The archive extension published for this OS.
    #[must_use]
    pub const fn archive_ext(self) -> &'static str {
        match self {
            Self::Windows => "zip",
            Self::Darwin | Self::Linux => "tar.gz",
        }
    }

    /// The lowercase label used in user-facing messages (matches the
    /// conventional Go-style target names).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Darwin => "darwin",
            Self::Linux => "linux",
            Self::Windows => "windows",
        }
    }
}

/// Supported architectures for published releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    /// 64-bit x86, named `x86_64` in release assets
    Amd64,
    /// 64-bit ARM, named `arm64` in release assets
    Arm64,
    /// 32-bit x86, named `i386` in release assets
    X86,
}

impl Arch {
    /// The architecture name used in release asset filenames.
    #[must_use]
    pub const fn release_name(self) -> &'static str {
        match self {
            Self::Amd64 => "x86_64",
            Self::Arm64 => "arm64",
            Self::X86 => "i386",
        }
    }

    /// The lowercase label used in user-facing messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Amd64 => "amd64",
            Self::Arm64 => "arm64",
            Self::X86 => "386",
        }
    }
}

/// The OS/architecture pair of the running process.
///
/// Derived once from the compiled target and mapped deterministically to the
/// expected release asset and embedded executable names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformKey {
    /// Operating system of the running binary
    pub os: Os,
    /// Architecture of the running binary
    pub arch: Arch,
}

impl PlatformKey {
    /// Detect the platform of the running process from the compiled target.
    ///
    /// Returns `None` for targets with no published release mapping; the
    /// caller surfaces that as a "no compatible release" condition rather
    /// than a hard error.
    #[must_use]
    pub fn current() -> Option<Self> {
        let os = match std::env::consts::OS {
            "macos" => Os::Darwin,
            "linux" => Os::Linux,
            "windows" => Os::Windows,
            _ => return None,
        };
        let arch = match std::env::consts::ARCH {
            "x86_64" => Arch::Amd64,
            "aarch64" => Arch::Arm64,
            "x86" => Arch::X86,
            _ => return None,
        };
        Some(Self { os, arch })
    }

    /// The expected release asset filename for this platform.
    ///
    /// # Examples
    ///
    /// ```
    /// use loft_cli::upgrade::platform::{Arch, Os, PlatformKey};
    ///
    /// let key = PlatformKey { os: Os::Linux, arch: Arch::Amd64 };
    /// assert_eq!(key.asset_name("loft"), "loft_Linux_x86_64.tar.gz");
    /// ```
    #[must_use]
    pub fn asset_name(&self, product: &str) -> String {
        format!(
            "{product}_{}_{}.{}",
            self.os.release_name(),
            self.arch.release_name(),
            self.os.archive_ext()
        )
    }

    /// The base name of the executable embedded in this platform's archive.
    ///
    /// Windows archives carry `<product>.exe`; everything else is unsuffixed.
    #[must_use]
    pub fn executable_name(&self, product: &str) -> String {
        match self.os {
            Os::Windows => format!("{product}.exe"),
            Os::Darwin | Os::Linux => product.to_string(),
        }
    }
}

/// Locate the release asset matching the given platform.
///
/// Performs a linear scan for an exact filename match; the first match wins.
/// Returns `None` when no asset matches, which the caller reports as a
/// user-facing "no compatible release" condition, not a transport error.
#[must_use]
pub fn select_asset<'r>(
    release: &'r Release,
    platform: &PlatformKey,
    product: &str,
) -> Option<&'r ReleaseAsset> {
    let expected = platform.asset_name(product);
    release.assets.iter().find(|asset| asset.name == expected)
}
