//! Per-computer session preferences.
//!
//! These are stored with each computer so the session launcher can restore
//! the user's choice of session type and desktop settings. The session
//! protocol itself lives elsewhere.

use serde::{Deserialize, Serialize};

/// Session type launched for a computer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    /// Full desktop control
    #[default]
    DesktopManage,
    /// View-only desktop
    DesktopView,
    /// File transfer
    FileTransfer,
}

impl SessionType {
    /// All session types in display order
    pub const ALL: [Self; 3] = [Self::DesktopManage, Self::DesktopView, Self::FileTransfer];

    /// Returns the identifier used on the command line and in JSON
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DesktopManage => "desktop_manage",
            Self::DesktopView => "desktop_view",
            Self::FileTransfer => "file_transfer",
        }
    }

    /// Returns true if this session shows a remote desktop
    #[must_use]
    pub const fn is_desktop(&self) -> bool {
        matches!(self, Self::DesktopManage | Self::DesktopView)
    }
}

impl std::fmt::Display for SessionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DesktopManage => write!(f, "Desktop Manage"),
            Self::DesktopView => write!(f, "Desktop View"),
            Self::FileTransfer => write!(f, "File Transfer"),
        }
    }
}

impl std::str::FromStr for SessionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "desktop_manage" | "manage" => Ok(Self::DesktopManage),
            "desktop_view" | "view" => Ok(Self::DesktopView),
            "file_transfer" | "files" => Ok(Self::FileTransfer),
            other => Err(format!("unknown session type: {other}")),
        }
    }
}

/// Video codec preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoEncoding {
    /// VP9 (default)
    #[default]
    Vp9,
    /// VP8
    Vp8,
    /// Lossless ZSTD with configurable colour depth
    Zstd,
}

/// Colour depth used with the ZSTD codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorDepth {
    /// True color (32 bit)
    #[default]
    Argb,
    /// High color (16 bit)
    Rgb565,
    /// 256 colors (8 bit)
    Rgb332,
    /// 64 colors (6 bit)
    Rgb222,
    /// 8 colors (3 bit)
    Rgb111,
}

impl ColorDepth {
    /// Bits per pixel on the wire
    #[must_use]
    pub const fn bits_per_pixel(&self) -> u8 {
        match self {
            Self::Argb => 32,
            Self::Rgb565 => 16,
            Self::Rgb332 | Self::Rgb222 | Self::Rgb111 => 8,
        }
    }
}

/// Optional desktop features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct DesktopFeatures {
    /// Lock the remote computer when the session ends
    #[serde(default)]
    pub lock_at_disconnect: bool,
    /// Block local input on the remote computer
    #[serde(default)]
    pub block_remote_input: bool,
    /// Transfer the remote cursor shape
    #[serde(default)]
    pub cursor_shape: bool,
    /// Synchronise the clipboard
    #[serde(default)]
    pub clipboard: bool,
    /// Disable desktop effects on the remote side
    #[serde(default)]
    pub disable_desktop_effects: bool,
    /// Disable the remote wallpaper
    #[serde(default)]
    pub disable_wallpaper: bool,
    /// Disable remote font smoothing
    #[serde(default)]
    pub disable_font_smoothing: bool,
}

/// Minimum ZSTD compression ratio
pub const MIN_COMPRESS_RATIO: u8 = 1;
/// Maximum ZSTD compression ratio
pub const MAX_COMPRESS_RATIO: u8 = 22;
/// Default ZSTD compression ratio
pub const DEFAULT_COMPRESS_RATIO: u8 = 8;

/// Desktop session preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesktopConfig {
    /// Video codec
    #[serde(default)]
    pub video_encoding: VideoEncoding,
    /// Colour depth (ZSTD only)
    #[serde(default)]
    pub color_depth: ColorDepth,
    /// Compression ratio (ZSTD only)
    #[serde(default = "default_compress_ratio")]
    pub compress_ratio: u8,
    /// Audio relay enabled
    #[serde(default)]
    pub audio: bool,
    /// Optional features
    #[serde(default)]
    pub features: DesktopFeatures,
}

const fn default_compress_ratio() -> u8 {
    DEFAULT_COMPRESS_RATIO
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            video_encoding: VideoEncoding::default(),
            color_depth: ColorDepth::default(),
            compress_ratio: DEFAULT_COMPRESS_RATIO,
            audio: false,
            features: DesktopFeatures {
                cursor_shape: true,
                clipboard: true,
                ..DesktopFeatures::default()
            },
        }
    }
}

impl DesktopConfig {
    /// Returns a copy with settings that do not apply to `session_type` or
    /// the selected codec reset
    ///
    /// Colour depth and compression ratio only apply to ZSTD. Cursor shape,
    /// clipboard, lock at disconnect and input blocking only apply to
    /// desktop management sessions.
    #[must_use]
    pub fn normalized(mut self, session_type: SessionType) -> Self {
        if self.video_encoding != VideoEncoding::Zstd {
            self.color_depth = ColorDepth::default();
            self.compress_ratio = DEFAULT_COMPRESS_RATIO;
        }
        self.compress_ratio = self
            .compress_ratio
            .clamp(MIN_COMPRESS_RATIO, MAX_COMPRESS_RATIO);

        if session_type != SessionType::DesktopManage {
            self.features.cursor_shape = false;
            self.features.clipboard = false;
            self.features.lock_at_disconnect = false;
            self.features.block_remote_input = false;
        }
        self
    }
}
