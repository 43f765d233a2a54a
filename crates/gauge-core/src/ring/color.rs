//! Ring tones and their colors.

use std::fmt;
use std::str::FromStr;

use palette::{FromColor, LinSrgba, Srgba};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Linear-space RGBA with premultiplied alpha.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LinearRgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl LinearRgba {
    /// CSS-like `rgba(r, g, b, a)`.
    #[inline]
    pub fn from_srgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        let s = Srgba::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a);
        let lin: LinSrgba = LinSrgba::from_color(s);
        Self {
            r: lin.red * lin.alpha,
            g: lin.green * lin.alpha,
            b: lin.blue * lin.alpha,
            a: lin.alpha,
        }
    }

    /// Back to unpremultiplied sRGB bytes.
    pub fn to_srgba_u8(&self) -> [u8; 4] {
        let (r, g, b) = if self.a > 0.0001 {
            (self.r / self.a, self.g / self.a, self.b / self.a)
        } else {
            (0.0, 0.0, 0.0)
        };
        let srgb: Srgba = Srgba::from_color(LinSrgba::new(r, g, b, self.a));
        [
            to_byte(srgb.red),
            to_byte(srgb.green),
            to_byte(srgb.blue),
            to_byte(srgb.alpha),
        ]
    }

    /// `#rrggbb`, alpha dropped.
    pub fn to_hex(&self) -> String {
        let [r, g, b, _] = self.to_srgba_u8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

fn to_byte(channel: f32) -> u8 {
    (channel * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Emerald 600.
pub const POSITIVE_SRGB: [u8; 3] = [0x05, 0x96, 0x69];
/// Blue 600.
pub const NEUTRAL_SRGB: [u8; 3] = [0x25, 0x63, 0xeb];
/// Red 600.
pub const NEGATIVE_SRGB: [u8; 3] = [0xdc, 0x26, 0x26];

/// Unfilled part of the ring: black at 12% opacity.
pub fn track_color() -> LinearRgba {
    LinearRgba::from_srgba(0, 0, 0, 0.12)
}

/// Score at or above which a ring reads as positive.
pub const POSITIVE_THRESHOLD: f64 = 70.0;
/// Score at or above which a ring reads as neutral rather than negative.
pub const NEUTRAL_THRESHOLD: f64 = 50.0;

/// Foreground tone of the filled arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RingTone {
    Positive,
    #[default]
    Neutral,
    Negative,
}

impl RingTone {
    /// Tone for a 0-100 score. NaN reads as negative.
    pub fn for_score(score: f64) -> Self {
        if score >= POSITIVE_THRESHOLD {
            Self::Positive
        } else if score >= NEUTRAL_THRESHOLD {
            Self::Neutral
        } else {
            Self::Negative
        }
    }

    pub fn for_verdict(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Genuine => Self::Positive,
            Verdict::Fake => Self::Negative,
            Verdict::Unknown => Self::Neutral,
        }
    }

    pub fn srgb(&self) -> [u8; 3] {
        match self {
            Self::Positive => POSITIVE_SRGB,
            Self::Neutral => NEUTRAL_SRGB,
            Self::Negative => NEGATIVE_SRGB,
        }
    }

    pub fn color(&self) -> LinearRgba {
        let [r, g, b] = self.srgb();
        LinearRgba::from_srgba(r, g, b, 1.0)
    }
}

/// Classification attached to an analysed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Genuine,
    Fake,
    #[default]
    Unknown,
}

impl Verdict {
    /// Verdict for a validity fraction in `[0, 1]`.
    pub fn from_validity(fraction: f64) -> Self {
        if fraction >= 0.75 {
            Self::Genuine
        } else if fraction < 0.35 {
            Self::Fake
        } else {
            Self::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Genuine => "genuine",
            Self::Fake => "fake",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown verdict: {0}")]
pub struct UnknownVerdict(pub String);

impl FromStr for Verdict {
    type Err = UnknownVerdict;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "genuine" | "real" => Ok(Self::Genuine),
            "fake" => Ok(Self::Fake),
            "unknown" | "" => Ok(Self::Unknown),
            _ => Err(UnknownVerdict(s.to_string())),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caption band for a 0-100 trust score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustBand {
    VeryLikelyGenuine,
    Trustworthy,
    Mixed,
    Suspicious,
    HighRisk,
}

impl TrustBand {
    pub fn for_score(score: f64) -> Self {
        if score >= 85.0 {
            Self::VeryLikelyGenuine
        } else if score >= 70.0 {
            Self::Trustworthy
        } else if score >= 50.0 {
            Self::Mixed
        } else if score >= 30.0 {
            Self::Suspicious
        } else {
            Self::HighRisk
        }
    }

    pub fn caption(&self) -> &'static str {
        match self {
            Self::VeryLikelyGenuine => "Very likely genuine",
            Self::Trustworthy => "Generally trustworthy",
            Self::Mixed => "Mixed signals - review",
            Self::Suspicious => "Potentially suspicious",
            Self::HighRisk => "High risk - likely fake",
        }
    }
}
