#![forbid(unsafe_code)]

//! Simulated viewport and a small media-feature matcher.
//!
//! Understands the subset of media syntax the default breakpoint table uses:
//! `(min-width: Npx)`, `(max-width: Npx)`, `(min-height: Npx)`,
//! `(max-height: Npx)` and `(orientation: portrait|landscape)`, joined with
//! `and`. Anything else is reported as unsupported.

use std::fmt;

/// Viewport size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1024, 768)
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl Viewport {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Taller than wide (square counts as portrait, as in CSS).
    #[must_use]
    pub const fn is_portrait(self) -> bool {
        self.height >= self.width
    }

    /// Same viewport turned by 90 degrees.
    #[must_use]
    pub const fn rotated(self) -> Self {
        Self::new(self.height, self.width)
    }

    /// Evaluate `condition` against this viewport.
    pub fn matches(self, condition: &str) -> Result<bool, String> {
        let mut any = false;
        for clause in condition.split(" and ") {
            any = true;
            if !self.matches_feature(clause.trim())? {
                return Ok(false);
            }
        }
        if any { Ok(true) } else { Err("empty condition".into()) }
    }

    fn matches_feature(self, clause: &str) -> Result<bool, String> {
        let inner = clause
            .strip_prefix('(')
            .and_then(|c| c.strip_suffix(')'))
            .ok_or_else(|| format!("expected `(feature: value)`, got `{clause}`"))?;
        let (feature, value) = inner
            .split_once(':')
            .ok_or_else(|| format!("missing `:` in `{clause}`"))?;
        let value = value.trim();

        match feature.trim() {
            "orientation" => match value {
                "portrait" => Ok(self.is_portrait()),
                "landscape" => Ok(!self.is_portrait()),
                other => Err(format!("unknown orientation `{other}`")),
            },
            "min-width" => px(value).map(|v| f64::from(self.width) >= v),
            "max-width" => px(value).map(|v| f64::from(self.width) <= v),
            "min-height" => px(value).map(|v| f64::from(self.height) >= v),
            "max-height" => px(value).map(|v| f64::from(self.height) <= v),
            other => Err(format!("unsupported media feature `{other}`")),
        }
    }
}

fn px(value: &str) -> Result<f64, String> {
    value
        .strip_suffix("px")
        .and_then(|n| n.trim().parse::<f64>().ok())
        .ok_or_else(|| format!("expected a pixel length, got `{value}`"))
}
