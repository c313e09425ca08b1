use std::fmt;

use driftboard_shared::Rgba;

use crate::engine::CaptureError;

pub const HUE_STEP: u16 = 5;
pub const GOLD: Rgba = Rgba::opaque(0xd4, 0xaf, 0x37);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feature {
    Rainbow,
    Gold,
}

impl Feature {
    pub const ALL: [Feature; 2] = [Feature::Rainbow, Feature::Gold];

    fn unlock_code(self) -> &'static str {
        match self {
            Feature::Rainbow => "prism",
            Feature::Gold => "midas",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feature::Rainbow => f.write_str("rainbow"),
            Feature::Gold => f.write_str("gold"),
        }
    }
}

/// Per-client unlock flags. Flags only ever go from locked to unlocked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Unlocks {
    rainbow: bool,
    gold: bool,
}

impl Unlocks {
    pub fn is_unlocked(&self, feature: Feature) -> bool {
        match feature {
            Feature::Rainbow => self.rainbow,
            Feature::Gold => self.gold,
        }
    }

    pub fn unlock(&mut self, feature: Feature) {
        match feature {
            Feature::Rainbow => self.rainbow = true,
            Feature::Gold => self.gold = true,
        }
    }

    /// Unlocks whichever feature `code` belongs to.
    pub fn redeem(&mut self, code: &str) -> Option<Feature> {
        let code = code.trim();
        let feature = Feature::ALL
            .into_iter()
            .find(|feature| feature.unlock_code().eq_ignore_ascii_case(code))?;
        self.unlock(feature);
        Some(feature)
    }
}

/// Cycles through the hue wheel, one step per resolved rainbow segment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HueCycle {
    hue: u16,
}

impl HueCycle {
    pub fn current(&self) -> u16 {
        self.hue
    }

    pub fn advance(&mut self) -> u16 {
        let hue = self.hue;
        self.hue = (self.hue + HUE_STEP) % 360;
        hue
    }
}

/// The brush color a user picked, before it is pinned to a concrete value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColorSpec {
    /// Normalized lowercase `#rrggbb`.
    Solid(String),
    Rainbow,
    Gold,
}

impl ColorSpec {
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("rainbow") {
            return Some(Self::Rainbow);
        }
        if value.eq_ignore_ascii_case("gold") {
            return Some(Self::Gold);
        }
        if !value.starts_with('#') {
            return None;
        }
        Rgba::parse(value).map(|rgba| Self::Solid(rgba.to_hex()))
    }

    pub fn required_feature(&self) -> Option<Feature> {
        match self {
            ColorSpec::Solid(_) => None,
            ColorSpec::Rainbow => Some(Feature::Rainbow),
            ColorSpec::Gold => Some(Feature::Gold),
        }
    }

    /// Pins the color for one segment. The hue counter only moves when a
    /// rainbow segment is actually produced.
    pub fn resolve(&self, unlocks: &Unlocks, hues: &mut HueCycle) -> Result<String, CaptureError> {
        if let Some(feature) = self.required_feature() {
            if !unlocks.is_unlocked(feature) {
                return Err(CaptureError::Locked(feature));
            }
        }
        Ok(match self {
            ColorSpec::Solid(hex) => hex.clone(),
            ColorSpec::Rainbow => format!("hsl({}, 100%, 50%)", hues.advance()),
            ColorSpec::Gold => GOLD.to_hex(),
        })
    }
}

impl fmt::Display for ColorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorSpec::Solid(hex) => f.write_str(hex),
            ColorSpec::Rainbow => f.write_str("rainbow"),
            ColorSpec::Gold => f.write_str("gold"),
        }
    }
}
