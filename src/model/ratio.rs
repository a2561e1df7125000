use std::fmt;
use std::str::FromStr;

use serde_with::{DeserializeFromStr, SerializeDisplay};
use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// A width / height ratio. Always positive and finite.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct AspectRatio(f64);

impl AspectRatio {
    pub fn new(ratio: f64) -> Option<Self> {
        (ratio.is_finite() && ratio > 0.0).then_some(AspectRatio(ratio))
    }

    /// `None` unless both parts are positive and finite.
    pub fn from_parts(width: f64, height: f64) -> Option<Self> {
        if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
            return None;
        }
        Self::new(width / height)
    }

    pub fn get(self) -> f64 { self.0 }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, IntoStaticStr)]
pub enum NamedRatio {
    #[strum(serialize = "1:1")]
    Square,
    #[strum(serialize = "4:3")]
    FourThree,
    #[strum(serialize = "3:2")]
    ThreeTwo,
    #[strum(serialize = "5:4")]
    FiveFour,
    #[strum(serialize = "7:5")]
    SevenFive,
    #[strum(serialize = "16:9")]
    Wide,
    #[strum(serialize = "9:16")]
    Tall,
    #[strum(serialize = "4:5")]
    FourFive,
    #[strum(serialize = "3:4")]
    ThreeFour,
    #[strum(serialize = "2:3")]
    TwoThree,
}

impl NamedRatio {
    pub fn parts(self) -> (u32, u32) {
        use NamedRatio::*;
        match self {
            Square => (1, 1),
            FourThree => (4, 3),
            ThreeTwo => (3, 2),
            FiveFour => (5, 4),
            SevenFive => (7, 5),
            Wide => (16, 9),
            Tall => (9, 16),
            FourFive => (4, 5),
            ThreeFour => (3, 4),
            TwoThree => (2, 3),
        }
    }

    pub fn ratio(self) -> AspectRatio {
        let (w, h) = self.parts();
        AspectRatio(w as f64 / h as f64)
    }

    pub fn as_str(self) -> &'static str { self.into() }
}

/// User-entered custom ratio inputs. Defaults to 16:9.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CustomRatio {
    pub width: f64,
    pub height: f64,
}

impl Default for CustomRatio {
    fn default() -> Self { Self { width: 16.0, height: 9.0 } }
}

impl CustomRatio {
    pub fn new(width: f64, height: f64) -> Self { Self { width, height } }

    pub fn resolve(&self) -> Option<AspectRatio> { AspectRatio::from_parts(self.width, self.height) }
}

/// The option picked in the ratio menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, SerializeDisplay, DeserializeFromStr)]
pub enum RatioSelection {
    #[default]
    Free,
    Named(NamedRatio),
    Custom,
}

impl RatioSelection {
    /// Every menu option, in menu order.
    pub fn options() -> impl Iterator<Item = RatioSelection> {
        std::iter::once(RatioSelection::Free)
            .chain(NamedRatio::iter().map(RatioSelection::Named))
            .chain(std::iter::once(RatioSelection::Custom))
    }

    pub fn resolve(&self, custom: &CustomRatio) -> Option<AspectRatio> {
        match self {
            RatioSelection::Free => None,
            RatioSelection::Named(named) => Some(named.ratio()),
            RatioSelection::Custom => custom.resolve(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RatioSelection::Free => "Free ratio",
            RatioSelection::Named(named) => named.as_str(),
            RatioSelection::Custom => "Custom ratio",
        }
    }

    /// Short summary of the active constraint.
    ///
    /// A custom selection that does not resolve reads as free.
    pub fn chip_label(&self, custom: &CustomRatio) -> String {
        match self {
            RatioSelection::Custom if custom.resolve().is_some() => {
                format!("Custom {}:{}", custom.width, custom.height)
            }
            RatioSelection::Custom => RatioSelection::Free.label().to_string(),
            other => other.label().to_string(),
        }
    }
}

impl fmt::Display for RatioSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RatioSelection::Free => f.write_str("free"),
            RatioSelection::Named(named) => f.write_str(named.as_str()),
            RatioSelection::Custom => f.write_str("custom"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown aspect ratio {0:?}")]
pub struct UnknownRatio(String);

impl FromStr for RatioSelection {
    type Err = UnknownRatio;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "free" => Ok(RatioSelection::Free),
            "custom" => Ok(RatioSelection::Custom),
            other => NamedRatio::from_str(other)
                .map(RatioSelection::Named)
                .map_err(|_| UnknownRatio(other.to_string())),
        }
    }
}
