//! Shared primitive types used across the save model and the optimizer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric id of an ancient, as it appears in both save and catalog data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AncientId(pub u32);

/// Numeric id of an outsider (post-transcendence ancient analogue).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutsiderId(pub u32);

/// Numeric id of a hero in the catalog roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeroId(pub u32);

/// Numeric id of an item instance inside a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

/// Equipment slot number inside a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(pub u32);

/// Bonus-type id carried by an equipped item. Each bonus type maps to an
/// ancient whose effect the item mimics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemBonusType(pub u32);

/// Numeric id of an achievement flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AchievementId(pub u32);

/// Numeric id of a purchased-upgrade flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpgradeId(pub u32);

/// Ids that appear as stringified numeric keys in save and catalog JSON.
pub trait NumericId: Copy + Eq + std::hash::Hash {
    fn from_u32(raw: u32) -> Self;
    fn raw(self) -> u32;
}

macro_rules! numeric_id {
    ($($id:ident),+) => {
        $(impl NumericId for $id {
            fn from_u32(raw: u32) -> Self {
                $id(raw)
            }
            fn raw(self) -> u32 {
                self.0
            }
        })+
    };
}

numeric_id!(AncientId, OutsiderId, HeroId, ItemId, SlotId, ItemBonusType, AchievementId, UpgradeId);

impl fmt::Display for AncientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for OutsiderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for HeroId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the player drives the run the optimizer models.
///
/// `Hybrid` blends the Idle and Active projections by `active_weight`
/// (1.0 behaves as Active, 0.0 as Idle).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayStyle {
    Idle,
    Active,
    Hybrid { active_weight: f64 },
}

impl PlayStyle {
    /// Default blend used when a hybrid ratio is not configured.
    pub const DEFAULT_ACTIVE_WEIGHT: f64 = 0.5;

    /// Active share of the run: 0 for `Idle`, 1 for `Active`, the
    /// sanitized blend ratio for `Hybrid`. Non-finite ratios fall back to
    /// the default, everything else is clamped into `[0, 1]`.
    pub fn active_share(self) -> f64 {
        match self {
            PlayStyle::Idle => 0.0,
            PlayStyle::Active => 1.0,
            PlayStyle::Hybrid { active_weight } if active_weight.is_finite() => {
                active_weight.clamp(0.0, 1.0)
            }
            PlayStyle::Hybrid { .. } => PlayStyle::DEFAULT_ACTIVE_WEIGHT,
        }
    }
}

impl fmt::Display for PlayStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayStyle::Idle => write!(f, "idle"),
            PlayStyle::Active => write!(f, "active"),
            PlayStyle::Hybrid { active_weight } => {
                write!(f, "hybrid({:.2} active)", active_weight)
            }
        }
    }
}
