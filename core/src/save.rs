//! The typed save document and its damage-tolerant deserialization.
//!
//! Saves come from years of game versions, modded clients, and bit rot.
//! The contract: a text that is a JSON object at the top level always
//! yields a usable `SaveState`. Every field is harvested independently;
//! whatever fails to parse falls back to its default, and a junk entry
//! inside an id-keyed map drops that entry alone.

use crate::bignum::BigNumber;
use crate::types::{
    AchievementId, AncientId, HeroId, ItemBonusType, ItemId, NumericId, OutsiderId, SlotId,
    UpgradeId,
};
use log::{debug, warn};
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Decoded save document. Plain data; the optimizer and stats views borrow
/// it read-only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SaveState {
    #[serde(deserialize_with = "lenient_block")]
    pub ancients: AncientsBlock,

    #[serde(deserialize_with = "lenient_block")]
    pub items: ItemsBlock,

    #[serde(deserialize_with = "lenient_block")]
    pub outsiders: OutsidersBlock,

    #[serde(deserialize_with = "lenient_block")]
    pub hero_collection: HeroesBlock,

    #[serde(deserialize_with = "lenient_block")]
    pub achievements: IdMap<AchievementId, bool>,

    #[serde(deserialize_with = "lenient_block")]
    pub upgrades: IdMap<UpgradeId, bool>,

    #[serde(deserialize_with = "lenient_bignum")]
    pub titan_damage: BigNumber,

    #[serde(deserialize_with = "lenient_bignum")]
    pub hero_souls: BigNumber,

    #[serde(rename = "numAscensionsThisTranscension", deserialize_with = "lenient")]
    pub ascensions_this_transcension: u32,

    #[serde(rename = "numWorldResets", deserialize_with = "lenient")]
    pub total_ascensions: u32,

    #[serde(deserialize_with = "lenient")]
    pub rubies: u32,

    #[serde(deserialize_with = "lenient")]
    pub transcendent: bool,

    #[serde(rename = "highestFinishedZonePersist", deserialize_with = "lenient_number")]
    pub highest_finished_zone: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AncientsBlock {
    #[serde(deserialize_with = "lenient")]
    pub ancients: IdMap<AncientId, AncientProgress>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AncientProgress {
    #[serde(deserialize_with = "lenient_number")]
    pub level: f64,

    #[serde(rename = "spentHeroSouls", deserialize_with = "lenient_bignum")]
    pub spent_hero_souls: BigNumber,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemsBlock {
    /// Equipment slot -> id of the item sitting in it.
    #[serde(deserialize_with = "lenient")]
    pub slots: IdMap<SlotId, ItemId>,

    /// Every owned item, equipped or not.
    #[serde(deserialize_with = "lenient")]
    pub items: IdMap<ItemId, EquippedItem>,
}

/// An item's enchantments: up to four (bonus type, bonus level) pairs.
/// The bonus type maps to an ancient via the catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EquippedItem {
    #[serde(rename = "bonusType1", deserialize_with = "lenient")]
    pub bonus_type1: Option<ItemBonusType>,
    #[serde(rename = "bonus1Level", deserialize_with = "lenient_number")]
    pub bonus1_level: f64,

    #[serde(rename = "bonusType2", deserialize_with = "lenient")]
    pub bonus_type2: Option<ItemBonusType>,
    #[serde(rename = "bonus2Level", deserialize_with = "lenient_number")]
    pub bonus2_level: f64,

    #[serde(rename = "bonusType3", deserialize_with = "lenient")]
    pub bonus_type3: Option<ItemBonusType>,
    #[serde(rename = "bonus3Level", deserialize_with = "lenient_number")]
    pub bonus3_level: f64,

    #[serde(rename = "bonusType4", deserialize_with = "lenient")]
    pub bonus_type4: Option<ItemBonusType>,
    #[serde(rename = "bonus4Level", deserialize_with = "lenient_number")]
    pub bonus4_level: f64,
}

impl EquippedItem {
    /// The populated (bonus type, level) pairs.
    pub fn bonuses(&self) -> impl Iterator<Item = (ItemBonusType, f64)> + '_ {
        [
            (self.bonus_type1, self.bonus1_level),
            (self.bonus_type2, self.bonus2_level),
            (self.bonus_type3, self.bonus3_level),
            (self.bonus_type4, self.bonus4_level),
        ]
        .into_iter()
        .filter_map(|(bonus, level)| bonus.map(|b| (b, level)))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutsidersBlock {
    #[serde(deserialize_with = "lenient")]
    pub outsiders: IdMap<OutsiderId, OutsiderProgress>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutsiderProgress {
    #[serde(deserialize_with = "lenient_number")]
    pub level: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroesBlock {
    #[serde(deserialize_with = "lenient")]
    pub heroes: IdMap<HeroId, HeroProgress>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroProgress {
    #[serde(deserialize_with = "lenient_number")]
    pub level: f64,

    /// Gild count.
    #[serde(rename = "epicLevel", deserialize_with = "lenient")]
    pub epic_level: u32,
}

impl SaveState {
    /// Deserialize decoded save text. `None` only when the text is not a
    /// JSON object; anything else degrades field by field.
    pub fn deserialize(text: &str) -> Option<SaveState> {
        let root: Value = match serde_json::from_str(text) {
            Ok(v) => v,
            Err(e) => {
                warn!("save text is not JSON: {e}");
                return None;
            }
        };
        if !root.is_object() {
            warn!("save document is not a JSON object");
            return None;
        }
        match serde_json::from_value(root) {
            Ok(state) => Some(state),
            Err(e) => {
                warn!("save object could not be harvested: {e}");
                None
            }
        }
    }

    pub fn ancient_level(&self, id: AncientId) -> f64 {
        self.ancients
            .ancients
            .get(&id)
            .map(|a| a.level)
            .unwrap_or(0.0)
    }

    pub fn outsider_level(&self, id: OutsiderId) -> f64 {
        self.outsiders
            .outsiders
            .get(&id)
            .map(|o| o.level)
            .unwrap_or(0.0)
    }

    /// Hero souls sunk into ancients across the whole save.
    pub fn total_souls_spent(&self) -> BigNumber {
        let mut total = BigNumber::zero();
        for progress in self.ancients.ancients.values() {
            total += &progress.spent_hero_souls;
        }
        total
    }

    /// Bonus levels per bonus type, summed over *equipped* items only.
    pub fn equipped_bonus_levels(&self) -> HashMap<ItemBonusType, f64> {
        let mut out = HashMap::new();
        for item_id in self.items.slots.values() {
            if let Some(item) = self.items.items.get(item_id) {
                for (bonus, level) in item.bonuses() {
                    *out.entry(bonus).or_insert(0.0) += level;
                }
            }
        }
        out
    }
}

// ── Id-keyed maps ──────────────────────────────────────────

/// A map keyed by stringified numeric ids, as the save format stores them.
/// Deserialization drops entries whose key or value does not parse instead
/// of failing the surrounding document; a value that is not an object at
/// all is an error, left to the lenient wrappers to absorb.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct IdMap<K: NumericId + Serialize, V>(HashMap<K, V>);

impl<K: NumericId + Serialize, V> IdMap<K, V> {
    pub fn get(&self, id: &K) -> Option<&V> {
        self.0.get(id)
    }

    pub fn insert(&mut self, id: K, value: V) {
        self.0.insert(id, value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.0.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.0.values()
    }
}

impl<K: NumericId + Serialize, V> Default for IdMap<K, V> {
    fn default() -> Self {
        IdMap(HashMap::new())
    }
}

impl<'de, K, V> Deserialize<'de> for IdMap<K, V>
where
    K: NumericId + Serialize,
    V: DeserializeOwned,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = match Value::deserialize(deserializer)? {
            Value::Object(entries) => entries,
            _ => return Err(de::Error::custom("expected an object keyed by numeric ids")),
        };
        let mut out = HashMap::new();
        for (key, entry) in entries {
            let id = match key.trim().parse::<u32>() {
                Ok(raw) => K::from_u32(raw),
                Err(_) => {
                    debug!("skipping save map entry with non-numeric key {key:?}");
                    continue;
                }
            };
            match serde_json::from_value::<V>(entry) {
                Ok(parsed) => {
                    out.insert(id, parsed);
                }
                Err(e) => {
                    debug!("skipping unreadable save map entry {key:?}: {e}");
                }
            }
        }
        Ok(IdMap(out))
    }
}

// ── Lenient field harvesting ───────────────────────────────

/// Deserialize a field, falling back to its default on any error. The
/// value is buffered through `serde_json::Value` so a failure cannot
/// poison the surrounding document.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    let was_null = value.is_null();
    match serde_json::from_value(value) {
        Ok(parsed) => Ok(parsed),
        Err(e) => {
            if !was_null {
                debug!("tolerating malformed save field: {e}");
            }
            Ok(T::default())
        }
    }
}

/// [`lenient`] for the top-level save blocks. Losing a whole block is
/// reported at warn level; the per-field fallbacks stay at debug.
fn lenient_block<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    let was_null = value.is_null();
    match serde_json::from_value(value) {
        Ok(parsed) => Ok(parsed),
        Err(e) => {
            if !was_null {
                warn!("dropping malformed save block: {e}");
            }
            Ok(T::default())
        }
    }
}

/// Numbers that may arrive as JSON numbers or as stringified numbers.
fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(number_from_value(&value).unwrap_or_default())
}

/// Unbounded quantities: exact text is preserved all the way into
/// [`BigNumber::parse`], so a thousand-digit soul count survives intact.
fn lenient_bignum<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigNumber, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(bignum_from_value(&value).unwrap_or_default())
}

fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn bignum_from_value(value: &Value) -> Option<BigNumber> {
    match value {
        Value::Number(n) => BigNumber::parse(&n.to_string()),
        Value::String(s) => BigNumber::parse(s),
        _ => None,
    }
}
