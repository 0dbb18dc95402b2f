//! Game reference data, injected read-only into everything that models
//! progression.
//!
//! The catalog is the configuration layer of the core: ancient, outsider,
//! and hero definitions, the item-bonus wiring, achievement and upgrade
//! multipliers, and the scaling constants behind the progression curves.
//! Loaded from a JSON file in deployments, compiled in via `builtin()`,
//! fixed via `default_test()` for deterministic tests. The catalog is an
//! internal contract: a save that fails to parse is tolerated, a catalog
//! that fails to validate is a bug and aborts loudly.

use crate::error::{CoreError, CoreResult};
use crate::types::{AchievementId, AncientId, HeroId, ItemBonusType, OutsiderId, UpgradeId};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What one level of an ancient or outsider does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Percent added to idle output per level.
    IdleDps,
    /// Percent added to active (clicking) output per level.
    ClickDps,
    /// Percent added to all output per level.
    AllDps,
    /// Percent added to all output per level, levels bought with souls.
    DpsPerSoulSpent,
    /// Percent added to gild effectiveness per level.
    GildEffectiveness,
    /// Percent points of primal-boss chance per level.
    PrimalChance,
    /// Seconds of boss timer per level.
    BossTimer,
    /// Percent shaved off boss health per level.
    BossHp,
    /// Monsters-per-zone reduction per level.
    MonsterCount,
    /// Percent added to soul rewards per level.
    SoulsReward,
    /// Percent added to gold drops per level. Carried for the stats view;
    /// gold never enters the reset model.
    Gold,
    /// Percent shaved off ancient level costs per level. Carried for the
    /// stats view.
    AncientCost,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub kind: EffectKind,
    pub per_level: f64,
}

impl Effect {
    pub const fn new(kind: EffectKind, per_level: f64) -> Effect {
        Effect { kind, per_level }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AncientDef {
    pub id: AncientId,
    pub name: String,
    pub effect: Effect,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutsiderDef {
    pub id: OutsiderId,
    pub name: String,
    pub effect: Effect,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeroDef {
    pub id: HeroId,
    pub name: String,
    /// Damage per second contributed by one level of this hero.
    pub base_dps: f64,
}

/// Constants behind the progression curves. All of them are data so a
/// balance patch is a catalog edit, not a code change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalingConstants {
    /// Seconds to clear one zone-1 monster for a build with unit output.
    pub base_clear_seconds: f64,
    /// Attack-cadence floor: no monster dies faster than this.
    pub min_clear_seconds: f64,
    /// Monsters per zone before reductions.
    pub monsters_per_zone: f64,
    /// Reductions never push a zone below this.
    pub min_monsters_per_zone: f64,
    /// Per-zone clear-time growth while hero scaling keeps up.
    pub ramp_growth: f64,
    /// Zone where hero scaling gives out.
    pub wall_zone: f64,
    /// Per-zone clear-time growth past the wall.
    pub wall_growth: f64,
    /// Every Nth zone ends in a boss.
    pub boss_interval: f64,
    /// Boss health relative to a regular monster.
    pub boss_hp_multiplier: f64,
    /// Seconds allowed per boss fight.
    pub boss_timer_seconds: f64,
    /// First zone whose bosses can drop souls.
    pub souls_start_zone: f64,
    /// Souls from a primal boss at the start zone.
    pub souls_per_boss_base: f64,
    /// Per-zone growth of the primal soul payout.
    pub souls_growth: f64,
    /// Primal-boss chance before ancients.
    pub primal_chance_base: f64,
    /// Gild damage bonus per epic level, before gild-effectiveness bonuses.
    pub gild_dps_bonus: f64,
    /// Output bonus per hero soul held.
    pub dps_per_soul_held: f64,
    /// Hard cap on how deep any search may look.
    pub max_zone: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameCatalog {
    pub ancients: HashMap<AncientId, AncientDef>,
    pub outsiders: HashMap<OutsiderId, OutsiderDef>,
    pub heroes: HashMap<HeroId, HeroDef>,
    /// Item bonus type -> the ancient whose effect the bonus mimics.
    pub item_bonuses: HashMap<ItemBonusType, AncientId>,
    pub achievement_multipliers: HashMap<AchievementId, f64>,
    pub upgrade_multipliers: HashMap<UpgradeId, f64>,
    pub scaling: ScalingConstants,
}

impl GameCatalog {
    /// Load and validate a catalog file.
    pub fn load(path: &str) -> CoreResult<GameCatalog> {
        let text = std::fs::read_to_string(path)?;
        let catalog: GameCatalog = serde_json::from_str(&text)?;
        catalog.validate()?;
        info!(
            "catalog loaded from {path}: {} ancients, {} outsiders, {} heroes",
            catalog.ancients.len(),
            catalog.outsiders.len(),
            catalog.heroes.len()
        );
        Ok(catalog)
    }

    pub fn ancient(&self, id: AncientId) -> Option<&AncientDef> {
        self.ancients.get(&id)
    }

    pub fn hero(&self, id: HeroId) -> Option<&HeroDef> {
        self.heroes.get(&id)
    }

    /// Ancients whose effect is of the given kind.
    pub fn ancients_with(&self, kind: EffectKind) -> impl Iterator<Item = &AncientDef> {
        self.ancients.values().filter(move |def| def.effect.kind == kind)
    }

    /// Outsiders whose effect is of the given kind.
    pub fn outsiders_with(&self, kind: EffectKind) -> impl Iterator<Item = &OutsiderDef> {
        self.outsiders.values().filter(move |def| def.effect.kind == kind)
    }

    /// Internal-contract check. A catalog that fails here is our bug, not
    /// the player's, so the failure is loud.
    pub fn validate(&self) -> CoreResult<()> {
        for (bonus, ancient) in &self.item_bonuses {
            if !self.ancients.contains_key(ancient) {
                return Err(CoreError::Catalog(format!(
                    "item bonus type {} maps to undefined ancient {ancient}",
                    bonus.0
                )));
            }
        }
        if self.heroes.is_empty() {
            return Err(CoreError::Catalog("hero roster is empty".into()));
        }
        for hero in self.heroes.values() {
            if !hero.base_dps.is_finite() || hero.base_dps < 0.0 {
                return Err(CoreError::Catalog(format!(
                    "hero {} ({}) has invalid base dps {}",
                    hero.id, hero.name, hero.base_dps
                )));
            }
        }
        for def in self.ancients.values() {
            if !def.effect.per_level.is_finite() || def.effect.per_level < 0.0 {
                return Err(CoreError::Catalog(format!(
                    "ancient {} ({}) has invalid per-level effect {}",
                    def.id, def.name, def.effect.per_level
                )));
            }
        }
        for def in self.outsiders.values() {
            if !def.effect.per_level.is_finite() || def.effect.per_level < 0.0 {
                return Err(CoreError::Catalog(format!(
                    "outsider {} ({}) has invalid per-level effect {}",
                    def.id, def.name, def.effect.per_level
                )));
            }
        }
        self.scaling.validate()
    }

    /// The shipped game data.
    pub fn builtin() -> GameCatalog {
        let ancients = [
            AncientDef {
                id: AncientId(3),
                name: "Solomon, Ancient of Wisdom".into(),
                effect: Effect::new(EffectKind::SoulsReward, 5.0),
            },
            AncientDef {
                id: AncientId(4),
                name: "Libertas, Ancient of Freedom".into(),
                effect: Effect::new(EffectKind::Gold, 25.0),
            },
            AncientDef {
                id: AncientId(5),
                name: "Siyalatas, Ancient of Abandon".into(),
                effect: Effect::new(EffectKind::IdleDps, 25.0),
            },
            AncientDef {
                id: AncientId(8),
                name: "Mammon, Ancient of Greed".into(),
                effect: Effect::new(EffectKind::Gold, 25.0),
            },
            AncientDef {
                id: AncientId(9),
                name: "Mimzee, Ancient of Riches".into(),
                effect: Effect::new(EffectKind::Gold, 50.0),
            },
            AncientDef {
                id: AncientId(11),
                name: "Dogcog, Ancient of Thrift".into(),
                effect: Effect::new(EffectKind::AncientCost, 2.0),
            },
            AncientDef {
                id: AncientId(13),
                name: "Atman, Ancient of Souls".into(),
                effect: Effect::new(EffectKind::PrimalChance, 1.0),
            },
            AncientDef {
                id: AncientId(15),
                name: "Bhaal, Ancient of Murder".into(),
                effect: Effect::new(EffectKind::ClickDps, 15.0),
            },
            AncientDef {
                id: AncientId(16),
                name: "Morgulis, Ancient of Death".into(),
                effect: Effect::new(EffectKind::DpsPerSoulSpent, 11.0),
            },
            AncientDef {
                id: AncientId(17),
                name: "Chronos, Ancient of Time".into(),
                effect: Effect::new(EffectKind::BossTimer, 5.0),
            },
            AncientDef {
                id: AncientId(18),
                name: "Bubos, Ancient of Diseases".into(),
                effect: Effect::new(EffectKind::BossHp, 2.0),
            },
            AncientDef {
                id: AncientId(19),
                name: "Fragsworth, Ancient of Wrath".into(),
                effect: Effect::new(EffectKind::ClickDps, 20.0),
            },
            AncientDef {
                id: AncientId(21),
                name: "Kumawakamaru, Ancient of Shadows".into(),
                effect: Effect::new(EffectKind::MonsterCount, 1.0),
            },
            AncientDef {
                id: AncientId(28),
                name: "Argaiv, Ancient of Enhancement".into(),
                effect: Effect::new(EffectKind::GildEffectiveness, 2.0),
            },
        ];
        let outsiders = [
            OutsiderDef {
                id: OutsiderId(1),
                name: "Xyliqil".into(),
                effect: Effect::new(EffectKind::IdleDps, 50.0),
            },
            OutsiderDef {
                id: OutsiderId(2),
                name: "Chor'gorloth".into(),
                effect: Effect::new(EffectKind::AncientCost, 5.0),
            },
            OutsiderDef {
                id: OutsiderId(3),
                name: "Phandoryss".into(),
                effect: Effect::new(EffectKind::AllDps, 50.0),
            },
            OutsiderDef {
                id: OutsiderId(5),
                name: "Ponyboy".into(),
                effect: Effect::new(EffectKind::SoulsReward, 25.0),
            },
        ];
        let heroes = [
            ("Cid, the Helpful Adventurer", 0.0),
            ("Treebeast", 5.0),
            ("Ivan, the Drunken Brawler", 22.0),
            ("Brittany, Beach Princess", 74.0),
            ("The Wandering Fisherman", 245.0),
            ("Betty Clicker", 976.0),
            ("The Masked Samurai", 3_725.0),
            ("Leon", 1.4e4),
            ("The Great Forest Seer", 5.0e4),
            ("Alexa, Assassin", 2.0e5),
            ("Natalia, Ice Apprentice", 7.9e5),
            ("Mercedes, Duchess of Blades", 3.1e6),
            ("Bobby, Bounty Hunter", 1.2e7),
            ("Broyle Lindeoven, Fire Mage", 4.7e7),
            ("Sir George II, King's Guard", 1.8e8),
            ("King Midas", 7.2e8),
            ("Referi Jerator, Ice Wizard", 2.8e9),
            ("Abaddon", 1.1e10),
            ("Ma Zhu", 4.3e10),
            ("Amenhotep", 1.7e11),
            ("Beastlord", 6.6e11),
            ("Athena, Goddess of War", 2.6e12),
            ("Aphrodite, Goddess of Love", 1.0e13),
            ("Shinatobe, Wind Deity", 4.0e13),
            ("Grant, the General", 1.6e14),
            ("Frostleaf", 6.2e14),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, (name, base_dps))| HeroDef {
            id: HeroId(i as u32 + 1),
            name: name.into(),
            base_dps,
        });
        let item_bonuses = [
            (ItemBonusType(1), AncientId(5)),
            (ItemBonusType(2), AncientId(8)),
            (ItemBonusType(3), AncientId(4)),
            (ItemBonusType(4), AncientId(9)),
            (ItemBonusType(5), AncientId(19)),
            (ItemBonusType(6), AncientId(13)),
            (ItemBonusType(7), AncientId(16)),
            (ItemBonusType(8), AncientId(3)),
            (ItemBonusType(9), AncientId(15)),
            (ItemBonusType(10), AncientId(28)),
        ];
        let achievement_multipliers = [
            (1, 1.05),
            (2, 1.05),
            (3, 1.05),
            (4, 1.10),
            (5, 1.10),
            (6, 1.10),
            (7, 1.15),
            (8, 1.15),
            (9, 1.20),
            (10, 1.25),
            (11, 1.25),
            (12, 1.50),
        ];
        let upgrade_multipliers = [
            (1, 1.25),
            (2, 1.25),
            (3, 1.50),
            (4, 1.50),
            (5, 1.75),
            (6, 2.00),
        ];

        GameCatalog {
            ancients: ancients.into_iter().map(|d| (d.id, d)).collect(),
            outsiders: outsiders.into_iter().map(|d| (d.id, d)).collect(),
            heroes: heroes.map(|d| (d.id, d)).collect(),
            item_bonuses: item_bonuses.into_iter().collect(),
            achievement_multipliers: achievement_multipliers
                .into_iter()
                .map(|(id, mult)| (AchievementId(id), mult))
                .collect(),
            upgrade_multipliers: upgrade_multipliers
                .into_iter()
                .map(|(id, mult)| (UpgradeId(id), mult))
                .collect(),
            scaling: ScalingConstants {
                base_clear_seconds: 10.0,
                min_clear_seconds: 0.35,
                monsters_per_zone: 10.0,
                min_monsters_per_zone: 2.0,
                ramp_growth: 1.004,
                wall_zone: 140.0,
                wall_growth: 1.15,
                boss_interval: 5.0,
                boss_hp_multiplier: 10.0,
                boss_timer_seconds: 30.0,
                souls_start_zone: 105.0,
                souls_per_boss_base: 20.0,
                souls_growth: 1.006,
                primal_chance_base: 0.25,
                gild_dps_bonus: 0.5,
                dps_per_soul_held: 0.1,
                max_zone: 1_000_000.0,
            },
        }
    }

    /// Deterministic fixture catalog used across the test suite. Smaller
    /// roster, hand-picked curve constants.
    pub fn default_test() -> GameCatalog {
        let mut catalog = GameCatalog::builtin();
        catalog.heroes = [
            HeroDef {
                id: HeroId(1),
                name: "Cid, the Helpful Adventurer".into(),
                base_dps: 0.0,
            },
            HeroDef {
                id: HeroId(2),
                name: "Treebeast".into(),
                base_dps: 5.0,
            },
            HeroDef {
                id: HeroId(3),
                name: "Ivan, the Drunken Brawler".into(),
                base_dps: 22.0,
            },
        ]
        .into_iter()
        .map(|d| (d.id, d))
        .collect();
        catalog.scaling = ScalingConstants {
            base_clear_seconds: 716.0184225713556,
            min_clear_seconds: 0.1,
            monsters_per_zone: 10.0,
            min_monsters_per_zone: 2.0,
            ramp_growth: 1.0004,
            wall_zone: 2_000.0,
            wall_growth: 1.15,
            boss_interval: 5.0,
            boss_hp_multiplier: 10.0,
            boss_timer_seconds: 30.0,
            souls_start_zone: 105.0,
            souls_per_boss_base: 226.60521898055458,
            souls_growth: 1.0013406280280122,
            primal_chance_base: 0.25,
            gild_dps_bonus: 0.5,
            dps_per_soul_held: 0.1,
            max_zone: 100_000.0,
        };
        catalog
    }
}

impl ScalingConstants {
    fn validate(&self) -> CoreResult<()> {
        let finite = [
            self.base_clear_seconds,
            self.min_clear_seconds,
            self.monsters_per_zone,
            self.min_monsters_per_zone,
            self.ramp_growth,
            self.wall_zone,
            self.wall_growth,
            self.boss_interval,
            self.boss_hp_multiplier,
            self.boss_timer_seconds,
            self.souls_start_zone,
            self.souls_per_boss_base,
            self.souls_growth,
            self.primal_chance_base,
            self.gild_dps_bonus,
            self.dps_per_soul_held,
            self.max_zone,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(CoreError::Catalog(
                "scaling constants must all be finite".into(),
            ));
        }
        if self.base_clear_seconds <= 0.0 || self.min_clear_seconds <= 0.0 {
            return Err(CoreError::Catalog("clear times must be positive".into()));
        }
        if self.min_monsters_per_zone < 1.0
            || self.monsters_per_zone < self.min_monsters_per_zone
        {
            return Err(CoreError::Catalog(format!(
                "monsters per zone {} must be at least the minimum {} (and the minimum at least 1)",
                self.monsters_per_zone, self.min_monsters_per_zone
            )));
        }
        if self.boss_interval < 1.0 || self.boss_hp_multiplier < 1.0 {
            return Err(CoreError::Catalog(
                "boss cadence and health multiplier must be at least 1".into(),
            ));
        }
        if self.boss_timer_seconds <= 0.0 {
            return Err(CoreError::Catalog("boss timer must be positive".into()));
        }
        if self.souls_start_zone <= 1.0 || self.souls_per_boss_base <= 0.0 {
            return Err(CoreError::Catalog(
                "soul rewards must start past zone 1 with a positive base".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.primal_chance_base) {
            return Err(CoreError::Catalog(format!(
                "primal chance base {} must sit in [0, 1]",
                self.primal_chance_base
            )));
        }
        if self.wall_zone <= 1.0 || self.max_zone <= self.wall_zone {
            return Err(CoreError::Catalog(
                "wall zone must sit between 1 and the zone cap".into(),
            ));
        }
        // Souls must outgrow the ramp but not the wall, or souls per
        // second has no interior peak for the search to find.
        if !(1.0 < self.ramp_growth
            && self.ramp_growth < self.souls_growth
            && self.souls_growth < self.wall_growth)
        {
            return Err(CoreError::Catalog(format!(
                "growth ordering violated: ramp {} < souls {} < wall {} required",
                self.ramp_growth, self.souls_growth, self.wall_growth
            )));
        }
        Ok(())
    }
}
