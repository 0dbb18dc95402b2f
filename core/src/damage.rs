//! Build strength derived from a save against the catalog.
//!
//! Everything the progression model needs from a player's build is reduced
//! here to a handful of scalars. Output folds in log10 space: held souls
//! and soul-spent bonuses are unbounded, so linear f64 multiplication
//! would overflow long before real saves stop growing.

use crate::bignum::BigNumber;
use crate::catalog::{EffectKind, GameCatalog};
use crate::save::{IdMap, SaveState};
use crate::types::{AncientId, NumericId, PlayStyle};
use log::debug;
use serde::Serialize;
use std::collections::HashMap;

/// Scalars the climb model reads. `log_output` is log10 of the build's
/// damage multiplier under the derived play style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildStats {
    pub log_output: f64,
    pub primal_chance: f64,
    pub souls_multiplier: f64,
    pub boss_timer: f64,
    pub boss_hp_multiplier: f64,
    pub monsters_per_zone: f64,
}

impl BuildStats {
    pub fn derive(save: &SaveState, catalog: &GameCatalog, style: PlayStyle) -> BuildStats {
        let scaling = &catalog.scaling;
        let levels = effective_ancient_levels(save, catalog);
        let percent = |kind| percent_total(catalog, &levels, save, kind);

        let gild_factor = scaling.gild_dps_bonus * (1.0 + percent(EffectKind::GildEffectiveness));
        let log_output = match log_best_hero(save, catalog, gild_factor) {
            Some(log_base) => {
                let idle = (1.0 + percent(EffectKind::IdleDps)).log10();
                let active = (1.0 + percent(EffectKind::ClickDps)).log10();
                // Hybrid folds both branches; the optimizer splits hybrid
                // runs into an idle pass and an active pass before ever
                // deriving stats.
                let style_bonus = match style {
                    PlayStyle::Idle => idle,
                    PlayStyle::Active => active,
                    PlayStyle::Hybrid { .. } => {
                        let w = style.active_share();
                        w * active + (1.0 - w) * idle
                    }
                };
                log_base
                    + log_souls_bonus(&save.hero_souls, scaling.dps_per_soul_held)
                    + (1.0 + percent(EffectKind::DpsPerSoulSpent)).log10()
                    + (1.0 + percent(EffectKind::AllDps)).log10()
                    + flag_multiplier(&save.achievements, &catalog.achievement_multipliers).log10()
                    + flag_multiplier(&save.upgrades, &catalog.upgrade_multipliers).log10()
                    + style_bonus
            }
            None => f64::NEG_INFINITY,
        };

        let stats = BuildStats {
            log_output,
            primal_chance: (scaling.primal_chance_base + percent(EffectKind::PrimalChance))
                .clamp(0.0, 1.0),
            souls_multiplier: 1.0 + percent(EffectKind::SoulsReward),
            boss_timer: scaling.boss_timer_seconds
                + flat_total(catalog, &levels, save, EffectKind::BossTimer),
            boss_hp_multiplier: (scaling.boss_hp_multiplier * (1.0 - percent(EffectKind::BossHp)))
                .max(1.0),
            monsters_per_zone: (scaling.monsters_per_zone
                - flat_total(catalog, &levels, save, EffectKind::MonsterCount))
            .max(scaling.min_monsters_per_zone),
        };
        debug!(
            "derived {style} build: log10 output {:.4}, primal {:.3}, souls x{:.2}, boss window {:.1}s, {} monsters/zone",
            stats.log_output,
            stats.primal_chance,
            stats.souls_multiplier,
            stats.boss_timer,
            stats.monsters_per_zone
        );
        stats
    }

    /// A build that cannot damage anything at all.
    pub fn is_inert(&self) -> bool {
        self.log_output == f64::NEG_INFINITY
    }
}

/// Save-file ancient levels plus equipped item bonus levels, keyed by
/// ancient. Junk (negative or non-numeric) levels count as zero.
pub fn effective_ancient_levels(
    save: &SaveState,
    catalog: &GameCatalog,
) -> HashMap<AncientId, f64> {
    let mut levels: HashMap<AncientId, f64> = HashMap::new();
    for (id, progress) in save.ancients.ancients.iter() {
        levels.insert(*id, progress.level.max(0.0));
    }
    for (bonus, level) in save.equipped_bonus_levels() {
        if let Some(id) = catalog.item_bonuses.get(&bonus) {
            *levels.entry(*id).or_insert(0.0) += level.max(0.0);
        }
    }
    levels
}

fn percent_total(
    catalog: &GameCatalog,
    levels: &HashMap<AncientId, f64>,
    save: &SaveState,
    kind: EffectKind,
) -> f64 {
    (flat_total(catalog, levels, save, kind)) / 100.0
}

fn flat_total(
    catalog: &GameCatalog,
    levels: &HashMap<AncientId, f64>,
    save: &SaveState,
    kind: EffectKind,
) -> f64 {
    let ancients: f64 = catalog
        .ancients_with(kind)
        .map(|def| def.effect.per_level * levels.get(&def.id).copied().unwrap_or(0.0))
        .sum();
    let outsiders: f64 = catalog
        .outsiders_with(kind)
        .map(|def| def.effect.per_level * save.outsider_level(def.id).max(0.0))
        .sum();
    ancients + outsiders
}

/// log10 of the strongest hero's DPS, gilds included. `None` when the
/// save holds no hero that can deal damage.
fn log_best_hero(save: &SaveState, catalog: &GameCatalog, gild_factor: f64) -> Option<f64> {
    let mut best = 0.0f64;
    for (id, hero) in save.hero_collection.heroes.iter() {
        let def = match catalog.hero(*id) {
            Some(def) => def,
            None => {
                debug!("save references unknown hero {id}, skipped");
                continue;
            }
        };
        let dps =
            def.base_dps * hero.level.max(0.0) * (1.0 + gild_factor * f64::from(hero.epic_level));
        if dps > best {
            best = dps;
        }
    }
    if best > 0.0 {
        Some(best.log10())
    } else {
        None
    }
}

/// Held hero souls buff all damage. The bonus stays on the f64 path while
/// the balance fits, and falls back to the log-space tail for the saves
/// whose soul counts left f64 range long ago.
fn log_souls_bonus(souls: &BigNumber, per_soul: f64) -> f64 {
    if souls.signum() <= 0 || per_soul <= 0.0 {
        return 0.0;
    }
    if souls.fits_f64() {
        (1.0 + per_soul * souls.to_f64()).log10()
    } else {
        per_soul.log10() + souls.log10_abs()
    }
}

fn flag_multiplier<K>(flags: &IdMap<K, bool>, table: &HashMap<K, f64>) -> f64
where
    K: NumericId + Serialize,
{
    let mut product = 1.0;
    for (id, earned) in flags.iter() {
        if *earned {
            product *= table.get(id).copied().unwrap_or(1.0);
        }
    }
    product
}
