//! Ascension optimizer: finds the zone where souls per second of climb
//! peaks.
//!
//! The climb is modeled in closed form so a single evaluation is O(1) and
//! the objective is smooth. Clear times ramp geometrically until the wall
//! zone, then grow at the wall rate; soul payouts grow geometrically from
//! the souls start zone. The catalog validates the growth ordering that
//! makes souls-per-second unimodal, which is what lets a golden-section
//! search find the peak without a level-by-level sweep.

use crate::bignum::BigNumber;
use crate::catalog::{GameCatalog, ScalingConstants};
use crate::damage::BuildStats;
use crate::save::SaveState;
use crate::types::PlayStyle;
use log::debug;
use serde::Serialize;

/// Interval width at which the level search stops.
const LEVEL_TOLERANCE: f64 = 1e-6;
/// Iteration cap for the search loop. Generous: the window shrinks by the
/// golden ratio every step, so real searches finish in under fifty.
const MAX_ITERATIONS: u32 = 200;

/// Outcome of one optimizer run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    /// Zone to ascend at. Continuous: callers round for display.
    pub level: f64,
    /// Seconds to climb there.
    pub time: f64,
    /// Souls banked by ascending there.
    pub reward: BigNumber,
    /// Souls per second of climb.
    pub rate: f64,
}

impl SimulationResult {
    /// Result for a build that cannot make progress at all.
    pub fn no_progress() -> SimulationResult {
        SimulationResult {
            level: 0.0,
            time: 0.0,
            reward: BigNumber::zero(),
            rate: 0.0,
        }
    }

    pub fn is_no_progress(&self) -> bool {
        self.time == 0.0
    }
}

/// Continuous progression model for one derived build.
#[derive(Debug, Clone, Copy)]
pub struct ClimbModel<'a> {
    stats: BuildStats,
    scaling: &'a ScalingConstants,
}

impl<'a> ClimbModel<'a> {
    pub fn new(stats: BuildStats, scaling: &'a ScalingConstants) -> ClimbModel<'a> {
        ClimbModel { stats, scaling }
    }

    /// log10 of the un-floored seconds to clear one monster at zone `z`.
    fn log_clear(&self, z: f64) -> f64 {
        let s = self.scaling;
        let ramp_zones = z.min(s.wall_zone) - 1.0;
        let wall_zones = (z - s.wall_zone).max(0.0);
        s.base_clear_seconds.log10() - self.stats.log_output
            + ramp_zones * s.ramp_growth.log10()
            + wall_zones * s.wall_growth.log10()
    }

    /// Seconds to climb from zone 1 to `level`, cadence floor included.
    pub fn time_to(&self, level: f64) -> f64 {
        let s = self.scaling;
        if level <= 1.0 {
            return 0.0;
        }
        let floor = s.min_clear_seconds;
        let ramp_end = level.min(s.wall_zone);
        let mut per_monster =
            seg_time(1.0, ramp_end, self.log_clear(1.0), s.ramp_growth.log10(), floor);
        if level > s.wall_zone {
            per_monster += seg_time(
                s.wall_zone,
                level,
                self.log_clear(s.wall_zone),
                s.wall_growth.log10(),
                floor,
            );
        }
        self.stats.monsters_per_zone * per_monster
    }

    /// log10 of the souls banked by climbing to `level`. Negative infinity
    /// below the souls start zone and for builds that cannot roll primals.
    fn log_reward(&self, level: f64) -> f64 {
        let s = self.scaling;
        if level <= s.souls_start_zone {
            return f64::NEG_INFINITY;
        }
        let density = self.stats.primal_chance * self.stats.souls_multiplier
            * s.souls_per_boss_base
            / s.boss_interval;
        if density <= 0.0 {
            return f64::NEG_INFINITY;
        }
        let ln_growth = s.souls_growth.ln();
        let x = (level - s.souls_start_zone) * ln_growth;
        let log_integral = if x > 700.0 {
            // expm1 would overflow; the -1 is lost in the noise up here.
            x * std::f64::consts::LOG10_E - ln_growth.log10()
        } else {
            (x.exp_m1() / ln_growth).log10()
        };
        density.log10() + log_integral
    }

    /// Souls banked by climbing to `level`. Stays on the f64 fast path
    /// while the total fits, switches to the log-space construction for
    /// totals beyond f64 range.
    pub fn reward_to(&self, level: f64) -> BigNumber {
        let log_r = self.log_reward(level);
        if log_r == f64::NEG_INFINITY {
            return BigNumber::zero();
        }
        let candidate = BigNumber::exp10(log_r);
        if candidate.fits_f64() {
            match BigNumber::from_f64(10f64.powf(log_r)) {
                Some(exact) => exact,
                None => candidate,
            }
        } else {
            candidate
        }
    }

    /// Deepest zone whose boss dies inside the boss timer, capped at the
    /// catalog's zone limit. Zero when no boss is beatable.
    pub fn max_level(&self) -> f64 {
        let s = self.scaling;
        let target = (self.stats.boss_timer / self.stats.boss_hp_multiplier).log10();
        if s.min_clear_seconds.log10() > target {
            return 0.0;
        }
        let at_wall = self.log_clear(s.wall_zone);
        let cross = if at_wall > target {
            1.0 + (target - self.log_clear(1.0)) / s.ramp_growth.log10()
        } else {
            s.wall_zone + (target - at_wall) / s.wall_growth.log10()
        };
        cross.min(s.max_zone).max(0.0)
    }

    fn log_rate(&self, level: f64) -> f64 {
        let time = self.time_to(level);
        if time <= 0.0 {
            return f64::NEG_INFINITY;
        }
        self.log_reward(level) - time.log10()
    }
}

/// Seconds per monster integrated over zones `[a, b]`, where the raw clear
/// time is `10^log_r_a` at `a` and grows by `10^log_growth` per zone, and
/// no monster dies faster than `floor`.
fn seg_time(a: f64, b: f64, log_r_a: f64, log_growth: f64, floor: f64) -> f64 {
    if b <= a {
        return 0.0;
    }
    let k = log_growth * std::f64::consts::LN_10;
    let log_floor = floor.log10();
    if log_r_a >= log_floor {
        return 10f64.powf(log_r_a) * (k * (b - a)).exp_m1() / k;
    }
    let cross = a + (log_floor - log_r_a) / log_growth;
    if cross >= b {
        return floor * (b - a);
    }
    floor * (cross - a) + floor * (k * (b - cross)).exp_m1() / k
}

pub struct Optimizer<'a> {
    catalog: &'a GameCatalog,
}

impl<'a> Optimizer<'a> {
    pub fn new(catalog: &'a GameCatalog) -> Optimizer<'a> {
        Optimizer { catalog }
    }

    /// Best ascension level for this save under the given play style.
    ///
    /// Hybrid runs the idle and active projections separately and blends
    /// the two results by the active share.
    pub fn run(&self, save: &SaveState, style: PlayStyle) -> SimulationResult {
        match style {
            PlayStyle::Hybrid { .. } => {
                let idle = self.run_single(save, PlayStyle::Idle);
                let active = self.run_single(save, PlayStyle::Active);
                blend(&idle, &active, style.active_share())
            }
            _ => self.run_single(save, style),
        }
    }

    fn run_single(&self, save: &SaveState, style: PlayStyle) -> SimulationResult {
        let stats = BuildStats::derive(save, self.catalog, style);
        if stats.is_inert() {
            debug!("build deals no damage, reporting no progress");
            return SimulationResult::no_progress();
        }
        let model = ClimbModel::new(stats, &self.catalog.scaling);
        let lo = self.catalog.scaling.souls_start_zone;
        let hi = model.max_level();
        if hi <= lo || model.log_reward(hi) == f64::NEG_INFINITY {
            debug!("no reachable souls zone (window [{lo:.1}, {hi:.1}]), reporting no progress");
            return SimulationResult::no_progress();
        }
        let level = golden_section_max(lo, hi, |z| model.log_rate(z));
        let time = model.time_to(level);
        let reward = model.reward_to(level);
        let rate = rate_from(&reward, time);
        debug!("{style} optimum at level {level:.3}: {time:.1}s of climb, rate {rate:.3}/s");
        SimulationResult { level, time, reward, rate }
    }
}

/// Golden-section search for the maximum of a unimodal `f` on `[lo, hi]`.
fn golden_section_max<F: Fn(f64) -> f64>(mut lo: f64, mut hi: f64, f: F) -> f64 {
    let phi = (5f64.sqrt() - 1.0) / 2.0;
    let mut x1 = hi - phi * (hi - lo);
    let mut x2 = lo + phi * (hi - lo);
    let mut f1 = f(x1);
    let mut f2 = f(x2);
    let mut iterations = 0;
    while hi - lo > LEVEL_TOLERANCE && iterations < MAX_ITERATIONS {
        if f1 < f2 {
            lo = x1;
            x1 = x2;
            f1 = f2;
            x2 = lo + phi * (hi - lo);
            f2 = f(x2);
        } else {
            hi = x2;
            x2 = x1;
            f2 = f1;
            x1 = hi - phi * (hi - lo);
            f1 = f(x1);
        }
        iterations += 1;
    }
    debug!(
        "golden section stopped after {iterations} iterations, window {:.2e}",
        hi - lo
    );
    (lo + hi) / 2.0
}

/// Souls per second, switching off the f64 path when the reward outgrew it.
fn rate_from(reward: &BigNumber, time: f64) -> f64 {
    if time <= 0.0 {
        return 0.0;
    }
    if reward.fits_f64() {
        reward.to_f64() / time
    } else {
        10f64.powf(reward.log10_abs() - time.log10())
    }
}

/// Linear blend of an idle and an active projection. The reward mixes in
/// BigNumber arithmetic so nothing saturates when one side is huge.
fn blend(idle: &SimulationResult, active: &SimulationResult, active_share: f64) -> SimulationResult {
    if idle.is_no_progress() && active.is_no_progress() {
        return SimulationResult::no_progress();
    }
    let idle_share = 1.0 - active_share;
    let active_part = &active.reward * &BigNumber::from_f64(active_share).unwrap_or_default();
    let idle_part = &idle.reward * &BigNumber::from_f64(idle_share).unwrap_or_default();
    let reward = active_part + idle_part;
    let time = active_share * active.time + idle_share * idle.time;
    let level = active_share * active.level + idle_share * idle.level;
    let rate = rate_from(&reward, time);
    SimulationResult { level, time, reward, rate }
}
