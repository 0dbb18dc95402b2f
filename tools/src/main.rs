//! save-runner: command-line ascension advisor.
//!
//! Usage:
//!   save-runner path/to/save.txt
//!   save-runner path/to/save.txt --style hybrid --blend 0.7
//!   save-runner path/to/save.txt --catalog data/catalog.json --json

use anyhow::{bail, Context, Result};
use ascension_core::{
    catalog::GameCatalog,
    codec,
    optimizer::{Optimizer, SimulationResult},
    save::SaveState,
    types::{AncientId, PlayStyle},
};
use std::env;
use std::fs;

const USAGE: &str =
    "usage: save-runner <save-file> [--style idle|active|hybrid] [--blend W] [--catalog FILE] [--json]";

#[derive(serde::Serialize)]
struct RunReport<'a> {
    style: PlayStyle,
    hero_souls: String,
    souls_spent: String,
    highest_zone: f64,
    ascensions: u32,
    transcendent: bool,
    recommendation: &'a SimulationResult,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let path = match save_path(&args) {
        Some(path) => path,
        None => {
            eprintln!("{USAGE}");
            bail!("missing save file argument");
        }
    };
    let style_name = args
        .windows(2)
        .find(|w| w[0] == "--style")
        .map(|w| w[1].as_str())
        .unwrap_or("idle");
    let blend = parse_arg(&args, "--blend", PlayStyle::DEFAULT_ACTIVE_WEIGHT);
    let style = match style_name {
        "idle" => PlayStyle::Idle,
        "active" => PlayStyle::Active,
        "hybrid" => PlayStyle::Hybrid { active_weight: blend },
        other => bail!("unknown play style {other:?} (expected idle, active, or hybrid)"),
    };
    if style_name != "hybrid" && args.iter().any(|a| a == "--blend") {
        log::warn!("--blend only applies to --style hybrid, ignoring");
    }
    let json_mode = args.iter().any(|a| a == "--json");

    let catalog = match args.windows(2).find(|w| w[0] == "--catalog") {
        Some(w) => GameCatalog::load(&w[1])?,
        None => GameCatalog::builtin(),
    };

    let encoded = fs::read_to_string(path).with_context(|| format!("reading save file {path}"))?;
    // Rejections are the player's problem and get a one-line verdict;
    // anything else that fails is ours and keeps its error chain.
    let save = match codec::parse_save(encoded.trim()) {
        Ok(save) => save,
        Err(err) => bail!("save rejected: {err}"),
    };

    let result = Optimizer::new(&catalog).run(&save, style);

    if json_mode {
        let report = RunReport {
            style,
            hero_souls: format!("{:E}", save.hero_souls),
            souls_spent: format!("{:E}", save.total_souls_spent()),
            highest_zone: save.highest_finished_zone,
            ascensions: save.total_ascensions,
            transcendent: save.transcendent,
            recommendation: &result,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&catalog, &save, style, &result);
    }

    Ok(())
}

fn print_summary(
    catalog: &GameCatalog,
    save: &SaveState,
    style: PlayStyle,
    result: &SimulationResult,
) {
    println!("=== SAVE OVERVIEW ===");
    println!("  hero souls:     {:E}", save.hero_souls);
    println!("  souls spent:    {:E}", save.total_souls_spent());
    println!("  titan damage:   {:E}", save.titan_damage);
    println!("  ancients:       {}", save.ancients.ancients.len());
    println!("  outsiders:      {}", save.outsiders.outsiders.len());
    println!("  heroes:         {}", save.hero_collection.heroes.len());
    println!("  achievements:   {}", save.achievements.len());
    println!("  highest zone:   {}", save.highest_finished_zone);
    println!(
        "  ascensions:     {} ({} this transcension)",
        save.total_ascensions, save.ascensions_this_transcension
    );
    println!("  transcendent:   {}", save.transcendent);
    println!("  rubies:         {}", save.rubies);
    let mut leveled: Vec<AncientId> = save.ancients.ancients.keys().copied().collect();
    if !leveled.is_empty() {
        leveled.sort_unstable();
        println!();
        println!("=== ANCIENTS ===");
        for id in leveled {
            let name = catalog
                .ancient(id)
                .map(|def| def.name.as_str())
                .unwrap_or("unknown ancient");
            println!("  {name}: level {}", save.ancient_level(id));
        }
    }
    println!();
    println!("=== ASCENSION PLAN ({style}) ===");
    if result.is_no_progress() {
        println!("  this build cannot reach a souls zone yet");
        println!("  level heroes and push zones before ascending");
    } else {
        println!("  ascend at zone: {:.0}", result.level);
        println!("  climb time:     {}", fmt_duration(result.time));
        println!("  souls earned:   {:E}", result.reward);
        println!("  souls/second:   {:.3}", result.rate);
    }
}

fn fmt_duration(seconds: f64) -> String {
    let total = seconds.round() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{hours}h {minutes:02}m {secs:02}s ({seconds:.1}s)")
    } else if minutes > 0 {
        format!("{minutes}m {secs:02}s ({seconds:.1}s)")
    } else {
        format!("{seconds:.1}s")
    }
}

/// First argument that is neither a flag nor a flag's value.
fn save_path(args: &[String]) -> Option<&str> {
    let mut i = 1;
    while i < args.len() {
        let arg = &args[i];
        if arg == "--style" || arg == "--blend" || arg == "--catalog" {
            i += 2;
            continue;
        }
        if arg.starts_with("--") {
            i += 1;
            continue;
        }
        return Some(arg);
    }
    None
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
