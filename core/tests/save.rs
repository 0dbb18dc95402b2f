//! Damage-tolerant save deserialization tests.
//!
//! The contract under test: any JSON object yields a usable `SaveState`,
//! corrupt fields fall back to their defaults one at a time, and junk
//! entries inside id-keyed maps are dropped without dragging down their
//! neighbors.

use ascension_core::bignum::BigNumber;
use ascension_core::save::SaveState;
use ascension_core::types::{AncientId, HeroId, ItemBonusType, OutsiderId};
use std::sync::Mutex;

const FIXTURE_JSON: &str = include_str!("data/midgame.json");

/// An empty object is a valid save with every field at its default.
#[test]
fn empty_object_yields_all_defaults() {
    let save = SaveState::deserialize("{}").expect("{} is a valid document");

    assert!(save.ancients.ancients.is_empty());
    assert!(save.items.slots.is_empty() && save.items.items.is_empty());
    assert!(save.outsiders.outsiders.is_empty());
    assert!(save.hero_collection.heroes.is_empty());
    assert!(save.achievements.is_empty() && save.upgrades.is_empty());
    assert!(save.hero_souls.is_zero());
    assert!(save.titan_damage.is_zero());
    assert_eq!(save.rubies, 0);
    assert_eq!(save.total_ascensions, 0);
    assert!(!save.transcendent);
    assert_eq!(save.highest_finished_zone, 0.0);
    assert!(save.total_souls_spent().is_zero());
}

/// Only a document that is not a JSON object at the top level fails.
#[test]
fn non_object_documents_yield_none() {
    for doc in ["", "not json", "[1,2,3]", "\"quoted\"", "42", "true", "null"] {
        assert!(
            SaveState::deserialize(doc).is_none(),
            "Document {doc:?} should not deserialize"
        );
    }
}

/// A corrupt field falls back to its default without dragging down the rest.
#[test]
fn corrupt_field_defaults_that_field_only() {
    let save = SaveState::deserialize(
        r#"{
            "ancients": {"ancients": {"5": {"level": 8, "spentHeroSouls": "36"}}},
            "heroSouls": {"definitely": "not a number"},
            "rubies": [1, 2],
            "transcendent": "yes"
        }"#,
    )
    .expect("an object document must deserialize");

    assert_eq!(save.ancient_level(AncientId(5)), 8.0);
    let spent = &save.ancients.ancients.get(&AncientId(5)).unwrap().spent_hero_souls;
    assert_eq!(*spent, BigNumber::from(36u32));
    assert!(save.hero_souls.is_zero(), "Corrupt heroSouls falls back to zero");
    assert_eq!(save.rubies, 0, "Corrupt rubies falls back to zero");
    assert!(!save.transcendent, "Corrupt flag falls back to false");
}

/// Whole blocks of the wrong shape are dropped, not fatal.
#[test]
fn wrong_shape_blocks_are_dropped() {
    let save = SaveState::deserialize(
        r#"{"items": 3, "outsiders": [true], "heroCollection": "gone", "heroSouls": "450"}"#,
    )
    .expect("an object document must deserialize");

    assert!(save.items.items.is_empty());
    assert!(save.outsiders.outsiders.is_empty());
    assert!(save.hero_collection.heroes.is_empty());
    assert_eq!(
        save.hero_souls,
        BigNumber::from(450u32),
        "Healthy fields still load around the dropped blocks"
    );
}

/// Map entries with unusable keys or values are skipped one by one.
#[test]
fn junk_map_entries_are_skipped() {
    let save = SaveState::deserialize(
        r#"{
            "ancients": {"ancients": {
                "banana": {"level": 4},
                "-3": {"level": 4},
                "7": {"level": 4}
            }},
            "heroCollection": {"heroes": {
                "1": "not an object",
                "2": {"level": 9, "epicLevel": 2}
            }}
        }"#,
    )
    .expect("an object document must deserialize");

    assert_eq!(save.ancients.ancients.len(), 1, "Only the numeric key survives");
    assert_eq!(save.ancient_level(AncientId(7)), 4.0);
    assert_eq!(save.hero_collection.heroes.len(), 1);
    let hero = save.hero_collection.heroes.get(&HeroId(2)).unwrap();
    assert_eq!((hero.level, hero.epic_level), (9.0, 2));
}

/// Numeric literals wider than f64 survive to BigNumber exactly.
#[test]
fn oversized_numeric_literals_survive_exactly() {
    let digits = "123456789012345678901234567890123456789";
    let save = SaveState::deserialize(&format!(
        r#"{{"heroSouls": {digits}, "titanDamage": "2.75e30008"}}"#
    ))
    .expect("an object document must deserialize");

    assert_eq!(save.hero_souls, BigNumber::parse(digits).unwrap());
    assert_eq!(
        format!("{:E}", save.hero_souls),
        "1.234568E+038",
        "All 39 digits reached the mantissa, not an f64 detour"
    );
    assert_eq!(save.titan_damage, BigNumber::parse("2.75e30008").unwrap());
}

/// Numeric fields with runaway exponents are hostile text; they default
/// like any other corrupt field instead of breaking the document.
#[test]
fn runaway_exponents_default_cleanly() {
    let save = SaveState::deserialize(
        r#"{
            "heroSouls": "1e9223372036854775807",
            "titanDamage": 1.5e-9223372036854775808,
            "ancients": {"ancients": {"5": {"level": 8, "spentHeroSouls": "1e99999999999"}}}
        }"#,
    )
    .expect("an object document must deserialize");

    assert!(save.hero_souls.is_zero(), "Runaway heroSouls falls back to zero");
    assert!(save.titan_damage.is_zero());
    assert_eq!(save.ancient_level(AncientId(5)), 8.0);
    assert!(save.total_souls_spent().is_zero());
}

/// Levels sometimes arrive as stringified numbers; they still count.
#[test]
fn stringified_numbers_are_accepted() {
    let save = SaveState::deserialize(
        r#"{
            "ancients": {"ancients": {"5": {"level": "12.5"}}},
            "highestFinishedZonePersist": "1984"
        }"#,
    )
    .expect("an object document must deserialize");

    assert_eq!(save.ancient_level(AncientId(5)), 12.5);
    assert_eq!(save.highest_finished_zone, 1984.0);
}

/// Bonus levels count only for items sitting in an equipment slot, and a
/// junk bonus type drops that bonus alone.
#[test]
fn equipped_bonus_levels_ignore_stash_items() {
    let save = SaveState::deserialize(
        r#"{"items": {
            "slots": {"1": 101, "2": 102, "3": 104},
            "items": {
                "101": {"bonusType1": 1, "bonus1Level": 4, "bonusType2": 8, "bonus2Level": 10},
                "102": {"bonusType1": 1, "bonus1Level": 2.5},
                "103": {"bonusType1": 1, "bonus1Level": 9000},
                "104": {"bonusType1": "junk", "bonus1Level": 50}
            }
        }}"#,
    )
    .expect("an object document must deserialize");

    let bonuses = save.equipped_bonus_levels();
    assert_eq!(
        bonuses.get(&ItemBonusType(1)).copied(),
        Some(6.5),
        "Equipped items 101 and 102 contribute, stash item 103 does not"
    );
    assert_eq!(bonuses.get(&ItemBonusType(8)).copied(), Some(10.0));
    assert_eq!(bonuses.len(), 2, "The junk bonus type on item 104 counts nowhere");
}

/// Souls sunk into ancients accumulate across the whole roster.
#[test]
fn total_souls_spent_accumulates() {
    let save = SaveState::deserialize(
        r#"{"ancients": {"ancients": {
            "5": {"level": 8, "spentHeroSouls": "1e3"},
            "19": {"level": 2, "spentHeroSouls": 25}
        }}}"#,
    )
    .expect("an object document must deserialize");

    assert_eq!(save.total_souls_spent(), BigNumber::from(1025u32));
}

// ── Log capture ────────────────────────────────────────────

static RECORDS: Mutex<Vec<(log::Level, String)>> = Mutex::new(Vec::new());

struct RecordingLogger;

impl log::Log for RecordingLogger {
    fn enabled(&self, _: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        RECORDS
            .lock()
            .unwrap()
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

static RECORDER: RecordingLogger = RecordingLogger;

/// Losing a whole block is reported at warn level; single-field fallbacks
/// stay down at debug.
#[test]
fn dropped_blocks_are_logged_at_warn() {
    log::set_logger(&RECORDER).expect("no other logger is installed in this binary");
    log::set_max_level(log::LevelFilter::Debug);

    let save = SaveState::deserialize(r#"{"ancients": 7, "rubies": "lots"}"#)
        .expect("an object document must deserialize");
    assert!(save.ancients.ancients.is_empty());
    assert_eq!(save.rubies, 0);

    let records = RECORDS.lock().unwrap();
    assert!(
        records
            .iter()
            .any(|(level, text)| *level == log::Level::Warn && text.contains("AncientsBlock")),
        "Expected a warn record for the dropped ancients block, got {records:?}"
    );
    assert!(
        records
            .iter()
            .any(|(level, text)| *level == log::Level::Debug && text.contains("\"lots\"")),
        "Expected the field fallback to stay at debug, got {records:?}"
    );
}

/// The recorded midgame fixture loads with every field populated.
#[test]
fn midgame_fixture_loads_fully() {
    let save = SaveState::deserialize(FIXTURE_JSON.trim()).expect("fixture should deserialize");

    assert_eq!(save.ancients.ancients.len(), 6);
    assert_eq!(save.ancient_level(AncientId(5)), 8.0);
    assert_eq!(save.ancient_level(AncientId(19)), 25.0);
    assert_eq!(save.outsider_level(OutsiderId(5)), 4.0);
    assert_eq!(save.hero_collection.heroes.len(), 2);
    let gilds = save.hero_collection.heroes.get(&HeroId(2)).map(|h| h.epic_level);
    assert_eq!(gilds, Some(1));
    assert_eq!(save.hero_souls, BigNumber::from(11u32));
    assert_eq!(save.titan_damage, BigNumber::parse("4.5e12").unwrap());
    assert_eq!(save.total_souls_spent(), BigNumber::from(1001u32));
    assert_eq!(save.ascensions_this_transcension, 27);
    assert_eq!(save.total_ascensions, 31);
    assert_eq!(save.rubies, 42);
    assert!(save.transcendent);
    assert_eq!(save.highest_finished_zone, 1984.0);
    assert_eq!(save.achievements.len(), 4);
    assert_eq!(save.upgrades.len(), 2);
}
