//! The per-player generation pipeline.
//!
//! Generation runs as a chain of stages, each one consuming the previous
//! and returning the next:
//!
//! ```text
//! ValidatedOptions -> ChosenClass -> WeaponPool -> ObjectiveSet -> GeneratedSlot
//! ```
//!
//! Each stage owns everything decided so far, so out-of-order use does not
//! compile: the weapon pool cannot be computed before the starting class is
//! resolved (melee rules depend on it), and the contract point threshold
//! only exists on [`GeneratedSlot`], after the objective count is final.

use std::collections::BTreeMap;
use std::io::{self, Write};

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::data::{Catalog, TfClass, WeaponEntry};
use crate::items::{self, Item, CONTRACT_POINT};
use crate::options::{MeleeWeaponRules, ValidatedOptions};
use crate::regions::{self, Location};
use crate::{GenerateError, Result};

impl ValidatedOptions {
    /// First stage: fix the starting class.
    ///
    /// An explicit, recognised class wins outright, even over the allowed
    /// list. Otherwise one is drawn uniformly from the allowed classes;
    /// this must be the first draw a player's stream makes, so the chosen
    /// class for a given seed never shifts when later stages change. With
    /// no explicit class and an empty allowed list there is nothing to
    /// draw from and generation fails.
    ///
    /// The resolved class is granted as a pre-collected unlock, carried on
    /// the stage so it can never be placed at a location.
    pub fn resolve_starting_class(self, player: &str, rng: &mut StdRng) -> Result<ChosenClass> {
        let starting_class = if self.starting_class != TfClass::Unknown {
            self.starting_class
        } else if self.allowed_classes.is_empty() {
            return Err(GenerateError::NoStartingClass {
                player: player.to_string(),
            });
        } else {
            self.allowed_classes[rng.gen_range(0..self.allowed_classes.len())]
        };
        let precollected = items::create_item(starting_class.display_name())?;
        Ok(ChosenClass {
            player: player.to_string(),
            options: self,
            starting_class,
            precollected,
        })
    }
}

/// Stage two: options plus a resolved starting class.
#[derive(Debug, Clone)]
pub struct ChosenClass {
    player: String,
    options: ValidatedOptions,
    starting_class: TfClass,
    precollected: Item,
}

impl ChosenClass {
    pub fn starting_class(&self) -> TfClass {
        self.starting_class
    }

    /// Second stage: derive the weapon pool.
    ///
    /// A weapon makes the pool when its class is allowed (class-agnostic
    /// weapons always pass), it is not banned, and the melee rules admit
    /// it. No randomness here: the pool is a pure function of options,
    /// catalog and starting class.
    pub fn compute_available_weapons(self, catalog: &Catalog) -> WeaponPool {
        let mut available = Vec::new();
        for weapon in catalog.weapons() {
            let class_allowed = match weapon.class {
                None => true,
                Some(class) => self.options.allowed_classes.contains(&class),
            };
            if !class_allowed {
                continue;
            }
            if self.options.banned_weapons.contains(weapon.name) {
                continue;
            }
            if !admitted_by_melee_rules(
                self.options.melee_weapon_rules,
                catalog,
                weapon,
                self.starting_class,
            ) {
                continue;
            }
            available.push(weapon);
        }
        WeaponPool {
            player: self.player,
            options: self.options,
            starting_class: self.starting_class,
            precollected: self.precollected,
            available_weapons: available,
        }
    }
}

/// The melee-rules filter needs the starting class: under `MeleeOnly` the
/// starting class keeps its full kit so the player always has something
/// to play the early game with.
fn admitted_by_melee_rules(
    rules: MeleeWeaponRules,
    catalog: &Catalog,
    weapon: &WeaponEntry,
    starting_class: TfClass,
) -> bool {
    match rules {
        MeleeWeaponRules::Off => true,
        MeleeWeaponRules::MeleeOnly => {
            weapon.class == Some(starting_class) || catalog.is_melee(weapon.name)
        }
        MeleeWeaponRules::NoSwordsOrKnives => {
            !catalog.is_knife(weapon.name) && !catalog.is_sword(weapon.name)
        }
    }
}

/// Stage three: the weapon pool is fixed.
#[derive(Debug, Clone)]
pub struct WeaponPool {
    player: String,
    options: ValidatedOptions,
    starting_class: TfClass,
    precollected: Item,
    available_weapons: Vec<&'static WeaponEntry>,
}

impl WeaponPool {
    pub fn available_weapons(&self) -> &[&'static WeaponEntry] {
        &self.available_weapons
    }

    /// Third stage: realise locations and draw kill targets.
    pub fn create_objectives(self, catalog: &Catalog, rng: &mut StdRng) -> Result<ObjectiveSet> {
        let bundle = regions::build_objectives(
            catalog,
            &self.available_weapons,
            &self.options.allowed_classes,
            rng,
        )?;
        Ok(ObjectiveSet {
            player: self.player,
            options: self.options,
            starting_class: self.starting_class,
            precollected: self.precollected,
            available_weapons: self.available_weapons,
            locations: bundle.locations,
            total_objectives: bundle.total_objectives,
            weapon_kill_counts: bundle.weapon_kill_counts,
            class_kill_counts: bundle.class_kill_counts,
        })
    }
}

/// Stage four: objectives and their kill targets are final.
#[derive(Debug, Clone)]
pub struct ObjectiveSet {
    player: String,
    options: ValidatedOptions,
    starting_class: TfClass,
    precollected: Item,
    available_weapons: Vec<&'static WeaponEntry>,
    locations: Vec<Location>,
    total_objectives: u32,
    weapon_kill_counts: BTreeMap<String, u32>,
    class_kill_counts: BTreeMap<String, u32>,
}

impl ObjectiveSet {
    pub fn total_objectives(&self) -> u32 {
        self.total_objectives
    }

    /// Final stage: build the item pool and seal the slot.
    pub fn create_itempool(self) -> Result<GeneratedSlot> {
        let total_locations = self.locations.len() as u32;
        let itempool = items::build_itempool(
            &self.player,
            &self.available_weapons,
            &self.options.allowed_classes,
            self.starting_class,
            self.total_objectives,
            total_locations,
        )?;
        Ok(GeneratedSlot {
            player: self.player,
            starting_class: self.starting_class,
            precollected: self.precollected,
            available_weapons: self.available_weapons,
            locations: self.locations,
            itempool,
            total_objectives: self.total_objectives,
            total_locations,
            weapon_kill_counts: self.weapon_kill_counts,
            class_kill_counts: self.class_kill_counts,
            contract_point_requirement: self.options.contract_point_requirement,
            death_link: self.options.death_link,
            death_link_amnesty: self.options.death_link_amnesty,
        })
    }
}

/// Integer percentage floor. 7 objectives at 50% need 3 points, not 4.
pub(crate) fn contract_points_required(total_objectives: u32, percentage: u32) -> u32 {
    total_objectives * percentage / 100
}

/// A fully generated slot. Everything a host or client needs to know about
/// one player's game lives here; nothing can be changed any more.
#[derive(Debug, Clone)]
pub struct GeneratedSlot {
    player: String,
    starting_class: TfClass,
    precollected: Item,
    available_weapons: Vec<&'static WeaponEntry>,
    locations: Vec<Location>,
    itempool: Vec<Item>,
    total_objectives: u32,
    total_locations: u32,
    weapon_kill_counts: BTreeMap<String, u32>,
    class_kill_counts: BTreeMap<String, u32>,
    contract_point_requirement: u32,
    death_link: bool,
    death_link_amnesty: u32,
}

impl GeneratedSlot {
    pub fn player(&self) -> &str {
        &self.player
    }

    pub fn starting_class(&self) -> TfClass {
        self.starting_class
    }

    /// The unlock granted before play begins. Not part of the item pool.
    pub fn precollected(&self) -> &Item {
        &self.precollected
    }

    pub fn available_weapons(&self) -> &[&'static WeaponEntry] {
        &self.available_weapons
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn itempool(&self) -> &[Item] {
        &self.itempool
    }

    pub fn total_objectives(&self) -> u32 {
        self.total_objectives
    }

    pub fn total_locations(&self) -> u32 {
        self.total_locations
    }

    pub fn death_link(&self) -> bool {
        self.death_link
    }

    /// Contract Points needed to finish, floored from the objective count.
    pub fn required_contract_points(&self) -> u32 {
        contract_points_required(self.total_objectives, self.contract_point_requirement)
    }

    /// The predicate the host registers for this slot.
    pub fn completion_condition(&self) -> CompletionCondition {
        CompletionCondition {
            item: CONTRACT_POINT.to_string(),
            required: self.required_contract_points(),
        }
    }

    /// Assemble the slot data handed to this player's client.
    pub fn fill_slot_data(&self) -> SlotData {
        SlotData {
            weapon_kill_counts: self.weapon_kill_counts.clone(),
            class_kill_counts: self.class_kill_counts.clone(),
            required_contract_points: self.required_contract_points(),
            death_link_amnesty: self.death_link_amnesty,
            death_link: self.death_link,
        }
    }

    /// The slot's section of the spoiler log: three lines, the last one
    /// left unterminated for the caller to finish.
    pub fn write_spoiler<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Total Weapons: {}", self.available_weapons.len())?;
        writeln!(out, "Total Objectives: {}", self.total_objectives)?;
        write!(
            out,
            "Contract Points Required: {}",
            self.required_contract_points()
        )
    }
}

/// What a client needs beyond the placements: kill targets, the finish
/// line and the death link settings. Key names are part of the client
/// protocol; do not rename them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotData {
    #[serde(rename = "WeaponKillCounts")]
    pub weapon_kill_counts: BTreeMap<String, u32>,
    #[serde(rename = "ClassKillCounts")]
    pub class_kill_counts: BTreeMap<String, u32>,
    #[serde(rename = "RequiredContractPoints")]
    pub required_contract_points: u32,
    #[serde(rename = "DeathLinkAmnesty")]
    pub death_link_amnesty: u32,
    #[serde(rename = "DeathLink")]
    pub death_link: bool,
}

/// Completion predicate for one slot: enough Contract Points collected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionCondition {
    pub item: String,
    pub required: u32,
}

impl CompletionCondition {
    pub fn is_met(&self, progress: &Progress) -> bool {
        progress.has(&self.item, self.required)
    }
}

/// Item counts for one player as the host tracks them at runtime.
#[derive(Debug, Clone, Default)]
pub struct Progress {
    counts: BTreeMap<String, u32>,
}

impl Progress {
    pub fn collect(&mut self, item_name: &str) {
        *self.counts.entry(item_name.to_string()).or_insert(0) += 1;
    }

    pub fn count(&self, item_name: &str) -> u32 {
        self.counts.get(item_name).copied().unwrap_or(0)
    }

    pub fn has(&self, item_name: &str, required: u32) -> bool {
        self.count(item_name) >= required
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::ItemKind;
    use crate::options::PlayerOptions;
    use rand::SeedableRng;

    fn generate(
        options: PlayerOptions,
        catalog: &Catalog,
        rng: &mut StdRng,
    ) -> Result<GeneratedSlot> {
        options
            .validated(catalog)?
            .resolve_starting_class("alice", rng)?
            .compute_available_weapons(catalog)
            .create_objectives(catalog, rng)?
            .create_itempool()
    }

    #[test]
    fn threshold_floors_the_percentage() {
        assert_eq!(contract_points_required(200, 50), 100);
        assert_eq!(contract_points_required(7, 50), 3);
        assert_eq!(contract_points_required(7, 100), 7);
        assert_eq!(contract_points_required(7, 0), 0);
        assert_eq!(contract_points_required(0, 100), 0);
    }

    #[test]
    fn same_seed_resolves_same_class() {
        let catalog = Catalog::new();
        let options = PlayerOptions::default();
        let mut first = StdRng::seed_from_u64(1234);
        let mut second = StdRng::seed_from_u64(1234);
        let a = generate(options.clone(), &catalog, &mut first).unwrap();
        let b = generate(options, &catalog, &mut second).unwrap();
        assert_eq!(a.starting_class(), b.starting_class());
        assert_eq!(a.precollected(), b.precollected());
    }

    #[test]
    fn explicit_class_beats_the_draw() {
        let catalog = Catalog::new();
        let options = PlayerOptions {
            starting_class: "Spy".to_string(),
            allowed_classes: vec!["Scout".to_string(), "Soldier".to_string()],
            ..PlayerOptions::default()
        };
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let slot = generate(options.clone(), &catalog, &mut rng).unwrap();
            assert_eq!(slot.starting_class(), TfClass::Spy);
        }
    }

    #[test]
    fn drawn_class_comes_from_allowed_list() {
        let catalog = Catalog::new();
        let options = PlayerOptions {
            allowed_classes: vec!["Medic".to_string(), "Sniper".to_string()],
            ..PlayerOptions::default()
        };
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let slot = generate(options.clone(), &catalog, &mut rng).unwrap();
            assert!(matches!(
                slot.starting_class(),
                TfClass::Medic | TfClass::Sniper
            ));
        }
    }

    #[test]
    fn empty_allowed_list_without_explicit_class_fails() {
        let catalog = Catalog::new();
        let options = PlayerOptions {
            allowed_classes: Vec::new(),
            ..PlayerOptions::default()
        };
        let mut rng = StdRng::seed_from_u64(5);
        let err = generate(options, &catalog, &mut rng).unwrap_err();
        match err {
            GenerateError::NoStartingClass { player } => assert_eq!(player, "alice"),
            other => panic!("expected missing starting class, got {other:?}"),
        }
    }

    #[test]
    fn explicit_class_saves_an_empty_allowed_list() {
        let catalog = Catalog::new();
        let options = PlayerOptions {
            allowed_classes: Vec::new(),
            starting_class: "Heavy".to_string(),
            ..PlayerOptions::default()
        };
        let mut rng = StdRng::seed_from_u64(5);
        let slot = generate(options, &catalog, &mut rng).unwrap();
        assert_eq!(slot.starting_class(), TfClass::Heavy);
    }

    #[test]
    fn banned_weapons_never_reach_the_pool() {
        let catalog = Catalog::new();
        let banned = ["Scattergun", "Minigun", "Frying Pan", "Knife"];
        let options = PlayerOptions {
            banned_weapons: banned.iter().map(|s| s.to_string()).collect(),
            ..PlayerOptions::default()
        };
        let mut rng = StdRng::seed_from_u64(99);
        let slot = generate(options, &catalog, &mut rng).unwrap();
        for weapon in slot.available_weapons() {
            assert!(!banned.contains(&weapon.name), "{} was banned", weapon.name);
        }
        for item in slot.itempool() {
            assert!(!banned.contains(&item.name.as_str()), "{} was banned", item.name);
        }
    }

    #[test]
    fn disallowed_class_weapons_are_excluded() {
        let catalog = Catalog::new();
        let options = PlayerOptions {
            allowed_classes: vec!["Scout".to_string()],
            ..PlayerOptions::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let slot = generate(options, &catalog, &mut rng).unwrap();
        for weapon in slot.available_weapons() {
            assert!(
                weapon.class == Some(TfClass::Scout) || weapon.class.is_none(),
                "{} belongs to a disallowed class",
                weapon.name
            );
        }
        // class-agnostic weapons still make it in
        assert!(slot.available_weapons().iter().any(|w| w.name == "Frying Pan"));
    }

    #[test]
    fn melee_only_keeps_the_starting_class_kit() {
        let catalog = Catalog::new();
        let options = PlayerOptions {
            starting_class: "Soldier".to_string(),
            melee_weapon_rules: MeleeWeaponRules::MeleeOnly,
            ..PlayerOptions::default()
        };
        let mut rng = StdRng::seed_from_u64(42);
        let slot = generate(options, &catalog, &mut rng).unwrap();
        let names: Vec<&str> = slot.available_weapons().iter().map(|w| w.name).collect();
        // soldier primaries survive, other classes' ranged weapons do not
        assert!(names.contains(&"Rocket Launcher"));
        assert!(names.contains(&"Shovel"));
        assert!(names.contains(&"Knife"));
        assert!(!names.contains(&"Scattergun"));
        assert!(!names.contains(&"Minigun"));
    }

    #[test]
    fn no_swords_or_knives_strips_both_groups() {
        let catalog = Catalog::new();
        let options = PlayerOptions {
            melee_weapon_rules: MeleeWeaponRules::NoSwordsOrKnives,
            ..PlayerOptions::default()
        };
        let mut rng = StdRng::seed_from_u64(42);
        let slot = generate(options, &catalog, &mut rng).unwrap();
        for weapon in slot.available_weapons() {
            assert!(!catalog.is_knife(weapon.name), "{} is a knife", weapon.name);
            assert!(!catalog.is_sword(weapon.name), "{} is a sword", weapon.name);
        }
        let names: Vec<&str> = slot.available_weapons().iter().map(|w| w.name).collect();
        assert!(!names.contains(&"Eyelander"));
        assert!(!names.contains(&"Knife"));
        assert!(names.contains(&"Bottle"));
    }

    #[test]
    fn pool_matches_location_count() {
        let catalog = Catalog::new();
        let shapes = [
            PlayerOptions::default(),
            PlayerOptions {
                allowed_classes: vec!["Pyro".to_string()],
                ..PlayerOptions::default()
            },
            PlayerOptions {
                banned_weapons: vec!["Scattergun".to_string(), "Bat".to_string()],
                melee_weapon_rules: MeleeWeaponRules::MeleeOnly,
                ..PlayerOptions::default()
            },
        ];
        for (seed, options) in shapes.into_iter().enumerate() {
            let mut rng = StdRng::seed_from_u64(seed as u64);
            let slot = generate(options, &catalog, &mut rng).unwrap();
            assert_eq!(slot.itempool().len(), slot.locations().len());
            assert_eq!(slot.total_locations() as usize, slot.locations().len());
        }
    }

    #[test]
    fn pool_contains_a_point_per_objective_and_no_starting_class() {
        let catalog = Catalog::new();
        let options = PlayerOptions {
            starting_class: "Engineer".to_string(),
            ..PlayerOptions::default()
        };
        let mut rng = StdRng::seed_from_u64(17);
        let slot = generate(options, &catalog, &mut rng).unwrap();

        let points = slot
            .itempool()
            .iter()
            .filter(|item| item.name == CONTRACT_POINT)
            .count();
        assert_eq!(points as u32, slot.total_objectives());
        assert!(slot.itempool().iter().all(|item| item.name != "Engineer"));
        // the other eight class unlocks are all present
        let class_unlocks = slot
            .itempool()
            .iter()
            .filter(|item| TfClass::parse(&item.name) != TfClass::Unknown)
            .count();
        assert_eq!(class_unlocks, 8);
        assert_eq!(slot.precollected().name, "Engineer");
        assert_eq!(slot.precollected().kind, ItemKind::Progression);
    }

    #[test]
    fn full_requirement_needs_every_objective() {
        let catalog = Catalog::new();
        let options = PlayerOptions {
            allowed_classes: vec!["Scout".to_string(), "Soldier".to_string()],
            contract_point_requirement: 100,
            ..PlayerOptions::default()
        };
        let mut rng = StdRng::seed_from_u64(2026);
        let slot = generate(options, &catalog, &mut rng).unwrap();
        assert_eq!(slot.required_contract_points(), slot.total_objectives());
        let points = slot
            .itempool()
            .iter()
            .filter(|item| item.name == CONTRACT_POINT)
            .count();
        assert_eq!(points as u32, slot.required_contract_points());
    }

    #[test]
    fn completion_flips_exactly_at_the_threshold() {
        let catalog = Catalog::new();
        let mut rng = StdRng::seed_from_u64(31);
        let slot = generate(PlayerOptions::default(), &catalog, &mut rng).unwrap();
        let condition = slot.completion_condition();
        let required = slot.required_contract_points();
        assert!(required > 0);

        let mut progress = Progress::default();
        for _ in 0..required - 1 {
            progress.collect(CONTRACT_POINT);
        }
        assert!(!condition.is_met(&progress));
        progress.collect(CONTRACT_POINT);
        assert!(condition.is_met(&progress));
    }

    #[test]
    fn slot_data_uses_the_protocol_key_names() {
        let catalog = Catalog::new();
        let mut rng = StdRng::seed_from_u64(8);
        let slot = generate(PlayerOptions::default(), &catalog, &mut rng).unwrap();
        let value = serde_json::to_value(slot.fill_slot_data()).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 5);
        assert!(object["WeaponKillCounts"].is_object());
        assert!(object["ClassKillCounts"].is_object());
        assert!(object["RequiredContractPoints"].is_u64());
        assert!(object["DeathLinkAmnesty"].is_u64());
        assert!(object["DeathLink"].is_boolean());
        assert_eq!(object["DeathLinkAmnesty"], 10);
        assert_eq!(object["DeathLink"], false);
    }

    #[test]
    fn spoiler_section_reports_the_totals() {
        let catalog = Catalog::new();
        let mut rng = StdRng::seed_from_u64(55);
        let slot = generate(PlayerOptions::default(), &catalog, &mut rng).unwrap();
        let mut buffer = Vec::new();
        slot.write_spoiler(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains(&format!(
            "Total Weapons: {}",
            slot.available_weapons().len()
        )));
        assert!(text.contains(&format!("Total Objectives: {}", slot.total_objectives())));
        assert!(text.contains(&format!(
            "Contract Points Required: {}",
            slot.required_contract_points()
        )));
    }
}
