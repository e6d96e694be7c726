//! A whole generation session: many players, one seed.
//!
//! The session owns the catalog, runs the per-player pipeline for each
//! slot, then places every generated item at a generated location. Each
//! player draws from their own rng stream, derived from the session seed
//! and their name, so adding or removing a player never disturbs anyone
//! else's draws. The fill shuffle gets its own stream for the same reason.

use std::collections::BTreeMap;
use std::io::{self, Write};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;

use crate::data::Catalog;
use crate::items::{self, Item, ItemId};
use crate::options::PlayerOptions;
use crate::regions::{self, LocationId};
use crate::world::{CompletionCondition, GeneratedSlot, SlotData};
use crate::{GenerateError, Result};

/// A companion process the host can offer to launch for this game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClientComponent {
    pub name: &'static str,
    pub binary: &'static str,
    pub icon: &'static str,
}

/// The game's own client component.
pub fn tf2_client_component() -> ClientComponent {
    ClientComponent {
        name: "Team Fortress 2 Client",
        binary: "TF2Client",
        icon: "tf2",
    }
}

/// FNV-1a over the player name, folded into the session seed. Gives each
/// player a stable stream of their own.
fn player_stream_seed(seed: u64, player: &str) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in player.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001B3_u64);
    }
    seed ^ hash
}

/// One placed item: which player's location holds which player's item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub location_player: String,
    pub location: String,
    pub location_id: LocationId,
    pub item_player: String,
    pub item: Item,
}

/// Everything the host needs to run a seed, serialised and compressed
/// into the multidata file.
#[derive(Debug, Clone, Serialize)]
pub struct Multidata {
    pub seed: u64,
    pub players: Vec<String>,
    pub item_name_to_id: BTreeMap<String, ItemId>,
    pub location_name_to_id: BTreeMap<String, LocationId>,
    pub slot_data: BTreeMap<String, SlotData>,
    pub precollected: BTreeMap<String, Vec<Item>>,
    pub completion: BTreeMap<String, CompletionCondition>,
    pub placements: Vec<Placement>,
}

pub struct Session {
    seed: u64,
    catalog: Catalog,
    components: Vec<ClientComponent>,
    slots: Vec<GeneratedSlot>,
    precollected: BTreeMap<String, Vec<Item>>,
    completion: BTreeMap<String, CompletionCondition>,
}

impl Session {
    pub fn new(seed: u64) -> Session {
        Session {
            seed,
            catalog: Catalog::new(),
            components: Vec::new(),
            slots: Vec::new(),
            precollected: BTreeMap::new(),
            completion: BTreeMap::new(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn register_component(&mut self, component: ClientComponent) {
        self.components.push(component);
    }

    pub fn components(&self) -> &[ClientComponent] {
        &self.components
    }

    pub fn slots(&self) -> &[GeneratedSlot] {
        &self.slots
    }

    /// Run the whole pipeline for one player and record the result.
    ///
    /// The player's stream makes its first draw inside class resolution,
    /// so the starting class for a given (seed, name) pair is fixed no
    /// matter what the options ask for afterwards. The resolved class
    /// unlock is recorded as pre-collected and the completion predicate
    /// registered as soon as the slot exists.
    pub fn generate_slot(&mut self, player: &str, options: &PlayerOptions) -> Result<()> {
        if self.slots.iter().any(|slot| slot.player() == player) {
            return Err(GenerateError::Config(format!(
                "duplicate player name: {player}"
            )));
        }

        let mut rng = StdRng::seed_from_u64(player_stream_seed(self.seed, player));
        let slot = options
            .validated(&self.catalog)?
            .resolve_starting_class(player, &mut rng)?
            .compute_available_weapons(&self.catalog)
            .create_objectives(&self.catalog, &mut rng)?
            .create_itempool()?;

        self.precollected
            .entry(player.to_string())
            .or_default()
            .push(slot.precollected().clone());
        self.completion
            .insert(player.to_string(), slot.completion_condition());
        self.slots.push(slot);
        Ok(())
    }

    /// Place every pooled item at a location.
    ///
    /// All pools are flattened together, shuffled once on the fill stream
    /// and dealt back across all locations, so items cross between players.
    /// Per-slot balancing has already guaranteed the totals match; running
    /// out of either side here means a bug upstream, not bad options.
    pub fn fill(&mut self) -> Result<Vec<Placement>> {
        let mut pool: Vec<(String, Item)> = Vec::new();
        for slot in &self.slots {
            for item in slot.itempool() {
                pool.push((slot.player().to_string(), item.clone()));
            }
        }

        let mut rng = StdRng::seed_from_u64(self.seed ^ 0x0B16_5EED_u64);
        pool.shuffle(&mut rng);

        let mut placements = Vec::new();
        for slot in &self.slots {
            for location in slot.locations() {
                let (item_player, item) = pool.pop().ok_or_else(|| {
                    GenerateError::Config(format!(
                        "item pool ran dry at {} for {}",
                        location.name,
                        slot.player()
                    ))
                })?;
                placements.push(Placement {
                    location_player: slot.player().to_string(),
                    location: location.name.clone(),
                    location_id: location.id,
                    item_player,
                    item,
                });
            }
        }
        if !pool.is_empty() {
            return Err(GenerateError::Config(format!(
                "{} items left over after fill",
                pool.len()
            )));
        }
        Ok(placements)
    }

    pub fn completion_condition(&self, player: &str) -> Option<&CompletionCondition> {
        self.completion.get(player)
    }

    pub fn precollected(&self, player: &str) -> &[Item] {
        self.precollected
            .get(player)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Bundle the session up for the host. Placements come from [`fill`];
    /// threading them through keeps an unfilled session out of a multidata
    /// file by construction.
    ///
    /// [`fill`]: Session::fill
    pub fn multidata(&self, placements: &[Placement]) -> Multidata {
        Multidata {
            seed: self.seed,
            players: self.slots.iter().map(|s| s.player().to_string()).collect(),
            item_name_to_id: items::item_name_to_id(),
            location_name_to_id: regions::location_name_to_id(),
            slot_data: self
                .slots
                .iter()
                .map(|s| (s.player().to_string(), s.fill_slot_data()))
                .collect(),
            precollected: self.precollected.clone(),
            completion: self.completion.clone(),
            placements: placements.to_vec(),
        }
    }

    /// The full spoiler log: a header, one section per slot, then every
    /// placement in fill order.
    pub fn write_spoiler<W: Write>(&self, placements: &[Placement], out: &mut W) -> io::Result<()> {
        writeln!(out, "TF2 Randomiser seed: {}", self.seed)?;
        for slot in &self.slots {
            writeln!(out)?;
            writeln!(
                out,
                "Player: {} ({})",
                slot.player(),
                slot.starting_class().display_name()
            )?;
            // the slot section leaves its last line unterminated
            slot.write_spoiler(out)?;
            writeln!(out)?;
        }
        writeln!(out)?;
        writeln!(out, "Placements:")?;
        for placement in placements {
            writeln!(
                out,
                "  {} / {}: {} [{}]",
                placement.location_player,
                placement.location,
                placement.item.name,
                placement.item_player
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::CONTRACT_POINT;
    use std::collections::HashSet;

    fn two_player_session(seed: u64) -> Session {
        let mut session = Session::new(seed);
        session
            .generate_slot("alice", &PlayerOptions::default())
            .unwrap();
        session
            .generate_slot(
                "bob",
                &PlayerOptions {
                    allowed_classes: vec!["Scout".to_string(), "Spy".to_string()],
                    ..PlayerOptions::default()
                },
            )
            .unwrap();
        session
    }

    #[test]
    fn player_streams_are_independent() {
        let mut solo = Session::new(77);
        solo.generate_slot("bob", &PlayerOptions::default()).unwrap();

        let mut duo = Session::new(77);
        duo.generate_slot("alice", &PlayerOptions::default()).unwrap();
        duo.generate_slot("bob", &PlayerOptions::default()).unwrap();

        let solo_bob = &solo.slots()[0];
        let duo_bob = &duo.slots()[1];
        assert_eq!(solo_bob.starting_class(), duo_bob.starting_class());
        assert_eq!(
            solo_bob.fill_slot_data(),
            duo_bob.fill_slot_data()
        );
    }

    #[test]
    fn rejects_duplicate_player_names() {
        let mut session = Session::new(1);
        session
            .generate_slot("alice", &PlayerOptions::default())
            .unwrap();
        let err = session
            .generate_slot("alice", &PlayerOptions::default())
            .unwrap_err();
        assert!(matches!(err, GenerateError::Config(_)));
    }

    #[test]
    fn fill_covers_every_location_exactly_once() {
        let mut session = two_player_session(2026);
        let placements = session.fill().unwrap();

        let total_locations: usize = session
            .slots()
            .iter()
            .map(|slot| slot.locations().len())
            .sum();
        assert_eq!(placements.len(), total_locations);

        let mut seen = HashSet::new();
        for placement in &placements {
            assert!(
                seen.insert((placement.location_player.clone(), placement.location.clone())),
                "{} / {} filled twice",
                placement.location_player,
                placement.location
            );
        }
    }

    #[test]
    fn fill_preserves_the_combined_pool() {
        let mut session = two_player_session(404);
        let mut expected: Vec<String> = session
            .slots()
            .iter()
            .flat_map(|slot| slot.itempool().iter().map(|item| item.name.clone()))
            .collect();
        let placements = session.fill().unwrap();
        let mut placed: Vec<String> = placements
            .iter()
            .map(|placement| placement.item.name.clone())
            .collect();
        expected.sort();
        placed.sort();
        assert_eq!(expected, placed);
    }

    #[test]
    fn same_seed_fills_identically() {
        let mut first = two_player_session(31337);
        let mut second = two_player_session(31337);
        assert_eq!(first.fill().unwrap(), second.fill().unwrap());
    }

    #[test]
    fn different_seeds_fill_differently() {
        let mut first = two_player_session(1);
        let mut second = two_player_session(2);
        // class draws differ too, so compare only the placement orders
        let a: Vec<String> = first.fill().unwrap().iter().map(|p| p.item.name.clone()).collect();
        let b: Vec<String> = second.fill().unwrap().iter().map(|p| p.item.name.clone()).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn registers_completion_and_precollected_per_player() {
        let session = two_player_session(900);
        for player in ["alice", "bob"] {
            let condition = session.completion_condition(player).unwrap();
            assert_eq!(condition.item, CONTRACT_POINT);
            let precollected = session.precollected(player);
            assert_eq!(precollected.len(), 1);
        }
        let bob_start = session.precollected("bob")[0].name.as_str();
        assert!(bob_start == "Scout" || bob_start == "Spy");
        assert!(session.precollected("carol").is_empty());
    }

    #[test]
    fn multidata_carries_the_whole_session() {
        let mut session = two_player_session(555);
        session.register_component(tf2_client_component());
        let placements = session.fill().unwrap();
        let multidata = session.multidata(&placements);

        assert_eq!(multidata.seed, 555);
        assert_eq!(multidata.players, ["alice", "bob"]);
        assert_eq!(multidata.slot_data.len(), 2);
        assert_eq!(multidata.placements.len(), placements.len());
        assert!(multidata.item_name_to_id.contains_key(CONTRACT_POINT));
        assert!(multidata
            .location_name_to_id
            .contains_key("Scattergun Contract"));
        assert!(multidata.completion.contains_key("alice"));
    }

    #[test]
    fn spoiler_lists_players_and_placements() {
        let mut session = two_player_session(888);
        let placements = session.fill().unwrap();
        let mut buffer = Vec::new();
        session.write_spoiler(&placements, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.contains("TF2 Randomiser seed: 888"));
        assert!(text.contains("Player: alice"));
        assert!(text.contains("Player: bob"));
        assert!(text.contains("Placements:"));
        assert!(text.contains("Total Weapons:"));
        assert_eq!(
            text.matches("Contract Points Required:").count(),
            2
        );
    }
}
