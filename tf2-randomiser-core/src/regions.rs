//! Locations and objective construction.
//!
//! Like items, the location universe is fixed: for every cataloged weapon a
//! "{weapon} Contract" and a "{weapon} Supply Drop", and for every class a
//! "{class} Contract" and a "{class} Loadout". A given slot only realises
//! the subset matching its weapon pool and allowed classes, but ids always
//! come from the full enumeration so they never move between seeds.
//!
//! Kill targets are drawn here, not encoded in location names, so the
//! name universe stays static; the targets travel to the client through
//! slot data instead.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::data::{Catalog, TfClass, WeaponEntry, WEAPONS};
use crate::{GenerateError, Result};

// Location ids sit in the thousands block above the item ids.
const LOCATION_ID_BASE: i64 = 441_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(pub i64);

/// What a player has to do in game to check an objective location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KillRequirement {
    /// Score `count` kills with one specific weapon. `kill_key` is what the
    /// kill feed reports and is what clients match on.
    Weapon {
        weapon: String,
        kill_key: String,
        count: u32,
    },
    /// Score `count` kills while playing the class, any weapon.
    Class { class: String, count: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub id: LocationId,
    /// `None` for supply drops and loadouts, which are checked by reaching
    /// them rather than by kill counts.
    pub requirement: Option<KillRequirement>,
}

impl Location {
    pub fn is_objective(&self) -> bool {
        self.requirement.is_some()
    }
}

/// Every location name this game can ever realise, in id order.
fn location_names() -> Vec<String> {
    let mut names =
        Vec::with_capacity(2 * WEAPONS.len() + 2 * TfClass::PLAYABLE.len());
    for weapon in WEAPONS {
        names.push(format!("{} Contract", weapon.name));
    }
    for class in TfClass::PLAYABLE {
        names.push(format!("{} Contract", class.display_name()));
    }
    for weapon in WEAPONS {
        names.push(format!("{} Supply Drop", weapon.name));
    }
    for class in TfClass::PLAYABLE {
        names.push(format!("{} Loadout", class.display_name()));
    }
    names
}

/// The full name-to-id map, shared with clients the same way item ids are.
pub fn location_name_to_id() -> BTreeMap<String, LocationId> {
    location_names()
        .into_iter()
        .enumerate()
        .map(|(index, name)| (name, LocationId(LOCATION_ID_BASE + index as i64)))
        .collect()
}

/// Kill targets per objective. Knives sit well below other melee weapons
/// because a knife kill usually means a backstab, and ranged weapons see
/// far more kills per round than either.
fn weapon_kill_target(catalog: &Catalog, weapon: &WeaponEntry, rng: &mut StdRng) -> u32 {
    if catalog.is_knife(weapon.name) {
        rng.gen_range(5..=15)
    } else if catalog.is_melee(weapon.name) {
        rng.gen_range(10..=25)
    } else {
        rng.gen_range(20..=50)
    }
}

fn class_kill_target(rng: &mut StdRng) -> u32 {
    rng.gen_range(50..=125)
}

/// Everything objective construction produces for one slot.
pub(crate) struct ObjectiveBundle {
    pub locations: Vec<Location>,
    pub total_objectives: u32,
    /// Kill feed key to required kill count, one entry per weapon contract.
    pub weapon_kill_counts: BTreeMap<String, u32>,
    /// Class display name to required kill count, one entry per class contract.
    pub class_kill_counts: BTreeMap<String, u32>,
}

/// Realise the locations for one slot and draw their kill targets.
///
/// Draw order is fixed: weapon contracts in catalog order, then class
/// contracts in allowed order. Reordering the draws would reshuffle every
/// kill target for a given seed.
pub(crate) fn build_objectives(
    catalog: &Catalog,
    available_weapons: &[&'static WeaponEntry],
    allowed_classes: &[TfClass],
    rng: &mut StdRng,
) -> Result<ObjectiveBundle> {
    let ids = location_name_to_id();
    let id_of = |name: &str| -> Result<LocationId> {
        ids.get(name)
            .copied()
            .ok_or_else(|| GenerateError::Config(format!("unknown location name: {name}")))
    };

    let mut locations = Vec::new();
    let mut weapon_kill_counts = BTreeMap::new();
    let mut class_kill_counts = BTreeMap::new();
    let mut total_objectives = 0u32;

    for weapon in available_weapons {
        let count = weapon_kill_target(catalog, weapon, rng);
        let name = format!("{} Contract", weapon.name);
        locations.push(Location {
            id: id_of(&name)?,
            name,
            requirement: Some(KillRequirement::Weapon {
                weapon: weapon.name.to_string(),
                kill_key: weapon.kill_key.to_string(),
                count,
            }),
        });
        weapon_kill_counts.insert(weapon.kill_key.to_string(), count);
        total_objectives += 1;
    }
    for class in allowed_classes {
        let count = class_kill_target(rng);
        let name = format!("{} Contract", class.display_name());
        locations.push(Location {
            id: id_of(&name)?,
            name,
            requirement: Some(KillRequirement::Class {
                class: class.display_name().to_string(),
                count,
            }),
        });
        class_kill_counts.insert(class.display_name().to_string(), count);
        total_objectives += 1;
    }

    for weapon in available_weapons {
        let name = format!("{} Supply Drop", weapon.name);
        locations.push(Location {
            id: id_of(&name)?,
            name,
            requirement: None,
        });
    }
    for class in allowed_classes {
        let name = format!("{} Loadout", class.display_name());
        locations.push(Location {
            id: id_of(&name)?,
            name,
            requirement: None,
        });
    }

    Ok(ObjectiveBundle {
        locations,
        total_objectives,
        weapon_kill_counts,
        class_kill_counts,
    })
}
