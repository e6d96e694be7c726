//! Items: unlocks, Contract Points and filler.
//!
//! The item universe is fixed and identical for every session: one unlock
//! per playable class, one unlock per cataloged weapon, plus the Contract
//! Point and the Contract Hint. Ids are assigned from that enumeration, so
//! they are stable across runs and option sets and can be shared with
//! clients ahead of generation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::{TfClass, WeaponEntry, WEAPONS};
use crate::{GenerateError, Result};

/// The progression token every objective awards.
pub const CONTRACT_POINT: &str = "Contract Point";
/// The filler item used to pad the pool out to the location count.
pub const CONTRACT_HINT: &str = "Contract Hint";

// 440 is the game's Steam app id; item ids live in its thousands block.
const ITEM_ID_BASE: i64 = 440_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub i64);

/// How the host treats an item when placing and hinting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Required to finish: class unlocks and Contract Points.
    Progression,
    /// Nice to have but never required: weapon unlocks.
    Useful,
    /// Padding: Contract Hints.
    Filler,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub id: ItemId,
    pub kind: ItemKind,
}

/// Every item name this game can ever place, in id order.
fn item_names() -> Vec<&'static str> {
    let mut names = Vec::with_capacity(TfClass::PLAYABLE.len() + WEAPONS.len() + 2);
    for class in TfClass::PLAYABLE {
        names.push(class.display_name());
    }
    for weapon in WEAPONS {
        names.push(weapon.name);
    }
    names.push(CONTRACT_POINT);
    names.push(CONTRACT_HINT);
    names
}

/// The full name-to-id map, the same for every session. This is what gets
/// shared with clients so they can resolve ids without a generated seed.
pub fn item_name_to_id() -> BTreeMap<String, ItemId> {
    item_names()
        .into_iter()
        .enumerate()
        .map(|(index, name)| (name.to_string(), ItemId(ITEM_ID_BASE + index as i64)))
        .collect()
}

fn classify(name: &str) -> ItemKind {
    if name == CONTRACT_POINT {
        ItemKind::Progression
    } else if name == CONTRACT_HINT {
        ItemKind::Filler
    } else if TfClass::parse(name) != TfClass::Unknown {
        ItemKind::Progression
    } else {
        ItemKind::Useful
    }
}

/// Build a single item by name. Fails on names outside the item universe.
pub fn create_item(name: &str) -> Result<Item> {
    let names = item_names();
    let index = names
        .iter()
        .position(|candidate| *candidate == name)
        .ok_or_else(|| GenerateError::Config(format!("unknown item name: {name}")))?;
    Ok(Item {
        name: name.to_string(),
        id: ItemId(ITEM_ID_BASE + index as i64),
        kind: classify(name),
    })
}

/// Assemble a player's item pool.
///
/// One unlock per available weapon, one unlock per allowed class except the
/// starting class (that one is pre-collected, never placed), and one
/// Contract Point per objective. The pool is then padded with Contract
/// Hints up to `total_locations`; a pool that is already over that count
/// means generation produced more items than places to put them, which is
/// unrecoverable.
pub(crate) fn build_itempool(
    player: &str,
    available_weapons: &[&'static WeaponEntry],
    allowed_classes: &[TfClass],
    starting_class: TfClass,
    total_objectives: u32,
    total_locations: u32,
) -> Result<Vec<Item>> {
    let total_locations = total_locations as usize;
    let mut pool = Vec::with_capacity(total_locations);

    for weapon in available_weapons {
        pool.push(create_item(weapon.name)?);
    }
    for class in allowed_classes {
        if *class != starting_class {
            pool.push(create_item(class.display_name())?);
        }
    }
    for _ in 0..total_objectives {
        pool.push(create_item(CONTRACT_POINT)?);
    }

    if pool.len() > total_locations {
        return Err(GenerateError::PoolSizeMismatch {
            player: player.to_string(),
            items: pool.len(),
            locations: total_locations,
        });
    }
    while pool.len() < total_locations {
        pool.push(create_item(CONTRACT_HINT)?);
    }
    Ok(pool)
}
