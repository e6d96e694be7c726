//! Per-player options and their validation.
//!
//! A [`PlayerOptions`] is what deserialises straight out of a player's JSON
//! file: free-form strings, nothing checked. [`PlayerOptions::validated`]
//! turns it into a [`ValidatedOptions`], the only type the generation
//! pipeline accepts, so nothing downstream ever sees an unchecked name.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::data::{Catalog, TfClass};
use crate::{GenerateError, Result};

/// How the melee weapon option shapes the weapon pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeleeWeaponRules {
    /// No restriction.
    #[default]
    Off,
    /// Only melee weapons, plus the starting class's own weapons so the
    /// player is never left without a usable loadout.
    MeleeOnly,
    /// Everything except swords and knives.
    NoSwordsOrKnives,
}

/// Raw options exactly as a player submits them.
///
/// Every field has a default, so an empty `{}` file is a complete,
/// valid submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerOptions {
    /// Weapon names to exclude from the pool. Matched verbatim against the
    /// catalog; an unknown name fails validation rather than being ignored.
    pub banned_weapons: Vec<String>,
    /// Class names the player is willing to play. Defaults to all nine.
    pub allowed_classes: Vec<String>,
    /// Explicit starting class, or anything unrecognised (the default is
    /// "random") to have one drawn from `allowed_classes`.
    pub starting_class: String,
    pub melee_weapon_rules: MeleeWeaponRules,
    /// Percentage of generated objectives whose Contract Points are needed
    /// to finish, 0 to 100.
    pub contract_point_requirement: u32,
    pub death_link: bool,
    /// Deaths a player can absorb before death link fires.
    pub death_link_amnesty: u32,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        PlayerOptions {
            banned_weapons: Vec::new(),
            allowed_classes: TfClass::PLAYABLE
                .iter()
                .map(|class| class.display_name().to_string())
                .collect(),
            starting_class: "random".to_string(),
            melee_weapon_rules: MeleeWeaponRules::Off,
            contract_point_requirement: 50,
            death_link: false,
            death_link_amnesty: 10,
        }
    }
}

impl PlayerOptions {
    /// Check every name against the catalog and produce the options the
    /// pipeline runs on.
    ///
    /// Banned weapons must all be cataloged; the first unknown name aborts
    /// validation with that name in the error. Allowed classes are parsed,
    /// deduplicated and kept in submission order. The starting class is
    /// parsed leniently: an unrecognised value means "draw one later", not
    /// an error.
    pub fn validated(&self, catalog: &Catalog) -> Result<ValidatedOptions> {
        for name in &self.banned_weapons {
            if !catalog.is_valid_weapon(name) {
                return Err(GenerateError::InvalidWeaponName(name.clone()));
            }
        }
        let banned_weapons: BTreeSet<String> = self.banned_weapons.iter().cloned().collect();

        let mut allowed_classes = Vec::new();
        for name in &self.allowed_classes {
            let class = TfClass::parse(name);
            if class == TfClass::Unknown {
                return Err(GenerateError::InvalidClassName(name.clone()));
            }
            if !allowed_classes.contains(&class) {
                allowed_classes.push(class);
            }
        }

        if self.contract_point_requirement > 100 {
            return Err(GenerateError::Config(format!(
                "contract_point_requirement must be between 0 and 100, got {}",
                self.contract_point_requirement
            )));
        }

        Ok(ValidatedOptions {
            banned_weapons,
            allowed_classes,
            starting_class: TfClass::parse(&self.starting_class),
            melee_weapon_rules: self.melee_weapon_rules,
            contract_point_requirement: self.contract_point_requirement,
            death_link: self.death_link,
            death_link_amnesty: self.death_link_amnesty,
        })
    }
}

/// Options that have passed catalog validation. Entry point of the
/// generation pipeline; see [`crate::world`].
#[derive(Debug, Clone)]
pub struct ValidatedOptions {
    pub(crate) banned_weapons: BTreeSet<String>,
    pub(crate) allowed_classes: Vec<TfClass>,
    /// `Unknown` here means no usable explicit class was given and one must
    /// be drawn during class resolution.
    pub(crate) starting_class: TfClass,
    pub(crate) melee_weapon_rules: MeleeWeaponRules,
    pub(crate) contract_point_requirement: u32,
    pub(crate) death_link: bool,
    pub(crate) death_link_amnesty: u32,
}

impl ValidatedOptions {
    pub fn banned_weapons(&self) -> impl Iterator<Item = &str> {
        self.banned_weapons.iter().map(String::as_str)
    }

    pub fn allowed_classes(&self) -> &[TfClass] {
        &self.allowed_classes
    }

    pub fn death_link(&self) -> bool {
        self.death_link
    }
}
