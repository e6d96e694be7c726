//! Static catalog of classes and weapons.
//!
//! Everything here is fixed data about the game itself: the nine playable
//! classes, every weapon the randomiser knows how to track, and the weapon
//! groups the option rules refer to. Session state never mutates any of it.

use std::collections::{HashMap, HashSet};

/// The nine playable classes, plus a sentinel for "not resolved yet".
///
/// `Unknown` is what an absent or unrecognised starting-class option parses
/// to. It never appears in a generated slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TfClass {
    Scout,
    Soldier,
    Pyro,
    Demoman,
    Heavy,
    Engineer,
    Medic,
    Sniper,
    Spy,
    Unknown,
}

impl TfClass {
    /// Every class a player can actually start as, in the game's own order.
    pub const PLAYABLE: [TfClass; 9] = [
        TfClass::Scout,
        TfClass::Soldier,
        TfClass::Pyro,
        TfClass::Demoman,
        TfClass::Heavy,
        TfClass::Engineer,
        TfClass::Medic,
        TfClass::Sniper,
        TfClass::Spy,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            TfClass::Scout => "Scout",
            TfClass::Soldier => "Soldier",
            TfClass::Pyro => "Pyro",
            TfClass::Demoman => "Demoman",
            TfClass::Heavy => "Heavy",
            TfClass::Engineer => "Engineer",
            TfClass::Medic => "Medic",
            TfClass::Sniper => "Sniper",
            TfClass::Spy => "Spy",
            TfClass::Unknown => "Unknown",
        }
    }

    /// Case-insensitive parse. Anything that is not a playable class name
    /// resolves to `Unknown` rather than an error; callers decide whether
    /// that means "draw one" or "reject".
    pub fn parse(name: &str) -> TfClass {
        let name = name.trim();
        for class in Self::PLAYABLE {
            if class.display_name().eq_ignore_ascii_case(name) {
                return class;
            }
        }
        TfClass::Unknown
    }
}

/// One weapon the randomiser can ban, unlock and write contracts for.
///
/// `kill_key` is the identifier the game's kill feed reports for the weapon,
/// which is what the in-game client matches against. `class` is `None` for
/// weapons usable by more than one class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeaponEntry {
    pub name: &'static str,
    pub kill_key: &'static str,
    pub class: Option<TfClass>,
}

const fn weapon(name: &'static str, kill_key: &'static str, class: TfClass) -> WeaponEntry {
    WeaponEntry {
        name,
        kill_key,
        class: Some(class),
    }
}

const fn shared(name: &'static str, kill_key: &'static str) -> WeaponEntry {
    WeaponEntry {
        name,
        kill_key,
        class: None,
    }
}

/// The full weapon table, grouped by class. Table order is load-bearing:
/// item and location ids are assigned from it, so entries must only ever be
/// appended, never reordered.
pub const WEAPONS: &[WeaponEntry] = &[
    // Scout
    weapon("Scattergun", "scattergun", TfClass::Scout),
    weapon("Force-A-Nature", "force_a_nature", TfClass::Scout),
    weapon("Shortstop", "shortstop", TfClass::Scout),
    weapon("Soda Popper", "soda_popper", TfClass::Scout),
    weapon("Baby Face's Blaster", "pep_brawlerblaster", TfClass::Scout),
    weapon("Winger", "the_winger", TfClass::Scout),
    weapon("Pretty Boy's Pocket Pistol", "pep_pistol", TfClass::Scout),
    weapon("Bat", "bat", TfClass::Scout),
    weapon("Sandman", "sandman", TfClass::Scout),
    weapon("Holy Mackerel", "holymackerel", TfClass::Scout),
    weapon("Candy Cane", "candy_cane", TfClass::Scout),
    weapon("Boston Basher", "boston_basher", TfClass::Scout),
    weapon("Atomizer", "atomizer", TfClass::Scout),
    weapon("Wrap Assassin", "wrap_assassin", TfClass::Scout),
    // Soldier
    weapon("Rocket Launcher", "tf_projectile_rocket", TfClass::Soldier),
    weapon("Original", "quake_rl", TfClass::Soldier),
    weapon("Direct Hit", "rocketlauncher_directhit", TfClass::Soldier),
    weapon("Black Box", "blackbox", TfClass::Soldier),
    weapon("Liberty Launcher", "liberty_launcher", TfClass::Soldier),
    weapon("Air Strike", "airstrike", TfClass::Soldier),
    weapon("Shovel", "shovel", TfClass::Soldier),
    weapon("Equalizer", "unique_pickaxe", TfClass::Soldier),
    weapon("Escape Plan", "unique_pickaxe_escape", TfClass::Soldier),
    weapon("Market Gardener", "market_gardener", TfClass::Soldier),
    weapon("Disciplinary Action", "disciplinary_action", TfClass::Soldier),
    // Pyro
    weapon("Flame Thrower", "flamethrower", TfClass::Pyro),
    weapon("Backburner", "backburner", TfClass::Pyro),
    weapon("Degreaser", "degreaser", TfClass::Pyro),
    weapon("Phlogistinator", "phlogistinator", TfClass::Pyro),
    weapon("Dragon's Fury", "dragons_fury", TfClass::Pyro),
    weapon("Flare Gun", "flaregun", TfClass::Pyro),
    weapon("Detonator", "detonator", TfClass::Pyro),
    weapon("Scorch Shot", "scorch_shot", TfClass::Pyro),
    weapon("Fire Axe", "fireaxe", TfClass::Pyro),
    weapon("Axtinguisher", "axtinguisher", TfClass::Pyro),
    weapon("Powerjack", "powerjack", TfClass::Pyro),
    weapon("Back Scratcher", "back_scratcher", TfClass::Pyro),
    weapon("Sharpened Volcano Fragment", "lava_axe", TfClass::Pyro),
    weapon("Third Degree", "thirddegree", TfClass::Pyro),
    weapon("Neon Annihilator", "annihilator", TfClass::Pyro),
    // Demoman
    weapon("Grenade Launcher", "tf_projectile_pipe", TfClass::Demoman),
    weapon("Loch-n-Load", "loch_n_load", TfClass::Demoman),
    weapon("Iron Bomber", "iron_bomber", TfClass::Demoman),
    weapon("Loose Cannon", "loose_cannon", TfClass::Demoman),
    weapon("Stickybomb Launcher", "tf_projectile_pipe_remote", TfClass::Demoman),
    weapon("Scottish Resistance", "sticky_resistance", TfClass::Demoman),
    weapon("Quickiebomb Launcher", "quickiebomb_launcher", TfClass::Demoman),
    weapon("Bottle", "bottle", TfClass::Demoman),
    weapon("Eyelander", "sword", TfClass::Demoman),
    weapon("Scotsman's Skullcutter", "battleaxe", TfClass::Demoman),
    weapon("Claidheamh Mor", "claidheamohmor", TfClass::Demoman),
    weapon("Persian Persuader", "persian_persuader", TfClass::Demoman),
    weapon("Ullapool Caber", "ullapool_caber", TfClass::Demoman),
    // Heavy
    weapon("Minigun", "minigun", TfClass::Heavy),
    weapon("Natascha", "natascha", TfClass::Heavy),
    weapon("Brass Beast", "brass_beast", TfClass::Heavy),
    weapon("Tomislav", "tomislav", TfClass::Heavy),
    weapon("Huo-Long Heater", "long_heatmaker", TfClass::Heavy),
    weapon("Family Business", "family_business", TfClass::Heavy),
    weapon("Fists", "fists", TfClass::Heavy),
    weapon("Killing Gloves of Boxing", "gloves", TfClass::Heavy),
    weapon("Gloves of Running Urgently", "gloves_running_urgently", TfClass::Heavy),
    weapon("Warrior's Spirit", "warrior_spirit", TfClass::Heavy),
    weapon("Eviction Notice", "eviction_notice", TfClass::Heavy),
    weapon("Holiday Punch", "holiday_punch", TfClass::Heavy),
    // Engineer
    weapon("Frontier Justice", "frontier_justice", TfClass::Engineer),
    weapon("Widowmaker", "widowmaker", TfClass::Engineer),
    weapon("Pomson 6000", "pomson", TfClass::Engineer),
    weapon("Rescue Ranger", "rescue_ranger", TfClass::Engineer),
    weapon("Short Circuit", "short_circuit", TfClass::Engineer),
    weapon("Wrench", "wrench", TfClass::Engineer),
    weapon("Gunslinger", "robot_arm", TfClass::Engineer),
    weapon("Southern Hospitality", "southern_hospitality", TfClass::Engineer),
    weapon("Jag", "wrench_jag", TfClass::Engineer),
    weapon("Eureka Effect", "eureka_effect", TfClass::Engineer),
    // Medic
    weapon("Syringe Gun", "syringegun_medic", TfClass::Medic),
    weapon("Blutsauger", "blutsauger", TfClass::Medic),
    weapon("Crusader's Crossbow", "crusaders_crossbow", TfClass::Medic),
    weapon("Overdose", "proto_syringe", TfClass::Medic),
    weapon("Bonesaw", "bonesaw", TfClass::Medic),
    weapon("Ubersaw", "ubersaw", TfClass::Medic),
    weapon("Vita-Saw", "battleneedle", TfClass::Medic),
    weapon("Amputator", "amputator", TfClass::Medic),
    weapon("Solemn Vow", "solemn_vow", TfClass::Medic),
    // Sniper
    weapon("Sniper Rifle", "sniperrifle", TfClass::Sniper),
    weapon("Huntsman", "tf_projectile_arrow", TfClass::Sniper),
    weapon("Sydney Sleeper", "sydney_sleeper", TfClass::Sniper),
    weapon("Bazaar Bargain", "bazaar_bargain", TfClass::Sniper),
    weapon("Machina", "machina", TfClass::Sniper),
    weapon("Hitman's Heatmaker", "pro_rifle", TfClass::Sniper),
    weapon("Classic", "the_classic", TfClass::Sniper),
    weapon("SMG", "smg", TfClass::Sniper),
    weapon("Cleaner's Carbine", "pro_smg", TfClass::Sniper),
    weapon("Kukri", "club", TfClass::Sniper),
    weapon("Tribalman's Shiv", "tribalkukri", TfClass::Sniper),
    weapon("Bushwacka", "bushwacka", TfClass::Sniper),
    weapon("Shahanshah", "shahanshah", TfClass::Sniper),
    // Spy
    weapon("Revolver", "revolver", TfClass::Spy),
    weapon("Ambassador", "ambassador", TfClass::Spy),
    weapon("L'Etranger", "letranger", TfClass::Spy),
    weapon("Enforcer", "enforcer", TfClass::Spy),
    weapon("Diamondback", "diamondback", TfClass::Spy),
    weapon("Knife", "knife", TfClass::Spy),
    weapon("Your Eternal Reward", "eternal_reward", TfClass::Spy),
    weapon("Conniver's Kunai", "kunai", TfClass::Spy),
    weapon("Big Earner", "big_earner", TfClass::Spy),
    weapon("Spy-cicle", "spy_cicle", TfClass::Spy),
    // Usable by more than one class
    shared("Shotgun", "shotgun"),
    shared("Pistol", "pistol"),
    shared("Panic Attack", "panic_attack"),
    shared("Reserve Shooter", "reserve_shooter"),
    shared("Frying Pan", "fryingpan"),
    shared("Half-Zatoichi", "katana"),
    shared("Pain Train", "paintrain"),
];

/// Names of every melee weapon in [`WEAPONS`]. Knives and swords are melee
/// weapons too and appear both here and in their own group.
pub const MELEE_WEAPONS: &[&str] = &[
    "Bat",
    "Sandman",
    "Holy Mackerel",
    "Candy Cane",
    "Boston Basher",
    "Atomizer",
    "Wrap Assassin",
    "Shovel",
    "Equalizer",
    "Escape Plan",
    "Market Gardener",
    "Disciplinary Action",
    "Fire Axe",
    "Axtinguisher",
    "Powerjack",
    "Back Scratcher",
    "Sharpened Volcano Fragment",
    "Third Degree",
    "Neon Annihilator",
    "Bottle",
    "Eyelander",
    "Scotsman's Skullcutter",
    "Claidheamh Mor",
    "Persian Persuader",
    "Ullapool Caber",
    "Fists",
    "Killing Gloves of Boxing",
    "Gloves of Running Urgently",
    "Warrior's Spirit",
    "Eviction Notice",
    "Holiday Punch",
    "Wrench",
    "Gunslinger",
    "Southern Hospitality",
    "Jag",
    "Eureka Effect",
    "Bonesaw",
    "Ubersaw",
    "Vita-Saw",
    "Amputator",
    "Solemn Vow",
    "Kukri",
    "Tribalman's Shiv",
    "Bushwacka",
    "Shahanshah",
    "Knife",
    "Your Eternal Reward",
    "Conniver's Kunai",
    "Big Earner",
    "Spy-cicle",
    "Frying Pan",
    "Half-Zatoichi",
    "Pain Train",
];

pub const KNIVES: &[&str] = &[
    "Knife",
    "Your Eternal Reward",
    "Conniver's Kunai",
    "Big Earner",
    "Spy-cicle",
];

pub const SWORDS: &[&str] = &[
    "Eyelander",
    "Scotsman's Skullcutter",
    "Claidheamh Mor",
    "Persian Persuader",
    "Half-Zatoichi",
];

/// Name-indexed view over the static tables.
///
/// Built once per session so that option validation and pool construction
/// are lookups instead of table scans.
#[derive(Debug)]
pub struct Catalog {
    by_name: HashMap<&'static str, &'static WeaponEntry>,
    melee: HashSet<&'static str>,
    knives: HashSet<&'static str>,
    swords: HashSet<&'static str>,
}

impl Catalog {
    pub fn new() -> Catalog {
        let mut by_name = HashMap::with_capacity(WEAPONS.len());
        for entry in WEAPONS {
            by_name.insert(entry.name, entry);
        }
        Catalog {
            by_name,
            melee: MELEE_WEAPONS.iter().copied().collect(),
            knives: KNIVES.iter().copied().collect(),
            swords: SWORDS.iter().copied().collect(),
        }
    }

    /// True if `name` exactly matches a cataloged weapon. Bans are matched
    /// verbatim, so "scattergun" is not a valid spelling of "Scattergun".
    pub fn is_valid_weapon(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn weapon(&self, name: &str) -> Option<&'static WeaponEntry> {
        self.by_name.get(name).copied()
    }

    /// All weapons in table order.
    pub fn weapons(&self) -> impl Iterator<Item = &'static WeaponEntry> {
        WEAPONS.iter()
    }

    pub fn is_melee(&self, name: &str) -> bool {
        self.melee.contains(name)
    }

    pub fn is_knife(&self, name: &str) -> bool {
        self.knives.contains(name)
    }

    pub fn is_sword(&self, name: &str) -> bool {
        self.swords.contains(name)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Catalog::new()
    }
}
