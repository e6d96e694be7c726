use clap::Parser;
use std::path::PathBuf;

use tf2_randomiser_core::data::{Catalog, TfClass};
use tf2_randomiser_core::{run, SessionSettings};

#[derive(Debug, Parser)]
#[command(name = "tf2-randomiser", version, about = "Team Fortress 2 contract randomiser tool")]
struct Args {
    #[arg(long, required_unless_present = "list_weapons")]
    players: Option<PathBuf>,

    #[arg(long, required_unless_present = "list_weapons")]
    output: Option<PathBuf>,

    #[arg(long, required_unless_present = "list_weapons")]
    seed: Option<u64>,

    #[arg(long, default_value_t = true)]
    spoiler: bool,

    /// Print the weapon catalog (class, kill key, groups) and exit. Handy
    /// for finding the exact spelling a banned_weapons entry needs.
    /// Normal generation is skipped when this is provided.
    #[arg(long)]
    list_weapons: bool,
}

fn main() {
    let args = Args::parse();

    // Catalog listing: dump the table and exit.
    if args.list_weapons {
        let catalog = Catalog::new();
        for weapon in catalog.weapons() {
            let class = match weapon.class {
                Some(class) => class.display_name(),
                None => "Shared",
            };
            let mut groups = Vec::new();
            if weapon.class.is_none() {
                groups.push("multi-class");
            }
            if catalog.is_melee(weapon.name) {
                groups.push("melee");
            }
            if catalog.is_knife(weapon.name) {
                groups.push("knife");
            }
            if catalog.is_sword(weapon.name) {
                groups.push("sword");
            }
            println!(
                "{:<28} {:<10} {:<28} {}",
                weapon.name,
                class,
                weapon.kill_key,
                groups.join(",")
            );
        }
        println!();
        println!(
            "{} weapons across {} classes",
            catalog.weapons().count(),
            TfClass::PLAYABLE.len()
        );
        return;
    }

    let settings = SessionSettings {
        // These expects are safe here because clap enforces that
        // players/output/seed are present unless --list-weapons was
        // provided, and we have already early-returned in that case.
        seed: args.seed.expect("seed is required unless --list-weapons is used"),
        players_path: args
            .players
            .expect("players is required unless --list-weapons is used"),
        output_path: args
            .output
            .expect("output is required unless --list-weapons is used"),
        spoiler: args.spoiler,
    };

    if let Err(err) = run(settings) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
