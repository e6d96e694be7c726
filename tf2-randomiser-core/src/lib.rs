use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::CompressionMethod;
use zip::ZipWriter;

pub mod data;
pub mod items;
pub mod options;
pub mod regions;
pub mod session;
pub mod world;

pub use options::{MeleeWeaponRules, PlayerOptions};
pub use session::{tf2_client_component, ClientComponent, Multidata, Placement, Session};
pub use world::{CompletionCondition, GeneratedSlot, Progress, SlotData};

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid weapon name: {0}")]
    InvalidWeaponName(String),
    #[error("Invalid class name: {0}")]
    InvalidClassName(String),
    #[error("no starting class for {player}: allowed classes is empty and no explicit class was given")]
    NoStartingClass { player: String },
    #[error("item pool for {player} holds {items} items for {locations} locations")]
    PoolSizeMismatch {
        player: String,
        items: usize,
        locations: usize,
    },
    #[error("configuration error: {0}")]
    Config(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

pub type Result<T> = std::result::Result<T, GenerateError>;

/// Settings for one full generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    pub seed: u64,
    /// Directory holding one `<player>.json` options file per player.
    pub players_path: PathBuf,
    /// Directory the per-seed output folder is created under.
    pub output_path: PathBuf,
    /// Write `spoiler_log.txt` alongside the host files.
    pub spoiler: bool,
}

/// Generate a complete seed from a players directory.
///
/// Discovers every `*.json` under `players_path` (file stem = player
/// name), generates a slot per player, fills, and writes the host files
/// under `{output_path}/TF2Rando_{seed}/`: a `slot_data/` folder with one
/// JSON file per player, the zlib-compressed `multidata`, the spoiler log
/// when asked for, and a zip bundle of the lot for handing to the host.
pub fn run(settings: SessionSettings) -> Result<()> {
    if !settings.players_path.exists() {
        return Err(GenerateError::Config(format!(
            "Players path does not exist: {}",
            settings.players_path.display()
        )));
    }

    if !settings.output_path.exists() {
        fs::create_dir_all(&settings.output_path)?;
    }

    // Sorted traversal keeps slot order, and with it the multidata bytes,
    // stable across runs and filesystems.
    let mut player_files: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(&settings.players_path).sort_by_file_name() {
        let entry = entry
            .map_err(|err| GenerateError::Config(format!("cannot scan players path: {err}")))?;
        if entry.file_type().is_file()
            && entry.path().extension().map_or(false, |ext| ext == "json")
        {
            player_files.push(entry.into_path());
        }
    }
    if player_files.is_empty() {
        return Err(GenerateError::Config(format!(
            "no player option files (*.json) under {}",
            settings.players_path.display()
        )));
    }

    let mut session = Session::new(settings.seed);
    session.register_component(tf2_client_component());

    for path in &player_files {
        let player = path.file_stem().and_then(|stem| stem.to_str()).ok_or_else(|| {
            GenerateError::Config(format!("unusable player file name: {}", path.display()))
        })?;
        let raw = fs::read_to_string(path)?;
        let options: PlayerOptions = serde_json::from_str(&raw)?;
        session.generate_slot(player, &options)?;
    }

    let placements = session.fill()?;

    // All outputs for a given run go into a per-seed subfolder so that
    // multiple runs do not collide and the host only needs the files for
    // this specific seed.
    let seed_dir = settings
        .output_path
        .join(format!("TF2Rando_{}", settings.seed));
    let slot_data_dir = seed_dir.join("slot_data");
    fs::create_dir_all(&slot_data_dir)?;

    let mut slot_data_files: Vec<(String, Vec<u8>)> = Vec::new();
    for slot in session.slots() {
        let json = serde_json::to_vec_pretty(&slot.fill_slot_data())?;
        let file_name = format!("{}.json", slot.player());
        fs::write(slot_data_dir.join(&file_name), &json)?;
        slot_data_files.push((file_name, json));
    }

    let multidata = compress_multidata(&session.multidata(&placements))?;
    fs::write(seed_dir.join("multidata"), &multidata)?;

    let spoiler = if settings.spoiler {
        let mut buffer = Vec::new();
        session.write_spoiler(&placements, &mut buffer)?;
        let text = String::from_utf8_lossy(&buffer).into_owned();
        fs::write(seed_dir.join("spoiler_log.txt"), &text)?;
        Some(text)
    } else {
        None
    };

    write_bundle(
        &seed_dir,
        settings.seed,
        &session,
        &slot_data_files,
        &multidata,
        spoiler.as_deref(),
    )
}

/// Multidata is JSON under zlib, so hosts on any stack can read it with
/// stock libraries.
fn compress_multidata(multidata: &Multidata) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(multidata)?;
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    Ok(encoder.finish()?)
}

/// One zip with everything a host needs, so a seed can be handed over as
/// a single file.
fn write_bundle(
    seed_dir: &Path,
    seed: u64,
    session: &Session,
    slot_data_files: &[(String, Vec<u8>)],
    multidata: &[u8],
    spoiler: Option<&str>,
) -> Result<()> {
    #[derive(Serialize)]
    struct Manifest<'a> {
        seed: u64,
        players: Vec<&'a str>,
        components: &'a [ClientComponent],
    }

    let manifest = Manifest {
        seed,
        players: session.slots().iter().map(|slot| slot.player()).collect(),
        components: session.components(),
    };

    let file = fs::File::create(seed_dir.join(format!("TF2Rando_{seed}.zip")))?;
    let mut bundle = ZipWriter::new(file);
    let file_options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    bundle.start_file("manifest.json", file_options)?;
    bundle.write_all(&serde_json::to_vec_pretty(&manifest)?)?;
    bundle.start_file("multidata", file_options)?;
    bundle.write_all(multidata)?;
    for (file_name, json) in slot_data_files {
        bundle.start_file(format!("slot_data/{file_name}"), file_options)?;
        bundle.write_all(json)?;
    }
    if let Some(text) = spoiler {
        bundle.start_file("spoiler_log.txt", file_options)?;
        bundle.write_all(text.as_bytes())?;
    }
    bundle.finish()?;
    Ok(())
}
