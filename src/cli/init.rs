//! tempo init command implementation
//!
//! Creates the data directory, a default config, and the starter spaces.

use std::path::PathBuf;

use crate::config::Config;
use crate::error::Result;
use crate::local::LocalBackend;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::storage::Storage;

#[derive(serde::Serialize)]
struct InitReport {
    data_dir: PathBuf,
    created: InitCreated,
    spaces_seeded: usize,
}

#[derive(serde::Serialize)]
struct InitCreated {
    config: bool,
    collections: bool,
}

pub fn run(data_dir: Option<PathBuf>, json: bool, quiet: bool) -> Result<()> {
    let storage = Storage::resolve(data_dir)?;
    let had_collections = storage.is_initialized();
    storage.init()?;

    let config_path = storage.config_file();
    let created_config = !config_path.exists();
    let config = if created_config {
        let config = Config::default();
        config.save(&config_path)?;
        config
    } else {
        Config::load_from_dir(storage.data_root())?
    };

    let data_root = storage.data_root().to_path_buf();
    let backend = LocalBackend::new(storage, config);
    let spaces_seeded = backend.seed_default_spaces()?;

    let report = InitReport {
        data_dir: data_root.clone(),
        created: InitCreated {
            config: created_config,
            collections: !had_collections,
        },
        spaces_seeded,
    };

    let nothing_to_do = had_collections && !created_config && spaces_seeded == 0;
    let header = if nothing_to_do {
        "tempo init: already initialized"
    } else {
        "tempo init: data directory ready"
    };

    let mut human = HumanOutput::new(header);
    human.push_summary("data dir", data_root.display().to_string());
    if created_config {
        human.push_summary("config", "config.toml created");
    }
    if spaces_seeded > 0 {
        human.push_summary("spaces", format!("{spaces_seeded} default spaces seeded"));
    }
    human.push_next_step("tempo task add <title>");
    human.push_next_step("tempo agenda");

    emit_success(OutputOptions { json, quiet }, "init", &report, Some(&human))?;

    Ok(())
}
