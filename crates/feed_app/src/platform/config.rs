use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use engine_logging::{engine_info, engine_warn};
use feed_engine::EngineConfig;
use log::LevelFilter;
use serde::Deserialize;

use super::logging::LogDestination;

const CONFIG_FILENAME: &str = "feed.ron";
const CACHE_DIRNAME: &str = ".feed_cache";

/// Optional overrides read from `feed.ron`; absent keys keep their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    api_base_url: Option<String>,
    page_size: Option<usize>,
    cache_dir: Option<PathBuf>,
    connect_timeout_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
    max_in_flight: Option<usize>,
    log: Option<LogDestination>,
    verbose: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct AppConfig {
    pub engine: EngineConfig,
    pub log: LogDestination,
    pub log_level: LevelFilter,
}

/// Reads `feed.ron` from `dir`. A missing file gives the defaults; a
/// malformed one is reported and ignored.
pub(crate) fn load_config(dir: &Path) -> AppConfig {
    let path = dir.join(CONFIG_FILENAME);
    let file = match fs::read_to_string(&path) {
        Ok(text) => match ron::from_str::<FileConfig>(&text) {
            Ok(file) => {
                engine_info!("Loaded configuration from {:?}", path);
                file
            }
            Err(err) => {
                engine_warn!("Failed to parse configuration {:?}: {}", path, err);
                eprintln!("Warning: ignoring malformed {}: {}", CONFIG_FILENAME, err);
                FileConfig::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => FileConfig::default(),
        Err(err) => {
            engine_warn!("Failed to read configuration {:?}: {}", path, err);
            FileConfig::default()
        }
    };
    apply(file, dir)
}

fn apply(file: FileConfig, dir: &Path) -> AppConfig {
    let cache_dir = match file.cache_dir {
        Some(custom) if custom.is_absolute() => custom,
        Some(custom) => dir.join(custom),
        None => dir.join(CACHE_DIRNAME),
    };
    let mut engine = EngineConfig::default_with_cache(cache_dir);

    if let Some(base) = file.api_base_url {
        engine.api_base_url = base;
    }
    if let Some(page_size) = file.page_size {
        if page_size == 0 {
            engine_warn!("page_size 0 is not usable, using 1");
        }
        engine.page_size = page_size.max(1);
    }
    if let Some(secs) = file.connect_timeout_secs {
        engine.fetch.connect_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = file.request_timeout_secs {
        engine.fetch.request_timeout = Duration::from_secs(secs);
    }
    if let Some(max) = file.max_in_flight {
        engine.fetch.max_in_flight = max.max(1);
    }

    AppConfig {
        engine,
        log: file.log.unwrap_or_default(),
        log_level: if file.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        },
    }
}
