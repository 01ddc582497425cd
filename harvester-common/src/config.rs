use std::path::{Path, PathBuf};

/// Locates the harvester configuration file using the following precedence:
/// 1. `HARVESTER_CONFIG` environment variable
/// 2. `./harvester.config.ron` (current working directory)
/// 3. `/etc/harvester/harvester.config.ron` (system-wide config)
pub fn find_config_file() -> anyhow::Result<PathBuf> {
    if let Ok(env_path) = std::env::var("HARVESTER_CONFIG") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        anyhow::bail!(
            "HARVESTER_CONFIG points to non-existent file: {}",
            path.display()
        );
    }

    let default_paths = [
        PathBuf::from("./harvester.config.ron"),
        PathBuf::from("/etc/harvester/harvester.config.ron"),
    ];

    for path in &default_paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    let paths_tried = default_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    anyhow::bail!(
        "No configuration file found. Tried:\n  - HARVESTER_CONFIG environment variable\n{paths_tried}"
    )
}

/// Reads and deserialises a RON config file at `path` into `T`.
pub fn load_config<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        anyhow::anyhow!("Failed to read config from {}: {}", path.display(), e)
    })?;
    ron::from_str(&content).map_err(|e| {
        anyhow::anyhow!("Failed to parse config from {}: {}", path.display(), e)
    })
}
