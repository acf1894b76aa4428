use std::path::Path;

use crate::config::ConfigGame;

pub const CONFIG_FILE: &str = "cfg_game.json";

pub fn save(config: &ConfigGame, path: &Path) -> anyhow::Result<()> {
    let save_str = config.to_json_string()?;
    std::fs::write(path, save_str)?;
    Ok(())
}

/// Missing or broken files give the default config.
pub fn load(path: &Path) -> ConfigGame {
    match std::fs::read_to_string(path) {
        Ok(file) => ConfigGame::from_json_string(&file).unwrap_or_else(|err| {
            log::warn!(target: "config", "ignoring broken config {}: {err}", path.display());
            ConfigGame::new()
        }),
        Err(_) => ConfigGame::new(),
    }
}

#[cfg(test)]
mod test {
    use super::{load, save};
    use crate::config::ConfigGame;

    #[test]
    fn save_then_load() {
        let dir = std::env::temp_dir().join(format!("hoverrace-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(super::CONFIG_FILE);

        assert_eq!(load(&path), ConfigGame::default());

        let mut config = ConfigGame::new();
        config.cl.name = "Ace".to_string();
        config.snd.silent = true;
        save(&config, &path).unwrap();
        assert_eq!(load(&path), config);

        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(load(&path), ConfigGame::default());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
