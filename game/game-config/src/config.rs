use model::game_options::game_options::{Craft, GameOptions, OBJECT_BLACKLIST_SIZE};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConfigClient {
    /// The name shown to the other players
    pub name: String,
    /// The craft to race with
    pub craft: Craft,
}

impl Default for ConfigClient {
    fn default() -> Self {
        Self {
            name: "Player".to_string(),
            craft: Craft::Basic,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConfigRace {
    /// Laps of a race
    pub laps: u32,
    /// Time from the pregame to the start in milliseconds
    pub countdown_ms: i32,
    /// How long the others may still finish after the winner, in milliseconds
    pub post_game_timeout_ms: i32,
    pub weapons: bool,
    /// Crafts that can't be used
    pub blacklisted_crafts: Vec<Craft>,
    /// Class ids of track objects that are removed from the track
    pub blacklisted_objects: Vec<u16>,
}

impl Default for ConfigRace {
    fn default() -> Self {
        Self {
            laps: 3,
            countdown_ms: 3000,
            post_game_timeout_ms: 60_000,
            weapons: true,
            blacklisted_crafts: Vec::new(),
            blacklisted_objects: Vec::new(),
        }
    }
}

impl ConfigRace {
    pub fn game_options(&self) -> GameOptions {
        let mut options = GameOptions::default();
        options.set_weapons_enabled(self.weapons);
        for craft in self.blacklisted_crafts.iter() {
            options.blacklist_craft(*craft);
        }
        for id in self.blacklisted_objects.iter() {
            if (*id as usize) < OBJECT_BLACKLIST_SIZE {
                options.blacklist_object(*id);
            } else {
                log::warn!(target: "config", "object id {id} can't be blacklisted");
            }
        }
        options
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConfigSound {
    /// Run without audio. Set automatically if no audio device is found.
    pub silent: bool,
    pub volume: f64,
}

impl Default for ConfigSound {
    fn default() -> Self {
        Self {
            silent: false,
            volume: 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConfigDebug {
    /// `error`, `warn`, `info`, `debug` or `trace`
    pub log_level: String,
}

impl Default for ConfigDebug {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConfigGame {
    // client
    pub cl: ConfigClient,
    // race rules
    pub race: ConfigRace,
    // sound
    pub snd: ConfigSound,
    // debug
    pub dbg: ConfigDebug,
}

impl ConfigGame {
    pub fn new() -> ConfigGame {
        Self::default()
    }

    pub fn to_json_string(&self) -> anyhow::Result<String> {
        let res = serde_json::to_string_pretty(self)?;
        Ok(res)
    }

    pub fn from_json_string(json_str: &str) -> anyhow::Result<Self> {
        let res = serde_json::from_str(json_str)?;
        Ok(res)
    }
}
