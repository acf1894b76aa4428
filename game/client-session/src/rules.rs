use std::sync::Arc;

use model::{game_options::game_options::GameOptions, types::types::SimulationTime};
use rustc_hash::FxHashMap;

/// Describes a kind of race.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rulebook {
    pub name: String,
    pub title: String,
    pub description: String,
    pub max_players: usize,
    pub default_laps: u32,
}

impl Rulebook {
    pub fn new(name: &str, title: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            max_players: crate::MAX_PLAYERS,
            default_laps: 3,
        }
    }
}

/// All known rulebooks.
#[derive(Debug, Default)]
pub struct RulebookLibrary {
    library: FxHashMap<String, Arc<Rulebook>>,
    sorted: Vec<Arc<Rulebook>>,
}

impl RulebookLibrary {
    /// A rulebook with an existing name replaces the old one.
    pub fn add(&mut self, rulebook: Arc<Rulebook>) {
        if let Some(old) = self.library.insert(rulebook.name.clone(), rulebook.clone()) {
            self.sorted.retain(|r| !Arc::ptr_eq(r, &old));
        }
        let at = self
            .sorted
            .partition_point(|r| r.title.as_str() <= rulebook.title.as_str());
        self.sorted.insert(at, rulebook);
    }

    /// Case sensitive.
    pub fn find(&self, name: &str) -> Option<Arc<Rulebook>> {
        self.library.get(name).cloned()
    }

    /// Ordered by title.
    pub fn sorted(&self) -> &[Arc<Rulebook>] {
        &self.sorted
    }
}

/// Rules of one session.
#[derive(Debug, Clone)]
pub struct Rules {
    pub rulebook: Option<Arc<Rulebook>>,
    pub laps: u32,
    pub game_options: GameOptions,
    /// Time from the pregame to the start.
    pub countdown: SimulationTime,
    /// How long the others may still race after the first one finished.
    pub post_game_timeout: SimulationTime,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            rulebook: None,
            laps: 3,
            game_options: Default::default(),
            countdown: 3000,
            post_game_timeout: 60_000,
        }
    }
}

impl Rules {
    pub fn from_rulebook(rulebook: Arc<Rulebook>) -> Self {
        Self {
            laps: rulebook.default_laps,
            rulebook: Some(rulebook),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use super::{Rulebook, RulebookLibrary, Rules};

    #[test]
    fn library() {
        let mut library = RulebookLibrary::default();
        library.add(Arc::new(Rulebook::new("race", "Race", "Classic race")));
        library.add(Arc::new(Rulebook::new("ctf", "Capture", "Capture the flag")));
        library.add(Arc::new(Rulebook::new("zz", "Arena", "Last craft hovering")));

        assert!(library.find("Race").is_none());
        assert_eq!(library.find("race").unwrap().title, "Race");
        let titles: Vec<_> = library.sorted().iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["Arena", "Capture", "Race"]);

        let mut laps = Rulebook::new("race", "A Race", "Short race");
        laps.default_laps = 1;
        library.add(Arc::new(laps));
        assert_eq!(library.sorted().len(), 3);
        assert_eq!(library.sorted()[0].title, "A Race");

        let rules = Rules::from_rulebook(library.find("race").unwrap());
        assert_eq!(rules.laps, 1);
    }
}
