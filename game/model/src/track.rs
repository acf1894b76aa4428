pub mod track {
    use serde::{Deserialize, Serialize};

    use crate::level::level::Level;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct TrackHeader {
        pub name: String,
        pub description: String,
        pub laps: u32,
        pub max_players: usize,
    }

    impl Default for TrackHeader {
        fn default() -> Self {
            Self {
                name: String::new(),
                description: String::new(),
                laps: 3,
                max_players: 4,
            }
        }
    }

    #[derive(Debug, Default)]
    pub struct Track {
        pub header: TrackHeader,
        pub level: Level,
    }
}
