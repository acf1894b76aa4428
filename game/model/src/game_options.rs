pub mod game_options {
    use bitflags::bitflags;
    use rand::{seq::IteratorRandom, Rng};
    use serde::{Deserialize, Serialize};
    use strum::{Display, EnumCount, EnumIter, IntoEnumIterator};

    /// Number of object classes of the track object module that can be blacklisted.
    pub const OBJECT_BLACKLIST_SIZE: usize = 1104;
    const BLACKLIST_WORDS: usize = OBJECT_BLACKLIST_SIZE.div_ceil(64);

    #[derive(
        Debug,
        Default,
        Clone,
        Copy,
        PartialEq,
        Eq,
        Hash,
        PartialOrd,
        Ord,
        Serialize,
        Deserialize,
        Display,
        EnumCount,
        EnumIter,
    )]
    pub enum Craft {
        Eon,
        Cx,
        Bi,
        #[default]
        Basic,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct GameOptionFlags(u8);
    bitflags! {
        impl GameOptionFlags: u8 {
            const WEAPONS_DISABLED = 1 << 0;
            const EON_BLACKLISTED = 1 << 4;
            const CX_BLACKLISTED = 1 << 5;
            const BI_BLACKLISTED = 1 << 6;
            const BASIC_BLACKLISTED = 1 << 7;
        }
    }

    impl GameOptionFlags {
        fn blacklisted(craft: Craft) -> Self {
            match craft {
                Craft::Eon => Self::EON_BLACKLISTED,
                Craft::Cx => Self::CX_BLACKLISTED,
                Craft::Bi => Self::BI_BLACKLISTED,
                Craft::Basic => Self::BASIC_BLACKLISTED,
            }
        }
    }

    /// Race options the host can change.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct GameOptions {
        weapons: bool,
        crafts_blacklisted: [bool; Craft::COUNT],
        objects_blacklisted: [u64; BLACKLIST_WORDS],
    }

    impl Default for GameOptions {
        fn default() -> Self {
            Self {
                weapons: true,
                crafts_blacklisted: [false; Craft::COUNT],
                objects_blacklisted: [0; BLACKLIST_WORDS],
            }
        }
    }

    impl GameOptions {
        pub fn weapons_enabled(&self) -> bool {
            self.weapons
        }

        pub fn set_weapons_enabled(&mut self, enabled: bool) {
            self.weapons = enabled;
        }

        pub fn blacklist_craft(&mut self, craft: Craft) {
            self.crafts_blacklisted[craft as usize] = true;
        }

        /// Blacklists every craft but `craft`.
        pub fn allow_only_craft(&mut self, craft: Craft) {
            for other in Craft::iter() {
                self.crafts_blacklisted[other as usize] = other != craft;
            }
        }

        pub fn is_craft_allowed(&self, craft: Craft) -> bool {
            !self.crafts_blacklisted[craft as usize]
        }

        /// Ids outside of the blacklist range are ignored.
        pub fn blacklist_object(&mut self, class_id: u16) {
            let id = class_id as usize;
            if id < OBJECT_BLACKLIST_SIZE {
                self.objects_blacklisted[id / 64] |= 1 << (id % 64);
            }
        }

        /// Objects outside of the blacklist range are always allowed.
        pub fn is_object_allowed(&self, class_id: u16) -> bool {
            let id = class_id as usize;
            id >= OBJECT_BLACKLIST_SIZE || self.objects_blacklisted[id / 64] & (1 << (id % 64)) == 0
        }

        pub fn to_flags(&self) -> GameOptionFlags {
            let mut flags = GameOptionFlags::empty();
            flags.set(GameOptionFlags::WEAPONS_DISABLED, !self.weapons);
            for craft in Craft::iter().filter(|craft| !self.is_craft_allowed(*craft)) {
                flags |= GameOptionFlags::blacklisted(craft);
            }
            flags
        }

        pub fn pick_random_craft<R: Rng + ?Sized>(rng: &mut R) -> Craft {
            Craft::iter().choose(rng).unwrap_or_default()
        }

        /// `None` if all crafts are blacklisted.
        pub fn pick_random_allowed_craft<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Craft> {
            Craft::iter()
                .filter(|craft| self.is_craft_allowed(*craft))
                .choose(rng)
        }
    }

}
