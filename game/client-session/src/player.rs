use std::sync::atomic::{AtomicBool, Ordering};

use model::{game_options::game_options::Craft, main_character::main_character::Controls};
use parking_lot::Mutex;

/// Length limits are in characters, not bytes.
pub const MAX_NAME_LENGTH: usize = 20;
pub const MAX_AVATAR_NAME_LENGTH: usize = 64;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(self) -> Self {
        Self { a: 0xff, ..self }
    }
}

fn truncated(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    name: String,
    avatar_name: String,
    primary_color: Color,
    secondary_color: Color,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: "Player".to_string(),
            avatar_name: String::new(),
            primary_color: Color::rgba(0xff, 0xff, 0xff, 0xff),
            secondary_color: Color::rgba(0x20, 0x20, 0x20, 0xff),
        }
    }
}

impl Profile {
    pub fn new(name: &str) -> Self {
        let mut profile = Self::default();
        profile.set_name(name);
        profile
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = truncated(name, MAX_NAME_LENGTH);
    }

    pub fn avatar_name(&self) -> &str {
        &self.avatar_name
    }

    pub fn set_avatar_name(&mut self, avatar_name: &str) {
        self.avatar_name = truncated(avatar_name, MAX_AVATAR_NAME_LENGTH);
    }

    pub fn primary_color(&self) -> Color {
        self.primary_color
    }

    /// Profile colors are always fully opaque.
    pub fn set_primary_color(&mut self, color: Color) {
        self.primary_color = color.opaque();
    }

    pub fn secondary_color(&self) -> Color {
        self.secondary_color
    }

    pub fn set_secondary_color(&mut self, color: Color) {
        self.secondary_color = color.opaque();
    }

    /// Color by index, 0 is the primary and 1 the secondary color.
    pub fn color(&self, i: usize) -> Color {
        match i {
            0 => self.primary_color,
            1 => self.secondary_color,
            _ => {
                log::warn!("retrieving invalid profile color index: {i}");
                Color::default()
            }
        }
    }

    pub fn set_color(&mut self, i: usize, color: Color) {
        match i {
            0 => self.set_primary_color(color),
            1 => self.set_secondary_color(color),
            _ => log::warn!("setting invalid profile color index: {i}"),
        }
    }
}

/// A participant of the session, shared with the input and network side.
#[derive(Debug)]
pub struct Player {
    id: u32,
    profile: Profile,
    craft: Craft,
    connected: AtomicBool,
    controls: Mutex<Controls>,
}

impl Player {
    pub fn new(id: u32, profile: Profile, craft: Craft) -> Self {
        Self {
            id,
            profile,
            craft,
            connected: AtomicBool::new(true),
            controls: Default::default(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        self.profile.name()
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn craft(&self) -> Craft {
        self.craft
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Relaxed);
    }

    pub fn controls(&self) -> Controls {
        *self.controls.lock()
    }

    pub fn set_controls(&self, controls: Controls) {
        *self.controls.lock() = controls;
    }
}

#[cfg(test)]
mod test {
    use super::{Color, Profile, MAX_AVATAR_NAME_LENGTH, MAX_NAME_LENGTH};

    #[test]
    fn names_are_cut_by_characters() {
        let mut profile = Profile::new("Ünïcödé Ünïcödé Ünïcödé");
        assert_eq!(profile.name().chars().count(), MAX_NAME_LENGTH);
        assert_eq!(profile.name(), "Ünïcödé Ünïcödé Ünïc");

        profile.set_avatar_name(&"x".repeat(100));
        assert_eq!(profile.avatar_name().len(), MAX_AVATAR_NAME_LENGTH);
    }

    #[test]
    fn colors_are_opaque() {
        let mut profile = Profile::default();
        profile.set_color(0, Color::rgba(10, 20, 30, 0));
        profile.set_color(1, Color::rgba(1, 2, 3, 0x80));
        profile.set_color(2, Color::rgba(1, 2, 3, 4));
        assert_eq!(profile.color(0), Color::rgba(10, 20, 30, 0xff));
        assert_eq!(profile.secondary_color(), Color::rgba(1, 2, 3, 0xff));
        assert_eq!(profile.color(5), Color::default());
    }
}
