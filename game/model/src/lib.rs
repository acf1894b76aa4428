#![allow(clippy::module_inception)]

pub mod collision;
pub mod contact_effect;
pub mod events;
pub mod game_options;
pub mod game_session;
pub mod lap;
pub mod level;
pub mod main_character;
pub mod maze_element;
pub mod shape;
pub mod track;
pub mod types;

/// Module id of the main character objects.
pub const MAIN_CHARACTER_MODULE: u16 = 2;
