//! The client side of a race: phases, players, chat and results around a
//! simulated [`model::game_session::game_session::GameSession`].

pub mod chat;
pub mod clock;
pub mod meta;
pub mod phase;
pub mod player;
pub mod results;
pub mod rules;
pub mod session;

pub use session::{ClientSession, SessionError, MAX_PLAYERS};
