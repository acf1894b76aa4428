//! Setup shared by the headless client and the integration tests.

pub mod autopilot;

use std::{path::Path, sync::Arc};

use anyhow::anyhow;
use base::system::System;
use client_session::{rules::Rules, ClientSession};
use game_config::config::ConfigGame;
use model::{main_character::main_character, track::track::Track};
use object_factory::ObjectFactory;

/// Registry with every class a race needs: the track objects and the crafts.
pub fn create_factory() -> anyhow::Result<Arc<ObjectFactory>> {
    let mut factory = ObjectFactory::init();
    obj_fac1::register(&mut factory)?;
    main_character::register(&mut factory)?;
    Ok(Arc::new(factory))
}

pub fn load_track(path: &Path, factory: &ObjectFactory) -> anyhow::Result<Track> {
    let source = std::fs::read_to_string(path)
        .map_err(|err| anyhow!("can't read track {}: {err}", path.display()))?;
    maze_compiler::compile(&source, factory)
        .map_err(|err| anyhow!("can't compile track {}: {err}", path.display()))
}

pub fn rules_from_config(config: &ConfigGame) -> Rules {
    Rules {
        rulebook: None,
        laps: config.race.laps,
        game_options: config.race.game_options(),
        countdown: config.race.countdown_ms,
        post_game_timeout: config.race.post_game_timeout_ms,
    }
}

/// A session in [`client_session::phase::Phase::Init`] with `track` loaded.
pub fn create_session(
    config: &ConfigGame,
    factory: Arc<ObjectFactory>,
    system: System,
    title: &str,
    track: Track,
) -> anyhow::Result<ClientSession> {
    let rules = Arc::new(rules_from_config(config));
    let mut session = ClientSession::new(rules, factory, system);
    session.load_new(title, track)?;
    Ok(session)
}
