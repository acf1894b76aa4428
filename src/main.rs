use std::{path::PathBuf, sync::Arc, time::Duration};

use base::system::{ManualTime, System};
use clap::Parser;
use client_session::{
    clock::fmt_sim_time,
    phase::Phase,
    player::{Player, Profile},
};
use game_config::{config::ConfigGame, fs};
use hoverrace_client::{autopilot, create_factory, create_session, load_track};
use model::game_options::game_options::GameOptions;
use rand::{rngs::StdRng, SeedableRng};

/// Frame length of the headless client.
const FRAME: Duration = Duration::from_millis(16);

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// track file to race on
    track: PathBuf,
    /// config file, created with defaults if missing
    #[arg(short, long, default_value = fs::CONFIG_FILE)]
    config: PathBuf,
    /// number of autopiloted crafts
    #[arg(short, long, default_value_t = 1)]
    players: usize,
    /// give every craft a random allowed craft, seeded with this value
    #[arg(long)]
    random_crafts: Option<u64>,
    /// give up after this many seconds of race time
    #[arg(long, default_value_t = 600)]
    time_limit: u64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = fs::load(&args.config);
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", &config.dbg.log_level);
    }
    env_logger::init();

    // the headless client has no audio backend
    if !config.snd.silent {
        log::warn!("no audio device available, running silent");
        config.snd.silent = true;
    }
    if !args.config.exists() {
        if let Err(err) = fs::save(&config, &args.config) {
            log::warn!("failed to write {}: {err}", args.config.display());
        }
    }

    run(&args, &config)
}

fn run(args: &Args, config: &ConfigGame) -> anyhow::Result<()> {
    let factory = create_factory()?;
    let track = load_track(&args.track, &factory)?;
    let title = track.header.name.clone();

    let time = Arc::new(ManualTime::new());
    let mut session = create_session(
        config,
        factory,
        System::with_time(time.clone()),
        &title,
        track,
    )?;

    let options: GameOptions = config.race.game_options();
    let mut rng = args.random_crafts.map(StdRng::seed_from_u64);
    let players = args.players.clamp(1, client_session::MAX_PLAYERS);
    for slot in 0..players {
        let craft = rng
            .as_mut()
            .and_then(|rng| options.pick_random_allowed_craft(rng))
            .unwrap_or(config.cl.craft);
        let name = if slot == 0 {
            config.cl.name.clone()
        } else {
            format!("{} {}", config.cl.name, slot + 1)
        };
        session.attach_player(
            slot,
            Arc::new(Player::new(slot as u32, Profile::new(&name), craft)),
        );
    }

    session.advance_phase_to(Phase::Pregame);
    let time_limit = Duration::from_secs(args.time_limit);
    let mut race_time = Duration::ZERO;
    while session.phase() != Phase::Done {
        for slot in 0..players {
            let controls = autopilot::steer(session.game_session(), slot);
            if let Some(player) = session.get_player(slot) {
                player.set_controls(controls);
            }
        }
        time.advance(FRAME);
        session.process();

        if session.phase().is_racing() {
            race_time += FRAME;
            if race_time > time_limit {
                log::warn!("time limit reached, stopping the race");
                break;
            }
        }
    }

    log::info!("results of {}:", session.title());
    for position in 0..session.get_nb_players() {
        let Some(result) = session.get_result(position) else {
            break;
        };
        log::info!(
            "{}. {} - {} laps, time {}, best lap {}",
            position + 1,
            result.name,
            result.laps,
            result.finish_time.map_or("-".to_string(), fmt_sim_time),
            result.best_lap.map_or("-".to_string(), fmt_sim_time),
        );
    }
    Ok(())
}
