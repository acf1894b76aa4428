use std::{sync::Arc, time::Duration};

use base::system::{ManualTime, System};
use client_session::{
    phase::Phase,
    player::{Player, Profile},
};
use game_config::config::ConfigGame;
use hoverrace_client::{create_factory, create_session, load_track};
use model::{
    game_options::game_options::Craft,
    types::types::{Angle, Point3d},
};

#[test]
fn two_crafts_on_the_demo_track() {
    let mut config = ConfigGame::default();
    config.race.laps = 2;
    config.race.countdown_ms = 1000;
    // the second craft has to finish on its own
    config.race.post_game_timeout_ms = 60_000;
    config.race.blacklisted_crafts = vec![Craft::Cx];

    let factory = create_factory().unwrap();
    let track = load_track("data/tracks/demo.trk".as_ref(), &factory).unwrap();
    let time = Arc::new(ManualTime::new());
    let mut session = create_session(
        &config,
        factory,
        System::with_time(time.clone()),
        "demo",
        track,
    )
    .unwrap();
    assert_eq!(session.get_track_peer().unwrap().laps, 2);

    session.attach_player(0, Arc::new(Player::new(7, Profile::new("Ada"), Craft::Eon)));
    session.attach_player(2, Arc::new(Player::new(9, Profile::new("Bob"), Craft::Cx)));
    // blacklisted crafts are replaced
    assert_ne!(
        session.game_session().character(2).unwrap().state.craft,
        Craft::Cx
    );

    assert!(session.advance_phase_to(Phase::Pregame));
    time.advance(Duration::from_millis(1000));
    session.process();
    assert_eq!(session.phase(), Phase::Playing);

    let lap = |session: &mut client_session::ClientSession, slot: usize| {
        for (x, y) in [(150_000, 50_000), (50_000, 80_000), (50_000, 20_000)] {
            session
                .game_session_mut()
                .teleport_character(slot, Point3d::new(x, y, 0), Angle::default());
            time.advance(Duration::from_millis(100));
            session.process();
        }
    };

    lap(&mut session, 2);
    lap(&mut session, 2);
    assert_eq!(session.phase(), Phase::Postgame);
    assert_eq!(session.result_available(), 1);
    assert_eq!(session.get_rank(2), Some(0));
    // out of the way of the finish line
    session
        .game_session_mut()
        .teleport_character(2, Point3d::new(20_000, 90_000, 0), Angle::default());

    lap(&mut session, 0);
    assert_eq!(session.phase(), Phase::Postgame);
    lap(&mut session, 0);
    assert_eq!(session.phase(), Phase::Done);

    let first = session.get_result(0).unwrap();
    let second = session.get_result(1).unwrap();
    assert_eq!((first.name.as_str(), first.id), ("Bob", 9));
    assert_eq!((second.name.as_str(), second.id), ("Ada", 7));
    assert_eq!(first.laps, 2);
    assert!(first.finish_time.unwrap() < second.finish_time.unwrap());
    assert!(first.best_lap.unwrap() <= first.finish_time.unwrap());
    assert!(session.get_result(2).is_none());
}
