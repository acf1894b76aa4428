use model::{
    contact_effect::contact_effect::{CheckPointType, ContactEffect},
    game_session::game_session::GameSession,
    main_character::main_character::Controls,
    types::types::{Point2d, TRIGO_FRACT},
};

/// Position of the element that counts as `check_point`.
pub fn check_point_position(session: &GameSession, check_point: CheckPointType) -> Option<Point2d> {
    session
        .level()
        .free_elements
        .iter()
        .find(|element| {
            element.contact_effect_shape().is_some_and(|shape| {
                shape.effect_list().iter().any(|effect| match effect {
                    ContactEffect::CheckPoint(cp) => cp.check_point_type == check_point,
                    _ => false,
                })
            })
        })
        .map(|element| element.free_element().position.xy())
}

/// Steers the craft in `slot` straight at the next check point.
pub fn steer(session: &GameSession, slot: usize) -> Controls {
    let Some(character) = session.character(slot) else {
        return Controls::empty();
    };
    let state = &character.state;
    if state.lap.is_finished() {
        return Controls::BRAKE;
    }
    let Some(target) = check_point_position(session, state.lap.next_check_point()) else {
        return Controls::empty();
    };

    let to = target - state.position.xy();
    let heading_x = state.orientation.cos() as i64;
    let heading_y = state.orientation.sin() as i64;
    let (to_x, to_y) = (to.x as i64, to.y as i64);
    let cross = heading_x * to_y - heading_y * to_x;
    let dot = heading_x * to_x + heading_y * to_y;

    let mut controls = Controls::empty();
    // a few degrees of tolerance against oscillating
    let tolerance = dot.abs() / (TRIGO_FRACT as i64 / 32);
    if cross > tolerance {
        controls |= Controls::LEFT;
    } else if cross < -tolerance {
        controls |= Controls::RIGHT;
    }
    if dot > 0 && cross.abs() < dot {
        controls |= Controls::THRUST;
    }
    controls
}

#[cfg(test)]
mod test {
    use model::{
        contact_effect::contact_effect::CheckPointType,
        game_options::game_options::Craft,
        game_session::game_session::GameSession,
        main_character::main_character::Controls,
        types::types::{Angle, Point2d, Point3d},
    };

    use super::{check_point_position, steer};

    fn demo() -> GameSession {
        let factory = crate::create_factory().unwrap();
        let track = crate::load_track("data/tracks/demo.trk".as_ref(), &factory).unwrap();
        let mut session = GameSession::new(factory, Default::default());
        session.load_new(track);
        session.add_main_character(0, Craft::Eon).unwrap();
        session
    }

    #[test]
    fn finds_check_points() {
        let session = demo();
        assert_eq!(
            check_point_position(&session, CheckPointType::CheckPoint1),
            Some(Point2d::new(150_000, 50_000))
        );
        assert_eq!(
            check_point_position(&session, CheckPointType::FinishLine),
            Some(Point2d::new(50_000, 20_000))
        );
    }

    #[test]
    fn turns_towards_the_target() {
        let mut session = demo();
        // facing +x, checkpoint 1 is straight ahead
        session.teleport_character(0, Point3d::new(120_000, 50_000, 0), Angle::new(0));
        let controls = steer(&session, 0);
        assert!(controls.contains(Controls::THRUST));
        assert!(!controls.intersects(Controls::LEFT | Controls::RIGHT));

        // facing -x, it is behind
        session.teleport_character(0, Point3d::new(120_000, 50_000, 0), Angle::new(2048));
        let controls = steer(&session, 0);
        assert!(!controls.contains(Controls::THRUST));

        // facing +x, the target is at +y
        session.teleport_character(0, Point3d::new(150_000, 20_000, 0), Angle::new(0));
        assert!(steer(&session, 0).contains(Controls::LEFT));
    }
}
