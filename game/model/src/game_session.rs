pub mod game_session {
    use std::sync::Arc;

    use anyhow::anyhow;
    use object_factory::{serialize_owned, ObjectFactory};
    use parcel::obj_stream::{ObjStream, ObjStreamError, ObjStreamReader, ObjStreamWriter};

    use crate::{
        collision::collision::{detect_contacts, segments_intersect, shapes_intersect, Contact},
        contact_effect::contact_effect::{ContactEffect, PowerUpKind},
        events::events::SimulationEvent,
        game_options::game_options::{Craft, GameOptions},
        lap::lap::{LapProgress, LapTracker},
        level::level::Level,
        main_character::main_character::{
            Controls, MainCharacter, MAIN_CHARACTER_ID, SPEED_POWER_UP_DURATION,
        },
        maze_element::maze_element::MazeElement,
        track::track::{Track, TrackHeader},
        types::types::{isqrt, Angle, Point2d, Point3d, SimulationTime},
    };

    /// Length of one simulation step.
    pub const SIMULATION_STEP: SimulationTime = 10;
    /// Maximum number of crafts in a session.
    pub const MAX_CHARACTERS: usize = 4;

    /// Module id of the track objects, the only module the object blacklist applies to.
    const TRACK_OBJECT_MODULE: u16 = 1;

    /// The simulated world: the level, its elements and the crafts.
    ///
    /// Everything is integer math and advances in steps of
    /// [`SIMULATION_STEP`], so two sessions fed with the same controls end up
    /// in the same state.
    #[derive(Debug)]
    pub struct GameSession {
        factory: Arc<ObjectFactory>,
        options: GameOptions,

        header: Option<TrackHeader>,
        level: Level,
        characters: [Option<Box<MainCharacter>>; MAX_CHARACTERS],
        simulation_time: SimulationTime,
        lap_count: u32,
    }

    impl GameSession {
        pub fn new(factory: Arc<ObjectFactory>, options: GameOptions) -> Self {
            Self {
                factory,
                options,
                header: None,
                level: Default::default(),
                characters: Default::default(),
                simulation_time: 0,
                lap_count: 1,
            }
        }

        /// Takes over the level of `track`, minus the elements the game options exclude.
        pub fn load_new(&mut self, track: Track) {
            let Track { header, mut level } = track;
            let total = level.free_elements.len();
            let options = &self.options;
            level.free_elements.retain(|element| {
                let id = element.factory_id();
                let allowed = (id.module_id != TRACK_OBJECT_MODULE
                    || options.is_object_allowed(id.class_id))
                    && (options.weapons_enabled() || !element.is_weapon());
                if !allowed {
                    log::debug!(target: "game_session", "dropping blacklisted element {id}");
                }
                allowed
            });
            log::info!(
                target: "game_session",
                "loaded track \"{}\": {} rooms, {} of {} elements, {} starting positions",
                header.name,
                level.rooms.len(),
                level.free_elements.len(),
                total,
                level.starting_positions.len()
            );

            self.lap_count = header.laps.max(1);
            self.header = Some(header);
            self.level = level;
            self.characters = Default::default();
            self.simulation_time = 0;
        }

        pub fn header(&self) -> Option<&TrackHeader> {
            self.header.as_ref()
        }

        pub fn level(&self) -> &Level {
            &self.level
        }

        pub fn options(&self) -> &GameOptions {
            &self.options
        }

        pub fn factory(&self) -> &Arc<ObjectFactory> {
            &self.factory
        }

        /// Laps of crafts added afterwards, the track's lap count by default.
        pub fn set_lap_count(&mut self, laps: u32) {
            self.lap_count = laps.max(1);
        }

        pub fn lap_count(&self) -> u32 {
            self.lap_count
        }

        pub fn simulation_time(&self) -> SimulationTime {
            self.simulation_time
        }

        /// Puts a new craft on starting position `slot`.
        pub fn add_main_character(&mut self, slot: usize, craft: Craft) -> anyhow::Result<()> {
            anyhow::ensure!(slot < MAX_CHARACTERS, "craft slot {slot} is out of range");
            let start = self
                .level
                .starting_positions
                .get(slot)
                .or(self.level.starting_positions.first())
                .copied()
                .ok_or_else(|| anyhow!("the level has no starting position"))?;

            let mut character = self
                .factory
                .create_object(MAIN_CHARACTER_ID)?
                .narrow::<MainCharacter>()
                .map_err(|obj| anyhow!("object {} is not a main character", obj.id()))?;
            character.state.craft = craft;
            character.state.position = start.position;
            character.state.orientation = start.orientation;
            character.state.room = start.room;
            character.state.lap = LapTracker::new(self.lap_count, self.simulation_time);
            self.characters[slot] = Some(character);
            Ok(())
        }

        pub fn character(&self, slot: usize) -> Option<&MainCharacter> {
            self.characters.get(slot)?.as_deref()
        }

        pub fn set_controls(&mut self, slot: usize, controls: Controls) {
            if let Some(character) = self.characters.get_mut(slot).and_then(|c| c.as_mut()) {
                character.state.controls = controls;
            }
        }

        /// Moves a craft without simulating the way there. The craft stops.
        pub fn teleport_character(&mut self, slot: usize, position: Point3d, orientation: Angle) {
            let room = self.level.find_room(position.xy());
            if let Some(character) = self.characters.get_mut(slot).and_then(|c| c.as_mut()) {
                character.state.position = position;
                character.state.orientation = orientation;
                character.state.speed = Point2d::default();
                if let Some(room) = room {
                    character.state.room = room;
                }
            }
        }

        /// Simulates up to `time` in steps of [`SIMULATION_STEP`].
        pub fn simulate(&mut self, time: SimulationTime) -> Vec<SimulationEvent> {
            let mut events = Vec::new();
            while self.simulation_time + SIMULATION_STEP <= time {
                self.simulation_time += SIMULATION_STEP;
                self.step(&mut events);
            }
            events
        }

        fn step(&mut self, events: &mut Vec<SimulationEvent>) {
            let time = self.simulation_time;
            let Self {
                level, characters, ..
            } = self;

            for element in level.free_elements.iter_mut() {
                element.simulate(SIMULATION_STEP);
            }

            for (slot, character) in characters.iter_mut().enumerate() {
                let Some(character) = character else {
                    continue;
                };
                let target = character.step(SIMULATION_STEP);
                if !move_character(level, character, target) {
                    events.push(SimulationEvent::WallHit { slot });
                }
            }

            craft_contacts(characters, events);

            // contacts are collected for everyone before anything is applied
            let contacts: Vec<(usize, Vec<Contact>)> = characters
                .iter()
                .enumerate()
                .filter_map(|(slot, character)| {
                    let character = character.as_deref()?;
                    Some((
                        slot,
                        detect_contacts(character, character.state.room, &level.free_elements),
                    ))
                })
                .collect();

            for (slot, contacts) in contacts {
                let Some(character) = characters[slot].as_deref_mut() else {
                    continue;
                };
                for contact in contacts {
                    for effect in contact.effects.iter() {
                        apply_effect(
                            level,
                            contact.element,
                            slot,
                            character,
                            effect,
                            time,
                            events,
                        );
                    }
                }
            }
        }

        fn serialize_characters(
            factory: &ObjectFactory,
            archive: &mut ObjStream,
            characters: &mut [Option<Box<MainCharacter>>; MAX_CHARACTERS],
        ) -> Result<(), ObjStreamError> {
            for character in characters.iter_mut() {
                serialize_owned(factory, archive, character)?;
            }
            Ok(())
        }

        /// Binary snapshot of the dynamic state: time, elements and crafts.
        pub fn save_state(&mut self) -> Result<Vec<u8>, ObjStreamError> {
            let mut writer = ObjStreamWriter::with_header();
            let mut archive = ObjStream::Writing(&mut writer);

            let mut time = self.simulation_time;
            archive.io(&mut time)?;

            let mut count = self.level.free_elements.len() as u32;
            archive.io(&mut count)?;
            let mut elements: Vec<Option<Box<dyn MazeElement>>> =
                std::mem::take(&mut self.level.free_elements)
                    .into_iter()
                    .map(Some)
                    .collect();
            let res = elements
                .iter_mut()
                .try_for_each(|element| serialize_owned(&self.factory, &mut archive, element));
            self.level.free_elements = elements.into_iter().flatten().collect();
            res?;

            Self::serialize_characters(&self.factory, &mut archive, &mut self.characters)?;
            Ok(writer.into_inner())
        }

        /// Restores a state written by [`GameSession::save_state`] for the same level.
        ///
        /// Nothing changes if the state can't be read.
        pub fn load_state(&mut self, data: &[u8]) -> Result<(), ObjStreamError> {
            let mut reader = ObjStreamReader::with_header(data)?;
            let mut archive = ObjStream::Reading(&mut reader);

            let mut time: SimulationTime = 0;
            archive.io(&mut time)?;
            let mut count: u32 = 0;
            archive.io(&mut count)?;

            let mut elements = Vec::new();
            for _ in 0..count {
                let mut element: Option<Box<dyn MazeElement>> = None;
                serialize_owned(&self.factory, &mut archive, &mut element)?;
                elements.extend(element);
            }
            let mut characters: [Option<Box<MainCharacter>>; MAX_CHARACTERS] = Default::default();
            Self::serialize_characters(&self.factory, &mut archive, &mut characters)?;

            self.simulation_time = time;
            self.level.free_elements = elements;
            self.characters = characters;
            Ok(())
        }
    }

    /// Moves the craft to `target` if nothing is in the way.
    /// Returns `false` if the craft bounced off a wall.
    fn move_character(level: &Level, character: &mut MainCharacter, target: Point2d) -> bool {
        let from = character.state.position.xy();
        let Some(room) = level.rooms.get(character.state.room) else {
            if let Some(room) = level.find_room(target) {
                character.state.room = room;
            }
            character.state.position.x = target.x;
            character.state.position.y = target.y;
            return true;
        };

        let new_room = if room.contains(target) {
            Some(character.state.room)
        } else {
            (0..room.walls.len())
                .find(|&i| {
                    let (a, b) = room.wall_segment(i);
                    segments_intersect(from, target, a, b)
                })
                .and_then(|i| room.walls[i].neighbor)
                .filter(|&neighbor| {
                    level
                        .rooms
                        .get(neighbor)
                        .is_some_and(|room| room.contains(target))
                })
        };

        match new_room {
            Some(new_room) => {
                character.state.room = new_room;
                character.state.position.x = target.x;
                character.state.position.y = target.y;
                character.state.position.z = level.rooms[new_room].floor;
                true
            }
            None => {
                let speed = &mut character.state.speed;
                speed.x = -speed.x / 2;
                speed.y = -speed.y / 2;
                false
            }
        }
    }

    /// Crafts that drive into each other swap their speed.
    fn craft_contacts(
        characters: &mut [Option<Box<MainCharacter>>; MAX_CHARACTERS],
        events: &mut Vec<SimulationEvent>,
    ) {
        for i in 0..MAX_CHARACTERS {
            for j in (i + 1)..MAX_CHARACTERS {
                let (left, right) = characters.split_at_mut(j);
                let (Some(a), Some(b)) = (left[i].as_deref_mut(), right[0].as_deref_mut()) else {
                    continue;
                };
                if a.state.room != b.state.room || !shapes_intersect(&*a, &*b) {
                    continue;
                }
                let dp = b.state.position.xy() - a.state.position.xy();
                let dv = b.state.speed - a.state.speed;
                let approaching = dp.x as i64 * dv.x as i64 + dp.y as i64 * dv.y as i64;
                if approaching >= 0 {
                    continue;
                }

                let a_is_faster = a.speed_len() >= b.speed_len();
                std::mem::swap(&mut a.state.speed, &mut b.state.speed);
                let (hitter, victim) = if a_is_faster {
                    ((i, a), (j, b))
                } else {
                    ((j, b), (i, a))
                };
                hitter.1.state.hits_given += 1;
                victim.1.state.hits_received += 1;
                events.push(SimulationEvent::CraftHit {
                    slot: hitter.0,
                    other: victim.0,
                });
            }
        }
    }

    fn apply_effect(
        level: &mut Level,
        element_index: usize,
        slot: usize,
        character: &mut MainCharacter,
        effect: &ContactEffect,
        time: SimulationTime,
        events: &mut Vec<SimulationEvent>,
    ) {
        let Some(element) = level.free_elements.get_mut(element_index) else {
            return;
        };
        if !element.on_contact(effect, time) {
            return;
        }

        match *effect {
            ContactEffect::PhysicalCollision { weight, elasticity } => {
                let Some(shape) = element.contact_effect_shape() else {
                    return;
                };
                let shape = shape.receiving_contact_effect_shape();
                let (axis, ray) = (shape.axis(), shape.ray_len() as i64);
                push_out(level, character, axis, ray, weight, elasticity);
            }
            ContactEffect::CheckPoint(check_point) => {
                let Some(progress) = character
                    .state
                    .lap
                    .on_check_point(check_point.check_point_type, time)
                else {
                    return;
                };
                let event = match progress {
                    LapProgress::CheckPoint(check_point) => SimulationEvent::CheckPoint {
                        slot,
                        check_point,
                        time,
                    },
                    LapProgress::LapCompleted { lap, lap_time } => {
                        log::debug!(
                            target: "game_session",
                            "craft {slot} completed lap {lap} in {lap_time} ms"
                        );
                        SimulationEvent::LapCompleted {
                            slot,
                            lap,
                            lap_time,
                        }
                    }
                    LapProgress::Finished { total_time, .. } => {
                        log::info!(
                            target: "game_session",
                            "craft {slot} finished in {total_time} ms"
                        );
                        SimulationEvent::Finished {
                            slot,
                            time: total_time,
                        }
                    }
                };
                events.push(event);
            }
            ContactEffect::PowerUp(kind) => {
                match kind {
                    PowerUpKind::Missile => character.state.missiles += 1,
                    PowerUpKind::Mine => character.state.mines += 1,
                    PowerUpKind::Speed => character.state.boost_time = SPEED_POWER_UP_DURATION,
                }
                events.push(SimulationEvent::PickedUp { slot, kind });
            }
            ContactEffect::SpeedDoper { boost } => {
                character.push_forward(boost * SIMULATION_STEP / 1000);
            }
        }
    }

    /// Pushes the craft out of the circle around `axis` and reflects its speed.
    fn push_out(
        level: &Level,
        character: &mut MainCharacter,
        axis: Point2d,
        ray: i64,
        weight: i32,
        elasticity: i32,
    ) {
        let stats = character.stats();
        let position = character.state.position.xy();
        let mut dir = position - axis;
        let mut dist = isqrt(position.dist_sq(&axis));
        if dist == 0 {
            dir = Point2d::new(1, 0);
            dist = 1;
        }
        let (dx, dy) = (dir.x as i64, dir.y as i64);

        let wanted = ray + stats.ray as i64;
        if dist < wanted {
            let target = Point2d::new(
                (axis.x as i64 + dx * wanted / dist) as i32,
                (axis.y as i64 + dy * wanted / dist) as i32,
            );
            if let Some(room) = level.find_room(target) {
                character.state.position.x = target.x;
                character.state.position.y = target.y;
                character.state.room = room;
            }
        }

        let speed = &mut character.state.speed;
        let normal_speed = (speed.x as i64 * dx + speed.y as i64 * dy) / dist;
        if normal_speed < 0 {
            // heavy elements give a full bounce, light ones barely react
            let weight = weight.max(0) as i64;
            let factor =
                (1000 + elasticity as i64) * 2 * weight / (weight + stats.weight as i64).max(1);
            speed.x -= (normal_speed * factor * dx / dist / 1000) as i32;
            speed.y -= (normal_speed * factor * dy / dist / 1000) as i32;
        }
    }

    #[cfg(test)]
    mod test {
        use std::sync::Arc;

        use object_factory::{ObjectFactory, ObjectFromFactory, ObjectFromFactoryId};
        use parcel::obj_stream::{ObjStreamError, ObjStreamReader, ObjStreamWriter};

        use super::GameSession;
        use crate::{
            contact_effect::contact_effect::{
                CheckPoint, CheckPointType, ContactEffect, ContactEffectShapeInterface,
                EffectShape,
            },
            events::events::SimulationEvent,
            game_options::game_options::{Craft, GameOptions},
            level::level::{Level, Room, Wall},
            main_character::main_character::{self, Controls},
            maze_element::maze_element::{FreeElement, MazeElement},
            shape::shape::CylinderShape,
            track::track::{Track, TrackHeader},
            types::types::{Angle, Point2d, Point3d},
        };

        #[derive(Debug)]
        struct Gate {
            id: ObjectFromFactoryId,
            element: FreeElement,
            shape: EffectShape<CylinderShape>,
        }

        impl Gate {
            fn check_point_type(&self) -> CheckPointType {
                match self.id.class_id {
                    151 => CheckPointType::CheckPoint1,
                    152 => CheckPointType::CheckPoint2,
                    _ => CheckPointType::FinishLine,
                }
            }

            fn update_shape(&mut self) {
                self.shape = EffectShape::new(
                    CylinderShape {
                        axis: self.element.position.xy(),
                        ray: 1000,
                        z_min: self.element.position.z,
                        z_max: self.element.position.z + 2000,
                    },
                    vec![ContactEffect::CheckPoint(CheckPoint {
                        check_point_type: self.check_point_type(),
                    })],
                );
            }
        }

        impl ObjectFromFactory for Gate {
            fn factory_id(&self) -> ObjectFromFactoryId {
                self.id
            }

            fn save(&self, archive: &mut ObjStreamWriter) -> Result<(), ObjStreamError> {
                archive.write(&self.element)
            }

            fn load(&mut self, archive: &mut ObjStreamReader) -> Result<(), ObjStreamError> {
                self.element = archive.read()?;
                self.update_shape();
                Ok(())
            }
        }

        impl MazeElement for Gate {
            fn free_element(&self) -> &FreeElement {
                &self.element
            }

            fn free_element_mut(&mut self) -> &mut FreeElement {
                &mut self.element
            }

            fn place(&mut self, placement: FreeElement) {
                self.element = placement;
                self.update_shape();
            }

            fn contact_effect_shape(&self) -> Option<&dyn ContactEffectShapeInterface> {
                Some(&self.shape)
            }

            fn is_weapon(&self) -> bool {
                self.id.class_id >= 1100
            }
        }

        fn new_gate(id: ObjectFromFactoryId) -> Box<dyn MazeElement> {
            let mut gate = Gate {
                id,
                element: Default::default(),
                shape: Default::default(),
            };
            gate.update_shape();
            Box::new(gate)
        }

        const FINISH: ObjectFromFactoryId = ObjectFromFactoryId::new(1, 150);
        const CP1: ObjectFromFactoryId = ObjectFromFactoryId::new(1, 151);
        const CP2: ObjectFromFactoryId = ObjectFromFactoryId::new(1, 152);
        const WEAPON: ObjectFromFactoryId = ObjectFromFactoryId::new(1, 1100);

        fn factory() -> Arc<ObjectFactory> {
            let mut factory = ObjectFactory::init();
            main_character::register(&mut factory).unwrap();
            for id in [FINISH, CP1, CP2, WEAPON] {
                factory.register::<dyn MazeElement>(id, new_gate).unwrap();
            }
            Arc::new(factory)
        }

        fn at(x: i32, y: i32) -> FreeElement {
            FreeElement {
                position: Point3d::new(x, y, 0),
                orientation: Angle::new(0),
                room: 0,
            }
        }

        fn track(factory: &ObjectFactory, laps: u32) -> Track {
            let corners = [(0, 0), (100_000, 0), (100_000, 100_000), (0, 100_000)];
            let room = Room {
                floor: 0,
                ceiling: 5000,
                walls: corners
                    .into_iter()
                    .map(|(x, y)| Wall {
                        start: Point2d::new(x, y),
                        neighbor: None,
                    })
                    .collect(),
            };
            let free_elements = [
                (FINISH, at(10_000, 10_000)),
                (CP1, at(30_000, 30_000)),
                (CP2, at(60_000, 60_000)),
                (WEAPON, at(80_000, 20_000)),
            ]
            .into_iter()
            .map(|(id, placement)| {
                let mut element = factory
                    .create_object(id)
                    .unwrap()
                    .narrow::<dyn MazeElement>()
                    .unwrap();
                element.place(placement);
                element
            })
            .collect();
            Track {
                header: TrackHeader {
                    name: "square".to_string(),
                    laps,
                    ..Default::default()
                },
                level: Level {
                    rooms: vec![room],
                    free_elements,
                    starting_positions: vec![at(10_000, 10_000), at(12_000, 10_000)],
                },
            }
        }

        fn visit(session: &mut GameSession, x: i32, y: i32) -> Vec<SimulationEvent> {
            session.teleport_character(0, Point3d::new(x, y, 0), Angle::new(0));
            let time = session.simulation_time() + 10;
            session.simulate(time)
        }

        #[test]
        fn laps_by_teleport() {
            let factory = factory();
            let mut session = GameSession::new(factory.clone(), GameOptions::default());
            session.load_new(track(&factory, 2));
            assert_eq!(session.lap_count(), 2);
            session.add_main_character(0, Craft::Bi).unwrap();

            // starting on the finish line
            assert!(session.simulate(100).is_empty());
            assert_eq!(session.simulation_time(), 100);

            assert_eq!(
                visit(&mut session, 30_000, 30_000),
                vec![SimulationEvent::CheckPoint {
                    slot: 0,
                    check_point: CheckPointType::CheckPoint1,
                    time: 110
                }]
            );
            visit(&mut session, 60_000, 60_000);
            assert_eq!(
                visit(&mut session, 10_000, 10_000),
                vec![SimulationEvent::LapCompleted {
                    slot: 0,
                    lap: 1,
                    lap_time: 130
                }]
            );
            visit(&mut session, 30_000, 30_000);
            visit(&mut session, 60_000, 60_000);
            assert_eq!(
                visit(&mut session, 10_000, 10_000),
                vec![SimulationEvent::Finished { slot: 0, time: 160 }]
            );
            let character = session.character(0).unwrap();
            assert!(character.state.lap.is_finished());
            assert_eq!(character.state.lap.best_lap(), Some(30));
        }

        #[test]
        fn blacklisted_elements_are_dropped() {
            let factory = factory();
            let mut options = GameOptions::default();
            options.blacklist_object(CP1.class_id);
            let mut session = GameSession::new(factory.clone(), options);
            session.load_new(track(&factory, 1));
            assert_eq!(session.level().free_elements.len(), 3);

            let mut options = GameOptions::default();
            options.set_weapons_enabled(false);
            let mut session = GameSession::new(factory.clone(), options);
            session.load_new(track(&factory, 1));
            let ids: Vec<_> = session
                .level()
                .free_elements
                .iter()
                .map(|element| element.factory_id())
                .collect();
            assert_eq!(ids, vec![FINISH, CP1, CP2]);
        }

        #[test]
        fn walls_bounce() {
            let factory = factory();
            let mut session = GameSession::new(factory.clone(), GameOptions::default());
            session.load_new(track(&factory, 1));
            session.add_main_character(0, Craft::Eon).unwrap();
            session.teleport_character(0, Point3d::new(95_000, 50_000, 0), Angle::new(0));
            session.set_controls(0, Controls::THRUST);

            let events = session.simulate(3000);
            assert!(events.contains(&SimulationEvent::WallHit { slot: 0 }));
            let character = session.character(0).unwrap();
            assert!(character.state.position.x <= 100_000);
            assert_eq!(character.state.room, 0);
        }

        #[test]
        fn state_round_trip() {
            let factory = factory();
            let mut session = GameSession::new(factory.clone(), GameOptions::default());
            session.load_new(track(&factory, 3));
            session.add_main_character(0, Craft::Cx).unwrap();
            session.add_main_character(1, Craft::Eon).unwrap();
            visit(&mut session, 30_000, 30_000);

            let state = session.save_state().unwrap();
            assert_eq!(session.level().free_elements.len(), 4);

            visit(&mut session, 60_000, 60_000);
            assert_eq!(
                session.character(0).unwrap().state.lap.next_check_point(),
                CheckPointType::FinishLine
            );

            session.load_state(&state).unwrap();
            assert_eq!(session.simulation_time(), 10);
            assert_eq!(session.level().free_elements.len(), 4);
            let character = session.character(0).unwrap();
            assert_eq!(character.state.craft, Craft::Cx);
            assert_eq!(character.state.position, Point3d::new(30_000, 30_000, 0));
            assert_eq!(
                character.state.lap.next_check_point(),
                CheckPointType::CheckPoint2
            );
            assert_eq!(session.character(1).unwrap().state.craft, Craft::Eon);
            assert!(session.character(2).is_none());

            // a broken state changes nothing
            assert!(session.load_state(&state[..state.len() - 3]).is_err());
            assert_eq!(session.simulation_time(), 10);
            assert!(session.load_state(b"garbage").is_err());
        }
    }
}
