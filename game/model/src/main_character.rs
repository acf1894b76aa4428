pub mod main_character {
    use bitflags::bitflags;
    use object_factory::{FactoryError, ObjectFactory, ObjectFromFactory, ObjectFromFactoryId};
    use parcel::obj_stream::{ObjStreamError, ObjStreamReader, ObjStreamWriter};
    use serde::{Deserialize, Serialize};

    use crate::{
        game_options::game_options::Craft,
        lap::lap::LapTracker,
        shape::shape::{ShapeInterface, ShapeKind},
        types::types::{isqrt, Angle, Coordinate, Point2d, Point3d, SimulationTime, TRIGO_FRACT},
        MAIN_CHARACTER_MODULE,
    };

    pub const MAIN_CHARACTER_ID: ObjectFromFactoryId =
        ObjectFromFactoryId::new(MAIN_CHARACTER_MODULE, 1);

    /// How long a speed power up lasts.
    pub const SPEED_POWER_UP_DURATION: SimulationTime = 3000;

    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Controls(u8);
    bitflags! {
        impl Controls: u8 {
            const THRUST = (1 << 0);
            const BRAKE = (1 << 1);
            const LEFT = (1 << 2);
            const RIGHT = (1 << 3);
            const FIRE = (1 << 4);
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CraftStats {
        /// mm/s
        pub max_speed: i32,
        /// mm/s²
        pub acceleration: i32,
        /// angle units per second
        pub turn_rate: i32,
        pub ray: Coordinate,
        pub height: Coordinate,
        pub weight: i32,
    }

    impl Craft {
        pub fn stats(&self) -> CraftStats {
            match self {
                Craft::Eon => CraftStats {
                    max_speed: 60_000,
                    acceleration: 30_000,
                    turn_rate: 2048,
                    ray: 700,
                    height: 1000,
                    weight: 1200,
                },
                Craft::Cx => CraftStats {
                    max_speed: 55_000,
                    acceleration: 35_000,
                    turn_rate: 2400,
                    ray: 650,
                    height: 900,
                    weight: 1000,
                },
                Craft::Bi => CraftStats {
                    max_speed: 50_000,
                    acceleration: 40_000,
                    turn_rate: 2800,
                    ray: 600,
                    height: 900,
                    weight: 900,
                },
                Craft::Basic => CraftStats {
                    max_speed: 45_000,
                    acceleration: 30_000,
                    turn_rate: 2600,
                    ray: 600,
                    height: 900,
                    weight: 1000,
                },
            }
        }
    }

    /// Everything of a craft that is part of a saved state.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CharacterState {
        pub craft: Craft,
        pub position: Point3d,
        pub orientation: Angle,
        /// mm/s
        pub speed: Point2d,
        pub room: usize,
        pub controls: Controls,
        pub lap: LapTracker,

        pub hits_given: u32,
        pub hits_received: u32,
        pub missiles: u32,
        pub mines: u32,
        pub boost_time: SimulationTime,
    }

    impl Default for CharacterState {
        fn default() -> Self {
            Self {
                craft: Default::default(),
                position: Default::default(),
                orientation: Default::default(),
                speed: Default::default(),
                room: 0,
                controls: Controls::empty(),
                lap: LapTracker::new(1, 0),
                hits_given: 0,
                hits_received: 0,
                missiles: 0,
                mines: 0,
                boost_time: 0,
            }
        }
    }

    /// The craft of a player.
    #[derive(Debug)]
    pub struct MainCharacter {
        id: ObjectFromFactoryId,
        pub state: CharacterState,
    }

    impl MainCharacter {
        pub fn new(id: ObjectFromFactoryId) -> Self {
            Self {
                id,
                state: Default::default(),
            }
        }

        pub fn stats(&self) -> CraftStats {
            self.state.craft.stats()
        }

        pub fn speed_len(&self) -> i64 {
            let speed = self.state.speed;
            isqrt(speed.x as i64 * speed.x as i64 + speed.y as i64 * speed.y as i64)
        }

        fn max_speed(&self) -> i32 {
            let max_speed = self.stats().max_speed;
            if self.state.boost_time > 0 {
                max_speed + max_speed / 2
            } else {
                max_speed
            }
        }

        /// Adds `amount` mm/s in the direction the craft is facing.
        pub fn push_forward(&mut self, amount: i32) {
            let orientation = self.state.orientation;
            self.state.speed.x +=
                (amount as i64 * orientation.cos() as i64 / TRIGO_FRACT as i64) as i32;
            self.state.speed.y +=
                (amount as i64 * orientation.sin() as i64 / TRIGO_FRACT as i64) as i32;
        }

        /// Applies the controls for `duration` ms and returns where the craft
        /// would end up. Walls are not considered here.
        pub fn step(&mut self, duration: SimulationTime) -> Point2d {
            let stats = self.stats();
            let controls = self.state.controls;

            let turn = stats.turn_rate * duration / 1000;
            if controls.contains(Controls::LEFT) {
                self.state.orientation = self.state.orientation.rotated(turn);
            }
            if controls.contains(Controls::RIGHT) {
                self.state.orientation = self.state.orientation.rotated(-turn);
            }
            if controls.contains(Controls::THRUST) {
                self.push_forward(stats.acceleration * duration / 1000);
            }

            let speed = &mut self.state.speed;
            // air friction, brakes are a lot stronger
            let drag = if controls.contains(Controls::BRAKE) {
                duration * 8
            } else {
                duration / 2
            };
            speed.x -= (speed.x as i64 * drag as i64 / 1000) as i32;
            speed.y -= (speed.y as i64 * drag as i64 / 1000) as i32;

            let max_speed = self.max_speed() as i64;
            let len = self.speed_len();
            if len > max_speed {
                let speed = &mut self.state.speed;
                speed.x = (speed.x as i64 * max_speed / len) as i32;
                speed.y = (speed.y as i64 * max_speed / len) as i32;
            }
            self.state.boost_time = (self.state.boost_time - duration).max(0);

            let speed = self.state.speed;
            self.state.position.xy()
                + Point2d::new(
                    (speed.x as i64 * duration as i64 / 1000) as Coordinate,
                    (speed.y as i64 * duration as i64 / 1000) as Coordinate,
                )
        }
    }

    impl ObjectFromFactory for MainCharacter {
        fn factory_id(&self) -> ObjectFromFactoryId {
            self.id
        }

        fn save(&self, archive: &mut ObjStreamWriter) -> Result<(), ObjStreamError> {
            archive.write(&self.state)
        }

        fn load(&mut self, archive: &mut ObjStreamReader) -> Result<(), ObjStreamError> {
            self.state = archive.read()?;
            Ok(())
        }
    }

    impl ShapeInterface for MainCharacter {
        fn shape_kind(&self) -> ShapeKind {
            ShapeKind::Cylinder
        }

        fn z_min(&self) -> Coordinate {
            self.state.position.z
        }

        fn z_max(&self) -> Coordinate {
            self.state.position.z + self.stats().height
        }

        fn axis_x(&self) -> Coordinate {
            self.state.position.x
        }

        fn axis_y(&self) -> Coordinate {
            self.state.position.y
        }

        fn ray_len(&self) -> Coordinate {
            self.stats().ray
        }
    }

    fn new_main_character(id: ObjectFromFactoryId) -> Box<MainCharacter> {
        Box::new(MainCharacter::new(id))
    }

    /// Registers the main character module.
    pub fn register(factory: &mut ObjectFactory) -> Result<(), FactoryError> {
        factory.register::<MainCharacter>(MAIN_CHARACTER_ID, new_main_character)
    }

}
