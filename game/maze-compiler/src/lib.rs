//! Turns the text description of a track into a [`Track`].

pub mod error;

use model::{
    level::level::{Level, Room, StartingPosition, Wall, MAX_STARTING_POSITIONS},
    maze_element::maze_element::{FreeElement, MazeElement},
    track::track::{Track, TrackHeader},
    types::types::{Angle, Coordinate, Point2d, Point3d},
};
use object_factory::{ObjectFactory, ObjectFromFactoryId};
use track_spec::parser::TrackSpecParser;

pub use error::{CompileError, CompileErrorKind};

const DEFAULT_CEILING: Coordinate = 5000;

/// Something that refers to a room by index, checked once all rooms are known.
struct RoomRef {
    room: usize,
    line: usize,
}

struct Compiler<'a> {
    parser: TrackSpecParser,
    factory: &'a ObjectFactory,

    header: Option<TrackHeader>,
    rooms: Vec<Room>,
    elements: Vec<Box<dyn MazeElement>>,
    starting_positions: Vec<StartingPosition>,
    room_refs: Vec<RoomRef>,
    neighbor_refs: Vec<RoomRef>,
}

impl<'a> Compiler<'a> {
    fn error(&self, kind: CompileErrorKind) -> CompileError {
        CompileError {
            line: self.parser.get_error_line(),
            kind,
        }
    }

    fn num(&mut self, attrib: &str) -> Result<i32, CompileError> {
        match self.parser.get_next_num_param(f64::NAN) {
            Some(value) if value.is_finite() => Ok(value.round() as i32),
            _ => Err(self.error(CompileErrorKind::BadParameter(attrib.to_string()))),
        }
    }

    fn optional_num(&mut self, attrib: &str) -> Result<Option<i32>, CompileError> {
        match self.parser.get_next_num_param(f64::NAN) {
            Some(value) if value.is_nan() => Ok(None),
            Some(value) if value.is_finite() => Ok(Some(value.round() as i32)),
            _ => Err(self.error(CompileErrorKind::BadParameter(attrib.to_string()))),
        }
    }

    fn index(&mut self, attrib: &str) -> Result<usize, CompileError> {
        let value = self.num(attrib)?;
        usize::try_from(value)
            .map_err(|_| self.error(CompileErrorKind::BadParameter(attrib.to_string())))
    }

    fn unknown_attribute(&self, attrib: String) -> CompileError {
        self.error(CompileErrorKind::UnknownAttribute(attrib))
    }

    /// `Position x y z [orientation]`
    fn placement(&mut self, attrib: &str) -> Result<(Point3d, Angle), CompileError> {
        let x = self.num(attrib)?;
        let y = self.num(attrib)?;
        let z = self.num(attrib)?;
        let orientation = self.optional_num(attrib)?.unwrap_or(0);
        Ok((Point3d::new(x, y, z), Angle::new(orientation)))
    }

    fn compile_header(&mut self) -> Result<(), CompileError> {
        let mut header = TrackHeader::default();
        while let Some(attrib) = self.parser.get_next_attrib(None) {
            match attrib.as_str() {
                "Name" | "Description" => {
                    let value = self
                        .parser
                        .get_next_str_param(None)
                        .ok_or_else(|| self.error(CompileErrorKind::BadParameter(attrib.clone())))?;
                    if attrib == "Name" {
                        header.name = value;
                    } else {
                        header.description = value;
                    }
                }
                "Laps" => {
                    let laps = self.num(&attrib)?;
                    header.laps = u32::try_from(laps)
                        .ok()
                        .filter(|laps| *laps > 0)
                        .ok_or_else(|| self.error(CompileErrorKind::BadParameter(attrib)))?;
                }
                "Players" => {
                    let players = self.index(&attrib)?;
                    if !(1..=MAX_STARTING_POSITIONS).contains(&players) {
                        return Err(self.error(CompileErrorKind::BadParameter(attrib)));
                    }
                    header.max_players = players;
                }
                _ => return Err(self.unknown_attribute(attrib)),
            }
        }
        self.header = Some(header);
        Ok(())
    }

    fn compile_room(&mut self) -> Result<(), CompileError> {
        let class_line = self.parser.get_error_line();
        let mut id = None;
        let mut room = Room {
            floor: 0,
            ceiling: DEFAULT_CEILING,
            walls: Vec::new(),
        };
        while let Some(attrib) = self.parser.get_next_attrib(None) {
            match attrib.as_str() {
                "Id" => id = Some(self.index(&attrib)?),
                "Floor" => room.floor = self.num(&attrib)?,
                "Ceiling" => room.ceiling = self.num(&attrib)?,
                "Wall" => {
                    let x = self.num(&attrib)?;
                    let y = self.num(&attrib)?;
                    let neighbor = match self.optional_num(&attrib)? {
                        Some(neighbor) => Some(
                            usize::try_from(neighbor)
                                .map_err(|_| self.error(CompileErrorKind::BadParameter(attrib)))?,
                        ),
                        None => None,
                    };
                    if let Some(neighbor) = neighbor {
                        self.neighbor_refs.push(RoomRef {
                            room: neighbor,
                            line: self.parser.get_error_line(),
                        });
                    }
                    room.walls.push(Wall {
                        start: Point2d::new(x, y),
                        neighbor,
                    });
                }
                _ => return Err(self.unknown_attribute(attrib)),
            }
        }

        let expected = self.rooms.len();
        let fail = |kind| CompileError {
            line: class_line,
            kind,
        };
        match id {
            Some(id) if id == expected => {}
            Some(found) => return Err(fail(CompileErrorKind::RoomIdOrder { expected, found })),
            None => return Err(fail(CompileErrorKind::MissingAttribute("Id"))),
        }
        if room.walls.len() < 3 {
            return Err(fail(CompileErrorKind::TooFewWalls { room: expected }));
        }
        if room.ceiling <= room.floor {
            return Err(fail(CompileErrorKind::BadParameter("Ceiling".to_string())));
        }
        self.rooms.push(room);
        Ok(())
    }

    /// Shared by free elements and starting positions.
    fn compile_placed(
        &mut self,
        mut on_attrib: impl FnMut(&mut Self, &str) -> Result<bool, CompileError>,
    ) -> Result<FreeElement, CompileError> {
        let class_line = self.parser.get_error_line();
        let mut room = None;
        let mut placement = None;
        while let Some(attrib) = self.parser.get_next_attrib(None) {
            match attrib.as_str() {
                "Room" => room = Some(self.index(&attrib)?),
                "Position" => placement = Some(self.placement(&attrib)?),
                _ => {
                    if !on_attrib(self, &attrib)? {
                        return Err(self.unknown_attribute(attrib));
                    }
                }
            }
        }
        let missing = |name| CompileError {
            line: class_line,
            kind: CompileErrorKind::MissingAttribute(name),
        };
        let room = room.ok_or_else(|| missing("Room"))?;
        let (position, orientation) = placement.ok_or_else(|| missing("Position"))?;
        self.room_refs.push(RoomRef {
            room,
            line: class_line,
        });
        Ok(FreeElement {
            position,
            orientation,
            room,
        })
    }

    fn compile_free_element(&mut self) -> Result<(), CompileError> {
        let class_line = self.parser.get_error_line();
        let mut id = None;
        let placement = self.compile_placed(|compiler, attrib| {
            if attrib != "Type" {
                return Ok(false);
            }
            let module_id = compiler.num(attrib)?;
            let class_id = compiler.num(attrib)?;
            let (Ok(module_id), Ok(class_id)) = (u16::try_from(module_id), u16::try_from(class_id))
            else {
                return Err(compiler.error(CompileErrorKind::BadParameter(attrib.to_string())));
            };
            let type_id = ObjectFromFactoryId::new(module_id, class_id);
            if !compiler.factory.is_registered(&type_id) {
                return Err(compiler.error(CompileErrorKind::UnregisteredElement(type_id)));
            }
            id = Some((type_id, compiler.parser.get_error_line()));
            Ok(true)
        })?;

        let (id, line) = id.ok_or(CompileError {
            line: class_line,
            kind: CompileErrorKind::MissingAttribute("Type"),
        })?;
        let mut element = self
            .factory
            .create_object(id)
            .ok()
            .and_then(|obj| obj.narrow::<dyn MazeElement>().ok())
            .ok_or(CompileError {
                line,
                kind: CompileErrorKind::NotAMazeElement(id),
            })?;
        element.place(placement);
        self.elements.push(element);
        Ok(())
    }

    fn compile_starting_position(&mut self) -> Result<(), CompileError> {
        let class_line = self.parser.get_error_line();
        let placement = self.compile_placed(|_, _| Ok(false))?;
        if self.starting_positions.len() >= MAX_STARTING_POSITIONS {
            return Err(CompileError {
                line: class_line,
                kind: CompileErrorKind::TooManyStartingPositions,
            });
        }
        self.starting_positions.push(placement);
        Ok(())
    }

    fn compile(mut self) -> Result<Track, CompileError> {
        while let Some(class) = self.parser.get_next_class(None) {
            match class.as_str() {
                "Header" => self.compile_header()?,
                "Room" => self.compile_room()?,
                "FreeElement" => self.compile_free_element()?,
                "StartingPosition" => self.compile_starting_position()?,
                _ => return Err(self.error(CompileErrorKind::UnknownClass(class))),
            }
        }
        let last_line = self.parser.get_error_line();

        let room_count = self.rooms.len();
        if let Some(bad) = self
            .neighbor_refs
            .iter()
            .chain(self.room_refs.iter())
            .find(|r| r.room >= room_count)
        {
            return Err(CompileError {
                line: bad.line,
                kind: CompileErrorKind::UnknownRoom(bad.room),
            });
        }

        let header = self.header.ok_or(CompileError {
            line: last_line,
            kind: CompileErrorKind::MissingHeader,
        })?;
        if self.starting_positions.is_empty() {
            return Err(CompileError {
                line: last_line,
                kind: CompileErrorKind::NoStartingPosition,
            });
        }

        log::info!(
            target: "maze_compiler",
            "compiled \"{}\": {} rooms, {} elements, {} starting positions",
            header.name,
            self.rooms.len(),
            self.elements.len(),
            self.starting_positions.len()
        );

        Ok(Track {
            header,
            level: Level {
                rooms: self.rooms,
                free_elements: self.elements,
                starting_positions: self.starting_positions,
            },
        })
    }
}

/// Compiles `source`. Element types are created through `factory` and must
/// be registered as `dyn MazeElement`.
pub fn compile(source: &str, factory: &ObjectFactory) -> Result<Track, CompileError> {
    Compiler {
        parser: TrackSpecParser::new(source),
        factory,
        header: None,
        rooms: Vec::new(),
        elements: Vec::new(),
        starting_positions: Vec::new(),
        room_refs: Vec::new(),
        neighbor_refs: Vec::new(),
    }
    .compile()
}

#[cfg(test)]
mod test {
    use model::contact_effect::contact_effect::{CheckPoint, CheckPointType, ContactEffect};
    use object_factory::{ObjectFactory, ObjectFromFactoryId};

    use crate::{compile, CompileError, CompileErrorKind};

    fn factory() -> ObjectFactory {
        let mut factory = ObjectFactory::init();
        obj_fac1::register(&mut factory).unwrap();
        factory
    }

    const TRACK: &str = r#"
[Header]
Name "Corridor"
Laps 3

[Room]
Id 0
Wall 0, 0
Wall 10000, 0, 1
Wall 10000, 5000
Wall 0, 5000

[Room]
Id 1
Floor -100
Ceiling 3000
Wall 10000 0
Wall 20000 0
Wall 20000 5000
Wall 10000 5000 0

[FreeElement]
Room 1
Type 1 151
Position 15000 2500 0

StartingPosition:
Room 0
Position 2000 2500 0 1024
"#;

    #[test]
    fn corridor() {
        let track = compile(TRACK, &factory()).unwrap();
        assert_eq!(track.header.name, "Corridor");
        assert_eq!(track.header.laps, 3);
        assert_eq!(track.header.max_players, 4);

        let level = &track.level;
        assert_eq!(level.rooms.len(), 2);
        assert_eq!(level.rooms[0].walls[1].neighbor, Some(1));
        assert_eq!(level.rooms[1].walls[3].neighbor, Some(0));
        assert_eq!(level.rooms[1].floor, -100);
        assert_eq!(level.rooms[0].ceiling, 5000);

        assert_eq!(level.free_elements.len(), 1);
        let element = &level.free_elements[0];
        assert_eq!(element.free_element().room, 1);
        assert_eq!(
            element.contact_effect_shape().unwrap().effect_list(),
            &[ContactEffect::CheckPoint(CheckPoint {
                check_point_type: CheckPointType::CheckPoint1
            })]
        );

        assert_eq!(level.starting_positions.len(), 1);
        assert_eq!(level.starting_positions[0].orientation.units(), 1024);
        assert_eq!(level.find_room(model::types::types::Point2d::new(12000, 100)), Some(1));
    }

    fn error_of(source: &str) -> CompileError {
        compile(source, &factory()).unwrap_err()
    }

    #[test]
    fn errors_carry_line_numbers() {
        let broken = TRACK.replace("Wall 10000, 0, 1", "Wall 10000, 0, 7");
        assert_eq!(
            error_of(&broken),
            CompileError {
                line: 9,
                kind: CompileErrorKind::UnknownRoom(7)
            }
        );

        let broken = TRACK.replace("[FreeElement]", "[Bridge]");
        assert_eq!(
            error_of(&broken),
            CompileError {
                line: 22,
                kind: CompileErrorKind::UnknownClass("Bridge".to_string())
            }
        );

        let broken = TRACK.replace("Type 1 151", "Type 1 999");
        assert_eq!(
            error_of(&broken),
            CompileError {
                line: 24,
                kind: CompileErrorKind::UnregisteredElement(ObjectFromFactoryId::new(1, 999))
            }
        );

        let broken = TRACK.replace("Laps 3", "Laps three");
        assert_eq!(
            error_of(&broken).kind,
            CompileErrorKind::BadParameter("Laps".to_string())
        );

        let broken = TRACK.replace("Wall 20000 0\nWall 20000 5000\n", "");
        assert_eq!(
            error_of(&broken).kind,
            CompileErrorKind::TooFewWalls { room: 1 }
        );

        let broken = TRACK.replace("Id 1", "Id 2");
        assert_eq!(
            error_of(&broken).kind,
            CompileErrorKind::RoomIdOrder {
                expected: 1,
                found: 2
            }
        );

        let broken = TRACK.replace("StartingPosition:", "// no start");
        assert_eq!(
            error_of(&broken).kind,
            CompileErrorKind::NoStartingPosition
        );
    }

    #[test]
    fn at_most_four_starting_positions() {
        let start = "\nStartingPosition:\nRoom 0\nPosition 2000 2500 0 1024\n";
        let four = format!("{TRACK}{}", start.repeat(3));
        let track = compile(&four, &factory()).unwrap();
        assert_eq!(track.level.starting_positions.len(), 4);

        let five = format!("{four}{start}");
        let err = error_of(&five);
        assert_eq!(err.kind, CompileErrorKind::TooManyStartingPositions);
        assert!(err
            .to_string()
            .ends_with("the track has more than 4 starting positions"));
    }

    #[test]
    fn non_element_types_are_rejected() {
        let mut factory = factory();
        model::main_character::main_character::register(&mut factory).unwrap();
        let source = TRACK.replace("Type 1 151", "Type 2 1");
        assert_eq!(
            compile(&source, &factory).unwrap_err().kind,
            CompileErrorKind::NotAMazeElement(ObjectFromFactoryId::new(2, 1))
        );
    }

    #[test]
    fn demo_track() {
        let track = compile(include_str!("../../../data/tracks/demo.trk"), &factory()).unwrap();
        assert_eq!(track.header.name, "Twin Halls");
        assert_eq!(track.level.rooms.len(), 2);
        assert_eq!(track.level.free_elements.len(), 7);
        assert_eq!(track.level.starting_positions.len(), 4);
    }
}
