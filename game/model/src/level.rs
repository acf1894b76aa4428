pub mod level {
    use serde::{Deserialize, Serialize};

    use crate::{
        maze_element::maze_element::{FreeElement, MazeElement},
        types::types::{Coordinate, Point2d},
    };

    /// Maximum number of starting positions a level can have.
    pub const MAX_STARTING_POSITIONS: usize = 4;

    /// Wall `i` of a room runs from the start of wall `i` to the start of wall `i + 1`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Wall {
        pub start: Point2d,
        /// Room on the other side, `None` for solid walls.
        pub neighbor: Option<usize>,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Room {
        pub floor: Coordinate,
        pub ceiling: Coordinate,
        pub walls: Vec<Wall>,
    }

    impl Room {
        /// Segment of wall `index`.
        pub fn wall_segment(&self, index: usize) -> (Point2d, Point2d) {
            let start = self.walls[index].start;
            let end = self.walls[(index + 1) % self.walls.len()].start;
            (start, end)
        }

        pub fn contains(&self, p: Point2d) -> bool {
            let vertices: Vec<Point2d> = self.walls.iter().map(|wall| wall.start).collect();
            crate::collision::collision::point_in_polygon(p, &vertices)
        }
    }

    pub type StartingPosition = FreeElement;

    /// Rooms and everything placed in them.
    #[derive(Debug, Default)]
    pub struct Level {
        pub rooms: Vec<Room>,
        pub free_elements: Vec<Box<dyn MazeElement>>,
        pub starting_positions: Vec<StartingPosition>,
    }

    impl Level {
        /// First room that contains `p`.
        pub fn find_room(&self, p: Point2d) -> Option<usize> {
            self.rooms.iter().position(|room| room.contains(p))
        }

        pub fn elements_in_room(&self, room: usize) -> impl Iterator<Item = &dyn MazeElement> {
            self.free_elements
                .iter()
                .map(|element| element.as_ref())
                .filter(move |element| element.free_element().room == room)
        }
    }
}
