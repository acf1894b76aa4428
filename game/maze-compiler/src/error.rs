use model::level::level::MAX_STARTING_POSITIONS;
use object_factory::ObjectFromFactoryId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileErrorKind {
    #[error("unknown class [{0}]")]
    UnknownClass(String),
    #[error("unknown attribute {0}")]
    UnknownAttribute(String),
    #[error("missing or malformed parameter of {0}")]
    BadParameter(String),
    #[error("missing attribute {0}")]
    MissingAttribute(&'static str),
    #[error("room {found} is declared where room {expected} was expected")]
    RoomIdOrder { expected: usize, found: usize },
    #[error("room {room} needs at least 3 walls")]
    TooFewWalls { room: usize },
    #[error("room {0} does not exist")]
    UnknownRoom(usize),
    #[error("no element type {0} is registered")]
    UnregisteredElement(ObjectFromFactoryId),
    #[error("type {0} is not a maze element")]
    NotAMazeElement(ObjectFromFactoryId),
    #[error("the track has no [Header]")]
    MissingHeader,
    #[error("the track has no starting position")]
    NoStartingPosition,
    #[error("the track has more than {max} starting positions", max = MAX_STARTING_POSITIONS)]
    TooManyStartingPositions,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {kind}")]
pub struct CompileError {
    pub line: usize,
    pub kind: CompileErrorKind,
}
