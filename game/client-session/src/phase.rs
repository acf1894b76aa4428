use strum::{Display, EnumIter};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
pub enum Phase {
    /// Track not loaded yet.
    #[default]
    Init,
    /// Players are at the starting line.
    Pregame,
    /// Players are released and the clock is running.
    Playing,
    /// The first player has finished, waiting for the others.
    Postgame,
    /// All players have finished.
    Done,
}

impl Phase {
    pub fn next(&self) -> Option<Phase> {
        match self {
            Phase::Init => Some(Phase::Pregame),
            Phase::Pregame => Some(Phase::Playing),
            Phase::Playing => Some(Phase::Postgame),
            Phase::Postgame => Some(Phase::Done),
            Phase::Done => None,
        }
    }

    /// Whether the simulation clock runs.
    pub fn is_racing(&self) -> bool {
        matches!(self, Phase::Playing | Phase::Postgame)
    }
}

#[cfg(test)]
mod test {
    use strum::IntoEnumIterator;

    use super::Phase;

    #[test]
    fn phases_are_linear() {
        let phases: Vec<_> = Phase::iter().collect();
        for pair in phases.windows(2) {
            assert_eq!(pair[0].next(), Some(pair[1]));
            assert!(pair[0] < pair[1]);
        }
        assert_eq!(Phase::Done.next(), None);
        assert_eq!(Phase::Postgame.to_string(), "Postgame");
    }
}
