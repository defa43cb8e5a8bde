//! Error types for race parameter validation.

/// Reasons a [`RaceParams`](crate::RaceParams) set is unusable.
///
/// Parameters normally come from the server, but a replaying client
/// validates them before trusting them to drive an animation loop.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RaceError {
    /// No horses, or more than the engine supports.
    #[error("horse count {0} out of range")]
    HorseCount(usize),

    /// Finish line is not a positive, finite distance.
    #[error("invalid finish line {0}")]
    FinishLine(f64),

    /// A base speed is not a positive, finite number.
    #[error("horse {0} has an invalid base speed")]
    BaseSpeed(usize),

    /// A gimmick trigger or duration is out of range, or triggers are unsorted.
    #[error("horse {0} has an invalid gimmick schedule")]
    GimmickSchedule(usize),

    /// Weather triggers are out of range or not ascending.
    #[error("invalid weather schedule")]
    WeatherSchedule,
}
