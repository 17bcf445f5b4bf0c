use ps_core::{CoreError, SpaceId, VehicleId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParkingError {
    #[error("cannot mark {requested} spaces available: only {capacity} free spaces exist")]
    InsufficientCapacity { requested: usize, capacity: usize },

    #[error("parking space {space} is not available (held by {holder:?})")]
    AlreadyClaimed { space: SpaceId, holder: Option<VehicleId> },

    #[error("parking space {0} does not exist")]
    UnknownSpace(SpaceId),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type ParkingResult<T> = Result<T, ParkingError>;
