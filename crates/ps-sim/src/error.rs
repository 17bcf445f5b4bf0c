use ps_core::{CoreError, VehicleId};
use ps_parking::ParkingError;
use ps_search::SearchError;
use ps_spatial::SpatialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("no trip is known for vehicle {0}")]
    UnknownTrip(VehicleId),

    #[error("search error: {0}")]
    Search(#[from] SearchError),

    #[error("parking error: {0}")]
    Parking(#[from] ParkingError),

    #[error("routing error: {0}")]
    Spatial(#[from] SpatialError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type SimResult<T> = Result<T, SimError>;
