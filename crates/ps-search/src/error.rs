use ps_core::{EdgeId, VehicleId};
use ps_parking::ParkingError;
use ps_spatial::SpatialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("vehicle {vehicle} reached a dead end on edge {edge}")]
    DeadEnd { vehicle: VehicleId, edge: EdgeId },

    #[error("vehicle {0} is already in the fleet")]
    DuplicateVehicle(VehicleId),

    #[error("vehicle {0} is not in the fleet")]
    UnknownVehicle(VehicleId),

    #[error("vehicle {0} has not been observed on the network yet")]
    NotOnNetwork(VehicleId),

    #[error("parking error: {0}")]
    Parking(#[from] ParkingError),

    #[error("routing error: {0}")]
    Spatial(#[from] SpatialError),
}

pub type SearchResult<T> = Result<T, SearchError>;
