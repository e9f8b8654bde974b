mod error;
mod observer;
mod propagation;
mod records;
mod types;

pub use error::PredictError;
pub use observer::ObserverLocation;
pub use propagation::{subpoint, Propagator, Sgp4Propagator};
pub use records::{load_records, ElementRecord, RecordSet, RejectedRecord};
pub use types::{SatelliteInfo, Subpoint, TopocentricObservation};

#[cfg(test)]
pub(crate) use records::tests as fixtures;
