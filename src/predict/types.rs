use std::fmt;

use serde::Serialize;

/// Identity of a tracked object as reported by the catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SatelliteInfo {
    pub name: String,
    pub norad_id: u64,
    pub epoch: String,
}

impl fmt::Display for SatelliteInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (NORAD {}, epoch {})", self.name, self.norad_id, self.epoch)
    }
}

/// Where a satellite appears in the observer's sky at one instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TopocentricObservation {
    pub altitude_deg: f64,
    pub azimuth_deg: f64,
    pub range_km: f64,
}

/// Point on the WGS-84 ellipsoid directly below a satellite
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subpoint {
    pub satellite: SatelliteInfo,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub elevation_km: f64,
}
