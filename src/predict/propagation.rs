use chrono::{DateTime, Utc};

use crate::predict::error::PredictError;
use crate::predict::observer::{ObserverLocation, WGS84_A_KM, WGS84_E2};
use crate::predict::records::{ElementRecord, Satellite};
use crate::predict::types::{Subpoint, TopocentricObservation};

/// Turns element records into positions in the observer's sky.
pub trait Propagator {
    type Model;

    fn prepare(&self, record: &ElementRecord) -> Result<Self::Model, PredictError>;

    fn observe(
        &self,
        model: &Self::Model,
        observer: &ObserverLocation,
        timestamp: DateTime<Utc>,
    ) -> Result<TopocentricObservation, PredictError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Sgp4Propagator;

impl Propagator for Sgp4Propagator {
    type Model = Satellite;

    fn prepare(&self, record: &ElementRecord) -> Result<Satellite, PredictError> {
        record.to_satellite()
    }

    fn observe(
        &self,
        satellite: &Satellite,
        observer: &ObserverLocation,
        timestamp: DateTime<Utc>,
    ) -> Result<TopocentricObservation, PredictError> {
        observe(observer, satellite, timestamp)
    }
}

/// Earth-fixed position of the satellite in km.
pub fn position_ecef_km(
    satellite: &Satellite,
    timestamp: DateTime<Utc>,
) -> Result<[f64; 3], PredictError> {
    let propagation = |message: String| PredictError::Propagation {
        name: satellite.info.name.clone(),
        message,
    };

    let minutes = satellite
        .elements
        .datetime_to_minutes_since_epoch(&timestamp.naive_utc())
        .map_err(|e| propagation(e.to_string()))?;

    let prediction = satellite
        .constants
        .propagate(minutes)
        .map_err(|e| propagation(e.to_string()))?;

    let sidereal =
        sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(&timestamp.naive_utc()));

    Ok(teme_to_ecef_position(prediction.position, sidereal))
}

pub fn observe(
    observer: &ObserverLocation,
    satellite: &Satellite,
    timestamp: DateTime<Utc>,
) -> Result<TopocentricObservation, PredictError> {
    let sat_ecef = position_ecef_km(satellite, timestamp)?;
    Ok(look_angles(observer, sat_ecef))
}

/// Altitude, azimuth and slant range of an Earth-fixed point.
pub fn look_angles(observer: &ObserverLocation, target_ecef: [f64; 3]) -> TopocentricObservation {
    let sta_ecef = observer.position_ecef_km();
    let dr = [
        target_ecef[0] - sta_ecef[0],
        target_ecef[1] - sta_ecef[1],
        target_ecef[2] - sta_ecef[2],
    ];
    let range_km = (dr[0] * dr[0] + dr[1] * dr[1] + dr[2] * dr[2]).sqrt();

    let enu = ecef_to_enu(dr, observer.lat_rad(), observer.lon_rad());
    let azimuth = enu.0.atan2(enu.1).to_degrees().rem_euclid(360.0);
    let altitude = if range_km > 0.0 {
        (enu.2 / range_km).clamp(-1.0, 1.0).asin().to_degrees()
    } else {
        0.0
    };

    TopocentricObservation {
        altitude_deg: altitude,
        azimuth_deg: azimuth,
        range_km,
    }
}

/// Geodetic point below the satellite.
pub fn subpoint(satellite: &Satellite, timestamp: DateTime<Utc>) -> Result<Subpoint, PredictError> {
    let (latitude_deg, longitude_deg, elevation_km) =
        ecef_to_geodetic(position_ecef_km(satellite, timestamp)?);
    Ok(Subpoint {
        satellite: satellite.info.clone(),
        latitude_deg,
        longitude_deg,
        elevation_km,
    })
}

pub fn teme_to_ecef_position(pos_teme: [f64; 3], gmst: f64) -> [f64; 3] {
    let cos_gmst = gmst.cos();
    let sin_gmst = gmst.sin();
    [
        pos_teme[0] * cos_gmst + pos_teme[1] * sin_gmst,
        -pos_teme[0] * sin_gmst + pos_teme[1] * cos_gmst,
        pos_teme[2],
    ]
}

pub fn ecef_to_enu(dr: [f64; 3], lat_rad: f64, lon_rad: f64) -> (f64, f64, f64) {
    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let sin_lon = lon_rad.sin();
    let cos_lon = lon_rad.cos();

    let east = -sin_lon * dr[0] + cos_lon * dr[1];
    let north = -sin_lat * cos_lon * dr[0] - sin_lat * sin_lon * dr[1] + cos_lat * dr[2];
    let up = cos_lat * cos_lon * dr[0] + cos_lat * sin_lon * dr[1] + sin_lat * dr[2];
    (east, north, up)
}

/// Returns (latitude deg, longitude deg, height km) on WGS-84.
pub fn ecef_to_geodetic(ecef: [f64; 3]) -> (f64, f64, f64) {
    let [x, y, z] = ecef;
    let p = (x * x + y * y).sqrt();
    let lon = y.atan2(x);

    let mut lat = z.atan2(p * (1.0 - WGS84_E2));
    let mut height = 0.0;
    for _ in 0..8 {
        let sin_lat = lat.sin();
        let n = WGS84_A_KM / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
        // cos(lat) vanishes over the poles
        height = if lat.cos().abs() > 1e-9 {
            p / lat.cos() - n
        } else {
            z.abs() - n * (1.0 - WGS84_E2)
        };
        lat = z.atan2(p * (1.0 - WGS84_E2 * n / (n + height)));
    }

    (lat.to_degrees(), lon.to_degrees(), height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::records::tests::{iss_record, ISS_LINE1, ISS_LINE2};
    use chrono::TimeZone;

    fn jackson() -> ObserverLocation {
        ObserverLocation::new(37.42902, -89.64276, 0.0)
    }

    #[test]
    fn zenith_target_is_straight_up() {
        let observer = jackson();
        let ground = observer.position_ecef_km();
        let lat = observer.lat_rad();
        let lon = observer.lon_rad();
        let up = [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()];
        let target = [
            ground[0] + 500.0 * up[0],
            ground[1] + 500.0 * up[1],
            ground[2] + 500.0 * up[2],
        ];

        let obs = look_angles(&observer, target);
        assert!((obs.altitude_deg - 90.0).abs() < 1e-3);
        assert!((obs.range_km - 500.0).abs() < 1e-6);
    }

    #[test]
    fn azimuth_follows_compass_convention() {
        let observer = ObserverLocation::new(0.0, 0.0, 0.0);
        let ground = observer.position_ecef_km();

        // +Y is due east at lat 0 / lon 0, +Z due north
        let east = look_angles(&observer, [ground[0], ground[1] + 100.0, ground[2]]);
        let north = look_angles(&observer, [ground[0], ground[1], ground[2] + 100.0]);
        let west = look_angles(&observer, [ground[0], ground[1] - 100.0, ground[2]]);

        assert!((east.azimuth_deg - 90.0).abs() < 1e-9);
        assert!(north.azimuth_deg.abs() < 1e-9);
        assert!((west.azimuth_deg - 270.0).abs() < 1e-9);
        assert!(east.altitude_deg.abs() < 1e-9);
    }

    #[test]
    fn geodetic_conversion_recovers_observer() {
        let observer = ObserverLocation::new(37.42902, -89.64276, 1500.0);
        let (lat, lon, height) = ecef_to_geodetic(observer.position_ecef_km());
        assert!((lat - 37.42902).abs() < 1e-8);
        assert!((lon + 89.64276).abs() < 1e-8);
        assert!((height - 1.5).abs() < 1e-6);
    }

    #[test]
    fn geodetic_conversion_over_pole() {
        let (lat, _, height) = ecef_to_geodetic([0.0, 0.0, 7000.0]);
        assert!((lat - 90.0).abs() < 1e-9);
        assert!((height - (7000.0 - 6356.752)).abs() < 1e-2);
    }

    #[test]
    fn iss_subpoint_is_within_orbit_envelope() {
        let satellite = iss_record().to_satellite().unwrap();
        let at = Utc.with_ymd_and_hms(2020, 7, 12, 22, 0, 0).unwrap();
        let point = subpoint(&satellite, at).unwrap();

        assert!(point.latitude_deg.abs() <= 52.0);
        assert!((-180.0..=180.0).contains(&point.longitude_deg));
        assert!(point.elevation_km > 350.0 && point.elevation_km < 480.0);
        assert_eq!(point.satellite.norad_id, 25544);
    }

    #[test]
    fn mean_elements_and_tle_agree() {
        let from_omm = iss_record().to_satellite().unwrap();
        let mut with_lines = iss_record();
        with_lines.tle_line1 = Some(ISS_LINE1.to_string());
        with_lines.tle_line2 = Some(ISS_LINE2.to_string());
        let from_tle = with_lines.to_satellite().unwrap();

        let at = Utc.with_ymd_and_hms(2020, 7, 12, 21, 30, 0).unwrap();
        let a = position_ecef_km(&from_omm, at).unwrap();
        let b = position_ecef_km(&from_tle, at).unwrap();
        let distance =
            ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)).sqrt();
        assert!(distance < 1.0, "positions differ by {} km", distance);
    }

    #[test]
    fn observation_range_is_consistent_with_altitude() {
        let satellite = iss_record().to_satellite().unwrap();
        let at = Utc.with_ymd_and_hms(2020, 7, 12, 22, 0, 0).unwrap();
        let obs = Sgp4Propagator.observe(&satellite, &jackson(), at).unwrap();

        assert!((0.0..360.0).contains(&obs.azimuth_deg));
        assert!((-90.0..=90.0).contains(&obs.altitude_deg));
        // ISS is never closer than its own altitude nor further than the far side of Earth
        assert!(obs.range_km > 350.0 && obs.range_km < 13_500.0);
        if obs.altitude_deg < 0.0 {
            assert!(obs.range_km > 1_000.0);
        }
    }
}
