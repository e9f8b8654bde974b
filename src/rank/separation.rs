use serde::{Deserialize, Serialize};

/// A direction in the observer's sky.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct SkyDirection {
    pub altitude_deg: f64,
    pub azimuth_deg: f64,
}

impl SkyDirection {
    pub fn new(altitude_deg: f64, azimuth_deg: f64) -> Self {
        Self {
            altitude_deg,
            azimuth_deg,
        }
    }

    pub fn separation_to(&self, other: &SkyDirection) -> f64 {
        angular_separation(
            self.altitude_deg,
            self.azimuth_deg,
            other.altitude_deg,
            other.azimuth_deg,
        )
    }
}

/// Great-circle distance in degrees between two (altitude, azimuth) pairs,
/// using the haversine formula with altitude as latitude and azimuth as
/// longitude. Result is in [0, 180].
pub fn angular_separation(alt1_deg: f64, az1_deg: f64, alt2_deg: f64, az2_deg: f64) -> f64 {
    let alt1 = alt1_deg.to_radians();
    let alt2 = alt2_deg.to_radians();
    let d_alt = alt2 - alt1;
    let d_az = (az2_deg - az1_deg).to_radians();

    let half_alt = (d_alt / 2.0).sin();
    let half_az = (d_az / 2.0).sin();
    let a = half_alt * half_alt + alt1.cos() * alt2.cos() * half_az * half_az;

    (2.0 * a.clamp(0.0, 1.0).sqrt().asin()).to_degrees()
}
