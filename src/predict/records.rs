use std::fmt::Display;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{de, Deserialize, Deserializer, Serialize};
use sgp4::{Classification, Constants, Elements};

use crate::predict::error::PredictError;
use crate::predict::types::SatelliteInfo;

/// One general-perturbations element set as served by the catalog.
///
/// Space-Track encodes every value as a JSON string while other OMM sources
/// use numbers, so numeric fields accept both. Keys that are not listed here
/// are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ElementRecord {
    #[serde(rename = "OBJECT_NAME", default)]
    pub object_name: Option<String>,
    #[serde(rename = "OBJECT_ID", default)]
    pub object_id: Option<String>,
    #[serde(rename = "NORAD_CAT_ID", deserialize_with = "number")]
    pub norad_cat_id: u64,
    #[serde(rename = "EPOCH")]
    pub epoch: String,
    #[serde(rename = "MEAN_MOTION", deserialize_with = "number")]
    pub mean_motion: f64,
    #[serde(rename = "ECCENTRICITY", deserialize_with = "number")]
    pub eccentricity: f64,
    #[serde(rename = "INCLINATION", deserialize_with = "number")]
    pub inclination: f64,
    #[serde(rename = "RA_OF_ASC_NODE", deserialize_with = "number")]
    pub ra_of_asc_node: f64,
    #[serde(rename = "ARG_OF_PERICENTER", deserialize_with = "number")]
    pub arg_of_pericenter: f64,
    #[serde(rename = "MEAN_ANOMALY", deserialize_with = "number")]
    pub mean_anomaly: f64,
    #[serde(rename = "BSTAR", default, deserialize_with = "optional_number")]
    pub bstar: Option<f64>,
    #[serde(rename = "MEAN_MOTION_DOT", default, deserialize_with = "optional_number")]
    pub mean_motion_dot: Option<f64>,
    #[serde(rename = "MEAN_MOTION_DDOT", default, deserialize_with = "optional_number")]
    pub mean_motion_ddot: Option<f64>,
    #[serde(rename = "CLASSIFICATION_TYPE", default)]
    pub classification_type: Option<String>,
    #[serde(rename = "ELEMENT_SET_NO", default, deserialize_with = "optional_number")]
    pub element_set_no: Option<u64>,
    #[serde(rename = "REV_AT_EPOCH", default, deserialize_with = "optional_number")]
    pub rev_at_epoch: Option<u64>,
    #[serde(rename = "EPHEMERIS_TYPE", default, deserialize_with = "optional_number")]
    pub ephemeris_type: Option<u8>,
    #[serde(rename = "TLE_LINE1", default)]
    pub tle_line1: Option<String>,
    #[serde(rename = "TLE_LINE2", default)]
    pub tle_line2: Option<String>,
}

/// A record ready for SGP4 propagation
pub struct Satellite {
    pub info: SatelliteInfo,
    pub elements: Elements,
    pub constants: Constants,
}

/// Array entry that could not be read as an element record
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRecord {
    pub index: usize,
    pub name: Option<String>,
    pub message: String,
}

/// Contents of a records file
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    pub records: Vec<ElementRecord>,
    pub rejected: Vec<RejectedRecord>,
}

impl ElementRecord {
    pub fn display_name(&self) -> String {
        match &self.object_name {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => format!("NORAD {}", self.norad_cat_id),
        }
    }

    pub fn info(&self) -> SatelliteInfo {
        SatelliteInfo {
            name: self.display_name(),
            norad_id: self.norad_cat_id,
            epoch: self.epoch.clone(),
        }
    }

    /// Build the SGP4 model, from the TLE lines when present and from the
    /// mean elements otherwise.
    pub fn to_satellite(&self) -> Result<Satellite, PredictError> {
        let invalid = |message: String| PredictError::InvalidElements {
            name: self.display_name(),
            message,
        };

        let elements = match (&self.tle_line1, &self.tle_line2) {
            (Some(line1), Some(line2)) => Elements::from_tle(
                self.object_name.clone(),
                line1.trim().as_bytes(),
                line2.trim().as_bytes(),
            )
            .map_err(|e| invalid(e.to_string()))?,
            _ => self.mean_elements().map_err(invalid)?,
        };

        let constants = Constants::from_elements(&elements).map_err(|e| invalid(e.to_string()))?;

        Ok(Satellite {
            info: self.info(),
            elements,
            constants,
        })
    }

    fn mean_elements(&self) -> Result<Elements, String> {
        Ok(Elements {
            object_name: self.object_name.clone(),
            international_designator: self.object_id.clone(),
            norad_id: self.norad_cat_id,
            classification: parse_classification(self.classification_type.as_deref())?,
            datetime: parse_epoch(&self.epoch)?,
            mean_motion_dot: self.mean_motion_dot.unwrap_or(0.0),
            mean_motion_ddot: self.mean_motion_ddot.unwrap_or(0.0),
            drag_term: self.bstar.unwrap_or(0.0),
            element_set_number: self.element_set_no.unwrap_or(0),
            inclination: self.inclination,
            right_ascension: self.ra_of_asc_node,
            eccentricity: self.eccentricity,
            argument_of_perigee: self.arg_of_pericenter,
            mean_anomaly: self.mean_anomaly,
            mean_motion: self.mean_motion,
            revolution_number: self.rev_at_epoch.unwrap_or(0),
            ephemeris_type: self.ephemeris_type.unwrap_or(0),
        })
    }
}

impl RecordSet {
    /// Split a JSON array into readable records and rejected entries.
    pub fn from_values(values: Vec<serde_json::Value>) -> Self {
        let mut set = RecordSet::default();

        for (index, value) in values.into_iter().enumerate() {
            let name = value
                .get("OBJECT_NAME")
                .and_then(|v| v.as_str())
                .map(String::from);

            match serde_json::from_value::<ElementRecord>(value) {
                Ok(record) => set.records.push(record),
                Err(e) => {
                    log::warn!(
                        "Skipping record #{} ({}): {}",
                        index,
                        name.as_deref().unwrap_or("Unknown"),
                        e
                    );
                    set.rejected.push(RejectedRecord {
                        index,
                        name,
                        message: e.to_string(),
                    });
                }
            }
        }

        set
    }

    pub fn from_json(content: &str) -> Result<Self, PredictError> {
        let values: Vec<serde_json::Value> = serde_json::from_str(content)?;
        Ok(Self::from_values(values))
    }
}

/// Load the records file written by the fetch step.
pub fn load_records(path: &Path) -> Result<RecordSet, PredictError> {
    let content = fs::read_to_string(path)?;
    let set = RecordSet::from_json(&content)?;
    log::info!(
        "Loaded {} records from {} ({} rejected)",
        set.records.len(),
        path.display(),
        set.rejected.len()
    );
    Ok(set)
}

fn parse_classification(value: Option<&str>) -> Result<Classification, String> {
    match value.map(str::trim) {
        None | Some("") | Some("U") => Ok(Classification::Unclassified),
        Some("C") => Ok(Classification::Classified),
        Some("S") => Ok(Classification::Secret),
        Some(other) => Err(format!("unknown classification '{}'", other)),
    }
}

fn parse_epoch(epoch: &str) -> Result<NaiveDateTime, String> {
    let trimmed = epoch.trim().trim_end_matches('Z');
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| format!("unparseable epoch '{}'", epoch))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString<T> {
    Number(T),
    String(String),
}

impl<T> NumberOrString<T>
where
    T: FromStr,
    T::Err: Display,
{
    fn into_value<E: de::Error>(self) -> Result<T, E> {
        match self {
            NumberOrString::Number(n) => Ok(n),
            NumberOrString::String(s) => s.trim().parse().map_err(E::custom),
        }
    }
}

fn number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    NumberOrString::<T>::deserialize(deserializer)?.into_value()
}

fn optional_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    match Option::<NumberOrString<T>>::deserialize(deserializer)? {
        Some(NumberOrString::String(s)) if s.trim().is_empty() => Ok(None),
        Some(value) => value.into_value().map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub const ISS_LINE1: &str =
        "1 25544U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992";
    pub const ISS_LINE2: &str =
        "2 25544  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236008";

    /// ISS mean elements with every value encoded as a string, the way
    /// Space-Track serves them.
    pub fn iss_space_track_json() -> serde_json::Value {
        serde_json::json!({
            "CCSDS_OMM_VERS": "2.0",
            "OBJECT_NAME": "ISS (ZARYA)",
            "OBJECT_ID": "1998-067A",
            "NORAD_CAT_ID": "25544",
            "EPOCH": "2020-07-12T21:16:01.000416",
            "MEAN_MOTION": "15.49507896",
            "ECCENTRICITY": "0.0001413",
            "INCLINATION": "51.6461",
            "RA_OF_ASC_NODE": "221.2784",
            "ARG_OF_PERICENTER": "89.1723",
            "MEAN_ANOMALY": "280.4612",
            "EPHEMERIS_TYPE": "0",
            "CLASSIFICATION_TYPE": "U",
            "ELEMENT_SET_NO": "999",
            "REV_AT_EPOCH": "23600",
            "BSTAR": "-0.000031515",
            "MEAN_MOTION_DOT": "-0.00002218",
            "MEAN_MOTION_DDOT": "0",
            "DECAYED": "0"
        })
    }

    pub fn iss_record() -> ElementRecord {
        serde_json::from_value(iss_space_track_json()).unwrap()
    }

    #[test]
    fn reads_string_encoded_fields() {
        let record = iss_record();
        assert_eq!(record.norad_cat_id, 25544);
        assert_eq!(record.mean_motion, 15.49507896);
        assert_eq!(record.bstar, Some(-0.000031515));
        assert_eq!(record.element_set_no, Some(999));
        assert_eq!(record.ephemeris_type, Some(0));
        assert_eq!(record.display_name(), "ISS (ZARYA)");
    }

    #[test]
    fn reads_number_encoded_fields() {
        let record: ElementRecord = serde_json::from_value(serde_json::json!({
            "NORAD_CAT_ID": 25544,
            "EPOCH": "2020-07-12T21:16:01.000416",
            "MEAN_MOTION": 15.49507896,
            "ECCENTRICITY": 0.0001413,
            "INCLINATION": 51.6461,
            "RA_OF_ASC_NODE": 221.2784,
            "ARG_OF_PERICENTER": 89.1723,
            "MEAN_ANOMALY": 280.4612,
            "BSTAR": null
        }))
        .unwrap();
        assert_eq!(record.norad_cat_id, 25544);
        assert_eq!(record.bstar, None);
        assert_eq!(record.display_name(), "NORAD 25544");
    }

    #[test]
    fn builds_satellite_from_mean_elements() {
        let satellite = iss_record().to_satellite().unwrap();
        assert_eq!(satellite.info.norad_id, 25544);
        assert_eq!(satellite.elements.inclination, 51.6461);
    }

    #[test]
    fn prefers_tle_lines_when_present() {
        let mut record = iss_record();
        record.inclination = 0.0;
        record.tle_line1 = Some(ISS_LINE1.to_string());
        record.tle_line2 = Some(ISS_LINE2.to_string());
        let satellite = record.to_satellite().unwrap();
        assert_eq!(satellite.elements.inclination, 51.6461);
    }

    #[test]
    fn bad_epoch_is_invalid_elements() {
        let mut record = iss_record();
        record.epoch = "yesterday".to_string();
        match record.to_satellite() {
            Err(PredictError::InvalidElements { name, message }) => {
                assert_eq!(name, "ISS (ZARYA)");
                assert!(message.contains("yesterday"));
            }
            other => panic!("unexpected result: {:?}", other.map(|s| s.info)),
        }
    }

    #[test]
    fn corrupt_tle_is_invalid_elements() {
        let mut record = iss_record();
        record.tle_line1 = Some("1 garbage".to_string());
        record.tle_line2 = Some(ISS_LINE2.to_string());
        assert!(matches!(
            record.to_satellite(),
            Err(PredictError::InvalidElements { .. })
        ));
    }

    #[test]
    fn rejects_unreadable_entries_without_failing_the_file() {
        let content = serde_json::json!([
            iss_space_track_json(),
            { "OBJECT_NAME": "BROKEN", "NORAD_CAT_ID": "not a number" },
            42
        ])
        .to_string();

        let set = RecordSet::from_json(&content).unwrap();
        assert_eq!(set.records.len(), 1);
        assert_eq!(set.rejected.len(), 2);
        assert_eq!(set.rejected[0].index, 1);
        assert_eq!(set.rejected[0].name.as_deref(), Some("BROKEN"));
        assert_eq!(set.rejected[1].name, None);
    }

    #[test]
    fn non_array_file_is_an_error() {
        assert!(matches!(
            RecordSet::from_json("{\"error\": \"nope\"}"),
            Err(PredictError::InvalidFormat(_))
        ));
    }

    #[test]
    fn loads_records_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("satellite_data.json");
        fs::write(&path, serde_json::json!([iss_space_track_json()]).to_string()).unwrap();

        let set = load_records(&path).unwrap();
        assert_eq!(set.records, vec![iss_record()]);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_records(&dir.path().join("absent.json")),
            Err(PredictError::FileRead(_))
        ));
    }
}
