use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use super::error::SurveyError;
use super::transect::{parse_event_time, EventKind, TransectEvent};

/// Interval axis types understood by the export grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntervalType {
    Time,
    #[serde(rename = "GPS distance")]
    GpsDistance,
    #[serde(rename = "Vessel log distance")]
    VesselLog,
    #[serde(rename = "Ping number")]
    PingNumber,
}

impl fmt::Display for IntervalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntervalType::Time => write!(f, "Time"),
            IntervalType::GpsDistance => write!(f, "GPS distance"),
            IntervalType::VesselLog => write!(f, "Vessel log distance"),
            IntervalType::PingNumber => write!(f, "Ping number"),
        }
    }
}

/// Interval length units recorded with a data set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntervalUnits {
    #[serde(rename = "minutes")]
    Minutes,
    #[serde(rename = "hours")]
    Hours,
    #[serde(rename = "days")]
    Days,
    #[serde(rename = "m")]
    Meters,
    #[serde(rename = "nmi")]
    NauticalMiles,
    #[serde(rename = "pings")]
    Pings,
}

impl fmt::Display for IntervalUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntervalUnits::Minutes => write!(f, "minutes"),
            IntervalUnits::Hours => write!(f, "hours"),
            IntervalUnits::Days => write!(f, "days"),
            IntervalUnits::Meters => write!(f, "m"),
            IntervalUnits::NauticalMiles => write!(f, "nmi"),
            IntervalUnits::Pings => write!(f, "pings"),
        }
    }
}

/// The data set configuration row for a ship/survey/data set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetParams {
    pub source_name: Option<String>,
    pub layer_reference: String,
    pub layer_reference_name: Option<String>,
    pub interval_type: IntervalType,
    pub interval_units: IntervalUnits,
    pub interval_length: f64,
    pub minimum_threshold_applied: Option<bool>,
    pub minimum_threshold: Option<f64>,
    pub maximum_threshold_applied: Option<bool>,
    pub maximum_threshold: Option<f64>,
}

/// One analysis zone of a data set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneParams {
    pub zone: String,
    pub upper_exclusion_name: Option<String>,
    pub lower_exclusion_name: Option<String>,
    pub layer_thickness: Option<f64>,
}

/// An exclusion line row: the reference it hangs off and its offset from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExclusionLine {
    pub layer_reference: String,
    pub offset: f64,
}

/// Which side of a zone an exclusion line bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneSide {
    Upper,
    Lower,
}

impl fmt::Display for ZoneSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneSide::Upper => write!(f, "upper"),
            ZoneSide::Lower => write!(f, "lower"),
        }
    }
}

/// The survey metadata consumed by the maker and the exporter.
///
/// The production database sits behind this trait; every query is typed so
/// callers never assemble query text themselves.
pub trait SurveyStore: Send {
    fn ship(&self) -> &str;
    fn survey(&self) -> &str;
    fn data_set_id(&self) -> &str;
    /// Transects with a logged ET event, newest first.
    fn completed_transects(&self) -> Result<Vec<String>, SurveyError>;
    /// The transect's event log, ascending by time.
    fn transect_events(&self, transect: &str) -> Result<Vec<TransectEvent>, SurveyError>;
    fn dataset_params(&self) -> Result<DatasetParams, SurveyError>;
    fn zones(&self) -> Result<Vec<ZoneParams>, SurveyError>;
    /// Look up an exclusion line by the name a zone references it under.
    fn exclusion_line(&self, name: &str) -> Result<Option<ExclusionLine>, SurveyError>;
}

/// One raw event log row as stored in a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRow {
    pub event: EventKind,
    pub time: String,
}

/// A survey metadata snapshot loadable from YAML.
///
/// Field crews export the active ship/survey configuration from the database
/// into a snapshot file; the snapshot then stands in for the database
/// connection on the processing workstation. Event times are stored in the
/// database spelling (MM/dd/yyyy hh:mm:ss.zzz) and parsed on access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveySnapshot {
    pub ship: String,
    pub survey: String,
    pub data_set_id: String,
    pub dataset: DatasetParams,
    #[serde(default)]
    pub zones: Vec<ZoneParams>,
    #[serde(default)]
    pub exclusion_lines: BTreeMap<String, ExclusionLine>,
    #[serde(default)]
    pub events: BTreeMap<String, Vec<EventRow>>,
}

impl SurveySnapshot {
    /// Read a snapshot from a YAML file.
    pub fn read_snapshot_file(path: &Path) -> Result<Self, SurveyError> {
        if !path.exists() {
            return Err(SurveyError::BadFilePath(path.to_path_buf()));
        }

        let yaml_str = std::fs::read_to_string(path)?;

        Ok(serde_yaml::from_str::<Self>(&yaml_str)?)
    }
}

fn transect_sort_key(transect: &str) -> f64 {
    transect.parse().unwrap_or(f64::MAX)
}

impl SurveyStore for SurveySnapshot {
    fn ship(&self) -> &str {
        &self.ship
    }

    fn survey(&self) -> &str {
        &self.survey
    }

    fn data_set_id(&self) -> &str {
        &self.data_set_id
    }

    fn completed_transects(&self) -> Result<Vec<String>, SurveyError> {
        let mut list: Vec<String> = self
            .events
            .iter()
            .filter(|(_, rows)| rows.iter().any(|row| row.event == EventKind::Et))
            .map(|(transect, _)| transect.clone())
            .collect();
        list.sort_by(|a, b| transect_sort_key(b).total_cmp(&transect_sort_key(a)));
        Ok(list)
    }

    fn transect_events(&self, transect: &str) -> Result<Vec<TransectEvent>, SurveyError> {
        let rows = self
            .events
            .get(transect)
            .ok_or_else(|| SurveyError::UnknownTransect(transect.to_string()))?;
        let mut events = Vec::with_capacity(rows.len());
        for row in rows {
            events.push(TransectEvent::new(row.event, parse_event_time(&row.time)?));
        }
        Ok(events)
    }

    fn dataset_params(&self) -> Result<DatasetParams, SurveyError> {
        Ok(self.dataset.clone())
    }

    fn zones(&self) -> Result<Vec<ZoneParams>, SurveyError> {
        Ok(self.zones.clone())
    }

    fn exclusion_line(&self, name: &str) -> Result<Option<ExclusionLine>, SurveyError> {
        Ok(self.exclusion_lines.get(name).cloned())
    }
}
