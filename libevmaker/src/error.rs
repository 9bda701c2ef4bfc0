use std::path::PathBuf;
use thiserror::Error;
use time::PrimitiveDateTime;

use super::progress::JobStatus;
use super::survey::{IntervalType, IntervalUnits, ZoneSide};
use super::transect::{EventKind, TimeSpan};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum EventLogError {
    #[error("Transect event log is empty")]
    EmptyLog,
    #[error("Transect event log does not begin with an ST event")]
    MissingStart,
    #[error("Transect event log contains a second ST event at {0}")]
    DuplicateStart(PrimitiveDateTime),
    #[error("BT event at {0} is not followed by a matching RT event")]
    UnpairedBreak(PrimitiveDateTime),
    #[error("RT event at {0} has no preceding BT event")]
    UnpairedResume(PrimitiveDateTime),
    #[error("Transect event log has no ET event")]
    MissingEnd,
    #[error("Transect event log continues with a {0} event after the ET event")]
    EventAfterEnd(EventKind),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SelectError {
    #[error("The raw file {0} is misnamed; raw files must have the date and time in the name in the form DYYYYMMDD-Thhmmss")]
    UnparsableFileName(String),
    #[error("No candidate raw files were given to match against")]
    NoCandidateFiles,
}

#[derive(Debug, Error)]
pub enum RawFileError {
    #[error("Raw file scan failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("No .raw files found in raw file directory {0:?}")]
    NoMatchingFiles(PathBuf),
    #[error("Raw file scan failed due to a bad file name: {0}")]
    BadFileName(#[from] SelectError),
}

#[derive(Debug, Error)]
pub enum EvrError {
    #[error("EVR writer failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("EVR writer failed to format a timestamp: {0}")]
    FormatError(#[from] time::error::Format),
}

#[derive(Debug, Error)]
pub enum SurveyError {
    #[error("Failed to load survey snapshot as file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Survey store failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Survey store failed to parse YAML: {0}")]
    ParsingError(#[from] serde_yaml::Error),
    #[error("Survey store has no transect {0}")]
    UnknownTransect(String),
    #[error("Could not parse event time {0:?}; expected MM/dd/yyyy hh:mm:ss.zzz")]
    BadEventTime(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration as file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Config failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Config failed to parse YAML: {0}")]
    ParsingError(#[from] serde_yaml::Error),
}

#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("No scripting module license was found")]
    NotLicensed,
    #[error("The fileset {0} does not exist in the EV file")]
    FilesetNotFound(String),
    #[error("The line {0} does not exist in the EV file")]
    LineNotFound(String),
    #[error("The variable {0} does not exist in the EV file")]
    VariableNotFound(String),
    #[error("The {0} command was rejected by the application")]
    CommandFailed(String),
    #[error("Automation journal failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum MakerError {
    #[error("EV file maker failed due to configuration error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("EV file maker failed due to survey store error: {0}")]
    SurveyError(#[from] SurveyError),
    #[error("EV file maker failed due to a malformed event log: {0}")]
    EventLogError(#[from] EventLogError),
    #[error("EV file maker failed due to raw file error: {0}")]
    RawFileError(#[from] RawFileError),
    #[error("EV file maker failed due to selection error: {0}")]
    SelectError(#[from] SelectError),
    #[error("EV file maker failed due to EVR writer error: {0}")]
    EvrError(#[from] EvrError),
    #[error("EV file maker failed due to automation error: {0}")]
    AutomationError(#[from] AutomationError),
    #[error("No raw data files were found for {} transect segment(s)", .0.len())]
    MissingSegments(Vec<TimeSpan>),
    #[error("No surface exclusion depth is defined for this data set; is the upper exclusion name of the top zone set to surface_exclusion?")]
    NoSurfaceExclusion,
    #[error("No bottom exclusion offset is defined for this data set; is the lower exclusion name of the deepest zone set to bottom_exclusion?")]
    NoBottomExclusion,
    #[error("Could not read a line name from the file {0}; line files must carry the name after the transect label")]
    BadLineFileName(String),
    #[error("EV file maker failed due to Send error: {0}")]
    SendError(#[from] std::sync::mpsc::SendError<JobStatus>),
    #[error("EV file maker failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Exporter failed due to configuration error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("Exporter failed due to survey store error: {0}")]
    SurveyError(#[from] SurveyError),
    #[error("Exporter failed due to automation error: {0}")]
    AutomationError(#[from] AutomationError),
    #[error("No export variable is defined for this data set")]
    NoExportVariable,
    #[error("Interval units {units} do not fit with the interval type {itype}")]
    BadIntervalCombination {
        itype: IntervalType,
        units: IntervalUnits,
    },
    #[error("No minimum integration threshold is specified for this data set")]
    NoMinimumThreshold,
    #[error("No maximum integration threshold is specified for this data set")]
    NoMaximumThreshold,
    #[error("No layer reference name is specified for this data set")]
    NoLayerReferenceName,
    #[error("No layer thickness is specified for zone {0}")]
    NoLayerThickness(String),
    #[error("No {1} exclusion line name is specified for zone {0}")]
    NoExclusionName(String, ZoneSide),
    #[error("No exclusion line named {0} is defined in the survey store")]
    UnknownExclusionLine(String),
    #[error("No .EV files were found for transect {0}")]
    NoEvFiles(String),
    #[error("Exporter failed due to Send error: {0}")]
    SendError(#[from] std::sync::mpsc::SendError<JobStatus>),
    #[error("Exporter failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("Processor failed due to Maker error: {0}")]
    MakerError(#[from] MakerError),
    #[error("Processor failed due to automation error: {0}")]
    AutomationError(#[from] AutomationError),
    #[error("Processor failed due to Export error: {0}")]
    ExportError(#[from] ExportError),
    #[error("Processor failed due to survey store error: {0}")]
    SurveyError(#[from] SurveyError),
    #[error("Processor failed due to Config error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("Processor failed due to IO error: {0}")]
    IoError(#[from] std::io::Error),
}
