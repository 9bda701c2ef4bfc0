use std::fmt;

/// Workflow stages reported while building or exporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Stage {
    #[default]
    Querying,
    BuildingSpans,
    MatchingFiles,
    LoadingTemplate,
    AddingData,
    Indexing,
    ImportingRegions,
    BuildingLines,
    Saving,
    Exporting,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Querying => write!(f, "Getting dataset parameters"),
            Stage::BuildingSpans => write!(f, "Determining time spans"),
            Stage::MatchingFiles => write!(f, "Finding the files associated with timespans"),
            Stage::LoadingTemplate => write!(f, "Loading template"),
            Stage::AddingData => write!(f, "Adding .raw files"),
            Stage::Indexing => write!(f, "Waiting for raw files to be indexed"),
            Stage::ImportingRegions => write!(f, "Importing regions"),
            Stage::BuildingLines => write!(f, "Creating lines"),
            Stage::Saving => write!(f, "Saving file"),
            Stage::Exporting => write!(f, "Exporting"),
            Stage::Done => write!(f, "Done"),
        }
    }
}

/// Progress message sent from a workflow to whatever is watching it.
#[derive(Debug, Clone, Default)]
pub struct JobStatus {
    pub progress: f32,
    pub transect: String,
    pub stage: Stage,
}

impl JobStatus {
    pub fn new(progress: f32, transect: &str, stage: Stage) -> Self {
        Self {
            progress,
            transect: transect.to_string(),
            stage,
        }
    }
}
