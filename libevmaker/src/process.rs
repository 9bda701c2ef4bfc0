use std::sync::mpsc::Sender;

use super::automation::EvApplication;
use super::config::Config;
use super::error::{ExportError, MakerError, ProcessorError};
use super::exporter::{self, ExportParams};
use super::maker;
use super::progress::JobStatus;
use super::survey::SurveyStore;

/// Resolve the transects to work on: the configured list, or every
/// completed transect oldest first.
pub fn resolve_transects(
    config: &Config,
    store: &dyn SurveyStore,
) -> Result<Vec<String>, ProcessorError> {
    if !config.transects.is_empty() {
        return Ok(config.transects.clone());
    }
    let mut all = store.completed_transects()?;
    all.reverse(); // the completed list is newest first
    Ok(all)
}

/// Build EV files for each resolved transect.
///
/// A transect whose raw data has not landed yet is reported and skipped;
/// anything else fatal stops the run.
pub fn process(
    config: &Config,
    store: &dyn SurveyStore,
    app: &mut dyn EvApplication,
    tx: &Sender<JobStatus>,
) -> Result<(), ProcessorError> {
    let transects = resolve_transects(config, store)?;
    for transect in &transects {
        log::info!("Building EV file for transect {}...", transect);
        match maker::make_ev_file(config, store, app, transect, tx) {
            Ok(Some(path)) => log::info!("Created {}", path.display()),
            Ok(None) => log::info!("Skipped transect {}", transect),
            Err(MakerError::MissingSegments(spans)) => {
                log::error!(
                    "Transect {} is missing raw data for {} segment(s). This transect will be skipped.",
                    transect,
                    spans.len()
                );
            }
            Err(e) => return Err(e.into()),
        }
    }
    app.quit()?;
    Ok(())
}

/// Run the export workflow for each resolved transect.
///
/// A transect with no EV files is reported and skipped; anything else fatal
/// stops the run.
pub fn process_exports(
    config: &Config,
    store: &dyn SurveyStore,
    app: &mut dyn EvApplication,
    tx: &Sender<JobStatus>,
) -> Result<(), ProcessorError> {
    let params = ExportParams::build(config, store)?;
    let transects = resolve_transects(config, store)?;
    for transect in &transects {
        log::info!("Beginning export of transect {}...", transect);
        match exporter::export_transect(&params, store, app, transect, tx) {
            Ok(flags) => {
                let exported = flags.iter().filter(|flag| **flag).count();
                if exported == flags.len() {
                    log::info!("All zones exported for transect {}", transect);
                } else {
                    log::warn!(
                        "{} zone(s) exported out of {} for transect {}",
                        exported,
                        flags.len(),
                        transect
                    );
                }
            }
            Err(ExportError::NoEvFiles(missing)) => {
                log::error!(
                    "No .EV files found for transect {}. This transect will be skipped.",
                    missing
                );
            }
            Err(e) => return Err(e.into()),
        }
    }
    app.quit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::survey::{
        DatasetParams, EventRow, IntervalType, IntervalUnits, SurveySnapshot,
    };
    use crate::transect::EventKind;
    use std::collections::BTreeMap;

    fn snapshot_with_transects(transects: &[&str]) -> SurveySnapshot {
        let mut events = BTreeMap::new();
        for transect in transects {
            events.insert(
                transect.to_string(),
                vec![
                    EventRow {
                        event: EventKind::St,
                        time: String::from("06/21/2024 09:00:00.000"),
                    },
                    EventRow {
                        event: EventKind::Et,
                        time: String::from("06/21/2024 10:00:00.000"),
                    },
                ],
            );
        }
        SurveySnapshot {
            ship: String::from("157"),
            survey: String::from("202408"),
            data_set_id: String::from("1"),
            dataset: DatasetParams {
                source_name: None,
                layer_reference: String::from("Surface"),
                layer_reference_name: None,
                interval_type: IntervalType::Time,
                interval_units: IntervalUnits::Minutes,
                interval_length: 1.0,
                minimum_threshold_applied: None,
                minimum_threshold: None,
                maximum_threshold_applied: None,
                maximum_threshold: None,
            },
            zones: Vec::new(),
            exclusion_lines: BTreeMap::new(),
            events,
        }
    }

    #[test]
    fn test_resolve_transects_prefers_config() {
        let mut config = Config::default();
        config.transects = vec![String::from("4"), String::from("2")];
        let snapshot = snapshot_with_transects(&["1", "2", "3"]);
        assert_eq!(
            resolve_transects(&config, &snapshot).unwrap(),
            vec![String::from("4"), String::from("2")]
        );
    }

    #[test]
    fn test_resolve_transects_all_completed_oldest_first() {
        let config = Config::default();
        let snapshot = snapshot_with_transects(&["1", "10", "2"]);
        assert_eq!(
            resolve_transects(&config, &snapshot).unwrap(),
            vec![String::from("1"), String::from("2"), String::from("10")]
        );
    }
}
