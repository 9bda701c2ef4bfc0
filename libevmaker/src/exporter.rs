use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

use super::automation::{EvApplication, EvFile};
use super::config::{Config, MfVariable};
use super::error::{AutomationError, ExportError};
use super::progress::{JobStatus, Stage};
use super::survey::{IntervalType, IntervalUnits, SurveyStore, ZoneSide};

/// Export variables enabled for a standard integration export.
const EXPORT_VARIABLES: [&str; 12] = [
    "Date_E",
    "Lat_E",
    "Lon_E",
    "Time_E",
    "Region_notes",
    "Grid_reference_line",
    "Layer_bottom_to_reference_line_depth",
    "Layer_top_to_reference_line_depth",
    "Samples_In_Domain",
    "Good_samples",
    "No_data_samples",
    "Sv_max",
];
/// Export variables enabled for a multifrequency export.
const MF_EXPORT_VARIABLES: [&str; 5] = [
    "Good_samples",
    "Kurtosis",
    "Skewness",
    "Sv_mean",
    "Standard_deviation",
];
/// Layer reference name that needs no offset reference line.
const SURFACE_REFERENCE: &str = "Surface (depth of zero)";

/// Grid interval class understood by the application, with the interval
/// length normalized to the class units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridInterval {
    pub class: i32,
    pub length: f64,
}

/// Map a data set's interval type and units onto the application grid class:
/// 1 time (minutes), 2 GPS distance (nmi), 3 vessel log (nmi), 4 distance
/// (pings), 5 GPS distance (m), 6 vessel log (m).
pub fn grid_interval(
    itype: IntervalType,
    units: IntervalUnits,
    length: f64,
) -> Result<GridInterval, ExportError> {
    let class = |class: i32, length: f64| Ok(GridInterval { class, length });
    let bad = Err(ExportError::BadIntervalCombination { itype, units });
    match itype {
        IntervalType::Time => match units {
            IntervalUnits::Minutes => class(1, length),
            IntervalUnits::Hours => class(1, length * 60.0),
            IntervalUnits::Days => class(1, length * 24.0 * 60.0),
            _ => bad,
        },
        IntervalType::GpsDistance => match units {
            IntervalUnits::NauticalMiles => class(2, length),
            IntervalUnits::Meters => class(5, length),
            _ => bad,
        },
        IntervalType::VesselLog => match units {
            IntervalUnits::NauticalMiles => class(3, length),
            IntervalUnits::Meters => class(6, length),
            _ => bad,
        },
        IntervalType::PingNumber => match units {
            IntervalUnits::Pings => class(4, length),
            _ => bad,
        },
    }
}

/// Transect label as embedded in EV file names (t007, t010.5).
pub fn transect_label(transect: &str) -> String {
    match transect.split_once('.') {
        Some((whole, frac)) => format!("t{:0>3}.{}", whole, frac),
        None => format!("t{:0>3}", transect),
    }
}

/// EV files for a transect: names carrying both the survey number and the
/// transect label.
pub fn find_ev_files(
    input_dir: &Path,
    survey: &str,
    label: &str,
) -> Result<Vec<PathBuf>, ExportError> {
    let mut list = Vec::new();
    for item in input_dir.read_dir()? {
        let path = item?.path();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if name.to_ascii_lowercase().ends_with(".ev")
            && name.contains(survey)
            && name.contains(label)
        {
            list.push(path);
        }
    }
    list.sort();
    Ok(list)
}

/// One zone of an export run.
#[derive(Debug, Clone)]
pub struct ZoneExport {
    pub zone: String,
    pub exclude_above: String,
    pub exclude_below: String,
    pub layer_thickness: f64,
}

/// Validated export parameters, assembled once before any file is touched.
#[derive(Debug, Clone)]
pub struct ExportParams {
    pub variable: String,
    pub fileset: String,
    pub ecs_file: PathBuf,
    pub interval: GridInterval,
    pub min_threshold: Option<f64>,
    pub max_threshold: Option<f64>,
    pub layer_reference_name: String,
    pub reference_offset: f64,
    pub zones: Vec<ZoneExport>,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub raw_dir: Option<PathBuf>,
    pub multifrequency: Vec<MfVariable>,
}

impl ExportParams {
    /// Assemble and validate the export run from the configuration and the
    /// survey store rows. Every missing value is reported by name here so
    /// nothing fails halfway through an export.
    pub fn build(config: &Config, store: &dyn SurveyStore) -> Result<Self, ExportError> {
        let dataset = store.dataset_params()?;

        let variable = config
            .export
            .variable
            .clone()
            .or_else(|| dataset.source_name.clone())
            .ok_or(ExportError::NoExportVariable)?;

        let interval = grid_interval(
            dataset.interval_type,
            dataset.interval_units,
            dataset.interval_length,
        )?;

        let min_threshold = if dataset.minimum_threshold_applied.unwrap_or(false) {
            Some(
                dataset
                    .minimum_threshold
                    .ok_or(ExportError::NoMinimumThreshold)?,
            )
        } else {
            None
        };
        let max_threshold = if dataset.maximum_threshold_applied.unwrap_or(false) {
            Some(
                dataset
                    .maximum_threshold
                    .ok_or(ExportError::NoMaximumThreshold)?,
            )
        } else {
            None
        };

        let layer_reference_name = match dataset.layer_reference_name.clone() {
            Some(name) if !name.is_empty() => name,
            // Older data sets never filled this in for surface references
            _ if dataset.layer_reference == "Surface" => SURFACE_REFERENCE.to_string(),
            _ => return Err(ExportError::NoLayerReferenceName),
        };

        let mut reference_offset = 0.0;
        if dataset.layer_reference != "Surface" {
            if let Some(line) = store.exclusion_line(&layer_reference_name)? {
                reference_offset = -line.offset;
            }
        }

        let mut zones = Vec::new();
        for zone in store.zones()? {
            let exclude_above = zone
                .upper_exclusion_name
                .clone()
                .ok_or_else(|| ExportError::NoExclusionName(zone.zone.clone(), ZoneSide::Upper))?;
            let exclude_below = zone
                .lower_exclusion_name
                .clone()
                .ok_or_else(|| ExportError::NoExclusionName(zone.zone.clone(), ZoneSide::Lower))?;
            let layer_thickness = zone
                .layer_thickness
                .ok_or_else(|| ExportError::NoLayerThickness(zone.zone.clone()))?;
            zones.push(ZoneExport {
                zone: zone.zone,
                exclude_above,
                exclude_below,
                layer_thickness,
            });
        }

        Ok(Self {
            variable,
            fileset: config.export.fileset.clone(),
            ecs_file: config.ecs()?.to_path_buf(),
            interval,
            min_threshold,
            max_threshold,
            layer_reference_name,
            reference_offset,
            zones,
            input_dir: config.export.input_dir.clone(),
            output_dir: config.export.output_dir.clone(),
            raw_dir: if config.export.reset_raw_dir {
                Some(config.raw_path.clone())
            } else {
                None
            },
            multifrequency: config.export.multifrequency.clone(),
        })
    }
}

/// Name fragment describing a line's offset from its reference, used in
/// exported line file names.
fn offset_fragment(side: ZoneSide, reference: &str, offset: f64) -> String {
    let reference = reference.to_lowercase();
    match side {
        ZoneSide::Upper => {
            if offset <= 0.0 {
                format!("{} above {}", -offset, reference)
            } else {
                format!("{} below {}", offset, reference)
            }
        }
        ZoneSide::Lower => {
            if offset < 0.0 {
                format!("{} above {}", -offset, reference)
            } else {
                format!("{} below {}", -offset, reference)
            }
        }
    }
}

/// Run the export for one transect.
///
/// Returns the per zone success flags; a zone that fails is recorded and the
/// remaining zones still run.
pub fn export_transect(
    params: &ExportParams,
    store: &dyn SurveyStore,
    app: &mut dyn EvApplication,
    transect: &str,
    tx: &Sender<JobStatus>,
) -> Result<Vec<bool>, ExportError> {
    let label = transect_label(transect);
    let files = find_ev_files(&params.input_dir, store.survey(), &label)?;
    let ev_path = match files.first() {
        Some(path) => path.clone(),
        None => return Err(ExportError::NoEvFiles(transect.to_string())),
    };

    if !app.is_licensed() {
        return Err(ExportError::AutomationError(AutomationError::NotLicensed));
    }

    tx.send(JobStatus::new(0.0, transect, Stage::Exporting))?;
    log::info!("Working on {}", ev_path.display());

    let file_name = ev_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let export_name = match file_name.find("-z") {
        Some(cut) => file_name[..cut].to_string(),
        None => file_name.trim_end_matches(".ev").to_string(),
    };

    if let Some(raw_dir) = &params.raw_dir {
        // Point the file at the current raw data location first
        log::info!("Setting new raw file directory");
        let mut ev_file = app.open_file(&ev_path)?;
        ev_file.add_data_path(raw_dir)?;
        ev_file.save_as(&ev_path)?;
        ev_file.close()?;
    }

    let mut ev_file = app.open_file(&ev_path)?;
    ev_file.set_calibration_file(&params.fileset, &params.ecs_file)?;
    ev_file.select_variable(&params.variable)?;
    ev_file.set_time_distance_grid(params.interval.class, params.interval.length)?;

    let flags = if params.multifrequency.is_empty() {
        export_single(params, store, ev_file.as_mut(), &export_name)?
    } else {
        export_multifrequency(params, ev_file.as_mut(), &export_name)?
    };

    ev_file.close()?;
    tx.send(JobStatus::new(1.0, transect, Stage::Done))?;
    Ok(flags)
}

fn export_single(
    params: &ExportParams,
    store: &dyn SurveyStore,
    ev_file: &mut dyn EvFile,
    export_name: &str,
) -> Result<Vec<bool>, ExportError> {
    for variable in EXPORT_VARIABLES {
        ev_file.enable_export_variable(variable)?;
    }
    ev_file.set_minimum_threshold(params.min_threshold)?;
    ev_file.set_maximum_threshold(params.max_threshold)?;

    let regions_log = params
        .output_dir
        .join(format!("{}- (regions).csv", export_name));
    if let Err(e) = ev_file.export_regions_log(&regions_log) {
        log::error!("Unable to make the regions logbook: {}", e);
    }

    // Keep the calibration used for the export next to the outputs
    std::fs::copy(
        &params.ecs_file,
        params
            .output_dir
            .join(format!("{}-calibration-.ecs", export_name)),
    )?;

    let region_dir = params.output_dir.join("Regions");
    std::fs::create_dir_all(&region_dir)?;
    ev_file.export_region_definitions(&region_dir.join(format!("{}-regions.evr", export_name)))?;

    let line_dir = params.output_dir.join("Lines");
    std::fs::create_dir_all(&line_dir)?;

    let mut flags = Vec::new();
    let mut exported_lines: Vec<String> = Vec::new();
    for zone in &params.zones {
        match export_zone(params, store, ev_file, export_name, &line_dir, zone, &mut exported_lines)
        {
            Ok(()) => {
                log::info!("Zone {} export complete", zone.zone);
                flags.push(true);
            }
            Err(e) => {
                log::error!("The export has failed for zone {}: {}", zone.zone, e);
                flags.push(false);
            }
        }
    }

    // Export whatever lines remain. The fileset data lines carry a colon in
    // the name and belong with the raw files, so they are skipped.
    for name in ev_file.line_names() {
        if exported_lines.iter().any(|line| line == &name) || name.contains(':') {
            continue;
        }
        let dest = line_dir.join(format!("{}-{}.evl", export_name, name));
        if let Err(e) = ev_file.export_line(&name, &dest) {
            log::warn!("Could not export line {}: {}", name, e);
        }
    }

    Ok(flags)
}

fn export_zone(
    params: &ExportParams,
    store: &dyn SurveyStore,
    ev_file: &mut dyn EvFile,
    export_name: &str,
    line_dir: &Path,
    zone: &ZoneExport,
    exported_lines: &mut Vec<String>,
) -> Result<(), ExportError> {
    ev_file.set_depth_range_grid(1, zone.layer_thickness)?;

    if params.layer_reference_name != SURFACE_REFERENCE {
        // Non surface references grid off an offset copy of the reference
        let created = ev_file
            .create_offset_line(&params.layer_reference_name, params.reference_offset)?;
        let named = format!(
            "{}-offset{}",
            params.layer_reference_name, params.reference_offset
        );
        ev_file.rename_line(&created, &named)?;
        ev_file.set_depth_grid_reference_line(&named)?;
    }

    ev_file.set_exclude_above_line(&zone.exclude_above)?;
    export_exclusion_line(
        store,
        ev_file,
        export_name,
        line_dir,
        &zone.exclude_above,
        ZoneSide::Upper,
        &zone.zone,
        exported_lines,
    )?;
    ev_file.set_exclude_below_line(&zone.exclude_below)?;
    export_exclusion_line(
        store,
        ev_file,
        export_name,
        line_dir,
        &zone.exclude_below,
        ZoneSide::Lower,
        &zone.zone,
        exported_lines,
    )?;

    let dest = params
        .output_dir
        .join(format!("{}-z{}-.csv", export_name, zone.zone));
    ev_file.export_integration_cells(&dest)?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn export_exclusion_line(
    store: &dyn SurveyStore,
    ev_file: &mut dyn EvFile,
    export_name: &str,
    line_dir: &Path,
    line: &str,
    side: ZoneSide,
    zone: &str,
    exported_lines: &mut Vec<String>,
) -> Result<(), ExportError> {
    exported_lines.push(line.to_string());
    let row = store
        .exclusion_line(line)?
        .ok_or_else(|| ExportError::UnknownExclusionLine(line.to_string()))?;
    let fragment = offset_fragment(side, &row.layer_reference, row.offset);
    let dest = line_dir.join(format!(
        "{}-{}-{}-z{}-{}.evl",
        export_name, line, fragment, zone, side
    ));
    if let Err(e) = ev_file.export_line(line, &dest) {
        log::warn!(
            "There was a problem exporting the {} line file for zone {}: {}",
            side,
            zone,
            e
        );
    }
    Ok(())
}

fn export_multifrequency(
    params: &ExportParams,
    ev_file: &mut dyn EvFile,
    export_name: &str,
) -> Result<Vec<bool>, ExportError> {
    for variable in MF_EXPORT_VARIABLES {
        ev_file.enable_export_variable(variable)?;
    }

    let region_dir = params.output_dir.join("Regions");
    std::fs::create_dir_all(&region_dir)?;
    ev_file.export_region_definitions(&region_dir.join(format!("{}-regions.evr", export_name)))?;

    let mut flags = Vec::new();
    for mf in &params.multifrequency {
        ev_file.select_variable(&mf.name)?;
        ev_file.set_minimum_threshold(mf.minimum_threshold)?;
        ev_file.set_maximum_threshold(mf.maximum_threshold)?;

        for zone in &params.zones {
            ev_file.set_depth_range_grid(1, zone.layer_thickness)?;
            if params.layer_reference_name != SURFACE_REFERENCE {
                ev_file.set_depth_grid_reference_line(&params.layer_reference_name)?;
            }
            ev_file.set_exclude_above_line(&zone.exclude_above)?;
            ev_file.set_exclude_below_line(&zone.exclude_below)?;

            let dest = params
                .output_dir
                .join(format!("{}{}-z{}.csv", export_name, mf.suffix, zone.zone));
            match ev_file.export_integration_cells(&dest) {
                Ok(()) => {
                    log::info!("Zone {} export complete for {}", zone.zone, mf.name);
                    flags.push(true);
                }
                Err(e) => {
                    log::error!(
                        "The export has failed for zone {} of {}: {}",
                        zone.zone,
                        mf.name,
                        e
                    );
                    flags.push(false);
                }
            }
        }
    }

    Ok(flags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automation::JournalEv;
    use crate::config::ExportConfig;
    use crate::survey::{
        DatasetParams, EventRow, ExclusionLine, SurveySnapshot, ZoneParams,
    };
    use crate::transect::EventKind;
    use std::collections::BTreeMap;
    use std::sync::mpsc;
    use tempfile::TempDir;

    #[test]
    fn test_transect_label() {
        assert_eq!(transect_label("7"), "t007");
        assert_eq!(transect_label("42"), "t042");
        assert_eq!(transect_label("123"), "t123");
        assert_eq!(transect_label("10.5"), "t010.5");
    }

    #[test]
    fn test_grid_interval_mapping() {
        let gi = grid_interval(IntervalType::Time, IntervalUnits::Minutes, 5.0).unwrap();
        assert_eq!(gi, GridInterval { class: 1, length: 5.0 });
        let gi = grid_interval(IntervalType::Time, IntervalUnits::Hours, 2.0).unwrap();
        assert_eq!(gi, GridInterval { class: 1, length: 120.0 });
        let gi = grid_interval(IntervalType::Time, IntervalUnits::Days, 1.0).unwrap();
        assert_eq!(gi, GridInterval { class: 1, length: 1440.0 });
        let gi =
            grid_interval(IntervalType::GpsDistance, IntervalUnits::NauticalMiles, 0.5).unwrap();
        assert_eq!(gi, GridInterval { class: 2, length: 0.5 });
        let gi = grid_interval(IntervalType::GpsDistance, IntervalUnits::Meters, 100.0).unwrap();
        assert_eq!(gi.class, 5);
        let gi =
            grid_interval(IntervalType::VesselLog, IntervalUnits::NauticalMiles, 0.5).unwrap();
        assert_eq!(gi.class, 3);
        let gi = grid_interval(IntervalType::VesselLog, IntervalUnits::Meters, 100.0).unwrap();
        assert_eq!(gi.class, 6);
        let gi = grid_interval(IntervalType::PingNumber, IntervalUnits::Pings, 50.0).unwrap();
        assert_eq!(gi.class, 4);

        assert!(matches!(
            grid_interval(IntervalType::Time, IntervalUnits::Meters, 1.0),
            Err(ExportError::BadIntervalCombination { .. })
        ));
        assert!(matches!(
            grid_interval(IntervalType::PingNumber, IntervalUnits::Minutes, 1.0),
            Err(ExportError::BadIntervalCombination { .. })
        ));
    }

    #[test]
    fn test_offset_fragment_naming() {
        assert_eq!(
            offset_fragment(ZoneSide::Upper, "Surface", 16.0),
            "16 below surface"
        );
        assert_eq!(
            offset_fragment(ZoneSide::Upper, "Surface", -16.0),
            "16 above surface"
        );
        // The lower side always reports the negated offset
        assert_eq!(
            offset_fragment(ZoneSide::Lower, "Bottom", -0.5),
            "0.5 above bottom"
        );
        assert_eq!(
            offset_fragment(ZoneSide::Lower, "Bottom", 0.5),
            "-0.5 below bottom"
        );
    }

    fn test_dataset() -> DatasetParams {
        DatasetParams {
            source_name: Some(String::from("38 kHz for survey")),
            layer_reference: String::from("Surface"),
            layer_reference_name: Some(String::from("Surface (depth of zero)")),
            interval_type: IntervalType::GpsDistance,
            interval_units: IntervalUnits::NauticalMiles,
            interval_length: 0.5,
            minimum_threshold_applied: Some(true),
            minimum_threshold: Some(-70.0),
            maximum_threshold_applied: Some(false),
            maximum_threshold: None,
        }
    }

    fn test_snapshot() -> SurveySnapshot {
        let mut exclusion_lines = BTreeMap::new();
        exclusion_lines.insert(
            String::from("surface_exclusion"),
            ExclusionLine {
                layer_reference: String::from("Surface"),
                offset: 16.0,
            },
        );
        exclusion_lines.insert(
            String::from("bottom_exclusion"),
            ExclusionLine {
                layer_reference: String::from("Bottom"),
                offset: -0.5,
            },
        );

        let mut events = BTreeMap::new();
        events.insert(
            String::from("7"),
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

        SurveySnapshot {
            ship: String::from("157"),
            survey: String::from("202408"),
            data_set_id: String::from("1"),
            dataset: test_dataset(),
            zones: vec![ZoneParams {
                zone: String::from("0"),
                upper_exclusion_name: Some(String::from("surface_exclusion")),
                lower_exclusion_name: Some(String::from("bottom_exclusion")),
                layer_thickness: Some(10.0),
            }],
            exclusion_lines,
            events,
        }
    }

    fn test_config(root: &TempDir) -> Config {
        let input_dir = root.path().join("ev");
        let output_dir = root.path().join("exports");
        std::fs::create_dir_all(&input_dir).unwrap();
        std::fs::create_dir_all(&output_dir).unwrap();
        std::fs::write(input_dir.join("v157-s202408-x2-f38-t007-z0.ev"), b"").unwrap();
        let ecs = root.path().join("survey.ecs");
        std::fs::write(&ecs, b"ecs contents").unwrap();

        let mut config = Config::default();
        config.ecs_file = ecs;
        config.export = ExportConfig {
            input_dir,
            output_dir,
            fileset: String::from("Fileset1"),
            variable: None,
            reset_raw_dir: false,
            multifrequency: Vec::new(),
        };
        config
    }

    #[test]
    fn test_build_params() {
        let root = tempfile::tempdir().unwrap();
        let config = test_config(&root);
        let snapshot = test_snapshot();
        let params = ExportParams::build(&config, &snapshot).unwrap();
        assert_eq!(params.variable, "38 kHz for survey");
        assert_eq!(params.interval.class, 2);
        assert_eq!(params.min_threshold, Some(-70.0));
        assert_eq!(params.max_threshold, None);
        assert_eq!(params.layer_reference_name, "Surface (depth of zero)");
        assert_eq!(params.zones.len(), 1);
        assert_eq!(params.zones[0].exclude_above, "surface_exclusion");
    }

    #[test]
    fn test_build_params_missing_thickness_fails() {
        let root = tempfile::tempdir().unwrap();
        let config = test_config(&root);
        let mut snapshot = test_snapshot();
        snapshot.zones[0].layer_thickness = None;
        assert!(matches!(
            ExportParams::build(&config, &snapshot),
            Err(ExportError::NoLayerThickness(zone)) if zone == "0"
        ));
    }

    #[test]
    fn test_export_transect_journal() {
        let root = tempfile::tempdir().unwrap();
        let config = test_config(&root);
        let snapshot = test_snapshot();
        let params = ExportParams::build(&config, &snapshot).unwrap();

        let journal_path = root.path().join("journal.txt");
        let mut app = JournalEv::create(&journal_path).unwrap();
        let (tx, _rx) = mpsc::channel();
        let flags = export_transect(&params, &snapshot, &mut app, "7", &tx).unwrap();
        assert_eq!(flags, vec![true]);

        let journal = std::fs::read_to_string(&journal_path).unwrap();
        assert!(journal.contains("OpenFile"));
        assert!(journal.contains("Variables.FindByName \"38 kHz for survey\""));
        assert!(journal.contains("Grid.SetTimeDistanceGrid 2 0.5"));
        assert!(journal.contains("Data.MinimumThreshold -70"));
        assert!(journal.contains("Data.ApplyMaximumThreshold 0"));
        assert!(journal.contains("Grid.SetDepthRangeGrid 1 10"));
        assert!(journal.contains("Analysis.ExcludeAboveLine \"surface_exclusion\""));
        assert!(journal.contains("Analysis.ExcludeBelowLine \"bottom_exclusion\""));
        assert!(journal.contains(
            "ExportLine \"surface_exclusion\""
        ));
        assert!(journal.contains("16 below surface-z0-upper.evl"));
        assert!(journal.contains("0.5 above bottom-z0-lower.evl"));
        assert!(journal.contains("ExportIntegrationByRegionsByCellsAll"));
        assert!(journal.contains("v157-s202408-x2-f38-t007-z0-.csv"));
        // The sounder detected bottom line from the template is swept up by
        // the remaining-lines pass
        assert!(journal.contains(
            "ExportLine \"Mean of all sounder-detected bottom lines\""
        ));

        // The calibration file was copied next to the outputs
        assert!(config
            .export
            .output_dir
            .join("v157-s202408-x2-f38-t007-calibration-.ecs")
            .exists());
        assert!(config.export.output_dir.join("Regions").is_dir());
        assert!(config.export.output_dir.join("Lines").is_dir());
    }

    #[test]
    fn test_export_missing_ev_files() {
        let root = tempfile::tempdir().unwrap();
        let config = test_config(&root);
        let snapshot = test_snapshot();
        let params = ExportParams::build(&config, &snapshot).unwrap();
        let mut app = JournalEv::create(&root.path().join("journal.txt")).unwrap();
        let (tx, _rx) = mpsc::channel();
        assert!(matches!(
            export_transect(&params, &snapshot, &mut app, "9", &tx),
            Err(ExportError::NoEvFiles(transect)) if transect == "9"
        ));
    }

    #[test]
    fn test_multifrequency_export_journal() {
        let root = tempfile::tempdir().unwrap();
        let mut config = test_config(&root);
        config.export.multifrequency = vec![
            MfVariable {
                name: String::from("38 kHz for survey"),
                minimum_threshold: Some(-70.0),
                maximum_threshold: Some(-30.0),
                suffix: String::from(""),
            },
            MfVariable {
                name: String::from("Autokrill for export"),
                minimum_threshold: Some(-80.0),
                maximum_threshold: Some(-50.0),
                suffix: String::from("k1"),
            },
        ];
        let snapshot = test_snapshot();
        let params = ExportParams::build(&config, &snapshot).unwrap();

        let journal_path = root.path().join("journal.txt");
        let mut app = JournalEv::create(&journal_path).unwrap();
        let (tx, _rx) = mpsc::channel();
        let flags = export_transect(&params, &snapshot, &mut app, "7", &tx).unwrap();
        assert_eq!(flags, vec![true, true]);

        let journal = std::fs::read_to_string(&journal_path).unwrap();
        assert!(journal.contains("Export.Variables \"Kurtosis\" Enabled=1"));
        assert!(journal.contains("Variables.FindByName \"Autokrill for export\""));
        assert!(journal.contains("Data.MaximumThreshold -30"));
        assert!(journal.contains("v157-s202408-x2-f38-t007-z0.csv"));
        assert!(journal.contains("v157-s202408-x2-f38-t007k1-z0.csv"));
    }
}
