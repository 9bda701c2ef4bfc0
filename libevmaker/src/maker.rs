use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

use super::automation::{EvApplication, EvFile};
use super::config::Config;
use super::error::{AutomationError, MakerError};
use super::evr;
use super::progress::{JobStatus, Stage};
use super::raw_file;
use super::selector;
use super::survey::SurveyStore;
use super::transect::build_spans;

/// Fileset that receives the calibration file in the standard template.
const CALIBRATION_FILESET: &str = "Fileset 1";
/// Line names used by the standard template.
const SOUNDER_BOTTOM_LINE: &str = "Mean of all sounder-detected bottom lines";
const BOTTOM_EXCLUSION_LINE: &str = "bottom_exclusion";
const SURFACE_EXCLUSION_LINE: &str = "surface_exclusion";

/// Format a transect number the way EV file names embed it: three digits,
/// fractional transects truncated.
pub fn format_transect_number(transect: &str) -> String {
    let value = transect.trim().parse::<f64>().unwrap_or(0.0);
    format!("{:0>3}", value as i64)
}

/// The output EV file path for a transect.
pub fn ev_file_name(config: &Config, ship: &str, survey: &str, transect: &str) -> PathBuf {
    config.dest_path.join(format!(
        "v{}-s{}-x2-f38-t{}-z0.ev",
        ship,
        survey,
        format_transect_number(transect)
    ))
}

/// Build the EV file for one transect.
///
/// Returns the created file path, or None when the file already exists and
/// overwriting is off. Nothing is sent to the application until the event
/// log, the raw file listing, and the span matching have all checked out;
/// an unmatched span means the raw data has not been copied in yet and
/// aborts the build.
pub fn make_ev_file(
    config: &Config,
    store: &dyn SurveyStore,
    app: &mut dyn EvApplication,
    transect: &str,
    tx: &Sender<JobStatus>,
) -> Result<Option<PathBuf>, MakerError> {
    // check that all of our inputs are in place
    let raw_dir = config.raw_directory()?;
    let dest_dir = config.dest_directory()?;
    let template = config.template()?;
    let ecs = config.ecs()?;
    let line_region_dir = config.line_region_directory()?;

    tx.send(JobStatus::new(0.0, transect, Stage::Querying))?;
    let surface_depth = surface_exclusion_depth(store)?;
    let bottom_offset = bottom_exclusion_offset(store)?;

    let out_path = ev_file_name(config, store.ship(), store.survey(), transect);
    if out_path.exists() && !config.overwrite {
        log::warn!(
            "{} already exists; skipping transect {}",
            out_path.display(),
            transect
        );
        return Ok(None);
    }

    tx.send(JobStatus::new(0.1, transect, Stage::BuildingSpans))?;
    let events = store.transect_events(transect)?;
    let spans = build_spans(&events)?;

    tx.send(JobStatus::new(0.2, transect, Stage::MatchingFiles))?;
    let candidates = raw_file::scan_raw_directory(raw_dir)?;
    let selection = selector::select_files(&spans, &candidates, config.slack())?;
    if !selection.is_complete() {
        for span in &selection.unmatched {
            log::error!(
                "There are no data files for the transect segment that starts at {}. This usually means the data hasn't been copied into the raw data directory yet.",
                span.start
            );
        }
        return Err(MakerError::MissingSegments(selection.unmatched));
    }

    if !app.is_licensed() {
        return Err(MakerError::AutomationError(AutomationError::NotLicensed));
    }

    tx.send(JobStatus::new(0.3, transect, Stage::LoadingTemplate))?;
    let mut ev_file = app.new_file(template)?;
    ev_file.set_calibration_file(CALIBRATION_FILESET, ecs)?;

    tx.send(JobStatus::new(0.4, transect, Stage::AddingData))?;
    for file in &selection.files {
        ev_file.add_data_file(file)?;
    }

    // Lines built below will come out flat over any raw segment that has
    // not been indexed yet, so wait for the index sidecars first.
    tx.send(JobStatus::new(0.5, transect, Stage::Indexing))?;
    if !wait_for_indexing(
        &selection.files,
        config.indexing_poll_secs,
        config.indexing_timeout_secs,
    ) {
        log::warn!("Timed out waiting for the raw files to be indexed; lines may be incomplete");
    }

    if line_region_dir.is_none() {
        // Time based regions cannot be scripted directly; write an EVR
        // file, import it, then remove it.
        tx.send(JobStatus::new(0.6, transect, Stage::ImportingRegions))?;
        let evr_path = evr::write_event_regions(dest_dir, transect, &events)?;
        ev_file.import(&evr_path)?;
        std::fs::remove_file(&evr_path)?;
    }

    tx.send(JobStatus::new(0.7, transect, Stage::BuildingLines))?;
    rebuild_bottom_line(ev_file.as_mut(), bottom_offset)?;
    rebuild_surface_line(ev_file.as_mut(), surface_depth)?;

    if let Some(dir) = line_region_dir {
        tx.send(JobStatus::new(0.8, transect, Stage::BuildingLines))?;
        import_lines_and_regions(ev_file.as_mut(), dir, transect)?;
    }

    tx.send(JobStatus::new(0.9, transect, Stage::Saving))?;
    ev_file.save_as(&out_path)?;
    ev_file.close()?;
    tx.send(JobStatus::new(1.0, transect, Stage::Done))?;

    Ok(Some(out_path))
}

/// The surface exclusion depth, read off the zone whose upper exclusion is
/// the surface_exclusion line.
fn surface_exclusion_depth(store: &dyn SurveyStore) -> Result<f64, MakerError> {
    for zone in store.zones()? {
        if let Some(name) = &zone.upper_exclusion_name {
            if name == SURFACE_EXCLUSION_LINE {
                if let Some(line) = store.exclusion_line(name)? {
                    return Ok(line.offset);
                }
            }
        }
    }
    Err(MakerError::NoSurfaceExclusion)
}

/// The bottom offset, read off the zone whose lower exclusion is the
/// bottom_exclusion line.
fn bottom_exclusion_offset(store: &dyn SurveyStore) -> Result<f64, MakerError> {
    for zone in store.zones()? {
        if let Some(name) = &zone.lower_exclusion_name {
            if name == BOTTOM_EXCLUSION_LINE {
                if let Some(line) = store.exclusion_line(name)? {
                    return Ok(line.offset);
                }
            }
        }
    }
    Err(MakerError::NoBottomExclusion)
}

/// The index sidecar the application writes next to a raw file.
fn index_file_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".evi");
    PathBuf::from(name)
}

/// Block until every added raw file has its .evi index next to it, or the
/// timeout passes. Returns whether everything was indexed.
fn wait_for_indexing(files: &[PathBuf], poll_secs: u64, timeout_secs: u64) -> bool {
    let mut waited: u64 = 0;
    loop {
        let all_indexed = files.iter().all(|file| index_file_for(file).exists());
        if all_indexed {
            return true;
        }
        if waited >= timeout_secs {
            return false;
        }
        std::thread::sleep(std::time::Duration::from_secs(poll_secs));
        waited += poll_secs.max(1);
    }
}

/// Replace bottom_exclusion with an offset of the sounder detected bottom.
fn rebuild_bottom_line(ev_file: &mut dyn EvFile, offset: f64) -> Result<(), MakerError> {
    let new_line = ev_file.create_offset_line(SOUNDER_BOTTOM_LINE, offset)?;
    ev_file.overwrite_line(BOTTOM_EXCLUSION_LINE, &new_line)?;
    ev_file.delete_line(&new_line)?;
    Ok(())
}

/// Replace surface_exclusion with a fixed depth line.
fn rebuild_surface_line(ev_file: &mut dyn EvFile, depth: f64) -> Result<(), MakerError> {
    let new_line = ev_file.create_fixed_depth_line(depth)?;
    ev_file.overwrite_line(SURFACE_EXCLUSION_LINE, &new_line)?;
    ev_file.delete_line(&new_line)?;
    Ok(())
}

/// Files in a directory whose names carry the given token, sorted.
fn files_matching(dir: &Path, token: &str) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut list = Vec::new();
    if !dir.exists() {
        return Ok(list);
    }
    for item in dir.read_dir()? {
        let path = item?.path();
        let matches = path
            .file_name()
            .map(|name| name.to_string_lossy().contains(token))
            .unwrap_or(false);
        if matches {
            list.push(path);
        }
    }
    list.sort();
    Ok(list)
}

/// The line name the application assigns to an imported line file: the file
/// stem up to the first dot (anything past a dot is taken as the extension).
fn imported_line_name(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let trimmed = name.strip_suffix(".evl").unwrap_or(&name);
    trimmed.split('.').next().unwrap_or("").to_string()
}

/// Import saved line and region files for a transect.
///
/// Line files embed the name of the line they replace right after the
/// transect label. An existing editable line is overwritten in place; a line
/// the file does not yet have is imported and renamed to the embedded name.
/// An import that yields no line (the saved file was empty) is skipped.
fn import_lines_and_regions(
    ev_file: &mut dyn EvFile,
    dir: &Path,
    transect: &str,
) -> Result<(), MakerError> {
    let label = format!("t{}", format_transect_number(transect));

    for file in files_matching(&dir.join("Lines"), &label)? {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let parts: Vec<&str> = name.split('-').collect();
        let idx = match parts.iter().position(|part| *part == label) {
            Some(idx) => idx,
            None => return Err(MakerError::BadLineFileName(name)),
        };
        let target = match parts.get(idx + 1) {
            Some(token) => match token.find(".evl") {
                Some(cut) => &token[..cut],
                None => *token,
            },
            None => return Err(MakerError::BadLineFileName(name)),
        };

        if ev_file.has_line(target) && ev_file.line_is_editable(target) {
            ev_file.import(&file)?;
            let imported = imported_line_name(&file);
            if ev_file.has_line(&imported) {
                ev_file.overwrite_line(target, &imported)?;
                ev_file.delete_line(&imported)?;
            }
        } else if !ev_file.has_line(target) {
            ev_file.import(&file)?;
            let imported = imported_line_name(&file);
            if ev_file.has_line(&imported) {
                ev_file.rename_line(&imported, target)?;
            }
        }
    }

    for file in files_matching(&dir.join("Regions"), &label)? {
        ev_file.import(&file)?;
    }

    Ok(())
}
