use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use super::error::AutomationError;

/// Line names present in the standard survey template.
pub const TEMPLATE_LINES: [&str; 3] = [
    "Mean of all sounder-detected bottom lines",
    "bottom_exclusion",
    "surface_exclusion",
];

/// Handle to the external acoustics application.
///
/// The scripting surface is deliberately narrow: check the license, open or
/// create project files, and hand back a file handle. Implementations report
/// every failure explicitly; the return-code style of the underlying
/// automation interface never leaks through.
pub trait EvApplication: Send {
    fn is_licensed(&self) -> bool;
    fn new_file(&mut self, template: &Path) -> Result<Box<dyn EvFile>, AutomationError>;
    fn open_file(&mut self, path: &Path) -> Result<Box<dyn EvFile>, AutomationError>;
    fn quit(&mut self) -> Result<(), AutomationError>;
}

/// Handle to one open project file.
pub trait EvFile: Send {
    fn set_calibration_file(&mut self, fileset: &str, ecs: &Path) -> Result<(), AutomationError>;
    fn add_data_file(&mut self, path: &Path) -> Result<(), AutomationError>;
    fn add_data_path(&mut self, dir: &Path) -> Result<(), AutomationError>;
    fn import(&mut self, path: &Path) -> Result<(), AutomationError>;

    fn has_line(&self, name: &str) -> bool;
    fn line_is_editable(&self, name: &str) -> bool;
    fn line_names(&self) -> Vec<String>;
    /// Create a line offset from an existing one; returns the new line's name.
    fn create_offset_line(&mut self, source: &str, offset: f64)
        -> Result<String, AutomationError>;
    /// Create a line at a fixed depth; returns the new line's name.
    fn create_fixed_depth_line(&mut self, depth: f64) -> Result<String, AutomationError>;
    fn overwrite_line(&mut self, target: &str, source: &str) -> Result<(), AutomationError>;
    fn delete_line(&mut self, name: &str) -> Result<(), AutomationError>;
    fn rename_line(&mut self, name: &str, new_name: &str) -> Result<(), AutomationError>;

    /// Select the acoustic variable subsequent grid, threshold, and export
    /// commands apply to.
    fn select_variable(&mut self, name: &str) -> Result<(), AutomationError>;
    fn set_time_distance_grid(&mut self, class: i32, length: f64)
        -> Result<(), AutomationError>;
    fn set_depth_range_grid(&mut self, mode: i32, thickness: f64)
        -> Result<(), AutomationError>;
    fn set_depth_grid_reference_line(&mut self, line: &str) -> Result<(), AutomationError>;
    /// Some(value) applies the threshold at value; None switches it off.
    fn set_minimum_threshold(&mut self, value: Option<f64>) -> Result<(), AutomationError>;
    fn set_maximum_threshold(&mut self, value: Option<f64>) -> Result<(), AutomationError>;
    fn set_exclude_above_line(&mut self, name: &str) -> Result<(), AutomationError>;
    fn set_exclude_below_line(&mut self, name: &str) -> Result<(), AutomationError>;
    fn enable_export_variable(&mut self, name: &str) -> Result<(), AutomationError>;

    fn export_integration_cells(&mut self, dest: &Path) -> Result<(), AutomationError>;
    fn export_regions_log(&mut self, dest: &Path) -> Result<(), AutomationError>;
    fn export_region_definitions(&mut self, dest: &Path) -> Result<(), AutomationError>;
    fn export_line(&mut self, line: &str, dest: &Path) -> Result<(), AutomationError>;

    fn save_as(&mut self, path: &Path) -> Result<(), AutomationError>;
    fn close(&mut self) -> Result<(), AutomationError>;
}

type SharedJournal = Arc<Mutex<BufWriter<File>>>;

fn record(journal: &SharedJournal, line: String) -> Result<(), AutomationError> {
    let mut out = journal
        .lock()
        .map_err(|_| AutomationError::CommandFailed(String::from("journal lock")))?;
    writeln!(out, "{}", line)?;
    out.flush()?;
    Ok(())
}

/// Automation backend that records every command to a journal file.
///
/// The processing workstations this tool is developed on have no scripting
/// interface installed, so the default backend writes the exact command
/// sequence to a journal for review instead of driving the application. A
/// COM-backed implementation slots in behind the same traits.
///
/// The journal tracks line bookkeeping the way the application would: files
/// created from a template carry the standard template lines, and importing
/// a line file yields a line named by the file stem up to the first dot.
pub struct JournalEv {
    journal: SharedJournal,
    template_lines: Vec<String>,
}

impl JournalEv {
    /// Open a journal at the given path, assuming the standard template.
    pub fn create(path: &Path) -> Result<Self, AutomationError> {
        Self::with_template_lines(
            path,
            TEMPLATE_LINES.iter().map(|name| name.to_string()).collect(),
        )
    }

    /// Open a journal for a template carrying a custom line list.
    pub fn with_template_lines(
        path: &Path,
        template_lines: Vec<String>,
    ) -> Result<Self, AutomationError> {
        let file = File::create(path)?;
        Ok(Self {
            journal: Arc::new(Mutex::new(BufWriter::new(file))),
            template_lines,
        })
    }
}

impl EvApplication for JournalEv {
    fn is_licensed(&self) -> bool {
        true
    }

    fn new_file(&mut self, template: &Path) -> Result<Box<dyn EvFile>, AutomationError> {
        record(&self.journal, format!("NewFile {}", template.display()))?;
        Ok(Box::new(JournalEvFile {
            journal: self.journal.clone(),
            lines: self.template_lines.clone(),
            line_counter: 0,
        }))
    }

    fn open_file(&mut self, path: &Path) -> Result<Box<dyn EvFile>, AutomationError> {
        record(&self.journal, format!("OpenFile {}", path.display()))?;
        Ok(Box::new(JournalEvFile {
            journal: self.journal.clone(),
            lines: self.template_lines.clone(),
            line_counter: 0,
        }))
    }

    fn quit(&mut self) -> Result<(), AutomationError> {
        record(&self.journal, String::from("Quit"))
    }
}

struct JournalEvFile {
    journal: SharedJournal,
    lines: Vec<String>,
    line_counter: usize,
}

impl JournalEvFile {
    fn register_line(&mut self, name: &str) {
        if !self.lines.iter().any(|line| line == name) {
            self.lines.push(name.to_string());
        }
    }

    fn unregister_line(&mut self, name: &str) {
        self.lines.retain(|line| line != name);
    }

    fn next_virtual_line(&mut self) -> String {
        self.line_counter += 1;
        format!("virtual line {}", self.line_counter)
    }
}

impl EvFile for JournalEvFile {
    fn set_calibration_file(&mut self, fileset: &str, ecs: &Path) -> Result<(), AutomationError> {
        record(
            &self.journal,
            format!("Fileset \"{}\": SetCalibrationFile {}", fileset, ecs.display()),
        )
    }

    fn add_data_file(&mut self, path: &Path) -> Result<(), AutomationError> {
        record(&self.journal, format!("DataFiles.Add {}", path.display()))
    }

    fn add_data_path(&mut self, dir: &Path) -> Result<(), AutomationError> {
        record(&self.journal, format!("DataPaths.Add {}", dir.display()))
    }

    fn import(&mut self, path: &Path) -> Result<(), AutomationError> {
        record(&self.journal, format!("Import {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if name.ends_with(".evl") {
            let stem = name.split('.').next().unwrap_or("").to_string();
            self.register_line(&stem);
        }
        Ok(())
    }

    fn has_line(&self, name: &str) -> bool {
        self.lines.iter().any(|line| line == name)
    }

    fn line_is_editable(&self, _name: &str) -> bool {
        true
    }

    fn line_names(&self) -> Vec<String> {
        self.lines.clone()
    }

    fn create_offset_line(
        &mut self,
        source: &str,
        offset: f64,
    ) -> Result<String, AutomationError> {
        let name = self.next_virtual_line();
        record(
            &self.journal,
            format!(
                "Lines.CreateOffsetLinear \"{}\" {} -> \"{}\"",
                source, offset, name
            ),
        )?;
        self.register_line(&name);
        Ok(name)
    }

    fn create_fixed_depth_line(&mut self, depth: f64) -> Result<String, AutomationError> {
        let name = self.next_virtual_line();
        record(
            &self.journal,
            format!("Lines.CreateFixedDepth {} -> \"{}\"", depth, name),
        )?;
        self.register_line(&name);
        Ok(name)
    }

    fn overwrite_line(&mut self, target: &str, source: &str) -> Result<(), AutomationError> {
        if !self.has_line(target) {
            return Err(AutomationError::LineNotFound(target.to_string()));
        }
        record(
            &self.journal,
            format!("Lines.Overwrite \"{}\" <- \"{}\"", target, source),
        )
    }

    fn delete_line(&mut self, name: &str) -> Result<(), AutomationError> {
        record(&self.journal, format!("Lines.Delete \"{}\"", name))?;
        self.unregister_line(name);
        Ok(())
    }

    fn rename_line(&mut self, name: &str, new_name: &str) -> Result<(), AutomationError> {
        if !self.has_line(name) {
            return Err(AutomationError::LineNotFound(name.to_string()));
        }
        record(
            &self.journal,
            format!("Lines.Rename \"{}\" -> \"{}\"", name, new_name),
        )?;
        self.unregister_line(name);
        self.register_line(new_name);
        Ok(())
    }

    fn select_variable(&mut self, name: &str) -> Result<(), AutomationError> {
        record(&self.journal, format!("Variables.FindByName \"{}\"", name))
    }

    fn set_time_distance_grid(&mut self, class: i32, length: f64) -> Result<(), AutomationError> {
        record(
            &self.journal,
            format!("Grid.SetTimeDistanceGrid {} {}", class, length),
        )
    }

    fn set_depth_range_grid(&mut self, mode: i32, thickness: f64) -> Result<(), AutomationError> {
        record(
            &self.journal,
            format!("Grid.SetDepthRangeGrid {} {}", mode, thickness),
        )
    }

    fn set_depth_grid_reference_line(&mut self, line: &str) -> Result<(), AutomationError> {
        record(
            &self.journal,
            format!("Grid.DepthRangeReferenceLine \"{}\"", line),
        )
    }

    fn set_minimum_threshold(&mut self, value: Option<f64>) -> Result<(), AutomationError> {
        match value {
            Some(value) => record(&self.journal, format!("Data.MinimumThreshold {}", value)),
            None => record(&self.journal, String::from("Data.ApplyMinimumThreshold 0")),
        }
    }

    fn set_maximum_threshold(&mut self, value: Option<f64>) -> Result<(), AutomationError> {
        match value {
            Some(value) => record(&self.journal, format!("Data.MaximumThreshold {}", value)),
            None => record(&self.journal, String::from("Data.ApplyMaximumThreshold 0")),
        }
    }

    fn set_exclude_above_line(&mut self, name: &str) -> Result<(), AutomationError> {
        record(
            &self.journal,
            format!("Analysis.ExcludeAboveLine \"{}\"", name),
        )
    }

    fn set_exclude_below_line(&mut self, name: &str) -> Result<(), AutomationError> {
        record(
            &self.journal,
            format!("Analysis.ExcludeBelowLine \"{}\"", name),
        )
    }

    fn enable_export_variable(&mut self, name: &str) -> Result<(), AutomationError> {
        record(
            &self.journal,
            format!("Export.Variables \"{}\" Enabled=1", name),
        )
    }

    fn export_integration_cells(&mut self, dest: &Path) -> Result<(), AutomationError> {
        record(
            &self.journal,
            format!("ExportIntegrationByRegionsByCellsAll {}", dest.display()),
        )
    }

    fn export_regions_log(&mut self, dest: &Path) -> Result<(), AutomationError> {
        record(
            &self.journal,
            format!("ExportRegionsLogAll {}", dest.display()),
        )
    }

    fn export_region_definitions(&mut self, dest: &Path) -> Result<(), AutomationError> {
        record(
            &self.journal,
            format!("Regions.ExportDefinitionsAll {}", dest.display()),
        )
    }

    fn export_line(&mut self, line: &str, dest: &Path) -> Result<(), AutomationError> {
        if !self.has_line(line) {
            return Err(AutomationError::LineNotFound(line.to_string()));
        }
        record(
            &self.journal,
            format!("ExportLine \"{}\" {}", line, dest.display()),
        )
    }

    fn save_as(&mut self, path: &Path) -> Result<(), AutomationError> {
        record(&self.journal, format!("SaveAs {}", path.display()))
    }

    fn close(&mut self) -> Result<(), AutomationError> {
        record(&self.journal, String::from("CloseFile"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_journal_records_commands() {
        let dir = tempfile::tempdir().unwrap();
        let journal_path = dir.path().join("journal.txt");
        let mut app = JournalEv::create(&journal_path).unwrap();

        let mut ev_file = app.new_file(&PathBuf::from("template.ev")).unwrap();
        ev_file
            .set_calibration_file("Fileset 1", &PathBuf::from("cal.ecs"))
            .unwrap();
        ev_file.add_data_file(&PathBuf::from("a.raw")).unwrap();
        ev_file.save_as(&PathBuf::from("out.ev")).unwrap();
        ev_file.close().unwrap();

        let contents = std::fs::read_to_string(&journal_path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(
            lines,
            vec![
                "NewFile template.ev",
                "Fileset \"Fileset 1\": SetCalibrationFile cal.ecs",
                "DataFiles.Add a.raw",
                "SaveAs out.ev",
                "CloseFile",
            ]
        );
    }

    #[test]
    fn test_journal_line_bookkeeping() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = JournalEv::create(&dir.path().join("journal.txt")).unwrap();
        let mut ev_file = app.new_file(&PathBuf::from("template.ev")).unwrap();

        assert!(ev_file.has_line("bottom_exclusion"));
        let created = ev_file.create_fixed_depth_line(16.0).unwrap();
        ev_file.overwrite_line("surface_exclusion", &created).unwrap();
        ev_file.delete_line(&created).unwrap();
        assert!(!ev_file.has_line(&created));

        // Importing a line file yields a line named by the stem up to the
        // first dot
        ev_file
            .import(&PathBuf::from("v157-s202408-t007-seabed.evl"))
            .unwrap();
        assert!(ev_file.has_line("v157-s202408-t007-seabed"));

        assert!(matches!(
            ev_file.rename_line("missing", "other"),
            Err(AutomationError::LineNotFound(_))
        ));
    }
}
