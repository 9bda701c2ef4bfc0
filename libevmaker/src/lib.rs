//! # evmaker
//!
//! evmaker is the MACE survey EV file tool chain, written in Rust. It builds
//! new Echoview project files for completed acoustic survey transects and
//! runs batch exports of echo-integration results, lines, and regions from
//! finished project files.
//!
//! Building a project file works from two inputs: the transect event log
//! recorded by the survey database (start, end, break, and resume events)
//! and the directory of raw sonar files written by the echosounder. The
//! event log decomposes into the transect's active time spans, the raw file
//! names carry their acquisition start times, and the maker matches the two
//! to find the minimal file list covering every span. The matched files,
//! transect marker regions, and the standard exclusion lines are then driven
//! into a new project file through the application's scripting interface.
//!
//! ## Crates
//!
//! - `libevmaker`: the library crate holding all of the workflow logic
//! - `evmaker_cli`: the command line application
//!
//! ## Configuration
//!
//! Both workflows are driven from a single YAML configuration. A template
//! can be written with the CLI's `new` subcommand. The fields are:
//!
//! ```yml
//! survey_path: None        # survey metadata snapshot (YAML)
//! raw_path: None           # directory of .raw sonar files
//! dest_path: None          # directory receiving new EV files
//! template_file: None      # template .ev project file
//! ecs_file: None           # .ecs calibration file
//! line_region_path: null   # saved Lines/ and Regions/ directory (optional)
//! transects: []            # transects to process; empty means all completed
//! overwrite: false
//! just_missed_secs: 300    # slack window for a file that starts just late
//! indexing_poll_secs: 3
//! indexing_timeout_secs: 60
//! journal_path: ./evmaker_journal.txt
//! export:
//!   input_dir: None        # directory of finished EV files
//!   output_dir: None       # directory receiving CSV/EVL/EVR exports
//!   fileset: Fileset1
//!   variable: null         # override of the data set export variable
//!   reset_raw_dir: false
//!   multifrequency: []
//! ```
//!
//! ## Survey snapshots
//!
//! The survey database is not reachable from the processing machines, so
//! ship, survey, data set, zone, exclusion line, and transect event rows are
//! carried in a YAML snapshot (see [`survey::SurveySnapshot`]). Anything
//! implementing [`survey::SurveyStore`] can stand in for the snapshot.
//!
//! ## Output
//!
//! The maker writes one `v<ship>-s<survey>-x2-f38-t<NNN>-z0.ev` file per
//! transect. The exporter writes per-zone integration CSV files, a regions
//! logbook, region definitions, and the analysis lines as EVL files under
//! `Lines/` and `Regions/` in the export output directory. Every command
//! issued to the application is also recorded in the journal file, which is
//! worth keeping with the processed data.
pub mod automation;
pub mod config;
pub mod error;
pub mod evr;
pub mod exporter;
pub mod maker;
pub mod process;
pub mod progress;
pub mod raw_file;
pub mod selector;
pub mod survey;
pub mod transect;
