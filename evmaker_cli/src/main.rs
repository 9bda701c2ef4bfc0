//! # evmaker_cli
//!
//! Part of the evmaker crate family.
//!
//! Command line application to build EV files for completed survey transects
//! and to batch export results from finished EV files.
//!
//! ## Use
//!
//! Write a template configuration with
//!
//! ```bash
//! evmaker_cli -p config.yaml new
//! ```
//!
//! fill out the paths and the survey snapshot, then run one of
//!
//! ```bash
//! evmaker_cli -p config.yaml make
//! evmaker_cli -p config.yaml export
//! ```
//!
//! Every command issued to the application is recorded in the configured
//! journal file.

use clap::{Arg, Command};
use indicatif::{MultiProgress, ProgressBar};
use indicatif_log_bridge::LogWrapper;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use libevmaker::automation::JournalEv;
use libevmaker::config::Config;
use libevmaker::process::{process, process_exports};
use libevmaker::survey::{SurveySnapshot, SurveyStore};

fn make_template_config(path: &Path) {
    let config = Config::default();
    let yaml_str = serde_yaml::to_string(&config).unwrap();
    let mut file = File::create(path).expect("Could create template config file!");
    file.write_all(yaml_str.as_bytes())
        .expect("Failed to write yaml data to file!");
}

fn main() {
    // Create a cli
    let matches = Command::new("evmaker_cli")
        .arg_required_else_help(true)
        .subcommand(Command::new("new").about("Make a template configuration yaml file"))
        .subcommand(Command::new("make").about("Build EV files for the configured transects"))
        .subcommand(
            Command::new("export").about("Batch export results from finished EV files"),
        )
        .arg(
            Arg::new("path")
                .short('p')
                .long("path")
                .help("Path to the configuration file"),
        )
        .get_matches();

    // Initialize feedback
    let logger = simplelog::TermLogger::new(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );

    let pb_manager = MultiProgress::new();

    LogWrapper::new(pb_manager.clone(), logger)
        .try_init()
        .expect("Could not create logging/progress!");

    // Parse the cli
    let config_path = PathBuf::from(matches.get_one::<String>("path").expect("We require args"));

    match matches.subcommand() {
        Some(("new", _)) => {
            log::info!(
                "Making a template config at {}...",
                config_path.to_string_lossy()
            );

            make_template_config(&config_path);
            log::info!("Done.");
        }
        Some(("make", _)) => run(&config_path, &pb_manager, false),
        Some(("export", _)) => run(&config_path, &pb_manager, true),
        _ => log::error!("Specify one of the new, make, or export subcommands"),
    }
}

fn run(config_path: &Path, pb_manager: &MultiProgress, export: bool) {
    // Load our config
    log::info!("Loading config from {}...", config_path.to_string_lossy());
    let config = match Config::read_config_file(config_path) {
        Ok(c) => c,
        Err(e) => {
            log::error!("{e}");
            return;
        }
    };
    log::info!("Config successfully loaded.");
    log::info!("Survey snapshot: {}", config.survey_path.to_string_lossy());
    log::info!("Raw Path: {}", config.raw_path.to_string_lossy());
    log::info!("Destination Path: {}", config.dest_path.to_string_lossy());
    log::info!("Template: {}", config.template_file.to_string_lossy());
    log::info!("ECS File: {}", config.ecs_file.to_string_lossy());
    log::info!("Journal: {}", config.journal_path.to_string_lossy());

    let store = match SurveySnapshot::read_snapshot_file(&config.survey_path) {
        Ok(s) => s,
        Err(e) => {
            log::error!("{e}");
            return;
        }
    };
    log::info!(
        "Ship {} survey {} data set {}",
        store.ship(),
        store.survey(),
        store.data_set_id()
    );

    let mut app = match JournalEv::create(&config.journal_path) {
        Ok(a) => a,
        Err(e) => {
            log::error!("{e}");
            return;
        }
    };

    // Setup the progress bar
    let pb = pb_manager.add(ProgressBar::new(100));
    let (tx, rx) = mpsc::channel();

    // Spawn the task!
    let handle = std::thread::spawn(move || {
        if export {
            process_exports(&config, &store, &mut app, &tx)
        } else {
            process(&config, &store, &mut app, &tx)
        }
    });

    loop {
        match rx.recv_timeout(std::time::Duration::from_millis(200)) {
            Ok(status) => {
                pb.set_position((status.progress * 100.0) as u64);
                pb.set_message(format!("Transect {}: {}", status.transect, status.stage));
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                if handle.is_finished() {
                    break;
                }
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    match handle.join() {
        Ok(result) => match result {
            Ok(_) => log::info!("Done."),
            Err(e) => log::error!("Processing failed with error: {e}"),
        },
        Err(_) => log::error!("Failed to join the worker task!"),
    }

    pb.finish();
}
