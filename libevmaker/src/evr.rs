use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use time::format_description::FormatItem;
use time::macros::format_description;
use time::Duration;

use super::error::EvrError;
use super::transect::TransectEvent;

/// EVR format header written by this tool chain.
const EVR_HEADER: &str = "EVRG 7 7.1.34.30284";
/// Region end timestamps sit just past the event to give the marker width.
const REGION_END_OFFSET: Duration = Duration::milliseconds(1003);

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year][month][day]");
const TIME_FORMAT: &[FormatItem<'static>] =
    format_description!("[hour][minute][second][subsecond digits:3]0");

/// Write the marker region file for a transect's events.
///
/// Time based regions cannot be scripted directly, so the maker writes an
/// EVR file, imports it into the new EV file, and deletes it. One four point
/// region named `<event>_<transect>` is written per event. The end date of a
/// region comes from the offset timestamp; the end time of day repeats the
/// start value.
pub fn write_event_regions(
    dest_dir: &Path,
    transect: &str,
    events: &[TransectEvent],
) -> Result<PathBuf, EvrError> {
    let path = dest_dir.join(format!("Transect_{}.evr", transect));
    let file = File::create(&path)?;
    let mut out = BufWriter::new(file);

    write!(out, "{}\r\n", EVR_HEADER)?;
    write!(out, "{}\r\n", events.len())?;
    write!(out, "\r\n")?;

    for (idx, event) in events.iter().enumerate() {
        let d1 = event.time.format(DATE_FORMAT)?;
        let t1 = event.time.format(TIME_FORMAT)?;
        let end = event.time + REGION_END_OFFSET;
        let d2 = end.format(DATE_FORMAT)?;
        let t2 = t1.clone();
        let name = format!("{}_{}", event.kind, transect);

        write!(
            out,
            "13 4 {} 0 6 -1 1 {} {}  -9999.99 {} {}  9999.99\r\n",
            idx + 1,
            d1,
            t1,
            d2,
            t2
        )?;
        write!(out, "1\r\n")?;
        write!(out, "{}\r\n", name)?;
        write!(out, "0\r\n")?;
        write!(out, "Unclassified\r\n")?;
        write!(
            out,
            "{} {} -9999.9900000000 {} {}  9999.9900000000 {} {} 9999.9900000000 {} {} -9999.9900000000 2 \r\n",
            d1, t1, d1, t1, d2, t2, d2, t2
        )?;
        write!(out, "{}\r\n", name)?;
        write!(out, "\r\n")?;
    }

    out.flush()?;
    Ok(path)
}
