use std::path::PathBuf;
use time::Duration;

use super::error::SelectError;
use super::raw_file::RawFileRecord;
use super::transect::TimeSpan;

/// The raw files matched to a transect's time spans.
///
/// `files` keeps the candidate order with duplicates removed; `unmatched`
/// holds every span for which no file was collected. An unmatched span means
/// the raw data has not been copied into the raw directory yet, so callers
/// abort rather than build an incomplete EV file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub files: Vec<PathBuf>,
    pub unmatched: Vec<TimeSpan>,
}

impl Selection {
    pub fn is_complete(&self) -> bool {
        self.unmatched.is_empty()
    }
}

/// Match candidate raw files against transect time spans.
///
/// Candidates must be ordered ascending by acquisition start. For each span
/// the candidates are walked in adjacent pairs: collection opens on the pair
/// whose timestamps bracket the span start, or on a file whose own start
/// lies within `slack` of the span start. Raw loggers cut files on a fixed
/// cadence, so a span can open shortly before the first usable file shows up
/// in the directory; the slack window keeps that file in. Collection closes
/// on the pair that brackets the span end.
///
/// The close check runs on every pair, including the one that just opened
/// collection, so a span bracketed by a single adjacent pair collects
/// exactly one file. The last candidate only ever participates as the
/// trailing half of a pair and is never collected itself.
pub fn select_files(
    spans: &[TimeSpan],
    candidates: &[RawFileRecord],
    slack: Duration,
) -> Result<Selection, SelectError> {
    if candidates.is_empty() {
        return Err(SelectError::NoCandidateFiles);
    }

    let mut kept: Vec<usize> = Vec::new();
    let mut unmatched: Vec<TimeSpan> = Vec::new();

    for span in spans {
        let mut collecting = false;
        let mut collected_any = false;

        for j in 0..candidates.len().saturating_sub(1) {
            let file_date = candidates[j].start;
            let next_date = candidates[j + 1].start;

            if collecting {
                kept.push(j);
                collected_any = true;
            } else if (file_date <= span.start && span.start <= next_date)
                || (span.start - file_date).whole_seconds().abs() < slack.whole_seconds()
            {
                kept.push(j);
                collected_any = true;
                collecting = true;
            }

            if file_date <= span.end && span.end <= next_date {
                collecting = false;
            }
        }

        if !collected_any {
            unmatched.push(*span);
        }
    }

    // A file claimed by two spans at a shared boundary is listed once, in
    // candidate order.
    kept.sort_unstable();
    let mut seen = vec![false; candidates.len()];
    let mut files = Vec::new();
    for j in kept {
        if !seen[j] {
            seen[j] = true;
            files.push(candidates[j].path.clone());
        }
    }

    Ok(Selection { files, unmatched })
}
