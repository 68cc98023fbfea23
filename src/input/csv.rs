use chrono::DateTime;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

use super::{LoadError, LogSource};
use crate::core::Micros;

/// Header names recognised as the time column, compared lowercase
const TIME_COLUMNS: &[&str] = &["time", "time (us)", "time_us", "timestamp", "t"];

/// Segments need at least this many frames to be opened
const MIN_SEGMENT_FRAMES: usize = 2;

#[derive(Debug, Clone, Default)]
struct Segment {
    times: Vec<Micros>,
    frames: Vec<Vec<f64>>,
}

impl Segment {
    fn error(&self) -> Option<String> {
        if self.times.len() < MIN_SEGMENT_FRAMES {
            Some(format!("only {} frame(s)", self.times.len()))
        } else {
            None
        }
    }
}

/// Flight log read from a CSV file.
///
/// The first row names the fields. A time that goes backwards starts a new
/// segment, which is how a logger restarting mid-file shows up.
#[derive(Debug, Clone)]
pub struct CsvLog {
    identity: String,
    field_names: Vec<String>,
    segments: Vec<Segment>,
    selected: Option<usize>,
}

impl CsvLog {
    /// Load a CSV log from a file
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let identity = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let file = File::open(path)?;
        Self::from_reader(&identity, file)
    }

    /// Parse CSV data from any reader
    pub fn from_reader<R: Read>(identity: &str, reader: R) -> Result<Self, LoadError> {
        let mut rdr = ::csv::ReaderBuilder::new().trim(::csv::Trim::All).from_reader(reader);

        let headers = rdr.headers()?.clone();
        let time_idx = find_time_column(&headers).ok_or(LoadError::MissingTimeColumn)?;
        let field_names: Vec<String> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != time_idx)
            .map(|(_, h)| h.to_string())
            .collect();

        let mut segments: Vec<Segment> = Vec::new();
        let mut current = Segment::default();

        for result in rdr.records() {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let raw_time = record.get(time_idx).unwrap_or("");
            let time = parse_timestamp(raw_time).ok_or_else(|| LoadError::InvalidValue {
                line,
                field: headers.get(time_idx).unwrap_or("time").to_string(),
                value: raw_time.to_string(),
            })?;

            let mut frame = Vec::with_capacity(field_names.len());
            for (i, cell) in record.iter().enumerate() {
                if i == time_idx {
                    continue;
                }
                frame.push(parse_value(cell).ok_or_else(|| LoadError::InvalidValue {
                    line,
                    field: headers.get(i).unwrap_or("").to_string(),
                    value: cell.to_string(),
                })?);
            }

            if current.times.last().is_some_and(|&last| time < last) {
                debug!(line, "time went backwards, starting new segment");
                segments.push(std::mem::take(&mut current));
            }
            current.times.push(time);
            current.frames.push(frame);
        }

        if !current.times.is_empty() {
            segments.push(current);
        }
        if segments.is_empty() {
            return Err(LoadError::NoFrames);
        }

        Ok(Self {
            identity: identity.to_string(),
            field_names,
            segments,
            selected: None,
        })
    }

    fn segment(&self) -> Option<&Segment> {
        self.selected.and_then(|i| self.segments.get(i))
    }

    /// Time span of a segment, whether or not it is open
    pub fn segment_range(&self, index: usize) -> Option<(Micros, Micros)> {
        let segment = self.segments.get(index)?;
        Some((*segment.times.first()?, *segment.times.last()?))
    }
}

impl LogSource for CsvLog {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn segment_count(&self) -> usize {
        self.segments.len()
    }

    fn open_segment(&mut self, index: usize) -> bool {
        match self.segments.get(index) {
            Some(segment) => match segment.error() {
                Some(reason) => {
                    warn!(index, reason = %reason, "segment cannot be opened");
                    false
                }
                None => {
                    self.selected = Some(index);
                    true
                }
            },
            None => false,
        }
    }

    fn segment_index(&self) -> Option<usize> {
        self.selected
    }

    fn segment_error(&self, index: usize) -> Option<String> {
        match self.segments.get(index) {
            Some(segment) => segment.error(),
            None => Some("no such segment".to_string()),
        }
    }

    fn min_time(&self) -> Micros {
        self.segment()
            .and_then(|s| s.times.first().copied())
            .unwrap_or(0)
    }

    fn max_time(&self) -> Micros {
        self.segment()
            .and_then(|s| s.times.last().copied())
            .unwrap_or(0)
    }

    fn field_names(&self) -> &[String] {
        &self.field_names
    }

    fn frame_at(&self, time: Micros) -> Option<&[f64]> {
        let segment = self.segment()?;
        let idx = segment.times.partition_point(|&t| t <= time).saturating_sub(1);
        segment.frames.get(idx).map(Vec::as_slice)
    }
}

fn find_time_column(headers: &::csv::StringRecord) -> Option<usize> {
    headers
        .iter()
        .position(|h| TIME_COLUMNS.contains(&h.to_lowercase().as_str()))
}

/// Microseconds as a number, or an RFC 3339 timestamp
fn parse_timestamp(raw: &str) -> Option<Micros> {
    if let Ok(us) = raw.parse::<i64>() {
        return Some(us);
    }
    if let Ok(us) = raw.parse::<f64>() {
        return us.is_finite().then(|| us.round() as Micros);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.timestamp_micros())
}

fn parse_value(raw: &str) -> Option<f64> {
    if raw.is_empty() {
        return Some(f64::NAN);
    }
    raw.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> CsvLog {
        CsvLog::from_reader("LOG00001.TXT", text.as_bytes()).unwrap()
    }

    #[test]
    fn test_fields_exclude_time_column() {
        let log = parse("loopIteration, time (us), motor[0]\n0, 100, 1000\n1, 200, 1010\n");
        assert_eq!(log.field_names(), ["loopIteration".to_string(), "motor[0]".to_string()]);
        assert_eq!(log.segment_count(), 1);
    }

    #[test]
    fn test_time_going_backwards_splits_segments() {
        let mut log = parse("time,vbat\n100,16.0\n200,15.9\n300,15.8\n50,16.1\n150,16.0\n10,12.0\n");
        assert_eq!(log.segment_count(), 3);

        assert!(log.open_segment(1));
        assert_eq!(log.segment_index(), Some(1));
        assert_eq!((log.min_time(), log.max_time()), (50, 150));

        // single-frame tail cannot be opened
        assert!(!log.open_segment(2));
        assert!(log.segment_error(2).is_some());
        assert_eq!(log.segment_index(), Some(1));
        assert!(!log.open_segment(3));
    }

    #[test]
    fn test_frame_at_picks_frame_at_or_before() {
        let mut log = parse("time,gyro\n1000,1\n2000,2\n3000,3\n");
        assert!(log.frame_at(1500).is_none());
        log.open_segment(0);

        assert_eq!(log.frame_at(1500), Some(&[1.0][..]));
        assert_eq!(log.frame_at(3000), Some(&[3.0][..]));
        assert_eq!(log.frame_at(0), Some(&[1.0][..]));
        assert_eq!(log.frame_at(99_999), Some(&[3.0][..]));
    }

    #[test]
    fn test_rfc3339_timestamps() {
        let mut log = parse("timestamp,alt\n2024-05-01T10:00:00Z,1\n2024-05-01T10:00:01.5Z,2\n");
        log.open_segment(0);
        assert_eq!(log.max_time() - log.min_time(), 1_500_000);
    }

    #[test]
    fn test_missing_time_column() {
        let result = CsvLog::from_reader("x", "a,b\n1,2\n".as_bytes());
        assert!(matches!(result, Err(LoadError::MissingTimeColumn)));
    }

    #[test]
    fn test_invalid_value_reports_line() {
        let result = CsvLog::from_reader("x", "time,a\n0,1\n10,oops\n".as_bytes());
        match result {
            Err(LoadError::InvalidValue { line, field, value }) => {
                assert_eq!(line, 3);
                assert_eq!(field, "a");
                assert_eq!(value, "oops");
            }
            other => panic!("unexpected result: {:?}", other.map(|l| l.segment_count())),
        }
    }

    #[test]
    fn test_empty_log() {
        let result = CsvLog::from_reader("x", "time,a\n".as_bytes());
        assert!(matches!(result, Err(LoadError::NoFrames)));
    }
}
