use crate::mode::{detect_mode_from_filename, Mode};
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, warn};

pub mod battery;
pub mod error;
pub mod html;
pub mod mode;
pub mod plot;
pub mod power_analyze;
pub mod power_plot;
pub mod power_range;
pub mod report;
pub mod stats;
pub mod time_range;
pub mod utils;

pub use crate::error::{PowerError, Result};

// constants
pub const VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");
pub const COLUMN_NAMES: [&str; 4] = ["Time", "Voltage", "Current", "Power"];
const TIME: usize = 0;
const VOLTAGE: usize = 1;
const CURRENT: usize = 2;
const POWER: usize = 3;

/// The main struct for one recording: time [s], voltage [V], current [A], power [W].
#[derive(Debug, Clone)]
pub struct PowerTrace {
    pub time: Vec<f64>,
    pub voltage: Vec<f64>,
    pub current: Vec<f64>,
    pub power: Vec<f64>,
    pub mode: Mode,
    /// file stem of the source csv
    pub name: String,
    /// name used in charts and reports, unique within one analysis
    pub label: String,
}

impl PowerTrace {
    /// Initiate a new empty PowerTrace
    /// using the given capacity for the column vectors.
    pub fn new(capacity: usize) -> PowerTrace {
        PowerTrace {
            time: Vec::with_capacity(capacity),
            voltage: Vec::with_capacity(capacity),
            current: Vec::with_capacity(capacity),
            power: Vec::with_capacity(capacity),
            mode: Mode::Unknown,
            name: String::new(),
            label: Mode::Unknown.label().to_string(),
        }
    }

    /// Initiate a PowerTrace from csv.
    /// The first row is the header, the columns are found by name when possible
    /// and otherwise the first four columns are taken as time, voltage, current and power.
    /// Rows with missing or non-numeric values and rows with negative power are dropped,
    /// the remaining samples are sorted by time.
    /// The mode is inferred from the file name when not given.
    pub fn from_csv<P>(fin: P, mode: Option<Mode>) -> Result<PowerTrace>
    where
        P: AsRef<Path>,
    {
        let path = fin.as_ref();
        let file = File::open(path).map_err(|e| PowerError::io(path, e))?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(BufReader::new(file));
        let headers = reader
            .headers()
            .map_err(|e| PowerError::csv(path, e))?
            .clone();
        if headers.len() < 4 {
            return Err(PowerError::MissingColumns {
                path: path.to_path_buf(),
                found: headers.len(),
            });
        }
        let columns = ColumnMap::from_headers(headers.iter());
        debug!(?columns, "column layout of {}", path.display());

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mode = mode.unwrap_or_else(|| detect_mode_from_filename(&name));

        let mut trace = PowerTrace::new(10000);
        trace.mode = mode;
        trace.label = mode.label().to_string();
        trace.name = name;

        let mut invalid = 0usize;
        let mut negative = 0usize;
        for (i, record) in reader.records().enumerate() {
            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    debug!("could not read row {}: {}", i + 2, e);
                    invalid += 1;
                    continue;
                }
            };
            match columns.parse(&record) {
                Some(sample) if sample[POWER] < 0. => negative += 1,
                Some(sample) => trace.push(sample),
                None => {
                    debug!("skipping row {} with missing or non-numeric values", i + 2);
                    invalid += 1;
                }
            }
        }
        if invalid > 0 {
            warn!("{}: dropped {} invalid rows", path.display(), invalid);
        }
        if negative > 0 {
            warn!("{}: dropped {} rows with negative power", path.display(), negative);
        }
        if trace.is_empty() {
            return Err(PowerError::EmptyTrace(path.to_path_buf()));
        }
        trace.sort_by_time();
        Ok(trace)
    }

    fn push(&mut self, sample: [f64; 4]) {
        self.time.push(sample[TIME]);
        self.voltage.push(sample[VOLTAGE]);
        self.current.push(sample[CURRENT]);
        self.power.push(sample[POWER]);
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn is_ordered(&self) -> bool {
        self.time.windows(2).all(|w| w[1] >= w[0])
    }

    /// Stable sort of all the columns by time.
    pub fn sort_by_time(&mut self) {
        if self.is_ordered() {
            return;
        }
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by(|&a, &b| self.time[a].total_cmp(&self.time[b]));
        let reorder = |v: &Vec<f64>| order.iter().map(|&i| v[i]).collect::<Vec<f64>>();
        self.time = reorder(&self.time);
        self.voltage = reorder(&self.voltage);
        self.current = reorder(&self.current);
        self.power = reorder(&self.power);
    }

    pub fn start_time(&self) -> f64 {
        self.time.first().copied().unwrap_or(0.)
    }

    pub fn end_time(&self) -> f64 {
        self.time.last().copied().unwrap_or(0.)
    }

    /// Recording length in seconds, max minus min time.
    pub fn duration(&self) -> f64 {
        self.end_time() - self.start_time()
    }

    /// Time rescaled to the 0-100 % progress of the recording.
    pub fn normalized_time(&self) -> Vec<f64> {
        let t0 = self.start_time();
        let span = self.duration();
        self.time
            .iter()
            .map(|t| if span > 0. { (t - t0) / span * 100. } else { 0. })
            .collect()
    }

    /// A new trace with the samples taken between start and end, both included.
    pub fn slice_time(&self, start: f64, end: f64) -> PowerTrace {
        let mut out = PowerTrace::new(self.len());
        out.mode = self.mode;
        out.name = self.name.clone();
        out.label = self.label.clone();
        for i in 0..self.len() {
            let t = self.time[i];
            if t >= start && t <= end {
                out.push([t, self.voltage[i], self.current[i], self.power[i]]);
            }
        }
        out
    }

    /// Write the normalized columns to a csv file at the given path.
    pub fn to_csv<P>(&self, fout: P) -> Result<()>
    where
        P: AsRef<Path>,
    {
        let path = fout.as_ref();
        let mut writer = csv::Writer::from_path(path).map_err(|e| PowerError::csv(path, e))?;
        writer
            .write_record(COLUMN_NAMES)
            .map_err(|e| PowerError::csv(path, e))?;
        for i in 0..self.len() {
            writer
                .write_record(&[
                    self.time[i].to_string(),
                    self.voltage[i].to_string(),
                    self.current[i].to_string(),
                    self.power[i].to_string(),
                ])
                .map_err(|e| PowerError::csv(path, e))?;
        }
        writer.flush().map_err(|e| PowerError::io(path, e))?;
        Ok(())
    }
}

impl fmt::Display for PowerTrace {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{} ({}, {} samples)", self.label, self.name, self.len())?;
        writeln!(f, "{}", COLUMN_NAMES.join(","))?;
        for i in 0..self.len() {
            writeln!(
                f,
                "{},{},{},{}",
                self.time[i], self.voltage[i], self.current[i], self.power[i]
            )?;
        }
        Ok(())
    }
}

/// Make the labels unique within one analysis,
/// recordings sharing a mode get their file name appended
/// and recordings sharing mode and file name a running number.
pub fn disambiguate_labels(traces: &mut [PowerTrace]) {
    let mut count: HashMap<Mode, usize> = HashMap::new();
    for t in traces.iter() {
        *count.entry(t.mode).or_default() += 1;
    }
    for t in traces.iter_mut() {
        t.label = if count[&t.mode] > 1 || t.mode == Mode::Unknown {
            format!("{} ({})", t.mode.label(), t.name)
        } else {
            t.mode.label().to_string()
        };
    }
    let mut repeated: HashMap<String, usize> = HashMap::new();
    for t in traces.iter() {
        *repeated.entry(t.label.clone()).or_default() += 1;
    }
    let mut seen: HashMap<String, usize> = HashMap::new();
    for t in traces.iter_mut() {
        if repeated[&t.label] > 1 {
            let n = seen.entry(t.label.clone()).or_default();
            *n += 1;
            t.label = format!("{} #{}", t.label, n);
        }
    }
}

/// Check that a csv has at least four columns and at least one data row.
pub fn validate_csv_format<P>(fin: P) -> bool
where
    P: AsRef<Path>,
{
    let mut reader = match csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(fin)
    {
        Ok(r) => r,
        Err(_) => return false,
    };
    match reader.headers() {
        Ok(h) if h.len() >= 4 => {}
        _ => return false,
    }
    reader.records().next().is_some_and(|r| r.is_ok())
}

/// Position and unit scale of the four columns in the csv.
#[derive(Debug, Clone, PartialEq)]
struct ColumnMap {
    index: [usize; 4],
    scale: [f64; 4],
}

impl ColumnMap {
    fn from_headers<'a, I>(headers: I) -> ColumnMap
    where
        I: Iterator<Item = &'a str>,
    {
        let parsed: Vec<(Option<usize>, f64)> = headers
            .map(|h| {
                let (name, unit) = split_header(h);
                (column_kind(&name), unit_scale(&unit))
            })
            .collect();
        let mut index: [Option<usize>; 4] = [None; 4];
        for (i, (kind, _)) in parsed.iter().enumerate() {
            if let Some(k) = kind {
                if index[*k].is_none() {
                    index[*k] = Some(i);
                }
            }
        }
        let index: [usize; 4] = match index {
            [Some(t), Some(v), Some(c), Some(p)] => [t, v, c, p],
            _ => [0, 1, 2, 3],
        };
        let scale = index.map(|i| parsed[i].1);
        ColumnMap { index, scale }
    }

    fn parse(&self, record: &csv::StringRecord) -> Option<[f64; 4]> {
        let mut sample = [0f64; 4];
        for k in 0..4 {
            let v = record.get(self.index[k])?.parse::<f64>().ok()?;
            if !v.is_finite() {
                return None;
            }
            sample[k] = v * self.scale[k];
        }
        Some(sample)
    }
}

/// "Current (mA)" -> ("current", "ma")
fn split_header(h: &str) -> (String, String) {
    let lower = h.trim().to_lowercase();
    match lower.find(['(', '[']) {
        Some(i) => {
            let unit = lower[i + 1..].trim_end_matches([')', ']']).trim().to_string();
            (lower[..i].trim().to_string(), unit)
        }
        None => (lower, String::new()),
    }
}

fn column_kind(name: &str) -> Option<usize> {
    if name == "t" || name.starts_with("time") {
        Some(TIME)
    } else if name == "v" || name == "u" || name.starts_with("volt") {
        Some(VOLTAGE)
    } else if name == "i" || name.starts_with("current") || name.starts_with("amp") {
        Some(CURRENT)
    } else if name == "p" || name.starts_with("power") || name.starts_with("watt") {
        Some(POWER)
    } else {
        None
    }
}

fn unit_scale(unit: &str) -> f64 {
    match unit {
        "mv" | "ma" | "mw" | "ms" => 1e-3,
        "uv" | "ua" | "uw" | "us" => 1e-6,
        "µv" | "µa" | "µw" | "µs" | "μv" | "μa" | "μw" | "μs" => 1e-6,
        _ => 1.,
    }
}
