//! CSV adapters: quote history reader and daily snapshot writer.

use crate::domain::error::TradeError;
use crate::domain::market::Snapshot;
use crate::domain::quote::Quote;
use crate::ports::quote_port::QuotePort;
use crate::ports::snapshot_port::SnapshotPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

const TIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];
const TIME_COLUMN: &str = "time";
const SNAPSHOT_EXTENSION: &str = "dat";

pub fn parse_time(value: &str) -> Option<NaiveDateTime> {
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value.trim(), fmt).ok())
}

fn format_time(time: &NaiveDateTime) -> String {
    time.format("%Y-%m-%d %H:%M:%S%.f").to_string()
}

/// Reads a `time,ask,bid,volume` CSV file with a header row. Column order
/// is free, extra columns are ignored.
pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

fn column(headers: &csv::StringRecord, name: &str) -> Result<usize, TradeError> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| TradeError::DataLoad {
            reason: format!("missing {} column", name),
        })
}

fn number(record: &csv::StringRecord, idx: usize, name: &str) -> Result<f64, TradeError> {
    let raw = record.get(idx).ok_or_else(|| TradeError::DataLoad {
        reason: format!("missing {} value", name),
    })?;
    raw.trim().parse().map_err(|e| TradeError::DataLoad {
        reason: format!("invalid {} value '{}': {}", name, raw, e),
    })
}

impl QuotePort for CsvAdapter {
    fn load_quotes(&self) -> Result<Vec<Quote>, TradeError> {
        let content = fs::read_to_string(&self.path).map_err(|e| TradeError::DataLoad {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| TradeError::DataLoad {
                reason: format!("CSV header error: {}", e),
            })?
            .clone();
        let time_idx = column(&headers, TIME_COLUMN)?;
        let ask_idx = column(&headers, "ask")?;
        let bid_idx = column(&headers, "bid")?;
        let volume_idx = column(&headers, "volume")?;

        let mut quotes = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| TradeError::DataLoad {
                reason: format!("CSV parse error: {}", e),
            })?;
            let raw_time = record.get(time_idx).unwrap_or_default();
            let time = parse_time(raw_time).ok_or_else(|| TradeError::DataLoad {
                reason: format!("invalid time format '{}'", raw_time),
            })?;
            quotes.push(Quote {
                time,
                ask: number(&record, ask_idx, "ask")?,
                bid: number(&record, bid_idx, "bid")?,
                volume: number(&record, volume_idx, "volume")?,
            });
        }

        quotes.sort_by_key(|q| q.time);
        tracing::info!(path = %self.path.display(), quotes = quotes.len(), "quotes loaded");
        Ok(quotes)
    }
}

/// Writes snapshots as one space-separated file per calendar day,
/// `<dir>/<YYYY-MM-DD>.dat`, indexed by a `time` column.
pub struct CsvSnapshotAdapter {
    base_path: PathBuf,
}

/// Rows of one day file, keyed by timestamp, cells kept as written.
struct DayTable {
    columns: Vec<String>,
    rows: BTreeMap<NaiveDateTime, Vec<String>>,
}

impl CsvSnapshotAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn day_path(&self, day: NaiveDate) -> PathBuf {
        self.base_path
            .join(format!("{}.{}", day.format("%Y-%m-%d"), SNAPSHOT_EXTENSION))
    }

    fn read_day(path: &Path) -> Result<DayTable, TradeError> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b' ')
            .from_path(path)
            .map_err(|e| snapshot_error(path, e))?;
        let headers = rdr.headers().map_err(|e| snapshot_error(path, e))?.clone();
        let columns: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();
        let mut rows = BTreeMap::new();
        for result in rdr.records() {
            let record = result.map_err(|e| snapshot_error(path, e))?;
            let raw_time = record.get(0).unwrap_or_default();
            let time = parse_time(raw_time).ok_or_else(|| TradeError::Snapshot {
                reason: format!("invalid time '{}' in {}", raw_time, path.display()),
            })?;
            let mut cells: Vec<String> = record.iter().skip(1).map(str::to_string).collect();
            cells.resize(columns.len(), String::new());
            rows.insert(time, cells);
        }
        Ok(DayTable { columns, rows })
    }

    fn write_day(path: &Path, table: &DayTable) -> Result<(), TradeError> {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(b' ')
            .from_path(path)
            .map_err(|e| snapshot_error(path, e))?;
        let header = std::iter::once(TIME_COLUMN).chain(table.columns.iter().map(String::as_str));
        wtr.write_record(header)
            .map_err(|e| snapshot_error(path, e))?;
        for (time, cells) in &table.rows {
            let time = format_time(time);
            let record = std::iter::once(time.as_str()).chain(cells.iter().map(String::as_str));
            wtr.write_record(record)
                .map_err(|e| snapshot_error(path, e))?;
        }
        wtr.flush().map_err(|e| TradeError::Snapshot {
            reason: format!("failed to flush {}: {}", path.display(), e),
        })?;
        Ok(())
    }
}

fn snapshot_error(path: &Path, err: csv::Error) -> TradeError {
    TradeError::Snapshot {
        reason: format!("{}: {}", path.display(), err),
    }
}

impl SnapshotPort for CsvSnapshotAdapter {
    fn save(&self, snapshot: &Snapshot) -> Result<usize, TradeError> {
        fs::create_dir_all(&self.base_path).map_err(|e| TradeError::Snapshot {
            reason: format!("cannot create {}: {}", self.base_path.display(), e),
        })?;

        let mut days: BTreeMap<NaiveDate, Vec<usize>> = BTreeMap::new();
        for (i, time) in snapshot.index.iter().enumerate() {
            days.entry(time.date()).or_default().push(i);
        }

        let mut written = 0;
        for (day, rows) in days {
            let path = self.day_path(day);
            let mut table = if path.is_file() {
                Self::read_day(&path)?
            } else {
                DayTable {
                    columns: Vec::new(),
                    rows: BTreeMap::new(),
                }
            };

            for column in &snapshot.columns {
                if !table.columns.contains(&column.name) {
                    table.columns.push(column.name.clone());
                    for cells in table.rows.values_mut() {
                        cells.push(String::new());
                    }
                }
            }
            let position: HashMap<&str, usize> = table
                .columns
                .iter()
                .enumerate()
                .map(|(i, c)| (c.as_str(), i))
                .collect();

            let mut added = 0;
            for i in rows {
                let time = snapshot.index[i];
                if table.rows.contains_key(&time) {
                    continue;
                }
                let mut cells = vec![String::new(); table.columns.len()];
                for column in &snapshot.columns {
                    if let (Some(idx), Some(Some(value))) =
                        (position.get(column.name.as_str()), column.values.get(i))
                    {
                        cells[*idx] = value.to_string();
                    }
                }
                table.rows.insert(time, cells);
                added += 1;
            }

            Self::write_day(&path, &table)?;
            tracing::debug!(file = %path.display(), rows = added, "snapshot day written");
            written += added;
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::SnapshotColumn;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 2, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn snapshot(times: &[NaiveDateTime], ask: &[Option<f64>]) -> Snapshot {
        Snapshot {
            index: times.to_vec(),
            columns: vec![SnapshotColumn {
                name: "ask".into(),
                values: ask.to_vec(),
            }],
        }
    }

    #[test]
    fn loads_and_sorts_quotes() {
        let file = write_csv(
            "time,ask,bid,volume\n\
             2024-02-01 10:01:00,101.5,101.0,3\n\
             2024-02-01T10:00:00.250,100.5,100.0,2\n",
        );
        let quotes = CsvAdapter::new(file.path().to_path_buf())
            .load_quotes()
            .unwrap();
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].ask, 100.5);
        assert_eq!(quotes[1].volume, 3.0);
        assert!(quotes[0].time < quotes[1].time);
    }

    #[test]
    fn columns_found_by_name() {
        let file = write_csv("volume,bid,ask,time\n5,1.0,2.0,2024-02-01 00:00:00\n");
        let quotes = CsvAdapter::new(file.path().to_path_buf())
            .load_quotes()
            .unwrap();
        assert_eq!(quotes[0].ask, 2.0);
        assert_eq!(quotes[0].bid, 1.0);
    }

    #[test]
    fn missing_column_is_error() {
        let file = write_csv("time,ask,volume\n2024-02-01 00:00:00,1,1\n");
        let err = CsvAdapter::new(file.path().to_path_buf())
            .load_quotes()
            .unwrap_err();
        assert!(err.to_string().contains("missing bid column"));
    }

    #[test]
    fn bad_time_is_error() {
        let file = write_csv("time,ask,bid,volume\n01/02/2024,1,1,1\n");
        let err = CsvAdapter::new(file.path().to_path_buf())
            .load_quotes()
            .unwrap_err();
        assert!(matches!(err, TradeError::DataLoad { .. }));
    }

    #[test]
    fn missing_file_is_error() {
        let err = CsvAdapter::new(PathBuf::from("/nonexistent/quotes.csv"))
            .load_quotes()
            .unwrap_err();
        assert!(matches!(err, TradeError::DataLoad { .. }));
    }

    #[test]
    fn saves_one_file_per_day() {
        let dir = TempDir::new().unwrap();
        let adapter = CsvSnapshotAdapter::new(dir.path().to_path_buf());
        let written = adapter
            .save(&snapshot(
                &[at(1, 22), at(1, 23), at(2, 0)],
                &[Some(1.0), None, Some(3.5)],
            ))
            .unwrap();
        assert_eq!(written, 3);

        let day1 = fs::read_to_string(dir.path().join("2024-02-01.dat")).unwrap();
        let lines: Vec<&str> = day1.lines().collect();
        assert_eq!(lines[0], "time ask");
        assert_eq!(lines[1], "\"2024-02-01 22:00:00\" 1");
        assert_eq!(lines.len(), 3);
        assert!(dir.path().join("2024-02-02.dat").is_file());
    }

    #[test]
    fn merges_with_existing_day() {
        let dir = TempDir::new().unwrap();
        let adapter = CsvSnapshotAdapter::new(dir.path().to_path_buf());
        adapter
            .save(&snapshot(&[at(1, 1), at(1, 3)], &[Some(1.0), Some(3.0)]))
            .unwrap();
        let written = adapter
            .save(&snapshot(
                &[at(1, 2), at(1, 3)],
                &[Some(2.0), Some(99.0)],
            ))
            .unwrap();
        assert_eq!(written, 1);

        let table = CsvSnapshotAdapter::read_day(&adapter.day_path(at(1, 0).date())).unwrap();
        let values: Vec<&str> = table.rows.values().map(|r| r[0].as_str()).collect();
        assert_eq!(values, vec!["1", "2", "3"]);
    }

    #[test]
    fn new_columns_are_appended() {
        let dir = TempDir::new().unwrap();
        let adapter = CsvSnapshotAdapter::new(dir.path().to_path_buf());
        adapter.save(&snapshot(&[at(1, 1)], &[Some(1.0)])).unwrap();
        let mut wider = snapshot(&[at(1, 2)], &[Some(2.0)]);
        wider.columns.push(SnapshotColumn {
            name: "MA_k-2_ask".into(),
            values: vec![Some(1.5)],
        });
        adapter.save(&wider).unwrap();

        let table = CsvSnapshotAdapter::read_day(&adapter.day_path(at(1, 0).date())).unwrap();
        assert_eq!(table.columns, vec!["ask", "MA_k-2_ask"]);
        assert_eq!(table.rows[&at(1, 1)], vec!["1", ""]);
        assert_eq!(table.rows[&at(1, 2)], vec!["2", "1.5"]);
    }
}
