use athwatch_domain::repositories::audit_log::AuditLog;
use athwatch_domain::value_objects::log_record::LogRecord;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Append-only CSV audit log. The header is written when the file is empty;
/// every record is serialized up front and lands in one `write_all`.
#[derive(Debug, Clone)]
pub struct CsvAuditLog {
    path: PathBuf,
    with_candles: bool,
}

impl CsvAuditLog {
    pub fn new(path: impl Into<PathBuf>, with_candles: bool) -> Self {
        Self {
            path: path.into(),
            with_candles,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header(&self) -> Vec<&'static str> {
        let mut header = vec!["timestamp", "symbol", "current_price", "ath", "diff_percent"];
        if self.with_candles {
            header.push("candles_since_ath");
        }
        header.push("alert_sent");
        header
    }

    fn row(&self, record: &LogRecord) -> Vec<String> {
        let mut row = vec![
            record.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            record.symbol.clone(),
            record.current_price.to_string(),
            record.ath.to_string(),
            record.diff_percent.to_string(),
        ];
        if self.with_candles {
            row.push(
                record
                    .candles_since_ath
                    .map(|c| c.to_string())
                    .unwrap_or_default(),
            );
        }
        row.push(record.alert_sent.to_string());
        row
    }

    fn encode(&self, record: &LogRecord, with_header: bool) -> Result<Vec<u8>, String> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        if with_header {
            wtr.write_record(self.header())
                .map_err(|err| format!("failed to encode audit header: {}", err))?;
        }
        wtr.write_record(self.row(record))
            .map_err(|err| format!("failed to encode audit row: {}", err))?;
        wtr.into_inner()
            .map_err(|err| format!("failed to encode audit row: {}", err))
    }
}

impl AuditLog for CsvAuditLog {
    fn append(&self, record: &LogRecord) -> Result<(), String> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|err| format!("failed to create dir {}: {}", parent.display(), err))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|err| format!("failed to open audit log {}: {}", self.path.display(), err))?;
        let is_new = file
            .metadata()
            .map_err(|err| format!("failed to stat audit log {}: {}", self.path.display(), err))?
            .len()
            == 0;

        let bytes = self.encode(record, is_new)?;
        file.write_all(&bytes)
            .and_then(|_| file.flush())
            .map_err(|err| format!("failed to append audit log {}: {}", self.path.display(), err))
    }
}
