use crate::value_objects::log_record::LogRecord;

pub trait AuditLog {
    /// Appends one record as a single write. Prior records are never touched.
    fn append(&self, record: &LogRecord) -> Result<(), String>;
}
