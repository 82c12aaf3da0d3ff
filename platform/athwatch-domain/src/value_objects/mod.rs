pub mod bar;
pub mod evaluation;
pub mod log_record;
pub mod price_series;
