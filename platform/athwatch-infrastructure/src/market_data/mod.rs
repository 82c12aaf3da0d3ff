pub mod csv_dir;
pub mod yahoo;
