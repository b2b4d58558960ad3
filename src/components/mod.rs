pub mod histogram;
pub mod log_table;
