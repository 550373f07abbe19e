//! Display formatting for terminal output

pub mod audit;

pub use audit::{format_change_list, format_record_list, format_value};
