pub mod format;

pub use format::{format_date, format_date_time, format_size, format_time};
