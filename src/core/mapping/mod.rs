//! Return mapping
//!
//! Pure functions that turn one return element into document-derived record
//! data: classification, calendar rules, lines, meters and readings.

pub mod classify;
pub mod dates;
pub mod lines;
pub mod mapper;
pub mod meters;

pub use classify::{classify_return, get_return_frequency, is_nil_return, Classification};
pub use dates::{get_end_date, get_start_date};
pub use lines::{get_return_lines, reading_type_for_indicator};
pub use mapper::{map_return, MappedReturn, MappingError, MappingResult};
pub use meters::{get_meters, get_overall_reading_type, get_reading, get_units};
