//! Export of recorded visits

pub mod csv;

pub use self::csv::{encode_visits, CSV_HEADER};
