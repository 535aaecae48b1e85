mod blacklist;
mod visit;

pub use blacklist::{BlacklistEntry, BlacklistRequest};
pub use visit::{format_timestamp, Visit, VisitQuery, VisitResponse};
