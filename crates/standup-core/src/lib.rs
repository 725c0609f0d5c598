pub mod error;
pub mod filter;
pub mod input;
pub mod status;
pub mod update;

pub use error::ValidationError;
pub use filter::{newest_first, FilterParams, UpdateFilter};
pub use input::{client_offset, parse_date, parse_date_in, NewUpdate, UpdateFields, UpdatePatch};
pub use status::IssueStatus;
pub use update::{default_ttl, Update, DEFAULT_TTL_SECS, MAX_TTL_SECS};
