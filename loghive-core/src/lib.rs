pub mod auth;
pub mod consts;
pub mod db;
mod entries;
pub mod login_protection;
mod paging;
mod registry;
mod services;

pub use entries::{EntryFilter, EntryStore, Flavor, LogEntry, TIMESTAMP_FORMAT};
pub use login_protection::{InjectionDetected, InjectionGuard, LoginOutcome, LoginThrottle};
pub use paging::{paginate, Page};
pub use registry::{ProducerInfo, Registry};
pub use services::Services;
