//! Client-side state layer for the Rolo contact directory.
//!
//! Sits between the typed API client (`rolo-api`) and an outer surface
//! such as the CLI. Owns the durable auth session, a keyed query cache
//! with mutation-driven invalidation, the debounced search state, and the
//! local half of the import/export pipeline. The [`Directory`] facade is
//! the intended entry point; the parts are public for surfaces that need
//! finer control.

pub mod cache;
pub mod config;
pub mod directory;
pub mod error;
pub mod search;
pub mod session;
pub mod transfer;

pub use cache::{CacheEntry, QueryCache, QueryKey, QueryKind, QueryStatus, QueryValue};
pub use config::{DEFAULT_DEBOUNCE, DEFAULT_PAGE_SIZE, DirectoryConfig};
pub use directory::Directory;
pub use error::CoreError;
pub use search::{Debouncer, SearchController, SearchMode, SearchState};
pub use session::{AuthSession, Identity, SessionStore};
pub use transfer::{ExportPayload, ImportFile, detect_format, parse_import, validate_contact};
