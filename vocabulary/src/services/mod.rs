//! Services module
//!
//! Business logic services that coordinate between the server, the
//! repository and the presentation layer.

pub mod fetcher;
pub mod parser;
pub mod settings;
pub mod sync;
pub mod task;
pub mod vocabulary_list;

pub use fetcher::{RemoteFetcher, VocabularySource};
pub use settings::{Settings, SettingsService};
pub use sync::{SyncKind, SyncOutcome, Synchronizer};
pub use task::{SyncHandle, SyncTask};
pub use vocabulary_list::{SearchType, ViewState, VocabularyList};
