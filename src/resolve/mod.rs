//! Cross-file resolvers.
//!
//! Both resolvers are read-only. "Not found" is an ordinary answer
//! (`None`/`false`); only genuinely exceptional filesystem failures surface
//! as [`ResolveError`].

mod database;
mod sibling;

pub use database::{
    derive_factory_name, derive_testing_factory_name, find_database_variables, CatalogEntry,
    DatabaseCatalog,
};
pub use sibling::{
    corresponding_implementation_file, exists, extract_portal_database_variable,
    read_if_exists, relative_import_path, typeof_target,
};

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while resolving related files.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("walking project tree: {0}")]
    Walk(#[from] walkdir::Error),
    #[error(
        "database variables `{first}` and `{second}` both derive testing factory `{factory}`"
    )]
    FactoryCollision {
        factory: String,
        first: String,
        second: String,
    },
}
