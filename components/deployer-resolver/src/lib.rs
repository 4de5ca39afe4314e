#[macro_use]
extern crate lazy_static;

mod deployment;
pub mod errors;
pub mod graph;
pub mod imports;
pub mod loader;
pub mod registry;
pub mod sorter;
pub mod types;

pub use deployment::Deployment;
pub use errors::{
    CyclicImportError, DeploymentError, DeploymentResult, LoadError, ParseError, ParseErrors,
    UnresolvedImportError,
};
pub use imports::extract_imports;
pub use loader::{InMemorySourceLoader, SourceLoader};
pub use types::{Contract, RegisteredContract};
