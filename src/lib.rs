//! Field representation resolver and live similarity graph for species catalogs.

pub mod catalog;
pub mod config;
pub mod error;
pub mod fields;
pub mod graph;
pub mod util;

pub use catalog::{Catalog, Record};
pub use config::LensConfig;
pub use error::LensWarning;
pub use fields::{FieldDirective, RepresentationKind, Resolver, flatten, priority, resolve};
pub use graph::{CommandSender, GraphEngine, ViewCommand, ViewState};
