//! Value-to-representation decisions for schemaless record fields.
//!
//! [`Resolver`] picks a [`RepresentationKind`] from a value's shape alone,
//! [`priority`] ranks a `(path, kind)` pair, and [`flatten`] combines both into
//! the ordered, capped directive list a fixed layout consumes.

mod flatten;
mod kind;
mod priority;
mod resolve;
pub mod shape;

pub use flatten::{FieldDirective, Flattened, flatten};
pub use kind::RepresentationKind;
pub use priority::{PROMOTED_BOOST, path_tokens, priority};
pub use resolve::{Resolution, Resolver, resolve};
pub use shape::radar_axes;
