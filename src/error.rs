use thiserror::Error;

use crate::fields::RepresentationKind;

/// Non-fatal diagnostics raised while resolving fields or driving the graph.
///
/// None of these abort work: the resolver degrades to a safe representation,
/// the graph keeps rendering its focus node and the integrator resets the
/// offending node. Collaborators decide whether to show them.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum LensWarning {
    #[error("field `{field}` has a malformed value ({rule}); rendered as {fallback}")]
    MalformedRecord {
        field: String,
        rule: &'static str,
        fallback: RepresentationKind,
    },
    #[error("catalog is empty; only the focus node is rendered")]
    EmptyGraph,
    #[error("node `{node}` produced a non-finite physics state; velocity reset")]
    NumericInstability { node: String },
}
