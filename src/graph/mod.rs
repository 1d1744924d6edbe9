//! Weighted similarity graph: records plus one focus node, laid out by a
//! force simulation and drawn by pluggable passes.

mod engine;
pub mod model;
mod physics;
pub mod render;
mod score;
mod view_state;

pub use engine::{GraphEngine, TickReport, WARNING_BUFFER_LIMIT};
pub use model::{FOCUS_NODE_ID, GraphModel, GraphNode, Motion, WeightedEdge};
pub use physics::{StepReport, step as step_physics};
pub use render::{PassRegistry, RecordingSurface, RenderFrame, RenderPass, Surface, Viewport};
pub use score::{Scorer, clamp_unit, jaccard, overlap};
pub use view_state::{CommandSender, SEARCH_HISTORY_LIMIT, ViewCommand, ViewState, normalize_lens};
