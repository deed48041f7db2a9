//! Application layer: editor service and rendering bridge
//!
//! This layer drives the domain model from bridge events.

pub mod bridge;
pub mod editor;
pub mod error;
pub mod script;

pub use bridge::{CommandLog, RenderBridge, RenderCommand};
pub use editor::{EventOutcome, TopologyEditor};
pub use error::{ApplicationError, ApplicationResult, ScriptParseError};
pub use script::{ScriptEvent, ScriptRunner};
