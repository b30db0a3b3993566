//! The per-conversation execution engine.
//!
//! A [`Session`] owns the pending step list, the row arena, the call stack of
//! suspended parent workflows and the variable store. Consumers drive it
//! through `answer_question` / `collect_value`, resolve sub-workflow loads
//! with `drive` or `complete_load`, and render `visible_rows`.

mod answers;
pub mod call_stack;
pub mod commands;
pub mod notes;
pub mod row;
mod sequencer;
mod session;
pub mod state;

pub use call_stack::{CallStack, ParentFrame};
pub use commands::{Command, parse_commands};
pub use notes::NotesBuffer;
pub use row::{Row, RowId};
pub use session::{Session, SessionBuilder, SystemContext};
pub use state::{EngineState, PendingLoad, SessionEvent};
