//! Presentation layer: draft submission, theme, and terminal rendering.
//!
//! Nothing here touches the connection directly; submissions go through a
//! [`submission::CommentSink`] and the feed is read from events or snapshots.

pub mod command;
pub mod preferences;
pub mod render;
pub mod submission;
pub mod theme;

pub use command::Command;
pub use preferences::{FilePreferences, MemoryPreferences, PreferenceStore};
pub use render::Renderer;
pub use submission::{CommentSink, Draft, SubmitOutcome};
pub use theme::{Theme, ThemeController};
