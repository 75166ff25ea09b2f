pub mod history;
pub mod input;
pub mod observer;
pub mod session;
pub mod shortcuts;
pub mod tools;

pub use history::{NO_STATE, SavedState, SavedStates, Snapshot, SnapshotHistory};
pub use input::{InputEvent, Modifiers};
pub use observer::{LogObserver, NoopObserver, SessionEvent, SessionObserver};
pub use session::{EditorSession, HistoryStatus, SessionConfig, ViewportStatus};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use tools::{Interaction, InteractionState, TextDraft, ToolKind};
