//! Offline-resilient tension recording sessions.
//!
//! One session per record type: twisting (spindle index) and weaving
//! (side/row/column creel position). Both share the same state machine and
//! persist every slice to durable storage after each action.

#[cfg(feature = "desktop")]
pub mod commands;
pub mod controller;
pub mod coordinate;
pub mod cursor;
pub mod export;
pub mod input;
pub mod kind;
pub mod state;
pub mod values;

pub use controller::{
    save_export, FinishOutcome, NullNotifier, RecordingController, SessionNotifier,
    SessionSnapshot,
};
pub use cursor::{CursorError, PositionCursor, TwistingMove, ValueType, WeavingMove};
pub use kind::{RecordKind, Twisting, Weaving};
pub use state::{SessionError, SessionView};
