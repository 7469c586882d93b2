//! Push-reminder engine: message catalog, per-user selection, and the
//! slot-triggered scheduler that dispatches through the push transport.

pub mod messages;
pub mod scheduler;
pub mod select;
pub mod transport;

pub use messages::{messages_for, PushMessage, Slot, StreakPriority};
pub use scheduler::{
    plan_slot, run_slot, DispatchReport, PlannedSend, DISPATCH_BATCH_SIZE, RECENT_WINDOW_DAYS,
};
pub use select::{render, select_message, RenderedMessage, SelectionInput};
pub use transport::{ExpoPushTransport, OutboundPush, PushTransport, EXPO_PUSH_API_URL};
