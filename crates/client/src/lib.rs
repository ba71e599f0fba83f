//! # Solace Client
//!
//! Client-side rendering pipeline for Solace conversations.
//!
//! Everything that stands between a live subscription channel and the
//! rendered chat view lives here:
//! - the **hard render gate**: a batch with any non-string or
//!   envelope-shaped content never reaches render state; the canonical
//!   conversation is refetched and reconciled instead
//! - **render state**: at most one bubble per logical turn, with later
//!   deliveries of the same turn replacing the earlier rendering in place
//! - the **subscription loop**: serial batch processing with error
//!   containment - a bad update is logged and dropped, never rendered, and
//!   the previous state stays on screen until the next good update
//!
//! All state is owned by the pipeline objects and dies with them; there are
//! no module-level caches.

pub mod fetch;
pub mod gate;
pub mod state;
pub mod subscription;

pub use fetch::{ConversationFetcher, FetchError};
pub use gate::{GateError, RenderGate, DEFAULT_REFETCH_TIMEOUT};
pub use state::{Bubble, RenderState};
pub use subscription::Subscription;
