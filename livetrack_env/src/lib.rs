//! LiveTrack Environment Abstraction Layer
//!
//! This crate isolates the two external collaborators a live-share viewer
//! depends on:
//! - **Time** (`now()`, `now_ms()`, `sleep()`) — needed for fix-age display
//! - **Fix delivery** (`recv()`) — the realtime subscription keyed by share id
//!
//! The engine crate never talks to a backend client or the system clock
//! directly; it consumes whatever an implementation of these traits delivers.
//! Record payloads cross this boundary as opaque JSON values — typed
//! interpretation belongs to the consumer.
//!
//! # Example
//!
//! ```ignore
//! use livetrack_env::{FixEvent, FixStream, ViewerContext};
//!
//! async fn session_loop<Ctx: ViewerContext, S: FixStream>(ctx: &Ctx, stream: &mut S) {
//!     while let Some(event) = stream.recv().await {
//!         match event {
//!             FixEvent::Snapshot(payload) => ingest(payload, ctx.now_ms()),
//!             FixEvent::StreamError(_) => mark_disconnected(),
//!             FixEvent::History(points) => seed_trail(points),
//!         }
//!     }
//! }
//! ```

mod context;
mod error;
mod stream;
mod tokio_impl;
mod types;

pub use context::ViewerContext;
pub use error::EnvError;
pub use stream::{subscription, ChannelFixStream, FixEvent, FixPublisher, FixStream, HISTORY_LIMIT};
pub use tokio_impl::TokioContext;
pub use types::ShareId;
