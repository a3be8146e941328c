//! Share session - the subscription lifecycle.
//!
//! A [`ShareSession`] owns exactly one fix stream, one reconciler, and one
//! presenter. Events are processed to completion one at a time, so the view
//! is never mutated concurrently. Teardown releases the stream exactly
//! once; a torn-down session ignores anything still in flight, which is
//! what keeps stale callbacks out of a disposed view. Switching share
//! identifiers means dropping the session and building a new one.

use std::sync::Arc;

use uuid::Uuid;

use livetrack_env::{FixEvent, FixStream, ShareId, ViewerContext};

use crate::format;
use crate::presenter::{MapPresenter, StatusLine};
use crate::reconciler::{MapReconciler, MapView, ReconcilerConfig};

/// One live subscription driving one map view.
pub struct ShareSession<C, S, P>
where
    C: ViewerContext,
    S: FixStream,
    P: MapPresenter,
{
    id: Uuid,
    share_id: ShareId,
    ctx: Arc<C>,
    stream: Option<S>,
    reconciler: MapReconciler,
    presenter: P,
}

impl<C, S, P> ShareSession<C, S, P>
where
    C: ViewerContext,
    S: FixStream,
    P: MapPresenter,
{
    /// Opens a session over an already-established subscription.
    ///
    /// The presenter is bootstrapped here, exactly once.
    pub fn new(ctx: Arc<C>, stream: S, mut presenter: P, config: ReconcilerConfig) -> Self {
        let share_id = stream.share_id().clone();
        presenter.bootstrap(share_id.as_str());

        Self {
            id: Uuid::new_v4(),
            share_id,
            ctx,
            stream: Some(stream),
            reconciler: MapReconciler::new(config),
            presenter,
        }
    }

    /// Unique identity of this session (new on every subscribe).
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The share identifier this session is subscribed to.
    pub fn share_id(&self) -> &ShareId {
        &self.share_id
    }

    /// Current view state.
    pub fn view(&self) -> &MapView {
        self.reconciler.view()
    }

    /// Whether the subscription is still held.
    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    /// Drives the session until the stream closes, then tears down.
    pub async fn run(&mut self) {
        loop {
            let event = match self.stream.as_mut() {
                Some(stream) => stream.recv().await,
                None => None,
            };
            match event {
                Some(event) => self.process_event(event),
                None => break,
            }
        }
        self.shutdown();
    }

    /// Processes one delivered event. Runs to completion; a torn-down
    /// session ignores the event entirely.
    pub fn process_event(&mut self, event: FixEvent) {
        if self.stream.is_none() {
            return;
        }

        match event {
            FixEvent::Snapshot(payload) => {
                let commands = self.reconciler.on_snapshot(payload.as_ref());
                for command in &commands {
                    self.presenter.apply(command);
                }
            }
            FixEvent::History(points) => {
                self.reconciler.on_history(&points);
            }
            FixEvent::StreamError(_) => {
                self.reconciler.on_stream_error();
            }
        }
        self.publish_status();
    }

    /// Releases the subscription. Idempotent: the second and later calls
    /// are no-ops, and no event mutates the view afterwards.
    pub fn shutdown(&mut self) {
        if let Some(stream) = self.stream.take() {
            drop(stream);
        }
    }

    fn publish_status(&mut self) {
        let view = self.reconciler.view();
        let metrics = &view.metrics;

        self.presenter.set_connected(view.connected);
        let status = StatusLine {
            share_id: self.share_id.to_string(),
            connected: view.connected,
            last_fix: format::format_elapsed(metrics.last_timestamp_ms, self.ctx.now_ms()),
            accuracy: format::format_distance(metrics.accuracy_m),
            speed: format::format_speed(metrics.speed_mps),
            bearing: format::format_bearing(metrics.bearing_deg),
            trail_len: view.trail.len(),
            accuracy_m: metrics.accuracy_m,
        };
        self.presenter.render_status(&status);
    }
}
