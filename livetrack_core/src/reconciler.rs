//! Map-state reconciliation.
//!
//! Translates inbound fix snapshots into overlay mutations (marker,
//! accuracy circle, bounded trail), derived display metrics, and a one-shot
//! camera autocenter. All effects are mutations of the owned [`MapView`]
//! plus a list of advisory [`MapCommand`]s for the presentation layer —
//! nothing here renders a map or touches the network.

use std::collections::VecDeque;

use geo::Point;
use serde_json::Value;

use crate::fix::{Fix, FixRecord};
use crate::format;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Configuration for the reconciler.
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// Maximum trail length; inserting past it evicts the oldest point
    pub trail_capacity: usize,

    /// Whether the trail overlay is maintained at all
    pub trail_enabled: bool,

    /// Zoom level requested by the one-shot autocenter
    pub autocenter_zoom: u8,

    /// Number of recent bearing samples feeding the smoothed compass
    pub bearing_window: usize,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            trail_capacity: 60,
            trail_enabled: true,
            autocenter_zoom: 16,
            bearing_window: 8,
        }
    }
}

// ============================================================================
// ADVISORY COMMANDS (Output)
// ============================================================================

/// Advisory requests to the presentation layer.
///
/// These are the only calls the engine makes outward. Executing them
/// (actual map rendering) is the presenter's business; ignoring them is
/// legal and leaves the owned state consistent.
#[derive(Debug, Clone, PartialEq)]
pub enum MapCommand {
    /// One-time camera move to the first valid fix
    CenterAndZoom { position: Point<f64>, zoom: u8 },

    /// Move the position marker
    SetMarker { position: Point<f64> },

    /// Move and resize the accuracy circle
    SetAccuracyCircle { position: Point<f64>, radius_m: f64 },

    /// Extend the trail polyline
    AppendTrailPoint { position: Point<f64> },
}

// ============================================================================
// VIEW STATE
// ============================================================================

/// Raw values behind the formatted status chips.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayMetrics {
    /// Publisher timestamp of the last valid fix, epoch milliseconds
    pub last_timestamp_ms: Option<i64>,
    pub accuracy_m: Option<f64>,
    pub speed_mps: Option<f64>,
    /// Bearing as reported by the last valid fix, normalized to [0, 360)
    pub bearing_deg: Option<f64>,
    /// Circular mean over the recent bearing window
    pub smoothed_bearing_deg: Option<f64>,
}

/// The map-view state owned by the reconciler.
///
/// `marker_position` and `accuracy_radius_m` always derive from the most
/// recent *valid* fix; invalid fixes never alter them. `has_centered` flips
/// false→true exactly once per session.
#[derive(Debug, Clone)]
pub struct MapView {
    pub marker_position: Option<Point<f64>>,
    pub accuracy_radius_m: f64,
    /// Past positions, oldest first, bounded by the configured capacity
    pub trail: VecDeque<Point<f64>>,
    pub has_centered: bool,
    pub connected: bool,
    pub metrics: DisplayMetrics,
}

impl MapView {
    fn new(trail_capacity: usize) -> Self {
        Self {
            marker_position: None,
            accuracy_radius_m: 0.0,
            trail: VecDeque::with_capacity(trail_capacity),
            has_centered: false,
            connected: false,
            metrics: DisplayMetrics::default(),
        }
    }
}

// ============================================================================
// RECONCILER (The Engine)
// ============================================================================

/// Consumes fix snapshots for one share and keeps the [`MapView`] current.
pub struct MapReconciler {
    view: MapView,
    config: ReconcilerConfig,
    bearing_window: VecDeque<f64>,
}

impl MapReconciler {
    /// Creates a reconciler with the given configuration.
    pub fn new(config: ReconcilerConfig) -> Self {
        Self {
            view: MapView::new(config.trail_capacity),
            bearing_window: VecDeque::with_capacity(config.bearing_window),
            config,
        }
    }

    /// Creates a reconciler with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ReconcilerConfig::default())
    }

    /// Current view state.
    pub fn view(&self) -> &MapView {
        &self.view
    }

    /// Active configuration.
    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Ingests one delivered snapshot of the live record.
    ///
    /// A delivered callback proves the channel is live, so `connected`
    /// flips true regardless of payload validity. A missing payload or one
    /// without both coordinates mutates nothing else — it means "not yet
    /// available", not failure.
    ///
    /// Returns the advisory commands the presentation layer should execute,
    /// in order: marker, accuracy circle, trail point (when enabled), and —
    /// on the first valid fix only — the camera center request.
    pub fn on_snapshot(&mut self, payload: Option<&Value>) -> Vec<MapCommand> {
        self.view.connected = true;

        match payload
            .and_then(FixRecord::from_value)
            .and_then(|record| record.validate())
        {
            Some(fix) => self.apply_fix(&fix),
            None => Vec::new(),
        }
    }

    /// Marks the stream disconnected. No other state changes; reconnection
    /// policy belongs to the stream collaborator.
    pub fn on_stream_error(&mut self) {
        self.view.connected = false;
    }

    /// Seeds the trail from a replayed points history.
    ///
    /// History entries are past positions, not the live fix: the marker,
    /// metrics, and autocenter are untouched, and the trail cap still
    /// governs (the newest entries win).
    pub fn on_history(&mut self, records: &[Value]) {
        if !self.config.trail_enabled {
            return;
        }
        for record in records {
            if let Some(fix) = FixRecord::from_value(record).and_then(|r| r.validate()) {
                self.push_trail(fix.position);
            }
        }
    }

    fn apply_fix(&mut self, fix: &Fix) -> Vec<MapCommand> {
        let position = fix.position;
        let radius_m = fix.accuracy_m.unwrap_or(0.0);

        self.view.marker_position = Some(position);
        self.view.accuracy_radius_m = radius_m;

        let mut commands = vec![
            MapCommand::SetMarker { position },
            MapCommand::SetAccuracyCircle { position, radius_m },
        ];

        if self.config.trail_enabled {
            self.push_trail(position);
            commands.push(MapCommand::AppendTrailPoint { position });
        }

        self.update_metrics(fix);

        if !self.view.has_centered {
            self.view.has_centered = true;
            commands.push(MapCommand::CenterAndZoom {
                position,
                zoom: self.config.autocenter_zoom,
            });
        }

        commands
    }

    fn push_trail(&mut self, position: Point<f64>) {
        self.view.trail.push_back(position);
        while self.view.trail.len() > self.config.trail_capacity {
            self.view.trail.pop_front();
        }
    }

    fn update_metrics(&mut self, fix: &Fix) {
        let metrics = &mut self.view.metrics;
        metrics.last_timestamp_ms = fix.timestamp_ms;
        metrics.accuracy_m = fix.accuracy_m;
        metrics.speed_mps = fix.speed_mps;
        metrics.bearing_deg = fix.bearing_deg.map(format::normalize_degrees);

        if let Some(bearing) = metrics.bearing_deg {
            self.bearing_window.push_back(bearing);
            while self.bearing_window.len() > self.config.bearing_window {
                self.bearing_window.pop_front();
            }
        }
        metrics.smoothed_bearing_deg =
            format::circular_mean_degrees(self.bearing_window.make_contiguous());
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn fix_value(lat: f64, lng: f64) -> Value {
        json!({"lat": lat, "lng": lng})
    }

    fn center_requests(commands: &[MapCommand]) -> usize {
        commands
            .iter()
            .filter(|c| matches!(c, MapCommand::CenterAndZoom { .. }))
            .count()
    }

    #[test]
    fn test_first_valid_fix_sets_marker_and_centers() {
        let mut reconciler = MapReconciler::with_defaults();
        let commands = reconciler.on_snapshot(Some(&json!({
            "lat": 19.4326, "lng": -99.1332, "accuracy": 25.0,
        })));

        let view = reconciler.view();
        assert!(view.connected);
        assert!(view.has_centered);
        assert_eq!(view.marker_position, Some(Point::new(-99.1332, 19.4326)));
        assert_eq!(view.accuracy_radius_m, 25.0);
        assert_eq!(view.trail.len(), 1);

        assert_eq!(
            commands,
            vec![
                MapCommand::SetMarker {
                    position: Point::new(-99.1332, 19.4326)
                },
                MapCommand::SetAccuracyCircle {
                    position: Point::new(-99.1332, 19.4326),
                    radius_m: 25.0
                },
                MapCommand::AppendTrailPoint {
                    position: Point::new(-99.1332, 19.4326)
                },
                MapCommand::CenterAndZoom {
                    position: Point::new(-99.1332, 19.4326),
                    zoom: 16
                },
            ]
        );
    }

    #[test]
    fn test_invalid_payloads_mutate_nothing_but_connectivity() {
        let mut reconciler = MapReconciler::with_defaults();
        reconciler.on_snapshot(Some(&fix_value(1.0, 2.0)));
        let before = reconciler.view().clone();

        for payload in [
            None,
            Some(json!(null)),
            Some(json!("garbage")),
            Some(json!({"lat": 3.0})),
            Some(json!({"lng": 4.0})),
            Some(json!({"lat": "3.0", "lng": 4.0})),
        ] {
            let commands = reconciler.on_snapshot(payload.as_ref());
            assert!(commands.is_empty());
        }

        let after = reconciler.view();
        assert_eq!(after.marker_position, before.marker_position);
        assert_eq!(after.accuracy_radius_m, before.accuracy_radius_m);
        assert_eq!(after.trail, before.trail);
        assert_eq!(after.metrics, before.metrics);
        assert!(after.connected);
    }

    #[test]
    fn test_marker_tracks_latest_valid_fix() {
        let mut reconciler = MapReconciler::with_defaults();
        for i in 0..5 {
            reconciler.on_snapshot(Some(&json!({
                "lat": 10.0 + i as f64,
                "lng": 20.0 + i as f64,
                "accuracy": 5.0 * i as f64,
            })));
        }
        // an invalid straggler changes nothing
        reconciler.on_snapshot(Some(&json!({"lat": 99.0})));

        let view = reconciler.view();
        assert_eq!(view.marker_position, Some(Point::new(24.0, 14.0)));
        assert_eq!(view.accuracy_radius_m, 20.0);
    }

    #[test]
    fn test_missing_accuracy_defaults_to_zero_radius() {
        let mut reconciler = MapReconciler::with_defaults();
        reconciler.on_snapshot(Some(&json!({"lat": 1.0, "lng": 2.0, "accuracy": 30.0})));
        reconciler.on_snapshot(Some(&fix_value(1.0, 2.0)));

        let view = reconciler.view();
        assert_eq!(view.accuracy_radius_m, 0.0);
        assert_eq!(view.metrics.accuracy_m, None);
    }

    #[test]
    fn test_trail_evicts_oldest_beyond_capacity() {
        let mut reconciler = MapReconciler::with_defaults();
        for i in 0..61 {
            reconciler.on_snapshot(Some(&fix_value(i as f64, 0.0)));
        }

        let trail = &reconciler.view().trail;
        assert_eq!(trail.len(), 60);
        // The first inserted point is gone, the newest is at the back
        assert_eq!(trail.front().unwrap().y(), 1.0);
        assert_eq!(trail.back().unwrap().y(), 60.0);
    }

    #[test]
    fn test_autocenter_fires_exactly_once() {
        let mut reconciler = MapReconciler::with_defaults();
        assert!(!reconciler.view().has_centered);

        let mut total_centers = 0;
        for i in 0..10 {
            let commands = reconciler.on_snapshot(Some(&fix_value(i as f64, i as f64)));
            total_centers += center_requests(&commands);
        }

        assert_eq!(total_centers, 1);
        assert!(reconciler.view().has_centered);
    }

    #[test]
    fn test_invalid_first_payload_does_not_consume_autocenter() {
        let mut reconciler = MapReconciler::with_defaults();
        reconciler.on_snapshot(None);
        reconciler.on_snapshot(Some(&json!({"lat": 7.0})));
        assert!(!reconciler.view().has_centered);

        let commands = reconciler.on_snapshot(Some(&fix_value(7.0, 8.0)));
        assert_eq!(center_requests(&commands), 1);
    }

    #[test]
    fn test_stream_error_only_clears_connectivity() {
        let mut reconciler = MapReconciler::with_defaults();
        reconciler.on_snapshot(Some(&fix_value(1.0, 2.0)));

        reconciler.on_stream_error();
        let view = reconciler.view();
        assert!(!view.connected);
        assert_eq!(view.marker_position, Some(Point::new(2.0, 1.0)));
        assert!(view.has_centered);

        // Any delivered callback reconnects, even an empty one
        reconciler.on_snapshot(None);
        assert!(reconciler.view().connected);
    }

    #[test]
    fn test_history_seeds_trail_without_moving_marker() {
        let mut reconciler = MapReconciler::with_defaults();
        let points: Vec<Value> = (0..100).map(|i| fix_value(i as f64, 0.0)).collect();
        reconciler.on_history(&points);

        let view = reconciler.view();
        assert_eq!(view.trail.len(), 60);
        assert_eq!(view.trail.front().unwrap().y(), 40.0);
        assert_eq!(view.trail.back().unwrap().y(), 99.0);
        assert_eq!(view.marker_position, None);
        assert!(!view.has_centered);
        assert_eq!(view.metrics, DisplayMetrics::default());
    }

    #[test]
    fn test_history_skips_invalid_entries() {
        let mut reconciler = MapReconciler::with_defaults();
        reconciler.on_history(&[
            fix_value(1.0, 1.0),
            json!({"lat": 2.0}),
            json!(null),
            fix_value(3.0, 3.0),
        ]);
        assert_eq!(reconciler.view().trail.len(), 2);
    }

    #[test]
    fn test_trail_disabled() {
        let mut reconciler = MapReconciler::new(ReconcilerConfig {
            trail_enabled: false,
            ..Default::default()
        });

        let commands = reconciler.on_snapshot(Some(&fix_value(1.0, 2.0)));
        assert!(!commands
            .iter()
            .any(|c| matches!(c, MapCommand::AppendTrailPoint { .. })));

        reconciler.on_history(&[fix_value(1.0, 1.0)]);
        assert!(reconciler.view().trail.is_empty());
    }

    #[test]
    fn test_bearing_normalized_and_smoothed() {
        let mut reconciler = MapReconciler::with_defaults();
        reconciler.on_snapshot(Some(&json!({"lat": 1.0, "lng": 2.0, "bearing": 350.0})));
        reconciler.on_snapshot(Some(&json!({"lat": 1.0, "lng": 2.0, "bearing": 370.0})));

        let metrics = &reconciler.view().metrics;
        assert_relative_eq!(metrics.bearing_deg.unwrap(), 10.0, epsilon = 1e-9);
        // 350° and 10° average across north, not through 180°
        assert_relative_eq!(metrics.smoothed_bearing_deg.unwrap(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_bearing_window_bounded() {
        let mut reconciler = MapReconciler::with_defaults();
        // Fill the window with eastward samples, then push enough westward
        // ones to evict them all
        for _ in 0..8 {
            reconciler.on_snapshot(Some(&json!({"lat": 1.0, "lng": 2.0, "bearing": 90.0})));
        }
        for _ in 0..8 {
            reconciler.on_snapshot(Some(&json!({"lat": 1.0, "lng": 2.0, "bearing": 270.0})));
        }
        let metrics = &reconciler.view().metrics;
        assert_relative_eq!(metrics.smoothed_bearing_deg.unwrap(), 270.0, epsilon = 1e-9);
    }

    #[test]
    fn test_fix_without_bearing_keeps_previous_window() {
        let mut reconciler = MapReconciler::with_defaults();
        reconciler.on_snapshot(Some(&json!({"lat": 1.0, "lng": 2.0, "bearing": 45.0})));
        reconciler.on_snapshot(Some(&fix_value(1.0, 2.0)));

        let metrics = &reconciler.view().metrics;
        assert_eq!(metrics.bearing_deg, None);
        assert_relative_eq!(metrics.smoothed_bearing_deg.unwrap(), 45.0, epsilon = 1e-9);
    }
}
