//! Presentation seam.
//!
//! The engine's only outbound interface: advisory overlay commands plus a
//! formatted status line. Implementations render a real map, a terminal, or
//! nothing at all — the engine does not care whether its advice is taken.

use crate::reconciler::MapCommand;

/// Formatted status chips published alongside overlay mutations.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    pub share_id: String,
    pub connected: bool,
    /// Age of the last fix ("5 s", "3 min", an absolute date, or the placeholder)
    pub last_fix: String,
    pub accuracy: String,
    pub speed: String,
    pub bearing: String,
    pub trail_len: usize,
    /// Raw accuracy value, for palette decisions
    pub accuracy_m: Option<f64>,
}

/// Precision grade of an accuracy radius under an [`AccuracyPalette`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccuracyGrade {
    Good,
    Fair,
    Poor,
    Unknown,
}

/// Thresholds for accuracy-circle coloring.
///
/// Deployments disagree on the exact cut-offs, so this is presentation
/// policy carried as a parameter, not an engine invariant.
#[derive(Debug, Clone)]
pub struct AccuracyPalette {
    /// Strictly below this radius grades Good
    pub good_below_m: f64,
    /// Strictly below this radius grades Fair
    pub fair_below_m: f64,
}

impl Default for AccuracyPalette {
    fn default() -> Self {
        Self {
            good_below_m: 10.0,
            fair_below_m: 30.0,
        }
    }
}

impl AccuracyPalette {
    /// Grades an accuracy radius; an absent radius is Unknown.
    pub fn grade(&self, accuracy_m: Option<f64>) -> AccuracyGrade {
        match accuracy_m {
            None => AccuracyGrade::Unknown,
            Some(m) if m < self.good_below_m => AccuracyGrade::Good,
            Some(m) if m < self.fair_below_m => AccuracyGrade::Fair,
            Some(_) => AccuracyGrade::Poor,
        }
    }
}

/// The presentation layer as seen from the engine.
pub trait MapPresenter: Send {
    /// One-time presentation bootstrap: base map, controls, styling.
    /// Invoked exactly once when the session opens, never again.
    fn bootstrap(&mut self, share_id: &str);

    /// Executes one advisory overlay command.
    fn apply(&mut self, command: &MapCommand);

    /// Reflects the connectivity indicator.
    fn set_connected(&mut self, connected: bool);

    /// Renders the status chips.
    fn render_status(&mut self, status: &StatusLine);
}

/// Presenter that drops everything; for tests and headless runs.
#[derive(Debug, Default)]
pub struct NullPresenter;

impl MapPresenter for NullPresenter {
    fn bootstrap(&mut self, _share_id: &str) {}
    fn apply(&mut self, _command: &MapCommand) {}
    fn set_connected(&mut self, _connected: bool) {}
    fn render_status(&mut self, _status: &StatusLine) {}
}
