//! Console presenter - renders overlay commands and status chips as
//! terminal output.

use livetrack_core::{AccuracyGrade, AccuracyPalette, MapCommand, MapPresenter, StatusLine};

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// Terminal stand-in for the map layer: overlay commands become log lines,
/// status chips become a single refreshed row.
pub struct ConsolePresenter {
    palette: AccuracyPalette,
    last_connected: Option<bool>,
}

impl ConsolePresenter {
    pub fn new(palette: AccuracyPalette) -> Self {
        Self {
            palette,
            last_connected: None,
        }
    }
}

impl Default for ConsolePresenter {
    fn default() -> Self {
        Self::new(AccuracyPalette::default())
    }
}

impl MapPresenter for ConsolePresenter {
    fn bootstrap(&mut self, share_id: &str) {
        println!("╔══════════════════════════════════════════════════════╗");
        println!("║               LIVETRACK VIEWER                       ║");
        println!("╠══════════════════════════════════════════════════════╣");
        println!("║ share id: {share_id:<42} ║");
        println!("╚══════════════════════════════════════════════════════╝");
        println!("{DIM}share link: ?id={share_id}{RESET}");
    }

    fn apply(&mut self, command: &MapCommand) {
        match command {
            MapCommand::SetMarker { position } => {
                println!("  ⊙ marker   → {}", format_position(position));
            }
            MapCommand::SetAccuracyCircle { position, radius_m } => {
                println!(
                    "  ◯ accuracy → {} r={radius_m:.1} m",
                    format_position(position)
                );
            }
            MapCommand::AppendTrailPoint { position } => {
                println!("  ┈ trail    + {}", format_position(position));
            }
            MapCommand::CenterAndZoom { position, zoom } => {
                println!("  ⌖ camera   → {} z{zoom}", format_position(position));
            }
        }
    }

    fn set_connected(&mut self, connected: bool) {
        if self.last_connected == Some(connected) {
            return;
        }
        self.last_connected = Some(connected);
        if connected {
            println!("{GREEN}● live{RESET} — listening for realtime changes");
        } else {
            println!("{RED}○ disconnected{RESET} — stream reported an error");
        }
    }

    fn render_status(&mut self, status: &StatusLine) {
        let color = grade_color(self.palette.grade(status.accuracy_m));
        println!(
            "  id: {}  ·  last: {}  ·  accuracy: {color}{}{RESET}  ·  speed: {}  ·  bearing: {}  ·  trail: {}",
            status.share_id,
            status.last_fix,
            status.accuracy,
            status.speed,
            status.bearing,
            status.trail_len,
        );
    }
}

fn format_position(position: &geo::Point<f64>) -> String {
    // Latitude first, the way humans read coordinates
    format!("{:.5}, {:.5}", position.y(), position.x())
}

fn grade_color(grade: AccuracyGrade) -> &'static str {
    match grade {
        AccuracyGrade::Good => GREEN,
        AccuracyGrade::Fair => YELLOW,
        AccuracyGrade::Poor => RED,
        AccuracyGrade::Unknown => DIM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Point;

    #[test]
    fn test_position_renders_latitude_first() {
        let p = Point::new(-99.1332, 19.4326);
        assert_eq!(format_position(&p), "19.43260, -99.13320");
    }

    #[test]
    fn test_grade_colors() {
        assert_eq!(grade_color(AccuracyGrade::Good), GREEN);
        assert_eq!(grade_color(AccuracyGrade::Fair), YELLOW);
        assert_eq!(grade_color(AccuracyGrade::Poor), RED);
        assert_eq!(grade_color(AccuracyGrade::Unknown), DIM);
    }
}
