//! Derived-metric formatters.
//!
//! Pure, total functions: every input (including absent values) maps to a
//! display string, never an error. Absent values render as the placeholder
//! so the chips can be laid out before the first fix arrives.

/// Rendered for any metric that is not (yet) known.
pub const PLACEHOLDER: &str = "—";

/// The 16-point compass rose, clockwise from north.
const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Normalizes any angle into `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    degrees.rem_euclid(360.0)
}

/// Maps a bearing to its compass point. Sector width is 22.5°, centered on
/// each point, so 11.25° already reads NNE.
pub fn compass_point(degrees: f64) -> &'static str {
    let normalized = normalize_degrees(degrees);
    let index = (normalized / 22.5).round() as usize % 16;
    COMPASS_POINTS[index]
}

/// Renders a distance in meters: one decimal below 100 m, whole meters
/// above (sub-meter precision on a 150 m accuracy radius is noise).
pub fn format_distance(meters: Option<f64>) -> String {
    match meters {
        None => PLACEHOLDER.to_string(),
        Some(m) if m >= 100.0 => format!("{m:.0} m"),
        Some(m) => format!("{m:.1} m"),
    }
}

/// Renders a speed in m/s as km/h with one decimal.
pub fn format_speed(meters_per_second: Option<f64>) -> String {
    match meters_per_second {
        None => PLACEHOLDER.to_string(),
        Some(mps) => format!("{:.1} km/h", mps * 3.6),
    }
}

/// Renders a bearing as rounded degrees plus its compass point,
/// e.g. `"45° NE"`. The angle is normalized into `[0, 360)` first.
pub fn format_bearing(degrees: Option<f64>) -> String {
    match degrees {
        None => PLACEHOLDER.to_string(),
        Some(deg) => {
            let normalized = normalize_degrees(deg);
            format!("{:.0}° {}", normalized.round(), compass_point(normalized))
        }
    }
}

/// Renders the age of a timestamp relative to `now_ms`.
///
/// Under a minute → seconds, under an hour → minutes, under a day → hours;
/// anything older renders as an absolute UTC date-time. A timestamp ahead
/// of the local clock (publisher clock skew) clamps to `"0 s"`.
pub fn format_elapsed(timestamp_ms: Option<i64>, now_ms: i64) -> String {
    let Some(ts) = timestamp_ms else {
        return PLACEHOLDER.to_string();
    };

    let delta_s = ((now_ms - ts) as f64 / 1000.0).max(0.0);
    if delta_s < 60.0 {
        format!("{} s", delta_s as u64)
    } else if delta_s < 3600.0 {
        format!("{} min", (delta_s / 60.0) as u64)
    } else if delta_s < 86400.0 {
        format!("{} h", (delta_s / 3600.0) as u64)
    } else {
        match chrono::DateTime::from_timestamp_millis(ts) {
            Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
            None => PLACEHOLDER.to_string(),
        }
    }
}

/// Circular mean of a set of bearings, in degrees within `[0, 360)`.
///
/// Arithmetic averaging breaks at the north wrap (350° and 10° would
/// "average" to 180°); summing unit vectors does not. Returns `None` for an
/// empty set and for degenerate sets whose vectors cancel out (e.g. 0° and
/// 180°), where no direction is meaningful.
pub fn circular_mean_degrees(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }

    let (sin_sum, cos_sum) = samples.iter().fold((0.0_f64, 0.0_f64), |(s, c), deg| {
        let rad = deg.to_radians();
        (s + rad.sin(), c + rad.cos())
    });

    if sin_sum.hypot(cos_sum) < 1e-9 {
        return None;
    }
    Some(normalize_degrees(sin_sum.atan2(cos_sum).to_degrees()))
}
