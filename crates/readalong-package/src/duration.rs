//! Duration formatting (§4.7): `HH:MM:SS.mmm`.
//!
//! The original (`examples/original_source/storyteller/synchronize/
//! epub.py::format_duration`) computes `minutes = floor(d/60 -
//! hours*3600)`, which is almost certainly a bug (it should subtract
//! `hours*60` minutes, not `hours*3600`) — for any duration past the first
//! hour it produces a negative, garbage minute value. spec.md's own
//! formula corrects this to `minutes = floor(d/60) - hours*60`, which is
//! what's implemented here; see DESIGN.md's Open Question resolutions.

/// Format a duration in seconds as `HH:MM:SS.mmm`.
pub fn format_duration(total_seconds: f64) -> String {
    let total_seconds = total_seconds.max(0.0);
    let hours = (total_seconds / 3600.0).floor();
    let minutes = (total_seconds / 60.0).floor() - hours * 60.0;
    let seconds = total_seconds - minutes * 60.0 - hours * 3600.0;

    format!("{:02}:{:02}:{:06.3}", hours as u64, minutes as u64, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_sub_minute_durations() {
        assert_eq!(format_duration(5.25), "00:00:05.250");
    }

    #[test]
    fn formats_durations_past_an_hour() {
        // 1h 02m 03.5s
        let d = 3600.0 + 120.0 + 3.5;
        assert_eq!(format_duration(d), "01:02:03.500");
    }

    #[test]
    fn negative_input_clamps_to_zero() {
        assert_eq!(format_duration(-1.0), "00:00:00.000");
    }
}
