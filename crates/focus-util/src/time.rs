//! Time utilities for focusd

use chrono::{DateTime, Local};

/// Current local wall-clock time, used to stamp outgoing events.
pub fn now() -> DateTime<Local> {
    Local::now()
}

/// Format a countdown as `MM:SS`, or `H:MM:SS` once it reaches an hour.
pub fn format_countdown(seconds: u32) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_formatting() {
        assert_eq!(format_countdown(0), "00:00");
        assert_eq!(format_countdown(59), "00:59");
        assert_eq!(format_countdown(1500), "25:00");
        assert_eq!(format_countdown(3599), "59:59");
        assert_eq!(format_countdown(3661), "1:01:01");
    }
}
