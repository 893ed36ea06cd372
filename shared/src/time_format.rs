use std::fmt::Write;

use chrono::{DateTime, Utc};

/// Compact "last seen" label for a marker, e.g. `agora`, `5min`, `3h`, `2d`.
pub fn format_age(age_secs: i64) -> String {
    let mut out = String::with_capacity(8);
    write_age(&mut out, age_secs);
    out
}

pub fn write_age(buf: &mut String, age_secs: i64) {
    buf.clear();
    let age_secs = age_secs.max(0);
    if age_secs < 60 {
        buf.push_str("agora");
    } else if age_secs < 3600 {
        let _ = write!(buf, "{}min", age_secs / 60);
    } else if age_secs < 86400 {
        let _ = write!(buf, "{}h", age_secs / 3600);
    } else if age_secs < 604800 {
        let _ = write!(buf, "{}d", age_secs / 86400);
    } else {
        let _ = write!(buf, "{}sem", age_secs / 604800);
    }
}

pub fn age_label(seen_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    format_age((now - seen_at).num_seconds())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn formats_each_unit() {
        assert_eq!(format_age(0), "agora");
        assert_eq!(format_age(59), "agora");
        assert_eq!(format_age(60), "1min");
        assert_eq!(format_age(3599), "59min");
        assert_eq!(format_age(7200), "2h");
        assert_eq!(format_age(86400 * 3), "3d");
        assert_eq!(format_age(604800 * 2), "2sem");
    }

    #[test]
    fn clamps_future_timestamps() {
        assert_eq!(format_age(-30), "agora");
    }

    #[test]
    fn age_label_uses_difference() {
        let seen = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 13, 30, 0).unwrap();
        assert_eq!(age_label(seen, now), "3h");
    }
}
