//! Time bases: Julian dates, J2000, Unix time and calendar readout.

/// Julian date of J2000.0 (2000-01-01 12:00 TT).
pub const J2000_JD: f64 = 2_451_545.0;
/// Julian date of the Unix epoch.
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;
pub const SECONDS_PER_DAY: f64 = 86_400.0;
const MS_PER_DAY: f64 = 86_400_000.0;

/// Signed seconds from `epoch_jd` to the simulation start instant.
pub fn calculate_epoch_time(sim_start_jd: f64, epoch_jd: f64) -> f64 {
    (sim_start_jd - epoch_jd) * SECONDS_PER_DAY
}

pub fn julian_date_from_unix_ms(unix_ms: f64) -> f64 {
    unix_ms / MS_PER_DAY + UNIX_EPOCH_JD
}

/// Convert days from J2000 to (year, month, day), Gregorian after 1582.
pub fn days_to_date(days_from_j2000: f64) -> (i32, u32, u32) {
    let jd = days_from_j2000 + J2000_JD;
    let z = (jd + 0.5).floor() as i64;
    let a = if z < 2_299_161 {
        z
    } else {
        let alpha = ((z as f64 - 1_867_216.25) / 36_524.25).floor() as i64;
        z + 1 + alpha - alpha / 4
    };
    let b = a + 1524;
    let c = ((b as f64 - 122.1) / 365.25).floor() as i64;
    let d = (365.25 * c as f64).floor() as i64;
    let e = ((b - d) as f64 / 30.6001).floor() as i64;

    let day = (b - d - (30.6001 * e as f64).floor() as i64) as u32;
    let month = if e < 14 { (e - 1) as u32 } else { (e - 13) as u32 };
    let year = if month > 2 { (c - 4716) as i32 } else { (c - 4715) as i32 };
    (year, month, day)
}

/// `YYYY-MM-DD` for the HUD.
pub fn format_date(days_from_j2000: f64) -> String {
    let (y, m, d) = days_to_date(days_from_j2000);
    format!("{y:04}-{m:02}-{d:02}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn unix_epoch_maps_to_its_julian_date() {
        assert_eq!(julian_date_from_unix_ms(0.0), UNIX_EPOCH_JD);
        // 2000-01-01T12:00:00Z
        assert_relative_eq!(julian_date_from_unix_ms(946_728_000_000.0), J2000_JD, epsilon = 1e-9);
    }

    #[test]
    fn epoch_time_is_signed_seconds() {
        assert_eq!(calculate_epoch_time(J2000_JD + 1.0, J2000_JD), 86_400.0);
        assert_eq!(calculate_epoch_time(J2000_JD - 0.5, J2000_JD), -43_200.0);
    }

    #[test]
    fn date_j2000_epoch() {
        let (year, month, _day) = days_to_date(0.0);
        assert_eq!(year, 2000);
        assert_eq!(month, 1);
    }

    #[test]
    fn date_known_date() {
        let (year, month, day) = days_to_date(79.0);
        assert_eq!(year, 2000);
        assert_eq!(month, 3);
        assert!((20..=21).contains(&day), "day = {day}");
    }

    #[test]
    fn date_negative_days() {
        let (year, _month, _day) = days_to_date(-365.0);
        assert_eq!(year, 1999);
        assert_eq!(format_date(0.0), "2000-01-01");
    }
}
