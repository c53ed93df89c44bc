// File: crates/chart-core/src/time_format.rs
// Summary: Time-axis label formatter with a locale preference resolved once per instance.

use std::fmt::Display;

use chrono::{DateTime, Datelike, FixedOffset, Local, Locale, TimeZone, Timelike};

/// Regions whose customary clock is 12-hour.
const TWELVE_HOUR_REGIONS: [&str; 11] = ["US", "CA", "AU", "NZ", "IN", "PH", "PK", "EG", "SA", "MX", "CO"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HourCycle {
    H12,
    H24,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeZoneChoice {
    Local,
    Fixed(FixedOffset),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeFormatOptions {
    pub hour_cycle: HourCycle,
    pub zone: TimeZoneChoice,
    /// Source of the month abbreviation.
    pub locale: Locale,
}

impl Default for TimeFormatOptions {
    fn default() -> Self { Self { hour_cycle: HourCycle::H24, zone: TimeZoneChoice::Local, locale: Locale::POSIX } }
}

/// Renders `HH:MM[ AM/PM] Mon DD, YYYY`. Immutable after construction.
#[derive(Clone, Copy, Debug)]
pub struct TimeFormatter {
    options: TimeFormatOptions,
}

impl Default for TimeFormatter {
    fn default() -> Self { Self::new() }
}

impl TimeFormatter {
    /// Detect the hour cycle and month names from the process locale and use local time.
    pub fn new() -> Self {
        let locale = ["LC_ALL", "LC_TIME", "LANG"]
            .iter()
            .filter_map(|k| std::env::var(k).ok())
            .find(|v| !v.is_empty());
        Self::for_locale(locale.as_deref().unwrap_or("C"))
    }

    /// Resolve hour cycle and month names from a POSIX locale string, in local time.
    pub fn for_locale(name: &str) -> Self {
        let options = TimeFormatOptions {
            hour_cycle: hour_cycle_for_locale(name),
            zone: TimeZoneChoice::Local,
            locale: locale_for(name),
        };
        log::debug!("time formatter locale {name:?} -> {:?}, {:?}", options.hour_cycle, options.locale);
        Self { options }
    }

    pub fn with_options(options: TimeFormatOptions) -> Self { Self { options } }

    pub fn hour_cycle(&self) -> HourCycle { self.options.hour_cycle }

    /// Format a Unix timestamp in seconds. Out-of-range input yields an empty string.
    pub fn format(&self, timestamp_seconds: i64) -> String {
        let Some(utc) = DateTime::from_timestamp(timestamp_seconds, 0) else { return String::new() };
        match self.options.zone {
            TimeZoneChoice::Local => self.render(&utc.with_timezone(&Local)),
            TimeZoneChoice::Fixed(offset) => self.render(&utc.with_timezone(&offset)),
        }
    }

    fn render<Tz: TimeZone>(&self, t: &DateTime<Tz>) -> String
    where
        Tz::Offset: Display,
    {
        let month = t.format_localized("%b", self.options.locale);
        match self.options.hour_cycle {
            HourCycle::H24 => format!("{:02}:{:02} {month} {:02}, {}", t.hour(), t.minute(), t.day(), t.year()),
            HourCycle::H12 => {
                let (pm, hour) = t.hour12();
                let suffix = if pm { "PM" } else { "AM" };
                format!("{hour:02}:{:02} {suffix} {month} {:02}, {}", t.minute(), t.day(), t.year())
            }
        }
    }
}

/// Map a POSIX locale string (`en_US.UTF-8`, `de_DE@euro`, `C`) to its hour cycle.
pub fn hour_cycle_for_locale(locale: &str) -> HourCycle {
    let base = locale.split(['.', '@']).next().unwrap_or("");
    let region = base.split(['_', '-']).nth(1).unwrap_or("");
    if TWELVE_HOUR_REGIONS.iter().any(|r| r.eq_ignore_ascii_case(region)) { HourCycle::H12 } else { HourCycle::H24 }
}

/// Map a POSIX locale string to chrono's locale data. `C`, `POSIX` and
/// unknown names fall back to English month names.
pub fn locale_for(locale: &str) -> Locale {
    let base = locale.split(['.', '@']).next().unwrap_or("").replace('-', "_");
    match base.as_str() {
        "" | "C" | "POSIX" => Locale::POSIX,
        name => Locale::try_from(name).unwrap_or(Locale::POSIX),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(hour_cycle: HourCycle) -> TimeFormatter {
        TimeFormatter::with_options(TimeFormatOptions {
            hour_cycle,
            zone: TimeZoneChoice::Fixed(FixedOffset::east_opt(0).unwrap()),
            ..TimeFormatOptions::default()
        })
    }

    #[test]
    fn locale_regions() {
        assert_eq!(hour_cycle_for_locale("en_US.UTF-8"), HourCycle::H12);
        assert_eq!(hour_cycle_for_locale("en-AU"), HourCycle::H12);
        assert_eq!(hour_cycle_for_locale("de_DE@euro"), HourCycle::H24);
        assert_eq!(hour_cycle_for_locale("en_GB.UTF-8"), HourCycle::H24);
        assert_eq!(hour_cycle_for_locale("C"), HourCycle::H24);
        assert_eq!(hour_cycle_for_locale(""), HourCycle::H24);
    }

    #[test]
    fn twelve_hour_midnight_and_noon() {
        let f = utc(HourCycle::H12);
        assert_eq!(f.format(1_704_240_000), "12:00 AM Jan 03, 2024");
        assert_eq!(f.format(1_704_283_200), "12:00 PM Jan 03, 2024");
        assert_eq!(f.format(1_704_290_700), "02:05 PM Jan 03, 2024");
    }

    #[test]
    fn locale_names_resolve_month_data() {
        assert_eq!(locale_for("de_DE.UTF-8"), Locale::de_DE);
        assert_eq!(locale_for("fr-FR"), Locale::fr_FR);
        assert_eq!(locale_for("C.UTF-8"), Locale::POSIX);
        assert_eq!(locale_for("xx_YY"), Locale::POSIX);
        assert_eq!(locale_for(""), Locale::POSIX);
    }

    #[test]
    fn german_month_abbreviations() {
        let f = TimeFormatter::with_options(TimeFormatOptions {
            zone: TimeZoneChoice::Fixed(FixedOffset::east_opt(0).unwrap()),
            ..TimeFormatter::for_locale("de_DE.UTF-8").options
        });
        assert_eq!(f.hour_cycle(), HourCycle::H24);
        // 2023-10-15 12:00 and 2024-03-05 09:30 UTC
        assert_eq!(f.format(1_697_371_200), "12:00 Okt 15, 2023");
        assert_eq!(f.format(1_709_631_000), "09:30 Mär 05, 2024");
    }

    #[test]
    fn out_of_range_is_empty() {
        assert_eq!(utc(HourCycle::H24).format(i64::MAX), "");
    }
}
