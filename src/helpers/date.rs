//! Date helper functions

use anyhow::Result;
use chrono::{DateTime, FixedOffset, Locale, TimeZone};
use chrono_tz::Tz;

use crate::config::SiteConfig;

/// Formats publication dates in the site's timezone and language
#[derive(Debug, Clone)]
pub struct DateFormatter {
    format: String,
    locale: Locale,
    tz: Tz,
}

impl DateFormatter {
    /// Create a formatter from a Moment.js-style pattern
    pub fn new(format: &str, language: &str, tz: Tz) -> Self {
        Self {
            format: moment_to_chrono_format(format),
            locale: locale_for(language),
            tz,
        }
    }

    /// Create a formatter from the site configuration
    pub fn from_config(config: &SiteConfig) -> Result<Self> {
        Ok(Self::new(&config.date_format, &config.language, config.tz()?))
    }

    /// Format a timestamp
    ///
    /// # Examples
    /// ```ignore
    /// formatter.format(&date) // -> "15 mar 2021"
    /// ```
    pub fn format(&self, date: &DateTime<FixedOffset>) -> String {
        format_localized(&date.with_timezone(&self.tz), &self.format, self.locale)
    }

    /// Format an optional timestamp, missing dates render as nothing
    pub fn format_opt(&self, date: Option<&DateTime<FixedOffset>>) -> Option<String> {
        date.map(|d| self.format(d))
    }
}

/// Format a date with an already converted chrono pattern
pub fn format_localized<Tz2: TimeZone>(date: &DateTime<Tz2>, format: &str, locale: Locale) -> String
where
    Tz2::Offset: std::fmt::Display,
{
    date.format_localized(format, locale).to_string()
}

/// Format a date in ISO 8601 / XML format
pub fn date_xml<Tz2: TimeZone>(date: &DateTime<Tz2>) -> String
where
    Tz2::Offset: std::fmt::Display,
{
    date.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

/// Parse a CMS timestamp such as `2021-03-15T19:25:28+0000`
pub fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z"))
        .ok()
}

/// Map a site language tag to a chrono locale
pub fn locale_for(language: &str) -> Locale {
    match language.to_ascii_lowercase().replace('_', "-").as_str() {
        "pt-pt" => Locale::pt_PT,
        "en" | "en-us" => Locale::en_US,
        "en-gb" => Locale::en_GB,
        "es" | "es-es" => Locale::es_ES,
        "fr" | "fr-fr" => Locale::fr_FR,
        "de" | "de-de" => Locale::de_DE,
        _ => Locale::pt_BR,
    }
}

/// Convert Moment.js format to chrono format
fn moment_to_chrono_format(format: &str) -> String {
    // Longest patterns first within each category
    let replacements = [
        // Year
        ("YYYY", "%Y"),
        ("YY", "%y"),
        // Month
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        // Day of month
        ("DDDD", "%j"),
        ("DD", "%d"),
        // Hour
        ("HH", "%H"),
        ("hh", "%I"),
        // Minute (after MM is gone)
        ("mm", "%M"),
        // Second
        ("ss", "%S"),
        // Day of week
        ("dddd", "%A"),
        ("ddd", "%a"),
        // Timezone
        ("ZZ", "%z"),
    ];

    let mut result = format.to_string();

    for (from, to) in replacements {
        result = result.replace(from, to);
    }

    result
}
