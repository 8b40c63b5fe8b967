use time::OffsetDateTime;

const MINUTES_IN_HOUR: i64 = 60;
const MINUTES_IN_DAY: i64 = 1440;
const MINUTES_IN_MONTH: i64 = 43_200;
const MINUTES_IN_TWO_MONTHS: i64 = 86_400;

/// Human distance between `at` and `now` with a direction suffix, e.g.
/// "5 minutes ago", "about 2 hours ago", "in 3 days".
#[must_use]
pub fn relative_time(at: OffsetDateTime, now: OffsetDateTime) -> String {
    let seconds = (now - at).whole_seconds();
    let distance = distance_in_words(seconds.saturating_abs());

    if seconds < 0 { format!("in {distance}") } else { format!("{distance} ago") }
}

fn distance_in_words(seconds: i64) -> String {
    let minutes = round_div(seconds, 60);

    if minutes == 0 {
        return "less than a minute".to_string();
    }
    if minutes < 45 {
        return plural(minutes, "minute");
    }
    if minutes < 90 {
        return "about 1 hour".to_string();
    }
    if minutes < MINUTES_IN_DAY {
        return format!("about {}", plural(round_div(minutes, MINUTES_IN_HOUR), "hour"));
    }
    if minutes < 2520 {
        return "1 day".to_string();
    }
    if minutes < MINUTES_IN_MONTH {
        return plural(round_div(minutes, MINUTES_IN_DAY), "day");
    }
    if minutes < MINUTES_IN_TWO_MONTHS {
        return format!("about {}", plural(round_div(minutes, MINUTES_IN_MONTH), "month"));
    }

    let months = minutes / MINUTES_IN_MONTH;
    if months < 12 {
        return plural(round_div(minutes, MINUTES_IN_MONTH), "month");
    }

    let years = months / 12;
    match months % 12 {
        0..3 => format!("about {}", plural(years, "year")),
        3..9 => format!("over {}", plural(years, "year")),
        _ => format!("almost {}", plural(years + 1, "year")),
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 { format!("1 {unit}") } else { format!("{n} {unit}s") }
}

const fn round_div(value: i64, divisor: i64) -> i64 {
    value.saturating_add(divisor / 2) / divisor
}
