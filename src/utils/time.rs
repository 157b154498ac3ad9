//! Relative time phrasing ("5 minutes ago").

use chrono::Duration;

/// Render `age` the way a person would say it, e.g. `an hour ago`.
pub fn natural_age(age: Duration) -> String {
    let secs = age.num_seconds().max(0);
    let days = age.num_days().max(0);

    let phrase = match secs {
        0 => return "just now".to_string(),
        1 => "a second".to_string(),
        2..=59 => format!("{secs} seconds"),
        60..=119 => "a minute".to_string(),
        120..=3_599 => format!("{} minutes", secs / 60),
        3_600..=7_199 => "an hour".to_string(),
        7_200..=86_399 => format!("{} hours", secs / 3_600),
        _ => match days {
            1 => "a day".to_string(),
            2..=29 => format!("{days} days"),
            30..=59 => "a month".to_string(),
            60..=364 => format!("{} months", days / 30),
            365..=729 => "a year".to_string(),
            _ => format!("{} years", days / 365),
        },
    };
    format!("{phrase} ago")
}
