//! Natural-language date resolution.
//!
//! Turns a free-text fragment ("tomorrow", "next friday", "May 2 2025",
//! "2025-06-01") into a calendar date. Resolution never guesses: a fragment
//! that carries only part of a date (a lone month, a lone day, a lone year)
//! is unresolvable, so the dialogue layer re-asks instead of booking a date
//! the guest did not say.
//!
//! `today` is injected by the caller, which keeps every rule deterministic
//! under test.

use chrono::{Datelike, Days, NaiveDate, Weekday};

/// Canonical textual form for resolved dates.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d";

pub fn format_date(date: NaiveDate) -> String {
    date.format(CANONICAL_FORMAT).to_string()
}

/// Resolve a free-text fragment to a calendar date, or `None` when the text
/// does not pin down a single day.
///
/// Rules are tried in order and the first applicable rule is final:
///
/// 1. An explicit `YYYY-M-D` pattern anywhere in the text, validated against
///    the real calendar. An invalid numeric date (month 13, Feb 30) is
///    unresolvable outright; it never falls through to the later rules.
/// 2. The keywords `tomorrow` (today + 1) and `tonight` (today).
/// 3. `next <weekday>`: the next future occurrence of that weekday, strictly
///    after today. If today is the named weekday the result is a week out,
///    never today itself.
/// 4. `next <month>`: requires an explicit day number later in the text; the
///    year rolls forward when the named month is not strictly after the
///    current one.
/// 5. An unordered scan for a month name, a 1-2 digit day, and an optional
///    4-digit year, composed with the current year as fallback.
pub fn resolve_date(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    if input.trim().is_empty() {
        return None;
    }
    let lowered = input.to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();

    if let Some(numeric) = find_numeric_date(&lowered) {
        return numeric;
    }

    if contains_word(&lowered, "tomorrow") {
        return today.checked_add_days(Days::new(1));
    }
    if contains_word(&lowered, "tonight") {
        return Some(today);
    }

    for (index, word) in words.iter().enumerate() {
        if *word != "next" {
            continue;
        }
        let Some(next_word) = words.get(index + 1) else {
            continue;
        };
        if let Some(weekday) = weekday_from_name(next_word) {
            return next_occurrence(today, weekday);
        }
        if let Some(month) = month_from_name(next_word) {
            return next_month_with_day(today, month, &words[index + 2..]);
        }
    }

    compose_from_words(&words, today)
}

/// Scan for a `YYYY-M-D` digit pattern. The outer option is `Some` as soon
/// as the pattern occurs; the inner value is `None` when the digits do not
/// form a real calendar date, which ends resolution.
fn find_numeric_date(text: &str) -> Option<Option<NaiveDate>> {
    let bytes = text.as_bytes();
    for start in 0..bytes.len() {
        if let Some((year, month, day)) = match_numeric_date_at(bytes, start) {
            return Some(NaiveDate::from_ymd_opt(year, month, day));
        }
    }
    None
}

fn match_numeric_date_at(bytes: &[u8], start: usize) -> Option<(i32, u32, u32)> {
    let (year, year_len) = read_digits(bytes, start, 4, 4)?;
    let mut position = start + year_len;
    position = expect_byte(bytes, position, b'-')?;
    let (month, month_len) = read_digits(bytes, position, 1, 2)?;
    position += month_len;
    position = expect_byte(bytes, position, b'-')?;
    let (day, _) = read_digits(bytes, position, 1, 2)?;
    Some((year as i32, month, day))
}

fn expect_byte(bytes: &[u8], position: usize, expected: u8) -> Option<usize> {
    (bytes.get(position) == Some(&expected)).then_some(position + 1)
}

/// Greedily read between `min` and `max` ASCII digits starting at `start`.
fn read_digits(bytes: &[u8], start: usize, min: usize, max: usize) -> Option<(u32, usize)> {
    let mut value: u32 = 0;
    let mut length = 0;
    while length < max {
        match bytes.get(start + length) {
            Some(byte) if byte.is_ascii_digit() => {
                value = value * 10 + u32::from(byte - b'0');
                length += 1;
            }
            _ => break,
        }
    }
    (length >= min).then_some((value, length))
}

fn contains_word(text: &str, word: &str) -> bool {
    text.split(|c: char| !c.is_ascii_alphanumeric()).any(|token| token == word)
}

fn next_occurrence(today: NaiveDate, target: Weekday) -> Option<NaiveDate> {
    let days_ahead =
        (target.num_days_from_monday() + 7 - today.weekday().num_days_from_monday()) % 7;
    let days_ahead = if days_ahead == 0 { 7 } else { days_ahead };
    today.checked_add_days(Days::new(u64::from(days_ahead)))
}

/// `next <month>` needs a day number somewhere after the month word; the
/// year advances unless the named month is strictly after the current one.
fn next_month_with_day(
    today: NaiveDate,
    month: u32,
    remaining_words: &[&str],
) -> Option<NaiveDate> {
    let year = if month <= today.month() { today.year() + 1 } else { today.year() };
    let day_word = remaining_words
        .iter()
        .find(|word| !word.is_empty() && word.chars().all(|c| c.is_ascii_digit()))?;
    let day: u32 = day_word.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Unordered scan: a month name plus a plausible day number compose a date,
/// with an optional explicit year. Any lesser subset is unresolvable.
fn compose_from_words(words: &[&str], today: NaiveDate) -> Option<NaiveDate> {
    let mut found_month = None;
    let mut found_day = None;
    let mut found_year = None;

    for word in words {
        if let Some(month) = month_from_name(word) {
            found_month = Some(month);
        }
        if word.len() == 4 && word.chars().all(|c| c.is_ascii_digit()) {
            let year: i32 = word.parse().ok()?;
            if (1000..=3000).contains(&year) {
                found_year = Some(year);
            }
        }
        if (1..=2).contains(&word.len()) && word.chars().all(|c| c.is_ascii_digit()) {
            let day: u32 = word.parse().ok()?;
            if (1..=31).contains(&day) {
                found_day = Some(day);
            }
        }
    }

    match (found_month, found_day) {
        (Some(month), Some(day)) => {
            NaiveDate::from_ymd_opt(found_year.unwrap_or_else(|| today.year()), month, day)
        }
        _ => None,
    }
}

fn month_from_name(word: &str) -> Option<u32> {
    let month = match word {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sep" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn weekday_from_name(word: &str) -> Option<Weekday> {
    let weekday = match word {
        "monday" | "mon" => Weekday::Mon,
        "tuesday" | "tue" => Weekday::Tue,
        "wednesday" | "wed" => Weekday::Wed,
        "thursday" | "thu" => Weekday::Thu,
        "friday" | "fri" => Weekday::Fri,
        "saturday" | "sat" => Weekday::Sat,
        "sunday" | "sun" => Weekday::Sun,
        _ => return None,
    };
    Some(weekday)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{format_date, resolve_date};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
    }

    // A Tuesday in mid-April.
    fn fixed_today() -> NaiveDate {
        date(2025, 4, 15)
    }

    #[test]
    fn explicit_numeric_date_round_trips() {
        let resolved = resolve_date("2025-06-01", fixed_today()).expect("resolvable");
        assert_eq!(format_date(resolved), "2025-06-01");
    }

    #[test]
    fn numeric_date_is_found_anywhere_in_the_text() {
        let resolved = resolve_date("book us for 2025-6-1 please", fixed_today());
        assert_eq!(resolved, Some(date(2025, 6, 1)));
    }

    #[test]
    fn invalid_numeric_date_is_final() {
        assert_eq!(resolve_date("2025-02-30", fixed_today()), None);
        assert_eq!(resolve_date("2025-13-01", fixed_today()), None);
        // The broken numeric date must not fall through to the month-name scan.
        assert_eq!(resolve_date("2025-13-01 or May 2", fixed_today()), None);
    }

    #[test]
    fn tomorrow_and_tonight_resolve_relative_to_today() {
        assert_eq!(resolve_date("see you tomorrow", fixed_today()), Some(date(2025, 4, 16)));
        assert_eq!(resolve_date("tonight!", fixed_today()), Some(date(2025, 4, 15)));
    }

    #[test]
    fn next_weekday_is_strictly_in_the_future() {
        // fixed_today() is a Tuesday; next friday is three days out.
        assert_eq!(resolve_date("next friday", fixed_today()), Some(date(2025, 4, 18)));
        // Naming today's weekday skips a full week, never returning today.
        assert_eq!(resolve_date("next tuesday", fixed_today()), Some(date(2025, 4, 22)));
    }

    #[test]
    fn next_monday_from_a_monday_is_a_week_out() {
        let monday = date(2025, 4, 14);
        assert_eq!(resolve_date("next monday", monday), Some(date(2025, 4, 21)));
    }

    #[test]
    fn next_month_requires_a_day_number() {
        assert_eq!(resolve_date("next june 10", fixed_today()), Some(date(2025, 6, 10)));
        assert_eq!(resolve_date("next june", fixed_today()), None);
    }

    #[test]
    fn next_month_rolls_the_year_when_the_month_has_passed() {
        assert_eq!(resolve_date("next january 5", fixed_today()), Some(date(2026, 1, 5)));
        // The current month also rolls: "next april" from April means next year.
        assert_eq!(resolve_date("next april 20", fixed_today()), Some(date(2026, 4, 20)));
    }

    #[test]
    fn month_name_and_day_compose_with_explicit_year() {
        assert_eq!(resolve_date("May 2 2025", fixed_today()), Some(date(2025, 5, 2)));
        assert_eq!(resolve_date("2 May 2025", fixed_today()), Some(date(2025, 5, 2)));
    }

    #[test]
    fn month_name_and_day_fall_back_to_the_current_year() {
        assert_eq!(resolve_date("May 2", fixed_today()), Some(date(2025, 5, 2)));
    }

    #[test]
    fn partial_information_never_resolves() {
        assert_eq!(resolve_date("in May", fixed_today()), None);
        assert_eq!(resolve_date("the 5th", fixed_today()), None);
        assert_eq!(resolve_date("2025", fixed_today()), None);
        assert_eq!(resolve_date("on the 5", fixed_today()), None);
        assert_eq!(resolve_date("", fixed_today()), None);
        assert_eq!(resolve_date("   ", fixed_today()), None);
    }

    #[test]
    fn composed_invalid_dates_are_unresolvable() {
        assert_eq!(resolve_date("February 31", fixed_today()), None);
    }
}
