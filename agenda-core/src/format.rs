//! Display formatting for money and dates. These never fail: input they
//! cannot read is returned as given.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::time::parse_date;

const MONTHS: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sept", "oct", "nov", "dic",
];

/// Whole pesos with `.` as thousands separator, e.g. `$60.000`.
pub fn format_money(amount: f64) -> String {
    if !amount.is_finite() {
        return "$0".to_string();
    }

    let rounded = amount.round();
    let digits = format!("{}", rounded.abs() as u64);

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    if rounded < 0.0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// `15 feb`
pub fn format_short_date(input: &str) -> String {
    match parse_date(input) {
        Some(date) => short(date),
        None => input.to_string(),
    }
}

/// `Jueves, 15 feb`
pub fn format_long_date(input: &str) -> String {
    match parse_date(input) {
        Some(date) => format!("{}, {}", weekday(date.weekday()), short(date)),
        None => input.to_string(),
    }
}

fn short(date: NaiveDate) -> String {
    format!("{} {}", date.day(), MONTHS[date.month0() as usize])
}

fn weekday(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Lunes",
        Weekday::Tue => "Martes",
        Weekday::Wed => "Miércoles",
        Weekday::Thu => "Jueves",
        Weekday::Fri => "Viernes",
        Weekday::Sat => "Sábado",
        Weekday::Sun => "Domingo",
    }
}
