use std::collections::HashMap;

use chrono::DateTime;
use lazy_static::lazy_static;

use crate::models::{MediaCategory, ProgressStatus, Role};

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

lazy_static! {
    static ref ROLE_LABELS: HashMap<&'static str, &'static str> = HashMap::from([
        ("admin", "Administrator"),
        ("instructor", "Instructor"),
        ("student", "Student"),
    ]);
    static ref FILE_ICONS: HashMap<&'static str, &'static str> = HashMap::from([
        ("video", "play-circle"),
        ("image", "image"),
        ("document", "file-pdf"),
        ("other", "file"),
    ]);
    static ref ACTIVITY_ICONS: HashMap<&'static str, &'static str> = HashMap::from([
        ("user", "user-plus"),
        ("course", "book"),
        ("purchase", "shopping-cart"),
    ]);
}

pub fn role_label(role: Role) -> &'static str {
    ROLE_LABELS.get(role.as_str()).copied().unwrap_or("Student")
}

pub fn file_icon(category: MediaCategory) -> &'static str {
    FILE_ICONS.get(category.as_str()).copied().unwrap_or("file")
}

pub fn activity_icon(kind: &str) -> &'static str {
    ACTIVITY_ICONS.get(kind).copied().unwrap_or("info-circle")
}

/// At most two decimals, trailing zeros dropped.
fn trim_decimals(value: f64) -> String {
    let text = format!("{:.2}", value);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

pub fn format_file_size(bytes: i64) -> String {
    if bytes <= 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{} {}", trim_decimals(value), SIZE_UNITS[unit])
}

pub fn price_label(price: f64) -> String {
    if price <= 0.0 {
        "Free".to_string()
    } else {
        format!("R$ {}", price)
    }
}

pub fn time_ago(then: i64, now: i64) -> String {
    let elapsed = (now - then).max(0);
    match elapsed {
        0..=59 => "just now".to_string(),
        60..=3_599 => format!("{} min ago", elapsed / 60),
        3_600..=86_399 => format!("{} hours ago", elapsed / 3_600),
        _ => format!("{} days ago", elapsed / 86_400),
    }
}

/// `dd/mm/yyyy`, or "Never".
pub fn format_date(timestamp: Option<i64>) -> String {
    timestamp
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .map(|date| date.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "Never".to_string())
}

/// Label and badge classes for an enrollment's progress.
pub fn progress_badge(status: ProgressStatus) -> (&'static str, &'static str) {
    match status {
        ProgressStatus::Completed => ("Completed", "bg-green-100 text-green-800"),
        ProgressStatus::InProgress => ("In progress", "bg-blue-100 text-blue-800"),
        ProgressStatus::NotStarted => ("Not started", "bg-gray-100 text-gray-800"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_sizes() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1_048_576), "1 MB");
        assert_eq!(format_file_size(1_234_567), "1.18 MB");
        assert_eq!(format_file_size(5 * 1024 * 1024 * 1024 * 1024), "5120 GB");
    }

    #[test]
    fn test_lookup_tables_fall_back() {
        assert_eq!(role_label(Role::Admin), "Administrator");
        assert_eq!(role_label(Role::Instructor), "Instructor");
        assert_eq!(role_label(Role::Student), "Student");

        assert_eq!(file_icon(MediaCategory::Video), "play-circle");
        assert_eq!(file_icon(MediaCategory::Document), "file-pdf");
        assert_eq!(file_icon(MediaCategory::Other), "file");

        assert_eq!(activity_icon("purchase"), "shopping-cart");
        assert_eq!(activity_icon("upload"), "info-circle");
    }

    #[test]
    fn test_price_and_badges() {
        assert_eq!(price_label(0.0), "Free");
        assert_eq!(price_label(49.9), "R$ 49.9");
        assert_eq!(price_label(50.0), "R$ 50");

        assert_eq!(progress_badge(ProgressStatus::from_progress(0.0)).0, "Not started");
        assert_eq!(progress_badge(ProgressStatus::from_progress(45.0)).0, "In progress");
        assert_eq!(progress_badge(ProgressStatus::from_progress(100.0)).0, "Completed");
    }

    #[test]
    fn test_relative_time_and_dates() {
        assert_eq!(time_ago(1_000, 1_030), "just now");
        assert_eq!(time_ago(0, 300), "5 min ago");
        assert_eq!(time_ago(0, 7_200), "2 hours ago");
        assert_eq!(time_ago(0, 3 * 86_400), "3 days ago");

        assert_eq!(format_date(None), "Never");
        assert_eq!(format_date(Some(1_700_000_000)), "14/11/2023");
    }
}
