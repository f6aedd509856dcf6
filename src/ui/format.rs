use chrono::{DateTime, Utc};

const BYTE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Size for list cells: absent or zero renders as `-`.
pub fn format_bytes(n: Option<u64>) -> String {
    match n {
        Some(n) if n > 0 => format_bytes_exact(n),
        _ => "-".to_string(),
    }
}

/// Size in 1024-stepped units; whole bytes below 1 KB, one decimal above.
pub fn format_bytes_exact(n: u64) -> String {
    let mut v = n as f64;
    let mut i = 0;
    while v >= 1024.0 && i < BYTE_UNITS.len() - 1 {
        v /= 1024.0;
        i += 1;
    }
    if i == 0 {
        format!("{} {}", n, BYTE_UNITS[0])
    } else {
        format!("{:.1} {}", v, BYTE_UNITS[i])
    }
}

/// Thousands-separated count, `-` when absent.
pub fn format_count(n: Option<u64>) -> String {
    let Some(n) = n else {
        return "-".to_string();
    };
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Leading `YYYY-MM-DD` of a timestamp, `-` when absent.
pub fn format_date(s: Option<&str>) -> String {
    match s.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.chars().take(10).collect(),
        None => "-".to_string(),
    }
}

pub fn format_timestamp(s: &str) -> String {
    match DateTime::parse_from_rfc3339(s.trim()) {
        Ok(dt) => dt.with_timezone(&Utc).format("%Y-%m-%d %H:%M UTC").to_string(),
        Err(_) => s.to_string(),
    }
}

/// Cuts `s` to at most `max` characters, marking the cut with an ellipsis.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out: String = s.chars().take(max - 1).collect();
    out.push('\u{2026}');
    out
}

pub fn pad(s: &str, width: usize, right: bool) -> String {
    let len = s.chars().count();
    if len >= width {
        return s.to_string();
    }
    let fill = " ".repeat(width - len);
    if right {
        format!("{}{}", fill, s)
    } else {
        format!("{}{}", s, fill)
    }
}
