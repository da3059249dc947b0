/// Format `value` with `decimals` fixed decimal places and comma-grouped
/// whole part.
///
/// Values that round to zero print without a sign.
///
/// ```
/// use recap_core::formatting::format_decimal;
///
/// assert_eq!(format_decimal(1234.5, 1), "1,234.5");
/// assert_eq!(format_decimal(1234567.0, 0), "1,234,567");
/// assert_eq!(format_decimal(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_decimal(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (whole, fraction) = match fixed.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::with_capacity(fixed.len() + whole.len() / 3 + 1);
    if value.is_sign_negative() && fixed.bytes().any(|b| matches!(b, b'1'..=b'9')) {
        out.push('-');
    }
    out.push_str(&group_thousands(whole));
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

/// Format an integer count with thousands separators.
///
/// ```
/// use recap_core::formatting::format_count;
///
/// assert_eq!(format_count(0), "0");
/// assert_eq!(format_count(12_345), "12,345");
/// ```
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// Format a listening time given in minutes.
///
/// * `< 60` minutes → `"45m"`
/// * whole hours → `"3h"`
/// * otherwise → `"1,204h 7m"`
///
/// ```
/// use recap_core::formatting::format_listening_time;
///
/// assert_eq!(format_listening_time(45.0), "45m");
/// assert_eq!(format_listening_time(180.0), "3h");
/// assert_eq!(format_listening_time(225.0), "3h 45m");
/// ```
pub fn format_listening_time(minutes: f64) -> String {
    let total_mins = minutes.round().max(0.0) as u64;
    if total_mins < 60 {
        return format!("{}m", total_mins);
    }
    let hours = format_count(total_mins / 60);
    match total_mins % 60 {
        0 => format!("{}h", hours),
        mins => format!("{}h {}m", hours, mins),
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Split a run of digits into comma-separated groups of three, counted from
/// the right.
fn group_thousands(digits: &str) -> String {
    let mut groups: Vec<&str> = Vec::with_capacity(digits.len() / 3 + 1);
    let mut end = digits.len();
    while end > 3 {
        groups.push(&digits[end - 3..end]);
        end -= 3;
    }
    groups.push(&digits[..end]);
    groups.reverse();
    groups.join(",")
}

// ── Tests ──────────────────────────────────────────────────────────────────────
