// src/core/sanitize.rs

pub fn normalize_entities(s: &str) -> String {
    s.replace('\u{a0}', " ")
}

/// Collapse runs of whitespace into one space and trim.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/// Parse the longest numeric prefix of `s`, after leading whitespace.
///
/// "2" -> 2.0, " 1.5 " -> 1.5, "3*" -> 3.0, ".5" -> 0.5, "1e2x" -> 100.0.
/// Returns None when no digits start the text ("-", "", "DNP").
pub fn parse_leading_float(s: &str) -> Option<f64> {
    let t = s.trim_start();
    let b = t.as_bytes();
    let mut i = 0usize;

    if matches!(b.first(), Some(b'+' | b'-')) { i += 1; }

    let int_start = i;
    while i < b.len() && b[i].is_ascii_digit() { i += 1; }
    let mut digits = i - int_start;

    if i < b.len() && b[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < b.len() && b[j].is_ascii_digit() { j += 1; }
        digits += j - frac_start;
        if digits > 0 { i = j; }
    }
    if digits == 0 { return None; }

    // Exponent only counts when at least one digit follows it.
    if i < b.len() && (b[i] == b'e' || b[i] == b'E') {
        let mut j = i + 1;
        if matches!(b.get(j), Some(b'+' | b'-')) { j += 1; }
        let exp_start = j;
        while j < b.len() && b[j].is_ascii_digit() { j += 1; }
        if j > exp_start { i = j; }
    }

    t[..i].parse::<f64>().ok()
}
