//! Human readable formatting helpers.

/// Convert bytes into a human readable string (e.g. "1.4 GB").
pub fn bytes_to_string(size: u64) -> String {
    if size == 1 {
        return "1 byte".to_string();
    }

    const SUFFIXES: &[(&str, usize)] = &[
        ("bytes", 0),
        ("KB", 0),
        ("MB", 1),
        ("GB", 2),
        ("TB", 2),
        ("PB", 2),
    ];

    let mut num = size as f64;
    let mut unit = SUFFIXES[0];
    for (i, suffix) in SUFFIXES.iter().enumerate() {
        unit = *suffix;
        if num < 1024.0 || i == SUFFIXES.len() - 1 {
            break;
        }
        num /= 1024.0;
    }

    let (suffix, precision) = unit;
    if precision == 0 {
        format!("{} {}", num as u64, suffix)
    } else {
        format!("{:.*} {}", precision, num, suffix)
    }
}

/// Convert milliseconds to `HH:MM:SS`.
pub fn millis_to_string(millis: u64) -> String {
    let total_secs = millis / 1000;
    format!(
        "{:02}:{:02}:{:02}",
        total_secs / 3600,
        (total_secs / 60) % 60,
        total_secs % 60
    )
}

/// Convert kilobits per second to Kbps or Mbps.
pub fn kbps_to_string(kbps: u64) -> String {
    if kbps < 1024 {
        format!("{} Kbps", kbps)
    } else {
        format!("{:.2} Mbps", kbps as f64 / 1024.0)
    }
}

/// Bytes to gigabytes, for the run summary.
pub fn bytes_to_gb(size: u64) -> f64 {
    size as f64 / (1024.0 * 1024.0 * 1024.0)
}

/// Format an integer with thousands separators.
pub fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if value < 0 {
        format!("-{}", out)
    } else {
        out
    }
}

/// Keep the last three components of a path, e.g.
/// `/mnt/media/Movies/Heat (1995)/Heat.mkv` -> `/Movies/Heat (1995)/Heat.mkv`.
pub fn shorten_path(path: &str) -> String {
    let components: Vec<&str> = path
        .split(['/', '\\'])
        .filter(|c| !c.is_empty())
        .collect();
    let start = components.len().saturating_sub(3);
    format!("/{}", components[start..].join("/"))
}
