//! Human-readable formatting of times, sizes and rates
//!
//! Used by the text output; the result block itself prints raw numbers so
//! scripts can parse it, while the configuration summary and log lines use
//! these helpers.

use std::time::Duration;

const KIB: f64 = 1024.0;
const MIB: f64 = KIB * 1024.0;
const GIB: f64 = MIB * 1024.0;

/// Bytes per second expressed in MiB per second
#[inline]
pub fn bytes_to_mib(bytes_per_sec: f64) -> f64 {
    bytes_per_sec / MIB
}

/// Format a duration with a unit matching its magnitude
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use iostress::util::time::format_duration;
///
/// assert_eq!(format_duration(Duration::from_nanos(500)), "500ns");
/// assert_eq!(format_duration(Duration::from_micros(250)), "250.00us");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();

    match nanos {
        0..=999 => format!("{}ns", nanos),
        1_000..=999_999 => format!("{:.2}us", nanos as f64 / 1e3),
        1_000_000..=999_999_999 => format!("{:.2}ms", nanos as f64 / 1e6),
        _ => format!("{:.2}s", nanos as f64 / 1e9),
    }
}

/// Format a latency given in seconds (as the meters store it)
pub fn format_secs(secs: f64) -> String {
    if !secs.is_finite() || secs < 0.0 {
        return format!("{}s", secs);
    }
    format_duration(Duration::from_secs_f64(secs))
}

/// Format a byte count with binary units
///
/// # Examples
///
/// ```
/// use iostress::util::time::format_size;
///
/// assert_eq!(format_size(512), "512B");
/// assert_eq!(format_size(65536), "64KiB");
/// assert_eq!(format_size(1536), "1.50KiB");
/// ```
pub fn format_size(bytes: u64) -> String {
    let value = bytes as f64;
    let (scaled, unit) = if value >= GIB {
        (value / GIB, "GiB")
    } else if value >= MIB {
        (value / MIB, "MiB")
    } else if value >= KIB {
        (value / KIB, "KiB")
    } else {
        return format!("{}B", bytes);
    };

    if scaled.fract() == 0.0 {
        format!("{}{}", scaled as u64, unit)
    } else {
        format!("{:.2}{}", scaled, unit)
    }
}

/// Format an operation rate with decimal suffixes
pub fn format_rate(rate: f64) -> String {
    if rate < 1e3 {
        format!("{:.0}", rate)
    } else if rate < 1e6 {
        format!("{:.2}K", rate / 1e3)
    } else if rate < 1e9 {
        format!("{:.2}M", rate / 1e6)
    } else {
        format!("{:.2}G", rate / 1e9)
    }
}
