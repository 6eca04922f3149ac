//! 算力格式化
//!
//! 根据数值大小自动选择单位，显示值保持在 1-999 之间。

/// 单位表，从大到小
const UNITS: [(f64, &str); 5] = [
    (1_000_000_000_000_000.0, "PH/s"),
    (1_000_000_000_000.0, "TH/s"),
    (1_000_000_000.0, "GH/s"),
    (1_000_000.0, "MH/s"),
    (1_000.0, "KH/s"),
];

/// 格式化算力（输入单位 H/s）
///
/// ```
/// use multiminer_rs::utils::hashrate_formatter::format_hashrate;
///
/// assert_eq!(format_hashrate(1234.0), "1.234 KH/s");
/// assert_eq!(format_hashrate(250.0), "250.0 H/s");
/// ```
pub fn format_hashrate(hashrate: f64) -> String {
    if hashrate.is_nan() || hashrate <= 0.0 {
        return "0 H/s".to_string();
    }

    if hashrate.is_infinite() {
        return "∞ H/s".to_string();
    }

    let (value, unit) = UNITS
        .iter()
        .find(|(scale, _)| hashrate >= *scale)
        .map(|(scale, unit)| (hashrate / scale, *unit))
        .unwrap_or((hashrate, "H/s"));

    // 数值越大保留的小数越少
    if value >= 100.0 {
        format!("{:.1} {}", value, unit)
    } else if value >= 10.0 {
        format!("{:.2} {}", value, unit)
    } else {
        format!("{:.3} {}", value, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_hashrate() {
        assert_eq!(format_hashrate(0.0), "0 H/s");
        assert_eq!(format_hashrate(250.0), "250.0 H/s");
        assert_eq!(format_hashrate(5.0), "5.000 H/s");
        assert_eq!(format_hashrate(1234.0), "1.234 KH/s");
        assert_eq!(format_hashrate(1234567.0), "1.235 MH/s");
        assert_eq!(format_hashrate(1234567890.0), "1.235 GH/s");
        assert_eq!(format_hashrate(15_000_000_000_000.0), "15.00 TH/s");
    }

    #[test]
    fn test_format_hashrate_invalid_input() {
        assert_eq!(format_hashrate(-10.0), "0 H/s");
        assert_eq!(format_hashrate(f64::NAN), "0 H/s");
        assert_eq!(format_hashrate(f64::INFINITY), "∞ H/s");
    }
}
