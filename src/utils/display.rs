//! 详情视图用到的文本格式化

/// worker 硬件错误率低于此值时不显示
const HARDWARE_ERROR_DISPLAY_THRESHOLD: f64 = 0.05;

/// 百分比，最多一位小数，整数时省略小数部分
pub fn format_percent(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{:.0}%", rounded)
    } else {
        format!("{:.1}%", rounded)
    }
}

/// worker 的硬件错误率文本
pub fn hardware_error_percent_text(value: f64) -> String {
    if value >= HARDWARE_ERROR_DISPLAY_THRESHOLD {
        format_percent(value)
    } else {
        String::new()
    }
}

/// 温度文本，没有读数时为空
pub fn temperature_text(temperature: f64) -> String {
    if temperature > 0.0 {
        format!("{}°", temperature)
    } else {
        String::new()
    }
}

/// 风扇转速文本，没有读数时为空
pub fn fan_text(fan_percent: f64) -> String {
    if fan_percent > 0.0 {
        format!("{}%", fan_percent)
    } else {
        String::new()
    }
}

/// 计数为零时显示为空
pub fn blank_if_zero(count: u64) -> String {
    if count == 0 {
        String::new()
    } else {
        count.to_string()
    }
}
