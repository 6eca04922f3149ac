//! 实用工具模块
//!
//! 算力、百分比等展示用的格式化函数

pub mod display;
pub mod hashrate_formatter;

// 重新导出常用函数
pub use display::{
    blank_if_zero, fan_text, format_percent, hardware_error_percent_text, temperature_text,
};
pub use hashrate_formatter::format_hashrate;

/// 算力显示宏
///
/// ```
/// use multiminer_rs::hashrate;
///
/// assert_eq!(hashrate!(1234567890.0), "1.235 GH/s");
/// ```
#[macro_export]
macro_rules! hashrate {
    ($hashrate:expr) => {
        $crate::utils::format_hashrate($hashrate)
    };
}
