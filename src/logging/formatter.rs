//! 控制台日志格式化器

use chrono::{DateTime, Local};
use std::fmt;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::{format::Writer, FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

const RESET: &str = "\x1b[0m";
const GREY: &str = "\x1b[90m";

/// 设备群日志格式化器
///
/// 输出格式：`时间 [级别] 图标 目标 消息`
pub struct FleetFormatter {
    /// 是否启用彩色输出
    colored: bool,
}

impl FleetFormatter {
    /// 创建新的格式化器
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    fn paint(&self, color: &'static str) -> &'static str {
        if self.colored {
            color
        } else {
            ""
        }
    }
}

/// 根据日志目标选择图标和颜色
fn target_style(target: &str) -> (&'static str, &'static str) {
    match target {
        "fleet" => ("⛏️", "\x1b[32m"),
        "device" => ("🔧", "\x1b[34m"),
        "pool" => ("🌊", "\x1b[36m"),
        "market" => ("💱", "\x1b[33m"),
        _ => ("📝", "\x1b[37m"),
    }
}

fn level_color(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "\x1b[31m",
        Level::WARN => "\x1b[33m",
        Level::INFO => "\x1b[32m",
        Level::DEBUG => "\x1b[36m",
        Level::TRACE => "\x1b[37m",
    }
}

impl<S, N> FormatEvent<S, N> for FleetFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        let target = metadata.target();
        let (icon, color) = target_style(target);
        let reset = self.paint(RESET);

        let now: DateTime<Local> = Local::now();
        write!(writer, "{}{}{} ", self.paint(GREY), now.format("%Y-%m-%d %H:%M:%S%.3f"), reset)?;
        write!(writer, "{}[{:>5}]{} ", self.paint(level_color(metadata.level())), metadata.level(), reset)?;

        // 模块路径只保留 crate 名
        let short_target = target.split("::").next().unwrap_or(target);
        write!(writer, "{}{} {}{} ", self.paint(color), icon, short_target.to_uppercase(), reset)?;

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
