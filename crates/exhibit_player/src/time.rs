//! 时间显示与进度计算

/// 时长未知时的占位文本
pub const UNKNOWN_TIME: &str = "--:--";

/// 格式化为 `m:ss`，分钟不补零
pub fn format_time(seconds: f64) -> String {
    let seconds = if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    };
    let minutes = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{}:{:02}", minutes, secs)
}

/// 总时长显示；为 0、NaN 或无穷时显示 `--:--`
pub fn format_total(duration: f64) -> String {
    if duration.is_finite() && duration > 0.0 {
        format_time(duration)
    } else {
        UNKNOWN_TIME.to_string()
    }
}

/// 播放进度百分比，时长未知时为 0
pub fn progress_percentage(current: f64, duration: f64) -> f64 {
    if duration.is_finite() && duration > 0.0 {
        current / duration * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(65.0), "1:05");
        assert_eq!(format_time(59.99), "0:59");
        assert_eq!(format_time(3600.0), "60:00");
        assert_eq!(format_time(f64::NAN), "0:00");
    }

    #[test]
    fn test_format_total_unknown() {
        assert_eq!(format_total(0.0), UNKNOWN_TIME);
        assert_eq!(format_total(f64::NAN), UNKNOWN_TIME);
        assert_eq!(format_total(f64::INFINITY), UNKNOWN_TIME);
        assert_eq!(format_total(125.4), "2:05");
    }

    #[test]
    fn test_progress_percentage() {
        assert_eq!(progress_percentage(10.0, 0.0), 0.0);
        assert_eq!(progress_percentage(10.0, f64::NAN), 0.0);
        assert_eq!(progress_percentage(30.0, 120.0), 25.0);
        assert_eq!(progress_percentage(120.0, 120.0), 100.0);
    }
}
