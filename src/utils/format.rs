//! Duration formatting shared by the status display and the history view

/// `HH:MM:SS`, with hours allowed to grow past 99.
pub fn format_clock(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// `D days HH:MM:SS`, with the day segment left out when it is zero.
pub fn format_duration(seconds: u64) -> String {
    let days = seconds / 86_400;
    let clock = format_clock(seconds % 86_400);
    if days == 0 {
        clock
    } else {
        format!("{} days {}", days, clock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_pads_each_segment() {
        assert_eq!(format_clock(0), "00:00:00");
        assert_eq!(format_clock(3_725), "01:02:05");
        assert_eq!(format_clock(360_000), "100:00:00");
    }

    #[test]
    fn duration_omits_zero_days() {
        assert_eq!(format_duration(59), "00:00:59");
        assert_eq!(format_duration(86_399), "23:59:59");
        assert_eq!(format_duration(86_400 + 61), "1 days 00:01:01");
        assert_eq!(format_duration(3 * 86_400 + 7_200), "3 days 02:00:00");
    }
}
