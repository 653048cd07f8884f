//! Clock rendering for timer displays

/// Render seconds as "MM:SS", or "H:MM:SS" once the hour mark is passed
pub fn format_clock(seconds: u64) -> String {
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(90), "01:30");
        assert_eq!(format_clock(720), "12:00");
        assert_eq!(format_clock(3599), "59:59");
        assert_eq!(format_clock(3661), "1:01:01");
    }
}
