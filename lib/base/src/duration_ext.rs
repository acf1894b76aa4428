use std::time::Duration;

/// Race timer text, `mm:ss.cc` or `hh:mm:ss.cc` for long races.
pub trait DurationToRaceStr {
    fn to_race_string(&self) -> String;
}

impl DurationToRaceStr for Duration {
    fn to_race_string(&self) -> String {
        let secs = self.as_secs();
        let hundredths = self.subsec_millis() / 10;
        let (hours, minutes, seconds) = (secs / 3600, (secs / 60) % 60, secs % 60);
        if hours > 0 {
            format!("{hours:0>2}:{minutes:0>2}:{seconds:0>2}.{hundredths:0>2}")
        } else {
            format!("{minutes:0>2}:{seconds:0>2}.{hundredths:0>2}")
        }
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::DurationToRaceStr;

    #[test]
    fn race_strings() {
        assert_eq!(Duration::ZERO.to_race_string(), "00:00.00");
        assert_eq!(Duration::from_millis(62_345).to_race_string(), "01:02.34");
        assert_eq!(Duration::from_secs(3600 + 5).to_race_string(), "01:00:05.00");
    }
}
