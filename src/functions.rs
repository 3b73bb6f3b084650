use chrono::DateTime;
use chrono_tz::Tz;

pub(crate) fn build_reqwest_client() -> anyhow::Result<reqwest::Client> {
    Ok(reqwest::ClientBuilder::new()
        .timeout(std::time::Duration::from_secs(10))
        .build()?)
}

pub fn timestamp_to_string(timestamp: i64, timezone: Tz) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|time| {
            time.with_timezone(&timezone)
                .format("%Y-%m-%d %H:%M:%S %Z")
                .to_string()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_timestamp_to_string() {
        assert_eq!(
            timestamp_to_string(1_700_000_000, chrono_tz::UTC),
            "2023-11-14 22:13:20 UTC"
        );
        assert_eq!(
            timestamp_to_string(1_700_000_000, chrono_tz::Asia::Taipei),
            "2023-11-15 06:13:20 CST"
        );
    }
}
