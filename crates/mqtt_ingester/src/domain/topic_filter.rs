/// Match an MQTT topic name against a subscription filter
///
/// `+` matches exactly one level, a trailing `#` matches the rest (including the
/// parent level itself). Levels are compared verbatim, so `/a` and `a` differ.
///
/// # Examples
/// ```
/// use mqtt_ingester::topic_matches;
///
/// assert!(topic_matches("/esp8266/dhtreadings", "/esp8266/dhtreadings"));
/// assert!(topic_matches("sensors/+/dht", "sensors/kitchen/dht"));
/// assert!(topic_matches("sensors/#", "sensors/kitchen/dht"));
/// assert!(!topic_matches("sensors/+", "sensors/kitchen/dht"));
/// ```
pub fn topic_matches(filter: &str, topic: &str) -> bool {
    let mut filter_levels = filter.split('/');
    let mut topic_levels = topic.split('/');

    loop {
        match (filter_levels.next(), topic_levels.next()) {
            (Some("#"), _) => return filter_levels.next().is_none(),
            (Some("+"), Some(_)) => continue,
            (Some(f), Some(t)) if f == t => continue,
            (None, None) => return true,
            _ => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(topic_matches("/esp8266/dhtreadings", "/esp8266/dhtreadings"));
        assert!(!topic_matches("/esp8266/dhtreadings", "/esp8266/other"));
    }

    #[test]
    fn test_leading_slash_is_significant() {
        assert!(!topic_matches("/esp8266/dhtreadings", "esp8266/dhtreadings"));
    }

    #[test]
    fn test_single_level_wildcard() {
        assert!(topic_matches("home/+/dht", "home/kitchen/dht"));
        assert!(!topic_matches("home/+/dht", "home/kitchen/upstairs/dht"));
        assert!(!topic_matches("home/+", "home"));
    }

    #[test]
    fn test_multi_level_wildcard() {
        assert!(topic_matches("home/#", "home/kitchen/dht"));
        assert!(topic_matches("home/#", "home"));
        assert!(topic_matches("#", "anything/at/all"));
        assert!(!topic_matches("home/#", "garden/dht"));
    }

    #[test]
    fn test_hash_must_be_last() {
        assert!(!topic_matches("home/#/dht", "home/kitchen/dht"));
    }

    #[test]
    fn test_longer_topic_does_not_match() {
        assert!(!topic_matches("home/kitchen", "home/kitchen/dht"));
    }
}
