//! URL and duration parsing helpers for YouTube resources

use url::Url;

/// Reference to a channel extracted from a channel URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelRef {
    /// `@handle` style reference; needs a search lookup to resolve the id
    Handle(String),

    /// Direct `UC...` channel id
    Id(String),
}

/// Extract the video id from the common YouTube URL shapes:
/// `watch?v=`, `youtu.be/`, `/shorts/`, `/embed/`.
pub fn extract_video_id(video_url: &str) -> Option<String> {
    let url = Url::parse(video_url).ok()?;
    let host = url.host_str()?;

    if host.ends_with("youtu.be") {
        return url
            .path_segments()
            .and_then(|mut segments| segments.next())
            .filter(|id| !id.is_empty())
            .map(str::to_string);
    }

    if let Some(id) = url
        .query_pairs()
        .find(|(key, _)| key == "v")
        .map(|(_, value)| value.to_string())
    {
        return Some(id);
    }

    let segments: Vec<&str> = url.path_segments()?.collect();
    match segments.as_slice() {
        ["shorts", id, ..] | ["embed", id, ..] if !id.is_empty() => Some((*id).to_string()),
        _ => None,
    }
}

/// Extract a channel reference from `/@handle` or `/channel/<id>` URLs
pub fn parse_channel_ref(channel_url: &str) -> Option<ChannelRef> {
    let url = Url::parse(channel_url).ok()?;
    let segments: Vec<&str> = url.path_segments()?.collect();

    match segments.as_slice() {
        [handle, ..] if handle.starts_with('@') && handle.len() > 1 => {
            Some(ChannelRef::Handle(handle[1..].to_string()))
        }
        ["channel", id, ..] if !id.is_empty() => Some(ChannelRef::Id((*id).to_string())),
        _ => None,
    }
}

/// Parse an ISO-8601 duration (`PT1H2M3S`, `P1DT2H`) into seconds.
///
/// Only day/hour/minute/second designators are supported; anything else
/// (months, years) returns `None`.
pub fn parse_duration_seconds(duration: &str) -> Option<u64> {
    let rest = duration.strip_prefix('P')?;

    let mut seconds: u64 = 0;
    let mut number = String::new();
    let mut in_time = false;
    let mut saw_component = false;

    for c in rest.chars() {
        match c {
            'T' => {
                if !number.is_empty() {
                    return None;
                }
                in_time = true;
            }
            '0'..='9' => number.push(c),
            'D' if !in_time => {
                seconds += number.parse::<u64>().ok()? * 86_400;
                number.clear();
                saw_component = true;
            }
            'H' if in_time => {
                seconds += number.parse::<u64>().ok()? * 3_600;
                number.clear();
                saw_component = true;
            }
            'M' if in_time => {
                seconds += number.parse::<u64>().ok()? * 60;
                number.clear();
                saw_component = true;
            }
            'S' if in_time => {
                seconds += number.parse::<u64>().ok()?;
                number.clear();
                saw_component = true;
            }
            _ => return None,
        }
    }

    if !number.is_empty() || !saw_component {
        return None;
    }

    Some(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_watch_urls() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=abc123&t=42s"),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn extracts_short_urls() {
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn extracts_shorts_and_embed_urls() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/shorts/xyz789"),
            Some("xyz789".to_string())
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/xyz789"),
            Some("xyz789".to_string())
        );
    }

    #[test]
    fn rejects_unrecognized_video_urls() {
        assert_eq!(extract_video_id("https://www.youtube.com/"), None);
        assert_eq!(extract_video_id("not a url"), None);
        assert_eq!(extract_video_id("https://example.com/watch"), None);
    }

    #[test]
    fn parses_handle_channel_urls() {
        assert_eq!(
            parse_channel_ref("https://www.youtube.com/@somecreator"),
            Some(ChannelRef::Handle("somecreator".to_string()))
        );
        assert_eq!(
            parse_channel_ref("https://www.youtube.com/@somecreator?tab=videos"),
            Some(ChannelRef::Handle("somecreator".to_string()))
        );
    }

    #[test]
    fn parses_channel_id_urls() {
        assert_eq!(
            parse_channel_ref("https://www.youtube.com/channel/UCabc123"),
            Some(ChannelRef::Id("UCabc123".to_string()))
        );
    }

    #[test]
    fn rejects_unrecognized_channel_urls() {
        assert_eq!(parse_channel_ref("https://www.youtube.com/watch?v=abc"), None);
        assert_eq!(parse_channel_ref("nope"), None);
    }

    #[test]
    fn parses_iso8601_durations() {
        assert_eq!(parse_duration_seconds("PT3M20S"), Some(200));
        assert_eq!(parse_duration_seconds("PT1H2M3S"), Some(3723));
        assert_eq!(parse_duration_seconds("PT45S"), Some(45));
        assert_eq!(parse_duration_seconds("P1DT2H"), Some(93600));
        assert_eq!(parse_duration_seconds("PT0S"), Some(0));
    }

    #[test]
    fn rejects_malformed_durations() {
        assert_eq!(parse_duration_seconds(""), None);
        assert_eq!(parse_duration_seconds("PT"), None);
        assert_eq!(parse_duration_seconds("P3M"), None); // months unsupported
        assert_eq!(parse_duration_seconds("3M20S"), None);
        assert_eq!(parse_duration_seconds("PT5X"), None);
    }
}
