//! Picking the format to download

use crate::extractor::models::Format;
use crate::utils::error::FetchError;

/// Highest-resolution format that carries an audio track.
///
/// Formats without audio are ignored, as are manifest formats (HLS, DASH)
/// whose URL is a playlist rather than the media. Among the rest the tallest
/// wins; on a tie the earlier entry is kept, so the result follows the order
/// the extractor reported.
pub fn select_best_audio_format(formats: &[Format]) -> Result<&Format, FetchError> {
    let mut best: Option<&Format> = None;
    for format in formats
        .iter()
        .filter(|f| f.has_audio() && f.is_progressive())
    {
        match best {
            Some(current) if format.height_or_zero() <= current.height_or_zero() => {}
            _ => best = Some(format),
        }
    }
    best.ok_or(FetchError::NoAudioFormats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(id: &str, height: Option<u32>, audio: bool) -> Format {
        Format {
            format_id: id.to_string(),
            ext: "mp4".to_string(),
            height,
            acodec: Some(if audio { "mp4a.40.2" } else { "none" }.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_skips_audioless_higher_resolution() {
        let formats = vec![
            format("240p", Some(240), true),
            format("720p", Some(720), true),
            format("1080p", Some(1080), false),
        ];
        let best = select_best_audio_format(&formats).unwrap();
        assert_eq!(best.format_id, "720p");
    }

    #[test]
    fn test_skips_playlist_formats() {
        let json = r#"[
            {"format_id": "18", "protocol": "https", "acodec": "mp4a.40.2", "height": 360,
             "url": "https://rr1---sn-abc.googlevideo.com/videoplayback?itag=18"},
            {"format_id": "96", "protocol": "m3u8_native", "acodec": "mp4a.40.2", "height": 1080,
             "url": "https://manifest.googlevideo.com/api/manifest/hls_playlist/itag/96/index.m3u8"},
            {"format_id": "137", "protocol": "https", "acodec": "none", "height": 1080,
             "url": "https://rr1---sn-abc.googlevideo.com/videoplayback?itag=137"}
        ]"#;
        let formats: Vec<Format> = serde_json::from_str(json).unwrap();

        let best = select_best_audio_format(&formats).unwrap();
        assert_eq!(best.format_id, "18");
    }

    #[test]
    fn test_only_playlist_formats() {
        let mut hls = format("95", Some(720), true);
        hls.protocol = Some("m3u8_native".to_string());
        assert!(matches!(
            select_best_audio_format(&[hls]),
            Err(FetchError::NoAudioFormats)
        ));
    }

    #[test]
    fn test_first_seen_wins_on_tie() {
        let formats = vec![
            format("first", Some(480), true),
            format("second", Some(480), true),
        ];
        assert_eq!(select_best_audio_format(&formats).unwrap().format_id, "first");
    }

    #[test]
    fn test_missing_height_counts_as_zero() {
        let formats = vec![format("audio-only", None, true), format("144p", Some(144), true)];
        assert_eq!(select_best_audio_format(&formats).unwrap().format_id, "144p");

        let formats = vec![format("audio-only", None, true)];
        assert_eq!(
            select_best_audio_format(&formats).unwrap().format_id,
            "audio-only"
        );
    }

    #[test]
    fn test_no_audio_formats() {
        let formats = vec![format("1080p", Some(1080), false)];
        assert!(matches!(
            select_best_audio_format(&formats),
            Err(FetchError::NoAudioFormats)
        ));
        assert!(matches!(
            select_best_audio_format(&[]),
            Err(FetchError::NoAudioFormats)
        ));
    }
}
