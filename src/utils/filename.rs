//! Filenames for saved videos

/// Extension appended to every saved video.
pub const VIDEO_EXTENSION: &str = "mp4";

/// Longest stem kept, in bytes; leaves room for the extension under the
/// usual 255-byte name limit
const MAX_STEM_BYTES: usize = 200;

/// Turns a video title into a single path component.
///
/// Spaces become underscores. Characters that are invalid on common
/// filesystems (including path separators) are replaced the same way, and
/// leading dots are dropped so a title can never name a hidden file or
/// climb out of the downloads directory. Long titles are cut to
/// 200 bytes on a character boundary.
///
/// # Examples
/// ```
/// use tubefetch::utils::filename::sanitize_title;
/// assert_eq!(sanitize_title("Never Gonna Give You Up"), "Never_Gonna_Give_You_Up");
/// assert_eq!(sanitize_title("AC/DC: Live"), "AC_DC__Live");
/// ```
pub fn sanitize_title(title: &str) -> String {
    let invalid_chars = ['/', '\\', ':', '*', '?', '"', '<', '>', '|', '\0'];

    let sanitized: String = title
        .chars()
        .map(|c| {
            if c == ' ' || invalid_chars.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect();

    let sanitized = sanitized.trim_start_matches('.');
    if sanitized.is_empty() {
        return "video".to_string();
    }

    truncate_on_char_boundary(sanitized, MAX_STEM_BYTES).to_string()
}

fn truncate_on_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// File name used for a downloaded video: sanitized title plus `.mp4`.
pub fn download_file_name(title: &str) -> String {
    format!("{}.{}", sanitize_title(title), VIDEO_EXTENSION)
}
