//! Media URL acceptance policy.

use url::Url;

/// Host fragments a media URL must contain (CDN and Threads hosts).
const ALLOWED_HOST_FRAGMENTS: &[&str] = &[
    "scontent",
    "fbcdn",
    "instagram",
    "cdn",
    "threads.net",
    "threads.com",
];

/// File extensions recognised as media.
const MEDIA_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "mp4", "webm", "mov"];

/// Path segments recognised as media endpoints.
const MEDIA_PATH_SEGMENTS: &[&str] = &["/image/", "/video/", "/media/"];

/// Check whether a candidate URL may be downloaded.
///
/// Only `https` URLs on an allow-listed host are accepted, and the URL must
/// either end in a media file extension or contain a media path segment.
/// The check is pure: no network access, no side effects.
pub fn is_acceptable_media_url(url: &str) -> bool {
    if url.trim().is_empty() {
        return false;
    }

    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => return false,
    };

    if parsed.scheme() != "https" {
        return false;
    }

    let host = match parsed.host_str() {
        Some(host) => host.to_ascii_lowercase(),
        None => return false,
    };

    if !ALLOWED_HOST_FRAGMENTS
        .iter()
        .any(|fragment| host.contains(fragment))
    {
        return false;
    }

    has_media_extension(url, &parsed) || MEDIA_PATH_SEGMENTS.iter().any(|seg| url.contains(seg))
}

/// The URL ends in a media extension, either on its path or on the raw string.
fn has_media_extension(raw: &str, parsed: &Url) -> bool {
    let path = parsed.path().to_ascii_lowercase();
    let raw = raw.to_ascii_lowercase();

    MEDIA_EXTENSIONS.iter().any(|ext| {
        let suffix = format!(".{}", ext);
        path.ends_with(&suffix) || raw.ends_with(&suffix)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_cdn_media() {
        assert!(is_acceptable_media_url(
            "https://cdn.example/scontent/a.jpg"
        ));
        assert!(is_acceptable_media_url(
            "https://scontent-lhr8-1.cdninstagram.com/v/t51/123_n.jpg?stp=dst&_nc_ht=x"
        ));
        assert!(is_acceptable_media_url(
            "https://video.fbcdn.net/o1/v/t2/f2/m69/clip.MP4"
        ));
        assert!(is_acceptable_media_url(
            "https://www.threads.net/media/abc?x=1"
        ));
    }

    #[test]
    fn test_rejects_non_https() {
        assert!(!is_acceptable_media_url("http://cdn.example/a.jpg"));
        assert!(!is_acceptable_media_url("ftp://cdn.example/a.jpg"));
        assert!(!is_acceptable_media_url("file:///etc/cdn/a.jpg"));
    }

    #[test]
    fn test_rejects_disallowed_host() {
        assert!(!is_acceptable_media_url("https://evil.example/a.jpg"));
        assert!(!is_acceptable_media_url("https://example.com/image/a"));
    }

    #[test]
    fn test_rejects_without_media_marker() {
        assert!(!is_acceptable_media_url("https://cdn.example/page.html"));
        assert!(!is_acceptable_media_url("https://cdn.example/"));
        assert!(!is_acceptable_media_url("https://cdn.example/a.jpg.exe"));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(!is_acceptable_media_url(""));
        assert!(!is_acceptable_media_url("   "));
        assert!(!is_acceptable_media_url("not a url"));
    }
}
