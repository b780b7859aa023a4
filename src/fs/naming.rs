//! Filename generation and sanitisation.

use crate::media::MediaExtension;

/// Maximum length (in characters) of a sanitised name.
pub const MAX_NAME_LENGTH: usize = 100;

/// Owner name used when the producer supplies none.
pub const DEFAULT_OWNER: &str = "threads-user";

/// Make free text safe for use as a single path segment.
///
/// Filesystem-hostile characters become `_`, every `..` becomes `_`, leading
/// dots are dropped and the result is cut to [`MAX_NAME_LENGTH`] characters.
/// Applying it twice gives the same result as applying it once.
pub fn sanitize_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '?' | '*' | '|' | '<' | '>' | ':' | '"' => '_',
            c => c,
        })
        .collect();

    let collapsed = replaced.replace("..", "_");

    collapsed
        .trim_start_matches('.')
        .chars()
        .take(MAX_NAME_LENGTH)
        .collect()
}

/// Sanitise an owner name, falling back to [`DEFAULT_OWNER`] when nothing
/// usable remains.
pub fn sanitize_owner(name: &str) -> String {
    let sanitized = sanitize_name(name.trim());
    if sanitized.trim().is_empty() {
        DEFAULT_OWNER.to_string()
    } else {
        sanitized
    }
}

/// Build `<owner>_<index>_of_<total>.<ext>`, zero-padding the index to the
/// digit count of `total` so files sort in batch order.
pub fn media_file_name(owner: &str, index: u32, total: u32, extension: MediaExtension) -> String {
    let width = total.to_string().len();
    format!(
        "{}_{:0width$}_of_{}.{}",
        owner,
        index,
        total,
        extension,
        width = width
    )
}
