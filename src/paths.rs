//! Path segment handling for layer lookups.
//!
//! Pure string manipulation, no filesystem I/O. Free-text identifiers (game
//! names, model file names) become safe segments here before they are joined
//! onto the config root.

use regex_lite::Regex;
use std::sync::LazyLock;

/// Characters that are unsafe in a topic file name.
static RESERVED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[:&#\\/?@+|=,]").expect("reserved character class is a valid regex")
});

/// Replace every reserved character with `_`.
///
/// ```
/// use stream_config::paths::sanitize_segment;
/// assert_eq!(sanitize_segment("Ratchet & Clank: Rift Apart"), "Ratchet _ Clank_ Rift Apart");
/// ```
pub fn sanitize_segment(name: &str) -> String {
    RESERVED.replace_all(name, "_").into_owned()
}

/// File name without its extension. Everything from the first `.` is dropped,
/// so `model.vrm.json` becomes `model`.
pub fn strip_extension(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}

/// Join a layout directory and file name into a `/`-separated locator.
/// An empty directory places the file at the root.
pub fn join_locator(dir: &str, file: &str) -> String {
    let dir = dir.trim_matches('/');
    if dir.is_empty() {
        file.to_string()
    } else {
        format!("{}/{}", dir, file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_replaces_each_reserved_char() {
        assert_eq!(sanitize_segment(r":&#\/?@+|=,"), "___________");
        assert_eq!(sanitize_segment("Hades II"), "Hades II");
    }

    #[test]
    fn test_strip_extension() {
        assert_eq!(strip_extension("panda.vrm"), "panda");
        assert_eq!(strip_extension("panda"), "panda");
        assert_eq!(strip_extension("panda.v2.vrm"), "panda");
        assert_eq!(strip_extension(""), "");
    }

    #[test]
    fn test_join_locator() {
        assert_eq!(join_locator("games", "x.json"), "games/x.json");
        assert_eq!(join_locator("", "x.json"), "x.json");
        assert_eq!(join_locator("/day/", "Monday.json"), "day/Monday.json");
    }
}
