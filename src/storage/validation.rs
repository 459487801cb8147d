//! Filename validation
//!
//! Extension allow-list checks and path traversal sanitization.

use std::collections::BTreeSet;

use crate::config::StorageConfig;

/// Returns the lowercased text after the last `.`, if any
pub fn extension_of(name: &str) -> Option<String> {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

/// True iff `name` has an extension contained in `extensions`
pub fn is_allowed(name: &str, extensions: &BTreeSet<String>) -> bool {
    extension_of(name).is_some_and(|ext| extensions.contains(&ext))
}

/// True iff `name` may be persisted as a media file
pub fn is_media(name: &str, config: &StorageConfig) -> bool {
    is_allowed(name, &config.media_extensions)
}

/// True iff `name` is an archive container accepted at intake
pub fn is_archive(name: &str, config: &StorageConfig) -> bool {
    is_allowed(name, &config.archive_extensions)
}

/// True iff `name` is accepted at intake (media or archive container)
pub fn is_intake(name: &str, config: &StorageConfig) -> bool {
    is_media(name, config) || is_archive(name, config)
}

/// Sanitize a client-supplied filename so it cannot leave its parent directory.
///
/// Path components are flattened into one name, `.`/`..` components are
/// dropped, and anything outside `[A-Za-z0-9._-]` becomes `_`. The result may
/// be empty, in which case the name must be rejected.
pub fn sanitize_filename(name: &str) -> String {
    let joined = name
        .split(['/', '\\'])
        .filter(|part| !part.is_empty() && *part != "." && *part != "..")
        .collect::<Vec<_>>()
        .join("_");

    let cleaned: String = joined
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    cleaned.trim_start_matches(['.', '_']).to_string()
}

/// Sanitize `name` and return it only if it is an allowed media filename
pub fn validated_media_name(name: &str, config: &StorageConfig) -> Option<String> {
    let clean = sanitize_filename(name);
    (!clean.is_empty() && is_media(&clean, config)).then_some(clean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn storage() -> StorageConfig {
        AppConfig::defaults_with_root("uploads").unwrap().storage
    }

    #[test]
    fn media_extensions_are_allowed() {
        let config = storage();
        for name in ["a.png", "b.jpg", "c.jpeg", "d.gif", "holiday.photo.jpg"] {
            assert!(is_media(name, &config), "{name} should be allowed");
        }
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        let config = storage();
        assert!(is_media("A.PNG", &config));
        assert!(is_media("shot.JpEg", &config));
    }

    #[test]
    fn other_extensions_are_rejected() {
        let config = storage();
        for name in ["readme.txt", "noextension", "archive.zip", "image.png.exe", "png", "trailing."] {
            assert!(!is_media(name, &config), "{name} should be rejected");
        }
    }

    #[test]
    fn archives_pass_intake_but_not_media() {
        let config = storage();
        assert!(is_intake("bundle.ZIP", &config));
        assert!(is_archive("bundle.zip", &config));
        assert!(!is_media("bundle.zip", &config));
        assert!(!is_intake("notes.txt", &config));
    }

    #[test]
    fn sanitize_removes_traversal() {
        let clean = sanitize_filename("../../etc/passwd");
        assert_eq!(clean, "etc_passwd");
        assert!(!clean.contains(".."));
        assert!(!clean.contains('/'));
    }

    #[test]
    fn sanitize_handles_windows_separators_and_odd_characters() {
        assert_eq!(sanitize_filename("..\\..\\boot.ini"), "boot.ini");
        assert_eq!(sanitize_filename("my photo (1).jpg"), "my_photo__1_.jpg");
        assert_eq!(sanitize_filename(".hidden.png"), "hidden.png");
        assert_eq!(sanitize_filename("plain.gif"), "plain.gif");
    }

    #[test]
    fn sanitize_may_produce_empty_name() {
        assert_eq!(sanitize_filename(".."), "");
        assert_eq!(sanitize_filename("/"), "");
        assert_eq!(validated_media_name("../", &storage()), None);
    }

    #[test]
    fn validated_media_name_sanitizes_then_checks() {
        let config = storage();
        assert_eq!(
            validated_media_name("../x/cat.PNG", &config),
            Some("x_cat.PNG".to_string())
        );
        assert_eq!(validated_media_name("../x/cat.txt", &config), None);
    }
}
