use crate::models::resume::DocumentKind;

const FALLBACK_NAME: &str = "output";

/// Turns a display name into a filesystem-safe token.
///
/// Keeps alphanumerics plus `.`, `_`, `-` and space, trims the ends, then replaces
/// spaces with underscores. Falls back to `"output"` when nothing survives.
pub fn safe_filename(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '.' | '_' | '-' | ' '))
        .collect();
    let token = kept.trim().replace(' ', "_");
    if token.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        token
    }
}

/// `<sanitized-name>_resume` or `<sanitized-name>_cover_letter`, without extension.
pub fn document_file_stem(display_name: &str, kind: DocumentKind) -> String {
    format!("{}_{}", safe_filename(display_name), kind.file_suffix())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spaces_become_underscores() {
        assert_eq!(safe_filename("Amulya Goli"), "Amulya_Goli");
    }

    #[test]
    fn test_all_punctuation_falls_back() {
        assert_eq!(safe_filename("!@#$%^&*()"), "output");
        assert_eq!(safe_filename(""), "output");
        assert_eq!(safe_filename("   "), "output");
    }

    #[test]
    fn test_disallowed_characters_are_dropped() {
        assert_eq!(safe_filename("O'Brien, Jr."), "OBrien_Jr.");
        assert_eq!(safe_filename("../etc/passwd"), "..etcpasswd");
        assert_eq!(safe_filename("a_b-c.d"), "a_b-c.d");
    }

    #[test]
    fn test_unicode_letters_are_kept() {
        assert_eq!(safe_filename("José Núñez"), "José_Núñez");
    }

    #[test]
    fn test_document_file_stem() {
        assert_eq!(
            document_file_stem("Amulya Goli", DocumentKind::Resume),
            "Amulya_Goli_resume"
        );
        assert_eq!(
            document_file_stem("", DocumentKind::CoverLetter),
            "output_cover_letter"
        );
    }
}
