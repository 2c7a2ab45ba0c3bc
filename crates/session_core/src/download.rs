use shared::domain::HistoryEntry;

pub const DOWNLOAD_CONTENT_TYPE: &str = "text/plain";
const DOWNLOAD_STEM: &str = "optimized_code";
const UNRESOLVED_EXTENSION: &str = "txt";

/// The cleaned code of the active version, ready to hand to a browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub content_type: &'static str,
    pub body: String,
}

impl Download {
    pub fn for_entry(entry: &HistoryEntry) -> Self {
        let tag = entry
            .language
            .as_deref()
            .map(file_extension_for)
            .filter(|tag| !tag.is_empty())
            .unwrap_or_else(|| UNRESOLVED_EXTENSION.to_string());
        Self {
            file_name: format!("{DOWNLOAD_STEM}.{tag}"),
            content_type: DOWNLOAD_CONTENT_TYPE,
            body: entry.cleaned_code.clone(),
        }
    }
}

/// Keeps the characters a language tag may carry in a file extension, so the
/// suggested name always fits in a header.
fn file_extension_for(language: &str) -> String {
    language
        .to_ascii_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '#' | '-'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(language: Option<&str>) -> HistoryEntry {
        HistoryEntry {
            original_code: "x=1".into(),
            cleaned_code: "x = 1\n".into(),
            language: language.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn file_name_uses_language_tag() {
        let download = Download::for_entry(&entry(Some("python")));
        assert_eq!(download.file_name, "optimized_code.python");
        assert_eq!(download.content_type, "text/plain");
        assert_eq!(download.body, "x = 1\n");
    }

    #[test]
    fn unresolved_language_downloads_as_txt() {
        assert_eq!(Download::for_entry(&entry(None)).file_name, "optimized_code.txt");
    }

    #[test]
    fn guessed_tag_is_reduced_to_safe_characters() {
        let download = Download::for_entry(&entry(Some("objective-c \"v2\"")));
        assert_eq!(download.file_name, "optimized_code.objective-cv2");

        let download = Download::for_entry(&entry(Some("c++")));
        assert_eq!(download.file_name, "optimized_code.c++");
    }

    #[test]
    fn tag_with_no_safe_characters_falls_back_to_txt() {
        let download = Download::for_entry(&entry(Some("\"ü\" ")));
        assert_eq!(download.file_name, "optimized_code.txt");
    }
}
