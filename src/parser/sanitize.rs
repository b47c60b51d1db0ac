//! Text sanitization for titles, sections and article bodies
//!
//! Archive pages and article bodies are reduced to a single line of plain
//! text before they reach the output file, so a cleaned value never carries
//! a tab or a newline that would break the row layout.

use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Clean extracted text into a single normalized line
///
/// Steps, in order:
/// 1. Strip residual HTML tags
/// 2. Decode HTML entities
/// 3. Drop emoji and pictographs
/// 4. Drop zero-width and control characters
/// 5. Collapse every whitespace run (tabs and newlines included) to one space
///
/// # Examples
///
/// ```
/// use retrocrawl::parser::sanitize::clean_text;
///
/// let dirty = "<b>Lima</b>\t&amp; Callao 🚨\n\nhoy";
/// assert_eq!(clean_text(dirty), "Lima & Callao hoy");
/// ```
pub fn clean_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let result = strip_html_tags(text);
    let result = html_escape::decode_html_entities(&result);
    let result = remove_emoji(&result);
    let result = remove_invisible(&result);

    WHITESPACE_REGEX.replace_all(&result, " ").trim().to_string()
}

/// Extract plain text from HTML, removing all tags
///
/// # Examples
///
/// ```
/// use retrocrawl::parser::sanitize::strip_html_tags;
///
/// let html = "<p>Hola <strong>Perú</strong></p>";
/// assert_eq!(strip_html_tags(html), "Hola Perú");
/// ```
pub fn strip_html_tags(html: &str) -> String {
    TAG_REGEX.replace_all(html, "").to_string()
}

/// Remove emoji, pictographs and the joiners that glue them together
pub fn remove_emoji(text: &str) -> String {
    text.chars().filter(|c| !is_emoji(*c)).collect()
}

fn is_emoji(c: char) -> bool {
    matches!(c,
        '\u{1F000}'..='\u{1FAFF}' |
        '\u{2600}'..='\u{27BF}' |
        '\u{2B00}'..='\u{2BFF}' |
        '\u{FE00}'..='\u{FE0F}' |
        '\u{E0020}'..='\u{E007F}' |
        '\u{20E3}'
    )
}

/// Remove zero-width marks, the BOM and control characters
///
/// Tabs and newlines are turned into spaces rather than removed so words on
/// either side stay separate.
pub fn remove_invisible(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\u{200B}'..='\u{200F}' | '\u{2028}'..='\u{202F}' | '\u{2060}' | '\u{FEFF}' => None,
            '\t' | '\n' | '\r' => Some(' '),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect()
}

/// Check if text contains meaningful content
pub fn has_content(text: &str) -> bool {
    !text.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_clean_text_basic() {
        assert_eq!(clean_text("  Hola   mundo  "), "Hola mundo");
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn test_clean_text_strips_tags_and_entities() {
        let dirty = "<p>Congreso&nbsp;aprueba <em>ley</em> &quot;clave&quot;</p>";
        assert_eq!(clean_text(dirty), "Congreso aprueba ley \"clave\"");
    }

    #[test]
    fn test_clean_text_removes_emoji() {
        assert_eq!(clean_text("⚽ Alianza gana 2-0 🔥🔥"), "Alianza gana 2-0");
        assert_eq!(clean_text("Flag 🇵🇪 here"), "Flag here");
        assert_eq!(clean_text("Family 👨\u{200D}👩\u{200D}👧 photo"), "Family photo");
    }

    #[test]
    fn test_clean_text_keeps_spanish_characters() {
        let text = "Año nuevo en Perú: ¡qué emoción! ¿Vendrás?";
        assert_eq!(clean_text(text), text);
    }

    #[test]
    fn test_clean_text_single_line() {
        let cleaned = clean_text("Primera línea\nSegunda\tcolumna\r\nTercera");
        assert_eq!(cleaned, "Primera línea Segunda columna Tercera");
    }

    #[test]
    fn test_remove_invisible() {
        assert_eq!(remove_invisible("a\u{200B}b\u{FEFF}c\x07"), "abc");
        assert_eq!(remove_invisible("a\tb"), "a b");
    }

    #[test]
    fn test_strip_html_nested_tags() {
        let html = "<div><p>Para <span>con <em>etiquetas</em> anidadas</span></p></div>";
        assert_eq!(strip_html_tags(html), "Para con etiquetas anidadas");
    }

    #[test]
    fn test_has_content() {
        assert!(has_content("Hola"));
        assert!(!has_content(""));
        assert!(!has_content("   \n\t  "));
    }

    proptest! {
        #[test]
        fn clean_text_never_emits_row_breakers(input in "\\PC*") {
            let cleaned = clean_text(&input);
            prop_assert!(!cleaned.contains('\t'));
            prop_assert!(!cleaned.contains('\n'));
            prop_assert!(!cleaned.contains('\r'));
            prop_assert_eq!(cleaned.trim(), cleaned.as_str());
        }

        #[test]
        fn clean_text_preserves_plain_words(input in "[a-zA-Záéíóúñ \\t\\n]{0,64}") {
            let expected = input.split_whitespace().collect::<Vec<_>>().join(" ");
            prop_assert_eq!(clean_text(&input), expected);
        }
    }
}
