//! Typographic cleanup: curly quotes back to ASCII.

/// Replace curly double and single quotes with their straight equivalents.
pub fn convert_smart_quotes(input: &str) -> String {
    input
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
}
