// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Escaping of characters that cannot appear in an XML document.

use std::borrow::Cow;
use swrite::{swrite, SWrite};

/// Replaces every character that is not valid XML text with a `\uXXXX` escape.
///
/// Valid characters are tab, line feed, carriage return, and the ranges `U+0020..=U+D7FF` and
/// `U+E000..=U+FFFD`, minus the C1 control block `U+007F..=U+009F`. The escape uses four
/// lowercase hex digits.
///
/// The check works on UTF-16 code units, not on characters. A character outside the basic
/// multilingual plane is two surrogate units, both outside the valid ranges, so it comes out as
/// two escapes (U+1F600 becomes `\ud83d\ude00`). This is a known limitation of the format, kept for
/// compatibility with existing consumers.
///
/// The output only ever contains valid characters, so sanitizing twice is the same as
/// sanitizing once.
pub fn sanitize(text: &str) -> Cow<'_, str> {
    if text.encode_utf16().all(is_valid_unit) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        let mut buf = [0u16; 2];
        let units = c.encode_utf16(&mut buf);
        if units.iter().copied().all(is_valid_unit) {
            out.push(c);
        } else {
            for unit in units.iter() {
                swrite!(out, "\\u{unit:04x}");
            }
        }
    }
    Cow::Owned(out)
}

/// Like [`sanitize`], passing `None` through unchanged.
pub fn sanitize_opt(text: Option<&str>) -> Option<Cow<'_, str>> {
    text.map(sanitize)
}

const fn is_valid_unit(unit: u16) -> bool {
    matches!(
        unit,
        0x09 | 0x0a | 0x0d | 0x20..=0x7e | 0xa0..=0xd7ff | 0xe000..=0xfffd
    )
}

/// Free text that is safe to write into an XML document.
///
/// Construction runs the text through [`sanitize`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct XmlText {
    text: Box<str>,
}

impl XmlText {
    /// Creates a new `XmlText`, escaping any invalid characters.
    pub fn new(text: impl AsRef<str>) -> Self {
        let text = sanitize(text.as_ref()).into_owned().into_boxed_str();
        Self { text }
    }

    /// Creates a new `XmlText`, treating `None` as the empty string.
    pub fn from_optional(text: Option<&str>) -> Self {
        text.map(Self::new).unwrap_or_default()
    }

    /// Returns the sanitized text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns true if the text is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Converts the text into a string.
    pub fn into_string(self) -> String {
        self.text.into_string()
    }
}

impl AsRef<str> for XmlText {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<&str> for XmlText {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for XmlText {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<XmlText> for String {
    fn from(text: XmlText) -> Self {
        text.into_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;
    use test_strategy::proptest;

    #[test_case("plain text", "plain text" ; "ascii is untouched")]
    #[test_case("tab\tnewline\ncr\r", "tab\tnewline\ncr\r" ; "allowed whitespace")]
    #[test_case("nul\u{0}", "nul\\u0000" ; "nul")]
    #[test_case("bell\u{7}", "bell\\u0007" ; "c0 control")]
    #[test_case("Head\u{80}r", "Head\\u0080r" ; "c1 control")]
    #[test_case("del\u{7f}", "del\\u007f" ; "delete")]
    #[test_case("caf\u{e9}", "caf\u{e9}" ; "latin-1 letter")]
    #[test_case("\u{fffe}", "\\ufffe" ; "noncharacter")]
    #[test_case("\u{e000}\u{fffd}", "\u{e000}\u{fffd}" ; "private use and replacement")]
    #[test_case("\u{1f600}", "\\ud83d\\ude00" ; "astral character escapes each surrogate")]
    fn test_sanitize(input: &str, expected: &str) {
        assert_eq!(sanitize(input), expected);
    }

    #[test]
    fn test_sanitize_borrows_valid_text() {
        assert!(matches!(sanitize("nothing to escape"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_sanitize_opt_passes_none_through() {
        assert_eq!(sanitize_opt(None), None);
        assert_eq!(sanitize_opt(Some("a\u{1}")).as_deref(), Some("a\\u0001"));
    }

    #[test]
    fn test_xml_text() {
        assert_eq!(XmlText::new("x\u{0}").as_str(), "x\\u0000");
        assert!(XmlText::from_optional(None).is_empty());
        assert_eq!(String::from(XmlText::from("ok")), "ok");
    }

    #[proptest]
    fn sanitize_is_idempotent(input: String) {
        let once = sanitize(&input).into_owned();
        let twice = sanitize(&once).into_owned();
        assert_eq!(once, twice);
    }

    #[proptest]
    fn sanitize_output_is_valid(input: String) {
        assert!(sanitize(&input).encode_utf16().all(is_valid_unit));
    }
}
