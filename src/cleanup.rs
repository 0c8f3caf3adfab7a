//! Cleanup pipeline for extracted text.

use std::fmt;
use std::str::FromStr;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};

/// Cleanup preset levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CleanupPreset {
    /// Minimal cleanup: Unicode NFC normalization only
    Minimal,
    /// Standard cleanup: NFC + ligatures + line joining
    #[default]
    Standard,
    /// Aggressive cleanup: also strips private-use glyphs
    Aggressive,
}

impl FromStr for CleanupPreset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minimal" => Ok(CleanupPreset::Minimal),
            "standard" => Ok(CleanupPreset::Standard),
            "aggressive" => Ok(CleanupPreset::Aggressive),
            other => Err(Error::Config(format!(
                "unknown cleanup preset '{}' (expected minimal, standard or aggressive)",
                other
            ))),
        }
    }
}

impl fmt::Display for CleanupPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CleanupPreset::Minimal => "minimal",
            CleanupPreset::Standard => "standard",
            CleanupPreset::Aggressive => "aggressive",
        })
    }
}

/// Options for text cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupOptions {
    /// Normalize Unicode to NFC form
    pub normalize_unicode: bool,

    /// Standardize bullet characters (●, ○, ■ → •)
    pub standardize_bullets: bool,

    /// Remove lines holding only a page number
    pub remove_page_numbers: bool,

    /// Fix ligatures (fi, fl, etc.)
    pub fix_ligatures: bool,

    /// Fix hyphenation at line breaks
    pub fix_hyphenation: bool,

    /// Remove Private Use Area (PUA) characters
    pub remove_pua: bool,

    /// Remove Unicode replacement character (U+FFFD)
    pub remove_replacement_char: bool,

    /// Merge single newlines into spaces (for word-per-line extraction)
    pub merge_single_newlines: bool,

    /// Merge bullet/number markers with following content
    pub merge_list_markers: bool,

    /// Merge CJK characters across line breaks
    pub merge_cjk_lines: bool,

    /// Collapse runs of spaces and tabs
    pub normalize_whitespace: bool,

    /// Maximum consecutive newlines (0 = unlimited)
    pub max_consecutive_newlines: u8,
}

impl CleanupOptions {
    /// Create options from a preset.
    pub fn from_preset(preset: CleanupPreset) -> Self {
        match preset {
            CleanupPreset::Minimal => Self::minimal(),
            CleanupPreset::Standard => Self::standard(),
            CleanupPreset::Aggressive => Self::aggressive(),
        }
    }

    /// Minimal cleanup options.
    pub fn minimal() -> Self {
        Self {
            normalize_unicode: true,
            standardize_bullets: false,
            remove_page_numbers: false,
            fix_ligatures: false,
            fix_hyphenation: false,
            remove_pua: false,
            remove_replacement_char: false,
            merge_single_newlines: false,
            merge_list_markers: false,
            merge_cjk_lines: false,
            normalize_whitespace: true,
            max_consecutive_newlines: 0,
        }
    }

    /// Standard cleanup options.
    pub fn standard() -> Self {
        Self {
            normalize_unicode: true,
            standardize_bullets: true,
            remove_page_numbers: true,
            fix_ligatures: true,
            fix_hyphenation: true,
            remove_pua: false,
            remove_replacement_char: true,
            merge_single_newlines: true,
            merge_list_markers: true,
            merge_cjk_lines: true,
            normalize_whitespace: true,
            // keeps the blank line between pages
            max_consecutive_newlines: 2,
        }
    }

    /// Aggressive cleanup options.
    pub fn aggressive() -> Self {
        Self {
            remove_pua: true,
            ..Self::standard()
        }
    }
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self::standard()
    }
}

impl From<CleanupPreset> for CleanupOptions {
    fn from(preset: CleanupPreset) -> Self {
        Self::from_preset(preset)
    }
}

const LIGATURES: &[(&str, &str)] = &[
    ("\u{FB00}", "ff"),
    ("\u{FB01}", "fi"),
    ("\u{FB02}", "fl"),
    ("\u{FB03}", "ffi"),
    ("\u{FB04}", "ffl"),
    ("\u{FB05}", "st"),
    ("\u{FB06}", "st"),
];

const BULLETS: &[char] = &['●', '○', '■', '□', '◆', '◇', '▪', '▫', '►', '▻'];

const PARA_PLACEHOLDER: &str = "\u{0000}PARA\u{0000}";
const SENT_PLACEHOLDER: &str = "\u{0000}SENT\u{0000}";
const LIST_PLACEHOLDER: &str = "\u{0000}L";

/// Compiled patterns used by the pipeline.
struct Patterns {
    page_number: Regex,
    hyphenation: Regex,
    spaces: Regex,
    newlines: Option<Regex>,
    list_line: Regex,
    paragraph: Regex,
    sentence_end: Regex,
    bullet_marker: Regex,
    number_marker: Regex,
    paren_number_marker: Regex,
    cjk_break: Regex,
}

impl Patterns {
    fn compile(options: &CleanupOptions) -> Result<Self> {
        let newlines = match options.max_consecutive_newlines {
            0 => None,
            max => Some(compile(&format!(r"\n{{{},}}", max as usize + 1))?),
        };

        Ok(Self {
            page_number: compile(r"(?m)^[ \t]*[-–—]?[ \t]*\d+[ \t]*[-–—]?[ \t]*$")?,
            hyphenation: compile(r"([a-zA-Z])-[ \t]*\n[ \t]*([a-z])")?,
            spaces: compile(r"[ \t]{2,}")?,
            newlines,
            list_line: compile(r"(?m)^([-*•]\s|[0-9]+[.)]\s)")?,
            paragraph: compile(r"\n{2,}")?,
            sentence_end: compile(r"([.。!?！？:;])[ \t]*\n")?,
            bullet_marker: compile(r"([•■□▪▸►◆◇➤✓✗])[ \t]*\n\s*")?,
            number_marker: compile(r"(?m)^(\d{1,3}[.)][ \t]*)\n\s*")?,
            paren_number_marker: compile(r"(?m)^(\(\d{1,3}\)[ \t]*)\n\s*")?,
            cjk_break: compile(
                r"([\p{Hangul}\p{Han}\p{Hiragana}\p{Katakana}])([^.。!?！？\n]?)\n([\p{Hangul}\p{Han}\p{Hiragana}\p{Katakana}])",
            )?,
        })
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::Other(format!("cleanup pattern: {}", e)))
}

/// Text cleanup pipeline.
pub struct CleanupPipeline {
    options: CleanupOptions,
    patterns: Patterns,
}

impl CleanupPipeline {
    /// Create a new cleanup pipeline with the given options.
    pub fn new(options: CleanupOptions) -> Result<Self> {
        let patterns = Patterns::compile(&options)?;
        Ok(Self { options, patterns })
    }

    /// Create a pipeline from a preset.
    pub fn from_preset(preset: CleanupPreset) -> Result<Self> {
        Self::new(CleanupOptions::from_preset(preset))
    }

    /// Options this pipeline runs with.
    pub fn options(&self) -> &CleanupOptions {
        &self.options
    }

    /// Process text through the cleanup pipeline.
    pub fn process(&self, text: &str) -> String {
        let mut result = text.replace("\r\n", "\n");

        // Stage 1: character-level
        if self.options.normalize_unicode {
            result = result.nfc().collect();
        }
        if self.options.fix_ligatures {
            for (ligature, replacement) in LIGATURES {
                result = result.replace(ligature, replacement);
            }
        }
        if self.options.standardize_bullets {
            result = result.replace(BULLETS, "•");
        }
        if self.options.remove_pua {
            result = remove_pua_chars(&result);
        }
        if self.options.remove_replacement_char {
            result = result.replace('\u{FFFD}', "");
        }

        // Stage 2: line-level
        if self.options.remove_page_numbers {
            result = self.patterns.page_number.replace_all(&result, "").into_owned();
        }
        if self.options.fix_hyphenation {
            result = self.patterns.hyphenation.replace_all(&result, "$1$2").into_owned();
        }
        // list markers before newline merging
        if self.options.merge_list_markers {
            result = self.merge_list_markers(&result);
        }
        if self.options.merge_cjk_lines {
            result = self.merge_cjk_lines(&result);
        }
        if self.options.merge_single_newlines {
            result = self.merge_single_newlines(&result);
        }

        // Stage 3: whitespace
        if self.options.normalize_whitespace {
            result = self.patterns.spaces.replace_all(&result, " ").into_owned();
            result = result
                .lines()
                .map(str::trim_end)
                .collect::<Vec<_>>()
                .join("\n");
        }
        if let Some(ref newlines) = self.patterns.newlines {
            let replacement = "\n".repeat(self.options.max_consecutive_newlines as usize);
            result = newlines.replace_all(&result, replacement.as_str()).into_owned();
        }

        result.trim().to_string()
    }

    /// Join lines broken mid-sentence, keeping paragraph breaks, sentence
    /// ends and list items on their own lines.
    fn merge_single_newlines(&self, text: &str) -> String {
        let protected = self
            .patterns
            .list_line
            .replace_all(text, |caps: &Captures| format!("{}{}", LIST_PLACEHOLDER, &caps[1]));
        let protected = self.patterns.paragraph.replace_all(&protected, PARA_PLACEHOLDER);
        let protected = self
            .patterns
            .sentence_end
            .replace_all(&protected, |caps: &Captures| format!("{}{}", &caps[1], SENT_PLACEHOLDER));

        protected
            .replace('\n', " ")
            .replace(SENT_PLACEHOLDER, "\n")
            .replace(PARA_PLACEHOLDER, "\n\n")
            .replace(&format!(" {}", LIST_PLACEHOLDER), "\n")
            .replace(LIST_PLACEHOLDER, "")
    }

    fn merge_list_markers(&self, text: &str) -> String {
        let result = self.patterns.bullet_marker.replace_all(text, "$1 ");
        let result = self.patterns.number_marker.replace_all(&result, "$1");
        self.patterns
            .paren_number_marker
            .replace_all(&result, "$1")
            .into_owned()
    }

    fn merge_cjk_lines(&self, text: &str) -> String {
        const PLACEHOLDER: &str = "\u{0000}CJKPARA\u{0000}";

        let protected = self.patterns.paragraph.replace_all(text, PLACEHOLDER);
        let merged = self.patterns.cjk_break.replace_all(&protected, "$1$2$3");
        merged.replace(PLACEHOLDER, "\n\n")
    }
}

impl fmt::Debug for CleanupPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CleanupPipeline")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

fn remove_pua_chars(text: &str) -> String {
    text.chars()
        .filter(|c| {
            let code = *c as u32;
            !(0xE000..=0xF8FF).contains(&code)
                && !(0xF0000..=0xFFFFD).contains(&code)
                && !(0x100000..=0x10FFFD).contains(&code)
        })
        .collect()
}
