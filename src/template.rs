use crate::utils::basename;
use crate::ClipError;
use std::fmt;

pub const FILEPATH_PLACEHOLDER: &str = "$filepath";
pub const FILENAME_PLACEHOLDER: &str = "$filename";

const XML_PREFIX: &str = "<file filename=\"$filepath\">";
const XML_SUFFIX: &str = "</file>";
const MARKDOWN_PREFIX: &str = "$filepath\\n```";
const MARKDOWN_SUFFIX: &str = "```\\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemplatePreset {
    Xml,
    #[default]
    Markdown,
    Custom,
}

pub const ALL_TEMPLATE_PRESETS: [TemplatePreset; 3] = [
    TemplatePreset::Xml,
    TemplatePreset::Markdown,
    TemplatePreset::Custom,
];

impl TemplatePreset {
    pub fn name(&self) -> &'static str {
        match self {
            TemplatePreset::Xml => "XML",
            TemplatePreset::Markdown => "Markdown",
            TemplatePreset::Custom => "Custom",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        ALL_TEMPLATE_PRESETS
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Built-in prefix and suffix. `Custom` has none.
    pub fn builtin(&self) -> Option<(&'static str, &'static str)> {
        match self {
            TemplatePreset::Xml => Some((XML_PREFIX, XML_SUFFIX)),
            TemplatePreset::Markdown => Some((MARKDOWN_PREFIX, MARKDOWN_SUFFIX)),
            TemplatePreset::Custom => None,
        }
    }

    /// Preset matching an edited prefix/suffix pair. Anything that differs from
    /// both built-ins counts as `Custom`.
    pub fn detect(prefix: &str, suffix: &str) -> Self {
        let builtin_prefix = prefix == XML_PREFIX || prefix == MARKDOWN_PREFIX;
        let builtin_suffix = suffix == XML_SUFFIX || suffix == MARKDOWN_SUFFIX;
        if !builtin_prefix || !builtin_suffix {
            return TemplatePreset::Custom;
        }
        match (prefix, suffix) {
            (XML_PREFIX, XML_SUFFIX) => TemplatePreset::Xml,
            (MARKDOWN_PREFIX, MARKDOWN_SUFFIX) => TemplatePreset::Markdown,
            _ => TemplatePreset::Custom,
        }
    }
}

impl fmt::Display for TemplatePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Prefix/suffix pair wrapped around each file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub prefix: String,
    pub suffix: String,
}

impl Default for Template {
    fn default() -> Self {
        Template::from_preset(TemplatePreset::default(), "", "")
    }
}

impl Template {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Template {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    /// Template of a preset; `Custom` uses the given custom pair.
    pub fn from_preset(preset: TemplatePreset, custom_prefix: &str, custom_suffix: &str) -> Self {
        match preset.builtin() {
            Some((prefix, suffix)) => Template::new(prefix, suffix),
            None => Template::new(custom_prefix, custom_suffix),
        }
    }

    /// Copy with escape sequences in prefix and suffix interpreted.
    pub fn interpreted(&self) -> Result<Template, ClipError> {
        Ok(Template {
            prefix: interpret_escapes(&self.prefix)?,
            suffix: interpret_escapes(&self.suffix)?,
        })
    }

    pub fn render_prefix(&self, display_path: &str) -> String {
        self.prefix
            .replace(FILEPATH_PLACEHOLDER, display_path)
            .replace(FILENAME_PLACEHOLDER, &basename(display_path))
    }
}

fn read_hex(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    digits: usize,
    escape: char,
) -> Result<char, ClipError> {
    let mut value: u32 = 0;
    for _ in 0..digits {
        let digit = chars
            .next()
            .and_then(|c| c.to_digit(16))
            .ok_or_else(|| ClipError::EscapeError(format!("truncated \\{} escape", escape)))?;
        value = value * 16 + digit;
    }
    char::from_u32(value)
        .ok_or_else(|| ClipError::EscapeError(format!("invalid code point U+{:X}", value)))
}

/// Turns literal escape sequences such as `\n` into the characters they name.
///
/// Unknown escapes stay verbatim and non-ASCII text passes through untouched.
pub fn interpret_escapes(text: &str) -> Result<String, ClipError> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            return Err(ClipError::EscapeError("\\ at end of string".to_owned()));
        };
        match next {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0C}'),
            'v' => out.push('\u{0B}'),
            '\n' => {}
            '0'..='7' => {
                let mut value = next.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(value).unwrap_or('\u{FFFD}'));
            }
            'x' => out.push(read_hex(&mut chars, 2, 'x')?),
            'u' => out.push(read_hex(&mut chars, 4, 'u')?),
            'U' => out.push(read_hex(&mut chars, 8, 'U')?),
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    Ok(out)
}
