//! Canonical narrated text.
//!
//! Generated paragraphs arrive as markdown. Everything downstream of the
//! generator (validation, speech, alignment, questions, persistence) works on
//! a single stripped value so alignment offsets index the same codepoints the
//! reader sees.

use serde::{Deserialize, Serialize};

/// Paragraph text with markup removed and whitespace collapsed.
///
/// Only [`strip_markup`] produces values of this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(transparent)]
pub struct CanonicalText(String);

impl CanonicalText {
    /// The text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in Unicode scalar values (UTF-32 code units).
    pub fn len_utf32(&self) -> usize {
        self.0.chars().count()
    }

    /// Whether the text is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Slice by UTF-32 offsets, `None` when out of bounds or reversed.
    pub fn slice_utf32(&self, start: usize, end: usize) -> Option<String> {
        if start > end || end > self.len_utf32() {
            return None;
        }
        Some(self.0.chars().skip(start).take(end - start).collect())
    }

    /// Consume into the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for CanonicalText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Reduce markdown to the plain text a narrator would read.
///
/// Removes headings, blockquote and list markers, horizontal rules, HTML tags,
/// emphasis and inline code markers; rewrites links and images to their
/// label; collapses all whitespace runs (line breaks included) to one space.
///
/// Stripping repeats until nothing changes, so stripping a result again
/// returns it unchanged.
///
/// # Examples
///
/// ```
/// use snowday_core::strip_markup;
///
/// let text = strip_markup("# Title\n**Bold** [link](http://x)");
/// assert_eq!(text.as_str(), "Title Bold link");
/// ```
pub fn strip_markup(markup: &str) -> CanonicalText {
    let mut text = strip_pass(markup);
    // Every pass only removes characters, so this terminates.
    loop {
        let next = strip_pass(&text);
        if next == text {
            return CanonicalText(text);
        }
        text = next;
    }
}

fn strip_pass(markup: &str) -> String {
    let lines: Vec<&str> = markup
        .lines()
        .map(str::trim)
        .filter(|line| !is_rule(line))
        .map(strip_line_markers)
        .collect();

    let joined = lines.join(" ");
    let text = strip_emphasis(&unwrap_links(&strip_tags(&joined)));
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_rule(line: &str) -> bool {
    let marks: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
    marks.len() >= 3
        && matches!(marks[0], '-' | '*' | '_')
        && marks.iter().all(|c| *c == marks[0])
}

fn strip_line_markers(line: &str) -> &str {
    let mut line = line;
    loop {
        let before = line;

        if let Some(rest) = line.strip_prefix('>') {
            line = rest.trim_start();
        }

        let hashes = line.chars().take_while(|c| *c == '#').count();
        if (1..=6).contains(&hashes) && line[hashes..].starts_with(char::is_whitespace) {
            line = line[hashes..].trim_start();
        }

        for marker in ["- ", "* ", "+ "] {
            if let Some(rest) = line.strip_prefix(marker) {
                line = rest.trim_start();
            }
        }

        let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
        if digits > 0 {
            let rest = &line[digits..];
            if let Some(rest) = rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") ")) {
                line = rest.trim_start();
            }
        }

        if line == before {
            return line;
        }
    }
}

fn strip_tags(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        let opens_tag = chars[i] == '<'
            && chars
                .get(i + 1)
                .is_some_and(|c| c.is_ascii_alphabetic() || *c == '/' || *c == '!');
        if opens_tag && let Some(close) = chars[i..].iter().position(|c| *c == '>') {
            out.push(' ');
            i += close + 1;
            continue;
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

fn unwrap_links(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        let start = if chars[i] == '!' && chars.get(i + 1) == Some(&'[') {
            i + 1
        } else {
            i
        };
        if chars[start] == '['
            && let Some((label, next)) = parse_link(&chars, start)
        {
            out.push_str(&label);
            i = next;
            continue;
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

/// Parse `[label](target)` starting at `open`; returns the label and the
/// index just past the closing parenthesis.
fn parse_link(chars: &[char], open: usize) -> Option<(String, usize)> {
    let label_end = open + chars[open..].iter().position(|c| *c == ']')?;
    if chars.get(label_end + 1) != Some(&'(') {
        return None;
    }
    let target_end = label_end + 1 + chars[label_end + 1..].iter().position(|c| *c == ')')?;
    let label = chars[open + 1..label_end].iter().collect();
    Some((label, target_end + 1))
}

fn strip_emphasis(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (i, c) in chars.iter().enumerate() {
        let prev = i.checked_sub(1).and_then(|p| chars.get(p));
        let next = chars.get(i + 1);
        let keep = match c {
            '*' | '`' => false,
            '~' => prev != Some(&'~') && next != Some(&'~'),
            '_' => {
                prev.is_some_and(|p| p.is_alphanumeric()) && next.is_some_and(|n| n.is_alphanumeric())
            }
            _ => true,
        };
        if keep {
            out.push(*c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_heading_emphasis_and_link() {
        assert_eq!(
            strip_markup("# Title\n**Bold** [link](http://x)").as_str(),
            "Title Bold link"
        );
    }

    #[test]
    fn test_strip_lists_quotes_and_rules() {
        let markup = "> A quote\n\n---\n- first\n2. second\n* third";
        assert_eq!(strip_markup(markup).as_str(), "A quote first second third");
    }

    #[test]
    fn test_strip_tags_images_and_code() {
        let markup = "The <em>brave</em> whale ![a whale](w.png) said `hello`.";
        assert_eq!(
            strip_markup(markup).as_str(),
            "The brave whale a whale said hello."
        );
    }

    #[test]
    fn test_underscores_inside_words_survive() {
        assert_eq!(strip_markup("__snow_day__ ~~no~~").as_str(), "snow_day no");
    }

    #[test]
    fn test_stripping_is_idempotent() {
        for markup in [
            "**1.** The brave whale swam.",
            "**-** The brave whale swam.",
            "*#* The brave whale swam.",
            "<b>></b> A quote.",
            "## **Chapter** [One](x)\n\nThe whale ~*~sang~*~.",
        ] {
            let once = strip_markup(markup);
            assert_eq!(strip_markup(once.as_str()), once, "{markup:?}");
        }
        assert_eq!(strip_markup("**1.** The brave whale swam.").as_str(), "The brave whale swam.");
    }

    #[test]
    fn test_plain_text_unchanged() {
        let text = "The cat sat.";
        assert_eq!(strip_markup(text).as_str(), text);
    }

    #[test]
    fn test_utf32_slicing() {
        let text = strip_markup("Café über");
        assert_eq!(text.len_utf32(), 9);
        assert_eq!(text.slice_utf32(5, 9).as_deref(), Some("über"));
        assert_eq!(text.slice_utf32(5, 10), None);
    }
}
