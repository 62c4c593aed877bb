//! Shallow markup scanning: corrected text → typed fragments.
//!
//! The model emits a small HTML-ish vocabulary (`<b>`, `<i>`, `<math>`)
//! around otherwise plain text. Only direct children of the root become
//! fragments; markup nested two or more levels deep is an unsupported
//! construct and is dropped, though its text survives inside the enclosing
//! fragment. This is a deliberate simplification — a tagged-variant scanner
//! over a three-symbol grammar, not a general markup renderer.

use crate::schema::SpanFormat;

/// A typed run of text produced by [`parse_fragments`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub format: SpanFormat,
    pub content: String,
}

impl Fragment {
    fn new(format: SpanFormat, content: String) -> Self {
        Self { format, content }
    }
}

/// Fragment type for a root-level tag. Unregistered tag names fall back to
/// plain text of their inner content.
fn tag_format(name: &str) -> SpanFormat {
    match name {
        "b" => SpanFormat::Bold,
        "i" => SpanFormat::Italic,
        "math" => SpanFormat::Math,
        _ => SpanFormat::Plain,
    }
}

/// A `<…>` token scanned out of the input.
struct TagToken<'a> {
    name: &'a str,
    closing: bool,
    /// Byte offset just past the `>`.
    end: usize,
}

/// Try to scan a tag starting at byte offset `start` (which must point at
/// `<`). Returns `None` when the text is not a well-formed tag, in which
/// case the `<` is literal.
fn scan_tag(text: &str, start: usize) -> Option<TagToken<'_>> {
    let rest = &text[start + 1..];
    let gt = rest.find('>')?;
    let mut name = &rest[..gt];
    let closing = name.starts_with('/');
    if closing {
        name = &name[1..];
    }
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(TagToken {
        name,
        closing,
        end: start + 1 + gt + 1,
    })
}

/// Parse a corrected line into an ordered sequence of typed fragments.
///
/// Root-level bare text becomes a `Plain` fragment; a root-level tag becomes
/// one fragment carrying all text inside it (nested tags contribute their
/// text but never their own fragment). An unclosed root tag at end of input
/// still emits its captured content. Empty fragments from empty tag bodies
/// are forwarded as-is. Pure and synchronous.
pub fn parse_fragments(text: &str) -> Vec<Fragment> {
    let mut fragments = Vec::new();
    let mut plain = String::new();
    // (format of the open root tag, captured inner text, nesting depth)
    let mut open: Option<(SpanFormat, String, usize)> = None;

    let mut pos = 0;
    while pos < text.len() {
        let rest = &text[pos..];
        let Some(lt) = rest.find('<') else {
            match open {
                Some((_, ref mut inner, _)) => inner.push_str(rest),
                None => plain.push_str(rest),
            }
            break;
        };

        // Text before the candidate tag.
        if lt > 0 {
            match open {
                Some((_, ref mut inner, _)) => inner.push_str(&rest[..lt]),
                None => plain.push_str(&rest[..lt]),
            }
        }
        let tag_start = pos + lt;

        let Some(token) = scan_tag(text, tag_start) else {
            // Literal '<'.
            match open {
                Some((_, ref mut inner, _)) => inner.push('<'),
                None => plain.push('<'),
            }
            pos = tag_start + 1;
            continue;
        };
        pos = token.end;

        match (&mut open, token.closing) {
            (None, false) => {
                // Opening a root-level tag: flush any pending plain text.
                if !plain.is_empty() {
                    fragments.push(Fragment::new(SpanFormat::Plain, std::mem::take(&mut plain)));
                }
                open = Some((tag_format(token.name), String::new(), 1));
            }
            (None, true) => {
                // Stray close at root level; ignore.
            }
            (Some((_, _, depth)), false) => {
                // Nested tag: dropped as a fragment, text kept.
                *depth += 1;
            }
            (Some((format, inner, depth)), true) => {
                *depth -= 1;
                if *depth == 0 {
                    fragments.push(Fragment::new(*format, std::mem::take(inner)));
                    open = None;
                }
            }
        }
    }

    // End of input: flush pending text; auto-close an unterminated root tag.
    if let Some((format, inner, _)) = open {
        fragments.push(Fragment::new(format, inner));
    } else if !plain.is_empty() {
        fragments.push(Fragment::new(SpanFormat::Plain, plain));
    }

    fragments
}
