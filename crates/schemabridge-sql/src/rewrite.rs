//! Span-addressed identifier replacement.
//!
//! Identifiers are replaced in the original text rather than by printing the
//! AST back out, so everything the model wrote outside the renamed
//! identifiers (layout, comments, literal spelling) is preserved.

use sqlparser::ast::Ident;
use sqlparser::tokenizer::Location;
use std::collections::BTreeMap;
use std::ops::Range;

/// Original statement text with byte offsets of every line start.
#[derive(Debug)]
pub(crate) struct SourceText<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> SourceText<'a> {
    pub fn new(text: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { text, line_starts }
    }

    /// Byte range covered by `ident`, quotes included.
    ///
    /// `None` when the identifier carries no span or the span does not cover
    /// the identifier's text.
    pub fn ident_range(&self, ident: &Ident) -> Option<Range<usize>> {
        let start = self.offset(ident.span.start)?;
        let end = self.offset(ident.span.end)?;
        let covered = self.text.get(start..end)?;
        let unquoted = covered
            .trim_start_matches(['"', '`', '['])
            .trim_end_matches(['"', '`', ']']);
        (unquoted == ident.value).then_some(start..end)
    }

    /// Byte offset of a 1-based line/column location counted in characters.
    fn offset(&self, location: Location) -> Option<usize> {
        let line = usize::try_from(location.line).ok()?.checked_sub(1)?;
        let column = usize::try_from(location.column).ok()?.checked_sub(1)?;
        let line_start = *self.line_starts.get(line)?;
        let rest = &self.text[line_start..];
        rest.char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(rest.len()))
            .nth(column)
            .map(|i| line_start + i)
    }
}

/// Pending replacements keyed by start offset.
#[derive(Debug, Default)]
pub(crate) struct Edits {
    edits: BTreeMap<usize, (usize, String)>,
}

impl Edits {
    /// Record a replacement. Returns `false` when the range was already
    /// recorded.
    pub fn insert(&mut self, range: Range<usize>, replacement: String) -> bool {
        if self.edits.contains_key(&range.start) {
            return false;
        }
        self.edits.insert(range.start, (range.end, replacement));
        true
    }

    /// Apply every recorded replacement to `text`.
    pub fn apply(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        for (&start, (end, replacement)) in &self.edits {
            if start < cursor {
                continue;
            }
            out.push_str(&text[cursor..start]);
            out.push_str(replacement);
            cursor = *end;
        }
        out.push_str(&text[cursor..]);
        out
    }
}
