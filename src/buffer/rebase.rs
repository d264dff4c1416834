//! Rebasing a buffer onto edited base text
//!
//! Patch boundaries are carried across the edit with a character-level diff.
//! Insertions exactly at a patch boundary stay outside the patch; insertions
//! strictly inside it are absorbed.

use similar::{ChangeTag, TextDiff};

use super::{PatchId, Span, TextBuffer};

/// Outcome of [`TextBuffer::rebase`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RebaseReport {
    /// Patches whose range changed
    pub moved: usize,
    /// Patches whose entire text was deleted by this edit
    pub orphaned: Vec<PatchId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bias {
    /// Stay before text inserted at the offset
    Left,
    /// Move past text inserted at the offset
    Right,
}

/// Runs of equal/deleted/inserted bytes between two texts
struct OffsetMap {
    runs: Vec<(ChangeTag, usize)>,
}

impl OffsetMap {
    fn between(old: &str, new: &str) -> Self {
        let diff = TextDiff::from_chars(old, new);
        let mut runs: Vec<(ChangeTag, usize)> = Vec::new();

        // byte lengths, so offsets stay UTF-8 positions
        for change in diff.iter_all_changes() {
            let len = change.value().len();
            match runs.last_mut() {
                Some((tag, run)) if *tag == change.tag() => *run += len,
                _ => runs.push((change.tag(), len)),
            }
        }

        Self { runs }
    }

    fn map(&self, offset: usize, bias: Bias) -> usize {
        let (mut old, mut new) = (0, 0);

        for &(tag, len) in &self.runs {
            match tag {
                ChangeTag::Equal => {
                    if offset < old + len {
                        return new + (offset - old);
                    }
                    old += len;
                    new += len;
                }
                ChangeTag::Delete => {
                    if offset < old + len {
                        return new;
                    }
                    old += len;
                }
                ChangeTag::Insert => {
                    if offset == old && bias == Bias::Left {
                        return new;
                    }
                    new += len;
                }
            }
        }

        new
    }
}

impl TextBuffer {
    /// Adopt `text` as the new base text, moving every patch with it
    pub fn rebase(&mut self, text: impl Into<String>) -> RebaseReport {
        let text = text.into();
        let map = OffsetMap::between(&self.original, &text);
        let mut report = RebaseReport::default();

        for (index, slot) in self.patches.iter_mut().enumerate() {
            let Some(patch) = slot else { continue };

            let old = patch.span;
            let start = map.map(old.start, Bias::Right);
            let end = map.map(old.end, Bias::Left).max(start);

            if !old.is_empty() && start == end && !patch.orphaned {
                patch.orphaned = true;
                report.orphaned.push(PatchId(index));
            }
            if start != old.start || end != old.end {
                report.moved += 1;
            }
            patch.span = Span::new(start, end);
        }

        self.original = text;
        self.revision += 1;

        tracing::debug!(
            "Rebased buffer to revision {}: {} moved, {} orphaned",
            self.revision,
            report.moved,
            report.orphaned.len()
        );

        report
    }
}
