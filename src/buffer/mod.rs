//! Description buffer
//!
//! A base text plus an ordered table of reversible range replacements
//! ("patches"). Enabled patches are applied on render; disabled ones are
//! kept so they can be re-applied later without recomputing offsets.
//!
//! Patches are addressed by [`PatchId`], an index into the buffer-owned
//! table. Callers never hold the patch itself.

mod rebase;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use rebase::RebaseReport;

/// Handle to a patch owned by a [`TextBuffer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PatchId(usize);

impl PatchId {
    /// Position of the patch in its buffer's table
    pub fn index(self) -> usize {
        self.0
    }
}

/// Half-open byte range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Buffer errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    #[error("Unknown patch: {0:?}")]
    UnknownPatch(PatchId),

    #[error("Range {start}..{end} is outside text of length {len}")]
    OutOfBounds { start: usize, end: usize, len: usize },

    #[error("Offset {0} is not on a character boundary")]
    NotCharBoundary(usize),

    #[error("Range start {start} is after end {end}")]
    Reversed { start: usize, end: usize },
}

#[derive(Debug, Clone)]
struct Patch {
    span: Span,
    replacement: String,
    enabled: bool,
    orphaned: bool,
}

/// Where an applied patch's replacement landed in rendered text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectedPatch {
    pub patch: PatchId,
    pub start: usize,
    pub end: usize,
}

/// Rendered text together with the position of every applied patch
#[derive(Debug, Clone)]
pub struct Projection {
    pub text: String,
    pub patches: Vec<ProjectedPatch>,
}

/// Base text with a table of toggleable patches
#[derive(Debug, Clone)]
pub struct TextBuffer {
    original: String,
    patches: Vec<Option<Patch>>,
    revision: u64,
}

impl TextBuffer {
    /// Create a buffer over `text` with no patches
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            original: text.into(),
            patches: Vec::new(),
            revision: 0,
        }
    }

    /// The base text patches are expressed against
    pub fn original_text(&self) -> &str {
        &self.original
    }

    /// Number of rebases applied so far
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Validate that `[start, end)` addresses the base text
    pub fn check_range(&self, start: usize, end: usize) -> Result<(), BufferError> {
        if start > end {
            return Err(BufferError::Reversed { start, end });
        }
        if end > self.original.len() {
            return Err(BufferError::OutOfBounds {
                start,
                end,
                len: self.original.len(),
            });
        }
        for offset in [start, end] {
            if !self.original.is_char_boundary(offset) {
                return Err(BufferError::NotCharBoundary(offset));
            }
        }
        Ok(())
    }

    /// Create a disabled patch replacing `[start, end)` with `replacement`
    pub fn create_patch(
        &mut self,
        start: usize,
        end: usize,
        replacement: impl Into<String>,
    ) -> Result<PatchId, BufferError> {
        self.check_range(start, end)?;

        let id = PatchId(self.patches.len());
        self.patches.push(Some(Patch {
            span: Span::new(start, end),
            replacement: replacement.into(),
            enabled: false,
            orphaned: false,
        }));
        Ok(id)
    }

    pub fn enable(&mut self, id: PatchId) -> Result<(), BufferError> {
        self.patch_mut(id)?.enabled = true;
        Ok(())
    }

    pub fn disable(&mut self, id: PatchId) -> Result<(), BufferError> {
        self.patch_mut(id)?.enabled = false;
        Ok(())
    }

    pub fn is_enabled(&self, id: PatchId) -> Result<bool, BufferError> {
        Ok(self.patch(id)?.enabled)
    }

    /// Current base-text range covered by the patch
    pub fn range(&self, id: PatchId) -> Result<Span, BufferError> {
        Ok(self.patch(id)?.span)
    }

    /// Whether a rebase deleted everything the patch covered
    pub fn is_orphaned(&self, id: PatchId) -> Result<bool, BufferError> {
        Ok(self.patch(id)?.orphaned)
    }

    pub fn replacement(&self, id: PatchId) -> Result<&str, BufferError> {
        Ok(&self.patch(id)?.replacement)
    }

    pub fn set_replacement(
        &mut self,
        id: PatchId,
        replacement: impl Into<String>,
    ) -> Result<(), BufferError> {
        self.patch_mut(id)?.replacement = replacement.into();
        Ok(())
    }

    /// Drop a patch from the table. The handle is invalid afterwards.
    pub fn discard(&mut self, id: PatchId) -> Result<(), BufferError> {
        let slot = self
            .patches
            .get_mut(id.0)
            .ok_or(BufferError::UnknownPatch(id))?;
        if slot.take().is_none() {
            return Err(BufferError::UnknownPatch(id));
        }
        Ok(())
    }

    /// Number of live patches
    pub fn patch_count(&self) -> usize {
        self.patches.iter().filter(|p| p.is_some()).count()
    }

    /// Render the base text with every enabled patch applied
    pub fn render(&self) -> String {
        self.render_projected().text
    }

    /// Render, also reporting where each applied replacement landed
    pub fn render_projected(&self) -> Projection {
        let mut text = String::with_capacity(self.original.len());
        let mut projected = Vec::new();
        let mut cursor = 0;

        for (id, patch) in self.applied() {
            if patch.span.start < cursor {
                tracing::warn!(
                    "Skipping patch {:?} at {}..{}: overlaps an applied patch",
                    id,
                    patch.span.start,
                    patch.span.end
                );
                continue;
            }

            text.push_str(&self.original[cursor..patch.span.start]);
            let start = text.len();
            text.push_str(&patch.replacement);
            projected.push(ProjectedPatch {
                patch: id,
                start,
                end: text.len(),
            });
            cursor = patch.span.end;
        }
        text.push_str(&self.original[cursor..]);

        Projection {
            text,
            patches: projected,
        }
    }

    /// Enabled, non-orphaned patches in base order
    fn applied(&self) -> Vec<(PatchId, &Patch)> {
        let mut active: Vec<(PatchId, &Patch)> = self
            .patches
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| {
                slot.as_ref()
                    .filter(|p| p.enabled && !p.orphaned)
                    .map(|p| (PatchId(i), p))
            })
            .collect();
        active.sort_by_key(|(id, p)| (p.span.start, p.span.end, *id));
        active
    }

    fn patch(&self, id: PatchId) -> Result<&Patch, BufferError> {
        self.patches
            .get(id.0)
            .and_then(|slot| slot.as_ref())
            .ok_or(BufferError::UnknownPatch(id))
    }

    fn patch_mut(&mut self, id: PatchId) -> Result<&mut Patch, BufferError> {
        self.patches
            .get_mut(id.0)
            .and_then(|slot| slot.as_mut())
            .ok_or(BufferError::UnknownPatch(id))
    }
}
