//!
//! Editing core for a masked field.
//!
//! The field is a fixed sequence of [Slot]s, one per char of the
//! format string. The mask assigns a [ClassTag] to each slot,
//! `*` marks a delimiter. Everything else can be edited.
//!
//! All positions are char positions, not byte offsets.
//!

use crate::mask_slot::{CaseDirective, ClassTag, Slot};
use crate::presets::MaskPreset;
use crate::{ColorRole, MaskColors, MaskError, MaskGlyph, MaskStatus};
use log::debug;
use ratatui_core::style::Color;
use std::cmp::min;
use std::fmt;
use std::fmt::{Debug, Formatter};
use std::ops::Range;

/// Notifications from the [MaskCore].
///
/// All callbacks default to a no-op. They are called synchronously
/// from within the operation that triggers them.
pub trait MaskObserver {
    /// Editing started. The field gained the focus.
    fn begin_edit(&mut self, _core: &MaskCore) {}

    /// Editing ended. The field lost the focus.
    fn end_edit(&mut self, _core: &MaskCore) {}

    /// Some slot changed by an insert, replace or delete.
    /// Called after the cursor has been repositioned.
    fn changed(&mut self, _core: &MaskCore) {}
}

/// Core for masked editing.
#[derive(Default)]
pub struct MaskCore {
    slots: Vec<Slot>,
    case: Vec<CaseDirective>,
    colors: MaskColors,

    cursor: usize,
    anchor: usize,

    observer: Option<Box<dyn MaskObserver>>,
}

impl Debug for MaskCore {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaskCore")
            .field("slots", &self.slots)
            .field("case", &self.case)
            .field("colors", &self.colors)
            .field("cursor", &self.cursor)
            .field("anchor", &self.anchor)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

/// The observer is not cloned.
impl Clone for MaskCore {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            case: self.case.clone(),
            colors: self.colors,
            cursor: self.cursor,
            anchor: self.anchor,
            observer: None,
        }
    }
}

impl MaskCore {
    pub fn new() -> Self {
        Self::default()
    }

    /// New core with format and mask.
    pub fn with_format(format: impl AsRef<str>, mask: impl AsRef<str>) -> Self {
        let mut s = Self::default();
        s.set_format(format, mask);
        s
    }

    /// New core with format, mask and case of the preset.
    pub fn from_preset(preset: &MaskPreset) -> Self {
        let mut s = Self::with_format(preset.format, preset.mask);
        s.set_case(preset.case);
        s
    }

    /// Set format and mask. This resets all values.
    ///
    /// The format string gives the text shown while a slot is empty.
    /// The mask gives the [ClassTag] for each position of the format.
    /// If the mask is shorter than the format, the remaining positions
    /// accept any char.
    ///
    /// The cursor moves to the first editable slot.
    pub fn set_format(&mut self, format: impl AsRef<str>, mask: impl AsRef<str>) {
        let mut mask = mask.as_ref().chars();
        self.slots = format
            .as_ref()
            .chars()
            .map(|c| Slot::new(c, mask.next().map(ClassTag::parse).unwrap_or_default()))
            .collect();
        self.apply_case();
        debug!(
            "mask compiled {} slots, {} editable",
            self.slots.len(),
            self.slots.iter().filter(|v| v.is_editable()).count()
        );
        self.set_default_cursor();
    }

    /// Set format and mask. This resets all values.
    ///
    /// Fails for any unknown class tag in the mask, and
    /// leaves the current configuration as it is.
    pub fn try_set_format(
        &mut self,
        format: impl AsRef<str>,
        mask: impl AsRef<str>,
    ) -> Result<(), MaskError> {
        for (pos, c) in mask.as_ref().chars().enumerate() {
            if let Err(e) = ClassTag::try_parse(pos, c) {
                debug!("refused mask {:?}: {}", mask.as_ref(), e);
                return Err(e);
            }
        }
        self.set_format(format, mask);
        Ok(())
    }

    /// Format string.
    pub fn format(&self) -> String {
        self.slots.iter().map(|v| v.literal).collect()
    }

    /// Mask string.
    pub fn mask(&self) -> String {
        self.slots.iter().map(|v| v.class.tag()).collect()
    }

    /// Set the case transform.
    ///
    /// * `a`: lower case
    /// * `A`: upper case
    /// * anything else leaves the char as it is.
    ///
    /// A single char applies to every slot, otherwise the case
    /// string is matched position by position.
    ///
    /// The transform is applied to the values with the next
    /// edit or render, and it replaces the value in the slot.
    pub fn set_case(&mut self, case: impl AsRef<str>) {
        self.case = case.as_ref().chars().map(CaseDirective::parse).collect();
    }

    /// Case string.
    pub fn case(&self) -> String {
        self.case
            .iter()
            .map(|v| match v {
                CaseDirective::Lower => 'a',
                CaseDirective::Upper => 'A',
                CaseDirective::Keep => '.',
            })
            .collect()
    }

    /// Colors for rendering.
    #[inline]
    pub fn colors(&self) -> MaskColors {
        self.colors
    }

    /// Set the colors and render anew.
    /// The cursor stays where it is.
    pub fn set_colors(&mut self, colors: MaskColors) -> Vec<MaskGlyph> {
        self.colors = colors;
        self.render()
    }

    /// Set the observer for edit notifications.
    pub fn set_observer(&mut self, observer: Option<impl MaskObserver + 'static>) {
        match observer {
            None => self.observer = None,
            Some(v) => self.observer = Some(Box::new(v)),
        }
    }

    /// Has an observer.
    #[inline]
    pub fn has_observer(&self) -> bool {
        self.observer.is_some()
    }

    fn notify(&mut self, f: impl FnOnce(&mut dyn MaskObserver, &MaskCore)) {
        if let Some(mut observer) = self.observer.take() {
            f(observer.as_mut(), self);
            self.observer = Some(observer);
        }
    }
}

impl MaskCore {
    /// Number of slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// No slots.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// All slots.
    #[inline]
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Slot at position.
    #[inline]
    pub fn slot(&self, pos: usize) -> Option<&Slot> {
        self.slots.get(pos)
    }

    /// First editable slot at or after `from`.
    pub fn find_forward(&self, from: usize) -> Option<usize> {
        (from..self.slots.len()).find(|&i| self.slots[i].is_editable())
    }

    /// Last editable slot at or before `from`.
    pub fn find_backward(&self, from: usize) -> Option<usize> {
        if self.slots.is_empty() {
            return None;
        }
        let from = min(from, self.slots.len() - 1);
        (0..=from).rev().find(|&i| self.slots[i].is_editable())
    }
}

impl MaskCore {
    /// Cursor position.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Selection anchor.
    #[inline]
    pub fn anchor(&self) -> usize {
        self.anchor
    }

    /// Set the cursor. The position is capped to the slot count.
    pub fn set_cursor(&mut self, cursor: usize, extend_selection: bool) -> bool {
        let old_cursor = self.cursor;
        let old_anchor = self.anchor;

        self.cursor = min(cursor, self.slots.len());
        if !extend_selection {
            self.anchor = self.cursor;
        }

        old_cursor != self.cursor || old_anchor != self.anchor
    }

    /// Cursor to the first editable slot, or 0.
    pub fn set_default_cursor(&mut self) {
        let pos = self.find_forward(0).unwrap_or(0);
        self.set_cursor(pos, false);
    }

    /// Any selection.
    #[inline]
    pub fn has_selection(&self) -> bool {
        self.anchor != self.cursor
    }

    /// Selected range.
    #[inline]
    pub fn selection(&self) -> Range<usize> {
        if self.cursor < self.anchor {
            self.cursor..self.anchor
        } else {
            self.anchor..self.cursor
        }
    }

    /// Set the selection. Both anchor and cursor are capped.
    pub fn set_selection(&mut self, anchor: usize, cursor: usize) -> bool {
        let old_selection = self.selection();

        self.set_cursor(anchor, false);
        self.set_cursor(cursor, true);

        old_selection != self.selection()
    }

    /// Select all slots.
    pub fn select_all(&mut self) -> bool {
        self.set_selection(0, self.slots.len())
    }

    /// A cursor position right before or right after an editable slot.
    fn is_caret(&self, pos: usize) -> bool {
        let before = self.slots.get(pos).is_some_and(|v| v.is_editable());
        let after = pos > 0 && self.slots.get(pos - 1).is_some_and(|v| v.is_editable());
        before || after
    }

    /// Move to the next cursor position next to an editable slot.
    pub fn move_right(&mut self, extend_selection: bool) -> bool {
        let pos = (self.cursor + 1..=self.slots.len())
            .find(|&i| self.is_caret(i))
            .unwrap_or(self.cursor);
        self.set_cursor(pos, extend_selection)
    }

    /// Move to the previous cursor position next to an editable slot.
    pub fn move_left(&mut self, extend_selection: bool) -> bool {
        let pos = (0..self.cursor)
            .rev()
            .find(|&i| self.is_caret(i))
            .unwrap_or(self.cursor);
        self.set_cursor(pos, extend_selection)
    }

    /// Move to the first editable slot.
    pub fn move_to_start(&mut self, extend_selection: bool) -> bool {
        let pos = self.find_forward(0).unwrap_or(0);
        self.set_cursor(pos, extend_selection)
    }

    /// Move behind the last editable slot.
    pub fn move_to_end(&mut self, extend_selection: bool) -> bool {
        let pos = match self.slots.len().checked_sub(1) {
            Some(last) => self.find_backward(last).map(|v| v + 1).unwrap_or(0),
            None => 0,
        };
        self.set_cursor(pos, extend_selection)
    }
}

impl MaskCore {
    /// Replace the range `start..start+len` with the replacement.
    ///
    /// * With a replacement, each char is matched against the next
    ///   editable slot. Rejected chars are skipped. Writing stops when
    ///   there are no more editable slots, or with a selection shorter
    ///   than the replacement when it reaches the end of the selection.
    /// * Without a replacement all slots in the range are cleared.
    ///
    /// Returns false and changes nothing if start is not a valid slot.
    /// Returns true if any slot changed.
    pub fn apply_edit(&mut self, start: usize, len: usize, replacement: &str) -> bool {
        match self.try_apply_edit(start, len, replacement) {
            Ok(v) => v,
            Err(e) => {
                debug!("edit rejected: {}", e);
                false
            }
        }
    }

    /// Replace the range `start..start+len` with the replacement.
    ///
    /// See [MaskCore::apply_edit].
    pub fn try_apply_edit(
        &mut self,
        start: usize,
        len: usize,
        replacement: &str,
    ) -> Result<bool, MaskError> {
        if start >= self.slots.len() {
            return Err(MaskError::PositionOutOfBounds(start, self.slots.len()));
        }

        let (changed, cursor) = if replacement.is_empty() {
            self.clear_range(start, len)
        } else {
            self.fill_range(start, len, replacement)
        };

        self.set_cursor(cursor, false);
        if changed {
            self.notify(|o, core| o.changed(core));
        }
        Ok(changed)
    }

    fn fill_range(&mut self, start: usize, len: usize, replacement: &str) -> (bool, usize) {
        let input_len = replacement.chars().count();
        let bounded = len > 0 && len < input_len;
        let count = if len == 0 { input_len } else { min(len, input_len) };
        let end = start + count;

        let mut next = start;
        let mut changed = false;
        for c in replacement.chars().take(count) {
            let Some(pos) = self.find_forward(next) else {
                break;
            };
            if bounded && pos >= end {
                break;
            }
            if self.slots[pos].fill(c) {
                next = pos + 1;
                changed = true;
            }
        }

        if changed {
            self.apply_case();
            (true, next)
        } else {
            (false, start)
        }
    }

    fn clear_range(&mut self, start: usize, len: usize) -> (bool, usize) {
        let end = min(start.saturating_add(len), self.slots.len());

        let mut changed = false;
        for slot in &mut self.slots[start..end] {
            changed |= slot.clear();
        }
        self.apply_case();

        let cursor = match start.checked_sub(1).and_then(|v| self.find_backward(v)) {
            Some(pos) => pos + 1,
            None => self.find_forward(start).unwrap_or(start),
        };
        (changed, cursor)
    }

    /// Insert the text at the start of the field.
    /// Does nothing for an empty text.
    pub fn update_text(&mut self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        self.apply_edit(0, 0, text)
    }

    /// Clear all values. Format, mask and case stay as they are.
    /// The cursor moves to the first editable slot.
    ///
    /// Returns true if there was any value.
    pub fn clear_text(&mut self) -> bool {
        let mut changed = false;
        for slot in &mut self.slots {
            changed |= slot.clear();
        }
        self.set_default_cursor();
        changed
    }

    /// Editing begins. Restores the last cursor and
    /// notifies the observer.
    pub fn begin_edit(&mut self) {
        self.set_cursor(self.cursor, false);
        self.notify(|o, core| o.begin_edit(core));
    }

    /// Editing ends. Notifies the observer.
    pub fn end_edit(&mut self) {
        self.notify(|o, core| o.end_edit(core));
    }

    /// Case transform for the position.
    fn case_at(&self, pos: usize) -> CaseDirective {
        if self.case.len() == 1 {
            self.case[0]
        } else {
            self.case.get(pos).copied().unwrap_or_default()
        }
    }

    /// Writes the case transform back to the filled slots.
    fn apply_case(&mut self) {
        if self.case.is_empty() {
            return;
        }
        for pos in 0..self.slots.len() {
            if self.slots[pos].is_filled() {
                let case = self.case_at(pos);
                self.slots[pos].value = case.apply(self.slots[pos].value);
            }
        }
    }
}

impl MaskCore {
    /// Fill state.
    pub fn status(&self) -> MaskStatus {
        let mut editable = 0;
        let mut filled = 0;
        for slot in &self.slots {
            if slot.is_editable() {
                editable += 1;
                if !slot.cleared {
                    filled += 1;
                }
            }
        }

        if filled == 0 {
            MaskStatus::Clear
        } else if filled == editable {
            MaskStatus::Complete
        } else {
            MaskStatus::Incomplete
        }
    }

    /// Values of each run of editable slots.
    ///
    /// Runs are separated by delimiters. Each run with at least one
    /// editable slot gives one component, which holds the filled values
    /// of the run. Empty slots add nothing, so a run without values
    /// gives an empty string.
    pub fn components(&self) -> Vec<String> {
        let mut components = Vec::new();
        let mut buf = String::new();
        let mut count = 0;

        let last = self.slots.len().saturating_sub(1);
        for (pos, slot) in self.slots.iter().enumerate() {
            if slot.is_editable() {
                if !slot.cleared {
                    buf.push(slot.value);
                }
                count += 1;
            }
            if (!slot.is_editable() || pos == last) && count > 0 {
                components.push(std::mem::take(&mut buf));
                count = 0;
            }
        }
        components
    }

    /// The text as displayed. Empty slots show their format char.
    pub fn raw_text(&self) -> String {
        self.slots.iter().map(|v| v.value).collect()
    }

    /// Only the entered values.
    pub fn edited_text(&self) -> String {
        self.slots
            .iter()
            .filter(|v| v.is_filled())
            .map(|v| v.value)
            .collect()
    }

    /// Parse a complete field of 6 or 8 hex digits as a color.
    /// The alpha part is checked but not used.
    pub fn hex_color(&self) -> Option<Color> {
        if self.status() != MaskStatus::Complete {
            return None;
        }
        let text = self.edited_text();
        if !(text.len() == 6 || text.len() == 8) || !text.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let mut parts = [0u8; 4];
        for (i, part) in parts.iter_mut().enumerate().take(text.len() / 2) {
            *part = u8::from_str_radix(&text[i * 2..i * 2 + 2], 16).ok()?;
        }
        Some(Color::Rgb(parts[0], parts[1], parts[2]))
    }
}

impl MaskCore {
    /// Role of the slot at the position.
    pub fn role(&self, pos: usize) -> Option<ColorRole> {
        self.slots.get(pos).map(|v| {
            if !v.is_editable() {
                ColorRole::Delimiter
            } else if v.cleared {
                ColorRole::Unfilled
            } else {
                ColorRole::Filled
            }
        })
    }

    /// Applies the case transform and returns the glyphs.
    pub fn render(&mut self) -> Vec<MaskGlyph> {
        self.apply_case();
        self.glyphs().collect()
    }

    /// Glyphs as they are now.
    pub fn glyphs(&self) -> impl Iterator<Item = MaskGlyph> + '_ {
        self.slots.iter().enumerate().map(|(pos, v)| MaskGlyph {
            glyph: v.value,
            role: self.role(pos).unwrap_or(ColorRole::Delimiter),
        })
    }
}
