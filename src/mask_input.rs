//! Text input widget with a format template and a character mask.
//!
//! * Format: the text shown before anything is entered. ex: `MM/DD/YY`
//! * Mask: the accepted character class for each position of the format.
//!   ex: `dd*dd*dd`
//!   * `d`: decimal digit
//!   * `D`: anything but a decimal digit
//!   * `a`: letter
//!   * `A`: anything but a letter
//!   * `c`: letter or digit
//!   * `C`: anything but a letter or digit
//!   * `h`: hex digit
//!   * `.`: anything (default for positions past the end of the mask)
//!   * `*`: delimiter, not editable
//! * Case: `a` shows lower case, `A` upper case, per position
//!   or one char for the whole field.
//!
//! Typing only ever fills the editable positions, the cursor jumps over
//! the delimiters. Chars not accepted by the mask are dropped.
//!
//! ```rust ignore
//! use rat_mask::HasScreenCursor;
//! use rat_mask::mask_input::{MaskInput, MaskInputState};
//! use ratatui_core::widgets::StatefulWidget;
//!
//! let mut date_state = MaskInputState::new();
//! date_state.set_format("MM/DD/YY", "dd*dd*dd");
//!
//! MaskInput::new().render(area, &mut buf, &mut date_state);
//! if let Some((cx, cy)) = date_state.screen_cursor() {
//!     frame.set_cursor_position((cx, cy));
//! }
//! ```
//!
//! The visual cursor must be set separately after rendering.
//! It is accessible as [HasScreenCursor::screen_cursor()] after rendering.
//!
//! Event handling by calling the freestanding fn [handle_events].
//! There's [handle_mouse_events] if you want to override the default key bindings but keep
//! the mouse behaviour.
//!

use crate::_private::NonExhaustive;
use crate::core::{MaskCore, MaskObserver};
use crate::event::{MaskOutcome, ReadOnly};
use crate::presets::MaskPreset;
use crate::{MaskColors, MaskError, MaskGlyph, MaskStatus, MaskStyle};
use rat_cursor::HasScreenCursor;
use rat_event::{HandleEvent, MouseOnly, Regular, ct_event};
use rat_focus::{FocusBuilder, FocusFlag, HasFocus};
use ratatui_core::buffer::Buffer;
use ratatui_core::layout::Rect;
use ratatui_core::style::{Color, Style};
use ratatui_core::widgets::{StatefulWidget, Widget};
use ratatui_crossterm::crossterm::event::Event;
use ratatui_widgets::block::Block;
use std::ops::Range;
use unicode_width::UnicodeWidthChar;

/// Text input widget with format and mask.
///
/// # Stateful
/// This widget implements [`StatefulWidget`], you can use it with
/// [`MaskInputState`] to handle common actions.
#[derive(Debug, Default, Clone)]
pub struct MaskInput<'a> {
    block: Option<Block<'a>>,
    style: Style,
    focus_style: Option<Style>,
    select_style: Option<Style>,
    colors: Option<MaskColors>,
}

/// State & event-handling.
#[derive(Debug)]
pub struct MaskInputState {
    /// The whole area with block.
    /// __read only__ renewed with each render.
    pub area: Rect,
    /// Area inside a possible block.
    /// __read only__ renewed with each render.
    pub inner: Rect,

    /// Display offset in slots.
    /// __read+write__
    pub offset: usize,

    /// Editing core
    pub value: MaskCore,

    /// Current focus state.
    /// __read+write__
    pub focus: FocusFlag,

    /// Construct with `..Default::default()`
    pub non_exhaustive: NonExhaustive,
}

impl<'a> MaskInput<'a> {
    /// New widget.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the combined style.
    #[inline]
    pub fn styles_opt(self, styles: Option<MaskStyle>) -> Self {
        if let Some(styles) = styles {
            self.styles(styles)
        } else {
            self
        }
    }

    /// Set the combined style.
    #[inline]
    pub fn styles(mut self, styles: MaskStyle) -> Self {
        self.style = styles.style;
        if styles.focus.is_some() {
            self.focus_style = styles.focus;
        }
        if styles.colors.is_some() {
            self.colors = styles.colors;
        }
        if let Some(border_style) = styles.border_style {
            self.block = self.block.map(|v| v.border_style(border_style));
        }
        if styles.block.is_some() {
            self.block = styles.block;
        }
        self.block = self.block.map(|v| v.style(self.style));
        self
    }

    /// Base text style.
    #[inline]
    pub fn style(mut self, style: impl Into<Style>) -> Self {
        self.style = style.into();
        self.block = self.block.map(|v| v.style(self.style));
        self
    }

    /// Style when focused.
    #[inline]
    pub fn focus_style(mut self, style: impl Into<Style>) -> Self {
        self.focus_style = Some(style.into());
        self
    }

    /// Style for selection
    #[inline]
    pub fn select_style(mut self, style: impl Into<Style>) -> Self {
        self.select_style = Some(style.into());
        self
    }

    /// Glyph colors. Overrides the colors of the state.
    #[inline]
    pub fn colors(mut self, colors: MaskColors) -> Self {
        self.colors = Some(colors);
        self
    }

    /// Block.
    #[inline]
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self.block = self.block.map(|v| v.style(self.style));
        self
    }
}

impl<'a> StatefulWidget for &MaskInput<'a> {
    type State = MaskInputState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        render_ref(self, area, buf, state);
    }
}

impl StatefulWidget for MaskInput<'_> {
    type State = MaskInputState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        render_ref(&self, area, buf, state);
    }
}

fn render_ref(widget: &MaskInput<'_>, area: Rect, buf: &mut Buffer, state: &mut MaskInputState) {
    state.area = area;
    state.inner = match &widget.block {
        Some(block) => block.inner(area),
        None => area,
    };
    if let Some(colors) = widget.colors {
        if colors != state.value.colors() {
            _ = state.value.set_colors(colors);
        }
    }

    let style = widget.style;
    let focus_style = widget.focus_style.unwrap_or(style);
    let select_style = widget
        .select_style
        .unwrap_or_else(|| Style::default().fg(Color::Black).bg(Color::Yellow));
    let (style, select_style) = if state.focus.get() {
        (
            style.patch(focus_style),
            style.patch(focus_style).patch(select_style),
        )
    } else {
        (style, style)
    };

    // set base style
    if let Some(block) = &widget.block {
        block.render(area, buf);
    } else {
        buf.set_style(area, style);
    }

    if state.inner.width == 0 || state.inner.height == 0 {
        // noop
        return;
    }

    state.scroll_cursor_to_visible();

    let colors = state.value.colors();
    let selection = state.selection();
    let right = state.inner.right();
    let mut x = state.inner.x;
    for (pos, g) in state
        .value
        .render()
        .into_iter()
        .enumerate()
        .skip(state.offset)
    {
        let width = glyph_width(g.glyph);
        if x + width > right {
            break;
        }

        let mut glyph_style = style.fg(colors.color(g.role));
        if selection.contains(&pos) {
            glyph_style = glyph_style.patch(select_style);
        }

        if let Some(cell) = buf.cell_mut((x, state.inner.y)) {
            cell.set_char(g.glyph);
            cell.set_style(glyph_style);
        }
        // clear the rest of the cells to avoid interferences.
        for d in 1..width {
            if let Some(cell) = buf.cell_mut((x + d, state.inner.y)) {
                cell.reset();
                cell.set_style(glyph_style);
            }
        }
        x += width;
    }
}

/// Every slot takes at least one cell.
fn glyph_width(c: char) -> u16 {
    c.width().unwrap_or(1).max(1) as u16
}

impl Default for MaskInputState {
    fn default() -> Self {
        Self {
            area: Default::default(),
            inner: Default::default(),
            offset: Default::default(),
            value: Default::default(),
            focus: Default::default(),
            non_exhaustive: NonExhaustive,
        }
    }
}

impl Clone for MaskInputState {
    fn clone(&self) -> Self {
        Self {
            area: self.area,
            inner: self.inner,
            offset: self.offset,
            value: self.value.clone(),
            focus: self.focus.new_instance(),
            non_exhaustive: NonExhaustive,
        }
    }
}

impl HasFocus for MaskInputState {
    fn build(&self, builder: &mut FocusBuilder) {
        builder.leaf_widget(self);
    }

    fn focus(&self) -> FocusFlag {
        self.focus.clone()
    }

    fn area(&self) -> Rect {
        self.area
    }
}

impl MaskInputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: &str) -> Self {
        Self {
            focus: FocusFlag::new().with_name(name),
            ..MaskInputState::default()
        }
    }

    /// With format and mask.
    pub fn with_format(mut self, format: impl AsRef<str>, mask: impl AsRef<str>) -> Self {
        self.set_format(format, mask);
        self
    }

    /// With format, mask and case of a preset.
    pub fn with_preset(mut self, preset: &MaskPreset) -> Self {
        self.set_format(preset.format, preset.mask);
        self.set_case(preset.case);
        self
    }

    /// Set format and mask. This resets the value.
    ///
    /// See [MaskCore::set_format]
    #[inline]
    pub fn set_format(&mut self, format: impl AsRef<str>, mask: impl AsRef<str>) {
        self.offset = 0;
        self.value.set_format(format, mask);
    }

    /// Set format and mask. This resets the value.
    /// Fails for unknown class tags.
    #[inline]
    pub fn try_set_format(
        &mut self,
        format: impl AsRef<str>,
        mask: impl AsRef<str>,
    ) -> Result<(), MaskError> {
        self.value.try_set_format(format, mask)?;
        self.offset = 0;
        Ok(())
    }

    /// Format string.
    #[inline]
    pub fn format(&self) -> String {
        self.value.format()
    }

    /// Mask string.
    #[inline]
    pub fn mask(&self) -> String {
        self.value.mask()
    }

    /// Set the case transform.
    ///
    /// See [MaskCore::set_case]
    #[inline]
    pub fn set_case(&mut self, case: impl AsRef<str>) {
        self.value.set_case(case);
    }

    /// Glyph colors.
    #[inline]
    pub fn colors(&self) -> MaskColors {
        self.value.colors()
    }

    /// Set the colors for unfilled slots, delimiters and filled slots.
    /// Returns the glyphs with the new colors.
    #[inline]
    pub fn set_colors(&mut self, colors: MaskColors) -> Vec<MaskGlyph> {
        self.value.set_colors(colors)
    }

    /// Observer for begin-edit, end-edit and change.
    #[inline]
    pub fn set_observer(&mut self, observer: Option<impl MaskObserver + 'static>) {
        self.value.set_observer(observer);
    }
}

impl MaskInputState {
    /// Fill state.
    #[inline]
    pub fn status(&self) -> MaskStatus {
        self.value.status()
    }

    /// Values per run of editable slots.
    #[inline]
    pub fn components(&self) -> Vec<String> {
        self.value.components()
    }

    /// Text as displayed.
    #[inline]
    pub fn raw_text(&self) -> String {
        self.value.raw_text()
    }

    /// Entered values only.
    #[inline]
    pub fn edited_text(&self) -> String {
        self.value.edited_text()
    }

    /// Value of a complete hex color field.
    #[inline]
    pub fn color_value(&self) -> Option<Color> {
        self.value.hex_color()
    }

    /// Slot count.
    #[inline]
    pub fn len(&self) -> usize {
        self.value.len()
    }

    /// No slots at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl MaskInputState {
    /// Cursor position.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.value.cursor()
    }

    /// Set the cursor position.
    #[inline]
    pub fn set_cursor(&mut self, cursor: usize, extend_selection: bool) -> bool {
        self.value.set_cursor(cursor, extend_selection)
    }

    /// Cursor to the first editable slot.
    #[inline]
    pub fn set_default_cursor(&mut self) {
        self.value.set_default_cursor();
    }

    /// Selection anchor.
    #[inline]
    pub fn anchor(&self) -> usize {
        self.value.anchor()
    }

    /// Any selection.
    #[inline]
    pub fn has_selection(&self) -> bool {
        self.value.has_selection()
    }

    /// Selection.
    #[inline]
    pub fn selection(&self) -> Range<usize> {
        self.value.selection()
    }

    /// Set the selection.
    #[inline]
    pub fn set_selection(&mut self, anchor: usize, cursor: usize) -> bool {
        self.value.set_selection(anchor, cursor)
    }

    /// Select everything.
    #[inline]
    pub fn select_all(&mut self) -> bool {
        self.value.select_all()
    }

    #[inline]
    pub fn move_left(&mut self, extend_selection: bool) -> bool {
        self.value.move_left(extend_selection)
    }

    #[inline]
    pub fn move_right(&mut self, extend_selection: bool) -> bool {
        self.value.move_right(extend_selection)
    }

    #[inline]
    pub fn move_to_start(&mut self, extend_selection: bool) -> bool {
        self.value.move_to_start(extend_selection)
    }

    #[inline]
    pub fn move_to_end(&mut self, extend_selection: bool) -> bool {
        self.value.move_to_end(extend_selection)
    }
}

impl MaskInputState {
    /// Replace a range with the replacement.
    ///
    /// See [MaskCore::apply_edit]
    #[inline]
    pub fn apply_edit(&mut self, start: usize, len: usize, replacement: &str) -> bool {
        self.value.apply_edit(start, len, replacement)
    }

    /// Replace a range with the replacement.
    #[inline]
    pub fn try_apply_edit(
        &mut self,
        start: usize,
        len: usize,
        replacement: &str,
    ) -> Result<bool, MaskError> {
        self.value.try_apply_edit(start, len, replacement)
    }

    /// Insert the text at the start.
    #[inline]
    pub fn update_text(&mut self, text: &str) -> bool {
        self.value.update_text(text)
    }

    /// Clear all values.
    #[inline]
    pub fn clear_text(&mut self) -> bool {
        self.offset = 0;
        self.value.clear_text()
    }

    /// Insert a char at the cursor, replacing the selection.
    pub fn insert_char(&mut self, c: char) -> bool {
        let mut buf = [0u8; 4];
        self.insert_str(c.encode_utf8(&mut buf))
    }

    /// Insert a text at the cursor, replacing the selection.
    pub fn insert_str(&mut self, text: &str) -> bool {
        let sel = self.selection();
        self.value.apply_edit(sel.start, sel.len(), text)
    }

    /// Clear the range.
    #[inline]
    pub fn delete_range(&mut self, range: Range<usize>) -> bool {
        self.value.apply_edit(range.start, range.len(), "")
    }

    /// Clear the selection or the slot before the cursor.
    pub fn delete_prev_char(&mut self) -> bool {
        if self.has_selection() {
            self.delete_range(self.selection())
        } else if self.cursor() == 0 {
            false
        } else {
            let pos = self.cursor() - 1;
            self.delete_range(pos..pos + 1)
        }
    }

    /// Clear the selection or the slot after the cursor.
    pub fn delete_next_char(&mut self) -> bool {
        if self.has_selection() {
            self.delete_range(self.selection())
        } else if self.cursor() >= self.len() {
            false
        } else {
            let pos = self.cursor();
            self.delete_range(pos..pos + 1)
        }
    }

    /// Fires the end-edit and begin-edit notifications
    /// for the lost/gained flags of the focus.
    pub fn sync_focus(&mut self) -> bool {
        let mut changed = false;
        if self.lost_focus() {
            self.value.end_edit();
            changed = true;
        }
        if self.gained_focus() {
            self.value.begin_edit();
            changed = true;
        }
        changed
    }
}

impl MaskInputState {
    /// Screen width of the slots in the range.
    fn range_width(&self, range: Range<usize>) -> usize {
        self.value.slots()[range]
            .iter()
            .map(|v| glyph_width(v.value()) as usize)
            .sum()
    }

    /// Change the offset in a way that the cursor is visible.
    pub fn scroll_cursor_to_visible(&mut self) {
        let cursor = self.cursor();
        let width = self.inner.width as usize;
        if cursor < self.offset {
            self.offset = cursor;
        } else {
            while self.offset < cursor && self.range_width(self.offset..cursor) >= width {
                self.offset += 1;
            }
        }
    }

    /// Converts from a widget relative screen column to a slot position.
    pub fn screen_to_col(&self, scx: u16) -> usize {
        let mut sx = 0;
        for pos in self.offset..self.len() {
            let width = glyph_width(self.value.slots()[pos].value());
            if scx < sx + width {
                return pos;
            }
            sx += width;
        }
        self.len()
    }

    /// Set the cursor from a screen column relative to the inner area.
    pub fn set_screen_cursor(&mut self, scx: u16, extend_selection: bool) -> bool {
        let pos = self.screen_to_col(scx);
        self.set_cursor(pos, extend_selection)
    }
}

impl HasScreenCursor for MaskInputState {
    /// The current text cursor as an absolute screen position.
    fn screen_cursor(&self) -> Option<(u16, u16)> {
        if !self.is_focused() || self.has_selection() {
            return None;
        }
        let cursor = self.cursor();
        if cursor < self.offset {
            return None;
        }
        let sx = self.range_width(self.offset..cursor);
        if sx >= self.inner.width as usize {
            None
        } else {
            Some((self.inner.x + sx as u16, self.inner.y))
        }
    }
}

/// Result of an edit, checks for cursor movement too.
fn edit_outcome(
    state: &mut MaskInputState,
    f: impl FnOnce(&mut MaskInputState) -> bool,
) -> MaskOutcome {
    let old = (state.cursor(), state.anchor());
    if f(state) {
        MaskOutcome::TextChanged
    } else if old != (state.cursor(), state.anchor()) {
        MaskOutcome::Changed
    } else {
        MaskOutcome::Unchanged
    }
}

impl HandleEvent<Event, Regular, MaskOutcome> for MaskInputState {
    fn handle(&mut self, event: &Event, _keymap: Regular) -> MaskOutcome {
        // focus behaviour
        let focus_changed = self.sync_focus();

        let mut r = if self.focus.get() {
            match event {
                ct_event!(key press c)
                | ct_event!(key press SHIFT-c)
                | ct_event!(key press CONTROL_ALT-c) => edit_outcome(self, |s| s.insert_char(*c)),
                ct_event!(paste text) => edit_outcome(self, |s| s.insert_str(text)),
                ct_event!(keycode press Backspace) => {
                    edit_outcome(self, |s| s.delete_prev_char())
                }
                ct_event!(keycode press Delete) => edit_outcome(self, |s| s.delete_next_char()),
                ct_event!(key press CONTROL-'d') => edit_outcome(self, |s| s.clear_text()),

                ct_event!(key release _)
                | ct_event!(key release SHIFT-_)
                | ct_event!(key release CONTROL_ALT-_)
                | ct_event!(keycode release Backspace)
                | ct_event!(keycode release Delete)
                | ct_event!(key release CONTROL-'d') => MaskOutcome::Unchanged,

                _ => MaskOutcome::Continue,
            }
        } else {
            MaskOutcome::Continue
        };

        if r == MaskOutcome::Continue {
            r = self.handle(event, ReadOnly);
        }
        if r == MaskOutcome::Continue && focus_changed {
            r = MaskOutcome::Changed;
        }
        r
    }
}

impl HandleEvent<Event, ReadOnly, MaskOutcome> for MaskInputState {
    fn handle(&mut self, event: &Event, _keymap: ReadOnly) -> MaskOutcome {
        let mut r = if self.focus.get() {
            match event {
                ct_event!(keycode press Left) => self.move_left(false).into(),
                ct_event!(keycode press Right) => self.move_right(false).into(),
                ct_event!(keycode press Home) => self.move_to_start(false).into(),
                ct_event!(keycode press End) => self.move_to_end(false).into(),
                ct_event!(keycode press SHIFT-Left) => self.move_left(true).into(),
                ct_event!(keycode press SHIFT-Right) => self.move_right(true).into(),
                ct_event!(keycode press SHIFT-Home) => self.move_to_start(true).into(),
                ct_event!(keycode press SHIFT-End) => self.move_to_end(true).into(),
                ct_event!(key press CONTROL-'a') => self.select_all().into(),

                ct_event!(keycode release Left)
                | ct_event!(keycode release Right)
                | ct_event!(keycode release Home)
                | ct_event!(keycode release End)
                | ct_event!(keycode release SHIFT-Left)
                | ct_event!(keycode release SHIFT-Right)
                | ct_event!(keycode release SHIFT-Home)
                | ct_event!(keycode release SHIFT-End)
                | ct_event!(key release CONTROL-'a') => MaskOutcome::Unchanged,

                _ => MaskOutcome::Continue,
            }
        } else {
            MaskOutcome::Continue
        };

        if r == MaskOutcome::Continue {
            r = self.handle(event, MouseOnly);
        }
        r
    }
}

impl HandleEvent<Event, MouseOnly, MaskOutcome> for MaskInputState {
    fn handle(&mut self, event: &Event, _keymap: MouseOnly) -> MaskOutcome {
        match event {
            ct_event!(mouse down Left for column, row) => {
                if self.inner.contains((*column, *row).into()) {
                    let c = column - self.inner.x;
                    self.set_screen_cursor(c, false).into()
                } else {
                    MaskOutcome::Continue
                }
            }
            ct_event!(mouse down SHIFT-Left for column, row) => {
                if self.inner.contains((*column, *row).into()) {
                    let c = column - self.inner.x;
                    self.set_screen_cursor(c, true).into()
                } else {
                    MaskOutcome::Continue
                }
            }
            _ => MaskOutcome::Continue,
        }
    }
}

/// Handle all events.
/// Text events are only processed if focus is true.
/// Mouse events are processed if they are in range.
///
/// Without a `Focus` this sets the gained/lost flags for the
/// given focus, which starts and ends the edit session.
pub fn handle_events(state: &mut MaskInputState, focus: bool, event: &Event) -> MaskOutcome {
    let old_focus = state.focus.get();
    state.focus.set(focus);
    state.focus.set_gained(focus && !old_focus);
    state.focus.set_lost(!focus && old_focus);
    state.handle(event, Regular)
}

/// Handle only navigation events.
/// Text events are only processed if focus is true.
/// Mouse events are processed if they are in range.
pub fn handle_readonly_events(
    state: &mut MaskInputState,
    focus: bool,
    event: &Event,
) -> MaskOutcome {
    state.focus.set(focus);
    state.handle(event, ReadOnly)
}

/// Handle only mouse-events.
pub fn handle_mouse_events(state: &mut MaskInputState, event: &Event) -> MaskOutcome {
    state.handle(event, MouseOnly)
}
