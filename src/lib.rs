#![doc = include_str!("../readme.md")]
#![allow(clippy::uninlined_format_args)]
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod mask_input;
pub mod presets;

mod mask_core;
mod mask_slot;

pub use mask_core::MaskObserver;
pub use mask_slot::{CaseDirective, ClassTag, Slot};
pub use rat_cursor::{HasScreenCursor, impl_screen_cursor, screen_cursor};

use crate::_private::NonExhaustive;
use ratatui_core::style::{Color, Style};
use ratatui_widgets::block::Block;

pub mod event {
    //!
    //! Event-handler traits and Keybindings.
    //!

    pub use rat_event::*;

    /// Runs only the navigation events, not any editing.
    #[derive(Debug)]
    pub struct ReadOnly;

    /// Result of event handling.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    pub enum MaskOutcome {
        /// The given event has not been used at all.
        Continue,
        /// The event has been recognized, but the result was nil.
        /// Further processing for this event may stop.
        Unchanged,
        /// The event has been recognized and there is some change
        /// due to it. Cursor moves and focus changes end up here.
        /// Further processing for this event may stop.
        /// Rendering the ui is advised.
        Changed,
        /// At least one slot changed its value.
        TextChanged,
    }

    impl ConsumedEvent for MaskOutcome {
        fn is_consumed(&self) -> bool {
            *self != MaskOutcome::Continue
        }
    }

    // Useful for converting most navigation/edit results.
    impl From<bool> for MaskOutcome {
        fn from(value: bool) -> Self {
            if value {
                MaskOutcome::Changed
            } else {
                MaskOutcome::Unchanged
            }
        }
    }

    impl From<Outcome> for MaskOutcome {
        fn from(value: Outcome) -> Self {
            match value {
                Outcome::Continue => MaskOutcome::Continue,
                Outcome::Unchanged => MaskOutcome::Unchanged,
                Outcome::Changed => MaskOutcome::Changed,
            }
        }
    }

    impl From<MaskOutcome> for Outcome {
        fn from(value: MaskOutcome) -> Self {
            match value {
                MaskOutcome::Continue => Outcome::Continue,
                MaskOutcome::Unchanged => Outcome::Unchanged,
                MaskOutcome::Changed => Outcome::Changed,
                MaskOutcome::TextChanged => Outcome::Changed,
            }
        }
    }
}

pub mod core {
    //!
    //! The editing core without any widget.
    //! Usable on its own if you paint the glyphs yourself.
    //!

    pub use crate::mask_core::{MaskCore, MaskObserver};
    pub use crate::mask_slot::{CaseDirective, ClassTag, Slot};
}

/// Fill state of the editable slots.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum MaskStatus {
    /// No editable slot has been filled.
    /// A mask without editable slots is always clear.
    #[default]
    Clear,
    /// Some, but not all editable slots are filled.
    Incomplete,
    /// All editable slots are filled.
    Complete,
}

/// Which color a glyph is painted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorRole {
    /// Editable slot still showing its format literal.
    Unfilled,
    /// Fixed delimiter.
    Delimiter,
    /// Editable slot with a value entered by the user.
    Filled,
}

/// One painted char of the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskGlyph {
    /// Displayed char.
    pub glyph: char,
    /// Color role.
    pub role: ColorRole,
}

/// Colors for the three roles of a glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskColors {
    /// Format chars of unfilled slots. ex: DD, MM and YY in DD/MM/YY
    pub unfilled: Color,
    /// Delimiters. ex: the / in DD/MM/YY
    pub delimiter: Color,
    /// Entered values. ex: 22, 01, 17 in 22/01/17
    pub filled: Color,
}

impl Default for MaskColors {
    fn default() -> Self {
        Self {
            unfilled: Color::DarkGray,
            delimiter: Color::DarkGray,
            filled: Color::Reset,
        }
    }
}

impl MaskColors {
    pub fn new(unfilled: Color, delimiter: Color, filled: Color) -> Self {
        Self {
            unfilled,
            delimiter,
            filled,
        }
    }

    /// Color for the given role.
    #[inline]
    pub fn color(&self, role: ColorRole) -> Color {
        match role {
            ColorRole::Unfilled => self.unfilled,
            ColorRole::Delimiter => self.delimiter,
            ColorRole::Filled => self.filled,
        }
    }
}

/// Combined style for the widget.
#[derive(Debug, Clone)]
pub struct MaskStyle {
    pub style: Style,
    pub focus: Option<Style>,

    /// Glyph colors. They are copied to the state on render.
    pub colors: Option<MaskColors>,

    pub block: Option<Block<'static>>,
    pub border_style: Option<Style>,

    pub non_exhaustive: NonExhaustive,
}

impl Default for MaskStyle {
    fn default() -> Self {
        Self {
            style: Default::default(),
            focus: None,
            colors: None,
            block: None,
            border_style: None,
            non_exhaustive: NonExhaustive,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaskError {
    /// Edit position is not inside the field.
    ///
    /// Contains the position attempted and the slot count.
    PositionOutOfBounds(usize, usize),
    /// The mask contains a class tag that is not known.
    ///
    /// Contains the position in the mask and the tag.
    InvalidClassTag(usize, char),
}

impl Display for MaskError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MaskError::PositionOutOfBounds(pos, len) => {
                write!(f, "position {} out of bounds for {} slots", pos, len)
            }
            MaskError::InvalidClassTag(pos, tag) => {
                write!(f, "invalid class tag {:?} at {}", tag, pos)
            }
        }
    }
}

impl Error for MaskError {}

mod _private {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct NonExhaustive;
}
