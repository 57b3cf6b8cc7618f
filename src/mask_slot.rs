use crate::MaskError;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};

/// Character class of one slot.
///
/// * `d`: decimal digit `0-9`
/// * `D`: anything except a decimal digit
/// * `a`: alphabetic
/// * `A`: anything except alphabetic
/// * `c`: alphanumeric
/// * `C`: anything except alphanumeric
/// * `h`: hex digit `0-9a-fA-F`
/// * `.`: any char
/// * `*`: delimiter, can't be edited
///
/// Anything else is kept as [ClassTag::Other]. Such a slot is
/// editable but accepts nothing.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ClassTag {
    Digit,
    NonDigit,
    Letter,
    NonLetter,
    Alnum,
    NonAlnum,
    Hex,
    #[default]
    Any,
    Delimiter,
    Other(char),
}

/// Case transform for one slot.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseDirective {
    /// `a`
    Lower,
    /// `A`
    Upper,
    /// everything else
    #[default]
    Keep,
}

/// One position of the format string.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    /// Format char shown while the slot is cleared.
    pub(crate) literal: char,
    /// Currently displayed char.
    pub(crate) value: char,
    /// Holds the literal, nothing entered yet.
    pub(crate) cleared: bool,
    pub(crate) class: ClassTag,
}

impl Display for ClassTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl Debug for ClassTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ClassTag::Other(c) => write!(f, "?{}", c),
            _ => write!(f, "{}", self.tag()),
        }
    }
}

impl ClassTag {
    /// Map a mask char to its class. Total, unknown
    /// chars end up as [ClassTag::Other].
    pub fn parse(c: char) -> ClassTag {
        match c {
            'd' => ClassTag::Digit,
            'D' => ClassTag::NonDigit,
            'a' => ClassTag::Letter,
            'A' => ClassTag::NonLetter,
            'c' => ClassTag::Alnum,
            'C' => ClassTag::NonAlnum,
            'h' => ClassTag::Hex,
            '.' => ClassTag::Any,
            '*' => ClassTag::Delimiter,
            c => ClassTag::Other(c),
        }
    }

    /// Map a mask char to its class, refusing unknown chars.
    pub fn try_parse(pos: usize, c: char) -> Result<ClassTag, MaskError> {
        match ClassTag::parse(c) {
            ClassTag::Other(c) => Err(MaskError::InvalidClassTag(pos, c)),
            tag => Ok(tag),
        }
    }

    /// The mask char for this class.
    pub fn tag(&self) -> char {
        match self {
            ClassTag::Digit => 'd',
            ClassTag::NonDigit => 'D',
            ClassTag::Letter => 'a',
            ClassTag::NonLetter => 'A',
            ClassTag::Alnum => 'c',
            ClassTag::NonAlnum => 'C',
            ClassTag::Hex => 'h',
            ClassTag::Any => '.',
            ClassTag::Delimiter => '*',
            ClassTag::Other(c) => *c,
        }
    }

    /// Everything but a delimiter can be edited.
    #[inline]
    pub fn is_editable(&self) -> bool {
        *self != ClassTag::Delimiter
    }

    /// Does this class accept the char?
    ///
    /// Digits are the ascii digits `0-9`. Letters are the unicode
    /// letters as reported by [char::is_alphabetic].
    pub fn accepts(&self, c: char) -> bool {
        match self {
            ClassTag::Digit => c.is_ascii_digit(),
            ClassTag::NonDigit => !c.is_ascii_digit(),
            ClassTag::Letter => c.is_alphabetic(),
            ClassTag::NonLetter => !c.is_alphabetic(),
            ClassTag::Alnum => c.is_alphanumeric(),
            ClassTag::NonAlnum => !c.is_alphanumeric(),
            ClassTag::Hex => c.is_ascii_hexdigit(),
            ClassTag::Any => true,
            ClassTag::Delimiter => false,
            ClassTag::Other(_) => false,
        }
    }
}

impl CaseDirective {
    pub fn parse(c: char) -> CaseDirective {
        match c {
            'a' => CaseDirective::Lower,
            'A' => CaseDirective::Upper,
            _ => CaseDirective::Keep,
        }
    }

    /// Apply to one char. If the case mapping expands
    /// to more than one char only the first is used.
    pub fn apply(&self, c: char) -> char {
        match self {
            CaseDirective::Lower => c.to_lowercase().next().unwrap_or(c),
            CaseDirective::Upper => c.to_uppercase().next().unwrap_or(c),
            CaseDirective::Keep => c,
        }
    }
}

impl Debug for Slot {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}:{}{}",
            self.class,
            self.value,
            if self.cleared { "_" } else { "" }
        )
    }
}

impl Slot {
    pub(crate) fn new(literal: char, class: ClassTag) -> Self {
        Self {
            literal,
            value: literal,
            cleared: true,
            class,
        }
    }

    /// Format char.
    #[inline]
    pub fn literal(&self) -> char {
        self.literal
    }

    /// Displayed char. The literal as long as the slot is cleared.
    #[inline]
    pub fn value(&self) -> char {
        self.value
    }

    /// No value has been entered.
    #[inline]
    pub fn is_cleared(&self) -> bool {
        self.cleared
    }

    #[inline]
    pub fn class(&self) -> ClassTag {
        self.class
    }

    #[inline]
    pub fn is_editable(&self) -> bool {
        self.class.is_editable()
    }

    /// Editable and holds a value.
    #[inline]
    pub fn is_filled(&self) -> bool {
        self.is_editable() && !self.cleared
    }

    /// Writes the char if the class accepts it.
    pub(crate) fn fill(&mut self, c: char) -> bool {
        if self.class.accepts(c) {
            self.value = c;
            self.cleared = false;
            true
        } else {
            false
        }
    }

    /// Back to the literal. Returns true if there was a value.
    pub(crate) fn clear(&mut self) -> bool {
        if self.is_editable() {
            self.value = self.literal;
            if !self.cleared {
                self.cleared = true;
                return true;
            }
        }
        false
    }
}
