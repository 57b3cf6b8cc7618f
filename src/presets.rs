//!
//! Some common masks.
//!
//! ```rust ignore
//! use rat_mask::mask_input::MaskInputState;
//! use rat_mask::presets;
//!
//! let state = MaskInputState::new().with_preset(&presets::DATE);
//! ```
//!

/// Format, mask and case for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskPreset {
    pub format: &'static str,
    pub mask: &'static str,
    pub case: &'static str,
}

impl MaskPreset {
    pub const fn new(format: &'static str, mask: &'static str) -> Self {
        Self {
            format,
            mask,
            case: "",
        }
    }

    pub const fn with_case(mut self, case: &'static str) -> Self {
        self.case = case;
        self
    }
}

/// MM/DD/YY
pub const DATE: MaskPreset = MaskPreset::new("MM/DD/YY", "dd*dd*dd");
/// MM-DD-YY
pub const DATE_DASH: MaskPreset = MaskPreset::new("MM-DD-YY", "dd*dd*dd");
/// MM/DD/YYYY
pub const DATE_LONG: MaskPreset = MaskPreset::new("MM/DD/YYYY", "dd*dd*dddd");
/// #RRGGBBAA
pub const HEX_COLOR: MaskPreset = MaskPreset::new("#RRGGBBAA", "*hhhhhhhh");
/// XXXX-XXXX-XXXX-XXXX
pub const CARD_NUMBER: MaskPreset = MaskPreset::new("XXXX-XXXX-XXXX-XXXX", "dddd*dddd*dddd*dddd");
/// MM/YY
pub const CARD_EXPIRY: MaskPreset = MaskPreset::new("MM/YY", "dd*dd");
/// CVV
pub const CARD_CVV: MaskPreset = MaskPreset::new("CVV", "ddd");
/// +91 __________ ( India )
pub const PHONE_IN: MaskPreset =
    MaskPreset::new("+91 __________ ( India )", "****dddddddddd**********");
/// Mixed letters, digits and free text, with upper/lower case.
pub const CUSTOM: MaskPreset = MaskPreset::new(
    "( [ABCD-1234-XXXX-5678] - [MM/DDDD] - [CVV] )",
    "***aaaa*dddd*....*dddd*****dd*dddd*****ddd***",
)
.with_case("***AAAA*dddd*aaaa*dddd*****dd*dddd*****ddd***");

/// All presets with a name.
pub const ALL: [(&str, MaskPreset); 9] = [
    ("date", DATE),
    ("date-dash", DATE_DASH),
    ("date-long", DATE_LONG),
    ("hex-color", HEX_COLOR),
    ("card-number", CARD_NUMBER),
    ("card-expiry", CARD_EXPIRY),
    ("card-cvv", CARD_CVV),
    ("phone-in", PHONE_IN),
    ("custom", CUSTOM),
];

/// Find a preset by name.
pub fn by_name(name: &str) -> Option<MaskPreset> {
    ALL.iter().find(|(n, _)| *n == name).map(|(_, p)| *p)
}
