use rat_mask::core::{ClassTag, MaskCore, MaskObserver};
use rat_mask::presets;
use rat_mask::{ColorRole, MaskColors, MaskError, MaskGlyph, MaskStatus};
use ratatui_core::style::Color;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn setup_logging() {
    _ = fern::Dispatch::new()
        .format(|out, message, _record| out.finish(format_args!("{}", message)))
        .level(log::LevelFilter::Debug)
        .chain(std::io::stderr())
        .apply();
}

#[test]
fn test_insert_complete() {
    setup_logging();
    let mut m = MaskCore::with_format("dd*dd*dd", "dd*dd*dd");

    assert!(m.apply_edit(0, 0, "010203"));
    assert_eq!(m.edited_text(), "010203");
    assert_eq!(m.raw_text(), "01*02*03");
    assert_eq!(m.components(), vec!["01", "02", "03"]);
    assert_eq!(m.status(), MaskStatus::Complete);
    assert_eq!(m.cursor(), 8);
}

#[test]
fn test_insert_rejected() {
    let mut m = MaskCore::with_format("dd*dd*dd", "dd*dd*dd");

    assert!(m.apply_edit(0, 0, "0a0203"));
    assert_eq!(m.edited_text(), "00203");
    assert_eq!(m.raw_text(), "00*20*3d");
    assert_eq!(m.components(), vec!["00", "20", "3"]);
    assert_eq!(m.status(), MaskStatus::Incomplete);
    assert_eq!(m.cursor(), 7);

    // nothing accepted
    let mut m = MaskCore::with_format("dd*dd*dd", "dd*dd*dd");
    assert!(!m.apply_edit(3, 0, "xyz"));
    assert_eq!(m.raw_text(), "dd*dd*dd");
    assert_eq!(m.cursor(), 3);
}

#[test]
fn test_insert_skips_delimiter() {
    let mut m = MaskCore::from_preset(&presets::HEX_COLOR);

    assert_eq!(m.cursor(), 1);
    assert!(m.apply_edit(0, 0, "FF00FF"));
    assert_eq!(m.slot(0).map(|v| v.value()), Some('#'));
    assert_eq!(m.raw_text(), "#FF00FFAA");
    assert_eq!(m.edited_text(), "FF00FF");
    assert_eq!(m.status(), MaskStatus::Incomplete);
    assert_eq!(m.cursor(), 7);
    assert_eq!(m.hex_color(), None);
}

#[test]
fn test_delete() {
    let mut m = MaskCore::with_format("dd*dd*dd", "dd*dd*dd");
    m.update_text("010203");

    // filled slot and the delimiter after it
    assert!(m.apply_edit(1, 2, ""));
    assert_eq!(m.raw_text(), "0d*02*03");
    assert_eq!(m.format(), "dd*dd*dd");
    assert_eq!(m.mask(), "dd*dd*dd");
    assert_eq!(m.cursor(), 1);

    // delimiter and the filled slot after it
    assert!(m.apply_edit(2, 2, ""));
    assert_eq!(m.raw_text(), "0d*d2*03");
    assert_eq!(m.cursor(), 2);

    // nothing precedes
    assert!(m.apply_edit(0, 1, ""));
    assert_eq!(m.raw_text(), "dd*d2*03");
    assert_eq!(m.cursor(), 0);

    // already clear
    assert!(!m.apply_edit(0, 1, ""));
    assert_eq!(m.raw_text(), "dd*d2*03");

    // leading delimiter
    let mut m = MaskCore::from_preset(&presets::HEX_COLOR);
    m.update_text("12345678");
    assert!(m.apply_edit(0, 2, ""));
    assert_eq!(m.raw_text(), "#R2345678");
    assert_eq!(m.raw_text().chars().count(), m.len());
    assert_eq!(m.cursor(), 1);

    // range clamped to the end
    let mut m = MaskCore::with_format("dddd", "dddd");
    m.update_text("1234");
    assert!(m.apply_edit(2, 10, ""));
    assert_eq!(m.raw_text(), "12dd");
    assert_eq!(m.cursor(), 2);
}

#[test]
fn test_replace_selection() {
    let mut m = MaskCore::with_format("dddd", "dddd");
    m.update_text("1234");

    // selection shorter than the replacement
    assert!(m.apply_edit(0, 2, "567"));
    assert_eq!(m.raw_text(), "5634");
    assert_eq!(m.cursor(), 2);

    // selection longer than the replacement
    assert!(m.apply_edit(0, 4, "9"));
    assert_eq!(m.raw_text(), "9634");
    assert_eq!(m.cursor(), 1);

    // writing stops at the end of the selection
    let mut m = MaskCore::with_format("dd*dd", "dd*dd");
    m.update_text("1234");
    assert!(m.apply_edit(1, 2, "789"));
    assert_eq!(m.raw_text(), "17*34");
    assert_eq!(m.cursor(), 2);
}

#[test]
fn test_field_full() {
    let mut m = MaskCore::with_format("dd", "dd");
    assert!(m.update_text("12345"));
    assert_eq!(m.raw_text(), "12");
    assert_eq!(m.cursor(), 2);

    assert!(!m.update_text(""));
    assert_eq!(m.raw_text(), "12");
}

#[test]
fn test_out_of_bounds() -> anyhow::Result<()> {
    setup_logging();
    let mut m = MaskCore::with_format("dd*dd*dd", "dd*dd*dd");
    m.update_text("01");

    assert_eq!(
        m.try_apply_edit(8, 0, "1"),
        Err(MaskError::PositionOutOfBounds(8, 8))
    );
    assert!(!m.apply_edit(100, 1, ""));
    assert_eq!(m.raw_text(), "01*dd*dd");
    assert_eq!(m.cursor(), 2);

    assert!(m.try_apply_edit(3, 0, "4")?);
    assert_eq!(m.raw_text(), "01*4d*dd");

    let mut m = MaskCore::new();
    assert!(m.is_empty());
    assert!(!m.apply_edit(0, 0, "x"));
    Ok(())
}

#[test]
fn test_try_set_format() -> anyhow::Result<()> {
    setup_logging();
    let mut m = MaskCore::new();
    m.try_set_format("MM/DD", "dd*dd")?;
    m.update_text("12");

    assert_eq!(
        m.try_set_format("MM/DD", "dd*dx"),
        Err(MaskError::InvalidClassTag(4, 'x'))
    );
    assert_eq!(m.format(), "MM/DD");
    assert_eq!(m.raw_text(), "12/DD");

    // lenient variant keeps the unknown tag
    m.set_format("MM/DD", "dd*dx");
    assert_eq!(m.slot(4).map(|v| v.class()), Some(ClassTag::Other('x')));
    assert!(!m.apply_edit(4, 0, "x"));
    assert_eq!(m.status(), MaskStatus::Clear);
    Ok(())
}

#[test]
fn test_short_mask() {
    let mut m = MaskCore::with_format("abcd", "d");
    assert_eq!(m.mask(), "d...");
    assert!(m.update_text("1xyz"));
    assert_eq!(m.status(), MaskStatus::Complete);
    assert_eq!(m.components(), vec!["1xyz"]);

    // longer mask is cut
    let m = MaskCore::with_format("ab", "dddd");
    assert_eq!(m.mask(), "dd");
}

#[test]
fn test_empty_and_fixed() {
    let m = MaskCore::with_format("", "");
    assert_eq!(m.len(), 0);
    assert_eq!(m.raw_text(), "");
    assert_eq!(m.status(), MaskStatus::Clear);
    assert!(m.components().is_empty());
    assert_eq!(m.cursor(), 0);

    let mut m = MaskCore::with_format("abc", "***");
    assert_eq!(m.status(), MaskStatus::Clear);
    assert!(m.components().is_empty());
    assert_eq!(m.cursor(), 0);
    assert!(!m.update_text("xyz"));
    assert_eq!(m.raw_text(), "abc");
    assert_eq!(m.find_forward(0), None);
    assert_eq!(m.find_backward(2), None);
}

#[test]
fn test_components() {
    let mut m = MaskCore::with_format("dd*dd*dd", "dd*dd*dd");
    assert_eq!(m.components(), vec!["", "", ""]);

    m.apply_edit(3, 0, "4");
    assert_eq!(m.components(), vec!["", "4", ""]);

    // runs at both ends
    let mut m = MaskCore::with_format("(ddd) d", "*ddd**d");
    m.update_text("1234");
    assert_eq!(m.components(), vec!["123", "4"]);

    // delimiter at the end
    let mut m = MaskCore::with_format("dd-", "dd*");
    m.update_text("12");
    assert_eq!(m.components(), vec!["12"]);
}

#[test]
fn test_scan() {
    let m = MaskCore::with_format("dd*dd*dd", "dd*dd*dd");
    assert_eq!(m.find_forward(2), Some(3));
    assert_eq!(m.find_forward(8), None);
    assert_eq!(m.find_backward(2), Some(1));
    assert_eq!(m.find_backward(100), Some(7));
    assert_eq!(m.find_backward(0), Some(0));
}

#[test]
fn test_properties() {
    let pairs = [
        ("", ""),
        ("MM/DD/YY", "dd*dd*dd"),
        ("abcd", ""),
        ("#RRGGBBAA", "*hhhhhhhh"),
        ("+91 __________ ( India )", "****dddddddddd**********"),
        ("äöü/ß", "aaa*a"),
        ("x-y", "DAC"),
    ];

    for (format, mask) in pairs {
        let mut m = MaskCore::with_format(format, mask);
        assert_eq!(m.len(), format.chars().count());
        assert_eq!(m.raw_text().chars().count(), m.len());

        m.update_text("1aZ9 b_");
        assert_eq!(m.raw_text().chars().count(), m.len());

        m.clear_text();
        assert_eq!(m.status(), MaskStatus::Clear);
        assert_eq!(m.edited_text(), "");
        assert_eq!(m.raw_text(), format);

        // idempotent
        let m1 = MaskCore::with_format(format, mask);
        let mut m2 = MaskCore::with_format(format, mask);
        m2.set_format(format, mask);
        assert_eq!(m1.format(), m2.format());
        assert_eq!(m1.mask(), m2.mask());
        assert_eq!(m1.raw_text(), m2.raw_text());
        assert_eq!(m1.cursor(), m2.cursor());
    }
}

/// Some char the class accepts.
fn valid_char(class: ClassTag) -> Option<char> {
    match class {
        ClassTag::Digit => Some('7'),
        ClassTag::NonDigit => Some('-'),
        ClassTag::Letter => Some('q'),
        ClassTag::NonLetter => Some('4'),
        ClassTag::Alnum => Some('z'),
        ClassTag::NonAlnum => Some('+'),
        ClassTag::Hex => Some('b'),
        ClassTag::Any => Some('x'),
        ClassTag::Delimiter => None,
        ClassTag::Other(_) => None,
    }
}

#[test]
fn test_fill_all_presets() {
    for (name, preset) in presets::ALL {
        let mut m = MaskCore::with_format(preset.format, preset.mask);
        let input = m
            .slots()
            .iter()
            .filter_map(|v| valid_char(v.class()))
            .collect::<String>();

        assert!(m.update_text(&input), "{}", name);
        assert_eq!(m.status(), MaskStatus::Complete, "{}", name);
        assert_eq!(m.edited_text(), input, "{}", name);

        let format = m.format();
        let mask = m.mask();
        m.apply_edit(0, m.len(), "");
        assert_eq!(m.format(), format, "{}", name);
        assert_eq!(m.mask(), mask, "{}", name);
        assert_eq!(m.status(), MaskStatus::Clear, "{}", name);
    }
}

#[test]
fn test_presets() {
    assert_eq!(presets::by_name("card-cvv"), Some(presets::CARD_CVV));
    assert_eq!(presets::by_name("nope"), None);
    for (_, preset) in presets::ALL {
        assert_eq!(preset.format.chars().count(), preset.mask.chars().count());
    }

    let m = MaskCore::from_preset(&presets::PHONE_IN);
    assert_eq!(m.cursor(), 4);
}

#[test]
fn test_case() {
    let mut m = MaskCore::from_preset(&presets::CUSTOM);
    m.update_text("abcd1234XYZW5678");
    assert_eq!(m.edited_text(), "ABCD1234xyzw5678");
    assert_eq!(
        m.components(),
        vec!["ABCD", "1234", "xyzw", "5678", "", "", ""]
    );
    assert_eq!(m.status(), MaskStatus::Incomplete);

    // one char for everything
    let mut m = MaskCore::with_format("....", "....");
    m.set_case("A");
    m.update_text("ab");
    assert_eq!(m.raw_text(), "AB..");

    // the transform sticks
    m.set_case("");
    assert_eq!(m.edited_text(), "AB");

    // applied with render
    m.set_case("a");
    _ = m.render();
    assert_eq!(m.edited_text(), "ab");
    assert_eq!(m.raw_text(), "ab..");
}

#[test]
fn test_hex_color() {
    let mut m = MaskCore::from_preset(&presets::HEX_COLOR);
    m.update_text("FF00FF80");
    assert_eq!(m.status(), MaskStatus::Complete);
    assert_eq!(m.hex_color(), Some(Color::Rgb(255, 0, 255)));

    let mut m = MaskCore::with_format("#RRGGBB", "*hhhhhh");
    m.update_text("0a0B0c");
    assert_eq!(m.hex_color(), Some(Color::Rgb(10, 11, 12)));

    let mut m = MaskCore::with_format("#RRGGB", "*hhhhh");
    m.update_text("0a0B0");
    assert_eq!(m.hex_color(), None);
}

#[test]
fn test_glyphs() {
    let mut m = MaskCore::with_format("dd/dd", "dd*dd");
    m.update_text("1");

    let roles = m.glyphs().map(|v| v.role).collect::<Vec<_>>();
    assert_eq!(
        roles,
        vec![
            ColorRole::Filled,
            ColorRole::Unfilled,
            ColorRole::Delimiter,
            ColorRole::Unfilled,
            ColorRole::Unfilled
        ]
    );
    assert_eq!(m.role(5), None);

    m.set_cursor(3, false);
    let colors = MaskColors::new(Color::Gray, Color::Blue, Color::White);
    let glyphs = m.set_colors(colors);
    assert_eq!(m.colors(), colors);
    assert_eq!(m.cursor(), 3);
    assert_eq!(
        glyphs[0],
        MaskGlyph {
            glyph: '1',
            role: ColorRole::Filled
        }
    );
    assert_eq!(colors.color(glyphs[2].role), Color::Blue);
    assert_eq!(
        glyphs.iter().map(|v| v.glyph).collect::<String>(),
        "1d/dd"
    );
}

#[test]
fn test_navigation() {
    let mut m = MaskCore::from_preset(&presets::PHONE_IN);
    assert_eq!(m.cursor(), 4);

    assert!(!m.move_left(false));
    assert_eq!(m.cursor(), 4);
    assert!(m.move_right(false));
    assert_eq!(m.cursor(), 5);

    assert!(m.move_to_end(false));
    assert_eq!(m.cursor(), 14);
    assert!(!m.move_right(false));
    assert_eq!(m.cursor(), 14);

    assert!(m.move_to_start(true));
    assert_eq!(m.selection(), 4..14);
    assert!(m.has_selection());

    assert!(m.select_all());
    assert_eq!(m.selection(), 0..24);
    assert!(m.set_cursor(100, false));
    assert_eq!(m.cursor(), 24);
    assert!(!m.has_selection());

    let mut m = MaskCore::with_format("dd*dd", "dd*dd");
    m.set_cursor(4, false);
    assert!(m.move_left(true));
    assert_eq!(m.cursor(), 3);
    assert_eq!(m.anchor(), 4);
    assert!(m.set_selection(4, 1));
    assert_eq!(m.selection(), 1..4);
}

#[derive(Default, Clone)]
struct Counter {
    begin: Rc<Cell<usize>>,
    end: Rc<Cell<usize>>,
    changed: Rc<Cell<usize>>,
    last: Rc<RefCell<(String, usize)>>,
}

impl MaskObserver for Counter {
    fn begin_edit(&mut self, _core: &MaskCore) {
        self.begin.set(self.begin.get() + 1);
    }

    fn end_edit(&mut self, _core: &MaskCore) {
        self.end.set(self.end.get() + 1);
    }

    fn changed(&mut self, core: &MaskCore) {
        self.changed.set(self.changed.get() + 1);
        *self.last.borrow_mut() = (core.raw_text(), core.cursor());
    }
}

#[test]
fn test_observer() {
    let c = Counter::default();
    let mut m = MaskCore::with_format("dd*dd", "dd*dd");
    m.set_observer(Some(c.clone()));
    assert!(m.has_observer());

    m.begin_edit();
    assert_eq!(c.begin.get(), 1);

    m.update_text("12");
    assert_eq!(c.changed.get(), 1);
    assert_eq!(*c.last.borrow(), ("12*dd".to_string(), 2));

    // no change, no notification
    m.apply_edit(3, 0, "x");
    assert_eq!(c.changed.get(), 1);
    m.apply_edit(3, 1, "");
    assert_eq!(c.changed.get(), 1);
    m.apply_edit(10, 0, "1");
    assert_eq!(c.changed.get(), 1);

    m.apply_edit(0, 1, "");
    assert_eq!(c.changed.get(), 2);
    assert_eq!(*c.last.borrow(), ("d2*dd".to_string(), 0));

    // clear is silent
    assert!(m.clear_text());
    assert_eq!(c.changed.get(), 2);

    m.end_edit();
    assert_eq!(c.end.get(), 1);

    let m2 = m.clone();
    assert!(!m2.has_observer());

    m.set_observer(None::<Counter>);
    assert!(!m.has_observer());
}

#[test]
fn test_begin_edit_keeps_cursor() {
    let mut m = MaskCore::with_format("dd*dd", "dd*dd");
    m.set_cursor(4, false);
    m.end_edit();
    m.begin_edit();
    assert_eq!(m.cursor(), 4);
}
