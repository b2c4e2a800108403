//! Terminal output checked through a VT100 emulator.

use ascii_vout::backend::{ScriptedEvents, TerminalBackend, TerminalOptions};
use ascii_vout::video::PixelMasks;
use ascii_vout::{AsciiVout, HostEvent, PictureId, RenderRequest, VoutConfig};

type Headless = TerminalBackend<Vec<u8>, ScriptedEvents>;

const COLS: u16 = 16;
const ROWS: u16 = 4;

struct Harness {
    vout: AsciiVout<Headless>,
    parser: vt100::Parser,
    consumed: usize,
    id: PictureId,
}

impl Harness {
    fn new(dithering: &str, script: ScriptedEvents) -> (Self, crossbeam_channel::Receiver<HostEvent>) {
        let backend = TerminalBackend::new(Vec::new(), script, TerminalOptions::headless(COLS, ROWS));
        let config = VoutConfig {
            dithering: Some(dithering.to_string()),
            ..VoutConfig::default()
        };
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut vout = AsciiVout::create(backend, &config, tx).unwrap();
        vout.init(RenderRequest::new(32, 8)).unwrap();
        let id = vout.output_pictures()[0];
        let harness = Self {
            vout,
            parser: vt100::Parser::new(ROWS, COLS, 0),
            consumed: 0,
            id,
        };
        (harness, rx)
    }

    /// Paint the left half of the picture with `left` and the rest with `right`.
    fn paint(&mut self, left: u32, right: u32) {
        let picture = self.vout.picture_mut(self.id).unwrap();
        for y in 0..8 {
            for x in 0..32 {
                picture.put_pixel(x, y, if x < 16 { left } else { right });
            }
        }
    }

    /// Render, present and feed the new output to the emulator.
    fn frame(&mut self) -> usize {
        self.vout.render(self.id);
        self.vout.display();
        let written = &self.vout.backend().writer()[self.consumed..];
        self.parser.process(written);
        let len = written.len();
        self.consumed += len;
        len
    }

    fn glyph(&self, row: u16, col: u16) -> String {
        self.parser.screen().cell(row, col).unwrap().contents()
    }

    fn fg(&self, row: u16, col: u16) -> vt100::Color {
        self.parser.screen().cell(row, col).unwrap().fgcolor()
    }
}

#[test]
fn test_solid_white_frame() {
    let (mut harness, _rx) = Harness::new("none", ScriptedEvents::new());
    let white = PixelMasks::RV32.pack(255, 255, 255);
    harness.paint(white, white);
    harness.frame();

    let screen = harness.parser.screen();
    assert!(screen.hide_cursor());
    for row in 0..ROWS {
        for col in 0..COLS {
            assert_eq!(harness.glyph(row, col), "@", "cell ({row}, {col})");
            assert_eq!(harness.fg(row, col), vt100::Color::Rgb(255, 255, 255));
        }
    }
}

#[test]
fn test_split_frame_keeps_colours() {
    let (mut harness, _rx) = Harness::new("none", ScriptedEvents::new());
    harness.paint(PixelMasks::RV32.pack(255, 0, 0), 0);
    harness.frame();

    for row in 0..ROWS {
        for col in 0..COLS / 2 {
            assert_ne!(harness.glyph(row, col).trim(), "", "cell ({row}, {col})");
            assert_eq!(harness.fg(row, col), vt100::Color::Rgb(255, 0, 0));
        }
        for col in COLS / 2..COLS {
            assert_eq!(harness.glyph(row, col).trim(), "", "cell ({row}, {col})");
        }
    }
}

#[test]
fn test_second_frame_only_sends_changes() {
    let (mut harness, _rx) = Harness::new("ordered", ScriptedEvents::new());
    let white = PixelMasks::RV32.pack(255, 255, 255);
    harness.paint(white, white);
    let first = harness.frame();

    // Same picture: nothing to send.
    assert_eq!(harness.frame(), 0);

    // Right half goes black: less than a full redraw, and the screen follows.
    harness.paint(white, 0);
    let third = harness.frame();
    assert!(third > 0);
    assert!(third < first);
    assert_eq!(harness.glyph(0, 0), "@");
    assert_eq!(harness.glyph(0, COLS - 1).trim(), "");
}

#[test]
fn test_keys_on_terminal_reach_host() {
    let (mut harness, rx) = Harness::new("ordered", ScriptedEvents::keys("hello q"));
    assert_eq!(harness.vout.manage(), 2);
    assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![HostEvent::PauseToggle, HostEvent::Quit]);
}
