//! Test pattern: drive the adapter the way a media player's output loop would.
//!
//! Renders colour bars with a bouncing ball at ~30 fps on the current
//! terminal.
//!
//! Press space to pause, the quit key (default 'q') to quit.
//!
//! Environment:
//! - `ASCII_VOUT_DITHERING`: `none`, `ordered` (default) or `random`
//! - `ASCII_VOUT_QUIT_KEY`: quit key
//! - `ASCII_VOUT_LOG`: path of a log file; logging is off when unset

use ascii_vout::video::PixelMasks;
use ascii_vout::{AsciiVout, HostEvent, PictureBuffer, RenderRequest, TerminalBackend, VoutConfig};
use std::time::{Duration, Instant};

const WIDTH: u32 = 320;
const HEIGHT: u32 = 240;
const FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// Colour bars, left to right.
const BARS: [(u8, u8, u8); 7] = [
    (192, 192, 192),
    (192, 192, 0),
    (0, 192, 192),
    (0, 192, 0),
    (192, 0, 192),
    (192, 0, 0),
    (0, 0, 192),
];

fn init_logging() -> std::io::Result<()> {
    let Some(path) = std::env::var_os("ASCII_VOUT_LOG") else {
        return Ok(());
    };
    let file = std::fs::File::create(path)?;
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .init();
    Ok(())
}

/// Draw frame number `tick` into `picture`.
fn draw_pattern(picture: &mut PictureBuffer, tick: u64) {
    let masks = PixelMasks::RV32;
    let (w, h) = (WIDTH as usize, HEIGHT as usize);

    // Ball position bounces off the edges.
    let radius = 24usize;
    let span_x = (w - 2 * radius) as u64;
    let span_y = (h - 2 * radius) as u64;
    let bounce = |t: u64, span: u64| {
        let p = t % (2 * span);
        (if p < span { p } else { 2 * span - p }) as usize
    };
    let cx = radius + bounce(tick * 3, span_x);
    let cy = radius + bounce(tick * 2, span_y);

    for y in 0..h {
        for x in 0..w {
            let dx = x.abs_diff(cx);
            let dy = y.abs_diff(cy);
            let pixel = if dx * dx + dy * dy <= radius * radius {
                masks.pack(255, 255, 255)
            } else if y >= h * 3 / 4 {
                // Grey ramp along the bottom.
                let level = (x * 255 / (w - 1)) as u8;
                masks.pack(level, level, level)
            } else {
                let (r, g, b) = BARS[x * BARS.len() / w];
                masks.pack(r, g, b)
            };
            picture.put_pixel(x, y, pixel);
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging()?;

    let config = VoutConfig::from_env();
    let (tx, rx) = crossbeam_channel::bounded(16);
    let mut vout = AsciiVout::create(TerminalBackend::stdout(), &config, tx)?;
    vout.init(RenderRequest::new(WIDTH, HEIGHT))?;
    let id = vout.output_pictures()[0];

    let mut tick = 0u64;
    let mut paused = false;
    let start = Instant::now();

    'frames: loop {
        let frame_start = Instant::now();

        vout.manage();
        for event in rx.try_iter() {
            match event {
                HostEvent::Quit => break 'frames,
                HostEvent::PauseToggle => paused = !paused,
            }
        }

        if !paused {
            if let Some(picture) = vout.picture_mut(id) {
                draw_pattern(picture, tick);
                picture.mark_ready();
            }
            vout.render(id);
            vout.display();
            tick += 1;
        }

        if let Some(rest) = FRAME_INTERVAL.checked_sub(frame_start.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    vout.end();
    vout.destroy();

    let elapsed = start.elapsed().as_secs_f64();
    println!("{tick} frames in {elapsed:.1}s ({} dithering)", config.dither_mode());
    Ok(())
}
