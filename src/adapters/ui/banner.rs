//! Gradient title banner for the dashboard.

use crossterm::ExecutableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use std::io::{Write, stdout};

const TITLE: &str = "STUDY PULSE";
const SUBTITLE: &str = "weekly focus & forecast";

/// Deep indigo (#4b3ee0).
const INDIGO: (u8, u8, u8) = (0x4b, 0x3e, 0xe0);
/// Mint (#3ee0a4).
const MINT: (u8, u8, u8) = (0x3e, 0xe0, 0xa4);

/// Linear interpolation between two RGB colors. `t` in [0.0, 1.0].
fn lerp_rgb(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let t = t.clamp(0.0, 1.0);
    let r = (f64::from(a.0) * (1.0 - t) + f64::from(b.0) * t).round() as u8;
    let g = (f64::from(a.1) * (1.0 - t) + f64::from(b.1) * t).round() as u8;
    let bl = (f64::from(a.2) * (1.0 - t) + f64::from(b.2) * t).round() as u8;
    (r, g, bl)
}

/// Prints the spaced-out title with a per-letter gradient from indigo to mint,
/// then the subtitle and crate version.
pub fn print_welcome() {
    let mut out = stdout();
    let letters: Vec<char> = TITLE.chars().collect();
    let last = letters.len().saturating_sub(1).max(1);

    let _ = out.execute(Print("\r\n  "));
    for (i, ch) in letters.iter().enumerate() {
        let (r, g, b) = lerp_rgb(INDIGO, MINT, i as f64 / last as f64);
        let _ = out.execute(SetForegroundColor(Color::Rgb { r, g, b }));
        let _ = out.execute(Print(format!("{} ", ch)));
    }
    let _ = out.execute(ResetColor);

    let _ = out.execute(SetForegroundColor(Color::Rgb {
        r: MINT.0,
        g: MINT.1,
        b: MINT.2,
    }));
    let version = env!("CARGO_PKG_VERSION");
    let _ = out.execute(Print(format!("\r\n  {} · v{}\r\n\r\n", SUBTITLE, version)));
    let _ = out.execute(ResetColor);
    let _ = out.flush();
}
