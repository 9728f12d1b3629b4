//! ASCII banner with a vertical gradient (KW-MASTER).

use crossterm::ExecutableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use figlet_rs::FIGfont;
use std::io::{Write, stdout};

/// Kwangwoon crimson (#8b1a2b).
const CRIMSON: (u8, u8, u8) = (0x8b, 0x1a, 0x2b);
/// Warm gold (#f2b632).
const GOLD: (u8, u8, u8) = (0xf2, 0xb6, 0x32);

/// Linear interpolation between two RGB colors. `t` in [0.0, 1.0].
fn lerp_rgb(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let r = (f64::from(a.0) * (1.0 - t) + f64::from(b.0) * t).round() as u8;
    let g = (f64::from(a.1) * (1.0 - t) + f64::from(b.1) * t).round() as u8;
    let bl = (f64::from(a.2) * (1.0 - t) + f64::from(b.2) * t).round() as u8;
    (r, g, bl)
}

fn banner_art() -> String {
    let Ok(font) = FIGfont::standard() else {
        return "KW-MASTER\n".to_string();
    };
    font.convert("KW-MASTER")
        .map(|figure| figure.to_string())
        .unwrap_or_else(|| "KW-MASTER\n".to_string())
}

/// Prints "KW-MASTER" in figlet letters from crimson to gold, then the version line.
pub fn print_welcome() {
    let mut out = stdout();
    let art = banner_art();
    let lines: Vec<&str> = art.lines().collect();
    let total = lines.len().max(1);

    for (i, line) in lines.iter().enumerate() {
        let t = if total <= 1 {
            1.0
        } else {
            i as f64 / (total - 1) as f64
        };
        let (r, g, b) = lerp_rgb(CRIMSON, GOLD, t);
        let _ = out.execute(SetForegroundColor(Color::Rgb { r, g, b }));
        let _ = out.execute(Print(line));
        let _ = out.execute(Print("\r\n"));
        let _ = out.execute(ResetColor);
    }

    let version = env!("CARGO_PKG_VERSION");
    let _ = out.execute(SetForegroundColor(Color::Rgb {
        r: GOLD.0,
        g: GOLD.1,
        b: GOLD.2,
    }));
    let _ = out.execute(Print(format!("KW-강의마스터 v{}\r\n", version)));
    let _ = out.execute(ResetColor);
    let _ = out.flush();
}
