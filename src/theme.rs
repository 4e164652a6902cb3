use std::collections::BTreeMap;

use ratatui::style::Color;
use tracing::warn;

/// Colors of the two-pane view, by role.
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,

    pub accent: Color,
    pub text: Color,
    pub text_muted: Color,
    pub surface: Color,

    pub diff_add_bg: Color,
    pub diff_del_bg: Color,
    pub diff_add_fg: Color,
    pub diff_del_fg: Color,
    pub diff_context_fg: Color,
    pub cursor_line_fg: Color,

    pub success: Color,
    pub error: Color,
    pub warning: Color,
}

/// `[colors]` table of the config file: slot name to `#rrggbb`.
pub type ThemeOverrides = BTreeMap<String, String>;

/// One built-in palette as `0xRRGGBB` values, in [`Theme`] field order.
struct Palette {
    name: &'static str,
    rgb: [u32; 13],
}

const PALETTES: &[Palette] = &[
    Palette {
        name: "one-dark",
        rgb: [
            0x56b6c2, 0xdcdfe4, 0x5c6370, 0x1e1e1e, // accent text muted surface
            0x002800, 0x3a0000, 0x98c379, 0xe06c75, 0xabb2bf, 0xe5c07b, // diff, cursor
            0x98c379, 0xe06c75, 0xe5c07b, // status
        ],
    },
    Palette {
        name: "dracula",
        rgb: [
            0x8be9fd, 0xf8f8f2, 0x6272a4, 0x282a36,
            0x0f280f, 0x2d0a0a, 0x50fa7b, 0xff5555, 0xf8f8f2, 0xf1fa8c,
            0x50fa7b, 0xff5555, 0xf1fa8c,
        ],
    },
    Palette {
        name: "solarized-dark",
        rgb: [
            0x268bd2, 0x93a1a1, 0x586e75, 0x00222b,
            0x001e0a, 0x280505, 0x859900, 0xdc322f, 0x93a1a1, 0xb58900,
            0x859900, 0xdc322f, 0xb58900,
        ],
    },
];

pub const THEME_NAMES: &[&str] = &["one-dark", "dracula", "solarized-dark"];

fn rgb(v: u32) -> Color {
    Color::Rgb((v >> 16) as u8, (v >> 8) as u8, v as u8)
}

impl Theme {
    /// Unknown names fall back to one-dark.
    pub fn from_name(name: &str) -> Self {
        let palette = PALETTES
            .iter()
            .find(|p| p.name == name)
            .unwrap_or(&PALETTES[0]);
        let [
            accent,
            text,
            text_muted,
            surface,
            diff_add_bg,
            diff_del_bg,
            diff_add_fg,
            diff_del_fg,
            diff_context_fg,
            cursor_line_fg,
            success,
            error,
            warning,
        ] = palette.rgb.map(rgb);
        Theme {
            name: palette.name.to_string(),
            accent,
            text,
            text_muted,
            surface,
            diff_add_bg,
            diff_del_bg,
            diff_add_fg,
            diff_del_fg,
            diff_context_fg,
            cursor_line_fg,
            success,
            error,
            warning,
        }
    }

    fn slot_mut(&mut self, slot: &str) -> Option<&mut Color> {
        let color = match slot {
            "accent" => &mut self.accent,
            "text" => &mut self.text,
            "text_muted" => &mut self.text_muted,
            "surface" => &mut self.surface,
            "diff_add_bg" => &mut self.diff_add_bg,
            "diff_del_bg" => &mut self.diff_del_bg,
            "diff_add_fg" => &mut self.diff_add_fg,
            "diff_del_fg" => &mut self.diff_del_fg,
            "diff_context_fg" => &mut self.diff_context_fg,
            "cursor_line_fg" => &mut self.cursor_line_fg,
            "success" => &mut self.success,
            "error" => &mut self.error,
            "warning" => &mut self.warning,
            _ => return None,
        };
        Some(color)
    }
}

pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok().map(rgb)
}

/// Unknown slots and unparsable colors are skipped with a warning.
pub fn apply_overrides(theme: &mut Theme, overrides: &ThemeOverrides) {
    for (slot, hex) in overrides {
        let Some(color) = parse_hex_color(hex) else {
            warn!(%slot, value = %hex, "ignoring color that is not #rrggbb");
            continue;
        };
        match theme.slot_mut(slot) {
            Some(target) => *target = color,
            None => warn!(%slot, "ignoring unknown color slot"),
        }
    }
}
