//! Group colors
//!
//! Colors are "#RRGGBB" strings for direct embedding in the plotly.js figure.

/// Plotly's default qualitative palette
pub const PLOTLY_QUALITATIVE: [&str; 10] = [
    "#636EFA", "#EF553B", "#00CC96", "#AB63FA", "#FFA15A",
    "#19D3F3", "#FF6692", "#B6E880", "#FF97FF", "#FECB52",
];

/// Color for a group, cycling through the palette
pub fn color_for(palette: &[String], group: usize) -> &str {
    if palette.is_empty() {
        return PLOTLY_QUALITATIVE[group % PLOTLY_QUALITATIVE.len()];
    }
    &palette[group % palette.len()]
}

/// Accepts "#RGB" and "#RRGGBB"
pub fn is_hex_color(s: &str) -> bool {
    match s.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}
