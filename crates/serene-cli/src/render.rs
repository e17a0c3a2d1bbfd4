//! Styled terminal output.
//!
//! Theme gradients are rendered as ANSI 256-color swatches so the catalog
//! previews correctly on terminals without true-color support.

use console::{style, Color, Style};
use serene_appearance::{
    catalog, AppearanceSourceKind, AppearanceState, ColorMode, PersistOutcome, Rgb, WellnessTheme,
};

/// Converts an RGB triplet to the nearest ANSI 256-color palette index.
pub fn rgb_to_ansi256((r, g, b): Rgb) -> u8 {
    if r == g && g == b {
        if r < 8 {
            16
        } else if r > 248 {
            231
        } else {
            232 + ((r as u16 - 8) * 24 / 247) as u8
        }
    } else {
        let red = (r as u16 * 5 / 255) as u8;
        let green = (g as u16 * 5 / 255) as u8;
        let blue = (b as u16 * 5 / 255) as u8;
        16 + 36 * red + 6 * green + blue
    }
}

fn swatch(theme: WellnessTheme) -> String {
    let info = theme.info();
    format!(
        "{}{}",
        style("██").fg(Color::Color256(rgb_to_ansi256(info.gradient_from))),
        style("██").fg(Color::Color256(rgb_to_ansi256(info.gradient_to))),
    )
}

fn scheme_label(state: &AppearanceState) -> String {
    let label = if state.is_dark { "☾ dark" } else { "☀ light" };
    match state.color_mode {
        ColorMode::System => format!("{} (following system)", label),
        _ => label.to_string(),
    }
}

/// One-line summary used by `watch` and after mutations.
pub fn render_line(state: &AppearanceState) -> String {
    let info = state.theme.info();
    format!(
        "{} {} {} · {}",
        swatch(state.theme),
        info.icon,
        style(info.name).bold(),
        scheme_label(state)
    )
}

/// Detailed view for `show`.
pub fn render_state(
    state: &AppearanceState,
    source: AppearanceSourceKind,
    user: Option<&str>,
) -> String {
    let key = Style::new().dim();
    let info = state.theme.info();
    let mut out = String::new();
    out.push_str(&format!(
        "{} {} {}\n",
        swatch(state.theme),
        info.icon,
        style(info.name).bold()
    ));
    out.push_str(&format!("  {} {}\n", key.apply_to("theme "), state.theme));
    out.push_str(&format!("  {} {}\n", key.apply_to("mode  "), state.color_mode));
    out.push_str(&format!("  {} {}\n", key.apply_to("scheme"), state.scheme()));
    out.push_str(&format!("  {} {}\n", key.apply_to("source"), source));
    out.push_str(&format!(
        "  {} {}\n",
        key.apply_to("user  "),
        user.unwrap_or("(signed out)")
    ));
    out
}

/// The theme catalog for `themes`, marking the active one.
pub fn render_catalog(current: WellnessTheme) -> String {
    let mut out = String::new();
    for info in catalog() {
        let marker = if info.theme == current {
            style("✔").green().to_string()
        } else {
            " ".to_string()
        };
        out.push_str(&format!(
            "{} {} {} {:<17} {:<10} {}\n",
            marker,
            swatch(info.theme),
            info.icon,
            style(info.name).bold(),
            info.theme,
            style(info.description).dim()
        ));
    }
    out
}

/// Non-blocking notice for writes that did not reach their copy.
pub fn render_failures(outcome: &PersistOutcome) -> Option<String> {
    let failures = outcome.failures();
    if failures.is_empty() {
        return None;
    }
    let mut out = format!(
        "{} change applied but not saved everywhere:\n",
        style("warning:").yellow().bold()
    );
    for failure in failures {
        out.push_str(&format!("  - {}\n", failure));
    }
    Some(out)
}
