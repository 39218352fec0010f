//! Theme configuration: font sizes, metrics, behaviour constants and the palette.
//!
//! A [`Theme`] is owned by the [`Screen`](crate::Screen) and lent to every
//! layout, paint and event context. Widgets never hold one themselves.
//!
//! Themes load from TOML or JSON. Every field has a default, so a file only
//! needs to name what it changes:
//!
//! ```
//! use espalier::Theme;
//!
//! let theme = Theme::from_toml_str(r##"
//! window_header_height = 24
//! text_color = "#FF0000FF"
//! "##).unwrap();
//!
//! assert_eq!(theme.window_header_height, 24.0);
//! assert_eq!(theme.text_color.to_hex(), "#FF0000FF");
//! assert_eq!(theme.standard_font_size, 16.0);
//! ```

use std::path::Path;

use espalier_render::Color;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use espalier_core::logging::targets;

/// Errors from loading or saving a theme.
#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("failed to read theme file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TOML theme: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to serialize theme: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("invalid JSON theme: {0}")]
    Json(#[from] serde_json::Error),
}

/// Visual and behavioural constants shared by all widgets of a screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    // =========================================================================
    // Sizes
    // =========================================================================
    pub standard_font_size: f32,
    pub button_font_size: f32,
    pub text_box_font_size: f32,
    pub window_title_font_size: f32,
    pub window_corner_radius: f32,
    pub window_header_height: f32,
    pub window_drop_shadow_size: f32,
    pub button_corner_radius: f32,

    // =========================================================================
    // Behaviour
    // =========================================================================
    /// Two presses closer than this are a double click.
    pub double_click_ms: u64,
    /// Width of the spin arrows at the left edge of a spinnable text box.
    pub text_box_spin_width: f32,
    /// Side length of a window button panel cell.
    pub window_panel_cell: f32,
    pub window_panel_font_size: f32,
    pub popup_anchor_height: f32,

    // =========================================================================
    // Palette
    // =========================================================================
    pub drop_shadow: Color,
    pub transparent: Color,
    pub border_dark: Color,
    pub border_light: Color,
    pub border_medium: Color,
    pub text_color: Color,
    pub disabled_text_color: Color,
    pub text_color_shadow: Color,
    pub icon_color: Color,

    pub button_gradient_top_focused: Color,
    pub button_gradient_bot_focused: Color,
    pub button_gradient_top_unfocused: Color,
    pub button_gradient_bot_unfocused: Color,
    pub button_gradient_top_pushed: Color,
    pub button_gradient_bot_pushed: Color,

    pub window_fill_unfocused: Color,
    pub window_fill_focused: Color,
    pub window_title_unfocused: Color,
    pub window_title_focused: Color,
    pub window_header_gradient_top: Color,
    pub window_header_gradient_bot: Color,
    pub window_header_sep_top: Color,
    pub window_header_sep_bot: Color,
    pub window_popup: Color,
    pub window_popup_transparent: Color,

    pub slider_knob_outer: Color,
    pub slider_knob_inner: Color,
    pub slider_highlight: Color,

    pub text_box_background: Color,
    pub text_box_editing: Color,
    pub text_box_invalid: Color,
    pub text_box_border: Color,
    pub text_box_selection: Color,
    pub text_box_caret: Color,
}

impl Default for Theme {
    fn default() -> Self {
        let text_color = Color::from_gray(255, 160);
        Self {
            standard_font_size: 16.0,
            button_font_size: 20.0,
            text_box_font_size: 20.0,
            window_title_font_size: 18.0,
            window_corner_radius: 2.0,
            window_header_height: 30.0,
            window_drop_shadow_size: 10.0,
            button_corner_radius: 2.0,

            double_click_ms: 250,
            text_box_spin_width: 14.0,
            window_panel_cell: 22.0,
            window_panel_font_size: 15.0,
            popup_anchor_height: 30.0,

            drop_shadow: Color::from_gray(0, 128),
            transparent: Color::from_gray(0, 0),
            border_dark: Color::from_gray(29, 255),
            border_light: Color::from_gray(92, 255),
            border_medium: Color::from_gray(35, 255),
            text_color,
            disabled_text_color: Color::from_gray(255, 80),
            text_color_shadow: Color::from_gray(0, 160),
            icon_color: text_color,

            button_gradient_top_focused: Color::from_gray(64, 255),
            button_gradient_bot_focused: Color::from_gray(48, 255),
            button_gradient_top_unfocused: Color::from_gray(74, 255),
            button_gradient_bot_unfocused: Color::from_gray(58, 255),
            button_gradient_top_pushed: Color::from_gray(41, 255),
            button_gradient_bot_pushed: Color::from_gray(29, 255),

            window_fill_unfocused: Color::from_gray(43, 230),
            window_fill_focused: Color::from_gray(45, 230),
            window_title_unfocused: Color::from_gray(220, 160),
            window_title_focused: Color::from_gray(255, 190),
            window_header_gradient_top: Color::from_gray(74, 255),
            window_header_gradient_bot: Color::from_gray(58, 255),
            window_header_sep_top: Color::from_gray(92, 255),
            window_header_sep_bot: Color::from_gray(29, 255),
            window_popup: Color::from_gray(50, 255),
            window_popup_transparent: Color::from_gray(50, 0),

            slider_knob_outer: Color::from_gray(92, 255),
            slider_knob_inner: Color::from_gray(220, 255),
            slider_highlight: Color::from_rgba8(255, 80, 80, 70),

            text_box_background: Color::from_gray(32, 32),
            text_box_editing: Color::from_gray(150, 32),
            text_box_invalid: Color::from_rgba8(255, 0, 0, 100),
            text_box_border: Color::from_gray(0, 48),
            text_box_selection: Color::from_rgba8(255, 255, 255, 80),
            text_box_caret: Color::from_rgba8(255, 192, 0, 255),
        }
    }
}

impl Theme {
    /// Parse a theme from TOML.
    pub fn from_toml_str(s: &str) -> Result<Self, ThemeError> {
        Ok(toml::from_str(s)?)
    }

    /// Parse a theme from JSON.
    pub fn from_json_str(s: &str) -> Result<Self, ThemeError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load a theme file. `.json` files are read as JSON, anything else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ThemeError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let theme = if is_json {
            Self::from_json_str(&content)?
        } else {
            Self::from_toml_str(&content)?
        };
        tracing::debug!(target: targets::THEME, path = %path.display(), "loaded theme");
        Ok(theme)
    }

    /// Serialize to pretty TOML.
    pub fn to_toml_string(&self) -> Result<String, ThemeError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Double-click interval as a [`Duration`](std::time::Duration).
    pub fn double_click_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.double_click_ms)
    }
}
