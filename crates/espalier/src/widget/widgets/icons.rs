//! Glyphs of the `icons` font used by the standard controls.

pub const CHECK: char = '\u{2714}';
pub const CHEVRON_UP: char = '\u{E75F}';
pub const CHEVRON_DOWN: char = '\u{E75C}';
