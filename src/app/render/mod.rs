mod palette;
mod tween;
mod visual;

pub(in crate::app) use palette::{Palette, parse_color};
pub(in crate::app) use visual::{
    FillInputs, NodeFill, VisualState, label_opacity, tag_glyph_colors,
};
