//! Merge several users' GitHub contribution calendars into one SVG heatmap.

pub mod cache;
pub mod error;
pub mod github;
pub mod layout;
pub mod merger;
pub mod request;
pub mod service;
pub mod svg;
pub mod theme;
pub mod types;
pub mod xml;

pub use error::{MergeError, Result};
pub use merger::merge_contributions;
pub use svg::{render_error_svg, render_svg};
pub use theme::{build_custom_theme, generate_levels, get_theme};
pub use types::{
    ContributionDay, MergeMode, MergedDay, OverlayPalette, RenderOptions, ThemeColors,
    UserContributions,
};
