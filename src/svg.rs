use tracing::debug;

use crate::layout::{CellColorizer, DAYS_IN_WEEK, WeekColumn, month_labels, organize_into_weeks};
use crate::theme::{get_theme, overlay_palettes};
use crate::types::{MergeMode, MergedDay, OverlayPalette, RenderOptions, ThemeColors};
use crate::xml::escape_xml;

const CELL_SIZE: f64 = 11.0;
const CELL_GAP: f64 = 2.0;
const CELL_STEP: f64 = CELL_SIZE + CELL_GAP;
const CORNER_RADIUS: f64 = 2.0;

const LABEL_AREA_X: f64 = 30.0;
const LABEL_AREA_Y: f64 = 20.0;
const PADDING: f64 = 16.0;
const LEGEND_HEIGHT: f64 = 30.0;
const USERS_LABEL_HEIGHT: f64 = 20.0;

const FONT_FAMILY: &str = "-apple-system,BlinkMacSystemFont,'Segoe UI',Helvetica,Arial,sans-serif";

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const DAY_LABELS: [&str; DAYS_IN_WEEK] = ["", "Mon", "", "Wed", "", "Fri", ""];

// Rough glyph advances used to space legend and caption labels.
const LEGEND_CHAR_WIDTH: f64 = 5.5;
const CAPTION_CHAR_WIDTH: f64 = 6.5;

const ERROR_HEIGHT: f64 = 60.0;
const ERROR_MIN_WIDTH: f64 = 400.0;
const ERROR_CHAR_WIDTH: f64 = 7.0;

/// Render the merged series as a calendar heatmap document.
pub fn render_svg(days: &[MergedDay], options: &RenderOptions) -> String {
    SvgRenderer::new(days, options).render()
}

/// Minimal alert-box document for failure states.
pub fn render_error_svg(message: &str) -> String {
    let escaped = escape_xml(message);
    let width = ERROR_MIN_WIDTH.max(escaped.chars().count() as f64 * ERROR_CHAR_WIDTH + 40.0);
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">
  <rect width="{w}" height="{h}" fill="#fef2f2" rx="6" ry="6" stroke="#fca5a5" stroke-width="1"/>
  <text x="20" y="35" fill="#dc2626" font-size="14" font-family="{font}">{text}</text>
</svg>"##,
        w = width,
        h = ERROR_HEIGHT,
        font = FONT_FAMILY,
        text = escaped,
    )
}

struct SvgRenderer<'a> {
    days: &'a [MergedDay],
    options: &'a RenderOptions,
    theme: ThemeColors,
    palettes: Vec<OverlayPalette>,
    elements: Vec<String>,
}

impl<'a> SvgRenderer<'a> {
    fn new(days: &'a [MergedDay], options: &'a RenderOptions) -> Self {
        let theme = options
            .custom_theme
            .clone()
            .unwrap_or_else(|| get_theme(&options.theme));
        let palettes = options
            .custom_palettes
            .clone()
            .filter(|p| !p.is_empty())
            .unwrap_or_else(overlay_palettes);

        Self {
            days,
            options,
            theme,
            palettes,
            elements: Vec::new(),
        }
    }

    fn multi_user(&self) -> bool {
        self.options.usernames.len() > 1
    }

    fn shows_user_captions(&self) -> bool {
        self.options.mode == MergeMode::Sum && self.multi_user()
    }

    fn render(mut self) -> String {
        let weeks = organize_into_weeks(self.days);

        let grid_height = DAYS_IN_WEEK as f64 * CELL_STEP;
        let width = PADDING * 2.0 + LABEL_AREA_X + weeks.len() as f64 * CELL_STEP;
        let height = PADDING * 2.0
            + LABEL_AREA_Y
            + grid_height
            + LEGEND_HEIGHT
            + if self.shows_user_captions() {
                USERS_LABEL_HEIGHT
            } else {
                0.0
            };

        debug!(
            weeks = weeks.len(),
            days = self.days.len(),
            mode = %self.options.mode,
            width,
            height,
            "rendering contribution graph"
        );

        self.push_month_labels(&weeks);
        self.push_day_labels();
        self.push_cells(&weeks);

        let legend_y = PADDING + LABEL_AREA_Y + grid_height + 12.0;
        if self.options.mode == MergeMode::Overlay && self.multi_user() {
            self.push_overlay_legend(legend_y);
        } else {
            self.push_scale_legend(legend_y);
        }
        if self.shows_user_captions() {
            self.push_user_captions(legend_y + LEGEND_HEIGHT);
        }

        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n  <rect width=\"{w}\" height=\"{h}\" fill=\"{bg}\" rx=\"6\" ry=\"6\"/>\n  {body}\n</svg>",
            w = width,
            h = height,
            bg = escape_xml(&self.theme.background),
            body = self.elements.join("\n  "),
        )
    }

    fn push_text(&mut self, x: f64, y: f64, font_size: u32, anchor_end: bool, text: &str) {
        let anchor = if anchor_end { r#" text-anchor="end""# } else { "" };
        self.elements.push(format!(
            r#"<text x="{}" y="{}"{} fill="{}" font-size="{}" font-family="{}">{}</text>"#,
            x,
            y,
            anchor,
            escape_xml(&self.theme.text),
            font_size,
            FONT_FAMILY,
            escape_xml(text),
        ));
    }

    fn swatch(x: f64, y: f64, fill: &str) -> String {
        format!(
            r#"<rect x="{x}" y="{y}" width="{s}" height="{s}" rx="{r}" ry="{r}" fill="{fill}"/>"#,
            s = CELL_SIZE,
            r = CORNER_RADIUS,
            fill = escape_xml(fill),
        )
    }

    fn push_month_labels(&mut self, weeks: &[WeekColumn<'_>]) {
        let y = PADDING + LABEL_AREA_Y - 6.0;
        for label in month_labels(weeks) {
            let x = PADDING + LABEL_AREA_X + label.week_index as f64 * CELL_STEP;
            self.push_text(x, y, 10, false, MONTH_NAMES[label.month as usize]);
        }
    }

    fn push_day_labels(&mut self) {
        let x = PADDING + LABEL_AREA_X - 6.0;
        for (row, label) in DAY_LABELS.iter().enumerate() {
            if label.is_empty() {
                continue;
            }
            let y = PADDING + LABEL_AREA_Y + row as f64 * CELL_STEP + CELL_SIZE;
            self.push_text(x, y, 9, true, label);
        }
    }

    fn push_cells(&mut self, weeks: &[WeekColumn<'_>]) {
        let colorizer = CellColorizer::new(
            self.days,
            self.options.mode,
            &self.theme,
            &self.palettes,
            &self.options.usernames,
        );

        let mut cells = Vec::with_capacity(self.days.len());
        for week in weeks {
            let x = PADDING + LABEL_AREA_X + week.index as f64 * CELL_STEP;
            for (row, slot) in week.days.iter().enumerate() {
                let Some(day) = slot else {
                    continue;
                };
                let y = PADDING + LABEL_AREA_Y + row as f64 * CELL_STEP;
                cells.push(format!(
                    r#"<rect x="{x}" y="{y}" width="{s}" height="{s}" rx="{r}" ry="{r}" fill="{fill}" data-date="{date}" data-count="{count}"><title>{title}</title></rect>"#,
                    s = CELL_SIZE,
                    r = CORNER_RADIUS,
                    fill = escape_xml(colorizer.fill(day)),
                    date = day.date,
                    count = day.total_count,
                    title = escape_xml(&self.tooltip(day)),
                ));
            }
        }
        self.elements.extend(cells);
    }

    fn tooltip(&self, day: &MergedDay) -> String {
        let mut lines = vec![format!(
            "{} contributions on {}",
            day.total_count,
            day.date.format("%b %-d")
        )];
        if self.multi_user() {
            for username in &self.options.usernames {
                lines.push(format!("{}: {}", username, day.count_for(username)));
            }
        }
        lines.join("\n")
    }

    fn push_scale_legend(&mut self, legend_y: f64) {
        let label_x = PADDING + LABEL_AREA_X;
        self.push_text(label_x, legend_y + CELL_SIZE, 9, false, "Less");

        let start_x = label_x + 30.0;
        let colors: Vec<String> = std::iter::once(self.theme.empty.clone())
            .chain(self.theme.levels.iter().cloned())
            .collect();
        for (i, color) in colors.iter().enumerate() {
            self.elements
                .push(Self::swatch(start_x + i as f64 * CELL_STEP, legend_y, color));
        }

        let more_x = start_x + colors.len() as f64 * CELL_STEP + 4.0;
        self.push_text(more_x, legend_y + CELL_SIZE, 9, false, "More");
    }

    fn push_overlay_legend(&mut self, legend_y: f64) {
        let mut x_offset = PADDING + LABEL_AREA_X;
        let usernames = self.options.usernames.clone();

        for (i, username) in usernames.iter().enumerate() {
            self.push_text(x_offset, legend_y + CELL_SIZE, 9, false, username);
            x_offset += username.chars().count() as f64 * LEGEND_CHAR_WIDTH + 6.0;

            let palette = &self.palettes[i % self.palettes.len()];
            let colors: Vec<String> = std::iter::once(self.theme.empty.clone())
                .chain(palette.levels.iter().cloned())
                .collect();
            for (j, color) in colors.iter().enumerate() {
                self.elements
                    .push(Self::swatch(x_offset + j as f64 * CELL_STEP, legend_y, color));
            }
            x_offset += colors.len() as f64 * CELL_STEP + 12.0;
        }
    }

    fn push_user_captions(&mut self, user_y: f64) {
        let mut x_offset = PADDING + LABEL_AREA_X;
        let swatch_color = self.theme.levels[2].clone();
        let usernames = self.options.usernames.clone();

        for username in &usernames {
            self.elements
                .push(Self::swatch(x_offset, user_y - 8.0, &swatch_color));
            self.push_text(x_offset + CELL_SIZE + 4.0, user_y + 2.0, 10, false, username);
            x_offset += CELL_SIZE + 8.0 + username.chars().count() as f64 * CAPTION_CHAR_WIDTH;
        }
    }
}
