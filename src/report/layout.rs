//! Page layout for vehicle reports
//!
//! Produces a [`Document`] of buffered operations. Page footers carry an
//! unresolved page label until the caller knows the final page count.

use super::metrics::{fit_text, text_width};
use super::pdf::{Document, Font, Op, Page, Rgb};
use super::{ReportOptions, ReportTable, SERIAL_COLUMN};
use crate::entities::vehicle::VehicleColumn;

pub const PAGE_WIDTH: f32 = 792.0;
pub const PAGE_HEIGHT: f32 = 612.0;
pub const MARGIN_X: f32 = 72.0;
pub const MARGIN_TOP: f32 = 24.0;
pub const MARGIN_BOTTOM: f32 = 24.0;
pub const AVAILABLE_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN_X;

const TITLE_SIZE: f32 = 16.0;
const BAND_HEIGHT: f32 = 28.0;
const TITLE_BASELINE_DROP: f32 = 19.6;
const TITLE_MAX_SHARE: f32 = 0.85;
const LOGO_WIDTH: f32 = 60.0;
const LOGO_HEIGHT: f32 = 24.0;
const LOGO_DROP: f32 = 26.0;

const TIMESTAMP_SIZE: f32 = 7.0;
const TIMESTAMP_FORMAT: &str = "%B %d, %Y at %I:%M %p";
const TOTAL_SIZE: f32 = 10.0;
const NOTICE_SIZE: f32 = 8.0;
pub const NO_RESULTS_NOTICE: &str = "No vehicles found for this report.";

const HEADER_SIZE: f32 = 8.0;
const BODY_SIZE: f32 = 7.0;
const HEADER_ROW_HEIGHT: f32 = 17.6;
const BODY_ROW_HEIGHT: f32 = 12.4;
const CELL_PADDING: f32 = 6.0;
const GRID_WIDTH: f32 = 0.5;

const FOOTER_Y: f32 = 15.0;
const FOOTER_SIZE: f32 = 7.0;

const SERIAL_SHARE: f32 = 0.05;
const MIN_SHARE: f32 = 0.06;

/// Text columns printed flush left; everything else is centred
const LEFT_ALIGNED: [VehicleColumn; 5] = [
    VehicleColumn::Make,
    VehicleColumn::Model,
    VehicleColumn::Owner,
    VehicleColumn::UsedFor,
    VehicleColumn::VehicleType,
];

fn is_left_aligned(column: &str) -> bool {
    LEFT_ALIGNED.iter().any(|c| c.name() == column)
}

/// Width of every column, summing to `available`
///
/// `columns` includes the serial column, whose content length is fixed at 3.
pub fn column_widths(columns: &[String], rows: &[Vec<String>], available: f32) -> Vec<f32> {
    let lengths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            if name == SERIAL_COLUMN {
                return 3;
            }
            rows.iter()
                .filter_map(|row| row.get(idx))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();
    let total = lengths.iter().sum::<usize>().max(1) as f32;

    let raw: Vec<f32> = columns
        .iter()
        .zip(&lengths)
        .map(|(name, &len)| {
            if name == SERIAL_COLUMN {
                available * SERIAL_SHARE
            } else {
                available * MIN_SHARE.max(len as f32 / total)
            }
        })
        .collect();

    let sum: f32 = raw.iter().sum();
    if sum <= 0.0 {
        return raw;
    }
    let scale = available / sum;
    raw.into_iter().map(|w| w * scale).collect()
}

/// Builds pages top to bottom
struct Layout<'a> {
    options: &'a ReportOptions,
    pages: Vec<Page>,
    page: Page,
    cursor: f32,
}

impl<'a> Layout<'a> {
    fn new(options: &'a ReportOptions) -> Self {
        Self {
            options,
            pages: Vec::new(),
            page: Page::default(),
            cursor: PAGE_HEIGHT - MARGIN_TOP,
        }
    }

    fn text(&mut self, x: f32, y: f32, font: Font, size: f32, color: Rgb, text: String) {
        self.page.push(Op::Text {
            x,
            y,
            font,
            size,
            color,
            text,
        });
    }

    fn centered_text(
        &mut self,
        center: f32,
        y: f32,
        font: Font,
        size: f32,
        color: Rgb,
        text: String,
    ) {
        let x = center - text_width(&text, font, size) / 2.0;
        self.text(x, y, font, size, color, text);
    }

    fn footer(&mut self) {
        let label = self.options.footer_label.clone();
        self.centered_text(
            PAGE_WIDTH / 2.0,
            FOOTER_Y,
            Font::Regular,
            FOOTER_SIZE,
            Rgb::GREY,
            label,
        );
        self.page.push(Op::PageLabel {
            right: PAGE_WIDTH - MARGIN_X,
            y: FOOTER_Y,
            font: Font::Regular,
            size: FOOTER_SIZE,
            color: Rgb::GREY,
        });
    }

    fn new_page(&mut self) {
        self.footer();
        self.pages.push(std::mem::take(&mut self.page));
        self.cursor = PAGE_HEIGHT - MARGIN_TOP;
    }

    fn finish(mut self) -> Vec<Page> {
        self.footer();
        self.pages.push(self.page);
        self.pages
    }

    fn header_band(&mut self, title: &str) {
        let top = self.cursor;
        let title = fit_text(
            &format!("{title} Vehicles Report"),
            Font::Bold,
            TITLE_SIZE,
            AVAILABLE_WIDTH * TITLE_MAX_SHARE,
        );
        self.text(
            MARGIN_X,
            top - TITLE_BASELINE_DROP,
            Font::Bold,
            TITLE_SIZE,
            Rgb::DARK_GREEN,
            title,
        );

        if self.options.logo.is_some() {
            self.page.push(Op::Image {
                x: PAGE_WIDTH - MARGIN_X - LOGO_WIDTH,
                y: top - LOGO_DROP,
                w: LOGO_WIDTH,
                h: LOGO_HEIGHT,
            });
        }
        self.cursor -= BAND_HEIGHT;
    }

    fn summary(&mut self, total: usize) {
        let stamp = format!(
            "Generated on: {}",
            self.options.generated_at.format(TIMESTAMP_FORMAT)
        );
        self.text(
            MARGIN_X,
            self.cursor - 9.0,
            Font::Regular,
            TIMESTAMP_SIZE,
            Rgb::GREY,
            stamp,
        );
        self.cursor -= 12.0;

        self.text(
            MARGIN_X,
            self.cursor - 12.0,
            Font::Bold,
            TOTAL_SIZE,
            Rgb::BLACK,
            format!("Total Vehicles: {total}"),
        );
        self.cursor -= 16.0;

        let y = self.cursor - 4.0;
        self.page.push(Op::Line {
            x1: MARGIN_X,
            y1: y,
            x2: PAGE_WIDTH - MARGIN_X,
            y2: y,
            width: 1.0,
            color: Rgb::DARK_GREEN,
        });
        self.cursor -= 10.0;
    }

    fn notice(&mut self) {
        self.text(
            MARGIN_X,
            self.cursor - 12.0,
            Font::Italic,
            NOTICE_SIZE,
            Rgb::BLACK,
            NO_RESULTS_NOTICE.to_string(),
        );
    }

    fn header_row(&mut self, columns: &[String], widths: &[f32]) {
        let top = self.cursor;
        let baseline = top - (HEADER_ROW_HEIGHT + HEADER_SIZE * 0.7) / 2.0;
        let mut x = MARGIN_X;
        for (name, &w) in columns.iter().zip(widths) {
            self.page.push(Op::FillRect {
                x,
                y: top - HEADER_ROW_HEIGHT,
                w,
                h: HEADER_ROW_HEIGHT,
                color: Rgb::DARK_GREEN,
            });
            self.grid_cell(x, top, w, HEADER_ROW_HEIGHT);
            // header labels are never truncated
            self.centered_text(
                x + w / 2.0,
                baseline,
                Font::Bold,
                HEADER_SIZE,
                Rgb::WHITE,
                name.clone(),
            );
            x += w;
        }
        self.cursor -= HEADER_ROW_HEIGHT;
    }

    fn body_row(&mut self, columns: &[String], widths: &[f32], cells: &[String], table_row: usize) {
        let top = self.cursor;
        let baseline = top - (BODY_ROW_HEIGHT + BODY_SIZE * 0.7) / 2.0;
        let fill = if table_row % 2 == 0 {
            Rgb::LIGHT_GREY
        } else {
            Rgb::WHITE
        };

        let mut x = MARGIN_X;
        for ((name, &w), cell) in columns.iter().zip(widths).zip(cells) {
            self.page.push(Op::FillRect {
                x,
                y: top - BODY_ROW_HEIGHT,
                w,
                h: BODY_ROW_HEIGHT,
                color: fill,
            });
            self.grid_cell(x, top, w, BODY_ROW_HEIGHT);

            let text = fit_text(cell, Font::Regular, BODY_SIZE, w - 2.0 * CELL_PADDING);
            if is_left_aligned(name) {
                self.text(x + CELL_PADDING, baseline, Font::Regular, BODY_SIZE, Rgb::BLACK, text);
            } else {
                self.centered_text(
                    x + w / 2.0,
                    baseline,
                    Font::Regular,
                    BODY_SIZE,
                    Rgb::BLACK,
                    text,
                );
            }
            x += w;
        }
        self.cursor -= BODY_ROW_HEIGHT;
    }

    fn grid_cell(&mut self, x: f32, top: f32, w: f32, h: f32) {
        self.page.push(Op::StrokeRect {
            x,
            y: top - h,
            w,
            h,
            width: GRID_WIDTH,
            color: Rgb::LIGHT_GREY,
        });
    }

    fn table(&mut self, columns: &[String], rows: &[Vec<String>]) {
        let widths = column_widths(columns, rows, AVAILABLE_WIDTH);
        self.header_row(columns, &widths);

        for (idx, row) in rows.iter().enumerate() {
            if self.cursor - BODY_ROW_HEIGHT < MARGIN_BOTTOM {
                self.new_page();
                self.header_row(columns, &widths);
            }
            // the header is table row 0
            self.body_row(columns, &widths, row, idx + 1);
        }
    }
}

/// Lay out a report; `table` must already be stripped of the internal key
pub fn lay_out(table: &ReportTable, title: &str, options: &ReportOptions) -> Document {
    let mut layout = Layout::new(options);
    layout.header_band(title);
    layout.summary(table.len());

    if table.is_empty() {
        layout.notice();
    } else {
        let columns: Vec<String> = std::iter::once(SERIAL_COLUMN.to_string())
            .chain(table.columns().iter().cloned())
            .collect();
        let rows: Vec<Vec<String>> = table
            .rows()
            .iter()
            .enumerate()
            .map(|(idx, row)| {
                std::iter::once((idx + 1).to_string())
                    .chain(row.iter().cloned())
                    .collect()
            })
            .collect();
        layout.table(&columns, &rows);
    }

    Document {
        width: PAGE_WIDTH,
        height: PAGE_HEIGHT,
        title: format!("{title} Vehicles Report"),
        created_at: options.generated_at,
        logo: options.logo.clone(),
        pages: layout.finish(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::{options, sample_table};

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_widths_sum_to_available() {
        let columns = strings(&["SR.", "VEH_ID", "REG_NO", "VEHICLE_TYPE", "OWNER"]);
        let rows = vec![
            strings(&["1", "C1", "FSD-1", "Compactor", "Faisalabad Waste Management Company"]),
            strings(&["2", "MT12", "", "Mini Tipper", "Town"]),
        ];
        let widths = column_widths(&columns, &rows, AVAILABLE_WIDTH);

        assert_eq!(widths.len(), 5);
        let sum: f32 = widths.iter().sum();
        assert!((sum - AVAILABLE_WIDTH).abs() < 0.01, "sum was {sum}");
        // longest content gets the widest column
        let owner = widths[4];
        assert!(widths.iter().all(|&w| w <= owner));
    }

    #[test]
    fn test_narrow_columns_get_minimum_share() {
        let columns = strings(&["SR.", "A", "DESCRIPTION"]);
        let rows = vec![strings(&["1", "x", &"y".repeat(200)])];
        let widths = column_widths(&columns, &rows, 100.0);

        // before rescaling A had 6%, SR. had 5%
        assert!(widths[1] > widths[0]);
        assert!((widths.iter().sum::<f32>() - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_empty_report_has_notice_and_no_table() {
        let doc = lay_out(&ReportTable::new(Vec::new(), Vec::new()), "Compactor", &options());
        assert_eq!(doc.pages.len(), 1);

        let text = doc.pages[0].text();
        assert!(text.contains("Compactor Vehicles Report"));
        assert!(text.contains("Total Vehicles: 0"));
        assert!(text.contains(NO_RESULTS_NOTICE));
        assert!(text.contains("Generated on: March 05, 2024 at 02:07 PM"));
        assert!(!text.contains(SERIAL_COLUMN));
        assert!(!doc.pages[0]
            .ops
            .iter()
            .any(|op| matches!(op, Op::FillRect { .. })));
    }

    #[test]
    fn test_serial_column_and_cells() {
        let doc = lay_out(&sample_table(2), "Compactor", &options());
        let text = doc.pages[0].text();

        assert!(text.contains("Total Vehicles: 2"));
        assert!(text.contains("SR.\nVEH_ID"));
        assert!(text.contains("1\nC1\n"));
        assert!(text.contains("2\nC2\n"));
    }

    #[test]
    fn test_long_table_repeats_header_on_every_page() {
        let doc = lay_out(&sample_table(100), "Compactor", &options());
        assert!(doc.pages.len() > 1);

        for page in &doc.pages {
            assert!(page.text().contains("SR.\nVEH_ID"));
            assert!(page.ops.iter().any(|op| matches!(op, Op::PageLabel { .. })));
        }
        let last = doc.pages.last().unwrap().text();
        assert!(last.contains("C100"));
    }

    #[test]
    fn test_rows_stay_inside_margins() {
        let doc = lay_out(&sample_table(100), "Compactor", &options());
        for page in &doc.pages {
            for op in &page.ops {
                if let Op::FillRect { y, .. } = op {
                    assert!(*y >= MARGIN_BOTTOM - 0.01);
                }
            }
        }
    }

    #[test]
    fn test_logo_drawn_only_when_present() {
        let without = lay_out(&sample_table(1), "Compactor", &options());
        assert!(!without.pages[0].ops.iter().any(|op| matches!(op, Op::Image { .. })));

        let mut opts = options();
        opts.logo = Some(crate::report::logo::Logo {
            width: 1,
            height: 1,
            colors: 1,
            data: vec![0],
            alpha: None,
        });
        let with = lay_out(&sample_table(1), "Compactor", &opts);
        assert!(with.pages[0].ops.iter().any(|op| matches!(op, Op::Image { .. })));
    }

    #[test]
    fn test_long_title_truncated() {
        let title = "Container Base Collection ".repeat(10);
        let doc = lay_out(&sample_table(1), &title, &options());
        let first = doc.pages[0].text();
        let line = first.lines().next().unwrap();
        assert!(line.ends_with("..."));
    }
}
