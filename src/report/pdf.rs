//! Minimal PDF 1.4 writer
//!
//! Pages are buffered as drawing operations and serialised in one pass once
//! the page count is known. Fonts are the base-14 Helvetica faces with
//! WinAnsiEncoding, so nothing is embedded except an optional logo image.
//! Content streams are left uncompressed.

use chrono::NaiveDateTime;

use super::metrics::text_width;
use super::logo::Logo;

/// An RGB colour with components in 0..=1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb(1.0, 1.0, 1.0);
    pub const GREY: Rgb = Rgb(0.5, 0.5, 0.5);
    pub const LIGHT_GREY: Rgb = Rgb(0.827, 0.827, 0.827);
    pub const DARK_GREEN: Rgb = Rgb(0.0, 0.392, 0.0);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
    Italic,
}

impl Font {
    const ALL: [Font; 3] = [Font::Regular, Font::Bold, Font::Italic];

    fn resource(&self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
            Font::Italic => "F3",
        }
    }

    fn base_font(&self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
            Font::Italic => "Helvetica-Oblique",
        }
    }
}

/// A buffered drawing operation; coordinates are points from bottom-left
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    FillRect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Rgb,
    },
    StrokeRect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        width: f32,
        color: Rgb,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width: f32,
        color: Rgb,
    },
    /// Text with its baseline starting at `(x, y)`
    Text {
        x: f32,
        y: f32,
        font: Font,
        size: f32,
        color: Rgb,
        text: String,
    },
    /// The document logo scaled into the given box
    Image { x: f32, y: f32, w: f32, h: f32 },
    /// `Page X of N`, right-aligned at `right`; resolved after layout
    PageLabel {
        right: f32,
        y: f32,
        font: Font,
        size: f32,
        color: Rgb,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<Op>,
}

impl Page {
    pub fn push(&mut self, op: Op) {
        self.ops.push(op);
    }

    /// Concatenated text of every text op, for assertions and debugging
    pub fn text(&self) -> String {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A laid-out document
#[derive(Debug, Clone)]
pub struct Document {
    pub width: f32,
    pub height: f32,
    pub title: String,
    pub created_at: NaiveDateTime,
    pub logo: Option<Logo>,
    pub pages: Vec<Page>,
}

impl Document {
    /// Replace every page-label placeholder with `Page X of N`
    pub fn resolve_page_labels(&mut self) {
        let total = self.pages.len();
        for (idx, page) in self.pages.iter_mut().enumerate() {
            for op in page.ops.iter_mut() {
                if let Op::PageLabel {
                    right,
                    y,
                    font,
                    size,
                    color,
                } = *op
                {
                    let text = format!("Page {} of {}", idx + 1, total);
                    *op = Op::Text {
                        x: right - text_width(&text, font, size),
                        y,
                        font,
                        size,
                        color,
                        text,
                    };
                }
            }
        }
    }

    /// Serialise to PDF bytes
    ///
    /// Unresolved page labels are dropped.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = PdfWriter::default();
        out.raw(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

        const CATALOG: usize = 1;
        const PAGES: usize = 2;
        const FIRST_FONT: usize = 3;
        const INFO: usize = 6;
        let image = self.logo.as_ref().map(|_| 7);
        let mask = self
            .logo
            .as_ref()
            .and_then(|logo| logo.alpha.as_ref())
            .map(|_| 8);
        let first_page = mask.or(image).map_or(7, |id| id + 1);
        let page_ids: Vec<usize> = (0..self.pages.len()).map(|i| first_page + 2 * i).collect();

        out.object(CATALOG, &format!("<< /Type /Catalog /Pages {PAGES} 0 R >>"));

        let kids = page_ids
            .iter()
            .map(|id| format!("{id} 0 R"))
            .collect::<Vec<_>>()
            .join(" ");
        out.object(
            PAGES,
            &format!(
                "<< /Type /Pages /Kids [{kids}] /Count {} /MediaBox [0 0 {} {}] >>",
                self.pages.len(),
                num(self.width),
                num(self.height)
            ),
        );

        for (offset, font) in Font::ALL.iter().enumerate() {
            out.object(
                FIRST_FONT + offset,
                &format!(
                    "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                    font.base_font()
                ),
            );
        }

        out.object(
            INFO,
            &format!(
                "<< /Title {} /Producer {} /CreationDate (D:{}) >>",
                literal(&self.title),
                literal(concat!("fleet-inventory ", env!("CARGO_PKG_VERSION"))),
                self.created_at.format("%Y%m%d%H%M%S")
            ),
        );

        if let (Some(id), Some(logo)) = (image, self.logo.as_ref()) {
            let color_space = if logo.colors == 1 { "DeviceGray" } else { "DeviceRGB" };
            let smask = mask.map(|m| format!(" /SMask {m} 0 R")).unwrap_or_default();
            out.stream(id, &image_dict(logo, color_space, &smask), &logo.data);

            if let (Some(mask_id), Some(alpha)) = (mask, logo.alpha.as_ref()) {
                out.stream(mask_id, &image_dict(logo, "DeviceGray", ""), alpha);
            }
        }

        let fonts = Font::ALL
            .iter()
            .enumerate()
            .map(|(offset, f)| format!("/{} {} 0 R", f.resource(), FIRST_FONT + offset))
            .collect::<Vec<_>>()
            .join(" ");
        let xobjects = image
            .map(|id| format!(" /XObject << /Im1 {id} 0 R >>"))
            .unwrap_or_default();

        for (page, &page_id) in self.pages.iter().zip(&page_ids) {
            let content_id = page_id + 1;
            out.object(
                page_id,
                &format!(
                    "<< /Type /Page /Parent {PAGES} 0 R /Resources << /Font << {fonts} >>{xobjects} >> \
                     /Contents {content_id} 0 R >>"
                ),
            );
            out.stream(content_id, "<<", content_stream(page).as_bytes());
        }

        out.finish(CATALOG, INFO)
    }
}

fn image_dict(logo: &Logo, color_space: &str, extra: &str) -> String {
    format!(
        "<< /Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /{color_space} \
         /BitsPerComponent 8 /Filter /FlateDecode{extra}",
        logo.width, logo.height
    )
}

fn content_stream(page: &Page) -> String {
    let mut s = String::new();
    for op in &page.ops {
        match op {
            Op::FillRect { x, y, w, h, color } => {
                s.push_str(&format!(
                    "{} rg\n{} {} {} {} re f\n",
                    rgb(*color),
                    num(*x),
                    num(*y),
                    num(*w),
                    num(*h)
                ));
            }
            Op::StrokeRect {
                x,
                y,
                w,
                h,
                width,
                color,
            } => {
                s.push_str(&format!(
                    "{} RG\n{} w\n{} {} {} {} re S\n",
                    rgb(*color),
                    num(*width),
                    num(*x),
                    num(*y),
                    num(*w),
                    num(*h)
                ));
            }
            Op::Line {
                x1,
                y1,
                x2,
                y2,
                width,
                color,
            } => {
                s.push_str(&format!(
                    "{} RG\n{} w\n{} {} m {} {} l S\n",
                    rgb(*color),
                    num(*width),
                    num(*x1),
                    num(*y1),
                    num(*x2),
                    num(*y2)
                ));
            }
            Op::Text {
                x,
                y,
                font,
                size,
                color,
                text,
            } => {
                s.push_str(&format!(
                    "BT\n/{} {} Tf\n{} rg\n{} {} Td\n{} Tj\nET\n",
                    font.resource(),
                    num(*size),
                    rgb(*color),
                    num(*x),
                    num(*y),
                    literal(text)
                ));
            }
            Op::Image { x, y, w, h } => {
                s.push_str(&format!(
                    "q\n{} 0 0 {} {} {} cm\n/Im1 Do\nQ\n",
                    num(*w),
                    num(*h),
                    num(*x),
                    num(*y)
                ));
            }
            Op::PageLabel { .. } => {}
        }
    }
    s
}

/// Format a coordinate with at most two decimals
fn num(value: f32) -> String {
    let s = format!("{:.2}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" || s.is_empty() {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn rgb(color: Rgb) -> String {
    format!("{} {} {}", num(color.0), num(color.1), num(color.2))
}

/// PDF literal string in WinAnsi: Latin-1 as octal escapes, the rest as `?`
fn literal(text: &str) -> String {
    let mut s = String::with_capacity(text.len() + 2);
    s.push('(');
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                s.push('\\');
                s.push(c);
            }
            ' '..='~' => s.push(c),
            '\u{a0}'..='\u{ff}' => s.push_str(&format!("\\{:03o}", c as u32)),
            _ => s.push('?'),
        }
    }
    s.push(')');
    s
}

/// Byte buffer that tracks object offsets for the xref table
#[derive(Default)]
struct PdfWriter {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    fn start(&mut self, id: usize) {
        // objects are written in id order starting at 1
        debug_assert_eq!(id, self.offsets.len() + 1);
        self.offsets.push(self.buf.len());
        self.raw(format!("{id} 0 obj\n").as_bytes());
    }

    fn object(&mut self, id: usize, body: &str) {
        self.start(id);
        self.raw(body.as_bytes());
        self.raw(b"\nendobj\n");
    }

    /// Write a stream object; `dict` is the opening of its dictionary
    fn stream(&mut self, id: usize, dict: &str, data: &[u8]) {
        self.start(id);
        self.raw(format!("{dict} /Length {} >>\nstream\n", data.len()).as_bytes());
        self.raw(data);
        self.raw(b"\nendstream\nendobj\n");
    }

    fn finish(mut self, root: usize, info: usize) -> Vec<u8> {
        let xref_at = self.buf.len();
        let size = self.offsets.len() + 1;
        self.raw(format!("xref\n0 {size}\n0000000000 65535 f \n").as_bytes());
        for offset in std::mem::take(&mut self.offsets) {
            self.raw(format!("{offset:010} 00000 n \n").as_bytes());
        }
        self.raw(
            format!(
                "trailer\n<< /Size {size} /Root {root} 0 R /Info {info} 0 R >>\nstartxref\n{xref_at}\n%%EOF\n"
            )
            .as_bytes(),
        );
        self.buf
    }
}
