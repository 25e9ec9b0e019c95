//! Glyph widths for the base-14 Helvetica faces
//!
//! Widths are in 1/1000 em for printable ASCII (32..=126) under
//! WinAnsiEncoding. Anything else is measured as an average glyph.

use super::pdf::Font;

const FALLBACK_WIDTH: u16 = 556;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

const ELLIPSIS: &str = "...";

fn glyph_width(font: Font, c: char) -> u16 {
    let table = match font {
        Font::Bold => &HELVETICA_BOLD,
        // Oblique shares the upright metrics
        Font::Regular | Font::Italic => &HELVETICA,
    };
    match c as u32 {
        code @ 32..=126 => table[(code - 32) as usize],
        _ => FALLBACK_WIDTH,
    }
}

/// Rendered width of `text` in points
pub fn text_width(text: &str, font: Font, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(glyph_width(font, c))).sum();
    units as f32 * size / 1000.0
}

/// Shorten `text` with a trailing ellipsis until it fits `max_width`
pub fn fit_text(text: &str, font: Font, size: f32, max_width: f32) -> String {
    if text_width(text, font, size) <= max_width {
        return text.to_string();
    }

    let budget = max_width - text_width(ELLIPSIS, font, size);
    if budget <= 0.0 {
        return String::new();
    }

    let mut used = 0.0;
    let mut fitted = String::new();
    for c in text.chars() {
        let w = f32::from(glyph_width(font, c)) * size / 1000.0;
        if used + w > budget {
            break;
        }
        used += w;
        fitted.push(c);
    }
    fitted.truncate(fitted.trim_end().len());
    fitted.push_str(ELLIPSIS);
    fitted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_widths() {
        // "Hi" = H(722) + i(222)
        assert!((text_width("Hi", Font::Regular, 10.0) - 9.44).abs() < 1e-4);
        // bold i is wider
        assert!(text_width("i", Font::Bold, 10.0) > text_width("i", Font::Regular, 10.0));
        assert_eq!(text_width("", Font::Regular, 12.0), 0.0);
    }

    #[test]
    fn test_fit_text_keeps_short_text() {
        assert_eq!(fit_text("C1", Font::Regular, 7.0, 50.0), "C1");
    }

    #[test]
    fn test_fit_text_truncates_with_ellipsis() {
        let long = "Container Base Collection across every district";
        let fitted = fit_text(long, Font::Regular, 7.0, 60.0);

        assert!(fitted.ends_with("..."));
        assert!(fitted.len() < long.len());
        assert!(text_width(&fitted, Font::Regular, 7.0) <= 60.0);
    }

    #[test]
    fn test_fit_text_no_room() {
        assert_eq!(fit_text("Compactor", Font::Regular, 7.0, 2.0), "");
    }
}
