//! PNG logo decoding for the report header
//!
//! Any PNG the `png` crate reads is normalised to 8-bit greyscale or RGB
//! samples. An alpha channel (including palette transparency) is split off
//! into a separate soft mask. Both planes are re-deflated for `/FlateDecode`.

use flate2::write::ZlibEncoder;
use flate2::Compression;
use miette::Diagnostic;
use png::{BitDepth, ColorType, Decoder, Transformations};
use std::io::{Cursor, Write};
use std::path::Path;
use thiserror::Error;

/// A logo image ready to embed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Logo {
    pub width: u32,
    pub height: u32,
    /// 1 for greyscale, 3 for RGB
    pub colors: u8,
    /// Zlib-compressed colour samples, 8 bits per component
    pub data: Vec<u8>,
    /// Zlib-compressed 8-bit alpha samples, when the PNG has transparency
    pub alpha: Option<Vec<u8>>,
}

#[derive(Debug, Error, Diagnostic)]
pub enum LogoError {
    #[error("cannot decode PNG: {0}")]
    #[diagnostic(code(fleet::report::logo))]
    Decode(#[from] png::DecodingError),

    #[error("unsupported PNG layout after expansion: {color_type:?}, {bit_depth:?}")]
    #[diagnostic(code(fleet::report::logo))]
    Unsupported {
        color_type: ColorType,
        bit_depth: BitDepth,
    },

    #[error("cannot compress logo samples: {0}")]
    #[diagnostic(code(fleet::report::logo))]
    Compress(#[from] std::io::Error),
}

impl Logo {
    /// Load a logo, degrading to `None` when it is absent or unusable
    pub fn load(path: &Path) -> Option<Logo> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no logo file, report header will omit it");
                return None;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read logo");
                return None;
            }
        };

        match Self::parse(&bytes) {
            Ok(logo) => Some(logo),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "logo skipped");
                None
            }
        }
    }

    /// Decode PNG bytes into embeddable sample planes
    pub fn parse(bytes: &[u8]) -> Result<Logo, LogoError> {
        let mut decoder = Decoder::new(Cursor::new(bytes));
        // palette to RGB, tRNS to alpha, sub-byte depths up to 8 bits
        decoder.set_transformations(Transformations::EXPAND | Transformations::STRIP_16);

        let mut reader = decoder.read_info()?;
        let mut pixels = vec![0; reader.output_buffer_size()];
        let frame = reader.next_frame(&mut pixels)?;
        pixels.truncate(frame.buffer_size());

        if frame.bit_depth != BitDepth::Eight {
            return Err(LogoError::Unsupported {
                color_type: frame.color_type,
                bit_depth: frame.bit_depth,
            });
        }

        let (colors, has_alpha) = match frame.color_type {
            ColorType::Grayscale => (1u8, false),
            ColorType::GrayscaleAlpha => (1, true),
            ColorType::Rgb => (3, false),
            ColorType::Rgba => (3, true),
            other => {
                return Err(LogoError::Unsupported {
                    color_type: other,
                    bit_depth: frame.bit_depth,
                })
            }
        };

        let (color, alpha) = if has_alpha {
            let (color, alpha) = split_alpha(&pixels, colors as usize);
            (color, Some(alpha))
        } else {
            (pixels, None)
        };

        Ok(Logo {
            width: frame.width,
            height: frame.height,
            colors,
            data: deflate(&color)?,
            alpha: alpha.as_deref().map(deflate).transpose()?,
        })
    }
}

/// Separate interleaved samples into colour and alpha planes
fn split_alpha(pixels: &[u8], colors: usize) -> (Vec<u8>, Vec<u8>) {
    let stride = colors + 1;
    let mut color = Vec::with_capacity(pixels.len() / stride * colors);
    let mut alpha = Vec::with_capacity(pixels.len() / stride);
    for pixel in pixels.chunks_exact(stride) {
        color.extend_from_slice(&pixel[..colors]);
        alpha.push(pixel[colors]);
    }
    (color, alpha)
}

fn deflate(samples: &[u8]) -> Result<Vec<u8>, std::io::Error> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(samples)?;
    encoder.finish()
}
