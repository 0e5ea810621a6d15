//! # PCL Raster Graphics
//!
//! Turns a monochrome bit matrix into PCL raster rows. Each row becomes a
//! pair of items:
//!
//! ```text
//! ESC * b 4 W        ← control item declaring the byte count
//! 80 80 C0 00        ← binary item with the packed row
//! ```
//!
//! ## Bit Packing
//!
//! - Bit 7 (MSB) = leftmost dot
//! - Bit 0 (LSB) = rightmost dot
//! - 1 = black (print), 0 = white (no print)
//! - A short last group is padded with trailing zero bits
//!
//! ```text
//! 1 0 0 0 0 0 0 0 | 1 1 0 ░ ░ ░ ░ ░
//!      0x80       |      0xC0
//! ```
//!
//! Rows are independent: a matrix may mix widths, each row declares its own
//! byte count. Wrap the rows in [`pcl::raster_start_graphic`] and
//! [`pcl::raster_end_graphic`], or use [`write_graphic`].

use std::path::Path;

use image::DynamicImage;
use tracing::debug;

use super::pcl;
use crate::document::Document;
use crate::error::{PrintStreamError, Result};

/// Luma below this value prints as a black dot
pub const DEFAULT_THRESHOLD: u8 = 128;

/// Monochrome image, one `Vec` of 0/1 dots per scanline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RasterMatrix {
    rows: Vec<Vec<u8>>,
}

impl RasterMatrix {
    /// Build from rows of 0/1 values. Any other value is rejected.
    pub fn new(rows: Vec<Vec<u8>>) -> Result<Self> {
        for (y, row) in rows.iter().enumerate() {
            if let Some(x) = row.iter().position(|&dot| dot > 1) {
                return Err(PrintStreamError::InvalidParameter(format!(
                    "raster dot ({}, {}) must be 0 or 1, got {}",
                    x, y, row[x]
                )));
            }
        }
        Ok(Self { rows })
    }

    /// Build from strings of `0` and `1`. Spaces are ignored, so rows can
    /// be grouped by byte for readability.
    ///
    /// ```
    /// use printstream::protocol::raster::RasterMatrix;
    ///
    /// let matrix = RasterMatrix::from_bit_strings(&[
    ///     "00000000 00000000 10000000 00000000",
    ///     "00000000 00000000 11000000 00000000",
    /// ])?;
    /// assert_eq!(matrix.height(), 2);
    /// assert_eq!(matrix.rows()[1].len(), 32);
    /// # Ok::<(), printstream::PrintStreamError>(())
    /// ```
    pub fn from_bit_strings<S: AsRef<str>>(lines: &[S]) -> Result<Self> {
        let rows = lines
            .iter()
            .map(|line| {
                line.as_ref()
                    .chars()
                    .filter(|c| *c != ' ')
                    .map(|c| match c {
                        '0' => Ok(0),
                        '1' => Ok(1),
                        other => Err(PrintStreamError::InvalidParameter(format!(
                            "raster rows may only contain 0, 1 and spaces, got {:?}",
                            other
                        ))),
                    })
                    .collect::<Result<Vec<u8>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rows })
    }

    /// Threshold an image: pixels darker than `threshold` become dots.
    ///
    /// Transparent pixels count as paper (white).
    pub fn from_image(img: &DynamicImage, threshold: u8) -> Self {
        let luma = img.to_luma_alpha8();
        let (width, height) = luma.dimensions();

        let rows = (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| {
                        let pixel = luma.get_pixel(x, y);
                        let [value, alpha] = pixel.0;
                        u8::from(alpha >= 128 && value < threshold)
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    /// Load and threshold an image file (PNG, GIF, ...).
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let img = image::open(path.as_ref()).map_err(|e| {
            PrintStreamError::Image(format!("{}: {}", path.as_ref().display(), e))
        })?;
        debug!(
            path = %path.as_ref().display(),
            width = img.width(),
            height = img.height(),
            "Image loaded"
        );
        Ok(Self::from_image(&img, DEFAULT_THRESHOLD))
    }

    pub fn rows(&self) -> &[Vec<u8>] {
        &self.rows
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Widest row, in dots.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Bytes needed for a row of `dots` dots.
#[inline]
pub fn row_byte_count(dots: usize) -> usize {
    dots.div_ceil(8)
}

/// Pack one row of 0/1 dots, MSB first, zero-padding the last byte.
///
/// ```
/// use printstream::protocol::raster::pack_row;
///
/// assert_eq!(pack_row(&[1, 0, 1]), vec![0xA0]);
/// ```
pub fn pack_row(row: &[u8]) -> Vec<u8> {
    row.chunks(8)
        .map(|group| {
            group
                .iter()
                .enumerate()
                .filter(|(_, dot)| **dot != 0)
                .fold(0u8, |byte, (i, _)| byte | (0x80 >> i))
        })
        .collect()
}

/// # Transfer Raster Data (ESC * b # W)
///
/// Appends one declare/data pair per row, in row order. An empty matrix
/// appends nothing.
pub fn write_raster(doc: &mut Document, matrix: &RasterMatrix) {
    for row in matrix.rows() {
        let packed = pack_row(row);
        pcl::write_esc(doc, &format!("*b{}W", packed.len()));
        doc.write_bytes(packed);
    }
}

/// Complete raster graphic: resolution, presentation mode, start, rows,
/// end.
pub fn write_graphic(
    doc: &mut Document,
    matrix: &RasterMatrix,
    dpi: u16,
    at_cursor: bool,
) -> Result<()> {
    pcl::raster_set_resolution(doc, dpi)?;
    pcl::raster_presentation_mode(doc);
    pcl::raster_start_graphic(doc, at_cursor);
    write_raster(doc, matrix);
    pcl::raster_end_graphic(doc);
    debug!(
        rows = matrix.height(),
        width = matrix.width(),
        dpi,
        "Raster graphic appended"
    );
    Ok(())
}
