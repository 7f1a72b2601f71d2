// Copyright 2026 the Pixelcanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The software frame buffer.
//!
//! A [`Surface`] is a fixed-size grid of [`Rgba8`] pixels stored row-major
//! with the origin at the top-left, matching the layout of a canvas
//! `ImageData`. Its byte view ([`Surface::as_bytes`]) is what gets copied to
//! the presentation surface, so its length is always
//! `width * height * 4`.

use alloc::vec;
use alloc::vec::Vec;

use bytemuck::{Pod, Zeroable};
use kurbo::Rect;

use crate::error::PresentError;

/// One pixel: 8-bit red, green, blue and alpha, in that byte order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (255 = opaque).
    pub a: u8,
}

impl Rgba8 {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    /// Creates a pixel from its four channels.
    #[inline]
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque pixel.
    #[inline]
    #[must_use]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }
}

/// Number of bytes per [`Rgba8`] pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// A width × height RGBA frame buffer.
///
/// The size is fixed at construction; resizing means building a new
/// surface (and a new presenter around it).
#[derive(Clone, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<Rgba8>,
}

impl core::fmt::Debug for Surface {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pixels_len", &self.pixels.len())
            .finish_non_exhaustive()
    }
}

impl Surface {
    /// Allocates a transparent surface of the given size.
    ///
    /// # Panics
    ///
    /// If `width * height * 4` overflows `usize`. Use
    /// [`try_new`](Self::try_new) for sizes that come from outside.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        match Self::try_new(width, height) {
            Ok(surface) => surface,
            Err(err) => panic!("{err}"),
        }
    }

    /// Allocates a transparent surface of the given size.
    ///
    /// # Errors
    ///
    /// Returns [`PresentError::TooLarge`] if the byte length
    /// `width * height * 4` overflows `usize`.
    pub fn try_new(width: u32, height: u32) -> Result<Self, PresentError> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .filter(|px| px.checked_mul(size_of::<Rgba8>()).is_some())
            .ok_or(PresentError::TooLarge { width, height })?;
        Ok(Self {
            width,
            height,
            pixels: vec![Rgba8::TRANSPARENT; len],
        })
    }

    /// Width in pixels.
    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The surface's extent in pixel coordinates, anchored at the origin.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    /// Length of the byte view, `width * height * 4`.
    #[inline]
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.pixels.len() * BYTES_PER_PIXEL
    }

    /// All pixels, row-major.
    #[inline]
    #[must_use]
    pub fn pixels(&self) -> &[Rgba8] {
        &self.pixels
    }

    /// All pixels, row-major, for in-place rendering.
    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [Rgba8] {
        &mut self.pixels
    }

    /// The frame buffer as RGBA bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// The frame buffer as mutable RGBA bytes.
    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        bytemuck::cast_slice_mut(&mut self.pixels)
    }

    /// One row of pixels, or `None` if `y` is out of range.
    #[must_use]
    pub fn row(&self, y: u32) -> Option<&[Rgba8]> {
        let range = self.row_range(y)?;
        Some(&self.pixels[range])
    }

    /// One mutable row of pixels, or `None` if `y` is out of range.
    pub fn row_mut(&mut self, y: u32) -> Option<&mut [Rgba8]> {
        let range = self.row_range(y)?;
        Some(&mut self.pixels[range])
    }

    /// Reads the pixel at `(x, y)`, or `None` if out of range.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Writes the pixel at `(x, y)`.
    ///
    /// Returns `false` (and writes nothing) if the coordinate is out of
    /// range.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba8) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.pixels[i] = color;
                true
            }
            None => false,
        }
    }

    /// Sets every pixel to `color`.
    pub fn fill(&mut self, color: Rgba8) {
        self.pixels.fill(color);
    }

    /// Sets every pixel to transparent black.
    pub fn clear(&mut self) {
        self.fill(Rgba8::TRANSPARENT);
    }

    /// Replaces the whole frame buffer with `bytes`.
    ///
    /// Returns `false` (and copies nothing) unless `bytes.len()` equals
    /// [`byte_len`](Self::byte_len).
    pub fn set_pixels(&mut self, bytes: &[u8]) -> bool {
        if bytes.len() != self.byte_len() {
            return false;
        }
        self.as_bytes_mut().copy_from_slice(bytes);
        true
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    fn row_range(&self, y: u32) -> Option<core::ops::Range<usize>> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.width as usize;
        Some(start..start + self.width as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_view_is_rgba_in_order() {
        let mut s = Surface::new(2, 1);
        s.set_pixel(1, 0, Rgba8::new(1, 2, 3, 4));
        assert_eq!(s.as_bytes(), &[0, 0, 0, 0, 1, 2, 3, 4]);
        assert_eq!(s.byte_len(), 8);
    }

    #[test]
    fn out_of_range_access_is_rejected() {
        let mut s = Surface::new(3, 2);
        assert_eq!(s.pixel(3, 0), None);
        assert_eq!(s.pixel(0, 2), None);
        assert!(!s.set_pixel(0, 2, Rgba8::WHITE), "row past the end");
        assert!(s.row(2).is_none(), "row past the end");
        assert!(s.pixels().iter().all(|&p| p == Rgba8::TRANSPARENT));
    }

    #[test]
    fn rows_are_row_major() {
        let mut s = Surface::new(3, 2);
        s.row_mut(1).unwrap().fill(Rgba8::WHITE);
        assert_eq!(s.pixel(0, 0), Some(Rgba8::TRANSPARENT));
        assert_eq!(s.pixel(2, 1), Some(Rgba8::WHITE));
        assert_eq!(s.row(1).unwrap().len(), 3);
    }

    #[test]
    fn set_pixels_requires_exact_length() {
        let mut s = Surface::new(1, 2);
        assert!(!s.set_pixels(&[9; 4]), "too short");
        assert!(s.set_pixels(&[9; 8]), "exact length");
        assert_eq!(s.pixel(0, 1), Some(Rgba8::new(9, 9, 9, 9)));

        s.clear();
        assert_eq!(s.as_bytes(), &[0; 8]);
    }

    #[test]
    fn bounds_cover_the_whole_surface() {
        let s = Surface::new(640, 480);
        assert_eq!(s.bounds(), Rect::new(0.0, 0.0, 640.0, 480.0));
        assert_eq!(s.byte_len(), 640 * 480 * 4);
    }

    #[test]
    fn oversized_surface_is_an_error() {
        assert_eq!(
            Surface::try_new(u32::MAX, u32::MAX).unwrap_err(),
            PresentError::TooLarge {
                width: u32::MAX,
                height: u32::MAX,
            }
        );
        let s = Surface::try_new(3, 2).unwrap();
        assert_eq!(s.byte_len(), 24);
    }

    #[test]
    #[should_panic(expected = "does not fit in memory")]
    fn new_panics_on_oversized_surface() {
        let _ = Surface::new(u32::MAX, u32::MAX);
    }
}
