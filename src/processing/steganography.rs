//! # LSB Steganography Implementation
//!
//! Hides an opaque byte blob inside a raster image by overwriting the least
//! significant bit of each color channel.
//!
//! ## Algorithm
//!
//! ### Encoding Process
//! 1. Decode the carrier (any format supported by the `image` crate) to RGBA8
//! 2. Prepend a 4-byte big-endian length header to the blob
//! 3. Walk the pixels in raster order; for each pixel use the R, G and B
//!    channels in turn (alpha is left untouched):
//!    - Clear the channel's LSB
//!    - Set it to the next data bit (MSB of each byte first)
//! 4. Encode the result as PNG
//!
//! The output is always PNG, whatever the carrier format was. A lossy
//! re-encode (JPEG) would scramble the low bits and lose the payload.
//!
//! ### Decoding Process
//! 1. Read the first 32 bits to get the blob length
//! 2. Read exactly `length * 8` further bits and pack them into bytes
//!
//! ### Capacity
//! An image holds `width * height * 3` bits, of which 32 go to the header.
//! Example: a 900x600 carrier stores up to ~202 KB.

use image::{ImageFormat, RgbaImage};
use log::debug;
use std::io::Cursor;

use crate::common::error::{Result, StegoError};

/// Bits spent on the length header.
pub const HEADER_BITS: usize = 32;

/// Color channels used per pixel (R, G, B).
const CHANNELS_PER_PIXEL: usize = 3;

/// Number of LSB slots in a `width` x `height` image.
pub fn capacity_bits(width: u32, height: u32) -> usize {
    width as usize * height as usize * CHANNELS_PER_PIXEL
}

/// Largest blob, in bytes, that fits a `width` x `height` carrier.
pub fn max_message_len(width: u32, height: u32) -> usize {
    capacity_bits(width, height).saturating_sub(HEADER_BITS) / 8
}

/// Embed `secret` into the carrier image bytes and return PNG bytes.
///
/// # Errors
/// - [`StegoError::InsufficientCapacity`] if the carrier is too small
/// - [`StegoError::Image`] if the carrier cannot be decoded
pub fn embed_bytes(image_bytes: &[u8], secret: &[u8]) -> Result<Vec<u8>> {
    let mut img = image::load_from_memory(image_bytes)?.to_rgba8();

    let available = capacity_bits(img.width(), img.height());
    let required = HEADER_BITS + secret.len() * 8;
    let too_small = StegoError::InsufficientCapacity {
        required,
        available,
    };
    if required > available {
        return Err(too_small);
    }
    let length = u32::try_from(secret.len()).map_err(|_| too_small)?;

    let data = length.to_be_bytes().into_iter().chain(secret.iter().copied());
    let bits = data.flat_map(|byte| (0..8).rev().map(move |i| (byte >> i) & 1));

    for (channel, bit) in lsb_slots_mut(&mut img).zip(bits) {
        *channel = (*channel & 0xFE) | bit;
    }

    let mut output_bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut output_bytes), ImageFormat::Png)?;

    debug!(
        "Embedded {} bytes into {}x{} carrier ({} of {} bits)",
        secret.len(),
        img.width(),
        img.height(),
        required,
        available
    );

    Ok(output_bytes)
}

/// Extract a blob previously written by [`embed_bytes`].
///
/// # Errors
/// - [`StegoError::CorruptStegoData`] if the header claims more bits than the
///   image holds
/// - [`StegoError::Image`] if the image cannot be decoded
pub fn extract_bytes(image_bytes: &[u8]) -> Result<Vec<u8>> {
    let img = image::load_from_memory(image_bytes)?.to_rgba8();
    let total = capacity_bits(img.width(), img.height());
    if total < HEADER_BITS {
        return Err(StegoError::CorruptStegoData {
            claimed: HEADER_BITS,
            available: total,
        });
    }
    let available = total - HEADER_BITS;

    let mut bits = lsb_slots(&img);
    let mut header = [0u8; 4];
    for byte in header.iter_mut() {
        *byte = pack_byte(&mut bits);
    }

    let claimed = u32::from_be_bytes(header) as usize * 8;
    if claimed > available {
        return Err(StegoError::CorruptStegoData { claimed, available });
    }

    Ok((0..claimed / 8).map(|_| pack_byte(&mut bits)).collect())
}

/// R, G, B channel bytes of every pixel in raster order.
fn lsb_slots_mut(img: &mut RgbaImage) -> impl Iterator<Item = &mut u8> {
    img.pixels_mut()
        .flat_map(|pixel| pixel.0.iter_mut().take(CHANNELS_PER_PIXEL))
}

/// Least significant bits of the R, G, B channels in raster order.
fn lsb_slots(img: &RgbaImage) -> impl Iterator<Item = u8> + '_ {
    img.pixels()
        .flat_map(|pixel| pixel.0.into_iter().take(CHANNELS_PER_PIXEL))
        .map(|channel| channel & 1)
}

/// Pack the next 8 bits (MSB first). Missing bits read as zero.
fn pack_byte(bits: &mut impl Iterator<Item = u8>) -> u8 {
    bits.take(8).fold(0, |acc, bit| (acc << 1) | bit)
}
