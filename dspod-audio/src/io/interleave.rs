//! Conversion between packed and interleaved stereo frames.
//!
//! Some serial audio peripherals move one `u32` per stereo frame:
//! - Lower 16 bits (bits 0–15): left channel sample (`i16`)
//! - Upper 16 bits (bits 16–31): right channel sample (`i16`)
//!
//! The engine works on interleaved `[L, R, L, R, ...]` `i16` slices, so the
//! scheduler converts at the DMA boundary.

/// Unpack `src` frames into interleaved `dest`.
///
/// # Panics
///
/// Debug-asserts that `dest` holds two samples per frame.
pub fn unpack_frames(src: &[u32], dest: &mut [i16]) {
    debug_assert_eq!(dest.len(), src.len() * 2);

    for (frame, out) in src.iter().zip(dest.chunks_exact_mut(2)) {
        out[0] = *frame as i16;
        out[1] = (*frame >> 16) as i16;
    }
}

/// Pack interleaved `src` into one `u32` per frame: `(right << 16) | left`.
///
/// # Panics
///
/// Debug-asserts that `src` holds two samples per frame.
pub fn pack_frames(src: &[i16], dest: &mut [u32]) {
    debug_assert_eq!(src.len(), dest.len() * 2);

    for (pair, out) in src.chunks_exact(2).zip(dest.iter_mut()) {
        *out = (pair[0] as u16 as u32) | ((pair[1] as u16 as u32) << 16);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_places_left_low() {
        let mut dest = [0u32; 2];
        pack_frames(&[100, 500, -200, -600], &mut dest);
        assert_eq!(dest[0], (100u16 as u32) | ((500u16 as u32) << 16));
        assert_eq!(dest[1] as i16, -200);
        assert_eq!((dest[1] >> 16) as i16, -600);
    }

    #[test]
    fn unpack_basic() {
        let src = [
            (100u16 as u32) | ((500u16 as u32) << 16),
            ((-200i16 as u16) as u32) | (((-600i16 as u16) as u32) << 16),
        ];
        let mut dest = [0i16; 4];
        unpack_frames(&src, &mut dest);
        assert_eq!(dest, [100, 500, -200, -600]);
    }

    #[test]
    fn extreme_values() {
        let samples = [i16::MIN, i16::MAX, i16::MAX, i16::MIN];
        let mut packed = [0u32; 2];
        pack_frames(&samples, &mut packed);

        let mut out = [0i16; 4];
        unpack_frames(&packed, &mut out);
        assert_eq!(out, samples);
    }

    #[test]
    fn empty_slices() {
        pack_frames(&[], &mut []);
        unpack_frames(&[], &mut []);
    }
}
