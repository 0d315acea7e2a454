//! Bit-packed region-of-interest mask.

use std::ops::Index;

use super::grid::Shape;

const BITS_PER_WORD: usize = 64;

/// A 2D boolean mask packed as bits, one `u64` per 64 pixels.
///
/// Bits past `width * height` in the last word are always zero, so
/// [`Mask::count_ones`] can count whole words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    words: Vec<u64>,
    width: usize,
    height: usize,
    len: usize,
}

impl Mask {
    pub fn new_filled(width: usize, height: usize, value: bool) -> Self {
        let len = width * height;
        let fill = if value { !0u64 } else { 0u64 };
        let mut mask = Self {
            words: vec![fill; len.div_ceil(BITS_PER_WORD)],
            width,
            height,
            len,
        };
        mask.clear_tail();
        mask
    }

    pub fn new_default(width: usize, height: usize) -> Self {
        Self::new_filled(width, height, false)
    }

    /// Build a mask from row-major booleans. `data.len()` must be `width * height`.
    pub fn from_slice(width: usize, height: usize, data: &[bool]) -> Self {
        let len = width * height;
        assert_eq!(
            data.len(),
            len,
            "data length {} does not match dimensions {}x{}={}",
            data.len(),
            width,
            height,
            len
        );

        let mut words = vec![0u64; len.div_ceil(BITS_PER_WORD)];
        for (i, &value) in data.iter().enumerate() {
            if value {
                words[i / BITS_PER_WORD] |= 1u64 << (i % BITS_PER_WORD);
            }
        }

        Self {
            words,
            width,
            height,
            len,
        }
    }

    /// Build a mask by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut mask = Self::new_default(width, height);
        for y in 0..height {
            for x in 0..width {
                if f(x, y) {
                    mask.set(y * width + x, true);
                }
            }
        }
        mask
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn shape(&self) -> Shape {
        Shape::new(self.width, self.height)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn get(&self, idx: usize) -> bool {
        debug_assert!(idx < self.len);
        (self.words[idx / BITS_PER_WORD] >> (idx % BITS_PER_WORD)) & 1 != 0
    }

    #[inline]
    pub fn set(&mut self, idx: usize, value: bool) {
        debug_assert!(idx < self.len);
        let bit = 1u64 << (idx % BITS_PER_WORD);
        if value {
            self.words[idx / BITS_PER_WORD] |= bit;
        } else {
            self.words[idx / BITS_PER_WORD] &= !bit;
        }
    }

    #[inline]
    pub fn get_xy(&self, x: usize, y: usize) -> bool {
        debug_assert!(x < self.width && y < self.height);
        self.get(y * self.width + x)
    }

    #[inline]
    pub fn set_xy(&mut self, x: usize, y: usize, value: bool) {
        debug_assert!(x < self.width && y < self.height);
        self.set(y * self.width + x, value);
    }

    /// Number of set pixels.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// True when no pixel is set.
    pub fn is_all_false(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = bool> + '_ {
        (0..self.len).map(move |idx| self.get(idx))
    }

    fn clear_tail(&mut self) {
        let tail = self.len % BITS_PER_WORD;
        if tail != 0
            && let Some(last) = self.words.last_mut()
        {
            *last &= (1u64 << tail) - 1;
        }
    }
}

impl Index<usize> for Mask {
    type Output = bool;

    #[inline]
    fn index(&self, idx: usize) -> &Self::Output {
        if self.get(idx) { &true } else { &false }
    }
}

impl Index<(usize, usize)> for Mask {
    type Output = bool;

    #[inline]
    fn index(&self, (x, y): (usize, usize)) -> &Self::Output {
        if self.get_xy(x, y) { &true } else { &false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_filled_true_counts_only_real_pixels() {
        let mask = Mask::new_filled(10, 7, true);
        assert_eq!(mask.len(), 70);
        assert_eq!(mask.count_ones(), 70);
        assert!(mask.iter().all(|b| b));
    }

    #[test]
    fn test_new_filled_false() {
        let mask = Mask::new_filled(100, 3, false);
        assert_eq!(mask.count_ones(), 0);
        assert!(mask.is_all_false());
    }

    #[test]
    fn test_set_get_across_word_boundary() {
        let mut mask = Mask::new_default(65, 2);
        mask.set(63, true);
        mask.set(64, true);
        mask.set_xy(0, 1, true);
        assert!(mask.get(63));
        assert!(mask.get(64));
        assert!(mask[(0, 1)]);
        assert!(mask[65]);
        assert_eq!(mask.count_ones(), 3);

        mask.set(64, false);
        assert!(!mask.get(64));
        assert_eq!(mask.count_ones(), 2);
    }

    #[test]
    fn test_from_slice_round_trips_through_iter() {
        let data = [true, false, false, true, true, false];
        let mask = Mask::from_slice(3, 2, &data);
        let back: Vec<bool> = mask.iter().collect();
        assert_eq!(back, data);
    }

    #[test]
    #[should_panic(expected = "does not match dimensions")]
    fn test_from_slice_panics_on_size_mismatch() {
        Mask::from_slice(3, 2, &[true; 5]);
    }

    #[test]
    fn test_from_fn() {
        let mask = Mask::from_fn(4, 4, |x, y| x == y);
        assert_eq!(mask.count_ones(), 4);
        assert!(mask.get_xy(2, 2));
        assert!(!mask.get_xy(2, 1));
    }
}
