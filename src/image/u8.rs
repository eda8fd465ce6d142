/// Borrowed view over an 8-bit, single-channel, row-major buffer.
#[derive(Clone, Debug)]
pub struct ImageU8<'a> {
    pub w: usize,
    pub h: usize,
    pub stride: usize, // bytes between rows
    pub data: &'a [u8],
}

impl<'a> ImageU8<'a> {
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.stride + x]
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[u8] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }

    /// Contiguous pixel slice, available when `stride == w`.
    #[inline]
    pub fn as_slice(&self) -> Option<&[u8]> {
        (self.stride == self.w).then_some(&self.data[..self.w * self.h])
    }

    /// Copy into a contiguous `w * h` buffer, dropping any row padding.
    pub fn to_vec(&self) -> Vec<u8> {
        if let Some(slice) = self.as_slice() {
            return slice.to_vec();
        }
        let mut out = Vec::with_capacity(self.w * self.h);
        for y in 0..self.h {
            out.extend_from_slice(self.row(y));
        }
        out
    }
}
