use super::field::{WireField, WireInt};

/// Borrowing overlay that reads and writes typed fields of a header.
///
/// `B` is anything that dereferences to bytes: `&[u8]` for read-only decode
/// views, `&mut [u8]` for in-place editing, `Vec<u8>` for owned headers.
/// Field offsets must lie inside the buffer; callers check the buffer length
/// against the header length before building a view.
#[derive(Debug, Clone, Copy)]
pub struct HeaderView<B> {
    buffer: B,
}

impl<B: AsRef<[u8]>> HeaderView<B> {
    pub fn new(buffer: B) -> Self {
        Self { buffer }
    }

    /// Read `field` and convert it from network to host order.
    #[inline]
    pub fn get<T: WireInt>(&self, field: WireField<T>) -> T {
        T::from_be_slice(&self.buffer.as_ref()[field.range()])
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_ref()
    }

    pub fn get_ref(&self) -> &B {
        &self.buffer
    }

    pub fn into_inner(self) -> B {
        self.buffer
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> HeaderView<B> {
    /// Write `value` into exactly the bytes of `field`, big-endian.
    #[inline]
    pub fn set<T: WireInt>(&mut self, field: WireField<T>, value: T) {
        value.write_be_slice(&mut self.buffer.as_mut()[field.range()]);
    }
}
