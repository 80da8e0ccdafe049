use std::fmt;
use std::marker::PhantomData;
use std::ops::Range;

use serde::Serialize;

mod sealed {
    pub trait Sealed {}
}

/// Unsigned integer that can live in a header field.
///
/// Implemented for `u8`, `u16` and `u32`, the widths used by the supported
/// protocols.
pub trait WireInt: Copy + sealed::Sealed {
    /// Width of the integer on the wire, in bytes.
    const WIDTH: usize;

    /// Decode from exactly `WIDTH` big-endian bytes.
    fn from_be_slice(bytes: &[u8]) -> Self;

    /// Encode into exactly `WIDTH` bytes, big-endian.
    fn write_be_slice(self, out: &mut [u8]);
}

macro_rules! impl_wire_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}

            impl WireInt for $ty {
                const WIDTH: usize = std::mem::size_of::<$ty>();

                #[inline]
                fn from_be_slice(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(bytes);
                    <$ty>::from_be_bytes(raw)
                }

                #[inline]
                fn write_be_slice(self, out: &mut [u8]) {
                    out.copy_from_slice(&self.to_be_bytes());
                }
            }
        )*
    };
}

impl_wire_int!(u8, u16, u32);

/// Typed field at a fixed byte offset within a header.
///
/// The width is implied by `T`, so a `WireField<u16>` always covers two
/// bytes starting at `offset`.
pub struct WireField<T> {
    name: &'static str,
    offset: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T: WireInt> WireField<T> {
    pub const fn new(name: &'static str, offset: usize) -> Self {
        Self {
            name,
            offset,
            _marker: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub const fn offset(&self) -> usize {
        self.offset
    }

    pub const fn width(&self) -> usize {
        T::WIDTH
    }

    /// One past the last byte of the field.
    pub const fn end(&self) -> usize {
        self.offset + T::WIDTH
    }

    pub const fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }

    /// Untyped descriptor, used for layout tables.
    pub const fn descriptor(&self) -> FieldDescriptor {
        FieldDescriptor {
            name: self.name,
            offset: self.offset,
            width: T::WIDTH,
        }
    }
}

impl<T> Clone for WireField<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for WireField<T> {}

impl<T> fmt::Debug for WireField<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WireField")
            .field("name", &self.name)
            .field("offset", &self.offset)
            .field("width", &std::mem::size_of::<T>())
            .finish()
    }
}

/// Name, offset and width of one header field (all big-endian).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub offset: usize,
    pub width: usize,
}

impl FieldDescriptor {
    pub fn end(&self) -> usize {
        self.offset + self.width
    }
}

/// Total length covered by a layout table.
pub fn layout_len(fields: &[FieldDescriptor]) -> usize {
    fields.iter().map(FieldDescriptor::end).max().unwrap_or(0)
}
