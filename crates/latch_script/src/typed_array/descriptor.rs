//! Ownership contract for bytes crossing the script boundary.

use crate::typed_array::kind::{with_slice, ElementKind, ElementSlice};
use bytemuck::Pod;
use rquickjs::{ArrayBuffer, Ctx};

/// Who owns the bytes a descriptor points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Lives inside an engine allocation; valid only while the source value is alive.
    Borrowed,
    /// Allocated here and handed to the engine along with its release function.
    Transferred,
    /// A call-local duplicate produced by the engine.
    CopiedOut,
}

/// A window of bytes plus its ownership mode.
///
/// Descriptors can only be built through the checked constructors below:
/// a missing base (null data pointer, detached buffer) or a window that
/// does not fit inside its base always yields an empty descriptor.
#[derive(Debug, Clone, Copy)]
pub struct BufferDescriptor<'a> {
    base: &'a [u8],
    byte_offset: usize,
    byte_len: usize,
    ownership: Ownership,
}

impl<'a> BufferDescriptor<'a> {
    pub fn empty(ownership: Ownership) -> Self {
        Self {
            base: &[],
            byte_offset: 0,
            byte_len: 0,
            ownership,
        }
    }

    /// Borrow `byte_len` bytes at `byte_offset` inside an engine allocation.
    pub fn borrowed(base: Option<&'a [u8]>, byte_offset: usize, byte_len: usize) -> Self {
        Self::window(base, byte_offset, byte_len, Ownership::Borrowed)
    }

    /// Wrap an engine-made duplicate; always starts at offset 0.
    pub fn copied_out(copy: Option<&'a [u8]>) -> Self {
        let len = copy.map_or(0, <[u8]>::len);
        Self::window(copy, 0, len, Ownership::CopiedOut)
    }

    fn window(
        base: Option<&'a [u8]>,
        byte_offset: usize,
        byte_len: usize,
        ownership: Ownership,
    ) -> Self {
        let Some(base) = base else {
            return Self::empty(ownership);
        };
        match byte_offset.checked_add(byte_len) {
            Some(end) if end <= base.len() => Self {
                base,
                byte_offset,
                byte_len,
                ownership,
            },
            _ => {
                tracing::warn!(
                    byte_offset,
                    byte_len,
                    allocation = base.len(),
                    "typed array window exceeds its buffer; reading as empty"
                );
                Self::empty(ownership)
            }
        }
    }

    #[inline]
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    #[inline]
    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    #[inline]
    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.byte_len == 0
    }

    /// The addressed bytes, excluding anything outside the window.
    pub fn bytes(&self) -> &'a [u8] {
        &self.base[self.byte_offset..self.byte_offset + self.byte_len]
    }

    /// Number of whole `kind` elements; `None` for raw buffers and the sentinel.
    pub fn element_count(&self, kind: ElementKind) -> Option<usize> {
        kind.is_typed_array().then(|| self.byte_len / kind.byte_width())
    }

    /// Copy the window into a fresh vector of `T`.
    ///
    /// A trailing partial element is dropped. The source may be unaligned
    /// for `T`, so the copy goes through the destination's bytes.
    pub fn to_vec<T: Pod>(&self) -> Vec<T> {
        let width = std::mem::size_of::<T>();
        let count = self.byte_len / width;
        let mut out = vec![T::zeroed(); count];
        bytemuck::cast_slice_mut::<T, u8>(&mut out).copy_from_slice(&self.bytes()[..count * width]);
        out
    }
}

/// A heap block sized exactly to the data it carries, destined for the engine.
///
/// Once staged, the engine owns the allocation and frees it from its
/// release callback, which rebuilds the `Vec` and drops it. That callback
/// touches nothing but the block.
#[derive(Debug)]
pub struct TransferBlock<T> {
    data: Vec<T>,
}

impl<T: Pod> TransferBlock<T> {
    pub fn from_slice(data: &[T]) -> Self {
        let data = data.to_vec();
        debug_assert_eq!(data.len(), data.capacity());
        Self { data }
    }

    pub fn descriptor(&self) -> BufferDescriptor<'_> {
        let bytes: &[u8] = bytemuck::cast_slice(&self.data);
        BufferDescriptor {
            base: bytes,
            byte_offset: 0,
            byte_len: bytes.len(),
            ownership: Ownership::Transferred,
        }
    }

    /// Move the block into a new engine `ArrayBuffer`.
    pub fn into_engine<'js>(self, ctx: &Ctx<'js>) -> rquickjs::Result<ArrayBuffer<'js>> {
        ArrayBuffer::new(ctx.clone(), self.data)
    }
}

/// Duplicate `data` into a [`TransferBlock`] of its native type and hand it to the engine.
pub(crate) fn transfer<'js>(
    ctx: &Ctx<'js>,
    data: ElementSlice<'_>,
) -> rquickjs::Result<ArrayBuffer<'js>> {
    with_slice!(data, |slice| {
        let block = TransferBlock::from_slice(slice);
        tracing::trace!(byte_len = block.descriptor().byte_len(), "transferring block to engine");
        block.into_engine(ctx)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_base_reads_empty() {
        let desc = BufferDescriptor::borrowed(None, 0, 16);
        assert!(desc.is_empty());
        assert!(desc.bytes().is_empty());
        assert_eq!(desc.ownership(), Ownership::Borrowed);
    }

    #[test]
    fn window_addresses_only_its_range() {
        let base: Vec<u8> = (0..16).collect();
        let desc = BufferDescriptor::borrowed(Some(&base), 4, 6);
        assert_eq!(desc.bytes(), &[4, 5, 6, 7, 8, 9]);
        assert_eq!(desc.byte_offset(), 4);
    }

    #[test]
    fn out_of_bounds_window_is_empty() {
        let base = [0u8; 8];
        assert!(BufferDescriptor::borrowed(Some(&base), 4, 8).is_empty());
        assert!(BufferDescriptor::borrowed(Some(&base), usize::MAX, 2).is_empty());
    }

    #[test]
    fn to_vec_drops_trailing_partial_element() {
        let bytes = 7u32.to_ne_bytes().into_iter().chain([0xAA, 0xBB]).collect::<Vec<_>>();
        let desc = BufferDescriptor::copied_out(Some(&bytes));
        assert_eq!(desc.to_vec::<u32>(), vec![7]);
        assert_eq!(desc.element_count(ElementKind::Uint32Array), Some(1));
        assert_eq!(desc.element_count(ElementKind::ArrayBuffer), None);
    }

    #[test]
    fn to_vec_handles_unaligned_windows() {
        let value = 1.5f64.to_ne_bytes();
        let mut base = vec![0u8];
        base.extend_from_slice(&value);
        let desc = BufferDescriptor::borrowed(Some(&base), 1, 8);
        assert_eq!(desc.to_vec::<f64>(), vec![1.5]);
    }

    #[test]
    fn transfer_block_is_exactly_sized() {
        let block = TransferBlock::from_slice(&[1i16, 2, 3]);
        let desc = block.descriptor();
        assert_eq!(desc.byte_len(), 6);
        assert_eq!(desc.ownership(), Ownership::Transferred);
        assert_eq!(desc.to_vec::<i16>(), vec![1, 2, 3]);
    }
}
