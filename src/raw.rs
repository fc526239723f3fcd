//! Where the elements of a [`SmallVector`](crate::SmallVector) live.

use crate::{allocator::Allocator, error::Error, internal::uninit_buffer};

use core::{
    alloc::Layout,
    mem::{self, MaybeUninit},
    ptr::{self, NonNull},
};

/// The active storage of a vector: either the inline buffer or an owned heap
/// block.
///
/// This type only tracks slots. It never reads, writes or drops elements on
/// its own; relocations move exactly the `len` leading slots they are told
/// are live.
pub(crate) enum Storage<T, const N: usize> {
    /// Elements live in a buffer embedded in the vector itself.
    Inline([MaybeUninit<T>; N]),

    /// Elements live in a block of `capacity` slots obtained from the allocator.
    Heap { ptr: NonNull<T>, capacity: usize },
}

impl<T, const N: usize> Storage<T, N> {
    #[inline]
    pub(crate) const fn new() -> Self {
        Self::Inline(uninit_buffer!())
    }

    #[inline]
    pub(crate) const fn is_inline(&self) -> bool {
        matches!(self, Self::Inline(_))
    }

    #[inline]
    pub(crate) const fn capacity(&self) -> usize {
        match self {
            Self::Inline(_) => N,
            Self::Heap { capacity, .. } => *capacity,
        }
    }

    #[inline]
    pub(crate) const fn as_ptr(&self) -> *const T {
        match self {
            Self::Inline(buf) => buf.as_ptr().cast::<T>(),
            Self::Heap { ptr, .. } => ptr.as_ptr().cast_const(),
        }
    }

    #[inline]
    pub(crate) fn as_mut_ptr(&mut self) -> *mut T {
        match self {
            Self::Inline(buf) => buf.as_mut_ptr().cast::<T>(),
            Self::Heap { ptr, .. } => ptr.as_ptr(),
        }
    }

    fn layout(capacity: usize) -> Result<Layout, Error> {
        let layout = Layout::array::<T>(capacity).map_err(|_| Error::CapacityOverflow)?;
        if layout.size() > isize::MAX as usize {
            return Err(Error::CapacityOverflow);
        }
        Ok(layout)
    }

    /// Moves the `len` live elements into a fresh heap block of exactly
    /// `new_capacity` slots and releases the previous heap block, if any.
    ///
    /// Nothing is modified when allocation fails.
    ///
    /// # Safety
    ///
    /// - the first `len` slots of the active storage are initialized
    /// - `len <= new_capacity`
    /// - `alloc` is the allocator that provided the current heap block
    pub(crate) unsafe fn relocate_to_heap<A: Allocator>(
        &mut self,
        alloc: &A,
        len: usize,
        new_capacity: usize,
    ) -> Result<(), Error> {
        debug_assert!(len <= new_capacity, "relocation would drop live elements");

        let layout = Self::layout(new_capacity)?;
        let block = if layout.size() == 0 {
            NonNull::dangling()
        } else {
            alloc
                .allocate(layout)
                .map_err(|_| Error::AllocFailed { layout })?
                .cast::<T>()
        };

        // SAFETY: the new block holds at least `len` slots and is disjoint from
        // the active storage
        unsafe {
            ptr::copy_nonoverlapping(self.as_ptr(), block.as_ptr(), len);
        }

        let old = mem::replace(
            self,
            Self::Heap {
                ptr: block,
                capacity: new_capacity,
            },
        );
        // SAFETY: the old storage no longer owns any element and came from `alloc`
        unsafe { old.free(alloc) };
        Ok(())
    }

    /// Moves the `len` live elements from the heap block back into an inline
    /// buffer and releases the block.
    ///
    /// # Safety
    ///
    /// - `self` is [`Storage::Heap`]
    /// - the first `len` slots are initialized and `len <= N`
    /// - `alloc` is the allocator that provided the heap block
    pub(crate) unsafe fn relocate_to_inline<A: Allocator>(&mut self, alloc: &A, len: usize) {
        debug_assert!(!self.is_inline(), "storage is already inline");
        debug_assert!(len <= N, "inline buffer capacity exceeded");

        let mut buf: [MaybeUninit<T>; N] = uninit_buffer!();
        // SAFETY: `len <= N` slots fit in the buffer, which is a fresh local
        unsafe {
            ptr::copy_nonoverlapping(self.as_ptr(), buf.as_mut_ptr().cast::<T>(), len);
        }

        let old = mem::replace(self, Self::Inline(buf));
        // SAFETY: the heap block no longer owns any element and came from `alloc`
        unsafe { old.free(alloc) };
    }

    /// Releases the heap block and falls back to an empty inline buffer.
    ///
    /// # Safety
    ///
    /// No slot may hold a live element, and `alloc` must be the allocator that
    /// provided the heap block.
    pub(crate) unsafe fn release<A: Allocator>(&mut self, alloc: &A) {
        let old = mem::replace(self, Self::new());
        // SAFETY: forwarded from the caller
        unsafe { old.free(alloc) };
    }

    /// # Safety
    ///
    /// Same as [`Self::release`].
    unsafe fn free<A: Allocator>(self, alloc: &A) {
        if let Self::Heap { ptr, capacity } = self {
            // SAFETY: the same size was accepted by `Self::layout` when the
            // block was allocated
            let layout = unsafe {
                Layout::from_size_align_unchecked(capacity * size_of::<T>(), align_of::<T>())
            };
            if layout.size() != 0 {
                // SAFETY: the block was allocated by `alloc` with this layout
                unsafe { alloc.deallocate(ptr.cast::<u8>(), layout) }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Global;

    #[test]
    fn starts_inline() {
        let storage = Storage::<u32, 4>::new();
        assert!(storage.is_inline());
        assert_eq!(storage.capacity(), 4);
    }

    #[test]
    fn heap_and_back() {
        let mut storage = Storage::<u32, 4>::new();
        for i in 0..3 {
            // SAFETY: slot `i` is within the inline buffer
            let slot = unsafe { storage.as_mut_ptr().add(i) };
            // SAFETY: writing to an uninitialized slot
            unsafe { slot.write(i as u32 * 10) };
        }

        // SAFETY: three slots are initialized, Global backs every block here
        unsafe { storage.relocate_to_heap(&Global, 3, 16).unwrap() };
        assert!(!storage.is_inline());
        assert_eq!(storage.capacity(), 16);

        // SAFETY: heap-resident with three live slots
        unsafe { storage.relocate_to_inline(&Global, 3) };
        assert!(storage.is_inline());
        assert_eq!(storage.capacity(), 4);

        // SAFETY: three slots are still initialized after the round trip
        let values = unsafe { core::slice::from_raw_parts(storage.as_ptr(), 3) };
        assert_eq!(values, &[0, 10, 20]);
    }

    #[test]
    fn overflowing_layout() {
        let mut storage = Storage::<u64, 1>::new();
        // SAFETY: nothing is live
        let err = unsafe { storage.relocate_to_heap(&Global, 0, usize::MAX) };
        assert_eq!(err, Err(Error::CapacityOverflow));
        assert!(storage.is_inline());
    }
}
