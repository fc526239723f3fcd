use core::{alloc::Layout, fmt, ptr::NonNull};

/// The allocator refused a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocError;

impl fmt::Display for AllocError {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("memory allocation failed")
    }
}

impl core::error::Error for AllocError {}

/// A source of heap blocks for [`SmallVector`](crate::SmallVector).
///
/// Implementations may be stateless (like [`Global`]) or carry state, in which
/// case every container owns its own copy of the allocator.
///
/// # Safety
///
/// A block returned by [`Self::allocate`] must be valid for reads and writes of
/// `layout.size()` bytes, aligned to `layout.align()`, and must stay valid until
/// it is passed to [`Self::deallocate`] on the same allocator.
pub unsafe trait Allocator {
    /// Allocates a block described by `layout`.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] if the block cannot be provided.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Releases a block.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by [`Self::allocate`] on this allocator with
    /// the same `layout`, and must not have been released already.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

// SAFETY: forwarding to the underlying allocator preserves its guarantees
unsafe impl<A: Allocator + ?Sized> Allocator for &A {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        (**self).allocate(layout)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: caller upholds the contract of `deallocate`
        unsafe { (**self).deallocate(ptr, layout) }
    }
}

/// The global heap, as registered with `#[global_allocator]`.
///
/// # Examples
///
/// ```
/// use small_vector::{Global, SmallVector};
///
/// let mut vec = SmallVector::<u8, 2>::new_in(Global);
/// vec.extend_from_slice(b"abc");
/// assert!(!vec.is_inline());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Global;

// SAFETY: blocks come straight from the global allocator and are returned to it
// with the layout they were requested with.
unsafe impl Allocator for Global {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        if layout.size() == 0 {
            // any non-null aligned address is a valid zero-sized block
            return NonNull::new(layout.align() as *mut u8).ok_or(AllocError);
        }
        // SAFETY: layout has a non-zero size
        let ptr = unsafe { alloc::alloc::alloc(layout) };
        NonNull::new(ptr).ok_or(AllocError)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() != 0 {
            // SAFETY: caller guarantees `ptr` came from `allocate` with this layout
            unsafe { alloc::alloc::dealloc(ptr.as_ptr(), layout) }
        }
    }
}
