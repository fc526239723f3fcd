use crate::{
    allocator::{Allocator, Global},
    error::{infallible, Error},
    internal::define_variants,
    raw::Storage,
};

use core::{
    borrow::{Borrow, BorrowMut},
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    iter::FusedIterator,
    marker::PhantomData,
    mem,
    ops::{Deref, DerefMut, Index, IndexMut},
    ptr, slice,
};

/// A vector that stores up to `N` elements inline and spills to the heap.
///
/// While `len() <= N` and no heap block was ever needed, elements live in a
/// buffer embedded in the vector itself. The first push that would exceed the
/// current capacity moves every element into a heap block obtained from `A`,
/// doubling the capacity. The vector never moves back on its own; call
/// [`Self::shrink_to_inline`] for that.
///
/// Any call that grows, shrinks to inline, inserts or removes invalidates raw
/// pointers previously obtained from [`Self::as_ptr`] and friends.
///
/// # Examples
///
/// ```
/// use small_vector::SmallVector;
///
/// let mut vec = SmallVector::<i32, 4>::new();
/// for i in 0..4 {
///     vec.push(i);
/// }
/// assert!(vec.is_inline());
/// assert_eq!(vec.capacity(), 4);
///
/// vec.push(4);
/// assert!(!vec.is_inline());
/// assert_eq!(vec.capacity(), 8);
/// assert_eq!(vec, [0, 1, 2, 3, 4]);
/// ```
pub struct SmallVector<T, const N: usize, A: Allocator = Global> {
    /// The inline buffer or heap block holding the elements.
    storage: Storage<T, N>,

    /// The current number of initialized elements in the vector.
    len: usize,

    /// Provides and releases heap blocks.
    alloc: A,

    /// Elements sit in `MaybeUninit` slots, but the vector owns them.
    marker: PhantomData<T>,
}

// SAFETY: the vector uniquely owns its elements and heap block
unsafe impl<T: Send, const N: usize, A: Allocator + Send> Send for SmallVector<T, N, A> {}

// SAFETY: shared access only hands out shared references to elements
unsafe impl<T: Sync, const N: usize, A: Allocator + Sync> Sync for SmallVector<T, N, A> {}

impl<T, const N: usize> SmallVector<T, N> {
    /// Creates a new, empty [`SmallVector`] backed by the global heap.
    ///
    /// # Examples
    ///
    /// ```
    /// use small_vector::SmallVector;
    ///
    /// let vec = SmallVector::<i32, 8>::new();
    /// assert_eq!(vec.len(), 0);
    /// assert_eq!(vec.capacity(), 8);
    /// assert!(vec.is_empty());
    /// assert!(vec.is_inline());
    /// assert_eq!(vec.as_slice(), &[]);
    /// ```
    #[must_use]
    #[inline]
    pub const fn new() -> Self {
        Self::new_in(Global)
    }

    /// Creates an empty vector able to hold `capacity` elements without
    /// reallocating.
    ///
    /// Stays inline when `capacity <= N`.
    ///
    /// # Panics
    ///
    /// Panics if the capacity overflows; aborts if allocation fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use small_vector::SmallVector;
    ///
    /// let vec = SmallVector::<u8, 4>::with_capacity(3);
    /// assert!(vec.is_inline());
    ///
    /// let vec = SmallVector::<u8, 4>::with_capacity(10);
    /// assert!(!vec.is_inline());
    /// assert_eq!(vec.capacity(), 10);
    /// ```
    #[must_use]
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_in(capacity, Global)
    }
}

impl<T, const N: usize, A: Allocator> SmallVector<T, N, A> {
    /// Creates a new, empty [`SmallVector`] that allocates from `alloc`.
    #[must_use]
    #[inline]
    pub const fn new_in(alloc: A) -> Self {
        Self {
            storage: Storage::new(),
            len: 0,
            alloc,
            marker: PhantomData,
        }
    }

    /// Creates an empty vector with room for `capacity` elements, allocating
    /// from `alloc` when `capacity > N`.
    ///
    /// # Panics
    ///
    /// Panics if the capacity overflows; aborts if allocation fails.
    #[must_use]
    #[inline]
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Self {
        infallible(Self::try_with_capacity_in(capacity, alloc))
    }

    /// Fallible version of [`Self::with_capacity_in`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityOverflow`] or [`Error::AllocFailed`] when the
    /// heap block cannot be obtained.
    #[inline]
    pub fn try_with_capacity_in(capacity: usize, alloc: A) -> Result<Self, Error> {
        let mut vec = Self::new_in(alloc);
        vec.try_grow(capacity)?;
        Ok(vec)
    }

    /// Returns a reference to the underlying allocator.
    #[must_use]
    #[inline]
    pub const fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Returns a raw pointer to the first slot of the active storage.
    ///
    /// The pointer is valid for reads of `self.len()` elements until the next
    /// call that reallocates, shrinks to inline, inserts or removes.
    ///
    /// # Examples
    ///
    /// ```
    /// use small_vector::SmallVector;
    ///
    /// let mut vec = SmallVector::<i32, 2>::new();
    /// vec.push(1);
    /// vec.push(2);
    /// vec.push(3);
    ///
    /// let ptr = vec.as_ptr();
    /// // SAFETY: computing pointer offset within bounds (len = 3)
    /// let ptr_2 = unsafe { ptr.add(2) };
    /// // SAFETY: ptr_2 points to initialized element at index 2
    /// let third = unsafe { ptr_2.read() };
    /// assert_eq!(third, 3);
    /// ```
    #[expect(clippy::inline_always, reason = "this method is trivial")]
    #[must_use]
    #[inline(always)]
    pub const fn as_ptr(&self) -> *const T {
        self.storage.as_ptr()
    }

    /// Returns a mutable raw pointer to the first slot of the active storage.
    ///
    /// Using the pointer may be unsafe if:
    /// - you write to memory beyond the current length without later calling [`Self::set_len`]
    /// - you read from uninitialized elements (i.e. indices >= `self.len()`)
    /// - you keep it across a call that reallocates or moves the elements
    ///
    /// For safe mutable access, use [`Self::as_mut_slice`] instead.
    #[expect(clippy::inline_always, reason = "this method is trivial")]
    #[must_use]
    #[inline(always)]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.storage.as_mut_ptr()
    }

    /// Forces the length of the vector.
    ///
    /// # Safety
    ///
    /// Calling this function when any of the following conditions are **`true`** is **undefined behavior**:
    /// - `new_len > self.capacity()`
    /// - the slots up to `new_len` are not all initialized.
    #[inline]
    pub unsafe fn set_len(&mut self, new_len: usize) {
        debug_assert!(new_len <= self.capacity(), "buffer capacity exceeded");
        self.len = new_len;
    }

    /// Returns `true` while the elements live in the inline buffer.
    ///
    /// # Examples
    ///
    /// ```
    /// use small_vector::SmallVector;
    ///
    /// let mut vec = SmallVector::<i32, 1>::new();
    /// vec.push(1);
    /// assert!(vec.is_inline());
    /// vec.push(2);
    /// assert!(!vec.is_inline());
    /// ```
    #[must_use]
    #[inline]
    pub const fn is_inline(&self) -> bool {
        self.storage.is_inline()
    }

    /// Makes sure the vector can hold `new_capacity` elements.
    ///
    /// Does nothing if the capacity is already large enough. Otherwise every
    /// element is moved into a heap block of exactly `new_capacity` slots.
    ///
    /// # Panics
    ///
    /// Panics if the capacity overflows; aborts if allocation fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use small_vector::SmallVector;
    ///
    /// let mut vec = SmallVector::<i32, 4>::new();
    /// vec.grow(2);
    /// assert!(vec.is_inline());
    ///
    /// vec.grow(20);
    /// assert!(!vec.is_inline());
    /// assert_eq!(vec.capacity(), 20);
    /// ```
    #[inline]
    pub fn grow(&mut self, new_capacity: usize) {
        infallible(self.try_grow(new_capacity));
    }

    /// Fallible version of [`Self::grow`].
    ///
    /// On error the vector is left exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityOverflow`] or [`Error::AllocFailed`] when the
    /// heap block cannot be obtained.
    #[inline]
    pub fn try_grow(&mut self, new_capacity: usize) -> Result<(), Error> {
        if new_capacity <= self.capacity() {
            return Ok(());
        }
        // SAFETY: the first `len` slots are live, `len <= capacity < new_capacity`
        // and `self.alloc` provided any current heap block
        unsafe {
            self.storage
                .relocate_to_heap(&self.alloc, self.len, new_capacity)
        }
    }

    /// Reserves room for at least `additional` more elements.
    ///
    /// # Panics
    ///
    /// Panics if the capacity overflows; aborts if allocation fails.
    #[inline]
    pub fn reserve(&mut self, additional: usize) {
        infallible(self.try_reserve(additional));
    }

    /// Fallible version of [`Self::reserve`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityOverflow`] or [`Error::AllocFailed`] when the
    /// heap block cannot be obtained.
    #[inline]
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), Error> {
        let needed = self
            .len
            .checked_add(additional)
            .ok_or(Error::CapacityOverflow)?;
        self.try_grow(needed)
    }

    /// Doubles the capacity (at least to one slot) ahead of an append.
    fn grow_for_push(&mut self) -> Result<(), Error> {
        let new_capacity = self
            .capacity()
            .checked_mul(2)
            .ok_or(Error::CapacityOverflow)?
            .max(1);
        self.try_grow(new_capacity)
    }

    /// Moves the elements back into the inline buffer and releases the heap
    /// block.
    ///
    /// Only has an effect when the vector is on the heap and `len() <= N`.
    ///
    /// # Examples
    ///
    /// ```
    /// use small_vector::SmallVector;
    ///
    /// let mut vec = SmallVector::<i32, 4>::new();
    /// vec.extend([10, 20, 30, 40, 50]);
    /// assert!(!vec.is_inline());
    ///
    /// vec.truncate(3);
    /// vec.shrink_to_inline();
    /// assert!(vec.is_inline());
    /// assert_eq!(vec.capacity(), 4);
    /// assert_eq!(vec, [10, 20, 30]);
    /// ```
    #[inline]
    pub fn shrink_to_inline(&mut self) {
        if !self.is_inline() && self.len <= N {
            // SAFETY: heap-resident with `len <= N` live slots, block from `self.alloc`
            unsafe { self.storage.relocate_to_inline(&self.alloc, self.len) }
        }
    }

    /// Appends an element without checking the capacity.
    ///
    /// # Safety
    ///
    /// Calling this function when `self.is_full()` is **undefined behavior**.
    #[inline]
    pub unsafe fn push_unchecked(&mut self, value: T) {
        debug_assert!(!self.is_full(), "buffer capacity exceeded");
        // SAFETY: Caller guarantees self.len < capacity
        let dst = unsafe { self.as_mut_ptr().add(self.len) };
        // SAFETY: Writing to valid uninitialized slot
        unsafe {
            dst.write(value);
        }
        self.len += 1;
    }

    /// Appends an element, doubling the capacity first if the vector is full.
    ///
    /// # Panics
    ///
    /// Panics if the capacity overflows; aborts if allocation fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use small_vector::SmallVector;
    ///
    /// let mut vec = SmallVector::<i32, 2>::new();
    /// vec.push(1);
    /// vec.push(2);
    /// vec.push(3);
    ///
    /// assert_eq!(vec.len(), 3);
    /// assert_eq!(vec.capacity(), 4);
    /// assert_eq!(vec, [1, 2, 3]);
    /// ```
    #[inline]
    pub fn push(&mut self, value: T) {
        if self.is_full() {
            infallible(self.grow_for_push());
        }
        // SAFETY: there is at least one free slot
        unsafe { self.push_unchecked(value) }
    }

    /// Attempts to append an element.
    ///
    /// On error `value` is dropped and the vector is left exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityOverflow`] or [`Error::AllocFailed`] when the
    /// vector is full and cannot grow.
    #[inline]
    pub fn try_push(&mut self, value: T) -> Result<(), Error> {
        if self.is_full() {
            self.grow_for_push()?;
        }
        // SAFETY: there is at least one free slot
        unsafe { self.push_unchecked(value) }
        Ok(())
    }

    /// Appends the value produced by `f` and returns a reference to it.
    ///
    /// `f` runs before any reallocation, so a panic in it leaves the vector
    /// untouched.
    ///
    /// # Panics
    ///
    /// Panics if the capacity overflows; aborts if allocation fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use small_vector::SmallVector;
    ///
    /// let mut vec = SmallVector::<(u8, char), 2>::new();
    /// let slot = vec.emplace_with(|| (1, 'a'));
    /// slot.1 = 'b';
    /// assert_eq!(vec[0], (1, 'b'));
    /// ```
    #[inline]
    pub fn emplace_with<F>(&mut self, f: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        let value = f();
        self.push(value);
        // SAFETY: the element just pushed sits at len - 1
        unsafe { self.get_unchecked_mut(self.len - 1) }
    }

    /// Removes and returns the last element, without checking for emptiness.
    ///
    /// # Safety
    ///
    /// Calling this function when `self.is_empty()` is **undefined behavior**.
    #[inline]
    pub unsafe fn pop_unchecked(&mut self) -> T {
        debug_assert!(!self.is_empty(), "vector is empty");
        self.len -= 1;
        // SAFETY: self.len was > 0, now points to last initialized element
        let ptr = unsafe { self.as_ptr().add(self.len) };
        // SAFETY: Reading from initialized element
        unsafe { ptr.read() }
    }

    /// Removes and returns the last element, or [`None`] if the vector is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use small_vector::SmallVector;
    ///
    /// let mut vec = SmallVector::<i32, 8>::new();
    /// assert_eq!(vec.pop(), None);
    ///
    /// vec.push(42);
    /// assert_eq!(vec.pop(), Some(42));
    /// assert_eq!(vec.pop(), None);
    /// ```
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: the vector is not empty
        Some(unsafe { self.pop_unchecked() })
    }

    /// Inserts an element at position `index` without bound or capacity
    /// checking, shifting all elements after it.
    ///
    /// # Safety
    ///
    /// Calling this function when any of the following conditions are **`true`** is **undefined behavior**:
    /// - `index > self.len()`
    /// - `self.is_full()`
    #[inline]
    pub unsafe fn insert_unchecked(&mut self, index: usize, element: T) {
        debug_assert!(index <= self.len, "index out of bounds");
        debug_assert!(!self.is_full(), "buffer capacity exceeded");
        // SAFETY: Caller guarantees index <= self.len
        let src = unsafe { self.as_mut_ptr().add(index) };
        // SAFETY: Computing destination for shifted elements
        let shifted_src = unsafe { src.add(1) };
        // SAFETY: Shifting elements right by 1 into the free trailing slot
        unsafe {
            ptr::copy(src, shifted_src, self.len - index);
        }
        // SAFETY: Writing element to the vacated position
        unsafe {
            ptr::write(src, element);
        }
        self.len += 1;
    }

    /// Inserts an element at position `index`, shifting all elements after it,
    /// and returns the position of the inserted element.
    ///
    /// The vector grows first when it is full.
    ///
    /// # Panics
    ///
    /// - "index out of bounds" if `index > self.len()`
    /// - on capacity overflow; aborts if allocation fails
    ///
    /// # Examples
    ///
    /// ```
    /// use small_vector::SmallVector;
    ///
    /// let mut vec = SmallVector::<i32, 3>::from([1, 2, 4]);
    /// assert_eq!(vec.insert(2, 3), 2);
    /// assert_eq!(vec, [1, 2, 3, 4]);
    /// assert!(!vec.is_inline());
    /// ```
    ///
    /// A panic if the index is out of bounds:
    ///
    /// ```should_panic
    /// use small_vector::SmallVector;
    ///
    /// let mut vec = SmallVector::<i32, 8>::new();
    /// vec.push(40);
    ///
    /// // this will panic at runtime
    /// vec.insert(2, 10);
    /// ```
    #[inline]
    pub fn insert(&mut self, index: usize, element: T) -> usize {
        assert!(index <= self.len, "index out of bounds");
        if self.is_full() {
            infallible(self.grow_for_push());
        }
        // SAFETY: index is in bounds and there is a free slot
        unsafe { self.insert_unchecked(index, element) }
        index
    }

    /// Attempts to insert an element at position `index`, shifting all elements
    /// after it.
    ///
    /// On error `element` is dropped and the vector is left exactly as it was.
    ///
    /// # Errors
    ///
    /// - [`Error::OutOfRange`] if `index > self.len()`
    /// - [`Error::CapacityOverflow`] or [`Error::AllocFailed`] if the vector
    ///   is full and cannot grow
    ///
    /// # Examples
    ///
    /// ```
    /// use small_vector::{Error, SmallVector};
    ///
    /// let mut vec = SmallVector::<i32, 3>::from([10, 20]);
    /// assert_eq!(vec.try_insert(3, 30), Err(Error::OutOfRange { index: 3, len: 2 }));
    /// assert_eq!(vec.try_insert(1, 15), Ok(1));
    /// assert_eq!(vec, [10, 15, 20]);
    /// ```
    #[inline]
    pub fn try_insert(&mut self, index: usize, element: T) -> Result<usize, Error> {
        if index > self.len {
            return Err(Error::OutOfRange {
                index,
                len: self.len,
            });
        }
        if self.is_full() {
            self.grow_for_push()?;
        }
        // SAFETY: index is in bounds and there is a free slot
        unsafe { self.insert_unchecked(index, element) }
        Ok(index)
    }

    // remove
    define_variants! {
        fn remove(self: &mut Self, index: usize) -> T,

        normal_brief: "Removes and returns the element at `index`, shifting all elements after it to the left",
        try_brief: "Attempts to remove and return the element at `index`, shifting all elements after it to the left",
        unchecked_brief_suffix: "without bounds checking",
        ub_conditions: {
            index >= self.len() => "index out of bounds",
        },
        prefixes: {
            normal: {pub},
            unchecked: {pub},
            try: {pub},
        },
        unchecked_fn: remove_unchecked,
        try_fn: try_remove,
        body: {
            // SAFETY: Caller guarantees index < self.len
            let ptr_to_remove = unsafe { self.as_mut_ptr().add(index) };
            // SAFETY: Reading initialized element at valid index
            let result = unsafe { ptr::read(ptr_to_remove) };
            // SAFETY: Computing source pointer for shift
            let src = unsafe { ptr_to_remove.add(1) };
            // SAFETY: Shifting remaining elements left by 1
            unsafe {
                ptr::copy(src, ptr_to_remove, self.len - index - 1);
            }
            self.len -= 1;
            result
        },
        examples: {
            normal: {
                /// ```
                /// use small_vector::SmallVector;
                ///
                /// let mut vec = SmallVector::<i32, 2>::from([1, 2, 3]);
                ///
                /// assert_eq!(vec.remove(1), 2);
                /// assert_eq!(vec, [1, 3]);
                /// ```
                ///
                /// A panic if the index is out of bounds:
                ///
                /// ```should_panic
                /// use small_vector::SmallVector;
                ///
                /// let mut vec = SmallVector::<i32, 8>::new();
                /// vec.push(1);
                ///
                /// // this will panic at runtime
                /// vec.remove(1);
                /// ```
            }
            try: {
                /// ```
                /// use small_vector::SmallVector;
                ///
                /// let mut vec = SmallVector::<i32, 8>::new();
                /// vec.push(10);
                ///
                /// assert_eq!(vec.try_remove(0), Some(10));
                /// assert_eq!(vec.try_remove(0), None);
                /// ```
            }
        }
    }

    /// Drops the element at `index`, shifting all elements after it to the
    /// left, and returns the position now holding the element that followed
    /// it (`self.len()` if the erased element was the last one).
    ///
    /// # Panics
    ///
    /// - "index out of bounds" if `index >= self.len()`
    ///
    /// # Examples
    ///
    /// ```
    /// use small_vector::SmallVector;
    ///
    /// let mut vec = SmallVector::<i32, 4>::from([1, 2, 3, 4]);
    /// let next = vec.erase(1);
    /// assert_eq!(vec, [1, 3, 4]);
    /// assert_eq!(vec[next], 3);
    ///
    /// assert_eq!(vec.erase(2), vec.len());
    /// ```
    #[inline]
    pub fn erase(&mut self, index: usize) -> usize {
        drop(self.remove(index));
        index
    }

    // swap_remove
    define_variants! {
        fn swap_remove(self: &mut Self, index: usize) -> T,

        normal_brief: "Removes and returns the element at `index` **without** shifting, replacing it with the last element (swap remove)",
        try_brief: "Attempts to remove and return the element at `index` **without** shifting, replacing it with the last element (swap remove)",
        unchecked_brief_suffix: "without bound checking",
        ub_conditions: {
            index >= self.len() => "index out of bounds",
        },
        prefixes: {
            normal: {pub},
            unchecked: {pub},
            try: {pub},
        },
        unchecked_fn: swap_remove_unchecked,
        try_fn: try_swap_remove,
        body: {
            // SAFETY: Caller guarantees index < self.len
            let dst = unsafe { self.as_mut_ptr().add(index) };
            // SAFETY: Reading initialized element at valid index
            let result = unsafe { ptr::read(dst) };
            self.len -= 1;
            if index != self.len {
                // SAFETY: Computing pointer to last element
                let last_ptr = unsafe { self.as_ptr().add(self.len) };
                // SAFETY: Reading last element after decrementing len
                let last = unsafe { last_ptr.read() };
                // SAFETY: Writing to previously read position
                unsafe {
                    ptr::write(dst, last);
                }
            }
            result
        },
        examples: {
            normal: {
                /// ```
                /// use small_vector::SmallVector;
                ///
                /// let mut vec = SmallVector::<i32, 8>::from([1, 2, 3, 4]);
                ///
                /// assert_eq!(vec.swap_remove(1), 2);
                /// assert_eq!(vec, [1, 4, 3]);
                /// ```
            }
            try: {
                /// ```
                /// use small_vector::SmallVector;
                ///
                /// let mut vec = SmallVector::<i32, 8>::from([10, 20]);
                ///
                /// assert_eq!(vec.try_swap_remove(2), None);
                /// assert_eq!(vec.try_swap_remove(0), Some(10));
                /// assert_eq!(vec, [20]);
                /// ```
            }
        }
    }

    // index
    define_variants! {
        fn index(self: &Self, index: usize) -> &T,

        normal_brief: "Returns a reference to the element at `index`",
        try_brief: "Attempts to return a reference to the element at `index`",
        unchecked_brief_suffix: "without bounds checking",
        ub_conditions: {
            index >= self.len => "index out of bounds",
        },
        prefixes: {
            normal: {pub const},
            unchecked: {pub const},
            try: {pub const},
        },
        unchecked_fn: get_unchecked,
        try_fn: get,
        body: {
            // SAFETY: Caller guarantees index < self.len
            let ptr = unsafe { self.as_ptr().add(index) };
            // SAFETY: Creating reference to initialized element
            unsafe { &*ptr }
        },
        examples: {
            normal: {
                /// ```
                /// use small_vector::SmallVector;
                ///
                /// let vec = SmallVector::<i32, 8>::from([10, 20]);
                /// assert_eq!(*vec.index(1), 20);
                /// ```
            }
            try: {
                /// ```
                /// use small_vector::SmallVector;
                ///
                /// let vec = SmallVector::<i32, 8>::from([10, 20]);
                /// assert_eq!(vec.get(1), Some(&20));
                /// assert_eq!(vec.get(2), None);
                /// ```
            }
        }
    }

    // index_mut
    define_variants! {
        fn index_mut(self: &mut Self, index: usize) -> &mut T,

        normal_brief: "Returns a mutable reference to the element at `index`",
        try_brief: "Attempts to return a mutable reference to the element at `index`",
        unchecked_brief_suffix: "without bounds checking",
        ub_conditions: {
            index >= self.len => "index out of bounds",
        },
        prefixes: {
            normal: {pub},
            unchecked: {pub},
            try: {pub},
        },
        unchecked_fn: get_unchecked_mut,
        try_fn: get_mut,
        body: {
            // SAFETY: Caller guarantees index < self.len
            let ptr = unsafe { self.as_mut_ptr().add(index) };
            // SAFETY: Creating mutable reference to initialized element
            unsafe { &mut *ptr }
        },
    }

    /// Returns a reference to the element at `index`, or
    /// [`Error::OutOfRange`] if `index >= self.len()`.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] when `index` is not a live position.
    ///
    /// # Examples
    ///
    /// ```
    /// use small_vector::{Error, SmallVector};
    ///
    /// let vec = SmallVector::<i32, 4>::from([1, 2, 3]);
    /// assert_eq!(vec.at(2), Ok(&3));
    /// assert_eq!(vec.at(5), Err(Error::OutOfRange { index: 5, len: 3 }));
    /// ```
    #[inline]
    pub const fn at(&self, index: usize) -> Result<&T, Error> {
        match self.get(index) {
            Some(elem) => Ok(elem),
            None => Err(Error::OutOfRange {
                index,
                len: self.len,
            }),
        }
    }

    /// Mutable version of [`Self::at`].
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] when `index` is not a live position.
    #[inline]
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, Error> {
        let len = self.len;
        self.get_mut(index)
            .ok_or(Error::OutOfRange { index, len })
    }

    // front
    define_variants! {
        fn front(self: &Self) -> &T,

        normal_brief: "Returns a reference to the first element",
        try_brief: "Attempts to return a reference to the first element",
        unchecked_brief_suffix: "without checking for emptiness",
        ub_conditions: {
            self.is_empty() => "vector is empty",
        },
        prefixes: {
            normal: {pub const},
            unchecked: {pub const},
            try: {pub const},
        },
        unchecked_fn: front_unchecked,
        try_fn: try_front,
        body: {
            // SAFETY: Caller guarantees the vector is not empty
            unsafe { self.get_unchecked(0) }
        },
    }

    // front_mut
    define_variants! {
        fn front_mut(self: &mut Self) -> &mut T,

        normal_brief: "Returns a mutable reference to the first element",
        try_brief: "Attempts to return a mutable reference to the first element",
        unchecked_brief_suffix: "without checking for emptiness",
        ub_conditions: {
            self.is_empty() => "vector is empty",
        },
        prefixes: {
            normal: {pub},
            unchecked: {pub},
            try: {pub},
        },
        unchecked_fn: front_unchecked_mut,
        try_fn: try_front_mut,
        body: {
            // SAFETY: Caller guarantees the vector is not empty
            unsafe { self.get_unchecked_mut(0) }
        },
    }

    // back
    define_variants! {
        fn back(self: &Self) -> &T,

        normal_brief: "Returns a reference to the last element",
        try_brief: "Attempts to return a reference to the last element",
        unchecked_brief_suffix: "without checking for emptiness",
        ub_conditions: {
            self.is_empty() => "vector is empty",
        },
        prefixes: {
            normal: {pub const},
            unchecked: {pub const},
            try: {pub const},
        },
        unchecked_fn: back_unchecked,
        try_fn: try_back,
        body: {
            // SAFETY: Caller guarantees the vector is not empty
            unsafe { self.get_unchecked(self.len - 1) }
        },
        examples: {
            normal: {
                /// ```
                /// use small_vector::SmallVector;
                ///
                /// let vec = SmallVector::<i32, 4>::from([1, 2, 3]);
                /// assert_eq!(*vec.front(), 1);
                /// assert_eq!(*vec.back(), 3);
                /// ```
            }
            try: {
                /// ```
                /// use small_vector::SmallVector;
                ///
                /// let vec = SmallVector::<i32, 4>::new();
                /// assert_eq!(vec.try_back(), None);
                /// ```
            }
        }
    }

    // back_mut
    define_variants! {
        fn back_mut(self: &mut Self) -> &mut T,

        normal_brief: "Returns a mutable reference to the last element",
        try_brief: "Attempts to return a mutable reference to the last element",
        unchecked_brief_suffix: "without checking for emptiness",
        ub_conditions: {
            self.is_empty() => "vector is empty",
        },
        prefixes: {
            normal: {pub},
            unchecked: {pub},
            try: {pub},
        },
        unchecked_fn: back_unchecked_mut,
        try_fn: try_back_mut,
        body: {
            let last = self.len - 1;
            // SAFETY: Caller guarantees the vector is not empty
            unsafe { self.get_unchecked_mut(last) }
        },
    }

    /// Clones and appends every element of `other`, growing at most once.
    ///
    /// # Examples
    ///
    /// ```
    /// use small_vector::SmallVector;
    ///
    /// let mut vec = SmallVector::<i32, 2>::new();
    /// vec.push(1);
    /// vec.extend_from_slice(&[2, 3, 4]);
    /// assert_eq!(vec, [1, 2, 3, 4]);
    /// assert_eq!(vec.capacity(), 4);
    /// ```
    #[inline]
    pub fn extend_from_slice(&mut self, other: &[T])
    where
        T: Clone,
    {
        self.reserve(other.len());
        for item in other {
            // SAFETY: room for all of `other` was reserved above
            unsafe { self.push_unchecked(item.clone()) }
        }
    }

    /// Resizes the vector in place so that `len` equals `new_len`, filling new
    /// slots with values returned by `f`.
    ///
    /// Growing reallocates to exactly `new_len` slots when needed. Shrinking
    /// drops the excess elements and never releases storage.
    ///
    /// # Panics
    ///
    /// Panics if the capacity overflows; aborts if allocation fails. If `f`
    /// panics, the elements it already produced are dropped and the length is
    /// restored before unwinding continues.
    ///
    /// # Examples
    ///
    /// ```
    /// use small_vector::SmallVector;
    ///
    /// let mut vec = SmallVector::<i32, 2>::new();
    /// let mut next = 0;
    /// vec.resize_with(4, || {
    ///     next += 1;
    ///     next
    /// });
    /// assert_eq!(vec, [1, 2, 3, 4]);
    ///
    /// vec.resize_with(1, || unreachable!());
    /// assert_eq!(vec, [1]);
    /// ```
    #[inline]
    pub fn resize_with<F>(&mut self, new_len: usize, f: F)
    where
        F: FnMut() -> T,
    {
        infallible(self.try_resize_with(new_len, f));
    }

    /// Fallible version of [`Self::resize_with`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityOverflow`] or [`Error::AllocFailed`] when
    /// growing needs a heap block that cannot be obtained; the vector is left
    /// exactly as it was.
    #[inline]
    pub fn try_resize_with<F>(&mut self, new_len: usize, mut f: F) -> Result<(), Error>
    where
        F: FnMut() -> T,
    {
        if new_len <= self.len {
            self.truncate(new_len);
            return Ok(());
        }

        self.try_grow(new_len)?;

        let guard = TruncateOnUnwind {
            len: self.len,
            vec: self,
        };
        while guard.vec.len < new_len {
            let value = f();
            // SAFETY: capacity is at least new_len
            unsafe { guard.vec.push_unchecked(value) }
        }
        mem::forget(guard);
        Ok(())
    }

    /// Resizes the vector in place, filling new slots with clones of `value`.
    ///
    /// See [`Self::resize_with`].
    ///
    /// # Panics
    ///
    /// Panics if the capacity overflows; aborts if allocation fails.
    #[inline]
    pub fn resize(&mut self, new_len: usize, value: T)
    where
        T: Clone,
    {
        self.resize_with(new_len, || value.clone());
    }

    /// Resizes the vector in place, filling new slots with `T::default()`.
    ///
    /// See [`Self::resize_with`].
    ///
    /// # Panics
    ///
    /// Panics if the capacity overflows; aborts if allocation fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use small_vector::SmallVector;
    ///
    /// let mut vec = SmallVector::<u32, 4>::from([7]);
    /// vec.resize_default(6);
    /// assert_eq!(vec, [7, 0, 0, 0, 0, 0]);
    /// assert_eq!(vec.capacity(), 6);
    /// ```
    #[inline]
    pub fn resize_default(&mut self, new_len: usize)
    where
        T: Default,
    {
        self.resize_with(new_len, T::default);
    }

    /// Retains only the elements specified by the predicate.
    ///
    /// Removes all elements `e` such that `f(&mut e)` returns false.
    /// This method operates in place and preserves the order of retained elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use small_vector::SmallVector;
    ///
    /// let mut vec = SmallVector::<i32, 2>::from([1, 2, 3, 4, 5, 6]);
    ///
    /// vec.retain(|x| *x % 2 == 0);
    /// assert_eq!(vec, [2, 4, 6]);
    /// ```
    #[inline]
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut T) -> bool,
    {
        let len = self.len;
        // a panic in `f` or in a destructor leaks the rest instead of double dropping
        self.len = 0;

        let base = self.as_mut_ptr();
        let mut kept = 0;
        for i in 0..len {
            // SAFETY: i < len, so this is a valid and initialized element
            let ptr = unsafe { base.add(i) };
            // SAFETY: ptr points to valid initialized element
            if f(unsafe { &mut *ptr }) {
                if kept != i {
                    // SAFETY: kept < i < len, slot `kept` was vacated earlier
                    let dst = unsafe { base.add(kept) };
                    // SAFETY: Copying single element from valid source to valid dest
                    unsafe {
                        ptr::copy_nonoverlapping(ptr, dst, 1);
                    }
                }
                kept += 1;
            } else if mem::needs_drop::<T>() {
                // SAFETY: Dropping initialized element that won't be kept
                unsafe {
                    ptr::drop_in_place(ptr);
                }
            }
        }

        self.len = kept;
    }

    /// Returns a slice containing the entire vector.
    #[must_use]
    #[inline]
    pub const fn as_slice(&self) -> &[T] {
        // SAFETY: First self.len elements are initialized
        unsafe { slice::from_raw_parts(self.as_ptr(), self.len) }
    }

    /// Returns a mutable slice containing the entire vector.
    #[must_use]
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let len = self.len;
        // SAFETY: First self.len elements are initialized
        unsafe { slice::from_raw_parts_mut(self.as_mut_ptr(), len) }
    }

    /// Returns an iterator over the elements, front to back.
    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Returns an iterator that allows modifying each element.
    #[inline]
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    /// Shortens the vector to `len` elements, dropping the rest.
    ///
    /// Has no effect if `len` is greater than or equal to the current length.
    /// The storage location and capacity are left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use small_vector::SmallVector;
    ///
    /// let mut vec = SmallVector::<i32, 2>::from([1, 2, 3, 4]);
    /// vec.truncate(2);
    /// assert_eq!(vec, [1, 2]);
    /// assert!(!vec.is_inline());
    /// ```
    #[inline]
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        let tail_len = self.len - len;
        // SAFETY: len < self.len, so the offset stays within the live elements
        let tail = unsafe { self.as_mut_ptr().add(len) };
        self.len = len;
        // SAFETY: the tail elements were live and are now outside of len
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(tail, tail_len));
        }
    }

    /// Drops every element. The storage location and capacity are unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use small_vector::SmallVector;
    ///
    /// let mut vec = SmallVector::<i32, 2>::from([1, 2, 3]);
    /// vec.clear();
    /// assert!(vec.is_empty());
    /// assert_eq!(vec.capacity(), 3);
    /// ```
    #[inline]
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Returns the number of elements in the vector.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns the number of elements the vector can hold without reallocating.
    #[expect(clippy::inline_always, reason = "this method is trivial")]
    #[inline(always)]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    /// Returns how many more elements fit before the next reallocation.
    #[must_use]
    #[inline]
    pub const fn remaining_capacity(&self) -> usize {
        self.capacity() - self.len
    }

    /// Returns `true` if the vector contains no elements.
    #[must_use]
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if the next append has to reallocate.
    #[must_use]
    #[inline]
    pub const fn is_full(&self) -> bool {
        self.len >= self.capacity()
    }
}

/// Restores the length of a vector when a fill loop unwinds.
struct TruncateOnUnwind<'vec, T, const N: usize, A: Allocator> {
    vec: &'vec mut SmallVector<T, N, A>,
    len: usize,
}

impl<T, const N: usize, A: Allocator> Drop for TruncateOnUnwind<'_, T, N, A> {
    #[inline]
    fn drop(&mut self) {
        self.vec.truncate(self.len);
    }
}

/// Releases the heap block once the elements are gone, even when one of their
/// destructors panics.
struct ReleaseOnExit<'vec, T, const N: usize, A: Allocator> {
    storage: &'vec mut Storage<T, N>,
    alloc: &'vec A,
}

impl<T, const N: usize, A: Allocator> Drop for ReleaseOnExit<'_, T, N, A> {
    #[inline]
    fn drop(&mut self) {
        // SAFETY: the owning vector has len 0 and any heap block came from `alloc`
        unsafe { self.storage.release(self.alloc) }
    }
}

impl<T, const N: usize, A: Allocator + Default> Default for SmallVector<T, N, A> {
    /// Returns an empty inline vector.
    ///
    /// This is equivalent to [`Self::new_in`] with a default allocator.
    #[inline]
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<T, const N: usize, A: Allocator> Drop for SmallVector<T, N, A> {
    /// Drops every live element, then releases the heap block if there is one.
    ///
    /// The block is released even if an element's destructor panics.
    #[inline]
    fn drop(&mut self) {
        let len = mem::replace(&mut self.len, 0);
        let guard = ReleaseOnExit {
            storage: &mut self.storage,
            alloc: &self.alloc,
        };
        if mem::needs_drop::<T>() {
            let base = guard.storage.as_mut_ptr();
            // SAFETY: the first `len` slots were live and `self.len` no longer covers them
            unsafe {
                ptr::drop_in_place(ptr::slice_from_raw_parts_mut(base, len));
            }
        }
        drop(guard);
    }
}

impl<'vec, T, const N: usize, A: Allocator> IntoIterator for &'vec SmallVector<T, N, A> {
    type Item = &'vec T;
    type IntoIter = slice::Iter<'vec, T>;

    /// Iterates over references to the elements.
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'vec, T, const N: usize, A: Allocator> IntoIterator for &'vec mut SmallVector<T, N, A> {
    type Item = &'vec mut T;
    type IntoIter = slice::IterMut<'vec, T>;

    /// Iterates over mutable references to the elements.
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// An iterator that moves out of a [`SmallVector`].
///
/// Any heap block is released once the iterator is dropped.
pub struct IntoIter<T, const N: usize, A: Allocator = Global> {
    /// Index of the next element to yield from the front.
    start: usize,

    /// One past the index of the next element to yield from the back.
    end: usize,

    /// The drained vector; its length is zero so it only owns the storage.
    v: SmallVector<T, N, A>,
}

impl<T, const N: usize, A: Allocator> IntoIter<T, N, A> {
    /// Returns the elements not yet yielded.
    #[must_use]
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: start <= end <= capacity
        let start = unsafe { self.v.as_ptr().add(self.start) };
        // SAFETY: [start, end) are initialized and not yet yielded
        unsafe { slice::from_raw_parts(start, self.end - self.start) }
    }
}

impl<T, const N: usize, A: Allocator> Iterator for IntoIter<T, N, A> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        (self.start < self.end).then(|| {
            let idx = self.start;
            self.start += 1;
            // SAFETY: idx is within range [start, end) which are valid initialized elements
            let elem = unsafe { self.v.as_ptr().add(idx) };
            // SAFETY: Taking ownership of initialized element
            unsafe { elem.read() }
        })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let rem = self.end - self.start;
        (rem, Some(rem))
    }
}

impl<T, const N: usize, A: Allocator> DoubleEndedIterator for IntoIter<T, N, A> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        (self.start < self.end).then(|| {
            self.end -= 1;
            // SAFETY: end is within range [start, end) which are valid initialized elements
            let elem = unsafe { self.v.as_ptr().add(self.end) };
            // SAFETY: elem points to an initialized element that we are taking ownership of
            unsafe { elem.read() }
        })
    }
}

impl<T, const N: usize, A: Allocator> ExactSizeIterator for IntoIter<T, N, A> {}

impl<T, const N: usize, A: Allocator> FusedIterator for IntoIter<T, N, A> {}

impl<T: fmt::Debug, const N: usize, A: Allocator> fmt::Debug for IntoIter<T, N, A> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

impl<T, const N: usize, A: Allocator> Drop for IntoIter<T, N, A> {
    #[inline]
    fn drop(&mut self) {
        if mem::needs_drop::<T>() {
            let remaining = self.end - self.start;
            // SAFETY: start <= end <= capacity
            let start = unsafe { self.v.as_mut_ptr().add(self.start) };
            // SAFETY: the elements in [start, end) are initialized and were never yielded
            unsafe {
                ptr::drop_in_place(ptr::slice_from_raw_parts_mut(start, remaining));
            }
        }
        // the inner vector has len 0 and only releases its storage
    }
}

impl<T, const N: usize, A: Allocator> IntoIterator for SmallVector<T, N, A> {
    type Item = T;
    type IntoIter = IntoIter<T, N, A>;

    #[inline]
    fn into_iter(mut self) -> Self::IntoIter {
        let len = self.len;
        self.len = 0;
        IntoIter {
            start: 0,
            end: len,
            v: self,
        }
    }
}

impl<T, const N: usize, A: Allocator> Deref for SmallVector<T, N, A> {
    type Target = [T];

    /// Equivalent to [`Self::as_slice`].
    #[inline]
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T, const N: usize, A: Allocator> DerefMut for SmallVector<T, N, A> {
    /// Equivalent to [`Self::as_mut_slice`].
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl<T, const N: usize, A: Allocator> AsRef<[T]> for SmallVector<T, N, A> {
    /// Equivalent to [`Self::as_slice`].
    #[inline]
    fn as_ref(&self) -> &[T] {
        self
    }
}

impl<T, const N: usize, A: Allocator> AsMut<[T]> for SmallVector<T, N, A> {
    /// Equivalent to [`Self::as_mut_slice`].
    #[inline]
    fn as_mut(&mut self) -> &mut [T] {
        &mut *self
    }
}

impl<T, const N: usize, A: Allocator> Borrow<[T]> for SmallVector<T, N, A> {
    /// Equivalent to [`Self::as_slice`].
    #[inline]
    fn borrow(&self) -> &[T] {
        self
    }
}

impl<T, const N: usize, A: Allocator> BorrowMut<[T]> for SmallVector<T, N, A> {
    /// Equivalent to [`Self::as_mut_slice`].
    #[inline]
    fn borrow_mut(&mut self) -> &mut [T] {
        &mut *self
    }
}

impl<T: fmt::Debug, const N: usize, A: Allocator> fmt::Debug for SmallVector<T, N, A> {
    /// Formats the elements like a slice.
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl<T, U, const N: usize, const M: usize, A, B> PartialEq<SmallVector<U, M, B>>
    for SmallVector<T, N, A>
where
    T: PartialEq<U>,
    A: Allocator,
    B: Allocator,
{
    #[inline]
    fn eq(&self, other: &SmallVector<U, M, B>) -> bool {
        **self == **other
    }
}

impl<T, U, const N: usize, const M: usize, A> PartialEq<[U; M]> for SmallVector<T, N, A>
where
    T: PartialEq<U>,
    A: Allocator,
{
    #[inline]
    fn eq(&self, other: &[U; M]) -> bool {
        **self == *other
    }
}

impl<T, U, const N: usize, A> PartialEq<[U]> for SmallVector<T, N, A>
where
    T: PartialEq<U>,
    A: Allocator,
{
    #[inline]
    fn eq(&self, other: &[U]) -> bool {
        **self == *other
    }
}

impl<T: Eq, const N: usize, A: Allocator> Eq for SmallVector<T, N, A> {}

impl<T: PartialOrd, const N: usize, A: Allocator> PartialOrd for SmallVector<T, N, A> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        (**self).partial_cmp(&**other)
    }
}

impl<T: Ord, const N: usize, A: Allocator> Ord for SmallVector<T, N, A> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        (**self).cmp(&**other)
    }
}

impl<T: Hash, const N: usize, A: Allocator> Hash for SmallVector<T, N, A> {
    /// Hashes the elements like a slice, so equal vectors hash equally regardless of where they are stored.
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        (**self).hash(state);
    }
}

impl<T: Clone, const N: usize, A: Allocator + Clone> Clone for SmallVector<T, N, A> {
    /// Deep copy: inline when `self.len() <= N`, otherwise a heap block of
    /// exactly `self.len()` slots.
    #[inline]
    fn clone(&self) -> Self {
        let mut out = Self::with_capacity_in(self.len, self.alloc.clone());
        for item in self {
            // SAFETY: out has room for self.len elements
            unsafe { out.push_unchecked(item.clone()) }
        }
        out
    }
}

impl<T, const N: usize, const M: usize, A: Allocator + Default> From<[T; M]>
    for SmallVector<T, N, A>
{
    /// Moves the array elements into a new vector, inline when `M <= N`.
    #[inline]
    fn from(array: [T; M]) -> Self {
        let mut vec = Self::with_capacity_in(M, A::default());
        for item in array {
            // SAFETY: vec has room for M elements
            unsafe { vec.push_unchecked(item) }
        }
        vec
    }
}

impl<T: Clone, const N: usize, A: Allocator + Default> From<&[T]> for SmallVector<T, N, A> {
    /// Clones the slice elements into a new vector.
    #[inline]
    fn from(slice: &[T]) -> Self {
        let mut vec = Self::default();
        vec.extend_from_slice(slice);
        vec
    }
}

impl<T, const N: usize, A: Allocator + Default> FromIterator<T> for SmallVector<T, N, A> {
    /// Collects the iterator into a new vector.
    #[inline]
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut vec = Self::default();
        vec.extend(iter);
        vec
    }
}

impl<T, const N: usize, A: Allocator> Extend<T> for SmallVector<T, N, A> {
    /// Appends every item, reserving for the iterator's lower size bound first.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity overflows `isize::MAX` bytes.
    #[inline]
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        self.reserve(lower);
        for item in iter {
            self.push(item);
        }
    }
}

impl<'a, T: Copy + 'a, const N: usize, A: Allocator> Extend<&'a T> for SmallVector<T, N, A> {
    /// Appends copies of every item.
    #[inline]
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T, const N: usize, A: Allocator> Index<usize> for SmallVector<T, N, A> {
    type Output = T;

    /// Returns a reference to the element at `index`.
    ///
    /// Equivalent to [`Self::index`].
    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        Self::index(self, index)
    }
}

impl<T, const N: usize, A: Allocator> IndexMut<usize> for SmallVector<T, N, A> {
    /// Returns a mutable reference to the element at `index`.
    ///
    /// Equivalent to [`Self::index_mut`].
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        Self::index_mut(self, index)
    }
}

#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
impl<const N: usize, A: Allocator> std::io::Write for SmallVector<u8, N, A> {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.try_reserve(buf.len())
            .map_err(|_| std::io::ErrorKind::OutOfMemory)?;
        self.extend_from_slice(buf);
        Ok(buf.len())
    }

    #[inline]
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::AllocError;
    use alloc::{rc::Rc, string::String, sync::Arc, vec::Vec};
    use core::{
        alloc::Layout,
        cell::Cell,
        ptr::NonNull,
        sync::atomic::{AtomicUsize, Ordering},
    };
    use std::panic::{catch_unwind, AssertUnwindSafe};

    struct DropCounter(Arc<AtomicUsize>);

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct AllocStats {
        allocations: Cell<usize>,
        live: Cell<usize>,
        budget: Cell<usize>,
    }

    /// Hands out at most `budget` blocks from the global heap and keeps count.
    #[derive(Clone)]
    struct TestAlloc(Rc<AllocStats>);

    impl TestAlloc {
        fn with_budget(budget: usize) -> Self {
            let stats = AllocStats::default();
            stats.budget.set(budget);
            Self(Rc::new(stats))
        }

        fn allocations(&self) -> usize {
            self.0.allocations.get()
        }

        fn live(&self) -> usize {
            self.0.live.get()
        }
    }

    // SAFETY: every block comes from and returns to Global
    unsafe impl Allocator for TestAlloc {
        fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
            if self.0.budget.get() == 0 {
                return Err(AllocError);
            }
            self.0.budget.set(self.0.budget.get() - 1);
            self.0.allocations.set(self.0.allocations.get() + 1);
            self.0.live.set(self.0.live.get() + 1);
            Global.allocate(layout)
        }

        unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
            self.0.live.set(self.0.live.get() - 1);
            // SAFETY: forwarded from the caller
            unsafe { Global.deallocate(ptr, layout) }
        }
    }

    fn points_into<V>(value: &V, ptr: *const u8) -> bool {
        let start = ptr::from_ref(value).cast::<u8>() as usize;
        let end = start + size_of::<V>();
        (start..end).contains(&(ptr as usize))
    }

    #[test]
    fn spills_once_past_inline_capacity() {
        let alloc = TestAlloc::with_budget(usize::MAX);
        let mut vec = SmallVector::<i32, 4, TestAlloc>::new_in(alloc.clone());

        for i in 0..4 {
            vec.push(i);
        }
        assert_eq!(vec.len(), 4);
        assert_eq!(vec.capacity(), 4);
        assert!(vec.is_inline());
        assert!(points_into(&vec, vec.as_ptr().cast()));
        assert_eq!(alloc.allocations(), 0);

        vec.push(4);
        assert_eq!(alloc.allocations(), 1);
        assert_eq!(vec.capacity(), 8);
        assert!(!vec.is_inline());
        assert!(!points_into(&vec, vec.as_ptr().cast()));
        assert_eq!(vec, [0, 1, 2, 3, 4]);

        drop(vec);
        assert_eq!(alloc.live(), 0);
    }

    #[test]
    fn doubling_from_heap_releases_old_block() {
        let alloc = TestAlloc::with_budget(usize::MAX);
        let mut vec = SmallVector::<u16, 1, TestAlloc>::new_in(alloc.clone());
        for i in 0..9 {
            vec.push(i);
        }
        // 1 -> 2 -> 4 -> 8 -> 16
        assert_eq!(vec.capacity(), 16);
        assert_eq!(alloc.allocations(), 4);
        assert_eq!(alloc.live(), 1);
        assert_eq!(vec.as_slice(), &[0, 1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn shrink_to_inline_round_trip() {
        let alloc = TestAlloc::with_budget(usize::MAX);
        let mut vec = SmallVector::<i32, 4, TestAlloc>::with_capacity_in(8, alloc.clone());
        vec.extend([10, 20, 30]);
        assert!(!vec.is_inline());

        vec.shrink_to_inline();
        assert!(vec.is_inline());
        assert_eq!(vec.capacity(), 4);
        assert_eq!(vec, [10, 20, 30]);
        assert!(points_into(&vec, vec.as_ptr().cast()));
        assert_eq!(alloc.live(), 0);

        // already inline: nothing happens
        vec.shrink_to_inline();
        assert_eq!(vec, [10, 20, 30]);
    }

    #[test]
    fn shrink_to_inline_needs_room() {
        let mut vec = SmallVector::<i32, 2>::from([1, 2, 3]);
        vec.shrink_to_inline();
        assert!(!vec.is_inline());
        assert_eq!(vec.capacity(), 3);

        vec.erase(0);
        vec.shrink_to_inline();
        assert!(vec.is_inline());
        assert_eq!(vec, [2, 3]);
    }

    #[test]
    fn checked_access() {
        let mut vec = SmallVector::<i32, 4>::from([1, 2, 3]);
        assert_eq!(vec.at(5), Err(Error::OutOfRange { index: 5, len: 3 }));
        assert_eq!(vec.at(3), Err(Error::OutOfRange { index: 3, len: 3 }));
        assert_eq!(vec.at(2), Ok(&3));

        *vec.at_mut(0).unwrap() = 7;
        assert_eq!(vec[0], 7);
        assert!(vec.at_mut(3).is_err());
    }

    #[test]
    fn front_and_back() {
        let mut vec = SmallVector::<i32, 1>::from([1, 2, 3]);
        assert_eq!(*vec.front(), 1);
        assert_eq!(*vec.back(), 3);

        *vec.front_mut() = 10;
        *vec.back_mut() = 30;
        assert_eq!(vec, [10, 2, 30]);

        vec.clear();
        assert_eq!(vec.try_front(), None);
        assert_eq!(vec.try_back_mut(), None);
    }

    #[test]
    fn insert_at_boundaries() {
        let mut vec = SmallVector::<i32, 8>::new();

        vec.insert(0, 1_i32);
        assert_eq!(vec[0], 1_i32);

        vec.insert(0, 0_i32);
        assert_eq!(vec.as_slice(), &[0_i32, 1_i32]);

        vec.insert(2, 2);
        assert_eq!(vec.as_slice(), &[0_i32, 1_i32, 2_i32]);
    }

    #[test]
    fn insert_into_full_vector_grows() {
        let mut vec = SmallVector::<String, 3>::new();
        vec.push("a".into());
        vec.push("b".into());
        vec.push("d".into());
        assert!(vec.is_full());

        let pos = vec.insert(2, "c".into());
        assert_eq!(pos, 2);
        assert_eq!(vec.capacity(), 6);
        assert_eq!(vec, ["a", "b", "c", "d"]);

        let pos = vec.insert(4, "e".into());
        assert_eq!(vec[pos], "e");
    }

    #[test]
    fn erase_preserves_order() {
        let mut vec = SmallVector::<i32, 2>::from([1, 2, 3, 4]);
        assert_eq!(vec.erase(1), 1);
        assert_eq!(vec, [1, 3, 4]);
        assert_eq!(vec.erase(2), 2);
        assert_eq!(vec.len(), 2);
        assert_eq!(vec, [1, 3]);
    }

    #[test]
    fn erase_drops_exactly_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut vec = SmallVector::<DropCounter, 2>::new();
        for _ in 0..4 {
            vec.push(DropCounter(Arc::clone(&counter)));
        }

        vec.erase(1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(vec.len(), 3);

        drop(vec);
        assert_eq!(counter.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn pop_and_clear() {
        let mut vec = SmallVector::<i32, 2>::from([1, 2, 3]);
        assert_eq!(vec.pop(), Some(3));
        assert_eq!(vec.capacity(), 3);
        assert!(!vec.is_inline());

        vec.clear();
        assert!(vec.is_empty());
        assert!(!vec.is_inline());
        assert_eq!(vec.pop(), None);
    }

    #[test]
    fn resize_both_ways() {
        let mut vec = SmallVector::<u8, 4>::new();
        vec.resize_default(2);
        assert_eq!(vec, [0, 0]);
        assert!(vec.is_inline());

        vec.resize(5, 9);
        assert_eq!(vec, [0, 0, 9, 9, 9]);
        assert_eq!(vec.capacity(), 5);

        vec.resize(5, 1);
        assert_eq!(vec, [0, 0, 9, 9, 9]);

        vec.resize(1, 1);
        assert_eq!(vec, [0]);
        assert_eq!(vec.capacity(), 5);
    }

    #[test]
    fn resize_with_panic_restores_length() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut vec = SmallVector::<DropCounter, 2>::new();
        vec.push(DropCounter(Arc::clone(&counter)));

        let mut made = 0;
        let result = catch_unwind(AssertUnwindSafe(|| {
            vec.resize_with(5, || {
                made += 1;
                assert!(made < 3, "boom");
                DropCounter(Arc::clone(&counter))
            });
        }));

        assert!(result.is_err());
        assert_eq!(vec.len(), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failed_growth_leaves_vector_untouched() {
        let alloc = TestAlloc::with_budget(0);
        let mut vec = SmallVector::<i32, 2, TestAlloc>::new_in(alloc);
        vec.push(1);
        vec.push(2);

        let err = vec.try_push(3).unwrap_err();
        assert!(matches!(err, Error::AllocFailed { .. }));
        assert!(vec.is_inline());
        assert_eq!(vec.capacity(), 2);
        assert_eq!(vec, [1, 2]);

        assert!(vec.try_insert(0, 0).is_err());
        assert!(vec.try_reserve(1).is_err());
        assert!(vec.try_resize_with(3, || 0).is_err());
        assert_eq!(vec, [1, 2]);
    }

    #[test]
    fn failed_growth_from_heap() {
        let alloc = TestAlloc::with_budget(1);
        let mut vec = SmallVector::<i32, 1, TestAlloc>::new_in(alloc.clone());
        vec.push(1);
        vec.push(2);
        assert!(!vec.is_inline());

        assert!(vec.try_push(3).is_err());
        assert_eq!(vec.capacity(), 2);
        assert_eq!(vec, [1, 2]);
        assert_eq!(alloc.live(), 1);

        drop(vec);
        assert_eq!(alloc.live(), 0);
    }

    #[test]
    fn capacity_overflow() {
        let mut vec = SmallVector::<u64, 2>::new();
        vec.push(1);
        assert_eq!(vec.try_reserve(usize::MAX), Err(Error::CapacityOverflow));
        assert_eq!(vec.try_grow(usize::MAX), Err(Error::CapacityOverflow));
        assert_eq!(vec, [1]);
    }

    #[test]
    fn clone_is_deep() {
        let alloc = TestAlloc::with_budget(usize::MAX);
        let mut heap = SmallVector::<String, 2, TestAlloc>::new_in(alloc.clone());
        heap.extend(["a", "b", "c"].map(String::from));

        let copy = heap.clone();
        assert_eq!(copy, heap);
        assert_eq!(copy.capacity(), 3);
        assert_ne!(copy.as_ptr(), heap.as_ptr());
        assert_eq!(alloc.live(), 2);

        heap.clear();
        heap.shrink_to_inline();
        let small = heap.clone();
        assert!(small.is_inline());

        drop(heap);
        assert_eq!(copy, ["a", "b", "c"]);
        drop(copy);
        assert_eq!(alloc.live(), 0);
    }

    #[test]
    fn clone_panic_releases_partial_copy() {
        struct Fragile(u8, Arc<AtomicUsize>);

        impl Clone for Fragile {
            fn clone(&self) -> Self {
                assert!(self.0 != 2, "refusing to clone");
                Self(self.0, Arc::clone(&self.1))
            }
        }

        impl Drop for Fragile {
            fn drop(&mut self) {
                self.1.fetch_add(1, Ordering::SeqCst);
            }
        }

        let counter = Arc::new(AtomicUsize::new(0));
        let alloc = TestAlloc::with_budget(usize::MAX);
        let mut vec = SmallVector::<Fragile, 1, TestAlloc>::new_in(alloc.clone());
        for i in 0..4 {
            vec.push(Fragile(i, Arc::clone(&counter)));
        }
        assert_eq!(alloc.live(), 1);

        let result = catch_unwind(AssertUnwindSafe(|| vec.clone()));
        assert!(result.is_err());
        // the two clones made before the panic are gone, and so is their block
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(alloc.live(), 1);
        assert_eq!(vec.len(), 4);
    }

    #[test]
    fn take_leaves_source_empty() {
        let mut heap = SmallVector::<i32, 2>::from([1, 2, 3]);
        let block = heap.as_ptr();
        let moved = mem::take(&mut heap);
        assert_eq!(moved, [1, 2, 3]);
        assert_eq!(moved.as_ptr(), block);
        assert!(heap.is_empty());
        assert!(heap.is_inline());
        assert_eq!(heap.capacity(), 2);

        let mut inline = SmallVector::<i32, 4>::from([4, 5]);
        let moved = mem::take(&mut inline);
        assert_eq!(moved, [4, 5]);
        assert!(moved.is_inline());
        assert!(inline.is_empty());
    }

    #[test]
    fn assignment_drops_previous_contents() {
        let counter = Arc::new(AtomicUsize::new(0));
        let alloc = TestAlloc::with_budget(usize::MAX);

        let mut dst = SmallVector::<DropCounter, 1, TestAlloc>::new_in(alloc.clone());
        dst.push(DropCounter(Arc::clone(&counter)));
        dst.push(DropCounter(Arc::clone(&counter)));
        assert_eq!(alloc.live(), 1);

        let mut src = SmallVector::<DropCounter, 1, TestAlloc>::new_in(alloc.clone());
        src.push(DropCounter(Arc::clone(&counter)));

        dst = src;
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(alloc.live(), 0);
        assert_eq!(dst.len(), 1);
        assert!(dst.is_inline());
    }

    #[test]
    fn emplace_returns_new_element() {
        let mut vec = SmallVector::<Vec<u8>, 1>::new();
        vec.emplace_with(Vec::new).push(1);
        vec.emplace_with(|| Vec::with_capacity(4)).extend([2, 3]);
        assert_eq!(vec.len(), 2);
        assert_eq!(vec[0], [1]);
        assert_eq!(vec[1], [2, 3]);
    }

    #[test]
    fn retain_with_drops() {
        struct Tagged(i32, Arc<AtomicUsize>);
        impl Drop for Tagged {
            fn drop(&mut self) {
                self.1.fetch_add(1, Ordering::SeqCst);
            }
        }

        let counter = Arc::new(AtomicUsize::new(0));
        let mut vec = SmallVector::<Tagged, 2>::new();
        for i in 1..=4 {
            vec.push(Tagged(i, Arc::clone(&counter)));
        }

        vec.retain(|t| (t.0 & 1_i32) == 0);

        assert_eq!(vec.len(), 2);
        assert_eq!(vec[0].0, 2);
        assert_eq!(vec[1].0, 4);
        assert_eq!(counter.load(Ordering::SeqCst), 2);

        drop(vec);
        assert_eq!(counter.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn truncate_drop() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut vec = SmallVector::<DropCounter, 4>::new();
        for _ in 0..3 {
            vec.push(DropCounter(Arc::clone(&counter)));
        }

        vec.truncate(1);
        assert_eq!(counter.load(Ordering::SeqCst), 2);

        vec.clear();
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn main_drop() {
        let counter = Arc::new(AtomicUsize::new(0));
        let alloc = TestAlloc::with_budget(usize::MAX);
        {
            let mut vec = SmallVector::<DropCounter, 2, TestAlloc>::new_in(alloc.clone());
            for _ in 0..5 {
                vec.push(DropCounter(Arc::clone(&counter)));
            }

            // At this point, nothing is dropped yet
            assert_eq!(counter.load(Ordering::SeqCst), 0);
        } // vec goes out of scope here
        assert_eq!(counter.load(Ordering::SeqCst), 5);
        assert_eq!(alloc.live(), 0);
    }

    struct PanicOnDrop {
        panics: bool,
        dropped: Arc<AtomicUsize>,
    }

    impl Drop for PanicOnDrop {
        fn drop(&mut self) {
            self.dropped.fetch_add(1, Ordering::SeqCst);
            assert!(!self.panics, "destructor failed");
        }
    }

    #[test]
    fn drop_releases_block_when_destructor_panics() {
        let dropped = Arc::new(AtomicUsize::new(0));
        let alloc = TestAlloc::with_budget(usize::MAX);
        let mut vec = SmallVector::<PanicOnDrop, 1, TestAlloc>::new_in(alloc.clone());
        for panics in [true, false, false] {
            vec.push(PanicOnDrop {
                panics,
                dropped: Arc::clone(&dropped),
            });
        }
        assert!(!vec.is_inline());
        assert_eq!(alloc.live(), 1);

        let result = catch_unwind(AssertUnwindSafe(move || drop(vec)));
        assert!(result.is_err());
        assert_eq!(dropped.load(Ordering::SeqCst), 3);
        assert_eq!(alloc.live(), 0);
    }

    #[test]
    fn into_iter_releases_block_when_destructor_panics() {
        let dropped = Arc::new(AtomicUsize::new(0));
        let alloc = TestAlloc::with_budget(usize::MAX);
        let mut vec = SmallVector::<PanicOnDrop, 1, TestAlloc>::new_in(alloc.clone());
        for panics in [false, true, false] {
            vec.push(PanicOnDrop {
                panics,
                dropped: Arc::clone(&dropped),
            });
        }

        let mut iter = vec.into_iter();
        drop(iter.next());
        let result = catch_unwind(AssertUnwindSafe(move || drop(iter)));
        assert!(result.is_err());
        assert_eq!(dropped.load(Ordering::SeqCst), 3);
        assert_eq!(alloc.live(), 0);
    }

    #[test]
    fn plain_data_drops_without_destructors() {
        let alloc = TestAlloc::with_budget(usize::MAX);
        let mut vec = SmallVector::<u64, 2, TestAlloc>::new_in(alloc.clone());
        vec.extend(0..6);
        vec.retain(|x| *x % 3 == 0);
        assert_eq!(vec, [0, 3]);

        let mut iter = vec.into_iter();
        assert_eq!(iter.next(), Some(0));
        drop(iter);
        assert_eq!(alloc.live(), 0);
    }

    #[test]
    fn into_iter_partial_drop() {
        let counter = Arc::new(AtomicUsize::new(0));
        let alloc = TestAlloc::with_budget(usize::MAX);
        let mut vec = SmallVector::<DropCounter, 2, TestAlloc>::new_in(alloc.clone());
        for _ in 0..3 {
            vec.push(DropCounter(Arc::clone(&counter)));
        }

        let mut iter = vec.into_iter();
        iter.next();
        iter.next_back();
        assert_eq!(iter.len(), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 2);

        drop(iter);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert_eq!(alloc.live(), 0);
    }

    #[test]
    fn into_iter_yields_in_order() {
        let vec = SmallVector::<i32, 2>::from([1, 2, 3, 4]);
        let mut iter = vec.into_iter();
        assert_eq!(iter.as_slice(), &[1, 2, 3, 4]);
        assert_eq!(iter.next_back(), Some(4));
        assert_eq!(iter.collect::<Vec<_>>(), [1, 2, 3]);
    }

    #[test]
    fn zero_sized_elements() {
        let mut vec = SmallVector::<(), 2>::new();
        for _ in 0..10 {
            vec.push(());
        }
        assert_eq!(vec.len(), 10);
        assert!(!vec.is_inline());
        assert_eq!(vec.capacity(), 16);

        vec.truncate(2);
        vec.shrink_to_inline();
        assert!(vec.is_inline());
        assert_eq!(vec.pop(), Some(()));
    }

    #[test]
    fn zero_inline_capacity() {
        let mut vec = SmallVector::<i32, 0>::new();
        assert_eq!(vec.capacity(), 0);
        assert!(vec.is_full());

        vec.push(1);
        assert_eq!(vec.capacity(), 1);
        vec.push(2);
        assert_eq!(vec.capacity(), 2);
        assert_eq!(vec, [1, 2]);

        vec.clear();
        vec.shrink_to_inline();
        assert!(vec.is_inline());
    }

    #[test]
    fn collect_and_compare() {
        let a: SmallVector<i32, 4> = (1..=6).collect();
        let b = SmallVector::<i32, 8>::from(&[1, 2, 3, 4, 5, 6][..]);
        assert_eq!(a, b);
        assert!(!a.is_inline());
        assert!(b.is_inline());

        let mut c = SmallVector::<i32, 4>::new();
        c.extend(&[1, 2, 3, 4, 5, 7]);
        assert!(a < c);
        assert_eq!(c.capacity(), 6);
        assert_eq!(c.remaining_capacity(), 0);
        c.pop();
        assert_eq!(c.remaining_capacity(), 1);
    }

    #[test]
    fn swap_remove_last() {
        let mut vec = SmallVector::<i32, 2>::from([1, 2, 3]);
        assert_eq!(vec.swap_remove(2), 3);
        assert_eq!(vec, [1, 2]);
        assert_eq!(vec.swap_remove(0), 1);
        assert_eq!(vec, [2]);
    }

    #[cfg(feature = "std")]
    #[test]
    fn io_write_appends() {
        use std::io::Write;

        let mut vec = SmallVector::<u8, 4>::new();
        write!(vec, "hello {}", 42).unwrap();
        assert_eq!(vec.as_slice(), b"hello 42");
    }
}
