//! `small_vector`: a vector with small-size optimization
//!
//! Provides [`SmallVector`], a growable vector whose first `N` elements live
//! inline, inside the vector value itself. Pushing past `N` elements relocates
//! everything into a heap block obtained from an [`Allocator`]; the inline
//! buffer is only used again after an explicit
//! [`shrink_to_inline`](SmallVector::shrink_to_inline).
//!
//! # Features
//!
//! - `std`: implements `std::io::Write` for `SmallVector<u8, N, A>`.
//! - `serde`: implements `Serialize` and `Deserialize` as a sequence.
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
#![deny(clippy::undocumented_unsafe_blocks)]
#![deny(clippy::multiple_unsafe_ops_per_block)]
#![deny(clippy::semicolon_if_nothing_returned)]
#![deny(clippy::std_instead_of_core)]
#![deny(clippy::std_instead_of_alloc)]
#![deny(clippy::missing_inline_in_public_items)]
#![deny(clippy::return_self_not_must_use)]
#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;
#[cfg(any(test, feature = "std"))]
extern crate std;

/// Internal module that are not meant for users to use.
mod internal {
    /// Helper macro for creating an uninitialized inline buffer.
    macro_rules! uninit_buffer {
        () => {
            // SAFETY: An array of MaybeUninit does not require initialization
            unsafe { MaybeUninit::uninit().assume_init() }
        };
    }

    /// Helper macro to define unchecked, normal, and try variants of a method.
    macro_rules! define_variants {
    (
        $(#[$meta:meta])*
        fn $name:ident($self:ident : $self_ty:ty $(, $param:ident: $param_ty:ty)*) $(-> $ret:ty)?,
        $(where_clause: { $($where_clause:tt)* } )?

        normal_brief: $normal_brief:literal,
        try_brief: $try_brief:literal,
        unchecked_brief_suffix: $unchecked_brief_suffix:literal,
        ub_conditions: {
            $($ub_condition:expr => $error:literal),+ $(,)?
        },
        prefixes: {
            normal: {$($normal_prefix:tt)*},
            unchecked: {$($unchecked_prefix:tt)*},
            try: {$($try_prefix:tt)*},
        },
        unchecked_fn: $unchecked_fn:ident,
        try_fn: $try_fn:ident,
        body:  $body:tt,
        $(examples: {
            normal: { $($ex_normal:tt)* }
            try: { $($ex_try:tt)* }
        })?
    ) => {
        $(#[$meta])*
        #[doc = concat!(" ", $normal_brief, ", ", $unchecked_brief_suffix, ".")]
        ///
        #[doc = concat!(" See also [`Self::", stringify!($name), "`] for the safe version and [`Self::", stringify!($try_fn), "`] for the [`Option`] returning version.")]
        ///
        /// # Safety
        ///
        /// Calling this function when any of the following conditions are **`true`** is **undefined behavior**:
        $( #[doc = concat!(" - `", stringify!($ub_condition), "`")] )+
        #[inline]
        $($unchecked_prefix)* unsafe fn $unchecked_fn($self: $self_ty $(, $param: $param_ty)*) $(-> $ret)?
        $(where $($where_clause)*)?
        {
            $( debug_assert!(!($ub_condition), $error); )+
            $body
        }

        $(#[$meta])*
        #[doc = concat!(" ", $normal_brief, ".")]
        ///
        #[doc = concat!(" See also [`Self::", stringify!($unchecked_fn), "`] for the unchecked version and [`Self::", stringify!($try_fn), "`] for the [`Option`] returning version.")]
        ///
        /// # Panics
        ///
        $( #[doc = concat!(" - \"", $error, "\" if `", stringify!($ub_condition), "`")] )+
        $(
            ///
            /// # Examples
            ///
            $($ex_normal)*
        )?
        #[inline]
        $($normal_prefix)* fn $name($self: $self_ty $(, $param: $param_ty)*) $(-> $ret)?
        $(where $($where_clause)*)?
        {
            $( assert!(!($ub_condition), $error); )+
            // SAFETY: passed all undefined behaviour conditions above
            unsafe { $self.$unchecked_fn($($param),*) }
        }

        $(#[$meta])*
        #[doc = concat!(" ", $try_brief, ".")]
        ///
        #[doc = concat!(" See also [`Self::", stringify!($name), "`] for the panic-on-error version and [`Self::", stringify!($unchecked_fn), "`] for the unchecked version.")]
        ///
        /// Returns [`None`] if any of these conditions are **`false`**:
        $( #[doc = concat!(" - `", stringify!($ub_condition), "`")] )+
        $(
            ///
            /// # Examples
            ///
            $($ex_try)*
        )?
        #[must_use]
        #[inline]
        $($try_prefix)* fn $try_fn($self: $self_ty $(, $param: $param_ty)*) $(-> Option<$ret>)?
        $(where $($where_clause)*)?
        {
            $( if $ub_condition { return None; } )+
            // SAFETY: passed all undefined behaviour conditions above
            let result = unsafe { $self.$unchecked_fn($($param),*) };
            Some(result)
        }
    };
}

    pub(crate) use define_variants;
    pub(crate) use uninit_buffer;
}

/// Allocation strategies for heap blocks.
pub mod allocator;

mod error;
mod raw;

#[cfg(feature = "serde")]
mod serde_impl;

/// A vector that stores up to `N` elements inline before spilling to the heap.
pub mod small_vector;

pub use crate::allocator::{AllocError, Allocator, Global};
pub use crate::error::Error;
pub use crate::small_vector::SmallVector;
