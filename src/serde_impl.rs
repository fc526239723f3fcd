use crate::{allocator::Allocator, small_vector::SmallVector};

use core::{fmt, marker::PhantomData};

use serde::{
    de::{Deserialize, Deserializer, Error as _, SeqAccess, Visitor},
    ser::{Serialize, SerializeSeq, Serializer},
};

#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
impl<T, const N: usize, A> Serialize for SmallVector<T, N, A>
where
    T: Serialize,
    A: Allocator,
{
    #[inline]
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_seq(Some(self.len()))?;
        for item in self {
            state.serialize_element(item)?;
        }
        state.end()
    }
}

#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
impl<'de, T, const N: usize, A> Deserialize<'de> for SmallVector<T, N, A>
where
    T: Deserialize<'de>,
    A: Allocator + Default,
{
    #[inline]
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(SmallVectorVisitor {
            marker: PhantomData,
        })
    }
}

struct SmallVectorVisitor<T, const N: usize, A> {
    marker: PhantomData<(T, A)>,
}

impl<'de, T, const N: usize, A> Visitor<'de> for SmallVectorVisitor<T, N, A>
where
    T: Deserialize<'de>,
    A: Allocator + Default,
{
    type Value = SmallVector<T, N, A>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
    where
        S: SeqAccess<'de>,
    {
        let mut values = SmallVector::new_in(A::default());
        // never trust a size hint for more than what fits in a few pages
        let hint = seq.size_hint().unwrap_or(0).min(4096);
        values.try_reserve(hint).map_err(S::Error::custom)?;

        while let Some(value) = seq.next_element()? {
            values.try_push(value).map_err(S::Error::custom)?;
        }

        Ok(values)
    }
}
