//! Collections used in attestations and `BeaconState`.

use core::{
    fmt::{Debug, Formatter, Result as FmtResult},
    marker::PhantomData,
    ops::BitOrAssign,
};

use bitvec::{bitbox, boxed::BitBox, vec::BitVec};
use derivative::Derivative;
use derive_more::{Deref, DerefMut};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use typenum::Unsigned;

const BITS_PER_BYTE: usize = 8;

#[derive(PartialEq, Debug, Error)]
pub enum ReadError {
    #[error("bit list has no bytes")]
    BitListEmptySlice,
    #[error("bit list has no delimiting bit")]
    BitListNoDelimitingBit,
    #[error("bit list is too long (maximum: {maximum}, actual: {actual})")]
    BitListTooLong { maximum: usize, actual: usize },
    #[error("bit list is not valid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

/// A list of at most `N` bits, one per committee member.
///
/// Lists of different lengths never compare equal, but [`BitList::has_same_bits_as`] treats
/// positions past the end of the shorter list as unset.
#[derive(Deref, DerefMut, Derivative)]
#[derivative(
    Clone(bound = ""),
    PartialEq(bound = ""),
    Eq(bound = ""),
    PartialOrd(bound = ""),
    Ord(bound = ""),
    Hash(bound = ""),
    Default(bound = "")
)]
pub struct BitList<N> {
    // We rely on `bitvec::order::Lsb0` being the default bit ordering for the byte form.
    #[deref]
    #[deref_mut]
    bits: BitBox<u8>,
    #[derivative(
        PartialEq = "ignore",
        PartialOrd = "ignore",
        Ord = "ignore",
        Hash = "ignore"
    )]
    phantom: PhantomData<N>,
}

impl<N> From<BitList<N>> for Vec<u8> {
    fn from(bit_list: BitList<N>) -> Self {
        let length = bit_list.len();
        let mut bytes = bit_list.bits.into_bitvec().into_vec();
        bytes.resize(bytes_with_delimiting_bit(length), 0);
        bytes[length / BITS_PER_BYTE] |= 1 << (length % BITS_PER_BYTE);
        bytes
    }
}

impl<N: Unsigned> TryFrom<Vec<u8>> for BitList<N> {
    type Error = ReadError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        let length = Self::measure_length(bytes.as_slice())?;
        Ok(Self::from_vec_with_length(bytes, length))
    }
}

// Lists shorter than `self` are padded with unset bits.
// This is what lets committee-sized lists be folded into a list of maximum length.
impl<N> BitOrAssign<&Self> for BitList<N> {
    fn bitor_assign(&mut self, other: &Self) {
        assert!(self.len() >= other.len());

        for index in other.iter_ones() {
            self.bits.set(index, true);
        }
    }
}

// This sort of code arguably belongs in an impl of `core::fmt::Binary` rather than `Debug`,
// but we don't ever format bit lists directly and we need a `Debug` impl anyway.
impl<N> Debug for BitList<N> {
    fn fmt(&self, formatter: &mut Formatter) -> FmtResult {
        formatter.write_str("0b")?;

        for bit in self.iter().by_vals() {
            formatter.write_str(if bit { "1" } else { "0" })?;
        }

        Ok(())
    }
}

// `BitBox` serializes itself as a struct with multiple fields.
impl<N> Serialize for BitList<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let bytes = Vec::from(self.clone());
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }
}

impl<'de, N: Unsigned> Deserialize<'de> for BitList<N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let string = String::deserialize(deserializer)?;
        let digits = string.strip_prefix("0x").unwrap_or(&string);

        hex::decode(digits)
            .map_err(ReadError::from)
            .and_then(Self::try_from)
            .map_err(D::Error::custom)
    }
}

impl<N> BitList<N> {
    #[must_use]
    pub fn with_length(length: usize) -> Self
    where
        N: Unsigned,
    {
        Self::new(false, length)
    }

    #[must_use]
    pub fn new(value: bool, length: usize) -> Self
    where
        N: Unsigned,
    {
        assert!(length <= N::USIZE);

        Self::from_bit_box(bitbox![_, _; u8::from(value); length])
    }

    pub fn from_bits(bits: impl IntoIterator<Item = bool>) -> Result<Self, ReadError>
    where
        N: Unsigned,
    {
        let bits = bits.into_iter().collect::<BitVec<u8>>();

        let maximum = N::USIZE;
        let actual = bits.len();

        if actual > maximum {
            return Err(ReadError::BitListTooLong { maximum, actual });
        }

        Ok(Self::from_bit_box(bits.into_boxed_bitslice()))
    }

    /// Returns `true` if the bitwise XOR of `self` and `other` has no bits set.
    #[must_use]
    pub fn has_same_bits_as(&self, other: &Self) -> bool {
        self.iter_ones().eq(other.iter_ones())
    }

    fn measure_length(bytes: &[u8]) -> Result<usize, ReadError>
    where
        N: Unsigned,
    {
        let leading_zeros_in_last_byte = bytes
            .last()
            .ok_or(ReadError::BitListEmptySlice)?
            .leading_zeros() as usize;

        let data_bits_in_last_byte = (BITS_PER_BYTE - 1)
            .checked_sub(leading_zeros_in_last_byte)
            .ok_or(ReadError::BitListNoDelimitingBit)?;

        let maximum = N::USIZE;
        let actual = (bytes.len() - 1) * BITS_PER_BYTE + data_bits_in_last_byte;

        if actual > maximum {
            return Err(ReadError::BitListTooLong { maximum, actual });
        }

        Ok(actual)
    }

    fn from_vec_with_length(bytes: Vec<u8>, length: usize) -> Self {
        let mut bits = BitVec::from_vec(bytes);
        bits.truncate(length);
        Self::from_bit_box(bits.into_boxed_bitslice())
    }

    fn from_bit_box(mut bits: BitBox<u8>) -> Self {
        bits.fill_uninitialized(false);

        Self {
            bits,
            phantom: PhantomData,
        }
    }
}

const fn bytes_with_delimiting_bit(length: usize) -> usize {
    length.saturating_add(1).div_ceil(BITS_PER_BYTE)
}
