use fixed_hash::construct_fixed_hash;
use impl_serde::impl_fixed_hash_serde;

pub use ethereum_types::H256;

pub type CommitteeIndex = u64;
pub type Epoch = u64;
pub type Slot = u64;
pub type ValidatorIndex = u64;

// Signatures are opaque to everything in this workspace.
// They are never decompressed, only compared and carried along.
construct_fixed_hash! {
    pub struct SignatureBytes(96);
}

impl_fixed_hash_serde!(SignatureBytes, 96);

pub type AggregateSignatureBytes = SignatureBytes;

impl SignatureBytes {
    /// The compressed point at infinity.
    #[must_use]
    pub fn empty() -> Self {
        let mut bytes = Self::zero();
        bytes.as_mut()[0] = 0xc0;
        bytes
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Self::empty()
    }
}
