//! Key hashing for `ChainedHashTable`.
//!
//! A table digests each key once, on insertion, into a 32-bit value and
//! selects a chain with `digest % bucket_count`. Hashers are plain values
//! implementing [`KeyHasher`] for every key form they can see: the owned
//! key on insertion and any borrowed form on lookup. Both forms must
//! produce the same digest.

/// Digest function over keys of type `Q`.
pub trait KeyHasher<Q: ?Sized> {
    fn hash_key(&self, key: &Q) -> u32;
}

/// Starting value of the djb2 accumulator.
pub const DJB2_SEED: i32 = 5381;

/// Bernstein's multiplicative string hash: `h = h * 33 + byte`.
///
/// The accumulator is a 32-bit signed integer that wraps on overflow and
/// is reinterpreted as unsigned at the end, so digests match the classic
/// C formulation bit for bit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Djb2;

/// djb2 digest of a byte string.
#[inline]
pub fn djb2(bytes: &[u8]) -> u32 {
    let h = bytes.iter().fold(DJB2_SEED, |h, &b| {
        h.wrapping_shl(5).wrapping_add(h).wrapping_add(i32::from(b))
    });
    h as u32
}

impl<Q> KeyHasher<Q> for Djb2
where
    Q: ?Sized + AsRef<[u8]>,
{
    #[inline]
    fn hash_key(&self, key: &Q) -> u32 {
        djb2(key.as_ref())
    }
}
