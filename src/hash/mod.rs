//! Hash primitive adapter.
//!
//! Containers never hash directly; they go through a [`Hasher`], which is
//! either a named algorithm from the supported selector set or an injected
//! digest function. One adapter, one contract:
//!
//! - `digest(bytes) -> Digest` — one-shot digest of a byte slice
//! - `digest_many(parts)` — digest of the parts as if concatenated
//!
//! ### Digest size
//! Digest width is fixed per algorithm but varies across the set (20 bytes
//! for SHA-1 up to 64 for SHA-512/BLAKE2b), so digests are owned byte
//! vectors rather than fixed arrays.
//!
//! ### Injected functions
//! A caller-supplied function must be pure and thread-safe; the
//! `Send + Sync` bound enforces the latter. Multi-part hashing for an
//! injected function concatenates the parts into one buffer first; the
//! named backends stream instead.

use core::fmt;
use std::sync::Arc;

use crate::error::{Result, StructError};

/// An owned digest. Width depends on the hasher that produced it; the
/// empty vector is reserved for the root hash of an empty container.
pub type Digest = Vec<u8>;

/// The supported named algorithms.
///
/// Digest widths follow the conventional defaults (BLAKE2b at 64 bytes,
/// BLAKE2s at 32).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HashAlg {
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Sha3_224,
    Sha3_256,
    Sha3_384,
    Sha3_512,
    Blake2b,
    Blake2s,
    Blake3,
}

/// All selector names, in parse order. Useful for test sweeps.
pub const HASH_NAMES: &[&str] = &[
    "sha1", "sha224", "sha256", "sha384", "sha512", "sha3_224", "sha3_256",
    "sha3_384", "sha3_512", "blake2b", "blake2s", "blake3",
];

impl HashAlg {
    /// Resolve a selector string.
    pub fn parse(name: &str) -> Result<Self> {
        Ok(match name {
            "sha1" => HashAlg::Sha1,
            "sha224" => HashAlg::Sha224,
            "sha256" => HashAlg::Sha256,
            "sha384" => HashAlg::Sha384,
            "sha512" => HashAlg::Sha512,
            "sha3_224" => HashAlg::Sha3_224,
            "sha3_256" => HashAlg::Sha3_256,
            "sha3_384" => HashAlg::Sha3_384,
            "sha3_512" => HashAlg::Sha3_512,
            "blake2b" => HashAlg::Blake2b,
            "blake2s" => HashAlg::Blake2s,
            "blake3" => HashAlg::Blake3,
            other => return Err(StructError::UnsupportedHash(other.to_string())),
        })
    }

    /// Canonical selector name.
    pub fn name(self) -> &'static str {
        match self {
            HashAlg::Sha1 => "sha1",
            HashAlg::Sha224 => "sha224",
            HashAlg::Sha256 => "sha256",
            HashAlg::Sha384 => "sha384",
            HashAlg::Sha512 => "sha512",
            HashAlg::Sha3_224 => "sha3_224",
            HashAlg::Sha3_256 => "sha3_256",
            HashAlg::Sha3_384 => "sha3_384",
            HashAlg::Sha3_512 => "sha3_512",
            HashAlg::Blake2b => "blake2b",
            HashAlg::Blake2s => "blake2s",
            HashAlg::Blake3 => "blake3",
        }
    }

    /// Digest width in bytes.
    pub fn digest_len(self) -> usize {
        match self {
            HashAlg::Sha1 => 20,
            HashAlg::Sha224 | HashAlg::Sha3_224 => 28,
            HashAlg::Sha256 | HashAlg::Sha3_256 | HashAlg::Blake2s | HashAlg::Blake3 => 32,
            HashAlg::Sha384 | HashAlg::Sha3_384 => 48,
            HashAlg::Sha512 | HashAlg::Sha3_512 | HashAlg::Blake2b => 64,
        }
    }
}

type HashFn = dyn Fn(&[u8]) -> Vec<u8> + Send + Sync;

/// The adapter the containers hold: a named backend or an injected
/// function.
#[derive(Clone)]
pub enum Hasher {
    /// A named algorithm from the selector set.
    Named(HashAlg),
    /// A caller-supplied digest function (pure, thread-safe).
    Custom(Arc<HashFn>),
}

impl fmt::Debug for Hasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hasher::Named(alg) => f.debug_tuple("Named").field(&alg.name()).finish(),
            Hasher::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Hasher::Named(HashAlg::Sha256)
    }
}

impl Hasher {
    /// Adapter for a named algorithm. Fails with `UnsupportedHash` for a
    /// name outside the selector set.
    pub fn by_name(name: &str) -> Result<Self> {
        HashAlg::parse(name).map(Hasher::Named)
    }

    /// Adapter around a caller-supplied digest function.
    ///
    /// The function is probed once; a callable that produces no digest
    /// bytes is rejected with `InvalidHashArg`.
    pub fn from_fn<F>(f: F) -> Result<Self>
    where
        F: Fn(&[u8]) -> Vec<u8> + Send + Sync + 'static,
    {
        if f(&[]).is_empty() {
            return Err(StructError::InvalidHashArg);
        }
        Ok(Hasher::Custom(Arc::new(f)))
    }

    /// One-shot digest of a byte slice.
    pub fn digest(&self, data: &[u8]) -> Digest {
        match self {
            Hasher::Named(alg) => named_one_shot(*alg, data),
            Hasher::Custom(f) => f(data),
        }
    }

    /// Digest of several parts, treated as their concatenation.
    pub fn digest_many<'a, I>(&self, parts: I) -> Digest
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        match self {
            Hasher::Named(alg) => named_many(*alg, parts),
            Hasher::Custom(f) => {
                let mut buf = Vec::new();
                for p in parts {
                    buf.extend_from_slice(p);
                }
                f(&buf)
            }
        }
    }
}

/* ------------------------------- Backends ---------------------------------- */

#[inline]
fn one_shot<D: digest::Digest>(data: &[u8]) -> Digest {
    D::digest(data).to_vec()
}

fn many<'a, D: digest::Digest, I>(parts: I) -> Digest
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut h = D::new();
    for p in parts {
        h.update(p);
    }
    h.finalize().to_vec()
}

fn named_one_shot(alg: HashAlg, data: &[u8]) -> Digest {
    match alg {
        HashAlg::Sha1 => one_shot::<sha1::Sha1>(data),
        HashAlg::Sha224 => one_shot::<sha2::Sha224>(data),
        HashAlg::Sha256 => one_shot::<sha2::Sha256>(data),
        HashAlg::Sha384 => one_shot::<sha2::Sha384>(data),
        HashAlg::Sha512 => one_shot::<sha2::Sha512>(data),
        HashAlg::Sha3_224 => one_shot::<sha3::Sha3_224>(data),
        HashAlg::Sha3_256 => one_shot::<sha3::Sha3_256>(data),
        HashAlg::Sha3_384 => one_shot::<sha3::Sha3_384>(data),
        HashAlg::Sha3_512 => one_shot::<sha3::Sha3_512>(data),
        HashAlg::Blake2b => one_shot::<blake2::Blake2b512>(data),
        HashAlg::Blake2s => one_shot::<blake2::Blake2s256>(data),
        HashAlg::Blake3 => blake3::hash(data).as_bytes().to_vec(),
    }
}

fn named_many<'a, I>(alg: HashAlg, parts: I) -> Digest
where
    I: IntoIterator<Item = &'a [u8]>,
{
    match alg {
        HashAlg::Sha1 => many::<sha1::Sha1, I>(parts),
        HashAlg::Sha224 => many::<sha2::Sha224, I>(parts),
        HashAlg::Sha256 => many::<sha2::Sha256, I>(parts),
        HashAlg::Sha384 => many::<sha2::Sha384, I>(parts),
        HashAlg::Sha512 => many::<sha2::Sha512, I>(parts),
        HashAlg::Sha3_224 => many::<sha3::Sha3_224, I>(parts),
        HashAlg::Sha3_256 => many::<sha3::Sha3_256, I>(parts),
        HashAlg::Sha3_384 => many::<sha3::Sha3_384, I>(parts),
        HashAlg::Sha3_512 => many::<sha3::Sha3_512, I>(parts),
        HashAlg::Blake2b => many::<blake2::Blake2b512, I>(parts),
        HashAlg::Blake2s => many::<blake2::Blake2s256, I>(parts),
        HashAlg::Blake3 => {
            let mut h = blake3::Hasher::new();
            for p in parts {
                h.update(p);
            }
            h.finalize().as_bytes().to_vec()
        }
    }
}

/* ---------------------------------- Tests ----------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_covers_selector_set() {
        for name in HASH_NAMES {
            let alg = HashAlg::parse(name).expect("known name");
            assert_eq!(alg.name(), *name);
        }
        assert!(matches!(
            HashAlg::parse("md5"),
            Err(StructError::UnsupportedHash(_))
        ));
    }

    #[test]
    fn digest_widths_match() {
        for name in HASH_NAMES {
            let alg = HashAlg::parse(name).unwrap();
            let h = Hasher::Named(alg);
            assert_eq!(h.digest(b"abc").len(), alg.digest_len(), "{name}");
        }
    }

    #[test]
    fn many_equals_concat() {
        for name in HASH_NAMES {
            let h = Hasher::by_name(name).unwrap();
            let a = h.digest_many([b"ab".as_ref(), b"c"]);
            let b = h.digest(b"abc");
            assert_eq!(a, b, "{name}");
        }
    }

    #[test]
    fn custom_fn_round_trip() {
        let h = Hasher::from_fn(|data| {
            let mut out = vec![data.len() as u8];
            out.extend_from_slice(data);
            out
        })
        .unwrap();
        assert_eq!(h.digest(b"xy"), vec![2, b'x', b'y']);
        assert_eq!(h.digest_many([b"x".as_ref(), b"y"]), vec![2, b'x', b'y']);
    }

    #[test]
    fn empty_custom_fn_rejected() {
        let err = Hasher::from_fn(|_| Vec::new()).unwrap_err();
        assert_eq!(err, StructError::InvalidHashArg);
    }
}
