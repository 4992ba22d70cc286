use crate::{cipher_sizes, DigestAlgorithm, Error, Result, Round};
use alloc::{string::String, vec, vec::Vec};
use core::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Derives a key and IV the way `openssl enc` does without `-pbkdf2`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyIvDeriver {
    algorithm: DigestAlgorithm,
    key_size: usize,
    iv_size: usize,
}

impl KeyIvDeriver {
    /// Creates a deriver producing `key_size` key bytes and `iv_size` IV bytes.
    ///
    /// Fails with [`Error::InvalidSize`] if the total length overflows.
    pub fn new(algorithm: DigestAlgorithm, key_size: usize, iv_size: usize) -> Result<Self> {
        key_size.checked_add(iv_size).ok_or(Error::InvalidSize)?;
        Ok(Self { algorithm, key_size, iv_size })
    }

    /// Creates a deriver with the key and IV sizes of an `openssl enc` cipher name.
    ///
    /// # Example
    ///
    /// ```
    /// use evpkdf_rs::{DigestAlgorithm, KeyIvDeriver};
    ///
    /// let deriver = KeyIvDeriver::for_cipher(DigestAlgorithm::Md5, "aes-128-cbc").unwrap();
    /// assert_eq!((deriver.key_size(), deriver.iv_size()), (16, 16));
    /// ```
    pub fn for_cipher(algorithm: DigestAlgorithm, cipher: &str) -> Result<Self> {
        let sizes = cipher_sizes(cipher)?;
        Self::new(algorithm, sizes.key_size, sizes.iv_size)
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    pub fn key_size(&self) -> usize {
        self.key_size
    }

    pub fn iv_size(&self) -> usize {
        self.iv_size
    }

    /// Number of digest rounds a derivation runs.
    pub fn rounds(&self) -> usize {
        self.total_size().div_ceil(self.algorithm.output_size())
    }

    fn total_size(&self) -> usize {
        // checked in `new`
        self.key_size + self.iv_size
    }

    /// Derives the key and IV from `password` and `salt`.
    ///
    /// # Example
    ///
    /// ```
    /// use evpkdf_rs::{DigestAlgorithm, KeyIvDeriver};
    ///
    /// let deriver = KeyIvDeriver::new(DigestAlgorithm::Sha256, 32, 16).unwrap();
    /// let salt = hex::decode("A68D6E406A087F05").unwrap();
    /// let key_iv = deriver.derive("MYPASSWORD", &salt);
    /// assert_eq!(key_iv.key_hex(), "0301AFC6D5C48CEB23B1C9C14B985015F13B5F2EA4DC1155C2BE428A85B9B1B3");
    /// assert_eq!(key_iv.iv_hex(), "708D7BAB457FCEE4FAC6EE96EA2866F7");
    /// ```
    pub fn derive<P: AsRef<[u8]>, S: AsRef<[u8]>>(&self, password: P, salt: S) -> KeyIv {
        self.derive_with_trace(password, salt, |_| {})
    }

    /// Same as [`derive`](Self::derive), calling `on_round` after every digest round.
    pub fn derive_with_trace<P, S, F>(&self, password: P, salt: S, mut on_round: F) -> KeyIv
    where
        P: AsRef<[u8]>,
        S: AsRef<[u8]>,
        F: FnMut(&Round<'_>),
    {
        let (password, salt) = (password.as_ref(), salt.as_ref());
        let mut derived = vec![0u8; self.total_size()];
        self.algorithm.evpkdf_with_trace(password, salt, &mut derived, |round| {
            tracing::trace!(
                algorithm = %self.algorithm,
                round = round.index,
                digest = %hex::encode_upper(round.digest),
                "evpkdf round"
            );
            on_round(round);
        });

        let iv = derived.split_off(self.key_size);
        tracing::debug!(
            algorithm = %self.algorithm,
            salt = %hex::encode_upper(salt),
            key_size = self.key_size,
            iv_size = self.iv_size,
            "derived key and iv"
        );
        KeyIv { key: derived, iv }
    }
}

/// Derives a key and IV using the digest named `algorithm`.
///
/// The name is checked before anything is hashed.
///
/// # Example
///
/// ```
/// use evpkdf_rs::{derive, Error};
///
/// let key_iv = derive("md5", "password123", [1u8, 2, 3, 4, 5, 6, 7, 8], 16, 16).unwrap();
/// assert_eq!(key_iv.key_hex(), "31CC9139806998B2AAC366CF401B49DC");
///
/// assert!(matches!(derive("sha1", "password123", b"", 16, 16), Err(Error::UnsupportedAlgorithm(_))));
/// ```
pub fn derive<P: AsRef<[u8]>, S: AsRef<[u8]>>(
    algorithm: &str,
    password: P,
    salt: S,
    key_size: usize,
    iv_size: usize,
) -> Result<KeyIv> {
    let algorithm = DigestAlgorithm::parse(algorithm)?;
    Ok(KeyIvDeriver::new(algorithm, key_size, iv_size)?.derive(password, salt))
}

/// A derived key and IV. Both are zeroed on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct KeyIv {
    key: Vec<u8>,
    iv: Vec<u8>,
}

impl fmt::Debug for KeyIv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyIv")
            .field("key", &self.key_hex())
            .field("iv", &self.iv_hex())
            .finish()
    }
}

impl KeyIv {
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn iv(&self) -> &[u8] {
        &self.iv
    }

    /// Uppercase hex, as printed by `openssl enc -P`.
    pub fn key_hex(&self) -> String {
        hex::encode_upper(&self.key)
    }

    /// Uppercase hex, as printed by `openssl enc -P`.
    pub fn iv_hex(&self) -> String {
        hex::encode_upper(&self.iv)
    }

    /// Returns `(key, iv)`, leaving the zeroing to the caller.
    pub fn into_parts(mut self) -> (Vec<u8>, Vec<u8>) {
        (core::mem::take(&mut self.key), core::mem::take(&mut self.iv))
    }
}
