use alloc::vec::Vec;
use md5::digest::{Digest, FixedOutputReset, HashMarker};
use zeroize::Zeroize;

/// A single round of [`evpkdf_with_trace`].
///
/// The bytes hashed in this round are `previous || password || salt`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Round<'a> {
    /// Zero-based round number.
    pub index: usize,
    /// The previous round's digest. Empty on the first round.
    pub previous: &'a [u8],
    /// This round's digest.
    pub digest: &'a [u8],
    /// Total number of bytes derived after this round.
    pub accumulated: usize,
}

/// The [OpenSSL EVP_BytesToKey key derivation function](https://www.openssl.org/docs/man3.0/man3/EVP_BytesToKey.html)
/// with an iteration count of 1, as used by `openssl enc` without `-pbkdf2`.
///
/// Fills `output` with `D_1 || D_2 || ...`, where `D_1 = H(password || salt)` and
/// `D_i = H(D_{i-1} || password || salt)`.
///
/// # Example
///
/// ```
/// use evpkdf_rs::evpkdf;
/// use sha2::Sha256;
///
/// let salt = [0xA6u8, 0x8D, 0x6E, 0x40, 0x6A, 0x08, 0x7F, 0x05];
/// let mut key_iv = [0u8; 48];
/// evpkdf::<Sha256>(b"MYPASSWORD", &salt, &mut key_iv);
/// assert_eq!(hex::encode_upper(&key_iv[32..]), "708D7BAB457FCEE4FAC6EE96EA2866F7");
/// ```
pub fn evpkdf<D>(password: &[u8], salt: &[u8], output: &mut [u8])
where
    D: Default + FixedOutputReset + HashMarker,
{
    evpkdf_with_trace::<D, _>(password, salt, output, |_| {});
}

/// Same as [`evpkdf`], calling `on_round` after every digest round.
///
/// The callback only observes the derivation; it cannot change the output.
pub fn evpkdf_with_trace<D, F>(password: &[u8], salt: &[u8], output: &mut [u8], mut on_round: F)
where
    D: Default + FixedOutputReset + HashMarker,
    F: FnMut(&Round<'_>),
{
    let mut hasher = D::default();
    let mut derived_key = Vec::with_capacity(output.len() + <D as Digest>::output_size());
    let mut previous = Vec::new();
    let mut index = 0;

    while derived_key.len() < output.len() {
        if !previous.is_empty() {
            hasher.update(&previous);
        }
        hasher.update(password);
        hasher.update(salt);
        let block = hasher.finalize_reset().to_vec();

        derived_key.extend_from_slice(&block);
        on_round(&Round {
            index,
            previous: &previous,
            digest: &block,
            accumulated: derived_key.len(),
        });

        previous.zeroize();
        previous = block;
        index += 1;
    }

    output.copy_from_slice(&derived_key[..output.len()]);
    derived_key.zeroize();
    previous.zeroize();
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use md5::Md5;
    use sha2::{Sha256, Sha512};

    const PASSWORD: &[u8] = b"MYPASSWORD";
    const SALT: [u8; 8] = [0xA6, 0x8D, 0x6E, 0x40, 0x6A, 0x08, 0x7F, 0x05];

    #[test]
    fn test_openssl_sha256() {
        let mut out = [0u8; 48];
        evpkdf::<Sha256>(PASSWORD, &SALT, &mut out);
        assert_eq!(
            hex::encode_upper(out),
            "0301AFC6D5C48CEB23B1C9C14B985015F13B5F2EA4DC1155C2BE428A85B9B1B3\
             708D7BAB457FCEE4FAC6EE96EA2866F7"
        );
    }

    #[test]
    fn test_first_round_is_plain_digest() {
        let mut out = [0u8; 16];
        evpkdf::<Md5>(PASSWORD, &SALT, &mut out);

        let mut input = PASSWORD.to_vec();
        input.extend_from_slice(&SALT);
        assert_eq!(out[..], Md5::digest(&input)[..]);
    }

    #[test]
    fn test_md5_seeded_with_prehash() {
        // Starting from H(password || salt) and chaining is the same as starting empty.
        let mut input = PASSWORD.to_vec();
        input.extend_from_slice(&SALT);
        let mut block = Md5::digest(&input).to_vec();
        let mut expected = block.clone();
        while expected.len() < 48 {
            let mut input = block.clone();
            input.extend_from_slice(PASSWORD);
            input.extend_from_slice(&SALT);
            block = Md5::digest(&input).to_vec();
            expected.extend_from_slice(&block);
        }

        let mut out = [0u8; 48];
        evpkdf::<Md5>(PASSWORD, &SALT, &mut out);
        assert_eq!(out[..], expected[..48]);
    }

    #[test]
    fn test_trace() {
        let mut rounds = vec![];
        let mut out = [0u8; 48];
        evpkdf_with_trace::<Md5, _>(PASSWORD, &SALT, &mut out, |round| {
            rounds.push((round.index, round.previous.to_vec(), round.digest.to_vec(), round.accumulated));
        });

        assert_eq!(rounds.len(), 3);
        assert!(rounds[0].1.is_empty());
        for (i, (index, previous, digest, accumulated)) in rounds.iter().enumerate() {
            assert_eq!(*index, i);
            assert_eq!(digest.len(), 16);
            assert_eq!(*accumulated, 16 * (i + 1));
            assert_eq!(&out[i * 16..(i + 1) * 16], &digest[..]);
            if i > 0 {
                assert_eq!(previous, &rounds[i - 1].2);
            }
        }
    }

    #[test]
    fn test_empty_output() {
        let mut called = false;
        let mut out = [0u8; 0];
        evpkdf_with_trace::<Sha512, _>(PASSWORD, &SALT, &mut out, |_| called = true);
        assert!(!called);
    }

    #[test]
    fn test_prefix_stable() {
        let mut short = [0u8; 20];
        let mut long = [0u8; 100];
        evpkdf::<Sha256>(PASSWORD, &SALT, &mut short);
        evpkdf::<Sha256>(PASSWORD, &SALT, &mut long);
        assert_eq!(short[..], long[..20]);
    }
}
