//! # evpkdf-rs
//!
//! OpenSSL's legacy `EVP_BytesToKey` key and IV derivation in Rust.
//!
//! Produces byte-identical key/IV material to `openssl enc -<cipher> -md <digest>` for the same
//! password and salt.
//!
//! ```
//! let key_iv = evpkdf_rs::derive("sha256", b"MYPASSWORD", &[0xA6u8, 0x8D, 0x6E, 0x40, 0x6A, 0x08, 0x7F, 0x05], 32, 16).unwrap();
//! assert_eq!(key_iv.iv_hex(), "708D7BAB457FCEE4FAC6EE96EA2866F7");
//! ```
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use alloc::string::String;
use base64::DecodeError;
use core::{convert::From, fmt};
use hex::FromHexError;

mod algorithm;
pub use algorithm::DigestAlgorithm;

mod cipher;
pub use cipher::{cipher_sizes, CipherSizes};

mod evpkdf;
pub use evpkdf::{evpkdf, evpkdf_with_trace, Round};

mod key_iv;
pub use key_iv::{derive, KeyIv, KeyIvDeriver};

mod salted;
pub use salted::{salt_from_hex, SaltedData};

pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    UnsupportedAlgorithm(String),
    UnsupportedCipher(String),
    InvalidSize,
    InvalidInput,
    DecodeError(DecodeError),
    HexDecodeError(FromHexError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedAlgorithm(name) => write!(f, "Unsupported digest algorithm: {name}"),
            Self::UnsupportedCipher(name) => write!(f, "Unsupported cipher: {name}"),
            Self::InvalidSize => write!(f, "Invalid key or IV size"),
            Self::InvalidInput => write!(f, "Invalid input"),
            Self::DecodeError(inner) => write!(f, "Failed decoding base64: {inner}"),
            Self::HexDecodeError(inner) => write!(f, "Failed decoding hex: {inner}"),
        }
    }
}

impl From<DecodeError> for Error {
    fn from(value: DecodeError) -> Self {
        Self::DecodeError(value)
    }
}

impl From<FromHexError> for Error {
    fn from(value: FromHexError) -> Self {
        Self::HexDecodeError(value)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
