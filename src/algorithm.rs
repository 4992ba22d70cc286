use crate::{evpkdf::evpkdf_with_trace, Error, Result, Round};
use alloc::{string::String, vec::Vec};
use core::{fmt, str::FromStr};
use md5::{digest::Digest, Md5};
use sha2::{Sha224, Sha256, Sha384, Sha512};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A digest usable with `openssl enc -md`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    Md5,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl DigestAlgorithm {
    pub const ALL: [Self; 5] = [Self::Md5, Self::Sha224, Self::Sha256, Self::Sha384, Self::Sha512];

    /// Digest output size in bytes.
    pub const fn output_size(self) -> usize {
        match self {
            Self::Md5 => 16,
            Self::Sha224 => 28,
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    /// The canonical lowercase name, as accepted by `openssl enc -md`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha224 => "sha224",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }

    /// Hashes `data` in one shot.
    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Md5 => Md5::digest(data).to_vec(),
            Self::Sha224 => Sha224::digest(data).to_vec(),
            Self::Sha256 => Sha256::digest(data).to_vec(),
            Self::Sha384 => Sha384::digest(data).to_vec(),
            Self::Sha512 => Sha512::digest(data).to_vec(),
        }
    }

    /// Parses an algorithm name.
    ///
    /// Case-insensitive; `-` and `_` separators and the `sha2-` prefix are accepted, so
    /// `sha256`, `SHA-256` and `SHA2-256` all name the same digest.
    ///
    /// # Example
    ///
    /// ```
    /// use evpkdf_rs::DigestAlgorithm;
    ///
    /// assert_eq!(DigestAlgorithm::parse("SHA2-256").unwrap(), DigestAlgorithm::Sha256);
    /// assert!(DigestAlgorithm::parse("whirlpool").is_err());
    /// ```
    pub fn parse<T: AsRef<str>>(s: T) -> Result<Self> {
        let s = s.as_ref();
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_'))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let normalized = match normalized.strip_prefix("sha2") {
            Some(rest) if rest.len() == 3 => rest,
            _ => normalized.strip_prefix("sha").unwrap_or(&normalized),
        };
        match normalized {
            "md5" => Ok(Self::Md5),
            "224" => Ok(Self::Sha224),
            "256" => Ok(Self::Sha256),
            "384" => Ok(Self::Sha384),
            "512" => Ok(Self::Sha512),
            _ => Err(Error::UnsupportedAlgorithm(s.into())),
        }
    }

    pub(crate) fn evpkdf_with_trace<F>(self, password: &[u8], salt: &[u8], output: &mut [u8], on_round: F)
    where
        F: FnMut(&Round<'_>),
    {
        match self {
            Self::Md5 => evpkdf_with_trace::<Md5, F>(password, salt, output, on_round),
            Self::Sha224 => evpkdf_with_trace::<Sha224, F>(password, salt, output, on_round),
            Self::Sha256 => evpkdf_with_trace::<Sha256, F>(password, salt, output, on_round),
            Self::Sha384 => evpkdf_with_trace::<Sha384, F>(password, salt, output, on_round),
            Self::Sha512 => evpkdf_with_trace::<Sha512, F>(password, salt, output, on_round),
        }
    }
}

impl FromStr for DigestAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for DigestAlgorithm {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "serde")]
impl Serialize for DigestAlgorithm {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.name())
    }
}
