use crate::{Error, KeyIv, KeyIvDeriver, Result};
use alloc::{string::String, vec::Vec};
use core::{fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const SALT_LEN: usize = 8;

/// Data written by `openssl enc` with a salt: `Salted__`, the 8-byte salt, then the ciphertext.
///
/// The payload is kept as-is; it is never decrypted here.
#[derive(Clone, PartialEq, Eq)]
pub struct SaltedData {
    pub salt: [u8; SALT_LEN],
    pub payload: Vec<u8>,
}

impl Default for SaltedData {
    fn default() -> Self {
        Self { salt: [0u8; Self::SALT_LEN], payload: Vec::default() }
    }
}

impl FromStr for SaltedData {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for SaltedData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.format())
    }
}

impl fmt::Debug for SaltedData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaltedData")
            .field("salt", &hex::encode(self.salt))
            .field("payload", &hex::encode(&self.payload))
            .finish()
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for SaltedData {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "serde")]
impl Serialize for SaltedData {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.format())
    }
}

impl SaltedData {
    /// The length of the magic value.
    pub const MAGIC_LEN: usize = 8;
    /// The magic value that prefixes salted `openssl enc` output.
    pub const MAGIC: &'static [u8; Self::MAGIC_LEN] = b"Salted__";

    /// The salt byte length.
    pub const SALT_LEN: usize = SALT_LEN;

    /// Splits raw `openssl enc` output into salt and payload.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let header_len = Self::MAGIC_LEN + Self::SALT_LEN;
        if data.len() < header_len || &data[..Self::MAGIC_LEN] != Self::MAGIC {
            return Err(Error::InvalidInput)
        }
        let mut salt = [0u8; Self::SALT_LEN];
        salt.copy_from_slice(&data[Self::MAGIC_LEN..header_len]);
        Ok(Self { salt, payload: data[header_len..].to_vec() })
    }

    /// The raw `Salted__` + salt + payload bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(Self::MAGIC_LEN + Self::SALT_LEN + self.payload.len());
        data.extend_from_slice(Self::MAGIC);
        data.extend_from_slice(&self.salt);
        data.extend_from_slice(&self.payload);
        data
    }

    /// Formats the data as `openssl enc -base64` does (without line wrapping).
    ///
    /// # Example
    ///
    /// ```
    /// use evpkdf_rs::SaltedData;
    ///
    /// let data = SaltedData { salt: [0xA6, 0x8D, 0x6E, 0x40, 0x6A, 0x08, 0x7F, 0x05], payload: vec![] };
    /// assert_eq!(data.format(), "U2FsdGVkX1+mjW5Aagh/BQ==");
    /// assert_eq!(data.to_string(), data.format());
    /// ```
    pub fn format(&self) -> String {
        base64::encode(self.to_bytes())
    }

    /// Parses base64 `openssl enc -base64` output. Line breaks are ignored.
    ///
    /// # Example
    ///
    /// ```
    /// use evpkdf_rs::SaltedData;
    ///
    /// let data: SaltedData = "U2FsdGVkX1+mjW5Aagh/BefgpdzQ1eDA7QePtdyFHMM=".parse().unwrap();
    /// assert_eq!(hex::encode_upper(data.salt), "A68D6E406A087F05");
    /// assert_eq!(data.payload.len(), 16);
    /// ```
    pub fn parse<T: AsRef<str>>(s: T) -> Result<Self> {
        let s: String = s.as_ref().chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let data = base64::decode(s)?;
        Self::from_bytes(&data)
    }

    /// Derives the key and IV `openssl enc` used to produce this data.
    pub fn derive_key_iv<P: AsRef<[u8]>>(&self, deriver: &KeyIvDeriver, password: P) -> KeyIv {
        deriver.derive(password, self.salt)
    }
}

/// Parses a hex salt the way `openssl enc -S` does.
///
/// Shorter input is padded with zero bytes, longer input is truncated. An odd trailing digit
/// fills the high nibble of its byte.
///
/// # Example
///
/// ```
/// use evpkdf_rs::salt_from_hex;
///
/// assert_eq!(salt_from_hex("A68D").unwrap(), [0xA6, 0x8D, 0, 0, 0, 0, 0, 0]);
/// ```
pub fn salt_from_hex(s: &str) -> Result<[u8; SALT_LEN]> {
    let bytes = if s.len() % 2 == 1 {
        let mut padded = String::with_capacity(s.len() + 1);
        padded.push_str(s);
        padded.push('0');
        hex::decode(padded)?
    } else {
        hex::decode(s)?
    };
    let mut salt = [0u8; SALT_LEN];
    let len = bytes.len().min(SALT_LEN);
    salt[..len].copy_from_slice(&bytes[..len]);
    Ok(salt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DigestAlgorithm;
    use alloc::{format, string::ToString, vec};

    // `printf hello | openssl enc -aes-256-cbc -S A68D6E406A087F05 -pass pass:MYPASSWORD -md sha256 -base64`
    // with the `Salted__` header OpenSSL writes when it picks the salt itself.
    const HELLO: &str = "U2FsdGVkX1+mjW5Aagh/BefgpdzQ1eDA7QePtdyFHMM=";

    // CryptoJS AES.encrypt() output, which uses the same envelope.
    const CRYPTOJS: &[&str] = &[
        "U2FsdGVkX1/Vk4DBQ4Cb0GymgZDyFN4darXwGEBYh6RC9/G7OYBLDKicvFF/YF7uL3yf2/u/2agxWlttg3MPMUg8rG79VdJIq7H4wGScB8ycSox7lbyYXDTw3xXPznmy",
        "U2FsdGVkX1/BEBUtaxjbbDVVltDi3DJk+7pjS0zKzhMpOcmi0n29rX1LNNfbstJY9x6WruOnUVwLb8uOCHwLybryOjE7UtQaMCQcpKGQ/odNVyRd6L3/OOYxB6HGOK95",
        "U2FsdGVkX18off7Sg/inn12ivzwIRUrRAqEjRH4VIvP7+578jdKG8t0CvguVqDloJYKY4AFGm3UiXB3obfHVqM7Ydf5LsEgpXs2uCa5txEBO8IRSOBiq5yyekIFH/fGo",
    ];

    #[test]
    fn test_default() {
        let value1 = SaltedData::default();
        let s = value1.to_string();
        assert_eq!(s, "U2FsdGVkX18AAAAAAAAAAA==");
        let value2: SaltedData = s.parse().unwrap();
        assert_eq!(value1, value2);
    }

    #[test]
    fn test_parse_format() {
        for s in CRYPTOJS.iter().copied().chain([HELLO]) {
            let parsed: SaltedData = s.parse().unwrap();
            assert_eq!(parsed.to_string(), format!("{parsed}"));
            assert_eq!(parsed.to_string(), s);
            assert_eq!(SaltedData::from_bytes(&parsed.to_bytes()).unwrap(), parsed);
        }
    }

    #[test]
    fn test_parse_wrapped() {
        let wrapped = format!("{}\n{}\n", &HELLO[..20], &HELLO[20..]);
        assert_eq!(SaltedData::parse(wrapped).unwrap(), SaltedData::parse(HELLO).unwrap());
    }

    #[test]
    fn test_invalid() {
        assert_eq!(SaltedData::parse("aGVsbG8gd29ybGQ="), Err(Error::InvalidInput));
        assert_eq!(SaltedData::from_bytes(b"Salted__abc"), Err(Error::InvalidInput));
        assert!(matches!(SaltedData::parse("not base64!"), Err(Error::DecodeError(_))));
    }

    #[test]
    fn test_derive_key_iv() {
        let data: SaltedData = HELLO.parse().unwrap();
        let deriver = KeyIvDeriver::for_cipher(DigestAlgorithm::Sha256, "aes-256-cbc").unwrap();
        let key_iv = data.derive_key_iv(&deriver, "MYPASSWORD");
        assert_eq!(key_iv.key_hex(), "0301AFC6D5C48CEB23B1C9C14B985015F13B5F2EA4DC1155C2BE428A85B9B1B3");
        assert_eq!(key_iv.iv_hex(), "708D7BAB457FCEE4FAC6EE96EA2866F7");
    }

    #[test]
    fn test_salt_from_hex() {
        assert_eq!(salt_from_hex("A68D6E406A087F05").unwrap(), [0xA6, 0x8D, 0x6E, 0x40, 0x6A, 0x08, 0x7F, 0x05]);
        assert_eq!(salt_from_hex("a68d6e406a087f05ffff").unwrap(), [0xA6, 0x8D, 0x6E, 0x40, 0x6A, 0x08, 0x7F, 0x05]);
        assert_eq!(salt_from_hex("").unwrap(), [0u8; 8]);
        assert!(matches!(salt_from_hex("zz"), Err(Error::HexDecodeError(_))));
        assert!(matches!(salt_from_hex("A6z"), Err(Error::HexDecodeError(_))));
    }

    #[test]
    fn test_salt_from_hex_odd_length() {
        // `openssl enc -P -S A68` prints `salt=A680000000000000`
        assert_eq!(salt_from_hex("A68"), Ok([0xA6, 0x80, 0, 0, 0, 0, 0, 0]));
        assert_eq!(salt_from_hex("f"), Ok([0xF0, 0, 0, 0, 0, 0, 0, 0]));
        assert_eq!(salt_from_hex("A68D6E406A087F05F"), Ok([0xA6, 0x8D, 0x6E, 0x40, 0x6A, 0x08, 0x7F, 0x05]));
    }

    #[test]
    fn test_debug() {
        let data = SaltedData { salt: [1; 8], payload: vec![0xff] };
        assert_eq!(format!("{data:?}"), "SaltedData { salt: \"0101010101010101\", payload: \"ff\" }");
    }

    #[test]
    #[cfg(feature = "serde")]
    fn test_serde() {
        use serde::{Deserialize, Serialize};
        #[derive(Debug, Serialize, Deserialize, PartialEq)]
        struct Test {
            value: SaltedData,
        }
        let test = Test { value: HELLO.parse().unwrap() };
        let s = serde_json::to_string(&test).unwrap();
        assert_eq!(s, format!("{{\"value\":\"{HELLO}\"}}"));
        let test2 = serde_json::from_str(&s).unwrap();
        assert_eq!(test, test2);
    }
}
