use crate::{Error, Result};

/// Key and IV lengths, in bytes, of a cipher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CipherSizes {
    pub key_size: usize,
    pub iv_size: usize,
}

impl CipherSizes {
    pub const fn new(key_size: usize, iv_size: usize) -> Self {
        Self { key_size, iv_size }
    }
}

const IV_MODES: [&str; 6] = ["cbc", "cfb", "cfb1", "cfb8", "ofb", "ctr"];

/// Looks up the key and IV lengths `openssl enc` uses for `name`.
///
/// Only the sizes are known here, nothing is ever encrypted.
///
/// Supported names:
/// - `aes-{128,192,256}-<mode>` and `camellia-{128,192,256}-<mode>` with mode `ecb` (no IV) or
///   `cbc`, `cfb`, `cfb1`, `cfb8`, `ofb`, `ctr` (16-byte IV); `aes128`, `aes192`, `aes256` for CBC
/// - `des-cbc`/`des`, `des-ede3-cbc`/`des3`, `des-ede3` (ECB)
/// - `chacha20`
///
/// # Example
///
/// ```
/// use evpkdf_rs::{cipher_sizes, CipherSizes};
///
/// assert_eq!(cipher_sizes("aes-256-cbc").unwrap(), CipherSizes::new(32, 16));
/// assert_eq!(cipher_sizes("DES-EDE3-CBC").unwrap(), CipherSizes::new(24, 8));
/// ```
pub fn cipher_sizes(name: &str) -> Result<CipherSizes> {
    let lower = name.to_ascii_lowercase();
    let mut parts = lower.splitn(3, '-');
    let sizes = match (parts.next(), parts.next(), parts.next()) {
        (Some("aes" | "camellia"), Some(bits), Some(mode)) => block_cipher(bits, mode),
        (Some(alias), None, None) if alias.starts_with("aes") => block_cipher(&alias[3..], "cbc"),
        (Some("des"), Some("ede3"), Some("cbc")) | (Some("des3"), None, None) => {
            Some(CipherSizes::new(24, 8))
        }
        (Some("des"), Some("ede3"), None) => Some(CipherSizes::new(24, 0)),
        (Some("des"), Some("cbc"), None) | (Some("des"), None, None) => Some(CipherSizes::new(8, 8)),
        (Some("chacha20"), None, None) => Some(CipherSizes::new(32, 16)),
        _ => None,
    };
    sizes.ok_or_else(|| Error::UnsupportedCipher(name.into()))
}

fn block_cipher(bits: &str, mode: &str) -> Option<CipherSizes> {
    let key_size = match bits {
        "128" => 16,
        "192" => 24,
        "256" => 32,
        _ => return None,
    };
    let iv_size = match mode {
        "ecb" => 0,
        m if IV_MODES.contains(&m) => 16,
        _ => return None,
    };
    Some(CipherSizes::new(key_size, iv_size))
}
