use crate::errors::CoreError;
use crate::storage::encryption::KdfParams;

/// Snapshot container layout (all integers little-endian):
///
/// ```text
/// [0..4)    magic            b"MTRK"
/// [4..6)    format version   u16 (currently 1)
/// [6..10)   kdf memory cost  u32 (KiB)
/// [10..14)  kdf time cost    u32
/// [14..18)  kdf parallelism  u32
/// [18..34)  salt             16 bytes
/// [34..46)  nonce            12 bytes
/// [46..54)  ciphertext len   u64
/// [54..)    ciphertext       AES-256-GCM output (includes the 16-byte tag)
/// ```
pub const MAGIC: &[u8; 4] = b"MTRK";
pub const FORMAT_VERSION: u16 = 1;
pub const HEADER_LEN: usize = 54;

/// A parsed snapshot container: header fields plus the ciphertext slice.
pub struct Container<'a> {
    pub version: u16,
    pub kdf: KdfParams,
    pub salt: [u8; 16],
    pub nonce: [u8; 12],
    pub ciphertext: &'a [u8],
}

/// Assemble the on-disk container from its parts.
pub fn write_container(
    kdf: &KdfParams,
    salt: &[u8; 16],
    nonce: &[u8; 12],
    ciphertext: &[u8],
) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + ciphertext.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(&kdf.memory_cost.to_le_bytes());
    out.extend_from_slice(&kdf.time_cost.to_le_bytes());
    out.extend_from_slice(&kdf.parallelism.to_le_bytes());
    out.extend_from_slice(salt);
    out.extend_from_slice(nonce);
    out.extend_from_slice(&(ciphertext.len() as u64).to_le_bytes());
    out.extend_from_slice(ciphertext);
    out
}

/// Parse and validate a container. Structural problems (bad magic,
/// truncation, out-of-range KDF params) are `InvalidFileFormat`; an
/// unknown version is reported separately so callers can distinguish
/// "not ours" from "newer than us".
pub fn parse_container(data: &[u8]) -> Result<Container<'_>, CoreError> {
    if data.len() < HEADER_LEN {
        return Err(CoreError::InvalidFileFormat(format!(
            "File too short: {} bytes, header needs {HEADER_LEN}",
            data.len()
        )));
    }
    if &data[0..4] != MAGIC {
        return Err(CoreError::InvalidFileFormat(
            "Missing MTRK magic bytes".into(),
        ));
    }

    let version = u16::from_le_bytes([data[4], data[5]]);
    if version != FORMAT_VERSION {
        return Err(CoreError::UnsupportedVersion(version));
    }

    let kdf = KdfParams {
        memory_cost: u32::from_le_bytes(data[6..10].try_into().unwrap()),
        time_cost: u32::from_le_bytes(data[10..14].try_into().unwrap()),
        parallelism: u32::from_le_bytes(data[14..18].try_into().unwrap()),
    };
    kdf.validate()?;

    let mut salt = [0u8; 16];
    salt.copy_from_slice(&data[18..34]);
    let mut nonce = [0u8; 12];
    nonce.copy_from_slice(&data[34..46]);

    let ciphertext_len = u64::from_le_bytes(data[46..54].try_into().unwrap()) as usize;
    let ciphertext = &data[HEADER_LEN..];
    if ciphertext.len() != ciphertext_len {
        return Err(CoreError::InvalidFileFormat(format!(
            "Ciphertext length mismatch: header says {ciphertext_len}, found {}",
            ciphertext.len()
        )));
    }

    Ok(Container {
        version,
        kdf,
        salt,
        nonce,
        ciphertext,
    })
}
