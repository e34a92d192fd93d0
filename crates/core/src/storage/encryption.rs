use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::errors::CoreError;

/// Argon2id parameters for key derivation.
/// Stored in the snapshot header so they can be raised in future versions
/// without breaking old files.
#[derive(Debug, Clone, Copy)]
pub struct KdfParams {
    /// Memory cost in KiB (default: 65536 = 64 MB)
    pub memory_cost: u32,
    /// Number of iterations (default: 3)
    pub time_cost: u32,
    /// Degree of parallelism (default: 4)
    pub parallelism: u32,
}

impl KdfParams {
    /// Upper bounds accepted from a snapshot header. A corrupted or
    /// malicious header must not make us allocate gigabytes or spin
    /// through an absurd iteration count.
    pub const MAX_MEMORY_COST: u32 = 1_048_576; // 1 GB in KiB
    pub const MAX_TIME_COST: u32 = 100;
    pub const MAX_PARALLELISM: u32 = 64;

    /// Range-check the parameters before they reach the KDF.
    pub fn validate(&self) -> Result<(), CoreError> {
        let in_range = (1..=Self::MAX_MEMORY_COST).contains(&self.memory_cost)
            && (1..=Self::MAX_TIME_COST).contains(&self.time_cost)
            && (1..=Self::MAX_PARALLELISM).contains(&self.parallelism);
        if in_range {
            Ok(())
        } else {
            Err(CoreError::InvalidFileFormat(format!(
                "KDF parameters out of range: m={} t={} p={}",
                self.memory_cost, self.time_cost, self.parallelism
            )))
        }
    }

    /// Derive a 256-bit AES key from a password with Argon2id under these
    /// parameters. The salt must be random and unique per snapshot write.
    pub fn derive_key(&self, password: &str, salt: &[u8; 16]) -> Result<[u8; 32], CoreError> {
        self.validate()?;
        let params = Params::new(self.memory_cost, self.time_cost, self.parallelism, Some(32))
            .map_err(|e| CoreError::Encryption(format!("Invalid Argon2 params: {e}")))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut key = [0u8; 32];
        argon2
            .hash_password_into(password.as_bytes(), salt, &mut key)
            .map_err(|e| CoreError::Encryption(format!("Argon2 key derivation failed: {e}")))?;
        Ok(key)
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_cost: 65_536,
            time_cost: 3,
            parallelism: 4,
        }
    }
}

/// Encrypt plaintext with AES-256-GCM. The returned ciphertext carries the
/// 16-byte authentication tag, so integrity is covered without a separate MAC.
pub fn encrypt(plaintext: &[u8], key: &[u8; 32], nonce: &[u8; 12]) -> Result<Vec<u8>, CoreError> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| CoreError::Encryption(format!("Failed to create cipher: {e}")))?;
    cipher
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|e| CoreError::Encryption(format!("Encryption failed: {e}")))
}

/// Decrypt AES-256-GCM ciphertext. Tag verification is automatic;
/// a wrong password or tampered data surfaces as `CoreError::Decryption`.
pub fn decrypt(ciphertext: &[u8], key: &[u8; 32], nonce: &[u8; 12]) -> Result<Vec<u8>, CoreError> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| CoreError::Encryption(format!("Failed to create cipher: {e}")))?;
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CoreError::Decryption)
}

/// Fresh random salt for key derivation.
pub fn generate_salt() -> Result<[u8; 16], CoreError> {
    let mut salt = [0u8; 16];
    getrandom::getrandom(&mut salt)
        .map_err(|e| CoreError::Encryption(format!("Failed to generate random salt: {e}")))?;
    Ok(salt)
}

/// Fresh random nonce for AES-GCM.
pub fn generate_nonce() -> Result<[u8; 12], CoreError> {
    let mut nonce = [0u8; 12];
    getrandom::getrandom(&mut nonce)
        .map_err(|e| CoreError::Encryption(format!("Failed to generate random nonce: {e}")))?;
    Ok(nonce)
}
