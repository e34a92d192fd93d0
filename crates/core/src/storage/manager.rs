use serde::{de::DeserializeOwned, Serialize};

use crate::errors::CoreError;
use crate::storage::encryption::{self, KdfParams};
use crate::storage::format;

/// Serializes any serde state into the encrypted snapshot container and
/// back. Works on byte buffers so the same code path serves native file
/// I/O and web/download flows; file helpers are native-only.
pub struct StorageManager {
    kdf: KdfParams,
}

impl StorageManager {
    pub fn new() -> Self {
        Self {
            kdf: KdfParams::default(),
        }
    }

    /// Encrypt `state` into a complete snapshot container.
    /// Salt and nonce are freshly generated on every call.
    pub fn save_to_bytes<T: Serialize>(
        &self,
        state: &T,
        password: &str,
    ) -> Result<Vec<u8>, CoreError> {
        let plaintext = bincode::serialize(state)?;

        let salt = encryption::generate_salt()?;
        let nonce = encryption::generate_nonce()?;
        let key = self.kdf.derive_key(password, &salt)?;
        let ciphertext = encryption::encrypt(&plaintext, &key, &nonce)?;

        Ok(format::write_container(&self.kdf, &salt, &nonce, &ciphertext))
    }

    /// Decrypt a snapshot container back into state. KDF parameters come
    /// from the header, not from this manager, so snapshots written under
    /// older defaults still open.
    pub fn load_from_bytes<T: DeserializeOwned>(
        &self,
        data: &[u8],
        password: &str,
    ) -> Result<T, CoreError> {
        let container = format::parse_container(data)?;
        let key = container.kdf.derive_key(password, &container.salt)?;
        let plaintext = encryption::decrypt(container.ciphertext, &key, &container.nonce)?;
        Ok(bincode::deserialize(&plaintext)?)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_file<T: Serialize>(
        &self,
        state: &T,
        password: &str,
        path: impl AsRef<std::path::Path>,
    ) -> Result<(), CoreError> {
        let bytes = self.save_to_bytes(state, password)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_file<T: DeserializeOwned>(
        &self,
        path: impl AsRef<std::path::Path>,
        password: &str,
    ) -> Result<T, CoreError> {
        let bytes = std::fs::read(path)?;
        self.load_from_bytes(&bytes, password)
    }
}

impl Default for StorageManager {
    fn default() -> Self {
        Self::new()
    }
}
