//! Password encryption bound to the machine identity
//!
//! Credentials stored in the configuration (the DJ source password shown on
//! the dashboard connect card) are encrypted with a key derived from the
//! machine id. The config file stays readable but is not portable to
//! another box.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use anyhow::{anyhow, Result};
use base64::Engine;
use sha2::{Digest, Sha256};

/// Prefix marking encrypted values in the config file
const ENCRYPTED_PREFIX: &str = "encrypted:";

/// Reads the machine identifier
///
/// On Linux this is `/etc/machine-id`, with `/var/lib/dbus/machine-id` as a
/// fallback. On macOS the platform UUID from `ioreg` is used.
fn get_machine_uuid() -> Result<String> {
    #[cfg(target_os = "linux")]
    {
        use std::fs;

        if let Ok(uuid) = fs::read_to_string("/etc/machine-id") {
            return Ok(uuid.trim().to_string());
        }

        if let Ok(uuid) = fs::read_to_string("/var/lib/dbus/machine-id") {
            return Ok(uuid.trim().to_string());
        }

        Err(anyhow!("Failed to read machine-id"))
    }

    #[cfg(target_os = "macos")]
    {
        use std::process::Command;

        let output = Command::new("ioreg")
            .args(["-d2", "-c", "IOPlatformExpertDevice"])
            .output()?;

        let output_str = String::from_utf8_lossy(&output.stdout);

        for line in output_str.lines() {
            if line.contains("IOPlatformUUID") {
                if let Some(uuid) = line.split('"').nth(3) {
                    return Ok(uuid.to_string());
                }
            }
        }

        Err(anyhow!("Failed to extract IOPlatformUUID from ioreg"))
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    {
        Err(anyhow!("Unsupported platform for machine id extraction"))
    }
}

/// Derives an AES-256 key from the machine identifier
fn derive_key() -> Result<[u8; 32]> {
    let machine_uuid = get_machine_uuid()?;

    let mut hasher = Sha256::new();
    hasher.update(machine_uuid.as_bytes());
    hasher.update(b"knobradio-config-encryption-v1");

    let result = hasher.finalize();
    let mut key = [0u8; 32];
    key.copy_from_slice(&result);

    Ok(key)
}

/// Encrypts a password with the machine-derived key
///
/// Returns the password in `encrypted:BASE64` form, where the encoded
/// payload is nonce (12 bytes) followed by the ciphertext. The nonce is
/// derived from the plaintext so re-encrypting an unchanged password does
/// not rewrite the config file.
pub fn encrypt_password(password: &str) -> Result<String> {
    let key = derive_key()?;
    let cipher =
        Aes256Gcm::new_from_slice(&key).map_err(|e| anyhow!("Failed to create cipher: {}", e))?;

    let mut nonce_bytes = [0u8; 12];
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(b"knobradio-nonce-v1");
    let nonce_hash = hasher.finalize();
    nonce_bytes.copy_from_slice(&nonce_hash[..12]);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, password.as_bytes())
        .map_err(|e| anyhow!("Encryption failed: {}", e))?;

    let mut combined = Vec::with_capacity(12 + ciphertext.len());
    combined.extend_from_slice(&nonce_bytes);
    combined.extend_from_slice(&ciphertext);

    Ok(format!(
        "{}{}",
        ENCRYPTED_PREFIX,
        base64::engine::general_purpose::STANDARD.encode(&combined)
    ))
}

/// Decrypts a password with the machine-derived key
///
/// # Errors
///
/// Returns an error if the value is not in `encrypted:BASE64` form, or if
/// decryption fails (wrong machine or corrupted data).
pub fn decrypt_password(encrypted: &str) -> Result<String> {
    let base64_data = encrypted
        .strip_prefix(ENCRYPTED_PREFIX)
        .ok_or_else(|| anyhow!("Invalid encrypted password format (missing prefix)"))?;

    let key = derive_key()?;
    let cipher =
        Aes256Gcm::new_from_slice(&key).map_err(|e| anyhow!("Failed to create cipher: {}", e))?;

    let ciphertext = base64::engine::general_purpose::STANDARD
        .decode(base64_data)
        .map_err(|e| anyhow!("Invalid base64: {}", e))?;

    // Payload layout: nonce (12 bytes) + ciphertext
    if ciphertext.len() < 12 {
        return Err(anyhow!("Invalid ciphertext (too short)"));
    }

    let nonce = Nonce::from_slice(&ciphertext[..12]);
    let actual_ciphertext = &ciphertext[12..];

    let plaintext = cipher
        .decrypt(nonce, actual_ciphertext)
        .map_err(|e| anyhow!("Decryption failed (wrong machine or corrupted data): {}", e))?;

    String::from_utf8(plaintext).map_err(|e| anyhow!("Invalid UTF-8: {}", e))
}

/// Checks whether a value is an encrypted password
pub fn is_encrypted(value: &str) -> bool {
    value.starts_with(ENCRYPTED_PREFIX)
}

/// Returns the plaintext password, decrypting if necessary
///
/// Values without the `encrypted:` prefix are returned unchanged, so a
/// hand-edited plaintext password in the config keeps working.
pub fn get_password(value: &str) -> Result<String> {
    if is_encrypted(value) {
        decrypt_password(value)
    } else {
        Ok(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_machine_uuid() {
        let uuid = get_machine_uuid();
        assert!(uuid.is_ok(), "Should be able to get machine id");
    }

    #[test]
    fn test_encrypt_decrypt() {
        let password = "SuperSecret123!";

        let encrypted = encrypt_password(password).unwrap();
        assert!(encrypted.starts_with(ENCRYPTED_PREFIX));
        assert_ne!(encrypted, password);

        let decrypted = decrypt_password(&encrypted).unwrap();
        assert_eq!(decrypted, password);
    }

    #[test]
    fn test_deterministic_ciphertext() {
        let a = encrypt_password("hackme").unwrap();
        let b = encrypt_password("hackme").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_is_encrypted() {
        assert!(is_encrypted("encrypted:SGVsbG8="));
        assert!(!is_encrypted("plaintext"));
        assert!(!is_encrypted(""));
    }

    #[test]
    fn test_get_password() {
        let password = get_password("plaintext").unwrap();
        assert_eq!(password, "plaintext");

        let encrypted = encrypt_password("secret").unwrap();
        let password = get_password(&encrypted).unwrap();
        assert_eq!(password, "secret");
    }
}
