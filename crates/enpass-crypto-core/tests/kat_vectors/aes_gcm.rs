//! AES-256-GCM item decryption against an externally produced ciphertext.
//!
//! Generated with Python `cryptography` (`AESGCM(key).encrypt(nonce, pt, aad)`),
//! with the AAD being the item UUID without hyphens, as stored by Enpass.

use enpass_crypto_core::symmetric::{open, ItemKey, NONCE_LEN};
use enpass_crypto_core::CryptoError;

const UUID_HEX: &str = "a2ec30c0aeed41f7aed7cc50e69ff506";
const CIPHERTEXT_HEX: &str = "6dabffa9d45ec049ca1b3a1570c7ec3be4c8d109b3a2fc";

fn item_key_material() -> Vec<u8> {
    let mut material = vec![0x42u8; 32];
    material.extend((0u8..12).collect::<Vec<_>>());
    material
}

fn decode(hex: &str) -> Vec<u8> {
    data_encoding::HEXLOWER.decode(hex.as_bytes()).unwrap()
}

#[test]
fn decrypts_reference_ciphertext() {
    let item_key = ItemKey::parse(&item_key_material()).expect("44-byte material");
    let plaintext = item_key
        .open(&decode(CIPHERTEXT_HEX), &decode(UUID_HEX))
        .expect("reference ciphertext should authenticate");
    assert_eq!(plaintext.expose(), b"hunter2");
}

#[test]
fn reference_ciphertext_rejects_other_uuid() {
    let item_key = ItemKey::parse(&item_key_material()).expect("44-byte material");
    let other = decode("a2ec30c0aeed41f7aed7cc50e69ff507");
    assert!(matches!(
        item_key.open(&decode(CIPHERTEXT_HEX), &other),
        Err(CryptoError::Decryption)
    ));
}

#[test]
fn reference_ciphertext_rejects_empty_aad() {
    let nonce: [u8; NONCE_LEN] = std::array::from_fn(|i| u8::try_from(i).unwrap());
    assert!(matches!(
        open(&[0x42; 32], &nonce, &decode(CIPHERTEXT_HEX), &[]),
        Err(CryptoError::Decryption)
    ));
}
