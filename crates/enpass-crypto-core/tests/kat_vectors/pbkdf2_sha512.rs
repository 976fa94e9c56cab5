//! PBKDF2-HMAC-SHA512 known-answer vectors for the 64-byte database key.
//!
//! Expected values were generated independently with Python's
//! `hashlib.pbkdf2_hmac("sha512", ...)`.

use enpass_crypto_core::kdf::{derive_database_key, DERIVED_KEY_LEN};

/// Salt `00 01 02 .. 0f`.
fn counting_salt() -> [u8; 16] {
    let mut salt = [0u8; 16];
    for (i, b) in salt.iter_mut().enumerate() {
        *b = u8::try_from(i).unwrap();
    }
    salt
}

/// Password only, 1000 iterations.
#[test]
fn password_only_1000_iterations() {
    let key = derive_database_key(b"correct horse battery staple", &counting_salt(), 1000)
        .expect("derive should succeed");

    let expected = data_encoding::HEXLOWER
        .decode(
            b"03a026148b62ec22a561da0f895f637f577d965a77ee8dbb5a6b3c671f1fc0c2\
              4608e8a027302d84e5b73e0f971793e7362627b10b08cf537936dca7ac49bbf3",
        )
        .unwrap();
    assert_eq!(expected.len(), DERIVED_KEY_LEN);
    assert_eq!(key.expose().as_slice(), expected.as_slice());
}

/// Password with 16 keyfile bytes appended, 1000 iterations.
#[test]
fn password_with_keyfile_bytes_1000_iterations() {
    let mut input = b"password".to_vec();
    input.extend_from_slice(
        &data_encoding::HEXLOWER
            .decode(b"00112233445566778899aabbccddeeff")
            .unwrap(),
    );
    let key = derive_database_key(&input, &counting_salt(), 1000).expect("derive should succeed");

    let expected = data_encoding::HEXLOWER
        .decode(
            b"bef4706ac8c134976cec3a7c1504727b1dfb837682336f3e56de3141249fb4e0\
              1df5f931764a06a0a3595e6302c933b3ad8fcfac90aac8e41d0fb67ddb47df1c",
        )
        .unwrap();
    assert_eq!(key.expose().as_slice(), expected.as_slice());
}
