mod aes_gcm;
mod pbkdf2_sha512;
