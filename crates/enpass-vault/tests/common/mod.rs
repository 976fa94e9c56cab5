//! Builds real Enpass-shaped vaults on disk for the integration tests.
//!
//! The database is created by `SQLCipher` with a raw key and an explicit
//! salt (`x'<key><salt>'`), so the file starts with the PBKDF2 salt exactly
//! as an Enpass vault does. Field values are sealed with AES-256-GCM under
//! each item's own key material, bound to the item UUID.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use enpass_crypto_core::{derive_database_key, seal, SecretBytes, KEY_LEN, NONCE_LEN, SALT_LEN};
use rusqlite::Connection;

pub const PASSWORD: &str = "correct horse battery staple";
pub const SALT: [u8; SALT_LEN] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f,
];
pub const ITERATIONS: u32 = 2;

const SCHEMA: &str = "
    CREATE TABLE item (
        ID INTEGER PRIMARY KEY AUTOINCREMENT,
        uuid TEXT NOT NULL,
        created_at INTEGER,
        meta_updated_at INTEGER,
        field_updated_at INTEGER,
        title TEXT,
        subtitle TEXT,
        note TEXT,
        icon TEXT,
        favorite INTEGER,
        trashed INTEGER,
        archived INTEGER,
        deleted INTEGER,
        category TEXT,
        template TEXT,
        last_used INTEGER,
        key BLOB
    );
    CREATE TABLE itemfield (
        ID INTEGER PRIMARY KEY AUTOINCREMENT,
        item_uuid TEXT NOT NULL,
        item_field_uid INTEGER,
        label TEXT,
        value TEXT,
        deleted INTEGER,
        sensitive INTEGER,
        historical INTEGER,
        type TEXT,
        orde INTEGER
    );
";

// ---------------------------------------------------------------------------
// Item description
// ---------------------------------------------------------------------------

pub struct TestField {
    pub field_type: String,
    pub label: String,
    pub plaintext: Vec<u8>,
    pub sensitive: bool,
    /// Store a value whose first ciphertext byte is flipped.
    pub corrupt: bool,
}

pub struct TestItem {
    pub uuid: String,
    pub title: String,
    pub category: String,
    pub trashed: bool,
    pub deleted: bool,
    /// Clear the nonce from the key material, as Enpass does on deletion.
    pub tombstone: bool,
    pub fields: Vec<TestField>,
}

impl TestItem {
    pub fn new(uuid: &str, title: &str) -> Self {
        Self {
            uuid: uuid.into(),
            title: title.into(),
            category: "login".into(),
            trashed: false,
            deleted: false,
            tombstone: false,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field_type: &str, label: &str, plaintext: &str) -> Self {
        self.fields.push(TestField {
            field_type: field_type.into(),
            label: label.into(),
            plaintext: plaintext.as_bytes().to_vec(),
            sensitive: field_type == "password",
            corrupt: false,
        });
        self
    }

    pub fn corrupt_field(mut self, field_type: &str, label: &str) -> Self {
        self = self.field(field_type, label, "tampered");
        if let Some(last) = self.fields.last_mut() {
            last.corrupt = true;
        }
        self
    }

    pub const fn trashed(mut self) -> Self {
        self.trashed = true;
        self
    }

    pub const fn deleted(mut self) -> Self {
        self.deleted = true;
        self
    }

    pub const fn tombstoned(mut self) -> Self {
        self.deleted = true;
        self.tombstone = true;
        self
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

pub struct VaultBuilder {
    password: String,
    keyfile: Option<Vec<u8>>,
    declare_keyfile: Option<bool>,
    vault_info: Option<String>,
    items: Vec<TestItem>,
}

pub struct VaultFixture {
    pub dir: tempfile::TempDir,
    pub password: String,
    pub keyfile: Option<PathBuf>,
}

impl VaultFixture {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("vault.enpassdb")
    }
}

impl VaultBuilder {
    pub fn new() -> Self {
        Self {
            password: PASSWORD.into(),
            keyfile: None,
            declare_keyfile: None,
            vault_info: None,
            items: Vec::new(),
        }
    }

    pub fn password(mut self, password: &str) -> Self {
        self.password = password.into();
        self
    }

    /// Require a keyfile holding `key`.
    pub fn keyfile(mut self, key: &[u8]) -> Self {
        self.keyfile = Some(key.to_vec());
        self
    }

    /// Override `have_keyfile` in `vault.json`.
    pub const fn declare_keyfile(mut self, declared: bool) -> Self {
        self.declare_keyfile = Some(declared);
        self
    }

    /// Write this `vault.json` verbatim.
    pub fn vault_info(mut self, json: &str) -> Self {
        self.vault_info = Some(json.into());
        self
    }

    pub fn item(mut self, item: TestItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn build(self) -> VaultFixture {
        let dir = tempfile::tempdir().unwrap();

        let mut input = self.password.as_bytes().to_vec();
        let keyfile = self.keyfile.as_ref().map(|key| {
            input.extend_from_slice(key);
            let path = dir.path().join("vault.enpasskey");
            let xml = format!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<key>{}</key>\n",
                data_encoding::HEXLOWER.encode(key)
            );
            std::fs::write(&path, xml).unwrap();
            path
        });

        let key = derive_database_key(&input, &SALT, ITERATIONS).unwrap();
        write_database(&dir.path().join("vault.enpassdb"), &key, &self.items);

        let info = self.vault_info.unwrap_or_else(|| {
            let has_keyfile = self.declare_keyfile.unwrap_or(self.keyfile.is_some());
            format!(
                r#"{{
                    "encryption_algo": "aes-256-cbc",
                    "have_keyfile": {},
                    "kdf_algo": "pbkdf2",
                    "kdf_iter": {ITERATIONS},
                    "vault_items_count": {},
                    "vault_name": "Fixture",
                    "version": 6
                }}"#,
                u8::from(has_keyfile),
                self.items.len()
            )
        });
        std::fs::write(dir.path().join("vault.json"), info).unwrap();

        VaultFixture {
            dir,
            password: self.password,
            keyfile,
        }
    }
}

/// Database key for the fixture defaults, as the vault derives it.
pub fn fixture_key() -> SecretBytes<64> {
    derive_database_key(PASSWORD.as_bytes(), &SALT, ITERATIONS).unwrap()
}

/// AAD for `uuid`: its hex digits as bytes.
pub fn uuid_aad(uuid: &str) -> Vec<u8> {
    data_encoding::HEXLOWER_PERMISSIVE
        .decode(uuid.replace('-', "").as_bytes())
        .unwrap()
}

fn write_database(path: &Path, key: &SecretBytes<64>, items: &[TestItem]) {
    let conn = Connection::open(path).unwrap();
    let raw = format!(
        "{}{}",
        data_encoding::HEXLOWER.encode(&key.expose()[..32]),
        data_encoding::HEXLOWER.encode(&SALT)
    );
    conn.execute_batch(&format!("PRAGMA key = \"x'{raw}'\";"))
        .unwrap();
    conn.execute_batch("PRAGMA cipher_compatibility = 3;").unwrap();
    conn.execute_batch(SCHEMA).unwrap();

    for (n, item) in items.iter().enumerate() {
        let seed = u8::try_from(n + 1).unwrap();
        let item_key = [seed; KEY_LEN];
        let nonce = [seed.wrapping_mul(3); NONCE_LEN];

        let mut material = item_key.to_vec();
        if !item.tombstone {
            material.extend_from_slice(&nonce);
        }

        conn.execute(
            "INSERT INTO item (uuid, created_at, meta_updated_at, field_updated_at, title,
                               subtitle, note, icon, favorite, trashed, archived, deleted,
                               category, template, last_used, key)
             VALUES (?1, 1700000000, 1700000000, 1700000100, ?2, ?3, '', '', 0, ?4, 0, ?5,
                     ?6, 'login.default', 1700000200, ?7)",
            rusqlite::params![
                item.uuid,
                item.title,
                format!("{} subtitle", item.title),
                i64::from(item.trashed),
                i64::from(item.deleted),
                item.category,
                material,
            ],
        )
        .unwrap();

        for (order, field) in item.fields.iter().enumerate() {
            let mut sealed = seal(&field.plaintext, &item_key, &nonce, &uuid_aad(&item.uuid))
                .unwrap();
            if field.corrupt {
                sealed[0] ^= 0x01;
            }
            conn.execute(
                "INSERT INTO itemfield (item_uuid, item_field_uid, label, value, deleted,
                                        sensitive, historical, type, orde)
                 VALUES (?1, ?2, ?3, ?4, 0, ?5, 0, ?6, ?2)",
                rusqlite::params![
                    item.uuid,
                    i64::try_from(order).unwrap(),
                    field.label,
                    data_encoding::HEXLOWER.encode(&sealed),
                    i64::from(field.sensitive),
                    field.field_type,
                ],
            )
            .unwrap();
        }
    }

    conn.close().map_err(|(_, e)| e).unwrap();
}
