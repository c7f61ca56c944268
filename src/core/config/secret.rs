use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

const SECRET_FILE_NAME: &str = ".secret_key";
const SECRET_BYTES: usize = 64;

/// JWT signing key kept on disk so tokens survive restarts when `SECRET_KEY` is unset.
pub(super) struct SecretFile {
    path: PathBuf,
}

impl SecretFile {
    pub(super) fn next_to_manifest() -> Self {
        Self::at(Path::new(env!("CARGO_MANIFEST_DIR")).join(SECRET_FILE_NAME))
    }

    fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Never fails: if the file cannot be written the key is used for this process only.
    pub(super) fn load_or_create(&self) -> String {
        if let Some(existing) = self.read() {
            return existing;
        }

        let key = generate_secret_key();
        match self.write_new(&key) {
            Ok(()) => key,
            // Another process created it first.
            Err(err) if err.kind() == ErrorKind::AlreadyExists => self.read().unwrap_or(key),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    path = %self.path.display(),
                    "Could not persist generated secret key; tokens will not survive a restart"
                );
                key
            }
        }
    }

    fn read(&self) -> Option<String> {
        let contents = fs::read_to_string(&self.path).ok()?;
        let key = contents.trim();
        (!key.is_empty()).then(|| key.to_string())
    }

    fn write_new(&self, key: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path)?;
        file.write_all(key.as_bytes())
    }
}

fn generate_secret_key() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
