//! Session gate and local identity records.
//!
//! The identity boundary is a credential file (`users.json`) of salted
//! PBKDF2-SHA256 password hashes and a session file (`session.json`) naming
//! the signed-in user. Protected commands resolve the current user up front
//! and refuse to run without one; sign-in failures surface as a single
//! one-line message with no distinction between unknown email and wrong
//! password.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use chrono::Utc;
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

const DEFAULT_PBKDF2_ITERATIONS: u32 = 200_000;

fn default_pbkdf2_iterations() -> u32 {
    DEFAULT_PBKDF2_ITERATIONS
}

/// A stored credential: base64 salt and derived key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub email: String,
    salt: String,
    hash: String,
    #[serde(default = "default_pbkdf2_iterations")]
    iterations: u32,
    pub created_at_utc: i64,
}

impl UserRecord {
    /// Derive a fresh salted credential for a password.
    pub fn new(email: &str, password: &str, iterations: u32) -> Self {
        let mut salt = [0u8; 16];
        OsRng.fill_bytes(&mut salt);
        let key = derive_key(password, &salt, iterations);
        UserRecord {
            email: email.to_string(),
            salt: B64.encode(salt),
            hash: B64.encode(key),
            iterations,
            created_at_utc: Utc::now().timestamp(),
        }
    }

    /// Check a password against the stored hash.
    pub fn verify(&self, password: &str) -> bool {
        if password.is_empty() {
            return false;
        }
        let salt = match B64.decode(self.salt.as_str()) {
            Ok(value) => value,
            Err(_) => return false,
        };
        let key = derive_key(password, salt.as_slice(), self.iterations.max(1));
        B64.encode(key) == self.hash
    }
}

fn derive_key(password: &str, salt: &[u8], iterations: u32) -> [u8; 32] {
    let mut key = [0u8; 32];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut key);
    key
}

/// The active session, if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Session {
    email: String,
    signed_in_at_utc: i64,
}

/// Observes and mutates the session state under one data directory.
pub struct SessionGate {
    dir: PathBuf,
}

impl SessionGate {
    pub fn new(dir: &Path) -> Self {
        SessionGate {
            dir: dir.to_path_buf(),
        }
    }

    fn users_path(&self) -> PathBuf {
        self.dir.join("users.json")
    }

    fn session_path(&self) -> PathBuf {
        self.dir.join("session.json")
    }

    fn load_users(&self) -> Vec<UserRecord> {
        let path = self.users_path();
        if !path.exists() {
            return Vec::new();
        }
        let mut buf = String::new();
        match File::open(&path).and_then(|mut f| f.read_to_string(&mut buf)) {
            Ok(_) => serde_json::from_str(&buf).unwrap_or_else(|e| {
                eprintln!("Error parsing {}, starting empty: {e}", path.display());
                Vec::new()
            }),
            Err(e) => {
                eprintln!("Error reading {}, starting empty: {e}", path.display());
                Vec::new()
            }
        }
    }

    fn save_users(&self, users: &[UserRecord]) -> std::io::Result<()> {
        let path = self.users_path();
        let tmp = path.with_extension("json.tmp");
        let mut f = File::create(&tmp)?;
        let data = serde_json::to_string_pretty(users)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    fn write_session(&self, email: &str) -> std::io::Result<()> {
        let session = Session {
            email: email.to_string(),
            signed_in_at_utc: Utc::now().timestamp(),
        };
        let data = serde_json::to_string_pretty(&session)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(self.session_path(), data)
    }

    /// Create an account and sign it in.
    pub fn sign_up(&self, email: &str, password: &str) -> Result<(), String> {
        let email = email.trim();
        if email.is_empty() {
            return Err("Email is required.".to_string());
        }
        if password.is_empty() {
            return Err("Password is required.".to_string());
        }
        let mut users = self.load_users();
        if users.iter().any(|u| u.email == email) {
            return Err(format!("An account already exists for {email}."));
        }
        users.push(UserRecord::new(email, password, DEFAULT_PBKDF2_ITERATIONS));
        self.save_users(&users).map_err(|e| e.to_string())?;
        self.write_session(email).map_err(|e| e.to_string())?;
        Ok(())
    }

    /// Sign in with email and password.
    pub fn sign_in(&self, email: &str, password: &str) -> Result<(), String> {
        let email = email.trim();
        let users = self.load_users();
        let ok = users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.verify(password))
            .unwrap_or(false);
        if !ok {
            return Err("Invalid email or password.".to_string());
        }
        self.write_session(email).map_err(|e| e.to_string())
    }

    /// Clear the local session.
    pub fn sign_out(&self) -> std::io::Result<()> {
        let path = self.session_path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// The signed-in user's email, if a session exists.
    pub fn current_user(&self) -> Option<String> {
        let mut buf = String::new();
        File::open(self.session_path())
            .and_then(|mut f| f.read_to_string(&mut buf))
            .ok()?;
        serde_json::from_str::<Session>(&buf).ok().map(|s| s.email)
    }

    #[cfg(test)]
    fn push_user(&self, record: UserRecord) -> std::io::Result<()> {
        let mut users = self.load_users();
        users.push(record);
        self.save_users(&users)
    }
}

/// Resolve the current user or stop the command with a sign-in prompt.
/// The CLI analogue of redirecting a protected view to the login page.
pub fn require_user(dir: &Path) -> String {
    match SessionGate::new(dir).current_user() {
        Some(email) => email,
        None => {
            eprintln!("Not signed in. Run 'tt login <email>' or 'tt signup <email>' first.");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_gate() -> SessionGate {
        let dir = std::env::temp_dir().join(format!(
            "teamtrack-session-{}-{:?}",
            std::process::id(),
            std::thread::current().id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let _ = std::fs::remove_file(dir.join("users.json"));
        let _ = std::fs::remove_file(dir.join("session.json"));
        SessionGate::new(&dir)
    }

    #[test]
    fn record_verifies_own_password_only() {
        let record = UserRecord::new("parth@company.com", "hunter2", 1_000);
        assert!(record.verify("hunter2"));
        assert!(!record.verify("hunter3"));
        assert!(!record.verify(""));
    }

    #[test]
    fn sign_in_and_out_drive_session_state() {
        let gate = temp_gate();
        assert!(gate.current_user().is_none());
        gate.push_user(UserRecord::new("parth@company.com", "hunter2", 1_000))
            .unwrap();

        assert!(gate.sign_in("parth@company.com", "wrong").is_err());
        assert!(gate.current_user().is_none());

        gate.sign_in("parth@company.com", "hunter2").unwrap();
        assert_eq!(gate.current_user().as_deref(), Some("parth@company.com"));

        gate.sign_out().unwrap();
        assert!(gate.current_user().is_none());
    }

    #[test]
    fn unknown_email_gets_the_same_error_line() {
        let gate = temp_gate();
        let err = gate.sign_in("nobody@company.com", "pw").unwrap_err();
        assert_eq!(err, "Invalid email or password.");
    }

    #[test]
    fn sign_up_rejects_blank_and_duplicate() {
        let gate = temp_gate();
        assert!(gate.sign_up("", "pw").is_err());
        assert!(gate.sign_up("a@b.com", "").is_err());
        gate.push_user(UserRecord::new("a@b.com", "pw", 1_000)).unwrap();
        assert!(gate.sign_up("a@b.com", "pw2").is_err());
    }
}
