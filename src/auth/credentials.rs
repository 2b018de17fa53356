use anyhow::{Result, anyhow};
use keyring::{Entry, Error as KeyringError};

const SERVICE: &str = "mailsift";

/// Save the IMAP password (an app password, typically) for `username`.
pub fn save_password(username: &str, password: &str) -> Result<()> {
    let entry = Entry::new(SERVICE, username);
    entry?
        .set_password(password)
        .map_err(|e| anyhow!(e.to_string()))?;
    Ok(())
}

pub fn load_password(username: &str) -> Result<Option<String>> {
    let entry = Entry::new(SERVICE, username);
    match entry?.get_password() {
        Ok(v) => Ok(Some(v)),
        Err(KeyringError::NoEntry) => Ok(None),
        Err(e) => Err(anyhow!(e.to_string())),
    }
}

/// Keyring first, then `MAILSIFT_PASSWORD`.
pub fn resolve_password(username: &str) -> Result<String> {
    if let Some(p) = load_password(username)? {
        return Ok(p);
    }
    std::env::var("MAILSIFT_PASSWORD").map_err(|_| {
        anyhow!("no password for {username}; run `mailsift set-password` or set MAILSIFT_PASSWORD")
    })
}
