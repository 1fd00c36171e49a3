use anyhow::{Context, Result};
use keyring::Entry;

/// Keychain service name for remembered logins
const SERVICE_NAME: &str = "vocero-console";

/// Remember-me storage for login credentials.
///
/// Backed by the OS keychain; only used when the user opts in on the login
/// form. The session record itself never goes through here.
pub struct CredentialStore;

impl CredentialStore {
    /// Store the password for `username` in the OS keychain
    pub fn remember(username: &str, password: &str) -> Result<()> {
        let entry =
            Entry::new(SERVICE_NAME, username).context("Failed to create keyring entry")?;
        entry
            .set_password(password)
            .context("Failed to store password in keychain")?;
        Ok(())
    }

    /// Retrieve the remembered password for `username`
    pub fn recall(username: &str) -> Result<String> {
        let entry =
            Entry::new(SERVICE_NAME, username).context("Failed to create keyring entry")?;
        entry
            .get_password()
            .context("Failed to retrieve password from keychain")
    }

    /// Drop the remembered password for `username`
    pub fn forget(username: &str) -> Result<()> {
        let entry =
            Entry::new(SERVICE_NAME, username).context("Failed to create keyring entry")?;
        entry
            .delete_credential()
            .context("Failed to delete credential from keychain")?;
        Ok(())
    }

    /// Check whether a password is remembered for `username`
    pub fn is_remembered(username: &str) -> bool {
        if let Ok(entry) = Entry::new(SERVICE_NAME, username) {
            entry.get_password().is_ok()
        } else {
            false
        }
    }
}
