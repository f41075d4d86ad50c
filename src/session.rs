use anyhow::{bail, Result};
use tracing::{info, warn};

/// Shared-secret gate in front of a run
#[derive(Debug, Clone, Default)]
pub struct AccessGate {
    secret: Option<String>,
}

impl AccessGate {
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()),
        }
    }

    /// Read the secret from `LISTING_SCOUT_SECRET`
    pub fn from_env() -> Self {
        Self::new(std::env::var("LISTING_SCOUT_SECRET").ok())
    }
}

/// Per-session login state, passed explicitly to whatever needs it
#[derive(Debug, Default)]
pub struct Session {
    authenticated: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login(&mut self, gate: &AccessGate, attempt: Option<&str>) -> Result<()> {
        let Some(secret) = gate.secret.as_deref() else {
            warn!("No shared secret configured; access is open");
            self.authenticated = true;
            return Ok(());
        };

        self.authenticated = attempt == Some(secret);
        if !self.authenticated {
            bail!("Incorrect password");
        }

        info!("🔐 Password accepted");
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Fail unless `login` succeeded
    pub fn require(&self) -> Result<()> {
        if !self.is_authenticated() {
            bail!("Not logged in");
        }
        Ok(())
    }
}
