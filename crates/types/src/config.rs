//! Per-run install configuration

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Privilege-escalation policy for one `do_work` call
///
/// Decides how the privileged installer capability is obtained and which
/// identity the install is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Authorizer {
    /// No external escalation: route through an in-process elevated
    /// execution context and attribute the install to the relay itself
    None,
    /// Resolve the delegated owner identity through the permission gate
    /// and attribute the install to it
    DelegatedOwner,
    /// Attribute the install to a caller-supplied installer identity,
    /// with no additional wrapping
    Explicit(String),
}

bitflags! {
    /// Install flags forwarded to the package service
    ///
    /// Bit values follow the platform installer's flag word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct InstallFlags: u32 {
        /// Replace an already-installed package
        const REPLACE_EXISTING = 0x0000_0002;
        /// Accept packages marked test-only
        const ALLOW_TEST_PACKAGES = 0x0000_0004;
        /// Install for all users on the device
        const ALL_USERS = 0x0000_0040;
        /// Permit a version downgrade
        const ALLOW_DOWNGRADE = 0x0000_0080;
        /// Grant all runtime permissions at install time
        const GRANT_ALL_PERMISSIONS = 0x0000_0100;
    }
}

// Serialized as the raw flag word; unknown bits are dropped on the way
// back in rather than rejecting the whole config.
impl Serialize for InstallFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.bits())
    }
}

impl<'de> Deserialize<'de> for InstallFlags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = u32::deserialize(deserializer)?;
        Ok(Self::from_bits_truncate(bits))
    }
}

/// Read-only configuration for the duration of one `do_work` call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallConfig {
    /// Escalation strategy selection
    pub authorizer: Authorizer,
    /// Caller-configured install flags (the replace-existing bit is
    /// ORed in unconditionally by the orchestrator)
    #[serde(default = "InstallFlags::empty")]
    pub install_flags: InstallFlags,
    /// Delete source files after a successful install
    #[serde(default)]
    pub auto_delete_source: bool,
}

impl InstallConfig {
    /// Create a configuration with the given authorizer and defaults
    /// for everything else
    #[must_use]
    pub fn new(authorizer: Authorizer) -> Self {
        Self {
            authorizer,
            install_flags: InstallFlags::empty(),
            auto_delete_source: false,
        }
    }

    /// Set the configured install flags
    #[must_use]
    pub fn with_flags(mut self, flags: InstallFlags) -> Self {
        self.install_flags = flags;
        self
    }

    /// Enable source deletion after successful installs
    #[must_use]
    pub fn with_auto_delete(mut self, enabled: bool) -> Self {
        self.auto_delete_source = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_round_trip_through_serde() {
        let config = InstallConfig::new(Authorizer::Explicit("com.example.store".into()))
            .with_flags(InstallFlags::ALLOW_DOWNGRADE | InstallFlags::ALL_USERS)
            .with_auto_delete(true);
        let json = serde_json::to_string(&config).unwrap();
        let back: InstallConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.install_flags, config.install_flags);
        assert_eq!(back.authorizer, config.authorizer);
        assert!(back.auto_delete_source);
    }

    #[test]
    fn flags_serialize_as_the_raw_word() {
        let flags = InstallFlags::REPLACE_EXISTING | InstallFlags::ALL_USERS;
        assert_eq!(serde_json::to_string(&flags).unwrap(), "66");
    }

    #[test]
    fn unknown_flag_bits_are_dropped_on_deserialize() {
        // 0x10002: replace-existing plus a bit we do not model.
        let flags: InstallFlags = serde_json::from_str("65538").unwrap();
        assert_eq!(flags, InstallFlags::REPLACE_EXISTING);
    }

    #[test]
    fn flag_bits_match_platform_values() {
        assert_eq!(InstallFlags::REPLACE_EXISTING.bits(), 0x2);
        assert_eq!(InstallFlags::ALL_USERS.bits(), 0x40);
        assert_eq!(InstallFlags::GRANT_ALL_PERMISSIONS.bits(), 0x100);
    }
}
