//! Role identifiers.
//!
//! Roles are opaque 32-byte values compared by equality only. Names are
//! hashed into identifiers, but nothing in the registry depends on that.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::config::ROLE_DOMAIN;
use crate::crypto::hash_with_domain;
use crate::serializer::{Reader, ReaderError, Serializer, Writer};

/// Role identifier (32 bytes)
pub type RoleId = [u8; 32];

/// Create a RoleId from a string name (hash of the name)
pub fn role_id_from_name(name: &str) -> RoleId {
    hash_with_domain(ROLE_DOMAIN, name.as_bytes())
}

/// Default admin role - administers every role that has no explicit admin, including itself
pub const DEFAULT_ADMIN_ROLE: RoleId = [0u8; 32];

lazy_static! {
    /// Minter role - can mint new tokens
    pub static ref MINTER_ROLE: RoleId = role_id_from_name("MINTER_ROLE");
    /// Burner role - can burn tokens held by others
    pub static ref BURNER_ROLE: RoleId = role_id_from_name("BURNER_ROLE");
    /// Snapshot role - can freeze balances into a new snapshot
    pub static ref SNAPSHOT_ROLE: RoleId = role_id_from_name("SNAPSHOT_ROLE");
}

/// Persisted per-role configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleConfig {
    /// The admin role that can grant/revoke this role
    #[serde(with = "hex::serde")]
    pub admin_role: RoleId,
    /// Number of members with this role
    pub member_count: u32,
}

impl Default for RoleConfig {
    fn default() -> Self {
        Self {
            admin_role: DEFAULT_ADMIN_ROLE,
            member_count: 0,
        }
    }
}

impl Serializer for RoleConfig {
    fn write(&self, writer: &mut Writer) {
        writer.write_bytes(&self.admin_role);
        self.member_count.write(writer);
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        let admin_role = reader.read_bytes_32()?;
        let member_count = reader.read()?;
        Ok(Self {
            admin_role,
            member_count,
        })
    }

    fn size(&self) -> usize {
        32 + self.member_count.size()
    }
}

/// Check if a role is a predefined role
pub fn is_predefined_role(role: &RoleId) -> bool {
    predefined_role_name(role).is_some()
}

/// Get the name of a predefined role
pub fn predefined_role_name(role: &RoleId) -> Option<&'static str> {
    if *role == DEFAULT_ADMIN_ROLE {
        Some("DEFAULT_ADMIN")
    } else if *role == *MINTER_ROLE {
        Some("MINTER")
    } else if *role == *BURNER_ROLE {
        Some("BURNER")
    } else if *role == *SNAPSHOT_ROLE {
        Some("SNAPSHOT")
    } else {
        None
    }
}

/// Human readable form: the predefined name when known, hex otherwise
pub fn display_role(role: &RoleId) -> String {
    match predefined_role_name(role) {
        Some(name) => name.to_string(),
        None => format!("0x{}", hex::encode(role)),
    }
}
