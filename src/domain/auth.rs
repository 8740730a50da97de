//! Authorization policy
//!
//! One function decides whether an actor may run a command that needs a given
//! privilege, so command bodies never carry their own checks.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Whoever invoked a command, as reported by the messaging gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    pub id: u64,
    /// Administrator permission in the invoking server
    pub is_administrator: bool,
}

impl Actor {
    pub const fn member(id: u64) -> Self {
        Self {
            id,
            is_administrator: false,
        }
    }

    pub const fn administrator(id: u64) -> Self {
        Self {
            id,
            is_administrator: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Privilege {
    Anyone,
    Administrator,
    Owner,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("You need administrator permissions to use this command.")]
    AdministratorRequired,

    #[error("❌ This command is restricted to the bot owner only.")]
    OwnerRequired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthPolicy {
    owner_id: u64,
}

impl AuthPolicy {
    pub const fn new(owner_id: u64) -> Self {
        Self { owner_id }
    }


    /// Owner checks compare identity only; administrator checks look at the
    /// actor's permission flag and do not imply ownership.
    pub const fn authorize(&self, actor: &Actor, required: Privilege) -> Result<(), AuthError> {
        match required {
            Privilege::Anyone => Ok(()),
            Privilege::Administrator if actor.is_administrator => Ok(()),
            Privilege::Administrator => Err(AuthError::AdministratorRequired),
            Privilege::Owner if actor.id == self.owner_id => Ok(()),
            Privilege::Owner => Err(AuthError::OwnerRequired),
        }
    }
}
