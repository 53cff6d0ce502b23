use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Analyst,
    Viewer,
}

/// Actions the service gates by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    UploadCreate,
    ProcessCreate,
    AssetRead,
    AdminAccess,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Analyst => "Analyst",
            Role::Viewer => "Viewer",
        }
    }

    pub fn allows(&self, permission: Permission) -> bool {
        match permission {
            Permission::UploadCreate | Permission::ProcessCreate | Permission::AssetRead => {
                matches!(self, Role::Admin | Role::Analyst)
            }
            Permission::AdminAccess => matches!(self, Role::Admin),
        }
    }
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::UploadCreate => "upload:create",
            Permission::ProcessCreate => "process:create",
            Permission::AssetRead => "asset:read",
            Permission::AdminAccess => "admin:access",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "analyst" => Ok(Role::Analyst),
            "viewer" => Ok(Role::Viewer),
            other => Err(format!(
                "Invalid role: {}. Expected: Admin, Analyst, or Viewer",
                other
            )),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
