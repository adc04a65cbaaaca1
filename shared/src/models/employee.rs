//! Employee / Actor Model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Staff role (员工角色)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Waiter,
    Cook,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Waiter => "WAITER",
            Role::Cook => "COOK",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "WAITER" => Ok(Role::Waiter),
            "COOK" => Ok(Role::Cook),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Authenticated caller, already bound to a tenant.
///
/// Supplied by the authentication layer and trusted as given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: i64,
    pub role: Role,
    pub company_id: i64,
}

impl Actor {
    pub fn new(id: i64, role: Role, company_id: i64) -> Self {
        Self {
            id,
            role,
            company_id,
        }
    }

    /// Whether the actor's role is one of `roles`
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }
}

/// Employee entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: i64,
    pub company_id: i64,
    pub name: String,
    pub role: Role,
}

/// Shallow employee projection embedded in order views
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRef {
    pub id: i64,
    pub name: String,
}
