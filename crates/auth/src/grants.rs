use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Global grants a club user can hold.
///
/// Serialized by their grant name (e.g. `"members:register"`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ApplicationGrant {
    #[serde(rename = "members:register")]
    MembersRegister,
    #[serde(rename = "members:edit")]
    MembersEdit,
    #[serde(rename = "members:suspendMembership")]
    MembersSuspendMembership,
    #[serde(rename = "appusers:permissions")]
    AppUsersPermissions,
    #[serde(rename = "finance:deposit")]
    DepositFinance,
    #[serde(rename = "system:admin")]
    SystemAdmin,
}

impl ApplicationGrant {
    pub const ALL: [ApplicationGrant; 6] = [
        ApplicationGrant::MembersRegister,
        ApplicationGrant::MembersEdit,
        ApplicationGrant::MembersSuspendMembership,
        ApplicationGrant::AppUsersPermissions,
        ApplicationGrant::DepositFinance,
        ApplicationGrant::SystemAdmin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationGrant::MembersRegister => "members:register",
            ApplicationGrant::MembersEdit => "members:edit",
            ApplicationGrant::MembersSuspendMembership => "members:suspendMembership",
            ApplicationGrant::AppUsersPermissions => "appusers:permissions",
            ApplicationGrant::DepositFinance => "finance:deposit",
            ApplicationGrant::SystemAdmin => "system:admin",
        }
    }
}

impl core::fmt::Display for ApplicationGrant {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationGrant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApplicationGrant::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| format!("unknown grant '{s}'"))
    }
}
