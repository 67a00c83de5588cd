use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use klabis_core::MemberId;

use crate::ApplicationGrant;

/// An authenticated caller, resolved for authorization decisions.
///
/// `member_id` is `None` for users that are not club members (e.g. an
/// administrator account).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Principal {
    pub member_id: Option<MemberId>,
    pub grants: BTreeSet<ApplicationGrant>,
}

impl Principal {
    /// A member acting on their own behalf, without global grants.
    pub fn member(member_id: MemberId) -> Self {
        Self {
            member_id: Some(member_id),
            grants: BTreeSet::new(),
        }
    }

    /// Internal caller holding every grant (integration listeners, jobs).
    pub fn system() -> Self {
        Self {
            member_id: None,
            grants: ApplicationGrant::ALL.into_iter().collect(),
        }
    }

    pub fn with_grant(mut self, grant: ApplicationGrant) -> Self {
        self.grants.insert(grant);
        self
    }

    pub fn has_grant(&self, grant: ApplicationGrant) -> bool {
        self.grants.contains(&grant)
    }

    pub fn is_member(&self, member: MemberId) -> bool {
        self.member_id == Some(member)
    }
}
