use thiserror::Error;
use tracing::debug;

use klabis_core::{DomainError, MemberId};

use crate::{ApplicationGrant, Principal};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing grant '{0}'")]
    MissingGrant(ApplicationGrant),

    #[error("forbidden: no access to data of member {0}")]
    NotOwnMember(MemberId),
}

impl From<AuthzError> for DomainError {
    fn from(_: AuthzError) -> Self {
        DomainError::Unauthorized
    }
}

/// Require a global grant.
///
/// - No IO
/// - No panics
pub fn authorize(principal: &Principal, required: ApplicationGrant) -> Result<(), AuthzError> {
    if principal.has_grant(required) {
        Ok(())
    } else {
        debug!(grant = %required, "authorization denied");
        Err(AuthzError::MissingGrant(required))
    }
}

/// Require access to the data of `member`.
///
/// Members always see their own data; anyone else needs `MembersEdit` or
/// `SystemAdmin`.
pub fn authorize_member_access(principal: &Principal, member: MemberId) -> Result<(), AuthzError> {
    if principal.is_member(member)
        || principal.has_grant(ApplicationGrant::MembersEdit)
        || principal.has_grant(ApplicationGrant::SystemAdmin)
    {
        Ok(())
    } else {
        debug!(member_id = %member, "member access denied");
        Err(AuthzError::NotOwnMember(member))
    }
}
