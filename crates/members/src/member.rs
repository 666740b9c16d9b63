use serde::{Deserialize, Serialize};

use libris_core::{DomainError, DomainResult, Entity, MemberId};

/// Role of a member within the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Admin,
    Librarian,
    Reader,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Admin => "admin",
            MemberRole::Librarian => "librarian",
            MemberRole::Reader => "reader",
        }
    }
}

/// Account standing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Active,
    Inactive,
    Locked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMember {
    pub username: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: MemberRole,
}

/// A registered library member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    id: MemberId,
    username: String,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    role: MemberRole,
    status: MemberStatus,
    version: u64,
}

impl Member {
    pub fn register(id: MemberId, new: NewMember) -> DomainResult<Self> {
        if new.username.trim().is_empty() {
            return Err(DomainError::validation(
                "username",
                "username cannot be empty",
            ));
        }
        if new.name.trim().is_empty() {
            return Err(DomainError::validation("name", "name cannot be empty"));
        }

        Ok(Self {
            id,
            username: new.username,
            name: new.name,
            email: new.email,
            phone: new.phone,
            role: new.role,
            status: MemberStatus::Active,
            version: 1,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn role(&self) -> MemberRole {
        self.role
    }

    pub fn status(&self) -> MemberStatus {
        self.status
    }

    /// Whether the member is in good standing to borrow.
    pub fn can_borrow(&self) -> bool {
        matches!(self.status, MemberStatus::Active)
    }

    pub fn lock(&mut self) {
        self.status = MemberStatus::Locked;
        self.version += 1;
    }

    pub fn deactivate(&mut self) {
        self.status = MemberStatus::Inactive;
        self.version += 1;
    }

    pub fn reactivate(&mut self) {
        self.status = MemberStatus::Active;
        self.version += 1;
    }
}

impl Entity for Member {
    type Id = MemberId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_member() -> Member {
        Member::register(
            MemberId::new(),
            NewMember {
                username: "zhang.wei".to_string(),
                name: "Zhang Wei".to_string(),
                email: None,
                phone: None,
                role: MemberRole::Reader,
            },
        )
        .unwrap()
    }

    #[test]
    fn register_starts_active() {
        let member = test_member();
        assert_eq!(member.status(), MemberStatus::Active);
        assert!(member.can_borrow());
    }

    #[test]
    fn register_rejects_empty_username() {
        let err = Member::register(
            MemberId::new(),
            NewMember {
                username: String::new(),
                name: "X".to_string(),
                email: None,
                phone: None,
                role: MemberRole::Reader,
            },
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation {
                field: "username",
                ..
            }
        ));
    }

    #[test]
    fn locked_member_cannot_borrow() {
        let mut member = test_member();
        member.lock();
        assert!(!member.can_borrow());
        member.reactivate();
        assert!(member.can_borrow());
    }
}
