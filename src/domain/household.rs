// Household and family membership models
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_HOME_NAME: &str = "My Home";
pub const NEW_HOME_NAME: &str = "My Sweet Home";

/// Identity handed over by the upstream auth provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub uid: String,
    pub email: String,
}

impl User {
    pub fn new(uid: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: email.into(),
        }
    }
}

/// A household document. Its id is the owner's uid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Household {
    pub id: String,
    #[serde(rename = "homeName")]
    pub name: String,
    pub owner_email: String,
    #[serde(default)]
    pub members: Vec<String>,
}

impl Household {
    pub fn new(owner: &User) -> Self {
        Self {
            id: owner.uid.clone(),
            name: NEW_HOME_NAME.to_string(),
            owner_email: owner.email.clone(),
            members: vec![owner.email.clone()],
        }
    }

    pub fn add_member(&mut self, email: &str) {
        if !self.members.iter().any(|m| m == email) {
            self.members.push(email.to_string());
        }
    }

    pub fn remove_member(&mut self, email: &str) {
        self.members.retain(|m| m != email);
    }

    /// Owner first, then every other member
    pub fn roster(&self) -> Vec<FamilyMember> {
        std::iter::once(FamilyMember::owner(&self.owner_email))
            .chain(
                self.members
                    .iter()
                    .filter(|m| **m != self.owner_email)
                    .map(|m| FamilyMember::member(m)),
            )
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberRole {
    Owner,
    Member,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FamilyMember {
    pub email: String,
    pub role: MemberRole,
    pub status: &'static str,
}

impl FamilyMember {
    pub fn owner(email: &str) -> Self {
        Self {
            email: email.to_string(),
            role: MemberRole::Owner,
            status: "Active",
        }
    }

    pub fn member(email: &str) -> Self {
        Self {
            email: email.to_string(),
            role: MemberRole::Member,
            status: "Active",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinedHome {
    pub home_id: String,
    pub home_name: String,
    pub role: MemberRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub id: String,
    pub sender_email: String,
    pub receiver_email: String,
    pub home_id: String,
    pub home_name: String,
    pub status: InviteStatus,
    pub sent_at: DateTime<Utc>,
}

impl Invitation {
    pub fn new(sender: &User, receiver_email: &str, home_id: String, home_name: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sender_email: sender.email.clone(),
            receiver_email: receiver_email.trim().to_lowercase(),
            home_id,
            home_name,
            status: InviteStatus::Pending,
            sent_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_puts_owner_first() {
        let owner = User::new("u1", "owner@home.io");
        let mut home = Household::new(&owner);
        home.add_member("kid@home.io");
        home.add_member("kid@home.io");
        home.add_member("gran@home.io");

        let roster = home.roster();
        assert_eq!(roster.len(), 3);
        assert_eq!(roster[0], FamilyMember::owner("owner@home.io"));
        assert_eq!(roster[1], FamilyMember::member("kid@home.io"));
        assert_eq!(roster[2].role, MemberRole::Member);
    }

    #[test]
    fn test_invitation_lowercases_receiver() {
        let sender = User::new("u1", "owner@home.io");
        let invite = Invitation::new(&sender, " Kid@Home.IO ", "u1".into(), "Beach".into());
        assert_eq!(invite.receiver_email, "kid@home.io");
        assert_eq!(invite.status, InviteStatus::Pending);
    }
}
