// Repository trait for households, invitations and user profiles
use crate::domain::household::{Household, Invitation, JoinedHome, User};
use crate::domain::profile::UserProfile;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HouseholdError {
    #[error("household not found: {0}")]
    HomeNotFound(String),

    #[error("invitation not found: {0}")]
    InviteNotFound(String),

    #[error("invitation {0} was already answered")]
    InviteClosed(String),

    #[error("invitation {0} is addressed to someone else")]
    NotInvitee(String),

    #[error("only the owner can change household {0}")]
    NotOwner(String),

    #[error("cannot leave your own household")]
    OwnHome,

    #[error("home name must not be empty")]
    EmptyName,
}

#[async_trait]
pub trait HouseholdRepository: Send + Sync {
    async fn get_household(&self, home_id: &str) -> Result<Option<Household>, HouseholdError>;

    async fn save_household(&self, household: Household) -> Result<(), HouseholdError>;

    async fn get_invitation(&self, id: &str) -> Result<Option<Invitation>, HouseholdError>;

    async fn save_invitation(&self, invitation: Invitation) -> Result<(), HouseholdError>;

    /// Pending invitations addressed to `email`
    async fn pending_invitations(&self, email: &str) -> Result<Vec<Invitation>, HouseholdError>;

    async fn joined_homes(&self, uid: &str) -> Result<Vec<JoinedHome>, HouseholdError>;

    async fn save_joined_homes(&self, uid: &str, homes: Vec<JoinedHome>) -> Result<(), HouseholdError>;

    /// Records a signed-in user so members can be found by email
    async fn register_user(&self, user: &User) -> Result<(), HouseholdError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, HouseholdError>;

    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, HouseholdError>;

    async fn save_profile(&self, profile: UserProfile) -> Result<(), HouseholdError>;
}
