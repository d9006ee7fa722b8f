// In-memory household store
use crate::application::household_repository::{HouseholdError, HouseholdRepository};
use crate::domain::household::{Household, InviteStatus, Invitation, JoinedHome, User};
use crate::domain::profile::UserProfile;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Collections {
    households: HashMap<String, Household>,
    invitations: HashMap<String, Invitation>,
    joined_homes: HashMap<String, Vec<JoinedHome>>,
    users: HashMap<String, User>,
    profiles: HashMap<String, UserProfile>,
}

#[derive(Default)]
pub struct InMemoryHouseholdStore {
    inner: RwLock<Collections>,
}

impl InMemoryHouseholdStore {
    pub fn with_households(households: Vec<Household>) -> Self {
        let collections = Collections {
            households: households.into_iter().map(|h| (h.id.clone(), h)).collect(),
            ..Collections::default()
        };
        Self {
            inner: RwLock::new(collections),
        }
    }
}

#[async_trait]
impl HouseholdRepository for InMemoryHouseholdStore {
    async fn get_household(&self, home_id: &str) -> Result<Option<Household>, HouseholdError> {
        Ok(self.inner.read().await.households.get(home_id).cloned())
    }

    async fn save_household(&self, household: Household) -> Result<(), HouseholdError> {
        self.inner
            .write()
            .await
            .households
            .insert(household.id.clone(), household);
        Ok(())
    }

    async fn get_invitation(&self, id: &str) -> Result<Option<Invitation>, HouseholdError> {
        Ok(self.inner.read().await.invitations.get(id).cloned())
    }

    async fn save_invitation(&self, invitation: Invitation) -> Result<(), HouseholdError> {
        self.inner
            .write()
            .await
            .invitations
            .insert(invitation.id.clone(), invitation);
        Ok(())
    }

    async fn pending_invitations(&self, email: &str) -> Result<Vec<Invitation>, HouseholdError> {
        let inner = self.inner.read().await;
        let mut pending: Vec<Invitation> = inner
            .invitations
            .values()
            .filter(|i| i.receiver_email == email && i.status == InviteStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by_key(|i| i.sent_at);
        Ok(pending)
    }

    async fn joined_homes(&self, uid: &str) -> Result<Vec<JoinedHome>, HouseholdError> {
        Ok(self
            .inner
            .read()
            .await
            .joined_homes
            .get(uid)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_joined_homes(&self, uid: &str, homes: Vec<JoinedHome>) -> Result<(), HouseholdError> {
        self.inner
            .write()
            .await
            .joined_homes
            .insert(uid.to_string(), homes);
        Ok(())
    }

    async fn register_user(&self, user: &User) -> Result<(), HouseholdError> {
        self.inner
            .write()
            .await
            .users
            .insert(user.uid.clone(), user.clone());
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, HouseholdError> {
        let email = email.to_lowercase();
        Ok(self
            .inner
            .read()
            .await
            .users
            .values()
            .find(|u| u.email.to_lowercase() == email)
            .cloned())
    }

    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, HouseholdError> {
        Ok(self.inner.read().await.profiles.get(uid).cloned())
    }

    async fn save_profile(&self, profile: UserProfile) -> Result<(), HouseholdError> {
        self.inner
            .write()
            .await
            .profiles
            .insert(profile.uid.clone(), profile);
        Ok(())
    }
}
