// Household service - Family membership and invitations
use crate::application::household_repository::{HouseholdError, HouseholdRepository};
use crate::domain::household::{
    FamilyMember, Household, InviteStatus, Invitation, JoinedHome, MemberRole, User,
    DEFAULT_HOME_NAME,
};
use crate::domain::profile::{ProfileUpdate, UserProfile};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeRoster {
    pub home_id: String,
    pub home_name: String,
    pub members: Vec<FamilyMember>,
}

#[derive(Clone)]
pub struct HouseholdService {
    repository: Arc<dyn HouseholdRepository>,
}

impl HouseholdService {
    pub fn new(repository: Arc<dyn HouseholdRepository>) -> Self {
        Self { repository }
    }

    pub async fn register(&self, user: &User) -> Result<(), HouseholdError> {
        self.repository.register_user(user).await
    }

    /// Members of `home_id`. A user's own home that was never saved yet
    /// lists just that user.
    pub async fn roster(&self, user: &User, home_id: &str) -> Result<HomeRoster, HouseholdError> {
        match self.repository.get_household(home_id).await? {
            Some(household) => Ok(HomeRoster {
                home_id: household.id.clone(),
                home_name: household.name.clone(),
                members: household.roster(),
            }),
            None if home_id == user.uid => Ok(HomeRoster {
                home_id: user.uid.clone(),
                home_name: DEFAULT_HOME_NAME.to_string(),
                members: vec![FamilyMember::owner(&user.email)],
            }),
            None => Err(HouseholdError::HomeNotFound(home_id.to_string())),
        }
    }

    /// Homes the user can switch between: their own first, then every home
    /// they joined, named after the household's current name.
    pub async fn homes(&self, user: &User) -> Result<Vec<JoinedHome>, HouseholdError> {
        let own_name = match self.repository.get_household(&user.uid).await? {
            Some(household) => household.name,
            None => DEFAULT_HOME_NAME.to_string(),
        };
        let mut homes = vec![JoinedHome {
            home_id: user.uid.clone(),
            home_name: own_name,
            role: MemberRole::Owner,
        }];

        for joined in self.repository.joined_homes(&user.uid).await? {
            if joined.home_id == user.uid {
                continue;
            }
            let home_name = match self.repository.get_household(&joined.home_id).await? {
                Some(household) => household.name,
                None => joined.home_name.clone(),
            };
            homes.push(JoinedHome { home_name, ..joined });
        }

        Ok(homes)
    }

    pub async fn profile(&self, user: &User) -> Result<UserProfile, HouseholdError> {
        Ok(self
            .repository
            .get_profile(&user.uid)
            .await?
            .unwrap_or_else(|| UserProfile::blank(user)))
    }

    pub async fn update_profile(&self, user: &User, update: ProfileUpdate) -> Result<UserProfile, HouseholdError> {
        let mut profile = self.profile(user).await?;
        profile.merge(user, update);
        self.repository.save_profile(profile.clone()).await?;
        tracing::debug!("Updated profile of {}", user.email);
        Ok(profile)
    }

    /// The user's own household, created on first use
    pub async fn ensure_household(&self, owner: &User) -> Result<Household, HouseholdError> {
        if let Some(existing) = self.repository.get_household(&owner.uid).await? {
            return Ok(existing);
        }
        let household = Household::new(owner);
        self.repository.save_household(household.clone()).await?;
        tracing::info!("Created household {} for {}", household.id, owner.email);
        Ok(household)
    }

    pub async fn send_invite(
        &self,
        sender: &User,
        receiver_email: &str,
        home_name: &str,
    ) -> Result<Invitation, HouseholdError> {
        let household = self.ensure_household(sender).await?;
        let invitation = Invitation::new(sender, receiver_email, household.id, home_name.to_string());
        self.repository.save_invitation(invitation.clone()).await?;
        tracing::info!(
            "{} invited {} to home {}",
            sender.email,
            invitation.receiver_email,
            invitation.home_id
        );
        Ok(invitation)
    }

    pub async fn incoming_invites(&self, user: &User) -> Result<Vec<Invitation>, HouseholdError> {
        self.repository
            .pending_invitations(&user.email.to_lowercase())
            .await
    }

    pub async fn respond(&self, user: &User, invite_id: &str, accept: bool) -> Result<Invitation, HouseholdError> {
        let mut invitation = self
            .repository
            .get_invitation(invite_id)
            .await?
            .ok_or_else(|| HouseholdError::InviteNotFound(invite_id.to_string()))?;
        if invitation.receiver_email != user.email.to_lowercase() {
            return Err(HouseholdError::NotInvitee(invite_id.to_string()));
        }
        if invitation.status != InviteStatus::Pending {
            return Err(HouseholdError::InviteClosed(invite_id.to_string()));
        }

        invitation.status = if accept {
            InviteStatus::Accepted
        } else {
            InviteStatus::Rejected
        };
        self.repository.save_invitation(invitation.clone()).await?;

        if accept {
            let mut household = self
                .repository
                .get_household(&invitation.home_id)
                .await?
                .ok_or_else(|| HouseholdError::HomeNotFound(invitation.home_id.clone()))?;
            household.add_member(&user.email);
            self.repository.save_household(household).await?;

            let mut homes = self.repository.joined_homes(&user.uid).await?;
            if !homes.iter().any(|h| h.home_id == invitation.home_id) {
                homes.push(JoinedHome {
                    home_id: invitation.home_id.clone(),
                    home_name: invitation.home_name.clone(),
                    role: MemberRole::Member,
                });
            }
            self.repository.save_joined_homes(&user.uid, homes).await?;
            tracing::info!("{} joined home {}", user.email, invitation.home_id);
        }

        Ok(invitation)
    }

    pub async fn rename_home(&self, owner: &User, name: &str) -> Result<Household, HouseholdError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(HouseholdError::EmptyName);
        }

        let mut household = self.ensure_household(owner).await?;
        household.name = name.to_string();
        self.repository.save_household(household.clone()).await?;

        let mut homes = self.repository.joined_homes(&owner.uid).await?;
        for home in homes.iter_mut().filter(|h| h.home_id == owner.uid) {
            home.home_name = name.to_string();
        }
        self.repository.save_joined_homes(&owner.uid, homes).await?;

        Ok(household)
    }

    pub async fn leave_home(&self, user: &User, home_id: &str) -> Result<(), HouseholdError> {
        if home_id == user.uid {
            return Err(HouseholdError::OwnHome);
        }

        let mut household = self
            .repository
            .get_household(home_id)
            .await?
            .ok_or_else(|| HouseholdError::HomeNotFound(home_id.to_string()))?;
        household.remove_member(&user.email);
        self.repository.save_household(household).await?;

        let mut homes = self.repository.joined_homes(&user.uid).await?;
        homes.retain(|h| h.home_id != home_id);
        self.repository.save_joined_homes(&user.uid, homes).await?;

        tracing::info!("{} left home {}", user.email, home_id);
        Ok(())
    }

    /// Owner-only: drop `email` from the owner's household and from that
    /// member's list of joined homes.
    pub async fn remove_member(&self, owner: &User, home_id: &str, email: &str) -> Result<(), HouseholdError> {
        if home_id != owner.uid {
            return Err(HouseholdError::NotOwner(home_id.to_string()));
        }

        let mut household = self
            .repository
            .get_household(home_id)
            .await?
            .ok_or_else(|| HouseholdError::HomeNotFound(home_id.to_string()))?;
        household.remove_member(email);
        self.repository.save_household(household).await?;

        match self.repository.find_user_by_email(email).await? {
            Some(member) => {
                let mut homes = self.repository.joined_homes(&member.uid).await?;
                homes.retain(|h| h.home_id != home_id);
                self.repository.save_joined_homes(&member.uid, homes).await?;
            }
            None => {
                tracing::warn!("No profile for {}, removed from home {} only", email, home_id);
            }
        }

        Ok(())
    }
}
