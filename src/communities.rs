//! Communities, their members and join requests

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::{debug, info};

use crate::models::{
    Community, CommunitySummary, JoinOutcome, JoinRequest, LeaveOutcome, Membership, NewCommunity,
    Post, RequestAction, RequestStatus, Role, UserId,
};
use crate::{BobaError, Result};

/// Which communities a listing returns
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListScope {
    /// Case-insensitive substring of name or description, any visibility
    Search(String),
    /// Communities the viewer belongs to
    Mine,
    Public,
}

#[derive(Debug, Default)]
pub struct CommunityDirectory {
    communities: BTreeMap<u64, Community>,
    members: Vec<Membership>,
    requests: Vec<JoinRequest>,
    next_community_id: u64,
    next_request_id: u64,
}

impl CommunityDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn community(&self, community_id: u64) -> Result<&Community> {
        self.communities
            .get(&community_id)
            .ok_or_else(|| BobaError::not_found("Community not found"))
    }

    fn membership(&self, community_id: u64, user_id: UserId) -> Option<&Membership> {
        self.members
            .iter()
            .find(|m| m.community_id == community_id && m.user_id == user_id)
    }

    #[must_use]
    pub fn is_member(&self, community_id: u64, user_id: UserId) -> bool {
        self.membership(community_id, user_id).is_some()
    }

    fn require_admin(&self, community_id: u64, user_id: UserId) -> Result<()> {
        match self.membership(community_id, user_id) {
            Some(m) if m.role == Role::Admin => Ok(()),
            _ => Err(BobaError::forbidden("Not a community admin")),
        }
    }

    fn add_member(&mut self, community_id: u64, user_id: UserId, role: Role) {
        self.members.push(Membership {
            community_id,
            user_id,
            role,
            joined_at: Utc::now(),
        });
    }

    fn summary(&self, community: &Community, viewer: Option<UserId>) -> CommunitySummary {
        let member_count = self
            .members
            .iter()
            .filter(|m| m.community_id == community.id)
            .count();
        let role = viewer
            .and_then(|user| self.membership(community.id, user))
            .map(|m| m.role);
        let has_pending_request = role.is_none()
            && viewer.is_some_and(|user| self.pending_request(community.id, user).is_some());

        CommunitySummary {
            community: community.clone(),
            member_count,
            is_member: role.is_some(),
            user_role: role,
            has_pending_request,
        }
    }

    fn pending_request(&self, community_id: u64, user_id: UserId) -> Option<&JoinRequest> {
        self.requests.iter().find(|r| {
            r.community_id == community_id
                && r.user_id == user_id
                && r.status == RequestStatus::Pending
        })
    }

    /// Create a community with `user_id` as its admin
    pub fn create(&mut self, user_id: UserId, input: NewCommunity) -> Result<CommunitySummary> {
        let name = input.name.as_deref().map(str::trim).unwrap_or_default();
        if name.chars().count() < 2 {
            return Err(BobaError::validation(
                "Community name must be at least 2 characters",
            ));
        }

        self.next_community_id += 1;
        let community = Community {
            id: self.next_community_id,
            name: name.to_string(),
            description: input
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            image_url: input.image_url.filter(|u| !u.is_empty()),
            is_public: input.is_public.unwrap_or(true),
            creator_id: user_id,
            created_at: Utc::now(),
        };
        self.add_member(community.id, user_id, Role::Admin);
        info!(
            community_id = community.id,
            user_id,
            public = community.is_public,
            "community created"
        );

        let summary = self.summary(&community, Some(user_id));
        self.communities.insert(community.id, community);
        Ok(summary)
    }

    /// List communities newest first, as seen by `viewer`.
    ///
    /// `Mine` without a viewer falls back to public communities.
    #[must_use]
    pub fn list(&self, scope: &ListScope, viewer: Option<UserId>) -> Vec<CommunitySummary> {
        let newest_first = self.communities.values().rev();
        let selected: Vec<&Community> = match (scope, viewer) {
            (ListScope::Search(term), _) => {
                let term = term.to_lowercase();
                newest_first
                    .filter(|c| {
                        c.name.to_lowercase().contains(&term)
                            || c
                                .description
                                .as_deref()
                                .is_some_and(|d| d.to_lowercase().contains(&term))
                    })
                    .collect()
            }
            (ListScope::Mine, Some(user)) => newest_first
                .filter(|c| self.is_member(c.id, user))
                .collect(),
            _ => newest_first.filter(|c| c.is_public).collect(),
        };

        selected
            .into_iter()
            .map(|c| self.summary(c, viewer))
            .collect()
    }

    /// Join a public community or file a request for a private one
    pub fn join(
        &mut self,
        user_id: UserId,
        community_id: u64,
        message: Option<String>,
    ) -> Result<JoinOutcome> {
        let is_public = self.community(community_id)?.is_public;
        if self.is_member(community_id, user_id) {
            return Err(BobaError::conflict("Already a member"));
        }

        if is_public {
            self.add_member(community_id, user_id, Role::Member);
            info!(community_id, user_id, "joined community");
            return Ok(JoinOutcome::Joined);
        }

        if self.pending_request(community_id, user_id).is_some() {
            return Err(BobaError::conflict("Request already pending"));
        }

        self.next_request_id += 1;
        self.requests.push(JoinRequest {
            id: self.next_request_id,
            community_id,
            user_id,
            status: RequestStatus::Pending,
            message: message.filter(|m| !m.trim().is_empty()),
            created_at: Utc::now(),
            responded_at: None,
            responded_by: None,
        });
        info!(community_id, user_id, "join request filed");
        Ok(JoinOutcome::Pending)
    }

    /// Leave a community. The creator leaving deletes it with its members
    /// and requests; the caller drops the linked posts.
    pub fn leave(&mut self, user_id: UserId, community_id: u64) -> Result<LeaveOutcome> {
        let creator_id = self.community(community_id)?.creator_id;

        if creator_id == user_id {
            self.communities.remove(&community_id);
            self.members.retain(|m| m.community_id != community_id);
            self.requests.retain(|r| r.community_id != community_id);
            info!(community_id, user_id, "community deleted by its creator");
            return Ok(LeaveOutcome::Deleted);
        }

        self.members
            .retain(|m| !(m.community_id == community_id && m.user_id == user_id));
        debug!(community_id, user_id, "left community");
        Ok(LeaveOutcome::Left)
    }

    /// Pending join requests, admins only
    pub fn pending_requests(&self, user_id: UserId, community_id: u64) -> Result<Vec<JoinRequest>> {
        self.require_admin(community_id, user_id)?;
        Ok(self
            .requests
            .iter()
            .filter(|r| r.community_id == community_id && r.status == RequestStatus::Pending)
            .cloned()
            .collect())
    }

    /// Accept or reject a pending request, admins only
    pub fn respond(
        &mut self,
        user_id: UserId,
        community_id: u64,
        request_id: u64,
        action: RequestAction,
    ) -> Result<JoinRequest> {
        self.require_admin(community_id, user_id)?;

        let request = self
            .requests
            .iter_mut()
            .find(|r| r.id == request_id && r.community_id == community_id)
            .ok_or_else(|| BobaError::not_found("Request not found"))?;
        if request.status != RequestStatus::Pending {
            return Err(BobaError::conflict("Request already processed"));
        }

        request.status = match action {
            RequestAction::Accept => RequestStatus::Accepted,
            RequestAction::Reject => RequestStatus::Rejected,
        };
        request.responded_at = Some(Utc::now());
        request.responded_by = Some(user_id);
        let request = request.clone();

        if action == RequestAction::Accept && !self.is_member(community_id, request.user_id) {
            self.add_member(community_id, request.user_id, Role::Member);
        }
        info!(community_id, request_id, status = ?request.status, "join request answered");
        Ok(request)
    }

    /// Whether `viewer` may see `post`
    #[must_use]
    pub fn can_view_post(&self, post: &Post, viewer: Option<UserId>) -> bool {
        let Some(community_id) = post.community_id else {
            return true;
        };
        match self.communities.get(&community_id) {
            Some(c) if c.is_public => true,
            Some(_) => viewer.is_some_and(|user| self.is_member(community_id, user)),
            None => false,
        }
    }
}
