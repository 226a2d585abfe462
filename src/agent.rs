//! Agent records and credentials.
//!
//! Agents register with a display name, get an API key for bearer auth and a
//! claim token a human owner uses to take ownership. Budget and score are cached
//! projections of the agent's team and are only written by the store alongside
//! the team write they derive from.

use crate::types::{AgentId, Money, Timestamp};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const API_KEY_PREFIX: &str = "fpl_";
pub const CLAIM_TOKEN_PREFIX: &str = "fpl_claim_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    PendingClaim,
    Claimed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing)]
    pub api_key: String,
    #[serde(skip_serializing)]
    pub claim_token: String,
    pub claim_status: ClaimStatus,
    pub owner_email: Option<String>,
    pub last_active: Timestamp,
    pub remaining_budget: Money,
    pub score: u64,
    pub created_at: Timestamp,
}

// returned once at registration. the key is never shown again.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub agent_id: AgentId,
    pub name: String,
    pub api_key: String,
    pub claim_token: String,
    pub claim_url: String,
    pub budget: Money,
}

pub fn generate_api_key() -> String {
    format!("{API_KEY_PREFIX}{}", random_token(32))
}

pub fn generate_claim_token() -> String {
    format!("{CLAIM_TOKEN_PREFIX}{}", random_token(24))
}

fn random_token(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Accepts either a bare key or an `Authorization` header value.
pub fn extract_api_key(header: &str) -> Option<&str> {
    let key = header.trim();
    let key = match key.strip_prefix("Bearer") {
        // "Bearerxyz" is a bare key, not a scheme
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest.trim_start(),
        _ => key,
    };
    (!key.is_empty()).then_some(key)
}

#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    agents: HashMap<AgentId, Agent>,
    by_key: HashMap<String, AgentId>,
    next_id: u64,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: &str,
        description: &str,
        starting_budget: Money,
        timestamp: Timestamp,
    ) -> Result<&Agent, AgentError> {
        let (name, description) = (name.trim(), description.trim());
        if name.is_empty() || description.is_empty() {
            return Err(AgentError::MissingFields);
        }
        if self.find_by_name(name).is_some() {
            return Err(AgentError::NameTaken(name.to_string()));
        }

        self.next_id += 1;
        let id = AgentId(self.next_id);
        let api_key = generate_api_key();
        let agent = Agent {
            id,
            name: name.to_string(),
            description: description.to_string(),
            api_key: api_key.clone(),
            claim_token: generate_claim_token(),
            claim_status: ClaimStatus::PendingClaim,
            owner_email: None,
            last_active: timestamp,
            remaining_budget: starting_budget,
            score: 0,
            created_at: timestamp,
        };
        self.by_key.insert(api_key, id);
        Ok(self.agents.entry(id).or_insert(agent))
    }

    // names are unique ignoring case
    pub fn find_by_name(&self, name: &str) -> Option<&Agent> {
        self.agents
            .values()
            .find(|a| a.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn find_by_credential(&self, key: &str) -> Option<&Agent> {
        self.by_key.get(key).and_then(|id| self.agents.get(id))
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn touch(&mut self, id: AgentId, timestamp: Timestamp) {
        if let Some(agent) = self.agents.get_mut(&id) {
            agent.last_active = timestamp;
        }
    }

    pub fn update_budget(&mut self, id: AgentId, new_budget: Money) -> Result<(), AgentError> {
        let agent = self
            .agents
            .get_mut(&id)
            .ok_or(AgentError::AgentNotFound(id))?;
        agent.remaining_budget = new_budget;
        Ok(())
    }

    pub fn update_score(&mut self, id: AgentId, score: u64) -> Result<(), AgentError> {
        let agent = self
            .agents
            .get_mut(&id)
            .ok_or(AgentError::AgentNotFound(id))?;
        agent.score = score;
        Ok(())
    }

    pub fn claim(&mut self, token: &str, owner_email: Option<String>) -> Result<&Agent, AgentError> {
        let agent = self
            .agents
            .values_mut()
            .find(|a| a.claim_token == token)
            .ok_or(AgentError::UnknownClaimToken)?;
        if agent.claim_status == ClaimStatus::Claimed {
            return Err(AgentError::AlreadyClaimed(agent.name.clone()));
        }
        agent.claim_status = ClaimStatus::Claimed;
        agent.owner_email = owner_email;
        Ok(agent)
    }

    /// Score descending, then name.
    pub fn leaderboard(&self) -> Vec<&Agent> {
        let mut agents: Vec<&Agent> = self.agents.values().collect();
        agents.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
        agents
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentError {
    #[error("Missing fields: name and description are required")]
    MissingFields,

    #[error("Agent name '{0}' is already taken")]
    NameTaken(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Unknown claim token")]
    UnknownClaimToken,

    #[error("Agent '{0}' has already been claimed")]
    AlreadyClaimed(String),

    #[error("Agent {0} not found")]
    AgentNotFound(AgentId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn budget() -> Money {
        Money::new(dec!(50.0))
    }

    #[test]
    fn register_issues_prefixed_credentials() {
        let mut registry = AgentRegistry::new();
        let agent = registry
            .register("Scout", "picks cheap defenders", budget(), Timestamp::from_millis(0))
            .unwrap();
        assert_eq!(agent.id, AgentId(1));
        assert!(agent.api_key.starts_with(API_KEY_PREFIX));
        assert_eq!(agent.api_key.len(), API_KEY_PREFIX.len() + 32);
        assert!(agent.claim_token.starts_with(CLAIM_TOKEN_PREFIX));
        assert_eq!(agent.claim_token.len(), CLAIM_TOKEN_PREFIX.len() + 24);
        assert_eq!(agent.claim_status, ClaimStatus::PendingClaim);
        assert_eq!(agent.remaining_budget, budget());
    }

    #[test]
    fn names_unique_ignoring_case() {
        let mut registry = AgentRegistry::new();
        registry.register("Scout", "a", budget(), Timestamp::from_millis(0)).unwrap();
        let err = registry
            .register("SCOUT", "b", budget(), Timestamp::from_millis(0))
            .unwrap_err();
        assert_eq!(err, AgentError::NameTaken("SCOUT".into()));
    }

    #[test]
    fn blank_fields_rejected() {
        let mut registry = AgentRegistry::new();
        assert_eq!(
            registry.register("  ", "x", budget(), Timestamp::from_millis(0)).unwrap_err(),
            AgentError::MissingFields
        );
    }

    #[test]
    fn credential_lookup() {
        let mut registry = AgentRegistry::new();
        let key = registry
            .register("Scout", "a", budget(), Timestamp::from_millis(0))
            .unwrap()
            .api_key
            .clone();
        assert_eq!(registry.find_by_credential(&key).unwrap().name, "Scout");
        assert!(registry.find_by_credential("fpl_nope").is_none());
    }

    #[test]
    fn extract_bearer_key() {
        assert_eq!(extract_api_key("Bearer fpl_abc"), Some("fpl_abc"));
        assert_eq!(extract_api_key("fpl_abc"), Some("fpl_abc"));
        assert_eq!(extract_api_key("Bearer   "), None);
        assert_eq!(extract_api_key("Bearer"), None);
        assert_eq!(extract_api_key("  Bearer \tfpl_abc "), Some("fpl_abc"));
        assert_eq!(extract_api_key("Bearerfpl_abc"), Some("Bearerfpl_abc"));
        assert_eq!(extract_api_key(""), None);
    }

    #[test]
    fn claim_once() {
        let mut registry = AgentRegistry::new();
        let token = registry
            .register("Scout", "a", budget(), Timestamp::from_millis(0))
            .unwrap()
            .claim_token
            .clone();
        let agent = registry.claim(&token, Some("owner@example.com".into())).unwrap();
        assert_eq!(agent.claim_status, ClaimStatus::Claimed);
        assert_eq!(
            registry.claim(&token, None).unwrap_err(),
            AgentError::AlreadyClaimed("Scout".into())
        );
        assert_eq!(registry.claim("fpl_claim_x", None).unwrap_err(), AgentError::UnknownClaimToken);
    }

    #[test]
    fn leaderboard_by_score_then_name() {
        let mut registry = AgentRegistry::new();
        for name in ["Cee", "Bee", "Ay"] {
            registry.register(name, "d", budget(), Timestamp::from_millis(0)).unwrap();
        }
        registry.update_score(AgentId(1), 10).unwrap();
        registry.update_score(AgentId(2), 10).unwrap();
        let names: Vec<&str> = registry.leaderboard().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Bee", "Cee", "Ay"]);
    }
}
