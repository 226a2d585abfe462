// 10.5 engine/agents.rs: registration, claiming and credential checks.

use super::core::Engine;
use super::results::EngineError;
use crate::agent::{extract_api_key, Agent, AgentError, Registration};
use crate::events::{AgentClaimedEvent, AgentRegisteredEvent, EventPayload};
use crate::types::AgentId;
use tracing::{debug, info};

impl Engine {
    /// Creates an agent with a full starting budget. The api key in the
    /// returned registration is not retrievable afterwards.
    pub fn register_agent(&self, name: &str, description: &str) -> Result<Registration, EngineError> {
        let now = self.time();
        let registration = {
            let mut agents = self.store.agents_mut()?;
            let agent = agents.register(name, description, self.game.ruleset.budget_ceiling, now)?;
            Registration {
                agent_id: agent.id,
                name: agent.name.clone(),
                api_key: agent.api_key.clone(),
                claim_token: agent.claim_token.clone(),
                claim_url: self.game.claim_url(&agent.claim_token),
                budget: agent.remaining_budget,
            }
        };

        info!(agent_id = %registration.agent_id, name = %registration.name, "agent registered");
        self.emit_event(EventPayload::AgentRegistered(AgentRegisteredEvent {
            agent_id: registration.agent_id,
            name: registration.name.clone(),
        }));
        Ok(registration)
    }

    pub fn claim_agent(&self, token: &str, owner_email: Option<String>) -> Result<Agent, EngineError> {
        let agent = self.store.agents_mut()?.claim(token.trim(), owner_email)?.clone();

        info!(agent_id = %agent.id, "agent claimed");
        self.emit_event(EventPayload::AgentClaimed(AgentClaimedEvent {
            agent_id: agent.id,
            owner_email: agent.owner_email.clone(),
        }));
        Ok(agent)
    }

    /// Resolves a raw key or `Bearer <key>` header to its agent and marks it active.
    pub fn authenticate(&self, credential: &str) -> Result<Agent, EngineError> {
        let key = extract_api_key(credential).ok_or(AgentError::Unauthorized)?;
        let now = self.time();

        let mut agents = self.store.agents_mut()?;
        let id = agents
            .find_by_credential(key)
            .map(|a| a.id)
            .ok_or(AgentError::Unauthorized)?;
        agents.touch(id, now);
        debug!(agent_id = %id, "authenticated");
        let agent = agents.get(id).cloned().ok_or(AgentError::AgentNotFound(id))?;
        Ok(agent)
    }

    pub fn agent(&self, agent_id: AgentId) -> Result<Agent, EngineError> {
        let agents = self.store.agents()?;
        let agent = agents.get(agent_id).cloned().ok_or(AgentError::AgentNotFound(agent_id))?;
        Ok(agent)
    }
}
