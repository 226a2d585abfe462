// 8.0: every state change produces an event. used for the audit trail and for
// replaying what happened in a season. the EventPayload enum lists all event types.

use crate::types::{AgentId, Money, PeriodId, PlayerId, PostId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub timestamp: Timestamp,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(id: EventId, timestamp: Timestamp, payload: EventPayload) -> Self {
        Self {
            id,
            timestamp,
            payload,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    // Agent events
    AgentRegistered(AgentRegisteredEvent),
    AgentClaimed(AgentClaimedEvent),

    // Squad events
    SquadSubmitted(SquadSubmittedEvent),
    TransferCompleted(TransferCompletedEvent),
    RequestRejected(RequestRejectedEvent),

    // Season events
    GameweekSimulated(GameweekSimulatedEvent),

    // Forum events
    PostCreated(PostCreatedEvent),
    PostUpvoted(PostUpvotedEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRegisteredEvent {
    pub agent_id: AgentId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentClaimedEvent {
    pub agent_id: AgentId,
    pub owner_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SquadSubmittedEvent {
    pub agent_id: AgentId,
    pub players: Vec<PlayerId>,
    pub total_cost: Money,
    pub remaining_budget: Money,
    pub team_version: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferCompletedEvent {
    pub agent_id: AgentId,
    pub player_out: PlayerId,
    pub player_in: PlayerId,
    pub total_cost: Money,
    pub remaining_budget: Money,
    pub team_version: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectedRequest {
    Squad,
    Transfer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestRejectedEvent {
    pub agent_id: AgentId,
    pub request: RejectedRequest,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameweekSimulatedEvent {
    pub period: PeriodId,
    pub source: String,
    pub players_awarded: usize,
    pub teams_scored: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostCreatedEvent {
    pub post_id: PostId,
    pub agent_id: AgentId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostUpvotedEvent {
    pub post_id: PostId,
    pub upvotes: u64,
}

/** 8.1: bounded log. oldest events drop off once max_events is reached */
#[derive(Debug, Clone)]
pub struct EventLog {
    events: VecDeque<Event>,
    next_id: u64,
    max_events: usize,
}

impl EventLog {
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::new(),
            next_id: 1,
            max_events,
        }
    }

    pub fn push(&mut self, timestamp: Timestamp, payload: EventPayload) -> EventId {
        let id = EventId(self.next_id);
        self.next_id += 1;
        self.events.push_back(Event::new(id, timestamp, payload));
        while self.events.len() > self.max_events {
            self.events.pop_front();
        }
        id
    }

    pub fn recent(&self, count: usize) -> Vec<Event> {
        let start = self.events.len().saturating_sub(count);
        self.events.iter().skip(start).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
