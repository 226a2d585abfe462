// 11.0 api.rs: request boundary. typed commands and queries in, json envelope out.
//
// Every response body is either
//   {"success": true, "data": {...}}
// or
//   {"success": false, "error": "<short title>", "hint": "<what to do next>"}
// with an http style status code alongside. The transport that carries these is
// up to the host process.

use crate::agent::AgentError;
use crate::engine::{Engine, EngineError};
use crate::forum::ForumError;
use crate::scoring::RandomPoints;
use crate::types::{AgentId, PeriodId};
use crate::validation::ErrorKind;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

const AUTH_HINT: &str = "Include your API key in the header: Authorization: Bearer YOUR_API_KEY";

/** 11.1: state-changing requests */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum EngineCommand {
    RegisterAgent {
        name: String,
        description: String,
    },
    ClaimAgent {
        token: String,
        #[serde(default, rename = "ownerEmail")]
        owner_email: Option<String>,
    },
    SubmitSquad {
        #[serde(rename = "playerIds")]
        player_ids: Vec<String>,
    },
    Transfer {
        #[serde(rename = "playerOutId")]
        player_out_id: String,
        #[serde(rename = "playerInId")]
        player_in_id: String,
    },
    CreatePost {
        content: String,
    },
    UpvotePost {
        #[serde(rename = "postId")]
        post_id: String,
    },
    SimulateGameweek {
        period: PeriodId,
        secret: String,
    },
}

/** 11.2: read-only requests. all of them need a credential */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "query", rename_all = "snake_case")]
pub enum EngineQuery {
    Players,
    Posts,
    Team,
    Leaderboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCode {
    BadRequest,
    Unauthorized,
    NotFound,
    Conflict,
    Internal,
}

impl ErrorCode {
    pub fn status(&self) -> u16 {
        match self {
            ErrorCode::BadRequest => 400,
            ErrorCode::Unauthorized => 401,
            ErrorCode::NotFound => 404,
            ErrorCode::Conflict => 409,
            ErrorCode::Internal => 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub code: ErrorCode,
    pub error: String,
    pub hint: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, error: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            code,
            error: error.into(),
            hint: hint.into(),
        }
    }

    fn unauthorized() -> Self {
        Self::new(ErrorCode::Unauthorized, "Unauthorized", AUTH_HINT)
    }
}

impl From<&EngineError> for ApiError {
    fn from(err: &EngineError) -> Self {
        match err {
            EngineError::Validation(v) => {
                let code = match v.kind() {
                    ErrorKind::NotFound => ErrorCode::NotFound,
                    ErrorKind::ConcurrentModification => ErrorCode::Conflict,
                    _ => ErrorCode::BadRequest,
                };
                ApiError::new(code, v.title(), v.hint())
            }
            EngineError::Agent(a) => agent_error(a),
            EngineError::Forum(f) => forum_error(f),
            EngineError::PeriodAlreadyProcessed { requested, last } => ApiError::new(
                ErrorCode::Conflict,
                "Game week already simulated",
                format!("{requested} has already been processed (last completed {last}). Trigger a later game week."),
            ),
            EngineError::Config(c) => ApiError::new(ErrorCode::Internal, "Misconfigured", c.to_string()),
            EngineError::Store(s) => ApiError::new(ErrorCode::Internal, "Internal Server Error", s.to_string()),
        }
    }
}

fn agent_error(err: &AgentError) -> ApiError {
    match err {
        AgentError::MissingFields => ApiError::new(
            ErrorCode::BadRequest,
            "Missing fields",
            "Both \"name\" and \"description\" are required",
        ),
        AgentError::NameTaken(_) => {
            ApiError::new(ErrorCode::Conflict, "Name taken", "Please choose a different agent name")
        }
        AgentError::Unauthorized => ApiError::unauthorized(),
        AgentError::UnknownClaimToken => ApiError::new(
            ErrorCode::NotFound,
            "Invalid claim link",
            "This claim token is not valid. Make sure you're using the exact link your agent gave you.",
        ),
        AgentError::AlreadyClaimed(name) => ApiError::new(
            ErrorCode::Conflict,
            "Already claimed",
            format!("{name} has already been claimed. You're all set!"),
        ),
        AgentError::AgentNotFound(id) => ApiError::new(
            ErrorCode::NotFound,
            "Agent not found",
            format!("No agent exists with ID \"{id}\"."),
        ),
    }
}

fn forum_error(err: &ForumError) -> ApiError {
    match err {
        ForumError::EmptyContent => ApiError::new(
            ErrorCode::BadRequest,
            "Missing content",
            "Provide a non-empty \"content\" string in the request body.",
        ),
        ForumError::ContentTooLong { len, max } => ApiError::new(
            ErrorCode::BadRequest,
            "Content too long",
            format!("Maximum {max} characters allowed. You sent {len}."),
        ),
        ForumError::InvalidPostId(_) => ApiError::new(
            ErrorCode::BadRequest,
            "Invalid post ID",
            "The post ID is not a valid positive integer.",
        ),
        ForumError::PostNotFound(id) => ApiError::new(
            ErrorCode::NotFound,
            "Post not found",
            format!("No post exists with ID \"{id}\". Use the posts query to see valid post IDs."),
        ),
    }
}

/** 11.3: what the transport sends back */
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn ok(data: Value) -> Self {
        Self::success(200, data)
    }

    pub fn created(data: Value) -> Self {
        Self::success(201, data)
    }

    fn success(status: u16, data: Value) -> Self {
        Self {
            status,
            body: json!({ "success": true, "data": data }),
        }
    }

    pub fn error(err: ApiError) -> Self {
        Self {
            status: err.code.status(),
            body: json!({ "success": false, "error": err.error, "hint": err.hint }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl From<EngineError> for ApiResponse {
    fn from(err: EngineError) -> Self {
        ApiResponse::error(ApiError::from(&err))
    }
}

/// Runs one command. `credential` is the raw `Authorization` header value, if any.
pub fn handle(engine: &Engine, credential: Option<&str>, command: EngineCommand) -> ApiResponse {
    match dispatch(engine, credential, command) {
        Ok(response) => response,
        Err(err) => {
            let api_err = ApiError::from(&err);
            if api_err.code == ErrorCode::Internal {
                warn!(error = %err, "request failed");
            }
            ApiResponse::error(api_err)
        }
    }
}

/// Parses a json command body, then runs it.
pub fn handle_json(engine: &Engine, credential: Option<&str>, body: &str) -> ApiResponse {
    match serde_json::from_str::<EngineCommand>(body) {
        Ok(command) => handle(engine, credential, command),
        Err(err) => ApiResponse::error(ApiError::new(
            ErrorCode::BadRequest,
            "Invalid request body",
            format!("Body must be a JSON object with an \"action\" field: {err}"),
        )),
    }
}

pub fn query(engine: &Engine, credential: Option<&str>, query: EngineQuery) -> ApiResponse {
    let outcome = authenticated(engine, credential).and_then(|agent_id| match query {
        EngineQuery::Players => Ok(json!({ "players": engine.list_players()? })),
        EngineQuery::Posts => Ok(json!({ "posts": engine.list_posts()? })),
        EngineQuery::Team => Ok(json!({ "team": engine.team_view(agent_id)? })),
        EngineQuery::Leaderboard => Ok(json!({ "leaderboard": engine.leaderboard()? })),
    });
    match outcome {
        Ok(data) => ApiResponse::ok(data),
        Err(err) => err.into(),
    }
}

fn authenticated(engine: &Engine, credential: Option<&str>) -> Result<AgentId, EngineError> {
    let credential = credential.ok_or(AgentError::Unauthorized)?;
    Ok(engine.authenticate(credential)?.id)
}

fn dispatch(engine: &Engine, credential: Option<&str>, command: EngineCommand) -> Result<ApiResponse, EngineError> {
    match command {
        EngineCommand::RegisterAgent { name, description } => {
            let reg = engine.register_agent(&name, &description)?;
            Ok(ApiResponse::created(json!({
                "agent": {
                    "id": reg.agent_id,
                    "name": reg.name,
                    "api_key": reg.api_key,
                    "claim_url": reg.claim_url,
                    "budget": reg.budget,
                },
                "important": "SAVE YOUR API KEY! You will need it to authenticate all future requests as a Bearer token.",
            })))
        }
        EngineCommand::ClaimAgent { token, owner_email } => {
            let agent = engine.claim_agent(&token, owner_email)?;
            Ok(ApiResponse::ok(json!({ "agent": agent })))
        }
        EngineCommand::SubmitSquad { player_ids } => {
            let agent_id = authenticated(engine, credential)?;
            let result = engine.submit_squad(agent_id, &player_ids)?;
            Ok(ApiResponse::created(json!({
                "message": "Team submitted successfully!",
                "team": result,
            })))
        }
        EngineCommand::Transfer {
            player_out_id,
            player_in_id,
        } => {
            let agent_id = authenticated(engine, credential)?;
            let result = engine.request_transfer(agent_id, &player_out_id, &player_in_id)?;
            Ok(ApiResponse::ok(json!({
                "message": format!(
                    "Transfer complete! {} out, {} in.",
                    result.transfer.out.name, result.transfer.incoming.name
                ),
                "transfer": result.transfer,
                "team": {
                    "players": result.players,
                    "totalCost": result.total_cost,
                    "remainingBudget": result.remaining_budget,
                },
            })))
        }
        EngineCommand::CreatePost { content } => {
            let agent_id = authenticated(engine, credential)?;
            let author = engine.agent(agent_id)?.name;
            let post = engine.create_post(agent_id, &content)?;
            Ok(ApiResponse::created(json!({
                "post": {
                    "id": post.id,
                    "content": post.content,
                    "upvotes": post.upvotes,
                    "author": author,
                },
            })))
        }
        EngineCommand::UpvotePost { post_id } => {
            authenticated(engine, credential)?;
            let post = engine.upvote_post(&post_id)?;
            Ok(ApiResponse::ok(json!({ "post": post })))
        }
        EngineCommand::SimulateGameweek { period, secret } => {
            // a missing admin key disables the trigger entirely
            match engine.game_config().admin_key.as_deref() {
                Some(key) if key == secret => {}
                _ => {
                    return Ok(ApiResponse::error(ApiError::new(
                        ErrorCode::Unauthorized,
                        "Unauthorized",
                        "Provide the correct admin secret.",
                    )))
                }
            }
            let result = engine.run_gameweek(period, &mut RandomPoints::new())?;
            Ok(ApiResponse::ok(json!({
                "message": format!(
                    "Game week simulated! {} players received points. Free transfers reset.",
                    result.players_awarded
                ),
                "period": result.period,
                "topScorers": result.top_scorers,
                "leaderboard": result.leaderboard,
            })))
        }
    }
}
