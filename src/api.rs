use log::debug;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::config::Config;
use crate::envelope::{lenient_vec, pick_string, unwrap_envelope};
use crate::error::{ApiError, ApiResult};
use crate::http;
use crate::model::{
    CardEvent, CardKind, GoalEvent, Match, MatchRosters, MatchStatus, Standing,
    SubstitutionEvent, Team, TeamRoster, Tournament,
};

/// Every domain operation the backend exposes to this client. The trait is
/// the seam between the sync layer and the network: production code goes
/// through [`ApiClient`], tests substitute a stub.
pub trait RemoteApi: Send + Sync {
    fn fetch_public_tournaments(&self) -> ApiResult<Vec<Tournament>>;
    fn fetch_all_tournaments(&self) -> ApiResult<Vec<Tournament>>;
    fn fetch_tournament_by_share_code(&self, code: &str) -> ApiResult<Tournament>;
    fn fetch_tournament_teams(&self, tournament_id: &str) -> ApiResult<Vec<Team>>;
    fn fetch_tournament_matches(&self, tournament_id: &str) -> ApiResult<Vec<Match>>;
    fn fetch_tournament_standings(&self, tournament_id: &str) -> ApiResult<Vec<Standing>>;
    fn fetch_team_with_roster(&self, team_id: &str) -> ApiResult<TeamRoster>;
    fn fetch_match(&self, match_id: &str) -> ApiResult<Match>;
    fn fetch_match_rosters(&self, match_id: &str) -> ApiResult<MatchRosters>;
    fn fetch_goal_events(&self, match_id: &str) -> ApiResult<Vec<GoalEvent>>;
    fn fetch_card_events(&self, match_id: &str) -> ApiResult<Vec<CardEvent>>;
    fn fetch_substitution_events(&self, match_id: &str) -> ApiResult<Vec<SubstitutionEvent>>;
    fn append_goal_event(
        &self,
        match_id: &str,
        player_id: &str,
        team_id: &str,
        is_own_goal: bool,
    ) -> ApiResult<GoalEvent>;
    fn append_card_event(
        &self,
        match_id: &str,
        player_id: &str,
        team_id: &str,
        kind: CardKind,
        minute: Option<u32>,
    ) -> ApiResult<CardEvent>;
    fn append_substitution_event(
        &self,
        match_id: &str,
        team_id: &str,
        player_out_id: &str,
        player_in_id: &str,
        minute: Option<u32>,
    ) -> ApiResult<SubstitutionEvent>;
    fn set_match_status(&self, match_id: &str, status: MatchStatus) -> ApiResult<Match>;
}

pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    pub fn new(config: &Config) -> ApiResult<Self> {
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client: http::build_client(config.request_timeout)?,
        })
    }

    /// Client against `base_url` using the process-wide default transport.
    pub fn with_shared(base_url: &str) -> ApiResult<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: http::shared_client()?.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn get(&self, path: &str) -> ApiResult<Value> {
        debug!("GET {path}");
        self.execute(self.client.get(self.url(path)))
    }

    fn post(&self, path: &str, body: &Value) -> ApiResult<Value> {
        debug!("POST {path}");
        self.execute(self.client.post(self.url(path)).json(body))
    }

    fn put(&self, path: &str, body: &Value) -> ApiResult<Value> {
        debug!("PUT {path}");
        self.execute(self.client.put(self.url(path)).json(body))
    }

    fn execute(&self, request: RequestBuilder) -> ApiResult<Value> {
        let response = request.send().map_err(ApiError::from_reqwest)?;
        let status = response.status();
        let body = response.text().map_err(ApiError::from_reqwest)?;

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(
                server_message(&body).unwrap_or_else(|| "resource not found".to_string()),
            ));
        }
        if !status.is_success() {
            return Err(ApiError::Server {
                status: status.as_u16(),
                message: server_message(&body)
                    .unwrap_or_else(|| format!("request failed with http {status}")),
            });
        }

        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(Value::Null);
        }
        let value: Value = serde_json::from_str(trimmed)
            .map_err(|err| ApiError::Network(format!("malformed response body: {err}")))?;
        Ok(unwrap_envelope(value))
    }
}

fn server_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    pick_string(&value, &["message", "error"])
}

fn decode<T: serde::de::DeserializeOwned>(what: &str, value: Value) -> ApiResult<T> {
    serde_json::from_value(value)
        .map_err(|err| ApiError::Network(format!("malformed {what} payload: {err}")))
}

impl RemoteApi for ApiClient {
    fn fetch_public_tournaments(&self) -> ApiResult<Vec<Tournament>> {
        let body = self.get("/tournaments?is_public=true")?;
        Ok(lenient_vec(&body))
    }

    fn fetch_all_tournaments(&self) -> ApiResult<Vec<Tournament>> {
        let body = self.get("/tournaments")?;
        Ok(lenient_vec(&body))
    }

    fn fetch_tournament_by_share_code(&self, code: &str) -> ApiResult<Tournament> {
        let body = self.get(&format!("/tournaments/share/{code}"))?;
        decode("tournament", body)
    }

    fn fetch_tournament_teams(&self, tournament_id: &str) -> ApiResult<Vec<Team>> {
        let body = self.get(&format!("/tournaments/{tournament_id}/teams"))?;
        Ok(lenient_vec(&body))
    }

    fn fetch_tournament_matches(&self, tournament_id: &str) -> ApiResult<Vec<Match>> {
        let body = self.get(&format!("/tournaments/{tournament_id}/matches"))?;
        Ok(lenient_vec(&body))
    }

    fn fetch_tournament_standings(&self, tournament_id: &str) -> ApiResult<Vec<Standing>> {
        let body = self.get(&format!("/tournaments/{tournament_id}/standings"))?;
        Ok(lenient_vec(&body))
    }

    fn fetch_team_with_roster(&self, team_id: &str) -> ApiResult<TeamRoster> {
        let body = self.get(&format!("/teams/{team_id}"))?;
        decode("team roster", body)
    }

    fn fetch_match(&self, match_id: &str) -> ApiResult<Match> {
        let body = self.get(&format!("/matches/{match_id}"))?;
        decode("match", body)
    }

    fn fetch_match_rosters(&self, match_id: &str) -> ApiResult<MatchRosters> {
        let body = self.get(&format!("/matches/{match_id}/teams"))?;
        // A missing side renders as an empty column, not an error.
        Ok(serde_json::from_value(body).unwrap_or_default())
    }

    fn fetch_goal_events(&self, match_id: &str) -> ApiResult<Vec<GoalEvent>> {
        let body = self.get(&format!("/matches/{match_id}/goal-scorers"))?;
        Ok(lenient_vec(&body))
    }

    fn fetch_card_events(&self, match_id: &str) -> ApiResult<Vec<CardEvent>> {
        let body = self.get(&format!("/matches/{match_id}/cards"))?;
        Ok(lenient_vec(&body))
    }

    fn fetch_substitution_events(&self, match_id: &str) -> ApiResult<Vec<SubstitutionEvent>> {
        let body = self.get(&format!("/matches/{match_id}/substitutions"))?;
        Ok(lenient_vec(&body))
    }

    fn append_goal_event(
        &self,
        match_id: &str,
        player_id: &str,
        team_id: &str,
        is_own_goal: bool,
    ) -> ApiResult<GoalEvent> {
        let body = json!({
            "player_id": player_id,
            "team_id": team_id,
            "is_own_goal": is_own_goal,
        });
        let value = self.post(&format!("/matches/{match_id}/goal-scorers"), &body)?;
        // The append committed; an unexpected body shape must not look like
        // a failed mutation, so fall back to echoing the request.
        Ok(serde_json::from_value(value).unwrap_or(GoalEvent {
            id: None,
            player_id: Some(player_id.to_string()),
            team_id: Some(team_id.to_string()),
            goals_count: 1,
            is_own_goal,
        }))
    }

    fn append_card_event(
        &self,
        match_id: &str,
        player_id: &str,
        team_id: &str,
        kind: CardKind,
        minute: Option<u32>,
    ) -> ApiResult<CardEvent> {
        let body = json!({
            "player_id": player_id,
            "team_id": team_id,
            "card_type": kind.as_str(),
            "minute": minute,
        });
        let value = self.post(&format!("/matches/{match_id}/cards"), &body)?;
        Ok(serde_json::from_value(value).unwrap_or(CardEvent {
            id: None,
            player_id: Some(player_id.to_string()),
            team_id: Some(team_id.to_string()),
            card_type: kind,
            minute,
        }))
    }

    fn append_substitution_event(
        &self,
        match_id: &str,
        team_id: &str,
        player_out_id: &str,
        player_in_id: &str,
        minute: Option<u32>,
    ) -> ApiResult<SubstitutionEvent> {
        let body = json!({
            "team_id": team_id,
            "player_out_id": player_out_id,
            "player_in_id": player_in_id,
            "minute": minute,
        });
        let value = self.post(&format!("/matches/{match_id}/substitutions"), &body)?;
        Ok(serde_json::from_value(value).unwrap_or(SubstitutionEvent {
            id: None,
            team_id: Some(team_id.to_string()),
            player_out_id: player_out_id.to_string(),
            player_in_id: player_in_id.to_string(),
            minute,
        }))
    }

    fn set_match_status(&self, match_id: &str, status: MatchStatus) -> ApiResult<Match> {
        let body = json!({ "status": status.as_str() });
        let value = self.put(&format!("/matches/{match_id}/result"), &body)?;
        decode("match", value)
    }
}
