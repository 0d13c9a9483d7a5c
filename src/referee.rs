use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::api::RemoteApi;
use crate::cache::{CacheKey, CacheService, RequestOptions};
use crate::error::{ApiError, ApiResult};
use crate::model::{
    CardEvent, CardKind, GoalEvent, Match, MatchRosters, MatchStatus, SubstitutionEvent,
};
use crate::poll::{self, PollHandle};
use crate::stats::{player_stats_from_values, PlayerStats};

/// Live-match data-entry workflow: the reads a referee screen needs and the
/// append mutations it issues, wired to the cascade of cache keys each
/// mutation dirties. Mutations are never retried; a blind re-send of a goal
/// append risks double counting.
pub struct RefereeSession {
    api: Arc<dyn RemoteApi>,
    cache: Arc<CacheService>,
    match_id: String,
    tournament_id: Option<String>,
    options: RequestOptions,
}

impl RefereeSession {
    pub fn new(
        api: Arc<dyn RemoteApi>,
        cache: Arc<CacheService>,
        match_id: impl Into<String>,
        tournament_id: Option<String>,
    ) -> Self {
        // Reads inherit the cache's configured policy, not the built-in
        // defaults, so a tightened stale window reaches every session.
        let options = cache.options();
        Self {
            api,
            cache,
            match_id: match_id.into(),
            tournament_id,
            options,
        }
    }

    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    pub fn match_id(&self) -> &str {
        &self.match_id
    }

    fn cached<T, F>(&self, key: CacheKey, fetch: F) -> ApiResult<T>
    where
        T: DeserializeOwned,
        F: Fn() -> ApiResult<Value>,
    {
        let value = self.cache.request(&key, self.options, fetch)?;
        serde_json::from_value(value)
            .map_err(|err| ApiError::Network(format!("malformed cached payload for {key:?}: {err}")))
    }

    pub fn match_detail(&self) -> ApiResult<Match> {
        self.cached(CacheKey::Match(self.match_id.clone()), || {
            encode(self.api.fetch_match(&self.match_id)?)
        })
    }

    pub fn rosters(&self) -> ApiResult<MatchRosters> {
        self.cached(CacheKey::MatchRosters(self.match_id.clone()), || {
            encode(self.api.fetch_match_rosters(&self.match_id)?)
        })
    }

    pub fn goal_events(&self) -> ApiResult<Vec<GoalEvent>> {
        self.cached(CacheKey::GoalEvents(self.match_id.clone()), || {
            encode(self.api.fetch_goal_events(&self.match_id)?)
        })
    }

    pub fn card_events(&self) -> ApiResult<Vec<CardEvent>> {
        self.cached(CacheKey::CardEvents(self.match_id.clone()), || {
            encode(self.api.fetch_card_events(&self.match_id)?)
        })
    }

    pub fn substitutions(&self) -> ApiResult<Vec<SubstitutionEvent>> {
        self.cached(CacheKey::SubstitutionEvents(self.match_id.clone()), || {
            encode(self.api.fetch_substitution_events(&self.match_id)?)
        })
    }

    /// Warm the four independent reads the screen renders from, in
    /// parallel. A single failed fetch is logged and leaves its key for the
    /// next read; sibling fetches are unaffected.
    pub fn prefetch(&self) {
        rayon::scope(|scope| {
            scope.spawn(|_| log_prefetch("match", self.match_detail().map(|_| ())));
            scope.spawn(|_| log_prefetch("rosters", self.rosters().map(|_| ())));
            scope.spawn(|_| log_prefetch("goal events", self.goal_events().map(|_| ())));
            scope.spawn(|_| log_prefetch("card events", self.card_events().map(|_| ())));
        });
    }

    /// Aggregate a player's goals and cards from whatever the cache holds
    /// right now. Absent collections contribute zeros; this never fetches.
    pub fn player_stats(&self, player_id: &str) -> PlayerStats {
        let goals = self
            .cache
            .read(&CacheKey::GoalEvents(self.match_id.clone()))
            .map(|snapshot| snapshot.value)
            .unwrap_or(Value::Null);
        let cards = self
            .cache
            .read(&CacheKey::CardEvents(self.match_id.clone()))
            .map(|snapshot| snapshot.value)
            .unwrap_or(Value::Null);
        player_stats_from_values(player_id, &goals, &cards)
    }

    /// Record a goal (or own goal). On success the match score, the
    /// tournament's match list and standings, and the goal-event collection
    /// are all dirtied before the caller sees `Ok`, so a follow-up read
    /// never observes the pre-goal score. On failure nothing is touched.
    pub fn record_goal(
        &self,
        player_id: &str,
        team_id: &str,
        is_own_goal: bool,
    ) -> ApiResult<GoalEvent> {
        let event = self
            .api
            .append_goal_event(&self.match_id, player_id, team_id, is_own_goal)?;
        self.cache.invalidate(&CacheKey::Match(self.match_id.clone()));
        if let Some(tournament_id) = &self.tournament_id {
            self.cache
                .invalidate(&CacheKey::TournamentMatches(tournament_id.clone()));
            self.cache
                .invalidate(&CacheKey::TournamentStandings(tournament_id.clone()));
        }
        self.cache
            .invalidate(&CacheKey::GoalEvents(self.match_id.clone()));
        info!(
            "recorded {} for player {player_id} in match {}",
            if is_own_goal { "own goal" } else { "goal" },
            self.match_id
        );
        Ok(event)
    }

    /// Record a card. Only the card-event collection depends on it.
    pub fn record_card(
        &self,
        player_id: &str,
        team_id: &str,
        kind: CardKind,
        minute: Option<u32>,
    ) -> ApiResult<CardEvent> {
        let event =
            self.api
                .append_card_event(&self.match_id, player_id, team_id, kind, minute)?;
        self.cache
            .invalidate(&CacheKey::CardEvents(self.match_id.clone()));
        info!(
            "recorded {} card for player {player_id} in match {}",
            kind.as_str(),
            self.match_id
        );
        Ok(event)
    }

    /// Record a substitution. Dirties the rosters and the substitution
    /// collection. The starter/substitute sections themselves are a fetch
    /// time snapshot and do not move players around.
    pub fn record_substitution(
        &self,
        team_id: &str,
        player_out_id: &str,
        player_in_id: &str,
        minute: Option<u32>,
    ) -> ApiResult<SubstitutionEvent> {
        let event = self.api.append_substitution_event(
            &self.match_id,
            team_id,
            player_out_id,
            player_in_id,
            minute,
        )?;
        self.cache
            .invalidate(&CacheKey::MatchRosters(self.match_id.clone()));
        self.cache
            .invalidate(&CacheKey::SubstitutionEvents(self.match_id.clone()));
        info!(
            "recorded substitution {player_out_id} -> {player_in_id} in match {}",
            self.match_id
        );
        Ok(event)
    }

    /// Move the match through its lifecycle. Dirties the match itself and
    /// the tournament's match list, where the new status is rendered.
    pub fn set_status(&self, status: MatchStatus) -> ApiResult<Match> {
        let updated = self.api.set_match_status(&self.match_id, status)?;
        self.cache.invalidate(&CacheKey::Match(self.match_id.clone()));
        if let Some(tournament_id) = &self.tournament_id {
            self.cache
                .invalidate(&CacheKey::TournamentMatches(tournament_id.clone()));
        }
        info!("match {} is now {}", self.match_id, status.as_str());
        Ok(updated)
    }

    /// Subscribe to background refresh of the screen's reads while it is
    /// visible. Cancel (or drop) the handle on visibility loss.
    pub fn watch(&self, interval: Duration) -> PollHandle {
        let jobs = vec![
            self.poll_job(CacheKey::Match(self.match_id.clone()), |api, id| {
                encode(api.fetch_match(id)?)
            }),
            self.poll_job(CacheKey::MatchRosters(self.match_id.clone()), |api, id| {
                encode(api.fetch_match_rosters(id)?)
            }),
            self.poll_job(CacheKey::GoalEvents(self.match_id.clone()), |api, id| {
                encode(api.fetch_goal_events(id)?)
            }),
            self.poll_job(CacheKey::CardEvents(self.match_id.clone()), |api, id| {
                encode(api.fetch_card_events(id)?)
            }),
        ];
        poll::spawn_refresh(self.cache.clone(), jobs, interval)
    }

    fn poll_job(
        &self,
        key: CacheKey,
        fetch: impl Fn(&dyn RemoteApi, &str) -> ApiResult<Value> + Send + Sync + 'static,
    ) -> poll::PollJob {
        let api = self.api.clone();
        let match_id = self.match_id.clone();
        poll::job(key, move || fetch(api.as_ref(), &match_id))
    }
}

fn encode<T: Serialize>(value: T) -> ApiResult<Value> {
    serde_json::to_value(value)
        .map_err(|err| ApiError::Network(format!("failed to encode payload: {err}")))
}

fn log_prefetch(what: &str, result: ApiResult<()>) {
    if let Err(err) = result {
        warn!("prefetch of {what} failed: {err}");
    }
}
