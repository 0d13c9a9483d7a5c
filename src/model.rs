use serde::{Deserialize, Serialize};

// Entities mirror the backend's wire shapes: tournament/team/player/standing
// resources use snake_case keys, the match resource uses camelCase. All ids
// are opaque strings and values are replaced wholesale on refetch.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TournamentFormat {
    League,
    Knockout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TournamentStatus {
    Draft,
    Active,
    Completed,
}

impl TournamentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentStatus::Draft => "draft",
            TournamentStatus::Active => "active",
            TournamentStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tournament {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub format: TournamentFormat,
    pub status: TournamentStatus,
    pub share_code: String,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub jersey_number: Option<u32>,
    /// Starter vs substitute partitions the roster display. The partition is
    /// a snapshot at fetch time; recording a substitution does not move a
    /// player between sections.
    #[serde(default)]
    pub is_starter: bool,
}

impl Player {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Scheduled,
    Live,
    Completed,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::Live => "live",
            MatchStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchMetadata {
    #[serde(default)]
    pub round: Option<u32>,
    #[serde(default)]
    pub match_number: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StatPair {
    #[serde(default)]
    pub home: i32,
    #[serde(default)]
    pub away: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchStatistics {
    #[serde(default)]
    pub possession: StatPair,
    #[serde(default)]
    pub shots: StatPair,
    #[serde(default)]
    pub corners: StatPair,
    #[serde(default)]
    pub fouls: StatPair,
    #[serde(default)]
    pub offsides: StatPair,
}

/// A match as served by the backend: team names and logos are denormalized
/// for rendering, scores are absent until the match has been played.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: String,
    #[serde(default)]
    pub tournament_id: Option<String>,
    pub home_team_id: String,
    pub away_team_id: String,
    #[serde(default)]
    pub home_team_name: String,
    #[serde(default)]
    pub away_team_name: String,
    #[serde(default)]
    pub home_team_logo: Option<String>,
    #[serde(default)]
    pub away_team_logo: Option<String>,
    #[serde(default)]
    pub home_score: Option<i32>,
    #[serde(default)]
    pub away_score: Option<i32>,
    pub status: MatchStatus,
    #[serde(default)]
    pub match_date: Option<String>,
    #[serde(default)]
    pub match_order: i64,
    #[serde(default)]
    pub sports_field_id: Option<String>,
    #[serde(default)]
    pub sports_field_name: Option<String>,
    #[serde(default)]
    pub metadata: Option<MatchMetadata>,
    #[serde(default)]
    pub statistics: Option<MatchStatistics>,
}

/// One goal-scorer row. `goals_count` lets the backend batch several goals
/// into a single increment. Rows missing a player id are skipped by the
/// stats engine rather than rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub player_id: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default = "default_goals_count")]
    pub goals_count: u32,
    #[serde(default)]
    pub is_own_goal: bool,
}

fn default_goals_count() -> u32 {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardKind {
    Yellow,
    Red,
}

impl CardKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardKind::Yellow => "yellow",
            CardKind::Red => "red",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub player_id: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
    pub card_type: CardKind,
    #[serde(default)]
    pub minute: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubstitutionEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
    pub player_out_id: String,
    pub player_in_id: String,
    #[serde(default)]
    pub minute: Option<u32>,
}

/// Backend-computed table row. The client renders it verbatim and never
/// recomputes points or goal difference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Standing {
    pub position: u32,
    pub team_id: String,
    pub team_name: String,
    #[serde(default)]
    pub team_logo_url: Option<String>,
    pub points: i32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: i32,
    pub goals_against: i32,
    pub goal_difference: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRoster {
    pub id: String,
    pub name: String,
    #[serde(default, alias = "logo_url")]
    pub logo: Option<String>,
    #[serde(default)]
    pub players: Vec<Player>,
}

impl TeamRoster {
    pub fn starters(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_starter)
    }

    pub fn substitutes(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| !p.is_starter)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRosters {
    #[serde(default)]
    pub home_team: Option<TeamRoster>,
    #[serde(default)]
    pub away_team: Option<TeamRoster>,
}
