use std::fs;
use std::path::PathBuf;

use serde_json::{json, Value};

use pitchside::envelope::{lenient_vec, pick_string, unwrap_envelope};
use pitchside::model::{GoalEvent, Match, MatchRosters, MatchStatus, Tournament, TournamentFormat};

fn read_fixture(name: &str) -> Value {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    let raw = fs::read_to_string(path).expect("fixture file should be readable");
    serde_json::from_str(&raw).expect("fixture should be valid json")
}

#[test]
fn envelope_unwraps_data_field() {
    let wrapped = json!({ "success": true, "count": 1, "data": [ { "id": "x" } ] });
    assert_eq!(unwrap_envelope(wrapped), json!([ { "id": "x" } ]));
}

#[test]
fn envelope_passes_bare_body_through() {
    let bare = json!([ { "id": "x" } ]);
    assert_eq!(unwrap_envelope(bare.clone()), bare);

    let object = json!({ "id": "x", "name": "no envelope here" });
    assert_eq!(unwrap_envelope(object.clone()), object);
}

#[test]
fn parses_wrapped_tournaments_fixture() {
    let body = unwrap_envelope(read_fixture("tournaments_wrapped.json"));
    let tournaments: Vec<Tournament> = lenient_vec(&body);
    assert_eq!(tournaments.len(), 2);
    assert_eq!(tournaments[0].share_code, "SUMCUP");
    assert_eq!(tournaments[0].format, TournamentFormat::League);
    assert!(tournaments[0].is_public);
    assert!(tournaments[1].description.is_none());
    assert!(!tournaments[1].is_public);
}

#[test]
fn parses_bare_matches_fixture_and_skips_broken_row() {
    let body = unwrap_envelope(read_fixture("matches_bare.json"));
    let matches: Vec<Match> = lenient_vec(&body);
    // The third row has no team ids and must be skipped, not fail the list.
    assert_eq!(matches.len(), 2);

    let played = &matches[0];
    assert_eq!(played.status, MatchStatus::Completed);
    assert_eq!(played.home_score, Some(2));
    assert_eq!(played.tournament_id.as_deref(), Some("t-100"));
    assert_eq!(played.sports_field_name.as_deref(), Some("Pitch 1"));
    let stats = played.statistics.as_ref().expect("statistics block");
    assert_eq!(stats.possession.home, 55);
    assert_eq!(stats.shots.away, 6);
    let meta = played.metadata.as_ref().expect("metadata block");
    assert_eq!(meta.match_number, Some(3));

    let scheduled = &matches[1];
    assert_eq!(scheduled.status, MatchStatus::Scheduled);
    assert!(scheduled.home_score.is_none());
    assert!(scheduled.statistics.is_none());
}

#[test]
fn parses_rosters_fixture_with_starter_partition() {
    let body = unwrap_envelope(read_fixture("rosters.json"));
    let rosters: MatchRosters = serde_json::from_value(body).expect("rosters should parse");

    let home = rosters.home_team.expect("home side");
    assert_eq!(home.players.len(), 3);
    assert_eq!(home.starters().count(), 2);
    assert_eq!(home.substitutes().count(), 1);
    assert_eq!(home.logo.as_deref(), Some("https://cdn.example/hawks.png"));

    let away = rosters.away_team.expect("away side");
    assert!(away.logo.is_none());
    assert_eq!(away.players[0].full_name(), "Marek Zielinski");
}

#[test]
fn goal_scorers_default_to_single_goal() {
    let body = unwrap_envelope(read_fixture("goal_scorers.json"));
    let events: Vec<GoalEvent> = lenient_vec(&body);
    assert_eq!(events.len(), 4);
    // goals_count absent means one goal.
    assert_eq!(events[2].goals_count, 1);
    assert!(!events[2].is_own_goal);
    // Rows without a player id still parse; the stats engine skips them.
    assert!(events[3].player_id.is_none());
}

#[test]
fn non_array_collection_parses_as_empty() {
    let events: Vec<GoalEvent> = lenient_vec(&Value::Null);
    assert!(events.is_empty());

    let events: Vec<GoalEvent> = lenient_vec(&json!({ "unexpected": "object" }));
    assert!(events.is_empty());

    let events: Vec<GoalEvent> = lenient_vec(&json!("not a list"));
    assert!(events.is_empty());
}

#[test]
fn picks_backend_error_message() {
    let body = json!({ "success": false, "message": "tournament not found" });
    assert_eq!(
        pick_string(&body, &["message", "error"]).as_deref(),
        Some("tournament not found")
    );

    let body = json!({ "error": "boom" });
    assert_eq!(pick_string(&body, &["message", "error"]).as_deref(), Some("boom"));
    assert!(pick_string(&json!({ "message": "  " }), &["message"]).is_none());
}
