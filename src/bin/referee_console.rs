use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use env_logger::Env;
use log::info;

use pitchside::api::{ApiClient, RemoteApi};
use pitchside::cache::{CacheKey, CacheService};
use pitchside::config::Config;
use pitchside::model::{Match, TeamRoster};
use pitchside::referee::RefereeSession;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::from_env();
    let api = Arc::new(ApiClient::new(&config)?);
    let cache = Arc::new(CacheService::from_config(&config));

    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("tournaments") => list_tournaments(api.as_ref()),
        Some("tournament") => {
            let code = args.next().context("usage: referee_console tournament <share-code>")?;
            show_tournament(api.as_ref(), &cache, &code)
        }
        Some("referee") => {
            let match_id = args
                .next()
                .context("usage: referee_console referee <match-id> [tournament-id]")?;
            referee_snapshot(api, cache, &config, match_id, args.next())
        }
        _ => {
            eprintln!("usage: referee_console <tournaments | tournament <share-code> | referee <match-id> [tournament-id]>");
            Ok(())
        }
    }
}

fn list_tournaments(api: &dyn RemoteApi) -> Result<()> {
    let tournaments = api.fetch_public_tournaments()?;
    if tournaments.is_empty() {
        println!("no public tournaments");
        return Ok(());
    }
    for tournament in tournaments {
        println!(
            "{:<24} [{}] share code {}",
            tournament.name,
            tournament.status.as_str(),
            tournament.share_code
        );
    }
    Ok(())
}

fn show_tournament(api: &dyn RemoteApi, cache: &CacheService, code: &str) -> Result<()> {
    let tournament = api.fetch_tournament_by_share_code(code)?;
    println!("{} ({})", tournament.name, tournament.share_code);

    let id = tournament.id.clone();
    let matches = cache.request(&CacheKey::TournamentMatches(id.clone()), cache.options(), || {
        let matches = api.fetch_tournament_matches(&id)?;
        serde_json::to_value(matches)
            .map_err(|err| pitchside::error::ApiError::Network(err.to_string()))
    })?;
    let matches: Vec<Match> = serde_json::from_value(matches).unwrap_or_default();
    for m in &matches {
        println!(
            "  {:>3}. {} {} : {} {}  ({})",
            m.match_order,
            m.home_team_name,
            score(m.home_score),
            score(m.away_score),
            m.away_team_name,
            m.match_date.as_deref().map(format_date).unwrap_or_default()
        );
    }

    let standings = api.fetch_tournament_standings(&tournament.id)?;
    if !standings.is_empty() {
        println!("  --- standings ---");
        for row in standings {
            println!(
                "  {:>2}. {:<20} {:>3} pts  {}-{}-{}  gd {:+}",
                row.position,
                row.team_name,
                row.points,
                row.wins,
                row.draws,
                row.losses,
                row.goal_difference
            );
        }
    }
    Ok(())
}

fn referee_snapshot(
    api: Arc<ApiClient>,
    cache: Arc<CacheService>,
    config: &Config,
    match_id: String,
    tournament_id: Option<String>,
) -> Result<()> {
    let session = RefereeSession::new(api, cache, match_id, tournament_id);
    session.prefetch();

    let m = session.match_detail()?;
    println!(
        "{} {} : {} {}  [{}]",
        m.home_team_name,
        score(m.home_score),
        score(m.away_score),
        m.away_team_name,
        m.status.as_str()
    );

    let rosters = session.rosters()?;
    if let Some(home) = rosters.home_team.as_ref() {
        print_roster(&session, home);
    }
    if let Some(away) = rosters.away_team.as_ref() {
        print_roster(&session, away);
    }

    // Keep the cache tracking the live match for a few rounds, then let the
    // handle cancel the subscription on the way out.
    let watch = session.watch(config.referee_poll_interval);
    std::thread::sleep(config.referee_poll_interval * 3);
    watch.stop_and_join();
    info!("watch stopped");
    Ok(())
}

fn print_roster(session: &RefereeSession, roster: &TeamRoster) {
    println!("{}", roster.name);
    for player in roster.starters().chain(roster.substitutes()) {
        let stats = session.player_stats(&player.id);
        let mut line = format!(
            "  #{:<3} {:<24} {}",
            player
                .jersey_number
                .map(|n| n.to_string())
                .unwrap_or_else(|| "?".to_string()),
            player.full_name(),
            if player.is_starter { "starter" } else { "sub" }
        );
        if !stats.is_zero() {
            line.push_str(&format!(
                "  goals {} og {} yc {} rc {}",
                stats.goals, stats.own_goals, stats.yellow_cards, stats.red_cards
            ));
        }
        println!("{line}");
    }
}

fn score(value: Option<i32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn format_date(raw: &str) -> String {
    // Backend dates come as ISO strings; show minute precision, pass
    // through anything that does not parse. `get` keeps this total when the
    // string is short or holds multibyte text.
    let trimmed = raw.trim().trim_end_matches('Z');
    let head = trimmed.get(..19).unwrap_or(trimmed);
    NaiveDateTime::parse_from_str(head, "%Y-%m-%dT%H:%M:%S")
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::format_date;

    #[test]
    fn formats_iso_dates_to_minute_precision() {
        assert_eq!(format_date("2026-06-12T18:30:00Z"), "2026-06-12 18:30");
        assert_eq!(
            format_date("2026-06-12T18:30:00.000Z"),
            "2026-06-12 18:30"
        );
    }

    #[test]
    fn passes_unparseable_dates_through_without_panicking() {
        assert_eq!(format_date("sobota wieczór"), "sobota wieczór");
        assert_eq!(format_date(""), "");
        // 18 ascii bytes followed by a two-byte char: byte 19 falls inside
        // the char, which a naive byte slice would panic on.
        let awkward = "2026-06-12T18:30:0ž trailing";
        assert_eq!(format_date(awkward), awkward);
    }
}
