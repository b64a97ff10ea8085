use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::debug;

use crate::models::{
    Game, Outcome, Side, StandingRow, Team, TeamId, TeamRef, POINTS_DRAW, POINTS_WIN,
};

/// Build the standings table for `teams` from the results in `games`.
///
/// Every team gets exactly one row, including teams that have not played.
/// A game whose home or away team is not in `teams` is skipped as a whole.
/// A game listing the same team on both sides counts twice for that team,
/// once from each side.
/// Rows are ranked by points, goal difference and goals scored (all
/// descending), then by team name and finally team id.
pub fn compute_standings(teams: &[Team], games: &[Game]) -> Vec<StandingRow> {
    let mut rows: Vec<StandingRow> = Vec::with_capacity(teams.len());
    let mut index: HashMap<TeamId, usize> = HashMap::with_capacity(teams.len());

    for team in teams {
        if index.contains_key(&team.id) {
            continue;
        }
        index.insert(team.id, rows.len());
        rows.push(StandingRow::empty(TeamRef::from(team)));
    }

    for game in games {
        let (Some(&home), Some(&away)) = (
            index.get(&game.home_team_id),
            index.get(&game.away_team_id),
        ) else {
            debug!(game_id = %game.id, "Skipping game with team outside the event");
            continue;
        };

        let outcome = game.outcome();
        apply_result(&mut rows[home], game, Side::Home, outcome);
        apply_result(&mut rows[away], game, Side::Away, outcome);
    }

    for row in &mut rows {
        row.goal_difference = i64::from(row.goals_for) - i64::from(row.goals_against);
    }

    rows.sort_by(rank_order);
    rows
}

/// Fold one game into a team's row from `side`'s point of view.
///
/// Counters saturate; scores are bounded on input but stored rows are not
/// trusted to be.
fn apply_result(row: &mut StandingRow, game: &Game, side: Side, outcome: Outcome) {
    let (scored, conceded) = match side {
        Side::Home => (game.home_goals, game.away_goals),
        Side::Away => (game.away_goals, game.home_goals),
    };
    row.played = row.played.saturating_add(1);
    row.goals_for = row.goals_for.saturating_add(scored);
    row.goals_against = row.goals_against.saturating_add(conceded);

    match outcome.winner() {
        Some(winner) if winner == side => {
            row.wins += 1;
            row.points = row.points.saturating_add(POINTS_WIN);
        }
        Some(_) => row.losses += 1,
        None => {
            row.draws += 1;
            row.points = row.points.saturating_add(POINTS_DRAW);
        }
    }
}

/// Table order: best team first.
pub fn rank_order(a: &StandingRow, b: &StandingRow) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.goal_difference.cmp(&a.goal_difference))
        .then_with(|| b.goals_for.cmp(&a.goals_for))
        .then_with(|| a.team.name.cmp(&b.team.name))
        .then_with(|| a.team.id.cmp(&b.team.id))
}
