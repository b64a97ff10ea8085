use std::collections::{HashMap, HashSet};

use crate::models::{
    GameId, LeaderboardEntry, Leaderboards, Player, PlayerId, PlayerStat, StatId, StatKind, Team,
    TeamId, LEADERBOARD_SIZE,
};

use super::CalculateError;

/// Which leaderboard a statistic counts towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Board {
    Scorers,
    Assists,
}

impl Board {
    /// Own goals count for the scoreboard but for no player's tally.
    pub fn for_kind(kind: StatKind) -> Option<Board> {
        match kind {
            StatKind::Goal | StatKind::Penalty => Some(Board::Scorers),
            StatKind::Assist => Some(Board::Assists),
            StatKind::OwnGoal => None,
        }
    }

    /// Kinds worth fetching to build every board.
    pub const COUNTED_KINDS: [StatKind; 3] =
        [StatKind::Goal, StatKind::Penalty, StatKind::Assist];
}

/// Display names for the players and teams statistics refer to.
#[derive(Debug, Clone, Default)]
pub struct NameDirectory {
    players: HashMap<PlayerId, String>,
    teams: HashMap<TeamId, String>,
}

impl NameDirectory {
    pub fn new(players: &[Player], teams: &[Team]) -> Self {
        Self {
            players: players.iter().map(|p| (p.id, p.name.clone())).collect(),
            teams: teams.iter().map(|t| (t.id, t.name.clone())).collect(),
        }
    }

    pub fn player(&self, id: PlayerId) -> Option<&str> {
        self.players.get(&id).map(String::as_str)
    }

    pub fn team(&self, id: TeamId) -> Option<&str> {
        self.teams.get(&id).map(String::as_str)
    }
}

#[derive(Debug)]
struct Tally {
    count: u32,
    first_stat: StatId,
    team_id: TeamId,
}

/// Build the top scorers and top assists boards for one event.
///
/// Only statistics from `event_game_ids` count. Each board is ordered by
/// count (descending), then player name, then player id, and holds at most
/// [`LEADERBOARD_SIZE`] entries. A player's team is the credited team of
/// their earliest counted record.
pub fn compute_leaderboards(
    event_game_ids: &HashSet<GameId>,
    stats: &[PlayerStat],
    names: &NameDirectory,
) -> Result<Leaderboards, CalculateError> {
    if event_game_ids.is_empty() {
        return Ok(Leaderboards::default());
    }

    let mut scorers: HashMap<PlayerId, Tally> = HashMap::new();
    let mut assists: HashMap<PlayerId, Tally> = HashMap::new();

    for stat in stats {
        if !event_game_ids.contains(&stat.game_id) {
            continue;
        }
        let board = match Board::for_kind(stat.kind) {
            Some(Board::Scorers) => &mut scorers,
            Some(Board::Assists) => &mut assists,
            None => continue,
        };

        let tally = board.entry(stat.player_id).or_insert(Tally {
            count: 0,
            first_stat: stat.id,
            team_id: stat.team_id,
        });
        tally.count += 1;
        if stat.id < tally.first_stat {
            tally.first_stat = stat.id;
            tally.team_id = stat.team_id;
        }
    }

    Ok(Leaderboards {
        top_scorers: rank(scorers, names)?,
        top_assists: rank(assists, names)?,
    })
}

fn rank(
    tallies: HashMap<PlayerId, Tally>,
    names: &NameDirectory,
) -> Result<Vec<LeaderboardEntry>, CalculateError> {
    let mut entries = tallies
        .into_iter()
        .map(|(player_id, tally)| -> Result<LeaderboardEntry, CalculateError> {
            let player = names
                .player(player_id)
                .ok_or(CalculateError::UnknownPlayer {
                    stat: tally.first_stat,
                    player: player_id,
                })?;
            let team = names
                .team(tally.team_id)
                .ok_or(CalculateError::UnknownTeam {
                    stat: tally.first_stat,
                    team: tally.team_id,
                })?;
            Ok(LeaderboardEntry {
                player_id,
                player: player.to_string(),
                team: team.to_string(),
                count: tally.count,
            })
        })
        .collect::<Result<Vec<_>, CalculateError>>()?;

    entries.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.player.cmp(&b.player))
            .then_with(|| a.player_id.cmp(&b.player_id))
    });
    entries.truncate(LEADERBOARD_SIZE);
    Ok(entries)
}
