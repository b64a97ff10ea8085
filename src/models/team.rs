//! Team and player models.

use serde::{Deserialize, Serialize};

use super::{EventId, PlayerId, TeamId, ValidationError};

/// A team registered to one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub event_id: EventId,
}

/// A player on a team's roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub team_id: TeamId,
}

/// A team together with its roster.
#[derive(Debug, Clone, Serialize)]
pub struct TeamWithPlayers {
    #[serde(flatten)]
    pub team: Team,
    pub players: Vec<Player>,
}

/// Raw team submission.
#[derive(Debug, Clone, Deserialize)]
pub struct TeamForm {
    #[serde(default)]
    pub name: String,
    #[serde(default = "unset_event")]
    pub event_id: EventId,
}

fn unset_event() -> EventId {
    EventId::new(0)
}

/// A validated team, ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTeam {
    pub name: String,
    pub event_id: EventId,
}

impl TeamForm {
    pub fn validate(self) -> Result<NewTeam, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::Required("name"));
        }
        if self.event_id.is_unset() {
            return Err(ValidationError::Required("event_id"));
        }
        Ok(NewTeam {
            name: name.to_string(),
            event_id: self.event_id,
        })
    }
}

/// Raw player submission.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerForm {
    #[serde(default)]
    pub name: String,
    #[serde(default = "unset_team")]
    pub team_id: TeamId,
}

fn unset_team() -> TeamId {
    TeamId::new(0)
}

/// A validated player, ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlayer {
    pub name: String,
    pub team_id: TeamId,
}

impl PlayerForm {
    pub fn validate(self) -> Result<NewPlayer, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::Required("name"));
        }
        if self.team_id.is_unset() {
            return Err(ValidationError::Required("team_id"));
        }
        Ok(NewPlayer {
            name: name.to_string(),
            team_id: self.team_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_form_requires_name_and_event() {
        let form: TeamForm = serde_json::from_str(r#"{"event_id": 1}"#).unwrap();
        assert_eq!(form.validate(), Err(ValidationError::Required("name")));

        let form: TeamForm = serde_json::from_str(r#"{"name": "Red"}"#).unwrap();
        assert_eq!(form.validate(), Err(ValidationError::Required("event_id")));
    }

    #[test]
    fn test_team_form_trims_name() {
        let form: TeamForm = serde_json::from_str(r#"{"name": "  Red ", "event_id": 4}"#).unwrap();
        let team = form.validate().unwrap();
        assert_eq!(team.name, "Red");
        assert_eq!(team.event_id, EventId::new(4));
    }

    #[test]
    fn test_player_form_validation() {
        let form: PlayerForm = serde_json::from_str(r#"{"name": "Ivan", "team_id": 0}"#).unwrap();
        assert_eq!(form.validate(), Err(ValidationError::Required("team_id")));

        let form: PlayerForm = serde_json::from_str(r#"{"name": "Ivan", "team_id": 2}"#).unwrap();
        assert_eq!(
            form.validate().unwrap(),
            NewPlayer {
                name: "Ivan".to_string(),
                team_id: TeamId::new(2),
            }
        );
    }

    #[test]
    fn test_team_with_players_flattens() {
        let twp = TeamWithPlayers {
            team: Team {
                id: TeamId::new(1),
                name: "Red".to_string(),
                event_id: EventId::new(1),
            },
            players: vec![],
        };
        let json = serde_json::to_value(&twp).unwrap();
        assert_eq!(json["name"], "Red");
        assert!(json["players"].as_array().unwrap().is_empty());
    }
}
