use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Show {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub currency_name: String,
    pub currency_symbol: String,
    pub initial_balance: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Season {
    pub id: i32,
    pub show_id: i32,
    pub season_number: i32,
    pub name: String,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub id: i32,
    pub season_id: i32,
    pub episode_number: i32,
    pub title: String,
    pub air_date: Option<DateTime<Utc>>,
    pub betting_open: bool,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: i32,
    pub show_id: i32,
    pub name: String,
    pub actor: Option<String>,
    pub image_url: Option<String>,
    pub status: String,
    pub is_active: bool,
}

/// Life state of a character as recorded in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterStatus {
    Alive,
    Dead,
    Unknown,
}

impl CharacterStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CharacterStatus::Alive => "alive",
            CharacterStatus::Dead => "dead",
            CharacterStatus::Unknown => "unknown",
        }
    }
}

impl FromStr for CharacterStatus {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alive" => Ok(CharacterStatus::Alive),
            "dead" => Ok(CharacterStatus::Dead),
            "unknown" => Ok(CharacterStatus::Unknown),
            _ => Err(()),
        }
    }
}

impl fmt::Display for CharacterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the bettor claims will happen to the character in the episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prediction {
    Dies,
    Survives,
}

impl Prediction {
    pub fn as_str(self) -> &'static str {
        match self {
            Prediction::Dies => "dies",
            Prediction::Survives => "survives",
        }
    }

    /// A wager wins when the recorded outcome matches the prediction.
    pub fn wins(self, died: bool) -> bool {
        match self {
            Prediction::Dies => died,
            Prediction::Survives => !died,
        }
    }
}

impl FromStr for Prediction {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dies" => Ok(Prediction::Dies),
            "survives" => Ok(Prediction::Survives),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a wager. A bet leaves `Pending` exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BetStatus {
    Pending,
    Won,
    Lost,
    Refunded,
}

impl BetStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BetStatus::Pending => "pending",
            BetStatus::Won => "won",
            BetStatus::Lost => "lost",
            BetStatus::Refunded => "refunded",
        }
    }
}

impl FromStr for BetStatus {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BetStatus::Pending),
            "won" => Ok(BetStatus::Won),
            "lost" => Ok(BetStatus::Lost),
            "refunded" => Ok(BetStatus::Refunded),
            _ => Err(()),
        }
    }
}

impl fmt::Display for BetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
