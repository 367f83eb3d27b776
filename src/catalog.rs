//! Card catalog, trivia and session state
//!
//! [`AppState`] is the shared application data the host owns and hands to
//! section initializers.

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_RATE;
use crate::error::CatalogError;

const LORE_PREFIX: &str = "このカードの世界観は、「";
const QUOTED_SUFFIX: &str = "」です。";

/// Lore lines shorter than this make poor quiz prompts
const MIN_LORE_LINE_CHARS: usize = 20;

/// A card as shipped in `cards.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub name: String,
    #[serde(default)]
    pub image_filename: String,
    /// Descriptive sentences; the lore line carries a fixed prefix
    #[serde(default)]
    pub info: Vec<String>,
}

impl Card {
    fn info_line(&self, prefix: &str) -> Option<&str> {
        self.info
            .iter()
            .find(|line| line.starts_with(prefix))
            .map(|line| &line[prefix.len()..])
    }

    pub fn lore(&self) -> Option<String> {
        self.info_line(LORE_PREFIX)
            .map(|rest| rest.replacen(QUOTED_SUFFIX, "", 1))
    }

    /// Has a lore line long enough to quiz on
    pub fn has_quiz_lore(&self) -> bool {
        self.info
            .iter()
            .any(|line| line.starts_with(LORE_PREFIX) && line.chars().count() > MIN_LORE_LINE_CHARS)
    }
}

/// Logged-in user, if any
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub rate: u32,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            user_id: None,
            username: None,
            rate: DEFAULT_RATE,
        }
    }
}

impl Session {
    pub fn logged_in(user_id: &str, username: &str, rate: u32) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            username: Some(username.to_string()),
            rate,
        }
    }

    /// Username when both id and name are known
    pub fn user(&self) -> Option<&str> {
        match (&self.user_id, &self.username) {
            (Some(_), Some(name)) => Some(name),
            _ => None,
        }
    }
}

/// Shared application data
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub cards: Vec<Card>,
    pub trivia: Vec<String>,
    pub session: Session,
}

impl AppState {
    pub fn quiz_cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter().filter(|c| c.has_quiz_lore())
    }
}

pub fn parse_cards(path: &str, json: &str) -> Result<Vec<Card>, CatalogError> {
    serde_json::from_str(json).map_err(|source| CatalogError::Parse {
        path: path.to_string(),
        source,
    })
}

pub fn parse_trivia(path: &str, json: &str) -> Result<Vec<String>, CatalogError> {
    serde_json::from_str(json).map_err(|source| CatalogError::Parse {
        path: path.to_string(),
        source,
    })
}
