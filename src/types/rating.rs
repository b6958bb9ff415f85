// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt::Display;
use std::fmt::Formatter;

use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::fail;

/// How well the learner recalled a card.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    /// Forgot completely.
    Again,
    Hard,
    Good,
    Easy,
}

impl Rating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Again => "again",
            Rating::Hard => "hard",
            Rating::Good => "good",
            Rating::Easy => "easy",
        }
    }

    /// Parse the key a learner presses in the drill: `1` to `4`.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim() {
            "1" => Some(Rating::Again),
            "2" => Some(Rating::Hard),
            "3" => Some(Rating::Good),
            "4" => Some(Rating::Easy),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Rating::Again => "Forgot completely - will see again in 10 minutes",
            Rating::Hard => "Difficult to remember - shorter interval",
            Rating::Good => "Remembered correctly - normal interval",
            Rating::Easy => "Very easy - longer interval",
        }
    }

    pub fn is_lapse(&self) -> bool {
        *self == Rating::Again
    }
}

impl Display for Rating {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for Rating {
    type Error = ErrorReport;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "again" => Ok(Rating::Again),
            "hard" => Ok(Rating::Hard),
            "good" => Ok(Rating::Good),
            "easy" => Ok(Rating::Easy),
            _ => fail(format!("Invalid rating: {}", value)),
        }
    }
}

impl ToSql for Rating {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Rating {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        Rating::try_from(string).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_from() {
        assert_eq!(Rating::try_from("good".to_string()), Ok(Rating::Good));
        assert!(Rating::try_from("Good".to_string()).is_err());
        assert!(Rating::try_from("perfect".to_string()).is_err());
    }

    #[test]
    fn test_from_key() {
        assert_eq!(Rating::from_key("1"), Some(Rating::Again));
        assert_eq!(Rating::from_key(" 4\n"), Some(Rating::Easy));
        assert_eq!(Rating::from_key("5"), None);
        assert_eq!(Rating::from_key(""), None);
    }

    #[test]
    fn test_serde() -> crate::error::Fallible<()> {
        let json = serde_json::to_string(&Rating::Hard)?;
        assert_eq!(json, "\"hard\"");
        let rating: Rating = serde_json::from_str("\"easy\"")?;
        assert_eq!(rating, Rating::Easy);
        Ok(())
    }
}
