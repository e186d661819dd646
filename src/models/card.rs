//! A card is a name/text pair owned by one user inside one collection.
//! Its identity is the (user, collection, name) triple.
use crate::error::{Result, SchedulerError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a card in the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardKey {
    pub user_id: String,
    pub collection_id: String,
    pub card_name: String,
}

impl CardKey {
    /// Builds a key, rejecting empty or whitespace-only fields.
    pub fn new(user_id: &str, collection_id: &str, card_name: &str) -> Result<Self> {
        require_non_empty("user id", user_id)?;
        require_non_empty("collection id", collection_id)?;
        require_non_empty("card name", card_name)?;
        Ok(Self {
            user_id: user_id.to_string(),
            collection_id: collection_id.to_string(),
            card_name: card_name.to_string(),
        })
    }

    pub fn not_found(&self) -> SchedulerError {
        SchedulerError::not_found(&self.user_id, &self.collection_id, &self.card_name)
    }
}

impl fmt::Display for CardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.user_id, self.collection_id, self.card_name)
    }
}

/// A card as supplied by a card source, before it has any scheduling state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewCard {
    pub name: String,
    pub text: String,
}

impl NewCard {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SchedulerError::InvalidArgument(format!(
            "{} must not be empty",
            field
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_key_creation() {
        let key = CardKey::new("alice", "bio", "Mitosis").unwrap();

        assert_eq!(key.user_id, "alice");
        assert_eq!(key.collection_id, "bio");
        assert_eq!(key.card_name, "Mitosis");
        assert_eq!(key.to_string(), "alice/bio/Mitosis");
    }

    #[test]
    fn test_card_key_rejects_empty_fields() {
        assert!(matches!(
            CardKey::new("", "bio", "Mitosis"),
            Err(SchedulerError::InvalidArgument(_))
        ));
        assert!(matches!(
            CardKey::new("alice", "  ", "Mitosis"),
            Err(SchedulerError::InvalidArgument(_))
        ));
        assert!(matches!(
            CardKey::new("alice", "bio", ""),
            Err(SchedulerError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_new_card_from_json() {
        let card: NewCard =
            serde_json::from_str(r#"{"name": "Mitosis", "text": "Cell division"}"#).unwrap();
        assert_eq!(card, NewCard::new("Mitosis", "Cell division"));
    }
}
