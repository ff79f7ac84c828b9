//! Saved travellers, kept entirely in local storage.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{Result, ValidationError};
use crate::models::Traveller;
use crate::storage::{KeyValueStore, keys, load_json, save_json};

/// The saved traveller list. Every mutation is written back immediately.
pub struct TravellerBook {
    storage: Arc<dyn KeyValueStore>,
    travellers: Vec<Traveller>,
}

impl TravellerBook {
    /// Load the stored list. Unreadable data loads as an empty list.
    pub async fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let travellers = match load_json::<Vec<Traveller>>(storage.as_ref(), keys::SAVED_TRAVELLERS)
            .await
        {
            Ok(list) => list.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Saved travellers unreadable, starting empty");
                Vec::new()
            }
        };
        Self {
            storage,
            travellers,
        }
    }

    pub fn list(&self) -> &[Traveller] {
        &self.travellers
    }

    pub fn get(&self, id: &str) -> Option<&Traveller> {
        self.travellers.iter().find(|t| t.id == id)
    }

    /// Add a traveller under a fresh id and return the id.
    pub async fn add(&mut self, mut traveller: Traveller) -> Result<String> {
        validate(&traveller)?;
        traveller.id = Uuid::new_v4().to_string();
        let id = traveller.id.clone();
        self.travellers.push(traveller);
        self.persist().await?;
        info!(traveller_id = %id, "Traveller added");
        Ok(id)
    }

    /// Replace the traveller with `id`, keeping the id. Returns false when no
    /// such traveller exists.
    pub async fn update(&mut self, id: &str, mut traveller: Traveller) -> Result<bool> {
        validate(&traveller)?;
        let Some(slot) = self.travellers.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        traveller.id = id.to_string();
        *slot = traveller;
        self.persist().await?;
        Ok(true)
    }

    pub async fn delete(&mut self, id: &str) -> Result<bool> {
        let before = self.travellers.len();
        self.travellers.retain(|t| t.id != id);
        if self.travellers.len() == before {
            return Ok(false);
        }
        self.persist().await?;
        info!(traveller_id = %id, "Traveller deleted");
        Ok(true)
    }

    async fn persist(&self) -> Result<()> {
        save_json(self.storage.as_ref(), keys::SAVED_TRAVELLERS, &self.travellers).await?;
        Ok(())
    }
}

fn validate(traveller: &Traveller) -> std::result::Result<(), ValidationError> {
    let missing: Vec<&'static str> = [
        ("first name", traveller.first_name.trim().is_empty()),
        ("last name", traveller.last_name.trim().is_empty()),
    ]
    .into_iter()
    .filter_map(|(field, blank)| blank.then_some(field))
    .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingFields { fields: missing })
    }
}
