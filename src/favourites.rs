//! Favourites Store
//!
//! Saves the user's favourite hosts into the preference store as a JSON
//! array under [`FAVOURITES_KEY`] and reads them back at startup. Loading
//! never fails: anything unreadable is treated as "no favourites".

use serde::{Deserialize, Serialize};

use crate::config::PreferenceStore;
use crate::error::{Error, Result};
use crate::models::Host;

/// Preference key holding the encoded favourites
pub const FAVOURITES_KEY: &str = "favourite.hosts";

/// Stored form of one favourite host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct FavouriteRecord {
    host: String,
    port: u16,
    #[serde(rename = "type")]
    protocol_type: String,
    #[serde(default)]
    encryption: bool,
}

impl From<&Host> for FavouriteRecord {
    fn from(host: &Host) -> Self {
        Self {
            host: host.host_name().to_string(),
            port: host.port(),
            protocol_type: host.protocol_type().to_string(),
            encryption: host.is_encryption(),
        }
    }
}

impl TryFrom<FavouriteRecord> for Host {
    type Error = Error;

    fn try_from(record: FavouriteRecord) -> Result<Self> {
        Ok(Host::new(
            record.host,
            record.port,
            record.protocol_type,
            record.encryption,
        )?
        .with_favourite(true))
    }
}

/// Encode the favourite hosts of `hosts`, keeping their order
pub fn encode(hosts: &[Host]) -> Result<String> {
    let records: Vec<FavouriteRecord> = hosts
        .iter()
        .filter(|h| h.is_favourite())
        .map(FavouriteRecord::from)
        .collect();
    Ok(serde_json::to_string(&records)?)
}

/// Decode an encoded favourites value. Blank input means no favourites.
pub fn decode(value: &str) -> Result<Vec<Host>> {
    if value.trim().is_empty() {
        return Ok(Vec::new());
    }

    let records: Vec<FavouriteRecord> =
        serde_json::from_str(value).map_err(|e| Error::LoadFailed {
            reason: e.to_string(),
        })?;

    records
        .into_iter()
        .map(|record| {
            Host::try_from(record).map_err(|e| Error::LoadFailed {
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Reads and writes favourites through a [`PreferenceStore`]
#[derive(Debug, Clone)]
pub struct FavouritesStore {
    key: String,
}

impl Default for FavouritesStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FavouritesStore {
    pub fn new() -> Self {
        Self::with_key(FAVOURITES_KEY)
    }

    /// Use a different preference key
    pub fn with_key(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Save the favourite entries of `hosts`
    ///
    /// # Errors
    ///
    /// Returns [`Error::PersistenceFailed`] if encoding or the store write fails.
    pub fn persist(&self, prefs: &mut dyn PreferenceStore, hosts: &[Host]) -> Result<()> {
        let encoded = encode(hosts).map_err(|e| Error::PersistenceFailed {
            reason: e.to_string(),
        })?;

        prefs
            .set_prop(&self.key, &encoded)
            .map_err(|e| Error::PersistenceFailed {
                reason: e.to_string(),
            })?;

        debug!(
            "Persisted {} favourite hosts",
            hosts.iter().filter(|h| h.is_favourite()).count()
        );
        Ok(())
    }

    /// Read favourites, surfacing decode problems
    pub fn try_load(&self, prefs: &dyn PreferenceStore) -> Result<Vec<Host>> {
        decode(&prefs.get_prop(&self.key, ""))
    }

    /// Read favourites; an absent or unreadable value yields an empty list
    pub fn load(&self, prefs: &dyn PreferenceStore) -> Vec<Host> {
        match self.try_load(prefs) {
            Ok(hosts) => {
                debug!("Loaded {} favourite hosts", hosts.len());
                hosts
            }
            Err(e) => {
                warn!("Ignoring stored favourites: {}", e);
                Vec::new()
            }
        }
    }
}
