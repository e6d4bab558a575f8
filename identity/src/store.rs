//! Sled-backed credential and refresh-token storage, with a per-identity
//! in-process mutex guarding the revoke+insert pairs that must be atomic
//! against concurrent logins/refreshes on this process.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::{Identity, RefreshRecord};

#[derive(Clone)]
pub struct Store {
    identities: sled::Tree,
    email_index: sled::Tree,
    refresh_records: sled::Tree,
    locks: Arc<DashMap<Uuid, Arc<Mutex<()>>>>,
}

impl Store {
    pub fn open(data_dir: &str) -> anyhow::Result<Self> {
        let db = sled::open(data_dir)?;
        Ok(Self {
            identities: db.open_tree("identities")?,
            email_index: db.open_tree("email_index")?,
            refresh_records: db.open_tree("refresh_records")?,
            locks: Arc::new(DashMap::new()),
        })
    }

    /// Returns the per-identity lock, creating it on first use. Held across
    /// the revoke-then-insert pair in login/refresh/change-password so those
    /// sequences are atomic against each other on this process.
    pub fn identity_lock(&self, owner: Uuid) -> Arc<Mutex<()>> {
        self.locks
            .entry(owner)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn email_key(email: &str) -> String {
        email.trim().to_lowercase()
    }

    pub fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Identity>> {
        let key = Self::email_key(email);
        let Some(id_bytes) = self.email_index.get(key.as_bytes())? else {
            return Ok(None);
        };
        let id = Uuid::from_slice(&id_bytes)?;
        self.find_by_id(id)
    }

    pub fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Identity>> {
        match self.identities.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn email_taken(&self, email: &str) -> anyhow::Result<bool> {
        Ok(self.email_index.contains_key(Self::email_key(email).as_bytes())?)
    }

    pub fn create_identity(&self, identity: &Identity) -> anyhow::Result<()> {
        let key = Self::email_key(&identity.email);
        let bytes = serde_json::to_vec(identity)?;
        self.identities.insert(identity.id.as_bytes(), bytes)?;
        self.email_index
            .insert(key.as_bytes(), identity.id.as_bytes())?;
        self.identities.flush()?;
        self.email_index.flush()?;
        Ok(())
    }

    pub fn save_identity(&self, identity: &Identity) -> anyhow::Result<()> {
        let bytes = serde_json::to_vec(identity)?;
        self.identities.insert(identity.id.as_bytes(), bytes)?;
        self.identities.flush()?;
        Ok(())
    }

    pub fn delete_identity(&self, id: Uuid) -> anyhow::Result<()> {
        if let Some(identity) = self.find_by_id(id)? {
            self.email_index
                .remove(Self::email_key(&identity.email).as_bytes())?;
        }
        self.identities.remove(id.as_bytes())?;
        for item in self.refresh_records.iter() {
            let (key, bytes) = item?;
            let record: RefreshRecord = serde_json::from_slice(&bytes)?;
            if record.owner == id {
                self.refresh_records.remove(key)?;
            }
        }
        self.identities.flush()?;
        self.email_index.flush()?;
        self.refresh_records.flush()?;
        Ok(())
    }

    pub fn insert_refresh_record(&self, record: &RefreshRecord) -> anyhow::Result<()> {
        let bytes = serde_json::to_vec(record)?;
        self.refresh_records.insert(record.id.as_bytes(), bytes)?;
        self.refresh_records.flush()?;
        Ok(())
    }

    pub fn get_refresh_record(&self, id: Uuid) -> anyhow::Result<Option<RefreshRecord>> {
        match self.refresh_records.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Sets `revoked=true` on every non-revoked record owned by `owner`.
    /// Must be called while holding `identity_lock(owner)`.
    pub fn revoke_all_for_owner(&self, owner: Uuid) -> anyhow::Result<()> {
        for item in self.refresh_records.iter() {
            let (key, bytes) = item?;
            let mut record: RefreshRecord = serde_json::from_slice(&bytes)?;
            if record.owner == owner && !record.revoked {
                record.revoked = true;
                self.refresh_records
                    .insert(key, serde_json::to_vec(&record)?)?;
            }
        }
        self.refresh_records.flush()?;
        Ok(())
    }

    pub fn revoke_record(&self, id: Uuid) -> anyhow::Result<()> {
        if let Some(mut record) = self.get_refresh_record(id)? {
            record.revoked = true;
            self.refresh_records
                .insert(id.as_bytes(), serde_json::to_vec(&record)?)?;
            self.refresh_records.flush()?;
        }
        Ok(())
    }

    pub fn count_active_for_owner(&self, owner: Uuid) -> anyhow::Result<usize> {
        let mut count = 0;
        for item in self.refresh_records.iter() {
            let (_, bytes) = item?;
            let record: RefreshRecord = serde_json::from_slice(&bytes)?;
            if record.owner == owner && !record.revoked {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Removes refresh records past `expires_at`. Run periodically from a
    /// background maintenance tick; never user-triggered.
    pub fn prune_expired(&self) -> anyhow::Result<usize> {
        let now = Utc::now();
        let mut pruned = 0;
        for item in self.refresh_records.iter() {
            let (key, bytes) = item?;
            let record: RefreshRecord = serde_json::from_slice(&bytes)?;
            if record.expires_at < now {
                self.refresh_records.remove(key)?;
                pruned += 1;
            }
        }
        if pruned > 0 {
            self.refresh_records.flush()?;
        }
        Ok(pruned)
    }
}
