use uuid::Uuid;

use crate::models::{DeletionSummary, Pet, PetAnalysis, Profile};

#[derive(Clone)]
pub struct Store {
    profiles: sled::Tree,
    pets: sled::Tree,
    pet_analyses: sled::Tree,
}

impl Store {
    pub fn open(data_dir: &str) -> anyhow::Result<Self> {
        let db = sled::open(data_dir)?;
        Ok(Self {
            profiles: db.open_tree("profiles")?,
            pets: db.open_tree("pets")?,
            pet_analyses: db.open_tree("pet_analyses")?,
        })
    }

    pub fn get_profile(&self, user_id: Uuid) -> anyhow::Result<Option<Profile>> {
        match self.profiles.get(user_id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn save_profile(&self, profile: &Profile) -> anyhow::Result<()> {
        self.profiles
            .insert(profile.user_id.as_bytes(), serde_json::to_vec(profile)?)?;
        self.profiles.flush()?;
        Ok(())
    }

    pub fn create_pet(&self, pet: &Pet) -> anyhow::Result<()> {
        self.pets.insert(pet.id.as_bytes(), serde_json::to_vec(pet)?)?;
        self.pets.flush()?;
        Ok(())
    }

    pub fn get_pet(&self, id: Uuid) -> anyhow::Result<Option<Pet>> {
        match self.pets.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn save_pet(&self, pet: &Pet) -> anyhow::Result<()> {
        self.pets.insert(pet.id.as_bytes(), serde_json::to_vec(pet)?)?;
        self.pets.flush()?;
        Ok(())
    }

    pub fn delete_pet(&self, id: Uuid) -> anyhow::Result<()> {
        self.pets.remove(id.as_bytes())?;
        self.pets.flush()?;
        Ok(())
    }

    pub fn list_pets_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Pet>> {
        let mut out = Vec::new();
        for item in self.pets.iter() {
            let (_, bytes) = item?;
            let pet: Pet = serde_json::from_slice(&bytes)?;
            if pet.user_id == user_id {
                out.push(pet);
            }
        }
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    pub fn create_analysis(&self, analysis: &PetAnalysis) -> anyhow::Result<()> {
        self.pet_analyses
            .insert(analysis.id.as_bytes(), serde_json::to_vec(analysis)?)?;
        self.pet_analyses.flush()?;
        Ok(())
    }

    pub fn list_analyses(&self, user_id: Uuid, pet_id: Option<Uuid>) -> anyhow::Result<Vec<PetAnalysis>> {
        let mut out = Vec::new();
        for item in self.pet_analyses.iter() {
            let (_, bytes) = item?;
            let analysis: PetAnalysis = serde_json::from_slice(&bytes)?;
            if analysis.user_id != user_id {
                continue;
            }
            if let Some(pet_id) = pet_id {
                if analysis.pet_id != Some(pet_id) {
                    continue;
                }
            }
            out.push(analysis);
        }
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    /// Cascade-deletes every profile/pet/analysis row owned by `user_id`.
    /// Idempotent: deleting a user with no rows still returns a zeroed summary.
    pub fn delete_cascade(&self, user_id: Uuid) -> anyhow::Result<DeletionSummary> {
        let mut summary = DeletionSummary::default();

        if self.profiles.remove(user_id.as_bytes())?.is_some() {
            summary.profiles_deleted = 1;
        }
        self.profiles.flush()?;

        for item in self.pets.iter() {
            let (key, bytes) = item?;
            let pet: Pet = serde_json::from_slice(&bytes)?;
            if pet.user_id == user_id {
                self.pets.remove(key)?;
                summary.pets_deleted += 1;
            }
        }
        self.pets.flush()?;

        for item in self.pet_analyses.iter() {
            let (key, bytes) = item?;
            let analysis: PetAnalysis = serde_json::from_slice(&bytes)?;
            if analysis.user_id == user_id {
                self.pet_analyses.remove(key)?;
                summary.analyses_deleted += 1;
            }
        }
        self.pet_analyses.flush()?;

        Ok(summary)
    }
}
