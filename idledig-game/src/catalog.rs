//! Mission pool with uniform selection and lazy identifier backfill.
use rand::{Rng, RngCore};
use std::sync::OnceLock;
use thiserror::Error;

use crate::data::{MissionDefinition, MissionPoolData};

const DEFAULT_MISSIONS_DATA: &str = include_str!("../assets/missions.json");

/// Stable position of a definition inside its catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MissionIndex(usize);

impl MissionIndex {
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

/// Errors raised while building a catalog from serialized data.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("mission pool JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Fixed set of mission definitions eligible for selection.
///
/// The catalog is the only place identifiers are assigned: an empty
/// `mission_id` is filled the first time the definition is selected or looked
/// up, and the assigned value sticks for the catalog's lifetime.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MissionCatalog {
    missions: Vec<MissionDefinition>,
}

impl MissionCatalog {
    #[must_use]
    pub fn new(missions: Vec<MissionDefinition>) -> Self {
        Self { missions }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a catalog from the pool JSON format.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` when the document is not a valid mission pool.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(MissionPoolData::from_json(json)?.into())
    }

    /// Catalog bundled with the engine.
    #[must_use]
    pub fn load_from_static() -> Self {
        static_pool().clone().into()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.missions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.missions.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: MissionIndex) -> Option<&MissionDefinition> {
        self.missions.get(index.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MissionDefinition> {
        self.missions.iter()
    }

    /// Find a definition by id, assigning its identifier if still empty.
    ///
    /// An empty `mission_id` argument matches the first definition that has
    /// not been given an id yet, which then receives one.
    pub fn find_by_id<R>(&mut self, mission_id: &str, ids: &mut R) -> Option<MissionIndex>
    where
        R: RngCore + ?Sized,
    {
        let position = self
            .missions
            .iter()
            .position(|mission| mission.mission_id == mission_id)?;
        let index = MissionIndex(position);
        self.ensure_id(index, ids);
        Some(index)
    }

    /// Pick one definition with equal probability. `None` when the catalog is empty.
    pub fn pick_uniform<R, I>(&mut self, rng: &mut R, ids: &mut I) -> Option<MissionIndex>
    where
        R: Rng + ?Sized,
        I: RngCore + ?Sized,
    {
        if self.missions.is_empty() {
            return None;
        }
        let index = MissionIndex(rng.gen_range(0..self.missions.len()));
        self.ensure_id(index, ids);
        Some(index)
    }

    /// Assign a fresh identifier to every definition that lacks one.
    pub fn assign_missing_ids<R>(&mut self, ids: &mut R)
    where
        R: RngCore + ?Sized,
    {
        for position in 0..self.missions.len() {
            self.ensure_id(MissionIndex(position), ids);
        }
    }

    fn ensure_id<R>(&mut self, index: MissionIndex, ids: &mut R)
    where
        R: RngCore + ?Sized,
    {
        let Some(mission) = self.missions.get_mut(index.0) else {
            return;
        };
        if mission.has_id() {
            return;
        }
        mission.mission_id = fresh_mission_id(ids);
        log::warn!(
            "mission '{}' had no id; assigned {}",
            mission.display_name,
            mission.mission_id
        );
    }
}

impl From<MissionPoolData> for MissionCatalog {
    fn from(data: MissionPoolData) -> Self {
        Self::new(data.missions)
    }
}

impl From<MissionCatalog> for MissionPoolData {
    fn from(catalog: MissionCatalog) -> Self {
        Self::from_missions(catalog.missions)
    }
}

fn static_pool() -> &'static MissionPoolData {
    static POOL: OnceLock<MissionPoolData> = OnceLock::new();
    POOL.get_or_init(|| MissionPoolData::from_json(DEFAULT_MISSIONS_DATA).unwrap_or_default())
}

/// Random (v4) UUID built from the supplied stream.
fn fresh_mission_id<R>(ids: &mut R) -> String
where
    R: RngCore + ?Sized,
{
    let mut bytes = [0u8; 16];
    ids.fill_bytes(&mut bytes);
    uuid::Builder::from_random_bytes(bytes)
        .into_uuid()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn rngs() -> (ChaCha20Rng, ChaCha20Rng) {
        (
            ChaCha20Rng::seed_from_u64(1),
            ChaCha20Rng::seed_from_u64(2),
        )
    }

    #[test]
    fn empty_catalog_yields_nothing() {
        let (mut rng, mut ids) = rngs();
        let mut catalog = MissionCatalog::empty();
        assert!(catalog.pick_uniform(&mut rng, &mut ids).is_none());
        assert!(catalog.find_by_id("anything", &mut ids).is_none());
    }

    #[test]
    fn uniform_pick_covers_every_entry() {
        let (mut rng, mut ids) = rngs();
        let mut catalog = MissionCatalog::new(vec![
            MissionDefinition::new("a", 10.0),
            MissionDefinition::new("b", 10.0),
            MissionDefinition::new("c", 10.0),
        ]);
        let mut counts = [0_u32; 3];
        for _ in 0..9_000 {
            let index = catalog.pick_uniform(&mut rng, &mut ids).unwrap();
            counts[index.get()] += 1;
        }
        for count in counts {
            assert!((2_700..3_300).contains(&count), "skewed pick: {counts:?}");
        }
    }

    #[test]
    fn backfill_happens_once_and_sticks() {
        let (mut rng, mut ids) = rngs();
        let mut catalog = MissionCatalog::new(vec![MissionDefinition::new("", 10.0)]);

        let first = catalog.pick_uniform(&mut rng, &mut ids).unwrap();
        let assigned = catalog.get(first).unwrap().mission_id.clone();
        assert_eq!(assigned.len(), 36);

        let second = catalog.pick_uniform(&mut rng, &mut ids).unwrap();
        assert_eq!(catalog.get(second).unwrap().mission_id, assigned);
        assert_eq!(catalog.find_by_id(&assigned, &mut ids), Some(first));
    }

    #[test]
    fn find_by_id_leaves_existing_ids_alone() {
        let (_, mut ids) = rngs();
        let mut catalog = MissionCatalog::new(vec![
            MissionDefinition::new("alpha", 5.0),
            MissionDefinition::new("beta", 5.0),
        ]);
        let index = catalog.find_by_id("beta", &mut ids).unwrap();
        assert_eq!(index.get(), 1);
        assert_eq!(catalog.get(index).unwrap().mission_id, "beta");
        assert!(catalog.find_by_id("gamma", &mut ids).is_none());
    }

    #[test]
    fn assign_missing_ids_produces_unique_values() {
        let (_, mut ids) = rngs();
        let mut catalog = MissionCatalog::new(vec![
            MissionDefinition::new("", 5.0),
            MissionDefinition::new("", 5.0),
            MissionDefinition::new("kept", 5.0),
        ]);
        catalog.assign_missing_ids(&mut ids);
        let collected: Vec<_> = catalog.iter().map(|m| m.mission_id.clone()).collect();
        assert!(collected.iter().all(|id| !id.is_empty()));
        assert_ne!(collected[0], collected[1]);
        assert_eq!(collected[2], "kept");
    }

    #[test]
    fn static_catalog_loads() {
        let catalog = MissionCatalog::load_from_static();
        assert!(!catalog.is_empty());
        assert!(catalog.iter().all(MissionDefinition::has_id));
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = MissionCatalog::from_json("{ \"missions\": 4 }").unwrap_err();
        assert!(err.to_string().contains("malformed"));
    }
}
