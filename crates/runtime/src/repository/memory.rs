//! In-memory ClassPathRepository implementation for tests and local runs.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::RwLock;

use rpg_core::EntityId;

use super::{ClassPathRecord, ClassPathRepository, ProgressPatch, RepositoryError, Result};

/// In-memory implementation of ClassPathRepository.
///
/// Stores records indexed by owner and class path key.
#[derive(Default)]
pub struct InMemoryClassPathRepository {
    records: RwLock<HashMap<(EntityId, String), ClassPathRecord>>,
}

impl InMemoryClassPathRepository {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with pre-existing records.
    pub fn with_records(records: impl IntoIterator<Item = ClassPathRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|record| ((record.owner, record.class_path.clone()), record))
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }
}

impl ClassPathRepository for InMemoryClassPathRepository {
    fn load_owner_class_path(
        &self,
        owner: EntityId,
        class_path: &str,
    ) -> Result<Option<ClassPathRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(records.get(&(owner, class_path.to_string())).cloned())
    }

    fn load_owner_class_paths(&self, owner: EntityId) -> Result<Vec<ClassPathRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut owned: Vec<ClassPathRecord> = records
            .values()
            .filter(|record| record.owner == owner)
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.class_path.cmp(&b.class_path));
        Ok(owned)
    }

    fn update_by_owner(&self, owner: EntityId, patch: &ProgressPatch) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let record = match records.entry((owner, patch.class_path.clone())) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let level = patch.level.ok_or_else(|| RepositoryError::MissingLevel {
                    owner,
                    class_path: patch.class_path.clone(),
                })?;
                entry.insert(ClassPathRecord {
                    owner,
                    class_path: patch.class_path.clone(),
                    level,
                    experience: 0.0,
                })
            }
        };
        if let Some(level) = patch.level {
            record.level = level;
        }
        if let Some(experience) = patch.experience {
            record.experience = experience;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patches_merge_into_records() {
        let repo = InMemoryClassPathRepository::new();
        let owner = EntityId(3);

        repo.update_by_owner(owner, &ProgressPatch::level("mage", 0, 40.0))
            .unwrap();
        repo.update_by_owner(owner, &ProgressPatch::level("mage", 2, 120.0))
            .unwrap();
        repo.update_by_owner(owner, &ProgressPatch::experience("mage", 150.0))
            .unwrap();

        let record = repo.load_owner_class_path(owner, "mage").unwrap().unwrap();
        assert_eq!(record.level, 2);
        assert_eq!(record.experience, 150.0);
        assert!(repo.load_owner_class_path(EntityId(4), "mage").unwrap().is_none());
    }

    #[test]
    fn new_records_need_a_level() {
        let repo = InMemoryClassPathRepository::new();
        let owner = EntityId(3);

        assert!(matches!(
            repo.update_by_owner(owner, &ProgressPatch::experience("mage", 40.0)),
            Err(RepositoryError::MissingLevel { .. })
        ));
        assert!(repo.load_owner_class_path(owner, "mage").unwrap().is_none());

        repo.update_by_owner(owner, &ProgressPatch::level("mage", 0, 10.0))
            .unwrap();
        let record = repo.load_owner_class_path(owner, "mage").unwrap().unwrap();
        assert_eq!(record.level, 0);
        assert_eq!(record.experience, 10.0);
    }

    #[test]
    fn owner_records_are_listed_by_key() {
        let repo = InMemoryClassPathRepository::with_records([
            ClassPathRecord {
                owner: EntityId(1),
                class_path: "warrior".into(),
                level: 3,
                experience: 300.0,
            },
            ClassPathRecord {
                owner: EntityId(1),
                class_path: "cook".into(),
                level: 1,
                experience: 5.0,
            },
            ClassPathRecord {
                owner: EntityId(2),
                class_path: "warrior".into(),
                level: 1,
                experience: 0.0,
            },
        ]);

        let keys: Vec<String> = repo
            .load_owner_class_paths(EntityId(1))
            .unwrap()
            .into_iter()
            .map(|record| record.class_path)
            .collect();
        assert_eq!(keys, vec!["cook".to_string(), "warrior".to_string()]);
    }
}
