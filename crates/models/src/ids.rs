use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A JSON-backed list of entity ids, used for the denormalized
/// back-reference lists (`teachers.courses`, `courses.enrolled_students`).
/// Insertion is set-like: a member appears at most once.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, FromJsonQueryResult)]
pub struct IdList(pub Vec<Uuid>);

impl IdList {
    pub fn new() -> Self {
        IdList(Vec::new())
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.0.contains(&id)
    }

    /// Adds `id` if not already present; returns whether the list changed.
    pub fn insert(&mut self, id: Uuid) -> bool {
        if self.contains(id) {
            false
        } else {
            self.0.push(id);
            true
        }
    }

    /// Removes `id` if present; returns whether the list changed.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.0.len();
        self.0.retain(|member| *member != id);
        self.0.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Uuid> for IdList {
    fn from_iter<I: IntoIterator<Item = Uuid>>(iter: I) -> Self {
        let mut list = IdList::new();
        for id in iter {
            list.insert(id);
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_is_set_like() {
        let id = Uuid::new_v4();
        let mut list = IdList::new();
        assert!(list.insert(id));
        assert!(!list.insert(id));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_remove() {
        let id = Uuid::new_v4();
        let mut list = IdList::new();
        list.insert(id);
        assert!(list.remove(id));
        assert!(!list.remove(id));
        assert!(list.is_empty());
    }
}
