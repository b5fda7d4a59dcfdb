use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::error::StoreError;
use super::rule::{NewRule, Rule, RuleId};
use crate::ids::{IdGenerator, UuidGenerator};

/// In-memory rule registry.
///
/// Rules are held behind `Arc` so [`RuleStore::list`] can hand out a
/// snapshot without holding the lock: a dispatch pass keeps matching against
/// the rules it saw even if they are removed meanwhile. The lock is never
/// held across an `.await`.
pub struct RuleStore {
    rules: RwLock<HashMap<RuleId, Arc<Rule>>>,
    ids: Arc<dyn IdGenerator>,
}

impl Default for RuleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleStore {
    pub fn new() -> Self {
        Self::with_id_generator(Arc::new(UuidGenerator))
    }

    pub fn with_id_generator(ids: Arc<dyn IdGenerator>) -> Self {
        RuleStore {
            rules: RwLock::new(HashMap::new()),
            ids,
        }
    }

    /// Store a rule under a fresh id and return the id.
    pub fn register(&self, rule: NewRule) -> Result<RuleId, StoreError> {
        let mut rules = self
            .rules
            .write()
            .map_err(|_| StoreError::LockPoisoned("register"))?;

        let mut id = RuleId::new(self.ids.next_id());
        while rules.contains_key(&id) {
            id = RuleId::new(self.ids.next_id());
        }

        rules.insert(id.clone(), Arc::new(rule.into_rule(id.clone())));
        Ok(id)
    }

    /// Snapshot of every registered rule, in no particular order.
    pub fn list(&self) -> Result<Vec<Arc<Rule>>, StoreError> {
        let rules = self
            .rules
            .read()
            .map_err(|_| StoreError::LockPoisoned("list"))?;
        Ok(rules.values().cloned().collect())
    }

    pub fn get(&self, id: &RuleId) -> Result<Option<Arc<Rule>>, StoreError> {
        let rules = self
            .rules
            .read()
            .map_err(|_| StoreError::LockPoisoned("get"))?;
        Ok(rules.get(id).cloned())
    }

    /// Remove a rule. Unknown ids are ignored; the return value says whether
    /// anything was removed.
    pub fn remove(&self, id: &RuleId) -> Result<bool, StoreError> {
        let mut rules = self
            .rules
            .write()
            .map_err(|_| StoreError::LockPoisoned("remove"))?;
        Ok(rules.remove(id).is_some())
    }

    /// Remove every rule, returning how many were dropped.
    pub fn clear(&self) -> Result<usize, StoreError> {
        let mut rules = self
            .rules
            .write()
            .map_err(|_| StoreError::LockPoisoned("clear"))?;
        let count = rules.len();
        rules.clear();
        Ok(count)
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        let rules = self
            .rules
            .read()
            .map_err(|_| StoreError::LockPoisoned("len"))?;
        Ok(rules.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}
