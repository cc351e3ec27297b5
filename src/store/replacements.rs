//! Per-guild replacement rule store.
//!
//! Each guild's rules are a mapping from target-user id to replacement text,
//! serialized as one JSON object under the guild-id key. Every operation is
//! a fresh read (or read-modify-write) against the persistence adapter; there
//! is no caching layer. Two interleaved writes for the same guild race and
//! the later write wins.

use std::collections::BTreeMap;

use crate::common::error::StoreError;
use crate::store::kv::KvStore;

/// A guild's replacement rules: target-user id -> replacement text.
pub type RuleSet = BTreeMap<String, String>;

/// Service object owning the persistence handle for replacement rules.
pub struct ReplacementStore {
    kv: KvStore,
}

impl ReplacementStore {
    pub fn new(kv: KvStore) -> Self {
        Self { kv }
    }

    /// Open a store at the given connection URL.
    pub fn open(url: &str) -> Result<Self, StoreError> {
        Ok(Self::new(KvStore::open(url)?))
    }

    /// The guild's current rule set; an absent key yields an empty set.
    pub fn get(&self, guild_id: &str) -> Result<RuleSet, StoreError> {
        match self.kv.get(guild_id)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(RuleSet::new()),
        }
    }

    /// Set (or overwrite) the replacement text for a target user.
    ///
    /// Empty text is accepted as-is; the rewriter treats it as "no rule".
    pub fn add(&self, guild_id: &str, target_id: &str, text: &str) -> Result<(), StoreError> {
        let mut rules = self.get(guild_id)?;
        rules.insert(target_id.to_string(), text.to_string());
        self.write(guild_id, &rules)
    }

    /// Remove the rule for a target user.
    ///
    /// Returns `false` without writing when no rule was configured.
    pub fn remove(&self, guild_id: &str, target_id: &str) -> Result<bool, StoreError> {
        let mut rules = self.get(guild_id)?;
        if rules.remove(target_id).is_none() {
            return Ok(false);
        }
        self.write(guild_id, &rules)?;
        Ok(true)
    }

    fn write(&self, guild_id: &str, rules: &RuleSet) -> Result<(), StoreError> {
        self.kv.set(guild_id, &serde_json::to_string(rules)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_store() -> ReplacementStore {
        ReplacementStore::new(KvStore::in_memory().unwrap())
    }

    #[test]
    fn test_unknown_guild_has_no_rules() {
        let store = make_store();
        assert!(store.get("1000").unwrap().is_empty());
    }

    #[test]
    fn test_add_preserves_existing_entries() {
        let store = make_store();
        store.add("1000", "11", "Alice").unwrap();
        store.add("1000", "22", "Bob").unwrap();

        let rules = store.get("1000").unwrap();
        assert_eq!(rules.get("11").map(String::as_str), Some("Alice"));
        assert_eq!(rules.get("22").map(String::as_str), Some("Bob"));
    }

    #[test]
    fn test_add_overwrites_same_target() {
        let store = make_store();
        store.add("1000", "11", "a").unwrap();
        store.add("1000", "11", "b").unwrap();

        let rules = store.get("1000").unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules.get("11").map(String::as_str), Some("b"));
    }

    #[test]
    fn test_remove_unknown_target_is_false() {
        let store = make_store();
        store.add("1000", "11", "Alice").unwrap();

        assert!(!store.remove("1000", "99").unwrap());
        assert_eq!(store.get("1000").unwrap().len(), 1);
    }

    #[test]
    fn test_add_then_remove_round_trips() {
        let store = make_store();
        store.add("1000", "11", "Alice").unwrap();
        store.add("1000", "22", "Bob").unwrap();

        assert!(store.remove("1000", "22").unwrap());

        let rules = store.get("1000").unwrap();
        assert!(!rules.contains_key("22"));
        assert_eq!(rules.get("11").map(String::as_str), Some("Alice"));
    }

    #[test]
    fn test_guilds_are_isolated() {
        let store = make_store();
        store.add("1000", "11", "Alice").unwrap();

        assert!(store.get("2000").unwrap().is_empty());
    }

    #[test]
    fn test_empty_replacement_text_is_stored() {
        let store = make_store();
        store.add("1000", "11", "").unwrap();

        assert_eq!(store.get("1000").unwrap().get("11").map(String::as_str), Some(""));
    }

    #[test]
    fn test_rules_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("rules.sqlite").display());

        {
            let store = ReplacementStore::open(&url).unwrap();
            store.add("1000", "11", "Alice").unwrap();
        }

        let store = ReplacementStore::open(&url).unwrap();
        assert_eq!(
            store.get("1000").unwrap().get("11").map(String::as_str),
            Some("Alice")
        );
    }
}
