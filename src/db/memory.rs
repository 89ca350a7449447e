use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::{
    models::{pair_index_key, Bundle, Pair, PairIndexEntry, Token},
    store::EntityStore,
};

/// Serializable view of a store's entities.
///
/// Pair index entries are not part of the snapshot; they are rebuilt from
/// the pairs on load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub tokens: Vec<Token>,
    #[serde(default)]
    pub pairs: Vec<Pair>,
    #[serde(default)]
    pub bundle: Option<Bundle>,
}

/// In-memory entity store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pairs: FxHashMap<String, Pair>,
    tokens: FxHashMap<String, Token>,
    bundles: FxHashMap<String, Bundle>,
    /// `{token}-{candidate}` -> pair address
    pair_index: FxHashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a snapshot.
    ///
    /// Ids are lowercased on the way in, matching what `Token::new`,
    /// `Pair::new` and address normalisation produce elsewhere.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut store = Self::new();
        for mut token in snapshot.tokens {
            token.id = token.id.to_lowercase();
            store.save_token(token);
        }
        for mut pair in snapshot.pairs {
            pair.id = pair.id.to_lowercase();
            pair.token0 = pair.token0.to_lowercase();
            pair.token1 = pair.token1.to_lowercase();
            store.register_pair(pair);
        }
        if let Some(bundle) = snapshot.bundle {
            store.save_bundle(bundle);
        }
        store
    }

    /// Save a pair together with both of its adjacency entries.
    pub fn register_pair(&mut self, pair: Pair) {
        let (forward, reverse) = PairIndexEntry::from_pair(&pair);
        self.save_pair_index_entry(forward);
        self.save_pair_index_entry(reverse);
        self.save_pair(pair);
    }

    /// Export all entities, sorted by id for stable output.
    pub fn snapshot(&self) -> Snapshot {
        let mut tokens: Vec<Token> = self.tokens.values().cloned().collect();
        tokens.sort_by(|a, b| a.id.cmp(&b.id));

        let mut pairs: Vec<Pair> = self.pairs.values().cloned().collect();
        pairs.sort_by(|a, b| a.id.cmp(&b.id));

        Snapshot {
            tokens,
            pairs,
            bundle: self.bundles.get(super::models::BUNDLE_ID).cloned(),
        }
    }

    /// Drop a pair without touching its index entries.
    ///
    /// Only useful for reproducing a dangling index entry.
    pub fn remove_pair(&mut self, id: &str) -> Option<Pair> {
        self.pairs.remove(id)
    }

    pub fn remove_token(&mut self, id: &str) -> Option<Token> {
        self.tokens.remove(id)
    }
}

impl EntityStore for MemoryStore {
    fn load_pair(&self, id: &str) -> Option<Pair> {
        self.pairs.get(id).cloned()
    }

    fn load_token(&self, id: &str) -> Option<Token> {
        self.tokens.get(id).cloned()
    }

    fn load_bundle(&self, id: &str) -> Option<Bundle> {
        self.bundles.get(id).cloned()
    }

    fn load_pair_index_entry(&self, token: &str, candidate: &str) -> Option<String> {
        self.pair_index.get(&pair_index_key(token, candidate)).cloned()
    }

    fn save_pair(&mut self, pair: Pair) {
        self.pairs.insert(pair.id.clone(), pair);
    }

    fn save_token(&mut self, token: Token) {
        self.tokens.insert(token.id.clone(), token);
    }

    fn save_bundle(&mut self, bundle: Bundle) {
        self.bundles.insert(bundle.id.clone(), bundle);
    }

    fn save_pair_index_entry(&mut self, entry: PairIndexEntry) {
        self.pair_index.insert(entry.key(), entry.pair_address);
    }
}
