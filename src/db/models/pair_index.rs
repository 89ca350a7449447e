use serde::{Deserialize, Serialize};

use super::Pair;

/// Build the adjacency key joining `token` to a candidate counterpart.
pub fn pair_index_key(token: &str, candidate: &str) -> String {
    format!("{}-{}", token, candidate)
}

/// Adjacency entry: which pair joins a token to a candidate token.
///
/// Primary Key: `{token}-{candidate}`
/// Query Pattern: "Which pair trades token X against whitelist token Y"
///
/// Populated in both directions for each pair:
/// - token0-token1 -> pair
/// - token1-token0 -> pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairIndexEntry {
    pub token: String,
    pub candidate: String,
    pub pair_address: String,
}

impl PairIndexEntry {
    pub fn key(&self) -> String {
        pair_index_key(&self.token, &self.candidate)
    }

    /// Create both adjacency entries for a pair (one for each token direction)
    pub fn from_pair(pair: &Pair) -> (Self, Self) {
        let entry_for_token0 = Self {
            token: pair.token0.clone(),
            candidate: pair.token1.clone(),
            pair_address: pair.id.clone(),
        };

        let entry_for_token1 = Self {
            token: pair.token1.clone(),
            candidate: pair.token0.clone(),
            pair_address: pair.id.clone(),
        };

        (entry_for_token0, entry_for_token1)
    }
}
