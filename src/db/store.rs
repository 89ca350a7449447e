use super::models::{Bundle, Pair, PairIndexEntry, Token};

/// Entity lookups and writes the pricing core depends on.
///
/// Every load returns `None` for a missing entity instead of failing;
/// callers decide whether absence means "unpriced" or a data fault.
pub trait EntityStore {
    fn load_pair(&self, id: &str) -> Option<Pair>;
    fn load_token(&self, id: &str) -> Option<Token>;
    fn load_bundle(&self, id: &str) -> Option<Bundle>;
    /// Address of the pair joining `token` to `candidate`, if one was indexed.
    fn load_pair_index_entry(&self, token: &str, candidate: &str) -> Option<String>;

    fn save_pair(&mut self, pair: Pair);
    fn save_token(&mut self, token: Token);
    fn save_bundle(&mut self, bundle: Bundle);
    fn save_pair_index_entry(&mut self, entry: PairIndexEntry);
}
