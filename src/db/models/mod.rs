mod bundle;
mod pair;
mod pair_index;
mod token;

pub use bundle::{Bundle, BUNDLE_ID};
pub use pair::Pair;
pub use pair_index::{pair_index_key, PairIndexEntry};
pub use token::Token;
