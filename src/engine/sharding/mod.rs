mod fold;
mod router;


pub use fold::{fold_sharded, merge_tree};
pub use router::ShardRouter;
