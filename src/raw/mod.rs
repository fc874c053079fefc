mod flat_tree;
mod hash_tree;
mod index;
mod node;

pub(crate) use flat_tree::RawFlatTree;
pub(crate) use hash_tree::RawHashTree;
pub(crate) use index::NodeIndex;
