pub mod avl_tree;
pub mod bitree;
pub mod error;
pub mod morse;
pub mod tombstone;

pub use avl_tree::{AvlTree, Factor, Insertion};
pub use bitree::{BiTree, NodeId};
pub use error::{MorseError, MorseResult, TreeError, TreeResult};
pub use morse::{AlphabetT, Flags, Itu, Morse, Standard};
