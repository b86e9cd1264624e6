//! Mirrors upstream `trie/*` family.

pub mod index;
#[path = "TrieNode.rs"]
pub mod trie_node;

pub use trie_node::TrieNode;
