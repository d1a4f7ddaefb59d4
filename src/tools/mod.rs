//! Reusable structures for the graph modules

pub mod block_arena;
