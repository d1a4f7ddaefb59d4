//! Block arena for bulk node allocation
//!
//! Useful when a lot of small same-size allocations are needed.  Memory is
//! obtained in large blocks and handed out in order, so a single allocation
//! costs almost nothing, and nothing is tracked per allocation.  Everything
//! is released in one sweep when the arena is dropped.  Callers address
//! items by `u32` index rather than by pointer.

use crate::Error;

pub const DEFAULT_BLOCK_SIZE: usize = 4096;

pub struct BlockArena<T> {
    per_block: usize,
    blocks: Vec<Vec<T>>
}

impl <T> BlockArena<T> {
    /// Create an arena whose blocks are `block_size` bytes.  An item type
    /// that does not fit in one block is refused.
    pub fn create(block_size: usize) -> Result<Self,Error> {
        let item_size = std::mem::size_of::<T>().max(1);
        if item_size > block_size {
            return Err(Error::OversizeAllocation);
        }
        Ok(Self {
            per_block: block_size / item_size,
            blocks: Vec::new()
        })
    }
    /// Store `item` and return its index.  A new block is opened when the
    /// current one is full.
    pub fn alloc(&mut self,item: T) -> u32 {
        match self.blocks.last() {
            Some(block) if block.len() < self.per_block => {},
            _ => self.blocks.push(Vec::with_capacity(self.per_block))
        }
        let block = self.blocks.last_mut().unwrap();
        block.push(item);
        let block_len = block.len();
        ((self.blocks.len() - 1) * self.per_block + block_len - 1) as u32
    }
    /// number of items allocated so far
    pub fn len(&self) -> usize {
        match self.blocks.last() {
            Some(block) => (self.blocks.len() - 1) * self.per_block + block.len(),
            None => 0
        }
    }
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
    /// visit every allocated item, block by block
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.blocks.iter_mut().flat_map(|block| block.iter_mut())
    }
}

impl <T> std::ops::Index<u32> for BlockArena<T> {
    type Output = T;
    fn index(&self,id: u32) -> &T {
        let idx = id as usize;
        &self.blocks[idx / self.per_block][idx % self.per_block]
    }
}

impl <T> std::ops::IndexMut<u32> for BlockArena<T> {
    fn index_mut(&mut self,id: u32) -> &mut T {
        let idx = id as usize;
        &mut self.blocks[idx / self.per_block][idx % self.per_block]
    }
}

#[test]
fn allocate_single() {
    let mut arena: BlockArena<u64> = BlockArena::create(DEFAULT_BLOCK_SIZE).expect("create failed");
    let id = arena.alloc(99);
    assert_eq!(id,0);
    assert_eq!(arena[id],99);
    assert_eq!(arena.len(),1);
}

#[test]
fn allocate_multiple() {
    let mut arena: BlockArena<u64> = BlockArena::create(DEFAULT_BLOCK_SIZE).expect("create failed");
    let num_allocs = DEFAULT_BLOCK_SIZE / std::mem::size_of::<u64>() - 1;
    for i in 0..num_allocs {
        let id = arena.alloc(i as u64);
        assert_eq!(id,i as u32);
    }
    assert_eq!(arena.len(),num_allocs);
}

#[test]
fn allocate_multiple_blocks() {
    // small blocks so we cross a block boundary quickly
    let mut arena: BlockArena<u64> = BlockArena::create(64).expect("create failed");
    let num_allocs = 2 * 64 / std::mem::size_of::<u64>();
    for i in 0..num_allocs {
        let id = arena.alloc(1000 + i as u64);
        assert_eq!(id,i as u32);
    }
    for i in 0..num_allocs {
        assert_eq!(arena[i as u32],1000 + i as u64);
    }
}

#[test]
fn oversize_item_is_refused() {
    match BlockArena::<[u8;128]>::create(64) {
        Err(Error::OversizeAllocation) => {},
        _ => panic!("expected oversize error")
    }
}
