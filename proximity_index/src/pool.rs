//! Pooled allocator of 8-node child blocks.
//!
//! An 8-node block is the unit of allocation for the octree's interior
//! nodes. The pool is a freelist of block ids; on exhaustion it grows by
//! [`CHUNK_BLOCKS`] blocks at once. Growth tracks total capacity so the
//! `allocated == 8 * free + 1` conservation invariant can be checked once
//! every non-root node has been returned (see [`NodePool::is_conserved`]).

/// Number of 8-node blocks carved from a single chunk on pool exhaustion.
pub const CHUNK_BLOCKS: u32 = 64;

#[derive(Debug, Default)]
pub struct NodePool {
    free_blocks: Vec<u32>,
    total_blocks: u32,
}

impl NodePool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out one free block id, growing the pool by a chunk first if
    /// none are free.
    pub fn request_block(&mut self) -> u32 {
        if self.free_blocks.is_empty() {
            self.grow_chunk();
        }
        self.free_blocks
            .pop()
            .expect("pool was just grown and must contain a free block")
    }

    pub fn return_block(&mut self, block_id: u32) {
        debug_assert!(
            !self.free_blocks.contains(&block_id),
            "block {block_id} returned twice"
        );
        self.free_blocks.push(block_id);
    }

    fn grow_chunk(&mut self) {
        let start = self.total_blocks;
        self.free_blocks
            .extend((start..start + CHUNK_BLOCKS).rev());
        self.total_blocks += CHUNK_BLOCKS;
        tracing::trace!(total_blocks = self.total_blocks, "grew node pool by a chunk");
    }

    #[must_use]
    pub fn total_blocks(&self) -> u32 {
        self.total_blocks
    }

    #[must_use]
    pub fn free_block_count(&self) -> u32 {
        self.free_blocks.len() as u32
    }

    /// Total node capacity this pool has ever carved, including the root
    /// node which lives outside the pool's own accounting.
    #[must_use]
    pub fn total_node_capacity(&self) -> u32 {
        self.total_blocks * 8 + 1
    }

    /// `true` once every non-root node has been returned: `allocated ==
    /// 8 * free + 1`. Meaningful right after a full [`clear`](super::octree::LooseOctree::clear),
    /// not while nodes are actively in use.
    #[must_use]
    pub fn is_conserved(&self) -> bool {
        self.total_node_capacity() == 8 * self.free_block_count() + 1
    }
}
