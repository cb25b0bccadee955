/// TreePath: compact root-to-node path for removal shortcuts.
///
/// Each level takes 3 bits (enough for 8 octants; quadrants use the low 2).
/// A leading 1 bit marks where the path starts, so the root is `0b1`, its
/// child 2 is `0b1_010`, and so on. Paths stay meaningful after later
/// splits or merges: they still name an ancestor or descendant of every
/// leaf the object moved to, which is all targeted removal needs.

/// Bits used per tree level
pub const BITS_PER_LEVEL: u32 = 3;

const LEVEL_MASK: u32 = (1 << BITS_PER_LEVEL) - 1;

/// Bit-packed path from the root to a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreePath(u32);

impl TreePath {
    /// Path of the root node
    pub const ROOT: TreePath = TreePath(1);

    /// Deepest level a path can encode
    pub const MAX_DEPTH: u32 = (u32::BITS - 1) / BITS_PER_LEVEL;

    /// Rebuild a path from its raw bits, rejecting values without an
    /// aligned termination marker.
    pub fn from_bits(bits: u32) -> Option<Self> {
        if bits == 0 {
            return None;
        }
        let marker = u32::BITS - 1 - bits.leading_zeros();
        (marker % BITS_PER_LEVEL == 0).then_some(Self(bits))
    }

    /// Raw bit representation
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Depth of the node this path names (root = 0)
    pub fn depth(self) -> u32 {
        (u32::BITS - 1 - self.0.leading_zeros()) / BITS_PER_LEVEL
    }

    /// Path of child `index` below this node.
    pub fn child(self, index: usize) -> Self {
        debug_assert!(index <= LEVEL_MASK as usize, "child index out of range: {}", index);
        debug_assert!(self.depth() < Self::MAX_DEPTH, "tree path overflow");
        Self((self.0 << BITS_PER_LEVEL) | index as u32)
    }

    /// Path of the parent node, `None` for the root.
    pub fn parent(self) -> Option<Self> {
        (self.depth() > 0).then(|| Self(self.0 >> BITS_PER_LEVEL))
    }

    /// Child index taken when stepping from `level` to `level + 1`.
    pub fn index_at(self, level: u32) -> Option<usize> {
        let depth = self.depth();
        if level >= depth {
            return None;
        }
        let shift = (depth - 1 - level) * BITS_PER_LEVEL;
        Some(((self.0 >> shift) & LEVEL_MASK) as usize)
    }

    /// Child indices from the root down to this node.
    pub fn indices(self) -> impl Iterator<Item = usize> {
        (0..self.depth()).filter_map(move |level| self.index_at(level))
    }

    /// Whether `self` is `other` or one of its ancestors.
    pub fn is_ancestor_of(self, other: TreePath) -> bool {
        let (a, b) = (self.depth(), other.depth());
        a <= b && (other.0 >> ((b - a) * BITS_PER_LEVEL)) == self.0
    }
}

impl Default for TreePath {
    fn default() -> Self {
        Self::ROOT
    }
}

#[cfg(test)]
#[path = "path_tests.rs"]
mod tests;
