/// Sequential union-find over labels `1..`. Label 0 is never a member.
#[derive(Debug, Default)]
pub(crate) struct UnionFind {
    parent: Vec<u32>,
}

impl UnionFind {
    pub(crate) fn new() -> Self {
        Self {
            parent: Vec::with_capacity(256),
        }
    }

    /// Union-find pre-populated with singleton sets `1..=count`.
    pub(crate) fn with_sets(count: usize) -> Self {
        Self {
            parent: (1..=count as u32).collect(),
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.parent.len()
    }

    #[inline]
    pub(crate) fn make_set(&mut self) -> u32 {
        let label = self.parent.len() as u32 + 1;
        self.parent.push(label);
        label
    }

    /// Find root with iterative path compression (two-pass).
    pub(crate) fn find(&mut self, label: u32) -> u32 {
        debug_assert!(label >= 1 && label as usize <= self.parent.len());

        let mut root = label;
        loop {
            let parent = self.parent[(root - 1) as usize];
            if parent == root {
                break;
            }
            root = parent;
        }

        let mut current = label;
        while current != root {
            let idx = (current - 1) as usize;
            let parent = self.parent[idx];
            self.parent[idx] = root;
            current = parent;
        }

        root
    }

    /// Join two sets. The smaller root always wins, so every root is the
    /// lowest label of its set.
    pub(crate) fn union(&mut self, a: u32, b: u32) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a != root_b {
            let (smaller, larger) = if root_a < root_b {
                (root_a, root_b)
            } else {
                (root_b, root_a)
            };
            self.parent[(larger - 1) as usize] = smaller;
        }
    }

    /// Dense numbering of sets: `map[label]` is the set index in `1..=n`,
    /// assigned in ascending order of each set's lowest label. `map[0] == 0`.
    pub(crate) fn dense_map(&mut self) -> (Vec<u32>, usize) {
        let len = self.parent.len();
        let mut map = vec![0u32; len + 1];
        let mut count = 0u32;

        for label in 1..=len as u32 {
            let root = self.find(label);
            if map[root as usize] == 0 {
                count += 1;
                map[root as usize] = count;
            }
            map[label as usize] = map[root as usize];
        }

        (map, count as usize)
    }

    /// Rewrite provisional labels to their dense set index; returns the set count.
    pub(crate) fn flatten_labels(&mut self, labels: &mut [u32]) -> usize {
        if self.parent.is_empty() {
            return 0;
        }

        let (map, count) = self.dense_map();
        for l in labels.iter_mut() {
            if *l != 0 {
                *l = map[*l as usize];
            }
        }
        count
    }
}
