/// Union-find arena for one labeling pass.
///
/// Each foreground pixel that starts a new region allocates a class. Classes
/// are merged by pointing the later root at the earlier one, so every root is
/// the first class of its set in raster order. Sessions are independent; no
/// state survives between passes.
#[derive(Debug, Default)]
pub struct LabelingSession {
    parent: Vec<u32>,
}

impl LabelingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class_count(&self) -> usize {
        self.parent.len()
    }

    #[inline]
    pub fn make_class(&mut self) -> u32 {
        let id = self.parent.len() as u32;
        self.parent.push(id);
        id
    }

    /// Root of `class`, compressing the path behind it.
    #[inline]
    pub fn find(&mut self, class: u32) -> u32 {
        let mut root = class;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }

        let mut current = class;
        while current != root {
            let next = self.parent[current as usize];
            self.parent[current as usize] = root;
            current = next;
        }
        root
    }

    /// Merges the sets of `a` and `b`, returning the surviving root.
    #[inline]
    pub fn union(&mut self, a: u32, b: u32) -> u32 {
        let root_a = self.find(a);
        let root_b = self.find(b);
        let (keep, merged) = if root_a <= root_b {
            (root_a, root_b)
        } else {
            (root_b, root_a)
        };
        self.parent[merged as usize] = keep;
        keep
    }

    /// Maps every class to a final label in `1..=count`, numbered by the
    /// raster order of each set's first class.
    pub fn finalize(&mut self) -> (Vec<u32>, usize) {
        let mut labels = vec![0u32; self.parent.len()];
        let mut count = 0u32;
        for class in 0..self.parent.len() as u32 {
            let root = self.find(class);
            if root == class {
                count += 1;
                labels[class as usize] = count;
            } else {
                // roots precede their members, so the root is already labeled
                labels[class as usize] = labels[root as usize];
            }
        }
        (labels, count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_keeps_earliest_root() {
        let mut session = LabelingSession::new();
        let a = session.make_class();
        let b = session.make_class();
        let c = session.make_class();

        assert_eq!(session.union(c, b), b);
        assert_eq!(session.union(c, a), a);
        assert_eq!(session.find(b), a);
        assert_eq!(session.find(c), a);
    }

    #[test]
    fn finalize_numbers_sets_in_creation_order() {
        let mut session = LabelingSession::new();
        let ids: Vec<u32> = (0..5).map(|_| session.make_class()).collect();
        session.union(ids[4], ids[1]);
        session.union(ids[3], ids[0]);

        let (labels, count) = session.finalize();
        assert_eq!(count, 3);
        assert_eq!(labels, vec![1, 2, 3, 1, 2]);
    }

    #[test]
    fn sessions_are_independent() {
        let mut first = LabelingSession::new();
        first.make_class();
        first.make_class();
        let mut second = LabelingSession::new();
        assert_eq!(second.make_class(), 0);
        assert_eq!(first.class_count(), 2);
    }
}
