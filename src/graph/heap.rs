use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Binary min-heap that tracks where each item sits, so an item's priority
/// can be lowered in place in O(log n).
///
/// Misuse (inserting an item twice, decreasing an absent item or decreasing
/// to a priority that is not lower) is a caller bug and panics.
#[derive(Clone, Debug)]
pub struct IndexedHeap<T, P> {
    entries: Vec<(T, P)>,
    positions: HashMap<T, usize>,
}

impl<T, P> Default for IndexedHeap<T, P> {
    fn default() -> Self {
        IndexedHeap {
            entries: Vec::new(),
            positions: HashMap::new(),
        }
    }
}

impl<T, P> IndexedHeap<T, P>
where
    T: Eq + Hash + Clone + Debug,
    P: Ord + Copy + Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, item: &T) -> bool {
        self.positions.contains_key(item)
    }

    pub fn priority(&self, item: &T) -> Option<P> {
        self.positions.get(item).map(|&i| self.entries[i].1)
    }

    pub fn insert(&mut self, item: T, priority: P) {
        assert!(
            !self.positions.contains_key(&item),
            "{item:?} is already queued"
        );
        let index = self.entries.len();
        self.positions.insert(item.clone(), index);
        self.entries.push((item, priority));
        self.sift_up(index);
    }

    /// Remove and return the item with the lowest priority.
    pub fn extract_min(&mut self) -> Option<T> {
        self.extract_min_entry().map(|(item, _)| item)
    }

    pub fn extract_min_entry(&mut self) -> Option<(T, P)> {
        if self.entries.is_empty() {
            return None;
        }
        let last = self.entries.len() - 1;
        self.swap(0, last);
        let (item, priority) = self.entries.pop()?;
        self.positions.remove(&item);
        if !self.entries.is_empty() {
            self.sift_down(0);
        }
        Some((item, priority))
    }

    /// Lower the priority of a queued item.
    pub fn decrease_priority(&mut self, item: &T, priority: P) {
        let Some(&index) = self.positions.get(item) else {
            panic!("{item:?} is not queued");
        };
        let current = self.entries[index].1;
        assert!(
            priority < current,
            "cannot decrease {item:?} from {current:?} to {priority:?}"
        );
        self.entries[index].1 = priority;
        self.sift_up(index);
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.entries.swap(a, b);
        self.positions.insert(self.entries[a].0.clone(), a);
        self.positions.insert(self.entries[b].0.clone(), b);
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.entries[index].1 >= self.entries[parent].1 {
                break;
            }
            self.swap(index, parent);
            index = parent;
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.entries.len();
        loop {
            let left = 2 * index + 1;
            let right = left + 1;
            let mut smallest = index;
            if left < len && self.entries[left].1 < self.entries[smallest].1 {
                smallest = left;
            }
            if right < len && self.entries[right].1 < self.entries[smallest].1 {
                smallest = right;
            }
            if smallest == index {
                break;
            }
            self.swap(index, smallest);
            index = smallest;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::IndexedHeap;

    #[test]
    fn extracts_in_priority_order() {
        let mut heap = IndexedHeap::new();
        for (item, priority) in [("d", 40), ("a", 10), ("c", 30), ("e", 50), ("b", 20)] {
            heap.insert(item, priority);
        }
        assert_eq!(heap.len(), 5);
        let order: Vec<_> = std::iter::from_fn(|| heap.extract_min()).collect();
        assert_eq!(order, vec!["a", "b", "c", "d", "e"]);
        assert!(heap.is_empty());
        assert_eq!(heap.extract_min(), None);
    }

    #[test]
    fn decrease_priority_reorders() {
        let mut heap = IndexedHeap::new();
        heap.insert(1usize, 10i64);
        heap.insert(2, 20);
        heap.insert(3, 30);
        heap.decrease_priority(&3, 5);
        assert_eq!(heap.priority(&3), Some(5));
        assert_eq!(heap.extract_min_entry(), Some((3, 5)));
        assert_eq!(heap.extract_min(), Some(1));
        assert!(heap.contains(&2));
        assert!(!heap.contains(&3));
    }

    #[test]
    fn ties_follow_insertion_order() {
        let mut first = IndexedHeap::new();
        let mut second = IndexedHeap::new();
        for item in ["x", "y", "z", "w"] {
            first.insert(item, 7);
            second.insert(item, 7);
        }
        let a: Vec<_> = std::iter::from_fn(|| first.extract_min()).collect();
        let b: Vec<_> = std::iter::from_fn(|| second.extract_min()).collect();
        assert_eq!(a, b);
    }

    #[test]
    #[should_panic(expected = "cannot decrease")]
    fn decreasing_to_a_higher_priority_panics() {
        let mut heap = IndexedHeap::new();
        heap.insert('a', 1);
        heap.decrease_priority(&'a', 1);
    }

    #[test]
    #[should_panic(expected = "is not queued")]
    fn decreasing_an_absent_item_panics() {
        let mut heap: IndexedHeap<char, i32> = IndexedHeap::new();
        heap.decrease_priority(&'a', 0);
    }

    #[test]
    #[should_panic(expected = "already queued")]
    fn double_insert_panics() {
        let mut heap = IndexedHeap::new();
        heap.insert('a', 1);
        heap.insert('a', 0);
    }
}
