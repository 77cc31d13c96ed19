use crate::pool::Recycle;

/// Binary min-heap of `(item, score)` pairs, used as the search's open set.
///
/// There is no decrease-key: an item enqueued twice occupies two slots. Among equal scores the
/// dequeue order is fixed by the sift rules, so searches are deterministic.
#[derive(Debug, Clone)]
pub struct PriorityQueue<T> {
    elements: Vec<(T, f32)>,
}

impl<T> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PriorityQueue<T> {
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            elements: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    pub fn peek_score(&self) -> Option<f32> {
        self.elements.first().map(|(_, score)| *score)
    }

    pub fn enqueue(&mut self, item: T, score: f32) {
        self.elements.push((item, score));
        let mut child = self.elements.len() - 1;
        while child > 0 {
            let parent = (child - 1) / 2;
            if self.elements[parent].1 <= self.elements[child].1 {
                break;
            }
            self.elements.swap(parent, child);
            child = parent;
        }
    }

    /// Remove the lowest-scored item. `None` when empty.
    pub fn dequeue(&mut self) -> Option<T> {
        if self.elements.is_empty() {
            return None;
        }
        let (item, _) = self.elements.swap_remove(0);

        let len = self.elements.len();
        let mut parent = 0;
        loop {
            let left = 2 * parent + 1;
            let right = left + 1;
            let mut min = parent;
            if left < len && self.elements[left].1 < self.elements[min].1 {
                min = left;
            }
            if right < len && self.elements[right].1 < self.elements[min].1 {
                min = right;
            }
            if min == parent {
                break;
            }
            self.elements.swap(parent, min);
            parent = min;
        }

        Some(item)
    }
}

impl<T> Recycle for PriorityQueue<T> {
    fn recycle(&mut self) {
        self.clear();
    }
}
