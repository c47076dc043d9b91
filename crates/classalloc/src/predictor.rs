/// Tracks per-class hit counts and caches the most frequently routed class.
///
/// The hot index only moves when another class strictly overtakes it, so
/// on ties the class that reached the maximum first keeps the title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotClassPredictor {
    hits: Box<[u64]>,
    hot: usize,
}

impl HotClassPredictor {
    /// A predictor over `classes` classes, all counters zero, hot index 0.
    pub fn new(classes: usize) -> Self {
        assert!(classes > 0, "predictor needs at least one class");
        HotClassPredictor {
            hits: vec![0; classes].into_boxed_slice(),
            hot: 0,
        }
    }

    /// Record one hit for `class`.
    ///
    /// `class` must be in range; callers outside the crate go through
    /// `ClassAllocator::learn`, which checks it.
    #[inline]
    pub fn learn(&mut self, class: usize) {
        let count = self.hits[class].saturating_add(1);
        self.hits[class] = count;
        if count > self.hits[self.hot] {
            self.hot = class;
        }
    }

    #[inline]
    pub fn current_hot_index(&self) -> usize {
        self.hot
    }

    pub fn hits(&self, class: usize) -> u64 {
        self.hits[class]
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// `(class, count)` pairs in class order.
    pub fn snapshot(&self) -> Vec<(usize, u64)> {
        self.hits.iter().copied().enumerate().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_predictor_points_at_class_zero() {
        let p = HotClassPredictor::new(6);
        assert_eq!(p.current_hot_index(), 0);
        assert!(p.snapshot().iter().all(|&(_, n)| n == 0));
    }

    #[test]
    fn overtaking_class_becomes_hot() {
        let mut p = HotClassPredictor::new(4);
        p.learn(0);
        p.learn(2);
        assert_eq!(p.current_hot_index(), 0);
        p.learn(2);
        assert_eq!(p.current_hot_index(), 2);
    }

    #[test]
    fn first_to_reach_maximum_keeps_title() {
        let mut p = HotClassPredictor::new(3);
        p.learn(1);
        p.learn(1);
        p.learn(2);
        p.learn(2);
        assert_eq!(p.hits(1), p.hits(2));
        assert_eq!(p.current_hot_index(), 1);
    }

    #[test]
    fn first_hit_on_cold_start_moves_off_class_zero() {
        let mut p = HotClassPredictor::new(3);
        p.learn(2);
        assert_eq!(p.current_hot_index(), 2);
    }

    #[test]
    fn snapshot_is_read_only() {
        let mut p = HotClassPredictor::new(3);
        p.learn(1);
        let before = p.clone();
        let snap = p.snapshot();
        assert_eq!(snap, vec![(0, 0), (1, 1), (2, 0)]);
        assert_eq!(p, before);
    }
}
