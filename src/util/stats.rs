use std::fmt::Display;

#[derive(Clone, PartialEq)]
pub struct Stats {
    pub count: usize,
    pub min: usize,
    pub max: usize,
    pub avg: f32,
}

impl Stats {
    pub fn new_single(v: usize) -> Self {
        Stats {
            count: 1,
            min: v,
            max: v,
            avg: v as f32,
        }
    }

    pub fn add_sample(&mut self, value: usize) {
        self.count += 1;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.avg += (value as f32 - self.avg) / (self.count as f32);
    }

    pub fn add_samples(&mut self, values: impl IntoIterator<Item = usize>) {
        for value in values {
            self.add_sample(value);
        }
    }

    pub fn merge(&self, other: &Self) -> Self {
        Stats {
            count: self.count + other.count,
            min: self.min.min(other.min),
            max: self.max.max(other.max),
            avg: if self.count > 0 || other.count > 0 {
                (self.avg * self.count as f32 + other.avg * other.count as f32)
                    / (self.count + other.count) as f32
            } else {
                0.0
            },
        }
    }
}

impl Default for Stats {
    fn default() -> Self {
        Stats {
            count: 0,
            min: usize::MAX,
            max: 0,
            avg: 0.0,
        }
    }
}

impl Display for Stats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "no samples")
        } else {
            write!(f, "{} - {}; avg {:.1}", self.min, self.max, self.avg)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert2::assert;

    #[test]
    fn running_average() {
        let mut stats = Stats::default();
        stats.add_samples([1, 2, 3, 10]);
        assert!(stats.count == 4);
        assert!(stats.min == 1);
        assert!(stats.max == 10);
        assert!((stats.avg - 4.0).abs() < 1e-6);
    }

    #[test]
    fn merge_combines_counts() {
        let merged = Stats::new_single(2).merge(&Stats::new_single(6));
        assert!(merged.count == 2);
        assert!(merged.min == 2);
        assert!(merged.max == 6);
        assert!((merged.avg - 4.0).abs() < 1e-6);
    }
}
