pub struct StatsHelper;

impl StatsHelper {
    pub fn mean(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let sum: f64 = values.iter().sum();
        Some(sum / values.len() as f64)
    }

    /// Smallest and largest value, or `None` for an empty input.
    pub fn extent<I>(values: I) -> Option<(f64, f64)>
    where
        I: IntoIterator<Item = f64>,
    {
        values.into_iter().fold(None, |acc, value| match acc {
            None => Some((value, value)),
            Some((min, max)) => Some((min.min(value), max.max(value))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_empty_sequence_is_undefined() {
        assert_eq!(StatsHelper::mean(&[]), None);
        assert_eq!(StatsHelper::mean(&[2.0, 4.0]), Some(3.0));
    }

    #[test]
    fn extent_handles_single_value() {
        assert_eq!(StatsHelper::extent([4.0]), Some((4.0, 4.0)));
        assert_eq!(StatsHelper::extent([3.0, -1.0, 7.5]), Some((-1.0, 7.5)));
        assert_eq!(StatsHelper::extent(std::iter::empty()), None);
    }
}
