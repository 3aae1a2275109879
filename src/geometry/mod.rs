use num_traits::Float;


/// Euclidean distance
pub fn euclidean<T>(x1: T, y1: T, x2: T, y2: T) -> T
where
    T: Float,
    {
    ((x1 - x2).powi(2) + (y1 - y2).powi(2)).sqrt()
}


/// Length of a polyline through integer grid points
/// Sums the euclidean length of every consecutive segment
pub fn polyline_length<I>(points: I) -> f64
where
    I: IntoIterator<Item = (i32, i32)>,
    {
    let mut length = 0.0;
    let mut previous: Option<(i32, i32)> = None;

    for (x, y) in points {
        if let Some((px, py)) = previous {
            length += euclidean(px as f64, py as f64, x as f64, y as f64);
        }
        previous = Some((x, y));
    }

    length
}


#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_euclidean() {
        assert_relative_eq!(euclidean(0.0f64, 0.0, 3.0, 4.0), 5.0);
        assert_relative_eq!(euclidean(1.5f32, -2.0, 1.5, 2.0), 4.0);
    }

    #[test]
    fn test_polyline_length() {
        assert_relative_eq!(polyline_length([(0, 0), (3, 4), (3, 10)]), 11.0);
        assert_relative_eq!(polyline_length([(2, 2)]), 0.0);
        assert_relative_eq!(polyline_length(Vec::new()), 0.0);
    }
}
