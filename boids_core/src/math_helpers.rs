use glam::DVec2;

use crate::options::FieldSize;

/// Wraps a single coordinate into [0, size), a toroidal "wrap around" of one axis.
///
/// `rem_euclid` alone may round a tiny negative value up to `size` itself,
/// which is the same point on the torus as 0.
#[inline]
pub fn wrap(value: f64, size: f64) -> f64 {
    let wrapped = value.rem_euclid(size);
    if wrapped >= size {
        0.
    } else {
        wrapped
    }
}

/// Wraps a position into the field on both axes
#[inline]
pub fn wrap_position(position: DVec2, field: &FieldSize) -> DVec2 {
    DVec2::new(wrap(position.x, field.width), wrap(position.y, field.height))
}

/// Arithmetic mean of a set of vectors, `None` for an empty set
pub fn mean<I>(vectors: I) -> Option<DVec2>
where
    I: IntoIterator<Item = DVec2>,
{
    let (sum, count) = vectors
        .into_iter()
        .fold((DVec2::ZERO, 0usize), |(sum, count), v| (sum + v, count + 1));

    match count {
        0 => None,
        n => Some(sum / n as f64),
    }
}

/// Mean squared deviation from the mean, summed over both axes
pub fn variance<I>(vectors: I) -> Option<f64>
where
    I: IntoIterator<Item = DVec2>,
    I::IntoIter: Clone,
{
    let vectors = vectors.into_iter();
    let centre = mean(vectors.clone())?;
    let (sum, count) = vectors.fold((0., 0usize), |(sum, count), v| {
        (sum + (v - centre).length_squared(), count + 1)
    });

    Some(sum / count as f64)
}
