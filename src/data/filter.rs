use log::debug;

use super::model::CmdData;

/// Magnitudes at or beyond this are sentinels for "not recovered in this
/// filter" (the tables use 99 or 90, sometimes 30).
pub const SENTINEL_LIMIT: f64 = 30.0;

/// Return indices of rows where both `|color|` and `|mag|` are below
/// [`SENTINEL_LIMIT`], in their original order.
///
/// NaN fails the comparison and is therefore dropped as well.
pub fn detected_indices(color: &[f64], mag: &[f64]) -> Vec<usize> {
    color
        .iter()
        .zip(mag)
        .enumerate()
        .filter(|(_, (c, m))| c.abs() < SENTINEL_LIMIT && m.abs() < SENTINEL_LIMIT)
        .map(|(i, _)| i)
        .collect()
}

/// Drop undetected rows from `data`.
pub fn detected_only(data: &CmdData) -> CmdData {
    let keep = detected_indices(&data.color, &data.mag);
    debug!(
        "sentinel filter kept {} of {} rows",
        keep.len(),
        data.len()
    );
    data.select(&keep)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_rows_below_sentinel() {
        let color = vec![0.5, 45.0, -1.0, 0.2, -30.0, 29.999];
        let mag = vec![20.0, 21.0, 99.0, 30.0, 20.0, -29.999];
        let idx = detected_indices(&color, &mag);

        assert_eq!(idx, vec![0, 5]);
        for &i in &idx {
            assert!(color[i].abs() < SENTINEL_LIMIT);
            assert!(mag[i].abs() < SENTINEL_LIMIT);
        }
    }

    #[test]
    fn nan_rows_are_dropped() {
        let idx = detected_indices(&[f64::NAN, 1.0], &[20.0, f64::NAN]);
        assert!(idx.is_empty());
    }

    #[test]
    fn detected_only_filters_every_column() {
        let data = CmdData {
            color: vec![1.0, 70.0, 0.5],
            mag: vec![20.0, 22.0, 21.0],
            color_err: vec![0.1, 0.2, 0.3],
            mag_err: vec![0.01, 0.02, 0.03],
        };
        let kept = detected_only(&data);
        assert_eq!(kept.color, vec![1.0, 0.5]);
        assert_eq!(kept.color_err, vec![0.1, 0.3]);
        assert_eq!(kept.mag_err, vec![0.01, 0.03]);
    }
}
