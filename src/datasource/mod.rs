//! Data sources: shared buffers, strided views and windowed views.
//!
//! Buffers are owned by the producer and shared by reference counting. Views
//! borrow them and never copy values.

mod array;
mod buffer;
mod window;

pub use array::ArrayView;
pub use buffer::{Buffer, HostArray, MemoryOrder, OwnedArray, ScalarType};
pub use window::{XYView, XYZView, index_window};

/// First row whose first-column value is not less than `target`.
pub fn lower_bound(view: &ArrayView<'_>, target: f64) -> usize {
    if view.cols() == 0 {
        return 0;
    }
    let mut left = 0;
    let mut right = view.rows();
    while left < right {
        let mid = (left + right) / 2;
        if view.element(mid, 0) < target {
            left = mid + 1;
        } else {
            right = mid;
        }
    }
    left
}

/// First row whose first-column value is greater than `target`.
pub fn upper_bound(view: &ArrayView<'_>, target: f64) -> usize {
    if view.cols() == 0 {
        return 0;
    }
    let mut left = 0;
    let mut right = view.rows();
    while left < right {
        let mid = (left + right) / 2;
        if view.element(mid, 0) <= target {
            left = mid + 1;
        } else {
            right = mid;
        }
    }
    left
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_match_sorted_sequence_semantics() {
        let buffer = Buffer::from_vec(vec![0.0, 1.0, 1.0, 1.0, 2.0, 3.0]);
        let view = ArrayView::new(&buffer);
        assert_eq!(lower_bound(&view, 1.0), 1);
        assert_eq!(upper_bound(&view, 1.0), 4);
        assert_eq!(lower_bound(&view, 2.5), 5);
        assert_eq!(upper_bound(&view, -1.0), 0);
        assert_eq!(lower_bound(&view, 9.0), 6);
    }

    #[test]
    fn bounds_follow_column_major_first_column() {
        let values = vec![0.0, 5.0, 10.0, 99.0, 98.0, 97.0];
        let buffer =
            Buffer::from_vec_2d(values, 3, 2, MemoryOrder::ColumnMajor).expect("valid buffer");
        let view = ArrayView::new(&buffer);
        assert_eq!(lower_bound(&view, 5.0), 1);
        assert_eq!(upper_bound(&view, 5.0), 2);
    }

    #[test]
    fn bounds_on_empty_view_are_zero() {
        let buffer = Buffer::from_vec(Vec::new());
        let view = ArrayView::new(&buffer);
        assert_eq!(lower_bound(&view, 0.0), 0);
        assert_eq!(upper_bound(&view, 0.0), 0);
    }
}
