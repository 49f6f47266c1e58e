use super::*;

#[test]
fn test_calculate_strides() {
    assert_eq!(calculate_strides(&[2, 3]), vec![3, 1]);
    assert_eq!(calculate_strides(&[2, 4, 6]), vec![24, 6, 1]);
    assert_eq!(calculate_strides(&[5]), vec![1]);
}

#[test]
fn test_index_to_coord() {
    assert_eq!(index_to_coord(0, &[2, 3]), vec![0, 0]);
    assert_eq!(index_to_coord(4, &[2, 3]), vec![1, 1]);
    assert_eq!(index_to_coord(23, &[2, 3, 4]), vec![1, 2, 3]);
}

#[test]
fn test_axis_blocks() {
    assert_eq!(axis_blocks(&[2, 4, 6], 0), (1, 2, 24));
    assert_eq!(axis_blocks(&[2, 4, 6], 1), (2, 4, 6));
    assert_eq!(axis_blocks(&[2, 4, 6], 2), (8, 6, 1));
}
