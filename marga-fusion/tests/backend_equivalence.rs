//! Row and column stores loaded from the same log answer every query alike.

mod common;

use marga_fusion::{ColumnTable, Error, PathLog, PathSample, RowTable, TrajectoryStore};

fn load() -> (RowTable, ColumnTable) {
    let csv = common::path_log_csv(&common::straight_trip(12, 0.1, 5.0, 15));
    let file = common::temp_file(&csv);
    let rows = PathLog::from_csv_path(file.path()).unwrap().into_row_table();
    let columns = PathLog::from_csv_path(file.path())
        .unwrap()
        .into_column_table()
        .unwrap();
    (rows, columns)
}

fn assert_same_sample(a: &PathSample, b: &PathSample) {
    assert_eq!(a.generation_timestamp, b.generation_timestamp);
    assert!(a.generation_pose.approx_eq(&b.generation_pose, 1e-12, 1e-12));
    assert_eq!(a.current_speed, b.current_speed);
    assert_eq!(a.current_pose.is_some(), b.current_pose.is_some());
    assert_eq!(a.path.len(), b.path.len());
    for (p, q) in a.path.iter().zip(b.path.iter()) {
        assert!(p.distance(q) < 1e-12);
    }
}

#[test]
fn test_nearest_sample_matches() {
    let (rows, columns) = load();
    assert_eq!(rows.len(), 12);
    assert_eq!(columns.len(), rows.len());
    assert_eq!(columns.width(), 15);

    let mut t = -1.0;
    while t < 2.5 {
        let index = rows.nearest_index(t).unwrap();
        assert_eq!(columns.nearest_index(t).unwrap(), index, "t = {t}");
        assert_same_sample(
            &rows.find_nearest_sample(t).unwrap(),
            &columns.find_nearest_sample(t).unwrap(),
        );
        assert_eq!(rows.speed_at(t).unwrap(), columns.speed_at(t).unwrap());
        t += 0.037;
    }
}

#[test]
fn test_world_paths_match() {
    let (rows, columns) = load();
    for i in 0..rows.len() {
        let t = rows.timestamp(i);
        let (a, pose_a) = rows.path_in_world_coordinates(t).unwrap();
        let (b, pose_b) = columns.path_in_world_coordinates(t).unwrap();
        assert_eq!(pose_a, pose_b);
        assert_eq!(a.len(), b.len());
        // Straight paths ahead of a pose on the x axis stay on the x axis
        assert!(a.iter().all(|p| p.y.abs() < 1e-12));
        assert!(a.iter().zip(b.iter()).all(|(p, q)| p.distance(q) < 1e-12));
    }
}

#[test]
fn test_padding_is_not_a_point() {
    let (rows, columns) = load();
    // Paths alternate between 15, 14 and 13 points
    for (i, expected) in [(0, 15), (1, 14), (2, 13), (3, 15)] {
        assert_eq!(rows.sample(i).path.len(), expected);
        assert_eq!(columns.sample(i).path.len(), expected);
    }
}

#[test]
fn test_empty_log_errors_alike() {
    let header = common::path_log_csv(&[]);
    let file = common::temp_file(&header);
    let rows = PathLog::from_csv_path(file.path()).unwrap().into_row_table();
    let columns = PathLog::from_csv_path(file.path())
        .unwrap()
        .into_column_table()
        .unwrap();

    for store in [&rows as &dyn TrajectoryStore, &columns] {
        assert!(store.is_empty());
        assert!(matches!(store.nearest_index(0.0), Err(Error::EmptyTable)));
        assert!(matches!(store.speed_at(0.0), Err(Error::EmptyTable)));
    }
}
