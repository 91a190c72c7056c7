// ==========================================
// Coordinator-course assignment integration tests
// ==========================================


use academic_records::app::AppState;
use academic_records::engine::{CoordinatorError, ErrorKind};
use test_helpers::create_test_db;

fn setup() -> (tempfile::NamedTempFile, AppState) {
    let (temp_file, db_path) = create_test_db().unwrap();
    let state = AppState::new(&db_path).unwrap();
    (temp_file, state)
}

fn seed_coordinator(state: &AppState, registration: &str, active: bool) -> i64 {
    state
        .coordinator_repo
        .insert(
            registration,
            &format!("Coordinator {registration}"),
            &format!("{registration}@uni.example"),
            Some("Exact Sciences"),
            active,
        )
        .unwrap()
}

fn seed_course(state: &AppState, code: &str) -> i64 {
    state
        .lookup_repo
        .insert_course(code, &format!("Course {code}"))
        .unwrap()
}

#[test]
fn add_course_is_idempotent() {
    let (_guard, state) = setup();
    let k = seed_coordinator(&state, "2600001", true);
    let g = seed_course(&state, "CS");

    state.coordinator_courses.add_course(k, g).unwrap();
    // relinking an existing pair is a no-op, not an error
    state.coordinator_courses.add_course(k, g).unwrap();

    assert_eq!(state.coordinator_courses.count_courses(k).unwrap(), 1);
    assert_eq!(state.coordinator_courses.courses_of(k).unwrap(), vec![g]);
}

#[test]
fn add_and_remove_validate_existence() {
    let (_guard, state) = setup();
    let k = seed_coordinator(&state, "2600001", true);
    let g = seed_course(&state, "CS");

    let err = state.coordinator_courses.add_course(9999, g).unwrap_err();
    assert!(matches!(err, CoordinatorError::CoordinatorNotFound(9999)));
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = state.coordinator_courses.add_course(k, 9999).unwrap_err();
    assert!(matches!(err, CoordinatorError::CourseNotFound(9999)));

    let err = state
        .coordinator_courses
        .remove_course(9999, g)
        .unwrap_err();
    assert!(matches!(err, CoordinatorError::CoordinatorNotFound(9999)));
}

#[test]
fn a_course_keeps_its_last_active_coordinator() {
    let (_guard, state) = setup();
    let k = seed_coordinator(&state, "2600001", true);
    let g = seed_course(&state, "CS");
    state.coordinator_courses.add_course(k, g).unwrap();

    // K is the sole active coordinator: removal is rejected
    let err = state.coordinator_courses.remove_course(k, g).unwrap_err();
    assert!(matches!(err, CoordinatorError::LastActiveCoordinator { .. }));
    assert_eq!(err.kind(), ErrorKind::Conflict);

    // a second ACTIVE coordinator unblocks the removal
    let k2 = seed_coordinator(&state, "2600002", true);
    state.coordinator_courses.add_course(k2, g).unwrap();
    state.coordinator_courses.remove_course(k, g).unwrap();

    assert_eq!(state.coordinator_courses.count_courses(k).unwrap(), 0);
    let active = state.coordinator_courses.find_active_by_course(g).unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, k2);
}

#[test]
fn inactive_coordinators_do_not_count_toward_the_guard() {
    let (_guard, state) = setup();
    let k = seed_coordinator(&state, "2600001", true);
    let dormant = seed_coordinator(&state, "2600002", false);
    let g = seed_course(&state, "CS");
    state.coordinator_courses.add_course(k, g).unwrap();
    state.coordinator_courses.add_course(dormant, g).unwrap();

    // the inactive link does not satisfy the minimum cardinality
    let err = state.coordinator_courses.remove_course(k, g).unwrap_err();
    assert!(matches!(err, CoordinatorError::LastActiveCoordinator { .. }));

    // reactivating the dormant coordinator unblocks it
    state.coordinator_courses.activate(dormant).unwrap();
    state.coordinator_courses.remove_course(k, g).unwrap();
}

#[test]
fn inactivate_feeds_the_cardinality_guard() {
    let (_guard, state) = setup();
    let k = seed_coordinator(&state, "2600001", true);
    let k2 = seed_coordinator(&state, "2600002", true);
    let g = seed_course(&state, "CS");
    state.coordinator_courses.add_course(k, g).unwrap();
    state.coordinator_courses.add_course(k2, g).unwrap();

    state.coordinator_courses.inactivate(k2).unwrap();

    let err = state.coordinator_courses.remove_course(k, g).unwrap_err();
    assert!(matches!(err, CoordinatorError::LastActiveCoordinator { .. }));
}

#[test]
fn delete_requires_an_empty_course_list() {
    let (_guard, state) = setup();
    let k = seed_coordinator(&state, "2600001", true);
    let k2 = seed_coordinator(&state, "2600002", true);
    let g = seed_course(&state, "CS");
    state.coordinator_courses.add_course(k, g).unwrap();
    state.coordinator_courses.add_course(k2, g).unwrap();

    let err = state.coordinator_courses.delete(k).unwrap_err();
    assert!(matches!(
        err,
        CoordinatorError::HasLinkedCourses { count: 1, .. }
    ));

    state.coordinator_courses.remove_course(k, g).unwrap();
    state.coordinator_courses.delete(k).unwrap();
    assert!(state.coordinator_courses.find_coordinator(k).is_err());
}
