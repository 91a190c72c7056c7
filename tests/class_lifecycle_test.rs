// ==========================================
// Class lifecycle integration tests
// ==========================================


use academic_records::app::AppState;
use academic_records::domain::types::ClassStatus;
use academic_records::engine::{ClassError, CreateClassSection, ErrorKind, UpdateClassSection};
use test_helpers::{create_class, create_test_db, seed_base, seed_professor, seed_slot};

fn setup() -> (tempfile::NamedTempFile, AppState) {
    let (temp_file, db_path) = create_test_db().unwrap();
    let state = AppState::new(&db_path).unwrap();
    (temp_file, state)
}

#[test]
fn create_produces_an_empty_active_section() {
    let (_guard, state) = setup();
    let ids = seed_base(&state);

    let section = create_class(&state, "MATH101-A", &ids, ids.schedule, ids.professor, 30);

    assert!(section.id > 0);
    assert_eq!(section.status, ClassStatus::Active);
    assert_eq!(section.enrolled_count, 0);
    assert_eq!(section.available_slots(), 30);

    let fetched = state.class_lifecycle.find_by_id(section.id).unwrap();
    assert_eq!(fetched.code, "MATH101-A");
}

#[test]
fn create_rejects_missing_references() {
    let (_guard, state) = setup();
    let ids = seed_base(&state);

    let err = state
        .class_lifecycle
        .create(CreateClassSection {
            code: "MATH101-A".to_string(),
            subject_id: ids.subject,
            professor_id: 9999,
            schedule_id: ids.schedule,
            course_id: ids.course,
            max_capacity: 30,
            semester: "2024.1".to_string(),
        })
        .unwrap_err();

    assert!(matches!(err, ClassError::ProfessorNotFound(9999)));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn professor_cannot_hold_two_active_sections_on_one_slot() {
    let (_guard, state) = setup();
    let ids = seed_base(&state);

    let first = create_class(&state, "MATH101-A", &ids, ids.schedule, ids.professor, 30);

    let err = state
        .class_lifecycle
        .create(CreateClassSection {
            code: "MATH101-B".to_string(),
            subject_id: ids.subject,
            professor_id: ids.professor,
            schedule_id: ids.schedule,
            course_id: ids.course,
            max_capacity: 30,
            semester: "2024.1".to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, ClassError::ProfessorScheduleConflict { .. }));
    assert_eq!(err.kind(), ErrorKind::Conflict);

    // cancelling the first section frees the (professor, slot) pair
    state.class_lifecycle.cancel(first.id).unwrap();
    let retried = state
        .class_lifecycle
        .create(CreateClassSection {
            code: "MATH101-B".to_string(),
            subject_id: ids.subject,
            professor_id: ids.professor,
            schedule_id: ids.schedule,
            course_id: ids.course,
            max_capacity: 30,
            semester: "2024.1".to_string(),
        })
        .unwrap();
    assert_eq!(retried.status, ClassStatus::Active);
}

#[test]
fn create_rejects_duplicate_codes() {
    let (_guard, state) = setup();
    let ids = seed_base(&state);

    create_class(&state, "MATH101-A", &ids, ids.schedule, ids.professor, 30);

    // same code on a free slot with another professor still collides
    let other_slot = seed_slot(&state, chrono::Weekday::Tue, 8, 10);
    let other_prof = seed_professor(&state, "Beatriz Nunes");
    let err = state
        .class_lifecycle
        .create(CreateClassSection {
            code: "MATH101-A".to_string(),
            subject_id: ids.subject,
            professor_id: other_prof,
            schedule_id: other_slot,
            course_id: ids.course,
            max_capacity: 30,
            semester: "2024.1".to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, ClassError::DuplicateCode(code) if code == "MATH101-A"));
}

#[test]
fn create_rejects_non_positive_capacity() {
    let (_guard, state) = setup();
    let ids = seed_base(&state);

    let err = state
        .class_lifecycle
        .create(CreateClassSection {
            code: "MATH101-A".to_string(),
            subject_id: ids.subject,
            professor_id: ids.professor,
            schedule_id: ids.schedule,
            course_id: ids.course,
            max_capacity: 0,
            semester: "2024.1".to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, ClassError::NonPositiveCapacity(0)));
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn update_excludes_own_section_from_the_conflict_check() {
    let (_guard, state) = setup();
    let ids = seed_base(&state);

    let section = create_class(&state, "MATH101-A", &ids, ids.schedule, ids.professor, 30);

    // re-asserting the current professor/slot pair must not self-conflict
    let updated = state
        .class_lifecycle
        .update(
            section.id,
            UpdateClassSection {
                professor_id: Some(ids.professor),
                schedule_id: Some(ids.schedule),
                semester: Some("2024.2".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.semester, "2024.2");
}

#[test]
fn update_rejects_moving_onto_an_occupied_slot() {
    let (_guard, state) = setup();
    let ids = seed_base(&state);

    create_class(&state, "MATH101-A", &ids, ids.schedule, ids.professor, 30);

    let free_slot = seed_slot(&state, chrono::Weekday::Wed, 14, 16);
    let second = create_class(&state, "MATH101-B", &ids, free_slot, ids.professor, 30);

    let err = state
        .class_lifecycle
        .update(
            second.id,
            UpdateClassSection {
                schedule_id: Some(ids.schedule),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ClassError::ProfessorScheduleConflict { .. }));
}

#[test]
fn update_rejects_capacity_below_current_enrollment() {
    let (_guard, state) = setup();
    let ids = seed_base(&state);

    let section = create_class(&state, "MATH101-A", &ids, ids.schedule, ids.professor, 5);
    state
        .enrollment_lifecycle
        .create(ids.student, section.id)
        .unwrap();

    let err = state
        .class_lifecycle
        .update(
            section.id,
            UpdateClassSection {
                max_capacity: Some(0),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ClassError::NonPositiveCapacity(0)));

    // shrinking to exactly the claimed seats is allowed
    let updated = state
        .class_lifecycle
        .update(
            section.id,
            UpdateClassSection {
                max_capacity: Some(1),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.max_capacity, 1);
}

#[test]
fn update_rejects_capacity_under_claimed_seats() {
    let (_guard, state) = setup();
    let ids = seed_base(&state);

    let section = create_class(&state, "MATH101-A", &ids, ids.schedule, ids.professor, 5);
    state
        .enrollment_lifecycle
        .create(ids.student, section.id)
        .unwrap();
    let second = test_helpers::seed_student(&state, "2400002", true);
    state
        .enrollment_lifecycle
        .create(second, section.id)
        .unwrap();

    let err = state
        .class_lifecycle
        .update(
            section.id,
            UpdateClassSection {
                max_capacity: Some(1),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        ClassError::InvalidCapacity {
            requested: 1,
            enrolled: 2
        }
    ));
}

#[test]
fn cancel_and_complete_are_terminal() {
    let (_guard, state) = setup();
    let ids = seed_base(&state);

    let a = create_class(&state, "MATH101-A", &ids, ids.schedule, ids.professor, 30);
    state.class_lifecycle.cancel(a.id).unwrap();
    assert_eq!(
        state.class_lifecycle.find_by_id(a.id).unwrap().status,
        ClassStatus::Cancelled
    );
    // re-cancelling just re-sets the terminal state
    state.class_lifecycle.cancel(a.id).unwrap();

    let slot = seed_slot(&state, chrono::Weekday::Thu, 8, 10);
    let b = create_class(&state, "MATH101-B", &ids, slot, ids.professor, 30);
    state.class_lifecycle.complete(b.id).unwrap();
    assert_eq!(
        state.class_lifecycle.find_by_id(b.id).unwrap().status,
        ClassStatus::Completed
    );
}

#[test]
fn delete_is_blocked_while_seats_are_claimed() {
    let (_guard, state) = setup();
    let ids = seed_base(&state);

    let section = create_class(&state, "MATH101-A", &ids, ids.schedule, ids.professor, 5);
    let enrollment = state
        .enrollment_lifecycle
        .create(ids.student, section.id)
        .unwrap();

    let err = state.class_lifecycle.delete(section.id).unwrap_err();
    assert!(matches!(
        err,
        ClassError::HasActiveEnrollments { enrolled: 1, .. }
    ));

    // draining the counter (cancel releases the seat) unblocks deletion,
    // once no enrollment rows reference the class anymore
    state
        .enrollment_lifecycle
        .cancel(enrollment.id, "dropped out")
        .unwrap();
    state.enrollment_lifecycle.delete(enrollment.id).unwrap();
    state.class_lifecycle.delete(section.id).unwrap();
    assert!(state.class_lifecycle.find_by_id(section.id).is_err());
}

#[test]
fn availability_queries_track_occupancy() {
    let (_guard, state) = setup();
    let ids = seed_base(&state);

    let section = create_class(&state, "MATH101-A", &ids, ids.schedule, ids.professor, 1);
    assert_eq!(state.class_lifecycle.find_with_available_slots().unwrap().len(), 1);

    state
        .enrollment_lifecycle
        .create(ids.student, section.id)
        .unwrap();
    assert!(state
        .class_lifecycle
        .find_with_available_slots()
        .unwrap()
        .is_empty());

    assert_eq!(
        state
            .class_lifecycle
            .count_active_by_professor(ids.professor)
            .unwrap(),
        1
    );
    assert_eq!(
        state
            .class_lifecycle
            .find_by_semester("2024.1")
            .unwrap()
            .len(),
        1
    );
    assert_eq!(
        state
            .class_lifecycle
            .find_by_code("MATH101-A")
            .unwrap()
            .unwrap()
            .id,
        section.id
    );
}
