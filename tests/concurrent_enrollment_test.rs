// ==========================================
// Concurrent enrollment tests
// ==========================================
// Exercises the seat-claiming path from separate connections
// to verify the guarded capacity update under contention.
// ==========================================


#[cfg(test)]
mod concurrent_enrollment_test {
    use std::sync::{Arc, Barrier};
    use std::thread;

    use academic_records::app::AppState;
    use academic_records::engine::{ClassError, CreateClassSection, EnrollmentError};

    use crate::test_helpers::{create_test_db, seed_base, seed_professor, seed_slot, seed_student};

    #[test]
    fn last_seat_goes_to_exactly_one_of_two_racers() {
        let (_temp_file, db_path) = create_test_db().unwrap();

        // Two app states over the same database file, each with its own
        // connection, as two backend workers would hold.
        let state_a = AppState::new(&db_path).unwrap();
        let state_b = AppState::new(&db_path).unwrap();

        let ids = seed_base(&state_a);
        let student_b = seed_student(&state_a, "2400002", true);
        let class =
            crate::test_helpers::create_class(&state_a, "MAT101-T1", &ids, ids.schedule, ids.professor, 1);

        let barrier = Arc::new(Barrier::new(2));
        let mut handles = vec![];

        for (state, student_id) in [(state_a, ids.student), (state_b, student_b)] {
            let barrier = barrier.clone();
            let class_id = class.id;
            handles.push(thread::spawn(move || {
                barrier.wait();
                state.enrollment_lifecycle.create(student_id, class_id)
            }));
        }

        let results: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect();

        let wins = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(wins, 1, "exactly one racer takes the last seat: {results:?}");

        let loss = results
            .iter()
            .find_map(|r| r.as_ref().err())
            .expect("one racer must lose");
        assert!(
            matches!(loss, EnrollmentError::ClassFull { .. }),
            "the loser sees a full class, got: {loss}"
        );

        // Final state: one seat claimed, bounds intact.
        let state = AppState::new(&db_path).unwrap();
        let class = state.class_lifecycle.find_by_id(class.id).unwrap();
        assert_eq!(class.enrolled_count, 1);
        assert_eq!(
            state
                .enrollment_lifecycle
                .count_active_by_class(class.id)
                .unwrap(),
            1
        );
    }

    #[test]
    fn many_racers_never_overshoot_capacity() {
        let (_temp_file, db_path) = create_test_db().unwrap();

        let seed_state = AppState::new(&db_path).unwrap();
        let ids = seed_base(&seed_state);
        let class = crate::test_helpers::create_class(
            &seed_state,
            "MAT101-T1",
            &ids,
            ids.schedule,
            ids.professor,
            3,
        );

        let racer_count = 8;
        let mut students = vec![ids.student];
        for i in 1..racer_count {
            students.push(seed_student(
                &seed_state,
                &format!("24{:05}", i + 1),
                true,
            ));
        }
        drop(seed_state);

        let barrier = Arc::new(Barrier::new(racer_count));
        let mut handles = vec![];

        for student_id in students {
            let barrier = barrier.clone();
            let db_path = db_path.clone();
            let class_id = class.id;
            handles.push(thread::spawn(move || {
                let state = AppState::new(&db_path).unwrap();
                barrier.wait();
                state.enrollment_lifecycle.create(student_id, class_id)
            }));
        }

        let results: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect();

        let wins = results.iter().filter(|r| r.is_ok()).count();
        let full_rejections = results
            .iter()
            .filter(|r| matches!(r, Err(EnrollmentError::ClassFull { .. })))
            .count();

        assert_eq!(wins, 3, "the three seats go to exactly three racers");
        assert_eq!(wins + full_rejections, racer_count);

        let state = AppState::new(&db_path).unwrap();
        let class = state.class_lifecycle.find_by_id(class.id).unwrap();
        assert_eq!(class.enrolled_count, 3);
        assert!(!class.has_available_slots());
    }

    #[test]
    fn one_student_cannot_hold_two_classes_on_one_slot() {
        let (_temp_file, db_path) = create_test_db().unwrap();

        let state_a = AppState::new(&db_path).unwrap();
        let state_b = AppState::new(&db_path).unwrap();

        // two classes from different professors, both on the seeded slot
        let ids = seed_base(&state_a);
        let professor_b = seed_professor(&state_a, "Bruno Alves");
        let class_a = crate::test_helpers::create_class(
            &state_a,
            "MAT101-T1",
            &ids,
            ids.schedule,
            ids.professor,
            30,
        );
        let class_b = crate::test_helpers::create_class(
            &state_a,
            "FIS101-T1",
            &ids,
            ids.schedule,
            professor_b,
            30,
        );

        let barrier = Arc::new(Barrier::new(2));
        let mut handles = vec![];

        for (state, class_id) in [(state_a, class_a.id), (state_b, class_b.id)] {
            let barrier = barrier.clone();
            let student_id = ids.student;
            handles.push(thread::spawn(move || {
                barrier.wait();
                state.enrollment_lifecycle.create(student_id, class_id)
            }));
        }

        let results: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect();

        let wins = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(
            wins, 1,
            "the slot admits exactly one active enrollment: {results:?}"
        );

        let loss = results
            .iter()
            .find_map(|r| r.as_ref().err())
            .expect("one racer must lose");
        assert!(
            matches!(loss, EnrollmentError::StudentScheduleConflict { .. }),
            "the loser sees a slot conflict, got: {loss}"
        );

        let state = AppState::new(&db_path).unwrap();
        assert_eq!(
            state
                .enrollment_lifecycle
                .count_active_by_student(ids.student)
                .unwrap(),
            1
        );
        // the loser's seat claim rolled back with its insert
        let enrolled_total = state.class_lifecycle.find_by_id(class_a.id).unwrap().enrolled_count
            + state.class_lifecycle.find_by_id(class_b.id).unwrap().enrolled_count;
        assert_eq!(enrolled_total, 1);
    }

    #[test]
    fn concurrent_cancels_release_the_seat_once() {
        let (_temp_file, db_path) = create_test_db().unwrap();

        let state_a = AppState::new(&db_path).unwrap();
        let state_b = AppState::new(&db_path).unwrap();

        let ids = seed_base(&state_a);
        let student_b = seed_student(&state_a, "2400002", true);
        let class =
            crate::test_helpers::create_class(&state_a, "MAT101-T1", &ids, ids.schedule, ids.professor, 2);
        let target = state_a
            .enrollment_lifecycle
            .create(ids.student, class.id)
            .unwrap();
        state_a
            .enrollment_lifecycle
            .create(student_b, class.id)
            .unwrap();

        let barrier = Arc::new(Barrier::new(2));
        let mut handles = vec![];

        for state in [state_a, state_b] {
            let barrier = barrier.clone();
            let enrollment_id = target.id;
            handles.push(thread::spawn(move || {
                barrier.wait();
                state.enrollment_lifecycle.cancel(enrollment_id, "dropped")
            }));
        }

        let results: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect();

        let wins = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(wins, 1, "exactly one cancel flips the status: {results:?}");

        let loss = results
            .iter()
            .find_map(|r| r.as_ref().err())
            .expect("one racer must lose");
        assert!(
            matches!(loss, EnrollmentError::AlreadyCancelled(_)),
            "the loser sees the row already cancelled, got: {loss}"
        );

        // the seat was released exactly once: the second student's seat
        // is still counted
        let state = AppState::new(&db_path).unwrap();
        let class = state.class_lifecycle.find_by_id(class.id).unwrap();
        assert_eq!(class.enrolled_count, 1);
        assert_eq!(
            state
                .enrollment_lifecycle
                .count_active_by_class(class.id)
                .unwrap(),
            1
        );
    }

    #[test]
    fn duplicate_code_race_rejects_one_creation() {
        let (_temp_file, db_path) = create_test_db().unwrap();

        let state_a = AppState::new(&db_path).unwrap();
        let state_b = AppState::new(&db_path).unwrap();

        // distinct professors and slots, so only the code can collide
        let ids = seed_base(&state_a);
        let professor_b = seed_professor(&state_a, "Bruno Alves");
        let slot_b = seed_slot(&state_a, chrono::Weekday::Tue, 14, 16);

        let barrier = Arc::new(Barrier::new(2));
        let mut handles = vec![];

        for (state, professor_id, schedule_id) in [
            (state_a, ids.professor, ids.schedule),
            (state_b, professor_b, slot_b),
        ] {
            let barrier = barrier.clone();
            let request = CreateClassSection {
                code: "MAT101-T1".to_string(),
                subject_id: ids.subject,
                professor_id,
                schedule_id,
                course_id: ids.course,
                max_capacity: 30,
                semester: "2024.1".to_string(),
            };
            handles.push(thread::spawn(move || {
                barrier.wait();
                state.class_lifecycle.create(request)
            }));
        }

        let results: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect();

        let wins = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(wins, 1, "the code goes to exactly one section: {results:?}");

        let loss = results
            .iter()
            .find_map(|r| r.as_ref().err())
            .expect("one racer must lose");
        assert!(
            matches!(loss, ClassError::DuplicateCode(_)),
            "the loser sees a duplicate code, got: {loss}"
        );
    }

    #[test]
    fn professor_slot_race_rejects_one_creation() {
        let (_temp_file, db_path) = create_test_db().unwrap();

        let state_a = AppState::new(&db_path).unwrap();
        let state_b = AppState::new(&db_path).unwrap();

        let ids = seed_base(&state_a);

        let barrier = Arc::new(Barrier::new(2));
        let mut handles = vec![];

        for (state, code) in [(state_a, "MAT101-T1"), (state_b, "MAT101-T2")] {
            let barrier = barrier.clone();
            let request = CreateClassSection {
                code: code.to_string(),
                subject_id: ids.subject,
                professor_id: ids.professor,
                schedule_id: ids.schedule,
                course_id: ids.course,
                max_capacity: 30,
                semester: "2024.1".to_string(),
            };
            handles.push(thread::spawn(move || {
                barrier.wait();
                state.class_lifecycle.create(request)
            }));
        }

        let results: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect();

        let wins = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(
            wins, 1,
            "the professor holds the slot exactly once: {results:?}"
        );

        let loss = results
            .iter()
            .find_map(|r| r.as_ref().err())
            .expect("one racer must lose");
        assert!(
            matches!(loss, ClassError::ProfessorScheduleConflict { .. }),
            "the loser sees a slot conflict, got: {loss}"
        );
    }
}
