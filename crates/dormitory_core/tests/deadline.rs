use dormitory_core::db::{open_db, open_db_in_memory};
use dormitory_core::{
    DormError, Dormitory, ErrorKind, NewStudentRequest, PageRequest, RequestContext, Residency,
};
use rusqlite::Connection;
use std::time::{Duration, Instant};

fn request() -> NewStudentRequest {
    NewStudentRequest {
        name: "Vera".to_string(),
        surname: "Kuznetsova".to_string(),
        group: "IU7-38".to_string(),
        student_number: "S1".to_string(),
        login: "vera".to_string(),
        password: "secret".to_string(),
    }
}

#[test]
fn expired_request_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let dorm = Dormitory::try_new(&conn).unwrap();
    let expired = RequestContext::anonymous().with_deadline(Instant::now());

    let err = dorm.students.add_new_student(&expired, &request()).unwrap_err();
    assert!(matches!(err, DormError::DeadlineExceeded));
    assert_eq!(err.kind(), ErrorKind::Unavailable);
    assert!(!err.is_rejection());

    let ctx = RequestContext::anonymous();
    assert!(dorm.students.get_student(&ctx, "S1").is_err());
}

#[test]
fn expired_request_cannot_settle() {
    let conn = open_db_in_memory().unwrap();
    let dorm = Dormitory::try_new(&conn).unwrap();
    let ctx = RequestContext::anonymous();
    let room = dorm.rooms.add_room(&ctx, "single", 1).unwrap();
    dorm.students.add_new_student(&ctx, &request()).unwrap();

    let expired = RequestContext::anonymous().with_deadline(Instant::now());
    assert!(matches!(
        dorm.students.settle_student(&expired, "S1", room),
        Err(DormError::DeadlineExceeded)
    ));
    assert_eq!(
        dorm.students.get_current_room(&ctx, "S1").unwrap(),
        Residency::NotLiving
    );
}

#[test]
fn lock_wait_is_bounded_by_request_deadline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dormitory.sqlite3");
    let conn = open_db(&path).unwrap();
    let dorm = Dormitory::try_new(&conn).unwrap();
    let ctx = RequestContext::anonymous();
    let room = dorm.rooms.add_room(&ctx, "single", 1).unwrap();
    dorm.students.add_new_student(&ctx, &request()).unwrap();

    let holder = Connection::open(&path).unwrap();
    holder.execute_batch("BEGIN IMMEDIATE;").unwrap();

    let started_at = Instant::now();
    let bounded = RequestContext::anonymous().with_timeout(Duration::from_millis(100));
    let err = dorm
        .students
        .settle_student(&bounded, "S1", room)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unavailable);
    assert!(started_at.elapsed() < Duration::from_secs(3));

    let busy_timeout_ms: i64 = conn
        .query_row("PRAGMA busy_timeout;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(busy_timeout_ms, 5_000);

    holder.execute_batch("ROLLBACK;").unwrap();
    dorm.students.settle_student(&ctx, "S1", room).unwrap();
    assert_eq!(
        dorm.students.get_current_room(&ctx, "S1").unwrap(),
        Residency::LivingIn(room)
    );
}

#[test]
fn edits_and_room_upkeep_wait_no_longer_than_request_deadline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dormitory.sqlite3");
    let conn = open_db(&path).unwrap();
    let dorm = Dormitory::try_new(&conn).unwrap();
    let ctx = RequestContext::anonymous();
    let room = dorm.rooms.add_room(&ctx, "single", 1).unwrap();
    dorm.students.add_new_student(&ctx, &request()).unwrap();

    let holder = Connection::open(&path).unwrap();
    holder.execute_batch("BEGIN IMMEDIATE;").unwrap();

    let bounded = || RequestContext::anonymous().with_timeout(Duration::from_millis(100));
    let started_at = Instant::now();
    let outcomes: [Result<(), DormError>; 5] = [
        dorm.students.change_student_group(&bounded(), "S1", "IU7-99"),
        dorm.students.change_student_name(&bounded(), "S1", "Olga"),
        dorm.students.change_student_surname(&bounded(), "S1", "Petrova"),
        dorm.rooms.add_room(&bounded(), "double", 2).map(|_| ()),
        dorm.rooms.delete_room(&bounded(), room),
    ];
    assert!(started_at.elapsed() < Duration::from_secs(4));
    for outcome in outcomes {
        assert_eq!(outcome.unwrap_err().kind(), ErrorKind::Unavailable);
    }

    holder.execute_batch("ROLLBACK;").unwrap();
    let student = dorm.students.get_student(&ctx, "S1").unwrap();
    assert_eq!(student.group, "IU7-38");
    assert_eq!(student.name, "Vera");
    assert_eq!(student.surname, "Kuznetsova");
    assert_eq!(
        dorm.rooms.list_rooms(&ctx, PageRequest::ALL).unwrap().len(),
        1
    );
}

#[test]
fn expired_request_cannot_rename_or_add_rooms() {
    let conn = open_db_in_memory().unwrap();
    let dorm = Dormitory::try_new(&conn).unwrap();
    let ctx = RequestContext::anonymous();
    dorm.students.add_new_student(&ctx, &request()).unwrap();

    let expired = RequestContext::anonymous().with_deadline(Instant::now());
    assert!(matches!(
        dorm.students.change_student_group(&expired, "S1", "IU7-99"),
        Err(DormError::DeadlineExceeded)
    ));
    assert!(matches!(
        dorm.rooms.add_room(&expired, "double", 2),
        Err(DormError::DeadlineExceeded)
    ));
    assert_eq!(dorm.students.get_student(&ctx, "S1").unwrap().group, "IU7-38");
}
