use dormitory_core::db::open_db_in_memory;
use dormitory_core::store::student_store::SqliteStudentStore;
use dormitory_core::{
    Conflict, DormError, Dormitory, NewStudentRequest, NotFound, PageRequest, RequestContext,
    RoomId, StudentController, TransferDirection,
};

fn onboard(dorm: &Dormitory<'_>, ctx: &RequestContext, number: &str) {
    let request = NewStudentRequest {
        name: "Anna".to_string(),
        surname: "Smirnova".to_string(),
        group: "IU7-32".to_string(),
        student_number: number.to_string(),
        login: format!("login-{number}"),
        password: "secret".to_string(),
    };
    dorm.students.add_new_student(ctx, &request).unwrap();
}

fn seed(dorm: &Dormitory<'_>, ctx: &RequestContext) -> RoomId {
    let storage = dorm.rooms.add_room(ctx, "storage", 1).unwrap();
    onboard(dorm, ctx, "S1");
    onboard(dorm, ctx, "S2");
    dorm.things.add_thing(ctx, 500, "lamp", storage).unwrap();
    storage
}

#[test]
fn thing_has_at_most_one_holder() {
    let conn = open_db_in_memory().unwrap();
    let dorm = Dormitory::try_new(&conn).unwrap();
    let ctx = RequestContext::anonymous();
    seed(&dorm, &ctx);

    dorm.students.give_student_thing(&ctx, "S1", 500).unwrap();
    assert_eq!(dorm.things.get_owner(&ctx, 500).unwrap(), "S1");

    let err = dorm
        .students
        .give_student_thing(&ctx, "S2", 500)
        .unwrap_err();
    assert!(matches!(err, DormError::Conflict(Conflict::ThingHasOwner)));

    let err = dorm
        .students
        .return_student_thing(&ctx, "S2", 500)
        .unwrap_err();
    assert!(matches!(
        err,
        DormError::Conflict(Conflict::StudentIsNotOwner)
    ));

    dorm.students.return_student_thing(&ctx, "S1", 500).unwrap();
    assert!(matches!(
        dorm.things.get_owner(&ctx, 500),
        Err(DormError::ThingHasNoOwner(500))
    ));

    dorm.students.give_student_thing(&ctx, "S2", 500).unwrap();
    assert_eq!(dorm.things.get_owner(&ctx, 500).unwrap(), "S2");
}

#[test]
fn returning_unowned_thing_conflicts() {
    let conn = open_db_in_memory().unwrap();
    let dorm = Dormitory::try_new(&conn).unwrap();
    let ctx = RequestContext::anonymous();
    seed(&dorm, &ctx);

    let err = dorm
        .students
        .return_student_thing(&ctx, "S1", 500)
        .unwrap_err();
    assert!(matches!(
        err,
        DormError::Conflict(Conflict::StudentIsNotOwner)
    ));
}

#[test]
fn free_things_exclude_held_ones() {
    let conn = open_db_in_memory().unwrap();
    let dorm = Dormitory::try_new(&conn).unwrap();
    let ctx = RequestContext::anonymous();
    let storage = seed(&dorm, &ctx);
    dorm.things.add_thing(&ctx, 501, "chair", storage).unwrap();

    dorm.students.give_student_thing(&ctx, "S1", 500).unwrap();

    let free = dorm.things.get_free_things(&ctx).unwrap();
    assert_eq!(free.len(), 1);
    assert_eq!(free[0].thing.mark_number, 501);
    assert_eq!(free[0].room.id, storage);

    let held = dorm.things.get_student_things(&ctx, "S1").unwrap();
    assert_eq!(held.len(), 1);
    assert_eq!(held[0].thing.mark_number, 500);
    assert!(held[0].thing.custody.is_owned());
    assert!(dorm.things.get_student_things(&ctx, "S2").unwrap().is_empty());

    let all = dorm.things.get_full_thing_info(&ctx).unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|info| info.room.room_type == "storage"));
}

#[test]
fn unknown_mark_number_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let dorm = Dormitory::try_new(&conn).unwrap();
    let ctx = RequestContext::anonymous();
    seed(&dorm, &ctx);

    assert!(matches!(
        dorm.students.give_student_thing(&ctx, "S1", 999),
        Err(DormError::NotFound(NotFound::MarkNumber(999)))
    ));
    assert!(matches!(
        dorm.things.get_owner(&ctx, 999),
        Err(DormError::NotFound(NotFound::MarkNumber(999)))
    ));
}

#[test]
fn owner_reference_without_student_reads_as_no_owner() {
    let conn = open_db_in_memory().unwrap();
    let dorm = Dormitory::try_new(&conn).unwrap();
    let ctx = RequestContext::anonymous();
    seed(&dorm, &ctx);
    dorm.students.give_student_thing(&ctx, "S1", 500).unwrap();

    conn.execute_batch(
        "PRAGMA foreign_keys = OFF;
         DELETE FROM students WHERE student_number = 'S1';
         PRAGMA foreign_keys = ON;",
    )
    .unwrap();

    assert!(matches!(
        dorm.things.get_owner(&ctx, 500),
        Err(DormError::ThingHasNoOwner(500))
    ));
}

#[test]
fn custody_history_records_hand_overs() {
    let conn = open_db_in_memory().unwrap();
    let dorm = Dormitory::try_new(&conn).unwrap();
    let ctx = RequestContext::anonymous();
    seed(&dorm, &ctx);

    dorm.students.give_student_thing(&ctx, "S1", 500).unwrap();
    dorm.students.return_student_thing(&ctx, "S1", 500).unwrap();

    let students = StudentController::new(SqliteStudentStore::try_new(&conn).unwrap());
    let student_id = students.get_student_id_by_number("S1").unwrap();
    let directions: Vec<_> = students
        .get_custody_history(student_id)
        .unwrap()
        .into_iter()
        .map(|record| record.direction)
        .collect();
    assert_eq!(
        directions,
        vec![TransferDirection::Get, TransferDirection::Ret]
    );

    let held = students
        .get_student_things(student_id, PageRequest::ALL)
        .unwrap();
    assert!(held.is_empty());
}
