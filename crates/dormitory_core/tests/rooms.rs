use dormitory_core::db::open_db_in_memory;
use dormitory_core::{
    Conflict, DormError, Dormitory, InvalidInput, NotFound, PageRequest, RequestContext, RoomId,
};

#[test]
fn add_and_get_room() {
    let conn = open_db_in_memory().unwrap();
    let dorm = Dormitory::try_new(&conn).unwrap();
    let ctx = RequestContext::anonymous();

    let id = dorm.rooms.add_room(&ctx, "double", 101).unwrap();
    let room = dorm.rooms.get_room(&ctx, id).unwrap();
    assert_eq!(room.id, id);
    assert_eq!(room.room_type, "double");
    assert_eq!(room.room_number, 101);
}

#[test]
fn duplicate_room_numbers_are_allowed() {
    let conn = open_db_in_memory().unwrap();
    let dorm = Dormitory::try_new(&conn).unwrap();
    let ctx = RequestContext::anonymous();

    let first = dorm.rooms.add_room(&ctx, "double", 101).unwrap();
    let second = dorm.rooms.add_room(&ctx, "double", 101).unwrap();
    assert_ne!(first, second);
    assert_eq!(dorm.rooms.list_rooms(&ctx, PageRequest::ALL).unwrap().len(), 2);
}

#[test]
fn add_room_rejects_blank_type_and_bad_number() {
    let conn = open_db_in_memory().unwrap();
    let dorm = Dormitory::try_new(&conn).unwrap();
    let ctx = RequestContext::anonymous();

    assert!(matches!(
        dorm.rooms.add_room(&ctx, "  ", 1),
        Err(DormError::InvalidInput(InvalidInput::EmptyField("room_type")))
    ));
    assert!(matches!(
        dorm.rooms.add_room(&ctx, "single", 0),
        Err(DormError::InvalidInput(InvalidInput::NonPositiveId("room_number")))
    ));
}

#[test]
fn missing_room_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let dorm = Dormitory::try_new(&conn).unwrap();
    let ctx = RequestContext::anonymous();

    let err = dorm.rooms.get_room(&ctx, RoomId(77)).unwrap_err();
    assert!(matches!(err, DormError::NotFound(NotFound::Room(RoomId(77)))));
    assert!(matches!(
        dorm.rooms.delete_room(&ctx, RoomId(77)),
        Err(DormError::NotFound(NotFound::Room(_)))
    ));
}

#[test]
fn list_rooms_pages_in_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let dorm = Dormitory::try_new(&conn).unwrap();
    let ctx = RequestContext::anonymous();
    for number in 1..=5 {
        dorm.rooms.add_room(&ctx, "single", number).unwrap();
    }

    let page = dorm.rooms.list_rooms(&ctx, PageRequest::new(1, 2)).unwrap();
    let numbers: Vec<i64> = page.iter().map(|room| room.room_number).collect();
    assert_eq!(numbers, vec![3, 4]);
}

#[test]
fn room_with_things_or_residents_cannot_be_deleted() {
    let conn = open_db_in_memory().unwrap();
    let dorm = Dormitory::try_new(&conn).unwrap();
    let ctx = RequestContext::anonymous();

    let storage = dorm.rooms.add_room(&ctx, "storage", 1).unwrap();
    dorm.things.add_thing(&ctx, 10, "chair", storage).unwrap();
    assert!(matches!(
        dorm.rooms.delete_room(&ctx, storage),
        Err(DormError::Conflict(Conflict::RoomNotEmpty))
    ));

    let things = dorm.rooms.get_room_things(&ctx, storage).unwrap();
    assert_eq!(things.len(), 1);
    assert_eq!(things[0].mark_number, 10);

    dorm.things.delete_thing(&ctx, 10).unwrap();
    dorm.rooms.delete_room(&ctx, storage).unwrap();
    assert!(dorm.rooms.get_room(&ctx, storage).is_err());
}
