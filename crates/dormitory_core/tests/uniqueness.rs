use dormitory_core::db::open_db_in_memory;
use dormitory_core::store::room_store::SqliteRoomStore;
use dormitory_core::store::student_store::{SqliteStudentStore, StudentStore};
use dormitory_core::store::thing_store::{SqliteThingStore, ThingStore};
use dormitory_core::store::user_store::{SqliteUserStore, UserStore};
use dormitory_core::{
    Conflict, DormError, InvalidInput, PageRequest, PasswordDigest, PrivilegeLevel,
    RoomController, StoreError, StudentController, StudentDraft, ThingController, ThingDraft,
    UniqueKey, UserController, UserId,
};

fn draft(number: &str) -> StudentDraft {
    StudentDraft {
        name: "Pavel".to_string(),
        surname: "Sokolov".to_string(),
        group: "IU7-35".to_string(),
        student_number: number.to_string(),
    }
}

#[test]
fn student_number_is_unique() {
    let conn = open_db_in_memory().unwrap();
    let users = UserController::new(SqliteUserStore::try_new(&conn).unwrap());
    let students = StudentController::new(SqliteStudentStore::try_new(&conn).unwrap());
    let first = users
        .add_user("pavel", "pw", PrivilegeLevel::Student)
        .unwrap();
    let second = users
        .add_user("pavel2", "pw", PrivilegeLevel::Student)
        .unwrap();

    students.add_student(&draft("S1"), first).unwrap();
    let err = students.add_student(&draft("S1"), second).unwrap_err();
    assert!(matches!(
        err,
        DormError::Conflict(Conflict::StudentAlreadyInBase)
    ));
    assert_eq!(students.list_students(PageRequest::ALL).unwrap().len(), 1);
}

#[test]
fn student_requires_positive_account_id() {
    let conn = open_db_in_memory().unwrap();
    let students = StudentController::new(SqliteStudentStore::try_new(&conn).unwrap());

    assert!(matches!(
        students.add_student(&draft("S1"), UserId(0)),
        Err(DormError::InvalidInput(InvalidInput::NonPositiveId("account_id")))
    ));
}

#[test]
fn unique_indexes_back_the_business_keys() {
    let conn = open_db_in_memory().unwrap();
    let user_store = SqliteUserStore::try_new(&conn).unwrap();
    let student_store = SqliteStudentStore::try_new(&conn).unwrap();
    let thing_store = SqliteThingStore::try_new(&conn).unwrap();
    let room = RoomController::new(SqliteRoomStore::try_new(&conn).unwrap())
        .add_room("storage", 1)
        .unwrap();

    let digest = PasswordDigest::derive("pw");
    let account = user_store
        .create_user("pavel", &digest, PrivilegeLevel::Student)
        .unwrap();
    assert!(matches!(
        user_store.create_user("pavel", &digest, PrivilegeLevel::Student),
        Err(StoreError::UniqueViolation(UniqueKey::Login))
    ));

    student_store.create_student(&draft("S1"), account).unwrap();
    assert!(matches!(
        student_store.create_student(&draft("S1"), account),
        Err(StoreError::UniqueViolation(UniqueKey::StudentNumber))
    ));

    let thing = ThingDraft {
        mark_number: 9,
        thing_type: "kettle".to_string(),
        room_id: room,
    };
    thing_store.create_thing(&thing).unwrap();
    assert!(matches!(
        thing_store.create_thing(&thing),
        Err(StoreError::UniqueViolation(UniqueKey::MarkNumber))
    ));
}

#[test]
fn mark_number_is_unique() {
    let conn = open_db_in_memory().unwrap();
    let rooms = RoomController::new(SqliteRoomStore::try_new(&conn).unwrap());
    let things = ThingController::new(SqliteThingStore::try_new(&conn).unwrap());
    let room = rooms.add_room("storage", 1).unwrap();

    things.add_thing(9, "kettle", room).unwrap();
    assert!(matches!(
        things.add_thing(9, "iron", room),
        Err(DormError::Conflict(Conflict::ThingAlreadyExists))
    ));
    assert_eq!(things.list_things(PageRequest::ALL).unwrap().len(), 1);
}

#[test]
fn login_is_unique() {
    let conn = open_db_in_memory().unwrap();
    let users = UserController::new(SqliteUserStore::try_new(&conn).unwrap());

    users.add_user("pavel", "pw", PrivilegeLevel::Student).unwrap();
    assert!(!users.is_login_free("pavel").unwrap());
    assert!(matches!(
        users.add_user("pavel", "other", PrivilegeLevel::Supply),
        Err(DormError::Conflict(Conflict::LoginOccupied))
    ));
}
