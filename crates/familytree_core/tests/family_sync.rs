use familytree_core::db::open_db_in_memory;
use familytree_core::{
    EntityKind, FamilyDraft, FamilyHeaderDraft, FamilyService, FamilyTreeSnapshot, Gender,
    LineageType, MemberDraft, MemberRepository, RelationshipDraft, RelationshipType, RepoError,
    SqliteMemberRepository, SyncError, SyncResult,
};
use rusqlite::Connection;
use serde_json::json;
use uuid::Uuid;

const REQUESTER: Uuid = Uuid::from_u128(0xA11CE);
const GROUP: Uuid = Uuid::from_u128(0x6A0);

fn family_id() -> Uuid {
    Uuid::from_u128(0xF1)
}

fn id(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

fn member(n: u128, name: &str) -> MemberDraft {
    MemberDraft::new(id(n), name, Gender::Female)
}

fn edge(from: u128, to: u128, kind: RelationshipType) -> RelationshipDraft {
    RelationshipDraft::new(id(from), id(to), kind)
}

fn draft_for(
    family: Uuid,
    members: Vec<MemberDraft>,
    relationships: Vec<RelationshipDraft>,
) -> FamilyDraft {
    FamilyDraft {
        family: FamilyHeaderDraft {
            id: family,
            name: "Tran".to_string(),
            description: Some("Tran family of Hue".to_string()),
            lineage_type: Some(LineageType::Patrilineal),
        },
        members,
        relationships,
    }
}

fn draft(members: Vec<MemberDraft>, relationships: Vec<RelationshipDraft>) -> FamilyDraft {
    draft_for(family_id(), members, relationships)
}

fn sync(conn: &mut Connection, draft: &FamilyDraft) -> SyncResult<FamilyTreeSnapshot> {
    FamilyService::try_new(conn)
        .unwrap()
        .sync(REQUESTER, GROUP, draft)
}

fn load(conn: &mut Connection, family: Uuid) -> Option<FamilyTreeSnapshot> {
    FamilyService::try_new(conn)
        .unwrap()
        .load_tree(family)
        .unwrap()
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

fn member_ids(snapshot: &FamilyTreeSnapshot) -> Vec<Uuid> {
    snapshot.members.iter().map(|member| member.id).collect()
}

fn edges(snapshot: &FamilyTreeSnapshot) -> Vec<(Uuid, Uuid, RelationshipType)> {
    snapshot
        .relationships
        .iter()
        .map(|rel| (rel.from_member_id, rel.to_member_id, rel.kind))
        .collect()
}

#[test]
fn first_sync_creates_tree_and_resync_is_idempotent() {
    let mut conn = open_db_in_memory().unwrap();
    let input = draft(
        vec![member(1, "An"), member(2, "Binh")],
        vec![edge(1, 2, RelationshipType::Spouse)],
    );

    let first = sync(&mut conn, &input).unwrap();
    assert_eq!(first.family.id, family_id());
    assert_eq!(first.family.owner_id, REQUESTER);
    assert_eq!(first.family.group_id, GROUP);
    assert_eq!(member_ids(&first), vec![id(1), id(2)]);
    assert_eq!(edges(&first), vec![(id(1), id(2), RelationshipType::Spouse)]);
    assert!(first.members.iter().all(|m| m.family_id == family_id()));

    let second = sync(&mut conn, &input).unwrap();
    assert_eq!(second.family.id, first.family.id);
    assert_eq!(second.family.created_at, first.family.created_at);
    assert_eq!(second.members, first.members);
    assert_eq!(edges(&second), edges(&first));

    assert_eq!(count(&conn, "families"), 1);
    assert_eq!(count(&conn, "family_members"), 2);
    assert_eq!(count(&conn, "relationships"), 1);
}

#[test]
fn relationship_ids_are_reissued_and_echo_ids_discarded() {
    let mut conn = open_db_in_memory().unwrap();
    let echo = Uuid::new_v4();
    let mut spouse = edge(1, 2, RelationshipType::Spouse);
    spouse.id = Some(echo);
    let input = draft(vec![member(1, "An"), member(2, "Binh")], vec![spouse]);

    let first = sync(&mut conn, &input).unwrap();
    assert_ne!(first.relationships[0].id, echo);

    let mut resubmit = input.clone();
    resubmit.relationships[0].id = Some(first.relationships[0].id);
    let second = sync(&mut conn, &resubmit).unwrap();
    assert_ne!(second.relationships[0].id, first.relationships[0].id);
    assert_eq!(count(&conn, "relationships"), 1);
}

#[test]
fn dropping_a_member_prunes_it_and_its_relationships() {
    let mut conn = open_db_in_memory().unwrap();
    sync(
        &mut conn,
        &draft(
            vec![member(1, "An"), member(2, "Binh")],
            vec![edge(1, 2, RelationshipType::Spouse)],
        ),
    )
    .unwrap();

    let result = sync(&mut conn, &draft(vec![member(1, "An")], vec![])).unwrap();
    assert_eq!(member_ids(&result), vec![id(1)]);
    assert!(result.relationships.is_empty());

    let repo = SqliteMemberRepository::try_new(&conn).unwrap();
    assert_eq!(repo.member_owner(id(2)).unwrap(), None);
    assert_eq!(count(&conn, "relationships"), 0);
}

#[test]
fn subset_sync_keeps_only_edges_between_remaining_members() {
    let mut conn = open_db_in_memory().unwrap();
    sync(
        &mut conn,
        &draft(
            vec![member(1, "An"), member(2, "Binh"), member(3, "Chau")],
            vec![
                edge(1, 2, RelationshipType::Parent),
                edge(2, 3, RelationshipType::Parent),
            ],
        ),
    )
    .unwrap();

    let result = sync(
        &mut conn,
        &draft(
            vec![member(1, "An"), member(3, "Chau")],
            vec![edge(1, 3, RelationshipType::Parent)],
        ),
    )
    .unwrap();

    assert_eq!(member_ids(&result), vec![id(1), id(3)]);
    assert_eq!(edges(&result), vec![(id(1), id(3), RelationshipType::Parent)]);
    assert_eq!(count(&conn, "family_members"), 2);
    assert_eq!(count(&conn, "relationships"), 1);
}

#[test]
fn dangling_reference_aborts_and_keeps_previous_tree() {
    let mut conn = open_db_in_memory().unwrap();
    sync(&mut conn, &draft(vec![member(1, "An")], vec![])).unwrap();
    let before = load(&mut conn, family_id()).unwrap();

    let mut renamed = member(1, "An (renamed)");
    renamed.generation = 4;
    let mut bad = draft(
        vec![renamed, member(5, "Extra")],
        vec![edge(1, 99, RelationshipType::Parent)],
    );
    bad.family.name = "Renamed family".to_string();

    let err = sync(&mut conn, &bad).unwrap_err();
    match err {
        SyncError::DanglingReference {
            from_member_id,
            to_member_id,
            missing_member_id,
        } => {
            assert_eq!(from_member_id, id(1));
            assert_eq!(to_member_id, id(99));
            assert_eq!(missing_member_id, id(99));
        }
        other => panic!("unexpected error: {other}"),
    }

    let after = load(&mut conn, family_id()).unwrap();
    assert_eq!(after, before);
    assert_eq!(count(&conn, "family_members"), 1);
}

#[test]
fn failed_first_sync_leaves_no_family_row() {
    let mut conn = open_db_in_memory().unwrap();
    let bad = draft(
        vec![member(1, "An"), member(2, "Binh")],
        vec![
            edge(1, 2, RelationshipType::Spouse),
            edge(2, 42, RelationshipType::Parent),
        ],
    );

    let err = sync(&mut conn, &bad).unwrap_err();
    assert!(matches!(err, SyncError::DanglingReference { .. }));
    assert_eq!(load(&mut conn, family_id()), None);
    assert_eq!(count(&conn, "families"), 0);
    assert_eq!(count(&conn, "family_members"), 0);
    assert_eq!(count(&conn, "relationships"), 0);
}

#[test]
fn storage_failure_mid_relationship_creation_rolls_back_everything() {
    let mut conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TRIGGER reject_sibling_edges
         BEFORE INSERT ON relationships
         WHEN NEW.type = 'sibling'
         BEGIN
             SELECT RAISE(ABORT, 'sibling edges rejected');
         END;",
    )
    .unwrap();

    let input = draft(
        vec![member(1, "An"), member(2, "Binh")],
        vec![
            edge(1, 2, RelationshipType::Parent),
            edge(1, 2, RelationshipType::Sibling),
        ],
    );

    let err = sync(&mut conn, &input).unwrap_err();
    assert!(matches!(err, SyncError::Storage(RepoError::Db(_))));
    assert!(err.is_retryable());
    assert_eq!(err.error_code(), "storage_failure");
    assert_eq!(count(&conn, "families"), 0);
    assert_eq!(count(&conn, "family_members"), 0);
    assert_eq!(count(&conn, "relationships"), 0);
}

#[test]
fn new_family_with_members_and_relationships_is_created_in_one_call() {
    let mut conn = open_db_in_memory().unwrap();
    let result = sync(
        &mut conn,
        &draft(
            vec![member(1, "An"), member(2, "Binh"), member(3, "Chau")],
            vec![
                edge(1, 3, RelationshipType::Parent),
                edge(2, 3, RelationshipType::Parent),
                edge(1, 2, RelationshipType::Spouse),
            ],
        ),
    )
    .unwrap();

    assert_eq!(result.members.len(), 3);
    assert_eq!(
        edges(&result),
        vec![
            (id(1), id(3), RelationshipType::Parent),
            (id(2), id(3), RelationshipType::Parent),
            (id(1), id(2), RelationshipType::Spouse),
        ]
    );
    assert_eq!(load(&mut conn, family_id()), Some(result));
}

#[test]
fn syncing_zero_relationships_clears_the_set() {
    let mut conn = open_db_in_memory().unwrap();
    let members = vec![member(1, "An"), member(2, "Binh"), member(3, "Chau")];
    sync(
        &mut conn,
        &draft(
            members.clone(),
            vec![
                edge(1, 2, RelationshipType::Spouse),
                edge(1, 3, RelationshipType::Parent),
                edge(2, 3, RelationshipType::Parent),
            ],
        ),
    )
    .unwrap();
    assert_eq!(count(&conn, "relationships"), 3);

    let result = sync(&mut conn, &draft(members, vec![])).unwrap();
    assert!(result.relationships.is_empty());
    assert_eq!(result.members.len(), 3);
    assert_eq!(count(&conn, "relationships"), 0);
}

#[test]
fn self_loops_and_duplicate_pairs_are_stored_as_given() {
    let mut conn = open_db_in_memory().unwrap();
    let result = sync(
        &mut conn,
        &draft(
            vec![member(1, "An"), member(2, "Binh")],
            vec![
                edge(1, 1, RelationshipType::Spouse),
                edge(1, 2, RelationshipType::Parent),
                edge(1, 2, RelationshipType::Parent),
            ],
        ),
    )
    .unwrap();

    assert_eq!(result.relationships.len(), 3);
    assert_eq!(edges(&result)[0], (id(1), id(1), RelationshipType::Spouse));
    assert_ne!(result.relationships[1].id, result.relationships[2].id);
}

#[test]
fn member_state_is_fully_replaced_on_resync() {
    let mut conn = open_db_in_memory().unwrap();
    let mut rich = member(1, "An");
    rich.gender = Gender::Male;
    rich.date_of_birth = "1931-04-02".parse().ok();
    rich.date_of_death = "2001-11-30".parse().ok();
    rich.is_alive = Some(false);
    rich.biography = Some(json!({ "type": "doc", "content": [{ "type": "paragraph" }] }));
    rich.generation = 2;
    rich.position_x = Some(120.5);
    rich.position_y = Some(-40.25);

    let first = sync(&mut conn, &draft(vec![rich.clone()], vec![])).unwrap();
    assert_eq!(first.members[0], rich.to_member(family_id()));

    let mut bare = member(1, "An");
    bare.gender = Gender::Male;
    let second = sync(&mut conn, &draft(vec![bare], vec![])).unwrap();
    let stored = &second.members[0];
    assert_eq!(stored.date_of_birth, None);
    assert_eq!(stored.date_of_death, None);
    assert_eq!(stored.is_alive, None);
    assert_eq!(stored.biography, None);
    assert_eq!(stored.generation, 0);
    assert_eq!(stored.position_x, None);
    assert_eq!(stored.position_y, None);
}

#[test]
fn duplicate_member_ids_in_one_draft_keep_the_last_entry() {
    let mut conn = open_db_in_memory().unwrap();
    let result = sync(
        &mut conn,
        &draft(vec![member(1, "First"), member(1, "Second")], vec![]),
    )
    .unwrap();

    assert_eq!(result.members.len(), 1);
    assert_eq!(result.members[0].full_name, "Second");
}

#[test]
fn members_are_returned_by_generation_then_id() {
    let mut conn = open_db_in_memory().unwrap();
    let mut child = member(1, "Child");
    child.generation = 2;
    let mut parent = member(9, "Parent");
    parent.generation = 1;
    let mut sibling = member(3, "Sibling");
    sibling.generation = 2;

    let result = sync(&mut conn, &draft(vec![child, parent, sibling], vec![])).unwrap();
    assert_eq!(member_ids(&result), vec![id(9), id(1), id(3)]);
}

#[test]
fn member_owned_by_another_family_is_an_identity_conflict() {
    let mut conn = open_db_in_memory().unwrap();
    sync(&mut conn, &draft(vec![member(1, "An")], vec![])).unwrap();

    let other_family = Uuid::from_u128(0xF2);
    let err = sync(
        &mut conn,
        &draft_for(other_family, vec![member(7, "Dao"), member(1, "An")], vec![]),
    )
    .unwrap_err();

    match &err {
        SyncError::IdentityConflict {
            entity,
            id: conflicting,
            family_id: target,
            owner_family_id,
        } => {
            assert_eq!(*entity, EntityKind::Member);
            assert_eq!(*conflicting, id(1));
            assert_eq!(*target, other_family);
            assert_eq!(*owner_family_id, family_id());
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!err.is_retryable());

    assert_eq!(load(&mut conn, other_family), None);
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();
    assert_eq!(repo.member_owner(id(1)).unwrap(), Some(family_id()));
    assert_eq!(repo.member_owner(id(7)).unwrap(), None);
}

#[test]
fn relationship_echo_id_owned_by_another_family_is_an_identity_conflict() {
    let mut conn = open_db_in_memory().unwrap();
    let first = sync(
        &mut conn,
        &draft(
            vec![member(1, "An"), member(2, "Binh")],
            vec![edge(1, 2, RelationshipType::Spouse)],
        ),
    )
    .unwrap();

    let other_family = Uuid::from_u128(0xF2);
    let mut stolen = edge(11, 12, RelationshipType::Spouse);
    stolen.id = Some(first.relationships[0].id);
    let err = sync(
        &mut conn,
        &draft_for(
            other_family,
            vec![member(11, "Dao"), member(12, "Em")],
            vec![stolen],
        ),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        SyncError::IdentityConflict {
            entity: EntityKind::Relationship,
            ..
        }
    ));
    assert_eq!(err.error_code(), "identity_conflict");
    assert_eq!(load(&mut conn, other_family), None);
    assert_eq!(count(&conn, "family_members"), 2);
}

#[test]
fn relationship_to_member_of_another_family_is_dangling() {
    let mut conn = open_db_in_memory().unwrap();
    sync(&mut conn, &draft(vec![member(1, "An")], vec![])).unwrap();

    let other_family = Uuid::from_u128(0xF2);
    let err = sync(
        &mut conn,
        &draft_for(
            other_family,
            vec![member(11, "Dao")],
            vec![edge(11, 1, RelationshipType::Parent)],
        ),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        SyncError::DanglingReference { missing_member_id, .. } if missing_member_id == id(1)
    ));
}

#[test]
fn family_upsert_updates_fields_and_repoints_owner_and_group() {
    let mut conn = open_db_in_memory().unwrap();
    let first = sync(&mut conn, &draft(vec![], vec![])).unwrap();
    assert_eq!(first.family.name, "Tran");
    assert_eq!(first.family.lineage_type, Some(LineageType::Patrilineal));

    let mut renamed = draft(vec![], vec![]);
    renamed.family.name = "Tran-Le".to_string();
    renamed.family.description = None;
    renamed.family.lineage_type = Some(LineageType::Bilateral);

    let new_owner = Uuid::from_u128(0xB0B);
    let new_group = Uuid::from_u128(0x6A1);
    let second = FamilyService::try_new(&mut conn)
        .unwrap()
        .sync(new_owner, new_group, &renamed)
        .unwrap();

    assert_eq!(second.family.id, first.family.id);
    assert_eq!(second.family.name, "Tran-Le");
    assert_eq!(second.family.description, None);
    assert_eq!(second.family.lineage_type, Some(LineageType::Bilateral));
    assert_eq!(second.family.owner_id, new_owner);
    assert_eq!(second.family.group_id, new_group);
    assert_eq!(second.family.created_at, first.family.created_at);
    assert_eq!(count(&conn, "families"), 1);
}

#[test]
fn load_tree_for_group_finds_the_synced_family() {
    let mut conn = open_db_in_memory().unwrap();
    let synced = sync(
        &mut conn,
        &draft(
            vec![member(1, "An"), member(2, "Binh")],
            vec![edge(1, 2, RelationshipType::Spouse)],
        ),
    )
    .unwrap();

    let service = FamilyService::try_new(&mut conn).unwrap();
    assert_eq!(service.load_tree_for_group(GROUP).unwrap(), Some(synced));
    assert_eq!(
        service
            .load_tree_for_group(Uuid::from_u128(0xDEAD))
            .unwrap(),
        None
    );
}

#[test]
fn editor_json_draft_syncs_and_serializes_back() {
    let mut conn = open_db_in_memory().unwrap();
    let payload = json!({
        "family": { "id": family_id(), "name": "Pham" },
        "members": [
            { "id": id(1), "fullName": "An", "gender": "MALE", "generation": 1 },
            { "id": id(2), "fullName": "Binh", "gender": "FEMALE", "generation": 1,
              "dateOfBirth": "1950-01-31", "isAlive": true }
        ],
        "relationships": [
            { "id": Uuid::new_v4(), "fromMemberId": id(1), "toMemberId": id(2), "type": "SPOUSE" }
        ]
    });
    let input: FamilyDraft = serde_json::from_value(payload).unwrap();

    let result = sync(&mut conn, &input).unwrap();
    let output = serde_json::to_value(&result).unwrap();

    assert_eq!(output["family"]["name"], "Pham");
    assert_eq!(output["members"][1]["dateOfBirth"], "1950-01-31");
    assert_eq!(output["members"][1]["isAlive"], true);
    assert_eq!(output["relationships"][0]["type"], "SPOUSE");
    assert_eq!(output["relationships"][0]["fromMemberId"], json!(id(1)));
    assert!(output["relationships"][0].get("position").is_none());
}

#[test]
fn service_rejects_unmigrated_connection() {
    let mut conn = Connection::open_in_memory().unwrap();
    let err = FamilyService::try_new(&mut conn).err().unwrap();
    assert!(matches!(
        err,
        RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
}

#[test]
fn demo_draft_syncs_cleanly() {
    let mut conn = open_db_in_memory().unwrap();
    let input: FamilyDraft =
        serde_json::from_str(include_str!("../../../demos/draft.json")).unwrap();

    let result = sync(&mut conn, &input).unwrap();
    assert_eq!(result.members.len(), 3);
    assert_eq!(result.relationships.len(), 3);
    assert_eq!(result.family.lineage_type, Some(LineageType::Patrilineal));
}
