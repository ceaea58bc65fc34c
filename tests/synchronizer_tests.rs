
use scopecast::{
    BatchRecorder, Command, ObjectId, ScopeController, ViewerCommandSynchronizer,
};
use table_utils::{ALICE, BOB, Knowledge, Table, Zone, cast_spell, move_card, reveal_card, set_life};

#[test]
fn test_hidden_command_released_exactly_once() {
    let table = Table::default();
    let knowledge = Knowledge::default();
    let mut bob = ViewerCommandSynchronizer::new(Some(BOB));

    let output = bob.synchronize(&table, &knowledge, &reveal_card(&table, 7, "Dragon"));
    assert!(output.is_none());

    let released = bob.update(ObjectId(7)).unwrap();
    assert_eq!(released.names(), vec!["RevealCard"]);
    assert!(bob.update(ObjectId(7)).is_none());
}

#[test]
fn test_public_command_always_delivered() {
    let table = Table::default().with_card(7, Zone::Hand);
    let knowledge = Knowledge::default();
    let mut spectator = ViewerCommandSynchronizer::new(None);

    let output = spectator
        .synchronize(&table, &knowledge, &move_card(7, Zone::Hand, Zone::Battlefield))
        .unwrap();
    assert_eq!(output.names(), vec!["MoveCard"]);
    assert!(spectator.backlog().is_empty());
}

#[test]
fn test_registered_effects_precede_announcement() {
    let table = Table::default().with_card(7, Zone::Hand);
    let mut knowledge = Knowledge::default();
    knowledge.grant(7, ALICE);
    let spell = cast_spell(
        "Summon",
        vec![
            move_card(7, Zone::Hand, Zone::Battlefield),
            reveal_card(&table, 7, "Dragon"),
        ],
    );

    let mut alice = ViewerCommandSynchronizer::new(Some(ALICE));
    let output = alice.synchronize(&table, &knowledge, &spell).unwrap();
    assert_eq!(output.names(), vec!["MoveCard", "RevealCard", "Announce"]);

    let mut bob = ViewerCommandSynchronizer::new(Some(BOB));
    let output = bob.synchronize(&table, &knowledge, &spell).unwrap();
    assert_eq!(output.names(), vec!["MoveCard", "Announce"]);
    assert_eq!(bob.backlog().pending_objects(), vec![ObjectId(7)]);
}

#[test]
fn test_backlog_keeps_original_order_per_object() {
    let mut table = Table::default();
    let knowledge = Knowledge::default();
    let mut bob = ViewerCommandSynchronizer::new(Some(BOB));

    let first = reveal_card(&table, 7, "Egg");
    first.execute(&mut table);
    bob.synchronize(&table, &knowledge, &first);
    let other = reveal_card(&table, 8, "Owl");
    other.execute(&mut table);
    bob.synchronize(&table, &knowledge, &other);
    let second = reveal_card(&table, 7, "Dragon");
    second.execute(&mut table);
    bob.synchronize(&table, &knowledge, &second);

    let mut replica = Table::default();
    bob.update(ObjectId(7)).unwrap().execute(&mut replica);
    assert_eq!(replica.names.get(&7).map(String::as_str), Some("Dragon"));
    assert!(!replica.names.contains_key(&8));
    assert_eq!(bob.backlog().pending_objects(), vec![ObjectId(8)]);
}

#[test]
fn test_compensation_for_hidden_command_stays_hidden() {
    let recorder = BatchRecorder::new();
    let mut controller = ScopeController::new(recorder.clone());
    let mut table = Table::default().with_card(7, Zone::Hand);
    let knowledge = Knowledge::default();

    let token = controller.begin_transaction().unwrap();
    let life = set_life(&table, 2, 20);
    controller.execute(&mut table, life);
    let reveal = reveal_card(&table, 7, "Dragon");
    controller.execute(&mut table, reveal);
    controller.rollback(&mut table, token).unwrap();

    let mut bob = ViewerCommandSynchronizer::new(Some(BOB));
    let mut replica = Table::default().with_card(7, Zone::Hand);
    for batch in recorder.take() {
        if let Some(output) = bob.synchronize(&table, &knowledge, batch.command()) {
            output.execute(&mut replica);
        }
    }
    assert!(replica.life.is_empty());
    assert!(replica.names.is_empty());

    // Reveal delivers the reveal and its undo, in that order.
    let released = bob.update(ObjectId(7)).unwrap();
    assert_eq!(released.names(), vec!["RevealCard", "inverse"]);
    released.execute(&mut replica);
    assert_eq!(replica, table);
}
