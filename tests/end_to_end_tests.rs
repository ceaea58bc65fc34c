
use scopecast::{
    BatchRecorder, Command, ObjectId, ReplicaMessage, ReplicationHub,
    ScopeController, ViewerCommandSynchronizer,
};
use table_utils::{ALICE, BOB, Knowledge, Table, Zone, move_card, reveal_card, set_life};
use tokio::sync::mpsc::UnboundedReceiver;

#[test]
fn test_reveal_scenario() {
    let recorder = BatchRecorder::new();
    let mut controller = ScopeController::new(recorder.clone());
    let mut table = Table::default().with_card(42, Zone::Hand);
    let mut knowledge = Knowledge::default();
    knowledge.grant(42, ALICE);

    let mut alice = ViewerCommandSynchronizer::new(Some(ALICE));
    let mut bob = ViewerCommandSynchronizer::new(Some(BOB));

    // Outside any scope: one batch right away.
    let life = set_life(&table, 1, 20);
    controller.execute(&mut table, life);
    let batches = recorder.take();
    assert_eq!(batches.len(), 1);
    for sync in [&mut alice, &mut bob] {
        let output = sync.synchronize(&table, &knowledge, batches[0].command()).unwrap();
        assert_eq!(output.names(), vec!["SetLife"]);
    }

    // Inside a group: one batch when it closes.
    {
        let mut group = controller.begin_command_group().unwrap();
        group.execute(&mut table, move_card(42, Zone::Hand, Zone::Battlefield));
        let reveal = reveal_card(&table, 42, "Dragon");
        group.execute(&mut table, reveal);
        assert!(recorder.is_empty());
    }
    let batches = recorder.take();
    assert_eq!(batches.len(), 1);

    let alice_output = alice
        .synchronize(&table, &knowledge, batches[0].command())
        .unwrap();
    assert_eq!(alice_output.names(), vec!["MoveCard", "RevealCard"]);

    let bob_output = bob
        .synchronize(&table, &knowledge, batches[0].command())
        .unwrap();
    assert_eq!(bob_output.names(), vec!["MoveCard"]);
    assert_eq!(
        bob.backlog().pending(ObjectId(42)).unwrap().names(),
        vec!["RevealCard"]
    );

    // The card becomes known to Bob.
    knowledge.grant(42, BOB);
    let released = bob.update(ObjectId(42)).unwrap();
    assert_eq!(released.names(), vec!["RevealCard"]);
    assert!(bob.backlog().pending(ObjectId(42)).is_none());
    assert!(bob.update(ObjectId(42)).is_none());
}

async fn apply_all(mut receiver: UnboundedReceiver<ReplicaMessage<Table>>, mut replica: Table) -> Table {
    while let Some(message) = receiver.recv().await {
        message.into_commands().execute(&mut replica);
    }
    replica
}

#[tokio::test]
async fn test_replicas_converge_after_reveal() {
    let recorder = BatchRecorder::new();
    let mut controller = ScopeController::new(recorder.clone());
    let start = Table::default().with_card(42, Zone::Hand).with_card(43, Zone::Library);
    let mut table = start.clone();
    let mut knowledge = Knowledge::default();
    knowledge.grant(42, ALICE);

    let mut hub = ReplicationHub::new();

    // Alice is connected from the start.
    let (_alice, alice_rx) = hub.join(&controller, &table, &knowledge, Some(ALICE)).unwrap();
    let alice_task = tokio::spawn(apply_all(alice_rx, start.clone()));

    let life = set_life(&table, 1, 20);
    controller.execute(&mut table, life);
    {
        let mut group = controller.begin_command_group().unwrap();
        group.execute(&mut table, move_card(42, Zone::Hand, Zone::Battlefield));
        let reveal = reveal_card(&table, 42, "Dragon");
        group.execute(&mut table, reveal);
    }
    for batch in recorder.take() {
        hub.dispatch(&table, &knowledge, &batch);
    }

    // Bob joins late and a spectator joins too; both replay the log.
    let (bob, bob_rx) = hub.join(&controller, &table, &knowledge, Some(BOB)).unwrap();
    let bob_task = tokio::spawn(apply_all(bob_rx, start.clone()));
    let (_spectator, spectator_rx) = hub.join(&controller, &table, &knowledge, None).unwrap();
    let spectator_task = tokio::spawn(apply_all(spectator_rx, start.clone()));
    assert_eq!(hub.pending_objects(bob), vec![ObjectId(42)]);

    let token = controller.begin_transaction().unwrap();
    controller.execute(&mut table, move_card(43, Zone::Library, Zone::Hand));
    controller.rollback(&mut table, token).unwrap();
    for batch in recorder.take() {
        hub.dispatch(&table, &knowledge, &batch);
    }

    knowledge.grant(42, BOB);
    let released = hub.reveal_all(ObjectId(42), |viewer| viewer == Some(BOB));
    assert_eq!(released, 1);

    drop(hub);
    let alice_replica = alice_task.await.unwrap();
    let bob_replica = bob_task.await.unwrap();
    let spectator_replica = spectator_task.await.unwrap();

    assert_eq!(alice_replica, table);
    assert_eq!(bob_replica, table);
    assert_eq!(spectator_replica.zones, table.zones);
    assert_eq!(spectator_replica.life, table.life);
    assert!(spectator_replica.names.is_empty());
}

#[test]
fn test_initial_message_for_empty_history() {
    let controller = ScopeController::new(BatchRecorder::<Table>::new());
    let mut hub = ReplicationHub::new();
    let (_id, mut rx) = hub
        .join(&controller, &Table::default(), &Knowledge::default(), Some(ALICE))
        .unwrap();

    match rx.try_recv().unwrap() {
        ReplicaMessage::Initial(commands) => assert!(!commands.has_children()),
        other => panic!("unexpected message: {other:?}"),
    }
}
