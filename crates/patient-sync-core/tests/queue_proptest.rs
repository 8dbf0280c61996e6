use patient_sync_core::db::Database;
use patient_sync_core::models::Endpoint;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum QueueOp {
    Enqueue { endpoint: Endpoint },
    Remove { pick: usize },
    Fail { pick: usize },
}

fn endpoint_strategy() -> impl Strategy<Value = Endpoint> {
    prop_oneof![
        Just(Endpoint::RegisterPatient),
        Just(Endpoint::AddVitals),
        Just(Endpoint::AddVisit),
    ]
}

fn queue_op_strategy() -> impl Strategy<Value = QueueOp> {
    prop_oneof![
        3 => endpoint_strategy().prop_map(|endpoint| QueueOp::Enqueue { endpoint }),
        1 => (0usize..64).prop_map(|pick| QueueOp::Remove { pick }),
        1 => (0usize..64).prop_map(|pick| QueueOp::Fail { pick }),
    ]
}

proptest! {
    #[test]
    fn queue_lists_in_enqueue_order(ops in proptest::collection::vec(queue_op_strategy(), 1..60)) {
        let db = Database::open_in_memory().expect("db");

        // (id, attempts) in enqueue order
        let mut shadow: Vec<(i64, u32)> = Vec::new();

        for (n, op) in ops.into_iter().enumerate() {
            match op {
                QueueOp::Enqueue { endpoint } => {
                    let id = db
                        .enqueue_operation(endpoint, &format!("{{\"n\":{}}}", n), None)
                        .unwrap();
                    shadow.push((id, 0));
                }
                QueueOp::Remove { pick } => {
                    if shadow.is_empty() {
                        prop_assert!(!db.remove_pending_operation(i64::MAX).unwrap());
                        continue;
                    }
                    let (id, _) = shadow.remove(pick % shadow.len());
                    prop_assert!(db.remove_pending_operation(id).unwrap());
                    prop_assert!(!db.remove_pending_operation(id).unwrap());
                }
                QueueOp::Fail { pick } => {
                    if shadow.is_empty() {
                        continue;
                    }
                    let index = pick % shadow.len();
                    db.record_operation_failure(shadow[index].0, "failed").unwrap();
                    shadow[index].1 += 1;
                }
            }
        }

        let listed = db.list_pending_operations().unwrap();
        prop_assert_eq!(listed.len(), shadow.len());
        prop_assert_eq!(db.count_pending_operations().unwrap() as usize, shadow.len());

        for pair in listed.windows(2) {
            prop_assert!(pair[0].created_at < pair[1].created_at);
        }
        for (op, (id, attempts)) in listed.iter().zip(shadow.iter()) {
            prop_assert_eq!(op.id, *id);
            prop_assert_eq!(op.attempt_count, *attempts);
        }
    }
}
