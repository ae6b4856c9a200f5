//! Property tests for the reconciler: random interleavings of edits,
//! refreshes from other crew members, and submits (successful or failed)
//! never violate the session invariants.

use jiff::Timestamp;
use proptest::prelude::*;

use sailplan::model::{JIB, REACHING_SPI, Selection};
use sailplan::reconcile::{Edit, Reconciler};

const MAINS: &[&str] = &["DOWN", "FULL", "R1", "R2", "R3", "R4"];
const HEADSAILS: &[&str] = &["JIB", "J1", "STORM"];
const DOWNWIND: &[&str] = &["BIGGEE", "REACHING_SPI", "WHOMPER"];

#[derive(Debug, Clone)]
enum Action {
    Main(usize),
    Headsail(Option<usize>),
    Downwind(Option<usize>),
    Staysail(bool),
    Comment(u8),
    /// A snapshot arriving from the store (another client's write).
    Refresh {
        main: usize,
        headsail: Option<usize>,
        downwind: Option<usize>,
    },
    /// Prepare, persist (assumed ok), commit.
    Submit {
        at: u32,
    },
    /// Prepare, but the store write fails: commit never happens.
    FailedSubmit {
        at: u32,
    },
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        (0usize..MAINS.len()).prop_map(Action::Main),
        prop::option::of(0usize..HEADSAILS.len()).prop_map(Action::Headsail),
        prop::option::of(0usize..DOWNWIND.len()).prop_map(Action::Downwind),
        any::<bool>().prop_map(Action::Staysail),
        (0u8..4).prop_map(Action::Comment),
        (
            0usize..MAINS.len(),
            prop::option::of(0usize..HEADSAILS.len()),
            prop::option::of(0usize..DOWNWIND.len()),
        )
            .prop_map(|(main, headsail, downwind)| Action::Refresh {
                main,
                headsail,
                downwind,
            }),
        (0u32..100_000).prop_map(|at| Action::Submit { at }),
        (0u32..100_000).prop_map(|at| Action::FailedSubmit { at }),
    ]
}

fn snapshot(main: usize, headsail: Option<usize>, downwind: Option<usize>) -> Selection {
    Selection {
        main: MAINS[main].to_string(),
        headsail: headsail.map(|i| HEADSAILS[i].to_string()),
        downwind: downwind.map(|i| DOWNWIND[i].to_string()),
        staysail: false,
        comment: String::new(),
    }
}

fn ts(at: u32) -> Timestamp {
    Timestamp::new(1_700_000_000 + i64::from(at), 0).unwrap()
}

proptest! {
    #[test]
    fn random_sequences_preserve_reconciler_invariants(
        actions in prop::collection::vec(action_strategy(), 1..200)
    ) {
        let mut rec = Reconciler::new(Selection::default());

        for action in actions {
            match action {
                Action::Main(i) => rec.apply_edit(Edit::Main(MAINS[i].to_string())),
                Action::Headsail(i) => {
                    rec.apply_edit(Edit::Headsail(i.map(|i| HEADSAILS[i].to_string())));
                }
                Action::Downwind(i) => {
                    rec.apply_edit(Edit::Downwind(i.map(|i| DOWNWIND[i].to_string())));
                }
                Action::Staysail(on) => {
                    let compatible = rec.working().staysail_compatible();
                    rec.apply_edit(Edit::Staysail(on));
                    // Turning it on is a no-op unless already compatible.
                    prop_assert_eq!(rec.working().staysail, on && compatible);
                }
                Action::Comment(i) => rec.apply_edit(Edit::Comment(format!("note {i}"))),
                Action::Refresh { main, headsail, downwind } => {
                    let snap = snapshot(main, headsail, downwind);
                    let was_dirty = rec.has_pending_changes();
                    let working_before = rec.working().clone();

                    rec.refresh(snap.clone());

                    prop_assert_eq!(rec.committed(), &snap);
                    if was_dirty {
                        // Open edits survive concurrent external writes.
                        prop_assert_eq!(rec.working(), &working_before);
                    } else {
                        prop_assert_eq!(rec.working(), &snap);
                    }
                }
                Action::Submit { at } => {
                    let entry = rec.prepare_submit(ts(at)).unwrap();
                    prop_assert_eq!(&entry.selection, rec.working());
                    prop_assert_eq!(entry.timestamp, ts(at));

                    rec.commit_submitted(&entry);
                    prop_assert!(!rec.has_pending_changes());
                    prop_assert_eq!(rec.committed(), &entry.selection);
                }
                Action::FailedSubmit { at } => {
                    let working_before = rec.working().clone();
                    let was_dirty = rec.has_pending_changes();

                    let _unpersisted = rec.prepare_submit(ts(at)).unwrap();

                    prop_assert_eq!(rec.working(), &working_before);
                    prop_assert_eq!(rec.has_pending_changes(), was_dirty);
                }
            }

            // Invariants that must hold in every reachable state.
            let working = rec.working();
            prop_assert!(!working.main.is_empty());
            prop_assert!(
                !working.staysail
                    || (working.headsail.as_deref() == Some(JIB)
                        && working.downwind.as_deref() == Some(REACHING_SPI)),
                "staysail on without JIB + REACHING_SPI: {working:?}"
            );
            prop_assert_eq!(
                rec.has_pending_changes(),
                rec.working() != rec.committed()
            );
        }
    }
}
