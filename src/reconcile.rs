//! The sail-configuration reconciler.
//!
//! Each connected client (a phone in the cockpit, a tablet at the nav
//! station) owns one [`Reconciler`]. The store is the only shared resource;
//! the reconciler keeps a client's in-progress selection consistent with it
//! without locks or server-held sessions:
//!
//! - `committed` is the most recent selection read from the store.
//! - `working` is the crew member's in-progress edits.
//! - While the two differ, [`Reconciler::refresh`] moves only `committed`,
//!   so another crew member's write never clobbers open edits.
//! - With no open edits, a refresh syncs `working` to whatever the store
//!   says, making concurrent updates visible.
//!
//! Submitting is split in two so a failed store write leaves the session
//! untouched: [`Reconciler::prepare_submit`] builds the record without
//! mutating anything, and [`Reconciler::commit_submitted`] advances the
//! session only once the caller has confirmed the write landed.
//!
//! Deletion is likewise two-phase — request, then confirm with the issued
//! token — so "no delete without confirmation" is enforced here rather than
//! being a presentation-layer convention.

use jiff::{Timestamp, Unit};
use uuid::Uuid;

use crate::model::{JIB, LogEntry, REACHING_SPI, Selection};

/// Errors from the reconciler. All are caller errors; the reconciler never
/// performs I/O.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// The backdate override is later than the submit instant. Backdates
    /// are validated upstream; reaching here is a bug in the caller, not
    /// something to clamp silently.
    #[error("backdated timestamp {backdate} is after the current time {now}")]
    BackdateInFuture {
        /// The rejected override.
        backdate: Timestamp,
        /// The wall-clock instant passed to submit.
        now: Timestamp,
    },

    /// Timestamp rounding failed.
    #[error("invalid timestamp: {0}")]
    Time(#[from] jiff::Error),
}

/// A single field edit dispatched from the presentation layer.
///
/// Values are assumed to be members of the boat's configured option lists;
/// the cross-field rules below are enforced regardless.
#[derive(Debug, Clone)]
pub enum Edit {
    /// Set the main sail state.
    Main(String),
    /// Select a headsail, or douse it.
    Headsail(Option<String>),
    /// Select a downwind sail, or douse it.
    Downwind(Option<String>),
    /// Toggle staysail mode.
    Staysail(bool),
    /// Replace the comment.
    Comment(String),
}

/// Opaque receipt for an outstanding delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteToken(Uuid);

/// Per-client session state reconciling local edits against the shared store.
#[derive(Debug)]
pub struct Reconciler {
    committed: Selection,
    working: Selection,
    backdate: Option<Timestamp>,
    pending_delete: Option<(DeleteToken, Timestamp)>,
}

impl Reconciler {
    /// Creates a session with both sides at the given selection, typically
    /// the boat's baseline until the first refresh.
    pub fn new(committed: Selection) -> Self {
        Self {
            working: committed.clone(),
            committed,
            backdate: None,
            pending_delete: None,
        }
    }

    /// The most recently fetched store state.
    pub fn committed(&self) -> &Selection {
        &self.committed
    }

    /// The in-progress selection.
    pub fn working(&self) -> &Selection {
        &self.working
    }

    /// Whether `working` differs from `committed`. Comment differences
    /// count; timestamps are not part of a [`Selection`].
    pub fn has_pending_changes(&self) -> bool {
        self.working != self.committed
    }

    /// The backdate override for the next submit, if any.
    pub fn backdate(&self) -> Option<Timestamp> {
        self.backdate
    }

    /// Folds in the latest store snapshot at the start of an interaction
    /// cycle. A missing store record is the caller's problem to default;
    /// this always receives a concrete selection.
    ///
    /// Open edits are never silently discarded: while pending changes
    /// exist, only `committed` moves.
    pub fn refresh(&mut self, snapshot: Selection) {
        if self.has_pending_changes() {
            self.committed = snapshot;
        } else {
            self.working = snapshot.clone();
            self.committed = snapshot;
        }
    }

    /// Applies one field edit to the working selection. Local only; the
    /// store is not touched.
    ///
    /// Cross-field rules, in order:
    /// 1. A downwind sail other than the reaching spinnaker forces the
    ///    staysail off.
    /// 2. A headsail other than the jib forces the staysail off.
    /// 3. Turning the staysail on while the combination doesn't hold is a
    ///    silent no-op.
    pub fn apply_edit(&mut self, edit: Edit) {
        match edit {
            Edit::Main(state) => self.working.main = state,
            Edit::Headsail(sail) => {
                self.working.headsail = sail;
                if self.working.headsail.as_deref() != Some(JIB) {
                    self.working.staysail = false;
                }
            }
            Edit::Downwind(sail) => {
                self.working.downwind = sail;
                if self.working.downwind.as_deref() != Some(REACHING_SPI) {
                    self.working.staysail = false;
                }
            }
            Edit::Staysail(on) => {
                if !on {
                    self.working.staysail = false;
                } else if self.working.staysail_compatible() {
                    self.working.staysail = true;
                }
            }
            Edit::Comment(text) => self.working.comment = text,
        }
    }

    /// Sets (or clears) the timestamp override for the next submit.
    pub fn set_backdate(&mut self, backdate: Option<Timestamp>) {
        self.backdate = backdate;
    }

    /// Builds the record to persist for the current working selection,
    /// timestamped at the backdate override or `now`, rounded to second
    /// precision.
    ///
    /// Does not mutate the session: the caller writes the record to the
    /// store and reports back via [`Reconciler::commit_submitted`], so a
    /// failed write leaves `working` and the pending flag exactly as they
    /// were and the crew can retry without re-entering anything.
    pub fn prepare_submit(&self, now: Timestamp) -> Result<LogEntry, ReconcileError> {
        if let Some(backdate) = self.backdate
            && backdate > now
        {
            return Err(ReconcileError::BackdateInFuture { backdate, now });
        }
        let timestamp = self.backdate.unwrap_or(now).round(Unit::Second)?;
        Ok(LogEntry {
            selection: self.working.clone(),
            timestamp,
        })
    }

    /// Advances the session after the caller persisted `entry` successfully:
    /// both sides become the saved selection, pending changes and the
    /// backdate override are cleared.
    pub fn commit_submitted(&mut self, entry: &LogEntry) {
        self.committed = entry.selection.clone();
        self.working = entry.selection.clone();
        self.backdate = None;
    }

    /// First phase of deletion: registers intent to delete the record at
    /// `timestamp` and returns the token the confirmation must echo. The
    /// store is not contacted. A second request replaces the first.
    pub fn request_delete(&mut self, timestamp: Timestamp) -> DeleteToken {
        let token = DeleteToken(Uuid::new_v4());
        self.pending_delete = Some((token, timestamp));
        token
    }

    /// Second phase: yields the timestamp to delete from the store, but
    /// only for the outstanding token. A mismatched or stale token yields
    /// nothing and leaves the request pending.
    ///
    /// Deleting the committed record does not touch `working`; the next
    /// refresh surfaces whatever the store then holds.
    pub fn confirm_delete(&mut self, token: DeleteToken) -> Option<Timestamp> {
        match self.pending_delete {
            Some((expected, timestamp)) if expected == token => {
                self.pending_delete = None;
                Some(timestamp)
            }
            _ => None,
        }
    }

    /// Abandons any outstanding delete request.
    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(secs: i64) -> Timestamp {
        Timestamp::new(secs, 0).unwrap()
    }

    fn committed_full_jib() -> Selection {
        Selection {
            main: "FULL".into(),
            headsail: Some("JIB".into()),
            downwind: None,
            staysail: false,
            comment: String::new(),
        }
    }

    #[test]
    fn clean_refresh_syncs_both_sides() {
        let mut rec = Reconciler::new(Selection::default());
        let snapshot = Selection {
            main: "R1".into(),
            headsail: Some("STORM".into()),
            downwind: None,
            staysail: false,
            comment: "reef early".into(),
        };

        rec.refresh(snapshot.clone());

        assert_eq!(rec.working(), &snapshot);
        assert_eq!(rec.committed(), &snapshot);
        assert!(!rec.has_pending_changes());
    }

    #[test]
    fn dirty_refresh_moves_only_committed() {
        let mut rec = Reconciler::new(Selection::default());
        rec.apply_edit(Edit::Main("R2".into()));
        assert!(rec.has_pending_changes());

        let other_crew = Selection {
            main: "R4".into(),
            ..Selection::default()
        };
        rec.refresh(other_crew.clone());

        assert_eq!(rec.committed(), &other_crew);
        assert_eq!(rec.working().main, "R2");
        assert!(rec.has_pending_changes());
    }

    #[test]
    fn staysail_cannot_turn_on_when_incompatible() {
        let mut rec = Reconciler::new(committed_full_jib());

        rec.apply_edit(Edit::Staysail(true));
        assert!(!rec.working().staysail);
        // A rejected toggle is not an edit.
        assert!(!rec.has_pending_changes());
    }

    #[test]
    fn staysail_turns_on_when_compatible() {
        let mut rec = Reconciler::new(committed_full_jib());

        rec.apply_edit(Edit::Downwind(Some(REACHING_SPI.into())));
        assert!(!rec.working().staysail); // Never auto-enabled.

        rec.apply_edit(Edit::Staysail(true));
        assert!(rec.working().staysail);
    }

    #[test]
    fn downwind_change_forces_staysail_off() {
        let mut rec = Reconciler::new(committed_full_jib());
        rec.apply_edit(Edit::Downwind(Some(REACHING_SPI.into())));
        rec.apply_edit(Edit::Staysail(true));
        assert!(rec.working().staysail);

        rec.apply_edit(Edit::Downwind(Some("WHOMPER".into())));
        assert!(!rec.working().staysail);
    }

    #[test]
    fn headsail_change_forces_staysail_off() {
        let mut rec = Reconciler::new(committed_full_jib());
        rec.apply_edit(Edit::Downwind(Some(REACHING_SPI.into())));
        rec.apply_edit(Edit::Staysail(true));

        rec.apply_edit(Edit::Headsail(Some("STORM".into())));
        assert!(!rec.working().staysail);
    }

    #[test]
    fn dousing_headsail_forces_staysail_off() {
        let mut rec = Reconciler::new(committed_full_jib());
        rec.apply_edit(Edit::Downwind(Some(REACHING_SPI.into())));
        rec.apply_edit(Edit::Staysail(true));

        rec.apply_edit(Edit::Headsail(None));
        assert!(!rec.working().staysail);
    }

    #[test]
    fn comment_counts_as_pending_change() {
        let mut rec = Reconciler::new(committed_full_jib());
        rec.apply_edit(Edit::Comment("wind building".into()));
        assert!(rec.has_pending_changes());
    }

    #[test]
    fn spec_scenario_edit_submit_cycle() {
        // committed = (FULL, JIB, none, false, "")
        let mut rec = Reconciler::new(committed_full_jib());

        rec.apply_edit(Edit::Downwind(Some(REACHING_SPI.into())));
        assert!(!rec.working().staysail);
        assert!(rec.has_pending_changes());

        rec.apply_edit(Edit::Staysail(true));
        assert!(rec.working().staysail);

        rec.apply_edit(Edit::Downwind(Some("WHOMPER".into())));
        assert!(!rec.working().staysail);

        let now = ts(1_700_000_000);
        let entry = rec.prepare_submit(now).unwrap();
        assert_eq!(entry.timestamp, now);
        assert_eq!(entry.selection.main, "FULL");
        assert_eq!(entry.selection.headsail.as_deref(), Some("JIB"));
        assert_eq!(entry.selection.downwind.as_deref(), Some("WHOMPER"));
        assert!(!entry.selection.staysail);
        assert!(entry.selection.comment.is_empty());

        rec.commit_submitted(&entry);
        assert_eq!(rec.committed(), rec.working());
        assert!(!rec.has_pending_changes());
    }

    #[test]
    fn prepare_submit_does_not_mutate() {
        let mut rec = Reconciler::new(committed_full_jib());
        rec.apply_edit(Edit::Main("R3".into()));
        let before = rec.working().clone();

        // The caller's write failed: commit_submitted is never called.
        let _entry = rec.prepare_submit(ts(1_700_000_000)).unwrap();

        assert_eq!(rec.working(), &before);
        assert!(rec.has_pending_changes());
    }

    #[test]
    fn backdate_used_for_submit_and_cleared_after() {
        let mut rec = Reconciler::new(committed_full_jib());
        rec.apply_edit(Edit::Main("R1".into()));

        let earlier = ts(1_600_000_000);
        rec.set_backdate(Some(earlier));
        let entry = rec.prepare_submit(ts(1_700_000_000)).unwrap();
        assert_eq!(entry.timestamp, earlier);

        rec.commit_submitted(&entry);
        assert_eq!(rec.backdate(), None);
    }

    #[test]
    fn backdate_in_future_is_rejected() {
        let mut rec = Reconciler::new(committed_full_jib());
        rec.set_backdate(Some(ts(1_700_000_100)));

        let err = rec.prepare_submit(ts(1_700_000_000)).unwrap_err();
        assert!(matches!(err, ReconcileError::BackdateInFuture { .. }));
    }

    #[test]
    fn submit_timestamp_is_second_precision() {
        let rec = Reconciler::new(committed_full_jib());
        let now = Timestamp::new(1_700_000_000, 250_000_000).unwrap();

        let entry = rec.prepare_submit(now).unwrap();
        assert_eq!(entry.timestamp.subsec_nanosecond(), 0);
    }

    #[test]
    fn delete_requires_matching_token() {
        let mut rec = Reconciler::new(committed_full_jib());
        let target = ts(1_650_000_000);

        let token = rec.request_delete(target);
        let stale = rec.request_delete(target); // Replaces the first request.

        assert_eq!(rec.confirm_delete(token), None);
        assert_eq!(rec.confirm_delete(stale), Some(target));
        // Consumed: the same token doesn't confirm twice.
        assert_eq!(rec.confirm_delete(stale), None);
    }

    #[test]
    fn confirm_without_request_yields_nothing() {
        let mut one = Reconciler::new(Selection::default());
        let mut other = Reconciler::new(Selection::default());

        let token = other.request_delete(ts(1_650_000_000));
        assert_eq!(one.confirm_delete(token), None);
    }

    #[test]
    fn cancel_clears_outstanding_request() {
        let mut rec = Reconciler::new(Selection::default());
        let token = rec.request_delete(ts(1_650_000_000));

        rec.cancel_delete();
        assert_eq!(rec.confirm_delete(token), None);
    }

    #[test]
    fn deleting_committed_entry_leaves_working_alone() {
        let mut rec = Reconciler::new(committed_full_jib());
        let token = rec.request_delete(ts(1_650_000_000));
        let working_before = rec.working().clone();

        rec.confirm_delete(token);

        assert_eq!(rec.working(), &working_before);
        assert_eq!(rec.committed(), &working_before);
    }

    #[test]
    fn concurrent_write_matching_local_edits_goes_clean() {
        let mut rec = Reconciler::new(committed_full_jib());
        rec.apply_edit(Edit::Main("R2".into()));
        assert!(rec.has_pending_changes());

        // Another crew member saved the same change first.
        let mut same = committed_full_jib();
        same.main = "R2".into();
        rec.refresh(same);

        assert!(!rec.has_pending_changes());
    }
}
