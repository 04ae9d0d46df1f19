//! Pure status classifier: does this user still need automatic processing?

use syncbridge_core::{MindReportStatus, SyncStatus};

use crate::user::User;

/// Classifier output for a user's stored status fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    /// Still needs automatic processing; surfaced by the pending-user lists.
    Eligible,
    /// Requires manual intervention; must not be auto-retried.
    Blocked,
    /// Nothing left for automation to do.
    Done,
}

/// Classify the primary sync state.
///
/// Decision policy, in priority order:
/// 1. Unset or `pending` is Eligible (fresh users and explicit retries).
/// 2. Otherwise a locally-created user is Done.
/// 3. Otherwise the manual-intervention statuses are Blocked.
/// 4. Everything else (`processing`, transient `failed`) remains Eligible,
///    preserving the legacy behavior of surfacing in-flight and failed users
///    as outstanding work.
pub fn classify_sync(user: &User) -> Eligibility {
    match user.sync_status {
        None | Some(SyncStatus::Pending) => Eligibility::Eligible,
        Some(status) => {
            if user.is_created_locally {
                Eligibility::Done
            } else if status.requires_intervention() {
                Eligibility::Blocked
            } else {
                Eligibility::Eligible
            }
        }
    }
}

/// Classify the mind-report state: eligible only while unset or `pending`.
/// A failed report is re-queued explicitly, never picked up automatically.
pub fn classify_mind_report(user: &User) -> Eligibility {
    match user.mind_report_status {
        None | Some(MindReportStatus::Pending) => Eligibility::Eligible,
        Some(_) => Eligibility::Done,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::NewUser;
    use syncbridge_core::{ClientCode, UserId};

    fn user_with(status: Option<SyncStatus>, created_locally: bool) -> User {
        let mut user = User::register(
            UserId::new(),
            ClientCode::new("TE5T1").unwrap(),
            NewUser::named("Test"),
        );
        user.sync_status = status;
        user.is_created_locally = created_locally;
        user
    }

    #[test]
    fn unset_and_pending_are_eligible() {
        assert_eq!(classify_sync(&user_with(None, false)), Eligibility::Eligible);
        assert_eq!(
            classify_sync(&user_with(Some(SyncStatus::Pending), false)),
            Eligibility::Eligible
        );
    }

    #[test]
    fn pending_wins_even_when_created_locally() {
        // Rule 1 outranks rule 2: an explicit retry re-surfaces the user.
        assert_eq!(
            classify_sync(&user_with(Some(SyncStatus::Pending), true)),
            Eligibility::Eligible
        );
    }

    #[test]
    fn created_locally_is_done() {
        assert_eq!(
            classify_sync(&user_with(Some(SyncStatus::Completed), true)),
            Eligibility::Done
        );
    }

    #[test]
    fn manual_intervention_statuses_are_blocked() {
        for status in [
            SyncStatus::ClientIdMismatch,
            SyncStatus::DeleteFailed,
            SyncStatus::MysqlErrorDeleted,
            SyncStatus::ClipboardCopyFailed,
        ] {
            assert_eq!(
                classify_sync(&user_with(Some(status), false)),
                Eligibility::Blocked
            );
        }
    }

    #[test]
    fn processing_and_failed_stay_eligible() {
        assert_eq!(
            classify_sync(&user_with(Some(SyncStatus::Processing), false)),
            Eligibility::Eligible
        );
        assert_eq!(
            classify_sync(&user_with(Some(SyncStatus::Failed), false)),
            Eligibility::Eligible
        );
    }

    #[test]
    fn mind_report_rule_is_simpler() {
        let mut user = user_with(None, false);
        assert_eq!(classify_mind_report(&user), Eligibility::Eligible);

        user.mind_report_status = Some(MindReportStatus::Pending);
        assert_eq!(classify_mind_report(&user), Eligibility::Eligible);

        for status in [
            MindReportStatus::Processing,
            MindReportStatus::Completed,
            MindReportStatus::Failed,
        ] {
            user.mind_report_status = Some(status);
            assert_eq!(classify_mind_report(&user), Eligibility::Done);
        }
    }
}
