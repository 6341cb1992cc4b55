//! Scheduled recycle bin cleanup.

use tracing::{info, warn};

use projectfs_core::events::deletion::SYSTEM_USER;
use projectfs_core::result::AppResult;
use projectfs_entity::recycle_bin::CleanupReason;

use super::service::{RecycleBinService, failure};
use super::types::CleanupReport;

impl RecycleBinService {
    /// Two passes: destroy expired items, then destroy the oldest remaining
    /// items while the bin is over its size cap.
    ///
    /// A failing item is reported and skipped; it never aborts the run.
    pub async fn run_scheduled_cleanup(&self) -> AppResult<CleanupReport> {
        let mut report = CleanupReport::default();
        let now = self.now();

        for item in self.repo().find_expired(now).await? {
            match self
                .purge_item(item.id, SYSTEM_USER, "retention_expired", Some(CleanupReason::TimeLimit))
                .await
            {
                Ok(freed) => {
                    report.expired_deleted += 1;
                    report.total_size_freed += freed;
                }
                Err(e) => {
                    warn!(item_id = %item.id, error = %e, "Expired item cleanup failed");
                    report.failures.push(failure(item.id, &e));
                }
            }
        }

        let cap = self.config().max_total_size;
        let mut in_use = self.repo().total_active_size().await?;
        if in_use > cap {
            for item in self.repo().list_active_oldest_first().await? {
                if in_use <= cap {
                    break;
                }
                match self
                    .purge_item(item.id, SYSTEM_USER, "size_limit_exceeded", Some(CleanupReason::SizeLimit))
                    .await
                {
                    Ok(freed) => {
                        report.size_limit_deleted += 1;
                        report.total_size_freed += freed;
                        in_use = in_use.saturating_sub(freed);
                    }
                    Err(e) => {
                        warn!(item_id = %item.id, error = %e, "Size-limit cleanup failed");
                        report.failures.push(failure(item.id, &e));
                    }
                }
            }
        }

        report.remaining_size = self.repo().total_active_size().await?;
        info!(
            expired = report.expired_deleted,
            size_limit = report.size_limit_deleted,
            freed = report.total_size_freed,
            remaining = report.remaining_size,
            failed = report.failures.len(),
            "Recycle bin cleanup finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use projectfs_core::types::ClientId;
    use projectfs_entity::recycle_bin::{CleanupReason, ItemStatus};

    use super::super::service::RecycleBinService;
    use super::super::service::tests::{fixture_with, request, write_file};

    #[tokio::test]
    async fn test_cleanup_removes_expired_then_oldest_first() {
        let fx = fixture_with(|c| c.max_total_size = 100);
        let client = ClientId::new();

        // A: small, will expire. B: large and oldest of the rest. C: small, newest.
        let a_path = fx.dir.path().join("a.txt");
        write_file(&a_path, 10).await;
        let a = fx.service.intercept(&a_path, request(client)).await.expect("a");

        fx.clock.advance(Duration::days(3));
        let b_path = fx.dir.path().join("b.bin");
        write_file(&b_path, 60).await;
        let b = fx.service.intercept(&b_path, request(client)).await.expect("b");

        fx.clock.advance(Duration::days(1));
        let c_path = fx.dir.path().join("c.txt");
        write_file(&c_path, 20).await;
        let c = fx.service.intercept(&c_path, request(client)).await.expect("c");

        // A has expired. Shrinking the cap leaves B + C over it.
        fx.clock.advance(Duration::days(4));
        let mut config = fx.service.config().clone();
        config.max_total_size = 50;
        let strict = RecycleBinService::new(fx.repo.clone(), config, fx.clock.clone(), 4);

        let report = strict.run_scheduled_cleanup().await.expect("cleanup");

        assert_eq!(report.expired_deleted, 1);
        assert_eq!(report.size_limit_deleted, 1);
        assert_eq!(report.total_size_freed, 70);
        assert_eq!(report.remaining_size, 20);
        assert!(report.failures.is_empty());

        let a = fx.service.get_item(a.recycle_bin_id).await.expect("a");
        let b = fx.service.get_item(b.recycle_bin_id).await.expect("b");
        let c = fx.service.get_item(c.recycle_bin_id).await.expect("c");
        assert_eq!(a.status(), ItemStatus::PermanentlyDeleted);
        assert_eq!(a.cleanup_reason, Some(CleanupReason::TimeLimit));
        assert_eq!(b.status(), ItemStatus::PermanentlyDeleted);
        assert_eq!(b.cleanup_reason, Some(CleanupReason::SizeLimit));
        assert_eq!(c.status(), ItemStatus::Active);
    }

    #[tokio::test]
    async fn test_cleanup_under_cap_keeps_unexpired_items() {
        let fx = fixture_with(|_| {});
        let path = fx.dir.path().join("keep.txt");
        write_file(&path, 5).await;
        let kept = fx
            .service
            .intercept(&path, request(ClientId::new()))
            .await
            .expect("intercept");

        fx.clock.advance(Duration::days(6));
        let report = fx.service.run_scheduled_cleanup().await.expect("cleanup");

        assert_eq!(report.expired_deleted + report.size_limit_deleted, 0);
        assert_eq!(report.remaining_size, 5);
        let item = fx.service.get_item(kept.recycle_bin_id).await.expect("item");
        assert!(item.is_active());
    }
}
