//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::{PayoutId, ReferralId};
use kernel::pagination::PageRequest;
use sqlx::PgPool;
use uuid::Uuid;

use auth::domain::{Email, PersonName, Phone, ReferralCode, UserId};

use crate::domain::entity::{
    click::Click,
    payout::{Payout, PayoutRequestOutcome, PayoutStatus},
    referral::{Referral, ReferralRecord, ReferralStatus},
    stats::{PayoutTotals, PlatformStats, ReferrerStats, ReferrerSummary},
};
use crate::domain::repository::{
    ClickRepository, PayoutRepository, ReferralRepository, Transition,
};
use crate::error::{ReferralError, ReferralResult};

/// PostgreSQL-backed referral, payout and click repository
#[derive(Clone)]
pub struct PgReferralRepository {
    pool: PgPool,
}

impl PgReferralRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// ============================================================================
// Referral Repository Implementation
// ============================================================================

impl ReferralRepository for PgReferralRepository {
    async fn create(&self, referral: &Referral) -> ReferralResult<()> {
        sqlx::query(
            r#"
            INSERT INTO referrals (
                id,
                referrer_id,
                referred_name,
                referred_email,
                referred_phone,
                course,
                course_price,
                earnings,
                status,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(referral.id.as_uuid())
        .bind(referral.referrer_id.map(UserId::into_uuid))
        .bind(referral.referred_name.as_str())
        .bind(referral.referred_email.as_str())
        .bind(referral.referred_phone.as_str())
        .bind(&referral.course)
        .bind(referral.course_price)
        .bind(referral.earnings)
        .bind(referral.status.code())
        .bind(referral.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: &ReferralId) -> ReferralResult<Option<Referral>> {
        let row = sqlx::query_as::<_, ReferralRow>(
            r#"
            SELECT
                id, referrer_id, referred_name, referred_email, referred_phone,
                course, course_price, earnings, status, created_at
            FROM referrals
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_entity()).transpose()
    }

    async fn list_by_referrer(
        &self,
        referrer_id: &UserId,
        page: PageRequest,
    ) -> ReferralResult<(Vec<Referral>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM referrals WHERE referrer_id = $1")
            .bind(referrer_id.as_uuid())
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, ReferralRow>(
            r#"
            SELECT
                id, referrer_id, referred_name, referred_email, referred_phone,
                course, course_price, earnings, status, created_at
            FROM referrals
            WHERE referrer_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(referrer_id.as_uuid())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let referrals = rows
            .into_iter()
            .map(ReferralRow::into_entity)
            .collect::<ReferralResult<Vec<_>>>()?;

        Ok((referrals, total))
    }

    async fn list_all(&self, page: PageRequest) -> ReferralResult<(Vec<ReferralRecord>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM referrals")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, ReferralRecordRow>(
            r#"
            SELECT
                r.id, r.referrer_id, r.referred_name, r.referred_email, r.referred_phone,
                r.course, r.course_price, r.earnings, r.status, r.created_at,
                COALESCE(u.name, '-') AS referrer_name
            FROM referrals r
            LEFT JOIN users u ON u.id = r.referrer_id
            ORDER BY r.created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let records = rows
            .into_iter()
            .map(|row| {
                Ok(ReferralRecord {
                    referrer_name: row.referrer_name,
                    referral: row.referral.into_entity()?,
                })
            })
            .collect::<ReferralResult<Vec<_>>>()?;

        Ok((records, total))
    }

    async fn update_status(
        &self,
        id: &ReferralId,
        status: ReferralStatus,
    ) -> ReferralResult<Transition<ReferralStatus>> {
        let result = sqlx::query(
            "UPDATE referrals SET status = $2 WHERE id = $1 AND status = 'pending'",
        )
        .bind(id.as_uuid())
        .bind(status.code())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(Transition::Applied);
        }

        let current: Option<String> = sqlx::query_scalar("SELECT status FROM referrals WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        match current {
            None => Ok(Transition::Missing),
            Some(code) => Ok(Transition::Stale(parse_referral_status(&code)?)),
        }
    }

    async fn mark_all_paid_for_referrer(&self, referrer_id: &UserId) -> ReferralResult<u64> {
        let result = sqlx::query(
            "UPDATE referrals SET status = 'paid' WHERE referrer_id = $1 AND status = 'pending'",
        )
        .bind(referrer_id.as_uuid())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn referrer_stats(&self, referrer_id: &UserId) -> ReferralResult<ReferrerStats> {
        let row = sqlx::query_as::<_, ReferrerStatsRow>(
            r#"
            SELECT
                COUNT(*) AS total_referrals,
                COALESCE(SUM(CASE WHEN status = 'paid' THEN earnings ELSE 0 END), 0)::BIGINT AS paid_earnings,
                COALESCE(SUM(CASE WHEN status = 'pending' THEN earnings ELSE 0 END), 0)::BIGINT AS pending_earnings
            FROM referrals
            WHERE referrer_id = $1
            "#,
        )
        .bind(referrer_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(ReferrerStats {
            total_referrals: row.total_referrals,
            paid_earnings: row.paid_earnings,
            pending_earnings: row.pending_earnings,
        })
    }

    async fn platform_stats(&self, month_start: DateTime<Utc>) -> ReferralResult<PlatformStats> {
        let row = sqlx::query_as::<_, PlatformStatsRow>(
            r#"
            WITH credited AS (
                SELECT r.*
                FROM referrals r
                LEFT JOIN users u ON u.id = r.referrer_id
                WHERE u.role IS NULL OR u.role <> 'admin'
            )
            SELECT
                (SELECT COUNT(*) FROM credited WHERE referrer_id IS NOT NULL) AS total_referrals,
                (SELECT COALESCE(SUM(earnings), 0)::BIGINT FROM credited WHERE status <> 'rejected') AS total_earnings,
                (SELECT COALESCE(SUM(earnings), 0)::BIGINT FROM credited WHERE status = 'pending') AS pending_earnings,
                (SELECT COALESCE(SUM(earnings), 0)::BIGINT FROM credited WHERE status = 'paid') AS paid_earnings,
                (SELECT COUNT(*) FROM credited WHERE status = 'paid') AS paid_count,
                (SELECT COUNT(*) FROM users WHERE role <> 'admin') AS total_codes,
                (SELECT COUNT(DISTINCT referrer_id) FROM credited WHERE referrer_id IS NOT NULL) AS active_codes,
                (SELECT COUNT(*) FROM referrals) AS total_students,
                (SELECT COUNT(DISTINCT course) FROM referrals) AS total_unique_courses,
                (SELECT COALESCE(SUM(course_price), 0)::BIGINT FROM referrals WHERE created_at >= $1) AS monthly_revenue
            "#,
        )
        .bind(month_start)
        .fetch_one(&self.pool)
        .await?;

        Ok(PlatformStats {
            total_referrals: row.total_referrals,
            total_earnings: row.total_earnings,
            pending_earnings: row.pending_earnings,
            paid_earnings: row.paid_earnings,
            paid_count: row.paid_count,
            total_codes: row.total_codes,
            active_codes: row.active_codes,
            total_students: row.total_students,
            total_unique_courses: row.total_unique_courses,
            monthly_revenue: row.monthly_revenue,
        })
    }

    async fn referrer_summaries(
        &self,
        page: PageRequest,
    ) -> ReferralResult<(Vec<ReferrerSummary>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role <> 'admin'")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, ReferrerSummaryRow>(
            r#"
            SELECT
                u.id AS referrer_id,
                u.name AS referrer_name,
                u.referral_code,
                COUNT(r.id) AS total_usage,
                COALESCE(SUM(CASE WHEN r.status <> 'rejected' THEN r.earnings ELSE 0 END), 0)::BIGINT AS total_earnings,
                u.is_blocked
            FROM users u
            LEFT JOIN referrals r ON r.referrer_id = u.id
            WHERE u.role <> 'admin'
            GROUP BY u.id
            ORDER BY total_earnings DESC, total_usage DESC, u.created_at ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let summaries = rows
            .into_iter()
            .map(|row| ReferrerSummary {
                referrer_id: UserId::from_uuid(row.referrer_id),
                referrer_name: row.referrer_name,
                referral_code: row.referral_code,
                total_usage: row.total_usage,
                total_earnings: row.total_earnings,
                is_blocked: row.is_blocked,
            })
            .collect();

        Ok((summaries, total))
    }
}

// ============================================================================
// Payout Repository Implementation
// ============================================================================

impl PayoutRepository for PgReferralRepository {
    async fn request(&self, payout: &Payout) -> ReferralResult<PayoutRequestOutcome> {
        let mut tx = self.pool.begin().await?;

        // Serializes concurrent requests by the same user
        let locked: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(payout.user_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await?;

        if locked.is_none() {
            return Ok(PayoutRequestOutcome::Insufficient { available: 0 });
        }

        let available: i64 = sqlx::query_scalar(
            r#"
            SELECT (
                COALESCE((SELECT SUM(earnings) FROM referrals WHERE referrer_id = $1 AND status = 'pending'), 0)
                - COALESCE((SELECT SUM(amount) FROM payouts WHERE user_id = $1 AND status IN ('pending', 'approved')), 0)
            )::BIGINT
            "#,
        )
        .bind(payout.user_id.as_uuid())
        .fetch_one(&mut *tx)
        .await?;

        if payout.amount > available {
            return Ok(PayoutRequestOutcome::Insufficient {
                available: available.max(0),
            });
        }

        sqlx::query(
            r#"
            INSERT INTO payouts (id, user_id, amount, status, approved_by, created_at, paid_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(payout.id.as_uuid())
        .bind(payout.user_id.as_uuid())
        .bind(payout.amount)
        .bind(payout.status.code())
        .bind(payout.approved_by.map(UserId::into_uuid))
        .bind(payout.created_at)
        .bind(payout.paid_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(PayoutRequestOutcome::Created)
    }

    async fn find_payout(&self, id: &PayoutId) -> ReferralResult<Option<Payout>> {
        let row = sqlx::query_as::<_, PayoutRow>(
            r#"
            SELECT id, user_id, amount, status, approved_by, created_at, paid_at
            FROM payouts
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_entity()).transpose()
    }

    async fn list_by_user(
        &self,
        user_id: &UserId,
        page: PageRequest,
    ) -> ReferralResult<(Vec<Payout>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payouts WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, PayoutRow>(
            r#"
            SELECT id, user_id, amount, status, approved_by, created_at, paid_at
            FROM payouts
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let payouts = rows
            .into_iter()
            .map(PayoutRow::into_entity)
            .collect::<ReferralResult<Vec<_>>>()?;

        Ok((payouts, total))
    }

    async fn list_payouts(
        &self,
        status: Option<PayoutStatus>,
        page: PageRequest,
    ) -> ReferralResult<(Vec<Payout>, i64)> {
        let status = status.map(|s| s.code());

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM payouts WHERE ($1::TEXT IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, PayoutRow>(
            r#"
            SELECT id, user_id, amount, status, approved_by, created_at, paid_at
            FROM payouts
            WHERE ($1::TEXT IS NULL OR status = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(status)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let payouts = rows
            .into_iter()
            .map(PayoutRow::into_entity)
            .collect::<ReferralResult<Vec<_>>>()?;

        Ok((payouts, total))
    }

    async fn decide(
        &self,
        id: &PayoutId,
        decision: PayoutStatus,
        admin_id: &UserId,
        now: DateTime<Utc>,
    ) -> ReferralResult<Transition<PayoutStatus>> {
        let paid_at = (decision == PayoutStatus::Approved).then_some(now);

        let result = sqlx::query(
            r#"
            UPDATE payouts
            SET status = $2, approved_by = $3, paid_at = $4
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id.as_uuid())
        .bind(decision.code())
        .bind(admin_id.as_uuid())
        .bind(paid_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(Transition::Applied);
        }

        let current: Option<String> = sqlx::query_scalar("SELECT status FROM payouts WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        match current {
            None => Ok(Transition::Missing),
            Some(code) => Ok(Transition::Stale(parse_payout_status(&code)?)),
        }
    }

    async fn committed_total_for_user(&self, user_id: &UserId) -> ReferralResult<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0)::BIGINT FROM payouts WHERE user_id = $1 AND status IN ('pending', 'approved')",
        )
        .bind(user_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    async fn totals(&self) -> ReferralResult<PayoutTotals> {
        let row = sqlx::query_as::<_, PayoutTotalsRow>(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN status = 'approved' THEN amount ELSE 0 END), 0)::BIGINT AS approved,
                COALESCE(SUM(CASE WHEN status = 'pending' THEN amount ELSE 0 END), 0)::BIGINT AS pending
            FROM payouts
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(PayoutTotals {
            approved: row.approved,
            pending: row.pending,
        })
    }
}

// ============================================================================
// Click Repository Implementation
// ============================================================================

impl ClickRepository for PgReferralRepository {
    async fn record(&self, click: &Click) -> ReferralResult<()> {
        sqlx::query(
            r#"
            INSERT INTO referral_clicks (id, referral_code, user_id, ip_address, user_agent, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(click.id)
        .bind(click.referral_code.as_str())
        .bind(click.user_id.map(UserId::into_uuid))
        .bind(&click.ip_address)
        .bind(click.user_agent.as_deref())
        .bind(click.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn count_for_user(&self, user_id: &UserId) -> ReferralResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM referral_clicks c
            JOIN users u ON u.referral_code = c.referral_code
            WHERE u.id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn count_for_code(&self, code: &ReferralCode) -> ReferralResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM referral_clicks WHERE referral_code = $1")
            .bind(code.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// ============================================================================
// Database Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct ReferralRow {
    id: Uuid,
    referrer_id: Option<Uuid>,
    referred_name: String,
    referred_email: String,
    referred_phone: String,
    course: String,
    course_price: i64,
    earnings: i64,
    status: String,
    created_at: DateTime<Utc>,
}

impl ReferralRow {
    fn into_entity(self) -> ReferralResult<Referral> {
        Ok(Referral {
            id: ReferralId::from_uuid(self.id),
            referrer_id: self.referrer_id.map(UserId::from_uuid),
            referred_name: PersonName::from_db(self.referred_name),
            referred_email: Email::from_db(self.referred_email),
            referred_phone: Phone::from_db(self.referred_phone),
            course: self.course,
            course_price: self.course_price,
            earnings: self.earnings,
            status: parse_referral_status(&self.status)?,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ReferralRecordRow {
    #[sqlx(flatten)]
    referral: ReferralRow,
    referrer_name: String,
}

#[derive(sqlx::FromRow)]
struct ReferrerStatsRow {
    total_referrals: i64,
    paid_earnings: i64,
    pending_earnings: i64,
}

#[derive(sqlx::FromRow)]
struct PlatformStatsRow {
    total_referrals: i64,
    total_earnings: i64,
    pending_earnings: i64,
    paid_earnings: i64,
    paid_count: i64,
    total_codes: i64,
    active_codes: i64,
    total_students: i64,
    total_unique_courses: i64,
    monthly_revenue: i64,
}

#[derive(sqlx::FromRow)]
struct ReferrerSummaryRow {
    referrer_id: Uuid,
    referrer_name: String,
    referral_code: String,
    total_usage: i64,
    total_earnings: i64,
    is_blocked: bool,
}

#[derive(sqlx::FromRow)]
struct PayoutRow {
    id: Uuid,
    user_id: Uuid,
    amount: i64,
    status: String,
    approved_by: Option<Uuid>,
    created_at: DateTime<Utc>,
    paid_at: Option<DateTime<Utc>>,
}

impl PayoutRow {
    fn into_entity(self) -> ReferralResult<Payout> {
        Ok(Payout {
            id: PayoutId::from_uuid(self.id),
            user_id: UserId::from_uuid(self.user_id),
            amount: self.amount,
            status: parse_payout_status(&self.status)?,
            approved_by: self.approved_by.map(UserId::from_uuid),
            created_at: self.created_at,
            paid_at: self.paid_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PayoutTotalsRow {
    approved: i64,
    pending: i64,
}

fn parse_referral_status(code: &str) -> ReferralResult<ReferralStatus> {
    ReferralStatus::from_code(code)
        .ok_or_else(|| ReferralError::Internal(format!("unknown referral status `{}`", code)))
}

fn parse_payout_status(code: &str) -> ReferralResult<PayoutStatus> {
    PayoutStatus::from_code(code)
        .ok_or_else(|| ReferralError::Internal(format!("unknown payout status `{}`", code)))
}
