//! Register Student Use Case
//!
//! Every registration creates exactly one referral row. A missing, unknown
//! or blocked referral code degrades to a direct sign-up instead of failing.

use std::sync::Arc;

use platform::kv::KvStore;
use platform::mail::Mailer;

use auth::domain::{Email, PersonName, Phone, ReferralCode, User, UserRepository};

use crate::application::config::ReferralConfig;
use crate::application::dashboard::StatsCache;
use crate::application::notify;
use crate::domain::entity::referral::{NewStudent, Referral};
use crate::domain::repository::ReferralRepository;
use crate::error::{ReferralError, ReferralResult};

/// Input for student registration
#[derive(Debug, Clone, Default)]
pub struct RegisterStudentInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub course: String,
    pub referral_code: Option<String>,
}

/// Output of student registration
#[derive(Debug, Clone)]
pub struct RegisterStudentOutput {
    pub referral: Referral,
    /// Credited referrer, `None` for direct sign-ups
    pub referrer: Option<User>,
}

pub struct RegisterStudentUseCase<R, U, K> {
    repo: Arc<R>,
    users: Arc<U>,
    cache: StatsCache<K>,
    mailer: Mailer,
    config: Arc<ReferralConfig>,
}

impl<R, U, K> RegisterStudentUseCase<R, U, K>
where
    R: ReferralRepository,
    U: UserRepository,
    K: KvStore + Clone + Send + Sync + 'static,
{
    pub fn new(
        repo: Arc<R>,
        users: Arc<U>,
        cache: StatsCache<K>,
        mailer: Mailer,
        config: Arc<ReferralConfig>,
    ) -> Self {
        Self {
            repo,
            users,
            cache,
            mailer,
            config,
        }
    }

    pub async fn execute(&self, input: RegisterStudentInput) -> ReferralResult<RegisterStudentOutput> {
        let student = validate(input.name, input.email, input.phone, input.course)?;

        let referrer = match input.referral_code.as_deref() {
            Some(raw) => self.resolve_referrer(raw).await?,
            None => None,
        };

        let (price, earnings) = self.config.price_and_earnings(&student.course);
        let referral = Referral::new(
            student,
            referrer.as_ref().map(|user| user.user_id),
            price,
            earnings,
        );

        self.repo.create(&referral).await?;
        self.cache.invalidate().await;

        self.notify(&referral, referrer.as_ref());

        tracing::info!(
            referral_id = %referral.id,
            referrer_id = ?referral.referrer_id,
            course = %referral.course,
            earnings = referral.earnings,
            "Student registered"
        );

        Ok(RegisterStudentOutput { referral, referrer })
    }

    async fn resolve_referrer(&self, raw: &str) -> ReferralResult<Option<User>> {
        let Some(code) = ReferralCode::parse(raw) else {
            return Ok(None);
        };

        match self.users.find_by_referral_code(&code).await? {
            Some(user) if user.is_blocked => {
                tracing::info!(referral_code = %code, "Referral code belongs to a blocked user, treating as direct sign-up");
                Ok(None)
            }
            Some(user) => Ok(Some(user)),
            None => {
                tracing::debug!(referral_code = %code, "Unknown referral code, treating as direct sign-up");
                Ok(None)
            }
        }
    }

    fn notify(&self, referral: &Referral, referrer: Option<&User>) {
        let frontend_url = &self.config.frontend_url;

        self.mailer.dispatch(notify::student_confirmation(referral));

        if let Some(referrer) = referrer {
            self.mailer
                .dispatch(notify::referrer_notification(referrer, referral, frontend_url));
        }

        self.mailer.dispatch(notify::admin_alert(
            &self.config.admin_email,
            referral,
            referrer.map(|user| user.name.as_str()),
            frontend_url,
        ));
    }
}

fn validate(name: String, email: String, phone: String, course: String) -> ReferralResult<NewStudent> {
    let name = PersonName::new(&name)?;
    let email = Email::new(email)?;
    let phone = Phone::new(&phone)?;

    let course = course.trim().to_string();
    if course.is_empty() {
        return Err(ReferralError::Validation("course is required".to_string()));
    }

    Ok(NewStudent {
        name,
        email,
        phone,
        course,
    })
}
