//! Account Mail Templates

use platform::mail::OutgoingMail;

use crate::domain::entity::user::User;

pub fn welcome(user: &User) -> OutgoingMail {
    OutgoingMail {
        to: user.email.as_str().to_string(),
        subject: "Welcome to Cirvee Referrals".to_string(),
        html_body: format!(
            r#"<h2>Welcome, {name}!</h2>
<p>Your referral account is ready.</p>
<p>Your referral code is <strong>{code}</strong>. Share it with prospective students and earn a commission on every registration.</p>"#,
            name = user.name,
            code = user.referral_code,
        ),
    }
}

pub fn password_reset(user: &User, link: &str) -> OutgoingMail {
    OutgoingMail {
        to: user.email.as_str().to_string(),
        subject: "Reset your password".to_string(),
        html_body: format!(
            r#"<h2>Hello {name},</h2>
<p>We received a request to reset your password. The link below expires in one hour.</p>
<p><a href="{link}">Reset password</a></p>
<p>If you did not request this, you can ignore this email.</p>"#,
            name = user.name,
            link = link,
        ),
    }
}
