//! Student Registration Mail Templates

use platform::mail::OutgoingMail;

use auth::domain::User;

use crate::domain::entity::referral::Referral;

/// Shown to the admin when a student signed up without a valid code
pub const DIRECT_SIGNUP: &str = "Direct Sign-up";

pub fn student_confirmation(referral: &Referral) -> OutgoingMail {
    OutgoingMail {
        to: referral.referred_email.as_str().to_string(),
        subject: "Registration Confirmed - Cirvee".to_string(),
        html_body: format!(
            r#"<h2>Hi {name},</h2>
<p>Thank you for registering for <strong>{course}</strong> at Cirvee.</p>
<p>Our team will be in touch with you shortly with the next steps and payment details.</p>"#,
            name = referral.referred_name,
            course = referral.course,
        ),
    }
}

pub fn referrer_notification(referrer: &User, referral: &Referral, frontend_url: &str) -> OutgoingMail {
    OutgoingMail {
        to: referrer.email.as_str().to_string(),
        subject: "New Referral - You Earned a Commission!".to_string(),
        html_body: format!(
            r#"<h2>Congratulations {name}!</h2>
<p>Someone just used your referral code to register.</p>
<p><strong>Student:</strong> {student}<br><strong>Course:</strong> {course}</p>
<p>You earned <strong>&#8358;{earnings}</strong></p>
<p><a href="{frontend_url}/dashboard">View Dashboard</a></p>"#,
            name = referrer.name,
            student = referral.referred_name,
            course = referral.course,
            earnings = referral.earnings,
            frontend_url = frontend_url,
        ),
    }
}

/// `referrer_name` is `None` for direct sign-ups
pub fn admin_alert(
    admin_email: &str,
    referral: &Referral,
    referrer_name: Option<&str>,
    frontend_url: &str,
) -> OutgoingMail {
    OutgoingMail {
        to: admin_email.to_string(),
        subject: "New Student Registration - Cirvee Admin".to_string(),
        html_body: format!(
            r#"<h2>New Student Registration</h2>
<table>
<tr><td>Name</td><td>{name}</td></tr>
<tr><td>Email</td><td>{email}</td></tr>
<tr><td>Course</td><td>{course}</td></tr>
<tr><td>Referred By</td><td>{referrer}</td></tr>
</table>
<p><a href="{frontend_url}/admin/students">View in Admin Panel</a></p>"#,
            name = referral.referred_name,
            email = referral.referred_email,
            course = referral.course,
            referrer = referrer_name.unwrap_or(DIRECT_SIGNUP),
            frontend_url = frontend_url,
        ),
    }
}
