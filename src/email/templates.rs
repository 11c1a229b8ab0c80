/// Account mail bodies.
use super::{EmailResult, Mailer};

/// Send an email verification email
pub async fn send_verification_email(
    mailer: &Mailer,
    to: &str,
    username: &str,
    verification_link: &str,
    ttl_hours: i64,
) -> EmailResult<()> {
    let site = mailer.site_name();

    let body_text = format!(
        r#"Hello {username},

Thank you for signing up for {site}!

Please verify your email address by clicking the link below:
{verification_link}

This link will expire in {ttl_hours} hours.

---
{site}
"#
    );

    let body_html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Email Verification</title>
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <h2>Welcome to {site}!</h2>
        <p>Hello <strong>{username}</strong>,</p>
        <p>Please verify your email address to start watching.</p>
        <p style="margin: 30px 0;">
            <a href="{verification_link}"
               style="background-color: #e50914; color: white; padding: 12px 24px;
                      text-decoration: none; border-radius: 4px; display: inline-block;">
                Verify Email Address
            </a>
        </p>
        <p>Or copy and paste this link into your browser:</p>
        <p style="word-break: break-all; color: #e50914;">{verification_link}</p>
        <p><strong>This link will expire in {ttl_hours} hours.</strong></p>
        <hr style="margin: 30px 0; border: none; border-top: 1px solid #ddd;">
        <p style="color: #666; font-size: 0.9em;">
            If you did not create an account, please ignore this email.
        </p>
    </div>
</body>
</html>"#
    );

    mailer
        .send(to, "Verify Your Email Address", &body_text, Some(&body_html))
        .await
}

/// Send a password reset email
pub async fn send_password_reset_email(
    mailer: &Mailer,
    to: &str,
    username: &str,
    reset_link: &str,
    ttl_minutes: i64,
) -> EmailResult<()> {
    let site = mailer.site_name();

    let body_text = format!(
        r#"Hello {username},

You have requested to reset your {site} password.

Click the link below to choose a new password:
{reset_link}

This link will expire in {ttl_minutes} minutes.

If you did not request a password reset, please ignore this email.

---
{site}
"#
    );

    let body_html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Password Reset</title>
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <h2>Password Reset Request</h2>
        <p>Hello <strong>{username}</strong>,</p>
        <p>You have requested to reset your password.</p>
        <p style="margin: 30px 0;">
            <a href="{reset_link}"
               style="background-color: #e50914; color: white; padding: 12px 24px;
                      text-decoration: none; border-radius: 4px; display: inline-block;">
                Reset Password
            </a>
        </p>
        <p>Or copy and paste this link into your browser:</p>
        <p style="word-break: break-all; color: #e50914;">{reset_link}</p>
        <p><strong>This link will expire in {ttl_minutes} minutes.</strong></p>
        <hr style="margin: 30px 0; border: none; border-top: 1px solid #ddd;">
        <p style="color: #666; font-size: 0.9em;">
            If you did not request a password reset, please ignore this email.
        </p>
    </div>
</body>
</html>"#
    );

    mailer
        .send(to, "Password Reset Request", &body_text, Some(&body_html))
        .await
}
