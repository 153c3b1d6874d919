use html_escape::{encode_double_quoted_attribute, encode_text};
use tracing::instrument;
use url::Url;

use crate::metrics::track_email_queued;
use crate::utils::mailer::{EmailDispatcher, OutgoingEmail};

/// Composes account emails and hands them to the [`EmailDispatcher`].
///
/// Nothing here waits on delivery; see [`crate::utils::mailer`].
#[derive(Clone, Debug)]
pub struct EmailService {
    dispatcher: EmailDispatcher,
    base_url: String,
}

impl EmailService {
    pub fn new(dispatcher: EmailDispatcher, base_url: impl Into<String>) -> Self {
        Self {
            dispatcher,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn verification_link(&self, token: &str) -> String {
        let mut url = format!("{}/user/email-verify", self.base_url);
        url.push_str("?token=");
        url.push_str(token);
        url
    }

    pub fn password_reset_link(&self, uidb64: &str, token: &str, redirect_url: &str) -> String {
        let path = format!("{}/user/password-reset/{}/{}", self.base_url, uidb64, token);
        match Url::parse_with_params(&path, &[("redirect_url", redirect_url)]) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}?redirect_url={}", path, redirect_url),
        }
    }

    #[instrument(skip(self, token))]
    pub fn send_verification_email(&self, to_email: &str, to_name: &str, token: &str) {
        let link = self.verification_link(token);
        let name = display_name(to_name, to_email);

        let html_body = verification_template(name, &link);
        let text_body = format!(
            "Hi {},\n\n\
             Use the link below to verify your email:\n\
             {}\n\n\
             Best regards,\n\
             SocialAuth Team",
            name, link
        );

        self.queue(to_email, "Verify your email", text_body, html_body, "verification");
    }

    #[instrument(skip(self, token))]
    pub fn send_password_reset_email(
        &self,
        to_email: &str,
        to_name: &str,
        uidb64: &str,
        token: &str,
        redirect_url: &str,
    ) {
        let link = self.password_reset_link(uidb64, token, redirect_url);
        let name = display_name(to_name, to_email);

        let html_body = password_reset_template(name, &link);
        let text_body = format!(
            "Hi {},\n\n\
             You requested to reset your password.\n\n\
             Use the link below to reset your password:\n\
             {}\n\n\
             If you didn't request this, please ignore this email.\n\n\
             Best regards,\n\
             SocialAuth Team",
            name, link
        );

        self.queue(to_email, "Reset your password", text_body, html_body, "password_reset");
    }

    #[instrument(skip(self))]
    pub fn send_password_changed_notice(&self, to_email: &str, to_name: &str) {
        let name = display_name(to_name, to_email);

        let html_body = password_changed_template(name);
        let text_body = format!(
            "Hi {},\n\n\
             Your password has been changed.\n\n\
             If you didn't make this change, please contact support immediately.\n\n\
             Best regards,\n\
             SocialAuth Team",
            name
        );

        self.queue(to_email, "Your password was changed", text_body, html_body, "password_changed");
    }

    fn queue(
        &self,
        to_email: &str,
        subject: &str,
        text_body: String,
        html_body: String,
        kind: &'static str,
    ) {
        self.dispatcher.enqueue(OutgoingEmail {
            to: to_email.to_string(),
            subject: subject.to_string(),
            text_body,
            html_body,
        });
        track_email_queued(kind);
    }
}

fn display_name<'a>(name: &'a str, email: &'a str) -> &'a str {
    if name.trim().is_empty() { email } else { name }
}

fn layout(accent: &str, title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
</head>
<body style="margin: 0; padding: 0; font-family: Arial, sans-serif; background-color: #f4f4f4;">
    <table width="100%" cellpadding="0" cellspacing="0" style="background-color: #f4f4f4; padding: 20px;">
        <tr>
            <td align="center">
                <table width="600" cellpadding="0" cellspacing="0" style="background-color: #ffffff; border-radius: 8px; overflow: hidden;">
                    <tr>
                        <td style="background-color: {accent}; padding: 30px; text-align: center;">
                            <h1 style="margin: 0; color: #ffffff; font-size: 28px;">SocialAuth</h1>
                        </td>
                    </tr>
                    <tr>
                        <td style="padding: 40px 30px;">
                            <h2 style="margin: 0 0 20px 0; color: #333333; font-size: 24px;">{title}</h2>
{content}
                        </td>
                    </tr>
                    <tr>
                        <td style="background-color: #f8f9fa; padding: 20px 30px; text-align: center; border-top: 1px solid #e9ecef;">
                            <p style="margin: 0; color: #999999; font-size: 12px;">
                                This is an automated email from SocialAuth. Please do not reply.
                            </p>
                        </td>
                    </tr>
                </table>
            </td>
        </tr>
    </table>
</body>
</html>"#
    )
}

fn button(accent: &str, link: &str, label: &str) -> String {
    let href = encode_double_quoted_attribute(link);
    let shown = encode_text(link);
    format!(
        r#"                            <p style="margin: 30px 0; text-align: center;">
                                <a href="{href}" style="display: inline-block; padding: 14px 40px; background-color: {accent}; color: #ffffff; text-decoration: none; border-radius: 6px; font-size: 16px; font-weight: bold;">{label}</a>
                            </p>
                            <p style="margin: 0 0 20px 0; color: {accent}; font-size: 14px; word-break: break-all;">{shown}</p>"#
    )
}

fn paragraph(text: &str) -> String {
    format!(
        r#"                            <p style="margin: 0 0 20px 0; color: #666666; font-size: 16px; line-height: 1.5;">{text}</p>"#
    )
}

fn verification_template(name: &str, link: &str) -> String {
    let accent = "#4F46E5";
    let content = [
        paragraph(&format!("Hi <strong>{}</strong>,", encode_text(name))),
        paragraph("Use the button below to verify your email address."),
        button(accent, link, "Verify Email"),
    ]
    .join("\n");
    layout(accent, "Verify your email", &content)
}

fn password_reset_template(name: &str, link: &str) -> String {
    let accent = "#4F46E5";
    let content = [
        paragraph(&format!("Hi <strong>{}</strong>,", encode_text(name))),
        paragraph("We received a request to reset your password. Use the button below to choose a new one."),
        button(accent, link, "Reset Password"),
        paragraph("If you didn't request this password reset, please ignore this email."),
    ]
    .join("\n");
    layout(accent, "Reset your password", &content)
}

fn password_changed_template(name: &str) -> String {
    let content = [
        paragraph(&format!("Hi <strong>{}</strong>,", encode_text(name))),
        paragraph("Your password has been changed."),
        paragraph("<strong>Security Notice:</strong> If you didn't make this change, please contact support immediately."),
    ]
    .join("\n");
    layout("#10B981", "Password changed", &content)
}
