//! Notification email built from a validated submission.

use serde::{Deserialize, Serialize};

use crate::request::ContactRequest;

/// An outgoing message, transport-agnostic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub from: String,
    pub to: String,
    /// Replies go to the person who filled in the form.
    pub reply_to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Escape the five HTML-significant characters.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const FOOTER: &str = "This email was sent from your website contact form.";

/// Compose the notification sent to `mailbox` (both sender and recipient).
pub fn compose_email(request: &ContactRequest, mailbox: &str) -> Email {
    let name = escape_html(&request.name);
    let email = escape_html(&request.email);
    let message = escape_html(&request.message);

    let html = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
  <h2 style="color: #333; border-bottom: 2px solid #007bff; padding-bottom: 10px;">New Contact Form Submission</h2>
  <div style="background-color: #f8f9fa; padding: 20px; border-radius: 5px; margin: 20px 0;">
    <p style="margin: 10px 0;"><strong>Name:</strong> {name}</p>
    <p style="margin: 10px 0;"><strong>Email:</strong> {email}</p>
  </div>
  <div style="margin: 20px 0;">
    <h3 style="color: #333; margin-bottom: 10px;">Message:</h3>
    <p style="margin: 0; line-height: 1.6; white-space: pre-wrap;">{message}</p>
  </div>
  <hr style="border: none; border-top: 1px solid #dee2e6; margin: 30px 0;">
  <p style="font-size: 12px; color: #6c757d; text-align: center;">{FOOTER}</p>
</div>"#
    );

    let text = format!(
        "New Contact Form Submission\n\nName: {}\nEmail: {}\n\nMessage:\n{}\n\n---\n{FOOTER}\n",
        request.name, request.email, request.message
    );

    Email {
        from: mailbox.to_string(),
        to: mailbox.to_string(),
        reply_to: request.email.clone(),
        subject: format!("New Contact Form Submission from {}", request.name),
        text,
        html,
    }
}
