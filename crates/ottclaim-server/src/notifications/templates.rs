//! Customer-facing message templates.

/// Subject and HTML body of an email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContent {
    pub subject: String,
    pub html: String,
}

/// Escape text for interpolation into HTML.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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

fn wrap(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
</head>
<body style="margin:0;padding:0;background:#f4f5f7;font-family:Arial,Helvetica,sans-serif;color:#1f2933;">
<table role="presentation" width="100%" cellpadding="0" cellspacing="0">
  <tr><td align="center" style="padding:32px 16px;">
    <table role="presentation" width="560" cellpadding="0" cellspacing="0" style="background:#ffffff;border-radius:8px;">
      <tr><td style="padding:24px 32px;background:#4b2bd6;border-radius:8px 8px 0 0;color:#ffffff;font-size:20px;font-weight:bold;">{title}</td></tr>
      <tr><td style="padding:24px 32px;font-size:15px;line-height:1.6;">{body}</td></tr>
    </table>
  </td></tr>
</table>
</body>
</html>"#
    )
}

/// Email sent when a code has been assigned.
pub fn delivered_email(name: &str, platform: &str, ott_code: &str, claim_id: &str) -> EmailContent {
    let subject = format!("Your {} activation code", platform_for_subject(platform));
    let name = escape_html(name);
    let platform = escape_html(platform);
    let code = escape_html(ott_code);
    let claim_id = escape_html(claim_id);

    let body = format!(
        r#"<p>Hi {name},</p>
<p>Your claim <strong>{claim_id}</strong> has been approved. Here is your <strong>{platform}</strong> activation code:</p>
<p style="font-size:22px;font-weight:bold;letter-spacing:2px;background:#f0edff;padding:12px 16px;border-radius:6px;text-align:center;">{code}</p>
<p>Redeem it on the {platform} website or app. The code can be used once.</p>
<p>Thank you for your purchase.</p>"#
    );

    EmailContent {
        subject,
        html: wrap("Your OTT subscription is ready", &body),
    }
}

/// Email sent when a claim could not be fulfilled.
pub fn failed_email(name: &str, reason: &str, claim_id: &str) -> EmailContent {
    let subject = format!("Update on your OTT claim {claim_id}");
    let name = escape_html(name);
    let reason = escape_html(reason);
    let claim_id = escape_html(claim_id);

    let body = format!(
        r#"<p>Hi {name},</p>
<p>We could not complete your claim <strong>{claim_id}</strong>.</p>
<p><strong>Reason:</strong> {reason}</p>
<p>Reply to this email with your claim ID and purchase invoice and our support team will look into it.</p>"#
    );

    EmailContent {
        subject,
        html: wrap("We could not complete your claim", &body),
    }
}

fn platform_for_subject(platform: &str) -> &str {
    if platform.is_empty() { "OTT" } else { platform }
}

/// Body parameters for the WhatsApp "code delivered" template:
/// `{{1}}` name, `{{2}}` platform, `{{3}}` code.
pub fn delivered_whatsapp_params(name: &str, platform: &str, ott_code: &str) -> Vec<String> {
    vec![name.to_string(), platform.to_string(), ott_code.to_string()]
}

/// Body parameters for the WhatsApp "claim failed" template:
/// `{{1}}` name, `{{2}}` claim id, `{{3}}` reason.
pub fn failed_whatsapp_params(name: &str, claim_id: &str, reason: &str) -> Vec<String> {
    vec![name.to_string(), claim_id.to_string(), reason.to_string()]
}
