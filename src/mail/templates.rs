use super::Email;

/// Minimal HTML escaping for user-supplied text placed in markup.
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

pub fn verification(to: &str, username: &str, link: &str) -> Email {
    let safe_name = escape_html(username);
    Email {
        to: to.to_string(),
        subject: "Verify account".into(),
        text: format!("Hello, {username}. Please verify your account: {link}"),
        html: format!(
            r#"<div>
    <h1>Hello, {safe_name}</h1>
    <p>Please click the following link to verify your account</p>
    <a href="{link}">Verify Now</a>
</div>"#
        ),
    }
}

pub fn password_reset(to: &str, username: &str, link: &str) -> Email {
    let safe_name = escape_html(username);
    Email {
        to: to.to_string(),
        subject: "Reset password".into(),
        text: format!(
            "Hello, {username}. A password reset was requested for your account. \
             Open this link to choose a new password: {link}. \
             If you did not request it, ignore this email."
        ),
        html: format!(
            r#"<div>
    <h1>Hello, {safe_name}</h1>
    <p>A password reset was requested for your account.</p>
    <p>If you did not request it, you can ignore this email.</p>
    <a href="{link}">Reset Password</a>
</div>"#
        ),
    }
}

pub fn password_changed(to: &str, username: &str) -> Email {
    let safe_name = escape_html(username);
    Email {
        to: to.to_string(),
        subject: "Password changed".into(),
        text: format!("Hello, {username}. Your password was changed successfully."),
        html: format!(
            r#"<div>
    <h1>Hello, {safe_name}</h1>
    <p>Your password was changed successfully.</p>
    <p>If you did not do this, reset your password immediately.</p>
</div>"#
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_mail_carries_link() {
        let link = "https://example.com/users/verify-now/abc";
        let mail = verification("a@x.com", "alice", link);
        assert_eq!(mail.to, "a@x.com");
        assert!(mail.html.contains(r#"href="https://example.com/users/verify-now/abc""#));
        assert!(mail.text.contains(link));
    }

    #[test]
    fn username_is_escaped_in_html() {
        let mail = password_changed("a@x.com", "<b>eve</b>");
        assert!(mail.html.contains("&lt;b&gt;eve&lt;/b&gt;"));
        assert!(mail.text.contains("<b>eve</b>"));
    }

    #[test]
    fn reset_mail_carries_link() {
        let mail = password_reset("a@x.com", "alice", "https://e.com/users/reset-password-now/t");
        assert!(mail.html.contains("reset-password-now/t"));
    }
}
