//! Server-rendered pages. Every renderer maps records to markup for one
//! named container; an empty list renders that container's placeholder.

pub mod admin;
pub mod catalog;
pub mod dashboard;
pub mod format;

use crate::models::Role;
use crate::services::auth_service::Claims;

/// The signed-in user a page is rendered for.
#[derive(Debug, Clone, Copy)]
pub struct Viewer<'a> {
    pub claims: &'a Claims,
    pub role: Role,
}

impl<'a> Viewer<'a> {
    pub fn new(claims: &'a Claims, role: Role) -> Self {
        Self { claims, role }
    }
}

/// HTML-escapes text for element content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Flash messages addressed by the `error` / `notice` query parameters.
pub fn notice_text(code: &str) -> Option<&'static str> {
    match code {
        "access_denied" => Some("Access denied. This area is for administrators only."),
        "account_suspended" => Some("Your account is suspended. Contact an administrator."),
        "signin_failed" => Some("Sign-in failed. Please try again."),
        "course_created" => Some("Course created."),
        "course_updated" => Some("Course updated."),
        "course_deleted" => Some("Course deleted."),
        "course_invalid" => Some("A course needs a title."),
        "role_updated" => Some("Role updated."),
        "status_updated" => Some("Account status updated."),
        "media_deleted" => Some("File deleted."),
        "not_found" => Some("That item no longer exists."),
        "save_failed" => Some("Could not save your changes. Please try again."),
        _ => None,
    }
}

pub fn container(id: &str, class: &str, inner: &str) -> String {
    format!(r#"<div id="{}" class="{}">{}</div>"#, id, class, inner)
}

pub fn placeholder(icon: &str, message: &str) -> String {
    format!(
        r#"<div class="col-span-full text-center py-8 text-gray-500"><i class="fas fa-{} text-3xl mb-2"></i><p>{}</p></div>"#,
        icon, message
    )
}

const SHELL_SCRIPT: &str = r#"<script>
document.addEventListener('click', function (e) {
  var el = e.target.closest('[data-action]');
  if (!el) return;
  if (el.dataset.confirm && !window.confirm(el.dataset.confirm)) {
    e.preventDefault();
    return;
  }
  switch (el.dataset.action) {
    case 'view-course':
      window.location.href = '/course?id=' + encodeURIComponent(el.dataset.id);
      break;
    case 'edit-course':
      window.location.href = '/admin?section=courses&edit=' + encodeURIComponent(el.dataset.id);
      break;
    case 'sign-in':
      e.preventDefault();
      window.open('/auth/google', 'signin', 'width=500,height=640');
      break;
  }
});
</script>"#;

fn nav(viewer: Option<Viewer<'_>>) -> String {
    let account = match viewer {
        Some(Viewer { claims, role }) => {
            let name = claims.name.as_deref().unwrap_or(&claims.email);
            let avatar = claims
                .picture
                .as_deref()
                .map(|src| format!(r#"<img id="userAvatar" src="{}" alt="" class="w-8 h-8 rounded-full">"#, escape(src)))
                .unwrap_or_default();
            let admin_link = if role == Role::Admin {
                r#"<a href="/admin" id="adminLink">Admin</a>"#
            } else {
                ""
            };
            format!(
                r#"<a href="/dashboard" id="dashboardLink">Dashboard</a>
{}
{}<span id="userName">{}</span>
<form method="post" action="/auth/logout" class="inline"><button type="submit">Sign out</button></form>"#,
                admin_link,
                avatar,
                escape(name)
            )
        }
        None => r#"<button type="button" data-action="sign-in" class="btn-primary">Sign in with Google</button>"#.to_string(),
    };

    format!(
        r#"<nav class="flex items-center justify-between px-6 py-4 bg-white shadow"><a href="/" class="font-bold text-xl">Learning Platform</a><div class="flex items-center space-x-4">{}</div></nav>"#,
        account
    )
}

/// Full document around a page body.
pub fn page(title: &str, viewer: Option<Viewer<'_>>, notice: Option<&str>, body: &str) -> String {
    let banner = notice
        .and_then(notice_text)
        .map(|text| format!(r#"<div id="notice" class="bg-yellow-100 text-yellow-900 px-6 py-3">{}</div>"#, text))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{} | Learning Platform</title>
<link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.4.0/css/all.min.css">
<script src="https://cdn.tailwindcss.com"></script>
</head>
<body class="bg-gray-50">
{}
{}
<main class="container mx-auto px-6 py-8">
{}
</main>
{}
</body>
</html>"#,
        escape(title),
        nav(viewer),
        banner,
        body,
        SHELL_SCRIPT
    )
}

/// Served to the sign-in popup: hands control back to the opener and
/// closes itself, or navigates when opened without a popup.
pub fn popup_result(target: &str) -> String {
    let target = escape(target);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Signing in</title></head>
<body>
<p id="popupTarget" data-target="{target}">Returning to the platform...</p>
<script>
var target = document.getElementById('popupTarget').dataset.target;
if (window.opener && !window.opener.closed) {{
  window.opener.location.href = target;
  window.close();
}} else {{
  window.location.href = target;
}}
</script>
</body>
</html>"#,
        target = target
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<img src=x onerror="a('b')">&"#),
            "&lt;img src=x onerror=&quot;a(&#x27;b&#x27;)&quot;&gt;&amp;"
        );
    }

    #[test]
    fn test_unknown_notice_codes_render_nothing() {
        let html = page("Home", None, Some("<script>"), "");
        assert!(!html.contains(r#"id="notice""#));

        let html = page("Home", None, Some("access_denied"), "");
        assert!(html.contains("Access denied"));
        assert!(html.contains(r#"data-action="sign-in""#));
    }

    fn claims() -> Claims {
        Claims {
            sub: "uid-ana".into(),
            email: "ana@example.com".into(),
            name: Some("Ana Lima".into()),
            picture: None,
            iat: 0,
            exp: 0,
            jti: "j".into(),
            aud: "a".into(),
            iss: "i".into(),
        }
    }

    #[test]
    fn test_admin_link_only_for_admins() {
        let claims = claims();
        for role in [Role::Student, Role::Instructor] {
            let html = page("Home", Some(Viewer::new(&claims, role)), None, "");
            assert!(html.contains(r#"id="dashboardLink""#));
            assert!(!html.contains(r#"id="adminLink""#));
        }

        let html = page("Home", Some(Viewer::new(&claims, Role::Admin)), None, "");
        assert!(html.contains(r#"id="adminLink""#));
    }

    #[test]
    fn test_popup_result_escapes_target() {
        let html = popup_result("/?error=signin_failed&x=\"");
        assert!(html.contains(r#"data-target="/?error=signin_failed&amp;x=&quot;""#));
        assert!(html.contains("window.close()"));
    }
}
