use super::format::{activity_icon, file_icon, format_date, format_file_size, price_label, role_label, time_ago};
use super::{container, escape, page, placeholder, Viewer};
use crate::models::{Activity, Course, MediaAsset, Role, User};
use crate::services::admin_service::AdminStats;
use crate::services::auth_service::Claims;
use crate::services::upload_service::UploadState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminSection {
    Dashboard,
    Courses,
    Users,
    Content,
}

impl AdminSection {
    pub const ALL: [AdminSection; 4] = [
        AdminSection::Dashboard,
        AdminSection::Courses,
        AdminSection::Users,
        AdminSection::Content,
    ];

    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("courses") => AdminSection::Courses,
            Some("users") => AdminSection::Users,
            Some("content") => AdminSection::Content,
            _ => AdminSection::Dashboard,
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            AdminSection::Dashboard => "dashboard",
            AdminSection::Courses => "courses",
            AdminSection::Users => "users",
            AdminSection::Content => "content",
        }
    }

    fn label(self) -> &'static str {
        match self {
            AdminSection::Dashboard => "Dashboard",
            AdminSection::Courses => "Courses",
            AdminSection::Users => "Users",
            AdminSection::Content => "Content",
        }
    }
}

/// Data for the section being shown.
#[derive(Debug, Clone)]
pub enum AdminPanel {
    Dashboard {
        stats: AdminStats,
        activity: Vec<Activity>,
        now: i64,
    },
    Courses {
        courses: Vec<Course>,
        editing: Option<Course>,
    },
    Users {
        users: Vec<User>,
    },
    Content {
        media: Vec<MediaAsset>,
        upload: UploadState,
    },
}

impl AdminPanel {
    pub fn section(&self) -> AdminSection {
        match self {
            AdminPanel::Dashboard { .. } => AdminSection::Dashboard,
            AdminPanel::Courses { .. } => AdminSection::Courses,
            AdminPanel::Users { .. } => AdminSection::Users,
            AdminPanel::Content { .. } => AdminSection::Content,
        }
    }
}

fn empty_row(message: &str) -> String {
    format!(
        r#"<tr><td colspan="5" class="px-6 py-4 text-center text-gray-500">{}</td></tr>"#,
        message
    )
}

pub fn no_courses_row() -> String {
    empty_row("No courses found")
}

pub fn no_users_row() -> String {
    empty_row("No users found")
}

pub fn no_activity() -> String {
    placeholder("history", "No recent activity")
}

pub fn no_media() -> String {
    placeholder("folder-open", "No files found")
}

fn delete_button(action: &str, route: &str, id: &str, confirm: &str) -> String {
    format!(
        r#"<form method="post" action="{route}" class="inline"><button type="submit" data-action="{action}" data-id="{id}" data-confirm="{confirm}" class="text-red-600 hover:text-red-900"><i class="fas fa-trash"></i></button></form>"#,
        route = route,
        action = action,
        id = id,
        confirm = confirm
    )
}

pub fn render_stats(stats: &AdminStats) -> String {
    let cards = [
        ("totalUsers", "Users", stats.total_users.to_string()),
        ("totalCourses", "Courses", stats.total_courses.to_string()),
        ("totalEnrollments", "Enrollments", stats.total_enrollments.to_string()),
        ("totalRevenue", "Revenue", price_label(stats.total_revenue)),
    ];
    cards
        .iter()
        .map(|(id, label, value)| {
            format!(
                r#"<div class="card"><p class="text-sm text-gray-500">{}</p><p id="{}" class="text-3xl font-bold">{}</p></div>"#,
                label, id, value
            )
        })
        .collect()
}

pub fn render_activity(activity: &[Activity], now: i64) -> String {
    if activity.is_empty() {
        return no_activity();
    }

    activity
        .iter()
        .map(|entry| {
            format!(
                r#"<div class="flex items-center space-x-3 py-2"><i class="fas fa-{} text-primary-500"></i><div><p class="text-sm text-gray-900">{}</p><p class="text-xs text-gray-500">{}</p></div></div>"#,
                activity_icon(&entry.kind),
                escape(&entry.message),
                time_ago(entry.created_at, now)
            )
        })
        .collect()
}

pub fn render_courses_table(courses: &[Course]) -> String {
    if courses.is_empty() {
        return no_courses_row();
    }

    courses
        .iter()
        .map(|course| {
            let id = escape(&course.id);
            let (status, classes) = if course.published {
                ("Published", "bg-green-100 text-green-800")
            } else {
                ("Draft", "bg-yellow-100 text-yellow-800")
            };
            format!(
                r#"<tr>
<td class="px-6 py-4"><div class="text-sm font-medium text-gray-900">{title}</div><div class="text-sm text-gray-500">{category}</div></td>
<td class="px-6 py-4 text-sm">{instructor}</td>
<td class="px-6 py-4"><span class="px-2 text-xs font-semibold rounded-full {classes}">{status}</span></td>
<td class="px-6 py-4 text-sm">{enrolled}</td>
<td class="px-6 py-4 text-right text-sm"><button type="button" data-action="edit-course" data-id="{id}" class="text-indigo-600 hover:text-indigo-900 mr-3"><i class="fas fa-edit"></i></button>{delete}</td>
</tr>"#,
                title = escape(&course.title),
                category = escape(course.category.as_deref().unwrap_or("Uncategorized")),
                instructor = escape(course.instructor.as_deref().unwrap_or("Not assigned")),
                classes = classes,
                status = status,
                enrolled = course.enrolled_count,
                id = id,
                delete = delete_button(
                    "delete-course",
                    &format!("/admin/courses/{}/delete", id),
                    &id,
                    "Delete this course? This cannot be undone."
                ),
            )
        })
        .collect()
}

fn role_badge(role: Role) -> &'static str {
    match role {
        Role::Admin => "bg-red-100 text-red-800",
        Role::Instructor => "bg-blue-100 text-blue-800",
        Role::Student => "bg-gray-100 text-gray-800",
    }
}

fn role_form(user: &User, id: &str) -> String {
    let options: String = [Role::Student, Role::Instructor, Role::Admin]
        .iter()
        .map(|role| {
            let selected = if *role == user.role { " selected" } else { "" };
            format!(r#"<option value="{}"{}>{}</option>"#, role.as_str(), selected, role_label(*role))
        })
        .collect();
    format!(
        r#"<form method="post" action="/admin/users/{id}/role" class="inline"><select name="role" class="text-sm border rounded">{options}</select><button type="submit" data-action="set-role" data-id="{id}" class="ml-1 text-indigo-600"><i class="fas fa-check"></i></button></form>"#,
        id = id,
        options = options
    )
}

pub fn render_users_table(users: &[User]) -> String {
    if users.is_empty() {
        return no_users_row();
    }

    users
        .iter()
        .map(|user| {
            let id = escape(&user.id);
            let (toggle_icon, confirm) = if user.is_active {
                ("ban", "Suspend this account?")
            } else {
                ("user-check", "Reactivate this account?")
            };
            format!(
                r#"<tr data-active="{active}">
<td class="px-6 py-4"><div class="flex items-center"><img class="h-10 w-10 rounded-full" src="{photo}" alt=""><div class="ml-4 text-sm font-medium text-gray-900">{name}</div></div></td>
<td class="px-6 py-4 text-sm">{email}</td>
<td class="px-6 py-4"><span class="px-2 text-xs font-semibold rounded-full {badge}">{role}</span></td>
<td class="px-6 py-4 text-sm">{last_login}</td>
<td class="px-6 py-4 text-right text-sm">{role_form}<form method="post" action="/admin/users/{id}/toggle" class="inline"><button type="submit" data-action="toggle-user" data-id="{id}" data-confirm="{confirm}" class="ml-3 text-yellow-600 hover:text-yellow-900"><i class="fas fa-{toggle_icon}"></i></button></form></td>
</tr>"#,
                active = user.is_active,
                photo = escape(user.photo_url.as_deref().unwrap_or("/assets/img/default-avatar.png")),
                name = escape(&user.display_name),
                email = escape(&user.email),
                badge = role_badge(user.role),
                role = role_label(user.role),
                last_login = format_date(user.last_login),
                role_form = role_form(user, &id),
                id = id,
                confirm = confirm,
                toggle_icon = toggle_icon,
            )
        })
        .collect()
}

pub fn render_media_library(files: &[MediaAsset]) -> String {
    if files.is_empty() {
        return no_media();
    }

    files
        .iter()
        .map(|file| {
            let id = escape(&file.id);
            format!(
                r#"<div class="border rounded-lg p-3 hover:shadow-md transition-shadow">
<div class="flex items-center justify-center h-20 bg-gray-100 rounded mb-2"><i class="fas fa-{icon} text-2xl text-gray-500"></i></div>
<p class="text-sm font-medium truncate" title="{name}"><a href="{url}" target="_blank" rel="noopener">{name}</a></p>
<p class="text-xs text-gray-500">{size}</p>
{delete}
</div>"#,
                icon = file_icon(file.category),
                name = escape(&file.name),
                url = escape(&file.url),
                size = format_file_size(file.size),
                delete = delete_button(
                    "delete-media",
                    &format!("/admin/media/{}/delete", id),
                    &id,
                    "Delete this file?"
                ),
            )
        })
        .collect()
}

fn checkbox(name: &str, label: &str, checked: bool) -> String {
    format!(
        r#"<label class="mr-4"><input type="checkbox" name="{}"{}> {}</label>"#,
        name,
        if checked { " checked" } else { "" },
        label
    )
}

/// Create form, or edit form when a course is given.
pub fn course_form(editing: Option<&Course>) -> String {
    let (action, heading, submit) = match editing {
        Some(course) => (
            format!("/admin/courses/{}", escape(&course.id)),
            "Edit course",
            "Save changes",
        ),
        None => ("/admin/courses".to_string(), "New course", "Create course"),
    };
    let title = editing.map(|c| escape(&c.title)).unwrap_or_default();
    let description = editing.map(|c| escape(&c.description)).unwrap_or_default();
    let category = editing
        .and_then(|c| c.category.as_deref())
        .map(escape)
        .unwrap_or_default();
    let price = editing
        .filter(|c| c.price > 0.0)
        .map(|c| c.price.to_string())
        .unwrap_or_default();

    format!(
        r#"<form id="courseForm" method="post" action="{action}" class="card mb-6 space-y-3">
<h3 class="text-lg font-semibold">{heading}</h3>
<input name="title" required placeholder="Title" value="{title}" class="w-full border rounded px-3 py-2">
<textarea name="description" placeholder="Description" class="w-full border rounded px-3 py-2">{description}</textarea>
<input name="category" placeholder="Category" value="{category}" class="w-full border rounded px-3 py-2">
<input name="price" inputmode="decimal" placeholder="Price (blank for free)" value="{price}" class="w-full border rounded px-3 py-2">
<div>{featured}{published}</div>
<button type="submit" class="btn-primary">{submit}</button>
</form>"#,
        action = action,
        heading = heading,
        title = title,
        description = description,
        category = category,
        price = price,
        featured = checkbox("featured", "Featured", editing.map(|c| c.featured).unwrap_or(false)),
        published = checkbox("published", "Published", editing.map(|c| c.published).unwrap_or(false)),
        submit = submit,
    )
}

const UPLOAD_SCRIPT: &str = r#"<script>
(function () {
  var input = document.getElementById('fileInput');
  var area = document.getElementById('uploadArea');
  var panel = document.getElementById('uploadProgress');
  var bar = document.getElementById('progressBar');
  var status = document.getElementById('uploadStatus');

  function show(state) {
    if (state.state === 'inProgress') {
      panel.classList.remove('hidden');
      bar.style.width = state.percent + '%';
      status.textContent = 'Uploading ' + state.file + ' (' + (state.index + 1) + '/' + state.total + ')...';
    } else if (state.state === 'complete') {
      bar.style.width = '100%';
      status.textContent = 'Upload complete!';
    }
  }

  function poll(seenWork) {
    fetch('/admin/media/upload/status', { credentials: 'same-origin' })
      .then(function (r) { return r.json(); })
      .then(function (state) {
        if (state.state === 'idle') {
          if (seenWork) window.location.href = '/admin?section=content';
          return;
        }
        show(state);
        setTimeout(function () { poll(true); }, 200);
      });
  }

  function send(files) {
    if (!files.length) return;
    var payload = { files: Array.prototype.map.call(files, function (f) {
      return { name: f.name, size: f.size, type: f.type };
    }) };
    fetch('/admin/media/upload', {
      method: 'POST',
      credentials: 'same-origin',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify(payload)
    }).then(function (r) {
      if (r.ok || r.status === 409) poll(false);
      else status.textContent = 'Upload failed.';
    });
  }

  area.addEventListener('click', function () { input.click(); });
  area.addEventListener('dragover', function (e) { e.preventDefault(); area.classList.add('border-primary-500'); });
  area.addEventListener('dragleave', function () { area.classList.remove('border-primary-500'); });
  area.addEventListener('drop', function (e) {
    e.preventDefault();
    area.classList.remove('border-primary-500');
    send(e.dataTransfer.files);
  });
  input.addEventListener('change', function (e) { send(e.target.files); });

  if (panel.dataset.state !== 'idle') poll(false);
})();
</script>"#;

fn upload_panel(upload: &UploadState) -> String {
    let (hidden, percent, text, state) = match upload {
        UploadState::Idle => (" hidden", 0.0, String::new(), "idle"),
        UploadState::InProgress { file, percent, .. } => ("", *percent, format!("Uploading {}...", escape(file)), "inProgress"),
        UploadState::Complete { .. } => ("", 100.0, "Upload complete!".to_string(), "complete"),
    };

    format!(
        r#"<div id="uploadArea" class="border-2 border-dashed rounded-lg p-8 text-center cursor-pointer mb-4"><i class="fas fa-cloud-upload-alt text-3xl text-gray-400 mb-2"></i><p>Drop files here or click to choose</p><input type="file" id="fileInput" multiple class="hidden"></div>
<div id="uploadProgress" data-state="{state}" class="mb-6{hidden}"><div class="w-full bg-gray-200 rounded-full h-2"><div id="progressBar" class="bg-primary-500 h-2 rounded-full" style="width: {percent}%"></div></div><p id="uploadStatus" class="text-sm text-gray-600 mt-2">{text}</p></div>"#,
        state = state,
        hidden = hidden,
        percent = percent,
        text = text,
    )
}

fn table(id: &str, headers: &[&str], rows: &str) -> String {
    let head: String = headers
        .iter()
        .map(|h| format!(r#"<th class="px-6 py-3 text-left text-xs font-medium text-gray-500 uppercase">{}</th>"#, h))
        .collect();
    format!(
        r#"<table class="min-w-full divide-y divide-gray-200 bg-white"><thead><tr>{}</tr></thead><tbody id="{}">{}</tbody></table>"#,
        head, id, rows
    )
}

fn section_body(panel: &AdminPanel) -> String {
    match panel {
        AdminPanel::Dashboard { stats, activity, now } => format!(
            r#"<div class="grid md:grid-cols-4 gap-6 mb-8">{}</div><section class="card"><h2 class="text-xl font-semibold mb-4">Recent activity</h2>{}</section>"#,
            render_stats(stats),
            container("recentActivity", "divide-y", &render_activity(activity, *now))
        ),
        AdminPanel::Courses { courses, editing } => format!(
            "{}{}",
            course_form(editing.as_ref()),
            table(
                "coursesTable",
                &["Course", "Instructor", "Status", "Students", ""],
                &render_courses_table(courses)
            )
        ),
        AdminPanel::Users { users } => table(
            "usersTable",
            &["User", "Email", "Role", "Last login", ""],
            &render_users_table(users),
        ),
        AdminPanel::Content { media, upload } => format!(
            "{}{}{}",
            upload_panel(upload),
            container("mediaLibrary", "grid grid-cols-2 md:grid-cols-4 gap-4", &render_media_library(media)),
            UPLOAD_SCRIPT
        ),
    }
}

fn section_tabs(active: AdminSection) -> String {
    AdminSection::ALL
        .iter()
        .map(|section| {
            let class = if *section == active { "nav-item active font-semibold" } else { "nav-item" };
            format!(
                r#"<a href="/admin?section={}" data-section="{}" class="{}">{}</a>"#,
                section.slug(),
                section.slug(),
                class,
                section.label()
            )
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn admin_page(panel: &AdminPanel, viewer: &Claims, notice: Option<&str>) -> String {
    let section = panel.section();
    let body = format!(
        r#"<div class="flex space-x-6 mb-8">{}</div><div id="{}-section" class="section active">{}</div>"#,
        section_tabs(section),
        section.slug(),
        section_body(panel)
    );
    // Only admins get past the gate in front of this page
    page("Admin", Some(Viewer::new(viewer, Role::Admin)), notice, &body)
}
