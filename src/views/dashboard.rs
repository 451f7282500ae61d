use super::catalog::thumbnail;
use super::format::progress_badge;
use super::{container, escape, page, placeholder, Viewer};
use crate::models::{Achievement, EnrolledCourse};
use crate::services::auth_service::Claims;
use crate::services::dashboard_service::{CourseFilter, DashboardData, DashboardStats};

const FILTERS: [(CourseFilter, &str); 4] = [
    (CourseFilter::All, "All"),
    (CourseFilter::InProgress, "In progress"),
    (CourseFilter::Completed, "Completed"),
    (CourseFilter::NotStarted, "Not started"),
];

pub fn no_courses_in_progress() -> String {
    placeholder("book-open", "No courses in progress")
}

pub fn no_achievements() -> String {
    placeholder("medal", "No achievements yet")
}

pub fn no_enrolled_courses() -> String {
    placeholder("graduation-cap", "No enrolled courses. Start learning today!")
}

fn stat_card(id: &str, label: &str, value: &str) -> String {
    format!(
        r#"<div class="card"><p class="text-sm text-gray-500">{}</p><p id="{}" class="text-3xl font-bold">{}</p></div>"#,
        label, id, value
    )
}

pub fn render_stats(stats: &DashboardStats) -> String {
    [
        stat_card("enrolledCourses", "Enrolled courses", &stats.enrolled.to_string()),
        stat_card("completedCourses", "Completed", &stats.completed.to_string()),
        stat_card("studyHours", "Study hours", &format!("{}h", stats.study_hours)),
    ]
    .concat()
}

pub fn render_in_progress(items: &[EnrolledCourse]) -> String {
    if items.is_empty() {
        return no_courses_in_progress();
    }

    items
        .iter()
        .map(|item| {
            let progress = item.enrollment.display_progress();
            format!(
                r#"<div class="flex items-center space-x-4 p-4 bg-gray-50 rounded-lg cursor-pointer" data-action="view-course" data-id="{id}">
<div class="w-16 h-16 bg-primary-100 rounded-lg flex items-center justify-center"><i class="fas fa-play text-primary-600 text-xl"></i></div>
<div class="flex-1">
<h3 class="font-semibold">{title}</h3>
<p class="text-sm text-gray-600 mb-2">{category}</p>
<div class="w-full bg-gray-200 rounded-full h-2"><div class="bg-primary-500 h-2 rounded-full" style="width: {progress}%"></div></div>
<p class="text-xs text-gray-500 mt-1">{progress}% complete</p>
</div>
</div>"#,
                id = escape(&item.course.id),
                title = escape(&item.course.title),
                category = escape(item.course.category.as_deref().unwrap_or("General")),
                progress = progress,
            )
        })
        .collect()
}

pub fn render_achievements(achievements: &[Achievement]) -> String {
    if achievements.is_empty() {
        return no_achievements();
    }

    achievements
        .iter()
        .map(|achievement| {
            format!(
                r#"<div class="flex items-center space-x-3"><div class="w-8 h-8 bg-yellow-100 rounded-full flex items-center justify-center"><i class="fas fa-{} text-yellow-600 text-sm"></i></div><div><p class="text-sm font-medium">{}</p><p class="text-xs text-gray-500">{}</p></div></div>"#,
                escape(&achievement.icon),
                escape(&achievement.title),
                escape(&achievement.description)
            )
        })
        .collect()
}

pub fn render_all_courses(items: &[EnrolledCourse]) -> String {
    if items.is_empty() {
        return no_enrolled_courses();
    }

    items
        .iter()
        .map(|item| {
            let (label, classes) = progress_badge(item.enrollment.status());
            format!(
                r#"<div class="card hover:shadow-lg transition-shadow cursor-pointer" data-action="view-course" data-id="{id}">
<div class="aspect-video bg-gray-200 rounded-lg mb-4 overflow-hidden">{thumb}</div>
<h4 class="font-semibold text-lg mb-2">{title}</h4>
<p class="text-gray-600 text-sm mb-3">{description}</p>
<div class="mb-3">
<div class="flex justify-between text-sm text-gray-600 mb-1"><span>Progress</span><span>{progress}%</span></div>
<div class="w-full bg-gray-200 rounded-full h-2"><div class="bg-primary-500 h-2 rounded-full" style="width: {progress}%"></div></div>
</div>
<div class="flex items-center justify-between">
<span class="text-sm text-gray-500"><i class="fas fa-clock mr-1"></i>{duration}</span>
<span class="text-yellow-500"><i class="fas fa-star"></i> <span class="ml-1 text-sm">{rating:.1}</span></span>
</div>
<div class="mt-4"><span class="px-3 py-1 text-xs rounded-full {classes}">{label}</span></div>
</div>"#,
                id = escape(&item.course.id),
                thumb = thumbnail(&item.course),
                title = escape(&item.course.title),
                description = escape(&item.course.description),
                progress = item.enrollment.display_progress(),
                duration = escape(item.course.duration.as_deref().unwrap_or("0h")),
                rating = item.course.rating.unwrap_or(5.0),
                classes = classes,
                label = label,
            )
        })
        .collect()
}

fn filter_tabs(active: CourseFilter) -> String {
    FILTERS
        .iter()
        .map(|(filter, label)| {
            let class = if *filter == active { "font-semibold text-primary-600" } else { "text-gray-500" };
            format!(r#"<a href="/dashboard?filter={}" class="{}">{}</a>"#, filter.slug(), class, label)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn dashboard_page(data: &DashboardData, viewer: &Claims) -> String {
    let greeting = data
        .profile
        .as_ref()
        .map(|profile| profile.display_name.as_str())
        .filter(|name| !name.is_empty())
        .or(viewer.name.as_deref())
        .unwrap_or("student");
    let achievements = data
        .profile
        .as_ref()
        .map(|profile| profile.achievements.as_slice())
        .unwrap_or(&[]);
    let role = data.profile.as_ref().map(|profile| profile.role).unwrap_or_default();

    let body = format!(
        r#"<h1 class="text-3xl font-bold mb-6">Welcome back, {greeting}</h1>
<div class="grid md:grid-cols-3 gap-6 mb-8">{stats}</div>
<div class="grid lg:grid-cols-3 gap-6 mb-8">
<section class="lg:col-span-2 card"><h2 class="text-xl font-semibold mb-4">Continue learning</h2>{in_progress}</section>
<section class="card"><h2 class="text-xl font-semibold mb-4">Recent achievements</h2>{achievements}</section>
</div>
<section>
<div class="flex items-center justify-between mb-4"><h2 class="text-xl font-semibold">My courses</h2><div id="courseFilter" data-filter="{filter}" class="space-x-3">{tabs}</div></div>
{all}
</section>"#,
        greeting = escape(greeting),
        stats = render_stats(&data.stats),
        in_progress = container("coursesInProgress", "space-y-4", &render_in_progress(&data.in_progress)),
        achievements = container("recentAchievements", "space-y-3", &render_achievements(achievements)),
        filter = data.filter.slug(),
        tabs = filter_tabs(data.filter),
        all = container("allCourses", "grid md:grid-cols-2 lg:grid-cols-3 gap-6", &render_all_courses(&data.courses)),
    );
    page("Dashboard", Some(Viewer::new(viewer, role)), None, &body)
}
