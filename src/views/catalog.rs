use super::format::price_label;
use super::{container, escape, page, placeholder, Viewer};
use crate::models::Course;

pub const FEATURED_CONTAINER: &str = "featuredCourses";

pub(super) fn thumbnail(course: &Course) -> String {
    match course.thumbnail.as_deref() {
        Some(src) => format!(
            r#"<img src="{}" alt="{}" class="w-full h-full object-cover">"#,
            escape(src),
            escape(&course.title)
        ),
        None => r#"<div class="w-full h-full flex items-center justify-center text-gray-400"><i class="fas fa-play-circle text-4xl"></i></div>"#
            .to_string(),
    }
}

pub fn course_card(course: &Course) -> String {
    format!(
        r#"<div class="card hover:shadow-lg transition-shadow cursor-pointer" data-action="view-course" data-id="{id}">
<div class="aspect-video bg-gray-200 rounded-lg mb-4 overflow-hidden">{thumb}</div>
<h4 class="font-semibold text-lg mb-2">{title}</h4>
<p class="text-gray-600 text-sm mb-3 line-clamp-2">{description}</p>
<div class="flex items-center justify-between text-sm text-gray-500">
<span><i class="fas fa-user mr-1"></i>{instructor}</span>
<span><i class="fas fa-clock mr-1"></i>{duration}</span>
</div>
<div class="mt-3 flex items-center justify-between">
<span class="text-lg font-bold text-primary-600">{price}</span>
<span class="text-yellow-500"><i class="fas fa-star"></i> {rating:.1}</span>
</div>
</div>"#,
        id = escape(&course.id),
        thumb = thumbnail(course),
        title = escape(&course.title),
        description = escape(&course.description),
        instructor = escape(course.instructor.as_deref().unwrap_or("Instructor")),
        duration = escape(course.duration.as_deref().unwrap_or("0h")),
        price = price_label(course.price),
        rating = course.rating.unwrap_or(5.0),
    )
}

pub fn no_featured_courses() -> String {
    placeholder("book-open", "No courses found. Featured courses will show up here soon.")
}

pub fn render_featured(courses: &[Course]) -> String {
    if courses.is_empty() {
        return no_featured_courses();
    }
    courses.iter().map(course_card).collect()
}

pub fn catalog_page(courses: &[Course], viewer: Option<Viewer<'_>>, notice: Option<&str>) -> String {
    let body = format!(
        r#"<section class="text-center py-12"><h1 class="text-4xl font-bold mb-4">Learn something new today</h1><p class="text-gray-600">Courses picked by our instructors.</p></section>
<h2 class="text-2xl font-semibold mb-6">Featured courses</h2>
{}"#,
        container(
            FEATURED_CONTAINER,
            "grid md:grid-cols-2 lg:grid-cols-3 gap-6",
            &render_featured(courses)
        )
    );
    page("Courses", viewer, notice, &body)
}

pub fn course_page(course: &Course, viewer: Option<Viewer<'_>>) -> String {
    let lessons = if course.lessons.is_empty() {
        placeholder("list", "Lessons are on the way.")
    } else {
        let items: String = course
            .lessons
            .iter()
            .map(|lesson| format!(r#"<li class="py-2 border-b">{}</li>"#, escape(lesson)))
            .collect();
        format!("<ol>{}</ol>", items)
    };

    let body = format!(
        r#"<article id="courseDetail" data-id="{id}">
<div class="aspect-video max-w-3xl bg-gray-200 rounded-lg mb-6 overflow-hidden">{thumb}</div>
<h1 class="text-3xl font-bold mb-2">{title}</h1>
<p class="text-gray-500 mb-4">{category} &middot; {instructor} &middot; {duration} &middot; {enrolled} students</p>
<p class="mb-6">{description}</p>
<p class="text-2xl font-bold text-primary-600 mb-8">{price}</p>
<h2 class="text-xl font-semibold mb-3">Lessons</h2>
{lessons}
</article>"#,
        id = escape(&course.id),
        thumb = thumbnail(course),
        title = escape(&course.title),
        category = escape(course.category.as_deref().unwrap_or("General")),
        instructor = escape(course.instructor.as_deref().unwrap_or("Instructor")),
        duration = escape(course.duration.as_deref().unwrap_or("0h")),
        enrolled = course.enrolled_count,
        description = escape(&course.description),
        price = price_label(course.price),
        lessons = lessons,
    );
    page(&course.title, viewer, None, &body)
}

pub fn course_not_found_page(viewer: Option<Viewer<'_>>) -> String {
    let body = placeholder("search", "This course does not exist or is not published yet.");
    page("Course not found", viewer, None, &body)
}

pub fn course_unavailable_page(viewer: Option<Viewer<'_>>) -> String {
    let body = placeholder("exclamation-triangle", "Could not load this course. Please try again.");
    page("Course", viewer, None, &body)
}
