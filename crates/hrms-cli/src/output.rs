//! Plain-text rendering of API results.

use hrms_core::cache::ResponseCache;
use hrms_core::models::{AttendanceRecord, DashboardStats, Employee, HealthStatus};
use hrms_core::utils::{format_optional, page_numbers, paginate, truncate, PageMarker};

const ID_WIDTH: usize = 12;
const NAME_WIDTH: usize = 24;
const EMAIL_WIDTH: usize = 28;
const DEPARTMENT_WIDTH: usize = 16;

pub fn print_employees(employees: &[Employee]) {
    if employees.is_empty() {
        println!("No employees yet.");
        return;
    }
    println!(
        "{:<ID_WIDTH$}  {:<NAME_WIDTH$}  {:<EMAIL_WIDTH$}  {:<DEPARTMENT_WIDTH$}",
        "ID", "NAME", "EMAIL", "DEPARTMENT"
    );
    for e in employees {
        println!(
            "{:<ID_WIDTH$}  {:<NAME_WIDTH$}  {:<EMAIL_WIDTH$}  {:<DEPARTMENT_WIDTH$}",
            truncate(&e.employee_id, ID_WIDTH),
            truncate(&e.full_name, NAME_WIDTH),
            truncate(&e.email, EMAIL_WIDTH),
            truncate(&e.department, DEPARTMENT_WIDTH),
        );
    }
    println!("{} employee(s)", employees.len());
}

pub fn print_employee(employee: &Employee, base_url: &str) {
    println!("Employee ID: {}", employee.employee_id);
    println!("Name:        {}", employee.full_name);
    println!("Email:       {}", employee.email);
    println!("Department:  {}", employee.department);
    println!(
        "Photo:       {}",
        format_optional(employee.photo_url(base_url).as_deref(), "none")
    );
    if let Some(created) = employee.created_at {
        println!("Added:       {}", created.format("%b %d, %Y"));
    }
}

pub fn print_attendance(records: &[AttendanceRecord]) {
    if records.is_empty() {
        println!("No attendance records.");
        return;
    }
    println!("{:<ID_WIDTH$}  {:<10}  {:<7}", "EMPLOYEE", "DATE", "STATUS");
    for r in records {
        println!(
            "{:<ID_WIDTH$}  {:<10}  {:<7}",
            truncate(&r.employee_id, ID_WIDTH),
            r.date.format("%Y-%m-%d").to_string(),
            r.status.as_str()
        );
    }
}

pub fn print_attendance_page(records: &[AttendanceRecord], page: usize, per_page: usize) {
    let current = paginate(records, page, per_page);
    print_attendance(current.items);
    if current.total_pages > 1 {
        println!(
            "Page {} of {}: {}",
            current.page,
            current.total_pages,
            render_page_markers(current.page, current.total_pages)
        );
    }
}

fn render_page_markers(current: usize, total_pages: usize) -> String {
    page_numbers(current, total_pages)
        .into_iter()
        .map(|marker| match marker {
            PageMarker::Number(p) if p == current => format!("[{}]", p),
            PageMarker::Number(p) => p.to_string(),
            PageMarker::Ellipsis => "...".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn print_stats(stats: &DashboardStats) {
    println!("Total employees:         {}", stats.total_employees);
    println!("Present today:           {}", stats.present_today);
    println!("Absent today:            {}", stats.absent_today);
    println!("Attendance marked today: {}", stats.marked_today());
}

pub fn print_health(health: &HealthStatus) {
    match health.version {
        Some(ref version) => println!("{} (version {})", health.status, version),
        None => println!("{}", health.status),
    }
}

pub fn print_cache(cache: &ResponseCache) {
    let entries = cache.snapshot();
    if entries.is_empty() {
        println!("Cache is empty.");
        return;
    }
    let now = cache.now();
    for (key, entry) in entries {
        let state = if entry.is_fresh(now, cache.freshness()) {
            "fresh"
        } else {
            "stale"
        };
        println!("{:<8}  {:<10}  {}", state, entry.age_display(now), key);
    }
}
