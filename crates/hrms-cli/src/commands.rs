use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Subcommand;
use hrms_core::api::client::{DEFAULT_LIMIT, DEFAULT_SKIP};
use hrms_core::models::{AttendanceStatus, MarkAttendance, NewEmployee, Photo};
use hrms_core::ApiClient;

use crate::output;

/// Rows per page for client-side paging of attendance lists
const DEFAULT_PER_PAGE: usize = 10;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage the employee directory
    #[command(subcommand)]
    Employees(EmployeeCommand),

    /// Mark and view attendance
    #[command(subcommand)]
    Attendance(AttendanceCommand),

    /// Show today's dashboard counts
    Stats,

    /// Check that the backend is up
    Health,

    /// Inspect or clear the response cache
    #[command(subcommand)]
    Cache(CacheCommand),

    /// Interactive mode sharing one client and cache across commands
    Shell,
}

#[derive(Subcommand, Debug)]
pub enum EmployeeCommand {
    /// List employees
    List {
        #[arg(long, default_value_t = DEFAULT_SKIP)]
        skip: u32,
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: u32,
    },
    /// Show one employee
    Get { employee_id: String },
    /// Add an employee
    Create {
        employee_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        department: String,
        /// Image file to upload as the employee photo
        #[arg(long)]
        photo: Option<PathBuf>,
    },
    /// Delete an employee and their attendance records
    Delete { employee_id: String },
}

#[derive(Subcommand, Debug)]
pub enum AttendanceCommand {
    /// Mark an employee present or absent
    Mark {
        employee_id: String,
        /// Present or Absent
        status: AttendanceStatus,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List all attendance records
    List {
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
        per_page: usize,
    },
    /// Attendance records for one employee
    Employee {
        employee_id: String,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },
}

#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// List cached responses and their age
    Show,
    /// Drop every cached response
    Clear,
    /// Drop only stale responses
    Sweep,
}

pub async fn execute(client: &ApiClient, command: Command) -> Result<()> {
    match command {
        Command::Employees(cmd) => employees(client, cmd).await,
        Command::Attendance(cmd) => attendance(client, cmd).await,
        Command::Stats => {
            let stats = client.dashboard_stats().await?;
            output::print_stats(&stats);
            Ok(())
        }
        Command::Health => {
            let health = client.health_check().await?;
            output::print_health(&health);
            Ok(())
        }
        Command::Cache(cmd) => {
            cache(client, cmd);
            Ok(())
        }
        Command::Shell => anyhow::bail!("already in shell mode"),
    }
}

async fn employees(client: &ApiClient, command: EmployeeCommand) -> Result<()> {
    match command {
        EmployeeCommand::List { skip, limit } => {
            let employees = client.list_employees(skip, limit).await?;
            output::print_employees(&employees);
        }
        EmployeeCommand::Get { employee_id } => {
            let employee = client.get_employee(&employee_id).await?;
            output::print_employee(&employee, client.base_url());
        }
        EmployeeCommand::Create {
            employee_id,
            name,
            email,
            department,
            photo,
        } => {
            let mut new = NewEmployee::new(employee_id, name, email, department);
            if let Some(path) = photo {
                new = new.with_photo(read_photo(&path)?);
            }
            let employee = client.create_employee(&new).await?;
            println!("Employee added successfully!");
            output::print_employee(&employee, client.base_url());
        }
        EmployeeCommand::Delete { employee_id } => {
            client.delete_employee(&employee_id).await?;
            println!("Employee {} deleted successfully!", employee_id);
        }
    }
    Ok(())
}

async fn attendance(client: &ApiClient, command: AttendanceCommand) -> Result<()> {
    match command {
        AttendanceCommand::Mark {
            employee_id,
            status,
            date,
        } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let record = client
                .mark_attendance(&MarkAttendance::new(employee_id, date, status))
                .await?;
            println!(
                "Marked {} as {} on {}",
                record.employee_id, record.status, record.date
            );
        }
        AttendanceCommand::List { page, per_page } => {
            let records = client.list_attendance().await?;
            output::print_attendance_page(&records, page, per_page);
        }
        AttendanceCommand::Employee {
            employee_id,
            from,
            to,
        } => {
            let records = client.attendance_by_employee(&employee_id, from, to).await?;
            output::print_attendance(&records);
        }
    }
    Ok(())
}

fn cache(client: &ApiClient, command: CacheCommand) {
    let cache = client.cache();
    match command {
        CacheCommand::Show => output::print_cache(cache),
        CacheCommand::Clear => {
            let count = cache.len();
            cache.clear();
            println!("Cleared {} cached responses", count);
        }
        CacheCommand::Sweep => {
            let removed = cache.clear_expired();
            println!("Removed {} expired responses", removed);
        }
    }
}

fn read_photo(path: &Path) -> Result<Photo> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read photo: {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "photo".to_string());
    Ok(Photo {
        mime_type: mime_for(path).to_string(),
        file_name,
        bytes,
    })
}

/// MIME type from the file extension; the backend only accepts `image/*`
fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}
