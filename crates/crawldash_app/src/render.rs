use chrono::{DateTime, Utc};
use crawldash_core::{AppViewModel, JobDetail, JobRowView, JobStatus};

const URL_WIDTH: usize = 48;

/// Renders the job page as a plain text table.
pub fn render_jobs(view: &AppViewModel) -> String {
    let mut out = String::new();

    if view.jobs.is_empty() {
        out.push_str("No jobs.\n");
    } else {
        out.push_str(&format!(
            "{:>6}  {:<9}  {:<width$}  {:>17}  {}\n",
            "ID",
            "STATUS",
            "URL",
            "LINKS int/ext/bad",
            "TITLE",
            width = URL_WIDTH
        ));
        for job in &view.jobs {
            out.push_str(&format_job_row(job));
            out.push('\n');
        }
    }

    let pagination = &view.pagination;
    out.push_str(&format!(
        "Page {} of {} | {} job(s)\n",
        pagination.page,
        pagination.total_pages.max(1),
        format_with_commas(pagination.total)
    ));

    let polling = &view.polling;
    let polling_label = if polling.paused {
        "paused".to_string()
    } else if polling.active {
        format!("every {}s", polling.interval.as_secs())
    } else {
        "idle".to_string()
    };
    out.push_str(&format!("Auto-refresh: {polling_label}\n"));

    if let Some(error) = &view.error {
        out.push_str(&format!("Error: {error}\n"));
    }
    out
}

/// Renders one job with its broken links.
pub fn render_detail(detail: &JobDetail) -> String {
    let job = &detail.job;
    let mut out = String::new();

    out.push_str(&format!("Job #{} [{}]\n", job.id, status_label(job.status)));
    out.push_str(&format!("URL:           {}\n", job.url));
    if let Some(title) = &job.page_title {
        out.push_str(&format!("Title:         {title}\n"));
    }
    if let Some(version) = &job.html_version {
        out.push_str(&format!("HTML version:  {version}\n"));
    }
    out.push_str(&format!("Created:       {}\n", format_time(job.created_at)));
    out.push_str(&format!("Started:       {}\n", format_time(job.started_at)));
    out.push_str(&format!("Completed:     {}\n", format_time(job.completed_at)));
    if let Some(message) = &job.error_message {
        out.push_str(&format!("Error:         {message}\n"));
    }

    if job.has_results() {
        let headings = job
            .headings
            .as_array()
            .iter()
            .enumerate()
            .map(|(level, count)| format!("h{}={}", level + 1, count))
            .collect::<Vec<_>>()
            .join(" ");
        out.push_str(&format!("Headings:      {headings}\n"));
        out.push_str(&format!(
            "Links:         {} internal, {} external, {} broken\n",
            job.internal_links, job.external_links, job.broken_links
        ));
        out.push_str(&format!("Login form:    {}\n", yes_no(job.has_login_form)));
        if job.has_structured_data {
            out.push_str(&format!(
                "Structured:    {}\n",
                job.structured_data_types.join(", ")
            ));
        }
    }

    if !detail.broken_links.is_empty() {
        out.push_str("Broken links:\n");
        for link in &detail.broken_links {
            out.push_str(&format!("  {:>3}  {}\n", link.status_code, link.url));
        }
    }
    out
}

fn format_job_row(job: &JobRowView) -> String {
    let links = match job.status {
        JobStatus::Completed => format!(
            "{}/{}/{}",
            job.internal_links, job.external_links, job.broken_links
        ),
        _ => "-".to_string(),
    };
    let title = match (&job.error_message, &job.page_title) {
        (Some(message), _) if job.status == JobStatus::Error => message.as_str(),
        (_, Some(title)) => title.as_str(),
        _ => "",
    };
    format!(
        "{:>6}  {:<9}  {:<width$}  {:>17}  {}",
        format!("#{}", job.job_id),
        status_label(job.status),
        truncate(&job.url, URL_WIDTH),
        links,
        title,
        width = URL_WIDTH
    )
}

fn status_label(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Queued => "Queued",
        JobStatus::Running => "Running",
        JobStatus::Completed => "Done",
        JobStatus::Error => "Error",
        JobStatus::Stopped => "Stopped",
    }
}

fn format_time(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{kept}...")
}

fn format_with_commas(value: u64) -> String {
    let mut out = String::new();
    for (i, ch) in value.to_string().chars().rev().enumerate() {
        if i != 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crawldash_core::{BrokenLink, Job, PaginationInfo, PollingView};

    use super::*;

    fn view_with(jobs: Vec<Job>, total: u64) -> AppViewModel {
        AppViewModel {
            jobs: jobs.iter().map(JobRowView::from).collect(),
            pagination: PaginationInfo::new(1, 10, total),
            polling: PollingView {
                active: true,
                paused: false,
                interval: Duration::from_secs(5),
            },
            ..AppViewModel::default()
        }
    }

    #[test]
    fn rows_show_status_and_link_counts() {
        let mut done = Job::new(1, "https://a.example", JobStatus::Completed);
        done.internal_links = 12;
        done.external_links = 3;
        done.broken_links = 1;
        done.page_title = Some("Home".into());
        let running = Job::new(2, "https://b.example", JobStatus::Running);

        let text = render_jobs(&view_with(vec![done, running], 2));
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[1].contains("#1"));
        assert!(lines[1].contains("Done"));
        assert!(lines[1].contains("12/3/1"));
        assert!(lines[1].ends_with("Home"));
        assert!(lines[2].contains("Running"));
        assert!(text.contains("Page 1 of 1 | 2 job(s)"));
        assert!(text.contains("Auto-refresh: every 5s"));
    }

    #[test]
    fn errored_rows_show_the_error_message() {
        let mut failed = Job::new(3, "https://c.example", JobStatus::Error);
        failed.error_message = Some("dns lookup failed".into());
        let text = render_jobs(&view_with(vec![failed], 1));
        assert!(text.contains("dns lookup failed"));
    }

    #[test]
    fn empty_page_and_error_banner() {
        let mut view = view_with(Vec::new(), 0);
        view.error = Some("database unavailable".into());
        view.polling.active = false;
        let text = render_jobs(&view);
        assert!(text.starts_with("No jobs."));
        assert!(text.contains("Auto-refresh: idle"));
        assert!(text.contains("Error: database unavailable"));
    }

    #[test]
    fn detail_lists_results_and_broken_links() {
        let mut job = Job::new(4, "https://d.example", JobStatus::Completed);
        job.page_title = Some("Docs".into());
        job.internal_links = 7;
        job.broken_links = 1;
        let detail = JobDetail {
            job,
            broken_links: vec![BrokenLink {
                id: 1,
                crawl_job_id: 4,
                url: "https://d.example/gone".into(),
                status_code: 404,
                created_at: None,
            }],
        };

        let text = render_detail(&detail);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Job #4 [Done]");
        assert!(text.contains("Title:         Docs\n"));
        assert!(text.contains("Started:       -\n"));
        assert!(text.contains("7 internal, 0 external, 1 broken"));
        assert!(text.ends_with("Broken links:\n  404  https://d.example/gone\n"));
    }

    #[test]
    fn long_urls_are_truncated() {
        let url = format!("https://example.com/{}", "a".repeat(80));
        let cut = truncate(&url, URL_WIDTH);
        assert_eq!(cut.chars().count(), URL_WIDTH);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn totals_are_grouped() {
        assert_eq!(format_with_commas(0), "0");
        assert_eq!(format_with_commas(1_234_567), "1,234,567");
    }
}
