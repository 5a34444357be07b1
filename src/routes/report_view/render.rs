//! Plain-text rendering of an iteration report, driven by the project's
//! report settings.

use std::collections::HashMap;

use crate::models::iteration::Iteration;
use crate::models::report_settings::ReportSettings;
use crate::models::story::Story;

pub fn render_report(
    project_title: &str,
    iteration: &Iteration,
    settings: &ReportSettings,
    stories: &[Story],
    tasks_by_story: &HashMap<i32, Vec<String>>,
    owner_names: &HashMap<i32, String>,
) -> String {
    let mut out = String::new();
    let heading = format!("Iteration report: {} / {}", project_title, iteration.title);
    out.push_str(&heading);
    out.push('\n');
    out.push_str(&"=".repeat(heading.len()));
    out.push('\n');

    if settings.iteration_description {
        if let Some(description) = &iteration.description {
            out.push_str(&format!("Description: {}\n", description));
        }
    }
    if settings.iteration_duration {
        let days = (iteration.end_date - iteration.start_date).num_days() + 1;
        out.push_str(&format!(
            "Duration: {} to {} ({} days)\n",
            iteration.start_date, iteration.end_date, days
        ));
    }

    for story in stories {
        out.push('\n');
        out.push_str(&format!("Story: {}\n", story.title));
        if settings.story_description {
            if let Some(description) = &story.description {
                out.push_str(&format!("  Description: {}\n", description));
            }
        }
        if settings.story_reason {
            if let Some(reason) = &story.reason {
                out.push_str(&format!("  Reason: {}\n", reason));
            }
        }
        if settings.story_test {
            if let Some(test) = &story.test {
                out.push_str(&format!("  Acceptance test: {}\n", test));
            }
        }
        if settings.story_task {
            if let Some(tasks) = tasks_by_story.get(&story.story_id) {
                if !tasks.is_empty() {
                    out.push_str("  Tasks:\n");
                    for task in tasks {
                        out.push_str(&format!("    - {}\n", task));
                    }
                }
            }
        }
        if settings.story_owner {
            let owner = story
                .owner_user_id
                .and_then(|id| owner_names.get(&id))
                .map(String::as_str)
                .unwrap_or("unassigned");
            out.push_str(&format!("  Owner: {}\n", owner));
        }
        if settings.story_hours {
            out.push_str(&format!("  Hours: {}\n", story.hours));
        }
        if settings.story_status {
            out.push_str(&format!("  Status: {}\n", story.status));
        }
        if settings.story_points {
            out.push_str(&format!("  Points: {}\n", story.points));
        }
    }

    // The pie chart of the old report becomes a textual status breakdown
    if settings.pie_chart && !stories.is_empty() {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for story in stories {
            match counts.iter_mut().find(|(status, _)| *status == story.status) {
                Some((_, count)) => *count += 1,
                None => counts.push((story.status.clone(), 1)),
            }
        }
        out.push_str("\nStatus breakdown:\n");
        for (status, count) in counts {
            out.push_str(&format!("  {}: {}\n", status, count));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::render_report;
    use crate::models::iteration::Iteration;
    use crate::models::report_settings::ReportSettings;
    use crate::models::story::{Story, BUCKET_ITERATION};
    use chrono::{NaiveDate, NaiveDateTime};
    use std::collections::HashMap;

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 10)
            .expect("valid test date")
            .and_hms_opt(9, 0, 0)
            .expect("valid test time")
    }

    fn iteration() -> Iteration {
        Iteration {
            iteration_id: 1,
            project_id: 7,
            title: "Sprint 3".to_string(),
            description: Some("Stabilization".to_string()),
            start_date: NaiveDate::from_ymd_opt(2024, 6, 10).expect("valid test date"),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 23).expect("valid test date"),
        }
    }

    fn story(story_id: i32, title: &str, status: &str, owner: Option<i32>) -> Story {
        Story {
            story_id,
            project_id: 7,
            iteration_id: Some(1),
            bucket: BUCKET_ITERATION.to_string(),
            title: title.to_string(),
            description: Some("does a thing".to_string()),
            reason: Some("users asked".to_string()),
            test: Some("it works".to_string()),
            hours: 6,
            owner_user_id: owner,
            story_type: "feature".to_string(),
            status: status.to_string(),
            points: 3,
            priority: 1,
            pause: false,
            created_at: timestamp(),
            last_updated: timestamp(),
        }
    }

    #[test]
    fn report_includes_selected_fields() {
        let settings = ReportSettings::default();
        let stories = vec![story(1, "Login page", "done", Some(42))];
        let mut tasks = HashMap::new();
        tasks.insert(1, vec!["wire the form".to_string()]);
        let mut owners = HashMap::new();
        owners.insert(42, "ada".to_string());

        let report = render_report("Storyboard", &iteration(), &settings, &stories, &tasks, &owners);

        assert!(report.contains("Iteration report: Storyboard / Sprint 3"));
        assert!(report.contains("Duration: 2024-06-10 to 2024-06-23 (14 days)"));
        assert!(report.contains("Story: Login page"));
        assert!(report.contains("    - wire the form"));
        assert!(report.contains("  Owner: ada"));
        assert!(report.contains("  Hours: 6"));
    }

    #[test]
    fn disabled_fields_are_omitted() {
        let settings = ReportSettings {
            story_hours: false,
            story_owner: false,
            iteration_duration: false,
            ..ReportSettings::default()
        };
        let stories = vec![story(1, "Login page", "done", Some(42))];

        let report = render_report(
            "Storyboard",
            &iteration(),
            &settings,
            &stories,
            &HashMap::new(),
            &HashMap::new(),
        );

        assert!(!report.contains("Duration:"));
        assert!(!report.contains("Hours:"));
        assert!(!report.contains("Owner:"));
        assert!(report.contains("Status: done"));
    }

    #[test]
    fn unassigned_owner_is_reported_as_such() {
        let settings = ReportSettings::default();
        let stories = vec![story(1, "Login page", "todo", None)];

        let report = render_report(
            "Storyboard",
            &iteration(),
            &settings,
            &stories,
            &HashMap::new(),
            &HashMap::new(),
        );

        assert!(report.contains("  Owner: unassigned"));
    }

    #[test]
    fn pie_chart_toggle_adds_status_breakdown() {
        let mut settings = ReportSettings::default();
        settings.pie_chart = true;
        let stories = vec![
            story(1, "A", "done", None),
            story(2, "B", "todo", None),
            story(3, "C", "done", None),
        ];

        let report = render_report(
            "Storyboard",
            &iteration(),
            &settings,
            &stories,
            &HashMap::new(),
            &HashMap::new(),
        );

        assert!(report.contains("Status breakdown:"));
        assert!(report.contains("  done: 2"));
        assert!(report.contains("  todo: 1"));
    }
}
