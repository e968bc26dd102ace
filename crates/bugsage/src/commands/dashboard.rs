//! `bugsage dashboard` -- counters, recent bugs and chart series.

use anyhow::Result;

use bugsage_core::dashboard::{ChartData, DashboardStats};
use bugsage_ui::styles::{render_category, render_priority, render_status};

use crate::cli::{DashboardArgs, DashboardCommands};
use crate::context::RuntimeContext;
use crate::output::{BUG_HEADERS, format_bug_row, output_json, output_table};

/// Execute the `bugsage dashboard` command.
pub fn run(ctx: &RuntimeContext, args: &DashboardArgs) -> Result<()> {
    let (engine, _) = ctx.open_engine()?;
    let caller = ctx.caller(&engine)?;

    match args.command {
        DashboardCommands::Stats => {
            let stats = engine.dashboard_stats(&caller);
            if ctx.json {
                output_json(&stats)?;
            } else {
                println!("{}", format_stats(&stats));
            }
        }
        DashboardCommands::Recent => {
            let recent = engine.dashboard_recent();
            if ctx.json {
                output_json(&recent)?;
            } else {
                let rows: Vec<Vec<String>> = recent.iter().map(format_bug_row).collect();
                output_table(BUG_HEADERS, &rows);
            }
        }
        DashboardCommands::Charts => {
            let charts = engine.dashboard_charts();
            if ctx.json {
                output_json(&charts)?;
            } else {
                println!("{}", format_charts(&charts));
            }
        }
    }
    Ok(())
}

fn format_stats(stats: &DashboardStats) -> String {
    let mut lines = vec![
        format!("Total bugs:    {}", stats.total_bugs),
        format!("Assigned to me: {}", stats.my_bugs),
        format!("Recent:        {}", stats.recent_bugs),
        String::new(),
        render_category("By status"),
    ];
    for sc in &stats.status_counts {
        lines.push(format!("  {:<16} {}", render_status(sc.status), sc.count));
    }
    lines.push(String::new());
    lines.push(render_category("By priority"));
    for pc in &stats.priority_counts {
        lines.push(format!("  {:<16} {}", render_priority(pc.priority), pc.count));
    }
    lines.join("\n")
}

fn format_charts(charts: &ChartData) -> String {
    let mut lines = vec![render_category("Bugs created per day")];
    for day in &charts.bugs_over_time {
        lines.push(format!("  {}  {:>4}  {}", day.date, day.count, "#".repeat(day.count.min(60) as usize)));
    }
    lines.push(String::new());
    lines.push(render_category("Average days to resolve"));
    for rt in &charts.resolution_times {
        lines.push(format!("  {:<10} {:.1}", rt.priority.as_str(), rt.avg_days));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn zeroed_stats_list_every_status() {
        let text = format_stats(&DashboardStats::zeroed());
        for status in ["New", "In Progress", "Resolved", "Closed"] {
            assert!(text.contains(status), "missing {status}");
        }
    }

    #[test]
    fn charts_show_each_day() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let text = format_charts(&ChartData::zeroed(today));
        assert!(text.contains("2024-03-04"));
        assert!(text.contains("2024-03-10"));
        assert!(text.contains("Critical"));
    }
}
