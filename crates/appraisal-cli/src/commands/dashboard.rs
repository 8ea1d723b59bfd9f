//! Cycle statistics.

use anyhow::Result;
use appraisal_client::PerformanceApi;
use appraisal_client::fetch::load_dashboard;
use appraisal_core::ResourceId;

pub async fn show(api: &dyn PerformanceApi, cycle: Option<String>) -> Result<()> {
    let cycle = cycle
        .filter(|c| !c.trim().is_empty())
        .map(ResourceId::from);
    let dashboard = load_dashboard(api, cycle.as_ref()).await;

    if let Some(error) = dashboard.error {
        anyhow::bail!(error);
    }
    let Some(selected) = &dashboard.selected else {
        println!("No cycles found.");
        return Ok(());
    };

    let name = dashboard
        .cycles
        .iter()
        .find(|c| &c.id == selected)
        .map(|c| c.name.clone())
        .unwrap_or_else(|| selected.to_string());
    let stats = &dashboard.stats;

    println!("{name}");
    println!();
    println!("Total assignments: {}", stats.total_assignments);
    println!("Not started:       {}", stats.not_started);
    println!("In progress:       {}", stats.in_progress);
    println!("Submitted:         {}", stats.submitted);
    println!("Published:         {}", stats.published);
    println!("Acknowledged:      {}", stats.acknowledged);
    println!("Completion:        {:.1}%", stats.completion_rate);
    Ok(())
}
