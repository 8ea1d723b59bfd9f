//! Cycle commands.

use anyhow::{Context, Result};
use appraisal_client::PerformanceApi;
use appraisal_client::fetch::load_cycles;
use appraisal_core::ResourceId;
use appraisal_core::cycle::Cycle;
use appraisal_core::reference::Ref;
use tracing::info;

use super::{Table, date, loaded};

pub async fn list(api: &dyn PerformanceApi) -> Result<()> {
    let cycles = loaded(load_cycles(api).await)?;
    if cycles.is_empty() {
        println!("No cycles found.");
    } else {
        print!("{}", cycle_table(&cycles).render());
    }
    Ok(())
}

fn cycle_table(cycles: &[Cycle]) -> Table {
    let mut table = Table::new(&["ID", "NAME", "TYPE", "START", "END", "MANAGER DUE"]);
    for cycle in cycles {
        table.row(vec![
            cycle.id.to_string(),
            cycle.name.clone(),
            cycle.type_title().to_string(),
            date(cycle.start_date),
            date(cycle.end_date),
            date(cycle.manager_due_date),
        ]);
    }
    table
}

pub async fn show(api: &dyn PerformanceApi, id: &str) -> Result<()> {
    let cycle = api
        .get_cycle(&ResourceId::from(id))
        .await
        .with_context(|| format!("Failed to load cycle {id}"))?;

    println!("{}", cycle.name);
    if let Some(description) = &cycle.description {
        println!("  {description}");
    }
    println!();
    println!("Type:                {}", cycle.type_title());
    println!("Start:               {}", date(cycle.start_date));
    println!("End:                 {}", date(cycle.end_date));
    println!("Manager due:         {}", date(cycle.manager_due_date));
    println!("Acknowledgement due: {}", date(cycle.employee_acknowledgement_due_date));
    if let Some(status) = &cycle.status {
        println!("Status:              {status}");
    }

    println!();
    if cycle.template_assignments.is_empty() {
        println!("No templates attached.");
        return Ok(());
    }
    let mut table = Table::new(&["TEMPLATE", "DEPARTMENTS"]);
    for ta in &cycle.template_assignments {
        let departments = if ta.departments.is_empty() {
            "All departments".to_string()
        } else {
            ta.departments.iter().map(label).collect::<Vec<_>>().join(", ")
        };
        table.row(vec![label(&ta.template), departments]);
    }
    print!("{}", table.render());
    Ok(())
}

fn label<T: appraisal_core::Label>(reference: &Ref<T>) -> String {
    reference
        .label()
        .or_else(|| reference.id().map(|id| id.to_string()))
        .unwrap_or_else(|| "-".to_string())
}

pub async fn delete(api: &dyn PerformanceApi, id: &str) -> Result<()> {
    api.delete_cycle(&ResourceId::from(id))
        .await
        .with_context(|| format!("Failed to delete cycle {id}"))?;
    info!(cycle = id, "cycle deleted");
    println!("Cycle deleted successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use appraisal_client::mock::{MockPerformanceApi, test_cycle};

    #[test]
    fn test_cycle_table() {
        let rendered = cycle_table(&[test_cycle("c1", "FY2025 Annual")]).render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("c1"));
        assert!(lines[1].contains("FY2025 Annual"));
        assert!(lines[1].contains("2025-01-01"));
        assert!(lines[1].ends_with("-"));
    }

    #[tokio::test]
    async fn test_delete_reports_backend_error() {
        let api = MockPerformanceApi::new().with_error(
            "delete_cycle",
            appraisal_client::ClientError::Status {
                status: 409,
                message: "Cycle has assignments".to_string(),
            },
        );
        let err = delete(&api, "c1").await.unwrap_err();
        assert!(format!("{err:#}").contains("Cycle has assignments"));
        assert_eq!(api.calls_to("delete_cycle").len(), 1);
    }
}
