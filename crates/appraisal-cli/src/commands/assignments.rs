//! Assignment commands.

use anyhow::{Context, Result};
use appraisal_client::fetch::load_assignments;
use appraisal_client::{PerformanceApi, UserContext};
use appraisal_core::ResourceId;
use appraisal_core::assignment::Assignment;
use appraisal_core::reference::label_or;
use tracing::info;

use super::{Table, date, loaded};

/// Without a cycle this lists the user's own assignments.
pub async fn list(api: &dyn PerformanceApi, user: &UserContext, cycle: Option<String>) -> Result<()> {
    let cycle = cycle
        .filter(|c| !c.trim().is_empty())
        .map(ResourceId::from);
    let assignments = loaded(load_assignments(api, user, cycle.as_ref()).await)?;

    if assignments.is_empty() {
        println!("No assignments found.");
    } else {
        print!("{}", assignment_table(&assignments).render());
    }
    Ok(())
}

fn assignment_table(assignments: &[Assignment]) -> Table {
    let mut table = Table::new(&["ID", "EMPLOYEE", "CYCLE", "TEMPLATE", "MANAGER", "STATUS", "DUE"]);
    for a in assignments {
        table.row(vec![
            a.id.to_string(),
            label_or(a.employee.as_ref(), "Unknown employee"),
            label_or(a.cycle.as_ref(), "-"),
            label_or(a.template.as_ref(), "-"),
            label_or(a.manager_ref(), "-"),
            a.status.as_str().to_string(),
            date(a.due_date),
        ]);
    }
    table
}

pub async fn delete(api: &dyn PerformanceApi, id: &str) -> Result<()> {
    api.delete_assignment(&ResourceId::from(id))
        .await
        .with_context(|| format!("Failed to delete assignment {id}"))?;
    info!(assignment = id, "assignment deleted");
    println!("Assignment deleted successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use appraisal_client::mock::{MockPerformanceApi, test_assignment};

    #[tokio::test]
    async fn test_list_without_user_fails() {
        let api = MockPerformanceApi::new();
        let err = list(&api, &UserContext::anonymous(), None).await.unwrap_err();
        assert_eq!(err.to_string(), "User not authenticated");
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn test_list_by_cycle_skips_user() {
        let api = MockPerformanceApi::new()
            .with_cycle_assignments("c1", vec![test_assignment("a1", "SUBMITTED")]);
        list(&api, &UserContext::anonymous(), Some("c1".to_string()))
            .await
            .unwrap();
        assert_eq!(api.calls_to("cycle_assignments").len(), 1);
    }

    #[test]
    fn test_table_falls_back_for_missing_refs() {
        let rendered = assignment_table(&[test_assignment("a1", "IN_PROGRESS")]).render();
        assert!(rendered.contains("Unknown employee"));
        assert!(rendered.contains("IN_PROGRESS"));
    }
}
