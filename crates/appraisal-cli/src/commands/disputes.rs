//! Dispute commands.

use anyhow::{Context, Result};
use appraisal_client::PerformanceApi;
use appraisal_client::fetch::load_disputes;
use appraisal_core::ResourceId;
use appraisal_core::dispute::{Dispute, DisputeStatus};
use appraisal_core::form::{ResolutionAction, ResolutionForm};
use tracing::info;

use super::{Table, date, loaded, score};

/// Arguments of `disputes resolve`.
pub struct Resolution {
    pub action: String,
    pub summary: String,
    pub score: Option<String>,
    pub label: Option<String>,
}

pub async fn list(api: &dyn PerformanceApi, status: Option<String>) -> Result<()> {
    let status = status
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.to_uppercase().parse::<DisputeStatus>())
        .transpose()?;
    let disputes = loaded(load_disputes(api, status).await)?;

    if disputes.is_empty() {
        println!("No disputes found.");
    } else {
        print!("{}", dispute_table(&disputes).render());
    }
    Ok(())
}

fn dispute_table(disputes: &[Dispute]) -> Table {
    let mut table = Table::new(&["ID", "EMPLOYEE", "REASON", "STATUS", "FILED"]);
    for d in disputes {
        table.row(vec![
            d.id.to_string(),
            d.employee_name(),
            d.reason_excerpt(60),
            d.status.title().to_string(),
            date(d.created_at.or(d.submitted_at)),
        ]);
    }
    table
}

pub async fn show(api: &dyn PerformanceApi, id: &str) -> Result<()> {
    let dispute = fetch(api, id).await?;
    let item = dispute.disputed_item();

    println!("Dispute from {}", dispute.employee_name());
    println!();
    println!("Status:         {}", dispute.status.title());
    println!("Filed:          {}", date(dispute.created_at.or(dispute.submitted_at)));
    println!("Reason:         {}", dispute.reason);
    if let Some(details) = &dispute.details {
        println!("Details:        {details}");
    }
    println!("Current score:  {}", score(item.and_then(|i| i.total_score)));
    println!(
        "Current rating: {}",
        item.and_then(|i| i.overall_rating_label.as_deref()).unwrap_or("-")
    );

    if let Some(summary) = &dispute.resolution_summary {
        println!();
        println!("Resolution:     {summary}");
        println!("Adjusted score: {}", score(dispute.adjusted_score));
        println!(
            "Adjusted label: {}",
            dispute.adjusted_rating_label.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

pub async fn resolve(api: &dyn PerformanceApi, id: &str, resolution: Resolution) -> Result<()> {
    let dispute = fetch(api, id).await?;
    if !dispute.status.is_resolvable() {
        anyhow::bail!(
            "Dispute {id} is already {}",
            dispute.status.title().to_lowercase()
        );
    }

    let form = ResolutionForm {
        action: resolution.action.parse::<ResolutionAction>()?,
        adjusted_score: resolution.score.unwrap_or_default(),
        adjusted_rating_label: resolution.label.unwrap_or_default(),
        resolution_summary: resolution.summary,
    };
    let payload = form.to_payload()?;

    api.resolve_dispute(&dispute.id, &payload)
        .await
        .with_context(|| format!("Failed to resolve dispute {id}"))?;
    info!(dispute = id, action = payload.action.as_str(), "dispute resolved");
    println!("Dispute resolved successfully");
    Ok(())
}

async fn fetch(api: &dyn PerformanceApi, id: &str) -> Result<Dispute> {
    api.get_dispute(&ResourceId::from(id))
        .await
        .with_context(|| format!("Failed to load dispute {id}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use appraisal_client::mock::MockPerformanceApi;

    fn dispute(id: &str, status: &str) -> Dispute {
        serde_json::from_value(serde_json::json!({
            "_id": id, "reason": "Q3 work ignored", "status": status
        }))
        .unwrap()
    }

    fn approve(summary: &str) -> Resolution {
        Resolution {
            action: "approve".to_string(),
            summary: summary.to_string(),
            score: Some("4.5".to_string()),
            label: Some("Exceeds".to_string()),
        }
    }

    #[tokio::test]
    async fn test_resolve_open_dispute() {
        let api = MockPerformanceApi::new().with_dispute(dispute("d1", "OPEN"));
        resolve(&api, "d1", approve("Score corrected")).await.unwrap();

        let calls = api.calls_to("resolve_dispute");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].target.as_deref(), Some("d1"));
    }

    #[tokio::test]
    async fn test_closed_dispute_is_not_resolved() {
        let api = MockPerformanceApi::new().with_dispute(dispute("d2", "REJECTED"));
        let err = resolve(&api, "d2", approve("Again")).await.unwrap_err();
        assert!(err.to_string().contains("already"));
        assert!(api.calls_to("resolve_dispute").is_empty());
    }

    #[tokio::test]
    async fn test_blank_summary_is_rejected_locally() {
        let api = MockPerformanceApi::new().with_dispute(dispute("d3", "UNDER_REVIEW"));
        let err = resolve(&api, "d3", approve("  ")).await.unwrap_err();
        assert_eq!(err.to_string(), "Resolution summary is required");
        assert!(api.calls_to("resolve_dispute").is_empty());
    }

    #[tokio::test]
    async fn test_unknown_status_filter() {
        let api = MockPerformanceApi::new();
        assert!(list(&api, Some("pending".to_string())).await.is_err());
        assert_eq!(api.call_count(), 0);
    }
}
