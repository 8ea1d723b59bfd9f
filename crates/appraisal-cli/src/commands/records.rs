//! Appraisal record commands: publishing, submission and acknowledgement.

use anyhow::{Context, Result};
use appraisal_client::PerformanceApi;
use appraisal_client::fetch::load_publish_queue;
use appraisal_core::ResourceId;
use appraisal_core::form::AcknowledgeForm;
use tracing::info;

use super::{Table, date, loaded, score};

pub async fn publish_queue(api: &dyn PerformanceApi) -> Result<()> {
    let records = loaded(load_publish_queue(api).await)?;
    if records.is_empty() {
        println!("No appraisals are waiting to be published.");
        return Ok(());
    }

    let mut table = Table::new(&["ID", "EMPLOYEE", "CYCLE", "TEMPLATE", "SCORE", "RATING", "SUBMITTED"]);
    for r in &records {
        table.row(vec![
            r.id.to_string(),
            r.employee_name(),
            r.cycle_name(),
            r.template_name(),
            score(r.total_score),
            r.overall_rating_label.clone().unwrap_or_else(|| "-".to_string()),
            date(r.manager_submitted_at),
        ]);
    }
    print!("{}", table.render());
    Ok(())
}

pub async fn publish(api: &dyn PerformanceApi, id: &str) -> Result<()> {
    api.publish_record(&ResourceId::from(id))
        .await
        .with_context(|| format!("Failed to publish appraisal {id}"))?;
    info!(record = id, "appraisal published");
    println!("Appraisal published successfully");
    Ok(())
}

pub async fn submit(api: &dyn PerformanceApi, id: &str) -> Result<()> {
    api.submit_record(&ResourceId::from(id))
        .await
        .with_context(|| format!("Failed to submit appraisal {id}"))?;
    info!(record = id, "appraisal submitted");
    println!("Evaluation submitted successfully");
    Ok(())
}

pub async fn acknowledge(api: &dyn PerformanceApi, id: &str, comment: Option<String>) -> Result<()> {
    let form = AcknowledgeForm {
        comment: comment.unwrap_or_default(),
    };
    api.acknowledge_record(&ResourceId::from(id), &form.to_payload())
        .await
        .with_context(|| format!("Failed to acknowledge appraisal {id}"))?;
    info!(record = id, "appraisal acknowledged");
    println!("Appraisal acknowledged");
    Ok(())
}

pub async fn show(api: &dyn PerformanceApi, id: &str) -> Result<()> {
    let record = api
        .get_record(&ResourceId::from(id))
        .await
        .with_context(|| format!("Failed to load appraisal {id}"))?;

    println!("{} / {}", record.employee_name(), record.cycle_name());
    println!();
    println!("Template:     {}", record.template_name());
    println!("Status:       {}", record.status);
    println!("Total score:  {}", score(record.total_score));
    println!(
        "Rating:       {}",
        record.overall_rating_label.as_deref().unwrap_or("-")
    );
    println!("Submitted:    {}", date(record.manager_submitted_at));
    println!("Published:    {}", date(record.publication_time()));
    println!("Acknowledged: {}", date(record.acknowledged_at));

    if !record.ratings.is_empty() {
        println!();
        let mut table = Table::new(&["CRITERION", "SCORE", "COMMENT"]);
        for rating in &record.ratings {
            table.row(vec![
                rating.key.clone(),
                rating.score.to_string(),
                rating.comment.clone(),
            ]);
        }
        print!("{}", table.render());
    }

    if let Some(summary) = record.summary() {
        println!();
        println!("Summary: {summary}");
    }
    for strength in &record.strengths {
        println!("  + {strength}");
    }
    for area in &record.improvement_areas {
        println!("  - {area}");
    }
    Ok(())
}
