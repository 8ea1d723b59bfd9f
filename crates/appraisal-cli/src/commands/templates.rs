//! Template commands.

use anyhow::{Context, Result};
use appraisal_client::PerformanceApi;
use appraisal_client::fetch::load_templates;
use appraisal_core::ResourceId;
use appraisal_core::template::Template;
use tracing::info;

use super::{Table, loaded};

pub async fn list(api: &dyn PerformanceApi) -> Result<()> {
    let templates = loaded(load_templates(api).await)?;
    if templates.is_empty() {
        println!("No templates found.");
    } else {
        print!("{}", template_table(&templates).render());
    }
    Ok(())
}

fn template_table(templates: &[Template]) -> Table {
    let mut table = Table::new(&["ID", "NAME", "TYPE", "SCALE", "CRITERIA", "ACTIVE"]);
    for template in templates {
        table.row(vec![
            template.id.to_string(),
            template.name.clone(),
            template.template_type.title().to_string(),
            template.rating_scale.scale_type.title().to_string(),
            template.criteria.len().to_string(),
            if template.is_active { "yes" } else { "no" }.to_string(),
        ]);
    }
    table
}

pub async fn show(api: &dyn PerformanceApi, id: &str) -> Result<()> {
    let template = api
        .get_template(&ResourceId::from(id))
        .await
        .with_context(|| format!("Failed to load template {id}"))?;
    let scale = &template.rating_scale;

    println!("{}", template.name);
    if let Some(description) = &template.description {
        println!("  {description}");
    }
    println!();
    println!("Type:   {}", template.template_type.title());
    println!("Active: {}", if template.is_active { "yes" } else { "no" });
    println!("Scale:  {} ({} to {})", scale.scale_type.title(), scale.min, scale.max);
    if !scale.labels.is_empty() {
        println!("Labels: {}", scale.labels.join(", "));
    }
    if let Some(instructions) = &template.instructions {
        println!();
        println!("{instructions}");
    }

    println!();
    let mut table = Table::new(&["KEY", "TITLE", "WEIGHT", "MAX", "REQUIRED"]);
    for criterion in &template.criteria {
        table.row(vec![
            criterion.key.clone(),
            criterion.title.clone(),
            number(criterion.weight),
            number(criterion.max_score),
            if criterion.required { "yes" } else { "no" }.to_string(),
        ]);
    }
    if table.is_empty() {
        println!("No criteria.");
    } else {
        print!("{}", table.render());
        println!("Total weight: {}", template.total_weight());
    }
    Ok(())
}

fn number(value: Option<f64>) -> String {
    value.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string())
}

pub async fn delete(api: &dyn PerformanceApi, id: &str) -> Result<()> {
    api.delete_template(&ResourceId::from(id))
        .await
        .with_context(|| format!("Failed to delete template {id}"))?;
    info!(template = id, "template deleted");
    println!("Template deleted successfully");
    Ok(())
}
