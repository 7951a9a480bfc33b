//! `intestacy questions`: print the question catalog and its transitions.

use anyhow::{Context, Result};
use intestacy_flow::{AnswerKind, Next, QuestionFlowEngine, QuestionId};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct QuestionRow {
    id: QuestionId,
    kind: AnswerKind,
    prompt: String,
    root: bool,
    yes: Option<Next>,
    no: Option<Next>,
}

pub fn run(engine: &QuestionFlowEngine, json: bool) -> Result<()> {
    print!("{}", render(engine, json)?);
    Ok(())
}

fn rows(engine: &QuestionFlowEngine) -> Vec<QuestionRow> {
    let catalog = engine.catalog();
    let table = engine.table();
    catalog
        .nodes()
        .map(|node| QuestionRow {
            id: node.id,
            kind: node.kind,
            prompt: node.prompt.clone(),
            root: node.id == catalog.root(),
            yes: table.next(node.id, true).ok(),
            no: table.next(node.id, false).ok(),
        })
        .collect()
}

pub(crate) fn render(engine: &QuestionFlowEngine, json: bool) -> Result<String> {
    let rows = rows(engine);
    if json {
        let mut out = serde_json::to_string_pretty(&rows).context("serializing questions")?;
        out.push('\n');
        return Ok(out);
    }

    let mut out = String::new();
    for row in &rows {
        let marker = if row.root { " (first)" } else { "" };
        out.push_str(&format!("{}{marker} [{}]\n", row.id, row.kind));
        out.push_str(&format!("  {}\n", row.prompt));
        match (row.yes, row.no) {
            (Some(yes), Some(no)) if yes == no => {
                out.push_str(&format!("  -> {yes}\n"));
            }
            (yes, no) => {
                let show = |n: Option<Next>| n.map_or("-".to_string(), |n| n.to_string());
                out.push_str(&format!("  yes -> {}\n", show(yes)));
                out.push_str(&format!("  no  -> {}\n", show(no)));
            }
        }
    }
    out.push_str(&format!("\n{} questions\n", rows.len()));
    Ok(out)
}
