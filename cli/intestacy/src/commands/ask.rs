//! `intestacy ask`: interactive question loop.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use intestacy_flow::{AnswerKind, FlowError, QuestionFlowEngine, QuestionNode, Step};

use super::render_result;

const RESTART: &str = "restart";
const QUIT: &str = "quit";

pub fn run(engine: &QuestionFlowEngine, json: bool) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    interact(engine, stdin.lock(), stdout.lock(), json)
}

/// Drive one session over any line-based input and output.
pub(crate) fn interact<R: BufRead, W: Write>(
    engine: &QuestionFlowEngine,
    input: R,
    mut out: W,
    json: bool,
) -> Result<()> {
    let mut session = engine.start_session();
    writeln!(
        out,
        "UK Intestacy Calculator. Type '{RESTART}' to start over or '{QUIT}' to leave.\n"
    )?;
    if let Some(node) = engine.current_question(&session) {
        prompt(&mut out, node)?;
    }

    for line in input.lines() {
        let line = line.context("reading answer")?;
        let raw = line.trim();

        if raw.eq_ignore_ascii_case(QUIT) {
            return Ok(());
        }
        if raw.eq_ignore_ascii_case(RESTART) {
            engine.reset(&mut session);
            writeln!(out, "\nStarting over.\n")?;
            if let Some(node) = engine.current_question(&session) {
                prompt(&mut out, node)?;
            }
            continue;
        }
        if session.is_resolved() {
            writeln!(out, "Type '{RESTART}' to begin again or '{QUIT}' to leave.")?;
            continue;
        }

        match engine.answer_raw(&mut session, raw) {
            Ok(Step::Question(node)) => prompt(&mut out, &node)?,
            Ok(Step::Resolution(result)) => {
                writeln!(out, "\n{}", render_result(&result, json)?)?;
                writeln!(out, "Type '{RESTART}' to begin again or '{QUIT}' to leave.")?;
            }
            Err(e) if e.is_recoverable() => {
                writeln!(out, "{e}")?;
                if let Some(node) = engine.current_question(&session) {
                    prompt(&mut out, node)?;
                }
            }
            Err(e) => return Err(abort(e)),
        }
    }
    Ok(())
}

fn abort(e: FlowError) -> anyhow::Error {
    anyhow::Error::new(e).context("the distribution could not be calculated")
}

fn prompt<W: Write>(out: &mut W, node: &QuestionNode) -> Result<()> {
    let hint = match node.kind {
        AnswerKind::Boolean => "[yes/no]",
        AnswerKind::Amount => "£",
        AnswerKind::Count => "(number)",
    };
    write!(out, "{} {hint} ", node.prompt)?;
    out.flush()?;
    Ok(())
}
