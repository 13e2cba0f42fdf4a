//! Line-oriented conversation loop used by the `melissa` binary.

use std::io::{BufRead, Write};

use color_eyre::Result;
use tracing::info;

use crate::Assistant;

pub const GREETING: &str = "Faça uma pergunta à Melissa:";
pub const USER_PROMPT: &str = "VOCÊ: ";
pub const ASSISTANT_LABEL: &str = "MELISSA: ";

/// Words that end the session.
const EXIT_WORDS: [&str; 2] = ["sair", "exit"];

/// Ask, answer, repeat until an exit word or end of input. Blank lines are ignored.
pub fn run_repl(assistant: &Assistant, input: impl BufRead, mut out: impl Write) -> Result<()> {
    writeln!(out, "{GREETING}")?;
    let mut turns = 0usize;
    let mut lines = input.lines();
    loop {
        write!(out, "{USER_PROMPT}")?;
        out.flush()?;

        let Some(line) = lines.next() else { break };
        let question = line?;
        let question = question.trim();
        if question.is_empty() {
            continue;
        }
        if EXIT_WORDS.contains(&question) {
            break;
        }

        let answer = assistant.get_answer(question);
        writeln!(out, "{ASSISTANT_LABEL}{answer}")?;
        turns += 1;
    }
    info!(target: "assistant", turns, "repl finished");
    Ok(())
}
