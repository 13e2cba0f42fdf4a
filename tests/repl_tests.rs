use std::io::Cursor;

use holiday_assistant::ollama::StructuredResponse;
use holiday_assistant::repl::{ASSISTANT_LABEL, GREETING, USER_PROMPT};
use holiday_assistant::{run_repl, Assistant};

mod common;
use common::{harness, FixedHolidays, RecordingChat, ScriptedModel};

#[ctor::ctor]
fn _init() {
    common::init();
}

/// Runs a session over `input` and returns the transcript and the number of model turns.
fn session(input: &str) -> (String, usize) {
    let h = harness(
        ScriptedModel::replying(StructuredResponse::PlainText(String::new())),
        RecordingChat::replying("Olá!"),
        FixedHolidays::christmas(),
    );
    let model = h.model.clone();
    let assistant = Assistant::new(h.orchestrator);

    let mut out = Vec::new();
    run_repl(&assistant, Cursor::new(input), &mut out).unwrap();
    (String::from_utf8(out).unwrap(), model.calls())
}

#[test]
fn transcript_frames_questions_and_answers() {
    let (transcript, turns) = session("Oi\nTudo bem?\nsair\n");
    assert_eq!(
        transcript,
        format!("{GREETING}\n{USER_PROMPT}{ASSISTANT_LABEL}Olá!\n{USER_PROMPT}{ASSISTANT_LABEL}Olá!\n{USER_PROMPT}")
    );
    assert_eq!(transcript.matches("MELISSA: Olá!").count(), 2);
    assert!(transcript.starts_with("Faça uma pergunta à Melissa:\nVOCÊ: "));
    assert_eq!(turns, 2);
}

#[test]
fn sair_stops_before_later_lines() {
    let (transcript, turns) = session("Oi\nsair\nAinda está aí?\n");
    assert_eq!(turns, 1);
    assert!(transcript.ends_with(&format!("{ASSISTANT_LABEL}Olá!\n{USER_PROMPT}")));
}

#[test]
fn exit_stops_the_loop() {
    let (transcript, turns) = session("  exit  \nOi\n");
    assert_eq!(turns, 0);
    assert_eq!(transcript, format!("{GREETING}\n{USER_PROMPT}"));
}

#[test]
fn end_of_input_stops_the_loop() {
    let (transcript, turns) = session("Oi");
    assert_eq!(turns, 1);
    assert_eq!(transcript, format!("{GREETING}\n{USER_PROMPT}{ASSISTANT_LABEL}Olá!\n{USER_PROMPT}"));

    let (transcript, turns) = session("");
    assert_eq!(turns, 0);
    assert_eq!(transcript, format!("{GREETING}\n{USER_PROMPT}"));
}

#[test]
fn blank_lines_are_skipped_without_a_model_call() {
    let (transcript, turns) = session("\n   \nOi\n");
    assert_eq!(turns, 1);
    assert_eq!(
        transcript,
        format!("{GREETING}\n{USER_PROMPT}{USER_PROMPT}{USER_PROMPT}{ASSISTANT_LABEL}Olá!\n{USER_PROMPT}")
    );
}
