//! End-to-end controller scenarios against a scripted generation service.
//!
//! Each test scripts the exact sequence of plan, execution and verdict
//! replies, so the number of generation calls is itself an assertion.

use solver::core::types::{FAILURE_MESSAGE, REASONING_CHAR_LIMIT, SolveStatus};
use solver::io::generation::GenerationError;
use solver::test_support::{
    ScriptedGenerator, ScriptedReply, attempt_replies, execution_json, verdict_json,
};
use solver::{Solver, solve};

fn check_names(result: &solver::FinalResult) -> Vec<String> {
    result
        .metadata
        .checks
        .iter()
        .map(|check| check.check_name.clone())
        .collect()
}

#[test]
fn pass_on_first_attempt_makes_three_calls() {
    let generator = ScriptedGenerator::new(attempt_replies(
        "1. Read\n2. Add 8 and 5",
        execution_json("13", "Tom starts with 8 pens and buys 5 more: 8 + 5 = 13."),
        verdict_json(true, &[("arithmetic", true), ("non_negative", true)]),
    ));

    let result = solve(&generator, "Tom has 8 pens and buys 5 more. How many?", 1)
        .expect("solve");

    assert_eq!(result.status, SolveStatus::Success);
    assert_eq!(result.answer, "13");
    assert_eq!(result.metadata.retries, 0);
    assert_eq!(result.metadata.plan.as_deref(), Some("1. Read\n2. Add 8 and 5"));
    assert_eq!(check_names(&result), vec!["arithmetic", "non_negative"]);
    assert_eq!(generator.calls(), 3);
    assert_eq!(generator.remaining(), 0);
}

#[test]
fn fail_then_pass_accumulates_checks_in_order() {
    let mut replies = attempt_replies(
        "plan one",
        execution_json("8", "wrong sum"),
        verdict_json(false, &[("first_arithmetic", false)]),
    );
    replies.extend(attempt_replies(
        "plan two",
        execution_json("9", "3 red + 6 green = 9"),
        verdict_json(true, &[("second_arithmetic", true)]),
    ));
    let generator = ScriptedGenerator::new(replies);

    let result = solve(&generator, "How many apples?", 1).expect("solve");

    assert_eq!(result.status, SolveStatus::Success);
    assert_eq!(result.answer, "9");
    assert_eq!(result.metadata.retries, 1);
    assert_eq!(result.metadata.plan.as_deref(), Some("plan two"));
    assert_eq!(
        check_names(&result),
        vec!["first_arithmetic", "second_arithmetic"]
    );
    assert_eq!(generator.calls(), 6);
}

#[test]
fn always_failing_verdicts_end_in_failed_status() {
    let mut replies = attempt_replies(
        "plan one",
        execution_json("4", "guess"),
        verdict_json(false, &[("check_a", false)]),
    );
    replies.extend(attempt_replies(
        "plan two",
        execution_json("5", "another guess"),
        verdict_json(false, &[("check_b", false)]),
    ));
    let generator = ScriptedGenerator::new(replies);

    let result = solve(&generator, "A meeting runs 10:00 to 9:00.", 1).expect("solve");

    assert_eq!(result.status, SolveStatus::Failed);
    assert_eq!(result.answer, "");
    assert_eq!(result.reasoning_visible_to_user, FAILURE_MESSAGE);
    assert_eq!(result.metadata.retries, 1);
    assert_eq!(check_names(&result), vec!["check_a", "check_b"]);
    assert_eq!(generator.calls(), 6);
}

#[test]
fn fenced_executor_reply_is_accepted() {
    let fenced = format!(
        "```json\n{}\n```",
        execution_json("2:15 PM", "Start 1:30 PM plus 45 minutes.")
    );
    let generator = ScriptedGenerator::new(attempt_replies(
        "1. Add the duration",
        fenced,
        verdict_json(true, &[("time_range", true)]),
    ));

    let result = solve(&generator, "When does the train arrive?", 0).expect("solve");

    assert_eq!(result.status, SolveStatus::Success);
    assert_eq!(result.answer, "2:15 PM");
}

#[test]
fn invalid_executor_reply_is_recorded_and_retried() {
    let mut replies = vec![
        ScriptedReply::text("plan one"),
        ScriptedReply::text("{\"proposed_answer\": \"9\", \"explanation\": "),
    ];
    replies.extend(attempt_replies(
        "plan two",
        execution_json("9", "3 + 6"),
        verdict_json(true, &[("arithmetic", true)]),
    ));
    let generator = ScriptedGenerator::new(replies);

    let result = solve(&generator, "How many apples?", 1).expect("solve");

    assert_eq!(result.status, SolveStatus::Success);
    assert_eq!(result.metadata.retries, 1);
    assert_eq!(check_names(&result), vec!["executor_response", "arithmetic"]);
    assert!(!result.metadata.checks[0].passed);
    // Attempt 0 never reached the verifier: 2 calls, then 3 for attempt 1.
    assert_eq!(generator.calls(), 5);
    let verifier_prompts = generator
        .prompts()
        .iter()
        .filter(|prompt| prompt.starts_with("[VERIFIER]"))
        .count();
    assert_eq!(verifier_prompts, 1);
}

#[test]
fn invalid_executor_reply_on_last_attempt_fails_without_error() {
    let generator = ScriptedGenerator::new(vec![
        ScriptedReply::text("plan"),
        ScriptedReply::text("not json at all"),
    ]);

    let result = solve(&generator, "q", 0).expect("solve");

    assert_eq!(result.status, SolveStatus::Failed);
    assert_eq!(result.metadata.retries, 0);
    assert_eq!(result.metadata.plan.as_deref(), Some("plan"));
    assert_eq!(check_names(&result), vec!["executor_response"]);
}

#[test]
fn malformed_verdict_is_recorded_as_verifier_response() {
    let generator = ScriptedGenerator::new(vec![
        ScriptedReply::text("plan"),
        ScriptedReply::Text(execution_json("1", "one")),
        ScriptedReply::text("{\"checks\": []}"),
    ]);

    let result = solve(&generator, "q", 0).expect("solve");

    assert_eq!(result.status, SolveStatus::Failed);
    assert_eq!(check_names(&result), vec!["verifier_response"]);
}

#[test]
fn service_failure_during_planning_is_retried() {
    let mut replies = vec![ScriptedReply::Fail(GenerationError::RateLimited {
        retry_after: Some(2),
    })];
    replies.extend(attempt_replies(
        "plan",
        execution_json("7", "3 + 4"),
        verdict_json(true, &[("arithmetic", true)]),
    ));
    let generator = ScriptedGenerator::new(replies);

    let result = solve(&generator, "q", 1).expect("solve");

    assert_eq!(result.status, SolveStatus::Success);
    assert_eq!(
        check_names(&result),
        vec!["generation_service", "arithmetic"]
    );
    assert!(
        result.metadata.checks[0]
            .details
            .starts_with("planner call failed:")
    );
    assert_eq!(generator.calls(), 4);
}

#[test]
fn plan_is_cleared_when_last_attempt_fails_in_planning() {
    let mut replies = attempt_replies(
        "plan one",
        execution_json("1", "x"),
        verdict_json(false, &[("a", false)]),
    );
    replies.push(ScriptedReply::Fail(GenerationError::Transport {
        message: "request timed out".to_string(),
        timed_out: true,
    }));
    let generator = ScriptedGenerator::new(replies);

    let result = solve(&generator, "q", 1).expect("solve");

    assert_eq!(result.status, SolveStatus::Failed);
    assert_eq!(result.metadata.retries, 1);
    assert!(result.metadata.plan.is_none());
    assert_eq!(check_names(&result), vec!["a", "generation_service"]);
}

#[test]
fn verifier_pass_flag_is_authoritative_over_individual_checks() {
    let generator = ScriptedGenerator::new(attempt_replies(
        "plan",
        execution_json("10", "ten"),
        verdict_json(true, &[("arithmetic", false)]),
    ));

    let result = solve(&generator, "q", 3).expect("solve");

    assert_eq!(result.status, SolveStatus::Success);
    assert_eq!(result.answer, "10");
}

#[test]
fn retries_never_exceed_the_bound() {
    for max_retries in 0..4u32 {
        let mut replies = Vec::new();
        for attempt in 0..=max_retries {
            replies.extend(attempt_replies(
                "plan",
                execution_json("x", "y"),
                verdict_json(false, &[(&format!("check_{attempt}"), false)]),
            ));
        }
        let generator = ScriptedGenerator::new(replies);

        let result = solve(&generator, "q", max_retries).expect("solve");

        assert_eq!(result.status, SolveStatus::Failed);
        assert_eq!(result.metadata.retries, max_retries);
        assert_eq!(result.metadata.checks.len(), max_retries as usize + 1);
        assert_eq!(generator.calls(), 3 * (max_retries as usize + 1));
    }
}

#[test]
fn long_explanations_are_cut_to_the_reasoning_limit() {
    let explanation = "é".repeat(REASONING_CHAR_LIMIT + 40);
    let generator = ScriptedGenerator::new(attempt_replies(
        "plan",
        execution_json("1", &explanation),
        verdict_json(true, &[("ok", true)]),
    ));

    let result = solve(&generator, "q", 0).expect("solve");

    assert_eq!(
        result.reasoning_visible_to_user.chars().count(),
        REASONING_CHAR_LIMIT
    );
}

#[test]
fn solver_can_be_reused_across_questions() {
    let mut replies = attempt_replies(
        "plan a",
        execution_json("1", "one"),
        verdict_json(true, &[("a", true)]),
    );
    replies.extend(attempt_replies(
        "plan b",
        execution_json("2", "two"),
        verdict_json(true, &[("b", true)]),
    ));
    let generator = ScriptedGenerator::new(replies);
    let solver = Solver::new(&generator).expect("solver");

    let first = solver.solve("first", 0).expect("first");
    let second = solver.solve("second", 0).expect("second");

    assert_eq!(first.answer, "1");
    assert_eq!(second.answer, "2");
    assert_eq!(check_names(&second), vec!["b"]);
}
