//! Output formatting for CLI

use anyhow::Result;

use crate::{
    cli::config::OutputFormat,
    csp::queens,
    scenario::{Algorithm, ScenarioOutcome},
};

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a subsection header
pub fn print_subsection(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(40));
}

/// Format a number with thousands separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i.is_multiple_of(3) {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: impl std::fmt::Display) {
    println!("  {:24} {}", format!("{key}:"), value);
}

fn format_state(state: &[f64]) -> String {
    let parts: Vec<String> = state.iter().map(|v| format!("{v:.2}")).collect();
    format!("[{}]", parts.join(", "))
}

/// Write an outcome in the requested format.
pub fn emit(outcome: &ScenarioOutcome, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(outcome)?),
        OutputFormat::Text => print_outcome(outcome),
    }
    Ok(())
}

/// Plain-text summary of an outcome.
pub fn print_outcome(outcome: &ScenarioOutcome) {
    let algorithm = outcome.algorithm();
    print_section(&format!(
        "Level {}: {}",
        algorithm.level(),
        algorithm.description()
    ));

    match outcome {
        ScenarioOutcome::AStar(result) => {
            print_kv("found", result.found());
            if let Some(goal) = result.goal {
                print_kv("goal", goal);
                print_kv("steps", result.steps());
                print_kv("cost", result.cost);
            }
            print_kv("nodes expanded", result.nodes_expanded);
            print_kv("nodes generated", result.nodes_generated);
            print_kv("optimal", result.optimality_guaranteed);
            if result.found() {
                let path: Vec<String> = result.path.iter().map(ToString::to_string).collect();
                print_subsection("Path");
                println!("  {}", path.join(" -> "));
            }
        }
        ScenarioOutcome::AlphaBeta(result) => {
            print_kv("value", result.value);
            if let Some(best) = result.best_move {
                print_kv("best move", best);
            }
            print_kv("nodes visited", result.stats.nodes_visited);
            print_kv("nodes pruned", result.stats.nodes_pruned);
            print_kv("cutoffs", result.stats.cutoffs);
            if !result.substitutions.is_empty() {
                print_subsection("Teaching moves");
                for substitution in &result.substitutions {
                    println!("  {substitution}");
                }
            }
        }
        ScenarioOutcome::Bayes(outcome) => {
            let evidence = if outcome.evidence.is_empty() {
                "(none)".to_string()
            } else {
                outcome.evidence.to_string()
            };
            print_kv("evidence", evidence);
            print_kv("P(outcome | e)", format!("{:.4}", outcome.query.probability));
            print_kv(
                "P(mediator | e)",
                format!("{:.4}", outcome.query.mediator_probability),
            );
            print_kv("P(e)", format!("{:.4}", outcome.query.evidence_probability));
            if let Some(marginal) = &outcome.marginal {
                print_kv(
                    &format!("P({} | e)", marginal.variable),
                    format!("{:.4}", marginal.probability),
                );
            }
        }
        ScenarioOutcome::Hanoi(solution) => {
            print_kv("disks", solution.disks);
            print_kv("moves", format_number(solution.total_moves));
            print_subsection("Moves");
            for (i, step) in solution.moves.iter().enumerate() {
                println!("  {:>4}. disk {} {} -> {}", i + 1, step.disk, step.from, step.to);
            }
        }
        ScenarioOutcome::NQueens(result) => {
            print_kv("n", result.n);
            print_kv("solutions", result.solutions.len());
            print_kv("squares checked", format_number(result.stats.squares_checked));
            print_kv("placements", format_number(result.stats.placements));
            print_kv("backtracks", format_number(result.stats.backtracks));
            if let Some(first) = result.first() {
                print_subsection(&format!("Columns {first:?}"));
                println!("{}", queens::render(first));
            }
        }
        ScenarioOutcome::HillClimbing(result) => {
            print_kv("best score", format!("{:.4}", result.best_score));
            print_kv("best state", format_state(&result.best_state));
            print_kv("local maxima", result.local_maxima);
            print_kv("total iterations", result.total_iterations);
            print_subsection("Climbs");
            for (i, climb) in result.climbs.iter().enumerate() {
                println!(
                    "  {}. {} -> {} score {:.4} after {} steps ({:?})",
                    i + 1,
                    format_state(&climb.start),
                    format_state(&climb.state),
                    climb.score,
                    climb.iterations,
                    climb.reason
                );
            }
        }
        ScenarioOutcome::BackwardChaining(result) => {
            print_kv("goal", &result.goal);
            print_kv("proven", result.proven);
            for instance in result.instances() {
                if instance != result.goal {
                    print_kv("answer", instance);
                }
            }
            print_subsection("Proof trace");
            for step in &result.trace {
                println!("  {step}");
            }
        }
        ScenarioOutcome::BlocksWorld(plan) => {
            print_kv("steps", plan.steps());
            print_subsection("Plan");
            for (i, step) in plan.moves.iter().enumerate() {
                println!("  {}. {step}", i + 1);
            }
            print_subsection("Final state");
            for (block, support) in &plan.final_state {
                println!("  {block} on {support}");
            }
        }
        ScenarioOutcome::ForwardChaining(result) => {
            print_kv("passes", result.iterations);
            print_kv("fixed point", result.reached_fixed_point);
            print_kv("facts", result.facts.len());
            print_subsection("Inferences");
            for inference in &result.inferences {
                println!(
                    "  pass {}: {} => {}",
                    inference.pass, inference.rule, inference.conclusion
                );
            }
        }
        ScenarioOutcome::Mdp(outcome) => {
            let solution = &outcome.solution;
            print_kv("converged", solution.converged);
            print_kv("iterations", solution.iterations);
            if let Some(delta) = solution.final_delta() {
                print_kv("final delta", format!("{delta:.6}"));
            }
            print_subsection("Policy");
            for (state, value) in &solution.values {
                let action = solution
                    .policy
                    .get(state)
                    .map_or("-", |a| a.as_str());
                println!("  {:16} {:20} V = {:.2}", state.as_str(), action, value);
            }
            if let Some(trajectory) = &outcome.trajectory {
                print_subsection("Simulation");
                for step in &trajectory.steps {
                    println!(
                        "  {} --{}--> {} ({:+})",
                        step.state, step.action, step.next, step.reward
                    );
                }
                print_kv("total reward", trajectory.total_reward);
                print_kv("stopped", format!("{:?}", trajectory.stop));
            }
        }
        ScenarioOutcome::Sudoku(result) => {
            print_kv("solved", result.solution.is_some());
            print_kv("guesses", format_number(result.stats.guesses));
            print_kv("backtracks", format_number(result.stats.backtracks));
            if let Some(solution) = &result.solution {
                println!("\n{solution}");
            }
        }
    }
}

/// Table of levels for `list`.
pub fn print_levels() {
    print_section("Levels");
    for algorithm in Algorithm::ALL {
        println!(
            "  {:>2}  {:18} {}",
            algorithm.level(),
            algorithm.as_str(),
            algorithm.description()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_thousands() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1_048_575), "1,048,575");
    }

    #[test]
    fn formats_states() {
        assert_eq!(format_state(&[1.0, 2.5]), "[1.00, 2.50]");
    }
}
