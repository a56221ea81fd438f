use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::time::Duration;

use crate::simulation::SimulationSummary;

pub fn generate_console_report(
    writer: &mut impl Write,
    summary: &SimulationSummary,
    verbose: bool,
    total_duration: Duration,
) -> Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", "🚂 Simulation Summary".bright_cyan().bold())?;
    writeln!(writer, "{}", "=====================".cyan())?;
    writeln!(writer, "Seed: {}", summary.seed)?;
    writeln!(writer, "Turns played: {}", summary.turns)?;
    writeln!(
        writer,
        "Goals completed: {}",
        summary.completed_goals().to_string().green()
    )?;
    writeln!(writer, "Total time: {total_duration:?}")?;
    writeln!(writer)?;

    if verbose {
        for report in &summary.reports {
            if let Some(blocked) = &report.newly_blocked {
                writeln!(
                    writer,
                    "Turn {:>3}: {} {}",
                    report.turn,
                    "blocked".red(),
                    blocked
                )?;
            }
            for completion in &report.completions {
                writeln!(
                    writer,
                    "Turn {:>3}: {} {} with {} (+{})",
                    report.turn,
                    completion.player.to_string().bold(),
                    completion.goal,
                    completion.train,
                    completion.points.to_string().green()
                )?;
            }
        }
        writeln!(writer)?;
    }

    for player in &summary.players {
        writeln!(
            writer,
            "{}: {} points, {} goal(s) completed",
            player.player.to_string().bold(),
            player.score.to_string().green(),
            player.completed_goals
        )?;
        for goal in &player.open_goals {
            writeln!(writer, "   • {goal}")?;
        }
    }

    if let Some(winner) = summary.players.iter().max_by_key(|player| player.score) {
        writeln!(writer)?;
        writeln!(
            writer,
            "{} {}",
            "🏆 Leader:".bright_yellow().bold(),
            winner.player
        )?;
    }
    Ok(())
}

pub fn generate_json_report(writer: &mut impl Write, summary: &SimulationSummary) -> Result<()> {
    let json_output = serde_json::to_string_pretty(summary)?;
    writeln!(writer, "{json_output}")?;
    Ok(())
}
