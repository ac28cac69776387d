//! Output formatting for CLI

use crate::pipeline::{EvaluationResult, TrainingResult};

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Format a number with thousands separators
pub fn format_number(n: usize) -> String {
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

/// Format a count together with its share as a percentage
pub fn format_share(count: usize, rate: f64) -> String {
    format!("{} ({:.1}%)", format_number(count), rate * 100.0)
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

pub fn print_training_result(result: &TrainingResult) {
    print_kv("Episodes", &format_number(result.total_episodes));
    print_kv("Wins", &format_share(result.wins, result.win_rate));
    print_kv("Draws", &format_share(result.draws, result.draw_rate));
    print_kv("Losses", &format_share(result.losses, result.loss_rate));
    print_kv("Final epsilon", &format!("{:.4}", result.final_epsilon));
    print_kv("Q-table size", &format_number(result.q_table_size));
    print_kv("Training time", &format!("{:.1}s", result.training_time_secs));
    if let Some(last) = result.win_rates.last() {
        print_kv("Last window win rate", &format!("{:.1}%", last * 100.0));
    }
    if result.stopped_early {
        print_kv("Stopped early", "yes");
    }
}

pub fn print_evaluation_result(result: &EvaluationResult) {
    print_kv("Agent plays", &result.agent_player.to_string());
    print_kv("Episodes", &format_number(result.episodes));
    print_kv("Wins", &format_share(result.wins, result.win_rate));
    print_kv("Draws", &format_share(result.draws, result.draw_rate));
    print_kv("Losses", &format_share(result.losses, result.loss_rate));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_format_share() {
        assert_eq!(format_share(50, 0.25), "50 (25.0%)");
    }
}
