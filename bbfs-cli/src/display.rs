use comfy_table::{Table, ContentArrangement, presets::UTF8_FULL, Cell, Color};
use textplots::Plot;

use crate::import::ImportResult;
use bbfs_db::models::{Draw, Market};
use bbfs_engine::backtest::{BacktestReport, Grade};
use bbfs_engine::scorer::Prediction;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn format_digits(digits: &[u8]) -> String {
    digits
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join("  ")
}

fn grade_color(grade: Grade) -> Color {
    match grade {
        Grade::Good => Color::Green,
        Grade::Fair => Color::Yellow,
        Grade::Poor => Color::Red,
    }
}

pub fn display_markets(counts: &[(Market, usize)]) {
    let mut table = new_table();
    table.set_header(vec!["#", "Market", "Code", "Results"]);
    for (market, count) in counts {
        table.add_row(vec![
            market.menu_key(),
            market.label(),
            market.code(),
            &count.to_string(),
        ]);
    }
    println!("{table}");
}

/// Shows the last `last` results, most recent first.
pub fn display_history(market: Market, history: &[Draw], last: usize) {
    if history.is_empty() {
        println!("No results recorded for {market}.");
        return;
    }

    println!("\n── {} ({} results) ──", market, history.len());
    let mut table = new_table();
    table.set_header(vec!["#", "Result", "Head", "Tail"]);

    for (i, draw) in history.iter().enumerate().rev().take(last) {
        table.add_row(vec![
            (i + 1).to_string(),
            draw.to_string(),
            draw.head().to_string(),
            format!("{:02}", draw.tail()),
        ]);
    }
    println!("{table}");
}

pub fn display_prediction(market: Market, prediction: &Prediction) {
    println!("\n🎯 {market}");

    let mut table = new_table();
    table.set_header(vec![Cell::new("BBFS 8 DIGIT").fg(Color::Green)]);
    table.add_row(vec![Cell::new(format_digits(&prediction.digits)).fg(Color::Yellow)]);
    println!("{table}");

    if !prediction.ranking.is_empty() {
        let mut table = new_table();
        table.set_header(vec!["Rank", "Digit", "Score", "Picked"]);
        for (i, &(digit, score)) in prediction.ranking.iter().enumerate() {
            let picked = prediction.contains(digit);
            let color = if picked { Color::Green } else { Color::White };
            table.add_row(vec![
                Cell::new(i + 1),
                Cell::new(digit).fg(color),
                Cell::new(score),
                Cell::new(if picked { "✓" } else { "" }).fg(color),
            ]);
        }
        println!("{table}");
    }

    println!("\n💡 Rationale:");
    for line in &prediction.rationale {
        println!("   • {line}");
    }
}

pub fn display_backtest(market: Market, report: &BacktestReport, show_steps: bool) {
    println!("\n🔍 Backtest {} | {}: are the {} digits in the BBFS?\n",
        report.mode, market, report.mode);

    if show_steps {
        let mut table = new_table();
        table.set_header(vec!["", "Previous", "Actual", "Checked", "BBFS"]);
        for step in &report.steps {
            let (mark, color) = if step.hit { ("✅", Color::Green) } else { ("❌", Color::Red) };
            table.add_row(vec![
                Cell::new(mark),
                Cell::new(step.previous),
                Cell::new(step.actual).fg(color),
                Cell::new(step.checked.iter().map(u8::to_string).collect::<String>()),
                Cell::new(format_digits(&step.bbfs)),
            ]);
        }
        println!("{table}");
    }

    let mut table = new_table();
    table.set_header(vec!["Mode", "Hits", "Total", "Accuracy"]);
    table.add_row(vec![
        Cell::new(report.mode),
        Cell::new(report.hits),
        Cell::new(report.total),
        Cell::new(format!("{:.1}%", report.accuracy)).fg(grade_color(report.grade())),
    ]);
    println!("{table}");
}

pub fn display_backtest_chart(report: &BacktestReport) {
    println!("\n== Cumulative accuracy (%) ==\n");

    let points: Vec<(f32, f32)> = report
        .cumulative_accuracy()
        .iter()
        .enumerate()
        .map(|(i, &acc)| ((i + 1) as f32, acc as f32))
        .collect();

    if points.len() < 2 {
        println!("  (Not enough steps to plot)");
        return;
    }

    let x_max = points.len() as f32;
    let shape = textplots::Shape::Lines(&points);
    let mut chart = textplots::Chart::new_with_y_range(120, 40, 1.0, x_max, 0.0, 100.0);
    println!("{}", chart.lineplot(&shape));
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import finished:");
    println!("  Records read : {}", result.total_records);
    println!("  Added        : {}", result.added);
    if result.rejected > 0 {
        println!("  Rejected     : {}", result.rejected);
    }
}
