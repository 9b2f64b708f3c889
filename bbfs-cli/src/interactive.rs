use anyhow::Result;

use bbfs_db::models::Market;
use bbfs_db::store::HistoryStore;
use bbfs_engine::backtest::BacktestMode;

use super::prompt;

#[derive(Debug, PartialEq)]
enum MenuCommand {
    Record(Market),
    Predict,
    Backtest(BacktestMode),
    Clear,
    Markets,
    Quit,
}

fn parse_command(input: &str) -> Option<MenuCommand> {
    match input.trim().to_lowercase().as_str() {
        "1" => Some(MenuCommand::Record(Market::HongkongPools)),
        "2" => Some(MenuCommand::Record(Market::SydneyPools)),
        "3" => Some(MenuCommand::Record(Market::HongkongLotto)),
        "4" => Some(MenuCommand::Record(Market::SydneyLotto)),
        "5" | "predict" | "pred" => Some(MenuCommand::Predict),
        "6" | "bt2d" | "2d" => Some(MenuCommand::Backtest(BacktestMode::TwoD)),
        "7" | "bt3d" | "3d" => Some(MenuCommand::Backtest(BacktestMode::ThreeD)),
        "8" | "clear" | "delete" => Some(MenuCommand::Clear),
        "m" | "markets" | "list" => Some(MenuCommand::Markets),
        "9" | "quit" | "q" | "exit" => Some(MenuCommand::Quit),
        _ => None,
    }
}

fn display_menu(store: &dyn HistoryStore) -> Result<()> {
    let counts = super::market_counts(store)?;
    println!();
    println!("🌏 BBFS 8 DIGIT");
    println!();
    println!("── Markets (add results) ──");
    for (market, count) in &counts {
        println!("  {}. {} ({} results)", market.menu_key(), market, count);
    }
    println!();
    println!("── Actions ──");
    println!("  5. predict    BBFS 8 digits");
    println!("  6. bt2d       Backtest 2D");
    println!("  7. bt3d       Backtest 3D");
    println!("  8. clear      Delete market data");
    println!("  9. quit       Quit");
    println!();
    Ok(())
}

fn pick_market(store: &dyn HistoryStore, action: &str) -> Result<Option<Market>> {
    println!("\nPick a market to {action}:");
    for (market, count) in super::market_counts(store)? {
        println!("  {}. {} ({} results)", market.menu_key(), market, count);
    }
    let Some(input) = prompt("> ")? else {
        return Ok(None);
    };
    match input.parse::<Market>() {
        Ok(market) => Ok(Some(market)),
        Err(_) => {
            println!("Invalid choice!");
            Ok(None)
        }
    }
}

fn run_command(store: &dyn HistoryStore, command: MenuCommand) -> Result<()> {
    match command {
        MenuCommand::Record(market) => super::cmd_add(store, market, &[]),
        MenuCommand::Predict => match pick_market(store, "predict")? {
            Some(market) => super::cmd_predict(store, market),
            None => Ok(()),
        },
        MenuCommand::Backtest(mode) => match pick_market(store, &format!("backtest {mode}"))? {
            Some(market) => super::cmd_backtest(store, market, mode, None, false, true),
            None => Ok(()),
        },
        MenuCommand::Clear => match pick_market(store, "clear")? {
            Some(market) => super::cmd_clear(store, market, false),
            None => Ok(()),
        },
        MenuCommand::Markets => super::cmd_markets(store),
        MenuCommand::Quit => Ok(()),
    }
}

pub fn run_interactive(store: &dyn HistoryStore) -> Result<()> {
    loop {
        display_menu(store)?;
        let Some(input) = prompt("Choose: ")? else {
            break;
        };

        if input.is_empty() {
            continue;
        }

        match parse_command(&input) {
            Some(MenuCommand::Quit) => {
                println!("Good luck on every market! 🍀");
                break;
            }
            Some(command) => {
                if let Err(e) = run_command(store, command) {
                    println!("Error: {e:#}");
                }
            }
            None => {
                println!("Unknown choice: '{}'. Pick 1-9.", input);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_markets() {
        assert_eq!(parse_command("1"), Some(MenuCommand::Record(Market::HongkongPools)));
        assert_eq!(parse_command("2"), Some(MenuCommand::Record(Market::SydneyPools)));
        assert_eq!(parse_command("3"), Some(MenuCommand::Record(Market::HongkongLotto)));
        assert_eq!(parse_command("4"), Some(MenuCommand::Record(Market::SydneyLotto)));
    }

    #[test]
    fn test_parse_command_actions() {
        assert_eq!(parse_command("5"), Some(MenuCommand::Predict));
        assert_eq!(parse_command("6"), Some(MenuCommand::Backtest(BacktestMode::TwoD)));
        assert_eq!(parse_command("7"), Some(MenuCommand::Backtest(BacktestMode::ThreeD)));
        assert_eq!(parse_command("8"), Some(MenuCommand::Clear));
        assert_eq!(parse_command("9"), Some(MenuCommand::Quit));
    }

    #[test]
    fn test_parse_command_by_name() {
        assert_eq!(parse_command("predict"), Some(MenuCommand::Predict));
        assert_eq!(parse_command("bt2d"), Some(MenuCommand::Backtest(BacktestMode::TwoD)));
        assert_eq!(parse_command("3d"), Some(MenuCommand::Backtest(BacktestMode::ThreeD)));
        assert_eq!(parse_command("markets"), Some(MenuCommand::Markets));
        assert_eq!(parse_command("q"), Some(MenuCommand::Quit));
    }

    #[test]
    fn test_parse_command_case_insensitive() {
        assert_eq!(parse_command("QUIT"), Some(MenuCommand::Quit));
        assert_eq!(parse_command(" Predict "), Some(MenuCommand::Predict));
        assert_eq!(parse_command("BT3D"), Some(MenuCommand::Backtest(BacktestMode::ThreeD)));
    }

    #[test]
    fn test_parse_command_unknown() {
        assert_eq!(parse_command("foo"), None);
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("10"), None);
        assert_eq!(parse_command("0"), None);
    }
}
