use crate::holdings::{Holdings, PortfolioTotals};
use crate::transaction::TransactionSet;
use chrono::{Datelike, Local, NaiveTime};
use colored::Colorize;
use comfy_table::{
    presets::UTF8_FULL, Attribute, Cell, CellAlignment, Color as TColor, ContentArrangement, Table,
};
use piechart::{Chart, Color};

/// Which optional columns and cuts the overview rendering includes.
///
/// The display variants differ only in these switches, so they are one
/// renderer parameterized by this struct instead of separate code paths.
#[derive(Debug, Clone)]
pub struct DisplayOptions {
    pub top_n: Option<usize>,
    pub include_unrealized: bool,
    pub include_pct_change: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        DisplayOptions {
            top_n: Some(5),
            include_unrealized: true,
            include_pct_change: true,
        }
    }
}

fn base_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
    table
}

fn money_cell(value: f64) -> Cell {
    Cell::new(format!("{value:.2}")).set_alignment(CellAlignment::Right)
}

fn signed_money_cell(value: f64) -> Cell {
    let c = if value >= 0.0 { TColor::Green } else { TColor::Red };
    Cell::new(format!("{value:.2}"))
        .set_alignment(CellAlignment::Right)
        .fg(c)
}

fn signed_pct_cell(value: f64) -> Cell {
    let c = if value >= 0.0 { TColor::Green } else { TColor::Red };
    Cell::new(format!("{value:.2}%"))
        .set_alignment(CellAlignment::Right)
        .fg(c)
}

/// Print the holdings overview table, top-N by market value.
pub fn print_overview(holdings: &Holdings, options: &DisplayOptions) {
    let mut table = base_table();

    let mut header = vec![
        Cell::new("Symbol").add_attribute(Attribute::Bold),
        Cell::new("Quantity").add_attribute(Attribute::Bold),
        Cell::new("Average Cost").add_attribute(Attribute::Bold),
        Cell::new("Current Price").add_attribute(Attribute::Bold),
        Cell::new("Book Cost").add_attribute(Attribute::Bold),
        Cell::new("Market Value").add_attribute(Attribute::Bold),
    ];
    if options.include_pct_change {
        header.push(Cell::new("% Change").add_attribute(Attribute::Bold));
    }
    if options.include_unrealized {
        header.push(Cell::new("Unrealized Gain or Loss").add_attribute(Attribute::Bold));
    }
    table.set_header(header);

    for holding in holdings.overview(options.top_n) {
        let mut row = vec![
            Cell::new(&holding.symbol),
            Cell::new(format!("{:.4}", holding.total_quantity))
                .set_alignment(CellAlignment::Right),
            money_cell(holding.average_cost),
            money_cell(holding.current_price),
            money_cell(holding.book_cost),
            money_cell(holding.market_value),
        ];
        if options.include_pct_change {
            row.push(signed_pct_cell(holding.pct_change));
        }
        if options.include_unrealized {
            row.push(signed_money_cell(holding.unrealized_gain_loss));
        }
        table.add_row(row);
    }

    println!("{table}");
}

/// Print the most recent `limit` transactions.
pub fn print_records(transactions: &TransactionSet, limit: usize) {
    let mut table = base_table();
    table.set_header(vec![
        Cell::new("Symbol").add_attribute(Attribute::Bold),
        Cell::new("Date").add_attribute(Attribute::Bold),
        Cell::new("Quantity").add_attribute(Attribute::Bold),
        Cell::new("Individual Cost").add_attribute(Attribute::Bold),
    ]);

    for tx in transactions.records().into_iter().take(limit) {
        table.add_row(vec![
            Cell::new(tx.symbol()),
            Cell::new(tx.date().format("%Y-%m-%d").to_string()),
            Cell::new(format!("{:.4}", tx.quantity())).set_alignment(CellAlignment::Right),
            money_cell(tx.unit_cost()),
        ]);
    }

    println!("{table}");
}

/// Print the three summary panels in one compact row.
pub fn print_totals(totals: &PortfolioTotals) {
    let mut table = base_table();
    table.set_header(vec![
        Cell::new("Total Book Cost").add_attribute(Attribute::Bold),
        Cell::new("Market Value").add_attribute(Attribute::Bold),
        Cell::new("Unrealized Gain or Loss").add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        money_cell(totals.book_cost),
        money_cell(totals.market_value),
        signed_money_cell(totals.unrealized_gain_loss),
    ]);
    println!("{table}");
}

/// Draw the portfolio distribution chart, one slice per holding weighted by
/// market value.
pub fn draw_distribution(holdings: &Holdings) {
    let colors = [
        Color::Red,
        Color::Green,
        Color::Blue,
        Color::Yellow,
        Color::Cyan,
        Color::White,
        Color::Purple,
        Color::Black,
    ];

    let data: Vec<piechart::Data> = holdings
        .overview(None)
        .iter()
        .enumerate()
        .map(|(i, holding)| piechart::Data {
            label: holding.symbol.clone(),
            value: holding.market_value as f32,
            color: Some(colors[i % colors.len()].into()),
            fill: '•',
        })
        .collect();

    if data.is_empty() {
        return;
    }

    println!("{}", "Portfolio Distribution".bold());
    Chart::new().legend(true).radius(9).aspect_ratio(3).draw(&data);
}

/// Regular US market hours: 09:30-16:00 local time, Monday through Friday.
fn market_is_open(now: chrono::DateTime<Local>) -> bool {
    let time = now.time();
    let open = NaiveTime::from_hms_opt(9, 30, 0).unwrap_or(NaiveTime::MIN);
    let close = NaiveTime::from_hms_opt(16, 0, 0).unwrap_or(NaiveTime::MIN);
    let weekday = now.weekday().number_from_monday();
    (1..=5).contains(&weekday) && time >= open && time <= close
}

pub fn print_market_status() {
    let now = Local::now();
    let stamp = now.format("%H:%M:%S");
    if market_is_open(now) {
        println!("{}", format!("It is currently {stamp}, Market is open").green());
    } else {
        println!("{}", format!("It is currently {stamp}, Market is closed").red());
    }
}

/// Render the full dashboard: header, market status, summary panels,
/// overview, distribution chart, recent transactions, footer.
pub fn print_dashboard(
    transactions: &TransactionSet,
    holdings: &Holdings,
    options: &DisplayOptions,
) {
    println!("{}", "Stock Portfolio Tracker".bold());
    print_market_status();
    println!();

    print_totals(&holdings.totals());

    match options.top_n {
        Some(n) => println!("{}", format!("Top {n} Holdings").bold()),
        None => println!("{}", "Holdings".bold()),
    }
    print_overview(holdings, options);

    draw_distribution(holdings);

    println!("{}", "Stock Transactions".bold());
    print_records(transactions, 10);

    let updated = Local::now().format("%d %b %Y at %H:%M:%S");
    println!("Data updated at {updated}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_market_open_midday_weekday() {
        // Wednesday
        let now = Local.with_ymd_and_hms(2024, 1, 3, 12, 0, 0).unwrap();
        assert!(market_is_open(now));
    }

    #[test]
    fn test_market_closed_on_weekend() {
        // Saturday, during trading hours
        let now = Local.with_ymd_and_hms(2024, 1, 6, 12, 0, 0).unwrap();
        assert!(!market_is_open(now));
    }

    #[test]
    fn test_market_closed_before_open_and_after_close() {
        let early = Local.with_ymd_and_hms(2024, 1, 3, 9, 29, 59).unwrap();
        let late = Local.with_ymd_and_hms(2024, 1, 3, 16, 0, 1).unwrap();
        assert!(!market_is_open(early));
        assert!(!market_is_open(late));
    }
}
