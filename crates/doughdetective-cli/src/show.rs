use std::io::{self, Write};

use anstyle::{AnsiColor, Color, Style};
use doughdetective::Transaction;
use doughdetective::reconcile::Reconciliation;

pub fn show_report(results: &Reconciliation) -> io::Result<()> {
    use std::io::IsTerminal as _;

    let stdout = io::stdout();
    let color = stdout.is_terminal();
    write_report(&mut stdout.lock(), results, color)
}

pub fn write_report(out: &mut impl Write, results: &Reconciliation, color: bool) -> io::Result<()> {
    let style = |style: Style| if color { style } else { Style::new() };
    let ledger_style = style(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow))));
    let statement_style = style(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))));
    let bold = style(Style::new().bold());

    write_section(
        out,
        ledger_style,
        "Missing in ledger",
        &results.missing_in_ledger,
    )?;
    write_section(
        out,
        statement_style,
        "Missing in statement",
        &results.missing_in_statement,
    )?;

    // Summary
    if results.is_empty() {
        writeln!(out, "✓ All transactions match!")?;
    } else {
        writeln!(out, "{bold}━━━ Summary ━━━{bold:#}")?;
        let missing_in_ledger = results.missing_in_ledger.len();
        if missing_in_ledger > 0 {
            writeln!(
                out,
                "  {ledger_style}{missing_in_ledger}{ledger_style:#} transaction(s) missing in ledger"
            )?;
        }
        let missing_in_statement = results.missing_in_statement.len();
        if missing_in_statement > 0 {
            writeln!(
                out,
                "  {statement_style}{missing_in_statement}{statement_style:#} transaction(s) missing in statement"
            )?;
        }
    }

    Ok(())
}

fn write_section(
    out: &mut impl Write,
    style: Style,
    title: &str,
    transactions: &[Transaction],
) -> io::Result<()> {
    writeln!(out, "{style}━━━ {title} ━━━{style:#}")?;
    for transaction in transactions {
        writeln!(out, "{transaction}")?;
    }
    writeln!(out)
}
