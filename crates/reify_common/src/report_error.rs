use ansi_term::Color;
use std::io;

pub trait Reportable {
    fn report(&self, dest: &mut impl io::Write) -> io::Result<()>;

    fn exit_status(&self) -> i32;
}

const TITLE_LEADING_DASHES: usize = 10;
const TITLE_TOTAL_COLS: usize = 60;

/// Writes a titled error block:
///
/// ```text
/// ---------- Erasure Failed --------------------------------
/// local %3 has type IntArray but `get` expects a LongArray
/// ```
pub fn report_error(dest: &mut impl io::Write, title: &str, message: &str) -> io::Result<()> {
    let title_style = Color::Red.bold();

    writeln!(
        dest,
        "\n{}",
        title_style.paint(format!(
            "{leading} {title} {trailing}",
            leading = "-".repeat(TITLE_LEADING_DASHES),
            title = title,
            trailing = "-".repeat(
                TITLE_TOTAL_COLS.saturating_sub(2 + title.len() + TITLE_LEADING_DASHES)
            ),
        ))
    )?;

    for line in message.lines() {
        writeln!(dest, "{}", line)?;
    }

    writeln!(dest)?;

    Ok(())
}
