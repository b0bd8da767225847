//! Small formatting and console helpers shared by the commands.

use owo_colors::OwoColorize;

/// Format `n` with `,` thousands separators.
pub fn format_number(n: usize) -> String
{
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits
        .chars()
        .enumerate()
    {
        if i > 0 && (digits.len() - i) % 3 == 0
        {
            out.push(',');
        }
        out.push(ch);
    }

    out
}

/// Prefix each line with a right-aligned 1-based number: `   1 | code`.
pub fn add_line_numbers(code: &str) -> String
{
    code.split('\n')
        .enumerate()
        .map(|(i, line)| format!("{:4} | {}", i + 1, line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Wrap `code` in a markdown fence labelled with `extension` (dot included,
/// may be empty).
pub fn wrap_code_block(
    code: &str,
    extension: &str,
) -> String
{
    let label = extension
        .strip_prefix('.')
        .unwrap_or(extension);
    format!("```{label}\n{code}\n```")
}

/// Severity of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status
{
    Success,
    Info,
    Warning,
}

impl Status
{
    fn symbol(self) -> &'static str
    {
        match self
        {
            Status::Success => "✓",
            Status::Info => "i",
            Status::Warning => "!",
        }
    }
}

/// Render `[symbol] message`, coloured unless `no_color`.
pub fn status_line(
    status: Status,
    message: &str,
    no_color: bool,
) -> String
{
    let symbol = status.symbol();

    if no_color
    {
        return format!("[{symbol}] {message}");
    }

    let message = match status
    {
        Status::Success => message
            .green()
            .to_string(),
        Status::Info => message
            .cyan()
            .to_string(),
        Status::Warning => message
            .yellow()
            .to_string(),
    };

    format!(
        "{}{}{} {}",
        "[".white()
            .bold(),
        symbol
            .white()
            .bold(),
        "]".white()
            .bold(),
        message
    )
}

/// Print a status line to stderr so stdout stays clean for the prompt.
pub fn print_status(
    status: Status,
    message: &str,
    no_color: bool,
)
{
    eprintln!("{}", status_line(status, message, no_color));
}
