//! MI input commands.

use std::fmt::Write as _;

/// Display format requested from `-data-list-register-values`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegisterValueFormat
{
    /// `x`: hexadecimal
    #[default]
    Hex,
    /// `o`: octal
    Octal,
    /// `t`: binary
    Binary,
    /// `d`: decimal
    Decimal,
    /// `r`: raw
    Raw,
    /// `N`: natural, i.e. whatever GDB would print for the register type
    Natural,
}

impl RegisterValueFormat
{
    /// The single-letter format code MI expects.
    #[must_use]
    pub const fn code(self) -> char
    {
        match self {
            Self::Hex => 'x',
            Self::Octal => 'o',
            Self::Binary => 't',
            Self::Decimal => 'd',
            Self::Raw => 'r',
            Self::Natural => 'N',
        }
    }
}

/// An MI command, formatted to a single input line by [`Command::to_line`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command
{
    operation: String,
    options: Vec<(String, Option<String>)>,
    parameters: Vec<String>,
}

impl Command
{
    /// Start a command, e.g. `Command::new("data-list-register-names")`.
    ///
    /// The leading `-` is added when the line is formatted.
    #[must_use]
    pub fn new(operation: impl Into<String>) -> Self
    {
        Self {
            operation: operation.into(),
            options: Vec::new(),
            parameters: Vec::new(),
        }
    }

    /// Append `--name` or `--name value`.
    #[must_use]
    pub fn option(mut self, name: impl Into<String>, value: Option<String>) -> Self
    {
        self.options.push((name.into(), value));
        self
    }

    /// Append a positional parameter.
    #[must_use]
    pub fn parameter(mut self, value: impl Into<String>) -> Self
    {
        self.parameters.push(value.into());
        self
    }

    /// The operation name without the leading dash.
    #[must_use]
    pub fn operation(&self) -> &str
    {
        &self.operation
    }

    /// Format the command as an input line, prefixed with `token`.
    ///
    /// The returned line has no trailing newline.
    #[must_use]
    pub fn to_line(&self, token: u64) -> String
    {
        let mut line = format!("{token}-{}", self.operation);
        for (name, value) in &self.options {
            let _ = write!(line, " --{name}");
            if let Some(value) = value {
                line.push(' ');
                line.push_str(&quote(value));
            }
        }
        if !self.parameters.is_empty() {
            // Separates options from parameters that might start with '-'.
            if self.parameters.iter().any(|param| param.starts_with('-')) {
                line.push_str(" --");
            }
            for param in &self.parameters {
                line.push(' ');
                line.push_str(&quote(param));
            }
        }
        line
    }

    /// `-data-list-register-names`
    #[must_use]
    pub fn data_list_register_names() -> Self
    {
        Self::new("data-list-register-names")
    }

    /// `-data-list-register-values --thread <thread> <fmt>`
    #[must_use]
    pub fn data_list_register_values(thread: u64, format: RegisterValueFormat) -> Self
    {
        Self::new("data-list-register-values")
            .option("thread", Some(thread.to_string()))
            .parameter(format.code().to_string())
    }
}

/// Quote a parameter as a c-string when it contains anything MI would split on.
fn quote(text: &str) -> String
{
    let plain = !text.is_empty()
        && text
            .chars()
            .all(|c| !c.is_whitespace() && c != '"' && c != '\\' && c != '\'');
    if plain {
        return text.to_string();
    }

    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}
