/// A command line split into the program name and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub name: String,
    pub arguments: Vec<String>,
}

/// What the dispatcher did with a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Not a shell command; the host should evaluate the line itself.
    NotRecognized,
    /// The line ran as a builtin or external program; the flag says whether it succeeded.
    Handled(bool),
}

impl Outcome {
    pub fn is_handled(self) -> bool {
        matches!(self, Outcome::Handled(_))
    }
}
