//! Word splitting with shell quoting rules.

use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexingState {
    /// Between words.
    Start,
    /// Inside an unquoted part of a word.
    ReadingWord,
    /// After an opening `'`; everything up to the next `'` is literal.
    ReadingSingleQuote,
    /// After an opening `"`.
    ReadingDoubleQuote,
}

/// Finite state machine that turns one command line into words.
struct LexingFSM {
    input: Vec<char>,
    pos: usize,
    state: LexingState,
    buffer: String,
}

impl LexingFSM {
    /// Creates a machine positioned at the start of `line`.
    ///
    /// # Arguments
    /// * `line` - The command text after `#{...}` substitution.
    fn new(line: &str) -> Self {
        LexingFSM {
            input: line.chars().collect(),
            pos: 0,
            state: LexingState::Start,
            buffer: String::new(),
        }
    }

    /// Runs the machine over the whole input.
    ///
    /// A word ends at unquoted whitespace; quoted and unquoted parts that touch are glued
    /// together, so `a'b c'"d"` is the single word `ab cd`.
    ///
    /// # Returns
    /// The words in order, or a `ParseError` when the input ends inside a quote or right
    /// after a backslash.
    fn make_words(&mut self) -> Result<Vec<String>, ParseError> {
        let mut out = Vec::new();

        while let Some(ch) = self.read_char() {
            match self.state {
                LexingState::Start => self.handle_start(ch)?,
                LexingState::ReadingWord => self.handle_word(ch, &mut out)?,
                LexingState::ReadingSingleQuote => self.handle_single_quote(ch),
                LexingState::ReadingDoubleQuote => self.handle_double_quote(ch)?,
            }
        }

        match self.state {
            LexingState::ReadingSingleQuote => return Err(ParseError::UnfinishedSingleQuote),
            LexingState::ReadingDoubleQuote => return Err(ParseError::UnfinishedDoubleQuote),
            LexingState::ReadingWord => out.push(std::mem::take(&mut self.buffer)),
            LexingState::Start => {}
        }

        Ok(out)
    }

    /// Consumes and returns the next character.
    fn read_char(&mut self) -> Option<char> {
        let ch = self.input.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    /// Looks at the next character without consuming it.
    fn peek_char(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    /// Between words: skip blanks and line continuations, anything else opens a word.
    fn handle_start(&mut self, ch: char) -> Result<(), ParseError> {
        match ch {
            c if is_blank(c) => {}
            '\\' if self.peek_char() == Some('\n') => {
                self.read_char();
            }
            _ => {
                self.state = LexingState::ReadingWord;
                self.consume_word_char(ch)?;
            }
        }
        Ok(())
    }

    /// Inside a word: an unquoted blank finishes it and pushes it to `out`.
    ///
    /// # Arguments
    /// * `ch` - The character just read.
    /// * `out` - Words completed so far.
    fn handle_word(&mut self, ch: char, out: &mut Vec<String>) -> Result<(), ParseError> {
        if is_blank(ch) {
            out.push(std::mem::take(&mut self.buffer));
            self.state = LexingState::Start;
            return Ok(());
        }
        self.consume_word_char(ch)
    }

    /// Unquoted character that belongs to the current word.
    fn consume_word_char(&mut self, ch: char) -> Result<(), ParseError> {
        match ch {
            '\'' => self.state = LexingState::ReadingSingleQuote,
            '"' => self.state = LexingState::ReadingDoubleQuote,
            '\\' => match self.read_char() {
                // line continuation
                Some('\n') => {}
                Some(escaped) => self.buffer.push(escaped),
                None => return Err(ParseError::UnfinishedEscape),
            },
            c => self.buffer.push(c),
        }
        Ok(())
    }

    /// Inside single quotes nothing is special except the closing quote.
    fn handle_single_quote(&mut self, ch: char) {
        match ch {
            '\'' => self.state = LexingState::ReadingWord,
            c => self.buffer.push(c),
        }
    }

    /// Inside double quotes a backslash only escapes `$`, `` ` ``, `"`, `\` and newline; before
    /// any other character it is kept.
    fn handle_double_quote(&mut self, ch: char) -> Result<(), ParseError> {
        match ch {
            '"' => self.state = LexingState::ReadingWord,
            '\\' => match self.read_char() {
                Some('\n') => {}
                Some(c @ ('$' | '`' | '"' | '\\')) => self.buffer.push(c),
                Some(c) => {
                    self.buffer.push('\\');
                    self.buffer.push(c);
                }
                None => return Err(ParseError::UnfinishedDoubleQuote),
            },
            c => self.buffer.push(c),
        }
        Ok(())
    }
}

fn is_blank(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n')
}

/// Split `line` into words the way a POSIX shell would for a simple command.
///
/// Single quotes preserve everything literally. Inside double quotes a backslash only escapes
/// `$`, `` ` ``, `"`, `\` and newline. Outside quotes a backslash escapes any character.
pub fn split_into_words(line: &str) -> Result<Vec<String>, ParseError> {
    LexingFSM::new(line).make_words()
}
