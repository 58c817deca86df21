use std::collections::VecDeque;
use std::io;
use std::io::BufRead;
use std::io::StdinLock;
use std::io::Stdout;
use std::io::Write;

use thiserror::Error;
use tracing::debug;
use tracing::warn;

type Result<T> = std::result::Result<T, ConsoleError>;

/// The connection between a running program and its environment.
///
/// Requests for input block until the environment answers. `Ok(None)` means
/// that no more input will ever arrive.
pub trait Console {
    fn request_number(&mut self) -> Result<Option<i64>>;

    /// Request a single character. Returns its Unicode code point.
    fn request_char(&mut self) -> Result<Option<i64>>;

    fn emit_number(&mut self, number: i64) -> Result<()>;

    /// Emit the character with the given Unicode code point.
    fn emit_char(&mut self, code_point: i64) -> Result<()>;
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("{0} is not a Unicode scalar value")]
    InvalidCodePoint(i64),

    #[error("console I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Turn a code point into a [`char`], if it is a Unicode scalar value.
pub fn char_from_code_point(code_point: i64) -> Result<char> {
    u32::try_from(code_point)
        .ok()
        .and_then(char::from_u32)
        .ok_or(ConsoleError::InvalidCodePoint(code_point))
}

/// A text-based console on top of any reader and writer, for example, the
/// standard streams.
///
/// Numbers are read as whitespace-separated decimal integers. Tokens that are
/// not integers are reported and skipped, and reading continues with the next
/// token. Characters are read one at a time, including whitespace and line
/// breaks. Output is flushed after every write.
#[derive(Debug)]
pub struct TerminalConsole<R, W> {
    input: R,
    output: W,

    /// Characters of the current input line that have not been consumed yet.
    pending: VecDeque<char>,
}

impl<R, W> TerminalConsole<R, W>
where
    R: BufRead,
    W: Write,
{
    pub fn new(input: R, output: W) -> Self {
        let pending = VecDeque::new();
        Self { input, output, pending }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    fn next_char(&mut self) -> Result<Option<char>> {
        if self.pending.is_empty() {
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.pending.extend(line.chars());
        }
        Ok(self.pending.pop_front())
    }

    fn peek_char(&mut self) -> Result<Option<char>> {
        if self.pending.is_empty() {
            let Some(c) = self.next_char()? else {
                return Ok(None);
            };
            self.pending.push_front(c);
        }
        Ok(self.pending.front().copied())
    }

    /// The next whitespace-separated token, or `None` if the input is
    /// exhausted.
    fn next_token(&mut self) -> Result<Option<String>> {
        let mut token = String::new();
        while let Some(c) = self.next_char()? {
            if !c.is_whitespace() {
                token.push(c);
                break;
            }
        }
        if token.is_empty() {
            return Ok(None);
        }

        while let Some(c) = self.peek_char()? {
            if c.is_whitespace() {
                break;
            }
            token.push(c);
            self.pending.pop_front();
        }
        Ok(Some(token))
    }
}

impl TerminalConsole<StdinLock<'static>, Stdout> {
    /// A console reading from standard input and writing to standard output.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R, W> Console for TerminalConsole<R, W>
where
    R: BufRead,
    W: Write,
{
    fn request_number(&mut self) -> Result<Option<i64>> {
        while let Some(token) = self.next_token()? {
            match token.parse() {
                Ok(number) => return Ok(Some(number)),
                Err(err) => warn!("ignoring input `{token}`: not a number ({err})"),
            }
        }
        debug!("input exhausted while requesting a number");
        Ok(None)
    }

    fn request_char(&mut self) -> Result<Option<i64>> {
        let maybe_char = self.next_char()?;
        if maybe_char.is_none() {
            debug!("input exhausted while requesting a character");
        }
        Ok(maybe_char.map(|c| i64::from(u32::from(c))))
    }

    fn emit_number(&mut self, number: i64) -> Result<()> {
        write!(self.output, "{number}")?;
        self.output.flush()?;
        Ok(())
    }

    fn emit_char(&mut self, code_point: i64) -> Result<()> {
        let c = char_from_code_point(code_point)?;
        write!(self.output, "{c}")?;
        self.output.flush()?;
        Ok(())
    }
}

/// A console with scripted input and captured output. Numbers and characters
/// are drawn from the same input queue; characters as their code points.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct BufferedConsole {
    pub input: VecDeque<i64>,
    pub output: String,
}

impl BufferedConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the given values as input.
    #[must_use]
    pub fn with_input(mut self, input: impl IntoIterator<Item = i64>) -> Self {
        self.input.extend(input);
        self
    }

    /// Queue the code points of the given text as input.
    #[must_use]
    pub fn with_text(mut self, text: &str) -> Self {
        let code_points = text.chars().map(|c| i64::from(u32::from(c)));
        self.input.extend(code_points);
        self
    }

    pub fn output(&self) -> &str {
        &self.output
    }
}

impl Console for BufferedConsole {
    fn request_number(&mut self) -> Result<Option<i64>> {
        Ok(self.input.pop_front())
    }

    fn request_char(&mut self) -> Result<Option<i64>> {
        Ok(self.input.pop_front())
    }

    fn emit_number(&mut self, number: i64) -> Result<()> {
        self.output.push_str(&number.to_string());
        Ok(())
    }

    fn emit_char(&mut self, code_point: i64) -> Result<()> {
        let c = char_from_code_point(code_point)?;
        self.output.push(c);
        Ok(())
    }
}

impl<C: Console + ?Sized> Console for &mut C {
    fn request_number(&mut self) -> Result<Option<i64>> {
        (**self).request_number()
    }

    fn request_char(&mut self) -> Result<Option<i64>> {
        (**self).request_char()
    }

    fn emit_number(&mut self, number: i64) -> Result<()> {
        (**self).emit_number(number)
    }

    fn emit_char(&mut self, code_point: i64) -> Result<()> {
        (**self).emit_char(code_point)
    }
}

#[cfg(test)]
mod tests {
    use assert2::assert;
    use assert2::let_assert;
    use proptest::prelude::*;
    use test_strategy::proptest;

    use super::*;

    fn terminal(input: &str) -> TerminalConsole<&[u8], Vec<u8>> {
        TerminalConsole::new(input.as_bytes(), vec![])
    }

    #[test]
    fn terminal_reads_whitespace_separated_numbers() {
        let mut console = terminal("  12 -3\n\n  42");
        let_assert!(Ok(Some(12)) = console.request_number());
        let_assert!(Ok(Some(-3)) = console.request_number());
        let_assert!(Ok(Some(42)) = console.request_number());
        let_assert!(Ok(None) = console.request_number());
    }

    #[test]
    fn terminal_skips_tokens_that_are_not_numbers() {
        let mut console = terminal("abc 1x\n7\n");
        let_assert!(Ok(Some(7)) = console.request_number());
    }

    #[test]
    fn terminal_reads_characters_one_at_a_time() {
        let mut console = terminal("hé\n");
        let_assert!(Ok(Some(104)) = console.request_char());
        let_assert!(Ok(Some(0xE9)) = console.request_char());
        let_assert!(Ok(Some(10)) = console.request_char());
        let_assert!(Ok(None) = console.request_char());
    }

    #[test]
    fn terminal_number_then_character() {
        let mut console = terminal("5 A");
        let_assert!(Ok(Some(5)) = console.request_number());
        let_assert!(Ok(Some(32)) = console.request_char());
        let_assert!(Ok(Some(65)) = console.request_char());
    }

    #[test]
    fn terminal_writes_numbers_and_characters() {
        let mut console = terminal("");
        console.emit_number(-17).unwrap();
        console.emit_char(0x263A).unwrap();
        console.emit_char(10).unwrap();
        let (_, output) = console.into_inner();
        assert!("-17☺\n" == String::from_utf8(output).unwrap());
    }

    #[proptest]
    fn invalid_code_points_are_rejected(
        #[filter(u32::try_from(#code_point).ok().and_then(char::from_u32).is_none())]
        code_point: i64,
    ) {
        let mut console = BufferedConsole::new();
        let_assert!(Err(ConsoleError::InvalidCodePoint(cp)) = console.emit_char(code_point));
        prop_assert_eq!(code_point, cp);
        prop_assert!(console.output().is_empty());
    }

    #[test]
    fn surrogates_are_not_characters() {
        let_assert!(Err(ConsoleError::InvalidCodePoint(0xD800)) = char_from_code_point(0xD800));
        let_assert!(Err(ConsoleError::InvalidCodePoint(-1)) = char_from_code_point(-1));
        let_assert!(Ok('A') = char_from_code_point(65));
    }

    #[test]
    fn buffered_console_shares_one_input_queue() {
        let mut console = BufferedConsole::new().with_input([3]).with_text("hi");
        let_assert!(Ok(Some(3)) = console.request_number());
        let_assert!(Ok(Some(104)) = console.request_char());
        let_assert!(Ok(Some(105)) = console.request_number());
        let_assert!(Ok(None) = console.request_char());
    }

    #[test]
    fn buffered_console_captures_output() {
        let mut console = BufferedConsole::new();
        console.emit_number(12).unwrap();
        console.emit_char(33).unwrap();
        assert!("12!" == console.output());
    }

    #[test]
    fn mutable_reference_to_console_is_a_console() {
        fn emit_one(mut console: impl Console) {
            console.emit_number(1).unwrap();
        }

        let mut console = BufferedConsole::new();
        emit_one(&mut console);
        assert!("1" == console.output());
    }
}
