use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::str::FromStr;

use isa::color::Rgb;
use nom::Finish;
use nom::IResult;
use nom::Parser;
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::bytes::complete::take_while;
use nom::bytes::complete::take_while1;
use nom::character::complete::line_ending;
use nom::combinator::cut;
use nom::combinator::eof;
use nom::combinator::opt;
use nom::combinator::value;
use nom::error::context;
use nom::multi::many0;
use nom::multi::many1;
use nom::sequence::terminated;
use nom_language::error::VerboseError;
use nom_language::error::VerboseErrorKind;

#[derive(Debug, PartialEq)]
pub struct ParseError<'a> {
    pub input: &'a str,
    pub errors: VerboseError<&'a str>,
}

/// One row of raw colors, together with the slice of the input it starts at.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct RowToken<'a> {
    pub colors: Vec<Rgb>,
    pub token_str: &'a str,
}

impl Display for ParseError<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let err_display = nom_language::error::convert_error(self.input, self.errors.clone());
        write!(f, "{err_display}")
    }
}

impl Error for ParseError<'_> {}

/// Parse a program image given as a text grid.
///
/// Every non-blank line is one row of codels. A row is a whitespace-separated
/// list of colors, each written as `RRGGBB` or `#RRGGBB`. Comments start with
/// `//` and extend to the end of the line. All rows must have the same length,
/// and there must be at least one row.
pub(crate) fn parse(input: &str) -> Result<Vec<Vec<Rgb>>, ParseError<'_>> {
    let (_, rows) = grid(input)
        .finish()
        .map_err(|errors| ParseError { input, errors })?;

    ensure_grid_is_not_empty(input, &rows)?;
    ensure_rows_have_equal_length(input, &rows)?;
    let width = rows.first().map_or(0, |row| row.colors.len());
    ensure_dimensions_fit_coordinates(input, width, rows.len())?;

    Ok(rows.into_iter().map(|row| row.colors).collect())
}

fn ensure_grid_is_not_empty<'a>(input: &'a str, rows: &[RowToken<'a>]) -> Result<(), ParseError<'a>> {
    if !rows.is_empty() {
        return Ok(());
    }
    let errors = vec![(input, VerboseErrorKind::Context("program image has no rows"))];
    let errors = VerboseError { errors };
    Err(ParseError { input, errors })
}

fn ensure_rows_have_equal_length<'a>(
    input: &'a str,
    rows: &[RowToken<'a>],
) -> Result<(), ParseError<'a>> {
    let Some(first_row) = rows.first() else {
        return Ok(());
    };
    let expected_len = first_row.colors.len();
    let context = VerboseErrorKind::Context("row length differs from length of first row");
    let errors = rows
        .iter()
        .filter(|row| row.colors.len() != expected_len)
        .map(|row| (row.token_str, context.clone()))
        .collect::<Vec<_>>();

    if errors.is_empty() {
        return Ok(());
    }
    let errors = VerboseError { errors };
    Err(ParseError { input, errors })
}

/// Codel coordinates are `i32`, so neither dimension may exceed [`i32::MAX`].
fn ensure_dimensions_fit_coordinates(
    input: &str,
    width: usize,
    height: usize,
) -> Result<(), ParseError<'_>> {
    if i32::try_from(width).is_ok() && i32::try_from(height).is_ok() {
        return Ok(());
    }
    let errors = vec![(input, VerboseErrorKind::Context("program image is too large"))];
    let errors = VerboseError { errors };
    Err(ParseError { input, errors })
}

/// A specialization of [`IResult`] with [`VerboseError`] as the error type,
/// which allows [`context()`].
type ParseResult<'input, Out> = IResult<&'input str, Out, VerboseError<&'input str>>;

fn grid(s: &str) -> ParseResult<'_, Vec<RowToken<'_>>> {
    let (s, _) = blank_lines0(s)?;
    let (s, rows) = many0(row).parse(s)?;
    let (s, _) = inline_whitespace0(s)?;
    let (s, _) = context("expected a row of colors or end of file", eof).parse(s)?;

    Ok((s, rows))
}

fn row(row_s: &str) -> ParseResult<'_, RowToken<'_>> {
    let (s, _) = inline_whitespace0(row_s)?;
    let (s, colors) = many1(terminated(color, inline_whitespace0)).parse(s)?;
    let (s, _) = opt(eol_comment).parse(s)?;
    let (s, _) = context("expected a color, a comment, or end of line", cut(end_of_line)).parse(s)?;
    let (s, _) = blank_lines0(s)?;

    let token_str = row_s;
    Ok((s, RowToken { colors, token_str }))
}

fn color(s_orig: &str) -> ParseResult<'_, Rgb> {
    let (s, token) = take_while1(is_color_char).parse(s_orig)?;
    let Ok(rgb) = Rgb::from_str(token) else {
        let fail_context = "expected a color of the form `RRGGBB` or `#RRGGBB`";
        let errors = vec![(s_orig, VerboseErrorKind::Context(fail_context))];
        return Err(nom::Err::Failure(VerboseError { errors }));
    };

    Ok((s, rgb))
}

fn is_color_char(c: char) -> bool {
    c == '#' || c.is_ascii_alphanumeric()
}

/// Parse lines that contain nothing but whitespace and comments (can be none)
fn blank_lines0(s: &str) -> ParseResult<'_, ()> {
    let (s, _) = many0(blank_line).parse(s)?;
    Ok((s, ()))
}

fn blank_line(s: &str) -> ParseResult<'_, ()> {
    let (s, _) = inline_whitespace0(s)?;
    let (s, _) = alt((terminated(eol_comment, end_of_line), value((), line_ending))).parse(s)?;
    Ok((s, ()))
}

fn end_of_line(s: &str) -> ParseResult<'_, ()> {
    alt((value((), line_ending), value((), eof))).parse(s)
}

/// Parse one “//”-comment (not including the linebreak)
fn eol_comment(s: &str) -> ParseResult<'_, ()> {
    let (s, _) = tag("//").parse(s)?;
    let (s, _) = take_while(|c: char| c != '\n' && c != '\r').parse(s)?;

    Ok((s, ()))
}

/// Parse spaces and tabs, but not line breaks (can be none)
fn inline_whitespace0(s: &str) -> ParseResult<'_, ()> {
    let (s, _) = take_while(|c: char| c == ' ' || c == '\t').parse(s)?;
    Ok((s, ()))
}

#[cfg(test)]
mod tests {
    use assert2::assert;
    use assert2::let_assert;

    use super::*;

    #[test]
    fn parse_single_codel() {
        let_assert!(Ok(rows) = parse("FF0000"));
        assert!(vec![vec![Rgb(0xFF_0000)]] == rows);
    }

    #[test]
    fn parse_grid_with_comments_and_blank_lines() {
        let code = "
            // a tiny program
            FF0000 #FF0000 000000 // first row

            c0c0ff C0C0FF FFFFFF
        ";
        let_assert!(Ok(rows) = parse(code));
        assert!(2 == rows.len());
        assert!(vec![Rgb(0xFF_0000), Rgb(0xFF_0000), Rgb(0x00_0000)] == rows[0]);
        assert!(vec![Rgb(0xC0_C0FF), Rgb(0xC0_C0FF), Rgb(0xFF_FFFF)] == rows[1]);
    }

    #[test]
    fn parse_windows_line_endings() {
        let_assert!(Ok(rows) = parse("FF0000 00FF00\r\n0000FF FFFFFF\r\n"));
        assert!(2 == rows.len());
    }

    #[test]
    fn comment_right_after_color_ends_the_color() {
        let_assert!(Ok(rows) = parse("FF0000// red"));
        assert!(vec![vec![Rgb(0xFF_0000)]] == rows);
    }

    #[test]
    fn empty_comment_is_fine() {
        let_assert!(Ok(_) = parse("//\nFF0000\n//"));
    }

    #[test]
    fn trailing_comment_without_line_break_is_fine() {
        let_assert!(Ok(rows) = parse("FF0000\n// the end"));
        assert!(1 == rows.len());
    }

    #[test]
    fn color_with_wrong_number_of_digits_is_rejected() {
        let_assert!(Err(err) = parse("FF0000 FF000"));
        assert!(err.to_string().contains("RRGGBB"));
    }

    #[test]
    fn non_hexadecimal_color_is_rejected() {
        let_assert!(Err(err) = parse("FF0000\nGG0000"));
        assert!(err.to_string().contains("RRGGBB"));
    }

    #[test]
    fn stray_characters_are_rejected() {
        let_assert!(Err(_) = parse("FF0000 ; 00FF00"));
    }

    #[test]
    fn rows_of_different_length_are_rejected() {
        let_assert!(Err(err) = parse("FF0000 FF0000\nFF0000\n"));
        assert!(err.to_string().contains("row length"));
    }

    #[test]
    fn dimensions_beyond_coordinate_range_are_rejected() {
        let too_large = usize::try_from(i32::MAX).unwrap() + 1;
        let_assert!(Ok(()) = ensure_dimensions_fit_coordinates("", 3, 5));
        let_assert!(Err(err) = ensure_dimensions_fit_coordinates("", too_large, 1));
        assert!(err.to_string().contains("too large"));
        let_assert!(Err(_) = ensure_dimensions_fit_coordinates("", 1, too_large));
    }

    #[test]
    fn empty_input_is_rejected() {
        let_assert!(Err(err) = parse("  // nothing here\n\n"));
        assert!(err.to_string().contains("no rows"));
    }
}
