use crate::command::ParsedCommand;
use crate::error::{ParseError, ShellError};
use crate::eval::Evaluator;
use crate::lexer;

const SUBST_OPEN: &str = "#{";
const SUBST_CLOSE: char = '}';

/// Parse command text (without the leading `!`) into a name and its arguments.
///
/// Embedded `#{expr}` spans are evaluated first and replaced by their value quoted as a
/// single word; only then is the text split into words.
pub fn parse(raw: &str, evaluator: &mut dyn Evaluator) -> Result<ParsedCommand, ShellError> {
    let command = substitute(raw, evaluator)?;
    let mut words = lexer::split_into_words(&command)?.into_iter();
    let name = words.next().ok_or(ParseError::MissingCommand)?;
    Ok(ParsedCommand {
        name,
        arguments: words.collect(),
    })
}

/// Replace every `#{...}` span in one left-to-right pass.
///
/// Spans do not nest: the first `}` after an opener closes it. Replacement text is never
/// rescanned, and an opener without a closing brace is kept as written.
fn substitute(raw: &str, evaluator: &mut dyn Evaluator) -> Result<String, ShellError> {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find(SUBST_OPEN) {
        let body_start = start + SUBST_OPEN.len();
        let Some(len) = rest[body_start..].find(SUBST_CLOSE) else {
            break;
        };
        let expression = &rest[body_start..body_start + len];
        let value = evaluator.evaluate(expression)?;
        tracing::trace!(expression, value = %value, "substituted embedded expression");

        out.push_str(&rest[..start]);
        out.push_str(&quote(expression, &value)?);
        rest = &rest[body_start + len + SUBST_CLOSE.len_utf8()..];
    }

    out.push_str(rest);
    Ok(out)
}

fn quote(expression: &str, value: &str) -> Result<String, ParseError> {
    shlex::try_quote(value)
        .map(|quoted| quoted.into_owned())
        .map_err(|e| ParseError::Unquotable {
            expression: expression.to_owned(),
            reason: e.to_string(),
        })
}
