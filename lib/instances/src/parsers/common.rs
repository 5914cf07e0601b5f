use super::nom_prelude::*;

/// Skips whitespace, `<!-- comments -->` and `<?processing instructions?>`.
pub fn junk(input: &str) -> Res<()> {
  let comment = value((), tuple((tag("<!--"), take_until("-->"), tag("-->"))));
  let prolog = value((), tuple((tag("<?"), take_until("?>"), tag("?>"))));
  value((), many0(alt((value((), multispace1), comment, prolog))))(input)
}

pub fn name(input: &str) -> Res<&str> {
  context(
    "name",
    take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '-' || c == ':' || c == '.'),
  )(input)
}

/// Attribute value in single or double quotes, without the quotes.
pub fn quoted(input: &str) -> Res<&str> {
  context(
    "quoted value",
    alt((
      delimited(char('"'), take_until("\""), char('"')),
      delimited(char('\''), take_until("'"), char('\'')),
    )),
  )(input)
}

pub fn attribute(input: &str) -> Res<(&str, &str)> {
  separated_pair(name, tuple((multispace0, char('='), multispace0)), quoted)(input)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn skips_comments_and_prolog() {
    let (rest, ()) = junk("<?xml version=\"1.0\"?>\n  <!-- a comment -->\t<Graph/>").unwrap();
    assert_eq!(rest, "<Graph/>");
  }

  #[test]
  fn parses_both_quote_styles() {
    assert_eq!(attribute("start=\"3\"").unwrap().1, ("start", "3"));
    assert_eq!(attribute("weight = '2.5'").unwrap().1, ("weight", "2.5"));
  }
}
