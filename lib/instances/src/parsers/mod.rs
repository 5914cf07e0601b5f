mod xml;
pub use xml::{XmlFmt, XmlStr};

mod nom_prelude {
  pub use nom::{
    IResult,
    error::{
      self,
      VerboseError,
      context,
    },
    branch::alt,
    sequence::*,
    multi::*,
    combinator::*,
    character::complete::*,
    bytes::complete::{tag, take_until, take_while1},
    Finish,
  };
  pub use std::str::FromStr;

  pub type Res<'a, O> = IResult<&'a str, O, VerboseError<&'a str>>;
}

mod common;

pub trait ParseInstance<Fmt>: Sized {
  fn parse(inputs: Fmt) -> crate::Result<Self>;
}
