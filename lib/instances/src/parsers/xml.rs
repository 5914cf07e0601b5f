use std::path::Path;
use anyhow::{anyhow, Context};
use crate::Result;
use crate::raw::graph::GraphXml;
use super::{
  ParseInstance,
  nom_prelude::*,
};

/// Instance file in the `<Graph>` XML format.
#[derive(Debug, Copy, Clone)]
pub struct XmlFmt<P>(pub P);

/// Same format as [`XmlFmt`], already read into memory.
#[derive(Debug, Copy, Clone)]
pub struct XmlStr<'a>(pub &'a str);

impl<P: AsRef<Path>> ParseInstance<XmlFmt<P>> for GraphXml {
  fn parse(input: XmlFmt<P>) -> Result<Self> {
    let path = input.0.as_ref();
    let data = std::fs::read_to_string(path)?;
    GraphXml::parse(XmlStr(&data))
  }
}

impl<'a> ParseInstance<XmlStr<'a>> for GraphXml {
  fn parse(input: XmlStr<'a>) -> Result<Self> {
    let root = match parsers::document(input.0).finish() {
      Ok((_, root)) => root,
      Err(e) => return Err(anyhow::Error::msg(error::convert_error(input.0, e))),
    };
    extract::graph(&root)
  }
}

#[derive(Debug, Clone)]
struct Element<'a> {
  name: &'a str,
  attrs: Vec<(&'a str, &'a str)>,
  children: Vec<Element<'a>>,
}

impl<'a> Element<'a> {
  fn attr<T>(&self, key: &str) -> Result<T>
    where
      T: FromStr,
      T::Err: std::error::Error + Send + Sync + 'static
  {
    let raw = self.attrs.iter()
      .find(|(k, _)| *k == key)
      .map(|(_, v)| v.trim())
      .ok_or_else(|| anyhow!("<{}> is missing attribute `{}`", self.name, key))?;
    raw.parse::<T>()
      .with_context(|| format!("bad value {:?} for attribute `{}` of <{}>", raw, key, self.name))
  }
}

mod parsers {
  use super::*;
  use crate::parsers::common::*;

  /// Element with attributes and child elements.  Text content is not part of the format.
  fn element(input: &str) -> Res<Element> {
    let (i, _) = char('<')(input)?;
    let (i, name) = name(i)?;
    let (i, attrs) = many0(preceded(multispace1, attribute))(i)?;
    let (i, _) = multispace0(i)?;

    if let Ok((i, _)) = tag::<_, _, VerboseError<&str>>("/>")(i) {
      return Ok((i, Element { name, attrs, children: Vec::new() }));
    }

    let (i, _) = context("end of start tag", char('>'))(i)?;
    let (i, children) = many0(preceded(junk, element))(i)?;
    let (i, _) = junk(i)?;
    let (i, _) = context(
      "closing tag",
      tuple((tag("</"), tag(name), multispace0, char('>'))),
    )(i)?;
    Ok((i, Element { name, attrs, children }))
  }

  pub fn document(input: &str) -> Res<Element> {
    terminated(preceded(junk, element), pair(junk, eof))(input)
  }

}

mod extract {
  use super::*;

  fn edges(section: &Element) -> Result<Vec<(usize, usize, f64)>> {
    section.children.iter()
      .map(|e| -> Result<_> { Ok((e.attr("start")?, e.attr("end")?, e.attr("weight")?)) })
      .collect()
  }

  fn nodes(section: &Element) -> Result<Vec<usize>> {
    section.children.iter()
      .map(|e| e.attr("index"))
      .collect()
  }

  pub fn graph(root: &Element) -> Result<GraphXml> {
    if root.name != "Graph" {
      return Err(anyhow!("expected <Graph> root element, found <{}>", root.name));
    }

    let mut graph = GraphXml {
      start: root.attr("start")?,
      end: root.attr("end")?,
      required_steps: root.attr("requiredStep")?,
      ..GraphXml::default()
    };

    for section in &root.children {
      match section.name {
        "Edges" => graph.edges.extend(edges(section)?),
        "RedNodes" => graph.red_nodes.extend(nodes(section)?),
        "RedEdges" => graph.red_edges.extend(edges(section)?),
        "GreenNodes" => graph.green_nodes.extend(nodes(section)?),
        "GreenEdges" => graph.green_edges.extend(edges(section)?),
        _ => {}
      }
    }
    Ok(graph)
  }
}
