use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;

use crate::source::NodeKind;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Graph payload (JSON with `nodes`, `links` and optional `stats`).
    #[arg(long, default_value = "graph.json")]
    pub payload: PathBuf,

    /// URL opened when a record is double-clicked; `{id}` is replaced by the record id.
    #[arg(long, value_name = "TEMPLATE")]
    pub record_url: Option<String>,

    /// Start with node labels turned off.
    #[arg(long)]
    pub hide_labels: bool,

    /// Node types visible at startup, e.g. `entity-record,person`.
    #[arg(long, value_name = "KIND,...", value_delimiter = ',', value_parser = parse_kind)]
    pub types: Option<Vec<NodeKind>>,

    #[arg(long, default_value_t = 1440.0)]
    pub width: f32,

    #[arg(long, default_value_t = 920.0)]
    pub height: f32,
}

fn parse_kind(value: &str) -> Result<NodeKind, String> {
    NodeKind::from_wire(value.trim()).ok_or_else(|| {
        let known = NodeKind::ALL.map(NodeKind::wire_name).join(", ");
        format!("unknown node type `{value}` (expected one of: {known})")
    })
}

/// Initial view state derived from the command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewSettings {
    pub show_labels: bool,
    pub visible_kinds: Vec<NodeKind>,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            show_labels: true,
            visible_kinds: NodeKind::ALL.to_vec(),
        }
    }
}

impl Args {
    pub fn view_settings(&self) -> Result<ViewSettings> {
        let mut visible_kinds = match &self.types {
            Some(kinds) => kinds.clone(),
            None => NodeKind::ALL.to_vec(),
        };
        visible_kinds.sort_unstable();
        visible_kinds.dedup();
        if visible_kinds.is_empty() {
            bail!("--types needs at least one node type");
        }

        Ok(ViewSettings {
            show_labels: !self.hide_labels,
            visible_kinds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("relgraph").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_show_everything() {
        let args = parse(&[]).unwrap();
        assert_eq!(args.payload, PathBuf::from("graph.json"));
        assert_eq!(args.record_url, None);
        assert_eq!(args.view_settings().unwrap(), ViewSettings::default());
    }

    #[test]
    fn types_are_parsed_and_deduplicated() {
        let args = parse(&["--types", "person,entity-record,person", "--hide-labels"]).unwrap();
        let settings = args.view_settings().unwrap();
        assert!(!settings.show_labels);
        assert_eq!(settings.visible_kinds, [NodeKind::EntityRecord, NodeKind::Person]);
    }

    #[test]
    fn unknown_or_empty_types_are_rejected() {
        assert!(parse(&["--types", "person,venue"]).is_err());
        assert!(parse(&["--types", ""]).is_err());
    }

    #[test]
    fn record_url_template_is_kept_verbatim() {
        let args = parse(&["--record-url", "https://example.test/records/{id}"]).unwrap();
        assert_eq!(args.record_url.as_deref(), Some("https://example.test/records/{id}"));
    }
}
