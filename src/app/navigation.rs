use eframe::egui::{Context, OpenUrl};
use tracing::{debug, info};

use crate::source::{Node, NodeKind};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationRequest {
    pub record_id: String,
}

/// Only entity-records with a domain id open a detail view.
pub fn navigation_for(node: &Node) -> Option<NavigationRequest> {
    if node.kind != NodeKind::EntityRecord {
        debug!(id = %node.id, kind = node.kind.wire_name(), "double click ignored");
        return None;
    }

    let Some(record_id) = node.record_id() else {
        debug!(id = %node.id, "entity-record without data.id, nothing to open");
        return None;
    };

    Some(NavigationRequest { record_id })
}

pub trait Navigator {
    /// Handles one request and returns a short status line for the UI.
    fn open_record(&mut self, ctx: &Context, request: &NavigationRequest) -> String;
}

#[derive(Clone, Debug, Default)]
pub struct UrlNavigator {
    template: Option<String>,
}

impl UrlNavigator {
    pub fn new(template: Option<String>) -> Self {
        Self { template }
    }

    pub fn url_for(&self, record_id: &str) -> Option<String> {
        self.template
            .as_deref()
            .map(|template| template.replace("{id}", record_id))
    }
}

impl Navigator for UrlNavigator {
    fn open_record(&mut self, ctx: &Context, request: &NavigationRequest) -> String {
        match self.url_for(&request.record_id) {
            Some(url) => {
                info!(record_id = %request.record_id, %url, "opening record view");
                ctx.open_url(OpenUrl::new_tab(&url));
                format!("Opened record {}", request.record_id)
            }
            None => {
                info!(record_id = %request.record_id, "record view requested");
                format!("Open record {}", request.record_id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn node(kind: NodeKind, data: serde_json::Value) -> Node {
        Node {
            id: "n1".to_owned(),
            kind,
            label: "n1".to_owned(),
            data,
        }
    }

    #[test]
    fn only_entity_records_navigate() {
        let request = navigation_for(&node(NodeKind::EntityRecord, json!({ "id": "rec-9" })));
        assert_eq!(
            request,
            Some(NavigationRequest {
                record_id: "rec-9".to_owned()
            })
        );

        for kind in [NodeKind::Person, NodeKind::Collection, NodeKind::Label] {
            assert_eq!(navigation_for(&node(kind, json!({ "id": "x" }))), None);
        }
    }

    #[test]
    fn record_without_id_is_a_no_op() {
        assert_eq!(
            navigation_for(&node(NodeKind::EntityRecord, json!({ "title": "x" }))),
            None
        );
    }

    #[test]
    fn url_template_substitutes_id() {
        let navigator = UrlNavigator::new(Some("https://app.example/records/{id}".to_owned()));
        assert_eq!(
            navigator.url_for("42").as_deref(),
            Some("https://app.example/records/42")
        );
        assert_eq!(UrlNavigator::default().url_for("42"), None);
    }

    #[test]
    fn navigator_reports_status_without_template() {
        let ctx = Context::default();
        let mut navigator = UrlNavigator::default();
        let status = navigator.open_record(
            &ctx,
            &NavigationRequest {
                record_id: "7".to_owned(),
            },
        );
        assert_eq!(status, "Open record 7");
    }
}
