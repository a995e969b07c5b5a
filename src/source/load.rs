use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::error::PayloadError;
use super::graph::GraphData;
use super::payload::parse_payload;

pub fn load_graph(path: &Path) -> Result<GraphData> {
    let raw = fs::read_to_string(path).map_err(|source| PayloadError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let graph = parse_payload(&raw)
        .with_context(|| format!("failed to decode graph payload {}", path.display()))?;

    info!(
        path = %path.display(),
        nodes = graph.node_count(),
        links = graph.link_count(),
        quarantined = graph.quarantined,
        "loaded graph payload"
    );

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn missing_file_reports_path() {
        let path = Path::new("/definitely/not/here/graph.json");
        let error = load_graph(path).unwrap_err();
        assert!(format!("{error}").contains("graph.json"));
        assert!(error.downcast_ref::<PayloadError>().is_some());
    }

    #[test]
    fn loads_payload_from_disk() {
        let path = std::env::temp_dir().join(format!("relgraph-load-{}.json", std::process::id()));
        let mut file = fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{ "nodes": [{{ "id": "p1", "type": "person", "label": "Ada" }}], "links": [] }}"#
        )
        .unwrap();
        drop(file);

        let graph = load_graph(&path).unwrap();
        assert_eq!(graph.node_count(), 1);

        fs::remove_file(&path).unwrap();
    }
}
