//! GraphQL connection assembly.
//!
//! The wire shape of a paginated result: edges carrying per-record cursors,
//! plus page info with the start/end cursors. Field names serialize in
//! camelCase for compatibility with existing GraphQL clients.

use serde::Serialize;

use crate::cursor::encode_node;
use crate::order::OrderBy;
use crate::Error;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Edge<T> {
    pub node: T,
    pub cursor: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    pub edges: Vec<Edge<T>>,
    pub page_info: PageInfo,
}

impl<T> Connection<T> {
    pub fn empty() -> Self {
        Self {
            edges: Vec::new(),
            page_info: PageInfo {
                has_next_page: false,
                has_previous_page: false,
                start_cursor: None,
                end_cursor: None,
            },
        }
    }

    /// Map node types while preserving cursors and page info.
    pub fn map_nodes<U>(self, mut f: impl FnMut(T) -> U) -> Connection<U> {
        Connection {
            edges: self
                .edges
                .into_iter()
                .map(|e| Edge {
                    node: f(e.node),
                    cursor: e.cursor,
                })
                .collect(),
            page_info: self.page_info,
        }
    }
}

impl<T: Serialize> Connection<T> {
    /// Build a connection from a page of records already in request order,
    /// encoding each edge's cursor from its order-field projection.
    pub fn from_nodes(
        nodes: Vec<T>,
        order: &OrderBy,
        has_next_page: bool,
        has_previous_page: bool,
    ) -> Result<Self, Error> {
        let mut edges = Vec::with_capacity(nodes.len());
        for node in nodes {
            let cursor = encode_node(&node, order.field_names())?;
            edges.push(Edge { node, cursor });
        }
        let page_info = PageInfo {
            has_next_page,
            has_previous_page,
            start_cursor: edges.first().map(|e| e.cursor.clone()),
            end_cursor: edges.last().map(|e| e.cursor.clone()),
        };
        Ok(Self { edges, page_info })
    }
}
