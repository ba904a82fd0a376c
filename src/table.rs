// src/table.rs
//
// JSON to table conversion for the metadata block.

use serde_json::{Map, Value};
use yew::prelude::*;

/// A JSON tree reshaped for tabular display.
#[derive(Debug, Clone, PartialEq)]
pub enum TableNode {
    /// Empty object or list; renders nothing.
    Empty,
    Text(String),
    /// An object: one `<th>` key / `<td>` value row per entry.
    KeyValue(Vec<(String, TableNode)>),
    /// A list of objects: header row from the union of their keys, in
    /// first-seen order, then one row per object. Missing keys are `Empty`.
    Records {
        columns: Vec<String>,
        rows: Vec<Vec<TableNode>>,
    },
    /// Any other list: one row per item.
    List(Vec<TableNode>),
}

pub fn json_to_table(value: &Value) -> TableNode {
    match value {
        Value::Object(map) => object_table(map),
        Value::Array(items) => list_table(items),
        Value::Null => TableNode::Text(String::new()),
        Value::String(s) => TableNode::Text(s.clone()),
        other => TableNode::Text(other.to_string()),
    }
}

fn object_table(map: &Map<String, Value>) -> TableNode {
    if map.is_empty() {
        return TableNode::Empty;
    }
    TableNode::KeyValue(
        map.iter()
            .map(|(key, value)| (key.clone(), json_to_table(value)))
            .collect(),
    )
}

fn list_table(items: &[Value]) -> TableNode {
    if items.is_empty() {
        return TableNode::Empty;
    }
    if !items.iter().all(Value::is_object) {
        return TableNode::List(items.iter().map(json_to_table).collect());
    }

    let mut columns: Vec<String> = Vec::new();
    for key in items.iter().filter_map(Value::as_object).flat_map(|map| map.keys()) {
        if !columns.contains(key) {
            columns.push(key.clone());
        }
    }

    let rows = items
        .iter()
        .map(|item| {
            columns
                .iter()
                .map(|column| item.get(column).map(json_to_table).unwrap_or(TableNode::Empty))
                .collect()
        })
        .collect();

    TableNode::Records { columns, rows }
}

/// Render a table tree; text goes through `html!`, so it is escaped.
pub fn render_table(node: &TableNode) -> Html {
    match node {
        TableNode::Empty => html! {},
        TableNode::Text(text) => html! { <>{ text.clone() }</> },
        TableNode::KeyValue(entries) => html! {
            <table>
                <tbody>
                    { for entries.iter().map(|(key, value)| html! {
                        <tr><th>{ key.clone() }</th><td>{ render_table(value) }</td></tr>
                    }) }
                </tbody>
            </table>
        },
        TableNode::Records { columns, rows } => html! {
            <table>
                <thead>
                    <tr>{ for columns.iter().map(|column| html! { <th>{ column.clone() }</th> }) }</tr>
                </thead>
                <tbody>
                    { for rows.iter().map(|row| html! {
                        <tr>{ for row.iter().map(|cell| html! { <td>{ render_table(cell) }</td> }) }</tr>
                    }) }
                </tbody>
            </table>
        },
        TableNode::List(items) => html! {
            <table>
                <tbody>
                    { for items.iter().map(|item| html! {
                        <tr><td>{ render_table(item) }</td></tr>
                    }) }
                </tbody>
            </table>
        },
    }
}
