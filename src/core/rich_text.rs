use serde_json::Value;

const BLOCK_NODES: [&str; 10] = [
    "paragraph",
    "heading-1",
    "heading-2",
    "heading-3",
    "heading-4",
    "heading-5",
    "heading-6",
    "blockquote",
    "list-item",
    "hr",
];

/// Flattens a rich-text document (or a plain string) into readable text.
/// Block nodes are separated by a blank line.
pub fn plain_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.trim().to_string(),
        Value::Object(_) => {
            let mut blocks = Vec::new();
            collect_blocks(value, &mut blocks);
            blocks
                .into_iter()
                .map(|block| block.trim().to_string())
                .filter(|block| !block.is_empty())
                .collect::<Vec<_>>()
                .join("\n\n")
        }
        _ => String::new(),
    }
}

fn collect_blocks(node: &Value, blocks: &mut Vec<String>) {
    let node_type = node.get("nodeType").and_then(Value::as_str).unwrap_or_default();
    let children = node.get("content").and_then(Value::as_array);

    if BLOCK_NODES.contains(&node_type) {
        let mut text = String::new();
        collect_inline(node, &mut text);
        blocks.push(text);
        return;
    }

    // document、清單等容器節點往下找
    if let Some(children) = children {
        for child in children {
            collect_blocks(child, blocks);
        }
    }
}

fn collect_inline(node: &Value, out: &mut String) {
    if let Some(text) = node.get("value").and_then(Value::as_str) {
        out.push_str(text);
    }
    if let Some(children) = node.get("content").and_then(Value::as_array) {
        for child in children {
            collect_inline(child, out);
        }
    }
}
