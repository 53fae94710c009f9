//! Line-based chunking for C6: fixed-size windows
//! (`chunk_lines`, default 20), a metadata header prepended to only the
//! first chunk's embedding input (it never shifts `start_line`/`end_line`
//! accounting), no empty trailing chunks.

#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub index: u32,
    pub start_line: u32,
    pub end_line: u32,
    pub text_for_embedding: String,
}

pub fn chunk_content(content: &str, chunk_lines: u32, header: Option<&str>) -> Vec<Chunk> {
    let lines: Vec<&str> = content.lines().collect();
    if lines.is_empty() {
        return Vec::new();
    }
    let window = chunk_lines.max(1) as usize;

    let mut chunks = Vec::new();
    let mut index = 0u32;
    let mut start = 0usize;
    while start < lines.len() {
        let end = (start + window).min(lines.len());
        let mut text = String::new();
        if index == 0 {
            if let Some(header) = header {
                text.push_str(header);
                text.push('\n');
            }
        }
        text.push_str(&lines[start..end].join("\n"));

        chunks.push(Chunk {
            index,
            start_line: (start + 1) as u32,
            end_line: end as u32,
            text_for_embedding: text,
        });
        index += 1;
        start = end;
    }
    chunks
}

/// Metadata header text for a chunk owner (file path, language, block name).
pub fn owner_header(file_path: &str, language: &str, block_name: Option<&str>) -> String {
    match block_name {
        Some(name) => format!("# file: {file_path} lang: {language} block: {name}"),
        None => format!("# file: {file_path} lang: {language}"),
    }
}
