use log::warn;

/// Extracts paragraph and table text from a Word document in document order.
/// Table cells are joined with ` | `, blocks with a blank line. Returns an
/// empty string when the bytes are not a readable DOCX.
pub fn extract_docx_text(data: &[u8]) -> String {
    let docx = match docx_rs::read_docx(data) {
        Ok(docx) => docx,
        Err(e) => {
            warn!("DOCX extraction failed: {e}");
            return String::new();
        }
    };

    let mut blocks: Vec<String> = Vec::new();

    for child in &docx.document.children {
        match child {
            docx_rs::DocumentChild::Paragraph(para) => {
                let text = paragraph_text(para);
                if !text.trim().is_empty() {
                    blocks.push(text);
                }
            }
            docx_rs::DocumentChild::Table(table) => {
                for row in &table.rows {
                    let docx_rs::TableChild::TableRow(tr) = row;
                    let cells: Vec<String> = tr
                        .cells
                        .iter()
                        .map(|cell| {
                            let docx_rs::TableRowChild::TableCell(tc) = cell;
                            cell_text(tc)
                        })
                        .filter(|text| !text.is_empty())
                        .collect();
                    if !cells.is_empty() {
                        blocks.push(cells.join(" | "));
                    }
                }
            }
            _ => {}
        }
    }

    blocks.join("\n\n")
}

fn cell_text(cell: &docx_rs::TableCell) -> String {
    let mut parts = Vec::new();
    for content in &cell.children {
        if let docx_rs::TableCellContent::Paragraph(p) = content {
            let text = paragraph_text(p);
            let text = text.trim();
            if !text.is_empty() {
                parts.push(text.to_string());
            }
        }
    }
    parts.join(" ")
}

fn paragraph_text(para: &docx_rs::Paragraph) -> String {
    let mut text = String::new();
    for child in &para.children {
        if let docx_rs::ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                match run_child {
                    docx_rs::RunChild::Text(t) => text.push_str(&t.text),
                    docx_rs::RunChild::Tab(_) => text.push('\t'),
                    docx_rs::RunChild::Break(_) => text.push('\n'),
                    _ => {}
                }
            }
        }
    }
    text
}
