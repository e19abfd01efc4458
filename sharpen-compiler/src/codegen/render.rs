//! Renderers over the output tree
//!
//! [`TextRenderer`] produces target source text; [`XmlRenderer`] produces a
//! tag-per-node dump used by `--dumps`.

use super::code::{Code, InterpolationPart, Join};
use std::fmt::{self, Write};
use std::slice;

/// Indentation-aware source text renderer
#[derive(Debug, Clone, Copy)]
pub struct TextRenderer {
    indent: &'static str,
}

impl Default for TextRenderer {
    fn default() -> Self {
        TextRenderer { indent: "    " }
    }
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indent(mut self, indent: &'static str) -> Self {
        self.indent = indent;
        self
    }

    /// Render as lines, newline-terminated.
    pub fn render(&self, code: &Code) -> String {
        let mut lines = Vec::new();
        self.lines(code, 0, &mut lines);
        let mut text = lines.join("\n");
        if !text.is_empty() {
            text.push('\n');
        }
        text
    }

    /// Render on a single line.
    pub fn render_inline(&self, code: &Code) -> String {
        match code {
            Code::None => String::new(),
            Code::Text(text) => text.clone(),
            Code::Multiline(lines) => lines.join(" "),
            Code::List { items, join } => {
                let separator = match join {
                    Join::Inline(separator) => *separator,
                    Join::Lines | Join::Paragraphs => " ",
                };
                items
                    .iter()
                    .filter(|item| !item.is_none())
                    .map(|item| self.render_inline(item))
                    .collect::<Vec<_>>()
                    .join(separator)
            }
            Code::Interpolation(parts) => {
                let mut text = String::from("$\"");
                for part in parts {
                    match part {
                        InterpolationPart::Text(literal) => {
                            text.push_str(&escape_interpolated(literal))
                        }
                        InterpolationPart::Code(code) => {
                            text.push('{');
                            text.push_str(&self.render_inline(code));
                            text.push('}');
                        }
                    }
                }
                text.push('"');
                text
            }
            Code::Block { header, body } => {
                let mut words = Vec::with_capacity(body.len() + 3);
                let header = self.render_inline(header);
                if !header.is_empty() {
                    words.push(header);
                }
                words.push("{".to_string());
                words.extend(
                    body.iter()
                        .filter(|item| !item.is_none())
                        .map(|item| self.render_inline(item)),
                );
                words.push("}".to_string());
                words.join(" ")
            }
            Code::If {
                condition,
                then_branch,
                else_branch,
            } => format!(
                "({} ? {} : {})",
                self.render_inline(condition),
                self.render_inline(then_branch),
                else_branch
                    .as_ref()
                    .map(|branch| self.render_inline(branch))
                    .unwrap_or_else(|| "default".to_string())
            ),
        }
    }

    fn push(&self, depth: usize, text: &str, out: &mut Vec<String>) {
        if text.is_empty() {
            out.push(String::new());
        } else {
            out.push(format!("{}{}", self.indent.repeat(depth), text));
        }
    }

    fn lines(&self, code: &Code, depth: usize, out: &mut Vec<String>) {
        match code {
            Code::None => {}
            Code::Text(text) => self.push(depth, text, out),
            Code::Multiline(lines) => {
                for line in lines {
                    self.push(depth, line, out);
                }
            }
            Code::List {
                join: Join::Inline(_), ..
            }
            | Code::Interpolation(_) => self.push(depth, &self.render_inline(code), out),
            Code::List {
                items,
                join: Join::Lines,
            } => {
                for item in items {
                    self.lines(item, depth, out);
                }
            }
            Code::List {
                items,
                join: Join::Paragraphs,
            } => {
                for (index, item) in items.iter().filter(|item| !item.is_none()).enumerate() {
                    if index > 0 {
                        out.push(String::new());
                    }
                    self.lines(item, depth, out);
                }
            }
            Code::Block { header, body } => {
                let header = self.render_inline(header);
                if !header.is_empty() {
                    self.push(depth, &header, out);
                }
                self.push(depth, "{", out);
                for item in body {
                    self.lines(item, depth + 1, out);
                }
                self.push(depth, "}", out);
            }
            Code::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.push(depth, &format!("if ({})", self.render_inline(condition)), out);
                self.braced(then_branch, depth, out);
                match else_branch.as_deref() {
                    None => {}
                    Some(nested @ Code::If { .. }) => {
                        let mut chained = Vec::new();
                        self.lines(nested, depth, &mut chained);
                        if let Some(first) = chained.first_mut() {
                            let indent = self.indent.repeat(depth);
                            *first = format!("{}else {}", indent, first.trim_start());
                        }
                        out.extend(chained);
                    }
                    Some(branch) => {
                        self.push(depth, "else", out);
                        self.braced(branch, depth, out);
                    }
                }
            }
        }
    }

    fn braced(&self, code: &Code, depth: usize, out: &mut Vec<String>) {
        self.push(depth, "{", out);
        self.lines(code, depth + 1, out);
        self.push(depth, "}", out);
    }
}

fn escape_interpolated(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '{' => escaped.push_str("{{"),
            '}' => escaped.push_str("}}"),
            _ => escaped.push_str(&escape_char(c)),
        }
    }
    escaped
}

/// Escape a character for a regular string literal.
pub(crate) fn escape_char(c: char) -> String {
    match c {
        '"' => "\\\"".to_string(),
        '\\' => "\\\\".to_string(),
        '\n' => "\\n".to_string(),
        '\r' => "\\r".to_string(),
        '\t' => "\\t".to_string(),
        '\0' => "\\0".to_string(),
        c if c.is_control() => format!("\\u{:04x}", c as u32),
        c => c.to_string(),
    }
}

/// Debug renderer wrapping every node in a tag named after its kind
#[derive(Debug, Default, Clone, Copy)]
pub struct XmlRenderer;

impl XmlRenderer {
    pub fn new() -> Self {
        XmlRenderer
    }

    pub fn render(&self, code: &Code) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = self.write_node(code, 0, &mut out);
        out
    }

    fn write_node(&self, code: &Code, depth: usize, out: &mut String) -> fmt::Result {
        let pad = "  ".repeat(depth);
        let tag = code.kind();
        match code {
            Code::None => writeln!(out, "{}<{}/>", pad, tag),
            Code::Text(text) => writeln!(out, "{}<{}>{}</{}>", pad, tag, escape_xml(text), tag),
            Code::Multiline(lines) => {
                writeln!(out, "{}<{}>", pad, tag)?;
                for line in lines {
                    writeln!(out, "{}  <Line>{}</Line>", pad, escape_xml(line))?;
                }
                writeln!(out, "{}</{}>", pad, tag)
            }
            Code::List { items, join } => {
                let join = match join {
                    Join::Inline(separator) => format!("inline:{}", escape_xml(separator)),
                    Join::Lines => "lines".to_string(),
                    Join::Paragraphs => "paragraphs".to_string(),
                };
                writeln!(out, "{}<{} join=\"{}\">", pad, tag, join)?;
                for item in items {
                    self.write_node(item, depth + 1, out)?;
                }
                writeln!(out, "{}</{}>", pad, tag)
            }
            Code::Interpolation(parts) => {
                writeln!(out, "{}<{}>", pad, tag)?;
                for part in parts {
                    match part {
                        InterpolationPart::Text(text) => {
                            writeln!(out, "{}  <Part>{}</Part>", pad, escape_xml(text))?
                        }
                        InterpolationPart::Code(code) => self.write_node(code, depth + 1, out)?,
                    }
                }
                writeln!(out, "{}</{}>", pad, tag)
            }
            Code::Block { header, body } => {
                writeln!(out, "{}<{}>", pad, tag)?;
                self.write_section("Header", slice::from_ref(header.as_ref()), depth + 1, out)?;
                self.write_section("Body", body, depth + 1, out)?;
                writeln!(out, "{}</{}>", pad, tag)
            }
            Code::If {
                condition,
                then_branch,
                else_branch,
            } => {
                writeln!(out, "{}<{}>", pad, tag)?;
                let condition = slice::from_ref(condition.as_ref());
                self.write_section("Condition", condition, depth + 1, out)?;
                self.write_section("Then", slice::from_ref(then_branch.as_ref()), depth + 1, out)?;
                if let Some(branch) = else_branch {
                    self.write_section("Else", slice::from_ref(branch.as_ref()), depth + 1, out)?;
                }
                writeln!(out, "{}</{}>", pad, tag)
            }
        }
    }

    fn write_section(
        &self,
        name: &str,
        children: &[Code],
        depth: usize,
        out: &mut String,
    ) -> fmt::Result {
        let pad = "  ".repeat(depth);
        writeln!(out, "{}<{}>", pad, name)?;
        for child in children {
            self.write_node(child, depth + 1, out)?;
        }
        writeln!(out, "{}</{}>", pad, name)
    }
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class() -> Code {
        Code::block(
            Code::words(["public", "sealed", "class", "Rectangle"]),
            vec![
                Code::inline(
                    vec![Code::block(
                        Code::words(["public", "double", "height"]),
                        vec![Code::text("get;")],
                    )],
                    "",
                ),
                Code::block(
                    Code::text("public Rectangle()"),
                    vec![Code::statement(Code::text("this.height = 1.0"))],
                ),
            ],
        )
    }

    #[test]
    fn test_block_layout() {
        let text = TextRenderer::new().render(&class());
        let expected = "\
public sealed class Rectangle
{
    public double height { get; }
    public Rectangle()
    {
        this.height = 1.0;
    }
}
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_if_else_chain() {
        let code = Code::If {
            condition: Box::new(Code::text("a")),
            then_branch: Box::new(Code::text("x();")),
            else_branch: Some(Box::new(Code::If {
                condition: Box::new(Code::text("b")),
                then_branch: Box::new(Code::text("y();")),
                else_branch: Some(Box::new(Code::text("z();"))),
            })),
        };
        let text = TextRenderer::new().with_indent("  ").render(&code);
        assert_eq!(text, "if (a)\n{\n  x();\n}\nelse if (b)\n{\n  y();\n}\nelse\n{\n  z();\n}\n");
    }

    #[test]
    fn test_inline_conditional() {
        let code = Code::If {
            condition: Box::new(Code::text("a")),
            then_branch: Box::new(Code::text("1")),
            else_branch: None,
        };
        assert_eq!(TextRenderer::new().render_inline(&code), "(a ? 1 : default)");
    }

    #[test]
    fn test_interpolation_escapes() {
        let code = Code::Interpolation(vec![
            InterpolationPart::Text("area {\"".to_string()),
            InterpolationPart::Code(Code::text("r.area")),
        ]);
        assert_eq!(TextRenderer::new().render_inline(&code), "$\"area {{\\\"{r.area}\"");
    }

    #[test]
    fn test_paragraphs_skip_empty_items() {
        let code = Code::paragraphs(vec![Code::text("a"), Code::None, Code::text("b")]);
        assert_eq!(TextRenderer::new().render(&code), "a\n\nb\n");
    }

    #[test]
    fn test_xml_tags_follow_node_kinds() {
        let xml = XmlRenderer::new().render(&class());
        assert!(xml.starts_with("<Block>\n  <Header>\n    <List join=\"inline: \">"));
        assert!(xml.contains("<Text>this.height = 1.0</Text>"));
        assert!(xml.trim_end().ends_with("</Block>"));

        let marker = XmlRenderer::new().render(&Code::text("List<int> & \"x\""));
        assert_eq!(marker, "<Text>List&lt;int&gt; &amp; &quot;x&quot;</Text>\n");
    }
}
